//! FFmpeg executable discovery.
//!
//! Lookup order, first hit wins:
//! 1. the system `PATH`
//! 2. an `ffmpeg` binary sitting next to the running program
//! 3. a short list of well-known install directories

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use super::error::StereoError;
use super::ffmpeg_info::Engine;

/// Anything that can hand back a runnable engine
pub trait EngineLocator {
    fn locate(&self) -> Result<Engine, StereoError>;
}

/// File name of the engine binary on this platform
pub fn engine_binary_name() -> &'static str {
    if cfg!(windows) { "ffmpeg.exe" } else { "ffmpeg" }
}

/// Well-known install locations for the current platform
pub fn well_known_locations() -> Vec<PathBuf> {
    let binary = engine_binary_name();
    let mut locations = Vec::new();

    if cfg!(windows) {
        for var in ["PROGRAMFILES", "PROGRAMFILES(X86)"] {
            if let Some(root) = env::var_os(var) {
                locations.push(PathBuf::from(root).join("ffmpeg").join("bin").join(binary));
            }
        }
        if let Some(home) = dirs::home_dir() {
            locations.push(home.join("ffmpeg").join("bin").join(binary));
        }
        locations.push(PathBuf::from("C:/ffmpeg/bin").join(binary));
    } else {
        locations.push(PathBuf::from("/usr/local/bin").join(binary));
        locations.push(PathBuf::from("/opt/homebrew/bin").join(binary));
        locations.push(PathBuf::from("/opt/ffmpeg/bin").join(binary));
        if let Some(home) = dirs::home_dir() {
            locations.push(home.join("ffmpeg").join("bin").join(binary));
        }
    }

    locations
}

/// Searches PATH, the program directory and well-known directories
#[derive(Debug, Clone)]
pub struct SystemLocator {
    search_path: Option<OsString>,
    program_dir: Option<PathBuf>,
    well_known: Vec<PathBuf>,
}

impl Default for SystemLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemLocator {
    /// Locator backed by the real process environment
    pub fn new() -> Self {
        let program_dir = env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));

        Self {
            search_path: env::var_os("PATH"),
            program_dir,
            well_known: well_known_locations(),
        }
    }

    /// Replace the PATH-style search string (`None` skips the PATH step)
    pub fn with_search_path(mut self, search_path: Option<OsString>) -> Self {
        self.search_path = search_path;
        self
    }

    pub fn with_program_dir(mut self, program_dir: Option<PathBuf>) -> Self {
        self.program_dir = program_dir;
        self
    }

    pub fn with_well_known(mut self, well_known: Vec<PathBuf>) -> Self {
        self.well_known = well_known;
        self
    }

    fn search_system_path(&self) -> Option<PathBuf> {
        let paths = self.search_path.as_ref()?;
        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        which::which_in("ffmpeg", Some(paths), cwd).ok()
    }
}

impl EngineLocator for SystemLocator {
    fn locate(&self) -> Result<Engine, StereoError> {
        info!("Searching for FFmpeg...");
        let mut searched = Vec::new();

        if let Some(found) = self.search_system_path() {
            info!("Found FFmpeg in PATH: {}", found.display());
            return Ok(Engine::new(absolute(found)));
        }
        searched.push(PathBuf::from("$PATH"));

        if let Some(dir) = &self.program_dir {
            let candidate = dir.join(engine_binary_name());
            if is_executable_file(&candidate) {
                info!("Found FFmpeg in program directory: {}", candidate.display());
                return Ok(Engine::new(absolute(candidate)));
            }
            searched.push(candidate);
        }

        for location in &self.well_known {
            info!("Checking location: {}", location.display());
            if is_executable_file(location) {
                info!("Found FFmpeg at: {}", location.display());
                return Ok(Engine::new(absolute(location.clone())));
            }
            searched.push(location.clone());
        }

        error!("FFmpeg not found in any expected location!");
        Err(StereoError::EngineNotFound {
            binary: engine_binary_name().to_string(),
            searched,
        })
    }
}

/// Accepts exactly one configured path (the `engine_path` config key)
#[derive(Debug, Clone)]
pub struct FixedLocator {
    path: PathBuf,
}

impl FixedLocator {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl EngineLocator for FixedLocator {
    fn locate(&self) -> Result<Engine, StereoError> {
        if is_executable_file(&self.path) {
            info!("Using configured FFmpeg: {}", self.path.display());
            Ok(Engine::new(absolute(self.path.clone())))
        } else {
            error!("Configured FFmpeg path is not runnable: {}", self.path.display());
            Err(StereoError::EngineNotFound {
                binary: engine_binary_name().to_string(),
                searched: vec![self.path.clone()],
            })
        }
    }
}

fn absolute(path: PathBuf) -> PathBuf {
    std::path::absolute(&path).unwrap_or(path)
}

#[cfg(unix)]
fn is_executable_file(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable_file(path: &Path) -> bool {
    path.is_file()
}
