use anyhow::{Context, Result};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Resolved FFmpeg executable. Built once by a locator and never changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Engine {
    path: PathBuf,
}

impl Engine {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fresh command whose program is the engine
    pub fn command(&self) -> Command {
        Command::new(&self.path)
    }

    /// First line of `ffmpeg -version`
    pub fn version(&self) -> Result<String> {
        let output = self
            .command()
            .arg("-version")
            .output()
            .with_context(|| format!("Failed to execute {}", self.path.display()))?;

        if !output.status.success() {
            anyhow::bail!("ffmpeg command failed with status: {}", output.status);
        }

        let version_output = String::from_utf8_lossy(&output.stdout);
        let first_line = version_output.lines().next().unwrap_or("Unknown version");

        Ok(first_line.to_string())
    }
}

/// What a finished engine run left behind
#[derive(Debug, Clone, Default)]
pub struct RunOutput {
    pub success: bool,
    /// Human-readable exit status ("exit status: 1")
    pub status: String,
    pub stderr: String,
}

impl RunOutput {
    /// Last `n` lines of stderr, for log messages
    pub fn stderr_tail(&self, n: usize) -> String {
        let lines: Vec<&str> = self.stderr.lines().collect();
        let start = lines.len().saturating_sub(n);
        lines[start..].join("\n")
    }
}

/// Runs engine commands. Swapped for a fake in tests.
pub trait CommandRunner: Send + Sync {
    /// Run `cmd` to completion, feeding each stdout line to `on_stdout_line`
    fn run(&self, cmd: Command, on_stdout_line: &mut dyn FnMut(&str)) -> io::Result<RunOutput>;
}

/// Spawns real processes
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(
        &self,
        mut cmd: Command,
        on_stdout_line: &mut dyn FnMut(&str),
    ) -> io::Result<RunOutput> {
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = cmd.spawn()?;

        // Drain stderr on its own thread so a chatty engine can't block on a full pipe
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::other("Failed to capture stderr"))?;
        let stderr_thread = std::thread::spawn(move || {
            let mut stderr_output = String::new();
            let reader = BufReader::new(stderr);
            for line in reader.lines().map_while(Result::ok) {
                stderr_output.push_str(&line);
                stderr_output.push('\n');
            }
            stderr_output
        });

        if let Some(stdout) = child.stdout.take() {
            let reader = BufReader::new(stdout);
            for line in reader.lines().map_while(Result::ok) {
                on_stdout_line(&line);
            }
        }

        let status = child.wait()?;
        let stderr = stderr_thread
            .join()
            .unwrap_or_else(|_| "Failed to capture stderr".to_string());

        Ok(RunOutput {
            success: status.success(),
            status: status.to_string(),
            stderr,
        })
    }
}

/// Shell-quoted rendering of a command for logs and dry runs
pub fn format_command(cmd: &Command) -> String {
    let parts: Vec<String> = std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|a| a.to_string_lossy().to_string())
        .collect();

    shlex::try_join(parts.iter().map(String::as_str)).unwrap_or_else(|_| parts.join(" "))
}
