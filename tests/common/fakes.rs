#![allow(dead_code)]

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Mutex;
use stereoscoper::engine::{CommandRunner, Engine, EngineLocator, RunOutput, StereoError};

/// `ffmpeg -i` stderr for a GoPro MAX file: lenses on 0:0 and 0:5, 10s at 30 fps
pub fn gopro_probe_stderr() -> String {
    "\
Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'GS010012.360':
  Duration: 00:00:10.00, start: 0.000000, bitrate: 120000 kb/s
  Stream #0:0[0x1](eng): Video: hevc (Main) (hvc1 / 0x31637668), yuvj420p(pc, bt709), 4096x1344, 60000 kb/s, 30 fps, 30 tbr, 90k tbn (default)
  Stream #0:1[0x2](eng): Audio: aac (LC) (mp4a / 0x6134706D), 48000 Hz, stereo, fltp, 189 kb/s (default)
  Stream #0:2[0x3](eng): Data: none (tmcd / 0x64636D74) (default)
  Stream #0:3[0x4](eng): Data: bin_data (gpmd / 0x646D7067), 61 kb/s (default)
  Stream #0:4[0x5](eng): Data: none (fdsc / 0x63736466), 13 kb/s (default)
  Stream #0:5[0x6](eng): Video: hevc (Main) (hvc1 / 0x31637668), yuvj420p(pc, bt709), 4096x1344, 60000 kb/s, 30 fps, 30 tbr, 90k tbn (default)
  Stream #0:6[0x7](eng): Audio: ambisonic, 48000 Hz, 4.0, s16, 1536 kb/s
At least one output file must be specified
"
    .to_string()
}

/// Locator with a fixed answer
pub struct FakeLocator(pub Option<PathBuf>);

impl FakeLocator {
    pub fn found(path: &str) -> Self {
        Self(Some(PathBuf::from(path)))
    }

    pub fn missing() -> Self {
        Self(None)
    }
}

impl EngineLocator for FakeLocator {
    fn locate(&self) -> Result<Engine, StereoError> {
        match &self.0 {
            Some(path) => Ok(Engine::new(path)),
            None => Err(StereoError::EngineNotFound {
                binary: "ffmpeg".to_string(),
                searched: vec![PathBuf::from("$PATH")],
            }),
        }
    }
}

/// One scripted engine response, consumed in call order
#[derive(Debug, Clone)]
pub enum Scripted {
    /// Exit non-zero with this stderr (probes always look like this)
    Stderr(String),
    /// Print these progress lines, write the target file, exit zero
    Encode { progress: Vec<String>, bytes: Vec<u8> },
    /// Write a partial target, then exit non-zero
    FailAfterWriting(String),
    /// The process could not be spawned
    SpawnError,
}

impl Scripted {
    pub fn encode_ok(bytes: &[u8]) -> Self {
        Self::Encode {
            progress: [
                "frame=150",
                "fps=30.0",
                "out_time_us=5000000",
                "speed=1.0x",
                "progress=continue",
                "frame=300",
                "fps=30.0",
                "out_time_us=10000000",
                "speed=1.0x",
                "progress=end",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            bytes: bytes.to_vec(),
        }
    }
}

/// Records every command and answers from a script
#[derive(Default)]
pub struct FakeRunner {
    script: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl FakeRunner {
    pub fn new(script: Vec<Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Argument vectors (program first) in call order
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    /// Only the encode invocations
    pub fn encode_calls(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter(|c| c.iter().any(|a| a == "-filter_complex"))
            .collect()
    }
}

/// Value following `flag` in an argument vector
pub fn arg_after<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn write_target(args: &[String], bytes: &[u8]) {
    if let Some(target) = args.last() {
        fs::write(Path::new(target), bytes).unwrap();
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, cmd: Command, on_stdout_line: &mut dyn FnMut(&str)) -> io::Result<RunOutput> {
        let args: Vec<String> = std::iter::once(cmd.get_program())
            .chain(cmd.get_args())
            .map(|a| a.to_string_lossy().to_string())
            .collect();
        self.calls.lock().unwrap().push(args.clone());

        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Scripted::Stderr(String::new()));

        match next {
            Scripted::Stderr(stderr) => Ok(RunOutput {
                success: false,
                status: "exit status: 1".to_string(),
                stderr,
            }),
            Scripted::Encode { progress, bytes } => {
                for line in &progress {
                    on_stdout_line(line);
                }
                write_target(&args, &bytes);
                Ok(RunOutput {
                    success: true,
                    status: "exit status: 0".to_string(),
                    stderr: String::new(),
                })
            }
            Scripted::FailAfterWriting(stderr) => {
                write_target(&args, b"partial");
                Ok(RunOutput {
                    success: false,
                    status: "exit status: 1".to_string(),
                    stderr,
                })
            }
            Scripted::SpawnError => Err(io::Error::new(io::ErrorKind::NotFound, "no such binary")),
        }
    }
}
