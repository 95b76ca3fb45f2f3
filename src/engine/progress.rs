
/// Parser for ffmpeg `-progress` output (key=value lines)
#[derive(Debug, Default, Clone)]
pub struct ProgressParser {
    pub frame: u64,
    pub out_time_us: u64,
    pub fps: Option<f64>,
    pub speed: Option<f64>,
    pub is_complete: bool,
}

impl ProgressParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a single line. Returns true when a progress block ends,
    /// i.e. the snapshot is worth publishing.
    pub fn parse_line(&mut self, line: &str) -> bool {
        let Some((key, value)) = line.split_once('=') else {
            return false;
        };
        let value = value.trim();

        match key.trim() {
            "frame" => {
                if let Ok(f) = value.parse::<u64>() {
                    self.frame = f;
                }
            }
            "out_time_us" => {
                if let Ok(us) = value.parse::<u64>() {
                    self.out_time_us = us;
                }
            }
            "fps" => {
                if let Ok(f) = value.parse::<f64>() {
                    self.fps = Some(f);
                }
            }
            "speed" => {
                // "1.23x"
                if let Ok(s) = value.trim_end_matches('x').parse::<f64>() {
                    self.speed = Some(s);
                }
            }
            "progress" => {
                if value == "end" {
                    self.is_complete = true;
                }
                return true;
            }
            _ => {}
        }
        false
    }

    pub fn out_time_s(&self) -> f64 {
        self.out_time_us as f64 / 1_000_000.0
    }

    /// Percent done given the input duration
    pub fn progress_pct(&self, duration_s: Option<f64>) -> f64 {
        if self.is_complete {
            return 100.0;
        }
        match duration_s {
            Some(dur) if dur > 0.0 => (self.out_time_s() / dur * 100.0).min(100.0),
            _ => 0.0,
        }
    }

    /// Seconds left at the current speed
    pub fn eta_seconds(&self, duration_s: Option<f64>) -> Option<u64> {
        let dur = duration_s.filter(|d| *d > 0.0)?;
        let speed = self.speed.filter(|s| *s > 0.0)?;
        let remaining = (dur - self.out_time_s()).max(0.0);
        Some((remaining / speed).round() as u64)
    }
}

/// Snapshot sent to whoever is watching a job
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodeProgress {
    /// Name of the encode configuration producing this output
    pub config: String,
    pub frame: u64,
    pub total_frames: Option<u64>,
    pub fps: Option<f64>,
    /// Encode speed relative to realtime
    pub speed: Option<f64>,
    pub progress_pct: f64,
    pub eta_seconds: Option<u64>,
}

impl EncodeProgress {
    pub fn from_parser(
        config: &str,
        parser: &ProgressParser,
        duration_s: Option<f64>,
        total_frames: Option<u64>,
    ) -> Self {
        Self {
            config: config.to_string(),
            frame: parser.frame,
            total_frames,
            fps: parser.fps,
            speed: parser.speed,
            progress_pct: parser.progress_pct(duration_s),
            eta_seconds: parser.eta_seconds(duration_s),
        }
    }
}

/// `HH:MM:SS` for the ETA label
pub fn format_eta(seconds: Option<u64>) -> String {
    match seconds {
        Some(s) => format!("{:02}:{:02}:{:02}", s / 3600, (s % 3600) / 60, s % 60),
        None => "--:--:--".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_parser_block() {
        let mut parser = ProgressParser::new();

        assert!(!parser.parse_line("frame=120"));
        assert!(!parser.parse_line("fps=29.5"));
        assert!(!parser.parse_line("out_time_us=4000000"));
        assert!(!parser.parse_line("speed=0.5x"));
        assert!(parser.parse_line("progress=continue"));

        assert_eq!(parser.frame, 120);
        assert_eq!(parser.fps, Some(29.5));
        assert_eq!(parser.out_time_s(), 4.0);
        assert_eq!(parser.speed, Some(0.5));
        assert!(!parser.is_complete);

        assert!(parser.parse_line("progress=end"));
        assert!(parser.is_complete);
    }

    #[test]
    fn test_garbage_lines_ignored() {
        let mut parser = ProgressParser::new();
        assert!(!parser.parse_line("not a progress line"));
        assert!(!parser.parse_line("fps=N/A"));
        assert!(!parser.parse_line("speed=N/A"));
        assert_eq!(parser.fps, None);
        assert_eq!(parser.speed, None);
    }

    #[test]
    fn test_percent_and_eta() {
        let mut parser = ProgressParser::new();
        parser.parse_line("out_time_us=5000000");
        parser.parse_line("speed=0.5x");

        assert_eq!(parser.progress_pct(Some(10.0)), 50.0);
        assert_eq!(parser.progress_pct(None), 0.0);
        // 5 seconds of media left at half speed
        assert_eq!(parser.eta_seconds(Some(10.0)), Some(10));
        assert_eq!(parser.eta_seconds(None), None);
    }

    #[test]
    fn test_format_eta() {
        assert_eq!(format_eta(Some(3725)), "01:02:05");
        assert_eq!(format_eta(None), "--:--:--");
    }
}
