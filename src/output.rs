// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal, quiet (CI), and JSON output modes, and prints streamed log lines.

use serde::Serialize;
use std::time::Instant;

use crate::client::LogLine;
use crate::deploy::LogSink;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Minimal output for CI (only final result)
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get elapsed time since timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn duration_secs(&self) -> Option<f64> {
        self.start_time.map(|_| self.elapsed_secs())
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Print a success message with optional timing.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => {
                let elapsed = self.elapsed_secs();
                if elapsed > 0.0 {
                    println!("{message} ({:.1}s)", elapsed);
                } else {
                    println!("{message}");
                }
            }
            OutputMode::Quiet => {
                println!("{message}");
            }
            OutputMode::Json => {
                let event = JsonEvent::new("success", message).timed(self.duration_secs());
                print_json(&event, false);
            }
        }
    }

    /// Print a warning (suppressed in quiet mode).
    pub fn warning(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => eprintln!("Warning: {message}"),
            OutputMode::Quiet => {}
            OutputMode::Json => print_json(&JsonEvent::new("warning", message), true),
        }
    }

    /// Print an error message with an optional remediation hint.
    pub fn error(&self, message: &str, hint: Option<&str>) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                eprintln!("Error: {message}");
                if let Some(hint) = hint {
                    eprintln!("    {hint}");
                }
            }
            OutputMode::Json => {
                let event = JsonEvent {
                    hint,
                    ..JsonEvent::new("error", message).timed(self.duration_secs())
                };
                print_json(&event, true);
            }
        }
    }

    /// Print one streamed log line of a deployment action.
    pub fn log_line(&self, line: &LogLine) {
        match self.mode {
            OutputMode::Normal => match line.timestamp {
                Some(ts) => println!("{} {}", ts.format("%H:%M:%S"), line.message),
                None => println!("{}", line.message),
            },
            OutputMode::Quiet => {}
            OutputMode::Json => {
                let event = JsonLogEvent {
                    event: "log",
                    timestamp: line.timestamp.map(|ts| ts.to_rfc3339()),
                    message: &line.message,
                };
                print_json(&event, false);
            }
        }
    }
}

impl LogSink for Output {
    fn emit(&self, line: &LogLine) {
        self.log_line(line);
    }
}

fn print_json<T: Serialize>(event: &T, stderr: bool) {
    if let Ok(json) = serde_json::to_string(event) {
        if stderr {
            eprintln!("{json}");
        } else {
            println!("{json}");
        }
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}

impl<'a> JsonEvent<'a> {
    fn new(event: &'a str, message: &'a str) -> Self {
        Self {
            event,
            message,
            hint: None,
            duration_secs: None,
        }
    }

    fn timed(mut self, duration_secs: Option<f64>) -> Self {
        self.duration_secs = duration_secs;
        self
    }
}

#[derive(Serialize)]
struct JsonLogEvent<'a> {
    event: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
    message: &'a str,
}
