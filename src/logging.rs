use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// One JSON object per line on stderr.
#[derive(Clone, Debug, Serialize)]
pub struct StructuredLogLine {
    #[serde(rename = "timestampMs")]
    pub timestamp_ms: u64,
    pub level: LogLevel,
    pub event: String,
    #[serde(rename = "runId", skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iteration: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turn: Option<u64>,
    pub details: Value,
}

impl StructuredLogLine {
    pub fn new(level: LogLevel, event: &str, details: Value) -> Self {
        Self {
            timestamp_ms: now_ms(),
            level,
            event: event.to_string(),
            run_id: None,
            iteration: None,
            turn: None,
            details,
        }
    }

    pub fn run_id(mut self, run_id: &str) -> Self {
        self.run_id = Some(run_id.to_string());
        self
    }

    pub fn at(mut self, iteration: u64, turn: u64) -> Self {
        self.iteration = Some(iteration);
        self.turn = Some(turn);
        self
    }

    pub fn emit(&self) {
        match serde_json::to_string(self) {
            Ok(text) => eprintln!("{text}"),
            Err(error) => eprintln!("[log] failed to serialize {}: {error}", self.event),
        }
    }
}

pub fn emit_log(level: LogLevel, event: &str, details: Value) {
    StructuredLogLine::new(level, event, details).emit();
}

pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
