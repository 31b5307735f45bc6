// posetrack_core/src/diagnostics.rs

/// The contract for anything that accepts advisory diagnostic lines from the
/// tracking core (e.g. "a sample was dropped"). Lines are plain text and
/// never indicate a fatal condition.
pub trait DiagnosticSink {
    fn log_line(&mut self, line: &str);
}

/// Forwards every line to `tracing` at warn level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn log_line(&mut self, line: &str) {
        tracing::warn!(target: "posetrack::diagnostics", "{}", line);
    }
}

/// Keeps every line in memory, for hosts that surface them later and for tests.
#[derive(Debug, Default, Clone)]
pub struct RecordingDiagnostics {
    lines: Vec<String>,
}

impl RecordingDiagnostics {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl DiagnosticSink for RecordingDiagnostics {
    fn log_line(&mut self, line: &str) {
        self.lines.push(line.to_owned());
    }
}
