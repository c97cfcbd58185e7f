//! Diagnostic reporting for recoverable pipeline conditions

/// Receives human readable messages about conditions the pipeline recovered
/// from, such as a cloud without normals.
pub trait DiagnosticSink: Sync {
    fn report(&self, message: &str);
}

/// Forwards diagnostics to `tracing` as warnings
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, message: &str) {
        tracing::warn!(target: "regfeat", "{message}");
    }
}

/// Drops every message
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSink;

impl DiagnosticSink for SilentSink {
    fn report(&self, _message: &str) {}
}
