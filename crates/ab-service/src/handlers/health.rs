//! Liveness probe.

/// Returns "OK" while the process is serving. Does not touch the
/// directory; use the diagnostics routes for that.
pub async fn health_check() -> &'static str {
    "OK"
}
