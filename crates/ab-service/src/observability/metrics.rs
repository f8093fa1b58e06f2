//! Metrics definitions for the authentication bridge
//!
//! All metrics follow Prometheus naming conventions:
//! - `ab_` prefix for Auth Bridge
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded to prevent cardinality explosion:
//! - `operation`: authenticate, test_connection, sync_users
//! - `outcome`: success, invalid_credential, directory_unavailable, protocol_error
//! - `status`: success, error
//! - `reason`: token rejection reasons (5 values) or `none`
//! - `error_category`: authentication, token, internal
//! - `path`: known routes, everything else collapses to `/other`

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize Prometheus metrics recorder and return the handle
/// for serving metrics via HTTP.
///
/// Must be called before any metrics are recorded.
///
/// # Errors
///
/// Returns error if Prometheus recorder fails to install (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        // Directory round trips: LAN latency up to the operation timeout
        .set_buckets_for_metric(
            Matcher::Prefix("ab_directory_operation".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000, 2.500, 5.000, 10.000,
            ],
        )
        .map_err(|e| format!("Failed to set directory operation buckets: {e}"))?
        .set_buckets_for_metric(
            Matcher::Prefix("ab_http_request".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.200, 0.500, 1.000, 2.000, 5.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// Directory Metrics
// ============================================================================

/// Record a directory operation
///
/// Metric: `ab_directory_operation_duration_seconds`, `ab_directory_operations_total`
/// Labels: `operation`, `outcome`
pub fn record_directory_operation(operation: &str, outcome: &str, duration: Duration) {
    histogram!("ab_directory_operation_duration_seconds", "operation" => operation.to_string())
        .record(duration.as_secs_f64());

    counter!("ab_directory_operations_total",
        "operation" => operation.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

// ============================================================================
// Token Metrics
// ============================================================================

/// Metric: `ab_token_issuance_total`
/// Labels: `status`
pub fn record_token_issuance(status: &str) {
    counter!("ab_token_issuance_total", "status" => status.to_string()).increment(1);
}

/// Record token validation result
///
/// Metric: `ab_token_validations_total`
/// Labels: `status`, `reason`
pub fn record_token_validation(status: &str, reason: Option<&str>) {
    let reason = reason.unwrap_or("none");
    counter!("ab_token_validations_total", "status" => status.to_string(), "reason" => reason.to_string())
        .increment(1);
}

// ============================================================================
// Login Metrics
// ============================================================================

/// Metric: `ab_logins_total`
/// Labels: `status` (success, rejected, invalid_request, error)
pub fn record_login(status: &str) {
    counter!("ab_logins_total", "status" => status.to_string()).increment(1);
}

// ============================================================================
// Error Metrics
// ============================================================================

/// Record error by category
///
/// Metric: `ab_errors_total`
/// Labels: `operation`, `error_category`, `status_code`
pub fn record_error(operation: &str, error_category: &str, status_code: u16) {
    counter!("ab_errors_total",
        "operation" => operation.to_string(),
        "error_category" => error_category.to_string(),
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion
///
/// Metric: `ab_http_requests_total`, `ab_http_request_duration_seconds`
/// Labels: `method`, `path`, `status_code`
pub fn record_http_request(method: &str, path: &str, status_code: u16, duration: Duration) {
    let normalized_path = normalize_path(path);

    histogram!("ab_http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => normalized_path.to_string(),
        "status_code" => status_code.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("ab_http_requests_total",
        "method" => method.to_string(),
        "path" => normalized_path.to_string(),
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

/// Keep known routes, collapse everything else to `/other`.
fn normalize_path(path: &str) -> &'static str {
    match path {
        "/health" => "/health",
        "/metrics" => "/metrics",
        "/api/auth/login" => "/api/auth/login",
        "/api/auth/validate" => "/api/auth/validate",
        "/api/auth/me" => "/api/auth/me",
        "/api/test/ldap-connection" => "/api/test/ldap-connection",
        "/api/test/sync-users" => "/api/test/sync-users",
        "/api/test/authenticate" => "/api/test/authenticate",
        _ => "/other",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use metrics_util::debugging::{DebugValue, DebuggingRecorder};

    /// Collect `(name, labels, value)` for every counter recorded by `f`.
    fn counters_recorded_by(f: impl FnOnce()) -> Vec<(String, Vec<(String, String)>, u64)> {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();
        metrics::with_local_recorder(&recorder, f);

        snapshotter
            .snapshot()
            .into_vec()
            .into_iter()
            .filter_map(|(key, _, _, value)| match value {
                DebugValue::Counter(n) => {
                    let key = key.key();
                    let labels = key
                        .labels()
                        .map(|l| (l.key().to_string(), l.value().to_string()))
                        .collect();
                    Some((key.name().to_string(), labels, n))
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_normalize_path_known_routes() {
        assert_eq!(normalize_path("/api/auth/login"), "/api/auth/login");
        assert_eq!(normalize_path("/health"), "/health");
        assert_eq!(normalize_path("/api/test/sync-users"), "/api/test/sync-users");
    }

    #[test]
    fn test_normalize_path_unknown_collapses() {
        assert_eq!(normalize_path("/api/auth/login/extra"), "/other");
        assert_eq!(normalize_path("/uid=alice"), "/other");
        assert_eq!(normalize_path(""), "/other");
    }

    #[test]
    fn test_token_validation_labels() {
        let counters = counters_recorded_by(|| {
            record_token_validation("error", Some("expired"));
            record_token_validation("success", None);
        });

        assert!(counters.contains(&(
            "ab_token_validations_total".to_string(),
            vec![
                ("status".to_string(), "error".to_string()),
                ("reason".to_string(), "expired".to_string())
            ],
            1
        )));
        assert!(counters.contains(&(
            "ab_token_validations_total".to_string(),
            vec![
                ("status".to_string(), "success".to_string()),
                ("reason".to_string(), "none".to_string())
            ],
            1
        )));
    }

    #[test]
    fn test_directory_operation_counter() {
        let counters = counters_recorded_by(|| {
            record_directory_operation("authenticate", "invalid_credential", Duration::from_millis(5));
            record_directory_operation("authenticate", "invalid_credential", Duration::from_millis(7));
        });

        let (_, _, count) = counters
            .iter()
            .find(|(name, _, _)| name == "ab_directory_operations_total")
            .expect("counter recorded");
        assert_eq!(*count, 2);
    }

    #[test]
    fn test_record_functions_without_recorder() {
        // No recorder installed: the facade drops these silently.
        record_token_issuance("success");
        record_login("rejected");
        record_http_request("POST", "/api/auth/login", 401, Duration::from_millis(12));
    }
}
