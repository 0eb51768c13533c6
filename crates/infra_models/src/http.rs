//! Shared reqwest plumbing for the model adapters

use core_kernel::PortError;
use std::time::Duration;

/// Builds a client with the adapter's bounded request timeout.
pub(crate) fn build_client(timeout_secs: u64) -> Result<reqwest::Client, PortError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|err| PortError::Internal {
            message: "failed to build HTTP client".to_string(),
            source: Some(Box::new(err)),
        })
}

/// Maps a transport failure onto the unified port error taxonomy.
pub(crate) fn request_error(
    operation: &str,
    timeout_secs: u64,
    err: reqwest::Error,
) -> PortError {
    if err.is_timeout() {
        PortError::timeout(operation, timeout_secs * 1000)
    } else if err.is_connect() {
        PortError::Connection {
            message: format!("{operation}: {err}"),
            source: Some(Box::new(err)),
        }
    } else {
        PortError::Internal {
            message: format!("{operation}: {err}"),
            source: Some(Box::new(err)),
        }
    }
}

/// Converts a non-2xx response into a port error.
pub(crate) fn status_error(service: &str, status: reqwest::StatusCode) -> PortError {
    if status.is_server_error() {
        PortError::ServiceUnavailable {
            service: service.to_string(),
        }
    } else {
        PortError::internal(format!("{service} returned {status}"))
    }
}
