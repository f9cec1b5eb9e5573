//! Error classification for the GitHub remote boundary.
//!
//! Converts octocrab errors into [`SpyglassError`] values, preserving HTTP
//! status information so callers can distinguish rate limiting and
//! authentication failures from ordinary API errors.

use std::time::Duration;

use crate::error::SpyglassError;

/// Fallback wait when GitHub rate-limits without a usable retry hint.
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Convert an octocrab error into the crate error taxonomy.
pub fn classify_github_error(error: &octocrab::Error) -> SpyglassError {
    if is_rate_limited(error) {
        return SpyglassError::RateLimited(retry_after(error).as_secs());
    }
    if let Some(status) = status_code(error)
        && status == http::StatusCode::UNAUTHORIZED
    {
        return SpyglassError::Auth(build_error_message(error));
    }
    SpyglassError::Api(build_error_message(error))
}

/// Build a detailed message from an octocrab error, including the
/// structured error list and documentation link GitHub attaches.
pub fn build_error_message(error: &octocrab::Error) -> String {
    match error {
        octocrab::Error::GitHub { source, .. } => {
            let status = source.status_code;
            let status_text = status.canonical_reason().unwrap_or("Unknown");
            let mut message = format!(
                "GitHub API error ({} {}): {}",
                status.as_u16(),
                status_text,
                source.message
            );

            if let Some(errors) = &source.errors
                && !errors.is_empty()
            {
                message.push_str("\n\nErrors:");
                for error in errors {
                    message.push_str(&format!("\n- {error}"));
                }
            }

            if let Some(doc_url) = &source.documentation_url {
                message.push_str(&format!("\n\nDocumentation URL: {doc_url}"));
            }

            message
        }
        octocrab::Error::Http { source, .. } => format!("HTTP error: {source}"),
        octocrab::Error::Serde { source, .. } => format!("Serialization error: {source}"),
        octocrab::Error::Json { source, .. } => {
            format!("JSON error in {}: {}", source.path(), source.inner())
        }
        _ => format!("GitHub API error: {error}"),
    }
}

/// Whether the error indicates rate limiting (403 or 429 status).
pub fn is_rate_limited(error: &octocrab::Error) -> bool {
    if let Some(status) = status_code(error) {
        let status = status.as_u16();
        return status == 403 || status == 429;
    }

    let message = error.to_string().to_lowercase();
    message.contains("rate limit")
}

/// Wait duration before retrying a rate-limited call.
pub fn retry_after(_error: &octocrab::Error) -> Duration {
    // GitHub's secondary rate limit responses carry a Retry-After header,
    // but octocrab does not surface it on the typed error.
    DEFAULT_RETRY_AFTER
}

/// HTTP status code from an octocrab error, if available.
pub fn status_code(error: &octocrab::Error) -> Option<http::StatusCode> {
    if let octocrab::Error::GitHub { source, .. } = error {
        return Some(source.status_code);
    }
    None
}
