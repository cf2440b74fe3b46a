//! General-purpose middleware for the API.
//!
//! Currently holds the `Host` header allow-list check applied to every route.

use crate::config::ServerConfig;
use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    http::header::HOST,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::warn;

/// Hosts accepted in debug mode when none are configured
const DEBUG_HOSTS: &[&str] = &[".localhost", "127.0.0.1", "[::1]"];

/// Allow-list of `Host` header values
///
/// Patterns: `*` matches anything, a leading dot (`.example.com`) matches the
/// domain and all its subdomains, anything else must match exactly.
#[derive(Debug, Clone)]
pub struct AllowedHosts {
    patterns: Vec<String>,
}

impl AllowedHosts {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| p.as_ref().trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        if config.allowed_hosts.is_empty() && config.debug {
            Self::new(DEBUG_HOSTS)
        } else {
            Self::new(&config.allowed_hosts)
        }
    }

    /// Check a raw `Host` header value (port allowed)
    pub fn is_allowed(&self, host: &str) -> bool {
        let domain = strip_port(host).trim_end_matches('.').to_lowercase();
        if domain.is_empty() {
            return false;
        }
        self.patterns.iter().any(|pattern| {
            if pattern == "*" {
                true
            } else if let Some(suffix) = pattern.strip_prefix('.') {
                domain == suffix || domain.ends_with(pattern.as_str())
            } else {
                domain == *pattern
            }
        })
    }
}

/// `example.com:8000` -> `example.com`, `[::1]:8000` -> `[::1]`
fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }
    match host.rsplit_once(':') {
        Some((domain, port)) if port.chars().all(|c| c.is_ascii_digit()) => domain,
        _ => host,
    }
}

/// Reject requests whose `Host` is not on the allow-list
///
/// Requests carrying no host at all are passed through.
pub async fn validate_host(
    State(allowed): State<Arc<AllowedHosts>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let host = request
        .headers()
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .or_else(|| request.uri().authority().map(|a| a.as_str().to_string()));

    if let Some(host) = host {
        if !allowed.is_allowed(&host) {
            warn!(host = %host, "Rejected request with disallowed Host header");
            return Err(ApiError::BadRequest("Invalid HTTP_HOST header".to_string()));
        }
    }

    Ok(next.run(request).await)
}
