use thiserror::Error;

/// The single failure kind surfaced by weather lookups.
///
/// Network errors, non-success HTTP statuses, malformed bodies and rejected
/// query parameters all end up here; callers are expected to treat them
/// uniformly and only the human-readable reason tells them apart.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("weather lookup for '{query}' failed: {reason}")]
pub struct LookupFailure {
    query: String,
    reason: String,
}

impl LookupFailure {
    pub fn new(query: impl Into<String>, reason: impl Into<String>) -> Self {
        Self { query: query.into(), reason: reason.into() }
    }

    /// The city name or `lat,lon` pair that was queried.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Failures of the location lookup used by "weather here" requests.
///
/// Kept apart from [`LookupFailure`]: the dashboard reports these with their
/// own notice.
#[derive(Debug, Error)]
pub enum LocationError {
    /// The location service could not be reached or answered garbage.
    #[error("location service unavailable: {0}")]
    Unavailable(String),

    /// The service answered but refused to resolve a position.
    #[error("location service could not resolve a position: {0}")]
    Rejected(String),
}

impl LocationError {
    /// Message shown to the user for any location failure.
    pub fn notice(&self) -> &'static str {
        "Unable to retrieve your location"
    }
}
