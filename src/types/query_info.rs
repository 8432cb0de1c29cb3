use std::time::Duration;

/// Audit record of a single outbound HTTP call.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryInfo {
    pub chain: String,
    pub url: String,
    pub success: bool,
    pub duration: Duration,
}

impl QueryInfo {
    pub fn new(chain: &str, url: &str) -> Self {
        QueryInfo {
            chain: chain.to_owned(),
            url: url.to_owned(),
            success: false,
            duration: Duration::ZERO,
        }
    }
}
