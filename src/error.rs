//! Error types for bgpstuff client operations

use thiserror::Error;

/// Errors that can occur while talking to the bgpstuff.net API
///
/// A lookup that simply finds nothing is not an error: it returns `Ok(None)`
/// and clears [`Client::exists`](crate::Client::exists).
#[derive(Debug, Error)]
pub enum BgpStuffError {
    /// The address is not a publicly routable IP address
    #[error("{0} is not a public IP address")]
    InvalidIp(String),

    /// The AS number is reserved, private or otherwise not publicly routable
    #[error("{0} is not a valid ASN")]
    InvalidAsn(String),

    /// The server answered with a non-success HTTP status
    ///
    /// The status code is also recorded on the client and can be read back
    /// through [`Client::status_code`](crate::Client::status_code).
    #[error("HTTP {code}: {reason}")]
    Status {
        /// Numeric HTTP status code
        code: u16,
        /// Canonical reason phrase (e.g. "Not Found")
        reason: String,
    },

    /// The HTTP request could not be completed
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The HTTP request timed out
    #[error("Request timed out")]
    Timeout,

    /// The response body could not be decoded
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// `invalids()` was called before the table was loaded
    #[error("call get_invalids() before calling invalids()")]
    InvalidsNotLoaded,

    /// Invalid configuration provided
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for BgpStuffError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            BgpStuffError::Timeout
        } else if e.is_decode() {
            BgpStuffError::Decode(e.to_string())
        } else {
            BgpStuffError::Http(e.to_string())
        }
    }
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, BgpStuffError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let errors = vec![
            BgpStuffError::InvalidIp("10.0.0.1".to_string()),
            BgpStuffError::InvalidAsn("64512".to_string()),
            BgpStuffError::Status {
                code: 404,
                reason: "Not Found".to_string(),
            },
            BgpStuffError::Http("connection refused".to_string()),
            BgpStuffError::Timeout,
            BgpStuffError::Decode("missing field".to_string()),
            BgpStuffError::InvalidsNotLoaded,
            BgpStuffError::Config("empty base url".to_string()),
        ];

        for error in errors {
            let error_str = error.to_string();
            assert!(!error_str.is_empty());

            match error {
                BgpStuffError::InvalidIp(ip) => assert!(error_str.contains(&ip)),
                BgpStuffError::InvalidAsn(asn) => assert!(error_str.contains(&asn)),
                BgpStuffError::Status { code, reason } => {
                    assert!(error_str.contains(&code.to_string()));
                    assert!(error_str.contains(&reason));
                }
                BgpStuffError::Http(msg) => assert!(error_str.contains(&msg)),
                BgpStuffError::Timeout => assert!(error_str.contains("timed out")),
                BgpStuffError::Decode(msg) => assert!(error_str.contains(&msg)),
                BgpStuffError::InvalidsNotLoaded => {
                    assert!(error_str.contains("get_invalids()"))
                }
                BgpStuffError::Config(msg) => assert!(error_str.contains(&msg)),
            }
        }
    }
}
