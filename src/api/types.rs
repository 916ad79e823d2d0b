//! Result types returned by client lookups

use ipnet::IpNet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// AS path towards a prefix, as seen by the bgpstuff.net collector
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsPath {
    /// Ordered AS_SEQUENCE, origin AS last
    pub path: Vec<u32>,
    /// Unordered AS_SET appended by aggregation, usually empty
    pub set: Vec<u32>,
}

impl AsPath {
    /// Origin AS of the path, if any
    ///
    /// When the path ends in an AS_SET the origin is ambiguous and the last
    /// AS of the sequence is returned.
    pub fn origin(&self) -> Option<u32> {
        self.path.last().copied()
    }

    /// Number of ASes in the sequence
    pub fn len(&self) -> usize {
        self.path.len()
    }

    /// Whether the sequence is empty
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }
}

impl fmt::Display for AsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self
            .path
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        write!(f, "{path}")?;

        if !self.set.is_empty() {
            let set = self
                .set
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(" ");
            write!(f, " {{ {set} }}")?;
        }
        Ok(())
    }
}

/// RPKI validation state of the route covering an address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoaStatus {
    /// A ROA covers the route and matches its origin and length
    Valid,
    /// A ROA covers the route but the origin or length does not match
    Invalid,
    /// No ROA covers the route
    Unknown,
    /// Any other state reported by the server
    Other(String),
}

impl RoaStatus {
    /// Map the server's textual state onto a status
    pub fn from_wire(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "VALID" => RoaStatus::Valid,
            "INVALID" => RoaStatus::Invalid,
            "UNKNOWN" | "NOTFOUND" | "NOT FOUND" => RoaStatus::Unknown,
            _ => RoaStatus::Other(value.trim().to_string()),
        }
    }
}

impl fmt::Display for RoaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoaStatus::Valid => write!(f, "VALID"),
            RoaStatus::Invalid => write!(f, "INVALID"),
            RoaStatus::Unknown => write!(f, "UNKNOWN"),
            RoaStatus::Other(s) => write!(f, "{s}"),
        }
    }
}

/// Number of prefixes in the collector's table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// IPv4 prefix count
    pub ipv4: u64,
    /// IPv6 prefix count
    pub ipv6: u64,
}

/// Validated ROA Payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vrp {
    /// Authorised prefix
    pub prefix: IpNet,
    /// Longest prefix length the origin may announce
    pub max_length: u8,
}
