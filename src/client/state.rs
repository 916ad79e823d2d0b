//! Mutable state shared by clones of a client

use ipnet::IpNet;
use reqwest::StatusCode;
use std::collections::HashMap;

/// Metadata of the most recent response plus locally loaded tables
#[derive(Debug, Default, Clone)]
pub struct ClientState {
    /// HTTP status of the last request
    pub status_code: Option<u16>,
    /// `ID` of the last response envelope
    pub request_id: Option<String>,
    /// Whether the last lookup found its object
    pub exists: bool,
    /// ASN to name table loaded by `get_as_names`
    pub as_names: Option<HashMap<u32, String>>,
    /// ASN to ROA-invalid prefixes loaded by `get_invalids`
    pub invalids: Option<HashMap<u32, Vec<IpNet>>>,
}

impl ClientState {
    /// Forget the previous response before a new one is recorded
    pub fn begin_request(&mut self) {
        self.exists = false;
        self.request_id = None;
    }

    /// Canonical reason phrase for the last status code
    pub fn status(&self) -> Option<&'static str> {
        self.status_code
            .and_then(|code| StatusCode::from_u16(code).ok())
            .and_then(|status| status.canonical_reason())
    }
}
