//! Rate-limited client for the bgpstuff.net REST API
//!
//! The client holds its own [`RateLimiter`]. Clones share the limiter and the
//! response state, so reuse one client (or clones of it) for every query.
//! A fresh client per query starts with an empty window and will not stay
//! under the server's quota.

pub mod state;

use crate::api::wire::{parse_prefix, parse_prefixes, Envelope, Numeric, ResponseBody};
use crate::api::{AsPath, RoaStatus, Totals, Vrp};
use crate::bogons::{is_public_asn, is_public_ip};
use crate::config::ClientConfig;
use crate::error::{BgpStuffError, Result};
use crate::rate_limit::RateLimiter;
use ipnet::IpNet;
use log::{debug, info};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use state::ClientState;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Client for the bgpstuff.net REST API
///
/// # Examples
///
/// ```no_run
/// use bgpstuff::Client;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = Client::new()?;
///
///     match client.get_route("8.8.8.8".parse()?).await? {
///         Some(route) => println!("The route for 8.8.8.8 is {route}"),
///         None => println!("route does not exist for 8.8.8.8"),
///     }
///     println!("status: {:?}", client.status());
///     Ok(())
/// }
/// ```
#[derive(Clone, Debug)]
pub struct Client {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
    limiter: Arc<RateLimiter>,
    state: Arc<RwLock<ClientState>>,
}

impl Client {
    /// Create a client for the default instance with the default quota
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a client from a configuration
    ///
    /// The client gets a limiter of its own, sized from the configuration.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let limiter = RateLimiter::from_config(&config)?;
        Self::with_rate_limiter(config, Arc::new(limiter))
    }

    /// Create a client that draws from an existing limiter
    ///
    /// Every client built from the same `Arc` shares one quota. The rate-limit
    /// fields of `config` are ignored.
    pub fn with_rate_limiter(config: ClientConfig, limiter: Arc<RateLimiter>) -> Result<Self> {
        config.validate().map_err(BgpStuffError::Config)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| BgpStuffError::Http(e.to_string()))?;

        Ok(Self {
            http,
            config: Arc::new(config),
            limiter,
            state: Arc::new(RwLock::new(ClientState::default())),
        })
    }

    /// Configuration the client was built with
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Limiter guarding this client's requests
    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// HTTP status code of the last request, `None` before the first one
    pub fn status_code(&self) -> Option<u16> {
        self.read_state().status_code
    }

    /// Reason phrase of the last status code (e.g. "OK")
    pub fn status(&self) -> Option<&'static str> {
        self.read_state().status()
    }

    /// Whether the last lookup found its object
    pub fn exists(&self) -> bool {
        self.read_state().exists
    }

    /// Server-side identifier of the last response
    pub fn request_id(&self) -> Option<String> {
        self.read_state().request_id.clone()
    }

    /// Gets the route covering the given IP address
    ///
    /// Returns `None` if the address is not covered by any route.
    pub async fn get_route(&self, ip: IpAddr) -> Result<Option<IpNet>> {
        check_ip(&ip)?;
        let body = self.request(&format!("route/{ip}")).await?;
        if !body.found() {
            return Ok(None);
        }

        match body.route.as_deref().map(str::trim) {
            // The collector reports a zero-length placeholder when nothing covers the address
            None | Some("") | Some("/0") => {
                self.write_state().exists = false;
                Ok(None)
            }
            Some(route) => parse_prefix(route).map(Some),
        }
    }

    /// Gets the origin AS of the route covering the given IP address
    pub async fn get_origin(&self, ip: IpAddr) -> Result<Option<u32>> {
        check_ip(&ip)?;
        let body = self.request(&format!("origin/{ip}")).await?;
        if !body.found() {
            return Ok(None);
        }

        body.origin.as_ref().map(Numeric::to_asn).transpose()
    }

    /// Gets the AS path towards the given IP address
    pub async fn get_as_path(&self, ip: IpAddr) -> Result<Option<AsPath>> {
        check_ip(&ip)?;
        let body = self.request(&format!("aspath/{ip}")).await?;
        if !body.found() {
            return Ok(None);
        }

        let path = body
            .as_path
            .unwrap_or_default()
            .iter()
            .map(Numeric::to_asn)
            .collect::<Result<Vec<_>>>()?;
        let set = body
            .as_set
            .unwrap_or_default()
            .iter()
            .map(Numeric::to_asn)
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(AsPath { path, set }))
    }

    /// Gets the RPKI state of the route covering the given IP address
    pub async fn get_roa(&self, ip: IpAddr) -> Result<Option<RoaStatus>> {
        check_ip(&ip)?;
        let body = self.request(&format!("roa/{ip}")).await?;
        if !body.found() {
            return Ok(None);
        }

        Ok(body.roa.as_deref().map(RoaStatus::from_wire))
    }

    /// Gets the registered name of an AS
    ///
    /// Once [`get_as_names`](Self::get_as_names) has loaded the full table,
    /// names are answered locally without a request or a rate-limit slot.
    pub async fn get_as_name(&self, asn: u32) -> Result<Option<String>> {
        check_asn(asn)?;

        {
            let mut state = self.write_state();
            if let Some(names) = &state.as_names {
                let name = names.get(&asn).cloned();
                state.status_code = Some(200);
                state.request_id = None;
                state.exists = name.is_some();
                debug!("answered AS{asn} name from the local table");
                return Ok(name);
            }
        }

        let body = self.request(&format!("asname/{asn}")).await?;
        if !body.found() {
            return Ok(None);
        }

        Ok(body.as_name)
    }

    /// Gets the prefixes originated by an AS
    pub async fn get_sourced_prefixes(&self, asn: u32) -> Result<Option<Vec<IpNet>>> {
        check_asn(asn)?;
        let body = self.request(&format!("sourced/{asn}")).await?;
        if !body.found() {
            return Ok(None);
        }

        let prefixes = body
            .sourced
            .and_then(|s| s.prefixes)
            .unwrap_or_default();
        parse_prefixes(&prefixes).map(Some)
    }

    /// Gets the Validated ROA Payloads authorising an AS
    pub async fn get_vrps(&self, asn: u32) -> Result<Option<Vec<Vrp>>> {
        check_asn(asn)?;
        let body = self.request(&format!("vrps/{asn}")).await?;
        if !body.found() {
            return Ok(None);
        }

        body.vrps
            .unwrap_or_default()
            .iter()
            .map(|entry| -> Result<Vrp> {
                let prefix = parse_prefix(&entry.prefix)?;
                let max = entry.max.to_u64()?;
                let max_length = u8::try_from(max).map_err(|_| {
                    BgpStuffError::Decode(format!("max length out of range: {max}"))
                })?;
                Ok(Vrp { prefix, max_length })
            })
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    /// Gets the number of IPv4 and IPv6 prefixes seen by the collector
    pub async fn get_totals(&self) -> Result<Totals> {
        let body = self.request("totals").await?;
        let totals = body
            .totals
            .ok_or_else(|| BgpStuffError::Decode("response has no Totals".to_string()))?;

        Ok(Totals {
            ipv4: totals.ipv4.to_u64()?,
            ipv6: totals.ipv6.to_u64()?,
        })
    }

    /// Loads every ROA-invalid prefix seen by the collector
    ///
    /// The table replaces any previously loaded one and is queried with
    /// [`invalids`](Self::invalids). Returns the number of ASNs it holds.
    pub async fn get_invalids(&self) -> Result<usize> {
        let body = self.request("invalids/").await?;

        let mut table: HashMap<u32, Vec<IpNet>> = HashMap::new();
        for entry in body.invalids.unwrap_or_default() {
            let asn = entry.asn.to_asn()?;
            let prefixes = parse_prefixes(&entry.prefixes.unwrap_or_default())?;
            table.entry(asn).or_default().extend(prefixes);
        }

        let count = table.len();
        info!("loaded ROA-invalid prefixes for {count} ASNs");
        self.write_state().invalids = Some(table);
        Ok(count)
    }

    /// ROA-invalid prefixes originated by an AS
    ///
    /// Returns [`BgpStuffError::InvalidsNotLoaded`] until
    /// [`get_invalids`](Self::get_invalids) has succeeded, and `None` for an
    /// AS that originates no invalid prefix.
    pub fn invalids(&self, asn: u32) -> Result<Option<Vec<IpNet>>> {
        let state = self.read_state();
        let table = state
            .invalids
            .as_ref()
            .ok_or(BgpStuffError::InvalidsNotLoaded)?;
        Ok(table.get(&asn).cloned())
    }

    /// Snapshot of the loaded ROA-invalid table
    pub fn all_invalids(&self) -> Option<HashMap<u32, Vec<IpNet>>> {
        self.read_state().invalids.clone()
    }

    /// Loads the full ASN to AS-name table
    ///
    /// Subsequent [`get_as_name`](Self::get_as_name) calls are answered from
    /// it. Returns the number of entries loaded.
    pub async fn get_as_names(&self) -> Result<usize> {
        let body = self.request("asnames/").await?;

        let table = body
            .as_names
            .unwrap_or_default()
            .into_iter()
            .map(|entry| -> Result<(u32, String)> {
                Ok((entry.asn.to_asn()?, entry.as_name))
            })
            .collect::<Result<HashMap<_, _>>>()?;

        let count = table.len();
        info!("loaded {count} AS names");
        self.write_state().as_names = Some(table);
        Ok(count)
    }

    /// Snapshot of the loaded AS-name table
    pub fn all_as_names(&self) -> Option<HashMap<u32, String>> {
        self.read_state().as_names.clone()
    }

    /// Forget the loaded AS-name and ROA-invalid tables
    pub fn clear_tables(&self) {
        let mut state = self.write_state();
        state.as_names = None;
        state.invalids = None;
    }

    /// Performs a rate-limited GET against an endpoint and decodes the envelope
    async fn request(&self, endpoint: &str) -> Result<ResponseBody> {
        self.write_state().begin_request();

        let waited = self.limiter.acquire().await;
        if !waited.is_zero() {
            info!("rate limited: waited {waited:?} before requesting /{endpoint}");
        }

        let url = format!("{}/{}", self.config.base_url, endpoint);
        debug!("GET {url}");

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        self.write_state().status_code = Some(status.as_u16());

        if !status.is_success() {
            debug!("GET {url} failed with {status}");
            return Err(BgpStuffError::Status {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let envelope: Envelope = response.json().await?;
        let found = envelope.response.found();

        let mut state = self.write_state();
        state.request_id = envelope.id;
        state.exists = found;
        debug!(
            "GET {url} -> {status} (exists: {found}, id: {:?})",
            state.request_id
        );

        Ok(envelope.response)
    }

    fn read_state(&self) -> RwLockReadGuard<'_, ClientState> {
        self.state.read().expect("client state lock poisoned")
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, ClientState> {
        self.state.write().expect("client state lock poisoned")
    }
}

/// Parse an address typed by a user, rejecting anything not publicly routable
pub fn parse_public_ip(value: &str) -> Result<IpAddr> {
    let ip = value
        .trim()
        .parse::<IpAddr>()
        .map_err(|_| BgpStuffError::InvalidIp(value.to_string()))?;
    check_ip(&ip)?;
    Ok(ip)
}

/// Parse an AS number typed by a user, with or without an "AS" prefix
pub fn parse_public_asn(value: &str) -> Result<u32> {
    let trimmed = value.trim();
    let digits = trimmed
        .strip_prefix("AS")
        .or_else(|| trimmed.strip_prefix("as"))
        .unwrap_or(trimmed);
    let asn = digits
        .parse::<u32>()
        .map_err(|_| BgpStuffError::InvalidAsn(value.to_string()))?;
    check_asn(asn)?;
    Ok(asn)
}

fn check_ip(ip: &IpAddr) -> Result<()> {
    if is_public_ip(ip) {
        Ok(())
    } else {
        Err(BgpStuffError::InvalidIp(ip.to_string()))
    }
}

fn check_asn(asn: u32) -> Result<()> {
    if is_public_asn(asn) {
        Ok(())
    } else {
        Err(BgpStuffError::InvalidAsn(asn.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_client() -> Client {
        let config = ClientConfig::builder()
            .base_url("http://127.0.0.1:9")
            .rate_limit_calls(2)
            .rate_limit_period(Duration::from_secs(60))
            .build()
            .unwrap();
        Client::with_config(config).unwrap()
    }

    #[test]
    fn test_parse_public_ip() {
        assert!(parse_public_ip("8.8.8.8").is_ok());
        assert!(parse_public_ip(" 2600:: ").is_ok());
        assert!(matches!(
            parse_public_ip("10.0.0.0"),
            Err(BgpStuffError::InvalidIp(_))
        ));
        assert!(matches!(
            parse_public_ip("hi"),
            Err(BgpStuffError::InvalidIp(_))
        ));
    }

    #[test]
    fn test_parse_public_asn() {
        assert_eq!(parse_public_asn("15169").unwrap(), 15169);
        assert_eq!(parse_public_asn("AS3356").unwrap(), 3356);
        assert!(matches!(
            parse_public_asn("64512"),
            Err(BgpStuffError::InvalidAsn(ref asn)) if asn == "64512"
        ));
        assert!(matches!(
            parse_public_asn("3049573045"),
            Ok(3_049_573_045)
        ));
        assert!(matches!(
            parse_public_asn("99999999999"),
            Err(BgpStuffError::InvalidAsn(ref asn)) if asn == "99999999999"
        ));
        assert!(parse_public_asn("sup").is_err());
    }

    #[test]
    fn test_new_client_has_no_response() {
        let client = test_client();
        assert_eq!(client.status_code(), None);
        assert_eq!(client.status(), None);
        assert!(!client.exists());
        assert!(client.request_id().is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ClientConfig {
            base_url: String::new(),
            ..ClientConfig::default()
        };
        assert!(matches!(
            Client::with_config(config),
            Err(BgpStuffError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_bogons_rejected_before_rate_limit() {
        let client = test_client();

        let private: IpAddr = "10.0.0.0".parse().unwrap();
        assert!(matches!(
            client.get_route(private).await,
            Err(BgpStuffError::InvalidIp(_))
        ));
        assert!(matches!(
            client.get_origin(private).await,
            Err(BgpStuffError::InvalidIp(_))
        ));
        assert!(matches!(
            client.get_vrps(64512).await,
            Err(BgpStuffError::InvalidAsn(_))
        ));
        assert!(matches!(
            client.get_as_name(0).await,
            Err(BgpStuffError::InvalidAsn(_))
        ));

        // No slot was spent on rejected lookups
        assert_eq!(client.rate_limiter().available().await, 2);
        assert_eq!(client.status_code(), None);
    }

    #[test]
    fn test_invalids_before_loading() {
        let client = test_client();
        assert!(matches!(
            client.invalids(15169),
            Err(BgpStuffError::InvalidsNotLoaded)
        ));
    }

    #[tokio::test]
    async fn test_as_name_from_local_table() {
        let client = test_client();
        client.write_state().as_names =
            Some(HashMap::from([(15169, "GOOGLE".to_string())]));

        let name = client.get_as_name(15169).await.unwrap();
        assert_eq!(name.as_deref(), Some("GOOGLE"));
        assert!(client.exists());
        assert_eq!(client.status_code(), Some(200));

        let missing = client.get_as_name(4_100_000_000).await.unwrap();
        assert!(missing.is_none());
        assert!(!client.exists());
        assert_eq!(client.status_code(), Some(200));

        // Answered locally, no slot spent
        assert_eq!(client.rate_limiter().available().await, 2);

        client.clear_tables();
        assert!(client.all_as_names().is_none());
    }

    #[tokio::test]
    async fn test_clones_share_limiter_and_state() {
        let client = test_client();
        let clone = client.clone();

        assert!(clone.rate_limiter().try_acquire().await);
        assert_eq!(client.rate_limiter().available().await, 1);

        clone.write_state().status_code = Some(404);
        assert_eq!(client.status(), Some("Not Found"));

        // A separately built client has its own window
        let other = test_client();
        assert_eq!(other.rate_limiter().available().await, 2);
    }
}
