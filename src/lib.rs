//! bgpstuff - A rate-limited client for the bgpstuff.net BGP lookup API
//!
//! This library wraps the bgpstuff.net REST endpoints (route, origin, AS path,
//! ROA, AS names, sourced prefixes, VRPs, totals and ROA invalids) behind a
//! client that keeps itself under the server's request quota.
//!
//! ```no_run
//! use bgpstuff::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new()?;
//!
//!     let totals = client.get_totals().await?;
//!     println!("{} IPv4 and {} IPv6 prefixes", totals.ipv4, totals.ipv6);
//!
//!     if let Some(name) = client.get_as_name(15169).await? {
//!         println!("AS15169 is {name}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod bogons;
pub mod client;
pub mod config;
pub mod error;
pub mod rate_limit;

// Re-export core types for library users
pub use api::{AsPath, RoaStatus, Totals, Vrp};
pub use client::{parse_public_asn, parse_public_ip, Client};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{BgpStuffError, Result};
pub use rate_limit::{RateLimiter, RateLimiterStats};
