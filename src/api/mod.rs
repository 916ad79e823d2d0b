//! bgpstuff.net wire format and lookup result types

pub mod types;
pub mod wire;

pub use types::{AsPath, RoaStatus, Totals, Vrp};
