//! JSON envelope returned by the bgpstuff.net REST API
//!
//! Every endpoint answers `{"ID": "...", "Response": {...}}`. Only the fields
//! relevant to the endpoint are filled in. Numbers are sometimes sent as
//! decimal strings, so they are decoded through [`Numeric`].

use crate::error::BgpStuffError;
use ipnet::IpNet;
use serde::{Deserialize, Deserializer};

/// Top-level response envelope
#[derive(Debug, Deserialize)]
pub struct Envelope {
    /// Server-side request identifier
    #[serde(rename = "ID", default)]
    pub id: Option<String>,
    /// Endpoint-specific payload
    #[serde(rename = "Response", default)]
    pub response: ResponseBody,
}

/// Payload of the envelope
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResponseBody {
    /// Whether the queried object exists
    ///
    /// `None` only when the field is absent. An explicit `null` decodes as
    /// `false`.
    #[serde(rename = "Exists", deserialize_with = "null_as_false")]
    pub exists: Option<Flag>,
    /// Covering route
    #[serde(rename = "Route")]
    pub route: Option<String>,
    /// Origin AS of the covering route
    #[serde(rename = "Origin")]
    pub origin: Option<Numeric>,
    /// AS_SEQUENCE towards the covering route
    #[serde(rename = "ASPath")]
    pub as_path: Option<Vec<Numeric>>,
    /// AS_SET towards the covering route
    #[serde(rename = "ASSet")]
    pub as_set: Option<Vec<Numeric>>,
    /// RPKI state of the covering route
    #[serde(rename = "ROA")]
    pub roa: Option<String>,
    /// Registered name of an AS
    #[serde(rename = "ASName")]
    pub as_name: Option<String>,
    /// Prefixes originated by an AS
    #[serde(rename = "Sourced")]
    pub sourced: Option<Sourced>,
    /// VRPs for an AS
    #[serde(rename = "VRPs")]
    pub vrps: Option<Vec<VrpEntry>>,
    /// Table totals
    #[serde(rename = "Totals")]
    pub totals: Option<TotalsEntry>,
    /// ROA-invalid prefixes grouped by origin
    #[serde(rename = "Invalids")]
    pub invalids: Option<Vec<InvalidEntry>>,
    /// Every known ASN and its name
    #[serde(rename = "ASNames")]
    pub as_names: Option<Vec<AsNameEntry>>,
}

impl ResponseBody {
    /// Whether the object was found
    ///
    /// Endpoints without an `Exists` field always count as found.
    pub fn found(&self) -> bool {
        self.exists.as_ref().is_none_or(Flag::is_true)
    }
}

fn null_as_false<'de, D>(deserializer: D) -> Result<Option<Flag>, D::Error>
where
    D: Deserializer<'de>,
{
    let flag = Option::<Flag>::deserialize(deserializer)?;
    Ok(Some(flag.unwrap_or(Flag::Bool(false))))
}

/// Boolean sent either as JSON `true` or as the string `"true"`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    /// JSON boolean
    Bool(bool),
    /// Textual boolean
    Text(String),
}

impl Flag {
    /// Interpret the flag
    pub fn is_true(&self) -> bool {
        match self {
            Flag::Bool(b) => *b,
            Flag::Text(s) => s.trim().eq_ignore_ascii_case("true"),
        }
    }
}

/// Unsigned number sent either as a JSON number or a decimal string
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    /// JSON number
    Number(u64),
    /// Decimal string, optionally prefixed with "AS"
    Text(String),
}

impl Numeric {
    /// Decode as u64
    pub fn to_u64(&self) -> Result<u64, BgpStuffError> {
        match self {
            Numeric::Number(n) => Ok(*n),
            Numeric::Text(s) => {
                let trimmed = s.trim();
                let digits = trimmed
                    .strip_prefix("AS")
                    .or_else(|| trimmed.strip_prefix("as"))
                    .unwrap_or(trimmed);
                digits
                    .parse::<u64>()
                    .map_err(|e| BgpStuffError::Decode(format!("{e}: {s:?}")))
            }
        }
    }

    /// Decode as an AS number
    pub fn to_asn(&self) -> Result<u32, BgpStuffError> {
        let value = self.to_u64()?;
        u32::try_from(value)
            .map_err(|_| BgpStuffError::Decode(format!("AS number out of range: {value}")))
    }
}

/// `Sourced` object
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Sourced {
    /// Originated prefixes
    #[serde(rename = "Prefixes")]
    pub prefixes: Option<Vec<String>>,
}

/// Element of `VRPs`
#[derive(Debug, Deserialize)]
pub struct VrpEntry {
    /// Authorised prefix
    #[serde(rename = "Prefix")]
    pub prefix: String,
    /// Maximum length
    #[serde(rename = "Max")]
    pub max: Numeric,
}

/// `Totals` object
#[derive(Debug, Deserialize)]
pub struct TotalsEntry {
    /// IPv4 prefix count
    #[serde(rename = "Ipv4")]
    pub ipv4: Numeric,
    /// IPv6 prefix count
    #[serde(rename = "Ipv6")]
    pub ipv6: Numeric,
}

/// Element of `Invalids`
#[derive(Debug, Deserialize)]
pub struct InvalidEntry {
    /// Originating AS
    #[serde(rename = "ASN")]
    pub asn: Numeric,
    /// ROA-invalid prefixes it originates
    #[serde(rename = "Prefixes", default)]
    pub prefixes: Option<Vec<String>>,
}

/// Element of `ASNames`
#[derive(Debug, Deserialize)]
pub struct AsNameEntry {
    /// AS number
    #[serde(rename = "ASN")]
    pub asn: Numeric,
    /// Registered name
    #[serde(rename = "ASName")]
    pub as_name: String,
}

/// Parse a CIDR prefix sent by the server
pub fn parse_prefix(value: &str) -> Result<IpNet, BgpStuffError> {
    value
        .trim()
        .parse::<IpNet>()
        .map_err(|e| BgpStuffError::Decode(format!("{e}: {value:?}")))
}

/// Parse a list of CIDR prefixes sent by the server
pub fn parse_prefixes(values: &[String]) -> Result<Vec<IpNet>, BgpStuffError> {
    values.iter().map(|v| parse_prefix(v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_route() {
        let body = r#"{"ID":"abc123","Response":{"Exists":true,"Route":"8.8.8.0/24"}}"#;
        let envelope: Envelope = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.id.as_deref(), Some("abc123"));
        assert!(envelope.response.found());
        assert_eq!(envelope.response.route.as_deref(), Some("8.8.8.0/24"));
    }

    #[test]
    fn test_exists_as_string() {
        let body = r#"{"Response":{"Exists":"true"}}"#;
        let envelope: Envelope = serde_json::from_str(body).unwrap();
        assert!(envelope.response.found());

        let body = r#"{"Response":{"Exists":"false"}}"#;
        let envelope: Envelope = serde_json::from_str(body).unwrap();
        assert!(!envelope.response.found());
    }

    #[test]
    fn test_missing_exists_counts_as_found() {
        let body = r#"{"Response":{"Totals":{"Ipv4":"900000","Ipv6":180000}}}"#;
        let envelope: Envelope = serde_json::from_str(body).unwrap();
        assert!(envelope.response.found());

        let totals = envelope.response.totals.unwrap();
        assert_eq!(totals.ipv4.to_u64().unwrap(), 900_000);
        assert_eq!(totals.ipv6.to_u64().unwrap(), 180_000);
    }

    #[test]
    fn test_null_exists_is_not_found() {
        let body = r#"{"ID":"x","Response":{"Exists":null,"Route":"8.8.8.0/24"}}"#;
        let envelope: Envelope = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.response.exists, Some(Flag::Bool(false)));
        assert!(!envelope.response.found());
    }

    #[test]
    fn test_numeric_decoding() {
        assert_eq!(Numeric::Number(15169).to_asn().unwrap(), 15169);
        assert_eq!(Numeric::Text("15169".into()).to_asn().unwrap(), 15169);
        assert_eq!(Numeric::Text("AS3356".into()).to_asn().unwrap(), 3356);
        assert!(Numeric::Text("GOOGLE".into()).to_u64().is_err());
        assert!(Numeric::Number(u64::from(u32::MAX) + 1).to_asn().is_err());
    }

    #[test]
    fn test_null_fields_default() {
        let body = r#"{"Response":{"Exists":true,"ASPath":["3356","15169"],"ASSet":null}}"#;
        let envelope: Envelope = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.response.as_path.map(|p| p.len()), Some(2));
        assert!(envelope.response.as_set.is_none());
    }

    #[test]
    fn test_parse_prefixes() {
        let prefixes = parse_prefixes(&["8.8.4.0/24".to_string(), "2001:4860::/32".to_string()])
            .unwrap();
        assert_eq!(prefixes.len(), 2);
        assert!(parse_prefix("not-a-prefix").is_err());
        assert!(parse_prefix("8.8.8.8").is_err());
    }
}
