//! Typed configuration attribute values.
//!
//! Attributes are declared as plain YAML/TOML scalars. Strings that look like
//! durations (`30s`, `500ms`, `5m`, `1h`) or upper-case protocol names
//! (`HTTP`, `TCP`, ...) are classified into their typed variants on load, so
//! a declaration file never needs explicit type tags.

use std::fmt;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Network protocol spoken on a port, listener or target group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    Http,
    Https,
    Tcp,
    Tls,
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "HTTP",
            Protocol::Https => "HTTPS",
            Protocol::Tcp => "TCP",
            Protocol::Tls => "TLS",
            Protocol::Udp => "UDP",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "HTTP" => Some(Protocol::Http),
            "HTTPS" => Some(Protocol::Https),
            "TCP" => Some(Protocol::Tcp),
            "TLS" => Some(Protocol::Tls),
            "UDP" => Some(Protocol::Udp),
            _ => None,
        }
    }

    /// Application-layer (Layer-7) protocol.
    pub fn is_layer7(&self) -> bool {
        matches!(self, Protocol::Http | Protocol::Https)
    }

    /// Whether traffic emitted as `self` can be accepted by a hop speaking `downstream`.
    ///
    /// Layer-7 traffic rides a Layer-4 TCP hop unchanged, and HTTPS rides TLS.
    /// Nothing upgrades Layer-4 traffic back to Layer-7, and UDP only feeds UDP.
    pub fn feeds(&self, downstream: Protocol) -> bool {
        use Protocol::*;
        match (*self, downstream) {
            (a, b) if a == b => true,
            (Http | Https | Tls, Tcp) => true,
            (Https, Tls) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Load balancer / listener flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListenerKind {
    /// Layer-4 network balancer (TCP/UDP/TLS passthrough).
    Network,
    /// Layer-7 application balancer (HTTP/HTTPS).
    Application,
}

impl ListenerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListenerKind::Network => "network",
            ListenerKind::Application => "application",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "network" | "nlb" => Some(ListenerKind::Network),
            "application" | "alb" => Some(ListenerKind::Application),
            _ => None,
        }
    }

    /// Protocols a listener of this kind may declare.
    pub fn allowed_protocols(&self) -> &'static [Protocol] {
        match self {
            ListenerKind::Network => &[Protocol::Tcp, Protocol::Tls, Protocol::Udp],
            ListenerKind::Application => &[Protocol::Http, Protocol::Https],
        }
    }
}

impl fmt::Display for ListenerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single configuration attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawAttribute", into = "RawAttribute")]
pub enum AttributeValue {
    String(String),
    Integer(i64),
    Duration(Duration),
    Protocol(Protocol),
    Boolean(bool),
}

impl AttributeValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            AttributeValue::String(_) => "string",
            AttributeValue::Integer(_) => "integer",
            AttributeValue::Duration(_) => "duration",
            AttributeValue::Protocol(_) => "protocol",
            AttributeValue::Boolean(_) => "boolean",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer value; numeric strings such as a health-check port `"8080"` are accepted.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(i) => Some(*i),
            AttributeValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Duration value; bare integers are read as seconds.
    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            AttributeValue::Duration(d) => Some(*d),
            AttributeValue::Integer(i) if *i >= 0 => Some(Duration::from_secs(*i as u64)),
            _ => None,
        }
    }

    pub fn as_protocol(&self) -> Option<Protocol> {
        match self {
            AttributeValue::Protocol(p) => Some(*p),
            AttributeValue::String(s) => Protocol::from_str(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::String(s) => write!(f, "{}", s),
            AttributeValue::Integer(i) => write!(f, "{}", i),
            AttributeValue::Duration(d) => write!(f, "{}", format_duration(*d)),
            AttributeValue::Protocol(p) => write!(f, "{}", p),
            AttributeValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Integer(value)
    }
}

impl From<Duration> for AttributeValue {
    fn from(value: Duration) -> Self {
        AttributeValue::Duration(value)
    }
}

impl From<Protocol> for AttributeValue {
    fn from(value: Protocol) -> Self {
        AttributeValue::Protocol(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Boolean(value)
    }
}

/// Wire form of an attribute: an untyped scalar.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawAttribute {
    Boolean(bool),
    Integer(i64),
    String(String),
}

impl From<RawAttribute> for AttributeValue {
    fn from(raw: RawAttribute) -> Self {
        match raw {
            RawAttribute::Boolean(b) => AttributeValue::Boolean(b),
            RawAttribute::Integer(i) => AttributeValue::Integer(i),
            RawAttribute::String(s) => classify(s),
        }
    }
}

impl From<AttributeValue> for RawAttribute {
    fn from(value: AttributeValue) -> Self {
        match value {
            AttributeValue::Boolean(b) => RawAttribute::Boolean(b),
            AttributeValue::Integer(i) => RawAttribute::Integer(i),
            AttributeValue::String(s) => RawAttribute::String(s),
            AttributeValue::Duration(d) => RawAttribute::String(format_duration(d)),
            AttributeValue::Protocol(p) => RawAttribute::String(p.as_str().to_string()),
        }
    }
}

fn classify(s: String) -> AttributeValue {
    if let Some(duration) = parse_duration(&s) {
        return AttributeValue::Duration(duration);
    }
    // Only exact upper-case names; "http" as a plain string stays a string.
    if s.chars().all(|c| c.is_ascii_uppercase()) {
        if let Some(protocol) = Protocol::from_str(&s) {
            return AttributeValue::Protocol(protocol);
        }
    }
    AttributeValue::String(s)
}

/// Parse `500ms`, `30s`, `5m` or `1h`. Amounts that overflow are not durations.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let re = Regex::new(r"^(\d+)(ms|s|m|h)$").ok()?;
    let caps = re.captures(s.trim())?;
    let amount: u64 = caps[1].parse().ok()?;
    match &caps[2] {
        "ms" => Some(Duration::from_millis(amount)),
        "s" => Some(Duration::from_secs(amount)),
        "m" => amount.checked_mul(60).map(Duration::from_secs),
        "h" => amount.checked_mul(3600).map(Duration::from_secs),
        _ => None,
    }
}

pub fn format_duration(d: Duration) -> String {
    if d.subsec_nanos() != 0 {
        format!("{}ms", d.as_millis())
    } else {
        format!("{}s", d.as_secs())
    }
}
