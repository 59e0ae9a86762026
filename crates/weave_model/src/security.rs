//! Security group ingress rules.

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::attribute::Protocol;
use crate::error::{ModelError, ModelResult};

/// Every IPv4 address.
pub const ANY_IPV4: &str = "0.0.0.0/0";

/// Traffic a security group lets in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngressRule {
    pub port: u16,
    #[serde(default = "default_protocol")]
    pub protocol: Protocol,
    /// CIDR block the traffic may come from.
    #[serde(default = "any_ipv4")]
    pub source: String,
}

fn default_protocol() -> Protocol {
    Protocol::Tcp
}

fn any_ipv4() -> String {
    ANY_IPV4.to_string()
}

impl IngressRule {
    /// TCP on `port` from anywhere.
    pub fn tcp(port: u16) -> Self {
        Self {
            port,
            protocol: Protocol::Tcp,
            source: any_ipv4(),
        }
    }

    pub fn from_source(mut self, cidr: impl Into<String>) -> Self {
        self.source = cidr.into();
        self
    }
}

pub(crate) fn validate_ingress(group: &str, rules: &[IngressRule]) -> ModelResult<()> {
    for rule in rules {
        if rule.port == 0 {
            return Err(ModelError::invalid(group, "ingress port must be within 1-65535, got 0"));
        }
        if !matches!(rule.protocol, Protocol::Tcp | Protocol::Udp) {
            return Err(ModelError::invalid(
                group,
                format!("ingress rules open TCP or UDP ports, not {}", rule.protocol),
            ));
        }
        if !is_ipv4_cidr(&rule.source) {
            return Err(ModelError::invalid(
                group,
                format!("ingress source '{}' is not an IPv4 CIDR block", rule.source),
            ));
        }
    }
    Ok(())
}

fn is_ipv4_cidr(s: &str) -> bool {
    match s.split_once('/') {
        Some((address, prefix)) => {
            address.parse::<Ipv4Addr>().is_ok() && prefix.parse::<u8>().map_or(false, |p| p <= 32)
        }
        None => false,
    }
}
