//! Access-tier classification from the forwarded client address
//!
//! The gateway runs behind a reverse proxy, so the client address is taken
//! from the first entry of `X-Forwarded-For`. Classification is pure and
//! never fails: unknown or unparsable input simply yields `false`.

use std::net::IpAddr;

use catalogplus_core::AccessTier;

use crate::config::{AccessConfig, AccessRangeConfig, ConfigError};

/// One inclusion or exception entry of an access range
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressPattern {
    /// CIDR block; a single address is a block with a full-length prefix
    Network { addr: IpAddr, prefix_len: u8 },
    /// Textual prefix such as `129.217.` (written `129.217.*` in config)
    Prefix(String),
}

impl AddressPattern {
    pub fn parse(entry: &str) -> Result<Self, ConfigError> {
        let entry = entry.trim();
        let invalid = |reason: &str| ConfigError::InvalidRange {
            entry: entry.to_string(),
            reason: reason.to_string(),
        };

        if let Some((addr, len)) = entry.split_once('/') {
            let addr: IpAddr = addr.parse().map_err(|_| invalid("bad network address"))?;
            let prefix_len: u8 = len.parse().map_err(|_| invalid("bad prefix length"))?;
            if prefix_len > max_prefix_len(&addr) {
                return Err(invalid("prefix length out of range"));
            }
            return Ok(AddressPattern::Network { addr, prefix_len });
        }

        if let Ok(addr) = entry.parse::<IpAddr>() {
            let prefix_len = max_prefix_len(&addr);
            return Ok(AddressPattern::Network { addr, prefix_len });
        }

        let prefix = entry.trim_end_matches('*');
        if prefix.ends_with('.') || prefix.ends_with(':') {
            return Ok(AddressPattern::Prefix(prefix.to_string()));
        }

        Err(invalid("expected address, CIDR block or dotted prefix"))
    }

    pub fn matches(&self, ip: &IpAddr) -> bool {
        match self {
            AddressPattern::Network { addr, prefix_len } => match (addr, ip) {
                (IpAddr::V4(net), IpAddr::V4(ip)) => {
                    let mask = mask_u32(*prefix_len);
                    u32::from(*net) & mask == u32::from(*ip) & mask
                }
                (IpAddr::V6(net), IpAddr::V6(ip)) => {
                    let mask = mask_u128(*prefix_len);
                    u128::from(*net) & mask == u128::from(*ip) & mask
                }
                _ => false,
            },
            AddressPattern::Prefix(prefix) => ip.to_string().starts_with(prefix.as_str()),
        }
    }
}

fn max_prefix_len(addr: &IpAddr) -> u8 {
    match addr {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

fn mask_u32(prefix_len: u8) -> u32 {
    match prefix_len {
        0 => 0,
        n => u32::MAX << (32 - u32::from(n)),
    }
}

fn mask_u128(prefix_len: u8) -> u128 {
    match prefix_len {
        0 => 0,
        n => u128::MAX << (128 - u32::from(n)),
    }
}

/// Inclusion entries minus exception entries
#[derive(Debug, Clone, Default)]
pub struct AccessRange {
    include: Vec<AddressPattern>,
    exclude: Vec<AddressPattern>,
}

impl AccessRange {
    pub fn from_config(config: &AccessRangeConfig) -> Result<Self, ConfigError> {
        let parse_all = |entries: &[String]| {
            entries
                .iter()
                .filter(|e| !e.trim().is_empty())
                .map(|e| AddressPattern::parse(e))
                .collect::<Result<Vec<_>, _>>()
        };

        Ok(Self {
            include: parse_all(&config.ranges)?,
            exclude: parse_all(&config.exceptions)?,
        })
    }

    /// In range iff some inclusion entry matches and no exception entry does
    pub fn contains(&self, ip: &IpAddr) -> bool {
        self.include.iter().any(|p| p.matches(ip)) && !self.exclude.iter().any(|p| p.matches(ip))
    }
}

/// Extract the originating client from an `X-Forwarded-For` chain
/// (`client, proxy1, proxy2`).
pub fn originating_address(chain: &str) -> Option<IpAddr> {
    let first = chain.split(',').next()?.trim();
    let first = first.trim_start_matches('[').trim_end_matches(']');
    first.parse::<IpAddr>().ok().map(|ip| ip.to_canonical())
}

/// Decide whether the client behind `chain` belongs to `range`
pub fn classify(chain: Option<&str>, range: Option<&AccessRange>) -> bool {
    match (chain.and_then(originating_address), range) {
        (Some(ip), Some(range)) => range.contains(&ip),
        _ => false,
    }
}

/// The three configured tiers, evaluated independently
#[derive(Debug, Clone, Default)]
pub struct TierClassifier {
    tu: Option<AccessRange>,
    ub: Option<AccessRange>,
    ub_52b_iba: Option<AccessRange>,
}

impl TierClassifier {
    pub fn from_config(config: &AccessConfig) -> Result<Self, ConfigError> {
        let build = |range: &Option<AccessRangeConfig>| {
            range.as_ref().map(AccessRange::from_config).transpose()
        };

        Ok(Self {
            tu: build(&config.tu)?,
            ub: build(&config.ub)?,
            ub_52b_iba: build(&config.ub_52b_iba)?,
        })
    }

    pub fn classify(&self, chain: Option<&str>) -> AccessTier {
        AccessTier {
            tu_internal: classify(chain, self.tu.as_ref()),
            ub_internal: classify(chain, self.ub.as_ref()),
            ub_52b_iba: classify(chain, self.ub_52b_iba.as_ref()),
        }
    }
}
