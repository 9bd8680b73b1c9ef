//! Access tiers derived from the client's network address

use serde::Serialize;

/// Independent membership flags; a client can be in any combination of tiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AccessTier {
    /// Client is inside the university network
    #[serde(rename = "isTUintern")]
    pub tu_internal: bool,
    /// Client is inside the library network; unlocks XML/JSON output
    #[serde(rename = "isUBintern")]
    pub ub_internal: bool,
    /// Client is one of the terminals restricted by §52b UrhG
    #[serde(rename = "is52bIBA")]
    pub ub_52b_iba: bool,
}
