//! Cache keys for the read endpoints.
//!
//! A key is a deterministic function of endpoint and parameters. Each
//! `for_*` constructor takes the parameters as `Option`s and returns `None`
//! when one is missing, which callers use to mean "don't fetch".

use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetsKey;

impl Display for AssetsKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/assets")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PriceKey {
    pub asset_id: String,
}

impl PriceKey {
    pub fn for_asset(asset_id: Option<&str>) -> Option<Self> {
        selected(asset_id).map(|asset_id| PriceKey { asset_id })
    }
}

impl Display for PriceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/assets/{}/price", self.asset_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HistoryKey {
    pub asset_id: String,
    pub days: u32,
}

impl HistoryKey {
    pub fn for_asset(asset_id: Option<&str>, days: u32) -> Option<Self> {
        selected(asset_id).map(|asset_id| HistoryKey { asset_id, days })
    }
}

impl Display for HistoryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/assets/{}/history?days={}", self.asset_id, self.days)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndicatorsKey {
    pub asset_id: String,
    pub days: u32,
}

impl IndicatorsKey {
    pub fn for_asset(asset_id: Option<&str>, days: u32) -> Option<Self> {
        selected(asset_id).map(|asset_id| IndicatorsKey { asset_id, days })
    }
}

impl Display for IndicatorsKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/analysis/{}/indicators?days={}", self.asset_id, self.days)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AthKey {
    pub asset_id: String,
}

impl AthKey {
    pub fn for_asset(asset_id: Option<&str>) -> Option<Self> {
        selected(asset_id).map(|asset_id| AthKey { asset_id })
    }
}

impl Display for AthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/ath/{}/prediction", self.asset_id)
    }
}

fn selected(asset_id: Option<&str>) -> Option<String> {
    asset_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}
