use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

use crate::channel::{self, ChannelRole, ChannelTable};
use crate::error::ReconError;

/// Longest lookback a single sync may request.
pub const MAX_LOOKBACK_DAYS: u32 = 366;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    pub client: String,
    /// Label written to `source` / `sales_platform` on every output record.
    #[serde(default = "default_platform")]
    pub platform: String,
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
    #[serde(default)]
    pub allocation: AdAllocation,
    #[serde(default = "default_currency")]
    pub default_currency: String,
    /// Channel group for ad rows that don't carry one.
    #[serde(default = "default_ad_channel")]
    pub ad_channel: String,
    /// Channel group for sales rows without one, and for every organic record.
    #[serde(default = "default_organic_channel")]
    pub organic_channel: String,
    #[serde(default)]
    pub sources: Option<SourcesConfig>,
    /// Merged over the built-in channel table.
    #[serde(default)]
    pub channels: HashMap<String, ChannelRole>,
    /// Merged over the built-in market table.
    #[serde(default)]
    pub markets: HashMap<String, MarketConfig>,
}

fn default_platform() -> String {
    "walmart".into()
}

fn default_lookback_days() -> u32 {
    7
}

fn default_currency() -> String {
    "USD".into()
}

fn default_ad_channel() -> String {
    "Walmart Connect".into()
}

fn default_organic_channel() -> String {
    channel::ORGANIC.into()
}

// ---------------------------------------------------------------------------
// Allocation
// ---------------------------------------------------------------------------

/// How a date's ad totals are charged against that date's sales records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdAllocation {
    /// Every sales record is reduced by the full date-level ad total.
    #[default]
    PerRecord,
    /// The date-level ad total is split across the date's sales records in
    /// proportion to their revenue (conversions: to their orders).
    ProRata,
}

impl std::fmt::Display for AdAllocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PerRecord => write!(f, "per_record"),
            Self::ProRata => write!(f, "pro_rata"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sources + markets
// ---------------------------------------------------------------------------

/// CSV exports, resolved relative to the config file's directory.
#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    pub ads: String,
    pub sales: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MarketConfig {
    pub country_code: String,
    pub currency: String,
}

fn builtin_markets() -> BTreeMap<String, MarketConfig> {
    [("US", "USD"), ("CA", "CAD"), ("MX", "MXN")]
        .into_iter()
        .map(|(code, currency)| {
            (
                code.to_string(),
                MarketConfig { country_code: code.into(), currency: currency.into() },
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl SyncConfig {
    /// Config with every optional setting at its default.
    pub fn for_client(client: impl Into<String>) -> Self {
        Self {
            client: client.into(),
            platform: default_platform(),
            lookback_days: default_lookback_days(),
            allocation: AdAllocation::default(),
            default_currency: default_currency(),
            ad_channel: default_ad_channel(),
            organic_channel: default_organic_channel(),
            sources: None,
            channels: HashMap::new(),
            markets: HashMap::new(),
        }
    }

    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: SyncConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.client.trim().is_empty() {
            return Err(ReconError::ConfigValidation("client must not be empty".into()));
        }

        if self.lookback_days > MAX_LOOKBACK_DAYS {
            return Err(ReconError::ConfigValidation(format!(
                "lookback_days must be at most {MAX_LOOKBACK_DAYS}, got {}",
                self.lookback_days
            )));
        }

        if self.channel_table().role(&self.organic_channel) == Some(ChannelRole::Boost) {
            return Err(ReconError::ConfigValidation(format!(
                "organic channel '{}' is classified as boost",
                self.organic_channel
            )));
        }

        check_currency("default_currency", &self.default_currency)?;
        for (code, market) in &self.markets {
            check_currency(&format!("markets.{code}.currency"), &market.currency)?;
        }

        Ok(())
    }

    /// Built-in channel table with `[channels]` entries applied on top.
    pub fn channel_table(&self) -> ChannelTable {
        let mut table = ChannelTable::default();
        for (group, role) in &self.channels {
            table.register(group.clone(), *role);
        }
        table
    }

    /// Built-in market table with `[markets]` entries applied on top.
    pub fn market_table(&self) -> BTreeMap<String, MarketConfig> {
        let mut markets = builtin_markets();
        for (code, market) in &self.markets {
            markets.insert(code.clone(), market.clone());
        }
        markets
    }
}

fn check_currency(field: &str, code: &str) -> Result<(), ReconError> {
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(ReconError::ConfigValidation(format!(
            "{field}: '{code}' is not a 3-letter uppercase currency code"
        )))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::ChannelFlags;

    const MINIMAL: &str = r#"
client = "Callaway Golf"
"#;

    const FULL: &str = r#"
client = "Callaway Golf"
platform = "walmart"
lookback_days = 30
allocation = "pro_rata"
default_currency = "USD"
ad_channel = "Walmart Connect"
organic_channel = "Walmart Organic"

[sources]
ads = "ads.csv"
sales = "sales.csv"

[channels]
"Walmart Sponsored Video" = "boost"
"Walmart Sponsored Display" = "drain"

[markets.GB]
country_code = "GB"
currency = "GBP"
"#;

    #[test]
    fn parse_minimal_uses_defaults() {
        let config = SyncConfig::from_toml(MINIMAL).unwrap();
        assert_eq!(config.client, "Callaway Golf");
        assert_eq!(config.platform, "walmart");
        assert_eq!(config.lookback_days, 7);
        assert_eq!(config.allocation, AdAllocation::PerRecord);
        assert_eq!(config.organic_channel, "Walmart Organic");
        assert!(config.sources.is_none());
        assert_eq!(config.channel_table(), ChannelTable::default());
    }

    #[test]
    fn parse_full() {
        let config = SyncConfig::from_toml(FULL).unwrap();
        assert_eq!(config.lookback_days, 30);
        assert_eq!(config.allocation, AdAllocation::ProRata);
        let sources = config.sources.as_ref().unwrap();
        assert_eq!(sources.ads, "ads.csv");
        assert_eq!(sources.sales, "sales.csv");

        let table = config.channel_table();
        assert_eq!(table.classify("Walmart Sponsored Video"), Some(ChannelFlags::BOOST));
        assert_eq!(table.classify("Walmart Sponsored Display"), Some(ChannelFlags::DRAIN));
        assert_eq!(table.classify("Walmart Sponsored Products"), Some(ChannelFlags::BOOST));

        let markets = config.market_table();
        assert_eq!(markets["GB"].currency, "GBP");
        assert_eq!(markets["MX"].currency, "MXN");
    }

    #[test]
    fn reject_unknown_allocation() {
        let input = format!("{MINIMAL}allocation = \"evenly\"\n");
        let err = SyncConfig::from_toml(&input).unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn reject_unknown_channel_role() {
        let input = format!("{MINIMAL}\n[channels]\n\"Walmart Sponsored Video\" = \"both\"\n");
        assert!(SyncConfig::from_toml(&input).is_err());
    }

    #[test]
    fn reject_empty_client() {
        let err = SyncConfig::from_toml("client = \"  \"\n").unwrap_err();
        assert!(err.to_string().contains("client must not be empty"));
    }

    #[test]
    fn reject_boost_organic_channel() {
        let input = format!("{MINIMAL}\n[channels]\n\"Walmart Organic\" = \"boost\"\n");
        let err = SyncConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("classified as boost"));
    }

    #[test]
    fn reject_excessive_lookback() {
        let input = format!("{MINIMAL}lookback_days = 400\n");
        let err = SyncConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("lookback_days"));
    }

    #[test]
    fn reject_bad_market_currency() {
        let input = format!("{MINIMAL}\n[markets.GB]\ncountry_code = \"GB\"\ncurrency = \"gbp\"\n");
        let err = SyncConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("markets.GB.currency"));
    }

    #[test]
    fn for_client_matches_minimal_toml() {
        let built = SyncConfig::for_client("Callaway Golf");
        let parsed = SyncConfig::from_toml(MINIMAL).unwrap();
        assert_eq!(built.platform, parsed.platform);
        assert_eq!(built.lookback_days, parsed.lookback_days);
        assert_eq!(built.ad_channel, parsed.ad_channel);
        assert!(built.validate().is_ok());
    }
}
