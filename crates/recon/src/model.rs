use chrono::{Duration, NaiveDate};
use serde::{Serialize, Serializer};

use crate::channel::ChannelFlags;
use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Rounding
// ---------------------------------------------------------------------------

/// Round to 2 decimal places. Applied at output boundaries only.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn ser_round2<S: Serializer>(value: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(round2(*value))
}

// ---------------------------------------------------------------------------
// Window + stages
// ---------------------------------------------------------------------------

/// Inclusive `[start, end]` activity-date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ReconError> {
        if start > end {
            return Err(ReconError::EmptyWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// `[sync_date - lookback_days, sync_date]`.
    pub fn lookback(sync_date: NaiveDate, lookback_days: u32) -> Result<Self, ReconError> {
        let start = sync_date
            .checked_sub_signed(Duration::days(i64::from(lookback_days)))
            .ok_or_else(|| {
                ReconError::ConfigValidation(format!(
                    "lookback of {lookback_days} days from {sync_date} is out of range"
                ))
            })?;
        Self::new(start, sync_date)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days covered, both ends included.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStage {
    FetchAds,
    FetchSales,
    Normalize,
    Reconcile,
    Summarize,
}

impl std::fmt::Display for SyncStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FetchAds => write!(f, "fetch_ads"),
            Self::FetchSales => write!(f, "fetch_sales"),
            Self::Normalize => write!(f, "normalize"),
            Self::Reconcile => write!(f, "reconcile"),
            Self::Summarize => write!(f, "summarize"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Advertising,
    Sales,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Advertising => write!(f, "advertising"),
            Self::Sales => write!(f, "sales"),
        }
    }
}

// ---------------------------------------------------------------------------
// Raw input (as supplied by a data source)
// ---------------------------------------------------------------------------

/// One advertising row as delivered by a data source. Nothing is guaranteed
/// present; validation decides what is usable.
#[derive(Debug, Clone, Default)]
pub struct RawAdRecord {
    pub date: Option<String>,
    pub campaign_id: Option<String>,
    pub campaign_name: Option<String>,
    pub cost: Option<f64>,
    pub impressions: Option<i64>,
    pub clicks: Option<i64>,
    pub market: Option<String>,
    pub revenue: Option<f64>,
    pub conversions: Option<i64>,
    pub currency: Option<String>,
    pub channel_group: Option<String>,
    pub ad_group_id: Option<String>,
    pub ad_group_name: Option<String>,
    pub ad_id: Option<String>,
    pub keyword: Option<String>,
    pub in_store_attributed_sales: Option<f64>,
    pub online_attributed_sales: Option<f64>,
    pub new_to_brand_sales: Option<f64>,
    pub new_to_brand_orders: Option<i64>,
    /// 1-based line in the source file, when the source has lines.
    pub line: Option<usize>,
    /// Cells that were present but could not be parsed, as `column 'value'`.
    pub unparsed: Vec<String>,
}

/// One daily sales row as delivered by a data source.
#[derive(Debug, Clone, Default)]
pub struct RawSalesRecord {
    pub date: Option<String>,
    pub profile: Option<String>,
    pub country: Option<String>,
    pub revenue: Option<f64>,
    pub conversions: Option<i64>,
    pub units_sold: Option<i64>,
    pub order_count: Option<i64>,
    pub currency: Option<String>,
    pub channel_group: Option<String>,
    pub line: Option<usize>,
    pub unparsed: Vec<String>,
}

// ---------------------------------------------------------------------------
// Validated records
// ---------------------------------------------------------------------------

/// Ad-group / keyword granularity and retail-specific attribution splits.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_group_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_group_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(serialize_with = "ser_round2")]
    pub in_store_attributed_sales: f64,
    #[serde(serialize_with = "ser_round2")]
    pub online_attributed_sales: f64,
    #[serde(serialize_with = "ser_round2")]
    pub new_to_brand_sales: f64,
    pub new_to_brand_orders: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvertisingRecord {
    #[serde(rename = "activity_date")]
    pub date: NaiveDate,
    pub campaign_id: String,
    pub campaign_name: String,
    #[serde(serialize_with = "ser_round2")]
    pub cost: f64,
    pub impressions: i64,
    pub clicks: i64,
    pub market: String,
    #[serde(serialize_with = "ser_round2")]
    pub revenue: f64,
    pub conversions: i64,
    #[serde(rename = "currency_code")]
    pub currency: String,
    pub channel_group: String,
    #[serde(flatten)]
    pub detail: AdDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesRecord {
    #[serde(rename = "activity_date")]
    pub date: NaiveDate,
    pub profile: String,
    pub country: String,
    #[serde(serialize_with = "ser_round2")]
    pub revenue: f64,
    /// Total orders.
    pub conversions: i64,
    pub units_sold: i64,
    pub order_count: i64,
    #[serde(rename = "currency_code")]
    pub currency: String,
    pub channel_group: String,
}

// ---------------------------------------------------------------------------
// Unified output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct UnifiedAdRecord {
    #[serde(flatten)]
    pub record: AdvertisingRecord,
    pub source: String,
    pub sales_platform: String,
    #[serde(serialize_with = "ser_round2")]
    pub ctr: f64,
    #[serde(serialize_with = "ser_round2")]
    pub cpc: f64,
    #[serde(serialize_with = "ser_round2")]
    pub roas: f64,
    #[serde(flatten)]
    pub flags: ChannelFlags,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnifiedSalesRecord {
    #[serde(flatten)]
    pub record: SalesRecord,
    pub source: String,
    pub sales_platform: String,
    #[serde(serialize_with = "ser_round2")]
    pub average_order_value: f64,
    #[serde(flatten)]
    pub flags: ChannelFlags,
}

/// Residual, non-ad-attributed activity for one sales record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrganicRecord {
    #[serde(rename = "activity_date")]
    pub date: NaiveDate,
    pub channel_group: String,
    pub source: String,
    pub sales_platform: String,
    #[serde(serialize_with = "ser_round2")]
    pub revenue: f64,
    pub conversions: i64,
    pub country: String,
    #[serde(rename = "currency_code")]
    pub currency: String,
    #[serde(flatten)]
    pub flags: ChannelFlags,
}

// ---------------------------------------------------------------------------
// Summary + envelope
// ---------------------------------------------------------------------------

/// Cross-cutting totals. Values are rounded to 2 dp when the summary is built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncSummary {
    pub total_revenue: f64,
    pub ad_attributed_revenue: f64,
    pub organic_revenue: f64,
    pub in_store_attributed_sales: f64,
    pub ad_spend: f64,
    pub impressions: i64,
    pub clicks: i64,
    pub conversions: i64,
    pub overall_roas: f64,
    pub unified_roas: f64,
    pub halo_multiplier: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecordCounts {
    pub advertising: usize,
    pub sales: usize,
    pub organic: usize,
    pub rejected_advertising: usize,
    pub rejected_sales: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncData {
    pub advertising: Vec<UnifiedAdRecord>,
    pub sales: Vec<UnifiedSalesRecord>,
    pub organic: Vec<OrganicRecord>,
}

/// Per-date halo row: how total sales relate to that day's ad activity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyHalo {
    pub date: NaiveDate,
    #[serde(serialize_with = "ser_round2")]
    pub ad_spend: f64,
    #[serde(serialize_with = "ser_round2")]
    pub ad_revenue: f64,
    #[serde(serialize_with = "ser_round2")]
    pub sales_revenue: f64,
    #[serde(serialize_with = "ser_round2")]
    pub organic_revenue: f64,
    #[serde(serialize_with = "ser_round2")]
    pub unified_roas: f64,
    #[serde(serialize_with = "ser_round2")]
    pub halo_multiplier: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DerivedOutputs {
    pub daily_halo: Vec<DailyHalo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncMeta {
    pub client: String,
    pub engine_version: String,
    pub synced_at: String,
    pub source: String,
    pub allocation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncResult {
    pub meta: SyncMeta,
    pub date_range: DateWindow,
    pub record_counts: RecordCounts,
    pub data: SyncData,
    pub summary: SyncSummary,
    pub derived: DerivedOutputs,
}
