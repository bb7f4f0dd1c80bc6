//! Record normalizer: maps validated records into the unified schema and
//! computes per-record ratios.

use crate::channel::{ChannelFlags, ChannelTable};
use crate::model::{AdvertisingRecord, SalesRecord, UnifiedAdRecord, UnifiedSalesRecord};

/// `numerator / denominator`, or 0 when the denominator is not positive.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

pub fn normalize_ad(record: &AdvertisingRecord, channels: &ChannelTable, platform: &str) -> UnifiedAdRecord {
    let clicks = record.clicks as f64;
    UnifiedAdRecord {
        ctr: ratio(clicks, record.impressions as f64) * 100.0,
        cpc: ratio(record.cost, clicks),
        roas: ratio(record.revenue, record.cost),
        flags: channels.classify_or(&record.channel_group, ChannelFlags::UNCLASSIFIED),
        source: platform.to_string(),
        sales_platform: platform.to_string(),
        record: record.clone(),
    }
}

/// Unmapped sales channels default to drain: unattributed sales are baseline.
pub fn normalize_sale(record: &SalesRecord, channels: &ChannelTable, platform: &str) -> UnifiedSalesRecord {
    UnifiedSalesRecord {
        average_order_value: ratio(record.revenue, record.conversions as f64),
        flags: channels.classify_or(&record.channel_group, ChannelFlags::DRAIN),
        source: platform.to_string(),
        sales_platform: platform.to_string(),
        record: record.clone(),
    }
}
