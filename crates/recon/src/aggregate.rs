use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::model::{AdvertisingRecord, SalesRecord};

/// Ad-attributed activity for one date, summed across campaigns.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AdTotals {
    pub spend: f64,
    pub revenue: f64,
    pub conversions: i64,
}

/// Sales activity for one date, summed across sellers.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SalesTotals {
    pub revenue: f64,
    pub conversions: i64,
    pub record_count: usize,
}

/// Group ad records by activity date; campaign granularity collapses.
/// Counts saturate at `i64::MAX`.
pub fn aggregate_ads_by_date<'a>(
    ads: impl IntoIterator<Item = &'a AdvertisingRecord>,
) -> BTreeMap<NaiveDate, AdTotals> {
    let mut by_date: BTreeMap<NaiveDate, AdTotals> = BTreeMap::new();
    for ad in ads {
        let entry = by_date.entry(ad.date).or_default();
        entry.spend += ad.cost;
        entry.revenue += ad.revenue;
        entry.conversions = entry.conversions.saturating_add(ad.conversions);
    }
    by_date
}

pub fn aggregate_sales_by_date<'a>(
    sales: impl IntoIterator<Item = &'a SalesRecord>,
) -> BTreeMap<NaiveDate, SalesTotals> {
    let mut by_date: BTreeMap<NaiveDate, SalesTotals> = BTreeMap::new();
    for sale in sales {
        let entry = by_date.entry(sale.date).or_default();
        entry.revenue += sale.revenue;
        entry.conversions = entry.conversions.saturating_add(sale.conversions);
        entry.record_count += 1;
    }
    by_date
}
