//! Derived dataset builders: per-date analyses layered on top of the
//! unified record sets.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::aggregate::{aggregate_ads_by_date, aggregate_sales_by_date};
use crate::model::{DailyHalo, OrganicRecord, UnifiedAdRecord, UnifiedSalesRecord};
use crate::normalize::ratio;

/// Build the `daily_halo` dataset: one row per date seen in ads or sales,
/// ascending. Dates with ads but no sales still appear, with zero sales.
pub fn build_daily_halo(
    ads: &[UnifiedAdRecord],
    sales: &[UnifiedSalesRecord],
    organic: &[OrganicRecord],
) -> Vec<DailyHalo> {
    let ad_days = aggregate_ads_by_date(ads.iter().map(|a| &a.record));
    let sales_days = aggregate_sales_by_date(sales.iter().map(|s| &s.record));

    let mut organic_days: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for o in organic {
        *organic_days.entry(o.date).or_default() += o.revenue;
    }

    let dates: BTreeSet<NaiveDate> = ad_days
        .keys()
        .chain(sales_days.keys())
        .chain(organic_days.keys())
        .copied()
        .collect();

    dates
        .into_iter()
        .map(|date| {
            let day_ads = ad_days.get(&date).copied().unwrap_or_default();
            let sales_revenue = sales_days.get(&date).map_or(0.0, |t| t.revenue);
            DailyHalo {
                date,
                ad_spend: day_ads.spend,
                ad_revenue: day_ads.revenue,
                sales_revenue,
                organic_revenue: organic_days.get(&date).copied().unwrap_or(0.0),
                unified_roas: ratio(sales_revenue, day_ads.spend),
                halo_multiplier: ratio(sales_revenue, day_ads.revenue),
            }
        })
        .collect()
}
