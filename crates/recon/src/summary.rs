use crate::model::{round2, OrganicRecord, SyncSummary, UnifiedAdRecord, UnifiedSalesRecord};
use crate::normalize::ratio;

/// Reduce the unified record sets into sync-level totals and ratios.
///
/// Sums accumulate at full precision; every value is rounded once, here.
/// Integer counts saturate at `i64::MAX`.
pub fn summarize(
    ads: &[UnifiedAdRecord],
    sales: &[UnifiedSalesRecord],
    organic: &[OrganicRecord],
) -> SyncSummary {
    let mut ad_spend = 0.0;
    let mut ad_revenue = 0.0;
    let mut in_store = 0.0;
    let mut impressions: i64 = 0;
    let mut clicks: i64 = 0;
    let mut conversions: i64 = 0;

    for ad in ads {
        let r = &ad.record;
        ad_spend += r.cost;
        ad_revenue += r.revenue;
        in_store += r.detail.in_store_attributed_sales;
        impressions = impressions.saturating_add(r.impressions);
        clicks = clicks.saturating_add(r.clicks);
        conversions = conversions.saturating_add(r.conversions);
    }

    let sales_revenue: f64 = sales.iter().map(|s| s.record.revenue).sum();
    let organic_revenue: f64 = organic.iter().map(|o| o.revenue).sum();

    SyncSummary {
        total_revenue: round2(sales_revenue),
        ad_attributed_revenue: round2(ad_revenue),
        organic_revenue: round2(organic_revenue),
        in_store_attributed_sales: round2(in_store),
        ad_spend: round2(ad_spend),
        impressions,
        clicks,
        conversions,
        overall_roas: round2(ratio(ad_revenue, ad_spend)),
        unified_roas: round2(ratio(sales_revenue, ad_spend)),
        halo_multiplier: round2(ratio(sales_revenue, ad_revenue)),
    }
}
