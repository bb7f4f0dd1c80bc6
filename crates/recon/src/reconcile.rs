//! Organic reconciliation: total sales minus ad-attributed sales, per date.
//!
//! One organic record is emitted per input sales record, in input order.
//! Dates that only appear in ads produce nothing. Revenue and conversions are
//! floored at zero when ads claim more than the day's sales.

use crate::aggregate::{aggregate_ads_by_date, aggregate_sales_by_date, AdTotals, SalesTotals};
use crate::channel::ChannelFlags;
use crate::config::{AdAllocation, SyncConfig};
use crate::model::{AdvertisingRecord, OrganicRecord, SalesRecord};

/// Labels and policy applied to every organic record.
#[derive(Debug, Clone)]
pub struct OrganicOptions {
    pub channel_group: String,
    pub platform: String,
    pub allocation: AdAllocation,
}

impl OrganicOptions {
    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            channel_group: config.organic_channel.clone(),
            platform: config.platform.clone(),
            allocation: config.allocation,
        }
    }
}

impl Default for OrganicOptions {
    fn default() -> Self {
        Self {
            channel_group: crate::channel::ORGANIC.into(),
            platform: "walmart".into(),
            allocation: AdAllocation::PerRecord,
        }
    }
}

pub fn reconcile(
    sales: &[SalesRecord],
    ads: &[AdvertisingRecord],
    opts: &OrganicOptions,
) -> Vec<OrganicRecord> {
    let ads_by_date = aggregate_ads_by_date(ads);
    let sales_by_date = match opts.allocation {
        AdAllocation::PerRecord => Default::default(),
        AdAllocation::ProRata => aggregate_sales_by_date(sales),
    };

    sales
        .iter()
        .map(|sale| {
            let day_ads = ads_by_date.get(&sale.date).copied().unwrap_or_default();
            let (ad_revenue, ad_conversions) = match opts.allocation {
                AdAllocation::PerRecord => (day_ads.revenue, day_ads.conversions as f64),
                AdAllocation::ProRata => {
                    let day_sales = sales_by_date.get(&sale.date).copied().unwrap_or_default();
                    pro_rata_share(sale, &day_ads, &day_sales)
                }
            };

            OrganicRecord {
                date: sale.date,
                channel_group: opts.channel_group.clone(),
                source: opts.platform.clone(),
                sales_platform: opts.platform.clone(),
                revenue: (sale.revenue - ad_revenue).max(0.0),
                conversions: (sale.conversions as f64 - ad_conversions).round().max(0.0) as i64,
                country: sale.country.clone(),
                currency: sale.currency.clone(),
                flags: ChannelFlags::DRAIN,
            }
        })
        .collect()
}

/// This sale's slice of the day's ad totals. Revenue is split by revenue
/// share, conversions by order share; an all-zero day splits evenly.
fn pro_rata_share(sale: &SalesRecord, day_ads: &AdTotals, day_sales: &SalesTotals) -> (f64, f64) {
    let n = day_sales.record_count.max(1) as f64;

    let revenue_share = if day_sales.revenue > 0.0 {
        sale.revenue / day_sales.revenue
    } else {
        1.0 / n
    };
    let conversion_share = if day_sales.conversions > 0 {
        sale.conversions as f64 / day_sales.conversions as f64
    } else {
        1.0 / n
    };

    (
        day_ads.revenue * revenue_share,
        day_ads.conversions as f64 * conversion_share,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AdDetail;
    use chrono::NaiveDate;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sale(date: &str, profile: &str, revenue: f64, conversions: i64) -> SalesRecord {
        SalesRecord {
            date: d(date),
            profile: profile.into(),
            country: "US".into(),
            revenue,
            conversions,
            units_sold: conversions,
            order_count: conversions,
            currency: "USD".into(),
            channel_group: "Walmart Organic".into(),
        }
    }

    fn ad(date: &str, revenue: f64, conversions: i64) -> AdvertisingRecord {
        AdvertisingRecord {
            date: d(date),
            campaign_id: "WMC-CG-SP-001".into(),
            campaign_name: "Sponsored Products".into(),
            cost: 100.0,
            impressions: 10_000,
            clicks: 300,
            market: "US".into(),
            revenue,
            conversions,
            currency: "USD".into(),
            channel_group: "Walmart Sponsored Products".into(),
            detail: AdDetail::default(),
        }
    }

    fn pro_rata() -> OrganicOptions {
        OrganicOptions { allocation: AdAllocation::ProRata, ..OrganicOptions::default() }
    }

    #[test]
    fn subtracts_daily_ad_total() {
        let sales = vec![sale("2026-01-15", "S1", 1_000.0, 10)];
        let ads = vec![ad("2026-01-15", 200.0, 3), ad("2026-01-15", 100.0, 1)];
        let organic = reconcile(&sales, &ads, &OrganicOptions::default());
        assert_eq!(organic.len(), 1);
        assert_eq!(organic[0].revenue, 700.0);
        assert_eq!(organic[0].conversions, 6);
        assert_eq!(organic[0].date, d("2026-01-15"));
    }

    #[test]
    fn floors_at_zero() {
        let sales = vec![sale("2026-01-16", "S1", 200.0, 2)];
        let ads = vec![ad("2026-01-16", 500.0, 5)];
        let organic = reconcile(&sales, &ads, &OrganicOptions::default());
        assert_eq!(organic[0].revenue, 0.0);
        assert_eq!(organic[0].conversions, 0);
    }

    #[test]
    fn no_ads_leaves_sales_untouched() {
        let sales = vec![
            sale("2026-01-15", "S1", 1_000.0, 10),
            sale("2026-01-16", "S1", 250.5, 3),
        ];
        let organic = reconcile(&sales, &[], &OrganicOptions::default());
        assert_eq!(organic.len(), 2);
        for (o, s) in organic.iter().zip(&sales) {
            assert_eq!(o.revenue, s.revenue);
            assert_eq!(o.conversions, s.conversions);
        }
    }

    #[test]
    fn no_sales_yields_nothing() {
        let ads = vec![ad("2026-01-15", 500.0, 5), ad("2026-01-16", 500.0, 5)];
        assert!(reconcile(&[], &ads, &OrganicOptions::default()).is_empty());
    }

    #[test]
    fn ad_only_dates_ignored() {
        let sales = vec![sale("2026-01-15", "S1", 1_000.0, 10)];
        let ads = vec![ad("2026-01-20", 900.0, 9)];
        let organic = reconcile(&sales, &ads, &OrganicOptions::default());
        assert_eq!(organic.len(), 1);
        assert_eq!(organic[0].revenue, 1_000.0);
    }

    #[test]
    fn tags_drain_and_preserves_location() {
        let mut s = sale("2026-01-15", "S1", 10.0, 1);
        s.country = "CA".into();
        s.currency = "CAD".into();
        let organic = reconcile(&[s], &[], &OrganicOptions::default());
        let o = &organic[0];
        assert_eq!(o.country, "CA");
        assert_eq!(o.currency, "CAD");
        assert_eq!(o.channel_group, "Walmart Organic");
        assert_eq!(o.flags, ChannelFlags::DRAIN);
        assert_eq!(o.source, "walmart");
    }

    #[test]
    fn empty_currency_propagates() {
        let mut s = sale("2026-01-15", "S1", 10.0, 1);
        s.currency = String::new();
        let organic = reconcile(&[s], &[], &OrganicOptions::default());
        assert_eq!(organic[0].currency, "");
    }

    #[test]
    fn per_record_charges_full_total_to_each_seller() {
        let sales = vec![
            sale("2026-01-15", "S1", 600.0, 6),
            sale("2026-01-15", "S2", 400.0, 4),
        ];
        let ads = vec![ad("2026-01-15", 300.0, 4)];
        let organic = reconcile(&sales, &ads, &OrganicOptions::default());
        assert_eq!(organic[0].revenue, 300.0);
        assert_eq!(organic[1].revenue, 100.0);
        assert_eq!(organic[0].conversions, 2);
        assert_eq!(organic[1].conversions, 0);
    }

    #[test]
    fn pro_rata_splits_by_share() {
        let sales = vec![
            sale("2026-01-15", "S1", 600.0, 6),
            sale("2026-01-15", "S2", 400.0, 4),
        ];
        let ads = vec![ad("2026-01-15", 300.0, 4)];
        let organic = reconcile(&sales, &ads, &pro_rata());
        assert!((organic[0].revenue - 420.0).abs() < 1e-9);
        assert!((organic[1].revenue - 280.0).abs() < 1e-9);
        let total: f64 = organic.iter().map(|o| o.revenue).sum();
        assert!((total - 700.0).abs() < 1e-9);
        // 4 × 0.6 = 2.4 → 6 - 2.4 = 3.6 → 4; 4 × 0.4 = 1.6 → 4 - 1.6 = 2.4 → 2
        assert_eq!(organic[0].conversions, 4);
        assert_eq!(organic[1].conversions, 2);
    }

    #[test]
    fn pro_rata_single_seller_matches_per_record() {
        let sales = vec![sale("2026-01-15", "S1", 1_000.0, 10)];
        let ads = vec![ad("2026-01-15", 300.0, 4)];
        assert_eq!(
            reconcile(&sales, &ads, &pro_rata()),
            reconcile(&sales, &ads, &OrganicOptions::default())
        );
    }

    #[test]
    fn pro_rata_zero_revenue_day_splits_evenly() {
        let sales = vec![
            sale("2026-01-15", "S1", 0.0, 0),
            sale("2026-01-15", "S2", 0.0, 0),
        ];
        let ads = vec![ad("2026-01-15", 100.0, 2)];
        let organic = reconcile(&sales, &ads, &pro_rata());
        assert!(organic.iter().all(|o| o.revenue == 0.0 && o.conversions == 0));
    }
}
