// Property-based tests for organic reconciliation and summary ratios.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use chrono::NaiveDate;
use proptest::prelude::*;

use shelfsync_recon::channel::ChannelTable;
use shelfsync_recon::config::AdAllocation;
use shelfsync_recon::model::{AdDetail, AdvertisingRecord, SalesRecord};
use shelfsync_recon::normalize::{normalize_ad, normalize_sale};
use shelfsync_recon::reconcile::{reconcile, OrganicOptions};
use shelfsync_recon::summary::summarize;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

fn day(offset: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 10).unwrap() + chrono::Duration::days(i64::from(offset))
}

/// Money: mostly positive cents, sometimes exactly zero.
fn arb_money() -> impl Strategy<Value = f64> {
    prop_oneof![
        4 => (0u32..5_000_000).prop_map(|c| f64::from(c) / 100.0),
        1 => Just(0.0),
    ]
}

fn arb_ad() -> impl Strategy<Value = AdvertisingRecord> {
    (0u32..5, arb_money(), arb_money(), 0i64..200_000, 0i64..5_000, 0i64..500).prop_map(
        |(offset, cost, revenue, impressions, clicks, conversions)| AdvertisingRecord {
            date: day(offset),
            campaign_id: format!("WMC-{offset}"),
            campaign_name: "campaign".into(),
            cost,
            impressions,
            clicks,
            market: "US".into(),
            revenue,
            conversions,
            currency: "USD".into(),
            channel_group: "Walmart Sponsored Products".into(),
            detail: AdDetail::default(),
        },
    )
}

fn arb_sale() -> impl Strategy<Value = SalesRecord> {
    (0u32..5, 0u8..3, arb_money(), 0i64..1_000).prop_map(|(offset, seller, revenue, conversions)| {
        SalesRecord {
            date: day(offset),
            profile: format!("SELLER-{seller}"),
            country: "US".into(),
            revenue,
            conversions,
            units_sold: conversions,
            order_count: conversions,
            currency: "USD".into(),
            channel_group: "Walmart Organic".into(),
        }
    })
}

fn arb_allocation() -> impl Strategy<Value = AdAllocation> {
    prop_oneof![Just(AdAllocation::PerRecord), Just(AdAllocation::ProRata)]
}

fn opts(allocation: AdAllocation) -> OrganicOptions {
    OrganicOptions { allocation, ..OrganicOptions::default() }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn organic_never_negative(
        sales in prop::collection::vec(arb_sale(), 0..20),
        ads in prop::collection::vec(arb_ad(), 0..40),
        allocation in arb_allocation(),
    ) {
        for o in reconcile(&sales, &ads, &opts(allocation)) {
            prop_assert!(o.revenue >= 0.0, "revenue {}", o.revenue);
            prop_assert!(o.conversions >= 0, "conversions {}", o.conversions);
        }
    }

    #[test]
    fn organic_bounded_by_sales(
        sales in prop::collection::vec(arb_sale(), 0..20),
        ads in prop::collection::vec(arb_ad(), 0..40),
        allocation in arb_allocation(),
    ) {
        let organic = reconcile(&sales, &ads, &opts(allocation));
        prop_assert_eq!(organic.len(), sales.len());

        for (o, s) in organic.iter().zip(&sales) {
            prop_assert!(o.revenue <= s.revenue);
            prop_assert!(o.conversions <= s.conversions);
            prop_assert_eq!(o.date, s.date);
        }

        let organic_total: f64 = organic.iter().map(|o| o.revenue).sum();
        let sales_total: f64 = sales.iter().map(|s| s.revenue).sum();
        prop_assert!(organic_total <= sales_total + 1e-6);
    }

    #[test]
    fn no_ads_is_identity(
        sales in prop::collection::vec(arb_sale(), 0..20),
        allocation in arb_allocation(),
    ) {
        let organic = reconcile(&sales, &[], &opts(allocation));
        prop_assert_eq!(organic.len(), sales.len());
        for (o, s) in organic.iter().zip(&sales) {
            prop_assert_eq!(o.revenue, s.revenue);
            prop_assert_eq!(o.conversions, s.conversions);
        }
    }

    #[test]
    fn no_sales_is_empty(
        ads in prop::collection::vec(arb_ad(), 0..40),
        allocation in arb_allocation(),
    ) {
        prop_assert!(reconcile(&[], &ads, &opts(allocation)).is_empty());
    }

    #[test]
    fn ratios_always_finite(
        sales in prop::collection::vec(arb_sale(), 0..10),
        ads in prop::collection::vec(arb_ad(), 0..20),
    ) {
        let table = ChannelTable::default();
        let ua: Vec<_> = ads.iter().map(|a| normalize_ad(a, &table, "walmart")).collect();
        let us: Vec<_> = sales.iter().map(|s| normalize_sale(s, &table, "walmart")).collect();

        for a in &ua {
            prop_assert!(a.ctr.is_finite() && a.cpc.is_finite() && a.roas.is_finite());
        }
        for s in &us {
            prop_assert!(s.average_order_value.is_finite());
        }

        let organic = reconcile(&sales, &ads, &OrganicOptions::default());
        let summary = summarize(&ua, &us, &organic);
        prop_assert!(summary.overall_roas.is_finite());
        prop_assert!(summary.unified_roas.is_finite());
        prop_assert!(summary.halo_multiplier.is_finite());
    }
}
