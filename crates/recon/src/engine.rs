use std::thread;

use chrono::NaiveDate;

use crate::config::SyncConfig;
use crate::derived::build_daily_halo;
use crate::error::ReconError;
use crate::model::{
    DateWindow, DerivedOutputs, RawAdRecord, RawSalesRecord, RecordCounts, SyncData, SyncMeta,
    SyncResult, SyncStage,
};
use crate::normalize::{normalize_ad, normalize_sale};
use crate::reconcile::{reconcile, OrganicOptions};
use crate::source::DataSource;
use crate::summary::summarize;
use crate::validate::{validate_ads, validate_sales, RecordDefaults};

/// Run a sync over `[sync_date - lookback_days, sync_date]`.
pub fn run_sync(
    source: &dyn DataSource,
    config: &SyncConfig,
    sync_date: NaiveDate,
    lookback_days: u32,
) -> Result<SyncResult, ReconError> {
    let window = DateWindow::lookback(sync_date, lookback_days)?;
    run_window(source, config, window)
}

/// Run a sync over an explicit window.
///
/// FETCH_ADS + FETCH_SALES (concurrent, joined) → NORMALIZE → RECONCILE →
/// SUMMARIZE. A fetch failure aborts before anything is normalized.
pub fn run_window(
    source: &dyn DataSource,
    config: &SyncConfig,
    window: DateWindow,
) -> Result<SyncResult, ReconError> {
    DateWindow::new(window.start, window.end)?;

    log::info!(
        "sync '{}' via {}: {}..={} ({} days)",
        config.client,
        source.name(),
        window.start,
        window.end,
        window.days()
    );

    let (raw_ads, raw_sales) = fetch_both(source, &window)?;
    log::info!("fetched {} advertising, {} sales rows", raw_ads.len(), raw_sales.len());

    // Normalize
    let defaults = RecordDefaults::from_config(config);
    let ads = validate_ads(raw_ads, &defaults);
    let sales = validate_sales(raw_sales, &defaults);

    let channels = config.channel_table();
    let unified_ads: Vec<_> = ads
        .records
        .iter()
        .map(|r| normalize_ad(r, &channels, &config.platform))
        .collect();
    let unified_sales: Vec<_> = sales
        .records
        .iter()
        .map(|r| normalize_sale(r, &channels, &config.platform))
        .collect();
    log::info!(
        "{}: {} advertising ({} rejected), {} sales ({} rejected)",
        SyncStage::Normalize,
        unified_ads.len(),
        ads.rejected.len(),
        unified_sales.len(),
        sales.rejected.len()
    );

    // Reconcile
    let organic = reconcile(&sales.records, &ads.records, &OrganicOptions::from_config(config));
    log::info!("{}: {} organic records ({})", SyncStage::Reconcile, organic.len(), config.allocation);

    // Summarize
    let summary = summarize(&unified_ads, &unified_sales, &organic);
    let derived = DerivedOutputs {
        daily_halo: build_daily_halo(&unified_ads, &unified_sales, &organic),
    };
    log::info!(
        "{}: revenue {:.2}, ad spend {:.2}, halo {:.2}x",
        SyncStage::Summarize,
        summary.total_revenue,
        summary.ad_spend,
        summary.halo_multiplier
    );

    Ok(SyncResult {
        meta: SyncMeta {
            client: config.client.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            synced_at: chrono::Utc::now().to_rfc3339(),
            source: source.name().to_string(),
            allocation: config.allocation.to_string(),
        },
        date_range: window,
        record_counts: RecordCounts {
            advertising: unified_ads.len(),
            sales: unified_sales.len(),
            organic: organic.len(),
            rejected_advertising: ads.rejected.len(),
            rejected_sales: sales.rejected.len(),
        },
        data: SyncData {
            advertising: unified_ads,
            sales: unified_sales,
            organic,
        },
        summary,
        derived,
    })
}

/// Both fetches share nothing, so they run side by side. Ads failure is
/// reported first when both fail.
fn fetch_both(
    source: &dyn DataSource,
    window: &DateWindow,
) -> Result<(Vec<RawAdRecord>, Vec<RawSalesRecord>), ReconError> {
    let (ads, sales) = thread::scope(|s| {
        let ads = s.spawn(|| source.fetch_ads(window));
        let sales = source.fetch_sales(window);
        (ads.join(), sales)
    });

    let ads = ads
        .map_err(|_| stage_failed(SyncStage::FetchAds, "fetch thread panicked"))?
        .map_err(|e| stage_failed(SyncStage::FetchAds, e))?;
    let sales = sales.map_err(|e| stage_failed(SyncStage::FetchSales, e))?;
    Ok((ads, sales))
}

fn stage_failed(stage: SyncStage, cause: impl ToString) -> ReconError {
    let message = cause.to_string();
    log::error!("{stage} failed: {message}");
    ReconError::StageFailed { stage, message }
}
