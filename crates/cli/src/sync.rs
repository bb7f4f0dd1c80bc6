//! `shelfsync sync` / `shelfsync validate`: config-driven ad/sales syncs.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use shelfsync_recon::config::MAX_LOOKBACK_DAYS;
use shelfsync_recon::{CsvSource, DateWindow, SyncConfig, SyncResult};

use crate::exit_codes::{EXIT_RUNTIME, EXIT_USAGE};
use crate::CliError;

/// Window flags as given on the command line.
pub struct WindowArgs {
    pub date: Option<NaiveDate>,
    pub lookback: Option<u32>,
    pub since: Option<NaiveDate>,
}

impl WindowArgs {
    /// `--since..=--date` when `--since` is given, otherwise `--lookback`
    /// (or the config's `lookback_days`) days back from `--date`.
    fn resolve(&self, config: &SyncConfig) -> Result<DateWindow, CliError> {
        let end = self.date.unwrap_or_else(|| chrono::Utc::now().date_naive());

        if let Some(start) = self.since {
            return Ok(DateWindow::new(start, end)?);
        }

        let lookback = self.lookback.unwrap_or(config.lookback_days);
        if lookback > MAX_LOOKBACK_DAYS {
            return Err(CliError::usage(format!(
                "--lookback must be at most {MAX_LOOKBACK_DAYS}, got {lookback}"
            )));
        }
        Ok(DateWindow::lookback(end, lookback)?)
    }
}

fn load_config(config_path: &Path) -> Result<SyncConfig, CliError> {
    let config_str = std::fs::read_to_string(config_path).map_err(|e| {
        CliError::new(EXIT_USAGE, format!("cannot read config {}: {e}", config_path.display()))
    })?;
    Ok(SyncConfig::from_toml(&config_str)?)
}

pub fn cmd_sync(
    config_path: PathBuf,
    window: WindowArgs,
    json_output: bool,
    output_file: Option<PathBuf>,
) -> Result<(), CliError> {
    let config = load_config(&config_path)?;

    // Resolve source paths relative to the config file's directory
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    let source = CsvSource::from_config(&config, base_dir)
        .map_err(|e| CliError::from(e).with_hint("add a [sources] section with ads and sales paths"))?;

    let window = window.resolve(&config)?;
    log::debug!(
        "sources: ads {}, sales {}",
        source.ads_path.display(),
        source.sales_path.display()
    );
    let result = shelfsync_recon::run_window(&source, &config, window)?;

    let json_str = serde_json::to_string_pretty(&result)
        .map_err(|e| CliError::new(EXIT_RUNTIME, format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = output_file {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::new(EXIT_RUNTIME, format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        println!("{json_str}");
    }

    print_summary(&result);
    Ok(())
}

/// Human summary to stderr.
fn print_summary(result: &SyncResult) {
    let c = &result.record_counts;
    let s = &result.summary;
    eprintln!(
        "{} {}..{}: {} ad rows, {} sales rows, {} organic ({} rejected)",
        result.meta.client,
        result.date_range.start,
        result.date_range.end,
        c.advertising,
        c.sales,
        c.organic,
        c.rejected_advertising + c.rejected_sales,
    );
    eprintln!(
        "revenue {:.2} (ads {:.2}, organic {:.2}), spend {:.2}: ROAS {:.2}, unified {:.2}, halo {:.2}x",
        s.total_revenue,
        s.ad_attributed_revenue,
        s.organic_revenue,
        s.ad_spend,
        s.overall_roas,
        s.unified_roas,
        s.halo_multiplier,
    );
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    eprintln!(
        "valid: sync '{}' on {} ({} allocation, {} day lookback, {} channel(s), {} market(s))",
        config.client,
        config.platform,
        config.allocation,
        config.lookback_days,
        config.channel_table().len(),
        config.market_table().len(),
    );
    if config.sources.is_none() {
        eprintln!("note: no [sources] section; `shelfsync sync` will refuse this config");
    }
    Ok(())
}
