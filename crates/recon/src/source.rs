//! Data sources: where raw advertising and sales rows come from.
//!
//! The engine only sees [`DataSource`]. Two implementations ship here:
//! [`MemorySource`] for records already in hand, and [`CsvSource`] for CSV
//! exports on disk. Both drop rows whose date parses but falls outside the
//! requested window; rows with a missing or unparseable date are passed on
//! so validation can reject them.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDate;

use crate::config::SyncConfig;
use crate::error::ReconError;
use crate::model::{DateWindow, RawAdRecord, RawSalesRecord};

pub trait DataSource: Sync {
    /// Short label used in logs and the result envelope.
    fn name(&self) -> &str;

    fn fetch_ads(&self, window: &DateWindow) -> Result<Vec<RawAdRecord>, ReconError>;

    fn fetch_sales(&self, window: &DateWindow) -> Result<Vec<RawSalesRecord>, ReconError>;
}

fn keep_for_window(date: Option<&str>, window: &DateWindow) -> bool {
    match date.and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok()) {
        Some(date) => window.contains(date),
        None => true,
    }
}

fn filter_window<T>(rows: Vec<T>, window: &DateWindow, date: impl Fn(&T) -> Option<&str>) -> Vec<T> {
    let before = rows.len();
    let kept: Vec<T> = rows.into_iter().filter(|r| keep_for_window(date(r), window)).collect();
    if kept.len() < before {
        log::debug!(
            "dropped {} row(s) outside {}..={}",
            before - kept.len(),
            window.start,
            window.end
        );
    }
    kept
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pub ads: Vec<RawAdRecord>,
    pub sales: Vec<RawSalesRecord>,
}

impl MemorySource {
    pub fn new(ads: Vec<RawAdRecord>, sales: Vec<RawSalesRecord>) -> Self {
        Self { ads, sales }
    }
}

impl DataSource for MemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    fn fetch_ads(&self, window: &DateWindow) -> Result<Vec<RawAdRecord>, ReconError> {
        Ok(filter_window(self.ads.clone(), window, |r| r.date.as_deref()))
    }

    fn fetch_sales(&self, window: &DateWindow) -> Result<Vec<RawSalesRecord>, ReconError> {
        Ok(filter_window(self.sales.clone(), window, |r| r.date.as_deref()))
    }
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CsvSource {
    pub ads_path: PathBuf,
    pub sales_path: PathBuf,
}

impl CsvSource {
    pub fn new(ads_path: impl Into<PathBuf>, sales_path: impl Into<PathBuf>) -> Self {
        Self { ads_path: ads_path.into(), sales_path: sales_path.into() }
    }

    /// Resolve `[sources]` paths relative to `base_dir`.
    pub fn from_config(config: &SyncConfig, base_dir: &Path) -> Result<Self, ReconError> {
        let sources = config.sources.as_ref().ok_or_else(|| {
            ReconError::ConfigValidation("config has no [sources] section".into())
        })?;
        Ok(Self::new(base_dir.join(&sources.ads), base_dir.join(&sources.sales)))
    }
}

fn read_file(path: &Path) -> Result<String, ReconError> {
    std::fs::read_to_string(path)
        .map_err(|e| ReconError::Io(format!("cannot read {}: {e}", path.display())))
}

impl DataSource for CsvSource {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch_ads(&self, window: &DateWindow) -> Result<Vec<RawAdRecord>, ReconError> {
        let rows = load_ad_rows(&read_file(&self.ads_path)?)?;
        Ok(filter_window(rows, window, |r| r.date.as_deref()))
    }

    fn fetch_sales(&self, window: &DateWindow) -> Result<Vec<RawSalesRecord>, ReconError> {
        let rows = load_sales_rows(&read_file(&self.sales_path)?)?;
        Ok(filter_window(rows, window, |r| r.date.as_deref()))
    }
}

/// Header lookup for one CSV file. Each logical column accepts a list of
/// header aliases; the first present wins.
struct Columns {
    file: &'static str,
    headers: Vec<String>,
}

impl Columns {
    fn new(file: &'static str, reader: &mut csv::Reader<&[u8]>) -> Result<Self, ReconError> {
        let headers = reader
            .headers()
            .map_err(|e| ReconError::Csv(format!("{file}: {e}")))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        Ok(Self { file, headers })
    }

    fn find(&self, aliases: &[&str]) -> Option<usize> {
        aliases.iter().find_map(|a| self.headers.iter().position(|h| h == a))
    }

    fn require(&self, aliases: &[&str]) -> Result<usize, ReconError> {
        self.find(aliases).ok_or_else(|| {
            ReconError::Csv(format!("{}: missing column '{}'", self.file, aliases[0]))
        })
    }
}

/// One data row plus its position, for cell access and rejections.
struct Row<'a> {
    line: usize,
    record: &'a csv::StringRecord,
    /// Cells present but not parseable, handed to validation.
    unparsed: Vec<String>,
}

impl Row<'_> {
    fn text(&self, idx: Option<usize>) -> Option<String> {
        idx.and_then(|i| self.record.get(i))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// Blank cells are missing. An unparseable cell is also read as missing,
    /// but is recorded so validation rejects the whole row.
    fn number<T: FromStr>(&mut self, idx: Option<usize>, column: &str) -> Option<T> {
        let raw = self.text(idx)?;
        match raw.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                self.unparsed.push(format!("{column} '{raw}'"));
                None
            }
        }
    }
}

/// Parse an advertising export. Required headers: date, campaign id/name,
/// cost, impressions, clicks, market.
pub fn load_ad_rows(csv_data: &str) -> Result<Vec<RawAdRecord>, ReconError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_bytes());
    let cols = Columns::new("ads", &mut reader)?;

    let date = cols.require(&["activity_date", "date"])?;
    let campaign_id = cols.require(&["campaign_id"])?;
    let campaign_name = cols.require(&["campaign_name"])?;
    let cost = cols.require(&["cost", "ad_spend"])?;
    let impressions = cols.require(&["impressions"])?;
    let clicks = cols.require(&["clicks"])?;
    let market = cols.require(&["market"])?;
    let revenue = cols.find(&["revenue", "attributed_sales"]);
    let conversions = cols.find(&["conversions"]);
    let currency = cols.find(&["currency_code", "currency"]);
    let channel_group = cols.find(&["channel_group"]);
    let ad_group_id = cols.find(&["ad_group_id"]);
    let ad_group_name = cols.find(&["ad_group_name"]);
    let ad_id = cols.find(&["ad_id"]);
    let keyword = cols.find(&["keyword"]);
    let in_store = cols.find(&["in_store_attributed_sales"]);
    let online = cols.find(&["online_attributed_sales"]);
    let ntb_sales = cols.find(&["new_to_brand_sales"]);
    let ntb_orders = cols.find(&["new_to_brand_orders"]);

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| ReconError::Csv(format!("ads: {e}")))?;
        let mut row = Row { line: i + 2, record: &record, unparsed: Vec::new() };
        rows.push(RawAdRecord {
            date: row.text(Some(date)),
            campaign_id: row.text(Some(campaign_id)),
            campaign_name: row.text(Some(campaign_name)),
            cost: row.number(Some(cost), "cost"),
            impressions: row.number(Some(impressions), "impressions"),
            clicks: row.number(Some(clicks), "clicks"),
            market: row.text(Some(market)),
            revenue: row.number(revenue, "revenue"),
            conversions: row.number(conversions, "conversions"),
            currency: row.text(currency),
            channel_group: row.text(channel_group),
            ad_group_id: row.text(ad_group_id),
            ad_group_name: row.text(ad_group_name),
            ad_id: row.text(ad_id),
            keyword: row.text(keyword),
            in_store_attributed_sales: row.number(in_store, "in_store_attributed_sales"),
            online_attributed_sales: row.number(online, "online_attributed_sales"),
            new_to_brand_sales: row.number(ntb_sales, "new_to_brand_sales"),
            new_to_brand_orders: row.number(ntb_orders, "new_to_brand_orders"),
            line: Some(row.line),
            unparsed: row.unparsed,
        });
    }

    Ok(rows)
}

/// Parse a daily sales export. Required headers: date, profile, country,
/// revenue, conversions (orders).
pub fn load_sales_rows(csv_data: &str) -> Result<Vec<RawSalesRecord>, ReconError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_bytes());
    let cols = Columns::new("sales", &mut reader)?;

    let date = cols.require(&["activity_date", "date"])?;
    let profile = cols.require(&["profile", "seller_id"])?;
    let country = cols.require(&["country"])?;
    let revenue = cols.require(&["revenue"])?;
    let conversions = cols.require(&["conversions", "orders"])?;
    let units_sold = cols.find(&["units_sold", "units"]);
    let order_count = cols.find(&["order_count"]);
    let currency = cols.find(&["currency_code", "currency"]);
    let channel_group = cols.find(&["channel_group"]);

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| ReconError::Csv(format!("sales: {e}")))?;
        let mut row = Row { line: i + 2, record: &record, unparsed: Vec::new() };
        rows.push(RawSalesRecord {
            date: row.text(Some(date)),
            profile: row.text(Some(profile)),
            country: row.text(Some(country)),
            revenue: row.number(Some(revenue), "revenue"),
            conversions: row.number(Some(conversions), "conversions"),
            units_sold: row.number(units_sold, "units_sold"),
            order_count: row.number(order_count, "order_count"),
            currency: row.text(currency),
            channel_group: row.text(channel_group),
            line: Some(row.line),
            unparsed: row.unparsed,
        });
    }

    Ok(rows)
}
