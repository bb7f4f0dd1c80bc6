//! Raw record validation: turns data-source rows into typed records.
//!
//! A row missing a required field, or carrying any cell that did not parse,
//! is rejected with [`ReconError::MalformedRecord`], logged, and skipped. Rejection never
//! aborts the batch. Numeric values are not range-checked: negative costs or
//! counts pass through unchanged.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::config::{MarketConfig, SyncConfig};
use crate::error::ReconError;
use crate::model::{
    AdDetail, AdvertisingRecord, RawAdRecord, RawSalesRecord, RecordKind, SalesRecord,
};

/// Fallbacks applied to optional fields while validating.
#[derive(Debug, Clone)]
pub struct RecordDefaults {
    pub ad_channel: String,
    pub sales_channel: String,
    pub currency: String,
    pub markets: BTreeMap<String, MarketConfig>,
}

impl RecordDefaults {
    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            ad_channel: config.ad_channel.clone(),
            sales_channel: config.organic_channel.clone(),
            currency: config.default_currency.clone(),
            markets: config.market_table(),
        }
    }

    /// Explicit currency, else the market's currency, else the default.
    /// `code` matches a `[markets]` key first, then a market's `country_code`.
    fn currency(&self, explicit: Option<String>, code: &str) -> String {
        explicit
            .or_else(|| self.market(code).map(|m| m.currency.clone()))
            .unwrap_or_else(|| self.currency.clone())
    }

    fn market(&self, code: &str) -> Option<&MarketConfig> {
        self.markets
            .get(code)
            .or_else(|| self.markets.values().find(|m| m.country_code == code))
    }
}

/// Records that passed validation plus the rejections.
#[derive(Debug)]
pub struct Validated<T> {
    pub records: Vec<T>,
    pub rejected: Vec<ReconError>,
}

/// Blank strings count as missing.
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Where a row sits, for rejection messages.
#[derive(Debug, Clone, Copy)]
struct RowRef {
    kind: RecordKind,
    index: usize,
    line: Option<usize>,
}

impl RowRef {
    fn reject(self, reason: String) -> ReconError {
        ReconError::MalformedRecord { kind: self.kind, index: self.index, line: self.line, reason }
    }

    fn required<T>(self, value: Option<T>, field: &str) -> Result<T, ReconError> {
        value.ok_or_else(|| self.reject(format!("missing required field '{field}'")))
    }

    fn date(self, value: Option<String>) -> Result<NaiveDate, ReconError> {
        let value = self.required(present(value), "date")?;
        NaiveDate::parse_from_str(&value, "%Y-%m-%d")
            .map_err(|_| self.reject(format!("cannot parse date '{value}'")))
    }

    /// Any present-but-unparseable cell rejects the row, required or not.
    fn parsed(self, unparsed: &[String]) -> Result<(), ReconError> {
        if unparsed.is_empty() {
            Ok(())
        } else {
            Err(self.reject(format!("cannot parse {}", unparsed.join(", "))))
        }
    }
}

impl RawAdRecord {
    /// `index` is the row's position in its batch, used in error messages.
    pub fn into_record(self, index: usize, defaults: &RecordDefaults) -> Result<AdvertisingRecord, ReconError> {
        let at = RowRef { kind: RecordKind::Advertising, index, line: self.line };
        at.parsed(&self.unparsed)?;
        let date = at.date(self.date)?;
        let campaign_id = at.required(present(self.campaign_id), "campaign_id")?;
        let campaign_name = at.required(present(self.campaign_name), "campaign_name")?;
        let cost = at.required(self.cost, "cost")?;
        let impressions = at.required(self.impressions, "impressions")?;
        let clicks = at.required(self.clicks, "clicks")?;
        let market = at.required(present(self.market), "market")?;

        let currency = defaults.currency(present(self.currency), &market);
        let channel_group =
            present(self.channel_group).unwrap_or_else(|| defaults.ad_channel.clone());

        Ok(AdvertisingRecord {
            date,
            campaign_id,
            campaign_name,
            cost,
            impressions,
            clicks,
            market,
            revenue: self.revenue.unwrap_or(0.0),
            conversions: self.conversions.unwrap_or(0),
            currency,
            channel_group,
            detail: AdDetail {
                ad_group_id: present(self.ad_group_id),
                ad_group_name: present(self.ad_group_name),
                ad_id: present(self.ad_id),
                keyword: present(self.keyword),
                in_store_attributed_sales: self.in_store_attributed_sales.unwrap_or(0.0),
                online_attributed_sales: self.online_attributed_sales.unwrap_or(0.0),
                new_to_brand_sales: self.new_to_brand_sales.unwrap_or(0.0),
                new_to_brand_orders: self.new_to_brand_orders.unwrap_or(0),
            },
        })
    }
}

impl RawSalesRecord {
    pub fn into_record(self, index: usize, defaults: &RecordDefaults) -> Result<SalesRecord, ReconError> {
        let at = RowRef { kind: RecordKind::Sales, index, line: self.line };
        at.parsed(&self.unparsed)?;
        let date = at.date(self.date)?;
        let profile = at.required(present(self.profile), "profile")?;
        let country = at.required(present(self.country), "country")?;
        let revenue = at.required(self.revenue, "revenue")?;
        let conversions = at.required(self.conversions, "conversions")?;

        let currency = defaults.currency(present(self.currency), &country);
        let channel_group =
            present(self.channel_group).unwrap_or_else(|| defaults.sales_channel.clone());

        Ok(SalesRecord {
            date,
            profile,
            country,
            revenue,
            conversions,
            units_sold: self.units_sold.unwrap_or(0),
            order_count: self.order_count.unwrap_or(conversions),
            currency,
            channel_group,
        })
    }
}

pub fn validate_ads(raw: Vec<RawAdRecord>, defaults: &RecordDefaults) -> Validated<AdvertisingRecord> {
    partition(raw, |row, i| row.into_record(i, defaults))
}

pub fn validate_sales(raw: Vec<RawSalesRecord>, defaults: &RecordDefaults) -> Validated<SalesRecord> {
    partition(raw, |row, i| row.into_record(i, defaults))
}

fn partition<R, T>(raw: Vec<R>, convert: impl Fn(R, usize) -> Result<T, ReconError>) -> Validated<T> {
    let mut records = Vec::with_capacity(raw.len());
    let mut rejected = Vec::new();

    for (i, row) in raw.into_iter().enumerate() {
        match convert(row, i) {
            Ok(record) => records.push(record),
            Err(e) => {
                log::warn!("skipping {e}");
                rejected.push(e);
            }
        }
    }

    Validated { records, rejected }
}
