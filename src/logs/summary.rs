use std::path::{Path, PathBuf};

use bon::Builder;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{logs, prelude::*, quantity::energy::KilowattHours};

/// One row per calendar date.
#[must_use]
#[derive(Clone, Debug, Serialize, Builder)]
pub struct SummaryRecord {
    #[serde(rename = "Date")]
    pub date: NaiveDate,

    #[serde(rename = "Daily PV Production (kWh)")]
    pub daily_production: KilowattHours,

    #[serde(rename = "Daily Site Consumption (kWh)")]
    pub daily_consumption: KilowattHours,

    #[serde(rename = "Daily Net Grid (kWh)")]
    pub daily_net: KilowattHours,

    #[serde(rename = "Lifetime PV (kWh)")]
    pub lifetime_production: KilowattHours,

    #[serde(rename = "Lifetime Site Consumption (kWh)")]
    pub lifetime_consumption: KilowattHours,

    #[serde(rename = "Lifetime Net (kWh)")]
    pub lifetime_net: KilowattHours,

    #[serde(rename = "Inverters Reporting")]
    pub n_inverters: usize,

    #[serde(rename = "Alerts")]
    #[builder(into, default)]
    pub alerts: String,
}

impl SummaryRecord {
    pub const HEADER: [&'static str; 9] = [
        "Date",
        "Daily PV Production (kWh)",
        "Daily Site Consumption (kWh)",
        "Daily Net Grid (kWh)",
        "Lifetime PV (kWh)",
        "Lifetime Site Consumption (kWh)",
        "Lifetime Net (kWh)",
        "Inverters Reporting",
        "Alerts",
    ];

    /// Spreadsheet cells in the [`Self::HEADER`] order.
    #[must_use]
    pub fn to_cells(&self) -> Vec<Value> {
        vec![
            json!(self.date.format("%Y-%m-%d").to_string()),
            json!(self.daily_production.0),
            json!(self.daily_consumption.0),
            json!(self.daily_net.0),
            json!(self.lifetime_production.0),
            json!(self.lifetime_consumption.0),
            json!(self.lifetime_net.0),
            json!(self.n_inverters),
            json!(self.alerts),
        ]
    }
}

/// Leniently parsed summary row: blank or garbled numbers read as [`None`].
#[must_use]
#[derive(Clone, Debug, Deserialize)]
pub struct LoggedDay {
    #[serde(rename = "Date")]
    pub date: NaiveDate,

    #[serde(
        rename = "Daily PV Production (kWh)",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    pub daily_production: Option<KilowattHours>,

    #[serde(
        rename = "Daily Site Consumption (kWh)",
        alias = "Daily Site Load (kWh)",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    pub daily_consumption: Option<KilowattHours>,

    #[serde(rename = "Daily Net Grid (kWh)", default, deserialize_with = "csv::invalid_option")]
    pub daily_net: Option<KilowattHours>,

    #[serde(rename = "Inverters Reporting", default, deserialize_with = "csv::invalid_option")]
    pub n_inverters: Option<usize>,

    #[serde(rename = "Alerts", default)]
    pub alerts: String,
}

/// Outcome of an idempotent append.
#[must_use]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum WriteOutcome {
    Recorded,
    AlreadyRecorded,
}

pub struct SummaryLog {
    path: PathBuf,
}

impl SummaryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check whether a row for the date has already been written.
    #[instrument(skip_all, fields(path = %self.path.display(), %date))]
    pub fn contains(&self, date: NaiveDate) -> Result<bool> {
        #[derive(Deserialize)]
        struct DateColumn {
            #[serde(rename = "Date")]
            date: String,
        }

        let Some(mut reader) = logs::open(&self.path)? else {
            return Ok(false);
        };
        let needle = date.format("%Y-%m-%d").to_string();
        for row in reader.deserialize::<DateColumn>() {
            let row =
                row.with_context(|| format!("malformed record in `{}`", self.path.display()))?;
            if row.date == needle {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Append the record unless its date is already present.
    ///
    /// This is a read-then-append check, not a lock: two concurrent writers may still race.
    #[instrument(skip_all, fields(path = %self.path.display(), date = %record.date))]
    pub fn record(&self, record: &SummaryRecord) -> Result<WriteOutcome> {
        if self.contains(record.date)? {
            warn!("the date is already recorded, skipping");
            return Ok(WriteOutcome::AlreadyRecorded);
        }
        logs::append(&self.path, [record])?;
        info!("recorded");
        Ok(WriteOutcome::Recorded)
    }

    /// Read all rows, or nothing if the log does not exist.
    pub fn read_all(&self) -> Result<Vec<LoggedDay>> {
        let Some(mut reader) = logs::open(&self.path)? else {
            return Ok(Vec::new());
        };
        reader
            .deserialize::<LoggedDay>()
            .map(|row| {
                row.with_context(|| format!("malformed record in `{}`", self.path.display()))
            })
            .collect()
    }
}
