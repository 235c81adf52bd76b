//! Daily aggregation of the poll logs into one summary row per date.

pub mod monthly;
pub mod production;
pub mod scan;
pub mod totals;
pub mod underperformance;

use bon::Builder;
use chrono::{Month, NaiveDate};
use itertools::Itertools;

use self::{
    monthly::MonthlyRollup,
    production::InverterProduction,
    scan::{scan_inverters, scan_overview},
    totals::DailyTotals,
    underperformance::{Finding, Threshold, detect},
};
use crate::{
    logs::{
        LogPaths,
        summary::{SummaryLog, SummaryRecord, WriteOutcome},
    },
    prelude::*,
};

/// Placeholder serial the gateway reports in development setups.
pub const DEFAULT_TEST_SERIAL: &str = "E00121948024216";

#[must_use]
#[derive(Clone, Debug, Builder)]
pub struct SummaryConfig {
    pub paths: LogPaths,

    #[builder(default)]
    pub threshold: Threshold,

    #[builder(into, default = DEFAULT_TEST_SERIAL.to_owned())]
    pub test_serial: String,
}

/// Everything known about a date after scanning the logs.
#[must_use]
#[derive(Clone, Debug)]
pub struct DailyReport {
    pub date: NaiveDate,
    pub totals: DailyTotals,
    pub production: InverterProduction,
    pub findings: Vec<Finding>,
}

impl DailyReport {
    /// Human-readable alert summary, empty when everything looks fine.
    #[must_use]
    pub fn alerts(&self) -> String {
        let mut parts = Vec::new();
        if !self.findings.is_empty() {
            parts.push(format!(
                "⚠️ {}",
                self.findings
                    .iter()
                    .map(|finding| format!("{} ({:.0}%)", finding.serial, finding.percentage))
                    .join(", "),
            ));
        }
        if !self.totals.resets.is_empty() {
            parts.push(format!("counter reset: {}", self.totals.resets.iter().join(", ")));
        }
        if !self.production.resets.is_empty() {
            parts.push(format!("inverter counter reset: {}", self.production.resets.join(", ")));
        }
        parts.join("; ")
    }

    pub fn to_record(&self) -> SummaryRecord {
        SummaryRecord::builder()
            .date(self.date)
            .daily_production(self.totals.production)
            .daily_consumption(self.totals.consumption)
            .daily_net(self.totals.net)
            .lifetime_production(self.totals.lifetime_production)
            .lifetime_consumption(self.totals.lifetime_consumption)
            .lifetime_net(self.totals.lifetime_net)
            .n_inverters(self.production.len())
            .alerts(self.alerts())
            .build()
    }
}

#[must_use]
#[derive(Debug)]
pub enum DailyOutcome {
    /// No overview samples on the date, nothing has been written.
    NoData,

    /// The date has been summarized before, nothing has been written.
    AlreadyRecorded(DailyReport),

    Recorded(DailyReport),
}

pub struct Summarizer {
    config: SummaryConfig,
}

impl Summarizer {
    pub const fn new(config: SummaryConfig) -> Self {
        Self { config }
    }

    pub fn summary_log(&self) -> SummaryLog {
        SummaryLog::new(&self.config.paths.summary)
    }

    /// Scan the logs and compile the report without writing anything.
    #[instrument(skip_all, fields(%date))]
    pub fn compile(&self, date: NaiveDate) -> Result<Option<DailyReport>> {
        let Some(overview) = scan_overview(&self.config.paths.overview, date)? else {
            return Ok(None);
        };
        let totals = DailyTotals::from(&overview);
        if totals.is_low_confidence() {
            warn!("only one overview sample on the date, the deltas are zero");
        }
        info!(
            production = %totals.production,
            consumption = %totals.consumption,
            net = %totals.net,
            "daily totals",
        );

        let inverters =
            scan_inverters(&self.config.paths.inverters, date, &self.config.test_serial)?;
        let production = InverterProduction::from(&inverters);
        let findings = detect(&production, self.config.threshold);
        if findings.is_empty() {
            info!(n_inverters = production.len(), "all inverters are within the expected range");
        }
        for finding in &findings {
            warn!(
                serial = %finding.serial,
                production = %finding.production,
                mean = %finding.mean,
                percentage = finding.percentage,
                threshold = %self.config.threshold,
                "underperforming inverter",
            );
        }

        Ok(Some(DailyReport { date, totals, production, findings }))
    }

    /// Compile the report and append it to the summary log unless the date is already there.
    #[instrument(skip_all, fields(%date))]
    pub fn run(&self, date: NaiveDate) -> Result<DailyOutcome> {
        let Some(report) = self.compile(date)? else {
            warn!("no overview data for the date");
            return Ok(DailyOutcome::NoData);
        };
        match self.summary_log().record(&report.to_record())? {
            WriteOutcome::Recorded => Ok(DailyOutcome::Recorded(report)),
            WriteOutcome::AlreadyRecorded => Ok(DailyOutcome::AlreadyRecorded(report)),
        }
    }

    pub fn monthly(&self, month: Month) -> Result<MonthlyRollup> {
        MonthlyRollup::from_log(&self.summary_log(), month)
    }
}

#[cfg(test)]
mod tests {
    use std::fs::{read_to_string, write};

    use approx::assert_abs_diff_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::quantity::energy::KilowattHours;

    const OVERVIEW: &str = "\
        Timestamp,Lifetime PV Production (kWh),Lifetime Site Consumption (kWh),Lifetime Net (kWh),\
        Current PV Production (kW),Current Consumption (kW),Current Net Power (kW)\n\
        2025-09-30 06:00:00,100.0,80.0,-20.0,0,1,1\n\
        2025-09-30 20:00:00,122.0,90.0,-32.0,0,1,1\n";

    const INVERTERS: &str = "\
        Timestamp,Serial Number,State,Current PV Production (kW),Lifetime PV Production (kWh)\n\
        2025-09-30 06:00:00,A,idle,0,100.0\n\
        2025-09-30 06:00:00,B,idle,0,200.0\n\
        2025-09-30 06:00:00,C,idle,0,300.0\n\
        2025-09-30 06:00:00,E00121948024216,idle,0,0.0\n\
        2025-09-30 20:00:00,A,idle,0,110.0\n\
        2025-09-30 20:00:00,B,idle,0,210.0\n\
        2025-09-30 20:00:00,C,idle,0,302.0\n\
        2025-09-30 20:00:00,E00121948024216,idle,0,1000.0\n";

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 30).unwrap()
    }

    fn summarizer(dir: &TempDir) -> Result<Summarizer> {
        let paths = LogPaths::in_dir(dir.path());
        write(&paths.overview, OVERVIEW)?;
        write(&paths.inverters, INVERTERS)?;
        Ok(Summarizer::new(SummaryConfig::builder().paths(paths).build()))
    }

    #[test]
    fn report_ok() -> Result {
        let dir = TempDir::new()?;
        let report = summarizer(&dir)?.compile(date())?.context("expected a report")?;
        assert_eq!(report.totals.production, KilowattHours(22.0));
        assert_eq!(report.production.len(), 3, "the test serial is excluded");
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].serial, "C");
        assert_abs_diff_eq!(report.findings[0].mean.0, 22.0 / 3.0);
        assert_eq!(report.alerts(), "⚠️ C (27%)");
        Ok(())
    }

    #[test]
    fn running_twice_writes_one_row() -> Result {
        let dir = TempDir::new()?;
        let summarizer = summarizer(&dir)?;
        assert!(matches!(summarizer.run(date())?, DailyOutcome::Recorded(_)));
        assert!(matches!(summarizer.run(date())?, DailyOutcome::AlreadyRecorded(_)));
        let contents = read_to_string(summarizer.summary_log().path())?;
        let rows: Vec<_> = contents.lines().skip(1).collect();
        assert_eq!(rows, ["2025-09-30,22.0,10.0,-12.0,122.0,90.0,-32.0,3,⚠️ C (27%)"]);
        Ok(())
    }

    #[test]
    fn no_data_writes_nothing() -> Result {
        let dir = TempDir::new()?;
        let summarizer = summarizer(&dir)?;
        let outcome = summarizer.run(NaiveDate::from_ymd_opt(2025, 9, 1).unwrap())?;
        assert!(matches!(outcome, DailyOutcome::NoData));
        assert!(!summarizer.summary_log().path().exists());
        Ok(())
    }

    #[test]
    fn missing_logs_are_no_data() -> Result {
        let dir = TempDir::new()?;
        let summarizer =
            Summarizer::new(SummaryConfig::builder().paths(LogPaths::in_dir(dir.path())).build());
        assert!(matches!(summarizer.run(date())?, DailyOutcome::NoData));
        Ok(())
    }

    #[test]
    fn counter_resets_go_to_the_alerts() -> Result {
        let dir = TempDir::new()?;
        let paths = LogPaths::in_dir(dir.path());
        write(&paths.overview, OVERVIEW.replace("122.0,90.0", "2.0,90.0"))?;
        let summarizer = Summarizer::new(SummaryConfig::builder().paths(paths).build());
        let report = summarizer.compile(date())?.context("expected a report")?;
        assert_eq!(report.totals.production, KilowattHours(-98.0));
        assert_eq!(report.alerts(), "counter reset: PV production");
        Ok(())
    }

    #[test]
    fn summary_rows_feed_the_monthly_rollup() -> Result {
        let dir = TempDir::new()?;
        let summarizer = summarizer(&dir)?;
        assert!(matches!(summarizer.run(date())?, DailyOutcome::Recorded(_)));
        let rollup = summarizer.monthly(Month::September)?;
        let totals = rollup.year(2025).context("expected 2025")?;
        assert_eq!(totals.n_days(), 1);
        assert_eq!(totals.production, KilowattHours(22.0));
        Ok(())
    }
}
