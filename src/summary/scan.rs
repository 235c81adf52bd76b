//! Single-pass date-windowed scans over the poll logs.

use std::{collections::HashMap, path::Path};

use chrono::NaiveDate;
use enumset::EnumSet;

use crate::{
    logs::{
        self,
        inverters::InverterRecord,
        overview::{Channel, OverviewRecord},
    },
    prelude::*,
};

/// First and last rows of a day, in log order.
#[must_use]
#[derive(Clone, Debug)]
pub struct DayWindow<R> {
    pub first: R,
    pub last: R,
    pub n_samples: usize,
}

impl<R: Clone> DayWindow<R> {
    fn new(record: R) -> Self {
        Self { first: record.clone(), last: record, n_samples: 1 }
    }

    fn push(&mut self, record: R) {
        self.last = record;
        self.n_samples += 1;
    }
}

/// Overview rows of a single day.
#[must_use]
#[derive(Clone, Debug)]
pub struct OverviewDay {
    pub window: DayWindow<OverviewRecord>,

    /// Counters that went down between two consecutive samples.
    pub resets: EnumSet<Channel>,
}

impl OverviewDay {
    fn new(record: OverviewRecord) -> Self {
        Self { window: DayWindow::new(record), resets: EnumSet::empty() }
    }

    fn push(&mut self, record: OverviewRecord) {
        for channel in Channel::monotonic() {
            if record.counter(channel) < self.window.last.counter(channel) {
                warn!(%channel, timestamp = %record.timestamp, "cumulative counter went down");
                self.resets.insert(channel);
            }
        }
        self.window.push(record);
    }
}

/// Inverter rows of a single day.
#[must_use]
#[derive(Clone, Debug)]
pub struct InverterDay {
    pub window: DayWindow<InverterRecord>,
    pub has_reset: bool,
}

impl InverterDay {
    pub fn serial(&self) -> &str {
        &self.window.first.serial
    }

    fn push(&mut self, record: InverterRecord) {
        if record.lifetime_energy < self.window.last.lifetime_energy {
            warn!(
                serial = %record.serial,
                timestamp = %record.timestamp,
                "lifetime energy went down",
            );
            self.has_reset = true;
        }
        self.window.push(record);
    }
}

/// Per-inverter windows in the order the serials were first seen.
#[must_use]
#[derive(Clone, Debug, Default)]
pub struct InverterDays {
    days: Vec<InverterDay>,
    indices: HashMap<String, usize>,
}

impl InverterDays {
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InverterDay> {
        self.days.iter()
    }

    fn push(&mut self, record: InverterRecord) {
        if let Some(index) = self.indices.get(&record.serial) {
            self.days[*index].push(record);
        } else {
            self.indices.insert(record.serial.clone(), self.days.len());
            self.days.push(InverterDay { window: DayWindow::new(record), has_reset: false });
        }
    }
}

/// Find the first and last overview rows of the date.
///
/// Returns [`None`] when the log is missing or has no rows on that date.
#[instrument(skip_all, fields(path = %path.display(), %date))]
pub fn scan_overview(path: &Path, date: NaiveDate) -> Result<Option<OverviewDay>> {
    let Some(mut reader) = logs::open(path)? else {
        warn!("the overview log does not exist");
        return Ok(None);
    };
    let mut day: Option<OverviewDay> = None;
    for record in reader.deserialize::<OverviewRecord>() {
        let record =
            record.with_context(|| format!("malformed record in `{}`", path.display()))?;
        if record.timestamp.date() != date {
            continue;
        }
        match &mut day {
            Some(day) => day.push(record),
            None => day = Some(OverviewDay::new(record)),
        }
    }
    if let Some(day) = &day {
        info!(
            first = %day.window.first.timestamp,
            last = %day.window.last.timestamp,
            n_samples = day.window.n_samples,
            "found",
        );
    }
    Ok(day)
}

/// Find the first and last rows of every inverter on the date, skipping the test serial.
#[instrument(skip_all, fields(path = %path.display(), %date))]
pub fn scan_inverters(path: &Path, date: NaiveDate, test_serial: &str) -> Result<InverterDays> {
    let Some(mut reader) = logs::open(path)? else {
        warn!("the inverter log does not exist");
        return Ok(InverterDays::default());
    };
    let mut days = InverterDays::default();
    for record in reader.deserialize::<InverterRecord>() {
        let record =
            record.with_context(|| format!("malformed record in `{}`", path.display()))?;
        if record.timestamp.date() == date && record.serial != test_serial {
            days.push(record);
        }
    }
    info!(n_inverters = days.len(), "found");
    Ok(days)
}

#[cfg(test)]
mod tests {
    use std::fs::write;

    use tempfile::TempDir;

    use super::*;
    use crate::quantity::energy::KilowattHours;

    const OVERVIEW: &str = "\
        Timestamp,Lifetime PV Production (kWh),Lifetime Site Consumption (kWh),Lifetime Net (kWh),\
        Current PV Production (kW),Current Consumption (kW),Current Net Power (kW)\n\
        2025-09-29 23:45:00,99.0,79.0,-20.0,0,0.5,0.5\n\
        2025-09-30 00:00:00,100.0,80.0,-20.0,0,0.5,0.5\n\
        2025-09-30 12:00:00,110.0,85.0,-25.0,4.0,1.0,-3.0\n\
        2025-09-30 23:45:00,120.5,90.0,-30.5,0,0.4,0.4\n\
        2025-10-01 00:00:00,120.5,90.1,-30.4,0,0.4,0.4\n";

    const INVERTERS: &str = "\
        Timestamp,Serial Number,State,Current PV Production (kW),Lifetime PV Production (kWh)\n\
        2025-09-30 08:00:00,B,working,0.1,50.0\n\
        2025-09-30 08:00:00,A,working,0.1,40.0\n\
        2025-09-30 08:00:00,E00121948024216,working,0.3,1.0\n\
        2025-09-30 18:00:00,B,idle,0,52.0\n\
        2025-09-30 18:00:00,A,idle,0,41.0\n\
        2025-09-30 18:00:00,E00121948024216,idle,0,9.0\n\
        2025-10-01 08:00:00,C,working,0.1,10.0\n";

    const TEST_SERIAL: &str = "E00121948024216";

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 30).unwrap()
    }

    #[test]
    fn overview_window_stays_within_the_date() -> Result {
        let dir = TempDir::new()?;
        let path = dir.path().join("overview.csv");
        write(&path, OVERVIEW)?;
        let day = scan_overview(&path, date())?.context("expected a window")?;
        assert_eq!(day.window.first.timestamp.date(), date());
        assert_eq!(day.window.last.timestamp.date(), date());
        assert_eq!(day.window.first.lifetime_production, KilowattHours(100.0));
        assert_eq!(day.window.last.lifetime_production, KilowattHours(120.5));
        assert_eq!(day.window.n_samples, 3);
        assert!(day.resets.is_empty());
        Ok(())
    }

    #[test]
    fn no_rows_on_the_date() -> Result {
        let dir = TempDir::new()?;
        let path = dir.path().join("overview.csv");
        write(&path, OVERVIEW)?;
        assert!(scan_overview(&path, NaiveDate::from_ymd_opt(2025, 9, 1).unwrap())?.is_none());
        Ok(())
    }

    #[test]
    fn missing_logs_yield_no_data() -> Result {
        let dir = TempDir::new()?;
        assert!(scan_overview(&dir.path().join("absent.csv"), date())?.is_none());
        assert!(scan_inverters(&dir.path().join("absent.csv"), date(), TEST_SERIAL)?.is_empty());
        Ok(())
    }

    #[test]
    fn malformed_timestamp_stops_the_scan() -> Result {
        let dir = TempDir::new()?;
        let path = dir.path().join("overview.csv");
        write(&path, OVERVIEW.replace("2025-09-30 12:00:00", "noon"))?;
        assert!(scan_overview(&path, date()).is_err());
        Ok(())
    }

    #[test]
    fn counter_reset_is_surfaced() -> Result {
        let dir = TempDir::new()?;
        let path = dir.path().join("overview.csv");
        write(&path, OVERVIEW.replace("110.0,85.0", "0.0,85.0"))?;
        let day = scan_overview(&path, date())?.context("expected a window")?;
        assert_eq!(day.resets, EnumSet::only(Channel::Production));
        Ok(())
    }

    #[test]
    fn exporting_day_is_not_a_reset() -> Result {
        let dir = TempDir::new()?;
        let path = dir.path().join("overview.csv");
        write(&path, OVERVIEW)?;
        let day = scan_overview(&path, date())?.context("expected a window")?;
        assert!(day.window.last.lifetime_net < day.window.first.lifetime_net);
        assert!(day.resets.is_empty());
        Ok(())
    }

    #[test]
    fn consumption_reset_is_surfaced() -> Result {
        let dir = TempDir::new()?;
        let path = dir.path().join("overview.csv");
        write(&path, OVERVIEW.replace("110.0,85.0", "110.0,1.0"))?;
        let day = scan_overview(&path, date())?.context("expected a window")?;
        assert_eq!(day.resets, EnumSet::only(Channel::Consumption));
        Ok(())
    }

    #[test]
    fn inverters_keep_first_seen_order_and_skip_the_test_serial() -> Result {
        let dir = TempDir::new()?;
        let path = dir.path().join("inverters.csv");
        write(&path, INVERTERS)?;
        let days = scan_inverters(&path, date(), TEST_SERIAL)?;
        let serials: Vec<_> = days.iter().map(InverterDay::serial).collect();
        assert_eq!(serials, ["B", "A"]);
        assert!(days.iter().all(|day| day.serial() != TEST_SERIAL));
        let a = days.iter().find(|day| day.serial() == "A").context("expected A")?;
        assert_eq!(a.window.first.lifetime_energy, KilowattHours(40.0));
        assert_eq!(a.window.last.lifetime_energy, KilowattHours(41.0));
        assert!(!a.has_reset);
        Ok(())
    }
}
