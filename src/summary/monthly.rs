use std::collections::BTreeMap;

use chrono::{Datelike, Month, NaiveDate};

use crate::{
    logs::summary::{LoggedDay, SummaryLog},
    prelude::*,
    quantity::energy::KilowattHours,
};

/// One calendar month across all the years present in the summary log.
#[must_use]
#[derive(Clone, Debug)]
pub struct MonthlyRollup {
    pub month: Month,

    /// Ascending by year.
    pub years: Vec<YearTotals>,
}

#[must_use]
#[derive(Clone, Debug)]
pub struct YearTotals {
    pub year: i32,
    pub production: KilowattHours,
    pub consumption: KilowattHours,
    pub net: KilowattHours,

    /// Daily breakdown in the log order.
    pub days: Vec<LoggedDay>,
}

impl YearTotals {
    fn new(year: i32) -> Self {
        Self {
            year,
            production: KilowattHours::ZERO,
            consumption: KilowattHours::ZERO,
            net: KilowattHours::ZERO,
            days: Vec::new(),
        }
    }

    /// Blank values count as zero so that the day still counts towards the average.
    fn push(&mut self, day: LoggedDay) {
        self.production += day.daily_production.unwrap_or_default();
        self.consumption += day.daily_consumption.unwrap_or_default();
        self.net += day.daily_net.unwrap_or_default();
        self.days.push(day);
    }

    #[must_use]
    pub fn n_days(&self) -> usize {
        self.days.len()
    }

    #[expect(clippy::cast_precision_loss)]
    pub fn average_daily_production(&self) -> KilowattHours {
        if self.days.is_empty() {
            KilowattHours::ZERO
        } else {
            self.production / self.days.len() as f64
        }
    }
}

impl MonthlyRollup {
    pub fn from_days(month: Month, days: impl IntoIterator<Item = LoggedDay>) -> Self {
        let mut years = BTreeMap::<i32, YearTotals>::new();
        for day in days {
            if day.date.month() == month.number_from_month() {
                let year = day.date.year();
                years.entry(year).or_insert_with(|| YearTotals::new(year)).push(day);
            }
        }
        Self { month, years: years.into_values().collect() }
    }

    /// Read the summary log once and roll up the month.
    #[instrument(skip_all, fields(path = %log.path().display(), month = month.name()))]
    pub fn from_log(log: &SummaryLog, month: Month) -> Result<Self> {
        let this = Self::from_days(month, log.read_all()?);
        info!(n_years = this.years.len(), "rolled up");
        Ok(this)
    }

    pub fn year(&self, year: i32) -> Option<&YearTotals> {
        self.years.iter().find(|totals| totals.year == year)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}

/// The calendar month that ends right before the date's month.
#[must_use]
pub fn preceding_month(date: NaiveDate) -> (i32, Month) {
    let month = Month::try_from(u8::try_from(date.month()).unwrap_or(1)).unwrap_or(Month::January);
    if month == Month::January {
        (date.year() - 1, Month::December)
    } else {
        (date.year(), month.pred())
    }
}
