use enumset::EnumSet;

use crate::{
    logs::overview::{Channel, OverviewRecord},
    quantity::energy::KilowattHours,
    summary::scan::OverviewDay,
};

/// Daily deltas and end-of-day lifetime counters.
///
/// Deltas are `last − first` and are never clamped: a counter reset yields a negative delta
/// and is listed in [`DailyTotals::resets`] instead.
#[must_use]
#[derive(Clone, Debug)]
pub struct DailyTotals {
    pub production: KilowattHours,
    pub consumption: KilowattHours,
    pub net: KilowattHours,
    pub lifetime_production: KilowattHours,
    pub lifetime_consumption: KilowattHours,
    pub lifetime_net: KilowattHours,
    pub n_samples: usize,
    pub resets: EnumSet<Channel>,
}

impl DailyTotals {
    pub fn delta(first: &OverviewRecord, last: &OverviewRecord, channel: Channel) -> KilowattHours {
        last.counter(channel) - first.counter(channel)
    }

    /// Single-sample days are valid but carry no information about the day.
    #[must_use]
    pub const fn is_low_confidence(&self) -> bool {
        self.n_samples < 2
    }
}

impl From<&OverviewDay> for DailyTotals {
    fn from(day: &OverviewDay) -> Self {
        let (first, last) = (&day.window.first, &day.window.last);
        Self {
            production: Self::delta(first, last, Channel::Production),
            consumption: Self::delta(first, last, Channel::Consumption),
            net: Self::delta(first, last, Channel::Net),
            lifetime_production: last.lifetime_production,
            lifetime_consumption: last.lifetime_consumption,
            lifetime_net: last.lifetime_net,
            n_samples: day.window.n_samples,
            resets: day.resets,
        }
    }
}
