use bon::Builder;
use enumset::{EnumSet, EnumSetType};
use serde::{Deserialize, Serialize};

use crate::{
    quantity::{energy::KilowattHours, power::Kilowatts},
    timestamp::Timestamp,
};

/// System-wide totals, one row per poll.
#[must_use]
#[derive(Clone, Debug, Serialize, Deserialize, Builder)]
pub struct OverviewRecord {
    #[serde(rename = "Timestamp")]
    pub timestamp: Timestamp,

    #[serde(rename = "Lifetime PV Production (kWh)")]
    pub lifetime_production: KilowattHours,

    #[serde(rename = "Lifetime Site Consumption (kWh)", alias = "Lifetime Site Load (kWh)")]
    pub lifetime_consumption: KilowattHours,

    #[serde(rename = "Lifetime Net (kWh)")]
    pub lifetime_net: KilowattHours,

    #[serde(rename = "Current PV Production (kW)")]
    pub production: Kilowatts,

    #[serde(rename = "Current Consumption (kW)")]
    pub consumption: Kilowatts,

    #[serde(rename = "Current Net Power (kW)")]
    pub net_power: Kilowatts,
}

impl OverviewRecord {
    pub const fn counter(&self, channel: Channel) -> KilowattHours {
        match channel {
            Channel::Production => self.lifetime_production,
            Channel::Consumption => self.lifetime_consumption,
            Channel::Net => self.lifetime_net,
        }
    }
}

/// Cumulative energy counter reported by the gateway.
#[derive(Debug, Hash, EnumSetType, derive_more::Display)]
pub enum Channel {
    #[display("PV production")]
    Production,

    #[display("site consumption")]
    Consumption,

    #[display("net")]
    Net,
}

impl Channel {
    /// Counters that never go down on a healthy gateway: net decreases whenever the site exports.
    pub fn monotonic() -> EnumSet<Self> {
        Self::Production | Self::Consumption
    }
}
