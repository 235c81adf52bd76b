use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::{
    quantity::{energy::KilowattHours, power::Kilowatts},
    timestamp::Timestamp,
};

/// One row per poll and inverter.
#[must_use]
#[derive(Clone, Debug, Serialize, Deserialize, Builder)]
pub struct InverterRecord {
    #[serde(rename = "Timestamp")]
    pub timestamp: Timestamp,

    #[serde(rename = "Serial Number")]
    #[builder(into)]
    pub serial: String,

    #[serde(rename = "State")]
    #[builder(into)]
    pub state: String,

    #[serde(rename = "Current PV Production (kW)", alias = "Current PV Production  (kW)")]
    pub power: Kilowatts,

    #[serde(rename = "Lifetime PV Production (kWh)", alias = "Lifetime Energy (kWh)")]
    pub lifetime_energy: KilowattHours,
}
