use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use crate::{
    prelude::*,
    quantity::energy::KilowattHours,
    summary::production::InverterProduction,
};

/// Fraction of the fleet mean below which an inverter is reported.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Threshold(pub f64);

impl Default for Threshold {
    fn default() -> Self {
        Self(0.8)
    }
}

impl FromStr for Threshold {
    type Err = Error;

    /// Accepts a fraction in `(0, 1]`.
    fn from_str(s: &str) -> Result<Self> {
        let fraction: f64 =
            s.trim().parse().with_context(|| format!("`{s}` is not a number"))?;
        ensure!(
            fraction > 0.0 && fraction <= 1.0,
            "the threshold must be a fraction in (0, 1], got `{s}`",
        );
        Ok(Self(fraction))
    }
}

impl Display for Threshold {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0}%", self.0 * 100.0)
    }
}

#[must_use]
#[derive(Clone, Debug)]
pub struct Finding {
    pub serial: String,
    pub production: KilowattHours,
    pub mean: KilowattHours,

    /// Production as a percentage of the mean.
    pub percentage: f64,
}

/// Report inverters producing less than `threshold × mean`, in the production order.
pub fn detect(production: &InverterProduction, threshold: Threshold) -> Vec<Finding> {
    let Some(mean) = production.mean() else {
        return Vec::new();
    };
    production
        .iter()
        .filter(|(_, production)| *production < mean * threshold.0)
        .map(|(serial, production)| Finding {
            serial: serial.to_owned(),
            production,
            mean,
            percentage: if mean == KilowattHours::ZERO { 0.0 } else { production / mean * 100.0 },
        })
        .collect()
}
