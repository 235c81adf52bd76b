use itertools::Itertools;

use crate::{quantity::energy::KilowattHours, summary::scan::InverterDays};

/// Daily production per inverter, in the order the inverters were first seen.
#[must_use]
#[derive(Clone, Debug, Default)]
pub struct InverterProduction {
    entries: Vec<(String, KilowattHours)>,

    /// Inverters whose lifetime energy went down during the day.
    pub resets: Vec<String>,
}

impl InverterProduction {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, KilowattHours)> {
        self.entries.iter().map(|(serial, production)| (serial.as_str(), *production))
    }

    /// Arithmetic mean over all inverters, [`None`] when there are none.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn mean(&self) -> Option<KilowattHours> {
        (!self.is_empty()).then(|| {
            self.entries.iter().map(|(_, production)| *production).sum::<KilowattHours>()
                / self.len() as f64
        })
    }

    /// Inverters sorted by production, the best first.
    pub fn ranked(&self) -> Vec<(&str, KilowattHours)> {
        self.iter().sorted_by(|(_, lhs), (_, rhs)| rhs.cmp(lhs)).collect()
    }
}

impl From<&InverterDays> for InverterProduction {
    fn from(days: &InverterDays) -> Self {
        Self {
            entries: days
                .iter()
                .map(|day| {
                    let production =
                        day.window.last.lifetime_energy - day.window.first.lifetime_energy;
                    (day.serial().to_owned(), production)
                })
                .collect(),
            resets: days
                .iter()
                .filter(|day| day.has_reset)
                .map(|day| day.serial().to_owned())
                .collect(),
        }
    }
}

impl<S: Into<String>> FromIterator<(S, KilowattHours)> for InverterProduction {
    fn from_iter<T: IntoIterator<Item = (S, KilowattHours)>>(iterator: T) -> Self {
        Self {
            entries: iterator
                .into_iter()
                .map(|(serial, production)| (serial.into(), production))
                .collect(),
            resets: Vec::new(),
        }
    }
}
