use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};
use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::prelude::*;

/// Local wall-clock sample time with second precision.
#[must_use]
#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    Ord,
    PartialEq,
    PartialOrd,
    SerializeDisplay,
    DeserializeFromStr,
    derive_more::From,
)]
pub struct Timestamp(pub NaiveDateTime);

impl Timestamp {
    pub const FORMAT: &'static str = "%Y-%m-%d %H:%M:%S";

    /// Accepted on input, the first one is also used for output.
    const INPUT_FORMATS: [&'static str; 4] =
        [Self::FORMAT, "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

    pub fn now() -> Self {
        let now = Local::now().naive_local();
        Self(now.with_nanosecond(0).unwrap_or(now))
    }

    #[must_use]
    pub fn date(self) -> NaiveDate {
        self.0.date()
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

impl FromStr for Timestamp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Self::INPUT_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
            .map(Self)
            .ok_or_else(|| anyhow!("unparseable timestamp `{s}`"))
    }
}
