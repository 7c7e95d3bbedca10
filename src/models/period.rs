use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

use crate::error::{Error, Result};

/// Inclusive date range for a receipt search. `from <= to` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
    from: NaiveDate,
    to: NaiveDate,
}

impl Period {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        if from > to {
            return Err(Error::InvalidPeriod(format!(
                "period_from {} is after period_to {}",
                from, to
            )));
        }
        Ok(Self { from, to })
    }

    pub fn start(&self) -> NaiveDate {
        self.from
    }

    pub fn end(&self) -> NaiveDate {
        self.to
    }

    /// Dates as the portal expects them in query strings, day without padding.
    pub fn query_dates(&self) -> (String, String) {
        (
            self.from.format("%Y-%m-%-d").to_string(),
            self.to.format("%Y-%m-%-d").to_string(),
        )
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.from, self.to)
    }
}
