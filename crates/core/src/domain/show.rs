use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::venue::VenueId;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShowId(pub String);

/// A single booked (or historical) performance.
///
/// The referenced venue may be absent from the current venue collection;
/// consumers resolve that to an "Unknown Venue" sentinel rather than failing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Show {
    pub id: ShowId,
    pub venue_id: VenueId,
    pub start_date: NaiveDate,
    /// Inclusive; equal to `start_date` for same-day shows.
    pub end_date: NaiveDate,
    /// Performance fee. Zero is meaningful ("no fee recorded" or promotional).
    pub fee: Decimal,
    pub merch_sales: Decimal,
    pub materials_cost: Decimal,
    pub expenses: Decimal,
}

impl Show {
    /// Check record invariants: ordered dates and non-negative amounts.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.end_date < self.start_date {
            return Err(DomainError::InvariantViolation(format!(
                "show {} ends before it starts ({} < {})",
                self.id.0, self.end_date, self.start_date
            )));
        }
        for (label, amount) in [
            ("fee", self.fee),
            ("merch_sales", self.merch_sales),
            ("materials_cost", self.materials_cost),
            ("expenses", self.expenses),
        ] {
            if amount < Decimal::ZERO {
                return Err(DomainError::InvariantViolation(format!(
                    "show {} has negative {label}: {amount}",
                    self.id.0
                )));
            }
        }
        Ok(())
    }

    /// Gross revenue: fee plus merchandise sales.
    pub fn revenue(&self) -> Decimal {
        self.fee + self.merch_sales
    }

    /// Net profit; may be negative.
    pub fn profit(&self) -> Decimal {
        self.fee + self.merch_sales - self.materials_cost - self.expenses
    }

    /// Whether the show's inclusive [start, end] interval contains `date`.
    pub fn spans(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    pub fn season(&self) -> Season {
        Season::of(self.start_date)
    }
}

/// Touring seasons by calendar month of the show's start date.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    /// Mar-May = spring, Jun-Aug = summer, Sep-Nov = fall, Dec-Feb = winter.
    pub fn of(date: NaiveDate) -> Self {
        match date.month() {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Fall,
            _ => Season::Winter,
        }
    }
}
