//! Open-date scoring for booking a venue in a target month.
//!
//! Every free calendar date starts at the base score and collects bonuses
//! for weekend draw, routing proximity to already-booked shows, and outdoor
//! season fit. Dates overlapped by an existing show are skipped outright,
//! whatever they would have scored.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::show::Show;
use crate::domain::venue::{Venue, VenueId};
use crate::geo::distance_miles;

/// Scoring constants for date suggestions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingWeights {
    /// Every free date starts here (default: 50).
    pub base_score: i32,
    /// Friday/Saturday bonus (default: 20).
    pub weekend_bonus: i32,
    /// Sunday bonus (default: 10).
    pub sunday_bonus: i32,
    /// Per qualifying nearby show (default: 15, cumulative).
    pub nearby_show_bonus: i32,
    /// A booked show within this many days of the candidate counts as
    /// nearby in time; the same day does not (default: 3).
    pub nearby_window_days: i64,
    /// A nearby show's venue must be within this range of the target
    /// (default: 150 mi).
    pub nearby_radius_miles: f64,
    /// Outdoor-venue bonus during the outdoor months (default: 10).
    pub outdoor_bonus: i32,
    /// Suggestions below this score are dropped (default: 50).
    pub min_score: i32,
    /// Result list cap (default: 10).
    pub max_suggestions: usize,
    /// A venue type containing one of these (case-insensitive) counts as
    /// outdoor.
    pub outdoor_keywords: Vec<String>,
}

impl Default for SchedulingWeights {
    fn default() -> Self {
        Self {
            base_score: 50,
            weekend_bonus: 20,
            sunday_bonus: 10,
            nearby_show_bonus: 15,
            nearby_window_days: 3,
            nearby_radius_miles: 150.0,
            outdoor_bonus: 10,
            min_score: 50,
            max_suggestions: 10,
            outdoor_keywords: vec![
                "fair".to_string(),
                "festival".to_string(),
                "outdoor".to_string(),
            ],
        }
    }
}

/// Outdoor-season months (May through August).
const OUTDOOR_MONTHS: std::ops::RangeInclusive<u32> = 5..=8;

/// One ranked open date.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DateSuggestion {
    pub date: NaiveDate,
    /// Full weekday name, for display.
    pub weekday: String,
    pub score: i32,
    pub reasons: Vec<String>,
}

/// Stateless per-date scorer.
#[derive(Clone, Debug, Default)]
pub struct SchedulingAdvisor {
    weights: SchedulingWeights,
}

impl SchedulingAdvisor {
    pub fn new(weights: SchedulingWeights) -> Self {
        Self { weights }
    }

    /// Rank the open dates of `month` (1-12) in `year` for booking `target`.
    ///
    /// The engine takes the year explicitly so it never reads the clock;
    /// callers pass the current year.
    pub fn suggest_dates(
        &self,
        shows: &[Show],
        venues: &[Venue],
        target: &Venue,
        year: i32,
        month: u32,
    ) -> Vec<DateSuggestion> {
        let by_id: HashMap<&VenueId, &Venue> = venues.iter().map(|v| (&v.id, v)).collect();
        let mut suggestions = Vec::new();

        for day in 1..=31 {
            let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
                break;
            };
            if shows.iter().any(|s| s.spans(date)) {
                continue;
            }
            suggestions.push(self.score_date(date, shows, &by_id, target));
        }

        suggestions.retain(|s| s.score >= self.weights.min_score);
        // Stable sort keeps earlier dates first among equal scores.
        suggestions.sort_by(|a, b| b.score.cmp(&a.score));
        suggestions.truncate(self.weights.max_suggestions);
        debug!(venue = %target.id.0, month, suggestions = suggestions.len(), "date suggestions");
        suggestions
    }

    fn score_date(
        &self,
        date: NaiveDate,
        shows: &[Show],
        by_id: &HashMap<&VenueId, &Venue>,
        target: &Venue,
    ) -> DateSuggestion {
        let w = &self.weights;
        let mut score = w.base_score;
        let mut reasons = Vec::new();

        match date.weekday() {
            Weekday::Fri | Weekday::Sat => {
                score += w.weekend_bonus;
                reasons.push("Strong weekend draw".to_string());
            }
            Weekday::Sun => {
                score += w.sunday_bonus;
                reasons.push("Sunday afternoon slot".to_string());
            }
            _ => {}
        }

        if let Some(target_location) = target.location() {
            for show in shows {
                let gap = (show.start_date - date).num_days().abs();
                if gap == 0 || gap > w.nearby_window_days {
                    continue;
                }
                let Some(nearby) = by_id.get(&show.venue_id) else {
                    continue;
                };
                let Some(location) = nearby.location() else {
                    continue;
                };
                let miles = distance_miles(target_location, location);
                if miles <= w.nearby_radius_miles {
                    score += w.nearby_show_bonus;
                    reasons.push(format!(
                        "Routes with {} ({miles:.0} mi away) on {}",
                        nearby.name, show.start_date
                    ));
                }
            }
        }

        if OUTDOOR_MONTHS.contains(&date.month()) && self.is_outdoor(target) {
            score += w.outdoor_bonus;
            reasons.push("Peak outdoor season".to_string());
        }

        DateSuggestion { date, weekday: date.format("%A").to_string(), score, reasons }
    }

    fn is_outdoor(&self, venue: &Venue) -> bool {
        let Some(label) = venue.venue_type.as_deref() else {
            return false;
        };
        let label = label.to_ascii_lowercase();
        self.weights.outdoor_keywords.iter().any(|k| label.contains(k.as_str()))
    }
}
