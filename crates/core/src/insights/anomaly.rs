//! Data-quality and outlier scan over the show history.
//!
//! Each rule compares one field against a percentile baseline computed over
//! the positive observations of that field. A show may trigger any number of
//! findings; findings are sorted by severity (alerts first) and feed an
//! overall health score for the dashboard.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::show::{Show, ShowId};
use crate::domain::venue::{Venue, VenueId};
use crate::insights::{decimal_to_f64, UNKNOWN_VENUE};
use crate::stats::Summary;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Thresholds for the per-show rules.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyThresholds {
    /// Minimum shows with a positive fee before any findings are produced
    /// (default: 3).
    pub min_fee_samples: usize,
    /// A positive fee below this multiple of the 25th percentile is low
    /// (default: 0.5).
    pub low_fee_ratio: f64,
    /// A fee above this multiple of the 75th percentile is high
    /// (default: 2.0).
    pub high_fee_ratio: f64,
    /// Expenses above this multiple of their 75th percentile are high
    /// (default: 2.0).
    pub high_expense_ratio: f64,
    /// Zero merch is only notable when mean merch exceeds this floor
    /// (default: 100.0).
    pub merch_mean_floor: f64,
}

impl Default for AnomalyThresholds {
    fn default() -> Self {
        Self {
            min_fee_samples: 3,
            low_fee_ratio: 0.5,
            high_fee_ratio: 2.0,
            high_expense_ratio: 2.0,
            merch_mean_floor: 100.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Findings
// ---------------------------------------------------------------------------

/// Severity of a finding. Ordering is the display rank: alerts sort first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Alert,
    Warning,
    Info,
}

/// Which rule produced a finding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyRule {
    LowFee,
    HighFee,
    HighExpenses,
    NegativeProfit,
    NoMerch,
    MissingFee,
}

/// One flagged show/rule pair with its reference value and display context.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub show_id: ShowId,
    pub rule: AnomalyRule,
    pub severity: Severity,
    /// The field the rule examined ("fee", "expenses", ...).
    pub field: String,
    pub observed: f64,
    /// The baseline the observation was compared against.
    pub expected: f64,
    pub message: String,
    /// Resolved venue name, or "Unknown Venue" when the reference is stale.
    pub venue_name: String,
    pub date: NaiveDate,
}

/// Scan result: severity-sorted findings plus a 0-100 health score.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub findings: Vec<Finding>,
    pub health_score: f64,
    pub total_shows: usize,
}

// ---------------------------------------------------------------------------
// Detector
// ---------------------------------------------------------------------------

/// Stateless scanner; thresholds are fixed at construction.
#[derive(Clone, Debug, Default)]
pub struct AnomalyDetector {
    thresholds: AnomalyThresholds,
}

impl AnomalyDetector {
    pub fn new(thresholds: AnomalyThresholds) -> Self {
        Self { thresholds }
    }

    /// Scan the show history. With fewer than `min_fee_samples` positive-fee
    /// shows the percentile baselines are meaningless, so the report is
    /// empty rather than degenerate.
    pub fn scan(&self, shows: &[Show], venues: &[Venue]) -> AnomalyReport {
        let fees: Vec<f64> = positive_values(shows, |s| s.fee);
        if fees.len() < self.thresholds.min_fee_samples {
            debug!(positive_fees = fees.len(), "insufficient history for anomaly scan");
            return AnomalyReport {
                findings: Vec::new(),
                health_score: 100.0,
                total_shows: shows.len(),
            };
        }

        let merch: Vec<f64> = positive_values(shows, |s| s.merch_sales);
        let expenses: Vec<f64> = positive_values(shows, |s| s.expenses);

        let fee_stats = Summary::of(&fees);
        let merch_stats = Summary::of(&merch);
        let expense_stats = Summary::of(&expenses);

        let by_id: HashMap<&VenueId, &Venue> = venues.iter().map(|v| (&v.id, v)).collect();
        let mut findings = Vec::new();

        for show in shows {
            let venue_name = by_id
                .get(&show.venue_id)
                .map(|v| v.name.clone())
                .unwrap_or_else(|| UNKNOWN_VENUE.to_string());
            self.scan_show(show, &fee_stats, &merch_stats, &expense_stats, &venue_name, &mut findings);
        }

        // Alerts first, info last; stable within each rank.
        findings.sort_by_key(|f| f.severity);

        let health_score = health_score(&findings, shows.len());
        debug!(findings = findings.len(), health_score, "anomaly scan complete");

        AnomalyReport { findings, health_score, total_shows: shows.len() }
    }

    fn scan_show(
        &self,
        show: &Show,
        fee_stats: &Summary,
        merch_stats: &Summary,
        expense_stats: &Summary,
        venue_name: &str,
        findings: &mut Vec<Finding>,
    ) {
        let t = &self.thresholds;
        let fee = decimal_to_f64(show.fee);
        let merch_sales = decimal_to_f64(show.merch_sales);
        let expense_total = decimal_to_f64(show.expenses);
        let profit = decimal_to_f64(show.profit());

        let mut push = |rule, severity, field: &str, observed, expected, message| {
            findings.push(Finding {
                show_id: show.id.clone(),
                rule,
                severity,
                field: field.to_string(),
                observed,
                expected,
                message,
                venue_name: venue_name.to_string(),
                date: show.start_date,
            });
        };

        if fee > 0.0 && fee < t.low_fee_ratio * fee_stats.p25 {
            push(
                AnomalyRule::LowFee,
                Severity::Warning,
                "fee",
                fee,
                fee_stats.p25,
                format!(
                    "Fee ${fee:.0} at {venue_name} is well below the typical ${:.0}",
                    fee_stats.p25
                ),
            );
        }

        if fee > t.high_fee_ratio * fee_stats.p75 {
            push(
                AnomalyRule::HighFee,
                Severity::Info,
                "fee",
                fee,
                fee_stats.p75,
                format!(
                    "Fee ${fee:.0} at {venue_name} is more than double the typical ${:.0}",
                    fee_stats.p75
                ),
            );
        }

        if expense_total > 0.0 && expense_total > t.high_expense_ratio * expense_stats.p75 {
            push(
                AnomalyRule::HighExpenses,
                Severity::Warning,
                "expenses",
                expense_total,
                expense_stats.p75,
                format!(
                    "Expenses ${expense_total:.0} at {venue_name} are more than double the typical ${:.0}",
                    expense_stats.p75
                ),
            );
        }

        if profit < 0.0 {
            push(
                AnomalyRule::NegativeProfit,
                Severity::Alert,
                "profit",
                profit,
                0.0,
                format!("Show at {venue_name} lost ${:.0}", -profit),
            );
        }

        if merch_sales == 0.0 && merch_stats.mean > t.merch_mean_floor {
            push(
                AnomalyRule::NoMerch,
                Severity::Info,
                "merch_sales",
                0.0,
                merch_stats.mean,
                format!(
                    "No merch recorded at {venue_name}; shows typically sell ${:.0}",
                    merch_stats.mean
                ),
            );
        }

        if fee == 0.0 {
            push(
                AnomalyRule::MissingFee,
                Severity::Warning,
                "fee",
                0.0,
                fee_stats.mean,
                format!("No fee recorded for the show at {venue_name}"),
            );
        }
    }
}

fn positive_values(shows: &[Show], field: impl Fn(&Show) -> Decimal) -> Vec<f64> {
    shows
        .iter()
        .map(|s| decimal_to_f64(field(s)))
        .filter(|v| *v > 0.0)
        .collect()
}

/// 100 - (10*alerts + 5*warnings + 1*infos) / total_shows * 10, floored at 0.
fn health_score(findings: &[Finding], total_shows: usize) -> f64 {
    if total_shows == 0 {
        return 100.0;
    }
    let mut penalty = 0.0;
    for finding in findings {
        penalty += match finding.severity {
            Severity::Alert => 10.0,
            Severity::Warning => 5.0,
            Severity::Info => 1.0,
        };
    }
    (100.0 - penalty / total_shows as f64 * 10.0).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinates;

    fn venue(id: &str, name: &str) -> Venue {
        Venue {
            id: VenueId(id.to_string()),
            name: name.to_string(),
            city: "Ashland".to_string(),
            region: "WI".to_string(),
            coordinates: Some(Coordinates::new(46.5, -90.8)),
            venue_type: Some("Fair/Festival".to_string()),
            capacity: None,
        }
    }

    fn show(id: &str, fee: i64, merch: i64, expenses: i64) -> Show {
        Show {
            id: ShowId(id.to_string()),
            venue_id: VenueId("v-1".to_string()),
            start_date: "2026-06-12".parse().unwrap(),
            end_date: "2026-06-12".parse().unwrap(),
            fee: Decimal::from(fee),
            merch_sales: Decimal::from(merch),
            materials_cost: Decimal::ZERO,
            expenses: Decimal::from(expenses),
        }
    }

    fn baseline_shows() -> Vec<Show> {
        vec![
            show("s1", 1000, 300, 100),
            show("s2", 1000, 300, 100),
            show("s3", 1000, 300, 100),
        ]
    }

    #[test]
    fn fewer_than_three_positive_fees_yields_empty_report() {
        let detector = AnomalyDetector::default();
        let shows = vec![show("s1", 1000, 0, 0), show("s2", 1000, 0, 0)];

        let report = detector.scan(&shows, &[venue("v-1", "Big Top")]);

        assert!(report.findings.is_empty());
        assert_eq!(report.health_score, 100.0);
    }

    #[test]
    fn low_fee_flags_the_cheap_show() {
        let detector = AnomalyDetector::default();
        let mut shows = baseline_shows();
        shows.push(show("cheap", 50, 300, 100));

        let report = detector.scan(&shows, &[venue("v-1", "Big Top")]);

        let finding = report
            .findings
            .iter()
            .find(|f| f.rule == AnomalyRule::LowFee)
            .expect("low_fee finding");
        assert_eq!(finding.show_id, ShowId("cheap".to_string()));
        assert_eq!(finding.severity, Severity::Warning);
        assert_eq!(finding.observed, 50.0);
    }

    #[test]
    fn high_fee_is_informational() {
        let detector = AnomalyDetector::default();
        let mut shows = baseline_shows();
        shows.push(show("whale", 5000, 300, 100));

        let report = detector.scan(&shows, &[venue("v-1", "Big Top")]);

        let finding = report
            .findings
            .iter()
            .find(|f| f.rule == AnomalyRule::HighFee)
            .expect("high_fee finding");
        assert_eq!(finding.severity, Severity::Info);
        assert_eq!(finding.show_id, ShowId("whale".to_string()));
    }

    #[test]
    fn negative_profit_is_an_alert() {
        let detector = AnomalyDetector::default();
        let mut shows = baseline_shows();
        shows.push(show("loss", 100, 0, 600)); // profit -500

        let report = detector.scan(&shows, &[venue("v-1", "Big Top")]);

        let matches: Vec<_> = report
            .findings
            .iter()
            .filter(|f| f.rule == AnomalyRule::NegativeProfit)
            .collect();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].severity, Severity::Alert);
        assert_eq!(matches[0].observed, -500.0);
    }

    #[test]
    fn high_expenses_flags_the_expensive_show() {
        let detector = AnomalyDetector::default();
        let mut shows = baseline_shows();
        shows.push(show("spendy", 1000, 300, 900));

        let report = detector.scan(&shows, &[venue("v-1", "Big Top")]);

        assert!(report.findings.iter().any(|f| f.rule == AnomalyRule::HighExpenses
            && f.severity == Severity::Warning
            && f.show_id == ShowId("spendy".to_string())));
    }

    #[test]
    fn zero_merch_only_notable_when_others_sell() {
        let detector = AnomalyDetector::default();
        let mut shows = baseline_shows(); // merch mean 300 > 100 floor
        shows.push(show("quiet", 1000, 0, 100));

        let report = detector.scan(&shows, &[venue("v-1", "Big Top")]);
        assert!(report
            .findings
            .iter()
            .any(|f| f.rule == AnomalyRule::NoMerch && f.show_id == ShowId("quiet".to_string())));

        // With negligible merch history the same show is unremarkable.
        let low_merch: Vec<Show> = vec![
            show("s1", 1000, 10, 100),
            show("s2", 1000, 10, 100),
            show("s3", 1000, 10, 100),
            show("quiet", 1000, 0, 100),
        ];
        let report = detector.scan(&low_merch, &[venue("v-1", "Big Top")]);
        assert!(!report.findings.iter().any(|f| f.rule == AnomalyRule::NoMerch));
    }

    #[test]
    fn missing_fee_is_a_warning() {
        let detector = AnomalyDetector::default();
        let mut shows = baseline_shows();
        shows.push(show("free", 0, 300, 100));

        let report = detector.scan(&shows, &[venue("v-1", "Big Top")]);

        assert!(report
            .findings
            .iter()
            .any(|f| f.rule == AnomalyRule::MissingFee && f.severity == Severity::Warning));
        // A zero fee is missing_fee, never low_fee.
        assert!(!report
            .findings
            .iter()
            .any(|f| f.rule == AnomalyRule::LowFee && f.show_id == ShowId("free".to_string())));
    }

    #[test]
    fn findings_sort_alerts_first() {
        let detector = AnomalyDetector::default();
        let mut shows = baseline_shows();
        shows.push(show("whale", 5000, 300, 100)); // info
        shows.push(show("loss", 100, 0, 600)); // alert

        let report = detector.scan(&shows, &[venue("v-1", "Big Top")]);

        assert!(report.findings.len() >= 2);
        assert_eq!(report.findings[0].severity, Severity::Alert);
        let ranks: Vec<Severity> = report.findings.iter().map(|f| f.severity).collect();
        let mut sorted = ranks.clone();
        sorted.sort();
        assert_eq!(ranks, sorted);
    }

    #[test]
    fn stale_venue_reference_resolves_to_unknown() {
        let detector = AnomalyDetector::default();
        let mut shows = baseline_shows();
        shows.push(show("loss", 100, 0, 600));

        // Venue collection does not contain "v-1" at all.
        let report = detector.scan(&shows, &[venue("other", "Elsewhere")]);

        assert!(report.findings.iter().all(|f| f.venue_name == "Unknown Venue"));
    }

    #[test]
    fn health_score_decreases_with_findings_and_floors_at_zero() {
        let detector = AnomalyDetector::default();
        let clean = detector.scan(&baseline_shows(), &[venue("v-1", "Big Top")]);
        assert_eq!(clean.health_score, 100.0);

        // Every show losing money drives the score to the floor:
        // 4 alerts over 4 shows = 40 / 4 * 10 = 100 penalty.
        let disaster: Vec<Show> = (0..4).map(|i| show(&format!("s{i}"), 100, 0, 600)).collect();
        let report = detector.scan(&disaster, &[venue("v-1", "Big Top")]);
        assert_eq!(report.health_score, 0.0);
    }
}
