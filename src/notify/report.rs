//! HTML bodies of the notification emails.

use askama::Template;
use chrono::Datelike;

use crate::summary::{DailyReport, monthly::MonthlyRollup};

#[derive(Template)]
#[template(path = "daily_alert.html")]
pub struct DailyAlert {
    pub date: String,
    pub mean: String,
    pub findings: Vec<FindingRow>,
    pub ranking: Vec<RankingRow>,
}

pub struct FindingRow {
    pub serial: String,
    pub production: String,
    pub percentage: String,
}

pub struct RankingRow {
    pub serial: String,
    pub production: String,
    pub is_flagged: bool,
}

impl From<&DailyReport> for DailyAlert {
    fn from(report: &DailyReport) -> Self {
        Self {
            date: report.date.format("%A, %B %-d, %Y").to_string(),
            mean: report.production.mean().map_or_else(String::new, |mean| format!("{mean:.2}")),
            findings: report
                .findings
                .iter()
                .map(|finding| FindingRow {
                    serial: finding.serial.clone(),
                    production: format!("{:.2}", finding.production),
                    percentage: format!("{:.0}%", finding.percentage),
                })
                .collect(),
            ranking: report
                .production
                .ranked()
                .into_iter()
                .map(|(serial, production)| RankingRow {
                    serial: serial.to_owned(),
                    production: format!("{production:.2}"),
                    is_flagged: report.findings.iter().any(|finding| finding.serial == serial),
                })
                .collect(),
        }
    }
}

impl DailyAlert {
    pub fn subject(report: &DailyReport) -> String {
        format!(
            "⚠️ Solar alert for {}: {} underperforming inverter(s)",
            report.date,
            report.findings.len(),
        )
    }
}

#[derive(Template)]
#[template(path = "monthly_summary.html")]
pub struct MonthlySummary {
    pub title: String,
    pub years: Vec<YearRow>,
    pub days: Vec<DayRow>,
}

pub struct YearRow {
    pub year: i32,
    pub production: String,
    pub consumption: String,
    pub net: String,
    pub n_days: usize,
    pub average: String,
    pub is_focus: bool,
}

pub struct DayRow {
    pub date: String,
    pub production: String,
    pub consumption: String,
    pub net: String,
    pub inverters: String,
    pub alerts: String,
}

fn format_optional<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "–".to_owned(), |value| format!("{value:.2}"))
}

impl MonthlySummary {
    pub fn new(rollup: &MonthlyRollup, focus_year: i32) -> Self {
        Self {
            title: Self::subject(rollup, focus_year),
            years: rollup
                .years
                .iter()
                .map(|totals| YearRow {
                    year: totals.year,
                    production: format!("{:.2}", totals.production),
                    consumption: format!("{:.2}", totals.consumption),
                    net: format!("{:.2}", totals.net),
                    n_days: totals.n_days(),
                    average: format!("{:.2}", totals.average_daily_production()),
                    is_focus: totals.year == focus_year,
                })
                .collect(),
            days: rollup
                .years
                .iter()
                .rev()
                .flat_map(|totals| &totals.days)
                .map(|day| DayRow {
                    date: format!("{} ({})", day.date, day.date.weekday()),
                    production: format_optional(day.daily_production),
                    consumption: format_optional(day.daily_consumption),
                    net: format_optional(day.daily_net),
                    inverters: day.n_inverters.map_or_else(|| "–".to_owned(), |n| n.to_string()),
                    alerts: day.alerts.clone(),
                })
                .collect(),
        }
    }

    pub fn subject(rollup: &MonthlyRollup, focus_year: i32) -> String {
        format!("☀️ Solar summary for {} {focus_year}", rollup.month.name())
    }
}
