use chrono::{Datelike, Days, Local, Month, NaiveDate};
use clap::Parser;

use crate::{
    cli::{email::EmailArgs, heartbeat::HeartbeatArgs, logs::LogsArgs, sheets::SheetsArgs},
    notify::Notifier,
    prelude::*,
    summary::{
        DEFAULT_TEST_SERIAL,
        DailyOutcome,
        DailyReport,
        Summarizer,
        SummaryConfig,
        monthly::preceding_month,
        underperformance::Threshold,
    },
    tables::{build_monthly_table, build_production_table, build_totals_table},
};

#[derive(Parser)]
pub struct SummarizeArgs {
    /// Summarize the date this many days before today.
    #[clap(long = "days-ago", default_value = "1", conflicts_with = "date")]
    days_ago: u64,

    /// Summarize this exact date instead.
    #[clap(long)]
    date: Option<NaiveDate>,

    /// Fraction of the fleet average below which an inverter is reported.
    #[clap(
        long = "underperformance-threshold",
        env = "UNDERPERFORMANCE_THRESHOLD",
        default_value = "0.8"
    )]
    threshold: Threshold,

    /// Placeholder inverter to leave out of the ranking.
    #[clap(long = "test-serial", env = "PVS6_TEST_SERIAL", default_value = DEFAULT_TEST_SERIAL)]
    test_serial: String,

    #[clap(flatten)]
    logs: LogsArgs,

    #[clap(flatten)]
    sheets: SheetsArgs,

    #[clap(flatten)]
    email: EmailArgs,

    #[clap(flatten)]
    heartbeat: HeartbeatArgs,
}

impl SummarizeArgs {
    fn target_date(&self) -> Result<NaiveDate> {
        match self.date {
            Some(date) => Ok(date),
            None => Local::now()
                .date_naive()
                .checked_sub_days(Days::new(self.days_ago))
                .with_context(|| format!("{} days ago is out of range", self.days_ago)),
        }
    }

    pub async fn run(self) -> Result {
        let date = self.target_date()?;
        let summarizer = Summarizer::new(
            SummaryConfig::builder()
                .paths(self.logs.paths())
                .threshold(self.threshold)
                .test_serial(self.test_serial.clone())
                .build(),
        );
        let notifier = Notifier::new(self.sheets.client()?, self.email.mailer()?);

        let outcome = summarizer.run(date)?;
        match &outcome {
            DailyOutcome::NoData => {}
            DailyOutcome::AlreadyRecorded(report) => {
                warn!(%date, "already summarized, skipping the notifications");
                print_report(report);
            }
            DailyOutcome::Recorded(report) => {
                print_report(report);
                notifier.publish_daily(report).await;
            }
        }

        if let Some((year, month)) = monthly_rollup_target(date, &outcome) {
            let rollup = summarizer.monthly(month)?;
            println!("{}", build_monthly_table(&rollup, year));
            notifier.publish_monthly(&rollup, year).await;
        }

        self.heartbeat.send().await;
        Ok(())
    }
}

/// Month to roll up after the daily run: the one that has just ended, on the first of a month.
///
/// A rerun for the same date has already sent it. A missing daily sample does not affect it,
/// because the roll-up reads only the summary log.
fn monthly_rollup_target(date: NaiveDate, outcome: &DailyOutcome) -> Option<(i32, Month)> {
    if date.day() != 1 {
        return None;
    }
    if matches!(outcome, DailyOutcome::AlreadyRecorded(_)) {
        info!("the date was summarized before, skipping the monthly summary");
        return None;
    }
    Some(preceding_month(date))
}

fn print_report(report: &DailyReport) {
    println!("{}", build_totals_table(report));
    if !report.production.is_empty() {
        println!("{}", build_production_table(report));
    }
}
