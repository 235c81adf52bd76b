use chrono::{Datelike, Local, Month};
use clap::Parser;

use crate::{
    cli::{email::EmailArgs, logs::LogsArgs},
    logs::summary::SummaryLog,
    notify::Notifier,
    prelude::*,
    summary::monthly::{MonthlyRollup, preceding_month},
    tables::build_monthly_table,
};

#[derive(Parser)]
pub struct MonthlyArgs {
    /// Year to highlight, defaults to the year of the last complete month.
    #[clap(long)]
    year: Option<i32>,

    /// Month number or name, defaults to the last complete month.
    #[clap(long, value_parser = parse_month)]
    month: Option<Month>,

    /// Also email the summary.
    #[clap(long = "send")]
    send: bool,

    #[clap(flatten)]
    logs: LogsArgs,

    #[clap(flatten)]
    email: EmailArgs,
}

fn parse_month(value: &str) -> Result<Month> {
    if let Ok(number) = value.parse::<u8>() {
        return Month::try_from(number).map_err(|_| anyhow!("`{number}` is not a month number"));
    }
    value.parse::<Month>().map_err(|_| anyhow!("`{value}` is not a month"))
}

impl MonthlyArgs {
    pub async fn run(self) -> Result {
        let today = Local::now().date_naive();
        let month = self.month.unwrap_or_else(|| preceding_month(today).1);
        let year = self.year.unwrap_or_else(|| {
            if month.number_from_month() > today.month() { today.year() - 1 } else { today.year() }
        });

        let rollup = MonthlyRollup::from_log(&SummaryLog::new(self.logs.paths().summary), month)?;
        if rollup.is_empty() {
            warn!(month = month.name(), "no summary rows for the month");
            return Ok(());
        }
        println!("{}", build_monthly_table(&rollup, year));

        if self.send {
            Notifier::new(None, self.email.mailer()?).publish_monthly(&rollup, year).await;
        }
        Ok(())
    }
}
