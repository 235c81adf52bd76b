//! Best-effort publishing of the summaries: failures are logged and never abort the run.

pub mod email;
pub mod report;

use askama::Template;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};

use self::{
    email::Mailer,
    report::{DailyAlert, MonthlySummary},
};
use crate::{
    api::sheets,
    logs::summary::SummaryRecord,
    prelude::*,
    summary::{DailyReport, monthly::MonthlyRollup},
};

pub struct Notifier<T = AsyncSmtpTransport<Tokio1Executor>> {
    sheets: Option<sheets::Client>,
    mailer: Option<Mailer<T>>,
}

impl<T> Notifier<T>
where
    T: AsyncTransport + Sync,
    T::Error: std::error::Error + Send + Sync + 'static,
{
    pub fn new(sheets: Option<sheets::Client>, mailer: Option<Mailer<T>>) -> Self {
        if sheets.is_none() {
            info!("spreadsheet publishing is disabled");
        }
        if mailer.is_none() {
            info!("email notifications are disabled");
        }
        Self { sheets, mailer }
    }

    /// Mirror the summary row to the spreadsheet, and send an alert if anything is off.
    #[instrument(skip_all, fields(date = %report.date))]
    pub async fn publish_daily(&self, report: &DailyReport) {
        if let Some(sheets) = &self.sheets {
            let record = report.to_record();
            match sheets.append_row(&SummaryRecord::HEADER, record.to_cells()).await {
                Ok(()) => info!("appended the summary to the spreadsheet"),
                Err(error) => error!("failed to append the summary to the spreadsheet: {error:#}"),
            }
        }

        if report.findings.is_empty() {
            debug!("nothing to alert about");
            return;
        }
        if let Some(mailer) = &self.mailer
            && let Err(error) = Self::send_daily_alert(mailer, report).await
        {
            error!("failed to send the alert: {error:#}");
        }
    }

    async fn send_daily_alert(mailer: &Mailer<T>, report: &DailyReport) -> Result {
        let html = DailyAlert::from(report).render().context("failed to render the alert")?;
        mailer.send_html(&DailyAlert::subject(report), html).await
    }

    #[instrument(skip_all, fields(month = rollup.month.name(), focus_year = focus_year))]
    pub async fn publish_monthly(&self, rollup: &MonthlyRollup, focus_year: i32) {
        if rollup.year(focus_year).is_none() {
            warn!("no summary rows for the month, skipping the email");
            return;
        }
        if let Some(mailer) = &self.mailer
            && let Err(error) = Self::send_monthly_summary(mailer, rollup, focus_year).await
        {
            error!("failed to send the monthly summary: {error:#}");
        }
    }

    async fn send_monthly_summary(
        mailer: &Mailer<T>,
        rollup: &MonthlyRollup,
        focus_year: i32,
    ) -> Result {
        let html = MonthlySummary::new(rollup, focus_year)
            .render()
            .context("failed to render the monthly summary")?;
        mailer.send_html(&MonthlySummary::subject(rollup, focus_year), html).await
    }
}
