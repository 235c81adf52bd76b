use clap::Parser;

use crate::{api::sheets, prelude::*};

#[derive(Parser)]
pub struct SheetsArgs {
    #[clap(long = "spreadsheet-id", env = "GOOGLE_SHEETS_ID")]
    spreadsheet_id: Option<String>,

    #[clap(long = "sheet-name", env = "GOOGLE_SHEETS_SHEET_NAME", default_value = "Sheet1")]
    sheet_name: String,

    #[clap(
        long = "sheets-access-token",
        env = "GOOGLE_SHEETS_ACCESS_TOKEN",
        hide_env_values = true
    )]
    access_token: Option<String>,
}

impl SheetsArgs {
    /// Spreadsheet client, if it is configured.
    pub fn client(&self) -> Result<Option<sheets::Client>> {
        match (&self.spreadsheet_id, &self.access_token) {
            (Some(spreadsheet_id), Some(access_token)) => Ok(Some(sheets::Client::new(
                access_token,
                spreadsheet_id.clone(),
                self.sheet_name.clone(),
            )?)),
            (Some(_), None) => {
                warn!("the spreadsheet id is set, but the access token is missing");
                Ok(None)
            }
            _ => Ok(None),
        }
    }
}
