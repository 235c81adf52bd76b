//! Google Sheets v4 values API.

use std::time::Duration;

use reqwest::{
    Url,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::prelude::*;

const BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets/";

pub struct Client {
    inner: reqwest::Client,
    spreadsheet_id: String,
    sheet_name: String,
}

impl Client {
    pub fn new(access_token: &str, spreadsheet_id: String, sheet_name: String) -> Result<Self> {
        let mut authorization = HeaderValue::from_str(&format!("Bearer {access_token}"))
            .context("invalid access token")?;
        authorization.set_sensitive(true);
        let inner = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .default_headers(HeaderMap::from_iter([(AUTHORIZATION, authorization)]))
            .build()?;
        Ok(Self { inner, spreadsheet_id, sheet_name })
    }

    /// Append the row, creating the header first if the sheet is empty.
    #[instrument(skip_all, fields(sheet = %self.sheet_name))]
    pub async fn append_row(&self, header: &[&str], row: Vec<Value>) -> Result {
        self.ensure_header(header).await?;
        let range = format!("{}!A:{}", self.sheet_name, column_name(row.len()));
        let url = self.values_url(&range, Some(":append"))?;
        self.inner
            .post(url)
            .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
            .json(&ValueRange { values: vec![row] })
            .send()
            .await
            .context("failed to append the row")?
            .error_for_status()
            .context("the spreadsheet rejected the row")?;
        info!("appended");
        Ok(())
    }

    async fn ensure_header(&self, header: &[&str]) -> Result {
        let range = format!("{}!A1:{}1", self.sheet_name, column_name(header.len()));
        let existing: ValueRange = self
            .inner
            .get(self.values_url(&range, None)?)
            .send()
            .await
            .context("failed to read the header")?
            .error_for_status()?
            .json()
            .await
            .context("failed to deserialize the header")?;
        if !existing.values.is_empty() {
            return Ok(());
        }
        let header = header.iter().map(|name| Value::from(*name)).collect();
        self.inner
            .put(self.values_url(&range, None)?)
            .query(&[("valueInputOption", "RAW")])
            .json(&ValueRange { values: vec![header] })
            .send()
            .await
            .context("failed to write the header")?
            .error_for_status()?;
        info!("created the header");
        Ok(())
    }

    fn values_url(&self, range: &str, method: Option<&str>) -> Result<Url> {
        let mut url = Url::parse(BASE_URL)?;
        url.path_segments_mut()
            .map_err(|()| anyhow!("invalid base URL"))?
            .pop_if_empty()
            .push(&self.spreadsheet_id)
            .push("values")
            .push(&format!("{range}{}", method.unwrap_or_default()));
        Ok(url)
    }
}

#[derive(Serialize, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Spreadsheet column letter for a one-based column number.
fn column_name(mut number: usize) -> String {
    let mut name = Vec::new();
    while number > 0 {
        number -= 1;
        #[expect(clippy::cast_possible_truncation)]
        let letter = b'A' + (number % 26) as u8;
        name.push(letter);
        number /= 26;
    }
    name.reverse();
    String::from_utf8(name).unwrap_or_default()
}
