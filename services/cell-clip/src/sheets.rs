//! Single-cell reads from the Google Sheets values API

use reqwest::Url;
use serde::Deserialize;
use sheets_auth::AuthorizedClient;
use tracing::debug;

use crate::config::Setting;
use crate::error::{Error, Result};

/// Production API root
pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com";

/// Response body of `spreadsheets.values.get`. `values` is absent for
/// empty ranges.
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

/// Extract the spreadsheet ID from a full URL (`.../d/<id>/edit`), or return
/// the input unchanged if it has no `/d/` segment.
pub fn spreadsheet_id(spreadsheet: &str) -> &str {
    let Some(start) = spreadsheet.find("/d/").map(|i| i + 3) else {
        return spreadsheet.trim();
    };
    let rest = &spreadsheet[start..];
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    if end == 0 { spreadsheet.trim() } else { &rest[..end] }
}

/// A1 notation for one cell, e.g. `Summary!B4`.
pub fn a1_range(setting: &Setting) -> String {
    format!("{}!{}{}", setting.sheet, setting.column.to_ascii_uppercase(), setting.row)
}

/// `{base}/v4/spreadsheets/{id}/values/{range}` with each segment escaped.
pub fn values_url(base: &str, spreadsheet_id: &str, range: &str) -> Result<Url> {
    let mut url = Url::parse(base).map_err(|e| Error::InvalidUrl(format!("{base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| Error::InvalidUrl(format!("{base}: cannot be a base URL")))?
        .pop_if_empty()
        .extend(["v4", "spreadsheets", spreadsheet_id, "values", range]);
    Ok(url)
}

/// Render a cell value the way the Sheets UI shows it.
fn render(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Read the cell a setting points at. `None` if the cell is empty.
pub async fn fetch_cell(
    client: &AuthorizedClient,
    api_base: &str,
    setting: &Setting,
) -> Result<Option<String>> {
    let id = spreadsheet_id(&setting.spreadsheet);
    let range = a1_range(setting);
    let url = values_url(api_base, id, &range)?;
    debug!(spreadsheet_id = id, range = %range, "reading cell");

    let response = client.get(url).await?;
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));
        return Err(Error::Api {
            status: status.as_u16(),
            body,
        });
    }

    let values = response
        .json::<ValueRange>()
        .await
        .map_err(|e| Error::InvalidResponse(e.to_string()))?;

    Ok(values
        .values
        .first()
        .and_then(|row| row.first())
        .map(render))
}
