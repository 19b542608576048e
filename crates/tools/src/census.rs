//! State demographics from the American Community Survey (ACS 5-year).
//!
//! The model passes a two-letter postal code; the tool maps it to a FIPS
//! code, fetches a fixed set of ACS variables for the state and renders a
//! one-paragraph summary with derived percentages.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use storewise_core::error::ToolError;
use storewise_core::tool::{Tool, ToolResult, required_str};
use tracing::{info, warn};

pub const CENSUS_TOOL: &str = "get_state_census_data";

/// ACS variables requested for every state, in request order.
pub const ACS_VARIABLES: [&str; 8] = [
    "NAME",
    "B11016_001E", // total households
    "B25081_001E", // owner-occupied households
    "B01003_001E", // total population
    "B19013_001E", // median household income
    "B15003_022E", // bachelor's degree
    "B15003_023E", // master's degree
    "B15003_025E", // doctorate degree
];

/// Postal code to FIPS state code.
#[rustfmt::skip]
const STATE_FIPS: &[(&str, &str)] = &[
    ("AL", "01"), ("AK", "02"), ("AZ", "04"), ("AR", "05"), ("CA", "06"),
    ("CO", "08"), ("CT", "09"), ("DE", "10"), ("DC", "11"), ("FL", "12"),
    ("GA", "13"), ("HI", "15"), ("ID", "16"), ("IL", "17"), ("IN", "18"),
    ("IA", "19"), ("KS", "20"), ("KY", "21"), ("LA", "22"), ("ME", "23"),
    ("MD", "24"), ("MA", "25"), ("MI", "26"), ("MN", "27"), ("MS", "28"),
    ("MO", "29"), ("MT", "30"), ("NE", "31"), ("NV", "32"), ("NH", "33"),
    ("NJ", "34"), ("NM", "35"), ("NY", "36"), ("NC", "37"), ("ND", "38"),
    ("OH", "39"), ("OK", "40"), ("OR", "41"), ("PA", "42"), ("RI", "44"),
    ("SC", "45"), ("SD", "46"), ("TN", "47"), ("TX", "48"), ("UT", "49"),
    ("VT", "50"), ("VA", "51"), ("WA", "53"), ("WV", "54"), ("WI", "55"),
    ("WY", "56"), ("PR", "72"),
];

/// FIPS code for a postal code, case-insensitive.
pub fn state_fips(state_code: &str) -> Option<&'static str> {
    let code = state_code.trim().to_ascii_uppercase();
    STATE_FIPS
        .iter()
        .find(|(postal, _)| *postal == code)
        .map(|(_, fips)| *fips)
}

/// One result row: variable name to value (ACS returns nulls for
/// suppressed estimates).
pub type AcsRow = HashMap<String, Option<String>>;

#[async_trait]
pub trait CensusApi: Send + Sync {
    /// Fetch `variables` for the state with FIPS code `state_fips`.
    async fn acs5(&self, variables: &[&str], state_fips: &str) -> Result<Vec<AcsRow>, ToolError>;
}

pub struct CensusTool {
    api: Arc<dyn CensusApi>,
}

impl CensusTool {
    pub fn new(api: Arc<dyn CensusApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Tool for CensusTool {
    fn name(&self) -> &str {
        CENSUS_TOOL
    }

    fn description(&self) -> &str {
        "Get census data for a US state: population, median household income, home ownership and education levels."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "state_code": {
                    "type": "string",
                    "description": "The two-letter state code (e.g., 'MD' for Maryland)"
                }
            },
            "required": ["state_code"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let state_code = required_str(&arguments, "state_code")?;
        let fips = state_fips(state_code).ok_or_else(|| {
            ToolError::InvalidArguments(format!("unknown state code '{state_code}'"))
        })?;
        info!(state_code, fips, "Census lookup called");

        let rows = self.api.acs5(&ACS_VARIABLES, fips).await?;
        let output = match rows.first() {
            Some(row) => summarize(row),
            None => format!("No census data found for state code {state_code}."),
        };
        Ok(ToolResult::ok(output))
    }
}

fn count(row: &AcsRow, variable: &str) -> f64 {
    row.get(variable)
        .and_then(|v| v.as_deref())
        .and_then(|v| v.trim().parse::<f64>().ok())
        // ACS uses large negative sentinels for unavailable estimates
        .filter(|v| *v >= 0.0)
        .unwrap_or(0.0)
}

fn percent(part: f64, whole: f64) -> f64 {
    if whole > 0.0 { part / whole * 100.0 } else { 0.0 }
}

/// Render one ACS row as a paragraph.
pub fn summarize(row: &AcsRow) -> String {
    let name = row
        .get("NAME")
        .and_then(|v| v.as_deref())
        .unwrap_or("This state");
    let households = count(row, "B11016_001E");
    let owner_occupied = count(row, "B25081_001E");
    let population = count(row, "B01003_001E");
    let median_income = count(row, "B19013_001E");
    let bachelors = count(row, "B15003_022E");
    let masters = count(row, "B15003_023E");
    let doctorate = count(row, "B15003_025E");

    let people_per_household = if households > 0.0 {
        population / households
    } else {
        0.0
    };

    format!(
        "{name} has an estimated population of {:.0} and a median household income of ${:.0}. \
         {:.1}% of households are owner-occupied with an average of {people_per_household:.2} people per household. \
         Education levels: {:.1}% have a bachelor's degree, {:.1}% have a master's degree, \
         and {:.1}% have a doctorate degree.",
        population,
        median_income,
        percent(owner_occupied, households),
        percent(bachelors, population),
        percent(masters, population),
        percent(doctorate, population),
    )
}

/// [`CensusApi`] over `api.census.gov`.
pub struct HttpCensusApi {
    base_url: String,
    year: u16,
    api_key: String,
    client: reqwest::Client,
}

impl HttpCensusApi {
    pub fn new(base_url: &str, year: u16, api_key: &str) -> Result<Self, ToolError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ToolError::NotConfigured(format!("HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            year,
            api_key: api_key.to_string(),
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/{}/acs/acs5", self.base_url, self.year)
    }
}

/// ACS responds with a header row followed by value rows.
fn rows_from_table(table: Vec<Vec<Option<String>>>) -> Vec<AcsRow> {
    let mut rows = table.into_iter();
    let Some(header) = rows.next() else {
        return Vec::new();
    };
    let header: Vec<String> = header.into_iter().map(Option::unwrap_or_default).collect();
    rows.map(|values| header.iter().cloned().zip(values).collect())
        .collect()
}

#[async_trait]
impl CensusApi for HttpCensusApi {
    async fn acs5(&self, variables: &[&str], state_fips: &str) -> Result<Vec<AcsRow>, ToolError> {
        let request_error = |reason: String| ToolError::Request {
            tool_name: CENSUS_TOOL.into(),
            reason,
        };

        let response = self
            .client
            .get(self.endpoint())
            .query(&[
                ("get", variables.join(",")),
                ("for", format!("state:{state_fips}")),
                ("key", self.api_key.clone()),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ToolError::Timeout {
                        tool_name: CENSUS_TOOL.into(),
                        timeout_secs: 30,
                    }
                } else {
                    request_error(e.to_string())
                }
            })?;

        let status = response.status();
        // no content means no rows for this geography
        if status == reqwest::StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Census API returned error");
            return Err(request_error(format!("HTTP {status}: {body}")));
        }

        let table: Vec<Vec<Option<String>>> = response
            .json()
            .await
            .map_err(|e| request_error(format!("unreadable census response: {e}")))?;
        Ok(rows_from_table(table))
    }
}
