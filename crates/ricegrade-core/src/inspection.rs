//! Inspection records, the create request, and history queries.
//!
//! An inspection is created once, with its scored criteria frozen at that
//! moment, and is never updated afterwards. Reads replay the stored tree.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::catalog::Grading;
use crate::format::{self, CompositionRow};
use crate::model::{Grain, ScoredCriterion};

/// Rows per history page.
pub const PAGE_SIZE: u32 = 10;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("inspection name is required")]
    BlankName,

    #[error("invalid {field}: {value:?}")]
    InvalidDate { field: &'static str, value: String },
}

/// A persisted inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inspection {
    #[serde(rename = "inspectionID")]
    pub inspection_id: String,
    pub name: String,
    pub create_date: DateTime<Utc>,
    pub sampling_date: Option<DateTime<Utc>>,
    pub sampling_point: Vec<String>,
    pub price: String,
    pub note: String,
    pub image_link: Option<String>,
    #[serde(rename = "standardID")]
    pub standard_id: i64,
    pub standard_name: String,
    pub standard_data: Vec<ScoredCriterion>,
}

/// Raw upload attached to a create request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBatch {
    #[serde(default)]
    pub grains: Vec<Grain>,
    #[serde(default, rename = "imageURL")]
    pub image_url: Option<String>,
}

/// Body of a create-inspection request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInspection {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub note: String,
    pub standard_name: String,
    #[serde(default)]
    pub sampling_date: Option<String>,
    #[serde(default)]
    pub sampling_point: Vec<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub price: String,
    #[serde(default)]
    pub raw: RawBatch,
}

impl Inspection {
    /// Assemble a new record from a validated request and its grading.
    pub fn from_request(
        request: CreateInspection,
        grading: Grading,
        inspection_id: String,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(ValidationError::BlankName);
        }
        let sampling_date = match request.sampling_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                parse_timestamp(raw, false).ok_or_else(|| ValidationError::InvalidDate {
                    field: "samplingDate",
                    value: raw.to_string(),
                })?,
            ),
        };

        Ok(Self {
            inspection_id,
            name: name.to_string(),
            create_date: now,
            sampling_date,
            sampling_point: request.sampling_point,
            price: request.price,
            note: request.note,
            image_link: request.raw.image_url,
            standard_id: grading.standard_id,
            standard_name: request.standard_name,
            standard_data: grading.standard_data,
        })
    }

    /// Rows for the result view's composition table.
    pub fn composition(&self) -> Vec<CompositionRow> {
        format::composition_rows(&self.standard_data)
    }
}

/// Query string of a history listing.
///
/// `page` is parsed leniently: anything that is not a positive integer means
/// page 1. The date range applies only when both ends are present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
}

/// A history query with its inputs parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryFilter {
    pub page: u32,
    pub inspection_id: Option<String>,
    pub created: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl HistoryQuery {
    pub fn resolve(&self) -> Result<HistoryFilter, ValidationError> {
        let page = self
            .page
            .as_deref()
            .and_then(|p| p.trim().parse::<u32>().ok())
            .filter(|&p| p >= 1)
            .unwrap_or(1);

        let inspection_id = non_blank(self.id.as_deref()).map(str::to_string);

        let created = match (non_blank(self.from.as_deref()), non_blank(self.to.as_deref())) {
            (Some(from), Some(to)) => {
                let start = parse_timestamp(from, false).ok_or_else(|| ValidationError::InvalidDate {
                    field: "from",
                    value: from.to_string(),
                })?;
                let end = parse_timestamp(to, true).ok_or_else(|| ValidationError::InvalidDate {
                    field: "to",
                    value: to.to_string(),
                })?;
                Some((start, end))
            }
            _ => None,
        };

        Ok(HistoryFilter {
            page,
            inspection_id,
            created,
        })
    }
}

impl Default for HistoryFilter {
    fn default() -> Self {
        Self {
            page: 1,
            inspection_id: None,
            created: None,
        }
    }
}

/// One page of inspection history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPage {
    pub total: u64,
    pub current_page: u32,
    pub total_pages: u64,
    pub data: Vec<Inspection>,
}

impl HistoryPage {
    pub fn new(total: u64, current_page: u32, data: Vec<Inspection>) -> Self {
        Self {
            total,
            current_page,
            total_pages: total.div_ceil(u64::from(PAGE_SIZE)),
            data,
        }
    }
}

/// Parse an RFC 3339 timestamp, an HTML `datetime-local` value, or a bare
/// date. Values without an offset are taken as UTC. A bare date resolves to
/// the start of the day, or to its last millisecond when `end_of_day` is set.
pub fn parse_timestamp(value: &str, end_of_day: bool) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    let time = if end_of_day {
        NaiveTime::from_hms_milli_opt(23, 59, 59, 999)?
    } else {
        NaiveTime::from_hms_opt(0, 0, 0)?
    };
    Some(Utc.from_utc_datetime(&date.and_time(time)))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Price {
        Text(String),
        Number(f64),
    }

    Ok(match Option::<Price>::deserialize(deserializer)? {
        Some(Price::Text(s)) => s,
        Some(Price::Number(n)) => n.to_string(),
        None => String::new(),
    })
}
