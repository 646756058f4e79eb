use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::utils::error::AppError;

/// Wire format for event dates (`25-12-2024`).
pub const DATE_FORMAT: &str = "%d-%m-%Y";
/// Wire format for event times on input (`09:30:00`).
pub const TIME_FORMAT: &str = "%H:%M:%S";
/// Compact time format used on single-event output (`09:30`).
pub const TIME_DISPLAY_FORMAT: &str = "%H:%M";
/// Wire format for `last-update` timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLocation {
    pub street: String,
    pub suburb: String,
    pub state: String,
    #[serde(rename = "post-code")]
    pub post_code: String,
}

#[derive(Debug, Clone)]
pub struct Event {
    pub id: u32,
    pub name: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub location: EventLocation,
    pub description: String,
    pub last_update: NaiveDateTime,
}

impl Event {
    pub fn formatted_last_update(&self) -> String {
        self.last_update.format(TIMESTAMP_FORMAT).to_string()
    }
}

pub fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| {
        AppError::Validation(format!("Invalid date '{value}'. Expected format DD-MM-YYYY."))
    })
}

pub fn parse_time(value: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(value, TIME_FORMAT).map_err(|_| {
        AppError::Validation(format!("Invalid time '{value}'. Expected format HH:MM:SS."))
    })
}

pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, AppError> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|_| {
        AppError::Validation(format!(
            "Invalid timestamp '{value}'. Expected format YYYY-MM-DD HH:MM:SS."
        ))
    })
}
