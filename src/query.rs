//! Sorting, pagination and projection for the event list endpoint.

use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::models::event::{Event, DATE_FORMAT, TIMESTAMP_FORMAT, TIME_FORMAT};
use crate::utils::error::AppError;

pub const DEFAULT_ORDER: &str = "+id";
pub const DEFAULT_FILTER: &str = "id,name";
pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Name,
    Date,
    StartTime,
    EndTime,
    Description,
    LastUpdate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub ascending: bool,
}

/// Parses a comma-separated `order` value such as `-date,+name`. Every key
/// must carry a `+` or `-` prefix; a leading space is accepted as `+`
/// because that is how `+` arrives after URL decoding.
pub fn parse_order(order: &str) -> Result<Vec<SortKey>, AppError> {
    let mut keys = Vec::new();
    for token in order.split(',') {
        let (ascending, name) = if let Some(rest) = token.strip_prefix(&['+', ' '][..]) {
            (true, rest)
        } else if let Some(rest) = token.strip_prefix('-') {
            (false, rest)
        } else {
            return Err(AppError::Validation(format!(
                "Sort key '{token}' must be prefixed with '+' or '-'."
            )));
        };

        let field = match name {
            "id" => SortField::Id,
            "name" => SortField::Name,
            "date" => SortField::Date,
            "start_time" => SortField::StartTime,
            "end_time" => SortField::EndTime,
            "description" => SortField::Description,
            "last_update" => SortField::LastUpdate,
            other => {
                return Err(AppError::Validation(format!(
                    "Unknown sort attribute '{other}'."
                )))
            }
        };
        keys.push(SortKey { field, ascending });
    }
    Ok(keys)
}

/// Stable multi-key sort, left-to-right priority.
pub fn sort_events(events: &mut [Event], keys: &[SortKey]) {
    events.sort_by(|a, b| {
        for key in keys {
            let ord = match key.field {
                SortField::Id => a.id.cmp(&b.id),
                SortField::Name => a.name.cmp(&b.name),
                SortField::Date => a.date.cmp(&b.date),
                SortField::StartTime => a.start_time.cmp(&b.start_time),
                SortField::EndTime => a.end_time.cmp(&b.end_time),
                SortField::Description => a.description.cmp(&b.description),
                SortField::LastUpdate => a.last_update.cmp(&b.last_update),
            };
            let ord = if key.ascending { ord } else { ord.reverse() };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
}

/// The `[(page-1)*size, page*size)` slice of the sorted collection. An
/// out-of-range page is an empty slice, not an error.
pub fn page_slice(events: &[Event], page: usize, size: usize) -> &[Event] {
    let start = (page - 1).saturating_mul(size).min(events.len());
    let end = page.saturating_mul(size).min(events.len());
    &events[start..end]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectField {
    Id,
    Name,
    Date,
    StartTime,
    EndTime,
    Location,
    Description,
    LastUpdate,
}

/// Parses the `filter` projection list. Unknown attribute names are
/// silently dropped.
pub fn parse_filter(filter: &str) -> Vec<ProjectField> {
    filter
        .split(',')
        .filter_map(|name| match name.trim() {
            "id" => Some(ProjectField::Id),
            "name" => Some(ProjectField::Name),
            "date" => Some(ProjectField::Date),
            "start_time" => Some(ProjectField::StartTime),
            "end_time" => Some(ProjectField::EndTime),
            "location" => Some(ProjectField::Location),
            "description" => Some(ProjectField::Description),
            "last_update" => Some(ProjectField::LastUpdate),
            _ => None,
        })
        .collect()
}

/// Projects an event onto the requested attributes. Allow-listed accessors
/// keep the output schema fixed per field.
pub fn project(event: &Event, fields: &[ProjectField]) -> Value {
    let mut row = Map::new();
    for field in fields {
        match field {
            ProjectField::Id => {
                row.insert("id".to_string(), event.id.into());
            }
            ProjectField::Name => {
                row.insert("name".to_string(), event.name.clone().into());
            }
            ProjectField::Date => {
                row.insert(
                    "date".to_string(),
                    event.date.format(DATE_FORMAT).to_string().into(),
                );
            }
            ProjectField::StartTime => {
                row.insert(
                    "start_time".to_string(),
                    event.start_time.format(TIME_FORMAT).to_string().into(),
                );
            }
            ProjectField::EndTime => {
                row.insert(
                    "end_time".to_string(),
                    event.end_time.format(TIME_FORMAT).to_string().into(),
                );
            }
            ProjectField::Location => {
                row.insert(
                    "location".to_string(),
                    serde_json::to_value(&event.location).unwrap_or(Value::Null),
                );
            }
            ProjectField::Description => {
                row.insert("description".to_string(), event.description.clone().into());
            }
            ProjectField::LastUpdate => {
                row.insert(
                    "last_update".to_string(),
                    event.last_update.format(TIMESTAMP_FORMAT).to_string().into(),
                );
            }
        }
    }
    Value::Object(row)
}
