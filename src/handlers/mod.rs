pub mod statistics;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::enrichment::EventMetadata;
use crate::models::event::{self, EventLocation, DATE_FORMAT, TIME_DISPLAY_FORMAT};
use crate::query;
use crate::store::{EventDraft, EventPatch};
use crate::utils::error::AppError;
use crate::utils::response::{event_href, LinkHref, Links};
use crate::AppState;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "almanac-api",
    };
    (StatusCode::OK, Json(payload)).into_response()
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::Validation(format!("Missing required field '{field}'.")))
}

fn not_found(id: u32) -> AppError {
    AppError::NotFound(format!("Event with ID {id} not found."))
}

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub name: Option<String>,
    pub date: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub location: Option<EventLocation>,
    pub description: Option<String>,
}

/// `{id, last-update, _links}` body shared by create and patch.
#[derive(Serialize)]
pub struct EventStampResponse {
    pub id: u32,
    #[serde(rename = "last-update")]
    pub last_update: String,
    #[serde(rename = "_links")]
    pub links: Links,
}

pub async fn create_event(
    State(state): State<AppState>,
    Json(body): Json<CreateEventRequest>,
) -> Result<Response, AppError> {
    let draft = EventDraft {
        name: required(body.name, "name")?,
        date: event::parse_date(&required(body.date, "date")?)?,
        start_time: event::parse_time(&required(body.from, "from")?)?,
        end_time: event::parse_time(&required(body.to, "to")?)?,
        location: required(body.location, "location")?,
        description: body.description.unwrap_or_default(),
    };

    let created = state.store.create(draft, Utc::now().naive_utc())?;

    let payload = EventStampResponse {
        id: created.id,
        last_update: created.formatted_last_update(),
        links: Links::self_only(event_href(created.id)),
    };
    Ok((StatusCode::CREATED, Json(payload)).into_response())
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub order: Option<String>,
    pub page: Option<String>,
    pub size: Option<String>,
    pub filter: Option<String>,
}

#[derive(Serialize)]
pub struct EventListResponse {
    pub page: usize,
    #[serde(rename = "page-size")]
    pub page_size: usize,
    pub events: Vec<Value>,
    #[serde(rename = "_links")]
    pub links: Links,
}

fn parse_positive(value: Option<&str>, field: &str, default: usize) -> Result<usize, AppError> {
    let Some(raw) = value else {
        return Ok(default);
    };
    match raw.parse::<usize>() {
        Ok(parsed) if parsed >= 1 => Ok(parsed),
        _ => Err(AppError::Validation(format!(
            "Parameter '{field}' must be a positive integer."
        ))),
    }
}

fn list_href(order: &str, page: usize, size: usize, filter: &str) -> String {
    // `+` decodes to a space in query strings; write it back as `+` so the
    // emitted href is a valid URI that round-trips through `parse_order`.
    let order = order.replace(' ', "+");
    format!("/events?order={order}&page={page}&size={size}&filter={filter}")
}

pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Response, AppError> {
    let order = params
        .order
        .unwrap_or_else(|| query::DEFAULT_ORDER.to_string());
    let page = parse_positive(params.page.as_deref(), "page", query::DEFAULT_PAGE)?;
    let size = parse_positive(params.size.as_deref(), "size", query::DEFAULT_PAGE_SIZE)?;
    let filter = params
        .filter
        .unwrap_or_else(|| query::DEFAULT_FILTER.to_string());

    let keys = query::parse_order(&order)?;
    let fields = query::parse_filter(&filter);

    let mut events = state.store.snapshot();
    query::sort_events(&mut events, &keys);

    let rows: Vec<Value> = query::page_slice(&events, page, size)
        .iter()
        .map(|e| query::project(e, &fields))
        .collect();

    let mut links = Links::self_only(list_href(&order, page, size, &filter));
    if page * size < events.len() {
        links.next = Some(LinkHref::new(list_href(&order, page + 1, size, &filter)));
    }

    let payload = EventListResponse {
        page,
        page_size: size,
        events: rows,
        links,
    };
    Ok((StatusCode::OK, Json(payload)).into_response())
}

#[derive(Serialize)]
pub struct EventViewResponse {
    pub id: u32,
    #[serde(rename = "last-update")]
    pub last_update: String,
    pub name: String,
    pub date: String,
    pub from: String,
    pub to: String,
    pub location: EventLocation,
    pub description: String,
    #[serde(rename = "_metadata")]
    pub metadata: EventMetadata,
    #[serde(rename = "_links")]
    pub links: Links,
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Response, AppError> {
    let found = state.store.get(id).ok_or_else(|| not_found(id))?;
    let (previous, next) = state.store.neighbors(id).unwrap_or((None, None));

    let holidays = state
        .enrichment
        .public_holidays(found.date.year(), &state.config.holiday_country)
        .await?;
    let forecast = state
        .enrichment
        .current_weather(state.config.ref_lat, state.config.ref_lng)
        .await?;
    let metadata = EventMetadata::build(&forecast, &holidays, found.date)?;

    let links = Links {
        self_link: LinkHref::new(event_href(id)),
        previous: previous.map(|p| LinkHref::new(event_href(p))),
        next: next.map(|n| LinkHref::new(event_href(n))),
    };

    let payload = EventViewResponse {
        id: found.id,
        last_update: found.formatted_last_update(),
        name: found.name,
        date: found.date.format(DATE_FORMAT).to_string(),
        from: found.start_time.format(TIME_DISPLAY_FORMAT).to_string(),
        to: found.end_time.format(TIME_DISPLAY_FORMAT).to_string(),
        location: found.location,
        description: found.description,
        metadata,
        links,
    };
    Ok((StatusCode::OK, Json(payload)).into_response())
}

#[derive(Debug, Deserialize)]
pub struct UpdateEventRequest {
    pub name: Option<String>,
    pub date: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub location: Option<EventLocation>,
    pub description: Option<String>,
    pub last_update: Option<String>,
}

pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    Json(body): Json<UpdateEventRequest>,
) -> Result<Response, AppError> {
    let patch = EventPatch {
        name: body.name,
        date: body.date.as_deref().map(event::parse_date).transpose()?,
        start_time: body.from.as_deref().map(event::parse_time).transpose()?,
        end_time: body.to.as_deref().map(event::parse_time).transpose()?,
        location: body.location,
        description: body.description,
        last_update: body
            .last_update
            .as_deref()
            .map(event::parse_timestamp)
            .transpose()?,
    };

    let updated = state.store.update(id, patch, Utc::now().naive_utc())?;

    let payload = EventStampResponse {
        id: updated.id,
        last_update: updated.formatted_last_update(),
        links: Links::self_only(event_href(updated.id)),
    };
    Ok((StatusCode::OK, Json(payload)).into_response())
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub id: u32,
}

pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Response, AppError> {
    state.store.delete(id)?;

    let payload = DeleteResponse {
        message: format!("The event with id {id} was removed from the database!"),
        id,
    };
    Ok((StatusCode::OK, Json(payload)).into_response())
}
