use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Plain `{"message": ...}` body used for errors and delete confirmations.
#[derive(Serialize)]
pub struct ApiMessage {
    pub message: String,
}

pub fn message_body(status: StatusCode, message: impl Into<String>) -> Response {
    let body = ApiMessage {
        message: message.into(),
    };
    (status, Json(body)).into_response()
}

/// A single hypermedia reference, `{"href": "/events/3"}`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LinkHref {
    pub href: String,
}

impl LinkHref {
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: href.into() }
    }
}

/// The `_links` block attached to event responses. `previous` and `next`
/// are omitted from the JSON when absent.
#[derive(Debug, Clone, Serialize)]
pub struct Links {
    #[serde(rename = "self")]
    pub self_link: LinkHref,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<LinkHref>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<LinkHref>,
}

impl Links {
    pub fn self_only(href: impl Into<String>) -> Self {
        Self {
            self_link: LinkHref::new(href),
            previous: None,
            next: None,
        }
    }
}

pub fn event_href(id: u32) -> String {
    format!("/events/{id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_link_serializes_under_self_key() {
        let links = Links::self_only(event_href(7));
        let value = serde_json::to_value(&links).unwrap();
        assert_eq!(value["self"]["href"], "/events/7");
        assert!(value.get("previous").is_none());
        assert!(value.get("next").is_none());
    }

    #[test]
    fn neighbour_links_appear_when_set() {
        let mut links = Links::self_only(event_href(2));
        links.previous = Some(LinkHref::new(event_href(1)));
        links.next = Some(LinkHref::new(event_href(3)));
        let value = serde_json::to_value(&links).unwrap();
        assert_eq!(value["previous"]["href"], "/events/1");
        assert_eq!(value["next"]["href"], "/events/3");
    }
}
