use actix_web::{http::StatusCode, HttpResponse};

use crate::types::MessageResponse;

/// `{"message": ...}` body, the shape clients parse for known outcomes.
pub(crate) fn json_message(status: StatusCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(MessageResponse {
        message: message.into(),
    })
}

/// Bare JSON string body, used for request validation failures.
pub(crate) fn json_text(status: StatusCode, text: &str) -> HttpResponse {
    HttpResponse::build(status).json(text)
}
