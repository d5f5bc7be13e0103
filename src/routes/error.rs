use crate::error::app_error::ErrorBody;
use rocket::serde::json::Json;
use rocket::{Request, catch};

// Reached only when no handler produced a body: failed guards, unparsable
// payloads, unmatched routes.

fn detail(message: &str) -> Json<ErrorBody> {
    Json(ErrorBody { detail: message.to_string() })
}

#[catch(400)]
pub fn bad_request(_: &Request) -> Json<ErrorBody> {
    detail("Bad request")
}

#[catch(401)]
pub fn unauthorized(_: &Request) -> Json<ErrorBody> {
    detail("Authentication required")
}

#[catch(403)]
pub fn forbidden(_: &Request) -> Json<ErrorBody> {
    detail("Forbidden")
}

#[catch(404)]
pub fn not_found(_: &Request) -> Json<ErrorBody> {
    detail("Not found")
}

#[catch(409)]
pub fn conflict(_: &Request) -> Json<ErrorBody> {
    detail("Conflict")
}

#[catch(422)]
pub fn unprocessable_entity(_: &Request) -> Json<ErrorBody> {
    detail("Request body could not be parsed")
}

#[catch(500)]
pub fn internal_error(_: &Request) -> Json<ErrorBody> {
    detail("Internal server error")
}

#[catch(503)]
pub fn service_unavailable(_: &Request) -> Json<ErrorBody> {
    detail("Service temporarily unavailable")
}
