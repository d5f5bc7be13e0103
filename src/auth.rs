use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::user::User;
use rocket::http::{Cookie, CookieJar, SameSite, Status};
use rocket::outcome::Outcome;
use rocket::request::{FromRequest, Outcome as RequestOutcome, Request};
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::{Object, Responses, SecurityRequirement, SecurityScheme, SecuritySchemeData};
use rocket_okapi::request::{OpenApiFromRequest, RequestHeaderInput};
use serde::Serialize;
use sqlx::PgPool;

pub const SESSION_COOKIE: &str = "user";

/// The user behind the session cookie of the current request.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub id: i64,
    pub email: String,
}

impl CurrentUser {
    /// Rejects requests that act on another user's behalf.
    pub fn ensure_is(&self, user_id: i64, denial: &str) -> Result<(), AppError> {
        if self.id != user_id {
            return Err(AppError::Forbidden(denial.to_string()));
        }
        Ok(())
    }
}

pub(crate) fn session_cookie_value(user: &User) -> String {
    format!("{}:{}", user.user_id, user.email)
}

pub(crate) fn parse_session_cookie_value(value: &str) -> Option<(i64, &str)> {
    let (user_id, email) = value.split_once(':')?;
    let user_id = user_id.parse::<i64>().ok()?;
    if email.is_empty() {
        return None;
    }
    Some((user_id, email))
}

/// Stores the client-held session. No expiry is set; it lives until logout.
pub fn start_session(cookies: &CookieJar<'_>, user: &User) {
    cookies.add_private(Cookie::build((SESSION_COOKIE, session_cookie_value(user))).path("/").same_site(SameSite::Lax).http_only(true));
}

pub fn end_session(cookies: &CookieJar<'_>) {
    cookies.remove_private(Cookie::build(SESSION_COOKIE).path("/"));
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for CurrentUser {
    type Error = AppError;

    async fn from_request(req: &'r Request<'_>) -> RequestOutcome<Self, Self::Error> {
        let Some(cookie) = req.cookies().get_private(SESSION_COOKIE) else {
            return Outcome::Error((Status::Unauthorized, AppError::Unauthorized));
        };
        let Some((user_id, email)) = parse_session_cookie_value(cookie.value()) else {
            return Outcome::Error((Status::Unauthorized, AppError::Unauthorized));
        };

        let pool = match req.rocket().state::<PgPool>() {
            Some(pool) => pool,
            None => return Outcome::Error((Status::InternalServerError, AppError::configuration("database pool is not managed"))),
        };
        let repo = PostgresRepository { pool: pool.clone() };

        match repo.get_user_by_id(user_id).await {
            Ok(Some(user)) if user.email == email => {
                let current_user = CurrentUser { id: user.user_id, email: user.email };
                req.local_cache(|| Some(current_user.clone()));
                Outcome::Success(current_user)
            }
            Ok(_) => Outcome::Error((Status::Unauthorized, AppError::Unauthorized)),
            Err(err) => Outcome::Error((Status::from(&err), err)),
        }
    }
}

impl<'a> OpenApiFromRequest<'a> for CurrentUser {
    fn from_request_input(_gen: &mut OpenApiGenerator, _name: String, _required: bool) -> rocket_okapi::Result<RequestHeaderInput> {
        let security_scheme = SecurityScheme {
            description: Some("Cookie-based session. Log in via POST /api/auth/login to obtain it.".to_string()),
            data: SecuritySchemeData::ApiKey {
                name: SESSION_COOKIE.to_string(),
                location: "cookie".to_string(),
            },
            extensions: Object::default(),
        };

        let mut security_req = SecurityRequirement::new();
        security_req.insert("cookieAuth".to_string(), Vec::new());

        Ok(RequestHeaderInput::Security("cookieAuth".to_string(), security_scheme, security_req))
    }

    fn get_responses(_gen: &mut OpenApiGenerator) -> rocket_okapi::Result<Responses> {
        use rocket_okapi::okapi::openapi3::{RefOr, Response};
        let mut responses = Responses::default();
        responses.responses.insert(
            "401".to_string(),
            RefOr::Object(Response {
                description: "Unauthorized - Authentication required".to_string(),
                ..Default::default()
            }),
        );
        Ok(responses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_session_cookie_value_valid() {
        assert_eq!(parse_session_cookie_value("42:ada@example.com"), Some((42, "ada@example.com")));
    }

    #[test]
    fn parse_session_cookie_value_invalid_id() {
        assert!(parse_session_cookie_value("abc:ada@example.com").is_none());
    }

    #[test]
    fn parse_session_cookie_value_missing_parts() {
        assert!(parse_session_cookie_value("missing-delimiter").is_none());
        assert!(parse_session_cookie_value("42:").is_none());
    }

    #[test]
    fn ensure_is_rejects_other_users() {
        let user = CurrentUser {
            id: 2,
            email: "renter@example.com".to_string(),
        };
        assert!(user.ensure_is(2, "nope").is_ok());
        assert!(matches!(user.ensure_is(1, "nope"), Err(AppError::Forbidden(_))));
    }
}
