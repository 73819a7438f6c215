use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::{self, Responder, Response};
use std::fmt;
use std::io::Cursor;

#[derive(Debug, Clone)]
pub enum Error {
    ConfigError(String),
    LoginError(String),
    ApiError(String),
    UnexpectedApiResponse,
    InvalidResponse(String, String),
    RateExceeded(String),
    StationIndexOutOfRange(usize, usize),
    StoreError(String),
    FormatError,
    InternalError,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ConfigError(s) => write!(f, "configuration error: {}", s),
            Error::LoginError(s) => write!(f, "login failed: {}", s),
            Error::ApiError(s) => write!(f, "API error: {}", s),
            Error::UnexpectedApiResponse => write!(f, "unexpected API response"),
            Error::InvalidResponse(body, reason) => {
                write!(f, "invalid API response ({}): {}", reason, body)
            }
            Error::RateExceeded(s) => write!(f, "rate limit exceeded: {}", s),
            Error::StationIndexOutOfRange(index, len) => write!(
                f,
                "station index {} out of range ({} stations available)",
                index, len
            ),
            Error::StoreError(s) => write!(f, "state store error: {}", s),
            Error::FormatError => write!(f, "unable to format exporter output"),
            Error::InternalError => write!(f, "internal error"),
        }
    }
}

impl std::error::Error for Error {}

impl<'r> Responder<'r, 'static> for Error {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let (status, error) = match self {
            Error::RateExceeded(s) => (
                Status::TooManyRequests,
                format!("<html><body><h3>429 Too Many Requests</h3>Downstream API response: <code>{}</code></body></html>", s),
            ),
            Error::LoginError(s) => (
                Status::Forbidden,
                format!("<html><body><h3>403 Forbidden</h3>Error while authenticating to downstream API: <code>{}</code></body></html>", s),
            ),
            _ => (
                Status::InternalServerError,
                format!(
                    "<html><body><h3>Unknown exception</h3><code>{}</code></body></html>",
                    self
                ),
            ),
        };

        Response::build()
            .status(status)
            .sized_body(error.len(), Cursor::new(error))
            .header(ContentType::new("text", "html"))
            .ok()
    }
}
