use std::error::Error;
use std::fmt::{Display, Formatter};

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use crate::web::models::ErrorResponse;

/// Error type for site request handling
#[derive(Debug)]
pub enum SiteError {
    /// Template could not be rendered
    Template(String),
    /// Submitted form could not be read
    InvalidForm(String),
    /// Configuration or static content problem
    Configuration(String),
    /// Metrics could not be registered or encoded
    Metrics(String),
}

impl SiteError {
    /// Machine-readable code for JSON error bodies
    pub fn error_code(&self) -> &'static str {
        match self {
            SiteError::Template(_) => "TEMPLATE_ERROR",
            SiteError::InvalidForm(_) => "INVALID_FORM",
            SiteError::Configuration(_) => "CONFIGURATION_ERROR",
            SiteError::Metrics(_) => "METRICS_ERROR",
        }
    }
}

impl Display for SiteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SiteError::Template(msg) => write!(f, "Template error: {}", msg),
            SiteError::InvalidForm(msg) => write!(f, "Invalid form: {}", msg),
            SiteError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            SiteError::Metrics(msg) => write!(f, "Metrics error: {}", msg),
        }
    }
}

impl Error for SiteError {}

impl From<handlebars::RenderError> for SiteError {
    fn from(err: handlebars::RenderError) -> Self {
        SiteError::Template(err.to_string())
    }
}

impl From<prometheus::Error> for SiteError {
    fn from(err: prometheus::Error) -> Self {
        SiteError::Metrics(err.to_string())
    }
}

impl ResponseError for SiteError {
    fn status_code(&self) -> StatusCode {
        match self {
            SiteError::InvalidForm(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            success: false,
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        })
    }
}
