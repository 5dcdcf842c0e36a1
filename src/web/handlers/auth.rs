use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::{info, warn};
use serde_json::json;

use crate::common::i18n::t;
use crate::web::handlers::language::request_language;
use crate::web::models::{LoginForm, LoginQuery};
use crate::web::server::AppState;
use crate::web::session::{expired_session_cookie, session_cookie, session_id};
use crate::web::templates::render;

pub const LOGIN_PATH: &str = "/dashboard/login";

/// Session of the administrator making the request
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub id: String,
    pub token: String,
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location.to_string()))
        .finish()
}

/// Resolve the caller's dashboard session or send them to the login page
pub fn require_session(req: &HttpRequest, state: &AppState) -> Result<AdminSession, HttpResponse> {
    let id = session_id(req).ok_or_else(|| redirect(LOGIN_PATH))?;
    match state.sessions.token(&id) {
        Some(token) => Ok(AdminSession { id, token }),
        None => Err(HttpResponse::SeeOther()
            .insert_header((header::LOCATION, LOGIN_PATH))
            .cookie(expired_session_cookie())
            .finish()),
    }
}

/// Serve the login form
pub async fn login_page(
    req: HttpRequest,
    query: web::Query<LoginQuery>,
    data: web::Data<AppState>,
) -> impl Responder {
    if require_session(&req, &data).is_ok() {
        return redirect("/dashboard");
    }

    let lang = request_language(&req, &data);
    let error = query.error.as_deref().map(|code| match code {
        "invalid" => t(lang, "login.error").to_string(),
        other => other.to_string(),
    });

    let context = json!({
        "lang": lang.code(),
        "dir": lang.direction().as_str(),
        "other_lang": lang.other().code(),
        "error": error,
    });
    render("login", &context)
}

/// Exchange credentials for a backend token and open a session
pub async fn login_submit(form: web::Form<LoginForm>, data: web::Data<AppState>) -> impl Responder {
    let username = form.username.trim();
    let failed = || redirect(&format!("{}?error=invalid", LOGIN_PATH));

    if username.is_empty() || form.password.is_empty() {
        return failed();
    }

    let token = match data.backend.login(username, &form.password).await {
        Ok(response) => response.token.unwrap_or_default(),
        Err(e) => {
            warn!("Login failed for '{}': {}", username, e);
            return failed();
        }
    };

    match data.sessions.create(&token) {
        Some(id) => {
            info!("Administrator '{}' logged in", username);
            HttpResponse::SeeOther()
                .insert_header((header::LOCATION, "/dashboard"))
                .cookie(session_cookie(&id))
                .finish()
        }
        None => {
            warn!("Login for '{}' returned no usable token", username);
            failed()
        }
    }
}

/// Close the session and clear its cookie
pub async fn logout(req: HttpRequest, data: web::Data<AppState>) -> impl Responder {
    if let Some(id) = session_id(&req) {
        data.sessions.remove(&id);
    }
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, LOGIN_PATH))
        .cookie(expired_session_cookie())
        .finish()
}
