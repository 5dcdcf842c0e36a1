use actix_web::cookie::{time, Cookie, SameSite};
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::debug;
use reqwest::Url;

use crate::common::i18n::{resolve_language, Language, LANGUAGE_COOKIE};
use crate::web::models::LangQuery;
use crate::web::server::AppState;

/// Language for this request: `?lang=`, then the stored flag, then the configured default
pub fn request_language(req: &HttpRequest, state: &AppState) -> Language {
    let query = web::Query::<LangQuery>::from_query(req.query_string())
        .map(|q| q.into_inner())
        .unwrap_or_default();
    let stored = req.cookie(LANGUAGE_COOKIE);

    resolve_language(
        query.lang.as_deref(),
        stored.as_ref().map(|c| c.value()),
        state.config.default_language,
    )
}

pub fn language_cookie(lang: Language) -> Cookie<'static> {
    Cookie::build(LANGUAGE_COOKIE, lang.code())
        .path("/")
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(365))
        .finish()
}

/// Path of a same-origin `Referer` without its `lang` parameter, so the new
/// flag is not overridden on the way back
fn return_path(req: &HttpRequest) -> String {
    let referer = match req
        .headers()
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
    {
        Some(referer) => referer,
        None => return "/".to_string(),
    };

    let info = req.connection_info();
    let base = match Url::parse(&format!("{}://{}/", info.scheme(), info.host())) {
        Ok(base) => base,
        Err(_) => return "/".to_string(),
    };
    let mut url = match base.join(referer) {
        Ok(url) => url,
        Err(_) => return "/".to_string(),
    };
    if url.host_str() != base.host_str() || url.port() != base.port() || url.path().starts_with("//") {
        debug!("Ignoring foreign referer '{}'", referer);
        return "/".to_string();
    }

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "lang")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    url.set_query(None);
    if !kept.is_empty() {
        url.query_pairs_mut().extend_pairs(kept);
    }

    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

/// Store the language flag and go back to the page the visitor came from
pub async fn switch_language(req: HttpRequest, path: web::Path<String>) -> impl Responder {
    let mut response = HttpResponse::SeeOther();
    response.insert_header((header::LOCATION, return_path(&req)));

    match Language::from_code(&path) {
        Some(lang) => {
            debug!("Language switched to {}", lang);
            response.cookie(language_cookie(lang)).finish()
        }
        None => {
            debug!("Ignoring unknown language code '{}'", path.as_str());
            response.finish()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn test_switch_sets_cookie_and_returns_to_referer() {
        let app = test::init_service(
            App::new().route("/language/{code}", web::get().to(switch_language)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/language/ar")
            .insert_header((header::REFERER, "/products?section=2"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 303);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/products?section=2");
        let cookie = resp
            .response()
            .cookies()
            .find(|c| c.name() == LANGUAGE_COOKIE)
            .unwrap();
        assert_eq!(cookie.value(), "ar");
    }

    // Unknown codes leave the flag alone but still redirect
    #[actix_web::test]
    async fn test_unknown_code_is_ignored() {
        let app = test::init_service(
            App::new().route("/language/{code}", web::get().to(switch_language)),
        )
        .await;

        let req = test::TestRequest::get().uri("/language/fr").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 303);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");
        assert!(resp.response().cookies().next().is_none());
    }

    // A page opened with ?lang= must not keep overriding the new flag
    #[actix_web::test]
    async fn test_switch_drops_lang_parameter_from_referer() {
        let app = test::init_service(
            App::new().route("/language/{code}", web::get().to(switch_language)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/language/en")
            .insert_header((header::REFERER, "/about?lang=ar"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/about");

        let req = test::TestRequest::get()
            .uri("/language/ar")
            .insert_header((header::REFERER, "http://localhost:8080/products?lang=en&section=3"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/products?section=3");
    }

    #[actix_web::test]
    async fn test_switch_ignores_foreign_referer() {
        let app = test::init_service(
            App::new().route("/language/{code}", web::get().to(switch_language)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/language/ar")
            .insert_header((header::REFERER, "https://elsewhere.example/phish"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");
    }
}
