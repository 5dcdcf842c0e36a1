//! Same-origin relay to the backend API.
//!
//! Browsers call `/api/proxy/<path>` and never talk to the backend origin
//! directly. Bodies are forwarded verbatim and every answer comes back as JSON.

use actix_web::http::{header, StatusCode};
use actix_web::{web, HttpRequest, HttpResponse};
use log::{error, info, warn};
use serde_json::{json, Value};

use crate::backend::client::NGROK_SKIP_HEADER;
use crate::config::join_url;
use crate::web::server::AppState;
use crate::web::session::session_id;

/// Verbs the relay forwards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl ProxyMethod {
    pub fn from_request(req: &HttpRequest) -> Option<Self> {
        match req.method().as_str() {
            "GET" => Some(ProxyMethod::Get),
            "POST" => Some(ProxyMethod::Post),
            "PUT" => Some(ProxyMethod::Put),
            "DELETE" => Some(ProxyMethod::Delete),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProxyMethod::Get => "GET",
            ProxyMethod::Post => "POST",
            ProxyMethod::Put => "PUT",
            ProxyMethod::Delete => "DELETE",
        }
    }

    fn to_reqwest(self) -> reqwest::Method {
        match self {
            ProxyMethod::Get => reqwest::Method::GET,
            ProxyMethod::Post => reqwest::Method::POST,
            ProxyMethod::Put => reqwest::Method::PUT,
            ProxyMethod::Delete => reqwest::Method::DELETE,
        }
    }

    fn has_body(self) -> bool {
        matches!(self, ProxyMethod::Post | ProxyMethod::Put)
    }
}

/// Body returned for a successful GET/POST/PUT: JSON as-is, empty as `{}`, text wrapped
pub fn relay_body(text: &str) -> Value {
    if text.is_empty() {
        return json!({});
    }
    serde_json::from_str(text).unwrap_or_else(|_| json!({ "message": text }))
}

/// Body returned for a backend error status
pub fn error_body(status: u16, text: &str) -> Value {
    if text.is_empty() {
        json!({ "error": format!("API Error: {}", status) })
    } else {
        json!({ "error": text })
    }
}

fn header_str<'a>(req: &'a HttpRequest, name: header::HeaderName) -> Option<&'a str> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

/// `Authorization` from the caller, else the dashboard session's token
fn authorization(req: &HttpRequest, state: &AppState) -> Option<String> {
    if let Some(auth) = header_str(req, header::AUTHORIZATION) {
        return Some(auth.to_string());
    }
    session_id(req)
        .and_then(|id| state.sessions.token(&id))
        .map(|token| format!("Bearer {}", token))
}

/// Forward `/api/proxy/{tail}` to the backend
pub async fn forward(
    req: HttpRequest,
    tail: web::Path<String>,
    body: web::Bytes,
    data: web::Data<AppState>,
) -> HttpResponse {
    let method = match ProxyMethod::from_request(&req) {
        Some(method) => method,
        None => {
            warn!("Proxy refused {} request", req.method());
            data.metrics.record_proxy("OTHER", "rejected");
            return HttpResponse::MethodNotAllowed()
                .insert_header((header::ALLOW, "GET, POST, PUT, DELETE"))
                .json(json!({ "error": "Method not allowed" }));
        }
    };

    let mut url = join_url(data.client.base_url(), &tail);
    if method == ProxyMethod::Get && !req.query_string().is_empty() {
        url = format!("{}?{}", url, req.query_string());
    }
    info!("Proxy {}: {}", method.as_str(), url);

    let mut outbound = data
        .client
        .http()
        .request(method.to_reqwest(), &url)
        .header(NGROK_SKIP_HEADER, "true");

    if let Some(auth) = authorization(&req, &data) {
        outbound = outbound.header("Authorization", auth);
    }

    if method == ProxyMethod::Get {
        outbound = outbound.header("Accept", "application/json");
    }

    if method.has_body() {
        let content_type = header_str(&req, header::CONTENT_TYPE).unwrap_or_default();
        if content_type.contains("multipart/form-data") {
            // Raw bytes keep the caller's boundary intact
            outbound = outbound.header("Content-Type", content_type).body(body.to_vec());
        } else {
            outbound = outbound
                .header("Content-Type", "application/json")
                .body(String::from_utf8_lossy(&body).into_owned());
        }
    }

    let response = match outbound.send().await {
        Ok(response) => response,
        Err(e) => {
            error!("Proxy {} fetch error: {}", method.as_str(), e);
            data.metrics.record_proxy(method.as_str(), "unreachable");
            return HttpResponse::InternalServerError().json(json!({ "error": "Failed to connect to backend" }));
        }
    };

    let status = response.status().as_u16();
    info!("Proxy {} response status: {}", method.as_str(), status);

    let text = match response.text().await {
        Ok(text) => text,
        Err(e) => {
            error!("Proxy {} could not read backend body: {}", method.as_str(), e);
            data.metrics.record_proxy(method.as_str(), "unreachable");
            return HttpResponse::InternalServerError().json(json!({ "error": "Failed to connect to backend" }));
        }
    };

    if !(200..300).contains(&status) {
        warn!("Proxy {} error: {}", method.as_str(), text);
        data.metrics.record_proxy(method.as_str(), "backend_error");
        let code = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
        return HttpResponse::build(code).json(error_body(status, &text));
    }

    data.metrics.record_proxy(method.as_str(), "ok");
    match method {
        ProxyMethod::Delete => HttpResponse::Ok().json(json!({ "success": true })),
        _ => HttpResponse::Ok().json(relay_body(&text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::client::MockSiteBackend;
    use crate::web::handlers::test_support::{body_json, state_for_backend};
    use crate::web::session::SESSION_COOKIE;
    use actix_web::cookie::Cookie;
    use actix_web::{test as actix_test, App};
    use wiremock::matchers::{body_string, header as header_is, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    macro_rules! init_proxy {
        ($state:expr) => {
            actix_test::init_service(
                App::new()
                    .app_data($state.clone())
                    .route("/api/proxy/{tail:.*}", web::route().to(forward)),
            )
            .await
        };
    }

    #[test]
    fn test_relay_body_shapes() {
        assert_eq!(relay_body(""), json!({}));
        assert_eq!(relay_body("[1,2]"), json!([1, 2]));
        assert_eq!(relay_body("Created"), json!({"message": "Created"}));
        assert_eq!(relay_body(" \n"), json!({"message": " \n"}));
        assert_eq!(error_body(404, ""), json!({"error": "API Error: 404"}));
        assert_eq!(error_body(400, "bad"), json!({"error": "bad"}));
    }

    #[actix_web::test]
    async fn test_get_forwards_query_and_relays_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/Product"))
            .and(query_param("lang", "ar"))
            .and(header_is(NGROK_SKIP_HEADER, "true"))
            .and(header_is("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": [], "totalCount": 0})))
            .expect(1)
            .mount(&server)
            .await;
        let state = state_for_backend(MockSiteBackend::new(), &server.uri());
        let app = init_proxy!(state);

        let req = actix_test::TestRequest::get().uri("/api/proxy/api/Product?lang=ar").to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), 200);
        assert_eq!(body_json(resp).await, json!({"items": [], "totalCount": 0}));
        assert!(state
            .metrics
            .render()
            .unwrap()
            .contains(r#"afkar_proxy_requests_total{method="GET",outcome="ok"} 1"#));
    }

    // Errors keep the backend status and wrap its text
    #[actix_web::test]
    async fn test_backend_error_is_relayed() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/Section"))
            .respond_with(ResponseTemplate::new(400).set_body_string("Name is required"))
            .mount(&server)
            .await;
        let state = state_for_backend(MockSiteBackend::new(), &server.uri());
        let app = init_proxy!(state);

        let req = actix_test::TestRequest::put()
            .uri("/api/proxy/api/Section")
            .set_payload(r#"{"id":1}"#)
            .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), 400);
        assert_eq!(body_json(resp).await, json!({"error": "Name is required"}));
    }

    #[actix_web::test]
    async fn test_post_sends_json_with_caller_authorization() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/Customer"))
            .and(header_is("authorization", "Bearer from-caller"))
            .and(header_is("content-type", "application/json"))
            .and(body_string(r#"{"nameEn":"Sara"}"#))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;
        let state = state_for_backend(MockSiteBackend::new(), &server.uri());
        let app = init_proxy!(state);

        let req = actix_test::TestRequest::post()
            .uri("/api/proxy/api/Customer")
            .insert_header((header::AUTHORIZATION, "Bearer from-caller"))
            .insert_header((header::CONTENT_TYPE, "text/plain"))
            .set_payload(r#"{"nameEn":"Sara"}"#)
            .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), 200);
        assert_eq!(body_json(resp).await, json!({}));
    }

    #[actix_web::test]
    async fn test_session_token_fills_missing_authorization() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/Admin/3"))
            .and(header_is("authorization", "Bearer session-tok"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        let state = state_for_backend(MockSiteBackend::new(), &server.uri());
        let app = init_proxy!(state);
        let id = state.sessions.create("session-tok").unwrap();

        let req = actix_test::TestRequest::delete()
            .uri("/api/proxy/api/Admin/3")
            .cookie(Cookie::new(SESSION_COOKIE, id))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), 200);
        assert_eq!(body_json(resp).await, json!({"success": true}));
    }

    #[actix_web::test]
    async fn test_multipart_keeps_boundary() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/Product"))
            .and(header_is("content-type", "multipart/form-data; boundary=abc"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;
        let state = state_for_backend(MockSiteBackend::new(), &server.uri());
        let app = init_proxy!(state);

        let req = actix_test::TestRequest::post()
            .uri("/api/proxy/api/Product")
            .insert_header((header::CONTENT_TYPE, "multipart/form-data; boundary=abc"))
            .set_payload("--abc\r\nContent-Disposition: form-data; name=\"Price\"\r\n\r\n5\r\n--abc--\r\n")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(body_json(resp).await, json!({"message": "ok"}));
    }

    #[actix_web::test]
    async fn test_unsupported_verb_and_dead_backend() {
        let state = state_for_backend(MockSiteBackend::new(), "http://127.0.0.1:9");
        let app = init_proxy!(state);

        let req = actix_test::TestRequest::patch().uri("/api/proxy/api/Section").to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), 405);

        let req = actix_test::TestRequest::get().uri("/api/proxy/api/Section").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 500);
        assert_eq!(body_json(resp).await, json!({"error": "Failed to connect to backend"}));
    }

    // Made-up verbs must not mint a metric series each
    #[actix_web::test]
    async fn test_rejected_verbs_share_one_metric_series() {
        let state = state_for_backend(MockSiteBackend::new(), "http://127.0.0.1:9");
        let app = init_proxy!(state);

        for verb in ["X0", "X1", "PATCH"] {
            let req = actix_test::TestRequest::default()
                .method(actix_web::http::Method::from_bytes(verb.as_bytes()).unwrap())
                .uri("/api/proxy/api/Section")
                .to_request();
            assert_eq!(actix_test::call_service(&app, req).await.status(), 405);
        }

        let text = state.metrics.render().unwrap();
        assert!(text.contains(r#"afkar_proxy_requests_total{method="OTHER",outcome="rejected"} 3"#));
        assert!(!text.contains(r#"method="X0""#));
    }
}
