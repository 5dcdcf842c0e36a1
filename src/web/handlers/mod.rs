pub mod auth;
pub mod dashboard;
pub mod language;
pub mod pages;
pub mod proxy;
pub mod seo;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;
    use std::time::Duration;

    use actix_web::dev::ServiceResponse;
    use actix_web::{test, web};

    use crate::backend::client::{BackendClient, MockSiteBackend};
    use crate::common::content::StaticContent;
    use crate::common::metrics::SiteMetrics;
    use crate::config::SiteConfig;
    use crate::web::server::AppState;

    /// App state around a mocked backend
    pub fn state_with(backend: MockSiteBackend) -> web::Data<AppState> {
        state_for_backend(backend, "http://backend.test")
    }

    /// App state whose proxy client points at `backend_url`
    pub fn state_for_backend(backend: MockSiteBackend, backend_url: &str) -> web::Data<AppState> {
        let config = SiteConfig {
            backend_url: backend_url.to_string(),
            ..SiteConfig::default()
        };
        let client = BackendClient::new(backend_url, Duration::from_secs(5)).unwrap();
        web::Data::new(AppState::new(
            Arc::new(backend),
            client,
            config,
            StaticContent::embedded().unwrap(),
            SiteMetrics::new().unwrap(),
        ))
    }

    pub async fn body_text(resp: ServiceResponse) -> String {
        String::from_utf8(test::read_body(resp).await.to_vec()).unwrap()
    }

    pub async fn body_json(resp: ServiceResponse) -> serde_json::Value {
        serde_json::from_slice(&test::read_body(resp).await).unwrap()
    }
}
