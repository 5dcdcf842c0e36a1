use std::sync::Arc;

use actix_files as fs;
use actix_web::{middleware, web, App, HttpServer};
use log::info;

use crate::backend::client::{BackendClient, SiteBackend};
use crate::common::content::StaticContent;
use crate::common::metrics::SiteMetrics;
use crate::config::SiteConfig;
use crate::web::handlers;
use crate::web::session::SessionStore;

/// Shared application state for web handlers
pub struct AppState {
    /// Typed backend API used by pages and the dashboard
    pub backend: Arc<dyn SiteBackend>,
    /// Raw HTTP client for the proxy route
    pub client: BackendClient,
    pub config: SiteConfig,
    /// Static marketing copy
    pub content: StaticContent,
    /// Dashboard sessions
    pub sessions: SessionStore,
    pub metrics: SiteMetrics,
}

impl AppState {
    pub fn new(
        backend: Arc<dyn SiteBackend>,
        client: BackendClient,
        config: SiteConfig,
        content: StaticContent,
        metrics: SiteMetrics,
    ) -> Self {
        let sessions = SessionStore::new(config.session_ttl_minutes);
        Self {
            backend,
            client,
            config,
            content,
            sessions,
            metrics,
        }
    }
}

/// Register every route except static files
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // Backend relay
        .route("/api/proxy/{tail:.*}", web::route().to(handlers::proxy::forward))
        // Public pages
        .route("/", web::get().to(handlers::pages::home))
        .route("/about", web::get().to(handlers::pages::about))
        .route("/products", web::get().to(handlers::pages::products))
        .route("/products/{id}", web::get().to(handlers::pages::product_detail))
        .route("/contact", web::get().to(handlers::pages::contact))
        .route("/contact", web::post().to(handlers::pages::contact_submit))
        .route("/language/{code}", web::get().to(handlers::language::switch_language))
        // Search engines and monitoring
        .route("/sitemap.xml", web::get().to(handlers::seo::sitemap))
        .route("/robots.txt", web::get().to(handlers::seo::robots))
        .route("/metrics", web::get().to(handlers::seo::metrics))
        // Dashboard authentication
        .route("/dashboard/login", web::get().to(handlers::auth::login_page))
        .route("/dashboard/login", web::post().to(handlers::auth::login_submit))
        .route("/dashboard/logout", web::post().to(handlers::auth::logout))
        // Dashboard screens
        .route("/dashboard", web::get().to(handlers::dashboard::overview))
        .route("/dashboard/sections", web::get().to(handlers::dashboard::sections_page))
        .route("/dashboard/sections", web::post().to(handlers::dashboard::save_section))
        .route("/dashboard/sections/{id}/delete", web::post().to(handlers::dashboard::delete_section))
        .route("/dashboard/products", web::get().to(handlers::dashboard::products_page))
        .route("/dashboard/products", web::post().to(handlers::dashboard::save_product))
        .route("/dashboard/products/{id}/delete", web::post().to(handlers::dashboard::delete_product))
        .route(
            "/dashboard/products/{id}/images/{image_id}/delete",
            web::post().to(handlers::dashboard::delete_product_image),
        )
        .route(
            "/dashboard/products/{id}/translations/{lang}",
            web::post().to(handlers::dashboard::save_product_translation),
        )
        .route("/dashboard/projects", web::get().to(handlers::dashboard::projects_page))
        .route("/dashboard/projects", web::post().to(handlers::dashboard::save_project))
        .route("/dashboard/projects/{id}/delete", web::post().to(handlers::dashboard::delete_project))
        .route("/dashboard/customers", web::get().to(handlers::dashboard::customers_page))
        .route("/dashboard/customers", web::post().to(handlers::dashboard::save_customer))
        .route("/dashboard/customers/{id}/delete", web::post().to(handlers::dashboard::delete_customer))
        .route("/dashboard/feedback", web::get().to(handlers::dashboard::feedback_page))
        .route("/dashboard/feedback", web::post().to(handlers::dashboard::save_feedback))
        .route("/dashboard/feedback/{id}/delete", web::post().to(handlers::dashboard::delete_feedback))
        .route("/dashboard/admins", web::get().to(handlers::dashboard::admins_page))
        .route("/dashboard/admins", web::post().to(handlers::dashboard::register_admin))
        .route("/dashboard/admins/{id}/role", web::post().to(handlers::dashboard::update_admin_role))
        .route("/dashboard/admins/{id}/delete", web::post().to(handlers::dashboard::delete_admin));
}

/// Start the web server for the site and dashboard
pub async fn start_web_server(state: web::Data<AppState>) -> std::io::Result<()> {
    let bind_addr = state.config.bind_addr.clone();
    let static_dir = state.config.static_dir.clone();
    info!("Starting web server on http://{}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            // Static files
            .service(fs::Files::new("/static", static_dir.clone()))
            .configure(configure)
            // Default route for 404
            .default_service(web::to(handlers::pages::not_found))
    })
    .bind(bind_addr)?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::client::MockSiteBackend;
    use crate::web::handlers::test_support::{body_text, state_with};
    use actix_web::test;

    // Unknown paths fall through to the translated 404 page
    #[actix_web::test]
    async fn test_unknown_route_is_not_found() {
        let app = test::init_service(
            App::new()
                .app_data(state_with(MockSiteBackend::new()))
                .configure(configure)
                .default_service(web::to(handlers::pages::not_found)),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/no/such/page").to_request()).await;
        assert_eq!(resp.status(), 404);
        assert!(body_text(resp).await.contains("Page Not Found"));
    }

    #[actix_web::test]
    async fn test_about_page_renders_in_arabic() {
        let app = test::init_service(
            App::new().app_data(state_with(MockSiteBackend::new())).configure(configure),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/about?lang=ar").to_request()).await;
        assert_eq!(resp.status(), 200);
        let body = body_text(resp).await;
        assert!(body.contains("lang=\"ar\""));
        assert!(body.contains("عن أفكار سولار"));
        assert!(body.contains("offers-banner"));
    }

    #[actix_web::test]
    async fn test_language_switch_takes_effect_after_redirect() {
        let app = test::init_service(
            App::new().app_data(state_with(MockSiteBackend::new())).configure(configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/language/en")
            .insert_header((actix_web::http::header::REFERER, "/about?lang=ar"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        let location = resp
            .headers()
            .get(actix_web::http::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .to_string();
        let cookie = resp.response().cookies().next().unwrap().into_owned();

        let req = test::TestRequest::get().uri(&location).cookie(cookie).to_request();
        let body = body_text(test::call_service(&app, req).await).await;
        assert!(body.contains("<html lang=\"en\" dir=\"ltr\">"));
    }
}
