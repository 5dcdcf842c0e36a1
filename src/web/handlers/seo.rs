use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use log::error;

use crate::common::errors::SiteError;
use crate::common::seo::{robots_txt, sitemap_xml};
use crate::web::server::AppState;

/// Serve `/sitemap.xml`
pub async fn sitemap(data: web::Data<AppState>) -> impl Responder {
    let body = sitemap_xml(&data.config.site_base_url, Utc::now().date_naive());
    HttpResponse::Ok()
        .content_type("application/xml; charset=utf-8")
        .body(body)
}

/// Serve `/robots.txt`
pub async fn robots(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(robots_txt(&data.config.site_base_url))
}

/// Prometheus scrape endpoint
pub async fn metrics(data: web::Data<AppState>) -> Result<HttpResponse, SiteError> {
    let body = data.metrics.render().map_err(|e| {
        error!("Failed to encode metrics: {}", e);
        e
    })?;
    Ok(HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(body))
}
