use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

use crate::common::errors::SiteError;

/// Prometheus counters for the proxy and the public pages
#[derive(Clone)]
pub struct SiteMetrics {
    registry: Registry,
    /// Proxied requests by HTTP method and outcome (`ok`, `backend_error`, `unreachable`)
    pub proxy_requests: IntCounterVec,
    /// Public pages rendered with empty data because the backend failed
    pub page_fallbacks: IntCounterVec,
}

impl SiteMetrics {
    pub fn new() -> Result<Self, SiteError> {
        let registry = Registry::new();

        let proxy_requests = IntCounterVec::new(
            Opts::new("afkar_proxy_requests_total", "Requests forwarded to the backend"),
            &["method", "outcome"],
        )?;
        let page_fallbacks = IntCounterVec::new(
            Opts::new(
                "afkar_page_fallbacks_total",
                "Pages rendered without backend data",
            ),
            &["page"],
        )?;

        registry.register(Box::new(proxy_requests.clone()))?;
        registry.register(Box::new(page_fallbacks.clone()))?;

        Ok(Self {
            registry,
            proxy_requests,
            page_fallbacks,
        })
    }

    pub fn record_proxy(&self, method: &str, outcome: &str) {
        self.proxy_requests.with_label_values(&[method, outcome]).inc();
    }

    pub fn record_fallback(&self, page: &str) {
        self.page_fallbacks.with_label_values(&[page]).inc();
    }

    /// Prometheus text exposition of every counter
    pub fn render(&self) -> Result<String, SiteError> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| SiteError::Metrics(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_show_up_in_exposition() {
        let metrics = SiteMetrics::new().unwrap();
        metrics.record_proxy("GET", "ok");
        metrics.record_proxy("GET", "ok");
        metrics.record_fallback("products");

        let text = metrics.render().unwrap();
        assert!(text.contains(r#"afkar_proxy_requests_total{method="GET",outcome="ok"} 2"#));
        assert!(text.contains(r#"afkar_page_fallbacks_total{page="products"} 1"#));
    }

    // Each instance owns its registry, so two can coexist
    #[test]
    fn test_independent_registries() {
        let a = SiteMetrics::new().unwrap();
        let b = SiteMetrics::new().unwrap();
        a.record_fallback("home");
        assert!(!b.render().unwrap().contains("page=\"home\""));
    }
}
