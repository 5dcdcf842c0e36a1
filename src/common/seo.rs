//! Search-engine output: JSON-LD structured data, sitemap and robots.txt.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{json, Value};

use crate::common::content::ContactInfo;
use crate::common::i18n::{t, Language};

const ORGANIZATION_NAME: &str = "AFKAR Solar";
const ORGANIZATION_NAME_AR: &str = "أفكار سولار";

/// One `<url>` entry of the sitemap
#[derive(Debug, Clone, Serialize)]
pub struct SitemapEntry {
    /// Path below the site root, `/` for the home page
    pub path: &'static str,
    pub change_frequency: &'static str,
    pub priority: f32,
}

/// Public routes listed in the sitemap
pub const SITEMAP_ENTRIES: [SitemapEntry; 5] = [
    SitemapEntry { path: "/", change_frequency: "daily", priority: 1.0 },
    SitemapEntry { path: "/products", change_frequency: "weekly", priority: 0.9 },
    SitemapEntry { path: "/contact", change_frequency: "monthly", priority: 0.8 },
    SitemapEntry { path: "/about", change_frequency: "monthly", priority: 0.7 },
    SitemapEntry { path: "/services", change_frequency: "weekly", priority: 0.8 },
];

fn page_url(base_url: &str, path: &str) -> String {
    if path == "/" {
        base_url.to_string()
    } else {
        format!("{}{}", base_url, path)
    }
}

/// Render the sitemap with `ar`/`en` alternates for every entry
pub fn sitemap_xml(base_url: &str, last_modified: NaiveDate) -> String {
    let base_url = base_url.trim_end_matches('/');
    let lastmod = last_modified.format("%Y-%m-%d");

    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\" \
         xmlns:xhtml=\"http://www.w3.org/1999/xhtml\">\n",
    );

    for entry in SITEMAP_ENTRIES.iter() {
        let alternate_path = if entry.path == "/" { "" } else { entry.path };
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", page_url(base_url, entry.path)));
        xml.push_str(&format!("    <lastmod>{}</lastmod>\n", lastmod));
        xml.push_str(&format!("    <changefreq>{}</changefreq>\n", entry.change_frequency));
        xml.push_str(&format!("    <priority>{:.1}</priority>\n", entry.priority));
        for lang in ["ar", "en"] {
            xml.push_str(&format!(
                "    <xhtml:link rel=\"alternate\" hreflang=\"{}\" href=\"{}/{}{}\"/>\n",
                lang, base_url, lang, alternate_path
            ));
        }
        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml
}

pub fn robots_txt(base_url: &str) -> String {
    format!(
        "User-agent: *\nAllow: /\nDisallow: /dashboard\n\nSitemap: {}/sitemap.xml\n",
        base_url.trim_end_matches('/')
    )
}

/// Breadcrumb trail for a page: the home page plus the page itself
pub fn breadcrumbs(lang: Language, base_url: &str, page: &str, path: &str) -> Vec<(String, String)> {
    let mut trail = vec![(t(lang, "nav.home").to_string(), base_url.to_string())];
    let title_key = match page {
        "about" => Some("nav.about"),
        "products" | "product" => Some("nav.products"),
        "contact" => Some("nav.contact"),
        _ => None,
    };
    if let Some(key) = title_key {
        trail.push((t(lang, key).to_string(), page_url(base_url, path)));
    }
    trail
}

/// JSON-LD documents embedded in every public page
pub fn structured_data(lang: Language, base_url: &str, contact: &ContactInfo, trail: &[(String, String)]) -> Vec<Value> {
    let base_url = base_url.trim_end_matches('/');
    let organization_id = format!("{}/#organization", base_url);
    let logo = format!("{}/static/images/logo.svg", base_url);
    let address = json!({
        "@type": "PostalAddress",
        "addressCountry": "SA",
        "addressRegion": "Riyadh",
        "addressLocality": contact.address.get(lang),
    });

    let organization = json!({
        "@context": "https://schema.org",
        "@type": "Organization",
        "@id": organization_id,
        "name": ORGANIZATION_NAME,
        "alternateName": ORGANIZATION_NAME_AR,
        "url": base_url,
        "logo": logo,
        "description": t(lang, "hero.subtitle"),
        "contactPoint": {
            "@type": "ContactPoint",
            "telephone": contact.sales.phone,
            "email": contact.sales.email,
            "contactType": "customer service",
            "areaServed": "SA",
            "availableLanguage": ["Arabic", "English"],
        },
        "address": address,
    });

    let local_business = json!({
        "@context": "https://schema.org",
        "@type": "LocalBusiness",
        "@id": format!("{}/#localbusiness", base_url),
        "name": ORGANIZATION_NAME,
        "image": logo,
        "address": address,
        "geo": {
            "@type": "GeoCoordinates",
            "latitude": "24.7136",
            "longitude": "46.6753",
        },
        "url": base_url,
        "telephone": contact.sales.phone,
        "priceRange": "$$",
        "openingHoursSpecification": [{
            "@type": "OpeningHoursSpecification",
            "dayOfWeek": ["Sunday", "Monday", "Tuesday", "Wednesday", "Thursday"],
            "opens": "08:00",
            "closes": "17:00",
        }],
    });

    let service = json!({
        "@context": "https://schema.org",
        "@type": "Service",
        "@id": format!("{}/#service", base_url),
        "serviceType": "Solar Energy Installation",
        "provider": {"@id": organization_id},
        "areaServed": {"@type": "Country", "name": "Saudi Arabia"},
        "description": t(lang, "products.subtitle"),
        "offers": {
            "@type": "Offer",
            "availability": "https://schema.org/InStock",
            "priceCurrency": "SAR",
        },
    });

    let website = json!({
        "@context": "https://schema.org",
        "@type": "WebSite",
        "@id": format!("{}/#website", base_url),
        "url": base_url,
        "name": ORGANIZATION_NAME,
        "publisher": {"@id": organization_id},
        "inLanguage": ["ar-SA", "en-US"],
    });

    let breadcrumb = json!({
        "@context": "https://schema.org",
        "@type": "BreadcrumbList",
        "itemListElement": trail.iter().enumerate().map(|(i, (name, url))| json!({
            "@type": "ListItem",
            "position": i + 1,
            "name": name,
            "item": url,
        })).collect::<Vec<_>>(),
    });

    vec![organization, local_business, service, website, breadcrumb]
}
