use actix_web::http::{header, StatusCode};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::{error, info, warn};
use serde_json::{json, Value};

use crate::backend::models::{Product, ProductQuery, Section};
use crate::backend::normalize::image_url;
use crate::common::i18n::Language;
use crate::web::handlers::language::request_language;
use crate::web::models::{ContactForm, ProductsQuery};
use crate::web::server::AppState;
use crate::web::templates::{page_context, render, render_with_status};

const WHATSAPP_BASE: &str = "https://wa.me";

fn product_view(state: &AppState, product: &Product) -> Value {
    let origin = state.config.backend_url.as_str();
    json!({
        "id": product.id,
        "name": product.name,
        "main_desc": product.main_desc,
        "sub_desc": product.sub_desc,
        "price": format!("{:.2}", product.price),
        "section_id": product.section_id,
        "section_name": product.section_name,
        "image": image_url(origin, product.images.first().map(|i| i.url.as_str())),
        "images": product.images.iter()
            .map(|i| image_url(origin, Some(i.url.as_str())))
            .collect::<Vec<_>>(),
    })
}

/// Serve the home page
pub async fn home(req: HttpRequest, data: web::Data<AppState>) -> impl Responder {
    let lang = request_language(&req, &data);

    let projects = match data.backend.projects(lang).await {
        Ok(projects) => projects,
        Err(e) => {
            warn!("Featured projects unavailable: {}", e);
            data.metrics.record_fallback("home");
            Vec::new()
        }
    };
    let origin = data.config.backend_url.as_str();
    let projects: Vec<Value> = projects
        .iter()
        .map(|p| json!({
            "id": p.id,
            "title": p.title,
            "location": p.location,
            "image": image_url(origin, p.image_relative_path.as_deref()),
        }))
        .collect();

    let content = data.content.localized(lang);
    let mut context = page_context(&data, lang, "home", "/");
    context.insert("stats".into(), content["stats"].clone());
    context.insert("services".into(), content["services"].clone());
    context.insert("testimonials".into(), content["testimonials"].clone());
    context.insert("projects".into(), json!(projects));

    render("home", &Value::Object(context))
}

/// Serve the about page
pub async fn about(req: HttpRequest, data: web::Data<AppState>) -> impl Responder {
    let lang = request_language(&req, &data);
    let context = page_context(&data, lang, "about", "/about");
    render("about", &Value::Object(context))
}

/// Serve the product catalog, optionally narrowed to one section
pub async fn products(
    req: HttpRequest,
    query: web::Query<ProductsQuery>,
    data: web::Data<AppState>,
) -> impl Responder {
    let lang = request_language(&req, &data);
    let selected = query
        .section
        .as_deref()
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .filter(|id| *id > 0);

    let catalog = ProductQuery::catalog(lang);

    let (sections, listing) = futures::join!(
        data.backend.sections(lang),
        data.backend.products(&catalog),
    );

    let sections: Vec<Section> = sections.unwrap_or_else(|e| {
        warn!("Sections unavailable: {}", e);
        data.metrics.record_fallback("products");
        Vec::new()
    });
    let items: Vec<Product> = match listing {
        Ok(listing) => listing.items,
        Err(e) => {
            warn!("Products unavailable: {}", e);
            data.metrics.record_fallback("products");
            Vec::new()
        }
    };

    let products: Vec<Value> = items
        .iter()
        .filter(|p| selected.map_or(true, |id| p.section_id == id))
        .map(|p| product_view(&data, p))
        .collect();
    let sections: Vec<Value> = sections
        .iter()
        .map(|s| json!({"id": s.id, "name": s.name, "active": selected == Some(s.id)}))
        .collect();

    let mut context = page_context(&data, lang, "products", "/products");
    context.insert("sections".into(), json!(sections));
    context.insert("all_active".into(), json!(selected.is_none()));
    context.insert("products".into(), json!(products));

    render("products", &Value::Object(context))
}

/// Serve one product; a bad id or any backend failure renders the not-found page
pub async fn product_detail(
    req: HttpRequest,
    path: web::Path<String>,
    data: web::Data<AppState>,
) -> impl Responder {
    let lang = request_language(&req, &data);
    let id = match path.parse::<i64>() {
        Ok(id) => id,
        Err(_) => {
            info!("Malformed product id '{}'", path.as_str());
            return not_found_page(&data, lang);
        }
    };

    match data.backend.product(id, lang).await {
        Ok(product) => {
            let mut context = page_context(&data, lang, "product", &format!("/products/{}", id));
            context.insert("product".into(), product_view(&data, &product));
            render("product_detail", &Value::Object(context))
        }
        Err(e) => {
            if e.is_not_found() {
                info!("Product {} not found", id);
            } else {
                error!("Failed to load product {}: {}", id, e);
                data.metrics.record_fallback("product");
            }
            not_found_page(&data, lang)
        }
    }
}

/// Serve the contact page
pub async fn contact(req: HttpRequest, data: web::Data<AppState>) -> impl Responder {
    let lang = request_language(&req, &data);
    let context = page_context(&data, lang, "contact", "/contact");
    render("contact", &Value::Object(context))
}

/// Text sent to the sales WhatsApp number
pub fn whatsapp_message(form: &ContactForm) -> String {
    format!(
        "مرحباً، وصلتك رسالة جديدة من الموقع:\n\nالاسم: {}\nالبريد الإلكتروني: {}\nرقم الهاتف: {}\nالرسالة: {}",
        form.name.trim(),
        form.email.trim(),
        form.phone.trim(),
        form.message.trim(),
    )
}

/// `https://wa.me/<number>?text=<message>`
pub fn whatsapp_url(number: &str, message: &str) -> String {
    let base = format!("{}/{}", WHATSAPP_BASE, number);
    match reqwest::Url::parse_with_params(&base, &[("text", message)]) {
        Ok(url) => url.to_string(),
        Err(e) => {
            error!("Invalid WhatsApp number '{}': {}", number, e);
            WHATSAPP_BASE.to_string()
        }
    }
}

/// Hand the contact form over to WhatsApp
pub async fn contact_submit(form: web::Form<ContactForm>, data: web::Data<AppState>) -> impl Responder {
    let url = whatsapp_url(&data.config.whatsapp_number, &whatsapp_message(&form));
    info!("Contact form submitted, redirecting to WhatsApp");
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, url))
        .finish()
}

fn not_found_page(state: &AppState, lang: Language) -> HttpResponse {
    let context = page_context(state, lang, "not_found", "/");
    render_with_status(StatusCode::NOT_FOUND, "not_found", &Value::Object(context))
}

/// Serve the 404 page
pub async fn not_found(req: HttpRequest, data: web::Data<AppState>) -> impl Responder {
    let lang = request_language(&req, &data);
    not_found_page(&data, lang)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::client::MockSiteBackend;
    use crate::backend::error::BackendError;
    use crate::backend::models::{ProductImage, ProductListResponse, ProjectCard};
    use crate::web::handlers::test_support::{body_text, state_with};
    use actix_web::{test as actix_test, App};

    fn product(id: i64, section_id: i64, name: &str) -> Product {
        Product {
            id,
            name: name.to_string(),
            main_desc: None,
            sub_desc: None,
            price: 100.0,
            section_id,
            section_name: None,
            images: vec![ProductImage { id: 1, url: "uploads\\p.png".into(), product_id: id }],
        }
    }

    #[test]
    fn test_whatsapp_url_encodes_message() {
        let form = ContactForm {
            name: "Ali".into(),
            email: "ali@x.com".into(),
            phone: "0500".into(),
            message: "Need a quote & visit".into(),
        };
        let message = whatsapp_message(&form);
        assert!(message.contains("الاسم: Ali"));
        assert!(message.contains("الرسالة: Need a quote & visit"));

        let url = whatsapp_url("966568729639", &message);
        assert!(url.starts_with("https://wa.me/966568729639?text="));
        assert!(!url.contains(' '));
        assert!(url.contains("%26"));
    }

    #[actix_web::test]
    async fn test_products_page_filters_by_section() {
        let mut backend = MockSiteBackend::new();
        backend.expect_sections().returning(|_| {
            Ok(vec![
                Section { id: 1, name: "Panels".into(), translations: None },
                Section { id: 2, name: "Batteries".into(), translations: None },
            ])
        });
        backend.expect_products().returning(|query| {
            assert_eq!(query.page_size, Some(100));
            Ok(ProductListResponse {
                items: vec![product(10, 1, "Mono 550W"), product(11, 2, "Lithium 10kWh")],
                ..Default::default()
            })
        });
        let state = state_with(backend);
        let app = actix_test::init_service(
            App::new().app_data(state).route("/products", web::get().to(products)),
        )
        .await;

        let req = actix_test::TestRequest::get().uri("/products?section=2").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let body = body_text(resp).await;
        assert!(body.contains("Lithium 10kWh"));
        assert!(!body.contains("Mono 550W"));
        assert!(body.contains("http://backend.test/uploads/p.png"));
        assert!(!body.contains("offers-banner"));
    }

    // A dead backend still renders the catalog, just empty
    #[actix_web::test]
    async fn test_products_page_survives_backend_failure() {
        let mut backend = MockSiteBackend::new();
        backend
            .expect_sections()
            .returning(|_| Err(BackendError::Connection("refused".into())));
        backend
            .expect_products()
            .returning(|_| Err(BackendError::Connection("refused".into())));
        let state = state_with(backend);
        let metrics = state.metrics.clone();
        let app = actix_test::init_service(
            App::new().app_data(state).route("/products", web::get().to(products)),
        )
        .await;

        let resp = actix_test::call_service(&app, actix_test::TestRequest::get().uri("/products").to_request()).await;
        assert_eq!(resp.status(), 200);
        assert!(body_text(resp).await.contains("No products found"));
        assert!(metrics.render().unwrap().contains("afkar_page_fallbacks_total{page=\"products\"} 2"));
    }

    #[actix_web::test]
    async fn test_missing_product_renders_not_found() {
        let mut backend = MockSiteBackend::new();
        backend
            .expect_product()
            .returning(|_, _| Err(BackendError::Api { status: 404, message: "API Error: 404".into() }));
        let app = actix_test::init_service(
            App::new()
                .app_data(state_with(backend))
                .route("/products/{id}", web::get().to(product_detail)),
        )
        .await;

        let req = actix_test::TestRequest::get().uri("/products/99?lang=ar").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
        assert!(body_text(resp).await.contains("الصفحة غير موجودة"));
    }

    #[actix_web::test]
    async fn test_product_detail_hides_banner() {
        let mut backend = MockSiteBackend::new();
        backend
            .expect_product()
            .withf(|id, _| *id == 10)
            .returning(|id, _| Ok(product(id, 1, "Mono 550W")));
        let app = actix_test::init_service(
            App::new()
                .app_data(state_with(backend))
                .route("/products/{id}", web::get().to(product_detail)),
        )
        .await;

        let resp = actix_test::call_service(&app, actix_test::TestRequest::get().uri("/products/10").to_request()).await;
        assert_eq!(resp.status(), 200);
        let body = body_text(resp).await;
        assert!(body.contains("Mono 550W"));
        assert!(!body.contains("offers-banner"));
    }

    // Garbage in the URL gets the translated 404 page, not an extractor error
    #[actix_web::test]
    async fn test_malformed_ids_are_handled() {
        let mut backend = MockSiteBackend::new();
        backend
            .expect_sections()
            .returning(|_| Ok(vec![Section { id: 1, name: "Panels".into(), translations: None }]));
        backend.expect_products().returning(|_| {
            Ok(ProductListResponse { items: vec![product(10, 1, "Mono 550W")], ..Default::default() })
        });
        let app = actix_test::init_service(
            App::new()
                .app_data(state_with(backend))
                .route("/products", web::get().to(products))
                .route("/products/{id}", web::get().to(product_detail)),
        )
        .await;

        let req = actix_test::TestRequest::get().uri("/products/abc?lang=ar").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
        assert!(body_text(resp).await.contains("الصفحة غير موجودة"));

        let req = actix_test::TestRequest::get().uri("/products?section=x").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        assert!(body_text(resp).await.contains("Mono 550W"));
    }

    #[actix_web::test]
    async fn test_home_page_shows_projects_in_language() {
        let mut backend = MockSiteBackend::new();
        backend
            .expect_projects()
            .withf(|lang| *lang == Language::Ar)
            .returning(|_| {
                Ok(vec![ProjectCard {
                    id: 1,
                    title: "مزرعة الخرج".into(),
                    location: "الخرج".into(),
                    image_relative_path: None,
                }])
            });
        let app = actix_test::init_service(
            App::new().app_data(state_with(backend)).route("/", web::get().to(home)),
        )
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/")
            .cookie(actix_web::cookie::Cookie::new("language", "ar"))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let body = body_text(resp).await;
        assert!(body.contains("dir=\"rtl\""));
        assert!(body.contains("مزرعة الخرج"));
        assert!(body.contains("/static/images/placeholder.svg"));
        assert!(body.contains("application/ld+json"));
    }

    #[actix_web::test]
    async fn test_contact_submit_redirects_to_whatsapp() {
        let app = actix_test::init_service(
            App::new()
                .app_data(state_with(MockSiteBackend::new()))
                .route("/contact", web::post().to(contact_submit)),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/contact")
            .set_form([("name", "Ali"), ("email", "a@x.com"), ("phone", "1"), ("message", "Hi")])
            .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), 303);
        let location = resp.headers().get(header::LOCATION).unwrap().to_str().unwrap();
        assert!(location.starts_with("https://wa.me/966568729639?text="));
    }
}
