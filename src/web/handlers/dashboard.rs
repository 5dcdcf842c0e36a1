use actix_multipart::Multipart;
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use log::{error, info, warn};
use serde_json::{json, Map, Value};

use crate::backend::error::BackendError;
use crate::backend::models::*;
use crate::backend::normalize::{feedback_customer_name, image_url, merge_bilingual};
use crate::common::i18n::{t, Language};
use crate::web::handlers::auth::{require_session, AdminSession};
use crate::web::handlers::language::request_language;
use crate::web::models::{AdminForm, CustomerForm, EditQuery, FeedbackForm, RoleForm, SectionForm};
use crate::web::multipart::MultipartForm;
use crate::web::server::AppState;
use crate::web::session::Flash;
use crate::web::templates::render;

/// What a dashboard write was trying to do
#[derive(Debug, Clone, Copy, PartialEq)]
enum Action {
    Save,
    Delete,
}

impl Action {
    fn success_key(self) -> &'static str {
        match self {
            Action::Save => "dashboard.saved",
            Action::Delete => "dashboard.deleted",
        }
    }

    fn failure_key(self) -> &'static str {
        match self {
            Action::Save => "dashboard.saveFailed",
            Action::Delete => "dashboard.deleteFailed",
        }
    }
}

fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location.to_string()))
        .finish()
}

/// Values every dashboard screen needs
fn dashboard_context(state: &AppState, session: &AdminSession, lang: Language, section: &str) -> Map<String, Value> {
    let mut ctx = Map::new();
    ctx.insert("lang".into(), json!(lang.code()));
    ctx.insert("dir".into(), json!(lang.direction().as_str()));
    ctx.insert("other_lang".into(), json!(lang.other().code()));
    ctx.insert("section".into(), json!(section));
    ctx.insert("flash".into(), json!(state.sessions.take_flash(&session.id)));
    ctx
}

/// Note a failed list load on the page instead of failing it
fn load_failed(ctx: &mut Map<String, Value>, lang: Language, what: &str, err: &BackendError) {
    error!("Failed to load {}: {}", what, err);
    ctx.insert("load_error".into(), json!(format!("{}: {}", t(lang, "dashboard.loadFailed"), err)));
}

/// Flash the outcome of a write and go back to the list
fn after_write(
    state: &AppState,
    session: &AdminSession,
    lang: Language,
    action: Action,
    result: Result<(), BackendError>,
    back: &str,
) -> HttpResponse {
    let flash = match result {
        Ok(()) => {
            info!("Dashboard {:?} succeeded ({})", action, back);
            Flash::success(t(lang, action.success_key()))
        }
        Err(e) => {
            error!("Dashboard {:?} failed ({}): {}", action, back, e);
            Flash::error(format!("{}: {}", t(lang, action.failure_key()), e))
        }
    };
    state.sessions.set_flash(&session.id, flash);
    see_other(back)
}

fn reject_form(state: &AppState, session: &AdminSession, message: String, back: &str) -> HttpResponse {
    warn!("Rejected dashboard form ({}): {}", back, message);
    state.sessions.set_flash(&session.id, Flash::error(message));
    see_other(back)
}

/// Blank optional text becomes `None`
fn optional(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

macro_rules! session_or_redirect {
    ($req:expr, $data:expr) => {
        match require_session(&$req, &$data) {
            Ok(session) => session,
            Err(redirect) => return redirect,
        }
    };
}

/// Serve the dashboard overview
pub async fn overview(req: HttpRequest, data: web::Data<AppState>) -> HttpResponse {
    let session = session_or_redirect!(req, data);
    let lang = request_language(&req, &data);

    let catalog = ProductQuery::catalog(lang);

    let (sections, products) = futures::join!(
        data.backend.sections(lang),
        data.backend.products(&catalog),
    );

    let mut ctx = dashboard_context(&data, &session, lang, "overview");
    match sections {
        Ok(sections) => {
            ctx.insert("section_count".into(), json!(sections.len()));
        }
        Err(e) => load_failed(&mut ctx, lang, "sections", &e),
    }
    match products {
        Ok(listing) => {
            let count = if listing.total_count > 0 { listing.total_count as usize } else { listing.items.len() };
            ctx.insert("product_count".into(), json!(count));
        }
        Err(e) => load_failed(&mut ctx, lang, "products", &e),
    }

    render("dashboard_home", &Value::Object(ctx))
}

// Sections

pub async fn sections_page(req: HttpRequest, query: web::Query<EditQuery>, data: web::Data<AppState>) -> HttpResponse {
    let session = session_or_redirect!(req, data);
    let lang = request_language(&req, &data);
    let mut ctx = dashboard_context(&data, &session, lang, "sections");

    let (en, ar) = futures::join!(data.backend.sections(Language::En), data.backend.sections(Language::Ar));
    match (en, ar) {
        (Ok(en), Ok(ar)) => {
            let rows: Vec<Value> = merge_bilingual(en, ar, |s| s.id)
                .into_iter()
                .map(|(en, ar)| json!({
                    "id": en.id,
                    "name_en": en.name,
                    "name_ar": ar.map(|a| a.name).unwrap_or_default(),
                }))
                .collect();
            ctx.insert("rows".into(), json!(rows));
        }
        (Err(e), _) | (_, Err(e)) => load_failed(&mut ctx, lang, "sections", &e),
    }

    if let Some(id) = query.edit {
        let (en, ar) = futures::join!(data.backend.section(id, Language::En), data.backend.section(id, Language::Ar));
        match (en, ar) {
            (Ok(en), Ok(ar)) => {
                ctx.insert("editing".into(), json!({"id": id, "name_en": en.name, "name_ar": ar.name}));
            }
            (Err(e), _) | (_, Err(e)) => load_failed(&mut ctx, lang, "section", &e),
        }
    }

    render("dashboard_sections", &Value::Object(ctx))
}

pub async fn save_section(req: HttpRequest, form: web::Form<SectionForm>, data: web::Data<AppState>) -> HttpResponse {
    let session = session_or_redirect!(req, data);
    let lang = request_language(&req, &data);
    let form = form.into_inner();

    let payload = SectionPayload {
        id: form.id,
        name_en: form.name_en.trim().to_string(),
        name_ar: form.name_ar.trim().to_string(),
    };
    let result = match payload.id {
        Some(_) => data.backend.update_section(&payload, &session.token).await,
        None => data.backend.create_section(&payload, &session.token).await,
    };
    after_write(&data, &session, lang, Action::Save, result, "/dashboard/sections")
}

pub async fn delete_section(req: HttpRequest, path: web::Path<i64>, data: web::Data<AppState>) -> HttpResponse {
    let session = session_or_redirect!(req, data);
    let lang = request_language(&req, &data);
    let result = data.backend.delete_section(path.into_inner(), &session.token).await;
    after_write(&data, &session, lang, Action::Delete, result, "/dashboard/sections")
}

// Products

/// Build the backend form from the submitted fields; the error is shown to the user
pub fn product_form(form: &mut MultipartForm) -> Result<ProductForm, String> {
    let price = form.number::<f64>("price")?.ok_or("price is required")?;
    let section_id = form.number::<i64>("section_id")?.filter(|id| *id > 0).ok_or("section is required")?;

    let mut translations = Vec::new();
    for lang in Language::ALL {
        let code = lang.code();
        translations.push(ProductTranslationForm {
            id: form.number::<i64>(&format!("translation_id_{}", code))?.unwrap_or(0),
            language_code: code.to_string(),
            name: form.text_or_empty(&format!("name_{}", code)),
            main_desc: form.text_or_empty(&format!("main_desc_{}", code)),
            sub_desc: form.text_or_empty(&format!("sub_desc_{}", code)),
        });
    }

    Ok(ProductForm {
        id: form.number("id")?,
        price,
        section_id,
        translations,
        files: form.take_files("files"),
    })
}

fn product_editor(full: &ProductFull, origin: &str) -> Value {
    let mut editing = json!({
        "id": full.id,
        "price": full.price,
        "section_id": full.section_id,
        "images": full.images.iter().map(|i| json!({
            "id": i.id,
            "url": image_url(origin, Some(i.url.as_str())),
        })).collect::<Vec<_>>(),
    });
    for lang in Language::ALL {
        let translation = full.translation(lang);
        editing[format!("translation_id_{}", lang.code())] = json!(translation.map(|t| t.id));
        editing[format!("name_{}", lang.code())] = json!(translation.map(|t| t.name.clone()));
        editing[format!("main_desc_{}", lang.code())] = json!(translation.and_then(|t| t.main_desc.clone()));
        editing[format!("sub_desc_{}", lang.code())] = json!(translation.and_then(|t| t.sub_desc.clone()));
    }
    editing
}

pub async fn products_page(req: HttpRequest, query: web::Query<EditQuery>, data: web::Data<AppState>) -> HttpResponse {
    let session = session_or_redirect!(req, data);
    let lang = request_language(&req, &data);
    let origin = data.config.backend_url.clone();
    let mut ctx = dashboard_context(&data, &session, lang, "products");

    let catalog = ProductQuery::catalog(lang);

    let (sections, listing) = futures::join!(
        data.backend.sections(lang),
        data.backend.products(&catalog),
    );

    let editing = match query.edit {
        Some(id) => match data.backend.product_full(id, &session.token).await {
            Ok(full) => Some(product_editor(&full, &origin)),
            Err(e) => {
                load_failed(&mut ctx, lang, "product", &e);
                None
            }
        },
        None => None,
    };
    let selected_section = editing.as_ref().and_then(|e| e["section_id"].as_i64());

    match sections {
        Ok(sections) => {
            let options: Vec<Value> = sections
                .iter()
                .map(|s| json!({"id": s.id, "name": s.name, "selected": selected_section == Some(s.id)}))
                .collect();
            ctx.insert("sections".into(), json!(options));
        }
        Err(e) => load_failed(&mut ctx, lang, "sections", &e),
    }
    match listing {
        Ok(listing) => {
            let rows: Vec<Value> = listing
                .items
                .iter()
                .map(|p| json!({
                    "id": p.id,
                    "name": p.name,
                    "price": format!("{:.2}", p.price),
                    "section_name": p.section_name,
                    "image": image_url(&origin, p.images.first().map(|i| i.url.as_str())),
                }))
                .collect();
            ctx.insert("rows".into(), json!(rows));
        }
        Err(e) => load_failed(&mut ctx, lang, "products", &e),
    }
    if let Some(editing) = editing {
        ctx.insert("editing".into(), editing);
    }

    render("dashboard_products", &Value::Object(ctx))
}

pub async fn save_product(req: HttpRequest, payload: Multipart, data: web::Data<AppState>) -> HttpResponse {
    let session = session_or_redirect!(req, data);
    let lang = request_language(&req, &data);
    let back = "/dashboard/products";

    let mut form = match MultipartForm::read(payload).await {
        Ok(form) => form,
        Err(e) => return reject_form(&data, &session, e.to_string(), back),
    };
    let product = match product_form(&mut form) {
        Ok(product) => product,
        Err(message) => {
            return reject_form(&data, &session, format!("{}: {}", t(lang, "dashboard.saveFailed"), message), back)
        }
    };

    let result = match product.id {
        Some(_) => data.backend.update_product(product, &session.token).await,
        None => data.backend.create_product(product, &session.token).await,
    };
    after_write(&data, &session, lang, Action::Save, result, back)
}

/// Save one language of a product through the translation endpoints
pub async fn save_product_translation(
    req: HttpRequest,
    path: web::Path<(i64, String)>,
    form: web::Form<std::collections::HashMap<String, String>>,
    data: web::Data<AppState>,
) -> HttpResponse {
    let session = session_or_redirect!(req, data);
    let lang = request_language(&req, &data);
    let (product_id, code) = path.into_inner();
    let back = format!("/dashboard/products?edit={}", product_id);

    let language = match Language::from_code(&code) {
        Some(language) => language,
        None => return reject_form(&data, &session, format!("unsupported language '{}'", code), &back),
    };
    let field = |name: &str| form.get(name).map(|v| v.trim().to_string()).unwrap_or_default();
    let translation_id = field("translation_id").parse::<i64>().ok().filter(|id| *id > 0);

    let dto = ProductTranslationDto {
        id: translation_id,
        language_code: language.code().to_string(),
        name: field("name"),
        main_desc: optional(&field("main_desc")),
        sub_desc: optional(&field("sub_desc")),
        product_id: Some(product_id),
    };
    let result = match translation_id {
        Some(_) => data.backend.update_product_translation(&dto, &session.token).await,
        None => data.backend.add_product_translation(product_id, &dto, &session.token).await,
    };
    after_write(&data, &session, lang, Action::Save, result.map(|_| ()), &back)
}

pub async fn delete_product(req: HttpRequest, path: web::Path<i64>, data: web::Data<AppState>) -> HttpResponse {
    let session = session_or_redirect!(req, data);
    let lang = request_language(&req, &data);
    let result = data.backend.delete_product(path.into_inner(), &session.token).await;
    after_write(&data, &session, lang, Action::Delete, result, "/dashboard/products")
}

pub async fn delete_product_image(
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
    data: web::Data<AppState>,
) -> HttpResponse {
    let session = session_or_redirect!(req, data);
    let lang = request_language(&req, &data);
    let (product_id, image_id) = path.into_inner();
    let result = data.backend.delete_product_image(image_id, &session.token).await;
    let back = format!("/dashboard/products?edit={}", product_id);
    after_write(&data, &session, lang, Action::Delete, result, &back)
}

// Projects

pub fn project_form(form: &mut MultipartForm) -> Result<ProjectForm, String> {
    let translations = Language::ALL
        .iter()
        .map(|lang| ProjectTranslation {
            language_code: lang.code().to_string(),
            title: form.text_or_empty(&format!("title_{}", lang.code())),
            location: form.text_or_empty(&format!("location_{}", lang.code())),
        })
        .collect();

    Ok(ProjectForm {
        id: form.number("id")?,
        translations,
        image_relative_path: form.text_or_empty("image_relative_path"),
        file: form.take_files("file").into_iter().next(),
    })
}

pub async fn projects_page(req: HttpRequest, query: web::Query<EditQuery>, data: web::Data<AppState>) -> HttpResponse {
    let session = session_or_redirect!(req, data);
    let lang = request_language(&req, &data);
    let origin = data.config.backend_url.clone();
    let mut ctx = dashboard_context(&data, &session, lang, "projects");

    match data.backend.projects(lang).await {
        Ok(projects) => {
            let rows: Vec<Value> = projects
                .iter()
                .map(|p| json!({
                    "id": p.id,
                    "title": p.title,
                    "location": p.location,
                    "image": image_url(&origin, p.image_relative_path.as_deref()),
                }))
                .collect();
            ctx.insert("rows".into(), json!(rows));
        }
        Err(e) => load_failed(&mut ctx, lang, "projects", &e),
    }

    if let Some(id) = query.edit {
        match data.backend.project_full(id, &session.token).await {
            Ok(full) => {
                let mut editing = json!({
                    "id": full.id,
                    "image_relative_path": full.image_relative_path,
                    "image": image_url(&origin, full.image_relative_path.as_deref()),
                });
                for language in Language::ALL {
                    let translation = full.translation(language);
                    editing[format!("title_{}", language.code())] = json!(translation.map(|t| t.title.clone()));
                    editing[format!("location_{}", language.code())] = json!(translation.map(|t| t.location.clone()));
                }
                ctx.insert("editing".into(), editing);
            }
            Err(e) => load_failed(&mut ctx, lang, "project", &e),
        }
    }

    render("dashboard_projects", &Value::Object(ctx))
}

pub async fn save_project(req: HttpRequest, payload: Multipart, data: web::Data<AppState>) -> HttpResponse {
    let session = session_or_redirect!(req, data);
    let lang = request_language(&req, &data);
    let back = "/dashboard/projects";

    let mut form = match MultipartForm::read(payload).await {
        Ok(form) => form,
        Err(e) => return reject_form(&data, &session, e.to_string(), back),
    };
    let project = match project_form(&mut form) {
        Ok(project) => project,
        Err(message) => {
            return reject_form(&data, &session, format!("{}: {}", t(lang, "dashboard.saveFailed"), message), back)
        }
    };

    let result = match project.id {
        Some(_) => data.backend.update_project(project, &session.token).await,
        None => data.backend.create_project(project, &session.token).await,
    };
    after_write(&data, &session, lang, Action::Save, result, back)
}

pub async fn delete_project(req: HttpRequest, path: web::Path<i64>, data: web::Data<AppState>) -> HttpResponse {
    let session = session_or_redirect!(req, data);
    let lang = request_language(&req, &data);
    let result = data.backend.delete_project(path.into_inner(), &session.token).await;
    after_write(&data, &session, lang, Action::Delete, result, "/dashboard/projects")
}

// Customers

fn customer_rows(en: Vec<Customer>, ar: Vec<Customer>) -> Vec<Value> {
    merge_bilingual(en, ar, |c| c.id)
        .into_iter()
        .map(|(en, ar)| {
            let ar = ar.unwrap_or_else(|| Customer { id: en.id, customer_name: String::new(), customer_job: None });
            json!({
                "id": en.id,
                "name_en": en.customer_name,
                "name_ar": ar.customer_name,
                "job_en": en.customer_job.unwrap_or_default(),
                "job_ar": ar.customer_job.unwrap_or_default(),
            })
        })
        .collect()
}

pub async fn customers_page(req: HttpRequest, query: web::Query<EditQuery>, data: web::Data<AppState>) -> HttpResponse {
    let session = session_or_redirect!(req, data);
    let lang = request_language(&req, &data);
    let mut ctx = dashboard_context(&data, &session, lang, "customers");

    let (en, ar) = futures::join!(data.backend.customers(Language::En), data.backend.customers(Language::Ar));
    match (en, ar) {
        (Ok(en), Ok(ar)) => {
            let rows = customer_rows(en, ar);
            if let Some(id) = query.edit {
                if let Some(row) = rows.iter().find(|r| r["id"].as_i64() == Some(id)) {
                    ctx.insert("editing".into(), row.clone());
                }
            }
            ctx.insert("rows".into(), json!(rows));
        }
        (Err(e), _) | (_, Err(e)) => load_failed(&mut ctx, lang, "customers", &e),
    }

    render("dashboard_customers", &Value::Object(ctx))
}

pub async fn save_customer(req: HttpRequest, form: web::Form<CustomerForm>, data: web::Data<AppState>) -> HttpResponse {
    let session = session_or_redirect!(req, data);
    let lang = request_language(&req, &data);
    let form = form.into_inner();

    let payload = CustomerPayload {
        id: form.id,
        name_en: form.name_en.trim().to_string(),
        name_ar: form.name_ar.trim().to_string(),
        job_en: optional(&form.job_en),
        job_ar: optional(&form.job_ar),
    };
    let result = match payload.id {
        Some(_) => data.backend.update_customer(&payload, &session.token).await,
        None => data.backend.create_customer(&payload, &session.token).await,
    };
    after_write(&data, &session, lang, Action::Save, result, "/dashboard/customers")
}

pub async fn delete_customer(req: HttpRequest, path: web::Path<i64>, data: web::Data<AppState>) -> HttpResponse {
    let session = session_or_redirect!(req, data);
    let lang = request_language(&req, &data);
    let result = data.backend.delete_customer(path.into_inner(), &session.token).await;
    after_write(&data, &session, lang, Action::Delete, result, "/dashboard/customers")
}

// Customer feedback

fn feedback_rows(en: Vec<CustomerFeedback>, ar: Vec<CustomerFeedback>, customers: &[Customer]) -> Vec<Value> {
    merge_bilingual(en, ar, |f| f.id)
        .into_iter()
        .map(|(en, ar)| json!({
            "id": en.id,
            "customer_id": en.customer_id,
            "customer_name": feedback_customer_name(&en, customers),
            "feedback_en": en.feed_back,
            "feedback_ar": ar.map(|a| a.feed_back).unwrap_or_default(),
        }))
        .collect()
}

pub async fn feedback_page(req: HttpRequest, query: web::Query<EditQuery>, data: web::Data<AppState>) -> HttpResponse {
    let session = session_or_redirect!(req, data);
    let lang = request_language(&req, &data);
    let mut ctx = dashboard_context(&data, &session, lang, "feedback");

    let (en, ar, customers) = futures::join!(
        data.backend.feedbacks(Language::En),
        data.backend.feedbacks(Language::Ar),
        data.backend.customers(lang),
    );
    let customers = customers.unwrap_or_else(|e| {
        load_failed(&mut ctx, lang, "customers", &e);
        Vec::new()
    });

    match (en, ar) {
        (Ok(en), Ok(ar)) => {
            let rows = feedback_rows(en, ar, &customers);
            if let Some(id) = query.edit {
                if let Some(row) = rows.iter().find(|r| r["id"].as_i64() == Some(id)) {
                    ctx.insert("editing".into(), row.clone());
                }
            }
            ctx.insert("rows".into(), json!(rows));
        }
        (Err(e), _) | (_, Err(e)) => load_failed(&mut ctx, lang, "feedback", &e),
    }

    let selected = ctx
        .get("editing")
        .and_then(|e| e["customer_id"].as_i64());
    let options: Vec<Value> = customers
        .iter()
        .map(|c| json!({"id": c.id, "name": c.customer_name, "selected": selected == Some(c.id)}))
        .collect();
    ctx.insert("customers".into(), json!(options));

    render("dashboard_feedback", &Value::Object(ctx))
}

pub async fn save_feedback(req: HttpRequest, form: web::Form<FeedbackForm>, data: web::Data<AppState>) -> HttpResponse {
    let session = session_or_redirect!(req, data);
    let lang = request_language(&req, &data);
    let form = form.into_inner();
    let back = "/dashboard/feedback";

    if form.customer_id <= 0 {
        return reject_form(&data, &session, t(lang, "dashboard.customerRequired").to_string(), back);
    }

    let payload = FeedbackPayload {
        id: form.id,
        customer_id: form.customer_id,
        feedback_en: form.feedback_en.trim().to_string(),
        feedback_ar: form.feedback_ar.trim().to_string(),
    };
    let result = match payload.id {
        Some(_) => data.backend.update_feedback(&payload, &session.token).await,
        None => data.backend.create_feedback(&payload, &session.token).await,
    };
    after_write(&data, &session, lang, Action::Save, result, back)
}

pub async fn delete_feedback(req: HttpRequest, path: web::Path<i64>, data: web::Data<AppState>) -> HttpResponse {
    let session = session_or_redirect!(req, data);
    let lang = request_language(&req, &data);
    let result = data.backend.delete_feedback(path.into_inner(), &session.token).await;
    after_write(&data, &session, lang, Action::Delete, result, "/dashboard/feedback")
}

// Admins

pub async fn admins_page(req: HttpRequest, data: web::Data<AppState>) -> HttpResponse {
    let session = session_or_redirect!(req, data);
    let lang = request_language(&req, &data);
    let mut ctx = dashboard_context(&data, &session, lang, "admins");

    match data.backend.admins(&session.token).await {
        Ok(admins) => {
            ctx.insert("rows".into(), json!(admins));
        }
        Err(e) => load_failed(&mut ctx, lang, "admins", &e),
    }

    render("dashboard_admins", &Value::Object(ctx))
}

pub async fn register_admin(req: HttpRequest, form: web::Form<AdminForm>, data: web::Data<AppState>) -> HttpResponse {
    let session = session_or_redirect!(req, data);
    let lang = request_language(&req, &data);
    let dto = CreateAdminDto {
        username: form.username.trim().to_string(),
        password: form.password.clone(),
    };
    let result = data.backend.register_admin(&dto, &session.token).await;
    after_write(&data, &session, lang, Action::Save, result, "/dashboard/admins")
}

pub async fn update_admin_role(
    req: HttpRequest,
    path: web::Path<i64>,
    form: web::Form<RoleForm>,
    data: web::Data<AppState>,
) -> HttpResponse {
    let session = session_or_redirect!(req, data);
    let lang = request_language(&req, &data);
    let dto = UpdateAdminRoleDto {
        id: path.into_inner(),
        role: form.role.trim().to_string(),
    };
    let result = data.backend.update_admin_role(&dto, &session.token).await;
    after_write(&data, &session, lang, Action::Save, result, "/dashboard/admins")
}

pub async fn delete_admin(req: HttpRequest, path: web::Path<i64>, data: web::Data<AppState>) -> HttpResponse {
    let session = session_or_redirect!(req, data);
    let lang = request_language(&req, &data);
    let result = data.backend.delete_admin(path.into_inner(), &session.token).await;
    after_write(&data, &session, lang, Action::Delete, result, "/dashboard/admins")
}
