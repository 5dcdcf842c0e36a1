use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use chrono::{Datelike, Utc};
use handlebars::{Context, Handlebars, Helper, HelperResult, Output, RenderContext, RenderError};
use log::error;
use serde_json::{json, Map, Value};

use crate::common::errors::SiteError;
use crate::common::i18n::{t, Language};
use crate::common::seo;
use crate::web::server::AppState;

const TEMPLATE_DIR: &str = "./src/web/templates";

/// Shared handlebars instance
lazy_static::lazy_static! {
    pub static ref HBS: Arc<Handlebars<'static>> = {
        let mut hbs = Handlebars::new();
        hbs.register_helper("t", Box::new(translate_helper));
        hbs.register_helper("json", Box::new(json_helper));
        if let Err(e) = hbs.register_templates_directory(".hbs", TEMPLATE_DIR) {
            error!("Error registering Handlebars templates: {}", e);
        }
        Arc::new(hbs)
    };
}

/// `{{t "nav.home"}}`: dictionary lookup in the page language
fn translate_helper(
    h: &Helper,
    _: &Handlebars,
    ctx: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let key = h
        .param(0)
        .and_then(|p| p.value().as_str())
        .ok_or_else(|| RenderError::new("t: expected a translation key"))?;

    let lang = ctx
        .data()
        .get("lang")
        .and_then(|v| v.as_str())
        .and_then(Language::from_code)
        .unwrap_or_default();

    out.write(t(lang, key))?;
    Ok(())
}

/// `{{json value}}`: serialise a value for an inline `<script>` block
fn json_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let value = h
        .param(0)
        .map(|p| p.value())
        .ok_or_else(|| RenderError::new("json: expected a value"))?;

    let text = serde_json::to_string(value).map_err(|e| RenderError::new(e.to_string()))?;
    // Keep `</script>` inside strings from closing the block
    out.write(&text.replace("</", "<\\/"))?;
    Ok(())
}

/// Render a template as an HTML response
pub fn render(name: &str, context: &Value) -> HttpResponse {
    render_with_status(StatusCode::OK, name, context)
}

pub fn render_with_status(status: StatusCode, name: &str, context: &Value) -> HttpResponse {
    match HBS.render(name, context) {
        Ok(body) => HttpResponse::build(status)
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(e) => {
            error!("Template rendering error: {}", e);
            SiteError::from(e).error_response()
        }
    }
}

/// Values every public page needs: language, direction, footer contact and JSON-LD.
///
/// `page` names the active nav entry; `path` is the canonical path of the page.
pub fn page_context(state: &AppState, lang: Language, page: &str, path: &str) -> Map<String, Value> {
    let base_url = state.config.site_base_url.as_str();
    let content = state.content.localized(lang);
    let trail = seo::breadcrumbs(lang, base_url, page, path);

    let mut ctx = Map::new();
    ctx.insert("lang".into(), json!(lang.code()));
    ctx.insert("dir".into(), json!(lang.direction().as_str()));
    ctx.insert("other_lang".into(), json!(lang.other().code()));
    ctx.insert("page".into(), json!(page));
    ctx.insert("path".into(), json!(path));
    ctx.insert("show_banner".into(), json!(page != "products" && page != "product"));
    ctx.insert("site_base_url".into(), json!(base_url));
    ctx.insert("year".into(), json!(Utc::now().year()));
    ctx.insert("contact".into(), content["contact"].clone());
    ctx.insert(
        "structured_data".into(),
        json!(seo::structured_data(lang, base_url, &state.content.contact, &trail)),
    );
    ctx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_helper_uses_context_language() {
        let mut hbs = Handlebars::new();
        hbs.register_helper("t", Box::new(translate_helper));
        hbs.register_template_string("nav", "{{t \"nav.home\"}}|{{t \"missing.key\"}}")
            .unwrap();

        assert_eq!(hbs.render("nav", &json!({"lang": "ar"})).unwrap(), "الرئيسية|missing.key");
        assert_eq!(hbs.render("nav", &json!({})).unwrap(), "Home|missing.key");
    }

    #[test]
    fn test_json_helper_escapes_script_end() {
        let mut hbs = Handlebars::new();
        hbs.register_helper("json", Box::new(json_helper));
        hbs.register_template_string("ld", "{{json doc}}").unwrap();

        let out = hbs.render("ld", &json!({"doc": {"name": "</script>"}})).unwrap();
        assert_eq!(out, r#"{"name":"<\/script>"}"#);
    }

    // Every page template in the directory compiles and registers
    #[test]
    fn test_templates_directory_registers() {
        for name in ["home", "about", "products", "product_detail", "contact", "not_found", "login", "dashboard_home"] {
            assert!(HBS.get_template(name).is_some(), "missing template {}", name);
        }
    }

    #[actix_web::test]
    async fn test_render_failure_is_json_error() {
        let resp = render("no_such_template", &json!({}));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error_code"], "TEMPLATE_ERROR");
    }
}
