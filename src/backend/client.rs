//! HTTP client for the backend REST API.
//!
//! Every call goes out with `Accept: application/json` and the
//! `ngrok-skip-browser-warning` header; admin calls add a Bearer token.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::backend::error::BackendError;
use crate::backend::models::*;
use crate::common::i18n::Language;
use crate::config::{join_url, SiteConfig};

/// Header that keeps ngrok tunnels from answering with an HTML interstitial
pub const NGROK_SKIP_HEADER: &str = "ngrok-skip-browser-warning";

/// Operations the site needs from the backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SiteBackend: Send + Sync {
    /// Exchange credentials for an admin token
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, BackendError>;

    async fn sections(&self, lang: Language) -> Result<Vec<Section>, BackendError>;
    async fn section(&self, id: i64, lang: Language) -> Result<Section, BackendError>;
    async fn create_section(&self, payload: &SectionPayload, token: &str) -> Result<(), BackendError>;
    async fn update_section(&self, payload: &SectionPayload, token: &str) -> Result<(), BackendError>;
    async fn delete_section(&self, id: i64, token: &str) -> Result<(), BackendError>;

    async fn products(&self, query: &ProductQuery) -> Result<ProductListResponse, BackendError>;
    async fn product(&self, id: i64, lang: Language) -> Result<Product, BackendError>;
    async fn product_full(&self, id: i64, token: &str) -> Result<ProductFull, BackendError>;
    async fn create_product(&self, form: ProductForm, token: &str) -> Result<(), BackendError>;
    async fn update_product(&self, form: ProductForm, token: &str) -> Result<(), BackendError>;
    async fn delete_product(&self, id: i64, token: &str) -> Result<(), BackendError>;
    async fn delete_product_image(&self, image_id: i64, token: &str) -> Result<(), BackendError>;
    async fn add_product_translation(
        &self,
        product_id: i64,
        dto: &ProductTranslationDto,
        token: &str,
    ) -> Result<ProductTranslation, BackendError>;
    async fn update_product_translation(
        &self,
        dto: &ProductTranslationDto,
        token: &str,
    ) -> Result<ProductTranslation, BackendError>;

    async fn projects(&self, lang: Language) -> Result<Vec<ProjectCard>, BackendError>;
    async fn project_full(&self, id: i64, token: &str) -> Result<ProjectCardFull, BackendError>;
    async fn create_project(&self, form: ProjectForm, token: &str) -> Result<(), BackendError>;
    async fn update_project(&self, form: ProjectForm, token: &str) -> Result<(), BackendError>;
    async fn delete_project(&self, id: i64, token: &str) -> Result<(), BackendError>;

    async fn customers(&self, lang: Language) -> Result<Vec<Customer>, BackendError>;
    async fn create_customer(&self, payload: &CustomerPayload, token: &str) -> Result<(), BackendError>;
    async fn update_customer(&self, payload: &CustomerPayload, token: &str) -> Result<(), BackendError>;
    async fn delete_customer(&self, id: i64, token: &str) -> Result<(), BackendError>;

    async fn feedbacks(&self, lang: Language) -> Result<Vec<CustomerFeedback>, BackendError>;
    async fn create_feedback(&self, payload: &FeedbackPayload, token: &str) -> Result<(), BackendError>;
    async fn update_feedback(&self, payload: &FeedbackPayload, token: &str) -> Result<(), BackendError>;
    async fn delete_feedback(&self, id: i64, token: &str) -> Result<(), BackendError>;

    async fn admins(&self, token: &str) -> Result<Vec<Admin>, BackendError>;
    async fn register_admin(&self, dto: &CreateAdminDto, token: &str) -> Result<(), BackendError>;
    async fn update_admin_role(&self, dto: &UpdateAdminRoleDto, token: &str) -> Result<(), BackendError>;
    async fn delete_admin(&self, id: i64, token: &str) -> Result<(), BackendError>;
}

/// reqwest-based implementation of [`SiteBackend`]
#[derive(Debug, Clone)]
pub struct BackendClient {
    /// Shared connection pool, also used by the proxy route
    http: reqwest::Client,
    /// Backend origin without trailing slash
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &SiteConfig) -> Result<Self, BackendError> {
        Self::new(&config.backend_url, config.backend_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Start a request with the headers every backend call carries; an empty token is omitted
    fn request(&self, method: Method, endpoint: &str, token: Option<&str>) -> RequestBuilder {
        let url = join_url(&self.base_url, endpoint);
        debug!("Backend {} {}", method, url);

        let builder = self
            .http
            .request(method, url)
            .header(ACCEPT, "application/json")
            .header(NGROK_SKIP_HEADER, "true");

        match token.filter(|t| !t.is_empty()) {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and return the body of a successful response
    async fn send(&self, builder: RequestBuilder) -> Result<String, BackendError> {
        let response = builder.send().await.map_err(|e| {
            error!("Backend request failed: {}", e);
            BackendError::from(e)
        })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let err = BackendError::from_response(status.as_u16(), &body);
            error!("Backend returned {}: {}", status, err);
            return Err(err);
        }

        Ok(body)
    }

    async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, BackendError> {
        let body = self.send(builder).await?;
        decode_body(&body)
    }

    /// Fetch a list; an empty or `null` body counts as no items
    async fn fetch_list<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<Vec<T>, BackendError> {
        let items: Option<Vec<T>> = self.fetch(builder).await?;
        Ok(items.unwrap_or_default())
    }

    /// Send a write whose response body is not needed
    async fn execute(&self, builder: RequestBuilder) -> Result<(), BackendError> {
        self.send(builder).await.map(|_| ())
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        body: &B,
        token: &str,
    ) -> Result<(), BackendError> {
        self.execute(self.request(method, endpoint, Some(token)).json(body)).await
    }

    async fn delete(&self, endpoint: &str, token: &str) -> Result<(), BackendError> {
        self.execute(self.request(Method::DELETE, endpoint, Some(token))).await
    }
}

/// Decode a JSON body; an empty body is read as `null`
pub fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, BackendError> {
    if body.trim().is_empty() {
        return Ok(serde_json::from_value(serde_json::Value::Null)?);
    }
    Ok(serde_json::from_str(body)?)
}

fn file_part(file: UploadedFile) -> Result<Part, BackendError> {
    Part::bytes(file.bytes)
        .file_name(file.file_name)
        .mime_str(&file.content_type)
        .map_err(BackendError::from)
}

/// Multipart body for product create/update
pub fn product_multipart(form: ProductForm) -> Result<Form, BackendError> {
    let mut body = Form::new()
        .text("TranslationsJson", serde_json::to_string(&form.translations)?)
        .text("Price", form.price.to_string())
        .text("SectionId", form.section_id.to_string());

    if let Some(id) = form.id {
        body = body.text("Id", id.to_string());
    }
    for file in form.files {
        body = body.part("files", file_part(file)?);
    }
    Ok(body)
}

/// Multipart body for project card create/update
pub fn project_multipart(form: ProjectForm) -> Result<Form, BackendError> {
    let mut body = Form::new();
    if let Some(id) = form.id {
        body = body.text("Id", id.to_string());
    }
    body = body.text("TranslationsJson", serde_json::to_string(&form.translations)?);
    if let Some(file) = form.file {
        body = body.part("file", file_part(file)?);
    }
    Ok(body.text("ImageRelativePath", form.image_relative_path))
}

#[async_trait]
impl SiteBackend for BackendClient {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, BackendError> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response: Option<LoginResponse> = self
            .fetch(self.request(Method::POST, "/api/Account/login", None).json(&body))
            .await?;
        Ok(response.unwrap_or_default())
    }

    async fn sections(&self, lang: Language) -> Result<Vec<Section>, BackendError> {
        self.fetch_list(self.request(Method::GET, "/api/Section", None).query(&[("lang", lang.code())]))
            .await
    }

    async fn section(&self, id: i64, lang: Language) -> Result<Section, BackendError> {
        self.fetch(
            self.request(Method::GET, &format!("/api/Section/{}", id), None)
                .query(&[("lang", lang.code())]),
        )
        .await
    }

    async fn create_section(&self, payload: &SectionPayload, token: &str) -> Result<(), BackendError> {
        self.send_json(Method::POST, "/api/Section", payload, token).await
    }

    async fn update_section(&self, payload: &SectionPayload, token: &str) -> Result<(), BackendError> {
        self.send_json(Method::PUT, "/api/Section", payload, token).await
    }

    async fn delete_section(&self, id: i64, token: &str) -> Result<(), BackendError> {
        self.delete(&format!("/api/Section/{}", id), token).await
    }

    async fn products(&self, query: &ProductQuery) -> Result<ProductListResponse, BackendError> {
        let response: Option<ProductListResponse> = self
            .fetch(self.request(Method::GET, "/api/Product", None).query(&query.to_pairs()))
            .await?;
        Ok(response.unwrap_or_default())
    }

    async fn product(&self, id: i64, lang: Language) -> Result<Product, BackendError> {
        self.fetch(
            self.request(Method::GET, &format!("/api/Product/{}", id), None)
                .query(&[("lang", lang.code())]),
        )
        .await
    }

    async fn product_full(&self, id: i64, token: &str) -> Result<ProductFull, BackendError> {
        self.fetch(self.request(Method::GET, &format!("/api/Product/full/{}", id), Some(token)))
            .await
    }

    async fn create_product(&self, form: ProductForm, token: &str) -> Result<(), BackendError> {
        let body = product_multipart(form)?;
        self.execute(self.request(Method::POST, "/api/Product", Some(token)).multipart(body))
            .await
    }

    async fn update_product(&self, form: ProductForm, token: &str) -> Result<(), BackendError> {
        let body = product_multipart(form)?;
        self.execute(self.request(Method::PUT, "/api/Product", Some(token)).multipart(body))
            .await
    }

    async fn delete_product(&self, id: i64, token: &str) -> Result<(), BackendError> {
        self.delete(&format!("/api/Product/{}", id), token).await
    }

    async fn delete_product_image(&self, image_id: i64, token: &str) -> Result<(), BackendError> {
        self.delete(&format!("/api/Product/DeleteImage/{}", image_id), token).await
    }

    async fn add_product_translation(
        &self,
        product_id: i64,
        dto: &ProductTranslationDto,
        token: &str,
    ) -> Result<ProductTranslation, BackendError> {
        self.fetch(
            self.request(
                Method::POST,
                &format!("/api/Product/{}/translation", product_id),
                Some(token),
            )
            .json(dto),
        )
        .await
    }

    async fn update_product_translation(
        &self,
        dto: &ProductTranslationDto,
        token: &str,
    ) -> Result<ProductTranslation, BackendError> {
        self.fetch(
            self.request(Method::PUT, "/api/Product/translation", Some(token))
                .json(dto),
        )
        .await
    }

    async fn projects(&self, lang: Language) -> Result<Vec<ProjectCard>, BackendError> {
        self.fetch_list(
            self.request(Method::GET, "/api/ProjectCard", None)
                .query(&[("lang", lang.code())]),
        )
        .await
    }

    async fn project_full(&self, id: i64, token: &str) -> Result<ProjectCardFull, BackendError> {
        self.fetch(self.request(Method::GET, &format!("/api/ProjectCard/full/{}", id), Some(token)))
            .await
    }

    async fn create_project(&self, form: ProjectForm, token: &str) -> Result<(), BackendError> {
        let body = project_multipart(form)?;
        self.execute(self.request(Method::POST, "/api/ProjectCard", Some(token)).multipart(body))
            .await
    }

    async fn update_project(&self, form: ProjectForm, token: &str) -> Result<(), BackendError> {
        let body = project_multipart(form)?;
        self.execute(self.request(Method::PUT, "/api/ProjectCard", Some(token)).multipart(body))
            .await
    }

    async fn delete_project(&self, id: i64, token: &str) -> Result<(), BackendError> {
        self.delete(&format!("/api/ProjectCard/{}", id), token).await
    }

    async fn customers(&self, lang: Language) -> Result<Vec<Customer>, BackendError> {
        self.fetch_list(
            self.request(Method::GET, "/api/Customer", None)
                .query(&[("lang", lang.code())]),
        )
        .await
    }

    async fn create_customer(&self, payload: &CustomerPayload, token: &str) -> Result<(), BackendError> {
        self.send_json(Method::POST, "/api/Customer", payload, token).await
    }

    async fn update_customer(&self, payload: &CustomerPayload, token: &str) -> Result<(), BackendError> {
        self.send_json(Method::PUT, "/api/Customer", payload, token).await
    }

    async fn delete_customer(&self, id: i64, token: &str) -> Result<(), BackendError> {
        self.delete(&format!("/api/Customer/{}", id), token).await
    }

    async fn feedbacks(&self, lang: Language) -> Result<Vec<CustomerFeedback>, BackendError> {
        self.fetch_list(
            self.request(Method::GET, "/api/CustomerFeedback", None)
                .query(&[("lang", lang.code())]),
        )
        .await
    }

    async fn create_feedback(&self, payload: &FeedbackPayload, token: &str) -> Result<(), BackendError> {
        self.send_json(Method::POST, "/api/CustomerFeedback", payload, token).await
    }

    async fn update_feedback(&self, payload: &FeedbackPayload, token: &str) -> Result<(), BackendError> {
        self.send_json(Method::PUT, "/api/CustomerFeedback", payload, token).await
    }

    async fn delete_feedback(&self, id: i64, token: &str) -> Result<(), BackendError> {
        self.delete(&format!("/api/CustomerFeedback/{}", id), token).await
    }

    async fn admins(&self, token: &str) -> Result<Vec<Admin>, BackendError> {
        self.fetch_list(self.request(Method::GET, "/api/Admin", Some(token))).await
    }

    async fn register_admin(&self, dto: &CreateAdminDto, token: &str) -> Result<(), BackendError> {
        self.send_json(Method::POST, "/api/Admin/Register", dto, token).await
    }

    async fn update_admin_role(&self, dto: &UpdateAdminRoleDto, token: &str) -> Result<(), BackendError> {
        self.send_json(Method::PUT, "/api/Admin/UpdateRole", dto, token).await
    }

    async fn delete_admin(&self, id: i64, token: &str) -> Result<(), BackendError> {
        self.delete(&format!("/api/Admin/{}", id), token).await
    }
}
