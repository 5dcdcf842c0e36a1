//! Data shapes exchanged with the backend REST API.
//!
//! Field names follow the backend's camelCase JSON. Payloads that the backend
//! binds from multipart forms are assembled in `client.rs` instead.

use serde::{Deserialize, Serialize};

use crate::common::i18n::Language;

/// Response of the login endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent admin calls
    #[serde(default)]
    pub token: Option<String>,
}

/// Credentials sent to the login endpoint
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Product section (category) in the requested language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translations: Option<Vec<SectionTranslation>>,
}

/// One language variant of a section name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionTranslation {
    pub id: i64,
    pub language_code: String,
    pub name: String,
    pub section_id: i64,
}

/// Create/update payload for a section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name_en: String,
    pub name_ar: String,
}

/// Image attached to a product.
///
/// Older backend builds send `relativePath` instead of `url`; both decode to `url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawProductImage", rename_all = "camelCase")]
pub struct ProductImage {
    pub id: i64,
    pub url: String,
    pub product_id: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProductImage {
    #[serde(default)]
    id: i64,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    relative_path: Option<String>,
    #[serde(default)]
    product_id: i64,
}

impl From<RawProductImage> for ProductImage {
    fn from(raw: RawProductImage) -> Self {
        ProductImage {
            id: raw.id,
            url: raw.url.or(raw.relative_path).unwrap_or_default(),
            product_id: raw.product_id,
        }
    }
}

/// Product in the requested language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub main_desc: Option<String>,
    #[serde(default)]
    pub sub_desc: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub section_id: i64,
    #[serde(default)]
    pub section_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub images: Vec<ProductImage>,
}

/// Product with every translation, used by the dashboard editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFull {
    pub id: i64,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub section_id: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub translations: Vec<ProductTranslation>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub images: Vec<ProductImage>,
}

impl ProductFull {
    /// Translation for a language, if the backend has one
    pub fn translation(&self, lang: Language) -> Option<&ProductTranslation> {
        self.translations
            .iter()
            .find(|t| t.language_code.eq_ignore_ascii_case(lang.code()))
    }
}

/// One language variant of a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductTranslation {
    #[serde(default)]
    pub id: i64,
    pub language_code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub main_desc: Option<String>,
    #[serde(default)]
    pub sub_desc: Option<String>,
    #[serde(default)]
    pub product_id: i64,
}

/// Translation payload for the product translation endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductTranslationDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub language_code: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<i64>,
}

/// Translation entry inside a product's `TranslationsJson` form field.
///
/// The backend binds this one with PascalCase names.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProductTranslationForm {
    pub id: i64,
    pub language_code: String,
    pub name: String,
    pub main_desc: String,
    pub sub_desc: String,
}

/// Page of products
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub items: Vec<Product>,
    #[serde(default)]
    pub total_count: i64,
    #[serde(default)]
    pub page_number: i64,
    #[serde(default)]
    pub page_size: i64,
    #[serde(default)]
    pub total_pages: i64,
}

/// Filters for the product listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductQuery {
    pub section_id: Option<i64>,
    pub page_number: Option<i64>,
    pub page_size: Option<i64>,
    pub lang: Option<Language>,
}

impl ProductQuery {
    /// Listing used by pages that show the whole catalog
    pub fn catalog(lang: Language) -> Self {
        ProductQuery {
            page_size: Some(100),
            lang: Some(lang),
            ..Default::default()
        }
    }

    /// Query-string pairs; unset or zero filters are omitted, `lang` is always sent
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(id) = self.section_id.filter(|v| *v != 0) {
            pairs.push(("sectionId", id.to_string()));
        }
        if let Some(page) = self.page_number.filter(|v| *v != 0) {
            pairs.push(("pageNumber", page.to_string()));
        }
        if let Some(size) = self.page_size.filter(|v| *v != 0) {
            pairs.push(("pageSize", size.to_string()));
        }
        pairs.push(("lang", self.lang.unwrap_or_default().code().to_string()));
        pairs
    }
}

/// Product create/update form sent as multipart
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    /// Set for updates
    pub id: Option<i64>,
    pub price: f64,
    pub section_id: i64,
    pub translations: Vec<ProductTranslationForm>,
    pub files: Vec<UploadedFile>,
}

/// Featured project card in the requested language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCard {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub image_relative_path: Option<String>,
}

/// Project card with every translation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCardFull {
    pub id: i64,
    #[serde(default)]
    pub image_relative_path: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub translations: Vec<ProjectTranslation>,
}

impl ProjectCardFull {
    pub fn translation(&self, lang: Language) -> Option<&ProjectTranslation> {
        self.translations
            .iter()
            .find(|t| t.language_code.eq_ignore_ascii_case(lang.code()))
    }
}

/// One language variant of a project card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectTranslation {
    pub language_code: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub location: String,
}

/// Project create/update form sent as multipart
#[derive(Debug, Clone, Default)]
pub struct ProjectForm {
    pub id: Option<i64>,
    pub translations: Vec<ProjectTranslation>,
    pub image_relative_path: String,
    pub file: Option<UploadedFile>,
}

/// File received from a dashboard form, forwarded to the backend as-is
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Customer in the requested language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: i64,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_job: Option<String>,
}

/// Create/update payload for a customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name_en: String,
    pub name_ar: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_en: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_ar: Option<String>,
}

/// Customer feedback (testimonial) in the requested language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerFeedback {
    pub id: i64,
    #[serde(default)]
    pub customer_id: i64,
    #[serde(default)]
    pub customer_name: Option<String>,
    /// The backend spells this field `feedBack`
    #[serde(default, rename = "feedBack")]
    pub feed_back: String,
}

/// Create/update payload for customer feedback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub customer_id: i64,
    pub feedback_en: String,
    pub feedback_ar: String,
}

/// Dashboard administrator account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    pub id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// Payload for registering a new administrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAdminDto {
    pub username: String,
    pub password: String,
}

/// Payload for changing an administrator's role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateAdminRoleDto {
    pub id: i64,
    pub role: String,
}

/// Treat an explicit JSON `null` list as empty
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // Images sent with `relativePath` decode into `url`
    #[test]
    fn test_image_relative_path_fallback() {
        let product: Product = serde_json::from_value(json!({
            "id": 7,
            "name": "Panel 550W",
            "price": 899.0,
            "sectionId": 2,
            "images": [
                {"id": 1, "url": "/uploads/a.jpg", "productId": 7},
                {"id": 2, "relativePath": "uploads\\b.jpg", "productId": 7},
                {"id": 3, "productId": 7}
            ]
        }))
        .unwrap();

        let urls: Vec<&str> = product.images.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(urls, vec!["/uploads/a.jpg", "uploads\\b.jpg", ""]);
    }

    // Missing or null image lists decode as empty
    #[test]
    fn test_missing_images() {
        let product: Product = serde_json::from_value(json!({"id": 1, "images": null})).unwrap();
        assert!(product.images.is_empty());

        let product: Product = serde_json::from_value(json!({"id": 1})).unwrap();
        assert!(product.images.is_empty());
    }

    // Only set filters reach the query string; lang defaults to en
    #[test]
    fn test_product_query_pairs() {
        let query = ProductQuery::default();
        assert_eq!(query.to_pairs(), vec![("lang", "en".to_string())]);

        let query = ProductQuery {
            section_id: Some(3),
            page_number: None,
            page_size: Some(100),
            lang: Some(Language::Ar),
        };
        assert_eq!(
            query.to_pairs(),
            vec![
                ("sectionId", "3".to_string()),
                ("pageSize", "100".to_string()),
                ("lang", "ar".to_string()),
            ]
        );
    }

    #[test]
    fn test_payloads_skip_missing_ids() {
        let payload = SectionPayload { id: None, name_en: "Panels".into(), name_ar: "ألواح".into() };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({"nameEn": "Panels", "nameAr": "ألواح"})
        );

        let payload = CustomerPayload {
            id: Some(4),
            name_en: "Sara".into(),
            name_ar: "سارة".into(),
            job_en: None,
            job_ar: Some("مهندسة".into()),
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({"id": 4, "nameEn": "Sara", "nameAr": "سارة", "jobAr": "مهندسة"})
        );
    }

    #[test]
    fn test_feedback_field_spelling() {
        let feedback: CustomerFeedback = serde_json::from_value(json!({
            "id": 9, "customerId": 4, "feedBack": "Great service"
        }))
        .unwrap();
        assert_eq!(feedback.feed_back, "Great service");
        assert_eq!(feedback.customer_name, None);
    }

    #[test]
    fn test_translation_form_uses_pascal_case() {
        let entry = ProductTranslationForm {
            id: 0,
            language_code: "en".into(),
            name: "Inverter".into(),
            main_desc: "5kW".into(),
            sub_desc: String::new(),
        };
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({"Id": 0, "LanguageCode": "en", "Name": "Inverter", "MainDesc": "5kW", "SubDesc": ""})
        );
    }

    #[test]
    fn test_full_product_translation_lookup() {
        let full: ProductFull = serde_json::from_value(json!({
            "id": 1,
            "price": 10.0,
            "sectionId": 2,
            "translations": [
                {"id": 11, "languageCode": "en", "name": "Battery", "productId": 1},
                {"id": 12, "languageCode": "AR", "name": "بطارية", "productId": 1}
            ]
        }))
        .unwrap();

        assert_eq!(full.translation(Language::En).map(|t| t.id), Some(11));
        assert_eq!(full.translation(Language::Ar).map(|t| t.name.as_str()), Some("بطارية"));
        assert!(full.images.is_empty());
    }
}
