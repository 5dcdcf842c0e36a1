use serde::{Deserialize, Serialize};

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub error_code: String,
}

/// `?lang=` override accepted by every page
#[derive(Debug, Default, Deserialize)]
pub struct LangQuery {
    pub lang: Option<String>,
}

/// Product listing filters; `section` stays raw so a bad value shows every product
#[derive(Debug, Default, Deserialize)]
pub struct ProductsQuery {
    pub section: Option<String>,
    pub lang: Option<String>,
}

/// Login page query
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
}

/// Dashboard edit pages: `?edit=<id>` opens the form prefilled
#[derive(Debug, Default, Deserialize)]
pub struct EditQuery {
    pub edit: Option<i64>,
}

/// Login form
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Contact form
#[derive(Debug, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

/// Section create/update form
#[derive(Debug, Deserialize)]
pub struct SectionForm {
    pub id: Option<i64>,
    pub name_en: String,
    pub name_ar: String,
}

/// Customer create/update form
#[derive(Debug, Deserialize)]
pub struct CustomerForm {
    pub id: Option<i64>,
    pub name_en: String,
    pub name_ar: String,
    #[serde(default)]
    pub job_en: String,
    #[serde(default)]
    pub job_ar: String,
}

/// Customer feedback create/update form
#[derive(Debug, Deserialize)]
pub struct FeedbackForm {
    pub id: Option<i64>,
    #[serde(default)]
    pub customer_id: i64,
    pub feedback_en: String,
    pub feedback_ar: String,
}

/// New administrator form
#[derive(Debug, Deserialize)]
pub struct AdminForm {
    pub username: String,
    pub password: String,
}

/// Administrator role change form
#[derive(Debug, Deserialize)]
pub struct RoleForm {
    pub role: String,
}
