pub mod content;
pub mod errors;
pub mod i18n;
pub mod metrics;
pub mod seo;
