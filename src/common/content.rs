//! Static marketing copy (stats, services, testimonials, contact details).
//!
//! The copy lives in a JSON file next to the binary so it can be edited
//! without a rebuild. A copy is embedded at compile time as a fallback.

use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::common::errors::SiteError;
use crate::common::i18n::Language;

const EMBEDDED_CONTENT: &str = include_str!("../../content/static-content.json");

/// A string available in both site languages
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Localized {
    pub en: String,
    pub ar: String,
}

impl Localized {
    pub fn get(&self, lang: Language) -> &str {
        match lang {
            Language::En => &self.en,
            Language::Ar => &self.ar,
        }
    }
}

/// Headline number on the home page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stat {
    pub value: String,
    pub label: Localized,
}

/// Service card on the home page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub icon: String,
    pub title: Localized,
    pub description: Localized,
}

/// Customer quote on the home page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Testimonial {
    pub name: Localized,
    pub role: Localized,
    pub quote: Localized,
}

/// Phone/email pair for a contact channel
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactChannel {
    pub email: String,
    pub phone: String,
}

/// Contact details shown on the contact page and footer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactInfo {
    pub sales: ContactChannel,
    pub support: ContactChannel,
    pub address: Localized,
}

/// All static copy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticContent {
    #[serde(default)]
    pub stats: Vec<Stat>,
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default)]
    pub testimonials: Vec<Testimonial>,
    #[serde(default)]
    pub contact: ContactInfo,
}

impl StaticContent {
    /// Parse content from a JSON string
    pub fn from_json(raw: &str) -> Result<Self, SiteError> {
        serde_json::from_str(raw)
            .map_err(|e| SiteError::Configuration(format!("Invalid static content: {}", e)))
    }

    /// Content compiled into the binary
    pub fn embedded() -> Result<Self, SiteError> {
        Self::from_json(EMBEDDED_CONTENT)
    }

    /// Load content from disk, falling back to the embedded copy when the file is missing
    pub fn load(path: &Path) -> Result<Self, SiteError> {
        match std::fs::read_to_string(path) {
            Ok(raw) => {
                info!("Loaded static content from {}", path.display());
                Self::from_json(&raw)
            }
            Err(e) => {
                warn!(
                    "Static content file {} not readable ({}), using embedded copy",
                    path.display(),
                    e
                );
                Self::embedded()
            }
        }
    }

    /// Copy flattened to one language for templates
    pub fn localized(&self, lang: Language) -> Value {
        json!({
            "stats": self.stats.iter().map(|s| json!({
                "value": s.value,
                "label": s.label.get(lang),
            })).collect::<Vec<_>>(),
            "services": self.services.iter().map(|s| json!({
                "icon": s.icon,
                "title": s.title.get(lang),
                "description": s.description.get(lang),
            })).collect::<Vec<_>>(),
            "testimonials": self.testimonials.iter().map(|t| json!({
                "name": t.name.get(lang),
                "role": t.role.get(lang),
                "quote": t.quote.get(lang),
            })).collect::<Vec<_>>(),
            "contact": {
                "sales": self.contact.sales,
                "support": self.contact.support,
                "address": self.contact.address.get(lang),
            },
        })
    }
}
