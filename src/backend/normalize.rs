//! Helpers that shape backend data for display.

use std::collections::HashMap;

use crate::backend::models::{Customer, CustomerFeedback};

/// Image shown when an item has no picture
pub const PLACEHOLDER_IMAGE: &str = "/static/images/placeholder.svg";

/// Turn a backend image path into a URL the browser can load.
///
/// Absolute `http(s)` and `data:` URLs pass through. Relative paths get
/// forward slashes and a single leading `/`, then the backend origin.
pub fn image_url(backend_origin: &str, path: Option<&str>) -> String {
    let path = match path.map(str::trim).filter(|p| !p.is_empty()) {
        Some(p) => p,
        None => return PLACEHOLDER_IMAGE.to_string(),
    };

    if path.starts_with("http") || path.starts_with("data:") {
        return path.to_string();
    }

    let clean = path.replace('\\', "/");
    let clean = if clean.starts_with('/') {
        clean
    } else {
        format!("/{}", clean)
    };

    format!("{}{}", backend_origin.trim_end_matches('/'), clean)
}

/// Pair each English item with the Arabic item of the same id.
///
/// The English list decides membership and order; Arabic items with no
/// English counterpart are dropped.
pub fn merge_bilingual<T, F>(english: Vec<T>, arabic: Vec<T>, id_of: F) -> Vec<(T, Option<T>)>
where
    F: Fn(&T) -> i64,
{
    let mut arabic_by_id: HashMap<i64, T> = arabic.into_iter().map(|item| (id_of(&item), item)).collect();

    english
        .into_iter()
        .map(|en| {
            let ar = arabic_by_id.remove(&id_of(&en));
            (en, ar)
        })
        .collect()
}

/// Name to show for a feedback row: its own name, else the customer's, else `-`
pub fn feedback_customer_name(feedback: &CustomerFeedback, customers: &[Customer]) -> String {
    feedback
        .customer_name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .map(str::to_string)
        .or_else(|| {
            customers
                .iter()
                .find(|c| c.id == feedback.customer_id)
                .map(|c| c.customer_name.clone())
                .filter(|name| !name.trim().is_empty())
        })
        .unwrap_or_else(|| "-".to_string())
}
