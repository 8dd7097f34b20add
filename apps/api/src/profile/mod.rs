//! Builds the `UserProfile` a matching request runs against.
//!
//! Sources, highest priority first: hints sent with the request, the stored
//! session, then keyword inference over the message itself.

pub mod handlers;
pub mod validation;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::category::Category;
use crate::models::user::UserProfile;
use crate::session::UserSession;

/// Inferred when a message names no known field.
pub const DEFAULT_CATEGORY: Category = Category::Technology;
/// Messages this short (in characters) are not taken as a business summary.
const MIN_SUMMARY_CHARS: usize = 10;

/// Optional profile hints sent by the chatbot alongside a message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionHints {
    #[serde(default)]
    pub category: Vec<String>,
    #[serde(default)]
    pub business_summary: String,
}

impl SessionHints {
    /// Known categories among the hinted names; unknown names are logged and dropped.
    pub fn categories(&self) -> Vec<Category> {
        self.category
            .iter()
            .filter_map(|name| {
                let category = Category::from_name(name);
                if category.is_none() {
                    warn!("Ignoring unknown category hint {name:?}");
                }
                category
            })
            .collect()
    }
}

/// Categories whose keywords occur in the message, in category order.
/// An empty message infers nothing; any other message falls back to
/// `DEFAULT_CATEGORY`.
pub fn infer_categories(message: &str) -> Vec<Category> {
    let message = message.trim();
    if message.is_empty() {
        return Vec::new();
    }
    let lower = message.to_lowercase();
    let found: Vec<Category> = Category::ALL
        .into_iter()
        .filter(|c| c.keywords().iter().any(|k| lower.contains(k)))
        .collect();
    if found.is_empty() {
        vec![DEFAULT_CATEGORY]
    } else {
        found
    }
}

/// The message itself, when it is long enough to describe a business.
pub fn infer_business_summary(message: &str) -> String {
    let message = message.trim();
    if message.chars().count() > MIN_SUMMARY_CHARS {
        message.to_string()
    } else {
        String::new()
    }
}

pub fn build_profile(
    user_id: &str,
    message: &str,
    hints: Option<&SessionHints>,
    stored: Option<&UserSession>,
) -> UserProfile {
    let hinted = hints.map(SessionHints::categories).unwrap_or_default();
    let categories = if !hinted.is_empty() {
        hinted
    } else if let Some(session) = stored.filter(|s| !s.categories.is_empty()) {
        session.categories.clone()
    } else {
        infer_categories(message)
    };

    let business_summary = hints
        .map(|h| h.business_summary.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| {
            stored
                .map(|s| s.business_summary.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| infer_business_summary(message));

    UserProfile::new(user_id, categories, business_summary)
}
