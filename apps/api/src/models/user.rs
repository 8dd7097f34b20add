use serde::{Deserialize, Serialize};

use crate::models::category::Category;

/// The business user a matching request is made for.
///
/// `categories` behaves as an ordered set: insertion order drives candidate
/// order, duplicates are dropped on construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub categories: Vec<Category>,
    pub business_summary: String,
}

impl UserProfile {
    pub fn new(
        id: impl Into<String>,
        categories: impl IntoIterator<Item = Category>,
        business_summary: impl Into<String>,
    ) -> Self {
        let mut unique = Vec::new();
        for category in categories {
            if !unique.contains(&category) {
                unique.push(category);
            }
        }
        Self {
            id: id.into(),
            categories: unique,
            business_summary: business_summary.into(),
        }
    }

    /// Category names joined with ", " as shown to the model.
    pub fn category_list(&self) -> String {
        self.categories
            .iter()
            .map(|c| c.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
