use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp::lenient;
use crate::error::{ClientError, Result};
use crate::filter::Searchable;
use crate::types::Entity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(deserialize_with = "super::de_id")]
    pub id: String,
    #[serde(default)]
    pub category_name: String,
    #[serde(default)]
    pub category_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, with = "lenient")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of a category create request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryDraft {
    pub category_name: String,
    pub category_type: String,
    pub description: String,
}

impl CategoryDraft {
    pub fn validate(&self) -> Result<()> {
        if self.category_name.trim().is_empty() {
            return Err(ClientError::validation("category_name", "Category name is required"));
        }
        if self.category_type.trim().is_empty() {
            return Err(ClientError::validation("category_type", "Category type is required"));
        }
        if self.description.trim().is_empty() {
            return Err(ClientError::validation("description", "Description is required"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<&Category> for CategoryPatch {
    fn from(category: &Category) -> Self {
        Self {
            category_name: Some(category.category_name.clone()),
            category_type: category.category_type.clone(),
            description: category.description.clone(),
        }
    }
}

impl Entity for Category {
    type Patch = CategoryPatch;
    const RESOURCE: &'static str = "category";

    fn id(&self) -> &str {
        &self.id
    }

    fn apply_patch(&mut self, patch: &CategoryPatch) {
        if let Some(name) = &patch.category_name {
            self.category_name = name.clone();
        }
        if let Some(kind) = &patch.category_type {
            self.category_type = Some(kind.clone());
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
    }
}

impl Searchable for Category {
    const SEARCH_FIELDS: &'static [&'static str] = &["category_name", "category_type", "description"];

    fn search_values(&self) -> Vec<Option<&str>> {
        vec![
            Some(self.category_name.as_str()),
            self.category_type.as_deref(),
            self.description.as_deref(),
        ]
    }
}
