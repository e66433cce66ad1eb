use serde::{Deserialize, Serialize};

/// The signed-in operator, as returned by login and `GET /profile`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admin {
    #[serde(deserialize_with = "super::de_id")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
}

impl Admin {
    /// Name if set, email otherwise
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}
