use serde::Deserialize;

use crate::domain::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategory {
	pub name: String,
	#[serde(default)]
	pub description: Option<String>,
}

impl CreateCategory {
	pub fn validate(&self) -> Result<(), ValidationError> {
		ValidationError::require_non_empty("name", &self.name)
	}
}
