use thiserror::Error;

/// Input rejected before any database access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
	/// Field is empty when it shouldn't be
	#[error("{field} must contain at least 1 character(s)")]
	Empty { field: &'static str },

	/// Input does not match the declared shape
	#[error("invalid input: {reason}")]
	Malformed { reason: String },
}

impl ValidationError {
	pub(crate) fn require_non_empty(
		field: &'static str,
		value: &str,
	) -> Result<(), ValidationError> {
		if value.is_empty() {
			return Err(ValidationError::Empty { field });
		}
		Ok(())
	}
}

impl From<serde_json::Error> for ValidationError {
	fn from(err: serde_json::Error) -> Self {
		ValidationError::Malformed { reason: err.to_string() }
	}
}
