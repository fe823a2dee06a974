use thiserror::Error;

/// Structural problems found in a tree document before layout.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TreeError {
	#[error("member at {path} has an empty id")]
	EmptyId { path: String },
	#[error("member id `{0}` appears more than once")]
	DuplicateId(String),
}

/// Reasons the tree document could not be loaded.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LoadError {
	#[error("no browser window available")]
	NoWindow,
	#[error("network request failed: {0}")]
	Network(String),
	#[error("HTTP error! status: {0}")]
	Status(u16),
	#[error("invalid tree data: {0}")]
	Parse(String),
	#[error(transparent)]
	Invalid(#[from] TreeError),
}

impl From<serde_json::Error> for LoadError {
	fn from(err: serde_json::Error) -> Self {
		Self::Parse(err.to_string())
	}
}
