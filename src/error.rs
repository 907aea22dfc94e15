use derive_more::{Display, From};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Display, From)]
#[display("{self:?}")]
pub enum Error {
	#[display("{_0}")]
	#[from(String, &String, &str)]
	Custom(String),

	// -- Patch Make
	#[display("Invalid patch_make arguments: {reason}")]
	InvalidArguments { reason: String },

	// -- Patch Text
	#[display("Invalid patch line: '{line}'")]
	InvalidPatch { line: String },

	#[display("Illegal escape in patch line: '{fragment}'")]
	IllegalEscape { fragment: String },

	// -- Delta
	#[display("Invalid delta: {reason}")]
	InvalidDelta { reason: String },
}

// region:    --- Custom

impl Error {
	pub fn invalid_arguments(reason: impl Into<String>) -> Self {
		Self::InvalidArguments { reason: reason.into() }
	}

	pub fn invalid_patch(line: impl Into<String>) -> Self {
		Self::InvalidPatch { line: line.into() }
	}

	pub fn illegal_escape(fragment: impl Into<String>) -> Self {
		Self::IllegalEscape { fragment: fragment.into() }
	}

	pub fn invalid_delta(reason: impl Into<String>) -> Self {
		Self::InvalidDelta { reason: reason.into() }
	}
}

// endregion: --- Custom

// region:    --- Error Boilerplate

impl std::error::Error for Error {}

// endregion: --- Error Boilerplate
