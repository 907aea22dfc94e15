// region:    --- Modules

mod applier;
mod cleanup;
mod diff;
mod error;
mod matcher;
mod patch;
mod textutil;

pub use applier::*;
pub use cleanup::*;
pub use diff::*;
pub use error::*;
pub use matcher::*;
pub use patch::*;
pub use textutil::*;

// endregion: --- Modules
