//! Module for everything related to spawning and supervising the extractor process

pub mod multiplatform;
pub mod process;

pub use process::{
	ProcessEvent,
	ProcessRunner,
	SpawnErrorKind,
	StreamKind,
};
