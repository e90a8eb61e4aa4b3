//! Module for the Error type this library uses

use crate::spawn::process::SpawnErrorKind;

/// Error type for the Stream subsystem, implements all Error types that could happen in this lib
#[derive(thiserror::Error, Debug)]
pub enum Error {
	/// Wrapper Variant for [`std::io::Error`]
	#[error("IoError: {0}")]
	IoError(#[from] std::io::Error),
	/// Wrapper Variant for [`std::string::FromUtf8Error`]
	#[error("FromStringUTF8Error: {0}")]
	FromStringUTF8Error(#[from] std::string::FromUtf8Error),
	/// Wrapper Variant for [`serde_json::Error`]
	#[error("SerdeJSONError: {0}")]
	SerdeJSONError(#[from] serde_json::Error),
	/// Variant for when a child process could not be spawned or crashed, classified per [`SpawnErrorKind`]
	#[error("SpawnError: {0:?}")]
	SpawnError(SpawnErrorKind),
	/// Variant for when a spawned command was not successfull
	#[error("CommandNotSuccessfull: {0}")]
	CommandNotSuccesfull(String),
	/// Variant for when the process exited abnormally (was killed by a signal, etc.)
	#[error("ProcessCrashed")]
	ProcessCrashed,
	/// Variant for when a job was cancelled before it could converge
	#[error("Cancelled")]
	Cancelled,
	/// Variant for when no regex captures have been found
	#[error("NoCapturesFound: {0}")]
	NoCapturesFound(String),
	/// Variant for Other messages
	#[error("Other: {0}")]
	Other(String),
}

impl Error {
	pub fn other<M>(msg: M) -> Self
	where
		M: Into<String>,
	{
		return Self::Other(msg.into());
	}
}

// this is custom, some errors like "std::io::Error" do not implement "PartialEq", but some inner type may do
impl PartialEq for Error {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::IoError(l0), Self::IoError(r0)) => return l0.kind() == r0.kind(),
			(Self::FromStringUTF8Error(l0), Self::FromStringUTF8Error(r0)) => return l0 == r0,
			(Self::SpawnError(l0), Self::SpawnError(r0)) => return l0 == r0,
			(Self::CommandNotSuccesfull(l0), Self::CommandNotSuccesfull(r0)) => return l0 == r0,
			(Self::NoCapturesFound(l0), Self::NoCapturesFound(r0)) => return l0 == r0,
			(Self::Other(l0), Self::Other(r0)) => return l0 == r0,
			(Self::ProcessCrashed, Self::ProcessCrashed) => return true,
			(Self::Cancelled, Self::Cancelled) => return true,
			// Always return "false" for a serde_json::Error, it does not implement PartialEq
			(Self::SerdeJSONError(_l0), Self::SerdeJSONError(_r0)) => return false,
			(_, _) => return false,
		}
	}
}
