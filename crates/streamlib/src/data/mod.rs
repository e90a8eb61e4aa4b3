//! Module for the Stream subsystem's data model (`SPEC_FULL.md` §3)

pub mod format_id;
pub mod playlist_item;
pub mod stream_format;
pub mod stream_info;

pub use format_id::FormatId;
pub use playlist_item::PlaylistItem;
pub use stream_format::StreamFormat;
pub use stream_info::{
	StreamError,
	StreamInfo,
};
