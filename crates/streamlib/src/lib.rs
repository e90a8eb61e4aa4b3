//! Library implementing the Stream subsystem: process supervision, metadata
//! collection and download-progress synthesis on top of an external
//! youtube-dl/p-class extractor.

#![allow(clippy::needless_return)]
#![warn(clippy::implicit_return)]

#[macro_use]
extern crate log;

pub mod config;
pub mod data;
pub mod download;
pub mod error;
pub mod host_match;
pub mod maintenance;
pub mod metadata;
pub mod spawn;
pub mod utils;

pub use error::Error;
