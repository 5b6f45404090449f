//! # Blog Shared
//!
//! Types shared between request handlers and page templates.

pub mod dto;
pub mod messages;

pub use messages::{Severity, StatusMessage, StatusMessages};
