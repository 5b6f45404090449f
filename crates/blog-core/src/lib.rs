//! # Blog Core
//!
//! The domain layer of the blog.
//! This crate contains posts, users, form validation and the authorization
//! guard, with zero infrastructure dependencies.

pub mod authz;
pub mod domain;
pub mod error;
pub mod ports;
pub mod validation;

pub use error::DomainError;
