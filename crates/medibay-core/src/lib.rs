//! # medibay-core
//!
//! Core types shared across the medibay dispensing platform backend.
//!
//! This crate provides:
//! - The service error taxonomy used at every service boundary
//! - Surrogate-key newtypes with explicit "not yet synced" semantics
//!
//! ## Modules
//!
//! - [`error`] - Service error taxonomy and categories
//! - [`key`] - Surrogate key newtypes

pub mod error;
pub mod key;

pub use error::{ErrorCategory, ServiceError};
pub use key::{AccountKey, EventKey};

/// Type alias for results of platform service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
