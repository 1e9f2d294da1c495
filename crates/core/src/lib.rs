//! Vitryna Core - Shared types library.
//!
//! This crate provides the domain types used across the Vitryna backend:
//! - `accounts` - Account and loyalty-points engine
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no store access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe ids, emails, phone numbers
//!   and bonus scores

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
