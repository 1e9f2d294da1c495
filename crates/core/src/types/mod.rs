//! Core types for Vitryna.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod phone;
pub mod score;

pub use email::{Email, EmailError};
pub use id::{AccountId, OrderId};
pub use phone::{Phone, PhoneError};
pub use score::BonusScore;
