//! Shared types, errors, and configuration for Tranche.
//!
//! This crate provides common types used across all other crates:
//! - Money in integer minor units
//! - Typed IDs for type-safe entity references
//! - Page limits for ledger listings
//! - Application-wide error types
//! - Configuration management
//! - Access-token verification

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::Claims;
pub use config::{AppConfig, LedgerConfig};
pub use error::{AppError, AppResult};
pub use jwt::{JwtError, JwtService};
