//! Shared types, errors, and configuration for Harambee.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - JWT claims and token service
//! - Application-wide error types
//! - Configuration management

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::Claims;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
