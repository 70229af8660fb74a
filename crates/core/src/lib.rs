//! Cafe WiFi Core - Shared types library.
//!
//! This crate provides common types used across all Cafe WiFi components:
//! - `server` - Public JSON API for cafes, users, and speed tests
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and emails, plus the small
//!   closed vocabularies of the domain (amenities, themes, speed metrics)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
