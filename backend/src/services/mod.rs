//! Module for core business logic services.
//!
//! This module encapsulates the multi-step write operations (catalog edits
//! and image uploads) that the API handlers delegate to.

pub mod catalog;
pub mod media;
