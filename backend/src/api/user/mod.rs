//! Module for user profile and management API endpoints.
//!
//! This module handles functionalities related to user information that is
//! distinct from the core authentication process, such as reading and editing
//! the profile or uploading a profile picture.

pub mod handlers;
pub mod routes;
