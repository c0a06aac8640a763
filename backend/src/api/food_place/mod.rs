//! Module for the food place API.
//!
//! Shops that sell a catalogued food, searchable by the food's name.

pub mod handlers;
pub mod routes;
