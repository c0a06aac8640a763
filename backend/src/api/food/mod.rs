//! Module for the food catalog API: foods and their images.

pub mod handlers;
pub mod routes;
