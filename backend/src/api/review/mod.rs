//! Module for user reviews of foods.

pub mod handlers;
pub mod routes;
