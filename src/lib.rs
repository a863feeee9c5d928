// Library exports for Wardrobe
// The CLI binary and the integration tests both build on these modules

pub mod api;
pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod engagement;
pub mod error;
pub mod models;
pub mod render;
pub mod session;
pub mod store;
