//! Terminal task manager: tasks grouped by category, filtered by status and
//! search text, with an archive, backed by either a seeded in-memory store or
//! a hosted records service.

pub mod api;
pub mod app;
pub mod config;
pub mod controller;
pub mod error;
pub mod models;
pub mod parser;
pub mod store;
pub mod ui;
pub mod view;
