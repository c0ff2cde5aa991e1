//! weatherdash library
//!
//! Exposes the dashboard building blocks for the binary and for integration tests.

pub mod app;
pub mod cli;
pub mod convert;
pub mod data;
pub mod font;
pub mod host;
pub mod logging;
pub mod refresh;
pub mod surface;
pub mod ui;
