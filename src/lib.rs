//! eventmap - Discover local events by city, category and date.
//!
//! The library holds the pure pieces (catalog, distance math, filter
//! pipeline, statistics, session state) plus the HTTP server and output
//! formatters built on them. The `eventmap` binary wires them to a CLI.

pub mod catalog;
pub mod cli;
pub mod errors;
pub mod filters;
pub mod geo;
pub mod models;
pub mod output;
pub mod server;
pub mod session;
pub mod stats;
