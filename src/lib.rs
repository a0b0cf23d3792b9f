//! WeekPlan application layer: configuration, SQLite store and HTTP API
//! around the `weekplan-core` engine.

pub mod config;
pub mod db;
pub mod server;
