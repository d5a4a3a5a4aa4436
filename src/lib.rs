// Crate root library declaration and module exports.
pub mod cache;
pub mod cli;
pub mod client;
pub mod config;
pub mod context;
pub mod controller;
pub mod engine;
pub mod model;
pub mod storage;
