//! keebdb: a keyboard catalog served from a DynamoDB table.

pub mod app;
pub mod config;
pub mod handlers;
pub mod state;
pub mod storage;
