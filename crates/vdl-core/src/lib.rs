pub mod classify;
pub mod config;
pub mod control;
pub mod download;
pub mod error;
pub mod logging;
pub mod outcome;
pub mod progress;
pub mod request;
