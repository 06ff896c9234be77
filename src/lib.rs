//! Core library for recording-renamer
pub mod config;
pub mod datetime;
pub mod error;
pub mod models;
pub mod rename;
pub mod table;
pub mod util;
