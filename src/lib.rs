//! MealTrack Library
//!
//! Core functionality for meal logging and nutrition statistics.

pub mod build_info;
pub mod db;
pub mod mcp;
pub mod models;
pub mod stats;
pub mod tools;
