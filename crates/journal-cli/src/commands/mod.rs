//! Command handlers

pub mod config;
pub mod draft;
pub mod entry;
pub mod stats;
pub mod write;
