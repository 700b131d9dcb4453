// src/utils/mod.rs
//! Common utilities: configuration loading and the crate error type.

pub mod config;
pub mod errors;
