//! # Configuration Module
//!
//! This module provides the scan session configuration and its validation.

pub mod config;

pub use config::ScanConfig;
