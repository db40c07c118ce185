//! Utility functions
//!
//! This module contains utility functions used throughout the crate.

pub mod coerce;
