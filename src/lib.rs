//! istock: dental implant clinic stock tracker
//!
//! Keeps one CSV file per product category and condenses the raw batches
//! into one row per product variant, flagged when low or expiring soon.

pub mod categories;
pub mod cli;
pub mod core;
