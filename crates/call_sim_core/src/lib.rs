//! Synthetic call-record generation primitives.
//!
//! This crate owns the lead/record contract, configuration normalization,
//! weekday sampling and record generation. It intentionally excludes store
//! clients and Lambda runtime concerns; those live in `call_sim_lambda`.

pub mod config;
pub mod contract;
pub mod dates;
pub mod error;
pub mod generator;
pub mod payload;
pub mod rows;
