//! KidCal Library
//!
//! Unit conversion and eGFR calculation for a pediatric kidney function
//! calculator, plus the MCP server that exposes it.

pub mod build_info;
pub mod config;
pub mod egfr;
pub mod error;
pub mod mcp;
pub mod models;
pub mod tools;

pub use error::{KidcalError, KidcalResult};
