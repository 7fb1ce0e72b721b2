//! KidCal Tools module
//!
//! MCP tool implementations for the kidney function calculator.

pub mod calculator;
pub mod status;
