//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod access;
pub mod index;
pub mod list;
pub mod publish;
pub mod reload;
pub mod retract;
pub mod show;
pub mod validate;
