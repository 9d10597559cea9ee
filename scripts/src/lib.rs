//! Scripts for deploying the L7 token contracts and recording their addresses.

#![deny(missing_docs)]

pub mod artifacts;
pub mod cli;
mod commands;
pub mod config_store;
pub mod constants;
pub mod deployer;
pub mod errors;
pub mod networks;
pub mod plan;
pub mod runner;
pub mod types;
pub mod utils;
