pub mod accounts;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod project;
pub mod rpc;
pub mod trace;
pub mod units;
