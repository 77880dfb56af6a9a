//! Configuration persistence, data paths, and the credits ledger.

pub mod config;
pub mod ledger;
pub mod paths;
