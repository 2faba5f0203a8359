//! testledger: products, versioned modules, test cases, suites and runs
//!
//! All state lives in a [`Workspace`](core::Workspace). Persistence is an
//! explicit snapshot into a [`KeyValueStore`](storage::KeyValueStore).

pub mod cli;
pub mod core;
pub mod entities;
pub mod storage;
