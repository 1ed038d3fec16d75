//! Test utilities shared by the unit tests.
//!
//! This module provides:
//! - Test data factories for roster rows, contacts and zipped CSV payloads
//! - In-memory implementations of the mailbox, contact and workspace ports
//! - A throwaway local HTTP server for exercising the reqwest adapters

mod factories;
mod http_server;
mod mocks;

pub use factories::*;
pub use http_server::*;
pub use mocks::*;
