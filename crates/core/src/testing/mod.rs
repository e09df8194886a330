//! Test doubles and HTML fixtures.
//!
//! `MockEngine` stands in for the browser engine with scripted pages, and
//! `fixtures` builds markup in the shapes the extraction rules understand.
//! Server integration tests drive the full stack through these.

pub mod fixtures;
mod mock_engine;

pub use mock_engine::MockEngine;
