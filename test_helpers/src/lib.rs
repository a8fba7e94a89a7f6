//! Test helpers shared across crates.
//!
//! This crate provides a working-directory guard, fixture writers and a tiny
//! HTTP responder for exercising network backends without leaving the host.

pub mod cwd;
pub mod fixtures;
pub mod http;
