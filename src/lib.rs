//! `macro-time-machine` library crate.
//!
//! The binary (`mtm`) is a thin wrapper around this library so that:
//!
//! - the normalization and slicing pipeline is testable without spawning processes
//! - a presentation layer (web UI, notebook, AI prompt builder) can call
//!   `slice::slice_indicator` directly and format the numeric results itself

pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod normalize;
pub mod registry;
pub mod report;
pub mod slice;
