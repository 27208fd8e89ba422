//! Library crate for ad-dashboard.
//!
//! This crate exposes the building blocks of the TUI:
//! - REST client and wire types for the directory backend (`api`)
//! - Application state, effects, and the update loop (`app`)
//! - Settings files and command-line options (`config`)
//! - Error and result types (`error`)
//! - File logging setup (`logging`)
//! - Row filtering (`search`)
//! - UI rendering and widgets (`ui`)
//!
//! It is used by the `ad-dashboard` binary and by tests.
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod search;
pub mod ui;

/// Convenient error and result types shared across the crate.
pub use error::{ApiError, Result};
