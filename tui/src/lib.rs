//! Oracle TUI - Terminal interface for the Oracle fitness tracker
//!
//! This crate provides a full-screen terminal UI over `oracle-core`: a
//! chat screen for logging meals and workouts in natural language, plus
//! dashboard, plan, and profile screens derived from the same core state.
//!
//! # Architecture
//!
//! - **App**: event loop, key handling, background task orchestration
//! - **Ui**: pure rendering of the core state per screen
//! - **Theme**: palette resolution from the profile's theme preference

pub mod app;
pub mod theme;
pub mod ui;

pub use app::App;
