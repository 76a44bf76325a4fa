//! Reactor Common Library
//!
//! This crate provides shared constants, process-variable naming and
//! configuration loading utilities for the reactor controller workspace.
//!
//! # Module Structure
//!
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - Workspace-wide numeric limits
//! - [`process`] - Operating modes and process-variable names
//! - [`control_unit`] - Typed controller configuration
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust,no_run
//! use reactor_common::config::ConfigLoader;
//! use reactor_common::control_unit::config::ControllerConfig;
//! use std::path::Path;
//!
//! let config = ControllerConfig::load(Path::new("config/reactor.toml")).unwrap();
//! config.validate().unwrap();
//! ```

pub mod config;
pub mod consts;
pub mod control_unit;
pub mod prelude;
pub mod process;
