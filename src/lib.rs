// SPDX-License-Identifier: GPL-3.0-only

//! Viewfinder - a camera application for the COSMIC desktop environment
//!
//! This library provides the core functionality for the Viewfinder application:
//! live camera preview, still photo capture, torch and flash control, and
//! switching between camera devices.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`app`]: Main application logic and UI
//! - [`backends`]: Camera backend (PipeWire enumeration and preview pipeline)
//! - [`pipelines`]: Still photo capture pipeline
//! - [`flash`]: Torch / flash LED control and flash mode state
//! - [`portal`]: Camera permission request via the XDG desktop portal
//! - [`config`]: User configuration handling
//! - [`storage`]: Photo album and thumbnail management

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod flash;
pub mod i18n;
pub mod pipelines;
pub mod portal;
pub mod storage;

// Re-export commonly used types
pub use app::{AppModel, Message};
pub use config::Config;
pub use flash::FlashMode;
