//! Shared types for the vizsim simulators and their hosts.
//!
//! This crate defines the plain data structures any host (web canvas, native
//! GUI, terminal renderer) exchanges with the simulators:
//! - Simulator settings, deserializable from the host's camelCase parameters
//! - Content schemas for projects, news, publications and talks
//! - Research-tree node kinds and resource kinds with their visual styling
//! - The sidebar and theme UI-state store

mod content;
mod error;
mod research;
mod settings;
mod ui;

pub use content::*;
pub use error::*;
pub use research::*;
pub use settings::*;
pub use ui::*;

/// Viewport width (px) at and above which the desktop sidebar layout applies
pub const DESKTOP_BREAKPOINT: u32 = 1024;
