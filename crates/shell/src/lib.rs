//! `timekeep-shell`
//!
//! **Responsibility:** presentation shells around the session core.
//!
//! This crate provides:
//! - Environment-driven configuration
//! - A terminal shell (`timekeep-shell` binary) over a file-backed session slot
//! - A Leptos browser frontend over `localStorage` (wasm32 only)
//!
//! Both shells only *read* session state and call `login`/`logout`; every
//! decision is made by `timekeep-auth`.

#[cfg(not(target_arch = "wasm32"))]
pub mod commands;
#[cfg(not(target_arch = "wasm32"))]
pub mod config;

#[cfg(target_arch = "wasm32")]
pub mod frontend;

#[cfg(not(target_arch = "wasm32"))]
pub use commands::{CommandError, ShellCommand};
#[cfg(not(target_arch = "wasm32"))]
pub use config::ShellConfig;
