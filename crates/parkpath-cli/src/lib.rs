//! Parking facility navigation CLI library.
//!
//! Command handlers, output rendering and logging set-up for the `parkpath`
//! binary.

pub mod commands;
pub mod logging;
pub mod output;
