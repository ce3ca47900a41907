//! Pocket Player simulator
//!
//! A desktop host for the mobile player service: the catalog comes from a
//! TOML manifest, the transport engine is a virtual clock, and the
//! notification is printed to the terminal.

#![forbid(unsafe_code)]

pub mod config;
pub mod console;
pub mod engine;
pub mod manifest;
