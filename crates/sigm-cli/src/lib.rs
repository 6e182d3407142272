//! Command-line front-end for signal manager projects.
//!
//! The binary is a thin layer over `sigm_core::Session`; commands and
//! table rendering live here so they can be tested without a process.

pub mod commands;
pub mod logging;
pub mod summary;
