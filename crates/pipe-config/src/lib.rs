//! Configuration management for the `pipe` tool.
//!
//! This crate finds the `.pipe/` directory of a pipeline checkout and loads
//! its layered settings: where formulas live, the default drive and
//! context area, and how strictly tokens are resolved.

pub mod config;
pub mod pipe_dir;
