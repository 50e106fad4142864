//! Core generator logic — config, path rewriting, include scanning,
//! dependency resolution, rule synthesis, Makefile assembly.

pub mod config;
pub mod emit;
pub mod graph;
pub mod paths;
pub mod resolve;
pub mod rules;
pub mod scan;
