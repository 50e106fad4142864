//! Stretto — Makefile generator for multi-movement LilyPond scores.
//!
//! Scans `\include` edges across a score tree, persists them as per-file
//! dependency records, and emits a Makefile so `make` only re-renders what
//! actually changed.

pub mod cli;
pub mod core;
