//! Core markup reading primitives
//!
//! This module contains the byte-level building blocks for reading markup:
//! - Scanner: SIMD-accelerated delimiter detection using memchr
//! - Doctype: reader for a single DOCTYPE declaration

pub mod doctype;
pub mod scanner;
