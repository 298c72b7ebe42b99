//! Foundation module - core utilities shared across the engine
//!
//! This module provides the fundamental utilities the simulation core is
//! built on:
//! - Math types and the axis-aligned bounding box
//! - Frame timing
//! - Logging setup

pub mod logging;
pub mod math;
pub mod time;
