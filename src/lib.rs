//! Grid Snake - a fixed-step snake simulation with smooth, wrap-aware motion
//!
//! This library provides:
//! - Core simulation (game module): grid, food, stepping, interpolation, death sequence
//! - Terminal front end (input, render, metrics, modes) that presents it

pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
