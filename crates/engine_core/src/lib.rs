//! Core engine types for Watchpost.
//!
//! This crate provides the foundational types used across the simulation:
//! - Transform and spatial components
//! - Time management for the fixed-tick game loop
//! - Common component types for ECS

pub mod components;
pub mod time;
pub mod transform;

pub use components::*;
pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{Mat4, Quat, Vec2, Vec3};
pub use hecs::{Entity, World};
