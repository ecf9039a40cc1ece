//! Library exports for the campaign messaging service
//!
//! This module exposes internal components for testing and potential library usage.

pub mod database;
pub mod handler;
pub mod middleware;
pub mod model;
pub mod route;
