//! Core types shared by every subsystem: configuration, errors, claims,
//! generations.

pub mod claim;
pub mod config;
pub mod errors;
pub mod generation;
