//! Hex Battle - tactical hex-grid battle engine

pub mod battle;
pub mod core;
