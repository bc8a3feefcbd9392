// src/services/mod.rs

pub mod generation;
pub mod scoring;
pub mod upload;
