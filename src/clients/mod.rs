// src/clients/mod.rs

pub mod ai;
pub mod mock;
pub mod storage;
pub mod store;
