// src/core/mod.rs — Chat domain core

pub mod controller;
pub mod limiter;
pub mod message;
pub mod persist;
pub mod session;
pub mod store;
