// src/models/mod.rs

pub mod booking;
pub mod content;
pub mod guide;
pub mod user;
