// src/handlers/mod.rs

pub mod admin;
pub mod auth;
pub mod booking;
pub mod content;
pub mod profile;
