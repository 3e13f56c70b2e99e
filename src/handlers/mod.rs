// src/handlers/mod.rs

pub mod admin;
pub mod auth;
pub mod bookmarks;
pub mod profile;
pub mod questions;
pub mod quiz;
