// src/db/mod.rs
//
// Query functions grouped by table. Every function takes the pool (or an
// executor) explicitly; there is no global handle.

pub mod bookmarks;
pub mod questions;
pub mod sessions;
pub mod users;
