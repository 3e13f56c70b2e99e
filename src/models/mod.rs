// src/models/mod.rs

pub mod bookmark;
pub mod question;
pub mod test_session;
pub mod user;
