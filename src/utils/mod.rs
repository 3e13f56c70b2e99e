// src/utils/mod.rs

pub mod grading;
pub mod hash;
pub mod html;
pub mod sampler;
pub mod session;
pub mod upload;
