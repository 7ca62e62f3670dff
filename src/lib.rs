// src/lib.rs

pub mod config;
pub mod editor;
pub mod render;
pub mod scene;
#[cfg(feature = "gui")]
pub mod ui;
