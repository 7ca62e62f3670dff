// src/render/mod.rs

//! Vertex resources shared by several rendering contexts.
//!
//! A [`VertexLayoutRegistry`] describes one vertex buffer layout and realizes
//! it as a separate native vertex array in every context that draws with it.
//! Graphics calls go through the [`GraphicsDevice`] trait; [`HeadlessDevice`]
//! implements it without a GPU.

mod device;
mod headless;
mod vertex_array;

pub use device::{
    BufferHandle, ComponentType, ContextId, GraphicsDevice, VertexArrayHandle, VertexAttribute,
};
pub use headless::{DeviceCall, HeadlessDevice};
pub use vertex_array::{RenderContextResource, VertexLayout, VertexLayoutRegistry};

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("Vertex layout was already submitted")]
    AlreadySubmitted,
    #[error("Vertex layout has not been submitted")]
    NotSubmitted,
    #[error("Context {0:?} is not current")]
    ContextNotCurrent(ContextId),
    #[error("No context is current")]
    NoCurrentContext,
    #[error("Unknown context {0:?}")]
    UnknownContext(ContextId),
    #[error("Vertex array {0:?} does not exist")]
    UnknownVertexArray(VertexArrayHandle),
    #[error("Attribute {slot} has {count} components, expected 1 to 4")]
    InvalidComponentCount { slot: u32, count: u8 },
}

/// Result type for device and registry operations
pub type RenderResult<T> = Result<T, RenderError>;
