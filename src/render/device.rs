// src/render/device.rs

use super::RenderResult;

/// Opaque identifier of a rendering context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(pub u64);

/// Name of a buffer object. Buffers are shared between contexts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u32);

/// Name of a vertex array object. Only valid in the context that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexArrayHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    Byte,
    UnsignedByte,
    Short,
    UnsignedShort,
    Int,
    UnsignedInt,
    HalfFloat,
    Float,
}

impl ComponentType {
    pub fn size_bytes(&self) -> u32 {
        match self {
            ComponentType::Byte | ComponentType::UnsignedByte => 1,
            ComponentType::Short | ComponentType::UnsignedShort | ComponentType::HalfFloat => 2,
            ComponentType::Int | ComponentType::UnsignedInt | ComponentType::Float => 4,
        }
    }
}

/// How one attribute slot reads from the vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    /// Components per vertex, 1 to 4.
    pub components: u8,
    pub component_type: ComponentType,
    pub normalized: bool,
    /// Bytes between consecutive vertices.
    pub stride: u32,
    /// Byte offset of the first component.
    pub offset: u32,
}

impl VertexAttribute {
    pub fn new(components: u8, component_type: ComponentType, normalized: bool, stride: u32, offset: u32) -> Self {
        Self {
            components,
            component_type,
            normalized,
            stride,
            offset,
        }
    }

    /// Tightly packed `f32` components.
    pub fn floats(components: u8, stride: u32, offset: u32) -> Self {
        Self::new(components, ComponentType::Float, false, stride, offset)
    }

    pub fn size_bytes(&self) -> u32 {
        self.components as u32 * self.component_type.size_bytes()
    }
}

/// The graphics calls the vertex registry needs.
///
/// At most one context is current at a time. Vertex array calls act on the
/// current context.
pub trait GraphicsDevice {
    /// Every live context, in creation order.
    fn contexts(&self) -> Vec<ContextId>;

    fn current_context(&self) -> Option<ContextId>;

    fn make_current(&mut self, context: ContextId) -> RenderResult<()>;

    /// Leaves no context current.
    fn clear_current(&mut self);

    fn create_vertex_array(&mut self) -> RenderResult<VertexArrayHandle>;

    fn delete_vertex_array(&mut self, vertex_array: VertexArrayHandle) -> RenderResult<()>;

    fn bind_vertex_array(&mut self, vertex_array: VertexArrayHandle) -> RenderResult<()>;

    fn bind_array_buffer(&mut self, buffer: BufferHandle);

    fn bind_element_buffer(&mut self, buffer: BufferHandle);

    /// Enables `slot` on the bound vertex array and points it at the bound
    /// array buffer.
    fn enable_attribute(&mut self, slot: u32, attribute: &VertexAttribute) -> RenderResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_size() {
        assert_eq!(VertexAttribute::floats(3, 24, 0).size_bytes(), 12);
        assert_eq!(
            VertexAttribute::new(4, ComponentType::UnsignedByte, true, 16, 12).size_bytes(),
            4
        );
        assert_eq!(ComponentType::HalfFloat.size_bytes(), 2);
    }
}
