// src/render/headless.rs

use super::{
    BufferHandle, ContextId, GraphicsDevice, RenderError, RenderResult, VertexArrayHandle,
    VertexAttribute,
};
use log::debug;
use std::collections::HashMap;

/// A call made on a [`HeadlessDevice`], tagged with the context it ran in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCall {
    MakeCurrent(ContextId),
    ClearCurrent,
    CreateVertexArray(ContextId, VertexArrayHandle),
    DeleteVertexArray(ContextId, VertexArrayHandle),
    BindVertexArray(ContextId, VertexArrayHandle),
    BindArrayBuffer(Option<ContextId>, BufferHandle),
    BindElementBuffer(Option<ContextId>, BufferHandle),
    EnableAttribute(ContextId, u32),
}

/// A device without a GPU. Hands out unique names, enforces context
/// ownership of vertex arrays and records every call.
#[derive(Debug, Default)]
pub struct HeadlessDevice {
    contexts: Vec<ContextId>,
    next_context: u64,
    current: Option<ContextId>,
    next_vertex_array: u32,
    owners: HashMap<VertexArrayHandle, ContextId>,
    calls: Vec<DeviceCall>,
}

impl HeadlessDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context. It does not become current.
    pub fn create_context(&mut self) -> ContextId {
        let context = ContextId(self.next_context);
        self.next_context += 1;
        self.contexts.push(context);
        debug!("Created context {:?}", context);
        context
    }

    /// Destroys `context` and every vertex array it owned.
    pub fn destroy_context(&mut self, context: ContextId) -> RenderResult<()> {
        let before = self.contexts.len();
        self.contexts.retain(|c| *c != context);
        if self.contexts.len() == before {
            return Err(RenderError::UnknownContext(context));
        }
        self.owners.retain(|_, owner| *owner != context);
        if self.current == Some(context) {
            self.current = None;
        }
        debug!("Destroyed context {:?}", context);
        Ok(())
    }

    pub fn calls(&self) -> &[DeviceCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Number of vertex arrays ever created in `context`.
    pub fn vertex_arrays_created_in(&self, context: ContextId) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, DeviceCall::CreateVertexArray(c, _) if *c == context))
            .count()
    }

    pub fn owner_of(&self, vertex_array: VertexArrayHandle) -> Option<ContextId> {
        self.owners.get(&vertex_array).copied()
    }

    pub fn live_vertex_arrays(&self) -> usize {
        self.owners.len()
    }

    fn require_current(&self) -> RenderResult<ContextId> {
        self.current.ok_or(RenderError::NoCurrentContext)
    }

    fn require_owned(&self, vertex_array: VertexArrayHandle) -> RenderResult<ContextId> {
        let current = self.require_current()?;
        match self.owners.get(&vertex_array) {
            Some(owner) if *owner == current => Ok(current),
            Some(owner) => Err(RenderError::ContextNotCurrent(*owner)),
            None => Err(RenderError::UnknownVertexArray(vertex_array)),
        }
    }
}

impl GraphicsDevice for HeadlessDevice {
    fn contexts(&self) -> Vec<ContextId> {
        self.contexts.clone()
    }

    fn current_context(&self) -> Option<ContextId> {
        self.current
    }

    fn make_current(&mut self, context: ContextId) -> RenderResult<()> {
        if !self.contexts.contains(&context) {
            return Err(RenderError::UnknownContext(context));
        }
        self.current = Some(context);
        self.calls.push(DeviceCall::MakeCurrent(context));
        Ok(())
    }

    fn clear_current(&mut self) {
        self.current = None;
        self.calls.push(DeviceCall::ClearCurrent);
    }

    fn create_vertex_array(&mut self) -> RenderResult<VertexArrayHandle> {
        let context = self.require_current()?;
        self.next_vertex_array += 1;
        let vertex_array = VertexArrayHandle(self.next_vertex_array);
        self.owners.insert(vertex_array, context);
        self.calls.push(DeviceCall::CreateVertexArray(context, vertex_array));
        Ok(vertex_array)
    }

    fn delete_vertex_array(&mut self, vertex_array: VertexArrayHandle) -> RenderResult<()> {
        let context = self.require_owned(vertex_array)?;
        self.owners.remove(&vertex_array);
        self.calls.push(DeviceCall::DeleteVertexArray(context, vertex_array));
        Ok(())
    }

    fn bind_vertex_array(&mut self, vertex_array: VertexArrayHandle) -> RenderResult<()> {
        let context = self.require_owned(vertex_array)?;
        self.calls.push(DeviceCall::BindVertexArray(context, vertex_array));
        Ok(())
    }

    fn bind_array_buffer(&mut self, buffer: BufferHandle) {
        self.calls.push(DeviceCall::BindArrayBuffer(self.current, buffer));
    }

    fn bind_element_buffer(&mut self, buffer: BufferHandle) {
        self.calls.push(DeviceCall::BindElementBuffer(self.current, buffer));
    }

    fn enable_attribute(&mut self, slot: u32, _attribute: &VertexAttribute) -> RenderResult<()> {
        let context = self.require_current()?;
        self.calls.push(DeviceCall::EnableAttribute(context, slot));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_arrays_belong_to_their_context() {
        let mut device = HeadlessDevice::new();
        let a = device.create_context();
        let b = device.create_context();
        assert_eq!(device.create_vertex_array(), Err(RenderError::NoCurrentContext));

        device.make_current(a).unwrap();
        let vao = device.create_vertex_array().unwrap();
        assert_eq!(device.owner_of(vao), Some(a));

        device.make_current(b).unwrap();
        assert_eq!(device.bind_vertex_array(vao), Err(RenderError::ContextNotCurrent(a)));
        assert_eq!(device.delete_vertex_array(vao), Err(RenderError::ContextNotCurrent(a)));
    }

    #[test]
    fn test_destroying_context_frees_its_arrays() {
        let mut device = HeadlessDevice::new();
        let a = device.create_context();
        device.make_current(a).unwrap();
        device.create_vertex_array().unwrap();
        device.create_vertex_array().unwrap();
        assert_eq!(device.live_vertex_arrays(), 2);

        device.destroy_context(a).unwrap();
        assert_eq!(device.live_vertex_arrays(), 0);
        assert_eq!(device.current_context(), None);
        assert_eq!(device.make_current(a), Err(RenderError::UnknownContext(a)));
        assert_eq!(device.destroy_context(a), Err(RenderError::UnknownContext(a)));
    }
}
