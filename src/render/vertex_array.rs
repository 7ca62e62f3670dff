// src/render/vertex_array.rs

use super::{
    BufferHandle, ContextId, GraphicsDevice, RenderError, RenderResult, VertexArrayHandle,
    VertexAttribute,
};
use log::{debug, warn};
use std::collections::{BTreeMap, HashMap};

/// A vertex buffer, an optional index buffer and the attribute slots that
/// read from the vertex buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexLayout {
    buffer: BufferHandle,
    index_buffer: Option<BufferHandle>,
    attributes: BTreeMap<u32, VertexAttribute>,
}

impl VertexLayout {
    pub fn new(buffer: BufferHandle, index_buffer: Option<BufferHandle>) -> Self {
        Self {
            buffer,
            index_buffer,
            attributes: BTreeMap::new(),
        }
    }

    pub fn buffer(&self) -> BufferHandle {
        self.buffer
    }

    pub fn index_buffer(&self) -> Option<BufferHandle> {
        self.index_buffer
    }

    pub fn attribute(&self, slot: u32) -> Option<&VertexAttribute> {
        self.attributes.get(&slot)
    }

    /// Attributes in slot order.
    pub fn attributes(&self) -> impl Iterator<Item = (u32, &VertexAttribute)> {
        self.attributes.iter().map(|(slot, attribute)| (*slot, attribute))
    }
}

/// The vertex array realizing a layout in one context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderContextResource {
    pub context: ContextId,
    pub vertex_array: VertexArrayHandle,
}

/// A vertex layout plus one realized vertex array per context.
///
/// Attributes can only be added before [`submit`](Self::submit). Submitting
/// realizes the layout in every context the device knows about; contexts
/// seen later are realized on their first [`use_for`](Self::use_for). A
/// context is realized at most once and its vertex array is never handed to
/// another context.
#[derive(Debug)]
pub struct VertexLayoutRegistry {
    layout: VertexLayout,
    submitted: bool,
    resources: HashMap<ContextId, RenderContextResource>,
}

impl VertexLayoutRegistry {
    pub fn new(buffer: BufferHandle, index_buffer: Option<BufferHandle>) -> Self {
        Self {
            layout: VertexLayout::new(buffer, index_buffer),
            submitted: false,
            resources: HashMap::new(),
        }
    }

    pub fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn resource(&self, context: ContextId) -> Option<&RenderContextResource> {
        self.resources.get(&context)
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    /// Sets the attribute read through `slot`, replacing any earlier one.
    pub fn add_attribute(&mut self, slot: u32, attribute: VertexAttribute) -> RenderResult<()> {
        if self.submitted {
            return Err(RenderError::AlreadySubmitted);
        }
        if !(1..=4).contains(&attribute.components) {
            return Err(RenderError::InvalidComponentCount {
                slot,
                count: attribute.components,
            });
        }
        self.layout.attributes.insert(slot, attribute);
        Ok(())
    }

    /// Freezes the layout and realizes it in every context of `device`,
    /// making each current in turn. The context that was current before is
    /// current again afterwards, also when realization fails.
    pub fn submit(&mut self, device: &mut dyn GraphicsDevice) -> RenderResult<()> {
        if self.submitted {
            return Err(RenderError::AlreadySubmitted);
        }

        let previous = device.current_context();
        let result = device
            .contexts()
            .into_iter()
            .try_for_each(|context| -> RenderResult<()> {
                device.make_current(context)?;
                self.realize(device, context)?;
                Ok(())
            });
        match previous {
            Some(context) => device.make_current(context)?,
            None => device.clear_current(),
        }
        result?;

        self.submitted = true;
        debug!(
            "Submitted vertex layout with {} attribute(s) to {} context(s)",
            self.layout.attributes.len(),
            self.resources.len()
        );
        Ok(())
    }

    /// Realizes the layout in `context`, which was created after submission
    /// and must be current.
    pub fn initialize_context(
        &mut self,
        device: &mut dyn GraphicsDevice,
        context: ContextId,
    ) -> RenderResult<RenderContextResource> {
        if !self.submitted {
            return Err(RenderError::NotSubmitted);
        }
        self.realize(device, context)
    }

    /// Binds the vertex array of `context`, realizing it first if this is
    /// the first use there, and the index buffer if there is one.
    pub fn use_for(&mut self, device: &mut dyn GraphicsDevice, context: ContextId) -> RenderResult<VertexArrayHandle> {
        if !self.submitted {
            return Err(RenderError::NotSubmitted);
        }
        let resource = self.realize(device, context)?;
        device.bind_vertex_array(resource.vertex_array)?;
        if let Some(index_buffer) = self.layout.index_buffer {
            device.bind_element_buffer(index_buffer);
        }
        Ok(resource.vertex_array)
    }

    /// Binds the raw vertex buffer, e.g. to upload vertex data.
    pub fn bind(&self, device: &mut dyn GraphicsDevice) {
        device.bind_array_buffer(self.layout.buffer);
    }

    /// Deletes the vertex array of `context`, which must be current.
    /// Returns whether there was one.
    pub fn release_context(&mut self, device: &mut dyn GraphicsDevice, context: ContextId) -> RenderResult<bool> {
        let Some(resource) = self.resources.get(&context).copied() else {
            return Ok(false);
        };
        ensure_current(device, context)?;
        device.delete_vertex_array(resource.vertex_array)?;
        self.resources.remove(&context);
        debug!("Released {:?} of context {:?}", resource.vertex_array, context);
        Ok(true)
    }

    /// Forgets the vertex array of a context that was destroyed together
    /// with its resources.
    pub fn forget_context(&mut self, context: ContextId) -> Option<RenderContextResource> {
        self.resources.remove(&context)
    }

    fn realize(&mut self, device: &mut dyn GraphicsDevice, context: ContextId) -> RenderResult<RenderContextResource> {
        ensure_current(device, context)?;
        if let Some(resource) = self.resources.get(&context) {
            return Ok(*resource);
        }

        let vertex_array = device.create_vertex_array()?;
        if let Err(err) = self.configure(device, vertex_array) {
            warn!("Failed to set up {:?} in context {:?}: {}", vertex_array, context, err);
            let _ = device.delete_vertex_array(vertex_array);
            return Err(err);
        }

        let resource = RenderContextResource {
            context,
            vertex_array,
        };
        self.resources.insert(context, resource);
        debug!("Realized {:?} in context {:?}", vertex_array, context);
        Ok(resource)
    }

    fn configure(&self, device: &mut dyn GraphicsDevice, vertex_array: VertexArrayHandle) -> RenderResult<()> {
        device.bind_vertex_array(vertex_array)?;
        device.bind_array_buffer(self.layout.buffer);
        for (slot, attribute) in self.layout.attributes() {
            device.enable_attribute(slot, attribute)?;
        }
        Ok(())
    }
}

fn ensure_current(device: &dyn GraphicsDevice, context: ContextId) -> RenderResult<()> {
    if device.current_context() == Some(context) {
        Ok(())
    } else {
        Err(RenderError::ContextNotCurrent(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{DeviceCall, HeadlessDevice};
    use std::collections::HashSet;

    fn registry() -> VertexLayoutRegistry {
        let mut registry = VertexLayoutRegistry::new(BufferHandle(7), Some(BufferHandle(8)));
        registry
            .add_attribute(0, VertexAttribute::floats(3, 24, 0))
            .unwrap();
        registry
            .add_attribute(1, VertexAttribute::floats(3, 24, 12))
            .unwrap();
        registry
    }

    #[test]
    fn test_late_context_realized_exactly_once() {
        let mut device = HeadlessDevice::new();
        let c1 = device.create_context();
        let c2 = device.create_context();
        let mut registry = registry();
        registry.submit(&mut device).unwrap();
        assert_eq!(registry.resource_count(), 2);

        let c3 = device.create_context();
        device.make_current(c3).unwrap();
        let first = registry.use_for(&mut device, c3).unwrap();
        let second = registry.use_for(&mut device, c3).unwrap();
        assert_eq!(first, second);
        assert_eq!(device.vertex_arrays_created_in(c3), 1);
        assert_eq!(device.vertex_arrays_created_in(c1), 1);
        assert_eq!(device.vertex_arrays_created_in(c2), 1);
    }

    #[test]
    fn test_contexts_never_share_vertex_arrays() {
        let mut device = HeadlessDevice::new();
        let contexts: Vec<ContextId> = (0..3).map(|_| device.create_context()).collect();
        let mut registry = registry();
        registry.submit(&mut device).unwrap();

        let handles: HashSet<VertexArrayHandle> = contexts
            .iter()
            .map(|c| registry.resource(*c).unwrap().vertex_array)
            .collect();
        assert_eq!(handles.len(), 3);
        for context in &contexts {
            let resource = registry.resource(*context).unwrap();
            assert_eq!(device.owner_of(resource.vertex_array), Some(*context));
        }
    }

    #[test]
    fn test_submit_restores_current_context() {
        let mut device = HeadlessDevice::new();
        let c1 = device.create_context();
        let c2 = device.create_context();
        device.make_current(c1).unwrap();
        let mut registry = registry();
        registry.submit(&mut device).unwrap();
        assert_eq!(device.current_context(), Some(c1));
        assert!(registry.resource(c2).is_some());

        let mut device = HeadlessDevice::new();
        device.create_context();
        let mut registry = self::registry();
        registry.submit(&mut device).unwrap();
        assert_eq!(device.current_context(), None);
    }

    #[test]
    fn test_realization_enables_attributes_in_slot_order() {
        let mut device = HeadlessDevice::new();
        let c = device.create_context();
        let mut registry = VertexLayoutRegistry::new(BufferHandle(1), None);
        registry
            .add_attribute(2, VertexAttribute::floats(2, 32, 24))
            .unwrap();
        registry
            .add_attribute(0, VertexAttribute::floats(3, 32, 0))
            .unwrap();
        registry.submit(&mut device).unwrap();

        let enabled: Vec<u32> = device
            .calls()
            .iter()
            .filter_map(|call| match call {
                DeviceCall::EnableAttribute(context, slot) if *context == c => Some(*slot),
                _ => None,
            })
            .collect();
        assert_eq!(enabled, [0, 2]);
    }

    #[test]
    fn test_use_requires_current_context() {
        let mut device = HeadlessDevice::new();
        let c1 = device.create_context();
        let c2 = device.create_context();
        let mut registry = registry();
        registry.submit(&mut device).unwrap();

        device.make_current(c1).unwrap();
        assert_eq!(
            registry.use_for(&mut device, c2),
            Err(RenderError::ContextNotCurrent(c2))
        );
    }

    #[test]
    fn test_use_binds_index_buffer() {
        let mut device = HeadlessDevice::new();
        let c = device.create_context();
        let mut registry = registry();
        registry.submit(&mut device).unwrap();
        device.make_current(c).unwrap();
        device.clear_calls();

        let vao = registry.use_for(&mut device, c).unwrap();
        assert_eq!(
            device.calls(),
            [
                DeviceCall::BindVertexArray(c, vao),
                DeviceCall::BindElementBuffer(Some(c), BufferHandle(8)),
            ]
        );
    }

    #[test]
    fn test_layout_frozen_after_submit() {
        let mut device = HeadlessDevice::new();
        let mut registry = registry();
        assert_eq!(
            registry.use_for(&mut device, ContextId(0)),
            Err(RenderError::NotSubmitted)
        );
        registry.submit(&mut device).unwrap();
        assert_eq!(
            registry.add_attribute(3, VertexAttribute::floats(2, 8, 0)),
            Err(RenderError::AlreadySubmitted)
        );
        assert_eq!(registry.submit(&mut device), Err(RenderError::AlreadySubmitted));
    }

    #[test]
    fn test_invalid_component_count() {
        let mut registry = VertexLayoutRegistry::new(BufferHandle(1), None);
        assert_eq!(
            registry.add_attribute(0, VertexAttribute::floats(5, 20, 0)),
            Err(RenderError::InvalidComponentCount { slot: 0, count: 5 })
        );
        assert!(registry.layout().attribute(0).is_none());
    }

    #[test]
    fn test_initialize_and_release_context() {
        let mut device = HeadlessDevice::new();
        let mut registry = registry();
        registry.submit(&mut device).unwrap();
        assert_eq!(registry.resource_count(), 0);

        let c = device.create_context();
        device.make_current(c).unwrap();
        let resource = registry.initialize_context(&mut device, c).unwrap();
        assert_eq!(registry.initialize_context(&mut device, c).unwrap(), resource);
        assert_eq!(device.vertex_arrays_created_in(c), 1);

        assert!(registry.release_context(&mut device, c).unwrap());
        assert!(!registry.release_context(&mut device, c).unwrap());
        assert_eq!(device.live_vertex_arrays(), 0);
        assert!(registry.resource(c).is_none());
    }

    #[test]
    fn test_bind_binds_vertex_buffer() {
        let mut device = HeadlessDevice::new();
        let registry = registry();
        registry.bind(&mut device);
        assert_eq!(device.calls(), [DeviceCall::BindArrayBuffer(None, BufferHandle(7))]);
    }
}
