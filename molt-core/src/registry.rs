use core::any::TypeId;
use core::fmt;

use alloc::sync::Arc;
use std::collections::HashMap;

use crate::{DynValue, EntityShape};

/// Shapes indexed by the type they describe.
///
/// Mapping layers keep one registry per context and resolve the shape for an
/// instance before handing both to an accessor.
#[derive(Default)]
pub struct ShapeRegistry {
    shapes: HashMap<TypeId, Arc<EntityShape>>,
}

impl ShapeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `shape`, returning the shape previously registered for the
    /// same type, if any.
    pub fn register(&mut self, shape: Arc<EntityShape>) -> Option<Arc<EntityShape>> {
        self.shapes.insert(shape.type_id(), shape)
    }

    /// The shape registered for `T`.
    pub fn shape_for<T: 'static>(&self) -> Option<&Arc<EntityShape>> {
        self.shapes.get(&TypeId::of::<T>())
    }

    /// The shape registered for the erased type of `value`.
    pub fn shape_of(&self, value: &DynValue) -> Option<&Arc<EntityShape>> {
        self.shapes.get(&value.type_id())
    }

    /// The shape registered under `id`.
    pub fn get(&self, id: TypeId) -> Option<&Arc<EntityShape>> {
        self.shapes.get(&id)
    }

    /// The number of registered shapes.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Iterates over all registered shapes, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<EntityShape>> {
        self.shapes.values()
    }
}

impl fmt::Debug for ShapeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.shapes.values().map(|shape| shape.type_name()))
            .finish()
    }
}
