use core::fmt;
use core::mem;

use alloc::sync::Arc;

use molt_core::{DynValue, EntityShape, Property};

use crate::{AccessError, PropertyAccessor};

/// Accessor that applies reads and writes straight through property vtables.
///
/// This is the plain delegate. It owns an instance of exactly one shape and
/// forwards every operation to the property's own getter, setter or wither,
/// regardless of flags. Routing around missing writers on immutable
/// properties is the job of
/// [`InstantiatingAccessor`](crate::InstantiatingAccessor), which wraps one
/// of these.
pub struct DirectAccessor {
    shape: Arc<EntityShape>,
    instance: DynValue,
}

impl DirectAccessor {
    /// Creates an accessor owning `instance`.
    ///
    /// Fails with [`AccessError::WrongShape`] if the instance is not of the
    /// type `shape` describes.
    pub fn new(shape: Arc<EntityShape>, instance: DynValue) -> Result<Self, AccessError> {
        if !shape.is_instance(&instance) {
            return Err(AccessError::WrongShape {
                expected: shape.type_name(),
                actual: instance.type_name(),
            });
        }
        Ok(Self { shape, instance })
    }

    /// The shape of the held instance.
    pub fn shape(&self) -> &Arc<EntityShape> {
        &self.shape
    }

    fn owned_property(&self, property: &Property) -> Result<(), AccessError> {
        if property.owner().type_id() == self.shape.type_id() {
            Ok(())
        } else {
            Err(AccessError::UnknownProperty {
                shape: self.shape.type_name(),
                name: property.name().to_owned(),
            })
        }
    }
}

impl PropertyAccessor for DirectAccessor {
    fn get(&self, property: &Property) -> Result<DynValue, AccessError> {
        self.owned_property(property)?;
        property
            .read(&self.instance)
            .map_err(|source| AccessError::Property {
                shape: self.shape.type_name(),
                property: property.name().to_owned(),
                source,
            })
    }

    fn set(&mut self, property: &Property, value: DynValue) -> Result<(), AccessError> {
        self.owned_property(property)?;
        property
            .write(&mut self.instance, value)
            .map_err(|source| AccessError::Property {
                shape: self.shape.type_name(),
                property: property.name().to_owned(),
                source,
            })
    }

    fn instance(&self) -> &DynValue {
        &self.instance
    }

    fn replace_instance(&mut self, instance: DynValue) -> DynValue {
        mem::replace(&mut self.instance, instance)
    }

    fn into_instance(self) -> DynValue {
        self.instance
    }
}

impl fmt::Debug for DirectAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectAccessor")
            .field("shape", &self.shape.type_name())
            .field("instance", &self.instance)
            .finish()
    }
}
