use core::any::{self, TypeId};
use core::fmt;

use alloc::sync::{Arc, Weak};
use std::collections::HashMap;

use bitflags::bitflags;

use crate::{DynValue, Property, PropertyError, ReconstructionCtor};

bitflags! {
    /// Flags describing capabilities of the whole entity type.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShapeFlags: u64 {
        /// An empty set of flags
        const EMPTY = 0;
        /// The front end synthesizes copy-on-write semantics for plain
        /// writes, so immutable properties may be handed to the delegate as
        /// if they were mutable
        const SYNTHESIZED_COPY = 1 << 0;
    }
}

impl Default for ShapeFlags {
    #[inline(always)]
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Display for ShapeFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }

        let flags = [(ShapeFlags::SYNTHESIZED_COPY, "synthesized_copy")];

        let mut is_first = true;
        for (flag, name) in flags {
            if self.contains(flag) {
                if !is_first {
                    write!(f, ", ")?;
                }
                is_first = false;
                write!(f, "{}", name)?;
            }
        }

        Ok(())
    }
}

/// Mapping metadata for one entity type.
///
/// A shape owns the type's property slots, its optional reconstruction
/// constructor, and shape-level flags. Shapes are built once per type and
/// shared behind an [`Arc`]; every adopted property holds a weak reference
/// back to its owner.
pub struct EntityShape {
    type_name: &'static str,
    id: TypeId,
    flags: ShapeFlags,
    properties: Vec<Property>,
    by_name: HashMap<String, usize>,
    ctor: Option<ReconstructionCtor>,
}

impl EntityShape {
    /// Starts building the shape describing `T`.
    pub fn builder<T: 'static>() -> ShapeBuilder {
        ShapeBuilder {
            type_name: any::type_name::<T>(),
            id: TypeId::of::<T>(),
            flags: ShapeFlags::EMPTY,
            properties: Vec::new(),
            ctor: None,
        }
    }

    /// The name of the described type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The [`TypeId`] of the described type.
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// Shape-level flags.
    pub fn flags(&self) -> ShapeFlags {
        self.flags
    }

    /// All properties, in declaration order.
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Looks up a property by name.
    pub fn property_named(&self, name: &str) -> Result<&Property, PropertyError> {
        self.by_name
            .get(name)
            .map(|&index| &self.properties[index])
            .ok_or(PropertyError::NoSuchProperty)
    }

    /// The reconstruction constructor, when the front end registered one.
    pub fn reconstruction_ctor(&self) -> Option<&ReconstructionCtor> {
        self.ctor.as_ref()
    }

    /// Returns true if `value` holds an instance of the described type.
    pub fn is_instance(&self, value: &DynValue) -> bool {
        value.type_id() == self.id
    }
}

impl fmt::Debug for EntityShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityShape")
            .field("type_name", &self.type_name)
            .field("flags", &self.flags)
            .field("properties", &self.properties)
            .field("ctor", &self.ctor)
            .finish()
    }
}

impl fmt::Display for EntityShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name)
    }
}

/// Builder for [`EntityShape`].
pub struct ShapeBuilder {
    type_name: &'static str,
    id: TypeId,
    flags: ShapeFlags,
    properties: Vec<Property>,
    ctor: Option<ReconstructionCtor>,
}

impl ShapeBuilder {
    /// Replaces the flag set wholesale.
    pub fn flags(mut self, flags: ShapeFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Adopts a property into the shape.
    pub fn property(mut self, property: impl Into<Property>) -> Self {
        self.properties.push(property.into());
        self
    }

    /// Registers the reconstruction constructor.
    pub fn reconstruction_ctor(mut self, ctor: impl Into<ReconstructionCtor>) -> Self {
        self.ctor = Some(ctor.into());
        self
    }

    /// Finishes the shape and binds every property to it.
    ///
    /// # Panics
    ///
    /// Panics if two properties share a name.
    pub fn build(self) -> Arc<EntityShape> {
        let Self {
            type_name,
            id,
            flags,
            mut properties,
            ctor,
        } = self;

        let mut by_name = HashMap::with_capacity(properties.len());
        for (index, property) in properties.iter().enumerate() {
            let previous = by_name.insert(property.name().to_owned(), index);
            assert!(
                previous.is_none(),
                "duplicate property `{}` on {}",
                property.name(),
                type_name
            );
        }

        Arc::new_cyclic(|owner: &Weak<EntityShape>| {
            for property in &mut properties {
                property.bind_owner(owner.clone());
            }
            EntityShape {
                type_name,
                id,
                flags,
                properties,
                by_name,
                ctor,
            }
        })
    }
}
