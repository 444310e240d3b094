use core::fmt;

use alloc::sync::{Arc, Weak};

use bitflags::bitflags;

use crate::{DynValue, EntityShape};

bitflags! {
    /// Flags describing how a property may be written.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PropertyFlags: u64 {
        /// An empty set of flags
        const EMPTY = 0;
        /// The property cannot be mutated in place on its owning type
        const IMMUTABLE = 1 << 0;
    }
}

impl Default for PropertyFlags {
    #[inline(always)]
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Display for PropertyFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }

        let flags = [(PropertyFlags::IMMUTABLE, "immutable")];

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

/// Errors encountered when a property slot is read or written.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PropertyError {
    /// A lookup by name found no property declared under the given key.
    NoSuchProperty,

    /// A value had a different type than the slot it was used with.
    TypeMismatch {
        /// The type the slot works with.
        expected: &'static str,
        /// The type the value actually had.
        actual: &'static str,
    },

    /// The property has no getter.
    NotReadable,

    /// The property has neither a setter nor a wither.
    NotWritable,
}

impl fmt::Display for PropertyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyError::NoSuchProperty => write!(f, "No such property"),
            PropertyError::TypeMismatch { expected, actual } => {
                write!(f, "Type mismatch: expected {}, but got {}", expected, actual)
            }
            PropertyError::NotReadable => write!(f, "Property has no getter"),
            PropertyError::NotWritable => {
                write!(f, "Property has neither a setter nor a wither")
            }
        }
    }
}

impl core::error::Error for PropertyError {}

/// Reads the current value of a property out of an erased instance.
pub type GetFn = Arc<dyn Fn(&DynValue) -> Result<DynValue, PropertyError> + Send + Sync>;

/// Writes a value into an erased instance in place.
pub type SetFn = Arc<dyn Fn(&mut DynValue, DynValue) -> Result<(), PropertyError> + Send + Sync>;

/// Produces a new instance carrying the given value, leaving the source
/// untouched.
pub type WithFn = Arc<dyn Fn(&DynValue, DynValue) -> Result<DynValue, PropertyError> + Send + Sync>;

#[derive(Clone, Default)]
struct PropertyVTable {
    get: Option<GetFn>,
    set: Option<SetFn>,
    with: Option<WithFn>,
}

/// A named property slot declared on an [`EntityShape`].
///
/// A property carries access functions rather than field offsets: front ends
/// register closures for reading, for writing in place, and for rebuilding
/// the instance around a replacement value. Which of those are present,
/// together with [`PropertyFlags::IMMUTABLE`], is what accessors consult when
/// routing a write.
#[derive(Clone)]
pub struct Property {
    name: String,
    flags: PropertyFlags,
    owner: Weak<EntityShape>,
    vtable: PropertyVTable,
}

impl Property {
    /// Starts building a property under the given name.
    pub fn builder(name: impl Into<String>) -> PropertyBuilder {
        PropertyBuilder {
            name: name.into(),
            flags: PropertyFlags::EMPTY,
            vtable: PropertyVTable::default(),
        }
    }

    /// The property name, unique within its owning shape.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The flags declared for this property.
    pub fn flags(&self) -> PropertyFlags {
        self.flags
    }

    /// Returns true if the property cannot be mutated in place.
    pub fn is_immutable(&self) -> bool {
        self.flags.contains(PropertyFlags::IMMUTABLE)
    }

    /// Returns true if a getter was registered.
    pub fn has_getter(&self) -> bool {
        self.vtable.get.is_some()
    }

    /// Returns true if a setter was registered.
    pub fn has_setter(&self) -> bool {
        self.vtable.set.is_some()
    }

    /// Returns true if a wither was registered.
    pub fn has_wither(&self) -> bool {
        self.vtable.with.is_some()
    }

    /// Returns true if the property can take a new value through its own
    /// vtable, via either a setter or a wither.
    pub fn has_writer(&self) -> bool {
        self.has_setter() || self.has_wither()
    }

    /// The shape this property is declared on.
    ///
    /// # Panics
    ///
    /// Panics if the property was built but never adopted by a shape, or if
    /// the owning shape was dropped while the property was kept alive.
    pub fn owner(&self) -> Arc<EntityShape> {
        self.owner
            .upgrade()
            .expect("property is not attached to a live shape")
    }

    /// Reads the current value from `instance`.
    pub fn read(&self, instance: &DynValue) -> Result<DynValue, PropertyError> {
        match &self.vtable.get {
            Some(get) => get(instance),
            None => Err(PropertyError::NotReadable),
        }
    }

    /// Writes `value` into `instance`, in place through the setter when one
    /// exists, otherwise by rebuilding through the wither.
    pub fn write(&self, instance: &mut DynValue, value: DynValue) -> Result<(), PropertyError> {
        if let Some(set) = &self.vtable.set {
            return set(instance, value);
        }
        if let Some(with) = &self.vtable.with {
            let fresh = with(instance, value)?;
            *instance = fresh;
            return Ok(());
        }
        Err(PropertyError::NotWritable)
    }

    pub(crate) fn bind_owner(&mut self, owner: Weak<EntityShape>) {
        self.owner = owner;
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("flags", &self.flags)
            .field("getter", &self.vtable.get.is_some())
            .field("setter", &self.vtable.set.is_some())
            .field("wither", &self.vtable.with.is_some())
            .finish()
    }
}

/// Builder for [`Property`].
pub struct PropertyBuilder {
    name: String,
    flags: PropertyFlags,
    vtable: PropertyVTable,
}

impl PropertyBuilder {
    /// Replaces the flag set wholesale.
    pub fn flags(mut self, flags: PropertyFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Marks the property as not mutable in place.
    pub fn immutable(mut self) -> Self {
        self.flags |= PropertyFlags::IMMUTABLE;
        self
    }

    /// Registers a typed getter.
    ///
    /// The closure receives the concrete instance; the value it returns is
    /// erased on the way out.
    pub fn getter<T, V>(mut self, get: impl Fn(&T) -> V + Send + Sync + 'static) -> Self
    where
        T: 'static,
        V: Clone + 'static,
    {
        self.vtable.get = Some(Arc::new(move |instance: &DynValue| {
            let instance = instance.downcast_ref::<T>()?;
            Ok(DynValue::new(get(instance)))
        }));
        self
    }

    /// Registers a typed setter mutating the instance in place.
    pub fn setter<T, V>(mut self, set: impl Fn(&mut T, V) + Send + Sync + 'static) -> Self
    where
        T: 'static,
        V: 'static,
    {
        self.vtable.set = Some(Arc::new(move |instance: &mut DynValue, value: DynValue| {
            let value = value.take::<V>()?;
            let instance = instance.downcast_mut::<T>()?;
            set(instance, value);
            Ok(())
        }));
        self
    }

    /// Registers a typed wither producing a new instance with the value
    /// applied.
    pub fn wither<T, V>(mut self, with: impl Fn(&T, V) -> T + Send + Sync + 'static) -> Self
    where
        T: Clone + 'static,
        V: 'static,
    {
        self.vtable.with = Some(Arc::new(move |instance: &DynValue, value: DynValue| {
            let value = value.take::<V>()?;
            let instance = instance.downcast_ref::<T>()?;
            Ok(DynValue::new(with(instance, value)))
        }));
        self
    }

    /// Registers an already-erased getter.
    pub fn raw_getter(mut self, get: GetFn) -> Self {
        self.vtable.get = Some(get);
        self
    }

    /// Registers an already-erased setter.
    pub fn raw_setter(mut self, set: SetFn) -> Self {
        self.vtable.set = Some(set);
        self
    }

    /// Registers an already-erased wither.
    pub fn raw_wither(mut self, with: WithFn) -> Self {
        self.vtable.with = Some(with);
        self
    }

    /// Finishes the property. It stays detached until a shape adopts it.
    pub fn build(self) -> Property {
        Property {
            name: self.name,
            flags: self.flags,
            owner: Weak::new(),
            vtable: self.vtable,
        }
    }
}

impl From<PropertyBuilder> for Property {
    fn from(builder: PropertyBuilder) -> Self {
        builder.build()
    }
}
