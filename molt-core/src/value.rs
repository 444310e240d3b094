use core::any::{self, Any, TypeId};
use core::fmt;

use alloc::boxed::Box;

use crate::PropertyError;

/// A type-erased, clonable entity or property value.
///
/// Values cross the mapping layer erased: getters hand them out, constructor
/// arguments collect them, setters take them back in, all without the layer
/// knowing the concrete types involved. The originating type name is captured
/// at construction so that mismatches surface as
/// [`PropertyError::TypeMismatch`] instead of panics.
pub struct DynValue {
    inner: Box<dyn Any>,
    type_name: &'static str,
    clone_fn: CloneFn,
}

type CloneFn = fn(&dyn Any) -> Box<dyn Any>;

fn clone_erased<T: Clone + 'static>(value: &dyn Any) -> Box<dyn Any> {
    match value.downcast_ref::<T>() {
        Some(concrete) => Box::new(concrete.clone()),
        None => unreachable!("clone intrinsic invoked for a foreign type"),
    }
}

impl DynValue {
    /// Erases `value`, remembering its type name and how to clone it.
    pub fn new<T: Clone + 'static>(value: T) -> Self {
        Self {
            inner: Box::new(value),
            type_name: any::type_name::<T>(),
            clone_fn: clone_erased::<T>,
        }
    }

    /// The name of the erased type, as captured at construction.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The [`TypeId`] of the erased type.
    pub fn type_id(&self) -> TypeId {
        Any::type_id(self.inner.as_ref())
    }

    /// Returns true if the erased value is a `T`.
    pub fn is<T: 'static>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// Borrows the value as a `T`.
    pub fn downcast_ref<T: 'static>(&self) -> Result<&T, PropertyError> {
        self.inner
            .downcast_ref::<T>()
            .ok_or(PropertyError::TypeMismatch {
                expected: any::type_name::<T>(),
                actual: self.type_name,
            })
    }

    /// Mutably borrows the value as a `T`.
    pub fn downcast_mut<T: 'static>(&mut self) -> Result<&mut T, PropertyError> {
        let actual = self.type_name;
        self.inner
            .downcast_mut::<T>()
            .ok_or(PropertyError::TypeMismatch {
                expected: any::type_name::<T>(),
                actual,
            })
    }

    /// Moves the value out as a `T`.
    pub fn take<T: 'static>(self) -> Result<T, PropertyError> {
        let actual = self.type_name;
        self.inner
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| PropertyError::TypeMismatch {
                expected: any::type_name::<T>(),
                actual,
            })
    }
}

impl Clone for DynValue {
    fn clone(&self) -> Self {
        Self {
            inner: (self.clone_fn)(self.inner.as_ref()),
            type_name: self.type_name,
            clone_fn: self.clone_fn,
        }
    }
}

impl fmt::Debug for DynValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DynValue({})", self.type_name)
    }
}
