use molt_core::{DynValue, Property};

use crate::AccessError;

/// Uniform read and write access to one entity instance.
///
/// Implementations own the instance they mediate. A write may mutate that
/// instance in place or replace it wholesale; either way, subsequent reads
/// observe the updated state.
///
/// Property descriptors are expected to come from a live
/// [`EntityShape`](molt_core::EntityShape). Handing an accessor a property
/// that was never adopted by a shape panics when the accessor asks for its
/// owner.
pub trait PropertyAccessor {
    /// Reads the current value of `property` from the held instance.
    fn get(&self, property: &Property) -> Result<DynValue, AccessError>;

    /// Writes `value` to `property` on the held instance.
    fn set(&mut self, property: &Property, value: DynValue) -> Result<(), AccessError>;

    /// The instance the accessor currently holds.
    fn instance(&self) -> &DynValue;

    /// Replaces the held instance, returning the previous one.
    fn replace_instance(&mut self, instance: DynValue) -> DynValue;

    /// Consumes the accessor, releasing the held instance.
    fn into_instance(self) -> DynValue
    where
        Self: Sized;

    /// Reads `property` and downcasts the result to `V`.
    fn get_as<V: 'static>(&self, property: &Property) -> Result<V, AccessError>
    where
        Self: Sized,
    {
        self.get(property)?
            .take::<V>()
            .map_err(|source| AccessError::Property {
                shape: property.owner().type_name(),
                property: property.name().to_owned(),
                source,
            })
    }

    /// Erases `value` and writes it to `property`.
    fn put<V: Clone + 'static>(&mut self, property: &Property, value: V) -> Result<(), AccessError>
    where
        Self: Sized,
    {
        self.set(property, DynValue::new(value))
    }
}
