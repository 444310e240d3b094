use core::any::TypeId;
use core::fmt;

use alloc::boxed::Box;
use std::collections::HashMap;

use molt_core::{CtorError, CtorParam, DynValue, EntityShape};

use crate::AccessError;

/// Resolves one constructor parameter to a value.
///
/// Accessors build one of these per write: the parameter matching the
/// written property resolves to the new value, every other parameter to the
/// current value of the property with the same name.
pub type ParamResolver<'a> = dyn FnMut(&CtorParam) -> Result<DynValue, AccessError> + 'a;

/// Strategy for producing entity instances during reconstruction.
///
/// The default strategy drives the shape's own reconstruction constructor.
/// Front ends register alternatives per shape when instances must be
/// produced some other way, through a proxying factory for example.
pub trait EntityInstantiator: Send + Sync {
    /// Creates a fresh instance of `shape`, pulling one value per
    /// constructor parameter out of `resolver`.
    fn create(
        &self,
        shape: &EntityShape,
        resolver: &mut ParamResolver<'_>,
    ) -> Result<DynValue, AccessError>;
}

/// The default [`EntityInstantiator`]: runs the shape's reconstruction
/// constructor and validates what it returns.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapeInstantiator;

impl EntityInstantiator for ShapeInstantiator {
    fn create(
        &self,
        shape: &EntityShape,
        resolver: &mut ParamResolver<'_>,
    ) -> Result<DynValue, AccessError> {
        let Some(ctor) = shape.reconstruction_ctor() else {
            return Err(AccessError::MissingConstructor {
                shape: shape.type_name(),
                property: None,
            });
        };

        let mut values = Vec::with_capacity(ctor.arity());
        for param in ctor.params() {
            values.push(resolver(param)?);
        }

        let created = ctor
            .instantiate(values)
            .map_err(|source| AccessError::Instantiation {
                shape: shape.type_name(),
                source,
            })?;

        if !shape.is_instance(&created) {
            return Err(AccessError::Instantiation {
                shape: shape.type_name(),
                source: CtorError::WrongResultType {
                    expected: shape.type_name(),
                    actual: created.type_name(),
                },
            });
        }

        Ok(created)
    }
}

/// Per-shape instantiator registrations over a shared fallback.
pub struct Instantiators {
    fallback: Box<dyn EntityInstantiator>,
    overrides: HashMap<TypeId, Box<dyn EntityInstantiator>>,
}

impl Instantiators {
    /// Registrations over the given fallback strategy.
    pub fn new(fallback: impl EntityInstantiator + 'static) -> Self {
        Self {
            fallback: Box::new(fallback),
            overrides: HashMap::new(),
        }
    }

    /// Routes `shape` to `instantiator` instead of the fallback.
    pub fn register(
        &mut self,
        shape: &EntityShape,
        instantiator: impl EntityInstantiator + 'static,
    ) {
        self.overrides
            .insert(shape.type_id(), Box::new(instantiator));
    }

    /// The instantiator responsible for `shape`.
    pub fn instantiator_for(&self, shape: &EntityShape) -> &dyn EntityInstantiator {
        match self.overrides.get(&shape.type_id()) {
            Some(instantiator) => instantiator.as_ref(),
            None => self.fallback.as_ref(),
        }
    }
}

impl Default for Instantiators {
    fn default() -> Self {
        Self::new(ShapeInstantiator)
    }
}

impl fmt::Debug for Instantiators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instantiators")
            .field("overrides", &self.overrides.len())
            .finish_non_exhaustive()
    }
}
