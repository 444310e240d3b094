use core::fmt;

use molt_core::{CtorParam, DynValue, Property, ShapeFlags};

use crate::{AccessError, DirectAccessor, Instantiators, PropertyAccessor};

/// Accessor that reroutes writes to immutable properties through entity
/// reconstruction.
///
/// Wraps a delegate accessor. Reads, and writes to properties that can take
/// a value themselves, pass straight through. A write to an immutable
/// property without a setter or wither instead resolves the owning shape's
/// reconstruction constructor, calls it with the new value in the written
/// parameter's position and the current values everywhere else, and swaps
/// the rebuilt instance into the delegate.
///
/// The held instance is only replaced once the constructor has succeeded. A
/// failed write leaves the previous state fully observable, and every
/// successful write is observed by the next one, so updates to several
/// immutable properties compose.
///
/// Shapes flagged [`ShapeFlags::SYNTHESIZED_COPY`] opt out of rerouting
/// entirely: their front end synthesizes copy-on-write behind plain writes,
/// so even immutable properties go to the delegate.
///
/// ```
/// use molt_core::{DynValue, EntityShape, Property, ReconstructionCtor};
/// use molt_reflect::{DirectAccessor, InstantiatingAccessor, Instantiators, PropertyAccessor};
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Tag {
///     label: String,
/// }
///
/// let shape = EntityShape::builder::<Tag>()
///     .property(
///         Property::builder("label")
///             .immutable()
///             .getter(|t: &Tag| t.label.clone()),
///     )
///     .reconstruction_ctor(
///         ReconstructionCtor::builder()
///             .param("label")
///             .create(|mut args| Ok(DynValue::new(Tag { label: args.take(0)? }))),
///     )
///     .build();
///
/// let delegate = DirectAccessor::new(
///     shape.clone(),
///     DynValue::new(Tag { label: "draft".to_owned() }),
/// )
/// .unwrap();
/// let mut accessor = InstantiatingAccessor::new(delegate, Instantiators::default());
///
/// let label = shape.property_named("label").unwrap();
/// accessor.put(label, String::from("final")).unwrap();
/// assert_eq!(accessor.instance().downcast_ref::<Tag>().unwrap().label, "final");
/// ```
pub struct InstantiatingAccessor<A = DirectAccessor> {
    delegate: A,
    instantiators: Instantiators,
}

impl<A: PropertyAccessor> InstantiatingAccessor<A> {
    /// Wraps `delegate`, drawing instantiation strategies from
    /// `instantiators`.
    pub fn new(delegate: A, instantiators: Instantiators) -> Self {
        Self {
            delegate,
            instantiators,
        }
    }

    /// The wrapped delegate.
    pub fn delegate(&self) -> &A {
        &self.delegate
    }
}

impl<A: PropertyAccessor> PropertyAccessor for InstantiatingAccessor<A> {
    fn get(&self, property: &Property) -> Result<DynValue, AccessError> {
        self.delegate.get(property)
    }

    fn set(&mut self, property: &Property, value: DynValue) -> Result<(), AccessError> {
        let owner = property.owner();

        if !property.is_immutable()
            || property.has_writer()
            || owner.flags().contains(ShapeFlags::SYNTHESIZED_COPY)
        {
            trace!(
                "write to `{}` on {} goes through the delegate",
                property.name(),
                owner.type_name()
            );
            return self.delegate.set(property, value);
        }

        let Some(ctor) = owner.reconstruction_ctor() else {
            return Err(AccessError::MissingConstructor {
                shape: owner.type_name(),
                property: Some(property.name().to_owned()),
            });
        };
        if ctor.params().iter().any(|param| param.name().is_none()) {
            return Err(AccessError::UnresolvableParameterNames {
                shape: owner.type_name(),
            });
        }

        trace!(
            "rebuilding {} to write `{}`",
            owner.type_name(),
            property.name()
        );

        let instantiator = self.instantiators.instantiator_for(&owner);
        let delegate = &self.delegate;
        let mut resolver = |param: &CtorParam| {
            let Some(name) = param.name() else {
                return Err(AccessError::UnresolvableParameterNames {
                    shape: owner.type_name(),
                });
            };
            if name == property.name() {
                return Ok(value.clone());
            }
            let current = owner
                .property_named(name)
                .map_err(|_| AccessError::UnknownProperty {
                    shape: owner.type_name(),
                    name: name.to_owned(),
                })?;
            delegate.get(current)
        };

        let fresh = instantiator.create(&owner, &mut resolver)?;
        self.delegate.replace_instance(fresh);
        Ok(())
    }

    fn instance(&self) -> &DynValue {
        self.delegate.instance()
    }

    fn replace_instance(&mut self, instance: DynValue) -> DynValue {
        self.delegate.replace_instance(instance)
    }

    fn into_instance(self) -> DynValue {
        self.delegate.into_instance()
    }
}

impl<A: fmt::Debug> fmt::Debug for InstantiatingAccessor<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstantiatingAccessor")
            .field("delegate", &self.delegate)
            .finish_non_exhaustive()
    }
}
