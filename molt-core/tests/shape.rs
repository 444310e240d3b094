use std::sync::Arc;

use molt_core::{
    DynValue, EntityShape, Property, PropertyError, PropertyFlags, ReconstructionCtor, ShapeFlags,
    ShapeRegistry,
};

#[derive(Clone, Debug, PartialEq)]
struct Channel {
    name: String,
    capacity: usize,
}

fn channel_shape() -> Arc<EntityShape> {
    EntityShape::builder::<Channel>()
        .property(
            Property::builder("name")
                .immutable()
                .getter(|c: &Channel| c.name.clone()),
        )
        .property(
            Property::builder("capacity")
                .getter(|c: &Channel| c.capacity)
                .setter(|c: &mut Channel, capacity: usize| c.capacity = capacity),
        )
        .build()
}

#[test]
fn lookup_finds_declared_properties() {
    molt_testhelpers::setup();

    let shape = channel_shape();

    let name = shape.property_named("name").unwrap();
    assert_eq!(name.name(), "name");
    assert_eq!(name.flags(), PropertyFlags::IMMUTABLE);
    assert!(name.is_immutable());
    assert!(name.has_getter());
    assert!(!name.has_writer());

    let capacity = shape.property_named("capacity").unwrap();
    assert!(!capacity.is_immutable());
    assert!(capacity.has_setter());
    assert!(!capacity.has_wither());

    assert_eq!(
        shape.property_named("backlog").unwrap_err(),
        PropertyError::NoSuchProperty
    );
}

#[test]
fn properties_keep_declaration_order() {
    let shape = channel_shape();
    let names: Vec<&str> = shape.properties().iter().map(Property::name).collect();
    assert_eq!(names, ["name", "capacity"]);
}

#[test]
fn adopted_properties_point_back_at_their_shape() {
    let shape = channel_shape();
    let owner = shape.property_named("name").unwrap().owner();
    assert!(Arc::ptr_eq(&owner, &shape));
}

#[test]
#[should_panic(expected = "duplicate property")]
fn duplicate_property_names_panic() {
    let _ = EntityShape::builder::<Channel>()
        .property(Property::builder("name").getter(|c: &Channel| c.name.clone()))
        .property(Property::builder("name").getter(|c: &Channel| c.name.clone()))
        .build();
}

#[test]
fn getters_and_setters_drive_the_erased_instance() {
    molt_testhelpers::setup();

    let shape = channel_shape();
    let mut instance = DynValue::new(Channel {
        name: "jobs".to_owned(),
        capacity: 16,
    });

    let capacity = shape.property_named("capacity").unwrap();
    let read = capacity.read(&instance).unwrap();
    assert_eq!(read.take::<usize>().unwrap(), 16);

    capacity
        .write(&mut instance, DynValue::new(32_usize))
        .unwrap();
    assert_eq!(instance.downcast_ref::<Channel>().unwrap().capacity, 32);
}

#[test]
fn a_wither_replaces_the_instance_wholesale() {
    let property = Property::builder("name")
        .immutable()
        .getter(|c: &Channel| c.name.clone())
        .wither(|c: &Channel, name: String| Channel { name, ..c.clone() })
        .build();

    let mut instance = DynValue::new(Channel {
        name: "jobs".to_owned(),
        capacity: 16,
    });
    property
        .write(&mut instance, DynValue::new("mail".to_owned()))
        .unwrap();

    let channel = instance.downcast_ref::<Channel>().unwrap();
    assert_eq!(channel.name, "mail");
    assert_eq!(channel.capacity, 16);
}

#[test]
fn missing_accessors_are_reported() {
    let property = Property::builder("opaque").build();
    let mut instance = DynValue::new(Channel {
        name: "jobs".to_owned(),
        capacity: 16,
    });

    assert_eq!(
        property.read(&instance).unwrap_err(),
        PropertyError::NotReadable
    );
    assert_eq!(
        property
            .write(&mut instance, DynValue::new(1_u8))
            .unwrap_err(),
        PropertyError::NotWritable
    );
}

#[test]
fn setter_rejects_values_of_the_wrong_type() {
    let shape = channel_shape();
    let capacity = shape.property_named("capacity").unwrap();
    let mut instance = DynValue::new(Channel {
        name: "jobs".to_owned(),
        capacity: 16,
    });

    let err = capacity
        .write(&mut instance, DynValue::new("nope".to_owned()))
        .unwrap_err();
    assert!(matches!(err, PropertyError::TypeMismatch { .. }));
    assert_eq!(instance.downcast_ref::<Channel>().unwrap().capacity, 16);
}

#[test]
fn shapes_recognize_their_instances() {
    let shape = channel_shape();
    assert!(shape.is_instance(&DynValue::new(Channel {
        name: "jobs".to_owned(),
        capacity: 1,
    })));
    assert!(!shape.is_instance(&DynValue::new(3_u8)));
}

#[test]
fn flag_sets_render_their_names() {
    assert_eq!(PropertyFlags::EMPTY.to_string(), "none");
    assert_eq!(PropertyFlags::IMMUTABLE.to_string(), "immutable");
    assert_eq!(ShapeFlags::EMPTY.to_string(), "none");
    assert_eq!(ShapeFlags::SYNTHESIZED_COPY.to_string(), "synthesized_copy");
}

#[test]
fn shapes_surface_their_reconstruction_constructor() {
    let shape = EntityShape::builder::<Channel>()
        .property(
            Property::builder("name")
                .immutable()
                .getter(|c: &Channel| c.name.clone()),
        )
        .reconstruction_ctor(ReconstructionCtor::builder().param("name").create(
            |mut args| {
                Ok(DynValue::new(Channel {
                    name: args.take(0)?,
                    capacity: 0,
                }))
            },
        ))
        .build();

    let ctor = shape.reconstruction_ctor().unwrap();
    assert_eq!(ctor.arity(), 1);
    assert_eq!(ctor.params()[0].name(), Some("name"));

    assert!(channel_shape().reconstruction_ctor().is_none());
}

#[test]
fn registries_index_shapes_by_type() {
    molt_testhelpers::setup();

    let mut registry = ShapeRegistry::new();
    assert!(registry.is_empty());

    let shape = channel_shape();
    assert!(registry.register(shape.clone()).is_none());
    assert_eq!(registry.len(), 1);

    let found = registry.shape_for::<Channel>().unwrap();
    assert!(Arc::ptr_eq(found, &shape));

    let value = DynValue::new(Channel {
        name: "jobs".to_owned(),
        capacity: 1,
    });
    assert!(registry.shape_of(&value).is_some());
    assert!(registry.shape_for::<u8>().is_none());

    let previous = registry.register(channel_shape()).unwrap();
    assert!(Arc::ptr_eq(&previous, &shape));
}
