use std::any::type_name;
use std::sync::Arc;

use eyre::Result;
use molt::{
    AccessError, DirectAccessor, DynValue, EntityShape, Property, PropertyAccessor, PropertyError,
};

#[derive(Clone, Debug, PartialEq)]
struct Sensor {
    id: u32,
    reading: f64,
}

fn sensor_shape() -> Arc<EntityShape> {
    EntityShape::builder::<Sensor>()
        .property(
            Property::builder("id")
                .immutable()
                .getter(|s: &Sensor| s.id),
        )
        .property(
            Property::builder("reading")
                .getter(|s: &Sensor| s.reading)
                .setter(|s: &mut Sensor, reading: f64| s.reading = reading),
        )
        .property(Property::builder("sealed"))
        .build()
}

fn sensor() -> Sensor {
    Sensor {
        id: 1,
        reading: 0.5,
    }
}

#[test]
fn construction_requires_a_matching_instance() {
    molt_testhelpers::setup();

    let err = DirectAccessor::new(sensor_shape(), DynValue::new(5_u8)).unwrap_err();
    assert_eq!(
        err,
        AccessError::WrongShape {
            expected: type_name::<Sensor>(),
            actual: type_name::<u8>(),
        }
    );
}

#[test]
fn reads_and_writes_pass_straight_through() -> Result<()> {
    molt_testhelpers::setup();

    let shape = sensor_shape();
    let mut accessor = DirectAccessor::new(shape.clone(), DynValue::new(sensor()))?;

    let reading = shape.property_named("reading")?;
    assert_eq!(accessor.get_as::<f64>(reading)?, 0.5);

    accessor.put(reading, 2.25_f64)?;
    assert_eq!(accessor.get_as::<f64>(reading)?, 2.25);
    Ok(())
}

#[test]
fn flags_do_not_gate_the_direct_path() {
    // Immutable here means "no in-place mutation on the domain type"; an
    // immutable property can still carry a wither, and the direct accessor
    // applies whatever the vtable offers.
    #[derive(Clone, Debug, PartialEq)]
    struct Label {
        text: String,
    }

    let shape = EntityShape::builder::<Label>()
        .property(
            Property::builder("text")
                .immutable()
                .getter(|l: &Label| l.text.clone())
                .wither(|l: &Label, text: String| Label { text, ..l.clone() }),
        )
        .build();

    let mut accessor = DirectAccessor::new(
        shape.clone(),
        DynValue::new(Label {
            text: "old".to_owned(),
        }),
    )
    .unwrap();

    accessor
        .put(shape.property_named("text").unwrap(), "new".to_owned())
        .unwrap();
    assert_eq!(
        accessor.instance().downcast_ref::<Label>().unwrap().text,
        "new"
    );
}

#[test]
fn foreign_properties_are_unknown() {
    molt_testhelpers::setup();

    #[derive(Clone, Debug, PartialEq)]
    struct Gauge {
        level: u8,
    }

    let gauge_shape = EntityShape::builder::<Gauge>()
        .property(Property::builder("level").getter(|g: &Gauge| g.level))
        .build();
    let level = gauge_shape.property_named("level").unwrap();

    let accessor = DirectAccessor::new(sensor_shape(), DynValue::new(sensor())).unwrap();
    let err = accessor.get(level).unwrap_err();
    assert_eq!(
        err,
        AccessError::UnknownProperty {
            shape: type_name::<Sensor>(),
            name: "level".to_owned(),
        }
    );
}

#[test]
fn slots_without_accessors_surface_property_errors() {
    let shape = sensor_shape();
    let mut accessor = DirectAccessor::new(shape.clone(), DynValue::new(sensor())).unwrap();
    let sealed = shape.property_named("sealed").unwrap();

    assert_eq!(
        accessor.get(sealed).unwrap_err(),
        AccessError::Property {
            shape: type_name::<Sensor>(),
            property: "sealed".to_owned(),
            source: PropertyError::NotReadable,
        }
    );
    assert_eq!(
        accessor.put(sealed, 1_u8).unwrap_err(),
        AccessError::Property {
            shape: type_name::<Sensor>(),
            property: "sealed".to_owned(),
            source: PropertyError::NotWritable,
        }
    );
}

#[test]
fn mismatched_downcasts_carry_property_context() {
    let shape = sensor_shape();
    let accessor = DirectAccessor::new(shape.clone(), DynValue::new(sensor())).unwrap();

    let err = accessor
        .get_as::<String>(shape.property_named("id").unwrap())
        .unwrap_err();
    assert!(matches!(
        err,
        AccessError::Property {
            source: PropertyError::TypeMismatch { .. },
            ..
        }
    ));
}

#[test]
fn instances_can_be_replaced_and_released() {
    let shape = sensor_shape();
    let mut accessor = DirectAccessor::new(shape.clone(), DynValue::new(sensor())).unwrap();

    let previous = accessor.replace_instance(DynValue::new(Sensor {
        id: 2,
        reading: 1.5,
    }));
    assert_eq!(previous.take::<Sensor>().unwrap().id, 1);
    assert_eq!(accessor.instance().downcast_ref::<Sensor>().unwrap().id, 2);

    let released = accessor.into_instance();
    assert_eq!(released.take::<Sensor>().unwrap().id, 2);
}
