use molt_core::{CtorError, PropertyError};
use owo_colors::OwoColorize;

/// Errors surfaced by property accessors.
#[derive(Debug, PartialEq, Clone)]
#[non_exhaustive]
pub enum AccessError {
    /// A name failed to resolve on the owning shape: either a write targeted
    /// a property the shape does not declare, or a constructor parameter
    /// matched no property.
    UnknownProperty {
        /// The shape the lookup ran against.
        shape: &'static str,
        /// The name that failed to resolve.
        name: String,
    },

    /// An immutable property had no way to take a new value: no setter, no
    /// wither, and no reconstruction constructor on the owning shape.
    MissingConstructor {
        /// The shape that lacks a reconstruction constructor.
        shape: &'static str,
        /// The property the write targeted, when the failure surfaced
        /// through an accessor.
        property: Option<String>,
    },

    /// The reconstruction constructor has at least one parameter without a
    /// name, so its arguments can never be resolved against properties.
    UnresolvableParameterNames {
        /// The shape whose constructor is unusable.
        shape: &'static str,
    },

    /// The reconstruction constructor ran and failed.
    Instantiation {
        /// The shape being rebuilt.
        shape: &'static str,
        /// What went wrong inside the constructor.
        source: CtorError,
    },

    /// A property slot rejected a read or a write.
    Property {
        /// The shape the property belongs to.
        shape: &'static str,
        /// The property involved.
        property: String,
        /// The slot-level failure.
        source: PropertyError,
    },

    /// An accessor was handed an instance of a type its shape does not
    /// describe.
    WrongShape {
        /// The type the shape describes.
        expected: &'static str,
        /// The type of the instance.
        actual: &'static str,
    },
}

impl core::fmt::Display for AccessError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AccessError::UnknownProperty { shape, name } => {
                write!(
                    f,
                    "No property named '{}' on {}",
                    name.yellow(),
                    shape.blue()
                )
            }
            AccessError::MissingConstructor {
                shape,
                property: Some(property),
            } => {
                write!(
                    f,
                    "Cannot set property '{}': no setter, wither or reconstruction constructor exists for {}",
                    property.yellow(),
                    shape.blue()
                )
            }
            AccessError::MissingConstructor {
                shape,
                property: None,
            } => {
                write!(
                    f,
                    "No reconstruction constructor exists for {}",
                    shape.blue()
                )
            }
            AccessError::UnresolvableParameterNames { shape } => {
                write!(
                    f,
                    "Cannot resolve parameter names of the reconstruction constructor of {}",
                    shape.blue()
                )
            }
            AccessError::Instantiation { shape, source } => {
                write!(f, "Failed to rebuild {}: {}", shape.blue(), source.red())
            }
            AccessError::Property {
                shape,
                property,
                source,
            } => {
                write!(
                    f,
                    "Property '{}' on {}: {}",
                    property.yellow(),
                    shape.blue(),
                    source
                )
            }
            AccessError::WrongShape { expected, actual } => {
                write!(
                    f,
                    "Wrong instance type: expected {}, but got {}",
                    expected.green(),
                    actual.red()
                )
            }
        }
    }
}

impl core::error::Error for AccessError {}
