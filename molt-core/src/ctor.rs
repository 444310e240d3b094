use core::any;
use core::fmt;

use alloc::sync::Arc;

use crate::DynValue;

/// A single parameter of a reconstruction constructor.
///
/// Parameters are matched to properties by name. A parameter without a name
/// can never be resolved, which accessors report before attempting any
/// instantiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CtorParam {
    name: Option<String>,
}

impl CtorParam {
    /// A parameter resolvable by property name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }

    /// A parameter whose name was not retained by the front end.
    pub fn unnamed() -> Self {
        Self { name: None }
    }

    /// The parameter name, if one was retained.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Instantiates an entity from resolved constructor arguments.
pub type CreateFn = Arc<dyn Fn(CtorArgs) -> Result<DynValue, CtorError> + Send + Sync>;

/// Positional arguments handed to a [`CreateFn`].
///
/// Each argument can be taken exactly once, in any order.
#[derive(Debug)]
pub struct CtorArgs {
    values: Vec<Option<DynValue>>,
}

impl CtorArgs {
    fn new(values: Vec<DynValue>) -> Self {
        Self {
            values: values.into_iter().map(Some).collect(),
        }
    }

    /// The number of arguments, taken or not.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the constructor takes no arguments.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Moves the argument at `index` out as a `T`.
    pub fn take<T: 'static>(&mut self, index: usize) -> Result<T, CtorError> {
        let len = self.values.len();
        let Some(slot) = self.values.get_mut(index) else {
            return Err(CtorError::WrongArity {
                expected: index + 1,
                actual: len,
            });
        };
        let Some(value) = slot.take() else {
            return Err(CtorError::Failed {
                reason: format!("argument {index} was already taken"),
            });
        };
        let actual = value.type_name();
        value.take::<T>().map_err(|_| CtorError::Argument {
            index,
            expected: any::type_name::<T>(),
            actual,
        })
    }
}

/// Errors produced while instantiating an entity through its reconstruction
/// constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CtorError {
    /// The number of resolved arguments did not match the declared parameter
    /// count.
    WrongArity {
        /// How many arguments the constructor declares.
        expected: usize,
        /// How many arguments were supplied.
        actual: usize,
    },

    /// An argument had a different type than the parameter it was bound to.
    Argument {
        /// Position of the offending argument.
        index: usize,
        /// The type the constructor asked for.
        expected: &'static str,
        /// The type the argument actually had.
        actual: &'static str,
    },

    /// The constructor produced a value of a type other than the one its
    /// shape describes.
    WrongResultType {
        /// The type the shape describes.
        expected: &'static str,
        /// The type the constructor returned.
        actual: &'static str,
    },

    /// The constructor rejected its arguments.
    Failed {
        /// A front-end supplied description of the failure.
        reason: String,
    },
}

impl fmt::Display for CtorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CtorError::WrongArity { expected, actual } => {
                write!(
                    f,
                    "Wrong arity: constructor takes {} arguments, but got {}",
                    expected, actual
                )
            }
            CtorError::Argument {
                index,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Argument {} has the wrong type: expected {}, but got {}",
                    index, expected, actual
                )
            }
            CtorError::WrongResultType { expected, actual } => {
                write!(
                    f,
                    "Constructor returned the wrong type: expected {}, but got {}",
                    expected, actual
                )
            }
            CtorError::Failed { reason } => write!(f, "Constructor failed: {}", reason),
        }
    }
}

impl core::error::Error for CtorError {}

/// A constructor that rebuilds an entity from one value per parameter.
///
/// Shapes of immutable entities register one of these so that accessors can
/// produce an updated instance instead of mutating in place.
#[derive(Clone)]
pub struct ReconstructionCtor {
    params: Vec<CtorParam>,
    create: CreateFn,
}

impl ReconstructionCtor {
    /// Starts building a constructor.
    pub fn builder() -> ReconstructionCtorBuilder {
        ReconstructionCtorBuilder {
            params: Vec::new(),
            create: None,
        }
    }

    /// The declared parameters, in call order.
    pub fn params(&self) -> &[CtorParam] {
        &self.params
    }

    /// The number of declared parameters.
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Runs the constructor over one resolved value per parameter.
    ///
    /// The arity is checked here, before the registered [`CreateFn`] runs.
    pub fn instantiate(&self, values: Vec<DynValue>) -> Result<DynValue, CtorError> {
        if values.len() != self.params.len() {
            return Err(CtorError::WrongArity {
                expected: self.params.len(),
                actual: values.len(),
            });
        }
        (self.create)(CtorArgs::new(values))
    }
}

impl fmt::Debug for ReconstructionCtor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReconstructionCtor")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ReconstructionCtor`].
pub struct ReconstructionCtorBuilder {
    params: Vec<CtorParam>,
    create: Option<CreateFn>,
}

impl ReconstructionCtorBuilder {
    /// Appends a named parameter.
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(CtorParam::named(name));
        self
    }

    /// Appends a parameter whose name is not known.
    pub fn unnamed_param(mut self) -> Self {
        self.params.push(CtorParam::unnamed());
        self
    }

    /// Registers the function that actually builds the entity.
    pub fn create(
        mut self,
        create: impl Fn(CtorArgs) -> Result<DynValue, CtorError> + Send + Sync + 'static,
    ) -> Self {
        self.create = Some(Arc::new(create));
        self
    }

    /// Finishes the constructor.
    ///
    /// # Panics
    ///
    /// Panics if no create function was registered.
    pub fn build(self) -> ReconstructionCtor {
        ReconstructionCtor {
            params: self.params,
            create: self
                .create
                .expect("reconstruction constructor has no create function"),
        }
    }
}

impl From<ReconstructionCtorBuilder> for ReconstructionCtor {
    fn from(builder: ReconstructionCtorBuilder) -> Self {
        builder.build()
    }
}
