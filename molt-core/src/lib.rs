#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

extern crate alloc;

mod value;
pub use value::*;

mod property;
pub use property::*;

mod ctor;
pub use ctor::*;

mod shape;
pub use shape::*;

mod registry;
pub use registry::*;
