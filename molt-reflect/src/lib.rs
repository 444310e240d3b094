#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

extern crate alloc;

#[cfg(feature = "log")]
macro_rules! trace {
    ($($tt:tt)*) => {
        ::log::trace!($($tt)*)
    };
}

#[cfg(not(feature = "log"))]
macro_rules! trace {
    ($($tt:tt)*) => {};
}

mod access;
pub use access::*;

mod direct;
pub use direct::*;

mod error;
pub use error::*;

mod instantiating;
pub use instantiating::*;

mod instantiator;
pub use instantiator::*;
