//! Centralized error type for the stagebox umbrella crate.
//!
//! Wraps the core error so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] stagebox_core::Error),

    #[error("Chain has no nodes")]
    EmptyChain,
}

impl Error {
    /// The wrapped core error, if any.
    pub fn core(&self) -> Option<&stagebox_core::Error> {
        match self {
            Error::Core(e) => Some(e),
            Error::EmptyChain => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
