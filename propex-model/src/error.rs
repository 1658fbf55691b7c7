use std::fmt::{self, Display};

/// Errors produced by model constructors and parsing routines.
#[derive(Debug)]
pub enum ModelError {
    UnknownListingType(String),
    UnknownPropertyType(String),
    UnknownSortDirection(String),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::UnknownListingType(value) => {
                write!(f, "unknown listing type: {value}")
            }
            ModelError::UnknownPropertyType(value) => {
                write!(f, "unknown property type: {value}")
            }
            ModelError::UnknownSortDirection(value) => {
                write!(f, "unknown sort direction: {value}")
            }
        }
    }
}

impl std::error::Error for ModelError {}

pub type Result<T> = std::result::Result<T, ModelError>;
