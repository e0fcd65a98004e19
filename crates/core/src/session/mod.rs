//! Session directory selection and credential trust checks.

mod resolver;
mod validator;

pub use resolver::{SessionPathResolver, TIMESTAMP_FORMAT};
pub use validator::{SessionValidator, SessionVerdict, ValidationReport};
