//! Specimen Idioms (specimen-idioms)
//!
//! Guard-clause verification: drive members with deliberately invalid
//! input and report every one that fails to reject it.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use specimen_idioms::prelude::*;
//!
//! let fixture = Fixture::new(catalog);
//! GuardClauseAssertion::for_fixture(&fixture)?.verify_type(&TypeRef::named("Account"))?;
//! ```

pub mod assertion;
pub mod command;
pub mod error;
pub mod invalid_value;

pub use assertion::GuardClauseAssertion;
pub use command::{GuardClauseCommand, MethodInvokeCommand, PropertySetCommand, UnwrappingCommand};
pub use error::{GuardClauseDefect, GuardClauseError, ProbeOutcome, Result};
pub use invalid_value::{
    default_invalid_values, EmptyStringInvalidValue, EmptyUuidInvalidValue, InvalidValue,
    InvalidValueRef, NullReferenceInvalidValue,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::assertion::GuardClauseAssertion;
    pub use crate::error::{GuardClauseDefect, GuardClauseError, ProbeOutcome};
    pub use crate::invalid_value::{
        EmptyStringInvalidValue, EmptyUuidInvalidValue, InvalidValue, NullReferenceInvalidValue,
    };
    pub use specimen_fixture::prelude::*;
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
