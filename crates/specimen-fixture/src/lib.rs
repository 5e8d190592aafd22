//! Specimen Fixture (specimen-fixture)
//!
//! Ready-to-use resolution root on top of `specimen-kernel`:
//! 1. **Engine**: primitive generators, relays and a constructor invoker
//! 2. **Customizations**: freeze, inject, factories and constructor choice
//! 3. **Composers**: per-type recipes refined without touching earlier ones
//! 4. **Behaviors**: recursion handling and tracing applied to the whole graph
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use specimen_fixture::prelude::*;
//!
//! let mut fixture = Fixture::new(catalog);
//! let id = fixture.freeze(&TypeRef::uuid())?;
//! let order = fixture.create(&TypeRef::named("Order"))?;
//! ```

// Configuration
pub mod config;
pub mod error;

// Engine
pub mod auto_properties;
pub mod engine;
pub mod generators;
pub mod relays;

// Root
pub mod composer;
pub mod customization;
pub mod fixture;

pub use composer::NodeComposer;
pub use config::{FixtureConfig, RecursionPolicy};
pub use customization::{
    CompositeCustomization, ConstructorCustomization, Customization, FactoryCustomization,
    FreezingCustomization, InjectCustomization,
};
pub use error::{ConfigError, FixtureError, Result};
pub use fixture::Fixture;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::composer::NodeComposer;
    pub use crate::config::{FixtureConfig, RecursionPolicy};
    pub use crate::customization::{
        CompositeCustomization, ConstructorCustomization, Customization, FactoryCustomization,
        FreezingCustomization, InjectCustomization,
    };
    pub use crate::error::{ConfigError, FixtureError};
    pub use crate::fixture::Fixture;
    pub use specimen_kernel::prelude::*;
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
