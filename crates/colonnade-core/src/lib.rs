//! Core runtime for Colonnade: the property metadata model, the composite
//! column codec, consistency resolution, the flush/batch context, and the
//! persist/remove/load walkers that turn records into store mutations.
#![warn(unreachable_pub)]

pub mod db;
pub mod error;
pub mod model;
pub mod obs;
pub mod serialize;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// CONSTANTS
///

/// Maximum number of components a composite column name may carry.
///
/// This bounds compound wide-map keys and keeps encoded names within
/// predictable, storable sizes.
pub const MAX_COMPOSITE_COMPONENTS: usize = 8;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, stores, serializers, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        db::{
            consistency::ConsistencyLevel,
            record::{PropertyValue, Record},
        },
        model::{entity::EntityMeta, property::PropertyMeta, registry::SchemaRegistry},
        value::Value,
    };
}
