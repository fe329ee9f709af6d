//! Colonnade: a metadata-driven wide-column persistence engine.
//!
//! [`Session`] is the operational surface: register entity metadata once,
//! then persist, remove and load records through it, with optional
//! batching and per-context consistency overrides.

mod session;

pub use colonnade_core;
pub use session::Session;

pub mod prelude {
    pub use crate::Session;
    pub use colonnade_core::{
        db::{
            ConsistencyLevel, FlushState, PropertyState, PropertyValue, Record,
            store::memory::MemoryStore,
        },
        model::{
            entity::EntityMeta,
            property::{CascadeType, JoinMeta, MultiKeyMeta, PropertyKind, PropertyMeta},
            registry::SchemaRegistry,
        },
        value::{Value, ValueKind},
    };
}
