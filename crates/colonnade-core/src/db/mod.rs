//! Engine layer: the codecs, consistency resolution, mutation vocabulary,
//! flush/batch lifecycle and the persist/remove/load walkers.

pub mod codec;
pub mod composite;
pub mod consistency;
pub mod flush;
pub mod load;
pub mod mutation;
pub mod persist;
pub mod record;
pub mod remove;
pub mod store;

pub use consistency::ConsistencyLevel;
pub use flush::{FlushContext, FlushState};
pub use load::Loader;
pub use mutation::{Mutation, MutationOp, RowKey, TableName};
pub use persist::Persister;
pub use record::{PropertyState, PropertyValue, Record};
pub use remove::Remover;
pub use store::{ColumnStore, StoreError};
