use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

///
/// ConsistencyLevel
///
/// Replica acknowledgement requirement attached to every store operation.
///
/// This is a domain-level contract: the engine resolves and tags levels but
/// never interprets them; enforcement belongs to the store driver.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ConsistencyLevel {
    Any,
    One,
    Two,
    Three,
    Quorum,
    LocalQuorum,
    EachQuorum,
    All,
}

impl Display for ConsistencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Any => "ANY",
            Self::One => "ONE",
            Self::Two => "TWO",
            Self::Three => "THREE",
            Self::Quorum => "QUORUM",
            Self::LocalQuorum => "LOCAL_QUORUM",
            Self::EachQuorum => "EACH_QUORUM",
            Self::All => "ALL",
        };
        write!(f, "{label}")
    }
}

/// Resolve the effective consistency level for one operation.
///
/// Three-tier precedence, highest wins: the context-lifetime override, then
/// the per-property override, then the entity default. Pure and stateless;
/// never consults the store.
#[must_use]
pub const fn resolve(
    context_override: Option<ConsistencyLevel>,
    property_override: Option<ConsistencyLevel>,
    entity_default: ConsistencyLevel,
) -> ConsistencyLevel {
    match (context_override, property_override) {
        (Some(level), _) => level,
        (None, Some(level)) => level,
        (None, None) => entity_default,
    }
}

///
/// TESTS
///
