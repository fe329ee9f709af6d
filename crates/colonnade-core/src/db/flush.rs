use crate::{
    db::{
        consistency::ConsistencyLevel,
        mutation::Mutation,
        store::ColumnStore,
    },
    error::InternalError,
    obs::sink::{self, MetricsEvent},
};
use std::fmt::{self, Display};

///
/// FlushState
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FlushState {
    Idle,
    Batching,
    Flushed,
    Cleaned,
}

impl Display for FlushState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Batching => "batching",
            Self::Flushed => "flushed",
            Self::Cleaned => "cleaned",
        };
        write!(f, "{label}")
    }
}

///
/// FlushContext
///
/// One unit of work's write surface. Owns the pending mutation queue and
/// the context-lifetime consistency overrides; never the store itself.
/// Execution methods borrow the store per call, so a context can outlive
/// any one store borrow.
///
/// Not shared: one context per logical call chain, no internal locking.
///

#[derive(Debug)]
pub struct FlushContext {
    state: FlushState,
    pending: Vec<Mutation>,
    read_level: Option<ConsistencyLevel>,
    write_level: Option<ConsistencyLevel>,
}

impl Default for FlushContext {
    fn default() -> Self {
        Self::new()
    }
}

impl FlushContext {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: FlushState::Idle,
            pending: Vec::new(),
            read_level: None,
            write_level: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> FlushState {
        self.state
    }

    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub const fn read_level(&self) -> Option<ConsistencyLevel> {
        self.read_level
    }

    #[must_use]
    pub const fn write_level(&self) -> Option<ConsistencyLevel> {
        self.write_level
    }

    /// Set or clear the context-lifetime read override.
    pub const fn set_read_level(&mut self, level: Option<ConsistencyLevel>) {
        self.read_level = level;
    }

    /// Set or clear the context-lifetime write override.
    pub const fn set_write_level(&mut self, level: Option<ConsistencyLevel>) {
        self.write_level = level;
    }

    /// Begin accumulating mutations instead of executing them immediately.
    pub fn start_batch(&mut self) -> Result<(), InternalError> {
        match self.state {
            FlushState::Idle => {
                self.state = FlushState::Batching;
                Ok(())
            }
            state => Err(InternalError::flush_misuse(format!(
                "start_batch on a {state} context"
            ))),
        }
    }

    /// Route one mutation: immediate in `Idle`, queued in `Batching`.
    pub fn push<S: ColumnStore>(
        &mut self,
        store: &mut S,
        mutation: Mutation,
    ) -> Result<(), InternalError> {
        match self.state {
            FlushState::Idle => {
                store.apply(mutation)?;
                sink::record(MetricsEvent::MutationsApplied { count: 1 });
                Ok(())
            }
            FlushState::Batching => {
                self.pending.push(mutation);
                Ok(())
            }
            state => Err(InternalError::flush_misuse(format!(
                "write on a {state} context"
            ))),
        }
    }

    /// Route an ordered group of mutations, preserving their order.
    pub fn push_all<S: ColumnStore>(
        &mut self,
        store: &mut S,
        mutations: Vec<Mutation>,
    ) -> Result<(), InternalError> {
        for mutation in mutations {
            self.push(store, mutation)?;
        }
        Ok(())
    }

    /// Submit every pending mutation as one store submission, in insertion
    /// order.
    ///
    /// A store failure aborts the remainder of the submission and
    /// surfaces the error; the context still transitions to `Flushed`.
    /// Already-submitted mutations are not rolled back; the store's own
    /// atomicity is the ceiling of the guarantee here.
    pub fn flush<S: ColumnStore>(&mut self, store: &mut S) -> Result<(), InternalError> {
        if self.state != FlushState::Batching {
            return Err(InternalError::flush_misuse(format!(
                "flush on a {} context",
                self.state
            )));
        }

        let pending = std::mem::take(&mut self.pending);
        let count = pending.len() as u64;
        self.state = FlushState::Flushed;

        store.apply_batch(pending)?;
        sink::record(MetricsEvent::BatchFlushed { mutations: count });

        Ok(())
    }

    /// Reset batch bookkeeping; the context is reusable for a new unit of
    /// work. Idempotent from `Idle` and `Flushed`.
    pub fn end_batch(&mut self) -> Result<(), InternalError> {
        match self.state {
            FlushState::Idle | FlushState::Flushed => {
                self.state = FlushState::Idle;
                Ok(())
            }
            state => Err(InternalError::flush_misuse(format!(
                "end_batch on a {state} context"
            ))),
        }
    }

    /// Release overrides and discard unflushed mutations. Terminal.
    pub fn clean_up(&mut self) {
        self.pending.clear();
        self.read_level = None;
        self.write_level = None;
        self.state = FlushState::Cleaned;
    }
}

///
/// TESTS
///
