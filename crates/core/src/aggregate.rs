//! Aggregate traits for the domain model.
//!
//! Aggregates here are not event-sourced: state is persisted as a single
//! current-state row per entity. The command/event split still buys us pure,
//! unit-testable state transitions — `handle` decides what *would* happen
//! (returning facts as events, without mutating anything), `apply` folds
//! those facts into the in-memory aggregate so the caller can persist the
//! resulting snapshot.

/// Aggregate root marker + minimal interface.
///
/// Intentionally small so domain modules can decide how they model state
/// transitions without bringing in any infrastructure concerns.
pub trait AggregateRoot {
    /// Strongly-typed aggregate identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the aggregate identifier.
    fn id(&self) -> &Self::Id;

    /// Monotonically increasing version of the aggregate's state.
    ///
    /// Incremented once per applied event; used only for in-process
    /// optimistic checks, not persisted as a stream position.
    fn version(&self) -> u64;
}

/// An aggregate that handles commands by producing events, and folds events
/// back into its own state.
///
/// `handle` must be pure: no IO, no side effects, deterministic given `self`
/// and the command. `apply` must be infallible: by the time an event exists,
/// the invariant checks that justified it have already passed.
pub trait Aggregate: AggregateRoot {
    type Command;
    type Event;
    type Error;

    /// Validate `command` against the current state and compute the events
    /// that would result, without mutating `self`.
    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error>;

    /// Fold a single event into the aggregate's state.
    fn apply(&mut self, event: &Self::Event);
}
