//! Venue hierarchy: Event, Table, and Seat aggregates, their repositories,
//! and the `VenueService` that enforces parent-existence and uniqueness
//! invariants over them.

pub mod event;
pub mod repo;
pub mod seat;
pub mod service;
pub mod table;

pub use event::Event;
pub use repo::{EventRepository, SeatRepository, TableRepository};
pub use seat::Seat;
pub use service::VenueService;
pub use table::{mint_qr_token, Table};
