//! One-shot pickup tickets gating the return of a rental.

pub mod gate;

pub use gate::{Ticket, TicketGate, TicketRejection};
