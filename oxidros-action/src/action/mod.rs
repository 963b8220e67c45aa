//! Action server.
//!
//! - [`Coordinator`] owns every goal and decides every state change;
//! - [`ActionServer`] runs a coordinator on a task, fed by the transport endpoints;
//! - [`GoalHandle`] is how execution logic reports back.

pub mod callbacks;
mod cancel;
pub mod coordinator;
pub mod handle;
pub mod registry;
pub mod results;
pub mod server;
mod status;

pub use callbacks::{ActionCallbacks, CancelResponse};
pub use coordinator::Coordinator;
pub use handle::{ActionServerHandle, GoalHandle, Mailbox};
pub use registry::{Goal, GoalRegistry, Transition};
pub use results::ResultStore;
pub use server::{ActionServer, TransportOutbox};
