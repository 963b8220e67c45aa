//! Server side of the ROS2 action protocol.
//!
//! An action is a long-running goal with feedback, a final result, and cancellation.
//! This crate tracks accepted goals, reconciles result requests with results produced
//! by execution logic, runs the two-phase cancellation protocol, and publishes a full
//! status snapshot after every state change.
//!
//! The server is transport-agnostic: it needs an
//! [`ActionTransport`](oxidros_action_core::ActionTransport) to receive requests and
//! publish topics, an [`ActionDescriptor`](oxidros_action_core::ActionDescriptor) for
//! the concrete message shapes, and user [`ActionCallbacks`](action::ActionCallbacks).
//!
//! # Example
//!
//! ```ignore
//! use oxidros_action::prelude::*;
//!
//! init_action_logging("fibonacci_server");
//! let options = ServerOptions::from_yaml_file("params.yaml", "fibonacci_server")?;
//! let server = ActionServer::new(transport, Fibonacci, FibonacciCallbacks, options)?;
//! let handle = server.handle();
//! server.spawn();
//! ```

pub mod action;
pub mod logger;
pub mod options;
pub mod prelude;

// Re-export core types and traits
pub use oxidros_action_core::{self, error};
