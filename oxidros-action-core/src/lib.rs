//! Core traits and types for oxidros action servers.
//!
//! This crate holds everything an action server and its transport have to agree on,
//! without depending on any specific middleware:
//!
//! - [`msg`] - goal ids, goal info, status snapshots, cancel and result shapes
//! - [`action`] - the goal status state machine
//! - [`api`] - the action descriptor and the transport/outbox traits
//! - [`qos`] - QoS profiles for the action endpoints and topics
//! - [`names`] - action name validation and derived service/topic names

pub mod action;
pub mod api;
pub mod error;
pub mod msg;
pub mod names;
pub mod qos;
pub mod time;

// Re-export commonly used error types
pub use error::{DynError, Error, Result};

pub use action::GoalStatus;
pub use api::{
    ActionDescriptor, ActionOutbox, ActionReply, ActionRequest, ActionTransport, GoalDecision,
    RosEndpoint, RosPublisher,
};
pub use msg::{
    CancelGoalRequest, CancelGoalResponse, CancelReturnCode, FeedbackMessage, GoalId, GoalInfo,
    GoalStatusArray, GoalStatusEntry, RequestId, ResultResponse,
};
pub use names::ActionNames;
pub use qos::{DurabilityPolicy, HistoryPolicy, Profile, ReliabilityPolicy};
pub use time::Time;
