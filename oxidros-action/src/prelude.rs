//! Prelude module for convenient imports.
//!
//! ```ignore
//! use oxidros_action::prelude::*;
//! ```

pub use oxidros_action_core::error::{DynError, Error, Result};

pub use oxidros_action_core::{
    ActionDescriptor, ActionNames, ActionOutbox, ActionReply, ActionRequest, ActionTransport,
    CancelGoalRequest, CancelGoalResponse, CancelReturnCode, FeedbackMessage, GoalId, GoalInfo,
    GoalStatus, GoalStatusArray, Profile, RequestId, ResultResponse, Time,
};

pub use crate::action::{
    ActionCallbacks, ActionServer, ActionServerHandle, CancelResponse, Coordinator, GoalHandle,
};
pub use crate::logger::init_action_logging;
pub use crate::options::{ServerOptions, ServerQosOption};
