//! The action coordinator: sole owner of goal state.
//!
//! The coordinator is a plain synchronous state machine. [`ActionServer`] drives it
//! from a single task, which is what serializes client requests and execution
//! notifications; tests can drive it directly.
//!
//! [`ActionServer`]: super::server::ActionServer

use super::{
    callbacks::ActionCallbacks,
    handle::{ActionServerHandle, Command, Mailbox},
    registry::GoalRegistry,
    results::ResultStore,
};
use oxidros_action_core::{
    ActionDescriptor, ActionOutbox, ActionReply, ActionRequest, GoalDecision, GoalId, GoalStatus,
    RequestId, ResultResponse, Time,
};
use std::{
    ops::ControlFlow,
    time::{Duration, Instant},
};
use tracing::{debug, error, info, warn};

/// Goal registry, result store and collaborators of one action server.
///
/// Every method runs to completion without blocking; callbacks and the outbox are
/// called inline.
pub struct Coordinator<A: ActionDescriptor, C, O> {
    pub(super) descriptor: A,
    pub(super) callbacks: C,
    pub(super) outbox: O,
    pub(super) handle: ActionServerHandle<A>,
    pub(super) registry: GoalRegistry,
    pub(super) results: ResultStore<A::Result>,
    pub(super) result_timeout: Duration,
}

impl<A, C, O> Coordinator<A, C, O>
where
    A: ActionDescriptor,
    C: ActionCallbacks<A>,
    O: ActionOutbox<A>,
{
    /// Create a coordinator.
    ///
    /// `handle` is given to accepted goals; it should feed the mailbox this coordinator
    /// is driven from. A zero `result_timeout` disables expiry.
    pub fn new(
        descriptor: A,
        callbacks: C,
        outbox: O,
        handle: ActionServerHandle<A>,
        result_timeout: Duration,
    ) -> Self {
        Self {
            descriptor,
            callbacks,
            outbox,
            handle,
            registry: GoalRegistry::new(),
            results: ResultStore::new(),
            result_timeout,
        }
    }

    pub fn registry(&self) -> &GoalRegistry {
        &self.registry
    }

    pub fn results(&self) -> &ResultStore<A::Result> {
        &self.results
    }

    // ------------------------------------------------------------------------
    // Request router
    // ------------------------------------------------------------------------

    /// Classify and handle a client request.
    ///
    /// Returns `None` when there is no synchronous reply: the request is either
    /// waiting for a result or asks about an unknown goal.
    pub fn handle_request(
        &mut self,
        request_id: RequestId,
        request: A::Request,
    ) -> Option<ActionReply<A>> {
        match self.descriptor.classify(request) {
            ActionRequest::SendGoal(goal) => Some(self.handle_goal_request(goal)),
            ActionRequest::GetResult(goal_id) => self
                .handle_result_request(goal_id, request_id)
                .map(ActionReply::Result),
            ActionRequest::CancelGoal(req) => {
                Some(ActionReply::Cancel(self.handle_cancel_request(&req)))
            }
            ActionRequest::Unrecognized(why) => {
                warn!(%request_id, "unrecognized request: {why}");
                Some(ActionReply::Error(format!("unrecognized request: {why}")))
            }
        }
    }

    // ------------------------------------------------------------------------
    // Goal submission
    // ------------------------------------------------------------------------

    /// Handle a goal submission.
    ///
    /// On acceptance the goal is started before it is registered and published.
    pub fn handle_goal_request(&mut self, goal: A::Goal) -> ActionReply<A> {
        let goal_id = self.descriptor.goal_id(&goal);
        if self.registry.contains(&goal_id) {
            warn!(%goal_id, "goal id already in use, submission refused");
            return ActionReply::Error(format!("goal {goal_id} already exists"));
        }

        let response = self.callbacks.on_new_goal_request(&goal);
        let decision = match GoalDecision::try_from(self.descriptor.goal_decision(&response)) {
            Ok(decision) => decision,
            Err(code) => {
                error!(%goal_id, code, "goal callback returned an invalid decision, rejecting");
                GoalDecision::Reject
            }
        };

        match decision {
            GoalDecision::Reject => debug!(%goal_id, "goal rejected"),
            GoalDecision::Accept => {
                let handle = self.handle.goal(goal_id);
                self.callbacks.on_execute_goal(goal, handle);
                self.registry.insert(goal_id, Time::now());
                self.registry.mark_goal_as(&goal_id, GoalStatus::Executing);
                info!(%goal_id, "goal accepted");
                self.publish_status();
            }
        }

        ActionReply::Goal(response)
    }

    // ------------------------------------------------------------------------
    // Result reconciliation
    // ------------------------------------------------------------------------

    /// Handle a client asking for the result of `goal_id`.
    ///
    /// Returns `None` if the request was queued or the goal is unknown.
    pub fn handle_result_request(
        &mut self,
        goal_id: GoalId,
        request_id: RequestId,
    ) -> Option<ResultResponse<A::Result>> {
        let Some(status) = self.registry.status(&goal_id) else {
            warn!(%goal_id, %request_id, "result requested for unknown goal");
            return None;
        };

        if let Some(result) = self.results.take_cached(&goal_id) {
            self.registry.mark_goal_as(&goal_id, GoalStatus::Succeeded);
            debug!(%goal_id, %request_id, "cached result delivered");
            self.publish_status();
            return Some(ResultResponse::succeeded(result));
        }

        if matches!(status, GoalStatus::Canceled | GoalStatus::Aborted) {
            return Some(ResultResponse::status_only(status));
        }

        debug!(%goal_id, %request_id, "result not available yet, request queued");
        self.results.enqueue(goal_id, request_id, Instant::now());
        None
    }

    /// Handle the execution delivering the result of `goal_id`.
    pub fn publish_result(&mut self, goal_id: GoalId, result: A::Result) {
        match self.registry.status(&goal_id) {
            None => {
                warn!(%goal_id, "result for unknown goal dropped");
                return;
            }
            Some(status) if status.is_terminal() => {
                warn!(%goal_id, %status, "result for finished goal dropped");
                return;
            }
            Some(_) => {}
        }

        let waiting = self.results.take_pending(&goal_id);
        if waiting.is_empty() {
            if self.results.cache(goal_id, result) {
                debug!(%goal_id, "result cached until requested");
            } else {
                warn!(%goal_id, "duplicate result dropped");
            }
            return;
        }

        for request_id in &waiting {
            self.respond(
                request_id,
                ActionReply::Result(ResultResponse::succeeded(result.clone())),
            );
        }
        self.registry.mark_goal_as(&goal_id, GoalStatus::Succeeded);
        info!(%goal_id, clients = waiting.len(), "result delivered");
        self.publish_status();
    }

    /// Handle the execution aborting `goal_id`.
    pub fn goal_aborted(&mut self, goal_id: GoalId) {
        if self.finish_without_result(goal_id, GoalStatus::Aborted) {
            info!(%goal_id, "goal aborted");
        }
    }

    /// Move `goal_id` to a terminal status that carries no result.
    ///
    /// Any cached result is dropped and waiting clients get a status-only reply.
    pub(super) fn finish_without_result(&mut self, goal_id: GoalId, status: GoalStatus) -> bool {
        match self.registry.mark_goal_as(&goal_id, status) {
            t if t.is_applied() => {}
            t => {
                debug!(%goal_id, %status, ?t, "notification ignored");
                return false;
            }
        }

        if self.results.discard_cached(&goal_id) {
            debug!(%goal_id, "stale cached result dropped");
        }
        for request_id in self.results.take_pending(&goal_id) {
            self.respond(
                &request_id,
                ActionReply::Result(ResultResponse::status_only(status)),
            );
        }
        self.publish_status();
        true
    }

    /// Drop pending result requests older than the result timeout.
    ///
    /// Expired requests are answered with an `Unknown` status. Cached results are kept:
    /// their goal has not finished until a client collects them.
    pub fn expire_stale(&mut self, now: Instant) {
        if self.result_timeout.is_zero() {
            return;
        }
        for (goal_id, request_id) in self.results.expire(now, self.result_timeout) {
            warn!(%goal_id, %request_id, "result request expired");
            self.respond(
                &request_id,
                ActionReply::Result(ResultResponse::status_only(GoalStatus::Unknown)),
            );
        }
    }

    // ------------------------------------------------------------------------
    // Mailbox
    // ------------------------------------------------------------------------

    /// Process one mailbox command. Breaks on shutdown.
    pub(crate) fn dispatch(&mut self, cmd: Command<A>) -> ControlFlow<()> {
        match cmd {
            Command::Request {
                request_id,
                request,
            } => {
                if let Some(reply) = self.handle_request(request_id, request) {
                    self.respond(&request_id, reply);
                }
            }
            Command::Feedback(msg) => self.publish_feedback(&msg),
            Command::Result { goal_id, result } => self.publish_result(goal_id, result),
            Command::Canceled(goal_id) => self.goal_canceled(goal_id),
            Command::Aborted(goal_id) => self.goal_aborted(goal_id),
            Command::Status(tx) => {
                let _ = tx.send(self.status_snapshot());
            }
            Command::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    /// Process every command already queued in `mailbox`, without waiting.
    ///
    /// Returns the number of commands processed. Stops early on shutdown.
    pub fn process_pending(&mut self, mailbox: &mut Mailbox<A>) -> usize {
        let mut n = 0;
        while let Some(cmd) = mailbox.try_recv() {
            n += 1;
            if self.dispatch(cmd).is_break() {
                break;
            }
        }
        n
    }

    pub(super) fn respond(&self, request_id: &RequestId, reply: ActionReply<A>) {
        if let Err(e) = self.outbox.send_response(request_id, reply) {
            error!(%request_id, "failed to send response: {e}");
        }
    }
}
