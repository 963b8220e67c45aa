#![allow(dead_code)]

use oxidros_action::action::{
    ActionCallbacks, ActionServerHandle, CancelResponse, Coordinator, GoalHandle, Mailbox,
};
use oxidros_action_core::{
    ActionDescriptor, ActionOutbox, ActionReply, ActionRequest, CancelGoalRequest,
    CancelGoalResponse, DynError, Error, FeedbackMessage, GoalId, GoalStatus, GoalStatusArray,
    RequestId, Result, ResultResponse, Time,
};
use parking_lot::Mutex;
use std::{sync::Arc, time::Duration};

pub const ACCEPT: u8 = 1;
pub const REJECT: u8 = 0;

// ----------------------------------------------------------------------------
// Action type
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestGoal {
    pub id: GoalId,
    pub order: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalAnswer {
    pub code: u8,
    pub stamp: Time,
}

#[derive(Debug)]
pub enum Raw {
    Goal(TestGoal),
    Result(GoalId),
    Cancel(CancelGoalRequest),
    Garbage,
}

pub struct TestAction;

impl ActionDescriptor for TestAction {
    type Request = Raw;
    type Goal = TestGoal;
    type GoalResponse = GoalAnswer;
    type Result = Vec<u64>;
    type Feedback = u64;

    fn action_name(&self) -> &str {
        "test_action"
    }

    fn classify(&self, request: Raw) -> ActionRequest<Self> {
        match request {
            Raw::Goal(goal) => ActionRequest::SendGoal(goal),
            Raw::Result(id) => ActionRequest::GetResult(id),
            Raw::Cancel(req) => ActionRequest::CancelGoal(req),
            Raw::Garbage => ActionRequest::Unrecognized("garbage".into()),
        }
    }

    fn goal_id(&self, goal: &TestGoal) -> GoalId {
        goal.id
    }

    fn goal_decision(&self, response: &GoalAnswer) -> u8 {
        response.code
    }
}

pub fn goal(order: u32) -> TestGoal {
    TestGoal {
        id: GoalId::random(),
        order,
    }
}

pub fn cancel_request(goal_id: GoalId) -> CancelGoalRequest {
    CancelGoalRequest::new(goal_id, Time::zero())
}

pub fn request_id(seq: i64) -> RequestId {
    RequestId::new([0xab; 16], seq)
}

pub fn expect_cancel(reply: ActionReply<TestAction>) -> CancelGoalResponse {
    match reply {
        ActionReply::Cancel(resp) => resp,
        other => panic!("expected a cancel reply, got {other:?}"),
    }
}

pub fn expect_result(reply: ActionReply<TestAction>) -> ResultResponse<Vec<u64>> {
    match reply {
        ActionReply::Result(resp) => resp,
        other => panic!("expected a result reply, got {other:?}"),
    }
}

// ----------------------------------------------------------------------------
// Journal
// ----------------------------------------------------------------------------

/// Everything the server did, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    NewGoal(GoalId),
    Execute(GoalId),
    CancelRequested(GoalId),
    Cancel(GoalId),
    Status(GoalStatusArray),
    Feedback(FeedbackMessage<u64>),
    Responded(RequestId),
}

#[derive(Default)]
pub struct Recorded {
    pub events: Vec<Event>,
    pub responses: Vec<(RequestId, ActionReply<TestAction>)>,
}

#[derive(Clone, Default)]
pub struct Journal(pub Arc<Mutex<Recorded>>);

impl Journal {
    fn push(&self, event: Event) {
        self.0.lock().events.push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().events.clone()
    }

    pub fn statuses(&self) -> Vec<GoalStatusArray> {
        self.0
            .lock()
            .events
            .iter()
            .filter_map(|e| match e {
                Event::Status(s) => Some(s.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn status_count(&self) -> usize {
        self.statuses().len()
    }

    pub fn last_status(&self) -> Option<GoalStatusArray> {
        self.statuses().pop()
    }

    pub fn feedback(&self) -> Vec<FeedbackMessage<u64>> {
        self.0
            .lock()
            .events
            .iter()
            .filter_map(|e| match e {
                Event::Feedback(f) => Some(f.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn take_responses(&self) -> Vec<(RequestId, ActionReply<TestAction>)> {
        std::mem::take(&mut self.0.lock().responses)
    }

    pub fn position(&self, event: &Event) -> Option<usize> {
        self.0.lock().events.iter().position(|e| e == event)
    }
}

// ----------------------------------------------------------------------------
// Outbox
// ----------------------------------------------------------------------------

pub struct RecordingOutbox {
    journal: Journal,
    pub fail: Arc<Mutex<bool>>,
}

impl ActionOutbox<TestAction> for RecordingOutbox {
    fn publish_status(&self, status: &GoalStatusArray) -> Result<()> {
        if *self.fail.lock() {
            return Err(Error::ChannelClosed);
        }
        self.journal.push(Event::Status(status.clone()));
        Ok(())
    }

    fn publish_feedback(&self, feedback: &FeedbackMessage<u64>) -> Result<()> {
        if *self.fail.lock() {
            return Err(Error::ChannelClosed);
        }
        self.journal.push(Event::Feedback(feedback.clone()));
        Ok(())
    }

    fn send_response(&self, request_id: &RequestId, reply: ActionReply<TestAction>) -> Result<()> {
        if *self.fail.lock() {
            return Err(Error::RequestNotFound(request_id.to_string()));
        }
        let mut recorded = self.journal.0.lock();
        recorded.events.push(Event::Responded(*request_id));
        recorded.responses.push((*request_id, reply));
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Callbacks
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelDecision {
    Accept,
    Reject,
    Fail,
}

pub struct Script {
    pub goal_code: u8,
    pub cancel: CancelDecision,
    pub handles: Vec<GoalHandle<TestAction>>,
    pub executed: Vec<TestGoal>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            goal_code: ACCEPT,
            cancel: CancelDecision::Accept,
            handles: Vec::new(),
            executed: Vec::new(),
        }
    }
}

#[derive(Clone, Default)]
pub struct SharedScript(pub Arc<Mutex<Script>>);

impl SharedScript {
    pub fn set_goal_code(&self, code: u8) {
        self.0.lock().goal_code = code;
    }

    pub fn set_cancel(&self, decision: CancelDecision) {
        self.0.lock().cancel = decision;
    }

    /// Handle given to the execution of `goal_id`.
    pub fn handle(&self, goal_id: GoalId) -> GoalHandle<TestAction> {
        self.0
            .lock()
            .handles
            .iter()
            .find(|h| h.goal_id() == goal_id)
            .cloned()
            .unwrap_or_else(|| panic!("goal {goal_id} was never executed"))
    }

    pub fn executed(&self) -> Vec<TestGoal> {
        self.0.lock().executed.clone()
    }
}

pub struct ScriptedCallbacks {
    script: SharedScript,
    journal: Journal,
    on_execute: Option<Box<dyn FnMut(TestGoal, GoalHandle<TestAction>) + Send>>,
}

impl ScriptedCallbacks {
    pub fn new(script: SharedScript, journal: Journal) -> Self {
        Self {
            script,
            journal,
            on_execute: None,
        }
    }

    /// Also run `f` for every started goal.
    pub fn with_executor<F>(mut self, f: F) -> Self
    where
        F: FnMut(TestGoal, GoalHandle<TestAction>) + Send + 'static,
    {
        self.on_execute = Some(Box::new(f));
        self
    }
}

impl ActionCallbacks<TestAction> for ScriptedCallbacks {
    fn on_new_goal_request(&mut self, goal: &TestGoal) -> GoalAnswer {
        self.journal.push(Event::NewGoal(goal.id));
        GoalAnswer {
            code: self.script.0.lock().goal_code,
            stamp: Time::now(),
        }
    }

    fn on_execute_goal(&mut self, goal: TestGoal, handle: GoalHandle<TestAction>) {
        self.journal.push(Event::Execute(goal.id));
        {
            let mut script = self.script.0.lock();
            script.executed.push(goal.clone());
            script.handles.push(handle.clone());
        }
        if let Some(f) = self.on_execute.as_mut() {
            f(goal, handle);
        }
    }

    fn on_cancel_goal_request(
        &mut self,
        request: &CancelGoalRequest,
    ) -> std::result::Result<CancelResponse, DynError> {
        self.journal
            .push(Event::CancelRequested(request.goal_info.goal_id));
        match self.script.0.lock().cancel {
            CancelDecision::Accept => Ok(CancelResponse::Accept),
            CancelDecision::Reject => Ok(CancelResponse::Reject),
            CancelDecision::Fail => Err("cancel callback exploded".into()),
        }
    }

    fn on_cancel_goal(&mut self, goal_id: GoalId) {
        self.journal.push(Event::Cancel(goal_id));
    }
}

// ----------------------------------------------------------------------------
// Harness
// ----------------------------------------------------------------------------

/// A coordinator driven synchronously.
pub struct Harness {
    pub coordinator: Coordinator<TestAction, ScriptedCallbacks, RecordingOutbox>,
    pub mailbox: Mailbox<TestAction>,
    pub handle: ActionServerHandle<TestAction>,
    pub journal: Journal,
    pub script: SharedScript,
    pub fail: Arc<Mutex<bool>>,
    next_request: i64,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(15 * 60))
    }

    pub fn with_timeout(result_timeout: Duration) -> Self {
        let journal = Journal::default();
        let script = SharedScript::default();
        let fail = Arc::new(Mutex::new(false));
        let outbox = RecordingOutbox {
            journal: journal.clone(),
            fail: fail.clone(),
        };
        let callbacks = ScriptedCallbacks::new(script.clone(), journal.clone());
        let (handle, mailbox) = ActionServerHandle::channel();
        let coordinator = Coordinator::new(
            TestAction,
            callbacks,
            outbox,
            handle.clone(),
            result_timeout,
        );
        Self {
            coordinator,
            mailbox,
            handle,
            journal,
            script,
            fail,
            next_request: 0,
        }
    }

    pub fn next_request_id(&mut self) -> RequestId {
        self.next_request += 1;
        request_id(self.next_request)
    }

    /// Submit a goal through the request router. Returns its id and the reply.
    pub fn submit(&mut self, order: u32) -> (GoalId, ActionReply<TestAction>) {
        let goal = goal(order);
        let id = goal.id;
        let rid = self.next_request_id();
        let reply = self
            .coordinator
            .handle_request(rid, Raw::Goal(goal))
            .expect("goal requests are always answered");
        (id, reply)
    }

    /// Submit a goal that the callbacks accept.
    pub fn accepted_goal(&mut self) -> GoalId {
        let (id, reply) = self.submit(5);
        assert!(matches!(reply, ActionReply::Goal(GoalAnswer { code: ACCEPT, .. })));
        id
    }

    /// Ask for the result of `goal_id`. Returns the request id and the synchronous reply.
    pub fn request_result(&mut self, goal_id: GoalId) -> (RequestId, Option<ActionReply<TestAction>>) {
        let rid = self.next_request_id();
        (rid, self.coordinator.handle_request(rid, Raw::Result(goal_id)))
    }

    pub fn cancel(&mut self, goal_id: GoalId) -> ActionReply<TestAction> {
        let rid = self.next_request_id();
        self.coordinator
            .handle_request(rid, Raw::Cancel(cancel_request(goal_id)))
            .expect("cancel requests are always answered")
    }

    /// Process everything queued through handles.
    pub fn pump(&mut self) -> usize {
        self.coordinator.process_pending(&mut self.mailbox)
    }

    pub fn status_of(&self, goal_id: &GoalId) -> Option<GoalStatus> {
        self.coordinator.registry().status(goal_id)
    }
}
