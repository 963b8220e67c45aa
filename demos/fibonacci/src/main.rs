//! Fibonacci action server and client in one process.
//!
//! The server runs on the loopback transport; each accepted goal is computed on its
//! own worker thread which streams the partial sequence as feedback.
//!
//! Run with:
//! ```bash
//! cargo run -p fibonacci
//! # optionally with a parameter file
//! cargo run -p fibonacci -- params.yaml
//! ```

use oxidros_action::prelude::*;
use oxidros_action_loopback::{ActionClient, LoopbackTransport};
use std::{
    collections::BTreeMap,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

const NODE_NAME: &str = "fibonacci_server";
const MAX_ORDER: u32 = 90;

#[derive(Debug)]
enum FibonacciRequest {
    Goal { goal_id: GoalId, order: u32 },
    Result(GoalId),
    Cancel(CancelGoalRequest),
}

#[derive(Debug)]
struct FibonacciGoal {
    goal_id: GoalId,
    order: u32,
}

#[derive(Debug, Clone, Copy)]
struct GoalAccepted {
    accepted: bool,
    stamp: Time,
}

struct Fibonacci;

impl ActionDescriptor for Fibonacci {
    type Request = FibonacciRequest;
    type Goal = FibonacciGoal;
    type GoalResponse = GoalAccepted;
    type Result = Vec<u64>;
    type Feedback = Vec<u64>;

    fn action_name(&self) -> &str {
        "fibonacci"
    }

    fn classify(&self, request: FibonacciRequest) -> ActionRequest<Self> {
        match request {
            FibonacciRequest::Goal { goal_id, order } => {
                ActionRequest::SendGoal(FibonacciGoal { goal_id, order })
            }
            FibonacciRequest::Result(goal_id) => ActionRequest::GetResult(goal_id),
            FibonacciRequest::Cancel(req) => ActionRequest::CancelGoal(req),
        }
    }

    fn goal_id(&self, goal: &FibonacciGoal) -> GoalId {
        goal.goal_id
    }

    fn goal_decision(&self, response: &GoalAccepted) -> u8 {
        response.accepted as u8
    }
}

#[derive(Default)]
struct FibonacciCallbacks {
    cancel_flags: BTreeMap<GoalId, Arc<AtomicBool>>,
}

impl FibonacciCallbacks {
    /// Forget the flags of goals whose worker has exited.
    ///
    /// A running worker holds the only other reference to its flag.
    fn prune_finished(&mut self) {
        self.cancel_flags.retain(|_, flag| Arc::strong_count(flag) > 1);
    }
}

impl ActionCallbacks<Fibonacci> for FibonacciCallbacks {
    fn on_new_goal_request(&mut self, goal: &FibonacciGoal) -> GoalAccepted {
        let accepted = goal.order <= MAX_ORDER;
        tracing::info!(goal_id = %goal.goal_id, order = goal.order, accepted, "goal request");
        GoalAccepted {
            accepted,
            stamp: Time::now(),
        }
    }

    fn on_execute_goal(&mut self, goal: FibonacciGoal, handle: GoalHandle<Fibonacci>) {
        self.prune_finished();
        let FibonacciGoal { goal_id, order } = goal;
        let canceled = Arc::new(AtomicBool::new(false));
        self.cancel_flags.insert(goal_id, canceled.clone());
        let spawned = std::thread::Builder::new()
            .name(format!("fib-{order}"))
            .spawn(move || run_worker(order, handle, canceled));
        if let Err(e) = spawned {
            self.cancel_flags.remove(&goal_id);
            tracing::error!("failed to start worker: {e}");
        }
    }

    fn on_cancel_goal_request(
        &mut self,
        request: &CancelGoalRequest,
    ) -> std::result::Result<CancelResponse, DynError> {
        tracing::info!(goal_id = %request.goal_info.goal_id, "cancel request");
        Ok(CancelResponse::Accept)
    }

    fn on_cancel_goal(&mut self, goal_id: GoalId) {
        if let Some(flag) = self.cancel_flags.remove(&goal_id) {
            flag.store(true, Ordering::Release);
        }
    }
}

fn run_worker(order: u32, handle: GoalHandle<Fibonacci>, canceled: Arc<AtomicBool>) {
    let mut sequence = vec![0u64, 1];
    for i in 0..order {
        if canceled.load(Ordering::Acquire) {
            tracing::info!(goal_id = %handle.goal_id(), "worker: canceled");
            let _ = handle.canceled();
            return;
        }
        if i > 1 {
            let next = sequence[sequence.len() - 1] + sequence[sequence.len() - 2];
            sequence.push(next);
        }
        if handle.feedback(sequence.clone()).is_err() {
            return;
        }
        std::thread::sleep(Duration::from_millis(100));
    }
    let _ = handle.finish(sequence);
}

async fn wait_for(
    status: &mut oxidros_action_loopback::Subscriber<GoalStatusArray>,
    goal_id: GoalId,
    expected: GoalStatus,
) -> std::result::Result<(), DynError> {
    loop {
        let snapshot = status.recv_timeout(Duration::from_secs(10)).await?;
        if snapshot.status_of(&goal_id) == Some(expected) {
            return Ok(());
        }
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), DynError> {
    init_action_logging(NODE_NAME);

    let options = match std::env::args().nth(1) {
        Some(path) => ServerOptions::from_yaml_file(path, NODE_NAME)?,
        None => ServerOptions::default(),
    };

    let transport = LoopbackTransport::<Fibonacci>::new();
    let server = ActionServer::new(
        transport.clone(),
        Fibonacci,
        FibonacciCallbacks::default(),
        options,
    )?;
    let handle = server.handle();
    let task = server.spawn();

    let client = ActionClient::new(&transport, "fibonacci")?;
    let mut status = client.subscribe_status()?;
    let mut feedback = client.subscribe_feedback()?;

    // A goal that runs to completion.
    let goal_id = GoalId::random();
    let reply = client
        .send_goal(FibonacciRequest::Goal { goal_id, order: 10 })?
        .recv()
        .await?;
    tracing::info!("goal reply: {reply:?}");

    let result = client.get_result(FibonacciRequest::Result(goal_id))?;
    tokio::spawn(async move {
        while let Ok(msg) = feedback.recv().await {
            tracing::info!(goal_id = %msg.goal_id, "feedback: {:?}", msg.feedback);
        }
    });
    match result.recv().await? {
        ActionReply::Result(resp) => tracing::info!("result: {:?}", resp.result),
        other => tracing::warn!("unexpected reply: {other:?}"),
    }

    // A goal canceled halfway.
    let goal_id = GoalId::random();
    client
        .send_goal(FibonacciRequest::Goal { goal_id, order: 50 })?
        .recv()
        .await?;
    tokio::time::sleep(Duration::from_millis(350)).await;
    let reply = client
        .cancel_goal(FibonacciRequest::Cancel(CancelGoalRequest::new(
            goal_id,
            Time::now(),
        )))?
        .recv()
        .await?;
    tracing::info!("cancel reply: {reply:?}");
    wait_for(&mut status, goal_id, GoalStatus::Canceled).await?;
    tracing::info!(%goal_id, "goal canceled");

    // A goal the server refuses.
    let reply = client
        .send_goal(FibonacciRequest::Goal {
            goal_id: GoalId::random(),
            order: MAX_ORDER + 1,
        })?
        .recv()
        .await?;
    tracing::info!("goal reply: {reply:?}");

    let snapshot = handle.goal_status().await?;
    for entry in &snapshot.status_list {
        tracing::info!(goal_id = %entry.goal_info.goal_id, status = %entry.status, "final");
    }

    handle.shutdown()?;
    task.await??;
    Ok(())
}
