//! Asynchronous task tracking
//!
//! Long-running work (scene loads, sprite sheet fetches) is registered here as
//! a future plus a completion callback. The tracker never blocks: the frame
//! loop calls [`TaskTracker::poll`] once per frame, which polls every pending
//! future a single time on the current thread.
//!
//! A task id stays in the active set until its future resolves successfully.
//! Failed tasks are logged and reported but deliberately left active, so a
//! readiness gate built on [`TaskTracker::is_task_active`] stays closed
//! instead of letting a half-loaded scene run.

use futures::future::LocalBoxFuture;
use futures::FutureExt;
use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::future::Future;
use std::task::{Context, Poll};

/// Identifier handed out by [`TaskTracker::register_task`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    /// Raw numeric value
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

/// Outcome reported by [`TaskTracker::poll`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    /// The future resolved and its completion callback ran
    Completed(TaskId),
    /// The future failed; the task stays active
    Failed {
        /// Task that failed
        id: TaskId,
        /// Rendered error
        error: String,
    },
}

type Completion<C> = Box<dyn FnOnce(&mut C)>;

struct PendingTask<C> {
    id: TaskId,
    future: LocalBoxFuture<'static, Result<Completion<C>, String>>,
}

/// Registry of in-flight asynchronous work
///
/// `C` is the context handed to completion callbacks, typically the engine
/// world, so a finished load can mutate engine state without globals.
pub struct TaskTracker<C> {
    next_id: u64,
    active: HashSet<TaskId>,
    pending: Vec<PendingTask<C>>,
    failed: HashMap<TaskId, String>,
}

impl<C: 'static> TaskTracker<C> {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self {
            next_id: 0,
            active: HashSet::new(),
            pending: Vec::new(),
            failed: HashMap::new(),
        }
    }

    /// Track `task`; `on_complete` runs with its output once it succeeds
    pub fn register_task<T, E, F, Cb>(&mut self, task: F, on_complete: Cb) -> TaskId
    where
        T: 'static,
        E: Display + 'static,
        F: Future<Output = Result<T, E>> + 'static,
        Cb: FnOnce(T, &mut C) + 'static,
    {
        self.next_id += 1;
        let id = TaskId(self.next_id);

        let future = async move {
            match task.await {
                Ok(data) => {
                    Ok(Box::new(move |ctx: &mut C| on_complete(data, ctx)) as Completion<C>)
                }
                Err(err) => Err(err.to_string()),
            }
        }
        .boxed_local();

        self.active.insert(id);
        self.pending.push(PendingTask { id, future });

        log::debug!("Registered {id}");
        id
    }

    /// Whether `id` is still in flight (or failed)
    pub fn is_task_active(&self, id: TaskId) -> bool {
        self.active.contains(&id)
    }

    /// Error recorded for a failed task
    pub fn task_error(&self, id: TaskId) -> Option<&str> {
        self.failed.get(&id).map(String::as_str)
    }

    /// Number of tasks in the active set
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Number of futures that still need polling
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Poll every pending future once and run completions against `ctx`
    pub fn poll(&mut self, ctx: &mut C) -> Vec<TaskEvent> {
        if self.pending.is_empty() {
            return Vec::new();
        }

        let mut cx = Context::from_waker(futures::task::noop_waker_ref());
        let mut events = Vec::new();

        for mut task in std::mem::take(&mut self.pending) {
            match task.future.as_mut().poll(&mut cx) {
                Poll::Pending => self.pending.push(task),
                Poll::Ready(Ok(complete)) => {
                    complete(ctx);
                    self.active.remove(&task.id);
                    log::debug!("Completed {}", task.id);
                    events.push(TaskEvent::Completed(task.id));
                }
                Poll::Ready(Err(error)) => {
                    log::error!("{} failed: {error}", task.id);
                    self.failed.insert(task.id, error.clone());
                    events.push(TaskEvent::Failed { id: task.id, error });
                }
            }
        }

        events
    }
}

impl<C: 'static> Default for TaskTracker<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> std::fmt::Debug for TaskTracker<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskTracker")
            .field("active", &self.active.len())
            .field("pending", &self.pending.len())
            .field("failed", &self.failed.len())
            .finish()
    }
}
