//! Cooperative Task Scheduler
//!
//! Every long-running piece of game logic (the menu cycle, a play session,
//! spawners) is a future polled here once per tick. There is one thread and
//! no preemption: code between two `.await`s runs atomically with respect to
//! every other task.
//!
//! Tasks are woken by polling, not by wakers. Every live task is polled once
//! per `step`, which matches a frame-driven game and keeps the scheduler tiny.
//! Tasks spawned during a step are appended and polled in the same step, so a
//! freshly started spawner runs up to its first suspension point immediately.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;
use std::task::{Context, Poll};

use futures::future::LocalBoxFuture;
use futures::task::noop_waker;
use futures::FutureExt;

use super::clock::Clock;
use crate::error::{panic_message, FaultPolicy, GameError, GameResult};

pub type TaskFuture = LocalBoxFuture<'static, GameResult<()>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

struct Task {
    id: TaskId,
    name: &'static str,
    future: TaskFuture,
}

#[derive(Default)]
struct SpawnQueue {
    pending: RefCell<Vec<Task>>,
    next_id: Cell<u64>,
}

/// Cloneable handle for starting tasks from anywhere, including other tasks.
#[derive(Clone, Default)]
pub struct TaskSpawner {
    queue: Rc<SpawnQueue>,
}

impl TaskSpawner {
    /// Start a fire-and-forget task. It is first polled during the current
    /// (or next) scheduler step.
    pub fn spawn<F>(&self, name: &'static str, future: F) -> TaskId
    where
        F: Future<Output = GameResult<()>> + 'static,
    {
        let id = TaskId(self.queue.next_id.get());
        self.queue.next_id.set(id.0 + 1);
        self.queue.pending.borrow_mut().push(Task {
            id,
            name,
            future: future.boxed_local(),
        });
        id
    }

    fn take_pending(&self) -> Vec<Task> {
        std::mem::take(&mut *self.queue.pending.borrow_mut())
    }

    #[cfg(test)]
    fn is_pending(&self, id: TaskId) -> bool {
        self.queue.pending.borrow().iter().any(|t| t.id == id)
    }

    fn clear(&self) -> usize {
        let dropped = self.take_pending();
        dropped.len()
    }
}

/// How a task left the scheduler
#[derive(Debug, Clone, PartialEq)]
pub enum TaskExit {
    Completed,
    Faulted(GameError),
}

#[derive(Debug, Default)]
pub struct StepReport {
    pub finished: Vec<(TaskId, TaskExit)>,
    /// The fault policy asked to stop
    pub halted: bool,
}

impl StepReport {
    pub fn exit_of(&self, id: TaskId) -> Option<&TaskExit> {
        self.finished.iter().find(|(tid, _)| *tid == id).map(|(_, exit)| exit)
    }
}

pub struct Scheduler {
    clock: Clock,
    spawner: TaskSpawner,
    tasks: Vec<Task>,
    policy: FaultPolicy,
    halted: bool,
}

impl Scheduler {
    pub fn new(policy: FaultPolicy) -> Self {
        Self {
            clock: Clock::new(),
            spawner: TaskSpawner::default(),
            tasks: Vec::new(),
            policy,
            halted: false,
        }
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn spawner(&self) -> &TaskSpawner {
        &self.spawner
    }

    /// Number of live tasks, including ones not yet polled
    #[cfg(test)]
    pub fn task_count(&self) -> usize {
        self.tasks.len() + self.spawner.queue.pending.borrow().len()
    }

    #[cfg(test)]
    pub fn is_alive(&self, id: TaskId) -> bool {
        self.tasks.iter().any(|t| t.id == id) || self.spawner.is_pending(id)
    }

    #[cfg(test)]
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Advance the clock by `dt` and poll every live task once.
    pub fn step(&mut self, dt: f64) -> StepReport {
        let mut report = StepReport::default();
        if self.halted {
            report.halted = true;
            return report;
        }

        self.clock.advance(dt);
        self.adopt_spawned();

        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);

        let mut i = 0;
        while i < self.tasks.len() {
            let task = &mut self.tasks[i];
            let name = task.name;
            let outcome = catch_unwind(AssertUnwindSafe(|| task.future.as_mut().poll(&mut cx)));

            let exit = match outcome {
                Ok(Poll::Pending) => None,
                Ok(Poll::Ready(Ok(()))) => Some(TaskExit::Completed),
                Ok(Poll::Ready(Err(e))) => Some(TaskExit::Faulted(e)),
                Err(payload) => Some(TaskExit::Faulted(GameError::Panicked {
                    task: name,
                    message: panic_message(payload.as_ref()),
                })),
            };

            match exit {
                None => i += 1,
                Some(exit) => {
                    let task = self.tasks.remove(i);
                    if let TaskExit::Faulted(ref error) = exit {
                        if self.policy.handle(name, error) {
                            self.halted = true;
                        }
                    } else {
                        tracing::trace!(task = name, "task completed");
                    }
                    report.finished.push((task.id, exit));
                }
            }

            if self.halted {
                report.halted = true;
                break;
            }
            self.adopt_spawned();
        }

        report
    }

    /// Drop every task without resuming it. Continuations after the current
    /// suspension point never run.
    pub fn shutdown(&mut self) -> usize {
        let count = self.tasks.len() + self.spawner.clear();
        self.tasks.clear();
        count
    }

    fn adopt_spawned(&mut self) {
        let spawned = self.spawner.take_pending();
        self.tasks.extend(spawned);
    }
}
