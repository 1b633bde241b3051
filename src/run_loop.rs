//! Host run loop
//!
//! The coordinator never calls into the run loop. After the main execution
//! phase the host driver reads the run-loop flag and, when it is set, calls
//! [`RunLoop::run`] on the startup thread.

use std::collections::VecDeque;
use tracing::debug;

/// The host's blocking event loop.
pub trait RunLoop {
    /// Run until the loop decides to quit.
    fn run(&mut self) -> anyhow::Result<()>;
}

type Task = Box<dyn FnOnce() -> anyhow::Result<()>>;

/// Runs queued tasks in order on the calling thread until the queue is empty.
///
/// A failing task stops the loop; the remaining tasks stay queued.
#[derive(Default)]
pub struct QueuedRunLoop {
    tasks: VecDeque<Task>,
    completed: usize,
}

impl QueuedRunLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post<F>(&mut self, task: F)
    where
        F: FnOnce() -> anyhow::Result<()> + 'static,
    {
        self.tasks.push_back(Box::new(task));
    }

    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Tasks run to completion over the loop's lifetime.
    pub fn completed(&self) -> usize {
        self.completed
    }
}

impl RunLoop for QueuedRunLoop {
    fn run(&mut self) -> anyhow::Result<()> {
        debug!(pending = self.tasks.len(), "Run loop started");
        while let Some(task) = self.tasks.pop_front() {
            task()?;
            self.completed += 1;
        }
        debug!(completed = self.completed, "Run loop drained");
        Ok(())
    }
}

impl std::fmt::Debug for QueuedRunLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueuedRunLoop")
            .field("pending", &self.tasks.len())
            .field("completed", &self.completed)
            .finish()
    }
}
