use std::{future::Future, time::Duration};

use tokio::task::JoinHandle;

/// Holds at most one pending background task.
///
/// Arming a new task aborts the previous one. Each armed task is tagged with a generation; the
/// owner redeems it through [`TimerSlot::claim`] when the task reports back, and a report whose
/// generation is no longer armed is stale.
#[derive(Debug, Default)]
pub struct TimerSlot {
    handle: Option<JoinHandle<()>>,
    generation: u64,
    armed: Option<u64>,
}

impl TimerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `on_fire(generation)` after `delay` unless cancelled or re-armed first.
    pub fn arm<F>(&mut self, delay: Duration, on_fire: F) -> u64
    where
        F: FnOnce(u64) + Send + 'static,
    {
        self.spawn(move |generation| async move {
            tokio::time::sleep(delay).await;
            on_fire(generation);
        })
    }

    /// Runs the future built by `task(generation)` in the slot.
    pub fn spawn<F, Fut>(&mut self, task: F) -> u64
    where
        F: FnOnce(u64) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.generation += 1;
        let generation = self.generation;
        self.handle = Some(tokio::spawn(task(generation)));
        self.armed = Some(generation);
        generation
    }

    /// Returns whether something was pending.
    pub fn cancel(&mut self) -> bool {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.armed.take().is_some()
    }

    /// Redeems a report from the task armed as `generation`, disarming the slot.
    pub fn claim(&mut self, generation: u64) -> bool {
        if self.armed != Some(generation) {
            return false;
        }
        self.armed = None;
        self.handle = None;
        true
    }

    pub fn is_pending(&self) -> bool {
        self.armed.is_some()
    }
}

impl Drop for TimerSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}
