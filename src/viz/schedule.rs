use std::collections::BTreeMap;

use smallvec::SmallVec;

use crate::foundation::core::Millis;

/// Cancellable handle returned for every scheduled task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameHandle(u64);

#[derive(Clone, Copy, Debug, PartialEq)]
enum Cadence {
    EveryFrame,
    Once { due: Millis },
}

/// A task that came due during [`FrameScheduler::advance`].
#[derive(Clone, Debug, PartialEq)]
pub struct Fired<T> {
    pub handle: FrameHandle,
    pub task: T,
    pub now: Millis,
}

/// Per-owner animation-frame and timer queue.
///
/// Every continuous animation or delayed cleanup an owner starts is a task here, so "no leaked
/// timers" reduces to `live_count() == 0` after the owner's teardown.
#[derive(Clone, Debug)]
pub struct FrameScheduler<T> {
    next: u64,
    now: Millis,
    tasks: BTreeMap<FrameHandle, (Cadence, T)>,
}

impl<T> Default for FrameScheduler<T> {
    fn default() -> Self {
        Self {
            next: 0,
            now: Millis(0.0),
            tasks: BTreeMap::new(),
        }
    }
}

impl<T: Clone> FrameScheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock value of the last `advance`.
    pub fn now(&self) -> Millis {
        self.now
    }

    /// Run `task` on every subsequent frame until cancelled.
    pub fn every_frame(&mut self, task: T) -> FrameHandle {
        self.push(Cadence::EveryFrame, task)
    }

    /// Run `task` once, `delay_ms` after the current clock.
    pub fn after(&mut self, delay_ms: f64, task: T) -> FrameHandle {
        let due = self.now.after(delay_ms);
        self.push(Cadence::Once { due }, task)
    }

    /// Cancel one task. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: FrameHandle) -> bool {
        self.tasks.remove(&handle).is_some()
    }

    /// Cancel everything; returns how many tasks were live.
    pub fn cancel_all(&mut self) -> usize {
        let n = self.tasks.len();
        self.tasks.clear();
        n
    }

    pub fn is_live(&self, handle: FrameHandle) -> bool {
        self.tasks.contains_key(&handle)
    }

    pub fn live_count(&self) -> usize {
        self.tasks.len()
    }

    /// Move the clock to `now` and collect due tasks in scheduling order.
    ///
    /// Every-frame tasks fire on each call; one-shot tasks fire once and are dropped. The clock
    /// never moves backwards.
    pub fn advance(&mut self, now: Millis) -> SmallVec<[Fired<T>; 4]> {
        if now.0 > self.now.0 {
            self.now = now;
        }
        let now = self.now;
        let mut fired = SmallVec::new();
        let mut spent = SmallVec::<[FrameHandle; 4]>::new();
        for (handle, (cadence, task)) in &self.tasks {
            let due = match cadence {
                Cadence::EveryFrame => true,
                Cadence::Once { due } => due.0 <= now.0,
            };
            if !due {
                continue;
            }
            if matches!(cadence, Cadence::Once { .. }) {
                spent.push(*handle);
            }
            fired.push(Fired {
                handle: *handle,
                task: task.clone(),
                now,
            });
        }
        for handle in spent {
            self.tasks.remove(&handle);
        }
        fired
    }

    fn push(&mut self, cadence: Cadence, task: T) -> FrameHandle {
        let handle = FrameHandle(self.next);
        self.next += 1;
        self.tasks.insert(handle, (cadence, task));
        handle
    }
}

#[cfg(test)]
#[path = "../../tests/unit/viz/schedule.rs"]
mod tests;
