//! Task-handle registry
//!
//! Every trigger of a session (the tick itself, both spawn timers, jump
//! landings, the multiplier expiry) is a named task with a handle. Time is
//! counted in ticks, so a stalled host never shifts one timer against
//! another. Leaving `Running` cancels the whole group at once.

/// Opaque handle to a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

/// What a task does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    SpawnObstacle,
    SpawnPowerUp,
    JumpLanded { jump_id: u32 },
    MultiplierExpired,
    /// Physics, movement, collision, scoring
    Tick,
}

impl Task {
    /// Within one tick, timers fire before the tick chain
    fn phase(&self) -> u8 {
        match self {
            Task::Tick => 1,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    handle: TaskHandle,
    task: Task,
    due: u64,
    period: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    now: u64,
    entries: Vec<Entry>,
    next_handle: u64,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current tick
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, handle: TaskHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    /// Number of live tasks matching `pred`
    pub fn count(&self, pred: impl Fn(&Task) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.task)).count()
    }

    fn insert(&mut self, task: Task, due: u64, period: Option<u64>) -> TaskHandle {
        let handle = TaskHandle(self.next_handle);
        self.next_handle += 1;
        self.entries.push(Entry {
            handle,
            task,
            due,
            period,
        });
        handle
    }

    /// Fire every `period` ticks, first after `first_in` ticks
    pub fn every_from(&mut self, task: Task, period: u64, first_in: u64) -> TaskHandle {
        let period = period.max(1);
        self.insert(task, self.now + first_in, Some(period))
    }

    /// Fire every `period` ticks, first after one full period
    pub fn every(&mut self, task: Task, period: u64) -> TaskHandle {
        self.every_from(task, period, period)
    }

    /// Fire once after `delay` ticks
    pub fn once(&mut self, task: Task, delay: u64) -> TaskHandle {
        self.insert(task, self.now + delay, None)
    }

    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.entries.len() != before
    }

    /// Cancel every task; returns how many were live
    pub fn cancel_all(&mut self) -> usize {
        let n = self.entries.len();
        self.entries.clear();
        n
    }

    /// Cancel everything and rewind the clock to tick 0
    pub fn reset(&mut self) {
        self.cancel_all();
        self.now = 0;
    }

    /// Tasks due at the current tick, in firing order
    ///
    /// One-shot tasks are removed; repeating tasks are re-armed for their
    /// next period.
    pub fn take_due(&mut self) -> Vec<(TaskHandle, Task)> {
        let now = self.now;
        let mut due: Vec<(u64, u8, TaskHandle, Task)> = self
            .entries
            .iter()
            .filter(|e| e.due <= now)
            .map(|e| (e.due, e.task.phase(), e.handle, e.task))
            .collect();
        due.sort_by_key(|&(at, phase, handle, _)| (at, phase, handle));

        self.entries.retain_mut(|e| {
            if e.due > now {
                return true;
            }
            match e.period {
                Some(period) => {
                    e.due += period;
                    true
                }
                None => false,
            }
        });

        due.into_iter()
            .map(|(_, _, handle, task)| (handle, task))
            .collect()
    }

    /// Move to the next tick
    pub fn advance(&mut self) {
        self.now += 1;
    }
}
