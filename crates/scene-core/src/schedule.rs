//! Frame scheduling and the render loop state machine.

use crate::error::RuntimeTickError;
use std::cell::Cell;
use std::ops::ControlFlow;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskHandle(pub u64);

/// Work run once per display frame. Returning `Break` ends the task.
pub type FrameTask = Box<dyn FnMut() -> ControlFlow<()>>;

/// Cancellable repeating task, aligned to the display refresh.
///
/// Implementations keep at most one frame pending per task and must never run
/// a task again once `cancel` has returned.
pub trait FrameScheduler {
    fn schedule(&self, task: FrameTask) -> TaskHandle;
    /// Cancelling an unknown or finished task is a no-op.
    fn cancel(&self, handle: TaskHandle);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running,
}

pub struct RenderLoop {
    state: Rc<Cell<LoopState>>,
    ticks: Rc<Cell<u64>>,
    task: Option<TaskHandle>,
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderLoop {
    pub fn new() -> Self {
        Self {
            state: Rc::new(Cell::new(LoopState::Stopped)),
            ticks: Rc::new(Cell::new(0)),
            task: None,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state.get()
    }

    /// Ticks completed successfully since construction.
    pub fn ticks(&self) -> u64 {
        self.ticks.get()
    }

    /// Stopped -> Running. Returns `false` (and schedules nothing) if already
    /// running. A failing tick moves the loop back to Stopped and hands the
    /// error to `on_error` instead of rescheduling.
    pub fn start<S, T, E>(&mut self, scheduler: &S, mut tick: T, mut on_error: E) -> bool
    where
        S: FrameScheduler,
        T: FnMut() -> Result<(), RuntimeTickError> + 'static,
        E: FnMut(RuntimeTickError) + 'static,
    {
        if self.state.get() == LoopState::Running {
            return false;
        }
        if let Some(stale) = self.task.take() {
            scheduler.cancel(stale);
        }
        let state = self.state.clone();
        let ticks = self.ticks.clone();
        state.set(LoopState::Running);
        let handle = scheduler.schedule(Box::new(move || {
            if state.get() != LoopState::Running {
                return ControlFlow::Break(());
            }
            match tick() {
                Ok(()) => {
                    ticks.set(ticks.get() + 1);
                    ControlFlow::Continue(())
                }
                Err(err) => {
                    state.set(LoopState::Stopped);
                    on_error(err);
                    ControlFlow::Break(())
                }
            }
        }));
        self.task = Some(handle);
        log::debug!("[loop] started task {:?}", handle);
        true
    }

    /// Running -> Stopped, cancelling the pending frame. No-op when stopped.
    pub fn stop<S: FrameScheduler>(&mut self, scheduler: &S) {
        if let Some(handle) = self.task.take() {
            scheduler.cancel(handle);
            log::debug!("[loop] cancelled task {:?} after {} ticks", handle, self.ticks.get());
        }
        self.state.set(LoopState::Stopped);
    }
}
