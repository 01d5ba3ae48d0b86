use scene_core::{FrameScheduler, FrameTask, TaskHandle};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::ops::ControlFlow;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

struct RafSlot {
    raf_id: Option<i32>,
    closure: Option<Closure<dyn FnMut()>>,
}

/// `requestAnimationFrame`-driven scheduler.
///
/// Each task owns one persistent closure that re-requests a frame after every
/// `Continue`. Cancelling cancels the pending frame and frees the closure.
#[derive(Clone, Default)]
pub struct RafScheduler {
    next_id: Rc<Cell<u64>>,
    slots: Rc<RefCell<HashMap<u64, Rc<RefCell<RafSlot>>>>>,
}

fn request_frame(closure: &Closure<dyn FnMut()>) -> Option<i32> {
    let window = web::window()?;
    match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
        Ok(id) => Some(id),
        Err(e) => {
            log::error!("[raf] request failed: {:?}", e);
            None
        }
    }
}

impl FrameScheduler for RafScheduler {
    fn schedule(&self, mut task: FrameTask) -> TaskHandle {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);

        let slot = Rc::new(RefCell::new(RafSlot {
            raf_id: None,
            closure: None,
        }));
        let weak = Rc::downgrade(&slot);
        let closure = Closure::wrap(Box::new(move || {
            let flow = task();
            let Some(slot) = weak.upgrade() else {
                return;
            };
            let next = match flow {
                ControlFlow::Continue(()) => slot.borrow().closure.as_ref().and_then(request_frame),
                ControlFlow::Break(()) => None,
            };
            slot.borrow_mut().raf_id = next;
        }) as Box<dyn FnMut()>);

        let first = request_frame(&closure);
        {
            let mut s = slot.borrow_mut();
            s.raf_id = first;
            s.closure = Some(closure);
        }
        self.slots.borrow_mut().insert(id, slot);
        TaskHandle(id)
    }

    fn cancel(&self, handle: TaskHandle) {
        let Some(slot) = self.slots.borrow_mut().remove(&handle.0) else {
            return;
        };
        let mut s = slot.borrow_mut();
        if let (Some(raf_id), Some(window)) = (s.raf_id.take(), web::window()) {
            _ = window.cancel_animation_frame(raf_id);
        }
        s.closure = None;
    }
}
