//! Single-threaded listener registry with explicit subscription handles,
//! plus the cancellable per-frame task handle.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

type Listener<E> = Rc<RefCell<dyn FnMut(&E)>>;

struct Registry<E> {
    next_id: u64,
    listeners: Vec<(u64, Listener<E>)>,
}

/// Event source that listeners attach to, e.g. media time updates.
pub struct EventChannel<E> {
    registry: Rc<RefCell<Registry<E>>>,
}

impl<E: 'static> EventChannel<E> {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    /// Registers `listener` until the returned subscription is disposed.
    pub fn subscribe(&self, listener: impl FnMut(&E) + 'static) -> Subscription {
        let listener: Listener<E> = Rc::new(RefCell::new(listener));
        let id = {
            let mut registry = self.registry.borrow_mut();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.listeners.push((id, listener));
            id
        };
        let weak: Weak<RefCell<Registry<E>>> = Rc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = weak.upgrade() {
                // Dropped after the borrow ends: the listener may own other subscriptions.
                let removed = {
                    let mut registry = registry.borrow_mut();
                    registry
                        .listeners
                        .iter()
                        .position(|(existing, _)| *existing == id)
                        .map(|index| registry.listeners.remove(index))
                };
                drop(removed);
            }
        })
    }

    /// Delivers `event` to every listener registered at call time.
    pub fn emit(&self, event: &E) {
        let snapshot: Vec<Listener<E>> = self
            .registry
            .borrow()
            .listeners
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in snapshot {
            (&mut *listener.borrow_mut())(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.registry.borrow().listeners.len()
    }
}

impl<E: 'static> Default for EventChannel<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventChannel<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel")
            .field("listeners", &self.registry.borrow().listeners.len())
            .finish()
    }
}

/// Handle returned by each setup call. Disposing is idempotent; dropping
/// the handle disposes it.
pub struct Subscription {
    teardown: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(teardown: impl FnOnce() + 'static) -> Self {
        Self {
            teardown: Some(Box::new(teardown)),
        }
    }

    pub fn dispose(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }

    pub fn is_active(&self) -> bool {
        self.teardown.is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

/// Cancellation handle for a task that re-runs every animation frame.
///
/// Clones share state; cancelling any clone stops the task.
#[derive(Debug, Clone, Default)]
pub struct FrameTask {
    cancelled: Rc<Cell<bool>>,
    frames: Rc<Cell<u64>>,
}

impl FrameTask {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_running(&self) -> bool {
        !self.cancelled.get()
    }

    /// Counts a frame; returns `false` once the task is cancelled.
    pub fn begin_frame(&self) -> bool {
        if self.cancelled.get() {
            return false;
        }
        self.frames.set(self.frames.get() + 1);
        true
    }

    pub fn frame_count(&self) -> u64 {
        self.frames.get()
    }
}
