//! Update listeners.

use std::cell::RefCell;
use std::rc::Rc;

use crate::changelog::Change;

pub type ListenerId = u64;

type Callback = Rc<RefCell<dyn FnMut(&Change)>>;

/// Registered update callbacks, called in registration order.
#[derive(Default)]
pub struct ListenerSet {
    listeners: Vec<(ListenerId, Callback)>,
    next_id: ListenerId,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, callback: impl FnMut(&Change) + 'static) -> ListenerId {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners.push((id, Rc::new(RefCell::new(callback))));
        id
    }

    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

/// Notify every listener of a committed change.
///
/// The listener list is snapshotted before calling out, so a callback may
/// register or remove listeners, or mutate the model, without invalidating
/// the iteration. A callback that recursively triggers itself is skipped
/// on the inner call.
pub fn emit(set: &Rc<RefCell<ListenerSet>>, change: &Change) {
    let snapshot: Vec<Callback> = set
        .borrow()
        .listeners
        .iter()
        .map(|(_, callback)| Rc::clone(callback))
        .collect();
    for callback in snapshot {
        if let Ok(mut callback) = callback.try_borrow_mut() {
            (&mut *callback)(change);
        }
    }
}
