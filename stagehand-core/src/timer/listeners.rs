//! Synchronous multi-subscriber notification lists.

/// Handle returned when registering a listener, used to remove it later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Ordered list of callbacks receiving a value of type `T`.
pub(crate) struct Listeners<T> {
    entries: Vec<(ListenerId, Box<dyn FnMut(T)>)>,
}

impl<T: Copy> Listeners<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub(crate) fn add(&mut self, id: ListenerId, callback: Box<dyn FnMut(T)>) {
        self.entries.push((id, callback));
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    /// Invokes every callback in registration order.
    pub(crate) fn emit(&mut self, value: T) {
        for (_, callback) in self.entries.iter_mut() {
            callback(value);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
