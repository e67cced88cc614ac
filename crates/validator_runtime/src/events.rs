//! Typed observer channels published by the form controller and the report annotator.

use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
};

use crate::model::{ContentSourceKind, ValidationProfile};

type Listener<T> = Rc<dyn Fn(&T)>;

struct ListenerSet<T> {
    next_id: u64,
    listeners: Vec<(u64, Listener<T>)>,
}

/// Listener list for one event category.
///
/// Clones share the same listeners.
pub struct Observers<T> {
    inner: Rc<RefCell<ListenerSet<T>>>,
}

impl<T> Clone for Observers<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> Default for Observers<T> {
    fn default() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ListenerSet {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }
}

impl<T: 'static> Observers<T> {
    /// Registers `listener` until the returned handle is dropped.
    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        let id = {
            let mut set = self.inner.borrow_mut();
            set.next_id += 1;
            let id = set.next_id;
            set.listeners.push((id, Rc::new(listener)));
            id
        };
        let weak: Weak<RefCell<ListenerSet<T>>> = Rc::downgrade(&self.inner);
        Subscription::new(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().listeners.retain(|(entry, _)| *entry != id);
            }
        }))
    }

    /// Calls every listener in subscription order.
    ///
    /// Listeners may subscribe or unsubscribe while being called; changes apply to the next
    /// publish.
    pub fn publish(&self, event: &T) {
        let listeners: Vec<Listener<T>> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener(event);
        }
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// Returns whether nobody is subscribed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Drop-based subscription handle returned by [`Observers::subscribe`].
pub struct Subscription {
    unsubscribe: RefCell<Option<Box<dyn FnOnce()>>>,
    active: Cell<bool>,
}

impl Subscription {
    fn new(unsubscribe: Box<dyn FnOnce()>) -> Self {
        Self {
            unsubscribe: RefCell::new(Some(unsubscribe)),
            active: Cell::new(true),
        }
    }

    /// Removes the listener if still registered.
    pub fn unsubscribe(&self) {
        if self.active.replace(false) {
            if let Some(unsubscribe) = self.unsubscribe.borrow_mut().take() {
                unsubscribe();
            }
        }
    }

    /// Keeps the listener registered for as long as its channel lives.
    pub fn detach(self) {
        self.active.set(false);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// Published by the form controller whenever its state moves in a way others react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    /// The main content source changed.
    ContentTypeChanged(ContentSourceKind),
    /// The validation profile changed (or was cleared).
    ProfileChanged(Option<ValidationProfile>),
    /// An external artifact row was created.
    ExternalRowAdded {
        /// Row index.
        index: usize,
    },
    /// An external artifact row was removed.
    ExternalRowRemoved {
        /// Row index.
        index: usize,
    },
    /// An external artifact row switched content source.
    ExternalRowContentTypeChanged {
        /// Row index.
        index: usize,
        /// New source kind.
        kind: ContentSourceKind,
    },
}

/// Published once a report is on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsLoaded {
    /// Report identifier.
    pub report_id: String,
    /// Separately stored content identifier.
    pub content_id: Option<String>,
}

#[derive(Clone, Default)]
/// One observer channel per event category.
pub struct FormEvents {
    /// Main content source changes.
    pub content_type_changed: Observers<ContentSourceKind>,
    /// Validation profile changes.
    pub profile_changed: Observers<Option<ValidationProfile>>,
    /// Row creation (row index).
    pub external_row_added: Observers<usize>,
    /// Row removal (row index).
    pub external_row_removed: Observers<usize>,
    /// Row content source changes.
    pub external_row_content_type_changed: Observers<(usize, ContentSourceKind)>,
    /// Results page ready.
    pub results_loaded: Observers<ResultsLoaded>,
}

impl FormEvents {
    /// Routes a form event to its channel.
    pub fn publish(&self, event: &FormEvent) {
        match event {
            FormEvent::ContentTypeChanged(kind) => self.content_type_changed.publish(kind),
            FormEvent::ProfileChanged(profile) => self.profile_changed.publish(profile),
            FormEvent::ExternalRowAdded { index } => self.external_row_added.publish(index),
            FormEvent::ExternalRowRemoved { index } => self.external_row_removed.publish(index),
            FormEvent::ExternalRowContentTypeChanged { index, kind } => self
                .external_row_content_type_changed
                .publish(&(*index, *kind)),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn dropping_the_subscription_stops_delivery() {
        let events = FormEvents::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let subscription = events
            .content_type_changed
            .subscribe(move |kind| sink.borrow_mut().push(*kind));

        events.publish(&FormEvent::ContentTypeChanged(ContentSourceKind::Uri));
        drop(subscription);
        events.publish(&FormEvent::ContentTypeChanged(ContentSourceKind::File));

        assert_eq!(*seen.borrow(), vec![ContentSourceKind::Uri]);
        assert!(events.content_type_changed.is_empty());
    }

    #[test]
    fn detached_subscriptions_stay_registered() {
        let observers = Observers::<usize>::default();
        let count = Rc::new(Cell::new(0));
        let sink = Rc::clone(&count);
        observers
            .subscribe(move |index| sink.set(sink.get() + index))
            .detach();

        observers.publish(&2);
        observers.publish(&3);
        assert_eq!(count.get(), 5);
        assert_eq!(observers.len(), 1);
    }

    #[test]
    fn events_reach_only_their_channel() {
        let events = FormEvents::default();
        let rows = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&rows);
        let _added = events
            .external_row_added
            .subscribe(move |index| sink.borrow_mut().push(*index));
        let profiles = Rc::new(Cell::new(0));
        let profile_sink = Rc::clone(&profiles);
        let _profiles = events
            .profile_changed
            .subscribe(move |_| profile_sink.set(profile_sink.get() + 1));

        events.publish(&FormEvent::ExternalRowAdded { index: 4 });
        events.publish(&FormEvent::ExternalRowRemoved { index: 4 });
        events.publish(&FormEvent::ProfileChanged(None));

        assert_eq!(*rows.borrow(), vec![4]);
        assert_eq!(profiles.get(), 1);
    }
}
