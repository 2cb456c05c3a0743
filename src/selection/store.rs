use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::{Rc, Weak};

use super::event::{
    DatasetId, HostAction, SelectionError, SelectionEvent, ViewId, STORE_VIEW_ID,
};

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

type Handler = Box<dyn FnMut(&SelectionEvent)>;

struct Subscriber {
    id: u64,
    view_id: ViewId,
    handler: Rc<RefCell<Handler>>,
}

#[derive(Default)]
struct StoreInner {
    /// Authoritative selection per dataset; last publish wins.
    selections: BTreeMap<DatasetId, Vec<usize>>,
    /// Row counts of registered datasets, used for index validation.
    row_counts: BTreeMap<DatasetId, usize>,
    subscribers: BTreeMap<DatasetId, Vec<Subscriber>>,
    next_id: u64,
    /// Events waiting for delivery; publishes made by a handler land here.
    queue: VecDeque<SelectionEvent>,
    /// Set while the queue is being drained.
    dispatching: bool,
}

// ---------------------------------------------------------------------------
// Selection store + event bus
// ---------------------------------------------------------------------------

/// Single-writer store of the current row selection per dataset, with
/// synchronous publish/subscribe.
///
/// Cloning yields another handle to the same store. One store is created per
/// application context and handed to every view that takes part in linking.
#[derive(Clone, Default)]
pub struct SelectionStore {
    inner: Rc<RefCell<StoreInner>>,
}

/// Handle returned by [`SelectionStore::subscribe`].
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    dataset_id: DatasetId,
    view_id: ViewId,
    store: Weak<RefCell<StoreInner>>,
}

impl Subscription {
    pub fn dataset_id(&self) -> &DatasetId {
        &self.dataset_id
    }

    pub fn view_id(&self) -> &ViewId {
        &self.view_id
    }

    /// Remove the handler from the store. Returns false if the store is gone
    /// or the handler was already removed.
    pub fn unsubscribe(self) -> bool {
        let Some(store) = self.store.upgrade() else {
            return false;
        };
        let mut inner = store.borrow_mut();
        let Some(subs) = inner.subscribers.get_mut(&self.dataset_id) else {
            return false;
        };
        let before = subs.len();
        subs.retain(|s| s.id != self.id);
        let removed = subs.len() != before;
        if subs.is_empty() {
            inner.subscribers.remove(&self.dataset_id);
        }
        removed
    }
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for selections on `dataset_id` on behalf of `view_id`.
    ///
    /// Events published with `sourceViewId == view_id` are never delivered to it.
    pub fn subscribe<F>(&self, dataset_id: DatasetId, view_id: ViewId, handler: F) -> Subscription
    where
        F: FnMut(&SelectionEvent) + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = inner.next_id;
        log::trace!("view '{view_id}' subscribed to dataset '{dataset_id}' (#{id})");
        inner
            .subscribers
            .entry(dataset_id.clone())
            .or_default()
            .push(Subscriber {
                id,
                view_id: view_id.clone(),
                handler: Rc::new(RefCell::new(Box::new(handler))),
            });
        Subscription {
            id,
            dataset_id,
            view_id,
            store: Rc::downgrade(&self.inner),
        }
    }

    /// Store the event's selection and notify every other subscriber of the
    /// dataset. Returns how many handlers ran; a publish made from inside a
    /// handler is queued and returns 0.
    ///
    /// Malformed events are logged and dropped before touching any state.
    pub fn publish(&self, event: SelectionEvent) -> Result<usize, SelectionError> {
        if let Err(e) = self.check(&event) {
            log::warn!("dropping selection event: {e}");
            return Err(e);
        }

        self.inner
            .borrow_mut()
            .selections
            .insert(event.dataset_id.clone(), event.selected_indices.clone());
        log::debug!(
            "view '{}' selected {} rows of '{}'",
            event.source_view_id,
            event.selected_indices.len(),
            event.dataset_id
        );
        Ok(self.notify(&event))
    }

    /// Decode a `{type, payload}` host message and publish it.
    pub fn dispatch_json(&self, text: &str) -> Result<usize, SelectionError> {
        let action = HostAction::from_json(text).map_err(|e| {
            log::warn!("dropping host message: {e}");
            e
        })?;
        match action {
            HostAction::SetSelection(raw) => {
                let event = SelectionEvent::try_from(raw).map_err(|e| {
                    log::warn!("dropping selection event: {e}");
                    e
                })?;
                self.publish(event)
            }
        }
    }

    /// Record the row count of a dataset.
    ///
    /// A changed row count invalidates the stored selection: it is cleared
    /// and subscribers receive an empty selection from [`STORE_VIEW_ID`].
    pub fn register_dataset(&self, dataset_id: DatasetId, num_rows: usize) {
        let cleared = {
            let mut inner = self.inner.borrow_mut();
            let previous = inner.row_counts.insert(dataset_id.clone(), num_rows);
            let resized = previous.is_some_and(|p| p != num_rows);
            let stale = inner
                .selections
                .get(&dataset_id)
                .is_some_and(|sel| sel.iter().any(|&i| i >= num_rows));
            if resized || stale {
                inner.selections.remove(&dataset_id);
                true
            } else {
                false
            }
        };
        log::info!("dataset '{dataset_id}' registered with {num_rows} rows");

        if cleared {
            log::info!("selection on '{dataset_id}' cleared after resize");
            let event = SelectionEvent {
                source_view_id: ViewId::new(STORE_VIEW_ID),
                dataset_id,
                selected_indices: Vec::new(),
            };
            self.notify(&event);
        }
    }

    pub fn row_count(&self, dataset_id: &DatasetId) -> Option<usize> {
        self.inner.borrow().row_counts.get(dataset_id).copied()
    }

    /// Current selection of a dataset; empty if nothing was published.
    pub fn selection(&self, dataset_id: &DatasetId) -> Vec<usize> {
        self.inner
            .borrow()
            .selections
            .get(dataset_id)
            .cloned()
            .unwrap_or_default()
    }

    /// All current selections, for the host persistence layer.
    pub fn snapshot(&self) -> BTreeMap<DatasetId, Vec<usize>> {
        self.inner.borrow().selections.clone()
    }

    pub fn subscriber_count(&self, dataset_id: &DatasetId) -> usize {
        self.inner
            .borrow()
            .subscribers
            .get(dataset_id)
            .map_or(0, Vec::len)
    }

    fn check(&self, event: &SelectionEvent) -> Result<(), SelectionError> {
        event.validate()?;
        if let Some(&num_rows) = self.inner.borrow().row_counts.get(&event.dataset_id) {
            if let Some(&index) = event.selected_indices.iter().find(|&&i| i >= num_rows) {
                return Err(SelectionError::IndexOutOfRange {
                    dataset: event.dataset_id.clone(),
                    index,
                    num_rows,
                });
            }
        }
        Ok(())
    }

    /// Queue `event` and, unless a fan-out is already running, deliver the
    /// queue in order. Returns how many handlers received `event` itself.
    ///
    /// A publish made from inside a handler is delivered after the current
    /// event has reached every subscriber, so views see events in publish
    /// order and finish on the stored selection.
    fn notify(&self, event: &SelectionEvent) -> usize {
        {
            let mut inner = self.inner.borrow_mut();
            inner.queue.push_back(event.clone());
            if inner.dispatching {
                log::trace!("selection on '{}' queued behind the current fan-out", event.dataset_id);
                return 0;
            }
            inner.dispatching = true;
        }

        let mut first = None;
        loop {
            let next = self.inner.borrow_mut().queue.pop_front();
            let Some(queued) = next else {
                break;
            };
            let delivered = self.deliver(&queued);
            first.get_or_insert(delivered);
        }
        self.inner.borrow_mut().dispatching = false;
        first.unwrap_or(0)
    }

    /// Run the handlers of every subscriber except the source view.
    ///
    /// Handlers are collected first and the store borrow released, so a
    /// handler may read the store, subscribe, unsubscribe or publish.
    fn deliver(&self, event: &SelectionEvent) -> usize {
        let targets: Vec<Rc<RefCell<Handler>>> = self
            .inner
            .borrow()
            .subscribers
            .get(&event.dataset_id)
            .map(|subs| {
                subs.iter()
                    .filter(|s| s.view_id != event.source_view_id)
                    .map(|s| Rc::clone(&s.handler))
                    .collect()
            })
            .unwrap_or_default();

        let mut delivered = 0;
        for handler in targets {
            match handler.try_borrow_mut() {
                Ok(mut h) => {
                    let handle = &mut *h;
                    handle(event);
                    delivered += 1;
                }
                Err(_) => log::warn!(
                    "skipping re-entrant delivery on '{}' from '{}'",
                    event.dataset_id,
                    event.source_view_id
                ),
            }
        }
        log::trace!("selection on '{}' delivered to {delivered} views", event.dataset_id);
        delivered
    }
}
