//! Fan-out of [`ClientEvent`]s to subscriber callbacks.
//!
//! Handlers are grouped per [`EventName`] and invoked in registration order.
//! A handler that panics is caught and logged; the remaining handlers still
//! run and the publisher never sees the fault.
//!
//! Handlers are identified by their [`Handler`] allocation, so the same
//! handle may be registered more than once and [`unsubscribe`](EventDispatcher::unsubscribe)
//! removes one registration at a time.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use tracing::{debug, error};

use crate::event::{ClientEvent, EventName};
use crate::sync::lock;

/// A shareable subscriber callback.
pub type Handler = Arc<dyn Fn(&ClientEvent) + Send + Sync + 'static>;

/// Wrap a closure into a [`Handler`] handle suitable for `on`/`off`.
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&ClientEvent) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Ordered event-name → handlers table.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: Mutex<HashMap<EventName, Vec<Handler>>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `handler` to the list for `name`.
    pub fn subscribe(&self, name: EventName, handler: Handler) {
        lock(&self.handlers).entry(name).or_default().push(handler);
    }

    /// Remove the first registration of `handler` for `name`.
    ///
    /// Returns `false` if the handler was not registered.
    pub fn unsubscribe(&self, name: EventName, handler: &Handler) -> bool {
        let mut handlers = lock(&self.handlers);
        let Some(list) = handlers.get_mut(&name) else {
            return false;
        };
        let Some(position) = list.iter().position(|h| Arc::ptr_eq(h, handler)) else {
            return false;
        };
        list.remove(position);
        if list.is_empty() {
            handlers.remove(&name);
        }
        true
    }

    /// Invoke every handler currently registered for the event's name.
    ///
    /// The handler list is snapshotted before invocation, so handlers may
    /// subscribe or unsubscribe from inside a callback.
    pub fn publish(&self, event: &ClientEvent) {
        let name = event.name();
        let snapshot: Vec<Handler> = lock(&self.handlers)
            .get(&name)
            .map(|list| list.to_vec())
            .unwrap_or_default();

        debug!(event = %name, handlers = snapshot.len(), "publishing event");

        for (index, handler) in snapshot.iter().enumerate() {
            if panic::catch_unwind(AssertUnwindSafe(|| handler(event))).is_err() {
                error!(event = %name, handler = index, "event handler panicked");
            }
        }
    }

    /// Number of registrations for `name`.
    pub fn handler_count(&self, name: EventName) -> usize {
        lock(&self.handlers).get(&name).map_or(0, Vec::len)
    }

    /// Drop every registration.
    pub fn clear(&self) {
        lock(&self.handlers).clear();
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let handlers = lock(&self.handlers);
        let mut names: Vec<_> = handlers.iter().map(|(n, l)| (*n, l.len())).collect();
        names.sort();
        f.debug_struct("EventDispatcher")
            .field("handlers", &names)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn recorder(log: &Arc<Mutex<Vec<&'static str>>>, tag: &'static str) -> Handler {
        let log = Arc::clone(log);
        handler(move |_| log.lock().unwrap().push(tag))
    }

    fn reconnecting(attempt: u32) -> ClientEvent {
        ClientEvent::Reconnecting { attempt }
    }

    #[test]
    fn handlers_run_in_registration_order() {
        let dispatcher = EventDispatcher::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        dispatcher.subscribe(EventName::Reconnecting, recorder(&log, "a"));
        dispatcher.subscribe(EventName::Reconnecting, recorder(&log, "b"));
        dispatcher.subscribe(EventName::Reconnecting, recorder(&log, "c"));

        dispatcher.publish(&reconnecting(1));

        assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn only_handlers_for_the_published_name_run() {
        let dispatcher = EventDispatcher::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        dispatcher.subscribe(EventName::Reconnecting, recorder(&log, "reconnecting"));
        dispatcher.subscribe(EventName::Disconnected, recorder(&log, "disconnected"));

        dispatcher.publish(&reconnecting(2));

        assert_eq!(*log.lock().unwrap(), vec!["reconnecting"]);
    }

    #[test]
    fn same_handler_registered_twice_runs_twice_and_unsubscribes_once() {
        let dispatcher = EventDispatcher::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let h = recorder(&log, "h");
        dispatcher.subscribe(EventName::Reconnecting, Arc::clone(&h));
        dispatcher.subscribe(EventName::Reconnecting, Arc::clone(&h));

        dispatcher.publish(&reconnecting(1));
        assert_eq!(log.lock().unwrap().len(), 2);

        assert!(dispatcher.unsubscribe(EventName::Reconnecting, &h));
        assert_eq!(dispatcher.handler_count(EventName::Reconnecting), 1);

        dispatcher.publish(&reconnecting(2));
        assert_eq!(log.lock().unwrap().len(), 3);
    }

    #[test]
    fn unsubscribe_matches_identity_not_position() {
        let dispatcher = EventDispatcher::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let first = recorder(&log, "first");
        let second = recorder(&log, "second");
        let third = recorder(&log, "third");
        for h in [&first, &second, &third] {
            dispatcher.subscribe(EventName::Reconnecting, Arc::clone(h));
        }

        assert!(dispatcher.unsubscribe(EventName::Reconnecting, &second));
        dispatcher.publish(&reconnecting(1));

        assert_eq!(*log.lock().unwrap(), vec!["first", "third"]);
    }

    #[test]
    fn unsubscribe_unknown_handler_is_noop() {
        let dispatcher = EventDispatcher::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let registered = recorder(&log, "registered");
        let stranger = recorder(&log, "stranger");
        dispatcher.subscribe(EventName::Reconnecting, Arc::clone(&registered));

        assert!(!dispatcher.unsubscribe(EventName::Reconnecting, &stranger));
        assert!(!dispatcher.unsubscribe(EventName::Connected, &registered));
        assert_eq!(dispatcher.handler_count(EventName::Reconnecting), 1);
    }

    #[test]
    fn panicking_handler_does_not_stop_siblings() {
        let dispatcher = EventDispatcher::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        dispatcher.subscribe(EventName::Reconnecting, recorder(&log, "before"));
        dispatcher.subscribe(
            EventName::Reconnecting,
            handler(|_| panic!("handler exploded")),
        );
        dispatcher.subscribe(EventName::Reconnecting, recorder(&log, "after"));

        dispatcher.publish(&reconnecting(1));

        assert_eq!(*log.lock().unwrap(), vec!["before", "after"]);
    }

    #[test]
    fn handler_may_unsubscribe_itself_during_publish() {
        let dispatcher = Arc::new(EventDispatcher::new());
        let calls = Arc::new(Mutex::new(0u32));
        let slot: Arc<Mutex<Option<Handler>>> = Arc::new(Mutex::new(None));

        let h = {
            let dispatcher = Arc::clone(&dispatcher);
            let calls = Arc::clone(&calls);
            let slot = Arc::clone(&slot);
            handler(move |_| {
                *calls.lock().unwrap() += 1;
                if let Some(me) = slot.lock().unwrap().as_ref() {
                    dispatcher.unsubscribe(EventName::Reconnecting, me);
                }
            })
        };
        *slot.lock().unwrap() = Some(Arc::clone(&h));
        dispatcher.subscribe(EventName::Reconnecting, h);

        dispatcher.publish(&reconnecting(1));
        dispatcher.publish(&reconnecting(2));

        assert_eq!(*calls.lock().unwrap(), 1);
        assert_eq!(dispatcher.handler_count(EventName::Reconnecting), 0);
    }

    #[test]
    fn handler_receives_the_payload() {
        let dispatcher = EventDispatcher::new();
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        dispatcher.subscribe(
            EventName::Reconnecting,
            handler(move |event| *sink.lock().unwrap() = Some(event.clone())),
        );

        dispatcher.publish(&reconnecting(4));

        assert_eq!(*seen.lock().unwrap(), Some(reconnecting(4)));
    }

    #[test]
    fn clear_removes_everything() {
        let dispatcher = EventDispatcher::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        dispatcher.subscribe(EventName::Connected, recorder(&log, "x"));
        dispatcher.clear();
        assert_eq!(dispatcher.handler_count(EventName::Connected), 0);
        assert!(format!("{dispatcher:?}").contains("EventDispatcher"));
    }
}
