//! Owner-scoped publish/subscribe.
//!
//! Listeners are registered under an [`OwnerId`] and can only be removed all at
//! once, by releasing their owner. Components which come and go (blocks, host
//! views) release their owner when they are torn down, which keeps listeners
//! from piling up over the lifetime of a document.
//!
//! Dispatch is synchronous and re-entrant: a listener may publish, subscribe or
//! release while an event is being dispatched. Each publish works on the
//! listeners registered at the time it started.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use super::owner::OwnerId;

type Listener<P> = Rc<dyn Fn(&P)>;
type ListenerId = u64;

struct Registry<E, P> {
    /// Listeners per event type, in subscription order.
    listeners: HashMap<E, Vec<(ListenerId, Listener<P>)>>,
    /// What each owner registered, for bulk release.
    owners: HashMap<OwnerId, Vec<(E, ListenerId)>>,
    next_listener_id: ListenerId,
}

/// Publish/subscribe endpoint for events of type `E` carrying a `P` payload.
pub struct Endpoint<E, P> {
    registry: RefCell<Registry<E, P>>,
}

impl<E, P> Endpoint<E, P>
where
    E: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            registry: RefCell::new(Registry {
                listeners: HashMap::new(),
                owners: HashMap::new(),
                next_listener_id: 0,
            }),
        }
    }

    /// Register `listener` for `event_type` on behalf of `owner`.
    ///
    /// Subscriptions accumulate: registering twice calls the listener twice.
    pub fn subscribe(&self, owner: OwnerId, event_type: E, listener: impl Fn(&P) + 'static) {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_listener_id;
        registry.next_listener_id += 1;
        registry
            .listeners
            .entry(event_type.clone())
            .or_default()
            .push((id, Rc::new(listener)));
        registry
            .owners
            .entry(owner)
            .or_default()
            .push((event_type, id));
    }

    /// Call every listener of `event_type` in subscription order.
    pub fn publish(&self, event_type: &E, payload: &P) {
        let listeners: Vec<Listener<P>> = self
            .registry
            .borrow()
            .listeners
            .get(event_type)
            .map(|listeners| listeners.iter().map(|(_, l)| Rc::clone(l)).collect())
            .unwrap_or_default();
        for listener in listeners {
            listener(payload);
        }
    }

    /// Remove every listener `owner` registered. Releasing an unknown owner
    /// does nothing.
    pub fn release(&self, owner: OwnerId) {
        let mut registry = self.registry.borrow_mut();
        let Some(descriptors) = registry.owners.remove(&owner) else {
            return;
        };
        for (event_type, id) in descriptors {
            if let Some(listeners) = registry.listeners.get_mut(&event_type) {
                listeners.retain(|(listener_id, _)| *listener_id != id);
                if listeners.is_empty() {
                    registry.listeners.remove(&event_type);
                }
            }
        }
    }

    /// Remove all listeners of all owners.
    pub fn release_all(&self) {
        let mut registry = self.registry.borrow_mut();
        registry.listeners.clear();
        registry.owners.clear();
    }

    pub fn listener_count(&self, event_type: &E) -> usize {
        self.registry
            .borrow()
            .listeners
            .get(event_type)
            .map_or(0, Vec::len)
    }

    /// Number of owners with at least one listener.
    pub fn owner_count(&self) -> usize {
        self.registry.borrow().owners.len()
    }
}

impl<E, P> Default for Endpoint<E, P>
where
    E: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E, P> fmt::Debug for Endpoint<E, P>
where
    E: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.borrow();
        let mut counts: Vec<_> = registry
            .listeners
            .iter()
            .map(|(event_type, listeners)| (format!("{event_type:?}"), listeners.len()))
            .collect();
        counts.sort();
        f.debug_struct("Endpoint")
            .field("listeners", &counts)
            .field("owners", &registry.owners.len())
            .finish()
    }
}
