use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
    thread::{self, ThreadId},
};

use tracing::{debug, error, trace, warn};

use crate::infrastructure::{
    entity::{Entity, EntityKind},
    error::{DdsError, DdsResult},
    listener::Listener,
    status::{Status, StatusChange, StatusKind, StatusMask},
};

use super::{
    entity_node::{EntityNode, Liveness},
    status_condition,
};

/// Marks a status raised on an entity as being dispatched by the current thread.
/// Deleting the entity waits until every such mark is dropped.
struct InFlight<'a> {
    node: &'a Arc<EntityNode>,
    thread: ThreadId,
}

impl<'a> InFlight<'a> {
    fn begin(node: &'a Arc<EntityNode>, change: &StatusChange) -> Option<Self> {
        let kind = change.kind();
        if !node.own_statuses().contains(kind) {
            warn!(
                ?kind,
                entity_kind = ?node.kind(),
                "Status raised on an entity which does not support it"
            );
            return None;
        }

        let thread = thread::current().id();
        let mut state = node.state();
        if !state.is_alive() {
            node.counters().record_dropped();
            debug!(?kind, entity = ?node.instance_handle(), "Status raised on deleted entity dropped");
            return None;
        }
        state.status_set.merge(change);
        state.in_flight.push(thread);
        Some(Self { node, thread })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = self.node.state();
        if let Some(index) = state.in_flight.iter().position(|t| *t == self.thread) {
            state.in_flight.swap_remove(index);
        }
        drop(state);
        self.node.notify_idle();
    }
}

/// Marks the listener of an entity as being run by the current thread.
struct Dispatching<'a> {
    node: &'a EntityNode,
}

impl Drop for Dispatching<'_> {
    fn drop(&mut self) {
        self.node.state().dispatching = None;
        self.node.notify_idle();
    }
}

#[tracing::instrument(level = "trace", skip(origin), fields(entity = ?origin.instance_handle()))]
pub fn raise_status(origin: &Arc<EntityNode>, change: StatusChange) {
    let kind = change.kind();
    let Some(_in_flight) = InFlight::begin(origin, &change) else {
        return;
    };

    let delivered = if kind == StatusKind::DataAvailable
        && origin.configuration().data_on_readers_precedence()
        && offer_data_on_readers(origin)
    {
        true
    } else {
        deliver(origin, kind)
    };

    // One raise is counted once, on the entity it was raised on
    if delivered {
        origin.counters().record_delivered();
    } else {
        origin.counters().record_undelivered();
    }
    status_condition::signal(origin, kind);
}

/// Raises data on readers on the subscriber of `reader`. Returns whether a listener
/// consumed it, in which case the data available status of the reader is not delivered.
fn offer_data_on_readers(reader: &Arc<EntityNode>) -> bool {
    let Some(subscriber) = reader
        .parent()
        .filter(|p| p.kind() == EntityKind::Subscriber)
    else {
        return false;
    };
    if !subscriber.own_statuses().contains(StatusKind::DataOnReaders) {
        return false;
    }
    let Some(_in_flight) = InFlight::begin(&subscriber, &StatusChange::DataOnReaders) else {
        return false;
    };
    let delivered = deliver(&subscriber, StatusKind::DataOnReaders);
    status_condition::signal(&subscriber, StatusKind::DataOnReaders);
    delivered
}

fn deliver(origin: &Arc<EntityNode>, kind: StatusKind) -> bool {
    match resolve(origin, kind) {
        Some(target) => invoke(origin, &target, kind),
        None => {
            trace!(?kind, "No listener enabled for status");
            false
        }
    }
}

/// Finds the nearest entity, starting at `origin` and walking up to the participant,
/// with a listener enabled for `kind`.
pub fn resolve(origin: &Arc<EntityNode>, kind: StatusKind) -> Option<Arc<EntityNode>> {
    let mut current = Some(origin.clone());
    while let Some(node) = current {
        if node.state().is_listening(kind) {
            return Some(node);
        }
        current = node.parent();
    }
    None
}

fn invoke(origin: &Arc<EntityNode>, target: &Arc<EntityNode>, kind: StatusKind) -> bool {
    let current_thread = thread::current().id();
    if target.state().dispatching == Some(current_thread) {
        debug!(
            ?kind,
            target = ?target.instance_handle(),
            "Status raised from inside the listener it resolves to is left pending"
        );
        return false;
    }

    let _dispatch_guard = target.lock_dispatch();
    let callback = {
        let mut target_state = target.state();
        // The listener may have been replaced or the target deleted while waiting for the lock
        if !target_state.is_listening(kind) {
            return false;
        }
        target_state.dispatching = Some(current_thread);
        target_state
            .listener
            .as_ref()
            .and_then(|listener| listener.callback(kind))
    };
    let _dispatching = Dispatching { node: target };

    let status = {
        let mut origin_state = origin.state();
        if !origin_state.is_alive() {
            return false;
        }
        origin_state.status_set.read_and_clear(kind).0
    };

    let Some(callback) = callback else {
        trace!(?kind, target = ?target.instance_handle(), "Status consumed by listener without callback");
        return true;
    };

    let entity = Entity::new(origin.clone());
    trace!(?kind, target = ?target.instance_handle(), "Invoking listener");
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| callback(&entity, &status))) {
        origin.counters().record_callback_failure();
        error!(
            ?kind,
            entity = ?origin.instance_handle(),
            target = ?target.instance_handle(),
            reason = panic_message(payload.as_ref()),
            "Listener callback failed"
        );
    }
    true
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown")
}

#[tracing::instrument(level = "debug", skip(node, listener), fields(entity = ?node.instance_handle()))]
pub fn set_listener(
    node: &Arc<EntityNode>,
    listener: Option<Listener>,
    mask: StatusMask,
) -> DdsResult<Option<Listener>> {
    let current_thread = thread::current().id();
    {
        let state = node.state();
        state.check_alive()?;
        if state.dispatching == Some(current_thread) {
            return Err(DdsError::IllegalOperation);
        }
    }
    if !mask.is_subset_of(node.listener_statuses()) {
        return Err(DdsError::BadParameter);
    }

    let _dispatch_guard = node.lock_dispatch();
    let mut state = node.state();
    state.check_alive()?;
    state.listener_mask = mask;
    Ok(core::mem::replace(&mut state.listener, listener))
}

pub fn get_listener(node: &Arc<EntityNode>) -> DdsResult<(Option<Listener>, StatusMask)> {
    let state = node.state();
    state.check_alive()?;
    Ok((state.listener.clone(), state.listener_mask))
}

/// Explicit poll of a status: returns its value and clears the change indication.
pub fn take_status(node: &Arc<EntityNode>, kind: StatusKind) -> DdsResult<Status> {
    let mut state = node.state();
    state.check_alive()?;
    if !node.own_statuses().contains(kind) {
        return Err(DdsError::BadParameter);
    }
    Ok(state.status_set.read_and_clear(kind).0)
}

pub fn read_status(node: &Arc<EntityNode>, kind: StatusKind) -> DdsResult<Status> {
    let state = node.state();
    state.check_alive()?;
    if !node.own_statuses().contains(kind) {
        return Err(DdsError::BadParameter);
    }
    Ok(state.status_set.read(kind))
}

pub fn get_status_changes(node: &Arc<EntityNode>) -> DdsResult<StatusMask> {
    let state = node.state();
    state.check_alive()?;
    Ok(state.status_set.changes())
}

fn check_deletable(node: &Arc<EntityNode>, thread: ThreadId) -> DdsResult<()> {
    if node.state().is_busy_on(thread) {
        return Err(DdsError::IllegalOperation);
    }
    node.children()
        .iter()
        .try_for_each(|child| check_deletable(child, thread))
}

/// Deletes the entity and all its children. Returns once no status of the entity is being
/// dispatched anymore; no callback is started for it after the entity is marked as deleting.
#[tracing::instrument(level = "debug", skip(node), fields(entity = ?node.instance_handle()))]
pub fn delete(node: &Arc<EntityNode>) -> DdsResult<()> {
    let current_thread = thread::current().id();
    check_deletable(node, current_thread)?;

    {
        // A callback reporting a status of this entity runs with the dispatch lock of
        // this entity or of one of its ancestors held. Taking all of them, from the
        // root down, orders the flip after any such callback and before the next one.
        let chain: Vec<_> = core::iter::successors(Some(node.clone()), |n| n.parent()).collect();
        let _dispatch_guards: Vec<_> = chain
            .iter()
            .rev()
            .filter(|n| n.state().dispatching != Some(current_thread))
            .map(|n| n.lock_dispatch())
            .collect();
        let mut state = node.state();
        state.check_alive()?;
        state.liveness = Liveness::Deleting;
    }

    for child in node.children() {
        match delete(&child) {
            Ok(()) | Err(DdsError::AlreadyDeleted) => (),
            Err(e) => return Err(e),
        }
    }

    let listener = {
        let state = node.state();
        let mut state = node.wait_idle(state);
        state.status_set = Default::default();
        state.listener_mask = StatusMask::empty();
        state.liveness = Liveness::Deleted;
        state.listener.take()
    };
    // Dropped outside of the lock since it may own arbitrary user data
    drop(listener);

    if let Some(parent) = node.parent() {
        parent.remove_child(node);
    }
    debug!("Entity deleted");
    Ok(())
}
