use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, MutexGuard, Weak,
    },
    thread::ThreadId,
};

use crate::{
    configuration::StatusConfiguration,
    infrastructure::{
        condition::WaitTrigger,
        entity::{DispatchStatistics, EntityKind},
        error::{DdsError, DdsResult},
        instance::InstanceHandle,
        listener::Listener,
        status::{StatusKind, StatusMask},
    },
};

use super::{
    status_set::StatusSet,
    utils::shared_object::{DdsCondvar, DdsMutex},
};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Liveness {
    Alive,
    Deleting,
    Deleted,
}

/// Everything of an entity which is touched by dispatch, guarded by a single lock.
pub struct EntityState {
    pub liveness: Liveness,
    pub status_set: StatusSet,
    pub listener: Option<Listener>,
    pub listener_mask: StatusMask,
    pub status_enabled_mask: StatusMask,
    /// Thread currently running a callback of this entity's listener.
    pub dispatching: Option<ThreadId>,
    /// Threads with a status raised on this entity which is not yet fully dispatched.
    pub in_flight: Vec<ThreadId>,
}

impl EntityState {
    pub fn is_alive(&self) -> bool {
        self.liveness == Liveness::Alive
    }

    pub fn is_listening(&self, kind: StatusKind) -> bool {
        self.is_alive() && self.listener.is_some() && self.listener_mask.contains(kind)
    }

    pub fn is_busy_on(&self, thread: ThreadId) -> bool {
        self.dispatching == Some(thread) || self.in_flight.contains(&thread)
    }

    pub fn is_idle(&self) -> bool {
        self.dispatching.is_none() && self.in_flight.is_empty()
    }

    pub fn check_alive(&self) -> DdsResult<()> {
        if self.is_alive() {
            Ok(())
        } else {
            Err(DdsError::AlreadyDeleted)
        }
    }
}

#[derive(Default)]
pub struct DispatchCounters {
    delivered: AtomicU64,
    undelivered: AtomicU64,
    dropped: AtomicU64,
    callback_failures: AtomicU64,
}

impl DispatchCounters {
    pub fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_undelivered(&self) {
        self.undelivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_callback_failure(&self) {
        self.callback_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DispatchStatistics {
        DispatchStatistics {
            delivered: self.delivered.load(Ordering::Relaxed),
            undelivered: self.undelivered.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            callback_failures: self.callback_failures.load(Ordering::Relaxed),
        }
    }
}

/// A node of the entity hierarchy. The parent owns its children, the children only
/// keep a weak reference to their parent.
pub struct EntityNode {
    kind: EntityKind,
    instance_handle: InstanceHandle,
    configuration: Arc<StatusConfiguration>,
    parent: Weak<EntityNode>,
    children: DdsMutex<Vec<Arc<EntityNode>>>,
    state: DdsMutex<EntityState>,
    idle: DdsCondvar,
    dispatch_lock: DdsMutex<()>,
    trigger: WaitTrigger,
    counters: DispatchCounters,
}

impl EntityNode {
    fn new(
        kind: EntityKind,
        configuration: Arc<StatusConfiguration>,
        parent: Weak<EntityNode>,
    ) -> Self {
        let status_enabled_mask = configuration.own_statuses(kind);
        Self {
            kind,
            instance_handle: InstanceHandle::generate(),
            configuration,
            parent,
            children: DdsMutex::new(Vec::new()),
            state: DdsMutex::new(EntityState {
                liveness: Liveness::Alive,
                status_set: StatusSet::default(),
                listener: None,
                listener_mask: StatusMask::empty(),
                status_enabled_mask,
                dispatching: None,
                in_flight: Vec::new(),
            }),
            idle: DdsCondvar::new(),
            dispatch_lock: DdsMutex::new(()),
            trigger: WaitTrigger::new(),
            counters: DispatchCounters::default(),
        }
    }

    pub fn new_root(configuration: Arc<StatusConfiguration>) -> Arc<Self> {
        Arc::new(Self::new(
            EntityKind::DomainParticipant,
            configuration,
            Weak::new(),
        ))
    }

    pub fn new_child(parent: &Arc<EntityNode>, kind: EntityKind) -> DdsResult<Arc<Self>> {
        if kind.parent_kind() != Some(parent.kind) {
            return Err(DdsError::BadParameter);
        }
        // Holding the parent state lock keeps a concurrent delete of the parent from
        // missing the new child.
        let parent_state = parent.state();
        parent_state.check_alive()?;
        let child = Arc::new(Self::new(
            kind,
            parent.configuration.clone(),
            Arc::downgrade(parent),
        ));
        parent.children.lock().push(child.clone());
        Ok(child)
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn instance_handle(&self) -> InstanceHandle {
        self.instance_handle
    }

    pub fn configuration(&self) -> &StatusConfiguration {
        &self.configuration
    }

    pub fn own_statuses(&self) -> StatusMask {
        self.configuration.own_statuses(self.kind)
    }

    pub fn listener_statuses(&self) -> StatusMask {
        self.configuration.listener_statuses(self.kind)
    }

    pub fn parent(&self) -> Option<Arc<EntityNode>> {
        self.parent.upgrade()
    }

    pub fn children(&self) -> Vec<Arc<EntityNode>> {
        self.children.lock().clone()
    }

    pub fn remove_child(&self, child: &Arc<EntityNode>) {
        self.children.lock().retain(|c| !Arc::ptr_eq(c, child));
    }

    pub fn state(&self) -> MutexGuard<'_, EntityState> {
        self.state.lock()
    }

    /// Blocks until no thread is dispatching on, or has a status in flight on, this entity.
    pub fn wait_idle<'a>(&self, state: MutexGuard<'a, EntityState>) -> MutexGuard<'a, EntityState> {
        self.idle.wait_while(state, |s| !s.is_idle())
    }

    pub fn notify_idle(&self) {
        self.idle.notify_all()
    }

    pub fn lock_dispatch(&self) -> MutexGuard<'_, ()> {
        self.dispatch_lock.lock()
    }

    pub fn trigger(&self) -> &WaitTrigger {
        &self.trigger
    }

    pub fn counters(&self) -> &DispatchCounters {
        &self.counters
    }
}
