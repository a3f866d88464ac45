use std::sync::Arc;

use crate::{
    configuration::StatusConfiguration,
    implementation::{dispatch, entity_node::EntityNode, status_condition},
};

use super::{
    condition::WaitTrigger,
    error::DdsResult,
    instance::InstanceHandle,
    listener::Listener,
    status::{Status, StatusChange, StatusKind, StatusMask},
};

/// Kind of the DDS entities forming the entity hierarchy.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum EntityKind {
    DomainParticipant,
    Topic,
    Publisher,
    Subscriber,
    DataWriter,
    DataReader,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::DomainParticipant,
        EntityKind::Topic,
        EntityKind::Publisher,
        EntityKind::Subscriber,
        EntityKind::DataWriter,
        EntityKind::DataReader,
    ];

    pub(crate) const fn index(self) -> usize {
        self as usize
    }

    /// Kind of the entity which an entity of this kind must be created on.
    pub const fn parent_kind(self) -> Option<EntityKind> {
        match self {
            EntityKind::DomainParticipant => None,
            EntityKind::Topic | EntityKind::Publisher | EntityKind::Subscriber => {
                Some(EntityKind::DomainParticipant)
            }
            EntityKind::DataWriter => Some(EntityKind::Publisher),
            EntityKind::DataReader => Some(EntityKind::Subscriber),
        }
    }
}

/// Counters of the statuses raised on an entity.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct DispatchStatistics {
    /// Statuses consumed by a listener, with or without a callback.
    pub delivered: u64,
    /// Statuses for which no listener was found. They remain readable on the entity.
    pub undelivered: u64,
    /// Statuses raised while the entity was being deleted.
    pub dropped: u64,
    /// Callbacks which panicked.
    pub callback_failures: u64,
}

/// Creates the domain participants, the roots of the entity hierarchy. All the entities
/// created from the participants share the factory's [`StatusConfiguration`].
pub struct EntityFactory {
    configuration: Arc<StatusConfiguration>,
}

impl Default for EntityFactory {
    fn default() -> Self {
        Self::new(StatusConfiguration::default())
    }
}

impl EntityFactory {
    pub fn new(configuration: StatusConfiguration) -> Self {
        Self {
            configuration: Arc::new(configuration),
        }
    }

    pub fn configuration(&self) -> &StatusConfiguration {
        &self.configuration
    }

    pub fn create_participant(&self) -> Entity {
        Entity::new(EntityNode::new_root(self.configuration.clone()))
    }
}

/// Handle to a DDS entity. Cloning the handle does not create a new entity.
#[derive(Clone)]
pub struct Entity {
    node: Arc<EntityNode>,
}

impl Entity {
    pub(crate) fn new(node: Arc<EntityNode>) -> Self {
        Self { node }
    }

    pub fn kind(&self) -> EntityKind {
        self.node.kind()
    }

    pub fn get_instance_handle(&self) -> InstanceHandle {
        self.node.instance_handle()
    }

    /// Returns the entity this entity was created on, if it still exists.
    pub fn get_parent(&self) -> Option<Entity> {
        self.node.parent().map(Entity::new)
    }

    pub fn get_children(&self) -> Vec<Entity> {
        self.node.children().into_iter().map(Entity::new).collect()
    }

    /// Iterates from this entity up to the root of its hierarchy, this entity included.
    pub fn ancestors(&self) -> impl Iterator<Item = Entity> {
        core::iter::successors(Some(self.clone()), |entity| entity.get_parent())
    }

    /// Creates an entity of `kind` as a child of this entity. Fails with
    /// [`DdsError::BadParameter`](super::error::DdsError::BadParameter) if this entity
    /// cannot contain entities of that kind.
    pub fn create_child(&self, kind: EntityKind) -> DdsResult<Entity> {
        EntityNode::new_child(&self.node, kind).map(Entity::new)
    }

    /// Records a change of communication status and dispatches it synchronously on the
    /// calling thread to the nearest listener enabled for it. Statuses raised on an
    /// entity being deleted are dropped.
    pub fn raise_status(&self, change: StatusChange) {
        dispatch::raise_status(&self.node, change)
    }

    /// Installs `a_listener` for the statuses in `mask`, returning the listener which was
    /// installed before.
    /// Calling this operation from inside a callback of this entity's listener fails with
    /// [`DdsError::IllegalOperation`](super::error::DdsError::IllegalOperation).
    pub fn set_listener(
        &self,
        a_listener: Option<Listener>,
        mask: &[StatusKind],
    ) -> DdsResult<Option<Listener>> {
        dispatch::set_listener(&self.node, a_listener, StatusMask::from(mask))
    }

    pub fn get_listener(&self) -> DdsResult<Option<Listener>> {
        dispatch::get_listener(&self.node).map(|(listener, _)| listener)
    }

    pub fn get_listener_mask(&self) -> DdsResult<StatusMask> {
        dispatch::get_listener(&self.node).map(|(_, mask)| mask)
    }

    /// Defines which statuses make the wait trigger of this entity ready.
    /// If this function is not invoked all the statuses of the entity are enabled.
    pub fn set_status_enabled_mask(&self, mask: &[StatusKind]) -> DdsResult<()> {
        status_condition::set_status_enabled_mask(&self.node, StatusMask::from(mask))
    }

    pub fn get_status_enabled_mask(&self) -> DdsResult<StatusMask> {
        status_condition::get_status_enabled_mask(&self.node)
    }

    /// Returns the value of the status and resets its change indication.
    pub fn get_status(&self, kind: StatusKind) -> DdsResult<Status> {
        dispatch::take_status(&self.node, kind)
    }

    /// Returns the value of the status without resetting its change indication.
    pub fn read_status(&self, kind: StatusKind) -> DdsResult<Status> {
        dispatch::read_status(&self.node, kind)
    }

    pub fn get_status_changes(&self) -> DdsResult<StatusMask> {
        dispatch::get_status_changes(&self.node)
    }

    pub fn trigger_handle(&self) -> WaitTrigger {
        self.node.trigger().clone()
    }

    /// Deletes the entity and its children. Returns after any callback already running
    /// for this entity has completed.
    pub fn delete(&self) -> DdsResult<()> {
        dispatch::delete(&self.node)
    }

    pub fn is_alive(&self) -> bool {
        self.node.state().is_alive()
    }

    pub fn dispatch_statistics(&self) -> DispatchStatistics {
        self.node.counters().snapshot()
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }
}

impl Eq for Entity {}

impl core::fmt::Debug for Entity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Entity")
            .field("kind", &self.kind())
            .field("instance_handle", &self.get_instance_handle())
            .finish()
    }
}
