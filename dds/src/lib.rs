//! Communication status and listener dispatch for the entities of a Data Distribution
//! Service (DDS) domain.
//!
//! Every [`Entity`](infrastructure::entity::Entity) accumulates the statuses raised on it with
//! [`Entity::raise_status`](infrastructure::entity::Entity::raise_status). Each raised status is
//! delivered to at most one [`Listener`](infrastructure::listener::Listener): the one of the
//! nearest entity, going from the entity up to its participant, which is enabled for that status
//! kind. Independently of the listeners, the change makes the
//! [`WaitTrigger`](infrastructure::condition::WaitTrigger) of the entity ready if the status
//! kind is enabled on it.
//!
//! Dispatch is synchronous and runs on the thread raising the status. Callbacks of one listener
//! never overlap, and no callback is started for an entity once its deletion has begun.

/// Contains the [`StatusConfiguration`](configuration::StatusConfiguration) which defines the
/// statuses applicable to each entity kind
pub mod configuration;
/// Contains the public types of the entity, listener and status API
pub mod infrastructure;

mod implementation;

pub use crate::infrastructure::error::{DdsError, DdsResult};
