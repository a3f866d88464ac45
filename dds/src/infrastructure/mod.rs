/// Contains the [`WaitTrigger`](condition::WaitTrigger) of an entity
pub mod condition;
/// Contains the [`Entity`](entity::Entity) handle, the entity kinds and the factory of the participants
pub mod entity;
/// Contains the [`DdsError`](error::DdsError) and [`DdsResult`](error::DdsResult) types
pub mod error;
pub mod instance;
/// Contains the [`Listener`](listener::Listener) which can be installed on an entity
pub mod listener;
pub mod qos_policy;
/// Contains the communication status kinds, the changes raised on entities and the status structures
pub mod status;
