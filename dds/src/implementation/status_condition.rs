use std::sync::Arc;

use crate::infrastructure::{
    error::{DdsError, DdsResult},
    status::{StatusKind, StatusMask},
};

use super::entity_node::EntityNode;

/// Makes the change of `kind` visible to the wait trigger of the entity, if that kind
/// is enabled on it.
pub fn signal(node: &EntityNode, kind: StatusKind) {
    let enabled = node.state().status_enabled_mask.contains(kind);
    if enabled {
        tracing::trace!(?kind, entity = ?node.instance_handle(), "Wait trigger signalled");
        node.trigger().set_ready();
    }
}

pub fn set_status_enabled_mask(node: &Arc<EntityNode>, mask: StatusMask) -> DdsResult<()> {
    if !mask.is_subset_of(node.own_statuses()) {
        return Err(DdsError::BadParameter);
    }
    let pending = {
        let mut state = node.state();
        state.check_alive()?;
        state.status_enabled_mask = mask;
        state.status_set.changes()
    };
    if pending.intersects(mask) {
        node.trigger().set_ready();
    }
    Ok(())
}

pub fn get_status_enabled_mask(node: &Arc<EntityNode>) -> DdsResult<StatusMask> {
    let state = node.state();
    state.check_alive()?;
    Ok(state.status_enabled_mask)
}
