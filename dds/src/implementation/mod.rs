pub mod dispatch;
pub mod entity_node;
pub mod status_condition;
pub mod status_set;
pub mod utils;
