pub mod reconcile;
pub mod report;
pub mod submission;

use serde::{Deserialize, Serialize};

/// The authenticated user a call is made on behalf of
///
/// Authorization has already happened by the time a service sees an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: i64,
}

impl Actor {
    pub fn new(user_id: i64) -> Self {
        Self { user_id }
    }
}
