//! Secondary roster manager: the citizens hiding in the basement.

use tracing::debug;

use crate::{Entity, EntityId, EntityIds, EntityKind, Position, RosterEvent};

/// Secondary Roster Manager.
#[derive(Debug, Clone, Default)]
pub struct Citizens {
    members: Vec<Entity>,
    ids: EntityIds,
    all_died_raised: bool,
}

impl Citizens {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` citizens at `position`. Returns their ids.
    pub fn populate(&mut self, count: usize, position: Position) -> Vec<EntityId> {
        (0..count)
            .map(|_| {
                let id = self.ids.allocate();
                // Citizens are never controllable; the kind only matters for role checks.
                self.members.push(Entity::new(
                    id,
                    EntityKind::Player { monster: false },
                    position,
                ));
                id
            })
            .collect()
    }

    pub fn members(&self) -> &[Entity] {
        &self.members
    }

    pub fn living(&self) -> usize {
        self.members.iter().filter(|e| e.is_alive()).count()
    }

    /// Kill a citizen. Raises `AllCitizensDied` when the last one dies.
    pub fn kill(&mut self, id: EntityId) -> Option<RosterEvent> {
        let citizen = self.members.iter_mut().find(|e| e.id() == id)?;
        if !citizen.kill() {
            return None;
        }
        debug!(entity_id = id, living = self.living(), "citizen died");

        if !self.all_died_raised && self.living() == 0 {
            self.all_died_raised = true;
            return Some(RosterEvent::AllCitizensDied);
        }
        None
    }
}
