//! Player roster manager.
//!
//! Owns the player avatars of a session, in creation order, plus the slot for
//! the transformed monster. The transformed monster is kept out
//! of [`Players::roster`]: a roster scan finds the disguised monster player
//! only, so transforming twice is a no-op the second time.

use tracing::{debug, info};

use crate::{Entity, EntityId, EntityIds, EntityKind, Position, RosterEvent};

/// Player Roster Manager.
#[derive(Debug, Clone)]
pub struct Players {
    spawn_points: Vec<Position>,
    roster: Vec<Entity>,
    monster: Option<Entity>,
    ids: EntityIds,
    all_died_raised: bool,
}

impl Players {
    /// Create a roster that can hold one avatar per spawn point.
    pub fn new(spawn_points: Vec<Position>) -> Self {
        Self {
            spawn_points,
            roster: Vec::new(),
            monster: None,
            ids: EntityIds::new(),
            all_died_raised: false,
        }
    }

    /// Create a player avatar at the next free spawn point.
    ///
    /// Returns `None` once every spawn point is taken.
    pub fn create_entity(&mut self, is_monster: bool) -> Option<EntityId> {
        let position = *self.spawn_points.get(self.roster.len())?;
        let id = self.ids.allocate();
        self.roster.push(Entity::new(
            id,
            EntityKind::Player {
                monster: is_monster,
            },
            position,
        ));
        debug!(entity_id = id, is_monster, ?position, "player avatar created");
        Some(id)
    }

    /// Player avatars in creation order.
    pub fn roster(&self) -> &[Entity] {
        &self.roster
    }

    /// The transformed monster, once it exists.
    pub fn monster(&self) -> Option<&Entity> {
        self.monster.as_ref()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.roster
            .iter()
            .chain(self.monster.iter())
            .find(|e| e.id() == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.roster
            .iter_mut()
            .chain(self.monster.iter_mut())
            .find(|e| e.id() == id)
    }

    /// Remove a player avatar from the roster and hand it back.
    pub fn destroy(&mut self, id: EntityId) -> Option<Entity> {
        let index = self.roster.iter().position(|e| e.id() == id)?;
        let entity = self.roster.remove(index);
        debug!(entity_id = id, "player avatar destroyed");
        Some(entity)
    }

    /// Spawn the specialized monster avatar at `position`.
    ///
    /// Replaces any previous monster avatar.
    pub fn spawn_monster(&mut self, position: Position) -> EntityId {
        let id = self.ids.allocate();
        self.monster = Some(Entity::new(id, EntityKind::Monster, position));
        info!(entity_id = id, ?position, "monster avatar spawned");
        id
    }

    /// Kill an avatar and report any aggregate liveness event it causes.
    pub fn kill(&mut self, id: EntityId) -> Option<RosterEvent> {
        let entity = self.get_mut(id)?;
        if !entity.kill() {
            return None;
        }

        if entity.is_monster_role() {
            return Some(RosterEvent::MonsterDied);
        }

        let mut innocents = self.roster.iter().filter(|e| !e.is_monster_role());
        if !self.all_died_raised && innocents.all(|e| !e.is_alive()) {
            self.all_died_raised = true;
            return Some(RosterEvent::AllPlayersDied);
        }

        None
    }

    /// Number of living avatars, the transformed monster included.
    pub fn living(&self) -> usize {
        self.roster
            .iter()
            .chain(self.monster.iter())
            .filter(|e| e.is_alive())
            .count()
    }
}
