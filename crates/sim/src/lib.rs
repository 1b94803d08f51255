//! Lurker Simulation Core
//!
//! This crate owns the avatars of a session and the two populations that
//! report aggregate liveness: the player roster (one of whom is secretly the
//! monster) and the citizens.
//!
//! # Architecture Constraints
//!
//! The simulation crate MUST NOT:
//! - Perform I/O operations (file, network, etc.)
//! - Read wall-clock time
//! - Use ambient/unseeded randomness
//!
//! Roster managers never call back into the session. Every mutation that can
//! change aggregate liveness returns the [`RosterEvent`] it raised, and the
//! caller dispatches it.

#![deny(unsafe_code)]

pub mod citizens;
pub mod players;

pub use citizens::Citizens;
pub use players::Players;

// ============================================================================
// Type Aliases
// ============================================================================

/// Unique identifier for an entity within a session.
///
/// Allocated in spawn order starting at 1; never reused.
pub type EntityId = u64;

/// World-space position of an avatar.
pub type Position = [f64; 2];

// ============================================================================
// Entities
// ============================================================================

/// What an avatar is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A player avatar. `monster` marks the one player who is secretly the
    /// monster until the transformation.
    Player { monster: bool },
    /// The specialized avatar that replaces the disguised player.
    Monster,
}

/// A controllable avatar.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    id: EntityId,
    kind: EntityKind,
    position: Position,
    alive: bool,
}

impl Entity {
    pub(crate) fn new(id: EntityId, kind: EntityKind, position: Position) -> Self {
        Self {
            id,
            kind,
            position,
            alive: true,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// True for the disguised monster player and for the transformed monster.
    pub fn is_monster_role(&self) -> bool {
        match self.kind {
            EntityKind::Player { monster } => monster,
            EntityKind::Monster => true,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Mark the entity dead. Returns false if it already was.
    pub(crate) fn kill(&mut self) -> bool {
        std::mem::replace(&mut self.alive, false)
    }
}

// ============================================================================
// Roster Events
// ============================================================================

/// Aggregate liveness events raised by the roster managers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RosterEvent {
    /// The monster (disguised or transformed) has died.
    MonsterDied,
    /// Every non-monster player avatar has died.
    AllPlayersDied,
    /// Every citizen has died.
    AllCitizensDied,
}

impl RosterEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MonsterDied => "monster_died",
            Self::AllPlayersDied => "all_players_died",
            Self::AllCitizensDied => "all_citizens_died",
        }
    }
}

/// Deterministic EntityId allocator. Each roster owns one.
#[derive(Debug, Clone)]
pub struct EntityIds {
    next: EntityId,
}

impl EntityIds {
    pub fn new() -> Self {
        // 0 is never handed out
        Self { next: 1 }
    }

    pub fn allocate(&mut self) -> EntityId {
        let id = self.next;
        self.next += 1;
        id
    }
}

impl Default for EntityIds {
    fn default() -> Self {
        Self::new()
    }
}
