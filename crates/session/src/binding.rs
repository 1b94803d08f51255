//! Controller bindings.
//!
//! An input source is a physical device discovered by the host. Binding it
//! yields a [`Controller`], which is then attached to at most one avatar.

use lurker_sim::EntityId;

use crate::state::SessionState;

/// Host-assigned identifier of an input source.
pub type SourceId = u32;

/// Signals a controller raises while being updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerEvent {
    PauseRequested,
}

/// A bound input device.
pub trait Controller {
    /// Attach this controller to `entity`, replacing any previous avatar.
    fn set_controllable(&mut self, entity: EntityId);

    /// Poll the device for this tick. The session state lets the controller
    /// suppress gameplay input while paused.
    fn update(&mut self, state: SessionState) -> Option<ControllerEvent>;
}

/// Input source enumeration.
pub trait InputSources {
    /// Available sources in discovery order. Enumeration is prefix-contiguous.
    fn enumerate(&self) -> Vec<SourceId>;

    /// Claim `source`. Returns `None` if no controller is available for it.
    fn bind(&mut self, source: SourceId) -> Option<Box<dyn Controller>>;
}

/// One input source bound to one avatar.
pub struct ControllerBinding {
    source: SourceId,
    controller: Box<dyn Controller>,
    entity: EntityId,
    is_monster: bool,
}

impl ControllerBinding {
    pub(crate) fn new(
        source: SourceId,
        mut controller: Box<dyn Controller>,
        entity: EntityId,
        is_monster: bool,
    ) -> Self {
        controller.set_controllable(entity);
        Self {
            source,
            controller,
            entity,
            is_monster,
        }
    }

    pub fn source(&self) -> SourceId {
        self.source
    }

    /// The avatar currently driven by this binding.
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// True for the binding chosen as the monster's at session start.
    pub fn is_monster(&self) -> bool {
        self.is_monster
    }

    pub(crate) fn rebind(&mut self, entity: EntityId) {
        self.entity = entity;
        self.controller.set_controllable(entity);
    }

    pub(crate) fn update(&mut self, state: SessionState) -> Option<ControllerEvent> {
        self.controller.update(state)
    }
}

impl std::fmt::Debug for ControllerBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerBinding")
            .field("source", &self.source)
            .field("entity", &self.entity)
            .field("is_monster", &self.is_monster)
            .finish_non_exhaustive()
    }
}
