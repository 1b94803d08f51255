//! Shared doubles for the session integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use lurker_session::{
    AudioCue, Controller, ControllerEvent, Effects, InputSources, NotificationKind,
    OverlayCommand, Session, SessionConfig, SessionState, SourceId, StateChange,
};
use lurker_sim::{Citizens, EntityId, Players};

pub const CITIZENS: usize = 3;

pub fn secs(s: f64) -> Duration {
    Duration::from_secs_f64(s)
}

// ============================================================================
// Input doubles
// ============================================================================

/// Test-side view of one scripted pad.
#[derive(Clone, Default)]
pub struct PadHandle {
    /// Pause requests still to be raised, one per update.
    pub pause_requests: Rc<Cell<u32>>,
    pub attached: Rc<RefCell<Vec<EntityId>>>,
    pub seen: Rc<RefCell<Vec<SessionState>>>,
}

impl PadHandle {
    pub fn request_pause(&self) {
        self.pause_requests.set(self.pause_requests.get() + 1);
    }

    pub fn controlled(&self) -> Option<EntityId> {
        self.attached.borrow().last().copied()
    }
}

struct ScriptedPad {
    handle: PadHandle,
}

impl Controller for ScriptedPad {
    fn set_controllable(&mut self, entity: EntityId) {
        self.handle.attached.borrow_mut().push(entity);
    }

    fn update(&mut self, state: SessionState) -> Option<ControllerEvent> {
        self.handle.seen.borrow_mut().push(state);
        let pending = self.handle.pause_requests.get();
        if pending > 0 {
            self.handle.pause_requests.set(pending - 1);
            Some(ControllerEvent::PauseRequested)
        } else {
            None
        }
    }
}

/// `sources` enumerated sources, of which the first `bindable` yield a pad.
pub struct Pads {
    sources: u32,
    bindable: u32,
    pub handles: Vec<PadHandle>,
}

impl Pads {
    pub fn new(sources: u32) -> Self {
        Self::with_bindable(sources, sources)
    }

    pub fn with_bindable(sources: u32, bindable: u32) -> Self {
        Self {
            sources,
            bindable,
            handles: Vec::new(),
        }
    }
}

impl InputSources for Pads {
    fn enumerate(&self) -> Vec<SourceId> {
        (0..self.sources).collect()
    }

    fn bind(&mut self, source: SourceId) -> Option<Box<dyn Controller>> {
        if source >= self.bindable {
            return None;
        }
        let handle = PadHandle::default();
        self.handles.push(handle.clone());
        Some(Box::new(ScriptedPad { handle }))
    }
}

// ============================================================================
// Effect and listener recorders
// ============================================================================

#[derive(Debug, Default)]
pub struct EffectLog {
    pub cues: Vec<AudioCue>,
    pub time_scales: Vec<f64>,
    pub overlays: Vec<OverlayCommand>,
}

impl EffectLog {
    pub fn shown(&self, kind: NotificationKind) -> usize {
        self.overlays
            .iter()
            .filter(|c| matches!(c, OverlayCommand::Show { kind: k, .. } if *k == kind))
            .count()
    }
}

pub struct RecordingEffects(pub Rc<RefCell<EffectLog>>);

impl Effects for RecordingEffects {
    fn play_cue(&mut self, cue: AudioCue) {
        self.0.borrow_mut().cues.push(cue);
    }

    fn set_time_scale(&mut self, scale: f64) {
        self.0.borrow_mut().time_scales.push(scale);
    }

    fn overlay(&mut self, command: OverlayCommand) {
        self.0.borrow_mut().overlays.push(command);
    }
}

/// A session wired to recorders.
pub struct Harness {
    pub session: Session,
    pub pads: Pads,
    pub changes: Rc<RefCell<Vec<StateChange>>>,
    pub effects: Rc<RefCell<EffectLog>>,
}

impl Harness {
    /// Initialized but not started.
    pub fn new(config: SessionConfig, pads: Pads) -> Self {
        let spawns = vec![[0.0, 0.0], [4.0, 0.0], [0.0, 4.0], [4.0, 4.0]];
        let mut citizens = Citizens::new();
        citizens.populate(CITIZENS, [10.0, 10.0]);

        let effects = Rc::new(RefCell::new(EffectLog::default()));
        let mut session = Session::new(
            config,
            Players::new(spawns),
            citizens,
            Box::new(RecordingEffects(Rc::clone(&effects))),
        )
        .expect("valid config");
        session.initialize();

        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&changes);
        session.subscribe(move |change| sink.borrow_mut().push(*change));

        Self {
            session,
            pads,
            changes,
            effects,
        }
    }

    /// Initialized and started at t = 0.
    pub fn started(config: SessionConfig, pads: Pads) -> Self {
        let mut harness = Self::new(config, pads);
        harness
            .session
            .start_session(&mut harness.pads, Duration::ZERO);
        harness
    }

    pub fn states(&self) -> Vec<SessionState> {
        self.changes.borrow().iter().map(|c| c.state).collect()
    }

    pub fn tick(&mut self, at: f64) {
        self.session.tick(secs(at));
    }

    /// The pad bound to the monster's binding.
    pub fn monster_pad(&self) -> Option<&PadHandle> {
        let index = self
            .session
            .bindings()
            .iter()
            .position(|b| b.is_monster())?;
        self.pads.handles.get(index)
    }

    pub fn first_innocent(&self) -> Option<EntityId> {
        self.session
            .players()
            .roster()
            .iter()
            .find(|e| !e.is_monster_role() && e.is_alive())
            .map(|e| e.id())
    }

    pub fn disguised_monster(&self) -> Option<EntityId> {
        self.session
            .players()
            .roster()
            .iter()
            .find(|e| e.is_monster_role())
            .map(|e| e.id())
    }
}
