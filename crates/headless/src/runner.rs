//! Fixed-tick session runner with simulated pads.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::f64::consts::TAU;
use std::rc::Rc;
use std::time::Duration;

use lurker_session::{
    AudioCue, Controller, ControllerEvent, Effects, InputSources, MAX_BINDINGS, OverlayCommand,
    Session, SessionConfig, SessionState, SourceId, StateChange,
};
use lurker_sim::{Citizens, EntityId, Players, Position};
use tracing::{debug, info};

use crate::error::HeadlessError;

/// Distance of the player spawn ring from the origin.
const SPAWN_RADIUS: f64 = 6.0;

/// Highest accepted tick rate; keeps the tick interval well above zero.
pub const MAX_TICK_RATE_HZ: u32 = 10_000;

/// Validated runner parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub pads: u32,
    pub citizens: usize,
    /// Clamped to `1..=MAX_TICK_RATE_HZ`.
    pub tick_rate_hz: u32,
    /// Session time after which the run stops.
    pub max_time: Duration,
    pub kill_citizen_every: Option<Duration>,
    pub pause_at: Vec<Duration>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            pads: 4,
            citizens: 8,
            tick_rate_hz: 60,
            max_time: Duration::from_secs(120),
            kill_citizen_every: None,
            pause_at: Vec::new(),
        }
    }
}

impl RunOptions {
    /// Session time advanced per tick. Never zero.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(1) / self.tick_rate_hz.clamp(1, MAX_TICK_RATE_HZ)
    }
}

/// Outcome of one run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub ticks: u64,
    pub elapsed: Duration,
    pub final_state: Option<SessionState>,
    /// Whether the session reached its end-of-session hook.
    pub finished: bool,
    pub transitions: Vec<StateChange>,
    pub citizens_killed: usize,
}

// ============================================================================
// Simulated input
// ============================================================================

/// Pads that never run out. The first bound pad replays the pause schedule.
struct SimPads {
    count: u32,
    clock: Rc<Cell<Duration>>,
    schedule: Option<Rc<RefCell<VecDeque<Duration>>>>,
}

struct SimPad {
    source: SourceId,
    clock: Rc<Cell<Duration>>,
    schedule: Option<Rc<RefCell<VecDeque<Duration>>>>,
}

impl InputSources for SimPads {
    fn enumerate(&self) -> Vec<SourceId> {
        (0..self.count).collect()
    }

    fn bind(&mut self, source: SourceId) -> Option<Box<dyn Controller>> {
        Some(Box::new(SimPad {
            source,
            clock: Rc::clone(&self.clock),
            schedule: self.schedule.take(),
        }))
    }
}

impl Controller for SimPad {
    fn set_controllable(&mut self, entity: EntityId) {
        debug!(source = self.source, entity_id = entity, "pad attached");
    }

    fn update(&mut self, _state: SessionState) -> Option<ControllerEvent> {
        let schedule = self.schedule.as_ref()?;
        let mut schedule = schedule.borrow_mut();
        let due = *schedule.front()? <= self.clock.get();
        if due {
            schedule.pop_front();
            debug!(source = self.source, "pad requests pause toggle");
            return Some(ControllerEvent::PauseRequested);
        }
        None
    }
}

// ============================================================================
// Effects
// ============================================================================

/// Reports effects through `tracing`.
struct LogEffects;

impl Effects for LogEffects {
    fn play_cue(&mut self, cue: AudioCue) {
        info!(?cue, "audio cue");
    }

    fn set_time_scale(&mut self, scale: f64) {
        info!(scale, "time scale");
    }

    fn overlay(&mut self, command: OverlayCommand) {
        match command {
            OverlayCommand::Show { id, kind } => info!(id, kind = kind.as_str(), "overlay shown"),
            OverlayCommand::SetAlpha { id, alpha } => debug!(id, alpha, "overlay faded"),
            OverlayCommand::Dispose { id } => info!(id, "overlay disposed"),
        }
    }
}

// ============================================================================
// Run
// ============================================================================

fn spawn_ring() -> Vec<Position> {
    (0..MAX_BINDINGS)
        .map(|i| {
            let angle = TAU * i as f64 / MAX_BINDINGS as f64;
            [SPAWN_RADIUS * angle.cos(), SPAWN_RADIUS * angle.sin()]
        })
        .collect()
}

/// Drive one session until it finishes or `max_time` of session time passes.
pub fn run(config: SessionConfig, options: &RunOptions) -> Result<RunSummary, HeadlessError> {
    let mut citizens = Citizens::new();
    citizens.populate(options.citizens, [0.0, 0.0]);

    let mut session = Session::new(
        config,
        Players::new(spawn_ring()),
        citizens,
        Box::new(LogEffects),
    )?;
    session.initialize();

    let transitions = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&transitions);
    session.subscribe(move |change| sink.borrow_mut().push(*change));

    let clock = Rc::new(Cell::new(Duration::ZERO));
    let schedule: VecDeque<Duration> = options.pause_at.iter().copied().collect();
    let mut pads = SimPads {
        count: options.pads,
        clock: Rc::clone(&clock),
        schedule: Some(Rc::new(RefCell::new(schedule))),
    };

    let dt = options.tick_interval();
    let max = options.max_time;
    let kill_every = options.kill_citizen_every;
    let mut next_kill = kill_every;
    let mut now = Duration::ZERO;
    let mut ticks = 0u64;
    let mut citizens_killed = 0;

    info!(
        pads = options.pads,
        citizens = options.citizens,
        tick_rate_hz = options.tick_rate_hz,
        "headless run starting"
    );
    session.start_session(&mut pads, now);

    while !session.is_finished() && now < max {
        now += dt;
        ticks += 1;
        clock.set(now);

        if let (Some(at), Some(every)) = (next_kill, kill_every)
            && now >= at
            && session.state() != Some(SessionState::Paused)
        {
            let victim = session
                .citizens()
                .members()
                .iter()
                .find(|c| c.is_alive())
                .map(|c| c.id());
            match victim {
                Some(id) => {
                    session.kill_citizen(id);
                    citizens_killed += 1;
                    next_kill = at.checked_add(every);
                }
                None => next_kill = None,
            }
        }

        session.tick(now);
    }

    let summary = RunSummary {
        ticks,
        elapsed: session.elapsed(now),
        final_state: session.state(),
        finished: session.is_finished(),
        transitions: transitions.borrow().clone(),
        citizens_killed,
    };
    info!(
        ticks,
        finished = summary.finished,
        state = summary.final_state.map(|s| s.as_str()),
        "headless run complete"
    );
    Ok(summary)
}
