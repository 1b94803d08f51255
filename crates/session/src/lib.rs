//! Lurker Session
//!
//! The session state machine is the single source of truth for the phase of
//! a local multiplayer session. It owns:
//! - Controller bindings, including the one binding chosen as the monster's
//! - The session clock and the pause debounce
//! - Phase timeouts and the scripted player-to-monster transformation
//! - Dispatch of roster events and notification sequences
//!
//! # Control flow
//!
//! The host constructs a [`Session`] with its collaborators, calls
//! [`Session::initialize`] to register the roster subscriptions, then
//! [`Session::start_session`] once the input sources are known, and finally
//! [`Session::tick`] once per simulation step. Roster events and timeouts
//! both funnel into the same transition routine, which publishes a
//! [`StateChange`] to every listener before returning.
//!
//! Everything here is single-threaded and synchronous: a transition caused
//! by a roster event completes before control returns to the caller that
//! reported the event.

#![deny(unsafe_code)]

pub mod binding;
pub mod clock;
pub mod config;
pub mod effects;
pub mod error;
pub mod notify;
pub mod state;

use std::collections::HashSet;
use std::time::Duration;

use lurker_sim::{Citizens, EntityId, Players, RosterEvent};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

pub use binding::{Controller, ControllerBinding, ControllerEvent, InputSources, SourceId};
pub use clock::{PAUSE_DEBOUNCE, SessionClock};
pub use config::{PhaseClock, PhaseDurations, SessionConfig};
pub use effects::{AudioCue, Effects, NullEffects};
pub use error::ConfigError;
pub use notify::{NotificationKind, NotificationTiming, Notifications, OverlayCommand};
pub use state::{ListenerId, Listeners, SessionState, StateChange};

/// Maximum number of input sources bound at session start.
pub const MAX_BINDINGS: usize = 4;

/// Every roster event the session reacts to.
const SUBSCRIBED_EVENTS: [RosterEvent; 3] = [
    RosterEvent::MonsterDied,
    RosterEvent::AllPlayersDied,
    RosterEvent::AllCitizensDied,
];

// ============================================================================
// Session
// ============================================================================

/// Session state machine.
pub struct Session {
    config: SessionConfig,
    players: Players,
    citizens: Citizens,
    effects: Box<dyn Effects>,
    rng: ChaCha8Rng,
    /// `None` until `start_session`.
    state: Option<SessionState>,
    /// State to restore on resume; only set while paused.
    last_state: Option<SessionState>,
    /// State the session was in when paused.
    paused_from: Option<SessionState>,
    clock: SessionClock,
    /// Session time at which the current phase was entered.
    phase_entered_at: Duration,
    /// Bindings in discovery order.
    bindings: Vec<ControllerBinding>,
    listeners: Listeners,
    notifications: Notifications,
    subscriptions: HashSet<RosterEvent>,
    ended_hook_fired: bool,
}

impl Session {
    /// Create a session over its collaborators.
    ///
    /// Fails only if `config` does not validate.
    pub fn new(
        config: SessionConfig,
        players: Players,
        citizens: Citizens,
        effects: Box<dyn Effects>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            notifications: Notifications::new(config.notifications),
            config,
            players,
            citizens,
            effects,
            state: None,
            last_state: None,
            paused_from: None,
            clock: SessionClock::new(),
            phase_entered_at: Duration::ZERO,
            bindings: Vec::new(),
            listeners: Listeners::new(),
            subscriptions: HashSet::new(),
            ended_hook_fired: false,
        })
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Register the roster subscriptions. Safe to call more than once.
    pub fn initialize(&mut self) {
        if self.is_initialized() {
            debug!("session already initialized");
            return;
        }
        self.subscriptions.extend(SUBSCRIBED_EVENTS);
        debug!(events = SUBSCRIBED_EVENTS.len(), "roster subscriptions registered");
    }

    pub fn is_initialized(&self) -> bool {
        SUBSCRIBED_EVENTS
            .iter()
            .all(|event| self.subscriptions.contains(event))
    }

    /// Drop the roster subscriptions and every state listener.
    pub fn teardown(&mut self) {
        self.subscriptions.clear();
        self.listeners.clear();
        debug!("session torn down");
    }

    /// Bind input sources to freshly created avatars and enter `FirstPhase`.
    ///
    /// At most [`MAX_BINDINGS`] sources are bound, in discovery order, and
    /// binding stops at the first source that yields no controller. One index
    /// in `[0, sources)` is drawn as the monster; if that index is never
    /// bound, the session runs without a monster binding.
    pub fn start_session(&mut self, sources: &mut dyn InputSources, now: Duration) {
        if self.state.is_some() {
            warn!("session already started; ignoring start request");
            return;
        }
        if !self.is_initialized() {
            warn!("starting a session that was never initialized; roster events will be dropped");
        }

        let available = sources.enumerate();
        let monster_index = if available.is_empty() {
            None
        } else {
            Some(self.rng.gen_range(0..available.len()))
        };
        info!(available = available.len(), ?monster_index, "starting session");

        for (index, &source) in available.iter().take(MAX_BINDINGS).enumerate() {
            let Some(controller) = sources.bind(source) else {
                debug!(source, "no controller for source; stopping binding");
                break;
            };

            let is_monster = monster_index == Some(index);
            let Some(entity) = self.players.create_entity(is_monster) else {
                warn!(source, "player roster refused a new avatar");
                continue;
            };

            debug!(source, entity_id = entity, is_monster, "controller bound");
            self.bindings
                .push(ControllerBinding::new(source, controller, entity, is_monster));
        }

        if self.monster_binding().is_none() {
            warn!("no binding controls the monster this session");
        }

        self.clock.start(now);
        self.change_state(SessionState::FirstPhase);
    }

    // ------------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------------

    /// Advance one simulation step at session-timeline time `now`.
    ///
    /// Every bound controller is updated first, then the phase timeout of the
    /// current state is evaluated. Timeouts are skipped while paused.
    pub fn tick(&mut self, now: Duration) {
        if self.state.is_none() {
            return;
        }
        self.clock.advance(now);

        for index in 0..self.bindings.len() {
            let Some(state) = self.state else { break };
            if let Some(ControllerEvent::PauseRequested) = self.bindings[index].update(state) {
                self.request_pause_toggle(now);
            }
        }

        self.evaluate_timeout();
        self.pump_notifications();
    }

    fn evaluate_timeout(&mut self) {
        let Some(state) = self.state else { return };
        let elapsed = self.phase_elapsed();
        let phases = self.config.phases;

        match state {
            SessionState::FirstPhase if elapsed > phases.first_phase() => {
                self.play_notification(NotificationKind::MonsterRevealed);
                self.transform_player_into_monster();
                self.effects.play_cue(AudioCue::Scream);
                self.change_state(SessionState::SecondPhase);
            }
            SessionState::SecondPhase if elapsed > phases.second_phase() => {
                self.change_state(SessionState::Ended);
            }
            SessionState::Ended if elapsed > phases.ended_phase() && !self.ended_hook_fired => {
                self.ended_hook_fired = true;
                info!(elapsed_secs = elapsed.as_secs_f64(), "ended phase elapsed");
            }
            _ => {}
        }
    }

    /// Time the current phase has been running, per the configured clock.
    fn phase_elapsed(&self) -> Duration {
        let elapsed = self.clock.current_elapsed();
        match self.config.phase_clock {
            PhaseClock::Session => elapsed,
            PhaseClock::PhaseEntry => elapsed.saturating_sub(self.phase_entered_at),
        }
    }

    // ------------------------------------------------------------------------
    // Pause
    // ------------------------------------------------------------------------

    /// Toggle pause, unless a toggle happened less than [`PAUSE_DEBOUNCE`] ago.
    ///
    /// Pausing saves the current state and freezes simulation time; resuming
    /// restores the saved state and publishes it. If a roster event changed
    /// the state to restore while paused, that phase counts as entered at
    /// resume. Toggles before the session starts or after it ended are ignored.
    pub fn request_pause_toggle(&mut self, now: Duration) {
        let Some(state) = self.state else {
            debug!("pause toggle before session start ignored");
            return;
        };
        self.clock.observe(now);

        if self.clock.is_guarded(now) {
            debug!("pause toggle debounced");
            return;
        }

        match state {
            SessionState::Ended => {
                debug!("pause toggle after session end ignored");
                return;
            }
            SessionState::Paused => {
                let Some(restored) = self.last_state.take() else {
                    warn!("paused without a state to restore");
                    return;
                };
                if self.paused_from.take() != Some(restored) {
                    self.phase_entered_at = self.clock.current_elapsed();
                }
                self.set_time_scale(1.0);
                self.state = Some(restored);
                info!(state = %restored, "session resumed");
            }
            running => {
                self.last_state = Some(running);
                self.paused_from = Some(running);
                self.set_time_scale(0.0);
                self.state = Some(SessionState::Paused);
                info!(from = %running, "session paused");
            }
        }

        self.clock.arm_guard(now);
        self.publish();
    }

    fn set_time_scale(&mut self, scale: f64) {
        self.clock.set_time_scale(scale);
        self.effects.set_time_scale(scale);
    }

    // ------------------------------------------------------------------------
    // Transformation
    // ------------------------------------------------------------------------

    /// Replace the disguised monster player with the monster avatar.
    ///
    /// The new avatar spawns where the old one stood and is handed to the
    /// binding chosen as the monster's at session start. Does nothing when no
    /// living roster entity is flagged as the monster.
    pub fn transform_player_into_monster(&mut self) {
        let Some(disguised) = self
            .players
            .roster()
            .iter()
            .find(|e| e.is_monster_role() && e.is_alive())
            .map(|e| e.id())
        else {
            debug!("no disguised monster in roster; transformation skipped");
            return;
        };

        let Some(old) = self.players.destroy(disguised) else {
            return;
        };
        let monster = self.players.spawn_monster(old.position());

        match self.bindings.iter_mut().find(|b| b.is_monster()) {
            Some(binding) => binding.rebind(monster),
            None => warn!(entity_id = monster, "monster avatar has no controller"),
        }
        info!(from = disguised, to = monster, "player transformed into monster");
    }

    // ------------------------------------------------------------------------
    // Roster events
    // ------------------------------------------------------------------------

    /// Handle an event raised by a roster manager.
    pub fn on_roster_event(&mut self, event: RosterEvent) {
        if !self.subscriptions.contains(&event) {
            warn!(event = event.as_str(), "roster event without subscription dropped");
            return;
        }
        let Some(state) = self.state else {
            warn!(event = event.as_str(), "roster event before session start dropped");
            return;
        };
        if state.is_terminal() {
            debug!(event = event.as_str(), "roster event after session end ignored");
            return;
        }

        info!(event = event.as_str(), state = %state, "roster event");
        match event {
            RosterEvent::MonsterDied => {
                self.play_notification(NotificationKind::PlayersWin);
                self.enter_or_retarget(SessionState::SecondPhase);
            }
            RosterEvent::AllPlayersDied => {
                self.play_notification(NotificationKind::MonsterWins);
                self.enter_or_retarget(SessionState::SecondPhase);
            }
            RosterEvent::AllCitizensDied => {
                if state == SessionState::Paused {
                    self.last_state = None;
                    self.paused_from = None;
                    self.set_time_scale(1.0);
                }
                self.change_state(SessionState::Ended);
            }
        }
    }

    /// While paused, make `next` the state to restore instead of entering it.
    fn enter_or_retarget(&mut self, next: SessionState) {
        if self.state == Some(SessionState::Paused) {
            debug!(state = %next, "paused; state to restore updated");
            self.last_state = Some(next);
        } else {
            self.change_state(next);
        }
    }

    /// Kill a player avatar and dispatch the event it raises.
    pub fn kill_player(&mut self, id: EntityId) -> Option<RosterEvent> {
        let event = self.players.kill(id);
        if let Some(event) = event {
            self.on_roster_event(event);
        }
        event
    }

    /// Kill a citizen and dispatch the event it raises.
    pub fn kill_citizen(&mut self, id: EntityId) -> Option<RosterEvent> {
        let event = self.citizens.kill(id);
        if let Some(event) = event {
            self.on_roster_event(event);
        }
        event
    }

    // ------------------------------------------------------------------------
    // Transitions and notifications
    // ------------------------------------------------------------------------

    fn change_state(&mut self, next: SessionState) {
        let previous = self.state;
        if previous != Some(next) {
            self.phase_entered_at = self.clock.current_elapsed();
        }
        self.state = Some(next);
        info!(
            from = previous.map(|s| s.as_str()),
            to = next.as_str(),
            elapsed_secs = self.clock.current_elapsed().as_secs_f64(),
            "state changed"
        );
        self.publish();
    }

    fn publish(&mut self) {
        let Some(state) = self.state else { return };
        let change = StateChange {
            state,
            elapsed: self.clock.current_elapsed(),
        };
        self.listeners.publish(&change);
    }

    fn play_notification(&mut self, kind: NotificationKind) {
        let command = self.notifications.play(kind, self.clock.sim_time());
        debug!(kind = kind.as_str(), "notification started");
        self.effects.overlay(command);
    }

    fn pump_notifications(&mut self) {
        for command in self.notifications.advance(self.clock.sim_time()) {
            self.effects.overlay(command);
        }
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Register a state-change listener.
    pub fn subscribe(&mut self, listener: impl FnMut(&StateChange) + 'static) -> ListenerId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Current state; `None` before `start_session`.
    pub fn state(&self) -> Option<SessionState> {
        self.state
    }

    /// State restored on resume; `Some` only while paused.
    pub fn last_state(&self) -> Option<SessionState> {
        self.last_state
    }

    /// Session time since start. Unaffected by pause.
    pub fn elapsed(&self, now: Duration) -> Duration {
        self.clock.elapsed(now)
    }

    pub fn time_scale(&self) -> f64 {
        self.clock.time_scale()
    }

    /// True once `Ended` has lasted past `ended_phase_length`.
    pub fn is_finished(&self) -> bool {
        self.ended_hook_fired
    }

    pub fn bindings(&self) -> &[ControllerBinding] {
        &self.bindings
    }

    pub fn monster_binding(&self) -> Option<&ControllerBinding> {
        self.bindings.iter().find(|b| b.is_monster())
    }

    pub fn players(&self) -> &Players {
        &self.players
    }

    pub fn citizens(&self) -> &Citizens {
        &self.citizens
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("last_state", &self.last_state)
            .field("bindings", &self.bindings)
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
