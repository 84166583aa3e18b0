//! The Episode Controller: owns the live episode and drives every tick.
//!
//! A running tick executes these phases in order:
//!
//! 1. **Decide** -- build a view for each enabled agent and collect actions
//!    from the [`DecisionSource`].
//! 2. **Move** -- turn actions into motion intents (frozen runners and
//!    disabled agents hold still) and step the physics backend.
//! 3. **Interact** -- advance episode time, then resolve item pickups,
//!    captures, and rescue proximity as explicit distance queries.
//! 4. **Accrue** -- record continuous rewards and advance rescue timers.
//! 5. **Judge** -- check the time limit, then the all-frozen condition.
//!    A terminal condition records terminal rewards, disables every agent,
//!    and arms the settle timer.
//! 6. **Deliver** -- drain the tick's rewards, verify them against the
//!    ledger, and hand them to the decision source.
//!
//! While an episode is terminating, ticks only advance the clock until the
//! settle timer fires and the reset protocol runs. The tick is deterministic
//! given the seed and the decision source's outputs.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use freezetag_agents::{
    AgentError, MovementConfig, RewardConfig, Roster, RulesConfig, accrue_continuous,
    motion_intent, terminal_rewards,
};
use freezetag_ledger::{BalanceResult, LedgerError, RewardLedger};
use freezetag_types::{
    AgentAction, AgentId, EpisodeEvent, EpisodePhase, ItemKind, Level, MotionIntent, Outcome,
    Pose, TerminationCause, Vec3,
};
use freezetag_world::{Arena, SpawnPool, WorldError};

use crate::clock::{ClockError, EpisodeClock, ScheduledTask};
use crate::config::{SimulationConfig, TemplatesConfig};
use crate::decision::{DecisionError, DecisionSource};
use crate::episode::Episode;
use crate::events::EventSink;
use crate::params::{ParameterResolver, ParameterSource};
use crate::physics::{PhysicsBackend, PhysicsError};
use crate::signals;

/// Errors that can occur during tick execution.
///
/// Gameplay failures (bad spawns, no-op transitions) never surface here;
/// these are arithmetic overflow and broken collaborator contracts.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// An agent state transition failed.
    #[error("agent error: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },

    /// Reward bookkeeping failed.
    #[error("ledger error: {source}")]
    Ledger {
        /// The underlying ledger error.
        #[from]
        source: LedgerError,
    },

    /// A world operation failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// The physics backend rejected a request.
    #[error("physics error: {source}")]
    Physics {
        /// The underlying physics error.
        #[from]
        source: PhysicsError,
    },

    /// The decision source failed.
    #[error("decision error: {source}")]
    Decision {
        /// The underlying decision error.
        #[from]
        source: DecisionError,
    },
}

/// How an episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeEnd {
    /// Episode counter.
    pub episode: u64,
    /// Terminal outcome.
    pub outcome: Outcome,
    /// What triggered the end.
    pub cause: TerminationCause,
    /// Episode time at the end.
    pub elapsed_ms: u64,
}

/// What the reset protocol built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetReport {
    /// The new episode's counter.
    pub episode: u64,
    /// Level being played.
    pub level: Level,
    /// Where the parameters came from.
    pub source: ParameterSource,
    /// Runners spawned.
    pub runners: Vec<AgentId>,
    /// Taggers spawned.
    pub taggers: Vec<AgentId>,
    /// Runners unfrozen at the start.
    pub initially_active: Vec<AgentId>,
    /// Food items placed.
    pub food: u32,
    /// Freeze charges placed.
    pub charges: u32,
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone, PartialEq)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Episode counter during this tick.
    pub episode: u64,
    /// Episode phase at the end of the tick.
    pub phase: EpisodePhase,
    /// Episode time at the end of the tick.
    pub elapsed_ms: u64,
    /// Rewards delivered this tick.
    pub rewards: BTreeMap<AgentId, Decimal>,
    /// Set on the tick that ended an episode.
    pub ended: Option<EpisodeEnd>,
    /// Set on the tick that ran the reset protocol.
    pub reset: Option<ResetReport>,
}

/// Values the controller reads from configuration.
#[derive(Debug, Clone)]
pub(crate) struct ControllerSettings {
    pub(crate) arena: Arena,
    pub(crate) rewards: RewardConfig,
    pub(crate) rules: RulesConfig,
    pub(crate) movement: MovementConfig,
    pub(crate) templates: TemplatesConfig,
    pub(crate) settle_delay_ms: u64,
}

/// Owns the roster, item pools, ledger, clock, and the live episode.
pub struct EpisodeController {
    pub(crate) settings: ControllerSettings,
    pub(crate) clock: EpisodeClock,
    pub(crate) episode: Episode,
    pub(crate) roster: Roster,
    pub(crate) food: SpawnPool,
    pub(crate) charges: SpawnPool,
    pub(crate) ledger: RewardLedger,
    pub(crate) resolver: ParameterResolver,
    pub(crate) physics: Box<dyn PhysicsBackend>,
    pub(crate) rng: StdRng,
}

impl core::fmt::Debug for EpisodeController {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EpisodeController")
            .field("clock", &self.clock)
            .field("episode", &self.episode)
            .field("agents", &self.roster.len())
            .field("food", &self.food.active_count())
            .field("charges", &self.charges.active_count())
            .finish_non_exhaustive()
    }
}

impl EpisodeController {
    /// Build a controller. No episode exists until [`reset`] runs.
    ///
    /// [`reset`]: EpisodeController::reset
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] for a zero tick length.
    pub fn new(
        config: &SimulationConfig,
        resolver: ParameterResolver,
        physics: Box<dyn PhysicsBackend>,
    ) -> Result<Self, ClockError> {
        let templates = config.templates.clone();
        Ok(Self {
            clock: EpisodeClock::new(config.world.tick_ms)?,
            episode: Episode::unstarted(),
            roster: Roster::new(),
            food: SpawnPool::new(ItemKind::Food, templates.food.clone()),
            charges: SpawnPool::new(ItemKind::FreezeCharge, templates.freeze_charge.clone()),
            ledger: RewardLedger::new(),
            resolver,
            physics,
            rng: StdRng::seed_from_u64(config.world.seed),
            settings: ControllerSettings {
                arena: config.world.arena,
                rewards: config.rewards.clone(),
                rules: config.rules.clone(),
                movement: config.movement.clone(),
                templates,
                settle_delay_ms: config.world.settle_delay_ms,
            },
        })
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The episode clock.
    pub const fn clock(&self) -> &EpisodeClock {
        &self.clock
    }

    /// The live episode.
    pub const fn episode(&self) -> &Episode {
        &self.episode
    }

    /// Every agent of the live episode.
    pub const fn roster(&self) -> &Roster {
        &self.roster
    }

    /// The episode's reward ledger.
    pub const fn ledger(&self) -> &RewardLedger {
        &self.ledger
    }

    /// The item pool for `kind`.
    pub const fn pool(&self, kind: ItemKind) -> &SpawnPool {
        match kind {
            ItemKind::Food => &self.food,
            ItemKind::FreezeCharge => &self.charges,
        }
    }

    /// The physics backend.
    pub fn physics(&self) -> &dyn PhysicsBackend {
        self.physics.as_ref()
    }

    /// Current position of an agent's body.
    pub fn position(&self, agent: AgentId) -> Option<Vec3> {
        let body = self.roster.get(agent)?.body;
        self.physics.pose(body).map(|p| p.position)
    }

    /// Move an agent's body to `pose`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::AgentNotFound`] or a physics error.
    pub fn teleport(&mut self, agent: AgentId, pose: Pose) -> Result<(), TickError> {
        let body = self
            .roster
            .get(agent)
            .ok_or(AgentError::AgentNotFound(agent))?
            .body;
        self.physics.teleport(body, pose)?;
        Ok(())
    }

    /// Fraction of the time limit remaining, in `[0, 1]`.
    pub fn normalized_time_remaining(&self) -> f64 {
        signals::normalized_time_remaining(&self.clock)
    }

    /// Fraction of runners frozen, in `[0, 1]`.
    pub fn percent_runners_frozen(&self) -> f64 {
        signals::percent_runners_frozen(&self.roster)
    }

    /// Evenness of charges across taggers, in `[0, 1]`.
    pub fn charge_distribution_balance(&self) -> f64 {
        signals::charge_distribution_balance(&self.roster.charge_counts())
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Execute one tick.
    ///
    /// # Errors
    ///
    /// Returns [`TickError`] on arithmetic overflow or if the decision
    /// source fails.
    pub fn tick(
        &mut self,
        decisions: &mut dyn DecisionSource,
        events: &mut dyn EventSink,
    ) -> Result<TickSummary, TickError> {
        let tick = self.clock.advance()?;

        if !self.episode.is_running() {
            let reset = match self.clock.take_due() {
                Some(ScheduledTask::Reset) => Some(self.reset(&*decisions, events)?),
                None => None,
            };
            return Ok(self.summary(tick, BTreeMap::new(), None, reset));
        }

        let dt_ms = self.clock.tick_ms();

        // Decide
        let views = signals::agent_views(
            &self.roster,
            &self.clock,
            self.settings.rules.rescue_threshold_ms,
        );
        let actions = decisions.collect_decisions(tick, &views)?;

        // Move
        self.apply_intents(&actions, dt_ms);
        self.physics.step(dt_ms);

        // Interact
        let now_ms = self.clock.advance_elapsed()?;
        self.collect_items(tick, now_ms, events)?;
        self.resolve_captures(tick, now_ms, events)?;
        self.update_rescue_proximity(events)?;

        // Accrue
        accrue_continuous(
            &self.roster,
            &mut self.ledger,
            tick,
            dt_ms,
            &self.settings.rewards,
        )?;
        self.complete_rescues(tick, dt_ms, now_ms, events)?;

        // Judge
        let ended = self.check_termination(tick, events)?;

        // Deliver
        let rewards = self.drain_rewards(tick);
        decisions.receive_rewards(tick, &rewards);
        if let Some(end) = ended {
            let agents: Vec<AgentId> = self.roster.iter().map(|a| a.id).collect();
            decisions.episode_ended(&agents, end.outcome);
        }

        Ok(self.summary(tick, rewards, ended, None))
    }

    fn summary(
        &self,
        tick: u64,
        rewards: BTreeMap<AgentId, Decimal>,
        ended: Option<EpisodeEnd>,
        reset: Option<ResetReport>,
    ) -> TickSummary {
        TickSummary {
            tick,
            episode: self.episode.number(),
            phase: self.episode.phase(),
            elapsed_ms: self.clock.elapsed_ms(),
            rewards,
            ended,
            reset,
        }
    }

    fn apply_intents(&mut self, actions: &BTreeMap<AgentId, AgentAction>, dt_ms: u64) {
        for agent in self.roster.iter() {
            let intent = match self.physics.pose(agent.body) {
                Some(pose) if agent.can_move() => {
                    let action = actions.get(&agent.id).copied().unwrap_or_default();
                    motion_intent(
                        action,
                        &pose,
                        self.physics.is_grounded(agent.body),
                        dt_ms,
                        &self.settings.movement,
                    )
                }
                Some(_) | None => MotionIntent::STILL,
            };
            if let Err(err) = self.physics.apply_intent(agent.body, &intent) {
                warn!(agent = %agent.id, error = %err, "motion intent rejected");
            }
        }
    }

    // -----------------------------------------------------------------------
    // Termination
    // -----------------------------------------------------------------------

    fn check_termination(
        &mut self,
        tick: u64,
        events: &mut dyn EventSink,
    ) -> Result<Option<EpisodeEnd>, TickError> {
        if self.clock.time_limit_reached() {
            return self.terminate(tick, TerminationCause::Timeout, events);
        }
        let runners = self.roster.runner_count();
        if self.episode.level() == Level::Pursuit
            && runners > 0
            && self.roster.frozen_runner_count() == runners
        {
            return self.terminate(tick, TerminationCause::AllFrozen, events);
        }
        Ok(None)
    }

    /// End the running episode. A second trigger is ignored.
    fn terminate(
        &mut self,
        tick: u64,
        cause: TerminationCause,
        events: &mut dyn EventSink,
    ) -> Result<Option<EpisodeEnd>, TickError> {
        let Some(outcome) = self.episode.conclude(cause) else {
            debug!(?cause, "termination ignored, episode not running");
            return Ok(None);
        };

        // Terminal rewards go to agents that are still enabled.
        let grants = terminal_rewards(
            &self.roster,
            cause,
            self.episode.level(),
            &self.settings.rewards,
        );
        for (agent, kind, amount) in grants {
            self.ledger.record(tick, agent, kind, amount)?;
        }

        let frozen_runners = u32::try_from(self.roster.frozen_runner_count()).unwrap_or(u32::MAX);
        let total_runners = u32::try_from(self.roster.runner_count()).unwrap_or(u32::MAX);
        self.roster.deactivate_all();
        self.roster.set_interference(false);

        let end = EpisodeEnd {
            episode: self.episode.number(),
            outcome,
            cause,
            elapsed_ms: self.clock.elapsed_ms(),
        };
        events.emit(&EpisodeEvent::EpisodeEnded {
            episode: end.episode,
            outcome,
            elapsed_ms: end.elapsed_ms,
            frozen_runners,
            total_runners,
        });
        self.resolver.episode_ended(outcome);

        if !self
            .clock
            .schedule_once(self.settings.settle_delay_ms, ScheduledTask::Reset)?
        {
            warn!(episode = end.episode, "reset already scheduled");
        }

        info!(
            episode = end.episode,
            %outcome,
            ?cause,
            elapsed_ms = end.elapsed_ms,
            frozen_runners,
            total_runners,
            "episode ended"
        );
        Ok(Some(end))
    }

    fn drain_rewards(&mut self, tick: u64) -> BTreeMap<AgentId, Decimal> {
        let drained = self.ledger.drain_tick();
        if let BalanceResult::Anomaly(anomaly) = self.ledger.verify_tick(tick, &drained) {
            warn!(
                tick,
                agents = anomaly.mismatches.len(),
                message = %anomaly.message,
                "reward delivery does not match the ledger"
            );
        }
        drained
    }
}
