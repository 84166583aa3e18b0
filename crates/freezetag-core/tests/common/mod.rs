//! Shared harness for the controller integration tests.
//!
//! The harness runs on a large arena so that agents placed by a test are
//! far from each other and from every randomly placed item unless the test
//! moves them close on purpose.

#![allow(dead_code, clippy::unwrap_used)]

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

use freezetag_core::{
    AgentView, DecisionError, DecisionSource, EpisodeController, IdleDecisionSource,
    KinematicPhysics, ParameterResolver, RecordingSink, ResetReport, SimulationConfig,
    TickSummary,
};
use freezetag_agents::RoleState;
use freezetag_ledger::RewardKind;
use freezetag_types::{AgentAction, AgentId, ItemKind, Pose, RunnerPhase, Vec3};

/// Minimum spacing between placed agents and between agents and items.
const SPACING: f64 = 12.0;

/// Height at which bodies rest on the default arena floor.
const REST_HEIGHT: f64 = 0.5;

/// Build a config on a 200 x 200 arena with `manual` YAML lines appended
/// under the `manual:` section.
pub fn config(manual: &str) -> SimulationConfig {
    let yaml = format!(
        "world:\n  seed: 11\n  arena:\n    size: {{ x: 200.0, y: 10.0, z: 200.0 }}\nmanual:\n{manual}"
    );
    SimulationConfig::parse(&yaml).unwrap()
}

/// A pursuit-level episode with the given populations and no food.
pub fn pursuit(runners: u32, taggers: u32, charges: u32) -> SimulationConfig {
    config(&format!(
        "  level_index: 1\n  num_runners: {runners}\n  num_taggers: {taggers}\n  num_foodballs: 0\n  num_freezeballs: {charges}\n"
    ))
}

/// A controller plus idle decisions and a recording sink.
pub struct Harness {
    /// The controller under test.
    pub controller: EpisodeController,
    /// Decisions fed to every tick.
    pub decisions: IdleDecisionSource,
    /// Every event emitted so far.
    pub sink: RecordingSink,
    /// Report of the most recent reset.
    pub report: ResetReport,
    /// Spots already handed out by [`Harness::spot`].
    used: Vec<Vec3>,
}

impl Harness {
    /// Build and reset a controller using manual parameters.
    pub fn new(config: &SimulationConfig) -> Self {
        let resolver = ParameterResolver::manual(config.manual.clone());
        Self::with_resolver(config, resolver)
    }

    /// Build and reset a controller with a custom resolver.
    pub fn with_resolver(config: &SimulationConfig, resolver: ParameterResolver) -> Self {
        let mut controller = EpisodeController::new(
            config,
            resolver,
            Box::new(KinematicPhysics::new(config.world.arena)),
        )
        .unwrap();
        let decisions = IdleDecisionSource::new();
        let mut sink = RecordingSink::new();
        let report = controller.reset(&decisions, &mut sink).unwrap();
        Self {
            controller,
            decisions,
            sink,
            report,
            used: Vec::new(),
        }
    }

    /// Run one tick.
    pub fn tick(&mut self) -> TickSummary {
        let summary = self
            .controller
            .tick(&mut self.decisions, &mut self.sink)
            .unwrap();
        if let Some(report) = summary.reset.clone() {
            self.report = report;
            self.used.clear();
        }
        summary
    }

    /// Run `n` ticks and return the last summary.
    pub fn tick_n(&mut self, n: u32) -> Option<TickSummary> {
        let mut last = None;
        for _ in 0..n {
            last = Some(self.tick());
        }
        last
    }

    /// Runners of the live episode that are active.
    pub fn active_runners(&self) -> Vec<AgentId> {
        self.runners_in(|phase| phase == RunnerPhase::Active)
    }

    /// Runners of the live episode that are frozen (not being rescued).
    pub fn frozen_runners(&self) -> Vec<AgentId> {
        self.runners_in(|phase| phase == RunnerPhase::Frozen)
    }

    fn runners_in(&self, keep: impl Fn(RunnerPhase) -> bool) -> Vec<AgentId> {
        self.controller
            .roster()
            .runners()
            .filter(|(_, r)| keep(r.phase()))
            .map(|(id, _)| id)
            .collect()
    }

    /// The first tagger.
    pub fn tagger(&self) -> AgentId {
        self.controller
            .roster()
            .taggers()
            .map(|(id, _)| id)
            .next()
            .unwrap()
    }

    /// Phase of a runner.
    pub fn phase(&self, runner: AgentId) -> RunnerPhase {
        self.controller.roster().runner(runner).unwrap().phase()
    }

    /// Charges held by a tagger.
    pub fn charges(&self, tagger: AgentId) -> u32 {
        match self.controller.roster().get(tagger).map(|a| &a.state) {
            Some(RoleState::Tagger(t)) => t.charges(),
            _ => 0,
        }
    }

    /// Episode total of one reward kind for one agent.
    pub fn earned(&self, agent: AgentId, kind: RewardKind) -> Decimal {
        self.controller.ledger().total_by_kind(agent, kind)
    }

    /// Number of ledger entries of one kind for one agent.
    pub fn entries(&self, agent: AgentId, kind: RewardKind) -> usize {
        self.controller.ledger().count_by_kind(agent, kind)
    }

    /// Whether `point` is clear of every item and every spot handed out.
    fn is_clear(&self, point: Vec3) -> bool {
        let items_clear = [ItemKind::Food, ItemKind::FreezeCharge]
            .into_iter()
            .flat_map(|kind| self.controller.pool(kind).items())
            .all(|item| !item.position.within(point, SPACING));
        items_clear && self.used.iter().all(|u| !u.within(point, SPACING))
    }

    /// A fresh spot far from items and from every earlier spot.
    pub fn spot(&mut self) -> Vec3 {
        let mut x = -90.0;
        while x <= 90.0 {
            let mut z = -90.0;
            while z <= 90.0 {
                let point = Vec3::new(x, REST_HEIGHT, z);
                if self.is_clear(point) {
                    self.used.push(point);
                    return point;
                }
                z += SPACING;
            }
            x += SPACING;
        }
        Vec3::new(0.0, REST_HEIGHT, 0.0)
    }

    /// Move an agent to `position`.
    pub fn place(&mut self, agent: AgentId, position: Vec3) {
        self.controller
            .teleport(agent, Pose::new(position, 0.0))
            .unwrap();
    }

    /// Move every agent to its own isolated spot.
    pub fn scatter(&mut self) {
        let agents: Vec<AgentId> = self.controller.roster().iter().map(|a| a.id).collect();
        for agent in agents {
            let spot = self.spot();
            self.place(agent, spot);
        }
    }

    /// Position of an item of `kind`, if the pool holds one.
    pub fn item_position(&self, kind: ItemKind) -> Option<Vec3> {
        self.controller
            .pool(kind)
            .items()
            .next()
            .map(|item| item.position)
    }

    /// Walk a tagger onto a freeze charge and collect it, then send it back
    /// to an isolated spot.
    pub fn arm(&mut self, tagger: AgentId) {
        let before = self.charges(tagger);
        let item = self.item_position(ItemKind::FreezeCharge).unwrap();
        self.place(tagger, item);
        self.tick();
        assert_eq!(self.charges(tagger), before.saturating_add(1));
        let spot = self.spot();
        self.place(tagger, spot);
    }
}

/// Offset a point horizontally.
pub fn offset(point: Vec3, dx: f64, dz: f64) -> Vec3 {
    point.add(Vec3::new(dx, 0.0, dz))
}

/// Ticks each random action is repeated for.
const HOLD_TICKS: u64 = 10;

/// A decision source that picks uniformly random actions and repeats each
/// one for a few ticks.
#[derive(Debug)]
pub struct RandomPolicy {
    rng: StdRng,
    held: BTreeMap<AgentId, AgentAction>,
}

impl RandomPolicy {
    /// Seeded random policy.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            held: BTreeMap::new(),
        }
    }
}

impl DecisionSource for RandomPolicy {
    fn collect_decisions(
        &mut self,
        tick: u64,
        views: &BTreeMap<AgentId, AgentView>,
    ) -> Result<BTreeMap<AgentId, AgentAction>, DecisionError> {
        let redraw = tick.checked_rem(HOLD_TICKS) == Some(1);
        let mut actions = BTreeMap::new();
        for &agent in views.keys() {
            let held = self.held.get(&agent).copied();
            let action = match held {
                Some(action) if !redraw => action,
                _ => {
                    let branches = [
                        self.rng.random_range(0..3),
                        self.rng.random_range(0..3),
                        self.rng.random_range(0..2),
                    ];
                    AgentAction::from_discrete(branches)
                        .map_err(|source| DecisionError::InvalidAction { agent, source })?
                }
            };
            self.held.insert(agent, action);
            actions.insert(agent, action);
        }
        Ok(actions)
    }
}
