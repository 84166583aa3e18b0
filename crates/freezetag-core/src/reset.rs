//! The reset protocol.
//!
//! Steps run in strict order, each a precondition for the next:
//!
//! 1. Tear down every agent body and item; clear the ledger.
//! 2. Resolve the next episode's parameters.
//! 3. Zero episode time.
//! 4. Spawn runners frozen, then unfreeze a random subset: one at the
//!    forage level, half (rounded up) at the pursuit level.
//! 5. Spawn taggers with no charges (pursuit only).
//! 6. Fill the item pools to capacity.
//!
//! Spawn failures shrink the episode instead of aborting it.

use rand::seq::SliceRandom;
use tracing::{info, warn};

use freezetag_types::{AgentId, EpisodeEvent, EpisodePhase, ItemKind, Level, Role};

use crate::clock::ClockError;
use crate::controller::{EpisodeController, ResetReport, TickError};
use crate::decision::DecisionSource;
use crate::episode::Episode;
use crate::events::EventSink;

impl EpisodeController {
    /// Tear down the current episode and start the next one.
    ///
    /// The training loop calls this once before the first tick; after that
    /// the settle timer triggers it. Any pending timer is cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`TickError`] if an identifier or counter overflows.
    pub fn reset(
        &mut self,
        decisions: &dyn DecisionSource,
        events: &mut dyn EventSink,
    ) -> Result<ResetReport, TickError> {
        // Inspect the ending roster before it is torn down.
        let heuristic = self.roster.any_heuristic() || decisions.is_heuristic();
        self.episode.set_phase(EpisodePhase::Resetting);
        self.clock.cancel_pending();

        // 1. Teardown
        for agent in self.roster.clear() {
            self.physics.despawn(agent.body);
        }
        self.food.clear();
        self.charges.clear();
        self.ledger.reset();

        // 2. Resolve
        let resolution = self.resolver.resolve(heuristic);
        let params = resolution.params;

        // 3. Zero elapsed time
        self.clock.start_episode(params.time_limit_ms);
        let number = self
            .episode
            .number()
            .checked_add(1)
            .ok_or(ClockError::Overflow)?;
        self.episode = Episode::begin(number, &params);

        // 4. Runners
        let runners = self.spawn_agents(Role::Runner, params.num_runners)?;
        let initially_active = self.initial_unfreeze(&runners, params.level)?;

        // 5. Taggers
        let taggers = if params.level.has_taggers() {
            self.spawn_agents(Role::Tagger, params.num_taggers)?
        } else {
            Vec::new()
        };

        // 6. Items
        self.food.configure(params.food_capacity, true);
        self.charges
            .configure(params.charge_capacity, params.level.has_taggers());
        let food = self.fill_pool(ItemKind::Food);
        let charges = self.fill_pool(ItemKind::FreezeCharge);

        self.episode.set_phase(EpisodePhase::Running);

        if let Some(from) = resolution
            .previous_level_index
            .filter(|_| resolution.level_changed())
        {
            events.emit(&EpisodeEvent::LevelChanged {
                episode: number,
                from,
                to: params.level_index,
            });
        }
        let runner_count = u32::try_from(runners.len()).unwrap_or(u32::MAX);
        let tagger_count = u32::try_from(taggers.len()).unwrap_or(u32::MAX);
        events.emit(&EpisodeEvent::EpisodeStarted {
            episode: number,
            level: params.level,
            runners: runner_count,
            taggers: tagger_count,
            time_limit_ms: params.time_limit_ms,
        });
        info!(
            episode = number,
            level = %params.level,
            source = ?params.source,
            runners = runner_count,
            active = initially_active.len(),
            taggers = tagger_count,
            food,
            charges,
            time_limit_ms = params.time_limit_ms,
            "episode started"
        );

        Ok(ResetReport {
            episode: number,
            level: params.level,
            source: params.source,
            runners,
            taggers,
            initially_active,
            food,
            charges,
        })
    }

    /// Spawn up to `count` agents of `role` at random poses.
    fn spawn_agents(&mut self, role: Role, count: u32) -> Result<Vec<AgentId>, TickError> {
        let template = match role {
            Role::Runner => self.settings.templates.runner.as_ref(),
            Role::Tagger => self.settings.templates.tagger.as_ref(),
        };
        let Some(template) = template.cloned() else {
            if count > 0 {
                warn!(%role, requested = count, "no body template configured, spawns skipped");
            }
            return Ok(Vec::new());
        };

        let mut spawned = Vec::new();
        for _ in 0..count {
            let pose = self.settings.arena.random_pose(&mut self.rng);
            match self.physics.spawn_body(&template.name, pose) {
                Ok(body) => {
                    let id = self.roster.add(role, template.behavior, body, 0)?;
                    spawned.push(id);
                }
                Err(err) => {
                    warn!(%role, error = %err, "agent spawn failed, continuing with fewer agents");
                }
            }
        }
        Ok(spawned)
    }

    /// Unfreeze the level's share of `runners`, chosen by a uniform random
    /// permutation of their indices.
    fn initial_unfreeze(
        &mut self,
        runners: &[AgentId],
        level: Level,
    ) -> Result<Vec<AgentId>, TickError> {
        let count = match level {
            Level::Forage => runners.len().min(1),
            Level::Pursuit => runners.len().div_ceil(2),
        };
        let mut order: Vec<usize> = (0..runners.len()).collect();
        order.shuffle(&mut self.rng);

        let chosen: Vec<AgentId> = order
            .iter()
            .take(count)
            .filter_map(|&index| runners.get(index).copied())
            .collect();
        for &runner in &chosen {
            self.roster.force_activate(runner, 0)?;
        }
        Ok(chosen)
    }

    /// Fill a pool to capacity. Returns how many items it holds.
    fn fill_pool(&mut self, kind: ItemKind) -> u32 {
        let now_ms = self.clock.elapsed_ms();
        let pool = match kind {
            ItemKind::Food => &mut self.food,
            ItemKind::FreezeCharge => &mut self.charges,
        };
        if let Err(err) = pool.fill(&self.settings.arena, &mut self.rng, now_ms) {
            warn!(%kind, error = %err, "item pool left below capacity");
        }
        u32::try_from(pool.active_count()).unwrap_or(u32::MAX)
    }
}
