//! Proximity-driven interactions resolved once per running tick: item
//! pickups, captures, and rescues.
//!
//! Every interaction is an explicit distance query against body positions
//! read back from the physics backend. Agents are visited in id order and
//! candidates nearest first, so the same positions always give the same
//! result.

use tracing::{debug, info, warn};

use freezetag_agents::{Agent, FreezeOutcome, rescue_success_penalties};
use freezetag_ledger::RewardKind;
use freezetag_types::{AgentId, EpisodeEvent, ItemId, ItemKind, Role, RunnerPhase, Vec3};
use freezetag_world::{nearest_within, within_radius};

use crate::controller::{EpisodeController, TickError};
use crate::events::EventSink;

impl EpisodeController {
    /// Positions of agents matching `keep`, in id order. Agents whose body
    /// has no pose are skipped.
    fn positions(&self, keep: impl Fn(&Agent) -> bool) -> Vec<(AgentId, Vec3)> {
        self.roster
            .iter()
            .filter(|agent| keep(agent))
            .filter_map(|agent| {
                self.physics
                    .pose(agent.body)
                    .map(|pose| (agent.id, pose.position))
            })
            .collect()
    }

    fn within_range(&self, a: AgentId, b: AgentId, radius: f64) -> bool {
        match (self.position(a), self.position(b)) {
            (Some(pa), Some(pb)) => pa.within(pb, radius),
            _ => false,
        }
    }

    // -----------------------------------------------------------------------
    // Items
    // -----------------------------------------------------------------------

    /// Unfrozen runners pick up food; taggers pick up freeze charges.
    pub(crate) fn collect_items(
        &mut self,
        tick: u64,
        now_ms: u64,
        events: &mut dyn EventSink,
    ) -> Result<(), TickError> {
        let radius = self.settings.rules.pickup_radius;
        let collectors = self.positions(Agent::can_move);

        for (agent, position) in collectors {
            let Some(role) = self.roster.get(agent).map(Agent::role) else {
                continue;
            };
            let kind = match role {
                Role::Runner => ItemKind::Food,
                Role::Tagger => ItemKind::FreezeCharge,
            };
            let hits = within_radius(
                position,
                radius,
                self.pool(kind).items().map(|item| (item.id, item.position)),
            );
            for item in hits {
                self.collect_item(tick, now_ms, agent, kind, item, events)?;
            }
        }
        Ok(())
    }

    fn collect_item(
        &mut self,
        tick: u64,
        now_ms: u64,
        agent: AgentId,
        kind: ItemKind,
        item: ItemId,
        events: &mut dyn EventSink,
    ) -> Result<(), TickError> {
        let pool = match kind {
            ItemKind::Food => &mut self.food,
            ItemKind::FreezeCharge => &mut self.charges,
        };
        let Some(collected) = pool.collect(item) else {
            return Ok(());
        };

        let (reward_kind, amount) = match kind {
            ItemKind::Food => (RewardKind::FoodCollected, self.settings.rewards.food),
            ItemKind::FreezeCharge => {
                let held = self.roster.tagger_mut(agent)?.collect_charge()?;
                debug!(tagger = %agent, charges = held, "freeze charge collected");
                (RewardKind::ChargeCollected, self.settings.rewards.charge)
            }
        };
        self.ledger.record(tick, agent, reward_kind, amount)?;
        events.emit(&EpisodeEvent::ItemCollected {
            item,
            kind,
            collector: agent,
            lifetime_ms: collected.lifetime_ms(now_ms),
        });

        self.respawn(kind, now_ms);
        Ok(())
    }

    /// Replace one collected item, if the pool has room.
    fn respawn(&mut self, kind: ItemKind, now_ms: u64) {
        let pool = match kind {
            ItemKind::Food => &mut self.food,
            ItemKind::FreezeCharge => &mut self.charges,
        };
        if let Err(err) = pool.spawn(&self.settings.arena, &mut self.rng, now_ms) {
            warn!(%kind, error = %err, "item respawn skipped");
        }
    }

    // -----------------------------------------------------------------------
    // Captures
    // -----------------------------------------------------------------------

    /// Each tagger in contact with active runners freezes them, nearest
    /// first, while it still holds charges. Contact without a charge does
    /// nothing.
    pub(crate) fn resolve_captures(
        &mut self,
        tick: u64,
        now_ms: u64,
        events: &mut dyn EventSink,
    ) -> Result<(), TickError> {
        let contact = self.settings.rules.contact_radius;
        let taggers = self.positions(|a| a.enabled && a.role() == Role::Tagger);

        for (tagger, position) in taggers {
            let targets = within_radius(
                position,
                contact,
                self.positions(|a| {
                    a.enabled && a.runner().is_some_and(|r| r.phase() == RunnerPhase::Active)
                }),
            );
            for runner in targets {
                if !self.roster.tagger_mut(tagger)?.try_spend_charge() {
                    break;
                }
                match self.roster.freeze_runner(runner, now_ms)? {
                    FreezeOutcome::Frozen {
                        survived_ms,
                        abandoned,
                    } => {
                        self.ledger.record(
                            tick,
                            tagger,
                            RewardKind::FreezeBonus,
                            self.settings.rewards.freeze_bonus,
                        )?;
                        events.emit(&EpisodeEvent::RunnerFrozen {
                            runner,
                            tagger,
                            survived_ms,
                        });
                        if let Some(target) = abandoned {
                            events.emit(&EpisodeEvent::RescueEnded {
                                runner: target,
                                rescuer: runner,
                                success: false,
                            });
                        }
                        info!(%runner, %tagger, survived_ms, "runner frozen");
                    }
                    FreezeOutcome::AlreadyFrozen => {
                        debug!(%runner, %tagger, "capture of a frozen runner ignored");
                    }
                }
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Rescues
    // -----------------------------------------------------------------------

    /// Cancel rescues whose rescuer left range, start rescues for frozen
    /// runners with an active teammate in range, and refresh the taggers'
    /// interference flag.
    pub(crate) fn update_rescue_proximity(
        &mut self,
        events: &mut dyn EventSink,
    ) -> Result<(), TickError> {
        let radius = self.settings.rules.rescue_radius;

        let in_progress: Vec<(AgentId, AgentId)> = self
            .roster
            .runners()
            .filter_map(|(id, r)| r.rescuer().map(|rescuer| (id, rescuer)))
            .collect();
        for (runner, rescuer) in in_progress {
            let rescuer_can_act = self.roster.get(rescuer).is_some_and(Agent::can_move);
            if rescuer_can_act && self.within_range(runner, rescuer, radius) {
                continue;
            }
            if let Some(rescuer) = self.roster.cancel_rescue(runner)? {
                events.emit(&EpisodeEvent::RescueEnded {
                    runner,
                    rescuer,
                    success: false,
                });
                debug!(%runner, %rescuer, "rescue cancelled, rescuer out of range");
            }
        }

        let waiting = self.positions(|a| {
            a.enabled && a.runner().is_some_and(|r| r.phase() == RunnerPhase::Frozen)
        });
        for (runner, position) in waiting {
            let free = self.positions(|a| {
                a.can_move() && a.runner().is_some_and(|r| r.rescuing().is_none())
            });
            let Some(rescuer) = nearest_within(position, radius, free) else {
                continue;
            };
            if self.roster.start_rescue(runner, rescuer)? {
                events.emit(&EpisodeEvent::RescueStarted { runner, rescuer });
                debug!(%runner, %rescuer, "rescue started");
            }
        }

        let interfering = self.roster.any_rescue_in_progress();
        self.roster.set_interference(interfering);
        Ok(())
    }

    /// Advance rescue timers and pay out completed rescues.
    pub(crate) fn complete_rescues(
        &mut self,
        tick: u64,
        dt_ms: u64,
        now_ms: u64,
        events: &mut dyn EventSink,
    ) -> Result<(), TickError> {
        let completed = self.roster.advance_rescues(
            dt_ms,
            self.settings.rules.rescue_threshold_ms,
            now_ms,
        )?;
        if completed.is_empty() {
            return Ok(());
        }

        for rescue in completed {
            self.ledger.record(
                tick,
                rescue.rescuer,
                RewardKind::RescueBonus,
                self.settings.rewards.rescue_bonus,
            )?;
            for (tagger, kind, amount) in
                rescue_success_penalties(&self.roster, &self.settings.rewards)
            {
                self.ledger.record(tick, tagger, kind, amount)?;
            }
            events.emit(&EpisodeEvent::RunnerRescued {
                runner: rescue.runner,
                rescuer: rescue.rescuer,
                frozen_ms: rescue.frozen_ms,
            });
            events.emit(&EpisodeEvent::RescueEnded {
                runner: rescue.runner,
                rescuer: rescue.rescuer,
                success: true,
            });
            info!(
                runner = %rescue.runner,
                rescuer = %rescue.rescuer,
                frozen_ms = rescue.frozen_ms,
                "runner rescued"
            );
        }

        let interfering = self.roster.any_rescue_in_progress();
        self.roster.set_interference(interfering);
        Ok(())
    }
}
