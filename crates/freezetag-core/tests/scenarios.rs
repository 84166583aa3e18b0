#![allow(clippy::unwrap_used)]
//! End-to-end episode scenarios driven through the public controller API.

mod common;

use std::collections::BTreeSet;

use rust_decimal::Decimal;

use common::{Harness, config, offset, pursuit};
use freezetag_core::ParameterSource;
use freezetag_ledger::RewardKind;
use freezetag_types::{
    EpisodeEvent, EpisodePhase, ItemKind, Level, Outcome, RunnerPhase, TerminationCause,
};

#[test]
fn pursuit_start_unfreezes_half_the_runners() {
    for seed in 1..=12_u64 {
        let mut config = config(
            "  level_index: 1\n  num_runners: 5\n  num_taggers: 1\n  num_foodballs: 3\n  num_freezeballs: 2\n",
        );
        config.world.seed = seed;
        let h = Harness::new(&config);

        assert_eq!(h.report.level, Level::Pursuit);
        assert_eq!(h.report.runners.len(), 5);
        assert_eq!(h.report.taggers.len(), 1);
        let distinct: BTreeSet<_> = h.report.initially_active.iter().collect();
        assert_eq!(distinct.len(), 3, "seed {seed}");
        assert_eq!(h.active_runners().len(), 3);
        assert_eq!(h.frozen_runners().len(), 2);
        for runner in &h.report.initially_active {
            assert!(h.report.runners.contains(runner));
        }
    }
}

#[test]
fn forage_start_unfreezes_one_runner_and_skips_taggers() {
    let config = config(
        "  level_index: 0\n  num_runners: 4\n  num_taggers: 2\n  num_foodballs: 6\n  num_freezeballs: 5\n",
    );
    let h = Harness::new(&config);

    assert_eq!(h.report.level, Level::Forage);
    assert_eq!(h.report.source, ParameterSource::Manual);
    assert!(h.report.taggers.is_empty());
    assert_eq!(h.active_runners().len(), 1);
    assert_eq!(h.frozen_runners().len(), 3);
    assert_eq!(h.controller.pool(ItemKind::Food).active_count(), 6);
    assert_eq!(h.controller.pool(ItemKind::FreezeCharge).active_count(), 0);
    assert_eq!(h.report.charges, 0);
    assert_eq!(h.sink.count("episode_started"), 1);
}

#[test]
fn tagger_collects_a_charge_then_freezes_a_runner() {
    let mut h = Harness::new(&pursuit(3, 1, 1));
    h.scatter();
    let tagger = h.tagger();
    assert_eq!(h.charges(tagger), 0);

    let charge = h.item_position(ItemKind::FreezeCharge).unwrap();
    h.place(tagger, charge);
    let summary = h.tick();
    assert_eq!(h.charges(tagger), 1);
    assert_eq!(h.entries(tagger, RewardKind::ChargeCollected), 1);
    assert_eq!(h.sink.count("item_collected"), 1);
    // Charge reward minus one tick of pressure.
    assert_eq!(summary.rewards.get(&tagger), Some(&Decimal::new(499, 4)));
    assert_eq!(h.controller.pool(ItemKind::FreezeCharge).active_count(), 1);

    let victim = h.active_runners().first().copied().unwrap();
    let at = h.controller.position(victim).unwrap();
    h.place(tagger, offset(at, 1.0, 0.0));
    let summary = h.tick();

    assert_eq!(h.phase(victim), RunnerPhase::Frozen);
    assert_eq!(h.charges(tagger), 0);
    assert_eq!(h.earned(tagger, RewardKind::FreezeBonus), Decimal::new(5, 1));
    assert_eq!(summary.rewards.get(&tagger), Some(&Decimal::new(4999, 4)));
    assert!(h.sink.events().iter().any(|e| matches!(
        e,
        EpisodeEvent::RunnerFrozen { runner, tagger: t, .. } if *runner == victim && *t == tagger
    )));
    assert!(summary.ended.is_none());
}

#[test]
fn only_active_runners_collect_food() {
    let config = config(
        "  level_index: 0\n  num_runners: 2\n  num_taggers: 0\n  num_foodballs: 3\n  num_freezeballs: 0\n",
    );
    let mut h = Harness::new(&config);
    h.scatter();
    let active = h.active_runners().first().copied().unwrap();
    let frozen = h.frozen_runners().first().copied().unwrap();
    let food = h.item_position(ItemKind::Food).unwrap();

    h.place(frozen, food);
    h.tick();
    assert_eq!(h.entries(frozen, RewardKind::FoodCollected), 0);
    assert_eq!(h.earned(frozen, RewardKind::FoodCollected), Decimal::ZERO);
    assert_eq!(h.sink.count("item_collected"), 0);
    assert_eq!(h.controller.pool(ItemKind::Food).active_count(), 3);

    let away = h.spot();
    h.place(frozen, away);
    h.place(active, food);
    h.tick();

    assert_eq!(h.entries(active, RewardKind::FoodCollected), 1);
    assert_eq!(h.earned(active, RewardKind::FoodCollected), Decimal::new(2, 1));
    assert_eq!(h.sink.count("item_collected"), 1);
    assert!(h.sink.events().iter().any(|e| matches!(
        e,
        EpisodeEvent::ItemCollected { kind: ItemKind::Food, collector, .. } if *collector == active
    )));
    // The pickup respawned a replacement at once.
    assert_eq!(h.controller.pool(ItemKind::Food).active_count(), 3);
    assert_eq!(h.phase(frozen), RunnerPhase::Frozen);
}

#[test]
fn rescue_completes_after_the_threshold() {
    let mut h = Harness::new(&pursuit(2, 1, 0));
    h.scatter();
    let tagger = h.tagger();
    let rescuer = h.active_runners().first().copied().unwrap();
    let frozen = h.frozen_runners().first().copied().unwrap();
    let at = h.controller.position(frozen).unwrap();
    h.place(rescuer, offset(at, 3.0, 0.0));

    h.tick();
    assert_eq!(h.phase(frozen), RunnerPhase::BeingRescued);
    assert_eq!(h.sink.count("rescue_started"), 1);

    h.tick_n(248);
    assert_eq!(h.phase(frozen), RunnerPhase::BeingRescued);
    assert_eq!(h.sink.count("runner_rescued"), 0);

    h.tick();
    assert_eq!(h.phase(frozen), RunnerPhase::Active);
    assert_eq!(h.sink.count("runner_rescued"), 1);
    assert!(h.sink.events().iter().any(|e| matches!(
        e,
        EpisodeEvent::RescueEnded { runner, rescuer: r, success: true } if *runner == frozen && *r == rescuer
    )));

    assert_eq!(h.earned(rescuer, RewardKind::RescueBonus), Decimal::new(5, 1));
    assert_eq!(
        h.earned(rescuer, RewardKind::RescueProgress),
        Decimal::new(125, 3)
    );
    assert_eq!(
        h.earned(tagger, RewardKind::RescueSuccessPenalty),
        Decimal::new(-5, 1)
    );
    assert_eq!(
        h.earned(tagger, RewardKind::RescueInterference),
        Decimal::new(-125, 3)
    );

    let runner = h.controller.roster().runner(frozen).unwrap();
    assert_eq!(runner.rescuer(), None);
    assert_eq!(runner.rescue_elapsed_ms(), 0);
    assert!(!h.controller.roster().any_rescue_in_progress());
}

#[test]
fn freezing_the_last_runner_ends_and_resets_the_episode() {
    let mut h = Harness::new(&pursuit(2, 1, 1));
    h.scatter();
    let tagger = h.tagger();
    h.arm(tagger);

    let last = h.active_runners().first().copied().unwrap();
    let at = h.controller.position(last).unwrap();
    h.place(tagger, offset(at, 0.0, 1.0));
    let summary = h.tick();

    let end = summary.ended.unwrap();
    assert_eq!(end.outcome, Outcome::TaggersWin);
    assert_eq!(end.cause, TerminationCause::AllFrozen);
    assert_eq!(summary.phase, EpisodePhase::Terminating);
    assert_eq!(h.earned(tagger, RewardKind::CaptureWin), Decimal::ONE);
    // Freeze bonus plus capture win; no pressure once nobody is at large.
    assert_eq!(summary.rewards.get(&tagger), Some(&Decimal::new(15, 1)));
    assert!(h.controller.clock().has_pending());
    assert_eq!(h.controller.episode().outcome(), Outcome::TaggersWin);
    assert!(h.controller.roster().iter().all(|a| !a.enabled));
    assert_eq!(h.sink.count("episode_ended"), 1);

    // Settle: nothing happens until the delay has passed.
    for _ in 0..24 {
        let summary = h.tick();
        assert!(summary.rewards.is_empty());
        assert!(summary.reset.is_none());
        assert_eq!(summary.phase, EpisodePhase::Terminating);
    }
    let summary = h.tick();
    let report = summary.reset.unwrap();
    assert_eq!(report.episode, 2);
    assert_eq!(summary.phase, EpisodePhase::Running);
    assert!(!h.controller.clock().has_pending());

    h.tick_n(5);
    assert_eq!(h.sink.count("episode_ended"), 1);
    assert_eq!(h.sink.count("episode_started"), 2);
    assert_eq!(h.controller.episode().number(), 2);
    assert_eq!(h.controller.episode().outcome(), Outcome::Pending);
    assert_eq!(h.controller.clock().elapsed_ms(), 100);
    assert_eq!(h.entries(tagger, RewardKind::CaptureWin), 0);
}

#[test]
fn pursuit_timeout_rewards_survivors_and_penalises_taggers() {
    let config = config(
        "  level_index: 1\n  num_runners: 2\n  num_taggers: 1\n  num_foodballs: 0\n  num_freezeballs: 0\n  time_limit_secs: 1.0\n",
    );
    let mut h = Harness::new(&config);
    h.scatter();
    let tagger = h.tagger();
    let survivor = h.active_runners().first().copied().unwrap();
    let frozen = h.frozen_runners().first().copied().unwrap();

    let summary = h.tick_n(49).unwrap();
    assert!(summary.ended.is_none());

    let summary = h.tick();
    let end = summary.ended.unwrap();
    assert_eq!(end.outcome, Outcome::RunnersWin);
    assert_eq!(end.cause, TerminationCause::Timeout);
    assert_eq!(end.elapsed_ms, 1000);
    assert_eq!(h.earned(tagger, RewardKind::TimeoutLoss), Decimal::NEGATIVE_ONE);
    assert_eq!(h.earned(survivor, RewardKind::TimeoutSurvival), Decimal::ONE);
    assert_eq!(h.entries(frozen, RewardKind::TimeoutSurvival), 0);
    assert_eq!(h.entries(tagger, RewardKind::TimeoutLoss), 1);
    assert!(h.sink.events().iter().any(|e| matches!(
        e,
        EpisodeEvent::EpisodeEnded { outcome: Outcome::RunnersWin, frozen_runners: 1, total_runners: 2, .. }
    )));
}
