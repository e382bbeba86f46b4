//! Transition loop behaviour against mock actuator, clock and config source.

use core::time::Duration;
use std::time::Instant;

use chrono::{TimeZone, Utc};
use fieldgate::adapters::time::WallClock;
use fieldgate::app::ports::Clock;
use fieldgate::app::telemetry::ValveTelemetry;
use fieldgate::config::{LoopConfig, OverrideSpec, ScheduleConfig};
use fieldgate::scheduler::{
    OverrideWindow, PriorityScheduler, ScheduleList, Scheduler, TimeWindowSchedule,
};
use fieldgate::state::{ActuatorState, TargetState};
use fieldgate::transition::TransitionLoop;

use crate::mock_hw::{
    ManualClock, MockActuator, RecordingTelemetry, ScriptedConfigSource, secs, t0,
};

fn apply(scheduler: &mut PriorityScheduler, config: ScheduleConfig) {
    scheduler.apply(config);
}

/// Daily window opening at `t0()` for `open_for`.
fn daily_from_t0(open_for: Duration) -> ScheduleList {
    let w = TimeWindowSchedule::new(t0(), secs(86_400), open_for).unwrap();
    ScheduleList::from_slice(&[w]).unwrap()
}

fn scheduled(schedules: ScheduleList) -> PriorityScheduler {
    let mut s = PriorityScheduler::default();
    s.set_schedules(schedules);
    s
}

fn close_override(duration: Duration) -> ScheduleConfig {
    ScheduleConfig {
        schedules: daily_from_t0(secs(60)),
        override_spec: Some(OverrideSpec {
            state: TargetState::Closed,
            start: t0(),
            duration,
        }),
    }
}

#[test]
fn fail_closed_when_no_policy_has_an_opinion() {
    let clock = ManualClock::at(t0());
    let telemetry = RecordingTelemetry::default();
    let mut looped = TransitionLoop::new(
        MockActuator::with_state(ActuatorState::Open),
        PriorityScheduler::default(),
        &telemetry,
        clock.clone(),
        ScriptedConfigSource::<ScheduleConfig>::new(clock),
        apply,
        LoopConfig::default(),
    );

    let step = looped.step();
    assert_eq!(step.target, TargetState::Closed);
    assert!(step.transitioned);
    assert_eq!(step.deadline, LoopConfig::default().max_wait());
    assert_eq!(looped.actuator().state, ActuatorState::Closed);
    assert_eq!(looped.actuator().calls, vec![Some(TargetState::Closed)]);
}

#[test]
fn config_update_interrupts_the_wait() {
    let clock = ManualClock::at(t0());
    let telemetry = RecordingTelemetry::default();
    let configs = ScriptedConfigSource::new(clock.clone())
        .deliver(secs(1), close_override(secs(3600)));
    let mut looped = TransitionLoop::new(
        MockActuator::new(),
        scheduled(daily_from_t0(secs(60))),
        &telemetry,
        clock.clone(),
        configs,
        apply,
        LoopConfig::default(),
    );

    let first = looped.step();
    assert_eq!(first.target, TargetState::Open);
    assert_eq!(first.deadline, secs(60));
    assert!(first.reconfigured);
    assert_eq!(clock.now(), t0() + chrono::TimeDelta::seconds(1));

    // Re-evaluated at +1s under the new override, not at +60s.
    let second = looped.step();
    assert_eq!(second.target, TargetState::Closed);
    assert!(second.transitioned);
    assert_eq!(second.deadline, secs(3599));
}

#[test]
fn timeout_re_ticks_at_the_deadline() {
    let clock = ManualClock::at(t0());
    let telemetry = RecordingTelemetry::default();
    let mut looped = TransitionLoop::new(
        MockActuator::new(),
        scheduled(daily_from_t0(secs(60))),
        &telemetry,
        clock.clone(),
        ScriptedConfigSource::<ScheduleConfig>::new(clock.clone()),
        apply,
        LoopConfig::default(),
    );

    assert_eq!(looped.step().target, TargetState::Open);
    let closed = looped.step();
    assert_eq!(closed.target, TargetState::Closed);
    assert!(closed.transitioned);
    assert_eq!(closed.deadline, secs(86_400 - 60));
}

#[test]
fn repeated_tick_without_change_is_idempotent() {
    let clock = ManualClock::at(t0());
    let telemetry = RecordingTelemetry::default();
    let mut looped = TransitionLoop::new(
        MockActuator::new(),
        scheduled(daily_from_t0(secs(60))),
        &telemetry,
        clock,
        ScriptedConfigSource::<ScheduleConfig>::frozen(),
        apply,
        LoopConfig::default(),
    );

    let a = looped.step();
    let b = looped.step();
    assert_eq!(a.target, b.target);
    assert!(a.transitioned);
    assert!(!b.transitioned);
    assert_eq!(a.deadline, b.deadline);
}

#[test]
fn telemetry_on_start_transition_and_config_only() {
    let clock = ManualClock::at(t0());
    let telemetry = RecordingTelemetry::default();
    let configs = ScriptedConfigSource::new(clock.clone())
        .deliver(secs(10), ScheduleConfig::default());
    let mut looped = TransitionLoop::new(
        MockActuator::with_state(ActuatorState::Closed),
        PriorityScheduler::default(),
        &telemetry,
        clock,
        configs,
        apply,
        LoopConfig {
            max_wait_ms: 60_000,
            initial_telemetry: true,
            ..LoopConfig::default()
        },
    );

    // The update lands during the first wait.
    let first = looped.step();
    assert!(first.reconfigured);
    assert_eq!(telemetry.count(), 1, "initial publish");

    looped.step();
    assert_eq!(telemetry.count(), 2, "published after config");

    looped.step();
    assert_eq!(telemetry.count(), 2, "steady state stays quiet");
}

#[test]
fn no_initial_telemetry_when_disabled_and_nothing_changes() {
    let clock = ManualClock::at(t0());
    let telemetry = RecordingTelemetry::default();
    let mut looped = TransitionLoop::new(
        MockActuator::with_state(ActuatorState::Closed),
        PriorityScheduler::default(),
        &telemetry,
        clock,
        ScriptedConfigSource::<ScheduleConfig>::frozen(),
        apply,
        LoopConfig {
            initial_telemetry: false,
            ..LoopConfig::default()
        },
    );

    let step = looped.step();
    assert!(!step.transitioned);
    assert_eq!(telemetry.count(), 0);
}

#[test]
fn deadline_is_clamped_to_max_wait() {
    let clock = ManualClock::at(t0());
    let telemetry = RecordingTelemetry::default();
    let mut looped = TransitionLoop::new(
        MockActuator::new(),
        scheduled(daily_from_t0(secs(60))),
        &telemetry,
        clock.clone(),
        ScriptedConfigSource::<ScheduleConfig>::new(clock),
        apply,
        LoopConfig {
            max_wait_ms: 5_000,
            initial_telemetry: true,
            ..LoopConfig::default()
        },
    );

    assert_eq!(looped.step().deadline, secs(5));
}

#[test]
fn override_expiry_reverts_to_schedule_and_publishes() {
    let clock = ManualClock::at(t0());
    let telemetry = RecordingTelemetry::default();
    let mut scheduler = scheduled(daily_from_t0(secs(600)));
    scheduler.set_override(Some(OverrideWindow::new(
        TargetState::Closed,
        t0() + chrono::TimeDelta::seconds(30),
    )));
    let mut looped = TransitionLoop::new(
        MockActuator::new(),
        scheduler,
        &telemetry,
        clock.clone(),
        ScriptedConfigSource::<ScheduleConfig>::new(clock),
        apply,
        LoopConfig::default(),
    );

    let overridden = looped.step();
    assert_eq!(overridden.target, TargetState::Closed);
    assert_eq!(overridden.deadline, secs(30));

    let before = telemetry.count();
    let reverted = looped.step();
    assert_eq!(reverted.target, TargetState::Open);
    assert!(reverted.transitioned);
    assert!(telemetry.count() > before);
}

#[test]
fn telemetry_snapshot_reports_override() {
    let clock = ManualClock::at(t0());
    let telemetry = RecordingTelemetry::default();
    let mut scheduler = PriorityScheduler::default();
    scheduler.apply(close_override(secs(3600)));
    let mut looped = TransitionLoop::new(
        MockActuator::new(),
        scheduler,
        &telemetry,
        clock,
        ScriptedConfigSource::<ScheduleConfig>::frozen(),
        apply,
        LoopConfig::default(),
    );

    looped.step();
    assert_eq!(
        looped.report().to_json().unwrap(),
        r#"{"state":-1,"overrideState":-1,"overrideEnd":"2024-05-01T07:00:00Z"}"#
    );
}

#[test]
fn staged_report_matches_what_was_published() {
    let clock = ManualClock::at(t0());
    let telemetry = RecordingTelemetry::default();
    let mut scheduler = PriorityScheduler::default();
    scheduler.apply(close_override(secs(3600)));
    let mut looped = TransitionLoop::new(
        MockActuator::new(),
        scheduler,
        &telemetry,
        clock,
        ScriptedConfigSource::<ScheduleConfig>::frozen(),
        apply,
        LoopConfig::default(),
    );

    looped.step();
    assert_eq!(telemetry.count(), 1);
    assert_eq!(
        telemetry.last_report(),
        Some(ValveTelemetry {
            state: ActuatorState::Closed,
            override_state: Some(TargetState::Closed),
            override_end: Some(t0() + chrono::TimeDelta::seconds(3600)),
        })
    );
}

#[test]
fn unsynced_clock_re_evaluates_soon_instead_of_parking() {
    let clock = ManualClock::at(Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 5).unwrap());
    clock.set_synced(false);
    let telemetry = RecordingTelemetry::default();
    let mut looped = TransitionLoop::new(
        MockActuator::new(),
        scheduled(daily_from_t0(secs(60))),
        &telemetry,
        clock.clone(),
        ScriptedConfigSource::<ScheduleConfig>::new(clock.clone()),
        apply,
        LoopConfig::default(),
    );

    let booting = looped.step();
    assert_eq!(booting.target, TargetState::Closed, "schedule not started in 1970");
    assert_eq!(booting.deadline, LoopConfig::default().unsynced_retry());

    // SNTP lands between retries.
    clock.set(t0());
    clock.set_synced(true);
    let synced = looped.step();
    assert_eq!(synced.target, TargetState::Open);
    assert!(synced.transitioned);
    assert_eq!(synced.deadline, secs(60));
}

#[test]
fn boot_time_wall_clock_still_reaches_the_schedule() {
    let boot = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 5).unwrap();
    let clock = WallClock::anchored(boot, Instant::now());
    let mut scheduler = scheduled(daily_from_t0(secs(60)));

    assert!(scheduler.tick(clock.now()).target_state.is_some());
    assert!(clock.is_synced());
}
