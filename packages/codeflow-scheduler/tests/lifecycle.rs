mod common;

use codeflow_scheduler::actions::Delay;
use codeflow_scheduler::{
    ActionHandle, ActionSettings, ActionState, FlowConfig, FlowError, OwnerState, SetupError,
    WorldKind,
};
use common::{Harness, approx, new_log};
use std::cell::Cell;
use std::rc::Rc;

#[test]
fn test_delay_fires_once_after_enough_time() {
    let h = Harness::new();
    let owner = h.spawn();
    let log = new_log();

    {
        let log = log.clone();
        h.flow.add_delay(
            owner,
            1.0,
            move |stopped| log.borrow_mut().push(stopped),
            ActionSettings::default(),
        );
    }

    h.ticks(0.3, 3);
    assert!(log.borrow().is_empty());

    h.tick(0.3);
    assert_eq!(*log.borrow(), vec![false]);

    h.ticks(0.3, 5);
    assert_eq!(*log.borrow(), vec![false]);
}

#[test]
fn test_owner_death_suppresses_completion() {
    let h = Harness::new();
    let owner = h.spawn();
    let fired = Rc::new(Cell::new(false));

    {
        let fired = fired.clone();
        h.flow.add_delay(owner, 1.0, move |_| fired.set(true), ActionSettings::default());
    }
    h.owners.destroy(owner);

    h.tick(2.0);
    assert!(!fired.get());
    assert_eq!(h.flow.action_count(), 0);
    assert_eq!(h.flow.pending_count(), 0);
}

#[test]
fn test_owner_being_destroyed_mid_flight_is_silent() {
    let h = Harness::new();
    let owner = h.spawn();
    let ticks = Rc::new(Cell::new(0));
    let completed = Rc::new(Cell::new(false));

    {
        let ticks = ticks.clone();
        let completed = completed.clone();
        h.flow.add_ticker(
            owner,
            5.0,
            move |_| ticks.set(ticks.get() + 1),
            move |_| completed.set(true),
            ActionSettings::default(),
        );
    }

    h.ticks(1.0, 2);
    h.owners.begin_destroy(owner);
    h.ticks(1.0, 10);

    assert_eq!(ticks.get(), 2);
    assert!(!completed.get());
}

#[test]
fn test_add_for_dead_owner_is_rejected() {
    let h = Harness::new();
    let owner = h.spawn();
    h.owners.destroy(owner);

    let handle = h
        .flow
        .add_delay(owner, 1.0, |_| {}, ActionSettings::default());
    assert!(!handle.is_valid());

    let err = h
        .flow
        .try_add::<Delay>(owner, (1.0, Box::new(|_: bool| {})), ActionSettings::default(), None)
        .unwrap_err();
    assert_eq!(err, SetupError::OwnerNotAlive(OwnerState::Destroyed));
}

#[test]
fn test_bad_configuration_returns_invalid_handle() {
    let h = Harness::new();
    let owner = h.spawn();
    let fired = Rc::new(Cell::new(false));

    {
        let fired = fired.clone();
        let handle = h.flow.add_delay(owner, -1.0, move |_| fired.set(true), ActionSettings::default());
        assert_eq!(handle, ActionHandle::INVALID);
    }
    let handle = h
        .flow
        .add_delay(owner, 1.0, |_| {}, ActionSettings::delayed(-2.0));
    assert!(!handle.is_valid());

    let err = h
        .flow
        .try_add::<Delay>(owner, (-1.0, Box::new(|_: bool| {})), ActionSettings::default(), None)
        .unwrap_err();
    assert_eq!(err, SetupError::NegativeDuration(-1.0));

    h.tick(10.0);
    assert!(!fired.get());
    assert_eq!(h.flow.issued_handles(), 0);
}

#[test]
fn test_zero_delay_fires_on_next_tick() {
    let h = Harness::new();
    let owner = h.spawn();
    let fired = Rc::new(Cell::new(0));

    let handle = {
        let fired = fired.clone();
        h.flow.add_delay(
            owner,
            0.0,
            move |_| fired.set(fired.get() + 1),
            ActionSettings::default(),
        )
    };
    assert_eq!(fired.get(), 0);
    assert_eq!(h.flow.find(handle).map(|info| info.state), Some(ActionState::Pending));

    h.tick(0.016);
    assert_eq!(fired.get(), 1);
    assert!(!h.flow.has_action(handle));
}

#[test]
fn test_ticker_pauses_and_resumes() {
    let h = Harness::new();
    let owner = h.spawn();
    let log = new_log();
    let completed = Rc::new(Cell::new(false));

    let handle = {
        let log = log.clone();
        let completed = completed.clone();
        h.flow.add_ticker(
            owner,
            10.0,
            move |dt| log.borrow_mut().push(dt),
            move |_| completed.set(true),
            ActionSettings::default(),
        )
    };

    h.tick(1.0);
    assert_eq!(*log.borrow(), vec![1.0]);

    h.flow.pause(handle);
    assert_eq!(h.flow.is_paused(handle), Some(true));
    assert_eq!(h.flow.find(handle).map(|info| info.state), Some(ActionState::Paused));
    h.tick(5.0);
    assert_eq!(*log.borrow(), vec![1.0]);

    h.flow.resume(handle);
    h.tick(1.0);
    assert_eq!(*log.borrow(), vec![1.0, 1.0]);
    assert_eq!(log.borrow().iter().sum::<f32>(), 2.0);
    assert!(!completed.get());
    assert_eq!(h.flow.find(handle).map(|info| info.state), Some(ActionState::Running));
}

#[test]
fn test_global_pause_freezes_everything() {
    let h = Harness::new();
    let owner = h.spawn();
    let fired = Rc::new(Cell::new(false));

    {
        let fired = fired.clone();
        h.flow.add_delay(owner, 1.0, move |_| fired.set(true), ActionSettings::default());
    }

    h.tick(0.5);
    h.flow.pause_global();
    assert!(h.flow.is_globally_paused());
    h.tick(1.0);
    assert!(!fired.get());

    h.flow.resume_global();
    h.tick(0.6);
    assert!(fired.get());
}

#[test]
fn test_unbounded_ticker_completes_only_when_stopped_with_completion() {
    let h = Harness::new();
    let owner = h.spawn();
    let log = new_log();
    let ticks = Rc::new(Cell::new(0));

    let mut handles = Vec::new();
    for complete in [true, false] {
        let log = log.clone();
        let ticks = ticks.clone();
        let handle = h.flow.add_ticker(
            owner,
            -1.0,
            move |_| ticks.set(ticks.get() + 1),
            move |stopped| log.borrow_mut().push((complete, stopped)),
            ActionSettings::default(),
        );
        handles.push((handle, complete));
    }

    h.ticks(100.0, 10);
    assert_eq!(ticks.get(), 20);
    assert!(log.borrow().is_empty());

    for (handle, complete) in handles {
        h.flow.stop(handle, complete);
    }
    assert_eq!(*log.borrow(), vec![(true, true)]);

    h.tick(1.0);
    assert_eq!(ticks.get(), 20);
}

#[test]
fn test_bounded_ticker_completes_naturally() {
    let h = Harness::new();
    let owner = h.spawn();
    let log = new_log();

    {
        let tick_log = log.clone();
        let done_log = log.clone();
        h.flow.add_ticker(
            owner,
            2.0,
            move |dt| tick_log.borrow_mut().push(format!("tick {dt}")),
            move |stopped| done_log.borrow_mut().push(format!("done {stopped}")),
            ActionSettings::default(),
        );
    }

    h.ticks(1.0, 4);
    assert_eq!(*log.borrow(), vec!["tick 1", "tick 1", "done false"]);
}

#[test]
fn test_stop_is_idempotent() {
    let h = Harness::new();
    let owner = h.spawn();
    let count = Rc::new(Cell::new(0));

    let handle = {
        let count = count.clone();
        h.flow.add_ticker(
            owner,
            -1.0,
            |_| {},
            move |_| count.set(count.get() + 1),
            ActionSettings::default(),
        )
    };
    h.tick(0.1);

    h.flow.stop(handle, true);
    h.flow.stop(handle, true);
    h.flow.stop(handle, false);
    assert_eq!(count.get(), 1);
    assert!(!h.flow.has_action(handle));
    assert_eq!(h.flow.is_paused(handle), None);
}

#[test]
fn test_stopping_pending_action_fires_nothing() {
    let h = Harness::new();
    let owner = h.spawn();
    let fired = Rc::new(Cell::new(false));

    let handle = {
        let fired = fired.clone();
        h.flow.add_delay(owner, 0.0, move |_| fired.set(true), ActionSettings::default())
    };
    h.flow.stop(handle, true);
    h.tick(1.0);

    assert!(!fired.get());
    assert_eq!(h.flow.pending_count(), 0);
}

#[test]
fn test_handles_are_unique_and_invalidation_is_local() {
    let h = Harness::new();
    let owner = h.spawn();

    let mut handles: Vec<_> = (0..16)
        .map(|_| h.flow.add_delay(owner, 0.0, |_| {}, ActionSettings::default()))
        .collect();
    let mut sorted = handles.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted.len(), 16);

    let kept = handles[3];
    handles[3].invalidate();
    assert!(!handles[3].is_valid());
    assert!(h.flow.has_action(kept));
    assert!(!h.flow.has_action(handles[3]));
}

#[test]
fn test_first_delay_carries_overshoot() {
    let h = Harness::new();
    let owner = h.spawn();
    let log = new_log();

    {
        let log = log.clone();
        h.flow.add_ticker(
            owner,
            -1.0,
            move |dt| log.borrow_mut().push(dt),
            |_| {},
            ActionSettings::delayed(1.0),
        );
    }

    h.ticks(0.4, 2);
    assert!(log.borrow().is_empty());
    h.tick(0.4);
    assert_eq!(log.borrow().len(), 1);
    assert!(approx(log.borrow()[0], 0.2));
    h.tick(0.4);
    assert!(approx(log.borrow()[1], 0.4));
}

#[test]
fn test_tick_interval_batches_time() {
    let h = Harness::new();
    let owner = h.spawn();
    let log = new_log();

    {
        let log = log.clone();
        h.flow.add_ticker(
            owner,
            -1.0,
            move |dt| log.borrow_mut().push(dt),
            |_| {},
            ActionSettings::tick_every(0.5),
        );
    }

    h.ticks(0.25, 5);
    assert_eq!(*log.borrow(), vec![0.5, 0.5]);
}

#[test]
fn test_world_pause_respects_ignore_pause() {
    let h = Harness::new();
    let owner = h.spawn();
    let normal = Rc::new(Cell::new(0));
    let ignoring = Rc::new(Cell::new(0));

    for (counter, settings) in [
        (normal.clone(), ActionSettings::default()),
        (ignoring.clone(), ActionSettings::ignoring_pause()),
    ] {
        h.flow.add_ticker(
            owner,
            -1.0,
            move |_| counter.set(counter.get() + 1),
            |_| {},
            settings,
        );
    }

    h.flow.set_world_paused(true);
    h.ticks(0.1, 3);
    assert_eq!((normal.get(), ignoring.get()), (0, 3));

    h.flow.set_world_paused(false);
    h.tick(0.1);
    assert_eq!((normal.get(), ignoring.get()), (1, 4));
}

#[test]
fn test_time_dilation_scales_dt() {
    let h = Harness::with_config(FlowConfig::default().with_time_dilation(0.5));
    let owner = h.spawn();
    let dilated = new_log();
    let raw = new_log();

    for (log, settings) in [
        (dilated.clone(), ActionSettings::default()),
        (raw.clone(), ActionSettings::ignoring_time_dilation()),
    ] {
        h.flow.add_ticker(
            owner,
            -1.0,
            move |dt| log.borrow_mut().push(dt),
            |_| {},
            settings,
        );
    }

    h.tick(1.0);
    h.flow.set_time_dilation(2.0);
    h.flow.set_time_dilation(f32::NAN);
    h.tick(1.0);

    assert_eq!(*dilated.borrow(), vec![0.5, 2.0]);
    assert_eq!(*raw.borrow(), vec![1.0, 1.0]);
}

#[test]
fn test_start_paused_waits_for_resume() {
    let h = Harness::new();
    let owner = h.spawn();
    let fired = Rc::new(Cell::new(false));

    let handle = {
        let fired = fired.clone();
        h.flow.add_delay(owner, 0.0, move |_| fired.set(true), ActionSettings::paused())
    };
    h.ticks(1.0, 3);
    assert!(!fired.get());
    assert_eq!(h.flow.is_paused(handle), Some(true));

    h.flow.resume(handle);
    h.tick(1.0);
    assert!(fired.get());
}

#[test]
fn test_invalid_delta_is_rejected() {
    let h = Harness::new();
    assert_eq!(h.flow.tick(-1.0), Err(FlowError::InvalidDelta(-1.0)));
    assert!(matches!(h.flow.tick(f32::NAN), Err(FlowError::InvalidDelta(_))));
    assert_eq!(h.flow.tick(0.0), Ok(()));
}

#[test]
fn test_editor_world_rejects_actions() {
    let h = Harness::with_config(FlowConfig::for_world(WorldKind::Editor));
    let owner = h.spawn();

    let handle = h.flow.add_delay(owner, 0.0, |_| {}, ActionSettings::default());
    assert!(!handle.is_valid());
    let err = h
        .flow
        .try_add::<Delay>(owner, (0.0, Box::new(|_: bool| {})), ActionSettings::default(), None)
        .unwrap_err();
    assert_eq!(err, SetupError::WorldCannotTick(WorldKind::Editor));
    assert_eq!(h.flow.tick(1.0), Ok(()));
}

#[test]
fn test_shutdown_stops_everything_silently() {
    let h = Harness::new();
    let owner = h.spawn();
    let fired = Rc::new(Cell::new(false));

    {
        let fired = fired.clone();
        h.flow.add_ticker(owner, -1.0, |_| {}, move |_| fired.set(true), ActionSettings::default());
    }
    h.tick(0.1);
    h.flow.shutdown();
    h.flow.shutdown();

    assert!(!fired.get());
    assert_eq!(h.flow.action_count(), 0);
    assert!(!h.flow.add_delay(owner, 0.0, |_| {}, ActionSettings::default()).is_valid());
    assert_eq!(h.flow.tick(0.1), Err(FlowError::ShutDown));
}

#[test]
fn test_dropping_scheduler_releases_actions() {
    let h = Harness::new();
    let owner = h.spawn();
    let token = Rc::new(());

    {
        let token = token.clone();
        h.flow.add_ticker(
            owner,
            -1.0,
            move |_| {
                let _ = &token;
            },
            |_| {},
            ActionSettings::default(),
        );
    }
    h.tick(0.1);
    assert_eq!(Rc::strong_count(&token), 2);

    drop(h);
    assert_eq!(Rc::strong_count(&token), 1);
}

#[test]
fn test_counts_track_pending_and_live() {
    let h = Harness::new();
    let owner = h.spawn();

    let handle = h.flow.add_ticker(owner, -1.0, |_| {}, |_| {}, ActionSettings::default());
    assert_eq!((h.flow.pending_count(), h.flow.action_count()), (1, 0));

    h.tick(0.1);
    assert_eq!((h.flow.pending_count(), h.flow.action_count()), (0, 1));
    let info = h.flow.find(handle).unwrap();
    assert_eq!(info.owner, owner);
    assert_eq!(info.instance, None);

    h.flow.stop_all(Some(owner), false);
    assert_eq!(h.flow.action_count(), 0);
}

#[test]
fn test_invalid_config_dilation_falls_back_to_one() {
    for dilation in [f32::NAN, -2.0, f32::INFINITY] {
        let h = Harness::with_config(FlowConfig::default().with_time_dilation(dilation));
        assert_eq!(h.flow.config().time_dilation, 1.0, "dilation {dilation}");

        let owner = h.spawn();
        let fired = Rc::new(Cell::new(false));
        {
            let fired = fired.clone();
            h.flow.add_delay(owner, 0.5, move |_| fired.set(true), ActionSettings::default());
        }
        h.tick(0.5);
        assert!(fired.get(), "dilation {dilation}");
    }
}
