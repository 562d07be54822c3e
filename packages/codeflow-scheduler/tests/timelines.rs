mod common;

use codeflow_scheduler::curves::{BlendFunc, LinearColor, ScalarCurve, Vec3};
use codeflow_scheduler::{ActionSettings, TimelineParams};
use common::{Harness, approx, new_log};
use std::rc::Rc;

#[test]
fn test_custom_timeline_plays_curve() {
    let h = Harness::new();
    let owner = h.spawn();
    let ticks = new_log();
    let done = new_log();
    let curve = Rc::new(ScalarCurve::linear((0.0, 10.0), (1.0, 20.0)).unwrap());

    let handle = {
        let (ticks, done) = (ticks.clone(), done.clone());
        h.flow.add_custom_timeline::<ScalarCurve>(
            owner,
            curve,
            1.0,
            move |value, time| ticks.borrow_mut().push((value, time)),
            move |value, time, stopped| done.borrow_mut().push((value, time, stopped)),
            ActionSettings::default(),
        )
    };
    assert!(handle.is_valid());

    h.ticks(0.25, 5);
    assert_eq!(
        *ticks.borrow(),
        vec![(10.0, 0.0), (12.5, 0.25), (15.0, 0.5), (17.5, 0.75), (20.0, 1.0)]
    );
    assert_eq!(*done.borrow(), vec![(20.0, 1.0, false)]);

    h.tick(0.25);
    assert_eq!(ticks.borrow().len(), 5);
    assert!(!h.flow.has_action(handle));
}

#[test]
fn test_constant_curve_finishes_after_priming() {
    let h = Harness::new();
    let owner = h.spawn();
    let ticks = new_log();
    let done = new_log();
    let curve = Rc::new(ScalarCurve::constant(2.0, 5.0).unwrap());

    {
        let (ticks, done) = (ticks.clone(), done.clone());
        h.flow.add_custom_timeline::<ScalarCurve>(
            owner,
            curve,
            1.0,
            move |value, time| ticks.borrow_mut().push((value, time)),
            move |value, time, stopped| done.borrow_mut().push((value, time, stopped)),
            ActionSettings::default(),
        );
    }

    h.tick(0.1);
    assert_eq!(*ticks.borrow(), vec![(5.0, 2.0)]);
    assert!(done.borrow().is_empty());

    h.tick(0.1);
    assert_eq!(*done.borrow(), vec![(5.0, 2.0, false)]);
}

#[test]
fn test_custom_timeline_starts_at_curve_min() {
    let h = Harness::new();
    let owner = h.spawn();
    let ticks = new_log();
    let curve = Rc::new(ScalarCurve::linear((2.0, 0.0), (4.0, 10.0)).unwrap());

    {
        let ticks = ticks.clone();
        h.flow.add_custom_timeline::<ScalarCurve>(
            owner,
            curve,
            1.0,
            move |value, time| ticks.borrow_mut().push((value, time)),
            |_, _, _| {},
            ActionSettings::default(),
        );
    }

    h.ticks(0.5, 5);
    assert_eq!(
        *ticks.borrow(),
        vec![(0.0, 2.0), (2.5, 2.5), (5.0, 3.0), (7.5, 3.5), (10.0, 4.0)]
    );
}

#[test]
fn test_play_rate_sign_is_ignored() {
    for rate in [2.0, -2.0] {
        let h = Harness::new();
        let owner = h.spawn();
        let ticks = new_log();
        let curve = Rc::new(ScalarCurve::linear((0.0, 10.0), (1.0, 20.0)).unwrap());

        {
            let ticks = ticks.clone();
            h.flow.add_custom_timeline::<ScalarCurve>(
                owner,
                curve,
                rate,
                move |value, time| ticks.borrow_mut().push((value, time)),
                |_, _, _| {},
                ActionSettings::default(),
            );
        }

        h.ticks(0.25, 4);
        assert_eq!(
            *ticks.borrow(),
            vec![(10.0, 0.0), (15.0, 0.5), (20.0, 1.0)],
            "rate {rate}"
        );
    }
}

#[test]
fn test_looping_custom_timeline_wraps_until_stopped() {
    let h = Harness::new();
    let owner = h.spawn();
    let ticks = new_log();
    let done = new_log();
    let curve = Rc::new(ScalarCurve::linear((0.0, 10.0), (1.0, 20.0)).unwrap());

    let handle = {
        let (ticks, done) = (ticks.clone(), done.clone());
        h.flow.add_custom_timeline::<ScalarCurve>(
            owner,
            curve,
            1.0,
            move |value, time| ticks.borrow_mut().push((value, time)),
            move |value, time, stopped| done.borrow_mut().push((value, time, stopped)),
            ActionSettings::looped(),
        )
    };

    h.ticks(0.4, 4);
    {
        let ticks = ticks.borrow();
        assert_eq!(ticks.len(), 4);
        let (value, time) = ticks[3];
        assert!(approx(time, 0.2), "wrapped to {time}");
        assert!(approx(value, 12.0));
    }
    assert!(done.borrow().is_empty());

    h.ticks(0.4, 10);
    assert!(done.borrow().is_empty());
    assert!(h.flow.has_action(handle));

    h.flow.stop(handle, true);
    let done = done.borrow();
    assert_eq!(done.len(), 1);
    assert!(done[0].2);
}

#[test]
fn test_custom_timeline_without_curve_is_rejected() {
    let h = Harness::new();
    let owner = h.spawn();
    let handle = h.flow.add_custom_timeline::<ScalarCurve>(
        owner,
        None,
        1.0,
        |_, _| {},
        |_, _, _| {},
        ActionSettings::default(),
    );
    assert!(!handle.is_valid());
    assert_eq!(h.flow.pending_count(), 0);
}

#[test]
fn test_scalar_timeline() {
    let h = Harness::new();
    let owner = h.spawn();
    let ticks = new_log();
    let done = new_log();

    {
        let (ticks, done) = (ticks.clone(), done.clone());
        h.flow.add_timeline(
            owner,
            TimelineParams::new(0.0_f32, 10.0, 1.0),
            move |value, time| ticks.borrow_mut().push((value, time)),
            move |value, time, stopped| done.borrow_mut().push((value, time, stopped)),
            ActionSettings::default(),
        );
    }

    h.ticks(0.25, 6);
    assert_eq!(
        *ticks.borrow(),
        vec![(0.0, 0.0), (2.5, 0.25), (5.0, 0.5), (7.5, 0.75), (10.0, 1.0)]
    );
    assert_eq!(*done.borrow(), vec![(10.0, 1.0, false)]);
}

#[test]
fn test_vector_timeline() {
    let h = Harness::new();
    let owner = h.spawn();
    let ticks = new_log();
    let target = Vec3::new(2.0, 4.0, 6.0);

    {
        let ticks = ticks.clone();
        h.flow.add_timeline(
            owner,
            TimelineParams::new(Vec3::ZERO, target, 2.0),
            move |value, time| ticks.borrow_mut().push((value, time)),
            |_, _, _| {},
            ActionSettings::default(),
        );
    }

    h.ticks(1.0, 3);
    assert_eq!(
        *ticks.borrow(),
        vec![(Vec3::ZERO, 0.0), (Vec3::new(1.0, 2.0, 3.0), 1.0), (target, 2.0)]
    );
}

#[test]
fn test_color_timeline_eases_in() {
    let h = Harness::new();
    let owner = h.spawn();
    let ticks = new_log();

    {
        let ticks = ticks.clone();
        h.flow.add_timeline(
            owner,
            TimelineParams::new(LinearColor::BLACK, LinearColor::WHITE, 1.0)
                .with_blend(BlendFunc::EaseIn, 2.0),
            move |value: LinearColor, _| ticks.borrow_mut().push(value),
            |_, _, _| {},
            ActionSettings::default(),
        );
    }

    h.ticks(0.5, 3);
    assert_eq!(
        *ticks.borrow(),
        vec![
            LinearColor::BLACK,
            LinearColor::new(0.25, 0.25, 0.25, 1.0),
            LinearColor::WHITE,
        ]
    );
}

#[test]
fn test_timeline_rejects_bad_params() {
    let h = Harness::new();
    let owner = h.spawn();
    let settings = ActionSettings::default();

    let zero_time = h.flow.add_timeline(owner, TimelineParams::new(0.0_f32, 1.0, 0.0), |_, _| {}, |_, _, _| {}, settings);
    let flat_exp = h.flow.add_timeline(
        owner,
        TimelineParams::new(0.0_f32, 1.0, 1.0).with_blend(BlendFunc::EaseOut, 0.0),
        |_, _| {},
        |_, _, _| {},
        settings,
    );
    let same_ends = h.flow.add_timeline(owner, TimelineParams::new(3.0_f32, 3.0, 1.0), |_, _| {}, |_, _, _| {}, settings);

    assert!(!zero_time.is_valid());
    assert!(!flat_exp.is_valid());
    assert!(!same_ends.is_valid());
}

#[test]
fn test_timeline_stops_silently_when_owner_dies() {
    let h = Harness::new();
    let owner = h.spawn();
    let ticks = new_log();
    let done = new_log();

    {
        let (ticks, done) = (ticks.clone(), done.clone());
        h.flow.add_timeline(
            owner,
            TimelineParams::new(0.0_f32, 1.0, 1.0),
            move |value, _| ticks.borrow_mut().push(value),
            move |_, _, stopped| done.borrow_mut().push(stopped),
            ActionSettings::default(),
        );
    }

    h.ticks(0.25, 2);
    h.owners.destroy(owner);
    h.ticks(0.25, 4);

    assert_eq!(ticks.borrow().len(), 2);
    assert!(done.borrow().is_empty());
    assert_eq!(h.flow.action_count(), 0);
}
