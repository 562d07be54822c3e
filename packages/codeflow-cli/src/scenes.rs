use clap::ValueEnum;
use codeflow_scheduler::curves::{BlendFunc, CurveKey, ScalarCurve};
use codeflow_scheduler::{ActionSettings, FlowScheduler, InstanceId, Owners, TimelineParams};
use std::rc::Rc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Scene {
    /// Delay, ticker and an eased timeline on one owner
    Door,
    /// Instance-keyed gates hammered from a ticker
    Gates,
    /// A coroutine chaining several awaiters, plus one killed by owner death
    Coroutine,
    /// A looping curve stopped by a delay
    Curve,
}

pub fn setup(scene: Scene, flow: &FlowScheduler, owners: &Rc<Owners>) {
    match scene {
        Scene::Door => door(flow, owners),
        Scene::Gates => gates(flow, owners),
        Scene::Coroutine => coroutine(flow, owners),
        Scene::Curve => curve(flow, owners),
    }
}

fn door(flow: &FlowScheduler, owners: &Rc<Owners>) {
    let door = owners.spawn();
    let weak = flow.downgrade();

    flow.add_delay(
        door,
        1.0,
        move |stopped| {
            info!(stopped, "door unlocked");
            let Some(flow) = weak.upgrade() else {
                return;
            };
            flow.add_timeline(
                door,
                TimelineParams::new(0.0_f32, 90.0, 2.0).with_blend(BlendFunc::EaseInOut, 2.0),
                |angle, time| debug!(angle, time, "door swing"),
                |angle, time, stopped| info!(angle, time, stopped, "door open"),
                ActionSettings::default(),
            );
        },
        ActionSettings::default(),
    );

    flow.add_ticker(
        door,
        1.0,
        |dt| debug!(dt, "lock buzzing"),
        |stopped| info!(stopped, "lock quiet"),
        ActionSettings::tick_every(0.25),
    );
}

fn gates(flow: &FlowScheduler, owners: &Rc<Owners>) {
    let player = owners.spawn();
    let weak = flow.downgrade();
    let greeting = InstanceId::from_key("greeting");
    let reward = InstanceId::from_key("reward");
    let fire = InstanceId::from_key("fire");

    // every tick asks for the same gated work again
    flow.add_ticker(
        player,
        3.0,
        move |_| {
            let Some(flow) = weak.upgrade() else {
                return;
            };
            let settings = ActionSettings::default();
            flow.add_do_once(player, || info!("hello, once"), Some(greeting), settings);
            flow.add_do_n_times(player, 3, |n| info!(n, "reward"), reward, settings);
            flow.add_do_no_more_than_x_time(player, 0.5, 2, || info!("fire"), fire, settings);
        },
        |_| info!("gate driver done"),
        ActionSettings::tick_every(0.1),
    );
}

fn coroutine(flow: &FlowScheduler, owners: &Rc<Owners>) {
    let hero = owners.spawn();
    flow.add_coroutine(
        hero,
        |ctx| async move {
            info!("hero: walking");
            ctx.wait_seconds(0.5).await;
            info!("hero: arrived, catching breath");
            ctx.wait_ticks(3).await;

            let mut waited = 0.0;
            let res = ctx
                .wait_until(
                    move |dt| {
                        waited += dt;
                        waited >= 1.0
                    },
                    5.0,
                )
                .await;
            info!(timed_out = res.timed_out, stopped = res.stopped, "hero: ready");
        },
        ActionSettings::default(),
    );

    let ghost = owners.spawn();
    flow.add_coroutine(
        ghost,
        |ctx| async move {
            info!("ghost: haunting");
            ctx.wait_seconds(60.0).await;
            warn!("ghost outlived its owner");
        },
        ActionSettings::default(),
    );

    let registry = owners.clone();
    flow.add_delay(
        hero,
        1.0,
        move |_| {
            registry.destroy(ghost);
            info!("ghost owner destroyed");
        },
        ActionSettings::default(),
    );
}

fn curve(flow: &FlowScheduler, owners: &Rc<Owners>) {
    let lamp = owners.spawn();
    let keys = [
        CurveKey::new(0.0, 0.0),
        CurveKey::new(0.25, 1.0),
        CurveKey::new(0.5, 0.2),
        CurveKey::new(1.0, 0.0),
    ];
    let flicker = match ScalarCurve::new(keys) {
        Ok(curve) => Rc::new(curve),
        Err(err) => {
            warn!(%err, "bad flicker curve");
            return;
        }
    };

    let handle = flow.add_custom_timeline::<ScalarCurve>(
        lamp,
        flicker,
        1.5,
        |brightness, time| debug!(brightness, time, "lamp"),
        |brightness, time, stopped| info!(brightness, time, stopped, "lamp off"),
        ActionSettings::looped(),
    );

    let weak = flow.downgrade();
    flow.add_delay(
        lamp,
        3.0,
        move |_| {
            if let Some(flow) = weak.upgrade() {
                flow.stop(handle, true);
            }
        },
        ActionSettings::default(),
    );
}
