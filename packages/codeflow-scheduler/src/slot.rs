use crate::action::{Action, ActionClass, ActionContext, ActionInfo, ActionState, Outcome};
use crate::handle::ActionHandle;
use crate::instance::InstanceId;
use crate::owner::{OwnerId, OwnerRegistry};
use crate::settings::ActionSettings;
use std::cell::{Cell, RefCell};
use std::mem;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Pending,
    Running,
    Finished,
}

/// Host clock sampled once per scheduler tick.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TickClock {
    pub dt: f32,
    pub world_paused: bool,
    pub time_dilation: f32,
}

struct ActionRunner {
    action: Box<dyn Action>,
    first_delay_left: f32,
    interval_acc: f32,
    action_time: f32,
    max_action_time: Option<f32>,
    initialized: bool,
    first_tick: bool,
    completed: bool,
}

/// Scheduler-side wrapper around one action.
///
/// Everything the scheduler reads between dispatches lives in `Cell`s so that
/// callbacks can stop, pause or query the action while its runner is
/// borrowed.
pub(crate) struct ActionSlot {
    pub(crate) handle: ActionHandle,
    pub(crate) owner: OwnerId,
    pub(crate) instance: Option<InstanceId>,
    pub(crate) class: ActionClass,
    pub(crate) settings: ActionSettings,
    phase: Cell<Phase>,
    paused: Cell<bool>,
    broken: Cell<bool>,
    deferred_complete: Cell<bool>,
    queued_retriggers: Cell<u32>,
    runner: RefCell<ActionRunner>,
}

impl ActionSlot {
    pub(crate) fn new(
        handle: ActionHandle,
        owner: OwnerId,
        instance: Option<InstanceId>,
        class: ActionClass,
        settings: ActionSettings,
        action: Box<dyn Action>,
    ) -> Self {
        let broken = !action.is_valid();
        let max_action_time = action.max_action_time();
        Self {
            handle,
            owner,
            instance,
            class,
            settings,
            phase: Cell::new(Phase::Pending),
            paused: Cell::new(settings.start_paused),
            broken: Cell::new(broken),
            deferred_complete: Cell::new(false),
            queued_retriggers: Cell::new(0),
            runner: RefCell::new(ActionRunner {
                action,
                first_delay_left: settings.first_delay,
                interval_acc: 0.0,
                action_time: 0.0,
                max_action_time,
                initialized: false,
                first_tick: true,
                completed: false,
            }),
        }
    }

    pub(crate) fn is_valid(&self, owners: &dyn OwnerRegistry) -> bool {
        self.phase.get() != Phase::Finished
            && !self.broken.get()
            && owners.is_owner_alive(self.owner)
    }

    pub(crate) fn state(&self) -> ActionState {
        match self.phase.get() {
            Phase::Pending => ActionState::Pending,
            Phase::Finished => ActionState::Finished,
            Phase::Running if self.paused.get() => ActionState::Paused,
            Phase::Running => ActionState::Running,
        }
    }

    pub(crate) fn info(&self) -> ActionInfo {
        ActionInfo {
            handle: self.handle,
            owner: self.owner,
            instance: self.instance,
            class: self.class,
            state: self.state(),
            settings: self.settings,
        }
    }

    pub(crate) fn has_instance(&self, instance: InstanceId) -> bool {
        self.instance == Some(instance)
    }

    pub(crate) fn is_paused(&self) -> bool {
        self.paused.get()
    }

    pub(crate) fn set_paused(&self, paused: bool) {
        self.paused.set(paused);
    }

    /// Pending to live transition. Happens once per action.
    pub(crate) fn activate(&self) {
        if self.phase.get() == Phase::Pending {
            self.phase.set(Phase::Running);
        }
    }

    /// Ends the action from outside its own dispatch. Idempotent.
    ///
    /// Completion only fires for actions that already reached the live list.
    /// When the runner is busy (the stop came from one of the action's own
    /// callbacks) the completion is delivered as soon as that dispatch returns.
    pub(crate) fn finish(&self, complete: bool, owners: &dyn OwnerRegistry) {
        if !self.is_valid(owners) {
            return;
        }
        let was_running = self.phase.get() == Phase::Running;
        self.phase.set(Phase::Finished);
        trace!(handle = %self.handle, complete, was_running, "action finished externally");

        if !(complete && was_running) {
            return;
        }
        match self.runner.try_borrow_mut() {
            Ok(mut runner) => {
                if !runner.completed {
                    runner.completed = true;
                    runner.action.complete(true);
                }
            }
            Err(_) => self.deferred_complete.set(true),
        }
    }

    /// Delivers a retrigger, or queues it until the action is initialized and
    /// its runner is free.
    pub(crate) fn retrigger(&self, owners: &dyn OwnerRegistry) {
        let Ok(mut runner) = self.runner.try_borrow_mut() else {
            self.queue_retrigger();
            return;
        };
        if !runner.initialized {
            self.queue_retrigger();
            return;
        }

        let mut ctx = ActionContext::new(self.handle, self.owner, self.instance, &self.settings);
        runner.action.retrigger(&mut ctx);
        let outcome = ctx.outcome();
        self.settle(&mut runner, outcome, owners);
    }

    fn queue_retrigger(&self) {
        self.queued_retriggers
            .set(self.queued_retriggers.get().saturating_add(1));
    }

    /// Advances the action by one scheduler tick.
    pub(crate) fn dispatch(&self, clock: TickClock, owners: &dyn OwnerRegistry) {
        if self.paused.get() || self.phase.get() != Phase::Running {
            return;
        }
        if clock.world_paused && !self.settings.ignore_pause {
            return;
        }
        let Ok(mut guard) = self.runner.try_borrow_mut() else {
            return;
        };
        let runner = &mut *guard;

        let mut dt = if self.settings.ignore_time_dilation {
            clock.dt
        } else {
            clock.dt * clock.time_dilation
        };

        if runner.first_delay_left > 0.0 {
            runner.first_delay_left -= dt;
            if runner.first_delay_left > 0.0 {
                return;
            }
            // overshoot past the delay belongs to the first tick
            dt = -runner.first_delay_left;
            runner.first_delay_left = 0.0;
        }

        let mut ctx = ActionContext::new(self.handle, self.owner, self.instance, &self.settings);

        if !runner.initialized {
            runner.initialized = true;
            runner.action.init(&mut ctx);
        }
        let queued = self.queued_retriggers.replace(0);
        for _ in 0..queued {
            if ctx.is_ending() {
                break;
            }
            runner.action.retrigger(&mut ctx);
        }

        if !ctx.is_ending() {
            if mem::replace(&mut runner.first_tick, false) && runner.action.primes_first_tick() {
                // the priming tick does not consume playback time
                runner.action.prime(&mut ctx);
            } else {
                Self::advance(runner, &mut ctx, dt, self.settings.tick_interval);
            }
        }

        let outcome = ctx.outcome();
        self.settle(runner, outcome, owners);
    }

    fn advance(runner: &mut ActionRunner, ctx: &mut ActionContext<'_>, dt: f32, interval: f32) {
        runner.action_time += dt;

        if interval > 0.0 {
            runner.interval_acc += dt;
            if runner.interval_acc >= interval {
                let step = mem::take(&mut runner.interval_acc);
                runner.action.tick(ctx, step);
            }
        } else {
            runner.action.tick(ctx, dt);
        }

        if ctx.is_ending() {
            return;
        }
        if let Some(max) = runner.max_action_time {
            if runner.action_time >= max {
                runner.action.deadline_reached(ctx);
                ctx.complete();
            }
        }
    }

    fn settle(&self, runner: &mut ActionRunner, outcome: Outcome, owners: &dyn OwnerRegistry) {
        self.broken.set(!runner.action.is_valid());

        if self.deferred_complete.take() {
            self.phase.set(Phase::Finished);
            if !runner.completed && owners.is_owner_alive(self.owner) {
                runner.completed = true;
                runner.action.complete(true);
            }
            return;
        }

        match outcome {
            Outcome::Continue => {}
            Outcome::Finish => self.phase.set(Phase::Finished),
            Outcome::Complete => {
                let already_finished = self.phase.replace(Phase::Finished) == Phase::Finished;
                if !already_finished && !runner.completed && owners.is_owner_alive(self.owner) {
                    runner.completed = true;
                    trace!(handle = %self.handle, "action completed");
                    runner.action.complete(false);
                }
            }
        }
    }
}
