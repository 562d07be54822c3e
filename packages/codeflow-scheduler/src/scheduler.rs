use crate::action::{Action, ActionClass, ActionInfo, ActionSetup, InstancePolicy};
use crate::actions::{
    CustomTimeline, CustomTimelinePayload, Delay, DelayTicks, DoNTimes, DoNoMoreThanXTime, DoOnce,
    Ticker, TimeLock, Timeline, TimelineParams, TimelinePayload, WaitAndExecute,
    WaitAndExecutePayload, WhileTrueExecute, WhileTrueExecutePayload,
};
use crate::config::FlowConfig;
use crate::coroutine::{Coroutine, CoroutineContext, CoroutinePromise};
use crate::error::{FlowError, SetupError};
use crate::handle::{ActionHandle, HandleCounter};
use crate::instance::InstanceId;
use crate::owner::{OwnerId, OwnerRegistry, OwnerState};
use crate::queue::ActionQueue;
use crate::settings::ActionSettings;
use crate::slot::{ActionSlot, TickClock};
use codeflow_curves::{CurveEvaluator, Lerp};
use std::cell::Cell;
use std::future::Future;
use std::rc::{Rc, Weak};
use tracing::{debug, error, trace_span, warn};

struct FlowInner {
    live: ActionQueue,
    pending: ActionQueue,
    handles: HandleCounter,
    owners: Rc<dyn OwnerRegistry>,
    config: Cell<FlowConfig>,
    paused: Cell<bool>,
    ticking: Cell<bool>,
    shut_down: Cell<bool>,
}

impl FlowInner {
    fn owners(&self) -> &dyn OwnerRegistry {
        &*self.owners
    }

    /// Live first, then pending. Invalid slots are skipped.
    fn find_slot(&self, pred: impl Fn(&ActionSlot) -> bool) -> Option<Rc<ActionSlot>> {
        let owners = self.owners();
        self.live
            .find(|slot| slot.is_valid(owners) && pred(slot))
            .or_else(|| self.pending.find(|slot| slot.is_valid(owners) && pred(slot)))
    }

    fn find_handle(&self, handle: ActionHandle) -> Option<Rc<ActionSlot>> {
        if !handle.is_valid() {
            return None;
        }
        self.find_slot(|slot| slot.handle == handle)
    }

    fn finish_matching(&self, pred: impl Fn(&ActionSlot) -> bool, complete: bool) -> usize {
        let owners = self.owners();
        let targets = self
            .live
            .snapshot()
            .into_iter()
            .chain(self.pending.snapshot())
            .filter(|slot| slot.is_valid(owners) && pred(slot));

        let mut stopped = 0;
        for slot in targets {
            slot.finish(complete, owners);
            stopped += 1;
        }
        stopped
    }

    fn teardown(&self) {
        let owners = self.owners();
        let mut slots = self.live.take_all();
        slots.extend(self.pending.take_all());
        for slot in &slots {
            slot.finish(false, owners);
        }
        debug!(dropped = slots.len(), "scheduler torn down");
    }
}

impl Drop for FlowInner {
    fn drop(&mut self) {
        if !self.shut_down.replace(true) {
            self.teardown();
        }
    }
}

fn valid_dilation(dilation: f32) -> bool {
    dilation.is_finite() && dilation >= 0.0
}

struct TickGuard<'a>(&'a Cell<bool>);

impl<'a> TickGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for TickGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Central registry that owns every action and advances them from one tick
/// source.
///
/// `FlowScheduler` is a cheap, reference-counted handle: clones share the same
/// registry and all operations take `&self`, so action callbacks may add,
/// stop, pause or query actions while a tick is running. Actions added during
/// a tick are first ticked on the next one; actions stopped during a tick are
/// skipped from then on and released on the next tick.
///
/// Callbacks that need the scheduler should capture a [`WeakFlowScheduler`];
/// a strong clone stored inside an action keeps the registry alive until
/// [`shutdown`](Self::shutdown).
#[derive(Clone)]
pub struct FlowScheduler {
    inner: Rc<FlowInner>,
}

/// Non-owning reference to a [`FlowScheduler`].
#[derive(Clone, Default)]
pub struct WeakFlowScheduler {
    inner: Weak<FlowInner>,
}

impl WeakFlowScheduler {
    pub fn upgrade(&self) -> Option<FlowScheduler> {
        self.inner.upgrade().map(|inner| FlowScheduler { inner })
    }
}

impl FlowScheduler {
    pub fn new(owners: Rc<dyn OwnerRegistry>) -> Self {
        Self::with_config(owners, FlowConfig::default())
    }

    pub fn with_config(owners: Rc<dyn OwnerRegistry>, mut config: FlowConfig) -> Self {
        if !valid_dilation(config.time_dilation) {
            warn!(dilation = config.time_dilation, "invalid time dilation, using 1.0");
            config.time_dilation = 1.0;
        }
        debug!(world = ?config.world, "scheduler created");
        Self {
            inner: Rc::new(FlowInner {
                live: ActionQueue::new(),
                pending: ActionQueue::new(),
                handles: HandleCounter::default(),
                owners,
                config: Cell::new(config),
                paused: Cell::new(false),
                ticking: Cell::new(false),
                shut_down: Cell::new(false),
            }),
        }
    }

    pub fn downgrade(&self) -> WeakFlowScheduler {
        WeakFlowScheduler {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn config(&self) -> FlowConfig {
        self.inner.config.get()
    }

    // -- tick ------------------------------------------------------------

    /// Advances every live action by `dt` undilated seconds.
    ///
    /// Order: prune invalid live actions, prune invalid pending actions, move
    /// pending into live, then dispatch each live action in insertion order.
    /// Does nothing while the scheduler is globally paused or its world cannot
    /// tick.
    pub fn tick(&self, dt: f32) -> Result<(), FlowError> {
        let inner = &*self.inner;
        if inner.shut_down.get() {
            error!("tick after shutdown");
            return Err(FlowError::ShutDown);
        }
        if inner.ticking.get() {
            error!("reentrant tick rejected");
            return Err(FlowError::ReentrantTick);
        }
        if !dt.is_finite() || dt < 0.0 {
            error!(dt, "invalid delta time");
            return Err(FlowError::InvalidDelta(dt));
        }

        let config = inner.config.get();
        if inner.paused.get() || !config.world.can_tick() {
            return Ok(());
        }

        let _guard = TickGuard::enter(&inner.ticking);
        let span = trace_span!(
            "flow_tick",
            dt,
            live = inner.live.len(),
            pending = inner.pending.len()
        );
        let _enter = span.enter();

        let owners = inner.owners();
        let dead_live = inner.live.prune(owners);
        let dead_pending = inner.pending.prune(owners);

        let fresh = inner.pending.take_all();
        for slot in &fresh {
            slot.activate();
        }
        inner.live.append(fresh);

        drop(dead_live);
        drop(dead_pending);

        let clock = TickClock {
            dt,
            world_paused: config.world_paused,
            time_dilation: config.time_dilation,
        };
        for slot in inner.live.snapshot() {
            if slot.is_valid(owners) {
                slot.dispatch(clock, owners);
            }
        }
        Ok(())
    }

    // -- adding ----------------------------------------------------------

    /// Builds an action of type `T` and queues it for the next tick.
    ///
    /// With an instance id that is already taken, reuse-policy actions of the
    /// same class receive a retrigger and their handle is returned; otherwise
    /// the running action is finished without completion and replaced. A
    /// payload that fails setup leaves the running action untouched.
    pub fn try_add<T: ActionSetup>(
        &self,
        owner: OwnerId,
        payload: T::Payload,
        settings: ActionSettings,
        instance: Option<InstanceId>,
    ) -> Result<ActionHandle, SetupError> {
        let inner = &*self.inner;
        if inner.shut_down.get() {
            return Err(SetupError::ShutDown);
        }
        let world = inner.config.get().world;
        if !world.can_tick() {
            return Err(SetupError::WorldCannotTick(world));
        }
        settings.validate()?;
        let owner_state = inner.owners.owner_state(owner);
        if owner_state != OwnerState::Alive {
            return Err(SetupError::OwnerNotAlive(owner_state));
        }

        let action = T::setup(payload, &settings, instance)?;
        let class = ActionClass::of::<T>();
        if let Some(id) = instance {
            if let Some(existing) = inner.find_slot(|slot| slot.has_instance(id)) {
                if T::INSTANCE_POLICY == InstancePolicy::Reuse && existing.class == class {
                    debug!(handle = %existing.handle, %id, "instance reused");
                    existing.retrigger(inner.owners());
                    return Ok(existing.handle);
                }
                debug!(handle = %existing.handle, %id, "instance replaced");
                existing.finish(false, inner.owners());
            }
        }

        let handle = inner.handles.next();
        inner.pending.push(Rc::new(ActionSlot::new(
            handle,
            owner,
            instance,
            class,
            settings,
            Box::new(action),
        )));
        debug!(%handle, class = class.name(), "action added");
        Ok(handle)
    }

    fn add_or_invalid<T: ActionSetup>(
        &self,
        owner: OwnerId,
        payload: T::Payload,
        settings: ActionSettings,
        instance: Option<InstanceId>,
    ) -> ActionHandle {
        match self.try_add::<T>(owner, payload, settings, instance) {
            Ok(handle) => handle,
            Err(err) => {
                warn!(class = std::any::type_name::<T>(), %err, "action rejected");
                ActionHandle::INVALID
            }
        }
    }

    /// `on_complete(stopped)` fires once `seconds` of effective time passed.
    pub fn add_delay(
        &self,
        owner: OwnerId,
        seconds: f32,
        on_complete: impl FnOnce(bool) + 'static,
        settings: ActionSettings,
    ) -> ActionHandle {
        self.add_or_invalid::<Delay>(owner, (seconds, Box::new(on_complete)), settings, None)
    }

    pub fn add_delay_ticks(
        &self,
        owner: OwnerId,
        ticks: u32,
        on_complete: impl FnOnce(bool) + 'static,
        settings: ActionSettings,
    ) -> ActionHandle {
        self.add_or_invalid::<DelayTicks>(owner, (ticks, Box::new(on_complete)), settings, None)
    }

    /// A negative `duration` ticks until stopped.
    pub fn add_ticker(
        &self,
        owner: OwnerId,
        duration: f32,
        on_tick: impl FnMut(f32) + 'static,
        on_complete: impl FnOnce(bool) + 'static,
        settings: ActionSettings,
    ) -> ActionHandle {
        self.add_or_invalid::<Ticker>(
            owner,
            (duration, Box::new(on_tick), Box::new(on_complete)),
            settings,
            None,
        )
    }

    /// `on_execute(timed_out, stopped)` fires once `predicate` holds or
    /// `timeout` (when positive) runs out. `on_wait(dt)` runs every tick
    /// before the predicate is checked.
    pub fn add_wait_and_execute(
        &self,
        owner: OwnerId,
        timeout: f32,
        predicate: impl FnMut() -> bool + 'static,
        on_execute: impl FnOnce(bool, bool) + 'static,
        on_wait: impl FnMut(f32) + 'static,
        settings: ActionSettings,
    ) -> ActionHandle {
        let payload = WaitAndExecutePayload {
            timeout,
            predicate: Box::new(predicate),
            on_execute: Box::new(on_execute),
            on_wait: Box::new(on_wait),
        };
        self.add_or_invalid::<WaitAndExecute>(owner, payload, settings, None)
    }

    /// `on_execute(dt)` runs every tick while `predicate` holds, then
    /// `on_complete(timed_out, stopped)` fires.
    pub fn add_while_true_execute(
        &self,
        owner: OwnerId,
        timeout: f32,
        predicate: impl FnMut() -> bool + 'static,
        on_execute: impl FnMut(f32) + 'static,
        on_complete: impl FnOnce(bool, bool) + 'static,
        settings: ActionSettings,
    ) -> ActionHandle {
        let payload = WhileTrueExecutePayload {
            timeout,
            predicate: Box::new(predicate),
            on_execute: Box::new(on_execute),
            on_complete: Box::new(on_complete),
        };
        self.add_or_invalid::<WhileTrueExecute>(owner, payload, settings, None)
    }

    pub fn add_do_once(
        &self,
        owner: OwnerId,
        f: impl FnOnce() + 'static,
        instance: Option<InstanceId>,
        settings: ActionSettings,
    ) -> ActionHandle {
        self.add_or_invalid::<DoOnce>(owner, Box::new(f), settings, instance)
    }

    pub fn add_do_n_times(
        &self,
        owner: OwnerId,
        times: u32,
        f: impl FnMut(u32) + 'static,
        instance: InstanceId,
        settings: ActionSettings,
    ) -> ActionHandle {
        self.add_or_invalid::<DoNTimes>(owner, (times, Box::new(f)), settings, Some(instance))
    }

    pub fn add_time_lock(
        &self,
        owner: OwnerId,
        lock_time: f32,
        f: impl FnOnce() + 'static,
        instance: InstanceId,
        settings: ActionSettings,
    ) -> ActionHandle {
        self.add_or_invalid::<TimeLock>(owner, (lock_time, Box::new(f)), settings, Some(instance))
    }

    pub fn add_do_no_more_than_x_time(
        &self,
        owner: OwnerId,
        time: f32,
        max_enqueued: u32,
        f: impl FnMut() + 'static,
        instance: InstanceId,
        settings: ActionSettings,
    ) -> ActionHandle {
        self.add_or_invalid::<DoNoMoreThanXTime>(
            owner,
            (time, max_enqueued, Box::new(f)),
            settings,
            Some(instance),
        )
    }

    /// Works for `f32`, [`Vec3`](codeflow_curves::Vec3) and
    /// [`LinearColor`](codeflow_curves::LinearColor) alike.
    pub fn add_timeline<V: Lerp>(
        &self,
        owner: OwnerId,
        params: TimelineParams<V>,
        on_tick: impl FnMut(V, f32) + 'static,
        on_complete: impl FnOnce(V, f32, bool) + 'static,
        settings: ActionSettings,
    ) -> ActionHandle {
        let payload = TimelinePayload {
            params,
            on_tick: Box::new(on_tick),
            on_complete: Box::new(on_complete),
        };
        self.add_or_invalid::<Timeline<V>>(owner, payload, settings, None)
    }

    pub fn add_custom_timeline<C: CurveEvaluator + 'static>(
        &self,
        owner: OwnerId,
        curve: impl Into<Option<Rc<C>>>,
        play_rate: f32,
        on_tick: impl FnMut(C::Value, f32) + 'static,
        on_complete: impl FnOnce(C::Value, f32, bool) + 'static,
        settings: ActionSettings,
    ) -> ActionHandle {
        let payload = CustomTimelinePayload {
            curve: curve.into(),
            play_rate,
            on_tick: Box::new(on_tick),
            on_complete: Box::new(on_complete),
        };
        self.add_or_invalid::<CustomTimeline<C>>(owner, payload, settings, None)
    }

    /// Runs the future returned by `factory` as an action. The future is
    /// first polled on the action's first tick and afterwards whenever one of
    /// its awaiters completes.
    pub fn add_coroutine<F, Fut>(
        &self,
        owner: OwnerId,
        factory: F,
        settings: ActionSettings,
    ) -> ActionHandle
    where
        F: FnOnce(CoroutineContext) -> Fut,
        Fut: Future<Output = ()> + 'static,
    {
        let promise = CoroutinePromise::new();
        let ctx = CoroutineContext::new(self.downgrade(), owner, Rc::downgrade(&promise), settings);
        promise.install(Box::pin(factory(ctx)));
        self.add_or_invalid::<Coroutine>(owner, promise, settings, None)
    }

    // -- control ---------------------------------------------------------

    pub fn pause(&self, handle: ActionHandle) {
        if let Some(slot) = self.inner.find_handle(handle) {
            slot.set_paused(true);
            debug!(%handle, "action paused");
        }
    }

    pub fn resume(&self, handle: ActionHandle) {
        if let Some(slot) = self.inner.find_handle(handle) {
            slot.set_paused(false);
            debug!(%handle, "action resumed");
        }
    }

    /// `None` when the handle does not refer to a live or pending action.
    pub fn is_paused(&self, handle: ActionHandle) -> Option<bool> {
        self.inner.find_handle(handle).map(|slot| slot.is_paused())
    }

    /// Finishes the action. With `complete` set, its completion fires right
    /// away with `stopped = true` (or as soon as its current dispatch returns
    /// when called from one of its own callbacks).
    pub fn stop(&self, handle: ActionHandle, complete: bool) {
        if let Some(slot) = self.inner.find_handle(handle) {
            debug!(%handle, complete, "stopping action");
            slot.finish(complete, self.inner.owners());
        }
    }

    /// Stops every action of `owner`, or every action at all.
    pub fn stop_all(&self, owner: Option<OwnerId>, complete: bool) -> usize {
        let stopped = self
            .inner
            .finish_matching(|slot| owner.is_none_or(|o| slot.owner == o), complete);
        debug!(?owner, complete, stopped, "stopped all");
        stopped
    }

    pub fn stop_all_of_class(
        &self,
        class: ActionClass,
        owner: Option<OwnerId>,
        complete: bool,
    ) -> usize {
        let stopped = self.inner.finish_matching(
            |slot| slot.class == class && owner.is_none_or(|o| slot.owner == o),
            complete,
        );
        debug!(class = class.name(), ?owner, complete, stopped, "stopped class");
        stopped
    }

    pub fn stop_all_of<T: Action>(&self, owner: Option<OwnerId>, complete: bool) -> usize {
        self.stop_all_of_class(ActionClass::of::<T>(), owner, complete)
    }

    pub fn stop_instance(&self, instance: InstanceId, complete: bool) -> usize {
        let stopped = self
            .inner
            .finish_matching(|slot| slot.has_instance(instance), complete);
        debug!(%instance, complete, stopped, "stopped instance");
        stopped
    }

    pub fn pause_global(&self) {
        self.inner.paused.set(true);
        debug!("global pause");
    }

    pub fn resume_global(&self) {
        self.inner.paused.set(false);
        debug!("global resume");
    }

    pub fn is_globally_paused(&self) -> bool {
        self.inner.paused.get()
    }

    /// Host world pause. Unlike the global pause, actions with
    /// `ignore_pause` keep running.
    pub fn set_world_paused(&self, paused: bool) {
        let mut config = self.inner.config.get();
        config.world_paused = paused;
        self.inner.config.set(config);
    }

    pub fn set_time_dilation(&self, dilation: f32) {
        if !valid_dilation(dilation) {
            warn!(dilation, "ignoring invalid time dilation");
            return;
        }
        let mut config = self.inner.config.get();
        config.time_dilation = dilation;
        self.inner.config.set(config);
    }

    /// Stops every action without completion and rejects further adds and
    /// ticks.
    pub fn shutdown(&self) {
        if self.inner.shut_down.replace(true) {
            return;
        }
        self.inner.teardown();
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.shut_down.get()
    }

    // -- queries ---------------------------------------------------------

    pub fn find(&self, handle: ActionHandle) -> Option<ActionInfo> {
        self.inner.find_handle(handle).map(|slot| slot.info())
    }

    pub fn find_instance(&self, instance: InstanceId) -> Option<ActionInfo> {
        self.inner
            .find_slot(|slot| slot.has_instance(instance))
            .map(|slot| slot.info())
    }

    pub fn has_action(&self, handle: ActionHandle) -> bool {
        self.inner.find_handle(handle).is_some()
    }

    /// Valid actions in the live list.
    pub fn action_count(&self) -> usize {
        let owners = self.inner.owners();
        self.inner.live.count(|slot| slot.is_valid(owners))
    }

    /// Valid actions waiting for the next tick.
    pub fn pending_count(&self) -> usize {
        let owners = self.inner.owners();
        self.inner.pending.count(|slot| slot.is_valid(owners))
    }

    pub fn instance_count(&self) -> usize {
        let owners = self.inner.owners();
        let counted = |slot: &ActionSlot| slot.instance.is_some() && slot.is_valid(owners);
        self.inner.live.count(counted) + self.inner.pending.count(counted)
    }

    pub fn new_instance_id(&self) -> InstanceId {
        InstanceId::unique()
    }

    /// Handles issued so far.
    pub fn issued_handles(&self) -> u64 {
        self.inner.handles.issued()
    }
}
