#![allow(dead_code)]

use codeflow_scheduler::{FlowConfig, FlowScheduler, OwnerId, Owners};
use std::cell::RefCell;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

pub type Log<T> = Rc<RefCell<Vec<T>>>;

pub fn new_log<T>() -> Log<T> {
    Rc::new(RefCell::new(Vec::new()))
}

/// Scheduler plus the owner registry it consults.
pub struct Harness {
    pub owners: Rc<Owners>,
    pub flow: FlowScheduler,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(FlowConfig::default())
    }

    pub fn with_config(config: FlowConfig) -> Self {
        init_tracing();
        let owners = Rc::new(Owners::new());
        let flow = FlowScheduler::with_config(owners.clone(), config);
        Self { owners, flow }
    }

    pub fn spawn(&self) -> OwnerId {
        self.owners.spawn()
    }

    pub fn tick(&self, dt: f32) {
        self.flow.tick(dt).expect("tick failed");
    }

    pub fn ticks(&self, dt: f32, count: usize) {
        for _ in 0..count {
            self.tick(dt);
        }
    }
}

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}
