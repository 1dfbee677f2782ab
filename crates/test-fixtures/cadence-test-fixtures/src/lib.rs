use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    animations: HashMap<String, String>,
    #[serde(default)]
    schedulers: HashMap<String, String>,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

/// Index animation configurations (`IndexAnimationCfg` JSON).
pub mod animations {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.animations.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.animations, "animation", name)?;
        read_to_string(rel)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let rel = lookup(&MANIFEST.animations, "animation", name)?;
        super::load_json(rel)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let rel = lookup(&MANIFEST.animations, "animation", name)?;
        Ok(resolve_path(rel))
    }
}

/// Scheduler configurations (`SchedulerConfig` JSON).
pub mod schedulers {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.schedulers.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.schedulers, "scheduler", name)?;
        read_to_string(rel)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let rel = lookup(&MANIFEST.schedulers, "scheduler", name)?;
        super::load_json(rel)
    }
}

/// Updatable doubles for scheduler tests.
pub mod probes {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Weak};

    use cadence_scheduler_core::{Updatable, UpdateScheduler};
    use parking_lot::Mutex;

    /// Shared, ordered log of `(label, delta)` pairs written by probes.
    pub type UpdateLog = Arc<Mutex<Vec<(String, f32)>>>;

    pub fn update_log() -> UpdateLog {
        Arc::new(Mutex::new(Vec::new()))
    }

    /// Records every delta it receives.
    pub struct RecordingProbe {
        label: String,
        scaled: bool,
        deltas: Mutex<Vec<f32>>,
        log: Option<UpdateLog>,
    }

    impl RecordingProbe {
        pub fn new(label: &str, scaled: bool) -> Arc<Self> {
            Arc::new(Self {
                label: label.to_string(),
                scaled,
                deltas: Mutex::new(Vec::new()),
                log: None,
            })
        }

        /// Like [`RecordingProbe::new`] but also appends to a shared log, for
        /// asserting cross-entity ordering.
        pub fn logged(label: &str, scaled: bool, log: &UpdateLog) -> Arc<Self> {
            Arc::new(Self {
                label: label.to_string(),
                scaled,
                deltas: Mutex::new(Vec::new()),
                log: Some(Arc::clone(log)),
            })
        }

        pub fn count(&self) -> usize {
            self.deltas.lock().len()
        }

        pub fn deltas(&self) -> Vec<f32> {
            self.deltas.lock().clone()
        }
    }

    impl Updatable for RecordingProbe {
        fn update(&self, delta_time: f32) {
            self.deltas.lock().push(delta_time);
            if let Some(log) = &self.log {
                log.lock().push((self.label.clone(), delta_time));
            }
        }

        fn uses_scaled_time(&self) -> bool {
            self.scaled
        }
    }

    /// On its first update, registers `spawn` and unregisters `retire` with the
    /// scheduler it was given. Models construction/disposal triggered from
    /// inside another entity's update.
    pub struct MutatingProbe {
        scheduler: Weak<UpdateScheduler>,
        spawn: Mutex<Option<Arc<RecordingProbe>>>,
        retire: Mutex<Option<Arc<RecordingProbe>>>,
        hits: AtomicUsize,
    }

    impl MutatingProbe {
        pub fn new(
            scheduler: &Arc<UpdateScheduler>,
            spawn: Option<Arc<RecordingProbe>>,
            retire: Option<Arc<RecordingProbe>>,
        ) -> Arc<Self> {
            Arc::new(Self {
                scheduler: Arc::downgrade(scheduler),
                spawn: Mutex::new(spawn),
                retire: Mutex::new(retire),
                hits: AtomicUsize::new(0),
            })
        }

        pub fn count(&self) -> usize {
            self.hits.load(Ordering::SeqCst)
        }
    }

    impl Updatable for MutatingProbe {
        fn update(&self, _delta_time: f32) {
            self.hits.fetch_add(1, Ordering::SeqCst);
            let Some(scheduler) = self.scheduler.upgrade() else {
                return;
            };
            if let Some(spawn) = self.spawn.lock().take() {
                scheduler.register(&spawn);
            }
            if let Some(retire) = self.retire.lock().take() {
                scheduler.unregister(&retire);
            }
        }

        fn uses_scaled_time(&self) -> bool {
            true
        }
    }

    /// Unregisters itself from inside its own update.
    pub struct SelfRetiringProbe {
        scheduler: Weak<UpdateScheduler>,
        me: Weak<SelfRetiringProbe>,
        hits: AtomicUsize,
    }

    impl SelfRetiringProbe {
        pub fn new(scheduler: &Arc<UpdateScheduler>) -> Arc<Self> {
            Arc::new_cyclic(|me| Self {
                scheduler: Arc::downgrade(scheduler),
                me: me.clone(),
                hits: AtomicUsize::new(0),
            })
        }

        pub fn count(&self) -> usize {
            self.hits.load(Ordering::SeqCst)
        }
    }

    impl Updatable for SelfRetiringProbe {
        fn update(&self, _delta_time: f32) {
            self.hits.fetch_add(1, Ordering::SeqCst);
            if let (Some(scheduler), Some(me)) = (self.scheduler.upgrade(), self.me.upgrade()) {
                scheduler.unregister(&me);
            }
        }

        fn uses_scaled_time(&self) -> bool {
            false
        }
    }

    /// Panics on every update.
    pub struct PanickingProbe;

    impl Updatable for PanickingProbe {
        fn update(&self, _delta_time: f32) {
            panic!("probe failure");
        }

        fn uses_scaled_time(&self) -> bool {
            true
        }
    }
}
