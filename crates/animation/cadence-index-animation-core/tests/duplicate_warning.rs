//! A duplicate subscription is reported at warn level.
//!
//! Kept in its own test binary since it installs the process-wide logger.

use std::sync::Arc;

use cadence_index_animation_core::{IndexAnimation, IndexAnimationCfg, IndexListener, Subscription};
use log::{Level, LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;

struct CapturingLogger {
    records: Mutex<Vec<(Level, String)>>,
}

impl Log for CapturingLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        self.records
            .lock()
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

static LOGGER: CapturingLogger = CapturingLogger {
    records: parking_lot::const_mutex(Vec::new()),
};

#[test]
fn duplicate_subscription_logs_a_warning() {
    log::set_logger(&LOGGER).unwrap();
    log::set_max_level(LevelFilter::Trace);

    let mut anim = IndexAnimation::new(IndexAnimationCfg::uniform(2, 1.0));
    let listener: Arc<IndexListener> = Arc::new(|_: &IndexAnimation, _: usize| {});
    let first = anim.subscribe(Arc::clone(&listener));
    assert!(first.is_added());
    LOGGER.records.lock().clear();

    let second = anim.subscribe(Arc::clone(&listener));
    assert_eq!(second, Subscription::Duplicate(first.id()));

    let records = LOGGER.records.lock();
    let duplicate = records
        .iter()
        .find(|(_, msg)| msg.contains("duplicate subscription"))
        .expect("duplicate subscription was not logged");
    assert_eq!(duplicate.0, Level::Warn);
}
