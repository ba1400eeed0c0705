//! Helpers shared by the unit tests of this crate.
#![cfg(test)]

use std::cell::RefCell;
use std::sync::Arc;
use std::sync::Once;

use log::{Level, LevelFilter, Log, Metadata, Record};

use crate::environment::StaticEnvironment;

thread_local! {
    static RECORDS: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
}

/// Logger that keeps every record on the thread that emitted it, so tests
/// running in parallel do not see each other's output.
struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        RECORDS.with(|records| {
            records
                .borrow_mut()
                .push((record.level(), record.args().to_string()))
        });
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;
static INIT: Once = Once::new();

/// Installs the capturing logger (once per process) and clears this
/// thread's captured records.
pub fn capture_logs() {
    INIT.call_once(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(LevelFilter::Trace);
        }
    });
    RECORDS.with(|records| records.borrow_mut().clear());
}

/// Messages captured on this thread at exactly `level`.
pub fn logged(level: Level) -> Vec<String> {
    RECORDS.with(|records| {
        records
            .borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message.clone())
            .collect()
    })
}

/// Shorthand for an in-memory environment shared with a plugin manager.
pub fn environment(packages: &[(&str, &str)]) -> Arc<StaticEnvironment> {
    let mut env = StaticEnvironment::new();
    for (name, version) in packages {
        env.insert(name, version);
    }
    Arc::new(env)
}
