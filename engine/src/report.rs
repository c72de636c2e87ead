//! Utilities for structured reporting of experimental results.
//!
//! Reporting follows the call graph: contexts are opened with RAII guards and every
//! value reported while a guard is alive ends up nested below the guard's key.
//! Once the `ReportingGuard` returned by `enable_reporting` is dropped, the whole
//! tree is printed to stdout as a single JSON line.
//! When reporting was never enabled, all reporting calls are no-ops.
//! The reporter is thread local, values reported on other threads are lost.

use crate::built_info;
use serde_json::{Map, Value};
use std::{
    cell::RefCell,
    sync::atomic::{compiler_fence, Ordering::SeqCst},
    time::{Duration, Instant},
};

pub use serde_json::json;

#[derive(Debug)]
enum Frame {
    Object(Map<String, Value>),
    Collection(Vec<Value>),
    Discard,
}

#[derive(Debug)]
struct Reporter {
    // bottom frame is the root object, the key of each frame is where it gets attached in its parent
    stack: Vec<(Option<String>, Frame)>,
}

impl Default for Reporter {
    fn default() -> Self {
        Reporter {
            stack: vec![(None, Frame::Object(Map::new()))],
        }
    }
}

impl Reporter {
    fn discarding(&self) -> bool {
        matches!(self.stack.last(), Some((_, Frame::Discard)))
    }

    fn open(&mut self, key: Option<String>, frame: Frame) {
        if self.discarding() {
            self.stack.push((None, Frame::Discard));
            return;
        }
        match (&self.stack.last().expect("reporter without root").1, &key) {
            (Frame::Object(_), Some(_)) | (Frame::Collection(_), None) => (),
            (Frame::Object(_), None) => {
                if !matches!(frame, Frame::Discard) {
                    panic!("Cannot open an unnamed context in an object");
                }
            }
            (Frame::Collection(_), Some(_)) => panic!("Cannot open a named context in a collection"),
            (Frame::Discard, _) => unreachable!(),
        }
        self.stack.push((key, frame));
    }

    fn close(&mut self) {
        assert!(self.stack.len() > 1, "tried to close the root context");
        let (key, frame) = self.stack.pop().unwrap();
        let value = match frame {
            Frame::Object(object) => Value::Object(object),
            Frame::Collection(collection) => Value::Array(collection),
            Frame::Discard => return,
        };
        match (&mut self.stack.last_mut().unwrap().1, key) {
            (Frame::Object(parent), Some(key)) => {
                let prev = parent.insert(key, value);
                assert_eq!(prev, None);
            }
            (Frame::Collection(parent), None) => parent.push(value),
            (Frame::Discard, _) => (),
            _ => panic!("Inconsistent context stack"),
        }
    }

    fn report(&mut self, key: String, val: Value) {
        match &mut self.stack.last_mut().expect("reporter without root").1 {
            Frame::Object(object) => {
                let prev = object.insert(key, val);
                if !cfg!(feature = "report-allow-override") {
                    assert!(prev.is_none());
                }
            }
            Frame::Collection(_) => panic!("Cannot report value on collection"),
            Frame::Discard => (),
        }
    }

    fn finish(&mut self) -> Value {
        assert_eq!(self.stack.len(), 1, "unclosed reporting contexts");
        match self.stack.pop() {
            Some((_, Frame::Object(root))) => Value::Object(root),
            _ => panic!("broken root object for reporting"),
        }
    }
}

thread_local! {
    static REPORTER: RefCell<Option<Reporter>> = const { RefCell::new(None) };
}

fn with_reporter(f: impl FnOnce(&mut Reporter)) {
    REPORTER.with(|reporter| {
        if let Some(r) = reporter.borrow_mut().as_mut() {
            f(r)
        }
    });
}

#[must_use]
pub struct ContextGuard(());

impl Drop for ContextGuard {
    fn drop(&mut self) {
        with_reporter(Reporter::close);
    }
}

/// Open a nested object under `key`, closed when the guard is dropped.
pub fn push_context(key: String) -> ContextGuard {
    with_reporter(|r| r.open(Some(key), Frame::Object(Map::new())));
    ContextGuard(())
}

#[must_use]
pub struct CollectionContextGuard(());

impl Drop for CollectionContextGuard {
    fn drop(&mut self) {
        with_reporter(Reporter::close);
    }
}

/// Open a JSON array under `key`. Elements are added through `push_collection_item`.
pub fn push_collection_context(key: String) -> CollectionContextGuard {
    with_reporter(|r| r.open(Some(key), Frame::Collection(Vec::new())));
    CollectionContextGuard(())
}

impl CollectionContextGuard {
    pub fn push_collection_item(&mut self) -> CollectionItemContextGuard {
        with_reporter(|r| r.open(None, Frame::Object(Map::new())));
        CollectionItemContextGuard(self)
    }
}

#[must_use]
pub struct CollectionItemContextGuard<'a>(&'a CollectionContextGuard);

impl<'a> Drop for CollectionItemContextGuard<'a> {
    fn drop(&mut self) {
        with_reporter(Reporter::close);
    }
}

#[must_use]
pub struct BlockedReportingContextGuard(());

impl Drop for BlockedReportingContextGuard {
    fn drop(&mut self) {
        with_reporter(Reporter::close);
    }
}

/// Throw away everything reported while the guard is alive.
/// Useful for preprocessing steps which reuse instrumented query code.
pub fn block_reporting() -> BlockedReportingContextGuard {
    with_reporter(|r| r.open(None, Frame::Discard));
    BlockedReportingContextGuard(())
}

pub fn report(key: String, val: Value) {
    if cfg!(feature = "report-to-stderr") {
        eprintln!("{}: {}", key, val);
    }
    report_silent(key, val)
}

pub fn report_silent(key: String, val: Value) {
    with_reporter(|r| r.report(key, val));
}

#[macro_export]
macro_rules! report {
    ($k:expr, $($json:tt)+) => { $crate::report::report($k.to_string(), $crate::report::json!($($json)+)) };
}

#[macro_export]
macro_rules! report_silent {
    ($k:expr, $($json:tt)+) => { $crate::report::report_silent($k.to_string(), $crate::report::json!($($json)+)) };
}

#[must_use]
pub struct ReportingGuard(());

impl Drop for ReportingGuard {
    fn drop(&mut self) {
        REPORTER.with(|reporter| {
            if let Some(mut r) = reporter.borrow_mut().take() {
                println!("{}", r.finish());
            }
        });
    }
}

/// Install a reporter for the current thread and report build and environment information.
pub fn enable_reporting(program: &str) -> ReportingGuard {
    REPORTER.with(|reporter| reporter.replace(Some(Reporter::default())));

    report!("build_target", built_info::TARGET);
    report!("build_profile", built_info::PROFILE);
    report!("feature_flags", built_info::FEATURES_STR);
    report!("build_time", built_info::BUILT_TIME_UTC);
    report!("build_with_rustc", built_info::RUSTC_VERSION);
    report!("program", program);
    report!(
        "start_time",
        time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc2822)
            .unwrap_or_default()
    );
    report!("args", std::env::args().collect::<Vec<String>>());

    ReportingGuard(())
}

/// Measure how long executing `f` takes, print it to stderr and report it as `running_time_ms`.
pub fn report_time<Out, F: FnOnce() -> Out>(name: &str, f: F) -> Out {
    report_time_with_key(name, "running_time_ms", f)
}

/// Measure how long executing `f` takes, print it to stderr and report it under `key`.
pub fn report_time_with_key<Out, F: FnOnce() -> Out>(name: &str, key: &'static str, f: F) -> Out {
    eprintln!("starting {}", name);
    let (res, t_passed) = measure(f);
    let t_passed = t_passed.as_secs_f64() * 1000.0;
    eprintln!("{} done - took: {}ms", name, t_passed);
    report!(key, t_passed);
    res
}

/// Like `report_time_with_key` but without any output on stderr.
pub fn silent_report_time_with_key<Out, F: FnOnce() -> Out>(key: &'static str, f: F) -> Out {
    let (res, t_passed) = measure(f);
    report_silent!(key, t_passed.as_secs_f64() * 1000.0);
    res
}

/// Run `f` and return its result together with the time it took.
pub fn measure<Out, F: FnOnce() -> Out>(f: F) -> (Out, Duration) {
    compiler_fence(SeqCst);
    let start = Instant::now();
    let res = f();
    let t_passed = start.elapsed();
    compiler_fence(SeqCst);
    (res, t_passed)
}

/// Prints a coarse progress indicator for long running batch computations to stderr.
#[derive(Debug)]
pub struct Progress {
    name: &'static str,
    total: usize,
    done: usize,
    last_percent: usize,
}

impl Progress {
    pub fn new(name: &'static str, total: usize) -> Self {
        eprintln!("{}: 0 of {}", name, total);
        Progress {
            name,
            total,
            done: 0,
            last_percent: 0,
        }
    }

    pub fn tick(&mut self) {
        self.done += 1;
        let percent = self.done * 100 / self.total.max(1);
        if percent / 10 > self.last_percent / 10 || self.done == self.total {
            eprintln!("{}: {}% ({} of {})", self.name, percent, self.done, self.total);
        }
        self.last_percent = percent;
    }

    pub fn done(&self) -> usize {
        self.done
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collected(f: impl FnOnce()) -> Value {
        REPORTER.with(|reporter| reporter.replace(Some(Reporter::default())));
        f();
        REPORTER.with(|reporter| reporter.borrow_mut().take().unwrap().finish())
    }

    #[test]
    fn nested_contexts_end_up_below_their_key() {
        let value = collected(|| {
            report!("a", 1);
            let _ctx = push_context("phase".to_string());
            report!("b", "x");
        });
        assert_eq!(value, json!({ "a": 1, "phase": { "b": "x" } }));
    }

    #[test]
    fn collection_items_become_array_elements() {
        let value = collected(|| {
            let mut col = push_collection_context("queries".to_string());
            for i in 0..2 {
                let _item = col.push_collection_item();
                report!("i", i);
            }
        });
        assert_eq!(value, json!({ "queries": [{ "i": 0 }, { "i": 1 }] }));
    }

    #[test]
    fn blocked_reporting_drops_values() {
        let value = collected(|| {
            let _blocked = block_reporting();
            report!("hidden", true);
            let _ctx = push_context("also_hidden".to_string());
        });
        assert_eq!(value, json!({}));
    }

    #[test]
    fn enabled_reporting_records_build_info() {
        let guard = enable_reporting("report_test");
        REPORTER.with(|reporter| {
            let reporter = reporter.borrow();
            match reporter.as_ref().map(|r| &r.stack[0].1) {
                Some(Frame::Object(root)) => {
                    assert_eq!(root.get("program"), Some(&json!("report_test")));
                    assert!(root.contains_key("build_target"));
                }
                _ => panic!("no root object"),
            }
        });
        drop(guard);
        REPORTER.with(|reporter| assert!(reporter.borrow().is_none()));
    }

    #[test]
    fn reporting_without_reporter_is_noop() {
        report!("nothing", 42);
        let _ctx = push_context("nowhere".to_string());
    }
}
