// Integration tests for bounded counters
// These tests exercise the public lifecycle: construction, init, increments, quit

use bounded_counter::{
    BoundedCounter, Error, IncrOutcome, MemoryStore, Options, ScriptSource, ScriptStore,
    INCR_WITH_LIMIT, INCR_WITH_LIMIT_SCRIPT,
};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

fn shared_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new(&Options::default()))
}

/// Counters sharing one store see each other's updates
#[test]
fn test_two_counters_share_store() {
    let store = shared_store();
    let a = BoundedCounter::with_store(Arc::clone(&store));
    let b = BoundedCounter::with_store(Arc::clone(&store));
    a.init().unwrap();
    b.init().unwrap();

    assert_eq!(a.incr_by_with_limit("shared", 4, 5).unwrap(), IncrOutcome::Value(4));
    assert_eq!(b.incr_by_with_limit("shared", 2, 5).unwrap(), IncrOutcome::LimitExceeded);
    assert_eq!(b.incr_with_limit("shared", 5).unwrap(), IncrOutcome::Value(5));
    assert_eq!(a.get("shared").unwrap(), 5);
}

/// quit() leaves an externally supplied store open
#[test]
fn test_quit_keeps_external_store_open() {
    let store = shared_store();
    let counter = BoundedCounter::with_store(Arc::clone(&store));
    counter.init().unwrap();
    counter.incr_with_limit("c", 10).unwrap();

    assert!(!counter.owns_store());
    counter.quit().unwrap();

    assert!(!store.is_closed());
    assert_eq!(store.get(b"c").unwrap(), Some(b"1".to_vec()));

    // Registrations are gone after quit
    assert!(matches!(counter.incr_with_limit("c", 10), Err(Error::UnknownScript(_))));
}

/// quit() closes an owned store
#[test]
fn test_quit_closes_owned_store() {
    let counter = BoundedCounter::open(Options::default()).unwrap();
    counter.init().unwrap();
    counter.quit().unwrap();

    assert!(counter.store().is_closed());
    assert!(counter.get("c").is_err());
}

/// Script loaded from a file behaves like the embedded one
#[test]
fn test_file_sourced_script() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(INCR_WITH_LIMIT_SCRIPT.as_bytes()).unwrap();

    let options = Options::default().counter_script(ScriptSource::file(file.path()));
    let counter = BoundedCounter::open(options).unwrap();
    counter.init().unwrap();

    assert_eq!(counter.incr_by_with_limit("c", 3, 3).unwrap(), IncrOutcome::Value(3));
    assert_eq!(counter.incr_with_limit("c", 3).unwrap(), IncrOutcome::LimitExceeded);
}

/// A missing script file fails init and leaves nothing registered
#[test]
fn test_init_with_missing_file() {
    let options =
        Options::default().counter_script(ScriptSource::file("/nonexistent/incr_limit.lua"));
    let counter = BoundedCounter::open(options).unwrap();

    let err = counter.init().unwrap_err();
    assert!(matches!(&err, Error::ScriptLoad { name, .. } if name == INCR_WITH_LIMIT));
    assert!(!counter.registry().contains(INCR_WITH_LIMIT));
}

/// A malformed script fails init with ScriptLoad
#[test]
fn test_init_with_malformed_script() {
    let store = shared_store();
    let counter =
        BoundedCounter::with_store_and_script(store, ScriptSource::inline("local x = ("));

    assert!(matches!(counter.init(), Err(Error::ScriptLoad { .. })));
    assert!(matches!(counter.incr_with_limit("c", 1), Err(Error::UnknownScript(_))));
}

/// Registering twice yields a handle that behaves the same
#[test]
fn test_init_twice() {
    let counter = BoundedCounter::open(Options::default()).unwrap();
    counter.init().unwrap();
    let first = counter.registry().handle_for(INCR_WITH_LIMIT).unwrap();
    counter.incr_with_limit("c", 10).unwrap();

    counter.init().unwrap();
    let second = counter.registry().handle_for(INCR_WITH_LIMIT).unwrap();

    assert_eq!(first, second);
    assert_eq!(counter.incr_with_limit("c", 10).unwrap(), IncrOutcome::Value(2));
}

/// Evicted scripts are reloaded without the caller noticing
#[test]
fn test_reload_after_eviction() {
    let options = Options::default().script_cache_capacity(1);
    let counter = BoundedCounter::open(options).unwrap();
    counter.init().unwrap();
    let handle = counter.registry().handle_for(INCR_WITH_LIMIT).unwrap();

    // Push the counter script out of the single-slot cache
    counter.store().script_load("return 'other'").unwrap();
    assert!(!counter.store().script_exists(&handle));

    assert_eq!(counter.incr_with_limit("c", 10).unwrap(), IncrOutcome::Value(1));
    assert!(counter.store().script_exists(&handle));
    assert_eq!(counter.store().script_cache_stats().misses, 1);
}

/// Zero delta reports the current value without changing it
#[test]
fn test_zero_delta() {
    let counter = BoundedCounter::open(Options::default()).unwrap();
    counter.init().unwrap();
    counter.store().set(b"c", b"7").unwrap();

    assert_eq!(counter.incr_by_with_limit("c", 0, 10).unwrap(), IncrOutcome::Value(7));
    assert_eq!(counter.incr_by_with_limit("c", 0, 5).unwrap(), IncrOutcome::LimitExceeded);
    assert_eq!(counter.get("c").unwrap(), 7);
}

/// Counters are independent per key
#[test]
fn test_independent_keys() {
    let counter = BoundedCounter::open(Options::default()).unwrap();
    counter.init().unwrap();

    for _ in 0..3 {
        counter.incr_with_limit("a", 3).unwrap();
    }
    assert!(counter.incr_with_limit("a", 3).unwrap().is_limit_exceeded());
    assert_eq!(counter.incr_with_limit("b", 3).unwrap(), IncrOutcome::Value(1));
}
