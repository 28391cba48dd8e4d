//! Integration tests for signals driven by the in-process timer queue.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use lattice_grid_core::{IdGenerator, IntervalTimer, Signal, TimerId, TimerManager};

#[test]
fn test_timer_fires_drive_signal() {
    let ticked = Signal::<TimerId>::new();
    let count = Arc::new(AtomicUsize::new(0));

    let count_clone = count.clone();
    ticked.connect(move |_| {
        count_clone.fetch_add(1, Ordering::SeqCst);
    });

    let start = Instant::now();
    let mut timers = TimerManager::new();
    let id = timers
        .start_repeating_at(start, Duration::from_millis(100))
        .unwrap();

    for step in 1..=5 {
        for fired in timers.fire_due(start + Duration::from_millis(100 * step)) {
            ticked.emit(fired);
        }
    }
    assert_eq!(count.load(Ordering::SeqCst), 5);

    timers.stop(id).unwrap();
    for fired in timers.fire_due(start + Duration::from_secs(10)) {
        ticked.emit(fired);
    }
    assert_eq!(count.load(Ordering::SeqCst), 5);
}

#[test]
fn test_timer_manager_as_trait_object() {
    let mut timers: Box<dyn IntervalTimer> = Box::new(TimerManager::new());
    let id = timers.start_repeating(Duration::from_millis(15)).unwrap();
    assert!(timers.is_active(id));
    timers.stop(id).unwrap();
    assert!(!timers.is_active(id));
}

#[test]
fn test_id_generator_shared_between_threads() {
    let ids = Arc::new(IdGenerator::new());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let ids = ids.clone();
            std::thread::spawn(move || {
                (0..25)
                    .map(|_| ids.next_id("combo").unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut all: Vec<String> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    all.sort();
    all.dedup();
    assert_eq!(all.len(), 100);
}
