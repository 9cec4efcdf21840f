//! Simple profiling guards using thread-local storage
//!
//! Lightweight timing of the search hot path without changing function signatures.
//! Enable with environment variable: TRON_PROFILE=1

use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::OnceLock;
use std::time::Instant;

thread_local! {
    static MOVE_GEN_TIME: RefCell<u64> = RefCell::new(0);
    static MOVE_GEN_COUNT: RefCell<usize> = RefCell::new(0);

    static EVAL_TIME: RefCell<u64> = RefCell::new(0);
    static EVAL_COUNT: RefCell<usize> = RefCell::new(0);

    static FLOOD_FILL_TIME: RefCell<u64> = RefCell::new(0);
    static FLOOD_FILL_COUNT: RefCell<usize> = RefCell::new(0);

    static APPLY_MOVE_TIME: RefCell<u64> = RefCell::new(0);
    static APPLY_MOVE_COUNT: RefCell<usize> = RefCell::new(0);

    static ALPHA_BETA_TIME: RefCell<u64> = RefCell::new(0);
    static ALPHA_BETA_COUNT: RefCell<usize> = RefCell::new(0);
    static ALPHA_BETA_CUTOFFS: RefCell<usize> = RefCell::new(0);
}

// Global aggregators
static GLOBAL_MOVE_GEN_TIME: AtomicU64 = AtomicU64::new(0);
static GLOBAL_MOVE_GEN_COUNT: AtomicUsize = AtomicUsize::new(0);
static GLOBAL_EVAL_TIME: AtomicU64 = AtomicU64::new(0);
static GLOBAL_EVAL_COUNT: AtomicUsize = AtomicUsize::new(0);
static GLOBAL_FLOOD_FILL_TIME: AtomicU64 = AtomicU64::new(0);
static GLOBAL_FLOOD_FILL_COUNT: AtomicUsize = AtomicUsize::new(0);
static GLOBAL_APPLY_MOVE_TIME: AtomicU64 = AtomicU64::new(0);
static GLOBAL_APPLY_MOVE_COUNT: AtomicUsize = AtomicUsize::new(0);
static GLOBAL_ALPHA_BETA_TIME: AtomicU64 = AtomicU64::new(0);
static GLOBAL_ALPHA_BETA_COUNT: AtomicUsize = AtomicUsize::new(0);
static GLOBAL_ALPHA_BETA_CUTOFFS: AtomicUsize = AtomicUsize::new(0);

static PROFILING_ENABLED: OnceLock<bool> = OnceLock::new();

#[inline]
pub fn is_profiling_enabled() -> bool {
    *PROFILING_ENABLED.get_or_init(|| std::env::var("TRON_PROFILE").is_ok())
}

pub struct ProfileGuard {
    start: Instant,
    category: &'static str,
}

impl ProfileGuard {
    pub fn new(category: &'static str) -> Option<Self> {
        if is_profiling_enabled() {
            Some(ProfileGuard {
                start: Instant::now(),
                category,
            })
        } else {
            None
        }
    }
}

impl Drop for ProfileGuard {
    fn drop(&mut self) {
        record(self.category, self.start.elapsed().as_nanos() as u64);
    }
}

fn record(category: &str, elapsed_ns: u64) {
    let (time, count) = match category {
        "move_gen" => (&MOVE_GEN_TIME, &MOVE_GEN_COUNT),
        "eval" => (&EVAL_TIME, &EVAL_COUNT),
        "flood_fill" => (&FLOOD_FILL_TIME, &FLOOD_FILL_COUNT),
        "apply_move" => (&APPLY_MOVE_TIME, &APPLY_MOVE_COUNT),
        "alpha_beta" => (&ALPHA_BETA_TIME, &ALPHA_BETA_COUNT),
        _ => return,
    };
    time.with(|t| *t.borrow_mut() += elapsed_ns);
    count.with(|c| *c.borrow_mut() += 1);
}

fn global_counters(category: &str) -> Option<(&'static AtomicU64, &'static AtomicUsize)> {
    match category {
        "move_gen" => Some((&GLOBAL_MOVE_GEN_TIME, &GLOBAL_MOVE_GEN_COUNT)),
        "eval" => Some((&GLOBAL_EVAL_TIME, &GLOBAL_EVAL_COUNT)),
        "flood_fill" => Some((&GLOBAL_FLOOD_FILL_TIME, &GLOBAL_FLOOD_FILL_COUNT)),
        "apply_move" => Some((&GLOBAL_APPLY_MOVE_TIME, &GLOBAL_APPLY_MOVE_COUNT)),
        "alpha_beta" => Some((&GLOBAL_ALPHA_BETA_TIME, &GLOBAL_ALPHA_BETA_COUNT)),
        _ => None,
    }
}

#[inline]
pub fn record_alpha_beta_cutoff() {
    if is_profiling_enabled() {
        ALPHA_BETA_CUTOFFS.with(|c| *c.borrow_mut() += 1);
    }
}

/// Moves this thread's counters into the global aggregators.
/// Call from the thread that ran the search before printing a report.
pub fn merge_thread_local() {
    if is_profiling_enabled() {
        drain_thread_local();
    }
}

fn drain_thread_local() {
    let timers: [(&'static std::thread::LocalKey<RefCell<u64>>, &AtomicU64); 5] = [
        (&MOVE_GEN_TIME, &GLOBAL_MOVE_GEN_TIME),
        (&EVAL_TIME, &GLOBAL_EVAL_TIME),
        (&FLOOD_FILL_TIME, &GLOBAL_FLOOD_FILL_TIME),
        (&APPLY_MOVE_TIME, &GLOBAL_APPLY_MOVE_TIME),
        (&ALPHA_BETA_TIME, &GLOBAL_ALPHA_BETA_TIME),
    ];
    for (local, global) in timers.iter() {
        local.with(|t| {
            global.fetch_add(*t.borrow(), Ordering::Relaxed);
            *t.borrow_mut() = 0;
        });
    }

    let counters: [(&'static std::thread::LocalKey<RefCell<usize>>, &AtomicUsize); 6] = [
        (&MOVE_GEN_COUNT, &GLOBAL_MOVE_GEN_COUNT),
        (&EVAL_COUNT, &GLOBAL_EVAL_COUNT),
        (&FLOOD_FILL_COUNT, &GLOBAL_FLOOD_FILL_COUNT),
        (&APPLY_MOVE_COUNT, &GLOBAL_APPLY_MOVE_COUNT),
        (&ALPHA_BETA_COUNT, &GLOBAL_ALPHA_BETA_COUNT),
        (&ALPHA_BETA_CUTOFFS, &GLOBAL_ALPHA_BETA_CUTOFFS),
    ];
    for (local, global) in counters.iter() {
        local.with(|c| {
            global.fetch_add(*c.borrow(), Ordering::Relaxed);
            *c.borrow_mut() = 0;
        });
    }
}

fn line(label: &str, time: &AtomicU64, count: &AtomicUsize, total_ns: u64) {
    let time_ns = time.load(Ordering::Relaxed);
    let calls = count.load(Ordering::Relaxed);
    let ms = time_ns as f64 / 1_000_000.0;
    let pct = if total_ns > 0 { 100.0 * time_ns as f64 / total_ns as f64 } else { 0.0 };
    let avg_us = if calls > 0 { time_ns as f64 / (calls * 1000) as f64 } else { 0.0 };

    eprintln!("  {:<16} {:.2}ms ({:.1}%) - {} calls, {:.2}µs avg", label, ms, pct, calls, avg_us);
}

pub fn print_report(total_time_ms: u64) {
    if !is_profiling_enabled() {
        return;
    }

    let total_ns = total_time_ms * 1_000_000;

    eprintln!("\n═══════════════════════════════════════════════════════════");
    eprintln!("                 PERFORMANCE PROFILE");
    eprintln!("═══════════════════════════════════════════════════════════");
    eprintln!("Total Time: {}ms\n", total_time_ms);

    let rows = [
        ("Move Generation:", "move_gen"),
        ("Apply Move:", "apply_move"),
        ("Evaluation:", "eval"),
        ("Flood Fill:", "flood_fill"),
        ("Alpha-Beta:", "alpha_beta"),
    ];
    for (label, category) in rows.iter() {
        if let Some((time, count)) = global_counters(category) {
            line(label, time, count, total_ns);
        }
    }

    let ab_count = GLOBAL_ALPHA_BETA_COUNT.load(Ordering::Relaxed);
    let ab_cutoffs = GLOBAL_ALPHA_BETA_CUTOFFS.load(Ordering::Relaxed);
    let cutoff_rate = if ab_count > 0 { 100.0 * ab_cutoffs as f64 / ab_count as f64 } else { 0.0 };
    eprintln!("  Cutoffs:         {} ({:.1}% of nodes)", ab_cutoffs, cutoff_rate);

    eprintln!("═══════════════════════════════════════════════════════════\n");
}

/// Prints the report for the turn that just finished and clears the
/// aggregators, so the next report covers only the next turn
pub fn end_turn(total_time_ms: u64) {
    print_report(total_time_ms);
    reset();
}

pub fn reset() {
    for global in [
        &GLOBAL_MOVE_GEN_TIME,
        &GLOBAL_EVAL_TIME,
        &GLOBAL_FLOOD_FILL_TIME,
        &GLOBAL_APPLY_MOVE_TIME,
        &GLOBAL_ALPHA_BETA_TIME,
    ] {
        global.store(0, Ordering::Relaxed);
    }
    for global in [
        &GLOBAL_MOVE_GEN_COUNT,
        &GLOBAL_EVAL_COUNT,
        &GLOBAL_FLOOD_FILL_COUNT,
        &GLOBAL_APPLY_MOVE_COUNT,
        &GLOBAL_ALPHA_BETA_COUNT,
        &GLOBAL_ALPHA_BETA_CUTOFFS,
    ] {
        global.store(0, Ordering::Relaxed);
    }
}

#[macro_export]
macro_rules! profile {
    ($category:expr, $code:block) => {{
        let _guard = $crate::simple_profiler::ProfileGuard::new($category);
        $code
    }};
}
