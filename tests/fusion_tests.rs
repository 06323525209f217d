//! End-to-end fusion tests: fused runs against their step-by-step equivalents,
//! short-circuiting, expansion, and failure behavior.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use pipefuse::ops::{
    drop, drop_while, filter, find, first, flat_map, flatten, map, map_indexed, reject, take,
    take_while, unique, unique_by,
};
use pipefuse::{Arg, Dispatched, Engine, EngineConfig, Error, Func, Step, Value};
use pipefuse_core::eval::{Evaluation, FnEvaluator};

fn step(d: pipefuse::Result<Dispatched>) -> Step {
    d.expect("dispatch failed")
        .into_step()
        .expect("expected a curried step")
}

fn int(v: &Value) -> i64 {
    v.as_i64().expect("integer element")
}

fn is_even() -> Arg {
    Arg::predicate(|v: &Value| Ok(int(v) % 2 == 0))
}

fn times(k: i64) -> Arg {
    Arg::mapper(move |v: &Value| Ok(Value::I64(int(v) * k)))
}

/// Predicate that counts how often it is consulted.
fn counting(counter: &Arc<AtomicUsize>, pred: fn(i64) -> bool) -> Arg {
    let counter = Arc::clone(counter);
    Arg::predicate(move |v: &Value| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(pred(int(v)))
    })
}

fn range(lo: i64, hi: i64) -> Value {
    Value::List((lo..=hi).map(Value::I64).collect())
}

fn run(initial: Value, steps: &[Step], fusion: bool) -> pipefuse::Result<Value> {
    Engine::new(EngineConfig {
        fusion_enabled: fusion,
        ..Default::default()
    })
    .run(initial, steps)
}

#[test]
fn test_keep_even_then_scale() {
    let steps = vec![step(filter(vec![is_even()])), step(map(vec![times(10)]))];
    let mut engine = Engine::default();
    let out = engine.run(range(1, 5), &steps).expect("run failed");

    assert_eq!(out, Value::from(vec![20, 40]));
    assert_eq!(engine.stats().fused_runs, 1);
    assert_eq!(engine.stats().fused_steps, 2);
    assert_eq!(engine.stats().pulled, 5);
    assert_eq!(engine.stats().short_circuits, 0);
}

#[test]
fn test_take_stops_pulling_once_satisfied() {
    let inspected = Arc::new(AtomicUsize::new(0));
    let steps = vec![
        step(filter(vec![counting(&inspected, |n| n % 2 == 0)])),
        step(take(vec![Arg::from(2)])),
    ];
    let mut engine = Engine::default();
    let out = engine.run(range(1, 10), &steps).expect("run failed");

    assert_eq!(out, Value::from(vec![2, 4]));
    assert_eq!(inspected.load(Ordering::SeqCst), 4);
    assert_eq!(engine.stats().pulled, 4);
    assert_eq!(engine.stats().short_circuits, 1);
}

#[test]
fn test_find_does_not_inspect_past_the_match() {
    let inspected = Arc::new(AtomicUsize::new(0));
    let steps = vec![step(find(vec![counting(&inspected, |n| n > 2)]))];
    let out = run(range(1, 4), &steps, true).expect("run failed");

    assert_eq!(out, Value::I64(3));
    assert_eq!(inspected.load(Ordering::SeqCst), 3);
}

#[test]
fn test_short_circuit_bounds_upstream_work() {
    let n = 1_000;
    let k = 3;
    let inspected = Arc::new(AtomicUsize::new(0));
    let steps = vec![
        step(filter(vec![counting(&inspected, |n| n % 5 == 0)])),
        step(take(vec![Arg::from(k)])),
    ];
    let out = run(range(1, n), &steps, true).expect("run failed");

    assert_eq!(out, Value::from(vec![5, 10, 15]));
    assert_eq!(inspected.load(Ordering::SeqCst), 15);
    assert!(inspected.load(Ordering::SeqCst) < n as usize);
}

#[test]
fn test_terminal_with_no_match_yields_null() {
    let steps = vec![
        step(map(vec![times(2)])),
        step(find(vec![Arg::predicate(|v: &Value| Ok(int(v) > 100))])),
    ];
    assert_eq!(run(range(1, 5), &steps, true).expect("run failed"), Value::Null);
    assert_eq!(
        run(Value::List(vec![]), &[step(first(vec![]))], true).expect("run failed"),
        Value::Null
    );
}

#[test]
fn test_terminal_step_ends_the_run() {
    // find ends its run; the following map starts a new one over a scalar
    // and falls back to its eager form, which rejects non-sequences.
    let steps = vec![
        step(find(vec![Arg::predicate(|v: &Value| Ok(int(v) > 1))])),
        step(map(vec![times(2)])),
    ];
    assert_eq!(
        run(range(1, 4), &steps, true),
        Err(Error::NotASequence { step: "map" })
    );

    // Nested sequences: first picks the inner list, map then runs fused over it.
    let nested = Value::List(vec![Value::from(vec![1, 2]), Value::from(vec![3])]);
    let steps = vec![step(first(vec![])), step(map(vec![times(10)]))];
    let mut engine = Engine::default();
    assert_eq!(
        engine.run(nested, &steps).expect("run failed"),
        Value::from(vec![10, 20])
    );
    assert_eq!(engine.stats().fused_runs, 2);
}

/// Pipelines covering filtering, one-to-one mapping, expansion, truncation,
/// de-duplication, and terminal lookups.
fn transparency_cases() -> Vec<(Value, Vec<Step>)> {
    let pairs = Arg::mapper(|v: &Value| Ok(Value::from(vec![int(v), int(v) + 1])));
    let small = Arg::predicate(|v: &Value| Ok(int(v) < 20));
    let third = Arg::predicate(|v: &Value| Ok(int(v) % 3 == 0));
    let weigh = Arg::indexed_mapper(|v: &Value, i: usize| Ok(Value::I64(int(v) * 100 + i as i64)));
    let parity = Arg::mapper(|v: &Value| Ok(Value::I64(int(v) % 2)));

    let nested = Value::List(vec![
        Value::from(vec![1, 5, 9]),
        Value::I64(12),
        Value::from(vec![30, 2]),
        Value::List(vec![]),
        Value::from(vec![18, 4, 21]),
    ]);

    vec![
        (
            range(1, 12),
            vec![
                step(filter(vec![is_even()])),
                step(map(vec![times(3)])),
                step(flat_map(vec![pairs.clone()])),
                step(take(vec![Arg::from(7)])),
                step(drop(vec![Arg::from(1)])),
                step(map_indexed(vec![weigh.clone()])),
            ],
        ),
        (
            nested.clone(),
            vec![
                step(flatten(vec![])),
                step(take_while(vec![small.clone()])),
                step(reject(vec![third.clone()])),
            ],
        ),
        (
            range(1, 20),
            vec![
                step(drop_while(vec![Arg::predicate(|v: &Value| Ok(int(v) < 4))])),
                step(flat_map(vec![pairs])),
                step(unique_by(vec![parity])),
            ],
        ),
        (
            range(1, 30),
            vec![
                step(map(vec![Arg::mapper(|v: &Value| Ok(Value::I64(int(v) % 7)))])),
                step(unique(vec![])),
                step(map_indexed(vec![weigh])),
                step(find(vec![Arg::predicate(|v: &Value| Ok(int(v) > 300))])),
            ],
        ),
        (nested, vec![step(flatten(vec![])), step(first(vec![]))]),
    ]
}

#[test]
fn test_fused_matches_step_by_step() {
    for (i, (input, steps)) in transparency_cases().into_iter().enumerate() {
        let fused = run(input.clone(), &steps, true).expect("fused run failed");
        let unfused = run(input, &steps, false).expect("unfused run failed");
        assert_eq!(fused, unfused, "case {i}");
    }
}

#[test]
fn test_fused_matches_manual_eager_application() {
    let steps = vec![
        step(filter(vec![is_even()])),
        step(flat_map(vec![Arg::mapper(|v: &Value| {
            Ok(Value::from(vec![int(v), -int(v)]))
        })])),
        step(map(vec![times(2)])),
        step(take(vec![Arg::from(5)])),
    ];

    let mut manual = range(1, 10);
    for s in &steps {
        manual = s.apply(manual).expect("eager apply failed");
    }

    assert_eq!(
        run(range(1, 10), &steps, true).expect("fused run failed"),
        manual
    );
    assert_eq!(manual, Value::from(vec![4, -4, 8, -8, 12]));
}

#[test]
fn test_expanded_values_finish_the_run_before_the_next_element() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    let steps = vec![
        step(flat_map(vec![Arg::mapper(|v: &Value| {
            Ok(Value::from(vec![int(v), int(v) * 10]))
        })])),
        step(map(vec![Arg::mapper(move |v: &Value| {
            log.lock().expect("log poisoned").push(int(v));
            Ok(v.clone())
        })])),
    ];
    let out = run(range(1, 2), &steps, true).expect("run failed");

    assert_eq!(out, Value::from(vec![1, 10, 2, 20]));
    assert_eq!(*seen.lock().expect("log poisoned"), vec![1, 10, 2, 20]);
}

#[test]
fn test_terminate_inside_expansion_stops_the_whole_traversal() {
    let pulled = Arc::new(AtomicUsize::new(0));
    let upstream = Arc::clone(&pulled);
    let steps = vec![
        step(filter(vec![Arg::predicate(move |_v: &Value| {
            upstream.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        })])),
        step(flatten(vec![])),
        step(take(vec![Arg::from(3)])),
    ];
    let input = Value::List(vec![
        Value::from(vec![1, 2]),
        Value::from(vec![3, 4]),
        Value::from(vec![5]),
    ]);

    let mut engine = Engine::default();
    let out = engine.run(input, &steps).expect("run failed");

    // 4 is never emitted and [5] is never pulled.
    assert_eq!(out, Value::from(vec![1, 2, 3]));
    assert_eq!(pulled.load(Ordering::SeqCst), 2);
    assert_eq!(engine.stats().pulled, 2);
    assert_eq!(engine.stats().short_circuits, 1);
}

#[test]
fn test_scalar_input_falls_back_to_eager_apply() {
    let inc = Func::new("inc", 2, |data: Value, args: &[Arg]| {
        let by = match &args[0] {
            Arg::Value(v) => int(v),
            _ => return Err(Error::transform("increment must be a value")),
        };
        match data {
            Value::List(items) => Ok(Value::List(
                items.iter().map(|v| Value::I64(int(v) + by)).collect(),
            )),
            other => Ok(Value::I64(int(&other) + by)),
        }
    })
    .with_evaluator(|args: &[Arg]| {
        let by = match &args[0] {
            Arg::Value(v) => int(v),
            _ => return Err(Error::transform("increment must be a value")),
        };
        let ev: Box<dyn pipefuse::Evaluator> = Box::new(FnEvaluator(
            move |v: Value, _i: usize, _s: &[Value]| Ok(Evaluation::one(Value::I64(int(&v) + by))),
        ));
        Ok(ev)
    });

    let steps = vec![
        step(inc.call(vec![Arg::from(1)])),
        step(inc.call(vec![Arg::from(10)])),
    ];
    assert!(steps.iter().all(Step::is_fusible));

    let mut engine = Engine::default();
    assert_eq!(
        engine.run(Value::I64(5), &steps).expect("run failed"),
        Value::I64(16)
    );
    assert_eq!(engine.stats().fused_runs, 0);
    assert_eq!(engine.stats().eager_steps, 2);

    assert_eq!(
        engine.run(range(1, 3), &steps).expect("run failed"),
        Value::from(vec![12, 13, 14])
    );
    assert_eq!(engine.stats().fused_runs, 1);
}

#[test]
fn test_mixed_scalar_and_sequence_stages() {
    let steps = vec![
        Step::eager("explode", |v: Value| {
            Ok(Value::List((1..=int(&v)).map(Value::I64).collect()))
        }),
        step(filter(vec![is_even()])),
        step(map(vec![times(3)])),
        Step::eager("sum", |v: Value| {
            let items = v.as_list().unwrap_or_default();
            Ok(Value::I64(items.iter().map(int).sum()))
        }),
    ];
    let mut engine = Engine::default();
    // evens of 1..=6 are 2, 4, 6 → 6, 12, 18 → 36
    assert_eq!(
        engine.run(Value::I64(6), &steps).expect("run failed"),
        Value::I64(36)
    );
    assert_eq!(engine.stats().eager_steps, 2);
    assert_eq!(engine.stats().fused_runs, 1);
    assert_eq!(
        run(Value::I64(6), &steps, false).expect("run failed"),
        Value::I64(36)
    );
}

#[test]
fn test_transform_error_aborts_without_partial_output() {
    let steps = vec![
        step(map(vec![Arg::mapper(|v: &Value| {
            if int(v) == 3 {
                Err(Error::transform("three is not allowed"))
            } else {
                Ok(v.clone())
            }
        })])),
        step(take(vec![Arg::from(10)])),
    ];
    for fusion in [true, false] {
        assert_eq!(
            run(range(1, 5), &steps, fusion),
            Err(Error::transform("three is not allowed"))
        );
    }

    // The error is never reached when take is satisfied first.
    let steps = vec![steps[0].clone(), step(take(vec![Arg::from(2)]))];
    assert_eq!(
        run(range(1, 5), &steps, true).expect("run failed"),
        Value::from(vec![1, 2])
    );
}

#[test]
fn test_failed_run_does_not_report_previous_stats() {
    let mut engine = Engine::default();
    engine
        .run(range(1, 5), &[step(filter(vec![is_even()]))])
        .expect("run failed");
    assert_eq!(engine.stats().pulled, 5);
    assert_eq!(engine.stats().emitted, 2);

    let failing = step(map(vec![Arg::mapper(|_v: &Value| {
        Err(Error::transform("boom"))
    })]));
    assert!(engine.run(range(1, 5), &[failing]).is_err());
    assert_eq!(engine.stats(), &pipefuse::RunStats::default());
}

#[test]
fn test_lazy_only_transforms() {
    // Eager form: a single-step fused run over the data.
    let out = unique(vec![Arg::from(vec![3, 1, 3, 2, 1])])
        .expect("dispatch failed")
        .into_value()
        .expect("expected a value");
    assert_eq!(out, Value::from(vec![3, 1, 2]));

    // Curried form: fusible, no eager apply.
    let dedup = step(unique(vec![]));
    assert_eq!(
        dedup.apply(Value::from(vec![1, 1])),
        Err(Error::NotASequence { step: "unique" })
    );

    // Still runs with fusion disabled, as a run of its own.
    let steps = vec![step(map(vec![times(0)])), dedup];
    let mut engine = Engine::new(EngineConfig {
        fusion_enabled: false,
        ..Default::default()
    });
    assert_eq!(
        engine.run(range(1, 4), &steps).expect("run failed"),
        Value::from(vec![0])
    );
    assert_eq!(engine.stats().eager_steps, 1);
    assert_eq!(engine.stats().fused_runs, 1);

    // A scalar reaching a lazy-only step is an error.
    assert_eq!(
        run(Value::I64(1), &steps, true),
        Err(Error::NotASequence { step: "map" })
    );
}

#[test]
fn test_each_run_gets_fresh_evaluator_state() {
    let steps = vec![step(take(vec![Arg::from(2)]))];
    let mut engine = Engine::default();
    for _ in 0..3 {
        assert_eq!(
            engine.run(range(1, 5), &steps).expect("run failed"),
            Value::from(vec![1, 2])
        );
    }
}

#[test]
fn test_run_report_carries_stats_and_manifest() {
    let steps = vec![step(filter(vec![is_even()])), step(take(vec![Arg::from(1)]))];
    let report = Engine::default()
        .run_report(range(1, 10), &steps)
        .expect("run failed");

    assert_eq!(report.output, Value::from(vec![2]));
    assert_eq!(report.stats.pulled, 2);
    assert!(report.manifest.finished_ms >= report.manifest.started_ms);
    assert_eq!(report.manifest.engine_version, pipefuse_core::VERSION);
    assert_eq!(
        report.manifest.plan_hash,
        pipefuse_core::hash::hash_steps(&steps)
    );
}
