use criterion::{black_box, criterion_group, criterion_main, Criterion};
use phrase_master::core::{plan_hint, GameState, LoadedPuzzle, SegmentShuffler};
use phrase_master::types::PuzzleData;

fn segments(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("segment {i} ")).collect()
}

fn playing(n: usize) -> GameState {
    let mut state = GameState::new(12345);
    if let Ok(ticket) = state.begin_upload() {
        let segments = segments(n);
        let puzzle = PuzzleData {
            concept: "bench".to_string(),
            definition: segments.concat(),
            segments,
        };
        let loaded = LoadedPuzzle {
            puzzle,
            source_text: None,
        };
        state.complete_load(ticket.token, Ok(loaded), 0);
    }
    state
}

fn bench_tick(c: &mut Criterion) {
    let mut state = playing(12);

    c.bench_function("auto_hint_check", |b| {
        b.iter(|| {
            state.evaluate_auto_hint(black_box(0));
        })
    });
}

fn bench_shuffle(c: &mut Criterion) {
    let mut shuffler = SegmentShuffler::new(7);
    let segs = segments(12);

    c.bench_function("shuffle_12_segments", |b| {
        b.iter(|| shuffler.shuffled(black_box(&segs)))
    });
}

fn bench_plan_hint(c: &mut Criterion) {
    let segs = segments(12);
    let pool: Vec<String> = Vec::new();
    let mut response = segs.clone();
    response.reverse();

    c.bench_function("plan_hint_reversed_12", |b| {
        b.iter(|| plan_hint(black_box(&pool), black_box(&response), black_box(&segs)))
    });
}

fn bench_solve_with_hints(c: &mut Criterion) {
    c.bench_function("solve_12_with_hints", |b| {
        b.iter(|| {
            let mut state = playing(12);
            while state.give_hint(false, 0) {}
            state.check_result(0)
        })
    });
}

fn bench_snapshot(c: &mut Criterion) {
    let state = playing(12);
    let mut snap = state.snapshot(0);

    c.bench_function("snapshot_into", |b| {
        b.iter(|| {
            state.snapshot_into(black_box(&mut snap), 0);
        })
    });
}

criterion_group!(
    benches,
    bench_tick,
    bench_shuffle,
    bench_plan_hint,
    bench_solve_with_hints,
    bench_snapshot
);
criterion_main!(benches);
