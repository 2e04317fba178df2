use criterion::{black_box, criterion_group, criterion_main, Criterion};
use jsonsift::{recover, RecoverOptions};

fn fenced_input() -> String {
    let body = r#"{"items": [{"id": 1, "name": "alpha"}, {"id": 2, "name": "beta"}], "total": 2}"#;
    format!("Here is the result you asked for:\n```json\n{body}\n```\nLet me know if you need more.")
}

fn prose_input() -> String {
    let mut text = String::from("The model rambled for a while before the payload. ");
    for _ in 0..20 {
        text.push_str("Nothing to see here, just filler prose. ");
    }
    text.push_str("Finally: {\"answer\": 42, \"confidence\": 0.93} and a trailing remark.");
    text
}

fn dirty_input() -> &'static str {
    "{'status': 'ok', count: 3, // comment\n flags: [True, False, None,], }"
}

fn bench_fast_path(c: &mut Criterion) {
    let input = fenced_input();
    let options = RecoverOptions::default();
    c.bench_function("recover_fenced_fast_path", |b| {
        b.iter(|| recover(black_box(&input), black_box(&options)));
    });
}

fn bench_prose_fallback(c: &mut Criterion) {
    let input = prose_input();
    let options = RecoverOptions::default();
    c.bench_function("recover_prose_fallback", |b| {
        b.iter(|| recover(black_box(&input), black_box(&options)));
    });
}

fn bench_repair_leg(c: &mut Criterion) {
    let input = dirty_input();
    let options = RecoverOptions::default();
    c.bench_function("recover_dirty_repair", |b| {
        b.iter(|| recover(black_box(input), black_box(&options)));
    });
}

criterion_group!(benches, bench_fast_path, bench_prose_fallback, bench_repair_leg);
criterion_main!(benches);
