use std::collections::HashSet;

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use uuid::Uuid;

use papergen_core::blueprint::validate_blueprint;
use papergen_core::model::{Difficulty, Question, QuestionKind};
use papergen_core::selection::{choose_many, exclude_used};

fn pool(n: usize) -> Vec<Question> {
    let course = Uuid::new_v4();
    (0..n)
        .map(|i| Question {
            id: Uuid::new_v4(),
            course_id: course,
            text: format!("Question {i}"),
            kind: QuestionKind::LongAnswer,
            marks: 8,
            difficulty: Difficulty::Hard,
            unit_id: Uuid::nil(),
            outcome_ids: vec![],
            created_at: Utc::now(),
        })
        .collect()
}

fn bench_exclude_and_draw(c: &mut Criterion) {
    let questions = pool(1_000);
    let used: HashSet<_> = questions.iter().step_by(3).map(|q| q.id).collect();
    let mut rng = StdRng::seed_from_u64(42);

    c.bench_function("exclude_used_1000", |b| {
        b.iter(|| exclude_used(black_box(questions.clone()), black_box(&used)))
    });

    let remaining = exclude_used(questions.clone(), &used);
    c.bench_function("choose_many_2_of_666", |b| {
        b.iter(|| choose_many(black_box(&remaining), 2, &mut rng).len())
    });
}

fn bench_validation(c: &mut Criterion) {
    let doc = serde_json::json!({
        "name": "Benchmark Blueprint",
        "structure": papergen_core::blueprint::Structure::default_layout(),
    });
    c.bench_function("validate_blueprint", |b| {
        b.iter(|| validate_blueprint(black_box(&doc)))
    });
}

criterion_group!(benches, bench_exclude_and_draw, bench_validation);
criterion_main!(benches);
