use criterion::{criterion_group, criterion_main, Criterion};
use graderight::config::ParallelConfig;
use graderight::{
    evaluate, score_roster, Blueprint, BlueprintEdit, Catalog, GraderightConfig, StudentRecord,
};
use std::hint::black_box;
use std::sync::Arc;

const QUESTIONS: u32 = 60;
const OPTIONS: [&str; 4] = ["A", "B", "C", "D"];

fn create_blueprint() -> Blueprint {
    let edits = (1..=QUESTIONS).flat_map(|q| {
        [
            BlueprintEdit::UpdateKey {
                question: q,
                key: OPTIONS[(q % 4) as usize].to_string(),
                points: None,
            },
            BlueprintEdit::AssignQuestion {
                question: q,
                objective_id: format!("oa{}", q % 8),
                skill_id: format!("h{}", q % 5),
            },
        ]
    });
    Blueprint::new("bench", "Benchmark", QUESTIONS)
        .apply_all(edits)
        .unwrap()
}

fn create_roster(students: usize) -> Vec<Arc<StudentRecord>> {
    (0..students)
        .map(|s| {
            let answers: Vec<&str> = (0..QUESTIONS as usize)
                .map(|q| OPTIONS[(q * 7 + s * 3) % 4])
                .collect();
            Arc::new(StudentRecord::present(s.to_string(), "Student", &answers))
        })
        .collect()
}

fn config(parallel: bool) -> GraderightConfig {
    GraderightConfig {
        parallel: ParallelConfig {
            enabled: parallel,
            ..ParallelConfig::default()
        },
        ..GraderightConfig::default()
    }
}

fn benchmark_scoring(c: &mut Criterion) {
    let blueprint = create_blueprint();
    let roster = create_roster(2_000);

    for (name, parallel) in [("score_roster_sequential", false), ("score_roster_parallel", true)] {
        let config = config(parallel);
        c.bench_function(name, |b| {
            b.iter(|| score_roster(black_box(&roster), &blueprint, &config));
        });
    }
}

fn benchmark_evaluation(c: &mut Criterion) {
    let blueprint = create_blueprint();
    let catalog = Catalog::new();
    let roster = create_roster(400);
    let config = config(true);

    c.bench_function("evaluate_course", |b| {
        b.iter(|| evaluate(black_box(&roster), &blueprint, &catalog, &config));
    });
}

criterion_group!(benches, benchmark_scoring, benchmark_evaluation);
criterion_main!(benches);
