use criterion::{black_box, criterion_group, criterion_main, Criterion};

use gradebook_core::{grades, validators};

fn generate_blob(subjects: usize, assignments: usize) -> String {
    (0..subjects)
        .map(|i| {
            let scores = (0..assignments)
                .map(|j| format!("{}.5", (i + j) % 20))
                .collect::<Vec<_>>()
                .join("|");
            format!("Subject{}[{scores}:{}]", char::from(b'A' + (i % 26) as u8), i % 20)
        })
        .collect::<Vec<_>>()
        .join(" #")
}

fn bench_grade_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("grade_parsing");

    let single = "Math[10|14:16]";
    let typical = generate_blob(6, 4);
    let large = generate_blob(26, 20);

    group.bench_function("single_subject", |b| {
        b.iter(|| grades::parse(black_box(single)))
    });

    group.bench_function("6_subjects", |b| {
        b.iter(|| grades::parse(black_box(&typical)))
    });

    group.bench_function("26_subjects", |b| {
        b.iter(|| grades::parse(black_box(&large)))
    });

    group.bench_function("coarse_check_6_subjects", |b| {
        b.iter(|| validators::grade_blob_syntactically_valid(black_box(&typical)))
    });

    group.finish();
}

fn bench_averages(c: &mut Criterion) {
    let table = grades::parse(&generate_blob(26, 20)).table;

    c.bench_function("overall_average_26_subjects", |b| {
        b.iter(|| black_box(&table).overall_average())
    });
}

criterion_group!(benches, bench_grade_parsing, bench_averages);
criterion_main!(benches);
