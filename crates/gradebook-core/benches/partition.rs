use criterion::{black_box, criterion_group, criterion_main, Criterion};

use gradebook_core::{Partition, RawRow, StudentRegistry};

fn generate_rows(n: usize) -> Vec<RawRow> {
    (0..n)
        .map(|i| {
            // Every fifth row has a lowercase numero and is rejected.
            let numero = if i % 5 == 0 {
                format!("ab{i:05}")
            } else {
                format!("AB{i:05}")
            };
            RawRow::from_cells([
                ("Numero", numero),
                ("Nom", "Diallo".to_string()),
                ("Prenom", "Awa".to_string()),
                ("Date de naissance", format!("{:02}/04/2002", i % 28 + 1)),
                ("Classe", format!("{}iem{}", 3 + i % 4, if i % 2 == 0 { "a" } else { "b" })),
                ("Note", "Math[10|14:16] #Francais[12:9.5] #Anglais[8|12:10]".to_string()),
            ])
        })
        .collect()
}

fn bench_partition(c: &mut Criterion) {
    let mut group = c.benchmark_group("partition");

    for n in [100, 1_000, 10_000] {
        let rows = generate_rows(n);
        group.bench_function(format!("{n}_rows"), |b| {
            b.iter(|| Partition::from_rows(black_box(rows.clone())))
        });
    }

    group.finish();
}

fn bench_registry_load(c: &mut Criterion) {
    let rows = generate_rows(1_000);

    c.bench_function("registry_load_1000_rows", |b| {
        b.iter(|| {
            let mut registry = StudentRegistry::new();
            registry.load(black_box(&rows));
            registry
        })
    });
}

criterion_group!(benches, bench_partition, bench_registry_load);
criterion_main!(benches);
