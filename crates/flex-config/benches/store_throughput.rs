use criterion::{black_box, criterion_group, criterion_main, Criterion};
use flex_config::{ConfigStore, FormatRegistry, Record, TabularDocument};
use tempfile::tempdir;

fn run(idx: usize) -> Record {
    Record::new()
        .with("name", format!("exp{idx}"))
        .with("optimizer", if idx % 2 == 0 { "Adam" } else { "SGD" })
        .with("lr", 0.1 / (idx + 1) as f64)
        .with("batch_size", 32 << (idx % 4))
        .with("acc", 0.5 + (idx % 50) as f64 / 100.0)
}

fn history(rows: usize) -> TabularDocument {
    TabularDocument::from_rows((0..rows).map(run))
}

fn bench_set_config(c: &mut Criterion) {
    let configs: Vec<TabularDocument> = (0..64)
        .map(|idx| TabularDocument::from_record(run(idx)))
        .collect();
    c.bench_function("store_set_config_64", |b| {
        b.iter(|| {
            let mut store = ConfigStore::new();
            for config in &configs {
                store.set_config(config.clone()).expect("set config");
            }
            black_box(store.logs().len())
        });
    });
}

fn bench_codecs(c: &mut Criterion) {
    let dir = tempdir().expect("tmp dir");
    let registry = FormatRegistry::new();
    let doc = history(256);
    for ext in ["csv", "json", "pkl"] {
        let path = dir.path().join(format!("runs.{ext}"));
        c.bench_function(&format!("codec_{ext}_256_rows"), |b| {
            b.iter(|| {
                registry.save(&doc, &path).expect("save");
                black_box(registry.load(&path).expect("load").len())
            });
        });
    }
}

criterion_group!(benches, bench_set_config, bench_codecs);
criterion_main!(benches);
