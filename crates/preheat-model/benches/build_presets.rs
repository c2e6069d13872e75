use criterion::{black_box, criterion_group, criterion_main, Criterion};
use preheat_model::{ModelSpecification, Preset};

fn bench_build(c: &mut Criterion) {
    for preset in Preset::ALL {
        let config = preset.config().expect("preset");
        c.bench_function(&format!("build_{}", preset.name()), |b| {
            b.iter(|| ModelSpecification::build(black_box(&config)).expect("build"))
        });
    }
}

fn bench_hash(c: &mut Criterion) {
    let spec = ModelSpecification::from_preset(Preset::ChaoticInflation).expect("build");
    c.bench_function("spec_hash_chaotic_inflation", |b| {
        b.iter(|| spec.spec_hash().expect("hash"))
    });
}

criterion_group!(benches, bench_build, bench_hash);
criterion_main!(benches);
