use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rolltable::*;

// cargo bench
pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("parse attack:2d20p1h+4^", |b| {
        b.iter(|| {
            let _ = NotationParser::new()
                .parse(black_box("attack:2d20p1h+4^"))
                .unwrap();
        })
    });

    let spec = NotationParser::new().parse("8d10p3h").unwrap();
    c.bench_function("enumerate 8d10p3h", |b| {
        let mut rng = StdRng::seed_from_u64(0);
        b.iter(|| {
            let _ = spec
                .enumerate_with(black_box(&EnumerationConfig::exact_only()), &mut rng)
                .unwrap();
        })
    });

    let spec = NotationParser::new().parse("10d6/3^").unwrap();
    c.bench_function("roll 10d6/3^", |b| {
        let mut rng = StdRng::seed_from_u64(0);
        b.iter(|| spec.roll_with(black_box(&mut rng)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
