use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use blaze_solid::{
    add, analyze, divide, multiply,
    exact::BigInt,
    Barrier, Confidence, GapMagnitude, SolidNumber, SolidPool, Terminal,
};

/// Exact big-integer arithmetic underneath Exact × Exact
fn exact_arithmetic_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("exact_arithmetic");

    let a = BigInt::parse("123456789012345678901234567890123456789").unwrap_or_else(BigInt::zero);
    let b = BigInt::parse("987654321098765432109876543210").unwrap_or_else(BigInt::zero);

    group.bench_function("bigint_mul", |bench| {
        bench.iter(|| black_box(&a).mul(black_box(&b)))
    });

    group.bench_function("bigint_div_rem", |bench| {
        bench.iter(|| black_box(&a).div_rem(black_box(&b)))
    });

    group.finish();
}

/// Engine dispatch over exact, gapped and infinite operands
fn engine_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("solid_engine");

    let exact_a = SolidNumber::exact("31415926535897932384");
    let exact_b = SolidNumber::exact("27182818284590452353");
    let gapped = SolidNumber::with_gap(
        "1.41421356",
        Barrier::Computational,
        GapMagnitude::from_exponent(8),
        Confidence::new(950),
        Terminal::Digits("2373".into()),
    );
    let infinity = SolidNumber::infinity(false, Confidence::FULL, Terminal::Digits("7".into()));

    group.bench_function("exact_add", |bench| {
        bench.iter(|| add(black_box(&exact_a), black_box(&exact_b)))
    });

    group.bench_function("exact_multiply", |bench| {
        bench.iter(|| multiply(black_box(&exact_a), black_box(&exact_b)))
    });

    group.bench_function("exact_divide_inexact", |bench| {
        bench.iter(|| divide(black_box(&exact_a), black_box(&exact_b)))
    });

    group.bench_function("gapped_multiply", |bench| {
        bench.iter(|| multiply(black_box(&gapped), black_box(&exact_b)))
    });

    group.bench_function("infinity_divide", |bench| {
        bench.iter(|| divide(black_box(&infinity), black_box(&infinity)))
    });

    group.finish();
}

/// Allocation churn through the fixed-capacity pool
fn pool_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("solid_pool");

    group.bench_function("alloc_add_free", |bench| {
        bench.iter_batched(
            || SolidPool::with_capacity(64),
            |mut pool| {
                for i in 0..16u32 {
                    let a = pool.init_exact(&i.to_string());
                    let b = pool.init_exact("1");
                    if let (Some(a), Some(b)) = (a, b) {
                        if let Ok(sum) = pool.add(a, b) {
                            pool.dec_ref(sum);
                        }
                        pool.dec_ref(a);
                        pool.dec_ref(b);
                    }
                }
                pool
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

/// Full five-phase analysis for representative inputs
fn gggx_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("gggx_analyze");

    for (name, value) in [
        ("pi", std::f64::consts::PI),
        ("e", std::f64::consts::E),
        ("one_third", 1.0 / 3.0),
        ("sqrt_two", std::f64::consts::SQRT_2),
        ("integer", 65536.0),
    ] {
        group.bench_function(name, |bench| bench.iter(|| analyze(black_box(value), 15)));
    }

    group.finish();
}

criterion_group!(
    solid_benches,
    exact_arithmetic_benchmark,
    engine_benchmark,
    pool_benchmark,
    gggx_benchmark
);
criterion_main!(solid_benches);
