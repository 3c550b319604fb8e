use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use sgboard::{
    demod::{NullDemodulator, QuadratureDemodulator},
    pipeline::Pipeline,
};
use sgboard_core::{
    calibration::Calibration,
    common::DEFAULT_SAMPLE_PERIOD,
    dds::DdsSettings,
    run::{AcquisitionRun, RunConfig, RunMode},
    sample::RawSample,
};

const TEST_SIZES: &[u32] = &[256, 4096];

fn armed(n: u32, mode: RunMode) -> AcquisitionRun {
    let mut run = AcquisitionRun::new();
    let _ = run.arm(&RunConfig::continuous(n, DEFAULT_SAMPLE_PERIOD, mode));
    run.start();
    run
}

fn direct(c: &mut Criterion) {
    let mut group = c.benchmark_group("sgboard/pipeline");

    TEST_SIZES.iter().for_each(|&size| {
        group.bench_with_input(BenchmarkId::new("Direct", size), &size, |b, &size| {
            let mut pipeline = Pipeline::<_, 4096>::new(Calibration::default(), NullDemodulator);
            pipeline.arm(RunMode::Iq);
            let mut run = armed(size, RunMode::Iq);
            b.iter(|| {
                (0..size).for_each(|k| {
                    black_box(pipeline.process(black_box(RawSample(k.wrapping_mul(0x0001_0003))), &mut run));
                })
            })
        });
    });
    group.finish();
}

fn quadrature(c: &mut Criterion) {
    let mut group = c.benchmark_group("sgboard/pipeline");

    TEST_SIZES.iter().for_each(|&size| {
        group.bench_with_input(BenchmarkId::new("Quadrature", size), &size, |b, &size| {
            let mut pipeline = Pipeline::<_, 4096>::new(
                Calibration::default(),
                QuadratureDemodulator::from_settings(
                    &DdsSettings::default(),
                    DEFAULT_SAMPLE_PERIOD,
                    0.01,
                ),
            );
            pipeline.arm(RunMode::If);
            let mut run = armed(size, RunMode::If);
            b.iter(|| {
                (0..size).for_each(|k| {
                    black_box(pipeline.process(black_box(RawSample(k << 16)), &mut run));
                })
            })
        });
    });
    group.finish();
}

criterion_group!(benches, direct, quadrature);
criterion_main!(benches);
