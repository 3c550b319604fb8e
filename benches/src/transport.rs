use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use itertools::Itertools;
use sgboard_core::sleep::NopSleeper;
use sgboard_driver::transport::{Transport, TransportOption};
use sgboard_emulator::UsbFifoEmulator;

const TEST_SIZES: &[usize] = &[256, 4096];

fn send_samples(c: &mut Criterion) {
    let mut group = c.benchmark_group("sgboard/transport");

    TEST_SIZES.iter().for_each(|&size| {
        let samples = (0..size).map(|i| i as f32 * 1e-3).collect_vec();
        group.bench_with_input(
            BenchmarkId::new("Transport::send_samples", size),
            &samples,
            |b, samples| {
                let mut transport =
                    Transport::new(UsbFifoEmulator::new(), NopSleeper, TransportOption::default());
                b.iter(|| {
                    let _ = transport.write_packet_header(samples.len() * 4);
                    let _ = transport.send_samples(black_box(samples.iter().copied()));
                    black_box(transport.bus_mut().host_read());
                })
            },
        );
    });
    group.finish();
}

criterion_group!(benches, send_samples);
criterion_main!(benches);
