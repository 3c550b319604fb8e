use std::time::Duration;

use itertools::Itertools;
use rand::Rng;
use sgboard::{controller::RunEvent, demod::NullDemodulator};
use sgboard_core::{
    calibration::Calibration,
    common::{CNV_PULSE_WIDTH_TICKS, DEFAULT_SAMPLE_PERIOD, VOLTS_PER_CODE},
    error::RunError,
    run::{RunConfig, RunMode, RunState},
};
use sgboard_driver::clock_gen::PcgControl;
use sgboard_emulator::FrontEndEmulator;

use crate::{create_controller, run_to_end};

#[rstest::rstest]
#[case(1)]
#[case(2)]
#[case(100)]
#[case(4096)]
#[test]
fn finishes_after_exactly_n_samples(#[case] n: u32) -> anyhow::Result<()> {
    let fe = FrontEndEmulator::new();
    let mut cnt = create_controller::<_, 4096>(&fe, Calibration::default(), NullDemodulator);

    cnt.start_run(RunConfig::finite(n, DEFAULT_SAMPLE_PERIOD, RunMode::Iq))?;
    assert!(fe.is_running());
    assert_eq!(DEFAULT_SAMPLE_PERIOD, fe.period());
    assert_eq!(CNV_PULSE_WIDTH_TICKS, fe.pulse_width());

    let events = run_to_end(&fe, &mut cnt)?;
    assert_eq!(n as usize, events.len());
    assert_eq!(Some(&RunEvent::Finished), events.last());
    assert!(events[..events.len() - 1]
        .iter()
        .enumerate()
        .all(|(i, e)| matches!(e, RunEvent::Sample { index, .. } if *index == i as u32)));

    assert!(!fe.is_running());
    assert_eq!(PcgControl::NONE, fe.pcg_control());
    assert_eq!(n, fe.conversions());
    assert_eq!(n, fe.words_read());

    let run = cnt.acquisition();
    assert_eq!(RunState::Stopped, run.state());
    assert_eq!(n, run.current_index());
    assert!(run.finished());
    assert_eq!(None, run.error());
    Ok(())
}

#[test]
fn stores_calibrated_codes_of_both_channels() -> anyhow::Result<()> {
    const N: usize = 256;
    let mut rng = rand::rng();
    let codes = (0..N)
        .map(|_| (rng.random::<u16>(), rng.random::<u16>()))
        .collect_vec();
    let fe = FrontEndEmulator::with_source({
        let codes = codes.clone();
        move |k| codes[k as usize % N]
    });
    let mut cnt = create_controller::<_, N>(&fe, Calibration::default(), NullDemodulator);

    cnt.start_run(RunConfig::finite(N as u32, DEFAULT_SAMPLE_PERIOD, RunMode::Iq))?;
    run_to_end(&fe, &mut cnt)?;

    let results = cnt.results().ok_or(anyhow::anyhow!("run not finished"))?;
    assert_eq!(N, results.len());
    results
        .channel_a()
        .zip_eq(results.channel_b())
        .zip_eq(codes.iter())
        .for_each(|((a, b), &(ca, cb))| {
            assert_eq!(ca as f32 * VOLTS_PER_CODE, a);
            assert_eq!(cb as f32 * VOLTS_PER_CODE, b);
        });
    Ok(())
}

#[test]
fn keeps_last_samples_beyond_capacity() -> anyhow::Result<()> {
    let fe = FrontEndEmulator::new();
    let mut cnt = create_controller::<_, 16>(&fe, Calibration::default(), NullDemodulator);

    cnt.start_run(RunConfig::finite(40, DEFAULT_SAMPLE_PERIOD, RunMode::Iq))?;
    run_to_end(&fe, &mut cnt)?;

    let results = cnt.results().ok_or(anyhow::anyhow!("run not finished"))?;
    assert_eq!(16, results.len());
    assert_eq!(
        (24..40).map(|k| k as f32 * VOLTS_PER_CODE).collect_vec(),
        results.channel_a().collect_vec()
    );
    Ok(())
}

#[test]
fn stop_ends_run_early() -> anyhow::Result<()> {
    let fe = FrontEndEmulator::new();
    let mut cnt = create_controller::<_, 64>(&fe, Calibration::default(), NullDemodulator);

    cnt.start_run(RunConfig::finite(64, DEFAULT_SAMPLE_PERIOD, RunMode::Iq))?;
    (0..30).for_each(|_| {
        if let Some(event) = fe.next_interrupt() {
            let _ = cnt.dispatch(event);
        }
    });
    cnt.stop_run();
    assert!(!fe.is_running());
    assert_eq!(RunState::Stopped, cnt.acquisition().state());
    assert_eq!(10, cnt.acquisition().current_index());
    assert_eq!(Some(10), cnt.results().map(|r| r.len()));

    cnt.stop_run();
    assert_eq!(10, cnt.acquisition().current_index());
    Ok(())
}

#[test]
fn rearm_after_finish_starts_from_zero() -> anyhow::Result<()> {
    let fe = FrontEndEmulator::new();
    let mut cnt = create_controller::<_, 64>(&fe, Calibration::default(), NullDemodulator);

    cnt.start_run(RunConfig::finite(8, DEFAULT_SAMPLE_PERIOD, RunMode::Iq))?;
    run_to_end(&fe, &mut cnt)?;
    assert!(cnt.results().is_some());

    cnt.start_run(RunConfig::finite(4, Duration::from_micros(20), RunMode::Iq))?;
    assert!(cnt.results().is_none());
    assert_eq!(0, cnt.acquisition().current_index());
    assert_eq!(Duration::from_micros(20), fe.period());

    let events = run_to_end(&fe, &mut cnt)?;
    assert_eq!(4, events.len());
    assert_eq!(
        (8..12).map(|k| k as f32 * VOLTS_PER_CODE).collect_vec(),
        cnt.results()
            .map(|r| r.channel_a().collect_vec())
            .unwrap_or_default()
    );
    Ok(())
}

#[test]
fn zero_samples_never_start() {
    let fe = FrontEndEmulator::new();
    let mut cnt = create_controller::<_, 64>(&fe, Calibration::default(), NullDemodulator);
    assert_eq!(
        Err(RunError::InvalidSampleCount),
        cnt.start_run(RunConfig::finite(0, DEFAULT_SAMPLE_PERIOD, RunMode::Iq))
    );
    assert!(!fe.is_running());
    assert_eq!(None, fe.next_interrupt());
}

#[test]
fn period_below_floor_is_programmed_anyway() -> anyhow::Result<()> {
    let fe = FrontEndEmulator::new();
    let mut cnt = create_controller::<_, 64>(&fe, Calibration::default(), NullDemodulator);
    let config = RunConfig::finite(4, Duration::from_micros(2), RunMode::Iq);
    assert!(config.is_below_period_floor());

    cnt.start_run(config)?;
    assert_eq!(Duration::from_micros(2), fe.period());
    assert_eq!(4, run_to_end(&fe, &mut cnt)?.len());
    Ok(())
}
