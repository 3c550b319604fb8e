use std::time::Duration;

use sgboard::demod::NullDemodulator;
use sgboard_core::{
    calibration::Calibration,
    common::DEFAULT_SAMPLE_PERIOD,
    error::{ReceiveError, RunError},
    run::{RunConfig, RunMode, RunState},
};
use sgboard_driver::receive::{ReceiveState, SportControl};
use sgboard_emulator::FrontEndEmulator;

use crate::{create_controller, run_to_end};

#[test]
fn lost_frame_syncs_desynchronize_the_run() -> anyhow::Result<()> {
    let fe = FrontEndEmulator::new();
    (3..100).for_each(|k| fe.drop_frame_sync(k));
    let mut cnt = create_controller::<_, 64>(&fe, Calibration::default(), NullDemodulator);

    cnt.start_run(RunConfig::finite(10, DEFAULT_SAMPLE_PERIOD, RunMode::Iq))?;
    assert_eq!(
        Err(RunError::Desynchronized {
            index: 3,
            elapsed: Duration::from_micros(50),
        }),
        run_to_end(&fe, &mut cnt)
    );

    assert!(!fe.is_running());
    assert_eq!(SportControl::NONE, fe.sport_control());
    assert_eq!(8, fe.conversions());
    let run = cnt.acquisition();
    assert_eq!(RunState::Stopped, run.state());
    assert!(!run.finished());
    assert_eq!(3, run.current_index());
    assert!(matches!(run.error(), Some(RunError::Desynchronized { .. })));
    assert!(cnt.results().is_none());
    Ok(())
}

#[test]
fn single_lost_frame_sync_is_absorbed() -> anyhow::Result<()> {
    let fe = FrontEndEmulator::new();
    fe.drop_frame_sync(2);
    let mut cnt = create_controller::<_, 64>(&fe, Calibration::default(), NullDemodulator);

    cnt.start_run(RunConfig::finite(5, DEFAULT_SAMPLE_PERIOD, RunMode::Iq))?;
    let events = run_to_end(&fe, &mut cnt)?;
    assert_eq!(5, events.len());
    assert_eq!(6, fe.conversions());
    assert!(cnt.acquisition().finished());
    Ok(())
}

#[test]
fn empty_receive_buffer_aborts_the_run() -> anyhow::Result<()> {
    let fe = FrontEndEmulator::new();
    fe.stall_receive(4);
    let mut cnt = create_controller::<_, 64>(&fe, Calibration::default(), NullDemodulator);

    cnt.start_run(RunConfig::finite(10, DEFAULT_SAMPLE_PERIOD, RunMode::Iq))?;
    assert_eq!(
        Err(RunError::Receive(ReceiveError::RxTimeout)),
        run_to_end(&fe, &mut cnt)
    );
    assert!(!fe.is_running());
    assert_eq!(4, cnt.acquisition().current_index());
    assert_eq!(ReceiveState::Idle, cnt.receiver().state());
    assert!(!cnt.receiver().is_armed());
    assert!(cnt.results().is_none());
    Ok(())
}

#[test]
fn stalled_clock_is_detected_without_interrupts() -> anyhow::Result<()> {
    let fe = FrontEndEmulator::new();
    let mut cnt = create_controller::<_, 64>(&fe, Calibration::default(), NullDemodulator);

    cnt.start_run(RunConfig::finite(10, DEFAULT_SAMPLE_PERIOD, RunMode::Iq))?;
    assert_eq!(Ok(()), cnt.check_deadline());
    fe.advance(cnt.deadline());
    assert_eq!(Ok(()), cnt.check_deadline());
    fe.advance(Duration::from_nanos(1));
    assert!(matches!(
        cnt.check_deadline(),
        Err(RunError::Desynchronized { index: 0, .. })
    ));
    assert!(!fe.is_running());
    Ok(())
}

#[test]
fn recovers_after_desync() -> anyhow::Result<()> {
    let fe = FrontEndEmulator::new();
    fe.stall_receive(0);
    let mut cnt = create_controller::<_, 64>(&fe, Calibration::default(), NullDemodulator);

    cnt.start_run(RunConfig::finite(4, DEFAULT_SAMPLE_PERIOD, RunMode::Iq))?;
    assert!(run_to_end(&fe, &mut cnt).is_err());

    cnt.start_run(RunConfig::finite(4, DEFAULT_SAMPLE_PERIOD, RunMode::Iq))?;
    assert_eq!(None, cnt.acquisition().error());
    assert_eq!(4, run_to_end(&fe, &mut cnt)?.len());
    assert!(cnt.acquisition().finished());
    Ok(())
}
