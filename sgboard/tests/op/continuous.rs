use std::ops::ControlFlow;

use itertools::Itertools;
use sgboard::{controller::RunEvent, demod::NullDemodulator};
use sgboard_core::{
    calibration::Calibration,
    common::{DEFAULT_SAMPLE_PERIOD, VOLTS_PER_CODE},
    run::{RunConfig, RunMode, RunState},
};
use sgboard_emulator::FrontEndEmulator;

use crate::create_controller;

#[rstest::rstest]
#[case(1, 5)]
#[case(64, 3)]
#[case(100, 2)]
#[test]
fn blocks_without_seams(#[case] block: u32, #[case] blocks: u32) -> anyhow::Result<()> {
    let fe = FrontEndEmulator::new();
    let mut cnt = create_controller::<_, 256>(&fe, Calibration::default(), NullDemodulator);

    cnt.start_run(RunConfig::continuous(block, DEFAULT_SAMPLE_PERIOD, RunMode::Iq))?;
    let mut seen = Vec::new();
    let mut samples = 0;
    let state = cnt.run(
        || fe.next_interrupt(),
        |e| {
            samples += 1;
            match *e {
                RunEvent::BlockComplete { blocks: b } => {
                    assert!(fe.is_running());
                    seen.push(b);
                    if b == blocks {
                        return ControlFlow::Break(());
                    }
                }
                RunEvent::Finished => panic!("continuous run finished on count"),
                RunEvent::Sample { .. } => {}
            }
            ControlFlow::Continue(())
        },
    )?;

    assert_eq!(RunState::Stopped, state);
    assert_eq!((1..=blocks).collect_vec(), seen);
    assert_eq!(block * blocks, samples);
    assert_eq!(block * blocks, fe.conversions());
    assert_eq!(block * blocks, cnt.acquisition().current_index());
    assert_eq!(blocks, cnt.acquisition().blocks_completed());
    assert!(!fe.is_running());
    assert!(cnt.acquisition().finished());
    Ok(())
}

#[test]
fn results_hold_the_most_recent_samples() -> anyhow::Result<()> {
    let fe = FrontEndEmulator::new();
    let mut cnt = create_controller::<_, 32>(&fe, Calibration::default(), NullDemodulator);

    cnt.start_run(RunConfig::continuous(10, DEFAULT_SAMPLE_PERIOD, RunMode::Iq))?;
    while cnt.acquisition().current_index() < 75 {
        if let Some(event) = fe.next_interrupt() {
            cnt.dispatch(event)?;
        }
    }
    assert!(cnt.results().is_none());
    cnt.stop_run();

    let results = cnt.results().ok_or(anyhow::anyhow!("run not finished"))?;
    assert_eq!(32, results.len());
    assert_eq!(
        (43..75).map(|k| k as f32 * VOLTS_PER_CODE).collect_vec(),
        results.channel_a().collect_vec()
    );
    assert_eq!(
        (43..75).map(|k| (2 * k) as f32 * VOLTS_PER_CODE).collect_vec(),
        results.channel_b().collect_vec()
    );
    Ok(())
}
