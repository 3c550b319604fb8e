use itertools::Itertools;
use sgboard::{demod::NullDemodulator, error::BoardError};
use sgboard_core::{
    common::{DDS_SYSTEM_CLOCK, DEFAULT_SAMPLE_PERIOD, Hz, VOLTS_PER_CODE, kHz},
    dds::{DdsChannel, DdsCurrentScale, DdsPhase},
    error::{DdsError, ReceiveError, RunError, TransportError, TransportStage},
    gain::{GainPowerDown, GainWord},
    retry::Retry,
    run::{RunConfig, RunMode},
};
use sgboard_emulator::{FrontEndEmulator, UsbFifoEmulator};

use crate::{EmulatedBoard, create_board, decode_results};

fn finish_run(fe: &FrontEndEmulator, board: &mut EmulatedBoard<NullDemodulator>, n: u32) {
    board
        .start_run(RunConfig::finite(n, DEFAULT_SAMPLE_PERIOD, RunMode::Iq))
        .expect("start run");
    while let Some(event) = fe.next_interrupt() {
        board.controller_mut().dispatch(event).expect("dispatch");
    }
}

#[test]
fn init_programs_peripherals() -> anyhow::Result<()> {
    let fe = FrontEndEmulator::new();
    let mut usb = UsbFifoEmulator::new();
    usb.host_write(&[0x01, 0x02, 0x03]);
    let mut board = create_board(&fe, usb, NullDemodulator);

    board.init()?;

    assert_eq!(0, board.transport().bus().rx_len());

    let dds = board.dds();
    assert_eq!(2, dds.resets());
    assert_eq!(1, dds.updates());
    assert_eq!(Some(DdsCurrentScale::S100), dds.current_scale());
    assert_eq!(Some(35791394), dds.tuning_word(DdsChannel::Excitation));
    assert_eq!(
        Some(999_999 * Hz),
        dds.frequency(DdsChannel::Excitation, DDS_SYSTEM_CLOCK)
    );
    assert_eq!(
        Some(10 * kHz),
        dds.frequency(DdsChannel::Excitation, DDS_SYSTEM_CLOCK)
            .zip(dds.frequency(DdsChannel::LocalOscillator1, DDS_SYSTEM_CLOCK))
            .map(|(e, lo)| e.abs_diff(lo))
    );
    assert_eq!(Some(DdsPhase::DEG_0), dds.phase(DdsChannel::LocalOscillator1));
    assert_eq!(Some(DdsPhase::DEG_90), dds.phase(DdsChannel::LocalOscillator2));
    assert!(DdsChannel::ALL.iter().all(|&ch| !dds.is_pending(ch)));

    assert_eq!(
        Some(GainWord::encode(0x800, GainPowerDown::Normal)),
        board.gain().port().last_word()
    );
    Ok(())
}

#[test]
fn init_reports_synthesizer_fault() {
    let fe = FrontEndEmulator::new();
    let mut board = create_board(&fe, UsbFifoEmulator::new(), NullDemodulator);
    board.dds_mut().set_busy(Some(DdsChannel::LocalOscillator1));
    assert_eq!(
        Err(BoardError::Dds(DdsError::Busy(DdsChannel::LocalOscillator1))),
        board.init()
    );
    assert_eq!(None, board.gain().port().last_word());
}

#[test]
fn set_gain() -> anyhow::Result<()> {
    let fe = FrontEndEmulator::new();
    let mut board = create_board(&fe, UsbFifoEmulator::new(), NullDemodulator);
    board.init()?;
    board.set_gain(0x1ABC, GainPowerDown::ThreeState)?;
    let word = board
        .gain()
        .port()
        .last_word()
        .ok_or(anyhow::anyhow!("no word"))?;
    assert_eq!(0xABC, word.value());
    assert_eq!(GainPowerDown::ThreeState, word.power_down());
    assert_eq!(2, board.gain().port().words().len());
    Ok(())
}

#[test]
fn send_results_framing() -> anyhow::Result<()> {
    let fe = FrontEndEmulator::new();
    let mut board = create_board(&fe, UsbFifoEmulator::new(), NullDemodulator);
    board.init()?;
    finish_run(&fe, &mut board, 8);

    assert_eq!(8, board.send_results()?);

    let payload = board
        .transport_mut()
        .bus_mut()
        .host_read_packet()
        .ok_or(anyhow::anyhow!("no packet"))?;
    assert_eq!(64, payload.len());
    let (a, b) = decode_results(&payload);
    assert_eq!((0..8).map(|k| k as f32 * VOLTS_PER_CODE).collect_vec(), a);
    assert_eq!(
        (0..8).map(|k| (2 * k) as f32 * VOLTS_PER_CODE).collect_vec(),
        b
    );
    assert!(board.transport().bus().tx().is_empty());
    Ok(())
}

#[test]
fn send_results_lsb_first() -> anyhow::Result<()> {
    let fe = FrontEndEmulator::with_source(|_| (0x8000, 0x4000));
    let mut board = create_board(&fe, UsbFifoEmulator::new(), NullDemodulator);
    finish_run(&fe, &mut board, 1);

    board.send_results()?;
    let bytes = board.transport_mut().bus_mut().host_read();
    let a = (0x8000 as f32 * VOLTS_PER_CODE).to_bits().to_le_bytes();
    let b = (0x4000 as f32 * VOLTS_PER_CODE).to_bits().to_le_bytes();
    assert_eq!(
        [&[0xAA, 0x00, 0x08][..], &a[..], &b[..]].concat(),
        bytes
    );
    Ok(())
}

#[test]
fn send_results_requires_finished_run() -> anyhow::Result<()> {
    let fe = FrontEndEmulator::new();
    let mut board = create_board(&fe, UsbFifoEmulator::new(), NullDemodulator);
    assert_eq!(Err(BoardError::NotFinished), board.send_results());

    board.start_run(RunConfig::finite(8, DEFAULT_SAMPLE_PERIOD, RunMode::Iq))?;
    (0..3).for_each(|_| {
        if let Some(event) = fe.next_interrupt() {
            let _ = board.controller_mut().dispatch(event);
        }
    });
    assert_eq!(Err(BoardError::NotFinished), board.send_results());
    assert!(board.transport().bus().tx().is_empty());

    board.stop_run();
    assert_eq!(Ok(1), board.send_results());
    Ok(())
}

#[test]
fn send_results_after_failed_run() -> anyhow::Result<()> {
    let fe = FrontEndEmulator::new();
    fe.stall_receive(1);
    let mut board = create_board(&fe, UsbFifoEmulator::new(), NullDemodulator);
    board.start_run(RunConfig::finite(8, DEFAULT_SAMPLE_PERIOD, RunMode::Iq))?;
    while let Some(event) = fe.next_interrupt() {
        let _ = board.controller_mut().dispatch(event);
    }
    assert_eq!(
        Err(BoardError::Run(RunError::Receive(ReceiveError::RxTimeout))),
        board.send_results()
    );
    Ok(())
}

#[test]
fn send_results_write_timeout() -> anyhow::Result<()> {
    let fe = FrontEndEmulator::new();
    let mut board = create_board(&fe, UsbFifoEmulator::new(), NullDemodulator);
    finish_run(&fe, &mut board, 4);

    board.transport_mut().bus_mut().stall_tx(true);
    assert_eq!(
        Err(BoardError::Transport(TransportError::Timeout(
            TransportStage::Write
        ))),
        board.send_results()
    );
    assert!(!board.controller().results_consumed());

    board.transport_mut().bus_mut().stall_tx(false);
    assert_eq!(Ok(4), board.send_results());
    assert!(board.controller().results_consumed());
    Ok(())
}

#[test]
fn host_packet_round_trip() -> anyhow::Result<()> {
    let fe = FrontEndEmulator::new();
    let mut board = create_board(&fe, UsbFifoEmulator::new(), NullDemodulator);
    board.init()?;

    board
        .transport_mut()
        .bus_mut()
        .host_write_packet(&[0x01, 0x10, 0x00]);
    let mut buf = [0u8; 16];
    assert_eq!(3, board.transport_mut().read_packet(&mut buf)?);
    assert_eq!([0x01, 0x10, 0x00], buf[..3]);
    assert!(!board.transport_mut().poll_data_available(Retry::ONCE));
    Ok(())
}
