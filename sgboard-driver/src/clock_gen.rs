use core::time::Duration;

use sgboard_core::common::{CNV_PULSE_WIDTH_TICKS, PCG_TICKS_PER_MICROSECOND};

/// Control word of the precision clock generator.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(C)]
pub struct PcgControl(u32);

bitflags::bitflags! {
    impl PcgControl : u32 {
        /// No bits set.
        const NONE   = 0;
        /// Frame sync divisor field.
        const PERIOD = 0x000F_FFFF;
        /// Enables the clock output.
        const ENCLKD = 1 << 30;
        /// Enables the frame sync output.
        const ENFSD  = 1 << 31;
    }
}

impl PcgControl {
    /// Creates a control word that runs the frame sync output with a period of `ticks`.
    ///
    /// Ticks beyond the width of the divisor field are silently truncated.
    #[must_use]
    pub const fn running(ticks: u32) -> Self {
        Self::from_bits_retain(
            (ticks & Self::PERIOD.bits()) | Self::ENFSD.bits() | Self::ENCLKD.bits(),
        )
    }

    /// Returns the programmed period in ticks.
    #[must_use]
    pub const fn ticks(&self) -> u32 {
        self.bits() & Self::PERIOD.bits()
    }
}

/// The register file of the precision clock generator.
pub trait PcgRegisters {
    /// Writes the control register.
    fn write_control(&mut self, control: PcgControl);

    /// Writes the pulse width register.
    fn write_pulse_width(&mut self, ticks: u32);
}

/// The source of the periodic conversion trigger.
pub trait ClockGenerator {
    /// Starts emitting trigger edges every `period`.
    ///
    /// The period is not validated. Periods below
    /// [`MIN_SAMPLE_PERIOD`](sgboard_core::common::MIN_SAMPLE_PERIOD) overlap conversion and
    /// read-out, and samples are lost.
    fn start(&mut self, period: Duration);

    /// Stops emitting trigger edges. Idempotent.
    fn stop(&mut self);

    /// Returns `true` while trigger edges are being emitted.
    fn is_running(&self) -> bool;
}

/// [`ClockGenerator`] backed by the precision clock generator.
#[derive(Debug)]
pub struct Pcg<R: PcgRegisters> {
    registers: R,
    running: bool,
}

impl<R: PcgRegisters> Pcg<R> {
    /// Creates a new stopped [`Pcg`].
    #[must_use]
    pub const fn new(registers: R) -> Self {
        Self {
            registers,
            running: false,
        }
    }

    /// Converts a period to clock generator ticks.
    #[must_use]
    pub const fn period_to_ticks(period: Duration) -> u32 {
        (period.as_nanos() * PCG_TICKS_PER_MICROSECOND as u128 / 1000) as u32
    }

    /// Returns the register file.
    #[must_use]
    pub const fn registers(&self) -> &R {
        &self.registers
    }
}

impl<R: PcgRegisters> ClockGenerator for Pcg<R> {
    fn start(&mut self, period: Duration) {
        let ticks = Self::period_to_ticks(period);
        tracing::debug!("PCG start: period = {:?}, ticks = {}", period, ticks);
        self.registers.write_pulse_width(CNV_PULSE_WIDTH_TICKS);
        self.registers.write_control(PcgControl::running(ticks));
        self.running = true;
    }

    fn stop(&mut self) {
        if self.running {
            tracing::debug!("PCG stop");
        }
        self.registers.write_control(PcgControl::NONE);
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}
