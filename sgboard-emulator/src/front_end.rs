use std::{
    cell::RefCell,
    collections::{HashSet, VecDeque},
    rc::Rc,
    time::Duration,
};

use sgboard_core::{clock::Clock, common::PCG_TICKS_PER_MICROSECOND, sample::RawSample};
use sgboard_driver::{
    clock_gen::{PcgControl, PcgRegisters},
    receive::{ReceiveEvent, SerialPort, SportControl},
};

type Source = Box<dyn FnMut(u32) -> (u16, u16)>;

struct State {
    control: PcgControl,
    pulse_width: u32,
    now: Duration,
    conversions: u32,
    source: Source,
    shift: Option<u32>,
    sport: SportControl,
    rx: Option<u32>,
    words_read: u32,
    pending: VecDeque<ReceiveEvent>,
    dropped_frame_syncs: HashSet<u32>,
    stalled_receives: HashSet<u32>,
}

impl State {
    fn is_running(&self) -> bool {
        self.control
            .contains(PcgControl::ENCLKD | PcgControl::ENFSD)
            && self.control.ticks() > 0
    }

    fn period(&self) -> Duration {
        Duration::from_nanos(self.control.ticks() as u64 * 1000 / PCG_TICKS_PER_MICROSECOND as u64)
    }

    fn current(&self) -> u32 {
        self.conversions.saturating_sub(1)
    }

    fn convert(&mut self) {
        self.now += self.period();
        let k = self.conversions;
        self.conversions += 1;
        let (a, b) = (self.source)(k);
        self.shift = Some(RawSample::from_codes(a, b).word());
        self.pending.push_back(ReceiveEvent::TriggerEdge);
        if self.dropped_frame_syncs.contains(&k) {
            return;
        }
        self.pending.push_back(ReceiveEvent::FrameSync);
        self.pending.push_back(ReceiveEvent::ReceiveComplete);
    }

    fn deliver(&mut self, event: ReceiveEvent) -> ReceiveEvent {
        if event == ReceiveEvent::ReceiveComplete
            && self.sport.contains(SportControl::SPEN_A)
            && !self.stalled_receives.contains(&self.current())
        {
            self.rx = self.shift.take();
        }
        event
    }
}

/// Emulator of the clock generator, the daisy-chained ADC pair and the serial port.
///
/// Cloning yields another handle to the same hardware.
#[derive(Clone)]
pub struct FrontEndEmulator {
    state: Rc<RefCell<State>>,
}

impl FrontEndEmulator {
    /// Creates a new front end whose conversion `k` yields the codes `(k, 2k)`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_source(|k| (k as u16, (k as u16).wrapping_mul(2)))
    }

    /// Creates a new front end whose conversion `k` yields `source(k)` as channel A and B codes.
    #[must_use]
    pub fn with_source(source: impl FnMut(u32) -> (u16, u16) + 'static) -> Self {
        Self {
            state: Rc::new(RefCell::new(State {
                control: PcgControl::NONE,
                pulse_width: 0,
                now: Duration::ZERO,
                conversions: 0,
                source: Box::new(source),
                shift: None,
                sport: SportControl::NONE,
                rx: None,
                words_read: 0,
                pending: VecDeque::new(),
                dropped_frame_syncs: HashSet::new(),
                stalled_receives: HashSet::new(),
            })),
        }
    }

    /// Returns a handle to the clock generator registers.
    #[must_use]
    pub fn pcg(&self) -> PcgEmulator {
        PcgEmulator {
            state: self.state.clone(),
        }
    }

    /// Returns a handle to the serial port.
    #[must_use]
    pub fn sport(&self) -> SportEmulator {
        SportEmulator {
            state: self.state.clone(),
        }
    }

    /// Returns a handle to the core timer.
    #[must_use]
    pub fn clock(&self) -> EmulatedClock {
        EmulatedClock {
            state: self.state.clone(),
        }
    }

    /// Returns the next interrupt, or `None` once the clock generator is stopped and every
    /// interrupt of the last conversion was delivered.
    ///
    /// Each conversion advances the emulated time by one clock generator period.
    pub fn next_interrupt(&self) -> Option<ReceiveEvent> {
        let mut state = self.state.borrow_mut();
        if let Some(event) = state.pending.pop_front() {
            return Some(state.deliver(event));
        }
        if !state.is_running() {
            return None;
        }
        state.convert();
        let event = state.pending.pop_front()?;
        Some(state.deliver(event))
    }

    /// Discards the interrupts of the conversion in flight.
    pub fn clear_pending(&self) {
        self.state.borrow_mut().pending.clear();
    }

    /// Advances the emulated time without a conversion.
    pub fn advance(&self, duration: Duration) {
        self.state.borrow_mut().now += duration;
    }

    /// Makes conversion `k` lose its frame sync, so neither a frame sync nor a receive-complete
    /// interrupt follows its trigger edge.
    pub fn drop_frame_sync(&self, k: u32) {
        self.state.borrow_mut().dropped_frame_syncs.insert(k);
    }

    /// Makes conversion `k` raise its receive-complete interrupt without shifting a word in.
    pub fn stall_receive(&self, k: u32) {
        self.state.borrow_mut().stalled_receives.insert(k);
    }

    /// Returns `true` while the clock generator is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state.borrow().is_running()
    }

    /// Returns the programmed conversion period.
    #[must_use]
    pub fn period(&self) -> Duration {
        self.state.borrow().period()
    }

    /// Returns the programmed control word of the clock generator.
    #[must_use]
    pub fn pcg_control(&self) -> PcgControl {
        self.state.borrow().control
    }

    /// Returns the programmed conversion pulse width in ticks.
    #[must_use]
    pub fn pulse_width(&self) -> u32 {
        self.state.borrow().pulse_width
    }

    /// Returns the control word of the serial port.
    #[must_use]
    pub fn sport_control(&self) -> SportControl {
        self.state.borrow().sport
    }

    /// Returns the number of conversions so far.
    #[must_use]
    pub fn conversions(&self) -> u32 {
        self.state.borrow().conversions
    }

    /// Returns the number of words read from the serial port so far.
    #[must_use]
    pub fn words_read(&self) -> u32 {
        self.state.borrow().words_read
    }

    /// Returns the emulated time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }
}

impl Default for FrontEndEmulator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FrontEndEmulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("FrontEndEmulator")
            .field("control", &state.control)
            .field("now", &state.now)
            .field("conversions", &state.conversions)
            .field("sport", &state.sport)
            .finish_non_exhaustive()
    }
}

/// The clock generator registers of a [`FrontEndEmulator`].
#[derive(Clone)]
pub struct PcgEmulator {
    state: Rc<RefCell<State>>,
}

impl PcgRegisters for PcgEmulator {
    fn write_control(&mut self, control: PcgControl) {
        tracing::trace!("PCG control <- {:#010X}", control.bits());
        self.state.borrow_mut().control = control;
    }

    fn write_pulse_width(&mut self, ticks: u32) {
        self.state.borrow_mut().pulse_width = ticks;
    }
}

impl std::fmt::Debug for PcgEmulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PcgEmulator")
            .field(&self.state.borrow().control)
            .finish()
    }
}

/// The serial port of a [`FrontEndEmulator`].
#[derive(Clone)]
pub struct SportEmulator {
    state: Rc<RefCell<State>>,
}

impl SerialPort for SportEmulator {
    fn enable_receive(&mut self, control: SportControl) {
        self.state.borrow_mut().sport = control;
    }

    fn disable(&mut self) {
        self.state.borrow_mut().sport = SportControl::NONE;
    }

    fn is_rx_ready(&mut self) -> bool {
        self.state.borrow().rx.is_some()
    }

    fn read(&mut self) -> u32 {
        let mut state = self.state.borrow_mut();
        state.words_read += 1;
        state.rx.take().unwrap_or_default()
    }
}

impl std::fmt::Debug for SportEmulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SportEmulator")
            .field(&self.state.borrow().sport)
            .finish()
    }
}

/// The core timer of a [`FrontEndEmulator`].
#[derive(Clone)]
pub struct EmulatedClock {
    state: Rc<RefCell<State>>,
}

impl Clock for EmulatedClock {
    fn now(&self) -> Duration {
        self.state.borrow().now
    }
}

impl std::fmt::Debug for EmulatedClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("EmulatedClock")
            .field(&self.state.borrow().now)
            .finish()
    }
}
