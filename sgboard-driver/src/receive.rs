use derive_more::Display;
use sgboard_core::{error::ReceiveError, retry::Retry, sample::RawSample, sleep::Sleep};

/// Control word of the serial port.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(C)]
pub struct SportControl(u32);

bitflags::bitflags! {
    impl SportControl : u32 {
        /// No bits set.
        const NONE   = 0;
        /// Enables the A channel.
        const SPEN_A = 1 << 0;
        /// 32-bit word length.
        const SLEN32 = 0x1F << 4;
        /// Internal clock.
        const ICLK   = 1 << 10;
        /// Samples data on the rising clock edge.
        const CKRE   = 1 << 12;
        /// Frame sync required.
        const FSR    = 1 << 13;
        /// Internal frame sync.
        const IFS    = 1 << 14;
    }
}

impl SportControl {
    /// The configuration used to shift in one packed sample: internal frame sync and clock,
    /// falling edge, 32-bit word.
    pub const RECEIVE_SAMPLE: SportControl = SportControl::IFS
        .union(SportControl::ICLK)
        .union(SportControl::SLEN32)
        .union(SportControl::SPEN_A);
}

/// The serial port wired to the ADC pair.
pub trait SerialPort {
    /// Enables the receiver with `control`.
    fn enable_receive(&mut self, control: SportControl);

    /// Disables the port.
    fn disable(&mut self);

    /// Returns `true` if the receive buffer holds a complete word.
    fn is_rx_ready(&mut self) -> bool;

    /// Pops the word from the receive buffer.
    fn read(&mut self) -> u32;
}

impl<P: SerialPort + ?Sized> SerialPort for &mut P {
    fn enable_receive(&mut self, control: SportControl) {
        P::enable_receive(self, control)
    }

    fn disable(&mut self) {
        P::disable(self)
    }

    fn is_rx_ready(&mut self) -> bool {
        P::is_rx_ready(self)
    }

    fn read(&mut self) -> u32 {
        P::read(self)
    }
}

/// An interrupt of the acquisition chain, highest priority first.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveEvent {
    /// The clock generator asserted a conversion.
    #[display("trigger edge")]
    TriggerEdge,
    /// The busy indicator of the ADC pair signals that a word is ready to be shifted out.
    #[display("frame sync")]
    FrameSync,
    /// The serial port finished shifting in a word.
    #[display("receive complete")]
    ReceiveComplete,
}

/// The state of the serial receive path.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReceiveState {
    /// The serial port is disabled.
    #[default]
    Idle,
    /// A conversion is in progress; waiting for the ADC pair to become ready.
    AwaitingFrame,
    /// The serial port is shifting in the word.
    Receiving,
    /// A word was read; the port is being disabled.
    SampleReady,
}

/// Serial receive state machine.
///
/// Each interrupt is fed into [`SerialReceiver::dispatch`]. The shift register is only enabled
/// between the frame sync and the receive-complete interrupt, so bits clocked while the ADC pair
/// is converting never reach the receive buffer. After every word the receiver disarms itself;
/// the owner re-arms it before the next trigger edge.
#[derive(Debug)]
pub struct SerialReceiver<P: SerialPort> {
    port: P,
    state: ReceiveState,
    armed: bool,
    rx_retry: Retry,
}

impl<P: SerialPort> SerialReceiver<P> {
    /// Creates a new idle [`SerialReceiver`].
    ///
    /// `rx_retry` bounds the wait for the receive buffer after the receive-complete interrupt.
    #[must_use]
    pub const fn new(port: P, rx_retry: Retry) -> Self {
        Self {
            port,
            state: ReceiveState::Idle,
            armed: false,
            rx_retry,
        }
    }

    /// Accepts the next trigger edge.
    pub fn arm(&mut self) {
        self.armed = true;
    }

    /// Disables the port and drops any word in flight.
    pub fn disarm(&mut self) {
        self.armed = false;
        if self.state != ReceiveState::Idle {
            tracing::debug!("receiver disarmed in {}", self.state);
        }
        self.port.disable();
        self.state = ReceiveState::Idle;
    }

    /// Returns `true` if the next trigger edge will be accepted.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.armed
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> ReceiveState {
        self.state
    }

    /// Returns the serial port.
    #[must_use]
    pub const fn port(&self) -> &P {
        &self.port
    }

    /// Returns the serial port.
    #[must_use]
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Feeds one interrupt into the state machine.
    ///
    /// Returns the received word on [`ReceiveEvent::ReceiveComplete`]. Events that do not match
    /// the current state are logged and ignored.
    pub fn dispatch<S: Sleep>(
        &mut self,
        event: ReceiveEvent,
        sleeper: &S,
    ) -> Result<Option<RawSample>, ReceiveError> {
        tracing::trace!("receiver: {} in {}", event, self.state);
        match (self.state, event) {
            (ReceiveState::Idle, ReceiveEvent::TriggerEdge) => {
                if self.armed {
                    self.state = ReceiveState::AwaitingFrame;
                } else {
                    tracing::trace!("trigger edge ignored, receiver not armed");
                }
                Ok(None)
            }
            (ReceiveState::AwaitingFrame, ReceiveEvent::FrameSync) => {
                self.port.enable_receive(SportControl::RECEIVE_SAMPLE);
                self.state = ReceiveState::Receiving;
                Ok(None)
            }
            (ReceiveState::Receiving, ReceiveEvent::ReceiveComplete) => {
                let port = &mut self.port;
                if !self.rx_retry.poll(sleeper, || port.is_rx_ready()) {
                    tracing::error!("receive buffer empty after receive-complete interrupt");
                    self.armed = false;
                    self.port.disable();
                    self.state = ReceiveState::Idle;
                    return Err(ReceiveError::RxTimeout);
                }
                let sample = RawSample(self.port.read());
                self.state = ReceiveState::SampleReady;
                self.port.disable();
                self.armed = false;
                self.state = ReceiveState::Idle;
                Ok(Some(sample))
            }
            (state, event) => {
                tracing::warn!("spurious {} in {}", event, state);
                Ok(None)
            }
        }
    }
}
