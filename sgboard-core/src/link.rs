/// Status bits of the host bridge FIFO.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(C)]
pub struct FifoStatus(u8);

bitflags::bitflags! {
    impl FifoStatus : u8 {
        /// No bits set.
        const NONE            = 0;
        /// The receive FIFO holds at least one byte from the host.
        const DATA_AVAILABLE  = 1 << 0;
        /// The transmit FIFO can accept at least one byte.
        const SPACE_AVAILABLE = 1 << 1;
    }
}

impl core::fmt::Display for FifoStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let data = if self.contains(Self::DATA_AVAILABLE) {
            "RXF"
        } else {
            "-"
        };
        let space = if self.contains(Self::SPACE_AVAILABLE) {
            "TXE"
        } else {
            "-"
        };
        write!(f, "{data}|{space}")
    }
}

/// A parallel FIFO bridge to the host.
///
/// The bus is a pair of independent byte queues. Neither [`FifoBus::read`] nor [`FifoBus::write`]
/// waits: callers must observe the corresponding [`FifoStatus`] bit first.
pub trait FifoBus {
    /// Reads the status register.
    fn status(&mut self) -> FifoStatus;

    /// Pops one byte from the receive FIFO.
    fn read(&mut self) -> u8;

    /// Pushes one byte into the transmit FIFO.
    fn write(&mut self, byte: u8);
}

impl<B: FifoBus + ?Sized> FifoBus for &mut B {
    fn status(&mut self) -> FifoStatus {
        B::status(self)
    }

    fn read(&mut self) -> u8 {
        B::read(self)
    }

    fn write(&mut self, byte: u8) {
        B::write(self, byte)
    }
}
