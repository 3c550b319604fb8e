use std::collections::VecDeque;

use sgboard_core::{
    common::{PACKET_HEADER_SIZE, START_OF_PACKET},
    link::{FifoBus, FifoStatus},
};

/// Emulator of the USB FIFO bridge.
///
/// The host side writes into the receive queue and drains the transmit queue. Either direction
/// can be stalled to exercise the poll timeouts.
#[derive(Debug, Default, Clone)]
pub struct UsbFifoEmulator {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    rx_stalled: bool,
    tx_stalled: bool,
}

impl UsbFifoEmulator {
    /// Creates a new empty [`UsbFifoEmulator`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues bytes sent by the host.
    pub fn host_write(&mut self, data: &[u8]) {
        self.rx.extend(data);
    }

    /// Queues a packet sent by the host.
    pub fn host_write_packet(&mut self, payload: &[u8]) {
        self.rx.push_back(START_OF_PACKET);
        self.rx.extend((payload.len() as u16).to_be_bytes());
        self.rx.extend(payload);
    }

    /// Drains every byte the board wrote.
    pub fn host_read(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.tx)
    }

    /// Drains one packet the board wrote and returns its payload.
    ///
    /// Returns `None` if the transmit queue does not start with a complete packet.
    pub fn host_read_packet(&mut self) -> Option<Vec<u8>> {
        let (&[sop, hi, lo], rest) = self.tx.split_first_chunk::<PACKET_HEADER_SIZE>()?;
        if sop != START_OF_PACKET {
            return None;
        }
        let len = u16::from_be_bytes([hi, lo]) as usize;
        if rest.len() < len {
            return None;
        }
        let payload = rest[..len].to_vec();
        self.tx.drain(..PACKET_HEADER_SIZE + len);
        Some(payload)
    }

    /// Returns the bytes the board wrote so far.
    #[must_use]
    pub fn tx(&self) -> &[u8] {
        &self.tx
    }

    /// Returns the number of host bytes not yet read by the board.
    #[must_use]
    pub fn rx_len(&self) -> usize {
        self.rx.len()
    }

    /// Hides the receive queue from the board.
    pub fn stall_rx(&mut self, stalled: bool) {
        self.rx_stalled = stalled;
    }

    /// Reports the transmit queue as full.
    pub fn stall_tx(&mut self, stalled: bool) {
        self.tx_stalled = stalled;
    }
}

impl FifoBus for UsbFifoEmulator {
    fn status(&mut self) -> FifoStatus {
        let mut status = FifoStatus::NONE;
        if !self.rx_stalled && !self.rx.is_empty() {
            status |= FifoStatus::DATA_AVAILABLE;
        }
        if !self.tx_stalled {
            status |= FifoStatus::SPACE_AVAILABLE;
        }
        status
    }

    fn read(&mut self) -> u8 {
        self.rx.pop_front().unwrap_or_default()
    }

    fn write(&mut self, byte: u8) {
        self.tx.push(byte);
    }
}
