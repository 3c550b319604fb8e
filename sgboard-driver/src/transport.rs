use sgboard_core::{
    common::{MAX_PACKET_SIZE, START_OF_PACKET},
    error::{TransportError, TransportStage},
    link::{FifoBus, FifoStatus},
    retry::Retry,
    sleep::Sleep,
};

/// The option of [`Transport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransportOption {
    /// The budget of every status poll.
    pub retry: Retry,
}

/// Flow-controlled byte transport to the host.
///
/// Every byte transfer is preceded by a bounded status poll, so a stalled host can delay the
/// firmware by at most one retry budget per byte but never hang it.
#[derive(Debug)]
pub struct Transport<B: FifoBus, S: Sleep> {
    bus: B,
    sleeper: S,
    option: TransportOption,
}

impl<B: FifoBus, S: Sleep> Transport<B, S> {
    /// Creates a new [`Transport`].
    #[must_use]
    pub const fn new(bus: B, sleeper: S, option: TransportOption) -> Self {
        Self {
            bus,
            sleeper,
            option,
        }
    }

    /// Returns the underlying bus.
    #[must_use]
    pub const fn bus(&self) -> &B {
        &self.bus
    }

    /// Returns the underlying bus.
    #[must_use]
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Returns the option.
    #[must_use]
    pub const fn option(&self) -> &TransportOption {
        &self.option
    }

    fn poll(&mut self, retry: Retry, flag: FifoStatus) -> bool {
        let bus = &mut self.bus;
        retry.poll(&self.sleeper, || bus.status().contains(flag))
    }

    /// Polls until the transmit FIFO can accept a byte. Returns `false` on timeout.
    pub fn poll_space_available(&mut self, retry: Retry) -> bool {
        self.poll(retry, FifoStatus::SPACE_AVAILABLE)
    }

    /// Polls until the receive FIFO holds a byte. Returns `false` on timeout.
    pub fn poll_data_available(&mut self, retry: Retry) -> bool {
        self.poll(retry, FifoStatus::DATA_AVAILABLE)
    }

    /// Pops one byte. Only valid after [`Transport::poll_data_available`] succeeded.
    pub fn read_byte(&mut self) -> u8 {
        self.bus.read()
    }

    /// Pushes one byte. Only valid after [`Transport::poll_space_available`] succeeded.
    pub fn write_byte(&mut self, byte: u8) {
        self.bus.write(byte)
    }

    /// Discards every byte the host has queued.
    ///
    /// Ends at the first poll that times out and returns the number of bytes discarded.
    pub fn purge(&mut self) -> usize {
        let retry = self.option.retry;
        let mut discarded = 0;
        while self.poll_data_available(retry) {
            self.read_byte();
            discarded += 1;
        }
        if discarded > 0 {
            tracing::debug!("purged {} stale bytes", discarded);
        }
        discarded
    }

    fn read_guarded(&mut self, stage: TransportStage) -> Result<u8, TransportError> {
        if !self.poll_data_available(self.option.retry) {
            tracing::error!("transport timed out waiting for {}", stage);
            return Err(TransportError::Timeout(stage));
        }
        Ok(self.read_byte())
    }

    fn write_guarded(&mut self, byte: u8) -> Result<(), TransportError> {
        if !self.poll_space_available(self.option.retry) {
            tracing::error!("transport timed out while writing");
            return Err(TransportError::Timeout(TransportStage::Write));
        }
        self.write_byte(byte);
        Ok(())
    }

    /// Returns `true` if `byte` is the start-of-packet sentinel.
    #[must_use]
    pub const fn is_packet_start(byte: u8) -> bool {
        byte == START_OF_PACKET
    }

    /// Reads one byte and returns whether it is the start-of-packet sentinel.
    pub fn read_start_of_packet(&mut self) -> Result<bool, TransportError> {
        let byte = self.read_guarded(TransportStage::StartOfPacket)?;
        Ok(Self::is_packet_start(byte))
    }

    /// Reads the 2-byte big-endian payload size.
    pub fn read_packet_size(&mut self) -> Result<u16, TransportError> {
        let msb = self.read_guarded(TransportStage::PacketSize)?;
        let lsb = self.read_guarded(TransportStage::PacketSize)?;
        Ok(u16::from_be_bytes([msb, lsb]))
    }

    /// Reads `len` payload bytes into the front of `buf`.
    ///
    /// On a timeout the bytes read so far stay in `buf`; the rest of `buf` is untouched.
    pub fn read_payload(&mut self, len: usize, buf: &mut [u8]) -> Result<(), TransportError> {
        if len > buf.len() {
            return Err(TransportError::BufferTooSmall {
                required: len,
                capacity: buf.len(),
            });
        }
        buf[..len]
            .iter_mut()
            .try_for_each(|b| -> Result<(), TransportError> {
                *b = self.read_guarded(TransportStage::Payload)?;
                Ok(())
            })
    }

    /// Reads a complete packet and returns the payload length.
    ///
    /// Any failing step aborts the whole read.
    #[tracing::instrument(level = "debug", skip(self, buf))]
    pub fn read_packet(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let header = self.read_guarded(TransportStage::StartOfPacket)?;
        if !Self::is_packet_start(header) {
            tracing::warn!("unexpected packet header {:#04X}", header);
            return Err(TransportError::UnexpectedHeader(header));
        }
        let len = self.read_packet_size()? as usize;
        tracing::debug!("packet size: {}", len);
        self.read_payload(len, buf)?;
        Ok(len)
    }

    /// Writes every byte of `data`.
    pub fn write_buffer(&mut self, data: &[u8]) -> Result<(), TransportError> {
        data.iter().try_for_each(|&b| self.write_guarded(b))
    }

    /// Writes each word as 4 bytes, least significant byte first.
    pub fn send_words(&mut self, words: impl IntoIterator<Item = u32>) -> Result<(), TransportError> {
        words
            .into_iter()
            .try_for_each(|w| self.write_buffer(&w.to_le_bytes()))
    }

    /// Writes each sample as the 4 bytes of its IEEE 754 bit pattern, least significant byte
    /// first.
    pub fn send_samples(
        &mut self,
        samples: impl IntoIterator<Item = f32>,
    ) -> Result<(), TransportError> {
        self.send_words(samples.into_iter().map(f32::to_bits))
    }

    /// Writes the header of a packet whose payload is `len` bytes long.
    pub fn write_packet_header(&mut self, len: usize) -> Result<(), TransportError> {
        let size = u16::try_from(len).map_err(|_| TransportError::PayloadTooLarge(len))?;
        self.write_guarded(START_OF_PACKET)?;
        self.write_buffer(&size.to_be_bytes())
    }

    /// Writes a complete packet.
    #[tracing::instrument(level = "debug", skip(self, payload), fields(len = payload.len()))]
    pub fn write_packet(&mut self, payload: &[u8]) -> Result<(), TransportError> {
        if payload.len() > MAX_PACKET_SIZE {
            return Err(TransportError::PayloadTooLarge(payload.len()));
        }
        self.write_packet_header(payload.len())?;
        self.write_buffer(payload)
    }
}
