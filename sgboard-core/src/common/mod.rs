mod freq;

use core::time::Duration;

pub use freq::*;

/// The reference voltage of the ADC pair \[V\]
pub const VREF: f32 = 2.5;

/// The number of codes of a 16-bit ADC.
pub const ADC_FULL_SCALE: f32 = 65536.0;

/// The voltage of one ADC code \[V\]
pub const VOLTS_PER_CODE: f32 = VREF / ADC_FULL_SCALE;

/// The capacity of each channel's sample buffer.
pub const MAX_SAMPLES_BUFFER_SIZE: usize = 4096;

/// The shortest conversion period the front end can follow.
///
/// Below this period conversions overlap the serial read-out and samples are lost.
pub const MIN_SAMPLE_PERIOD: Duration = Duration::from_micros(5);

/// The default conversion period (100 kS/s).
pub const DEFAULT_SAMPLE_PERIOD: Duration = Duration::from_micros(10);

/// The tick rate of the precision clock generator.
pub const PCG_TICKS_PER_MICROSECOND: u32 = 50;

/// The active-high width of the conversion pulse in clock generator ticks.
pub const CNV_PULSE_WIDTH_TICKS: u32 = 10;

/// The number of status polls before a transport operation gives up.
pub const USB_READ_TIMEOUT: u32 = 10_000;

/// The sentinel byte that starts every host packet.
pub const START_OF_PACKET: u8 = 0xAA;

/// The number of header bytes preceding a packet payload (sentinel + 2-byte size).
pub const PACKET_HEADER_SIZE: usize = 3;

/// The largest payload a packet size field can describe.
pub const MAX_PACKET_SIZE: usize = u16::MAX as usize;

/// The system clock of the synthesizers (1200 × `ADC_FS`).
pub const DDS_SYSTEM_CLOCK: Freq<u32> = Freq {
    freq: 1200 * 100_000,
};

#[doc(hidden)]
pub const DDS_PHASE_BITS: u32 = 5;
