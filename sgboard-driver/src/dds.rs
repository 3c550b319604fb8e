use sgboard_core::{
    dds::{Dds, DdsChannel, DdsSettings},
    error::DdsError,
};

/// Programs the three synthesizers.
///
/// The synthesizers are reset twice, then all channels are loaded and latched by a single update
/// pulse, so the excitation and the local oscillators start phase aligned.
#[tracing::instrument(level = "debug", skip(dds))]
pub fn init_synthesizers<D: Dds>(dds: &mut D, settings: &DdsSettings) -> Result<(), DdsError> {
    dds.reset()?;
    dds.reset()?;
    dds.set_current_scale(settings.current_scale)?;
    DdsChannel::ALL.into_iter().try_for_each(|ch| {
        let word = settings.tuning_word(ch);
        let control = settings.control_byte(ch);
        tracing::debug!(
            "{}: {:?} (word = {:#010X}, control = {:#04X})",
            ch,
            settings.channel(ch).frequency,
            word,
            control.into_bits()
        );
        dds.set_frequency_phase(ch, word, control)
    })?;
    dds.update()
}
