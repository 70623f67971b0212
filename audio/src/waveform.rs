/// Decoded audio held as one f32 buffer per channel.
///
/// Samples are nominally in `[-1.0, 1.0]`. All channels have the same
/// length; [`Waveform::frames`] is that length.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl Waveform {
    /// Creates a waveform from de-interleaved channel buffers.
    ///
    /// Channels shorter than the longest one are padded with silence.
    pub fn new(sample_rate: u32, mut channels: Vec<Vec<f32>>) -> Self {
        let frames = channels.iter().map(Vec::len).max().unwrap_or(0);
        for ch in &mut channels {
            ch.resize(frames, 0.0);
        }
        Self {
            sample_rate,
            channels,
        }
    }

    /// Creates a single-channel waveform.
    pub fn mono(sample_rate: u32, samples: Vec<f32>) -> Self {
        Self {
            sample_rate,
            channels: vec![samples],
        }
    }

    /// Creates a waveform from interleaved samples.
    pub fn from_interleaved(sample_rate: u32, channel_count: usize, interleaved: &[f32]) -> Self {
        let channel_count = channel_count.max(1);
        let frames = interleaved.len() / channel_count;
        let mut channels = vec![Vec::with_capacity(frames); channel_count];
        for (i, &s) in interleaved.iter().enumerate() {
            channels[i % channel_count].push(s);
        }
        Self::new(sample_rate, channels)
    }

    /// Returns the sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Returns the number of channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Returns the per-channel sample buffers.
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Returns the number of sample frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.channels.first().map(Vec::len).unwrap_or(0)
    }

    /// Returns true if the waveform holds no samples.
    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }

    /// Returns the duration in seconds, or 0 when the sample rate is 0.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Downmixes to a single channel by averaging all channels per frame.
    pub fn to_mono(&self) -> Vec<f32> {
        match self.channels.len() {
            0 => Vec::new(),
            1 => self.channels[0].clone(),
            n => {
                let scale = 1.0 / n as f32;
                (0..self.frames())
                    .map(|i| self.channels.iter().map(|ch| ch[i]).sum::<f32>() * scale)
                    .collect()
            }
        }
    }
}
