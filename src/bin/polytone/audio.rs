use color_eyre::eyre::{eyre, Result, WrapErr};
use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig, SupportedStreamConfig,
};
use log::error;
use polytone::BlockReader;

pub struct OutputDevice {
    device: cpal::Device,
    config: SupportedStreamConfig,
}

impl OutputDevice {
    pub fn open_default() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;
        Ok(Self { device, config })
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate().0
    }

    /// Start a stream fed by `reader`. Audio stops when the stream is dropped.
    pub fn play(self, reader: BlockReader) -> Result<Stream> {
        let format = self.config.sample_format();
        let config: StreamConfig = self.config.into();

        let stream = match format {
            SampleFormat::F32 => build::<f32>(&self.device, &config, reader),
            SampleFormat::I16 => build::<i16>(&self.device, &config, reader),
            SampleFormat::U16 => build::<u16>(&self.device, &config, reader),
            SampleFormat::I32 => build::<i32>(&self.device, &config, reader),
            other => Err(eyre!("unsupported sample format {other:?}")),
        }?;
        stream.play().wrap_err("failed to start output stream")?;
        Ok(stream)
    }
}

fn build<T>(device: &cpal::Device, config: &StreamConfig, mut reader: BlockReader) -> Result<Stream>
where
    T: SizedSample + FromSample<i16>,
{
    let channels = config.channels as usize;
    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                for frame in data.chunks_mut(channels) {
                    let (l, r) = reader.next_frame();
                    if let [mono] = frame {
                        *mono = T::from_sample(((l as i32 + r as i32) / 2) as i16);
                        continue;
                    }
                    for (i, sample) in frame.iter_mut().enumerate() {
                        *sample = match i {
                            0 => T::from_sample(l),
                            1 => T::from_sample(r),
                            _ => T::EQUILIBRIUM,
                        };
                    }
                }
            },
            |err| error!("audio stream error: {err}"),
            None,
        )
        .wrap_err("failed to build output stream")
}
