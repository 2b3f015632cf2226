// Native audio output: a cpal stream pulling samples from the software backend.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use std::cell::RefCell;
use std::rc::Rc;
use tunnel_core::audio::SoftBackend;
use tunnel_core::AudioError;

/// Build the lazy acquirer handed to the synthesis engine. The opened stream
/// is parked in `stream_slot` so it lives as long as the app.
pub fn acquirer(
    stream_slot: Rc<RefCell<Option<cpal::Stream>>>,
) -> impl FnOnce() -> Result<SoftBackend, AudioError> {
    move || {
        let (backend, stream) = open_output()?;
        *stream_slot.borrow_mut() = Some(stream);
        Ok(backend)
    }
}

fn open_output() -> Result<(SoftBackend, cpal::Stream), AudioError> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| AudioError::Unavailable("no default output device".into()))?;
    let config = device
        .default_output_config()
        .map_err(|e| AudioError::Unavailable(e.to_string()))?;
    let channels = config.channels() as usize;
    // Suspended until the engine's first start resumes it.
    let backend = SoftBackend::new_suspended(config.sample_rate().0 as f32);
    log::info!(
        "[audio] output {} ch @ {} Hz ({:?})",
        channels,
        config.sample_rate().0,
        config.sample_format()
    );

    let err_fn = |err: cpal::StreamError| log::error!("[audio] stream error: {err}");
    let stream_config: cpal::StreamConfig = config.clone().into();
    let stream = match config.sample_format() {
        cpal::SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, channels, backend.clone(), err_fn),
        cpal::SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, channels, backend.clone(), err_fn),
        cpal::SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, channels, backend.clone(), err_fn),
        other => {
            return Err(AudioError::Unavailable(format!("unsupported sample format {other:?}")));
        }
    }
    .map_err(|e| AudioError::Unavailable(e.to_string()))?;
    stream
        .play()
        .map_err(|e| AudioError::Unavailable(e.to_string()))?;
    Ok((backend, stream))
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    backend: SoftBackend,
    err_fn: impl FnMut(cpal::StreamError) + Send + 'static,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample + FromSample<f32>,
{
    let mut scratch: Vec<f32> = Vec::new();
    device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            scratch.resize(data.len(), 0.0);
            backend.render(&mut scratch, channels);
            for (out, s) in data.iter_mut().zip(&scratch) {
                *out = T::from_sample(*s);
            }
        },
        err_fn,
        None,
    )
}
