use std::fs::File;
use std::path::Path;

use hound::{SampleFormat, WavSpec};
use image::{ColorType, DynamicImage, GrayImage};
use log::{debug, info};
use sonify_core::pcm::{first_channel, from_pcm16, to_pcm16};
use sonify_core::{IntensityGrid, Raster};

use crate::CliError;

/// Mono audio as read from disk
pub struct Audio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// Write mono samples as 16-bit PCM
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<(), CliError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let file = File::create(path)?;
    let mut writer = hound::WavWriter::new(file, spec)?;
    for sample in to_pcm16(samples) {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;

    info!(
        "Wrote {} samples ({:.2}s) to {}",
        samples.len(),
        samples.len() as f64 / sample_rate as f64,
        path.display()
    );
    Ok(())
}

/// Read a WAV file, keeping only the first channel
pub fn read_wav(path: &Path) -> Result<Audio, CliError> {
    let file = File::open(path)?;
    let mut reader = hound::WavReader::new(file)?;

    let spec = reader.spec();
    info!(
        "Read WAV: {} Hz, {} channels, {} bits",
        spec.sample_rate, spec.channels, spec.bits_per_sample
    );

    // Handle 16/24-bit integer and 32-bit float formats
    let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, 16) => {
            let int_samples: Result<Vec<i16>, _> = reader.samples::<i16>().collect();
            from_pcm16(&int_samples?)
        }
        (SampleFormat::Int, 24) => {
            let int_samples: Result<Vec<i32>, _> = reader.samples::<i32>().collect();
            int_samples?.into_iter().map(|s| s as f32 / 8_388_608.0).collect()
        }
        (SampleFormat::Float, 32) => {
            let float_samples: Result<Vec<f32>, _> = reader.samples::<f32>().collect();
            float_samples?
        }
        (format, bits) => {
            return Err(CliError::UnsupportedAudio(format!("{:?} {}-bit", format, bits)));
        }
    };

    let samples = first_channel(&interleaved, spec.channels as usize);
    debug!("Extracted {} mono samples", samples.len());

    Ok(Audio {
        samples,
        sample_rate: spec.sample_rate,
    })
}

/// Convert a decoded image into a raster, keeping grayscale images single-channel
pub fn to_raster(img: DynamicImage) -> Result<Raster, CliError> {
    let (width, height) = (img.width() as usize, img.height() as usize);
    let (channels, data) = match img.color() {
        ColorType::L8 | ColorType::L16 => (1, img.into_luma8().into_raw()),
        ColorType::La8 | ColorType::La16 => (2, img.into_luma_alpha8().into_raw()),
        ColorType::Rgb8 | ColorType::Rgb16 | ColorType::Rgb32F => (3, img.into_rgb8().into_raw()),
        _ => (4, img.into_rgba8().into_raw()),
    };
    Ok(Raster::new(width, height, channels, data)?)
}

pub fn load_raster(path: &Path) -> Result<Raster, CliError> {
    let img = image::open(path)?;
    info!("Loaded {}x{} image ({:?})", img.width(), img.height(), img.color());
    to_raster(img)
}

pub fn save_grid(path: &Path, grid: &IntensityGrid) -> Result<(), CliError> {
    let img = GrayImage::from_raw(grid.width() as u32, grid.height() as u32, grid.values().to_vec())
        .ok_or_else(|| CliError::Usage("grid does not match its dimensions".into()))?;
    img.save(path)?;
    info!("Wrote {}x{} image to {}", grid.width(), grid.height(), path.display());
    Ok(())
}
