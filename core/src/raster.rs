use log::debug;

use crate::error::{Result, SonifyError};
use crate::mapping::FrequencyMap;
use crate::range::FrequencyRange;
use crate::RASTER_MAX_DIMENSION;

/// Decoded image as supplied by the content source: row-major, interleaved
/// channels (1 = gray, 2 = gray+alpha, 3 = RGB, 4 = RGBA)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: usize,
    height: usize,
    channels: usize,
    data: Vec<u8>,
}

impl Raster {
    pub fn new(width: usize, height: usize, channels: usize, data: Vec<u8>) -> Result<Self> {
        if !(1..=4).contains(&channels) {
            return Err(SonifyError::InvalidRaster(format!(
                "unsupported channel count {}",
                channels
            )));
        }
        let expected = width * height * channels;
        if data.len() != expected {
            return Err(SonifyError::InvalidRaster(format!(
                "expected {} bytes for {}x{}x{}, got {}",
                expected,
                width,
                height,
                channels,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Single-channel intensity using ITU-R 601 luma weights; alpha is ignored
    pub fn to_intensity(&self) -> IntensityGrid {
        let values = self
            .data
            .chunks_exact(self.channels)
            .map(|px| match px.len() {
                1 | 2 => px[0],
                _ => luma(px[0], px[1], px[2]),
            })
            .collect();

        IntensityGrid {
            width: self.width,
            height: self.height,
            values,
        }
    }
}

/// L = R * 299/1000 + G * 587/1000 + B * 114/1000, in 16-bit fixed point
fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16) as u8
}

/// Row-major grid of 0-255 intensities
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntensityGrid {
    width: usize,
    height: usize,
    values: Vec<u8>,
}

impl IntensityGrid {
    pub fn new(width: usize, height: usize, values: Vec<u8>) -> Result<Self> {
        if values.len() != width * height {
            return Err(SonifyError::InvalidRaster(format!(
                "expected {} values for {}x{}, got {}",
                width * height,
                width,
                height,
                values.len()
            )));
        }
        Ok(Self {
            width,
            height,
            values,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn values(&self) -> &[u8] {
        &self.values
    }

    pub fn into_values(self) -> Vec<u8> {
        self.values
    }

    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.values[y * self.width + x]
    }

    /// Area-average resample so neither edge exceeds `max_dimension`, keeping the
    /// aspect ratio. Grids already within bounds are returned unchanged.
    pub fn downsample(&self, max_dimension: usize) -> IntensityGrid {
        if self.values.is_empty() {
            return self.clone();
        }
        let (new_width, new_height) = bounded_size(self.width, self.height, max_dimension);
        if (new_width, new_height) == (self.width, self.height) {
            return self.clone();
        }

        let span = |i: usize, new_len: usize, old_len: usize| {
            let start = i * old_len / new_len;
            let end = ((i + 1) * old_len / new_len).max(start + 1);
            start..end
        };

        let mut values = Vec::with_capacity(new_width * new_height);
        for oy in 0..new_height {
            let rows = span(oy, new_height, self.height);
            for ox in 0..new_width {
                let cols = span(ox, new_width, self.width);
                let mut total = 0u64;
                let mut count = 0u64;
                for y in rows.clone() {
                    for x in cols.clone() {
                        total += self.get(x, y) as u64;
                        count += 1;
                    }
                }
                values.push(((total as f64) / (count as f64)).round() as u8);
            }
        }

        IntensityGrid {
            width: new_width,
            height: new_height,
            values,
        }
    }
}

/// Dimensions after fitting `width` x `height` into a `max_dimension` square
pub fn bounded_size(width: usize, height: usize, max_dimension: usize) -> (usize, usize) {
    if width <= max_dimension && height <= max_dimension {
        return (width, height);
    }
    let scale = (max_dimension as f64 / width as f64).min(max_dimension as f64 / height as f64);
    let fit = |len: usize| ((len as f64 * scale).round() as usize).clamp(1, max_dimension);
    (fit(width), fit(height))
}

/// Converts intensity grids to frequency sequences and back
pub struct RasterMap {
    max_dimension: usize,
}

impl RasterMap {
    pub fn new() -> Self {
        Self {
            max_dimension: RASTER_MAX_DIMENSION,
        }
    }

    pub fn with_max_dimension(max_dimension: usize) -> Result<Self> {
        if max_dimension == 0 {
            return Err(SonifyError::InvalidConfig("raster max dimension must be positive".into()));
        }
        Ok(Self { max_dimension })
    }

    /// Grid dimensions that `raster_to_frequencies` will actually encode
    pub fn encoded_size(&self, grid: &IntensityGrid) -> (usize, usize) {
        bounded_size(grid.width(), grid.height(), self.max_dimension)
    }

    /// Downsample if needed, then map each intensity in row-major order into the band
    pub fn raster_to_frequencies(&self, grid: &IntensityGrid, range: &FrequencyRange) -> Result<Vec<f64>> {
        if grid.width() == 0 || grid.height() == 0 {
            return Err(SonifyError::EmptyInput);
        }
        range.validate()?;
        let bounded = grid.downsample(self.max_dimension);
        let map = FrequencyMap::intensity(range);

        debug!(
            "Mapping {}x{} grid (from {}x{}) into {:.0}-{:.0} Hz",
            bounded.width(),
            bounded.height(),
            grid.width(),
            grid.height(),
            range.min,
            range.max
        );
        Ok(bounded.values().iter().map(|&v| map.to_frequency(v as f64)).collect())
    }

    /// Inverse mapping; short sequences are padded with intensity 0 and long ones
    /// truncated to `width * height`
    pub fn frequencies_to_raster(
        &self,
        frequencies: &[f64],
        width: usize,
        height: usize,
        range: &FrequencyRange,
    ) -> Result<IntensityGrid> {
        range.validate()?;
        let map = FrequencyMap::intensity(range);
        let expected = width * height;

        if frequencies.len() != expected {
            debug!(
                "Fitting {} frequencies into a {}x{} grid",
                frequencies.len(),
                width,
                height
            );
        }

        let mut values: Vec<u8> = frequencies
            .iter()
            .take(expected)
            .map(|&freq| map.to_ordinal(freq) as u8)
            .collect();
        values.resize(expected, 0);

        IntensityGrid::new(width, height, values)
    }
}

impl Default for RasterMap {
    fn default() -> Self {
        Self::new()
    }
}
