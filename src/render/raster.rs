use image::{ImageBuffer, Luma};

use crate::error::Result;

/// Row-major label mask. Each cell holds a class index; 0 is unlabeled.
///
/// Produced fresh for every image and dropped once its statistics are read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassIndexRaster {
    height: usize,
    width: usize,
    data: Vec<u32>,
}

impl ClassIndexRaster {
    pub fn zeros(height: usize, width: usize) -> ClassIndexRaster {
        ClassIndexRaster { height, width, data: vec![0; height * width] }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.data
    }

    pub fn get(&self, row: usize, col: usize) -> u32 {
        self.data[row * self.width + col]
    }

    /// Writes one pixel; coordinates outside the raster are ignored.
    pub fn put(&mut self, row: i64, col: i64, value: u32) {
        if row < 0 || col < 0 {
            return;
        }
        let (row, col) = (row as usize, col as usize);
        if row < self.height && col < self.width {
            self.data[row * self.width + col] = value;
        }
    }

    /// Writes `value` to columns `first..=last` of `row`, clipped to bounds.
    pub fn fill_span(&mut self, row: i64, first: i64, last: i64, value: u32) {
        if row < 0 || row as usize >= self.height || self.width == 0 {
            return;
        }
        let first = first.max(0);
        let last = last.min(self.width as i64 - 1);
        if first > last {
            return;
        }
        let start = row as usize * self.width;
        self.data[start + first as usize..=start + last as usize].fill(value);
    }

    /// Counts pixels per index in one pass. Slot 0 is unlabeled; values above
    /// `max_index` are not counted.
    pub fn pixel_counts(&self, max_index: usize) -> Vec<u64> {
        let mut counts = vec![0u64; max_index + 1];
        for &v in &self.data {
            if let Some(slot) = counts.get_mut(v as usize) {
                *slot += 1;
            }
        }
        counts
    }

    /// 16-bit grayscale view of the mask, for inspection.
    pub fn to_luma_image(&self) -> ImageBuffer<Luma<u16>, Vec<u16>> {
        let pixels = self.data.iter().map(|&v| v.min(u16::MAX as u32) as u16).collect();
        // Buffer length always equals width * height.
        ImageBuffer::from_raw(self.width as u32, self.height as u32, pixels)
            .unwrap_or_else(|| ImageBuffer::new(self.width as u32, self.height as u32))
    }

    pub fn save_png(&self, path: &str) -> Result<()> {
        self.to_luma_image().save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }
}
