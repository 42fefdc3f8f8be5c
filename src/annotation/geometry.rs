use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Vector geometry of one shape, in pixel coordinates of its image.
///
/// Points are `[x, y]` pairs, i.e. `[col, row]`. Pixel `(row, col)` covers the
/// unit square `[col, col + 1) x [row, row + 1)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "geometryType", rename_all = "snake_case")]
pub enum Geometry {
    /// Filled polygon with optional holes. Rings need not be closed.
    Polygon {
        exterior: Vec<[f64; 2]>,
        #[serde(default)]
        interior: Vec<Vec<[f64; 2]>>,
    },
    /// Axis-aligned box with inclusive pixel bounds.
    Rectangle { top: i64, left: i64, bottom: i64, right: i64 },
    /// Binary mask placed at `origin` (`[x, y]` of its top-left pixel).
    Bitmap { origin: [i64; 2], mask: BitMask },
    /// Open 1-pixel-wide line through the points.
    Polyline { points: Vec<[f64; 2]> },
    /// A single pixel.
    Point { x: i64, y: i64 },
}

impl Geometry {
    pub fn kind(&self) -> &'static str {
        match self {
            Geometry::Polygon { .. } => "polygon",
            Geometry::Rectangle { .. } => "rectangle",
            Geometry::Bitmap { .. } => "bitmap",
            Geometry::Polyline { .. } => "polyline",
            Geometry::Point { .. } => "point",
        }
    }
}

/// Row-major binary mask.
///
/// Serialized as run-length counts over the row-major pixel sequence,
/// starting with a (possibly empty) run of unset pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RleMask", into = "RleMask")]
pub struct BitMask {
    height: usize,
    width: usize,
    bits: Vec<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RleMask {
    height: usize,
    width: usize,
    counts: Vec<u32>,
}

impl BitMask {
    pub fn new(height: usize, width: usize, bits: Vec<bool>) -> Result<BitMask> {
        if bits.len() != height * width {
            return Err(Error::Config(format!(
                "bitmap has {} cells, expected {}x{}",
                bits.len(),
                height,
                width
            )));
        }
        Ok(BitMask { height, width, bits })
    }

    /// Builds a mask from rows of `'0'`/`'1'`-like characters; any char other
    /// than `'0'`, `'.'` or a space is set.
    pub fn from_rows(rows: &[&str]) -> Result<BitMask> {
        let height = rows.len();
        let width = rows.first().map(|r| r.chars().count()).unwrap_or(0);
        let mut bits = Vec::with_capacity(height * width);
        for row in rows {
            if row.chars().count() != width {
                return Err(Error::Config("bitmap rows differ in length".into()));
            }
            bits.extend(row.chars().map(|c| !matches!(c, '0' | '.' | ' ')));
        }
        BitMask::new(height, width, bits)
    }

    /// Decodes PNG bytes; a pixel is set when its luma is nonzero.
    pub fn from_png_bytes(bytes: &[u8]) -> Result<BitMask> {
        let img = image::load_from_memory(bytes)?;
        let gray = img.to_luma8();
        let (width, height) = gray.dimensions();
        let bits = gray.pixels().map(|p| p.0[0] != 0).collect();
        BitMask::new(height as usize, width as usize, bits)
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn get(&self, row: usize, col: usize) -> bool {
        self.bits[row * self.width + col]
    }

    pub fn count_set(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    fn to_counts(&self) -> Vec<u32> {
        let mut counts = Vec::new();
        let mut current = false;
        let mut run: u32 = 0;
        for &bit in &self.bits {
            if bit != current {
                counts.push(run);
                run = 0;
                current = bit;
            }
            run += 1;
        }
        counts.push(run);
        counts
    }
}

impl TryFrom<RleMask> for BitMask {
    type Error = String;

    fn try_from(rle: RleMask) -> std::result::Result<Self, Self::Error> {
        let n = rle.height * rle.width;
        let mut bits = Vec::with_capacity(n);
        let mut value = false;
        for &c in &rle.counts {
            bits.extend(std::iter::repeat(value).take(c as usize));
            value = !value;
        }
        if bits.len() != n {
            return Err(format!(
                "bitmap runs cover {} pixels, expected {}x{}",
                bits.len(),
                rle.height,
                rle.width
            ));
        }
        Ok(BitMask { height: rle.height, width: rle.width, bits })
    }
}

impl From<BitMask> for RleMask {
    fn from(mask: BitMask) -> Self {
        RleMask { height: mask.height, width: mask.width, counts: mask.to_counts() }
    }
}
