use crate::annotation::{Annotation, Geometry};
use crate::render::raster::ClassIndexRaster;

/// Rasterizes an annotation into a fresh label mask of its declared size.
///
/// Shapes are drawn in list order and each writes its class index over
/// whatever is below it, so overlapping areas belong to the last shape.
/// Geometry outside the image is clipped.
pub fn render_class_index(ann: &Annotation) -> ClassIndexRaster {
    let mut raster = ClassIndexRaster::zeros(ann.img_size.height, ann.img_size.width);
    for shape in &ann.shapes {
        draw_geometry(&mut raster, &shape.geometry, shape.class_index);
    }
    raster
}

pub fn draw_geometry(raster: &mut ClassIndexRaster, geometry: &Geometry, value: u32) {
    match geometry {
        Geometry::Polygon { exterior, interior } => {
            let mut rings: Vec<&[[f64; 2]]> = Vec::with_capacity(1 + interior.len());
            rings.push(exterior);
            rings.extend(interior.iter().map(|r| r.as_slice()));
            fill_polygon(raster, &rings, value);
        }
        Geometry::Rectangle { top, left, bottom, right } => {
            let last_row = (*bottom).min(raster.height() as i64 - 1);
            for row in (*top).max(0)..=last_row {
                raster.fill_span(row, *left, *right, value);
            }
        }
        Geometry::Bitmap { origin, mask } => {
            let [ox, oy] = *origin;
            for r in 0..mask.height() {
                for c in 0..mask.width() {
                    if mask.get(r, c) {
                        raster.put(oy.saturating_add(r as i64), ox.saturating_add(c as i64), value);
                    }
                }
            }
        }
        Geometry::Polyline { points } => {
            if let [p] = points.as_slice() {
                if p[0].is_finite() && p[1].is_finite() {
                    raster.put(p[1].round() as i64, p[0].round() as i64, value);
                }
            }
            for seg in points.windows(2) {
                if let Some((a, b)) = clip_segment(seg[0], seg[1], raster.width(), raster.height()) {
                    let from = (a[0].round() as i64, a[1].round() as i64);
                    let to = (b[0].round() as i64, b[1].round() as i64);
                    draw_line(raster, from, to, value);
                }
            }
        }
        Geometry::Point { x, y } => raster.put(*y, *x, value),
    }
}

/// Even-odd scanline fill over all rings, sampling pixel centres.
/// Interior rings therefore cut holes out of the exterior.
fn fill_polygon(raster: &mut ClassIndexRaster, rings: &[&[[f64; 2]]], value: u32) {
    let mut edges: Vec<([f64; 2], [f64; 2])> = Vec::new();
    for ring in rings {
        if ring.len() < 3 || ring.iter().any(|p| !p[0].is_finite() || !p[1].is_finite()) {
            continue;
        }
        for i in 0..ring.len() {
            let a = ring[i];
            let b = ring[(i + 1) % ring.len()];
            if a[1] != b[1] {
                edges.push((a, b));
            }
        }
    }
    if edges.is_empty() || raster.width() == 0 {
        return;
    }

    let y_min = edges.iter().map(|(a, b)| a[1].min(b[1])).fold(f64::INFINITY, f64::min);
    let y_max = edges.iter().map(|(a, b)| a[1].max(b[1])).fold(f64::NEG_INFINITY, f64::max);
    let first_row = (y_min - 0.5).ceil().max(0.0) as i64;
    let last_row = ((y_max - 0.5).floor() as i64).min(raster.height() as i64 - 1);

    let mut crossings: Vec<f64> = Vec::new();
    for row in first_row..=last_row {
        let yc = row as f64 + 0.5;
        crossings.clear();
        for (a, b) in &edges {
            let (lo, hi) = if a[1] < b[1] { (a, b) } else { (b, a) };
            // Half-open in y so shared vertices are counted once.
            if lo[1] <= yc && yc < hi[1] {
                let t = (yc - lo[1]) / (hi[1] - lo[1]);
                crossings.push(lo[0] + t * (hi[0] - lo[0]));
            }
        }
        crossings.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        if crossings.iter().any(|x| x.is_nan()) {
            continue;
        }

        // Crossings beyond the raster act like crossings just past its edge.
        let x_limit = raster.width() as f64 + 1.0;
        for pair in crossings.chunks_exact(2) {
            let x0 = pair[0].clamp(-1.0, x_limit);
            let x1 = pair[1].clamp(-1.0, x_limit);
            // Columns whose centre c + 0.5 lies in [x0, x1).
            let first_col = (x0 - 0.5).ceil() as i64;
            let last_col = (x1 - 0.5).ceil() as i64 - 1;
            raster.fill_span(row, first_col, last_col, value);
        }
    }
}

/// Liang-Barsky clip of segment `a`-`b` to the pixel area of a
/// `width` x `height` raster. `None` when nothing of it is inside or a
/// coordinate is not finite.
fn clip_segment(a: [f64; 2], b: [f64; 2], width: usize, height: usize) -> Option<([f64; 2], [f64; 2])> {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    if !(a[0].is_finite() && a[1].is_finite() && dx.is_finite() && dy.is_finite()) {
        return None;
    }

    let (x_min, x_max) = (-0.5, width as f64 - 0.5);
    let (y_min, y_max) = (-0.5, height as f64 - 0.5);

    // Parameter of each end plus the boundary (axis, value) that cut it.
    let mut enter: (f64, Option<(usize, f64)>) = (0.0, None);
    let mut leave: (f64, Option<(usize, f64)>) = (1.0, None);
    let bounds = [
        (-dx, a[0] - x_min, (0, x_min)),
        (dx, x_max - a[0], (0, x_max)),
        (-dy, a[1] - y_min, (1, y_min)),
        (dy, y_max - a[1], (1, y_max)),
    ];
    for (p, q, edge) in bounds {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > enter.0 {
                enter = (r, Some(edge));
            }
        } else if r < leave.0 {
            leave = (r, Some(edge));
        }
        if enter.0 > leave.0 {
            return None;
        }
    }

    // Far-away endpoints lose precision in a + t * d, so pin the cut
    // coordinate to its boundary and keep the other one inside the box.
    let at = |(t, edge): (f64, Option<(usize, f64)>), unclipped: [f64; 2]| match edge {
        None => unclipped,
        Some((axis, value)) => {
            let mut point = [(a[0] + t * dx).clamp(x_min, x_max), (a[1] + t * dy).clamp(y_min, y_max)];
            point[axis] = value;
            point
        }
    };
    Some((at(enter, a), at(leave, b)))
}

/// Bresenham segment between two `(x, y)` pixels, both ends included.
/// Callers clip first, so both ends are near the raster.
fn draw_line(raster: &mut ClassIndexRaster, from: (i64, i64), to: (i64, i64), value: u32) {
    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = -(to.1 - y).abs();
    let sx = if x < to.0 { 1 } else { -1 };
    let sy = if y < to.1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        raster.put(y, x, value);
        if x == to.0 && y == to.1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}
