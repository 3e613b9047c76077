//! Visible grid line computation for the editor surface.

use crate::viewport::Viewport;
use kurbo::Line;
use serde::{Deserialize, Serialize};

/// Default grid cell size in logical units.
pub const DEFAULT_CELL_SIZE: f64 = 20.0;
/// Every Nth grid line is emphasized as a major line.
pub const DEFAULT_MAJOR_EVERY: u32 = 5;

/// Base stroke widths in screen pixels; divided by zoom so line thickness
/// stays constant on screen at every zoom level.
const MAJOR_STROKE_WIDTH: f64 = 1.0;
const MINOR_STROKE_WIDTH: f64 = 0.5;

/// Padding around the visible rect, in effective cells, so lines do not
/// pop in at the edges while panning.
const PADDING_CELLS: f64 = 2.0;

/// Grid configuration for a map. Immutable during rendering; changed only
/// through explicit settings actions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSpec {
    /// Cell size in logical units. Must be positive.
    pub cell_size: f64,
    /// Interval between major lines, in cells.
    pub major_every: u32,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            major_every: DEFAULT_MAJOR_EVERY,
        }
    }
}

impl GridSpec {
    /// Create a grid spec with the given cell size and major interval.
    pub fn new(cell_size: f64, major_every: u32) -> Self {
        Self {
            cell_size,
            major_every: major_every.max(1),
        }
    }

    /// Cell size adjusted for the current zoom level.
    ///
    /// At low zoom the base cell would produce a dense mess of lines, so
    /// the grid coarsens to 2x below 0.6 and 4x below 0.3.
    pub fn effective_cell_size(&self, zoom: f64) -> f64 {
        if zoom < 0.3 {
            self.cell_size * 4.0
        } else if zoom < 0.6 {
            self.cell_size * 2.0
        } else {
            self.cell_size
        }
    }
}

/// A single grid line ready for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLine {
    /// Line segment in logical coordinates.
    pub line: Line,
    /// Whether this is an emphasized major line.
    pub major: bool,
    /// Stroke width in logical units (pre-divided by zoom).
    pub stroke_width: f64,
}

/// Stroke width for a grid line at the given zoom level.
pub fn stroke_width(major: bool, zoom: f64) -> f64 {
    let base = if major {
        MAJOR_STROKE_WIDTH
    } else {
        MINOR_STROKE_WIDTH
    };
    base / zoom
}

/// Compute the grid lines visible through the viewport.
///
/// Recomputed on every call; callers memoize if per-frame cost matters.
/// Returns an empty vec for degenerate viewport sizes or cell sizes.
pub fn compute_visible_lines(viewport: &Viewport, spec: &GridSpec) -> Vec<GridLine> {
    let size = viewport.size();
    if !(size.width > 0.0 && size.height > 0.0)
        || !size.width.is_finite()
        || !size.height.is_finite()
    {
        return Vec::new();
    }
    if spec.cell_size <= 0.0 || !spec.cell_size.is_finite() {
        return Vec::new();
    }

    let zoom = viewport.zoom();
    let cell = spec.effective_cell_size(zoom);
    let major_every = i64::from(spec.major_every.max(1));

    let visible = viewport.visible_rect();
    let pad = PADDING_CELLS * cell;
    let x0 = visible.x0 - pad;
    let x1 = visible.x1 + pad;
    let y0 = visible.y0 - pad;
    let y1 = visible.y1 + pad;

    let mut lines = Vec::new();

    // Vertical lines, one per multiple of the effective cell size.
    let first = (x0 / cell).floor() as i64;
    let last = (x1 / cell).ceil() as i64;
    for index in first..=last {
        let x = index as f64 * cell;
        let major = index.rem_euclid(major_every) == 0;
        lines.push(GridLine {
            line: Line::new((x, y0), (x, y1)),
            major,
            stroke_width: stroke_width(major, zoom),
        });
    }

    // Horizontal lines.
    let first = (y0 / cell).floor() as i64;
    let last = (y1 / cell).ceil() as i64;
    for index in first..=last {
        let y = index as f64 * cell;
        let major = index.rem_euclid(major_every) == 0;
        lines.push(GridLine {
            line: Line::new((x0, y), (x1, y)),
            major,
            stroke_width: stroke_width(major, zoom),
        });
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Point, Size, Vec2};

    fn viewport(width: f64, height: f64) -> Viewport {
        Viewport::with_size(Size::new(width, height))
    }

    #[test]
    fn test_effective_cell_size_tiers() {
        let spec = GridSpec::default();
        assert!((spec.effective_cell_size(1.0) - 20.0).abs() < f64::EPSILON);
        assert!((spec.effective_cell_size(0.5) - 40.0).abs() < f64::EPSILON);
        assert!((spec.effective_cell_size(0.2) - 80.0).abs() < f64::EPSILON);
        // Boundary values fall into the finer tier
        assert!((spec.effective_cell_size(0.6) - 20.0).abs() < f64::EPSILON);
        assert!((spec.effective_cell_size(0.3) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_major_line_property() {
        let viewport = viewport(800.0, 600.0);
        let spec = GridSpec::default();
        let lines = compute_visible_lines(&viewport, &spec);
        assert!(!lines.is_empty());

        let major_pitch = spec.cell_size * f64::from(spec.major_every);
        for grid_line in &lines {
            let coordinate = if grid_line.line.p0.x == grid_line.line.p1.x {
                grid_line.line.p0.x
            } else {
                grid_line.line.p0.y
            };
            let remainder = coordinate.rem_euclid(major_pitch);
            let on_major = remainder.abs() < 1e-9 || (major_pitch - remainder).abs() < 1e-9;
            assert_eq!(grid_line.major, on_major, "coordinate {}", coordinate);
        }
    }

    #[test]
    fn test_major_lines_with_negative_coordinates() {
        let mut viewport = viewport(400.0, 400.0);
        // Pan so the visible region straddles the origin
        viewport.pan(Vec2::new(210.0, 210.0));

        let spec = GridSpec::default();
        let lines = compute_visible_lines(&viewport, &spec);

        let verticals: Vec<_> = lines
            .iter()
            .filter(|l| l.line.p0.x == l.line.p1.x)
            .collect();
        assert!(verticals.iter().any(|l| l.line.p0.x < 0.0));
        // x = -100 is a multiple of 100, so it must be major
        let at_minus_100 = verticals
            .iter()
            .find(|l| (l.line.p0.x + 100.0).abs() < 1e-9)
            .expect("line at x = -100");
        assert!(at_minus_100.major);
        // x = -20 is a minor line
        let at_minus_20 = verticals
            .iter()
            .find(|l| (l.line.p0.x + 20.0).abs() < 1e-9)
            .expect("line at x = -20");
        assert!(!at_minus_20.major);
    }

    #[test]
    fn test_lines_cover_padded_visible_extent() {
        let viewport = viewport(800.0, 600.0);
        let spec = GridSpec::default();
        let lines = compute_visible_lines(&viewport, &spec);

        let pad = 2.0 * spec.cell_size;
        let min_x = lines
            .iter()
            .filter(|l| l.line.p0.x == l.line.p1.x)
            .map(|l| l.line.p0.x)
            .fold(f64::INFINITY, f64::min);
        let max_x = lines
            .iter()
            .filter(|l| l.line.p0.x == l.line.p1.x)
            .map(|l| l.line.p0.x)
            .fold(f64::NEG_INFINITY, f64::max);

        assert!(min_x <= -pad + spec.cell_size);
        assert!(max_x >= 800.0 + pad - spec.cell_size);
    }

    #[test]
    fn test_stroke_width_scales_inversely_with_zoom() {
        let mut viewport = viewport(800.0, 600.0);
        viewport.set_zoom(4.0, Point::ZERO);
        let lines = compute_visible_lines(&viewport, &GridSpec::default());

        for grid_line in &lines {
            let base = if grid_line.major { 1.0 } else { 0.5 };
            assert!((grid_line.stroke_width - base / 4.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_degenerate_viewport_returns_empty() {
        let viewport = viewport(0.0, 600.0);
        assert!(compute_visible_lines(&viewport, &GridSpec::default()).is_empty());

        let viewport = Viewport::new(); // zero size
        assert!(compute_visible_lines(&viewport, &GridSpec::default()).is_empty());
    }

    #[test]
    fn test_non_finite_viewport_returns_empty() {
        let viewport = viewport(800.0, f64::NAN);
        assert!(compute_visible_lines(&viewport, &GridSpec::default()).is_empty());

        let viewport = self::viewport(f64::INFINITY, 600.0);
        assert!(compute_visible_lines(&viewport, &GridSpec::default()).is_empty());

        let viewport = self::viewport(800.0, f64::INFINITY);
        assert!(compute_visible_lines(&viewport, &GridSpec::default()).is_empty());
    }

    #[test]
    fn test_invalid_cell_size_returns_empty() {
        let viewport = viewport(800.0, 600.0);
        let spec = GridSpec {
            cell_size: 0.0,
            major_every: 5,
        };
        assert!(compute_visible_lines(&viewport, &spec).is_empty());
    }

    #[test]
    fn test_low_zoom_coarsens_grid() {
        let mut viewport = viewport(800.0, 600.0);
        let spec = GridSpec::default();
        let at_full = compute_visible_lines(&viewport, &spec).len();

        viewport.set_zoom(0.2, Point::ZERO);
        let at_low = compute_visible_lines(&viewport, &spec).len();

        // 4x coarser cells at 5x wider view keeps density comparable
        assert!(at_low <= at_full * 2);
    }
}
