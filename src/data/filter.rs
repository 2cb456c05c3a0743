// ---------------------------------------------------------------------------
// Brush predicate: which rows fall inside a rectangle
// ---------------------------------------------------------------------------

/// Axis-aligned brush rectangle in data coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushRect {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl BrushRect {
    /// Rectangle spanned by two drag corners, in any order.
    pub fn from_corners(a: [f64; 2], b: [f64; 2]) -> Self {
        Self {
            min: [a[0].min(b[0]), a[1].min(b[1])],
            max: [a[0].max(b[0]), a[1].max(b[1])],
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min[0] && x <= self.max[0] && y >= self.min[1] && y <= self.max[1]
    }

    /// Zero width or height: a click rather than a drag.
    pub fn is_degenerate(&self) -> bool {
        !(self.max[0] > self.min[0] && self.max[1] > self.min[1])
    }
}

/// Return indices of rows whose `(x, y)` lies inside `rect`.
///
/// A degenerate rectangle selects nothing; rows with non-finite coordinates
/// never match.
pub fn brushed_indices(x: &[f64], y: &[f64], rect: &BrushRect) -> Vec<usize> {
    if rect.is_degenerate() {
        return Vec::new();
    }
    x.iter()
        .zip(y.iter())
        .enumerate()
        .filter(|(_, (&xi, &yi))| rect.contains(xi, yi))
        .map(|(i, _)| i)
        .collect()
}
