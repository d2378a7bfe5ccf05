#![forbid(unsafe_code)]

//! Geometric primitives.

/// A rectangle for layout bounds and hit testing.
///
/// Uses terminal coordinates (0-indexed, origin at top-left).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: u16,
    /// Top edge (inclusive).
    pub y: u16,
    /// Width in cells.
    pub width: u16,
    /// Height in cells.
    pub height: u16,
}

impl Rect {
    #[inline]
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle at the origin with the given size.
    #[inline]
    pub const fn from_size(width: u16, height: u16) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    pub const fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Shrink by `margin` cells on every side. Collapses to an empty rect
    /// rather than underflowing.
    #[must_use]
    pub fn inset(&self, margin: u16) -> Rect {
        let x = self.x.saturating_add(margin);
        let y = self.y.saturating_add(margin);
        let width = self.width.saturating_sub(margin.saturating_mul(2));
        let height = self.height.saturating_sub(margin.saturating_mul(2));
        Rect::new(x, y, width, height)
    }

    /// Split off the top `rows` rows. Returns `(top, rest)`.
    #[must_use]
    pub fn split_top(&self, rows: u16) -> (Rect, Rect) {
        let rows = rows.min(self.height);
        (
            Rect::new(self.x, self.y, self.width, rows),
            Rect::new(self.x, self.y.saturating_add(rows), self.width, self.height - rows),
        )
    }

    /// Split horizontally into `n` columns separated by `gap` cells.
    ///
    /// Leftover width goes to the last column. Returns an empty vec for
    /// `n == 0`.
    #[must_use]
    pub fn columns(&self, n: u16, gap: u16) -> Vec<Rect> {
        if n == 0 {
            return Vec::new();
        }
        let gaps = gap.saturating_mul(n - 1);
        let usable = self.width.saturating_sub(gaps);
        let each = usable / n;
        let mut out = Vec::with_capacity(usize::from(n));
        let mut x = self.x;
        for i in 0..n {
            let width = if i + 1 == n {
                self.right().saturating_sub(x)
            } else {
                each
            };
            out.push(Rect::new(x, self.y, width, self.height));
            x = x.saturating_add(each).saturating_add(gap);
        }
        out
    }
}
