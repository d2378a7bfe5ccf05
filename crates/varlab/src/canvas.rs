#![forbid(unsafe_code)]

//! Cell grid the view draws into.
//!
//! A [`Canvas`] is a `width × height` grid of [`Cell`]s. Text is placed by
//! display width: a double-width character (CJK) occupies its own cell plus a
//! continuation cell to its right, and a wide character that would straddle
//! the right edge is not drawn.
//!
//! # Invariants
//!
//! 1. `cells.len() == width * height` at all times.
//! 2. A continuation cell always follows a wide head cell on the same row.
//!    Overwriting either half blanks the other.

use std::io::{self, Write};

use bitflags::bitflags;
use crossterm::style::Color;
use crossterm::{cursor, queue, style, terminal};
use unicode_width::UnicodeWidthChar;

use crate::geometry::Rect;

bitflags! {
    /// Text attributes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StyleFlags: u8 {
        const BOLD    = 0b0001;
        const DIM     = 0b0010;
        const REVERSE = 0b0100;
    }
}

/// Colors and attributes for a run of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub flags: StyleFlags,
}

impl Style {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fg: None,
            bg: None,
            flags: StyleFlags::empty(),
        }
    }

    #[must_use]
    pub const fn fg(mut self, color: Color) -> Self {
        self.fg = Some(color);
        self
    }

    #[must_use]
    pub const fn bg(mut self, color: Color) -> Self {
        self.bg = Some(color);
        self
    }

    #[must_use]
    pub fn bold(mut self) -> Self {
        self.flags |= StyleFlags::BOLD;
        self
    }

    #[must_use]
    pub fn dim(mut self) -> Self {
        self.flags |= StyleFlags::DIM;
        self
    }

    #[must_use]
    pub fn reverse(mut self) -> Self {
        self.flags |= StyleFlags::REVERSE;
        self
    }
}

/// One terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub style: Style,
    /// Right half of the wide character to the left.
    pub continuation: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            style: Style::new(),
            continuation: false,
        }
    }
}

/// Display width of `text` in cells. Control characters count as zero.
#[must_use]
pub fn text_width(text: &str) -> usize {
    text.chars().map(|c| c.width().unwrap_or(0)).sum()
}

/// Truncate `text` to at most `max` cells, appending `…` when cut.
#[must_use]
pub fn truncate(text: &str, max: usize) -> String {
    if text_width(text) <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

/// A fixed-size grid of styled cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Canvas {
    /// Blank canvas. A zero dimension yields a canvas with no cells.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); usize::from(width) * usize::from(height)],
        }
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    #[must_use]
    pub const fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| usize::from(y) * usize::from(self.width) + usize::from(x))
    }

    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    /// Reset every cell to a blank.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    /// Paint `rect` with spaces in `style`.
    pub fn fill(&mut self, rect: Rect, style: Style) {
        for y in rect.y..rect.bottom().min(self.height) {
            for x in rect.x..rect.right().min(self.width) {
                self.put_char(x, y, ' ', style);
            }
        }
    }

    /// Write one character. Returns the number of cells it took (0 if
    /// clipped or zero-width).
    pub fn put_char(&mut self, x: u16, y: u16, ch: char, style: Style) -> u16 {
        let w = ch.width().unwrap_or(0);
        if w == 0 || self.index(x, y).is_none() {
            return 0;
        }
        if w == 2 && x + 1 >= self.width {
            return 0;
        }
        self.detach(x, y);
        if w == 2 {
            self.detach(x + 1, y);
        }
        if let Some(i) = self.index(x, y) {
            self.cells[i] = Cell {
                ch,
                style,
                continuation: false,
            };
        }
        if w == 2
            && let Some(i) = self.index(x + 1, y)
        {
            self.cells[i] = Cell {
                ch: ' ',
                style,
                continuation: true,
            };
        }
        w as u16
    }

    /// Write `text` starting at `(x, y)`, clipped to `max_x` (exclusive) and
    /// the canvas edge. Returns the column after the last cell written.
    pub fn put_str(&mut self, x: u16, y: u16, text: &str, style: Style, max_x: u16) -> u16 {
        let limit = max_x.min(self.width);
        let mut col = x;
        for ch in text.chars() {
            let w = ch.width().unwrap_or(0) as u16;
            if w == 0 {
                continue;
            }
            if col.saturating_add(w) > limit {
                break;
            }
            col += self.put_char(col, y, ch, style);
        }
        col
    }

    /// Write `text` centered within `rect` on row `y`.
    pub fn put_centered(&mut self, rect: Rect, y: u16, text: &str, style: Style) {
        let shown = truncate(text, usize::from(rect.width));
        let w = text_width(&shown) as u16;
        let x = rect.x + rect.width.saturating_sub(w) / 2;
        self.put_str(x, y, &shown, style, rect.right());
    }

    /// Draw a single-line box around `rect`.
    pub fn draw_box(&mut self, rect: Rect, style: Style) {
        if rect.width < 2 || rect.height < 2 {
            return;
        }
        let (l, t) = (rect.x, rect.y);
        let (r, b) = (rect.right() - 1, rect.bottom() - 1);
        for x in l + 1..r {
            self.put_char(x, t, '─', style);
            self.put_char(x, b, '─', style);
        }
        for y in t + 1..b {
            self.put_char(l, y, '│', style);
            self.put_char(r, y, '│', style);
        }
        self.put_char(l, t, '┌', style);
        self.put_char(r, t, '┐', style);
        self.put_char(l, b, '└', style);
        self.put_char(r, b, '┘', style);
    }

    /// Row `y` as plain text, continuation cells skipped.
    #[must_use]
    pub fn row_text(&self, y: u16) -> String {
        (0..self.width)
            .filter_map(|x| self.get(x, y))
            .filter(|c| !c.continuation)
            .map(|c| c.ch)
            .collect()
    }

    /// Whole canvas as text, one line per row with trailing spaces trimmed.
    #[must_use]
    pub fn to_text(&self) -> String {
        (0..self.height)
            .map(|y| self.row_text(y).trim_end().to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Find the first occurrence of `needle` and return its cell position.
    #[must_use]
    pub fn find(&self, needle: &str) -> Option<(u16, u16)> {
        for y in 0..self.height {
            // (byte offset in `text`, cell column) per visible character
            let mut starts = Vec::new();
            let mut text = String::new();
            for x in 0..self.width {
                let Some(cell) = self.get(x, y) else { continue };
                if cell.continuation {
                    continue;
                }
                starts.push((text.len(), x));
                text.push(cell.ch);
            }
            if let Some(byte) = text.find(needle)
                && let Some(&(_, x)) = starts.iter().find(|(b, _)| *b == byte)
            {
                return Some((x, y));
            }
        }
        None
    }

    /// Write the canvas to `out` with full repaint.
    pub fn flush<W: Write>(&self, out: &mut W) -> io::Result<()> {
        queue!(out, terminal::BeginSynchronizedUpdate)?;
        let mut current: Option<Style> = None;
        for y in 0..self.height {
            queue!(out, cursor::MoveTo(0, y))?;
            for x in 0..self.width {
                let Some(cell) = self.get(x, y) else { continue };
                if cell.continuation {
                    continue;
                }
                if current != Some(cell.style) {
                    apply_style(out, cell.style)?;
                    current = Some(cell.style);
                }
                queue!(out, style::Print(cell.ch))?;
            }
        }
        queue!(
            out,
            style::SetAttribute(style::Attribute::Reset),
            style::ResetColor,
            terminal::EndSynchronizedUpdate
        )?;
        out.flush()
    }

    fn detach(&mut self, x: u16, y: u16) {
        let Some(i) = self.index(x, y) else { return };
        let cell = self.cells[i];
        if cell.continuation {
            if x > 0
                && let Some(head) = self.index(x - 1, y)
            {
                self.cells[head] = Cell::default();
            }
        } else if cell.ch.width().unwrap_or(0) == 2
            && let Some(tail) = self.index(x + 1, y)
        {
            self.cells[tail] = Cell::default();
        }
        self.cells[i] = Cell::default();
    }
}

fn apply_style<W: Write>(out: &mut W, s: Style) -> io::Result<()> {
    queue!(
        out,
        style::SetAttribute(style::Attribute::Reset),
        style::SetForegroundColor(s.fg.unwrap_or(Color::Reset)),
        style::SetBackgroundColor(s.bg.unwrap_or(Color::Reset))
    )?;
    if s.flags.contains(StyleFlags::BOLD) {
        queue!(out, style::SetAttribute(style::Attribute::Bold))?;
    }
    if s.flags.contains(StyleFlags::DIM) {
        queue!(out, style::SetAttribute(style::Attribute::Dim))?;
    }
    if s.flags.contains(StyleFlags::REVERSE) {
        queue!(out, style::SetAttribute(style::Attribute::Reverse))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_round_trips_through_row_text() {
        let mut c = Canvas::new(10, 2);
        let end = c.put_str(1, 0, "abc", Style::new(), 10);
        assert_eq!(end, 4);
        assert_eq!(c.row_text(0), " abc      ");
    }

    #[test]
    fn wide_chars_take_two_cells() {
        let mut c = Canvas::new(6, 1);
        let end = c.put_str(0, 0, "溫度", Style::new(), 6);
        assert_eq!(end, 4);
        assert!(c.get(1, 0).is_some_and(|cell| cell.continuation));
        assert_eq!(c.row_text(0), "溫度  ");
    }

    #[test]
    fn wide_char_at_edge_is_clipped() {
        let mut c = Canvas::new(3, 1);
        let end = c.put_str(0, 0, "a溫度", Style::new(), 3);
        assert_eq!(end, 3);
        assert_eq!(c.row_text(0), "a溫");
    }

    #[test]
    fn overwriting_half_of_wide_char_blanks_the_other() {
        let mut c = Canvas::new(4, 1);
        c.put_str(0, 0, "溫", Style::new(), 4);
        c.put_char(1, 0, 'x', Style::new());
        assert_eq!(c.row_text(0), " x  ");
        assert!(c.get(0, 0).is_some_and(|cell| !cell.continuation));
    }

    #[test]
    fn out_of_bounds_writes_are_ignored() {
        let mut c = Canvas::new(2, 2);
        assert_eq!(c.put_char(5, 5, 'x', Style::new()), 0);
        assert_eq!(c.to_text(), "\n");
    }

    #[test]
    fn zero_sized_canvas_is_inert() {
        let mut c = Canvas::new(0, 0);
        c.put_str(0, 0, "hello", Style::new(), 10);
        c.draw_box(Rect::new(0, 0, 5, 5), Style::new());
        assert_eq!(c.to_text(), "");
    }

    #[test]
    fn truncate_respects_display_width() {
        assert_eq!(truncate("abcdef", 4), "abc…");
        assert_eq!(truncate("溫度計讀數", 5), "溫度…");
        assert_eq!(truncate("ok", 4), "ok");
        assert_eq!(truncate("long", 0), "");
    }

    #[test]
    fn find_reports_cell_column() {
        let mut c = Canvas::new(12, 2);
        c.put_str(0, 1, "溫度 reset", Style::new(), 12);
        assert_eq!(c.find("reset"), Some((5, 1)));
        assert_eq!(c.find("度"), Some((2, 1)));
        assert_eq!(c.find("nope"), None);
    }

    #[test]
    fn box_draws_corners() {
        let mut c = Canvas::new(4, 3);
        c.draw_box(c.bounds(), Style::new());
        assert_eq!(c.to_text(), "┌──┐\n│  │\n└──┘");
    }

    #[test]
    fn flush_emits_bytes() {
        let mut c = Canvas::new(3, 1);
        c.put_str(0, 0, "hi", Style::new().bold(), 3);
        let mut out = Vec::new();
        c.flush(&mut out).expect("flush");
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains('h'));
        assert!(text.contains('i'));
    }
}
