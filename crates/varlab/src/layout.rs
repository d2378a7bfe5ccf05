#![forbid(unsafe_code)]

//! Screen layout and hit testing.
//!
//! [`Layout::compute`] places every widget for the current session state at
//! a given terminal size. The view draws from it and the model hit-tests
//! mouse events against it, so what the player sees is what they can click.
//!
//! ```text
//!  row 0   app title                                 [ reset ]
//!  row 1   [ level 1 ] [ level 2 ] ...
//!          ┌ scenario card ─────────────────────────────────┐
//!          │ title / mission / question                     │
//!          └────────────────────────────────────────────────┘
//!          ┌ pool ──────────────────────────────────────────┐
//!          │ [ chip ]  [ chip ]  [ chip ]   or cleared banner│
//!          └────────────────────────────────────────────────┘
//!          ┌ bucket ──────┐ ┌ bucket ──────┐ ┌ bucket ──────┐
//!          │              │ │              │ │              │
//!          └──────────────┘ └──────────────┘ └──────────────┘
//! ```
//!
//! # Invariants
//!
//! 1. Every non-empty region lies inside the terminal area.
//! 2. Pool chips never overlap each other.
//! 3. [`Layout::hit_test`] prefers the region registered last, so buttons
//!    and chips win over the panels that contain them.

use varlab_core::{Category, Session};

use crate::canvas::text_width;
use crate::geometry::Rect;

/// Rows used by the header (title row plus tab row).
pub const HEADER_HEIGHT: u16 = 2;
/// Rows used by the scenario card including its border.
pub const CARD_HEIGHT: u16 = 5;
/// Columns between pool chips.
pub const CHIP_GAP: u16 = 2;

/// What lies under a screen cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Hit {
    /// A pool chip for the item with this id.
    Item(String),
    /// A bucket panel.
    Bucket(Category),
    /// The pool panel outside any chip.
    Pool,
    /// A level tab.
    LevelTab(usize),
    Reset,
    Next,
}

/// Positions of everything on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub area: Rect,
    pub reset: Rect,
    pub tabs: Vec<Rect>,
    pub card: Rect,
    pub pool: Rect,
    /// Item id and chip rect, in level order.
    pub chips: Vec<(String, Rect)>,
    /// Shown once the level is cleared and another level follows.
    pub next: Option<Rect>,
    pub buckets: Vec<(Category, Rect)>,
    regions: Vec<(Rect, Hit)>,
}

/// Label drawn on a chip: `[ label ]`.
#[must_use]
pub fn chip_text(label: &str) -> String {
    format!("[ {label} ]")
}

/// Label drawn on a button: `[ label ]`.
#[must_use]
pub fn button_text(label: &str) -> String {
    format!("[ {label} ]")
}

/// Label drawn on a level tab: ` label `.
#[must_use]
pub fn tab_text(label: &str) -> String {
    format!(" {label} ")
}

fn cells(text: &str) -> u16 {
    u16::try_from(text_width(text)).unwrap_or(u16::MAX)
}

impl Layout {
    /// Lay out the screen for `session` in a `width × height` terminal.
    #[must_use]
    pub fn compute(session: &Session, width: u16, height: u16) -> Self {
        let area = Rect::from_size(width, height);
        let messages = session.catalog().messages();
        let mut regions = Vec::new();

        let (header, body) = area.split_top(HEADER_HEIGHT);

        // Reset button, right-aligned on the title row
        let reset_w = cells(&button_text(&messages.reset_label)).min(header.width);
        let reset = Rect::new(
            header.right().saturating_sub(reset_w + 1).max(header.x),
            header.y,
            reset_w,
            header.height.min(1),
        );

        // Level tabs on the second header row; tabs that do not fit are dropped
        let mut tabs = Vec::new();
        if header.height >= 2 {
            let mut x = header.x.saturating_add(1);
            for index in 0..session.catalog().len() {
                let w = cells(&tab_text(&messages.tab(index)));
                if x.saturating_add(w) > header.right() {
                    break;
                }
                tabs.push(Rect::new(x, header.y + 1, w, 1));
                x = x.saturating_add(w + 1);
            }
        }

        let frame = Rect::new(
            body.x.saturating_add(1),
            body.y,
            body.width.saturating_sub(2),
            body.height,
        );
        let (card, rest) = frame.split_top(CARD_HEIGHT);

        // Pool: chips flow left to right, wrapping onto new rows
        let inner_width = rest.width.saturating_sub(4);
        let finished = session.is_finished();
        let cleared = session.is_cleared() || finished;
        let mut placed: Vec<(String, u16, u16, u16)> = Vec::new(); // id, col, row, width
        let mut col = 0u16;
        let mut row = 0u16;
        if !cleared {
            for item in session.pool_items() {
                let w = cells(&chip_text(&item.label)).min(inner_width);
                if w == 0 {
                    break;
                }
                if col > 0 && col.saturating_add(w) > inner_width {
                    col = 0;
                    row += 1;
                }
                placed.push((item.id.clone(), col, row, w));
                col = col.saturating_add(w).saturating_add(CHIP_GAP);
            }
        }
        let inner_rows = if cleared {
            3
        } else {
            placed.last().map_or(1, |&(_, _, r, _)| r + 1)
        };
        let (pool, rest) = rest.split_top(inner_rows.saturating_add(2));
        let pool_inner = Rect::new(
            pool.x.saturating_add(2),
            pool.y.saturating_add(1),
            inner_width,
            pool.height.saturating_sub(2),
        );
        let chips: Vec<(String, Rect)> = placed
            .into_iter()
            .map(|(id, c, r, w)| {
                (
                    id,
                    Rect::new(pool_inner.x.saturating_add(c), pool_inner.y.saturating_add(r), w, 1),
                )
            })
            .filter(|(_, rect)| rect.bottom() <= pool_inner.bottom())
            .collect();

        let next = if session.is_cleared() && !finished && pool_inner.height >= 3 {
            let w = cells(&button_text(&messages.next_label)).min(pool_inner.width);
            Some(Rect::new(
                pool_inner.x + pool_inner.width.saturating_sub(w) / 2,
                pool_inner.y + 2,
                w,
                1,
            ))
        } else {
            None
        };

        let bucket_cats: Vec<Category> = session
            .catalog()
            .buckets()
            .iter()
            .map(|b| b.category)
            .collect();
        let columns = rest.columns(bucket_cats.len() as u16, 1);
        let buckets: Vec<(Category, Rect)> = bucket_cats.into_iter().zip(columns).collect();

        regions.push((pool, Hit::Pool));
        for (category, rect) in &buckets {
            regions.push((*rect, Hit::Bucket(*category)));
        }
        for (id, rect) in &chips {
            regions.push((*rect, Hit::Item(id.clone())));
        }
        for (index, rect) in tabs.iter().enumerate() {
            regions.push((*rect, Hit::LevelTab(index)));
        }
        regions.push((reset, Hit::Reset));
        if let Some(rect) = next {
            regions.push((rect, Hit::Next));
        }
        regions.retain(|(rect, _)| {
            !rect.is_empty() && rect.right() <= area.right() && rect.bottom() <= area.bottom()
        });

        Self {
            area,
            reset,
            tabs,
            card,
            pool,
            chips,
            next,
            buckets,
            regions,
        }
    }

    /// Topmost region containing `(x, y)`.
    #[must_use]
    pub fn hit_test(&self, x: u16, y: u16) -> Option<&Hit> {
        self.regions
            .iter()
            .rev()
            .find(|(rect, _)| rect.contains(x, y))
            .map(|(_, hit)| hit)
    }

    /// Every hit region in registration order.
    #[must_use]
    pub fn regions(&self) -> &[(Rect, Hit)] {
        &self.regions
    }

    #[must_use]
    pub fn chip(&self, item_id: &str) -> Option<Rect> {
        self.chips
            .iter()
            .find(|(id, _)| id == item_id)
            .map(|(_, rect)| *rect)
    }

    #[must_use]
    pub fn bucket(&self, category: Category) -> Option<Rect> {
        self.buckets
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, rect)| *rect)
    }
}
