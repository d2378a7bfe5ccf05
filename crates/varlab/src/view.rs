#![forbid(unsafe_code)]

//! Drawing the game screen.
//!
//! Everything here is a read-only observer of the [`Session`]: it draws from
//! the same [`Layout`] the model hit-tests against and never mutates state.

use crossterm::style::Color;
use varlab_core::{Category, Session, Severity};

use crate::canvas::{Canvas, Style, text_width, truncate};
use crate::geometry::Rect;
use crate::layout::{Layout, button_text, chip_text, tab_text};

/// UI-only state the view needs beyond the session.
#[derive(Debug, Clone, Default)]
pub struct Overlay<'a> {
    /// Last pointer position while a drag is in progress.
    pub pointer: Option<(u16, u16)>,
    /// Item chosen with the keyboard.
    pub selected: Option<&'a str>,
    /// Use ASCII status icons.
    pub ascii: bool,
}

/// Accent color for a bucket.
#[must_use]
pub const fn category_color(category: Category) -> Color {
    match category {
        Category::Manipulated => Color::Yellow,
        Category::Controlled => Color::Cyan,
        Category::Responding => Color::Magenta,
    }
}

const fn icon(severity: Severity, ascii: bool) -> char {
    if ascii {
        severity.as_ascii()
    } else {
        severity.as_char()
    }
}

const fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Success => Color::Green,
        Severity::Error => Color::Red,
        Severity::Info => Color::Blue,
    }
}

/// Draw the whole screen.
pub fn draw(session: &Session, layout: &Layout, overlay: &Overlay<'_>, canvas: &mut Canvas) {
    draw_header(session, layout, canvas);
    draw_card(session, layout.card, canvas);
    draw_pool(session, layout, overlay, canvas);
    draw_buckets(session, layout, overlay, canvas);
    draw_toast(session, overlay, canvas);
    draw_drag(session, overlay, canvas);
}

fn draw_header(session: &Session, layout: &Layout, canvas: &mut Canvas) {
    let messages = session.catalog().messages();
    let title_end = layout.reset.x.saturating_sub(1);
    canvas.put_str(1, 0, &messages.app_title, Style::new().bold(), title_end);

    canvas.put_str(
        layout.reset.x,
        layout.reset.y,
        &button_text(&messages.reset_label),
        Style::new().fg(Color::Red),
        layout.reset.right(),
    );

    for (index, rect) in layout.tabs.iter().enumerate() {
        let style = if index == session.level_index() {
            Style::new().bold().reverse()
        } else {
            Style::new().dim()
        };
        canvas.put_str(
            rect.x,
            rect.y,
            &tab_text(&messages.tab(index)),
            style,
            rect.right(),
        );
    }
}

fn draw_card(session: &Session, card: Rect, canvas: &mut Canvas) {
    if card.height < 2 {
        return;
    }
    let level = session.level();
    let messages = session.catalog().messages();
    let border = Style::new().fg(Color::DarkGrey);
    canvas.draw_box(card, border);

    let progress = format!(" {}/{} ", session.correct_count(), level.items.len());
    let px = card.right().saturating_sub(cells(&progress) + 2);
    canvas.put_str(px, card.y, &progress, Style::new().fg(Color::Green), card.right());

    let inner = card.inset(1);
    let width = usize::from(inner.width.saturating_sub(2));
    let lines = [
        (truncate(&level.title, width), Style::new().bold()),
        (
            truncate(&format!("{}：{}", messages.mission_label, level.description), width),
            Style::new(),
        ),
        (
            truncate(&format!("{}：{}", messages.question_label, level.question), width),
            Style::new().fg(Color::Yellow),
        ),
    ];
    for (row, (text, style)) in (0u16..).zip(lines.iter()) {
        if row >= inner.height {
            break;
        }
        canvas.put_str(inner.x + 1, inner.y + row, text, *style, inner.right());
    }
}

fn draw_pool(session: &Session, layout: &Layout, overlay: &Overlay<'_>, canvas: &mut Canvas) {
    let pool = layout.pool;
    if pool.height < 2 {
        return;
    }
    canvas.draw_box(pool, Style::new().fg(Color::DarkGrey));
    let inner = pool.inset(1);
    let messages = session.catalog().messages();

    if session.is_finished() {
        let style = Style::new().fg(Color::Green).bold();
        canvas.put_centered(inner, inner.y, &messages.all_complete, style);
        if inner.height > 1 {
            canvas.put_centered(inner, inner.y + 1, &messages.cleared_detail, Style::new());
        }
        return;
    }
    if session.is_cleared() {
        let style = Style::new().fg(Color::Green).bold();
        canvas.put_centered(inner, inner.y, &messages.level_cleared, style);
        if inner.height > 1 {
            canvas.put_centered(inner, inner.y + 1, &messages.cleared_detail, Style::new());
        }
        if let Some(next) = layout.next {
            canvas.put_str(
                next.x,
                next.y,
                &button_text(&messages.next_label),
                Style::new().fg(Color::Green).reverse(),
                next.right(),
            );
        }
        return;
    }

    for (id, rect) in &layout.chips {
        let Some(item) = session.level().item(id) else {
            continue;
        };
        let label = truncate(&item.label, usize::from(rect.width.saturating_sub(4)));
        let style = if session.shaking() == Some(id.as_str()) {
            Style::new().fg(Color::Red).bold().reverse()
        } else if session.active_drag() == Some(id.as_str()) {
            Style::new().dim()
        } else if overlay.selected == Some(id.as_str()) {
            Style::new().bold().reverse()
        } else {
            Style::new().bold()
        };
        // Shaking chips jitter one cell to the right
        let x = if session.shaking() == Some(id.as_str()) && rect.right() < inner.right() {
            rect.x + 1
        } else {
            rect.x
        };
        canvas.put_str(x, rect.y, &chip_text(&label), style, inner.right());
    }
}

fn draw_buckets(session: &Session, layout: &Layout, overlay: &Overlay<'_>, canvas: &mut Canvas) {
    let catalog = session.catalog();
    let mark = icon(Severity::Success, overlay.ascii);
    for &(category, rect) in &layout.buckets {
        if rect.width < 4 || rect.height < 3 {
            continue;
        }
        let color = category_color(category);
        canvas.draw_box(rect, Style::new().fg(color));
        let inner = rect.inset(1);
        let width = usize::from(inner.width);

        let mut y = inner.y;
        if let Some(bucket) = catalog.bucket(category) {
            let heading = truncate(&format!("{} {}", bucket.title, bucket.subtitle), width);
            canvas.put_centered(inner, y, &heading, Style::new().fg(color).bold());
            y += 1;
            if y < inner.bottom() {
                let desc = truncate(&bucket.description, width);
                canvas.put_centered(inner, y, &desc, Style::new().dim());
                y += 1;
            }
        }
        y += 1;

        let mut any = false;
        for item in session.bucket_items(category) {
            if y >= inner.bottom() {
                break;
            }
            let line = truncate(&format!("{mark} {}", item.label), width.saturating_sub(1));
            canvas.put_str(inner.x + 1, y, &line, Style::new().fg(Color::Green), inner.right());
            y += 1;
            any = true;
        }
        if !any && y < inner.bottom() {
            canvas.put_centered(inner, y, &catalog.messages().empty_bucket, Style::new().dim());
        }
    }
}

fn draw_toast(session: &Session, overlay: &Overlay<'_>, canvas: &mut Canvas) {
    let feedback = session.feedback();
    if !feedback.visible || canvas.height() < 3 || canvas.width() < 6 {
        return;
    }
    let area = canvas.bounds();
    let max = usize::from(area.width.saturating_sub(6));
    let text = truncate(
        &format!("{} {}", icon(feedback.severity, overlay.ascii), feedback.message),
        max,
    );
    let w = cells(&text) + 4;
    let rect = Rect::new(
        area.width.saturating_sub(w) / 2,
        area.height.saturating_sub(3) / 2,
        w,
        3,
    );
    let color = severity_color(feedback.severity);
    canvas.fill(rect, Style::new());
    canvas.draw_box(rect, Style::new().fg(color));
    canvas.put_str(
        rect.x + 2,
        rect.y + 1,
        &text,
        Style::new().fg(color).bold(),
        rect.right().saturating_sub(1),
    );
}

fn draw_drag(session: &Session, overlay: &Overlay<'_>, canvas: &mut Canvas) {
    let (Some(id), Some((x, y))) = (session.active_drag(), overlay.pointer) else {
        return;
    };
    let Some(item) = session.level().item(id) else {
        return;
    };
    let text = chip_text(&item.label);
    let half = cells(&text) / 2;
    let x = x.saturating_sub(half);
    canvas.put_str(x, y, &text, Style::new().bold().reverse(), canvas.width());
}

fn cells(text: &str) -> u16 {
    u16::try_from(text_width(text)).unwrap_or(u16::MAX)
}
