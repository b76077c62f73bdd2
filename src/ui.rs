use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::dialog::{self, DialogContent};
use crate::history::HistorySummary;
use crate::scene::Scene;
use crate::session::{GameSession, Phase};

/// Something a mouse click landed on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hit {
    Item(String),
    DialogButton,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenChunks {
    pub controls: Rect,
    pub status: Rect,
    pub room: Rect,
    pub hint: Rect,
}

/// Fixed screen partition: controls top left, score and clock top right,
/// the room in the middle, the hint bar at the bottom.
pub fn screen_chunks(area: Rect) -> ScreenChunks {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(22)].as_ref())
        .split(rows[0]);

    ScreenChunks {
        controls: top[0],
        status: top[1],
        room: rows[1],
        hint: rows[2],
    }
}

/// Where each item sits inside `area`. Pure function of the area and the
/// scene, so the renderer and the click handler can never disagree. Hidden
/// items keep their slot; callers filter on visibility.
pub fn scene_layout(area: Rect, scene: &Scene) -> Vec<(usize, Rect)> {
    let n = scene.len();
    if n == 0 || area.width < 10 || area.height < 3 {
        return Vec::new();
    }

    let cols = (n as u16).min(4);
    let rows = (n as u16).div_ceil(cols);
    let slot_w = area.width / cols;
    let slot_h = (area.height / rows).max(3);

    scene
        .items()
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let col = i as u16 % cols;
            let row = i as u16 / cols;

            let text_w = item.label.width() as u16 + item.glyph.width() as u16 + 1;
            let w = (text_w + 2).clamp(6, slot_w.max(6));
            let h = 3u16;

            let base_x = area.x + col * slot_w + slot_w.saturating_sub(w) / 2;
            let base_y = area.y + row * slot_h + slot_h.saturating_sub(h) / 2;
            let x = place(base_x, item.jitter.0, area.x, area.x + area.width, w);
            let y = place(base_y, item.jitter.1, area.y, area.y + area.height, h);

            (i, Rect::new(x, y, w, h))
        })
        .collect()
}

/// Apply a signed jitter and clamp the result so the box stays inside
/// [min, max_excl).
fn place(base: u16, jitter: i16, min: u16, max_excl: u16, size: u16) -> u16 {
    let pos = if jitter >= 0 {
        base.saturating_add(jitter as u16)
    } else {
        base.saturating_sub(jitter.unsigned_abs())
    };
    let hi = max_excl.saturating_sub(size).max(min);
    pos.clamp(min, hi)
}

/// Item rects relative to the full screen (inside the room border).
pub fn item_rects(area: Rect, scene: &Scene) -> Vec<(usize, Rect)> {
    let chunks = screen_chunks(area);
    scene_layout(inset(chunks.room, 1, 1), scene)
}

fn inset(r: Rect, dx: u16, dy: u16) -> Rect {
    if r.width <= dx * 2 || r.height <= dy * 2 {
        return Rect::new(r.x, r.y, 0, 0);
    }
    Rect::new(r.x + dx, r.y + dy, r.width - dx * 2, r.height - dy * 2)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DialogRects {
    pub frame: Rect,
    pub body: Rect,
    pub button: Rect,
}

/// Centered modal sized to its body text.
pub fn dialog_layout(area: Rect, content: &DialogContent) -> DialogRects {
    let w = area.width.saturating_sub(6).clamp(20, 58);
    let inner_w = w.saturating_sub(4).max(1);

    // wrapped line estimate per paragraph, plus a blank line between them
    let mut body_lines = 0u16;
    for paragraph in content.body.split('\n') {
        let width = paragraph.width() as u16;
        body_lines += (width / inner_w + 1).max(1) + 1;
    }
    body_lines = body_lines.saturating_sub(1);

    let h = (body_lines + 4).clamp(7, area.height.saturating_sub(2).max(7));
    let x = area.x + area.width.saturating_sub(w) / 2;
    let y = area.y + area.height.saturating_sub(h) / 2;
    let frame = Rect::new(x, y, w, h);

    let body = Rect::new(x + 2, y + 1, inner_w, h.saturating_sub(4));

    let button_w = (content.button.width() as u16 + 4).min(w.saturating_sub(2));
    let button = Rect::new(
        x + w.saturating_sub(button_w) / 2,
        y + h.saturating_sub(2),
        button_w,
        1,
    );

    DialogRects {
        frame,
        body,
        button,
    }
}

/// Resolve a click at (x, y). With a dialog open only its button reacts;
/// otherwise the topmost visible item under the cursor is hit.
pub fn hit_test(
    area: Rect,
    session: &GameSession,
    summary: Option<&HistorySummary>,
    x: u16,
    y: u16,
) -> Option<Hit> {
    if let Some(kind) = session.dialog() {
        let content = dialog::content(
            kind,
            session.time_limit(),
            session.elapsed_secs(),
            summary,
        );
        let rects = dialog_layout(area, &content);
        if contains(rects.button, x, y) {
            return Some(Hit::DialogButton);
        }
        return None;
    }

    for (idx, rect) in item_rects(area, session.scene()) {
        if session.scene().is_visible(idx) && contains(rect, x, y) {
            return session
                .scene()
                .get(idx)
                .map(|item| Hit::Item(item.id.clone()));
        }
    }

    None
}

fn contains(r: Rect, x: u16, y: u16) -> bool {
    x >= r.x && x < r.x + r.width && y >= r.y && y < r.y + r.height
}

pub fn draw(f: &mut Frame, session: &GameSession, summary: Option<&HistorySummary>) {
    let area = f.area();
    let chunks = screen_chunks(area);

    render_controls(f, chunks.controls);
    render_status(f, chunks.status, session);
    render_room(f, chunks.room, session);
    render_hint(f, chunks.hint, session);

    if let Some(kind) = session.dialog() {
        let content = dialog::content(
            kind,
            session.time_limit(),
            session.elapsed_secs(),
            summary,
        );
        render_dialog(f, area, &content);
    }
}

fn key_style() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

fn render_controls(f: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled("p", key_style()),
        Span::raw(" pause   "),
        Span::styled("h", key_style()),
        Span::raw(" help   "),
        Span::styled("esc", key_style()),
        Span::raw(" quit"),
    ]);

    let widget = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    f.render_widget(widget, area);
}

fn render_status(f: &mut Frame, area: Rect, session: &GameSession) {
    let clock_style = if session.phase() == Phase::Running && session.time_remaining() <= 5 {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .add_modifier(Modifier::DIM)
            .add_modifier(Modifier::BOLD)
    };

    let line = Line::from(vec![
        Span::styled(
            format!("{}/{}", session.points(), session.total()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(format!("{:>3}s", session.time_remaining()), clock_style),
    ]);

    let widget = Paragraph::new(line)
        .alignment(Alignment::Right)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(widget, area);
}

fn render_room(f: &mut Frame, area: Rect, session: &GameSession) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(session.scene().title());
    f.render_widget(block, area);

    let inner = inset(area, 1, 1);
    for (idx, rect) in scene_layout(inner, session.scene()) {
        if !session.scene().is_visible(idx) {
            continue;
        }
        let item = &session.scene().items()[idx];
        let widget = Paragraph::new(format!("{} {}", item.glyph, item.label))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow)),
            );
        f.render_widget(widget, rect);
    }
}

fn render_hint(f: &mut Frame, area: Rect, session: &GameSession) {
    let widget = Paragraph::new(session.hint().unwrap_or(""))
        .style(
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::ITALIC),
        )
        .block(Block::default().borders(Borders::ALL).title("next to go"));
    f.render_widget(widget, area);
}

fn render_dialog(f: &mut Frame, area: Rect, content: &DialogContent) {
    let rects = dialog_layout(area, content);

    f.render_widget(Clear, rects.frame);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(content.title)
        .title_alignment(Alignment::Center);
    f.render_widget(block, rects.frame);

    let mut lines: Vec<Line> = Vec::new();
    for (i, paragraph) in content.body.split('\n').enumerate() {
        if i > 0 {
            lines.push(Line::default());
        }
        lines.push(Line::from(paragraph.to_string()));
    }
    let body = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: true });
    f.render_widget(body, rects.body);

    let button = Paragraph::new(format!("[ {} ]", content.button))
        .style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED))
        .alignment(Alignment::Center);
    f.render_widget(button, rects.button);
}
