// Renderer
//
// Draws the board and, as a side effect, fills App::layout with this frame's
// hit-test zones so pointer events can be routed back to rows. The swipe
// offset is rendered by sliding the row's content region left and painting
// the delete action in the reclaimed columns on the right.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::app::{App, FrameLayout, HitZone, RowHit, RowMarker, Tab};
use crate::config::VERSION;
use crate::util::{clip_right, cut_left, display_width};

/// Columns the delete action occupies at full reveal (72 px / 8 px per cell).
const REVEAL_CELLS: usize = (crate::interaction::REVEAL_WIDTH / super::CELL_W_PX) as usize;

pub fn draw(f: &mut Frame, app: &mut App) {
    let area = f.area();
    f.render_widget(
        Block::default().style(Style::default().bg(app.theme.background)),
        area,
    );

    let log_height = if app.show_logs { 8 } else { 0 };
    let [title_area, list_area, log_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(log_height),
        Constraint::Length(2),
    ])
    .areas(area);

    draw_title(f, title_area, app);
    draw_list(f, list_area, app);
    if app.show_logs {
        draw_logs(f, log_area, app);
    }
    draw_status(f, status_area, app);

    if let Some(toast) = &app.toast {
        toast.render(f, area, &app.theme);
    }
}

fn draw_title(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![
        Span::styled(
            format!(" lifeboard v{VERSION} "),
            Style::default()
                .fg(app.theme.highlight)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("│"),
    ];
    for (i, tab) in Tab::all().into_iter().enumerate() {
        let style = if tab == app.tab {
            Style::default()
                .fg(app.theme.foreground)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(app.theme.muted)
        };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(format!("{} {}", i + 1, tab.title()), style));
    }
    f.render_widget(Line::from(spans), area);
}

fn draw_list(f: &mut Frame, area: Rect, app: &mut App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.muted));
    let inner = block.inner(area);
    f.render_widget(block, area);

    app.layout = FrameLayout::default();

    if app.rows.is_empty() {
        let message = if app.loading {
            "Loading…"
        } else {
            "Nothing here yet"
        };
        f.render_widget(
            Paragraph::new(message).style(Style::default().fg(app.theme.muted)),
            inner,
        );
        return;
    }

    let height = inner.height as usize;
    app.ensure_visible(height);
    let dragged = app.dragged_line();

    let end = (app.scroll_offset + height).min(app.rows.len());
    for (slot, line_idx) in (app.scroll_offset..end).enumerate() {
        let y = inner.y + slot as u16;
        let row_area = Rect::new(inner.x, y, inner.width, 1);
        let hit = draw_row(
            f,
            row_area,
            app,
            line_idx,
            line_idx == app.selected,
            dragged == Some(line_idx),
        );
        app.layout.rows.push(hit);
    }
}

/// Append one segment of a row, tracking its column span for hit testing.
fn push_segment(
    spans: &mut Vec<Span<'static>>,
    zones: &mut Vec<(HitZone, std::ops::Range<u16>)>,
    x: &mut u16,
    text: String,
    style: Style,
    zone: Option<HitZone>,
) {
    let w = display_width(&text) as u16;
    if let Some(zone) = zone {
        zones.push((zone, *x..*x + w));
    }
    spans.push(Span::styled(text, style));
    *x += w;
}

/// Render one row and return its hit-test record.
fn draw_row(
    f: &mut Frame,
    area: Rect,
    app: &App,
    line_idx: usize,
    selected: bool,
    dragged: bool,
) -> RowHit {
    let line = &app.rows[line_idx];
    let theme = &app.theme;
    let offset = app.swipes.offset(&line.row);
    let shift = ((-offset / super::CELL_W_PX).round() as usize).min(REVEAL_CELLS);
    let open = app.swipes.is_open(&line.row);

    let base = if dragged {
        Style::default()
            .fg(theme.foreground)
            .add_modifier(Modifier::REVERSED)
    } else if selected {
        Style::default()
            .fg(theme.foreground)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.foreground)
    };

    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut zones: Vec<(HitZone, std::ops::Range<u16>)> = Vec::new();
    let mut x = area.x;

    if line.depth > 0 {
        push_segment(
            &mut spans,
            &mut zones,
            &mut x,
            "  ".repeat(line.depth as usize),
            base,
            None,
        );
    }
    push_segment(
        &mut spans,
        &mut zones,
        &mut x,
        " ≡ ".to_string(),
        Style::default().fg(theme.muted),
        Some(HitZone::Handle),
    );

    match line.marker {
        RowMarker::Done(done) => {
            let mark = if done { "[x] " } else { "[ ] " };
            let style = if done {
                Style::default().fg(theme.done)
            } else {
                base
            };
            push_segment(
                &mut spans,
                &mut zones,
                &mut x,
                mark.to_string(),
                style,
                Some(HitZone::Checkbox),
            );
        }
        RowMarker::Counter { count, streak } => {
            push_segment(
                &mut spans,
                &mut zones,
                &mut x,
                "[-]".to_string(),
                Style::default().fg(theme.muted),
                Some(HitZone::HabitDec),
            );
            push_segment(
                &mut spans,
                &mut zones,
                &mut x,
                format!(" {count:>2} "),
                base,
                None,
            );
            push_segment(
                &mut spans,
                &mut zones,
                &mut x,
                "[+]".to_string(),
                Style::default().fg(theme.muted),
                Some(HitZone::HabitInc),
            );
            push_segment(
                &mut spans,
                &mut zones,
                &mut x,
                format!(" streak {streak} "),
                Style::default().fg(theme.muted),
                None,
            );
        }
    }

    // Content region: everything up to the right edge, minus the columns the
    // swipe reveal has reclaimed.
    let region_w = (area.right().saturating_sub(x)) as usize;
    let shift = shift.min(region_w);
    let mut text = line.title.clone();
    if let Some(meta) = &line.meta {
        text.push_str(&format!("  ({meta})"));
    }
    let mut text = clip_right(&text, region_w);
    if shift > 0 {
        text = cut_left(&text, shift);
    }
    let pad = region_w - shift - display_width(&text).min(region_w - shift);
    text.push_str(&" ".repeat(pad));

    let title_style = match line.marker {
        RowMarker::Done(true) => Style::default()
            .fg(theme.muted)
            .add_modifier(Modifier::CROSSED_OUT),
        _ => base,
    };
    push_segment(
        &mut spans,
        &mut zones,
        &mut x,
        text,
        title_style,
        Some(HitZone::Content),
    );

    if shift > 0 {
        let label = clip_right(&format!("{:^shift$}", "Delete"), shift);
        let pad = shift - display_width(&label);
        push_segment(
            &mut spans,
            &mut zones,
            &mut x,
            format!("{label}{}", " ".repeat(pad)),
            Style::default()
                .fg(theme.foreground)
                .bg(theme.danger)
                .add_modifier(Modifier::BOLD),
            // Only a fully revealed row takes delete taps.
            open.then_some(HitZone::Delete),
        );
    }

    f.render_widget(Line::from(spans), area);

    RowHit {
        y: area.y,
        line: line_idx,
        zones,
    }
}

fn draw_logs(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.muted))
        .title(" Logs ");
    let inner_height = area.height.saturating_sub(2) as usize;
    let lines: Vec<Line> = app
        .log_buffer
        .recent(inner_height)
        .into_iter()
        .map(|e| {
            let level_style = match e.level {
                crate::logging::LogLevel::Error | crate::logging::LogLevel::Warn => {
                    Style::default().fg(app.theme.danger)
                }
                _ => Style::default().fg(app.theme.muted),
            };
            Line::from(vec![
                Span::styled(
                    format!("{} {:5} ", e.timestamp.format("%H:%M:%S"), e.level.as_str()),
                    level_style,
                ),
                Span::styled(
                    format!("{} ", e.target),
                    Style::default().fg(app.theme.muted),
                ),
                Span::styled(e.message, Style::default().fg(app.theme.foreground)),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let counts = format!(
        "{}m {}g {}h",
        app.snapshot.missions.len(),
        app.snapshot.goals.len(),
        app.snapshot.habits.len()
    );
    let mut spans = vec![
        Span::styled(
            format!(" {} ", app.source_label),
            Style::default().fg(app.theme.highlight),
        ),
        Span::styled(format!("│ {counts} "), Style::default().fg(app.theme.muted)),
    ];
    if app.loading {
        spans.push(Span::styled("│ ⟳ ", Style::default().fg(app.theme.muted)));
    }
    if let Some(warning) = app.log_buffer.last_warning() {
        spans.push(Span::styled(
            format!("│ {} ", clip_right(&warning.message, 40)),
            Style::default().fg(app.theme.danger),
        ));
    }
    spans.push(Span::styled(
        "│ q quit · ⇥ tabs · ␣ done · d delete · +/- habit · r reload · L logs",
        Style::default().fg(app.theme.muted),
    ));

    let status = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(app.theme.muted)),
    );
    f.render_widget(status, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogBuffer;
    use crate::theme::Theme;
    use crate::worker::DemoStore;
    use ratatui::{backend::TestBackend, Terminal};
    use tokio::sync::mpsc;

    fn rendered_app() -> App {
        let (tx, _rx) = mpsc::channel(8);
        let mut app = App::new(tx, LogBuffer::new(), Theme::dark(), "demo".into());
        app.apply_snapshot(DemoStore::seeded().snapshot());
        app
    }

    fn render(app: &mut App) {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
    }

    #[test]
    fn render_fills_one_hit_record_per_visible_row() {
        let mut app = rendered_app();
        render(&mut app);
        assert_eq!(app.layout.rows.len(), app.rows.len());
        // Every row exposes a handle and a content zone.
        for hit in &app.layout.rows {
            assert!(hit.zones.iter().any(|(z, _)| *z == HitZone::Handle));
            assert!(hit.zones.iter().any(|(z, _)| *z == HitZone::Content));
        }
    }

    #[test]
    fn revealed_row_exposes_a_delete_zone() {
        let mut app = rendered_app();
        app.set_tab(Tab::Habits);
        let row = app.rows[0].row.clone();
        app.swipes.open(row);
        render(&mut app);

        let hit = &app.layout.rows[0];
        let delete = hit.zones.iter().find(|(z, _)| *z == HitZone::Delete);
        let (_, range) = delete.expect("open row should expose a delete zone");
        assert_eq!((range.end - range.start) as usize, REVEAL_CELLS);
    }

    #[test]
    fn closed_row_has_no_delete_zone() {
        let mut app = rendered_app();
        render(&mut app);
        assert!(app
            .layout
            .rows
            .iter()
            .all(|h| h.zones.iter().all(|(z, _)| *z != HitZone::Delete)));
    }

    #[test]
    fn habit_rows_expose_step_zones_instead_of_a_checkbox() {
        let mut app = rendered_app();
        app.set_tab(Tab::Habits);
        render(&mut app);
        let hit = &app.layout.rows[0];
        assert!(hit.zones.iter().any(|(z, _)| *z == HitZone::HabitDec));
        assert!(hit.zones.iter().any(|(z, _)| *z == HitZone::HabitInc));
        assert!(hit.zones.iter().all(|(z, _)| *z != HitZone::Checkbox));
    }
}
