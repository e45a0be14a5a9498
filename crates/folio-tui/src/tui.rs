//! Terminal UI: intro, scrolling page, particle field and overlays

use crossterm::{
    event::{self, Event, KeyEventKind},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use folio_core::{FolioConfig, Section};
use folio_engine::contact::Field;
use folio_engine::particles::EXTENT;
use folio_engine::{Phase, Showcase, ShowcaseEvent, TimerId, TokioTimers};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::canvas::{Canvas, Points},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::app::{App, PageLine};

/// Rows used by the progress bar, navbar and status line.
const CHROME_ROWS: u16 = 5;
const FIELD_BOUND: f64 = EXTENT + 15.0;

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(r, g, b)
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect::new(
        area.x + (area.width - w) / 2,
        area.y + (area.height - h) / 2,
        w,
        h,
    )
}

/// Height of the scrollable page for a terminal of `rows` rows.
pub fn body_rows(rows: u16) -> u16 {
    rows.saturating_sub(CHROME_ROWS)
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn draw(frame: &mut Frame, app: &App) {
    let size = frame.area();

    if app.intro_active {
        draw_particles(frame, app, size);
        draw_intro(frame, app, size);
    } else {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(size);
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(68), Constraint::Percentage(32)])
            .split(chunks[2]);

        draw_progress(frame, app, chunks[0]);
        draw_navbar(frame, app, chunks[1]);
        draw_page(frame, app, body[0]);
        draw_particles(frame, app, body[1]);
        draw_status(frame, app, chunks[3]);
    }

    if app.perf_visible {
        draw_perf(frame, app, size);
    }
    if app.contact.open {
        draw_contact(frame, app, size);
    }
    if app.unlocked {
        draw_easter_egg(frame, size);
    }
}

fn draw_particles(frame: &mut Frame, app: &App, area: Rect) {
    let points: Vec<(f64, f64)> = app.particles.projected().collect();
    let color = rgb(app.favicon.end_rgb());
    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([-FIELD_BOUND, FIELD_BOUND])
        .y_bounds([-FIELD_BOUND, FIELD_BOUND])
        .paint(|ctx| {
            ctx.draw(&Points {
                coords: &points,
                color,
            })
        });
    frame.render_widget(canvas, area);
}

fn draw_intro(frame: &mut Frame, app: &App, area: Rect) {
    let letters: Vec<Span> = app
        .intro_shown
        .iter()
        .map(|l| {
            Span::styled(
                format!(" {} ", l),
                Style::default()
                    .fg(rgb(app.favicon.start_rgb()))
                    .add_modifier(Modifier::BOLD),
            )
        })
        .collect();

    let mut lines = vec![Line::from(letters), Line::from("")];
    if let Some(ref subtitle) = app.subtitle {
        lines.push(Line::from(Span::styled(
            subtitle.as_str(),
            Style::default().fg(Color::Gray),
        )));
    }

    let rect = centered(area, 40, 5);
    frame.render_widget(Clear, rect);
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::NONE));
    frame.render_widget(paragraph, rect);
}

fn draw_progress(frame: &mut Frame, app: &App, area: Rect) {
    let width = area.width as usize;
    let filled = (width as f64 * app.progress).round() as usize;
    let empty = width.saturating_sub(filled);
    let line = Line::from(vec![
        Span::styled("█".repeat(filled), Style::default().fg(rgb(app.favicon.start_rgb()))),
        Span::styled("░".repeat(empty), Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_navbar(frame: &mut Frame, app: &App, area: Rect) {
    let current = app.current_section();
    let favicon = Span::styled(
        format!(" {} ", app.favicon.glyph),
        Style::default()
            .fg(Color::Black)
            .bg(rgb(app.favicon.start_rgb()))
            .add_modifier(Modifier::BOLD),
    );
    let tail = Span::styled(" ", Style::default().bg(rgb(app.favicon.end_rgb())));

    let mut spans = vec![favicon, tail, Span::raw(format!(" {}  ", app.name))];
    for section in Section::ALL {
        let style = if section == current {
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {} ", section.title()), style));
    }

    let block = if app.navbar_condensed {
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::Magenta))
            .style(Style::default().bg(Color::Black))
    } else {
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
    };
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn draw_page(frame: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = app
        .page
        .iter()
        .map(|l| match l {
            PageLine::Heading(section) => Line::from(Span::styled(
                format!("── {} ──", section.title()),
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            )),
            PageLine::Text(text) => Line::from(text.as_str()),
            PageLine::Blank => Line::from(""),
        })
        .collect();

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::LEFT | Borders::RIGHT))
        .scroll((app.scroll.offset as u16, 0));
    frame.render_widget(paragraph, area);
}

fn draw_status(frame: &mut Frame, app: &App, area: Rect) {
    let section = Span::styled(
        format!(" {} ", app.current_section().title()),
        Style::default()
            .fg(Color::Black)
            .bg(Color::Magenta)
            .add_modifier(Modifier::BOLD),
    );
    let progress = Span::styled(
        format!(" {:>3.0}% ", app.progress * 100.0),
        Style::default().fg(Color::White).bg(Color::DarkGray),
    );
    let hints = Span::styled(
        " Ctrl+Shift+P:perf  c:contact  q:quit ",
        Style::default().fg(Color::DarkGray),
    );
    frame.render_widget(Paragraph::new(Line::from(vec![section, progress, hints])), area);
}

fn draw_perf(frame: &mut Frame, app: &App, area: Rect) {
    let width = 30.min(area.width);
    let rect = Rect::new(area.x + area.width - width, area.y, width, 7.min(area.height));

    let row = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{:<12}", label), Style::default().fg(Color::DarkGray)),
            Span::raw(value),
        ])
    };
    let lines = match &app.perf {
        Some(s) => vec![
            row("FPS", s.fps.to_string()),
            row("Frame time", s.frame_time_ms.map_or("-".into(), |v| format!("{:.1} ms", v))),
            row("Uptime", format!("{:.1} s", s.uptime_ms as f64 / 1000.0)),
            row(
                "Interactive",
                s.interactive_after_ms
                    .map_or("-".into(), |v| format!("{} ms", v)),
            ),
            row("Memory", s.resident_mb.map_or("-".into(), |v| format!("{:.1} MB", v))),
        ],
        None => vec![Line::from("sampling...")],
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            " Performance ",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ))
        .border_style(Style::default().fg(Color::DarkGray));
    frame.render_widget(Clear, rect);
    frame.render_widget(Paragraph::new(lines).block(block), rect);
}

fn draw_contact(frame: &mut Frame, app: &App, area: Rect) {
    let contact = &app.contact;
    let mut lines = Vec::new();
    for (field, label) in [
        (Field::Name, "Name"),
        (Field::Email, "Email"),
        (Field::Message, "Message"),
    ] {
        let focused = contact.focus == field;
        let marker = if focused { "▸ " } else { "  " };
        let style = if focused {
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{}{:<9}", marker, label), style),
            Span::raw(contact.value(field).to_string()),
        ]));
        match contact.error(field) {
            Some(err) => lines.push(Line::from(Span::styled(
                format!("  {}", err),
                Style::default().fg(Color::Red),
            ))),
            None => lines.push(Line::from("")),
        }
    }
    if let Some(ref status) = contact.status {
        lines.push(Line::from(Span::styled(
            status.as_str(),
            Style::default().fg(Color::Green),
        )));
    }

    let rect = centered(area, 60, 10);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Contact (Tab: next  Enter: check  Esc: close) ")
        .border_style(Style::default().fg(Color::Magenta));
    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        rect,
    );
}

fn draw_easter_egg(frame: &mut Frame, area: Rect) {
    let rect = centered(area, 44, 7);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "↑ ↑ ↓ ↓ ← → ← → B A",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("You found the secret. Esc to close."),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block),
        rect,
    );
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

fn dispatch(app: &mut App, showcase: &mut Showcase, event: ShowcaseEvent) {
    for out in showcase.handle(event) {
        app.apply(&out);
    }
}

pub async fn run_tui(config: FolioConfig) -> anyhow::Result<()> {
    let (timers, mut fired_rx) = TokioTimers::new();
    let mut showcase = Showcase::new(config.clone(), Arc::new(timers))?;
    let mut app = App::new(&config);

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = terminal::disable_raw_mode();
        let _ = io::stdout().execute(LeaveAlternateScreen);
        original_hook(info);
    }));

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_event_loop(&mut terminal, &mut app, &mut showcase, &mut fired_rx).await;

    terminal::disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;

    result
}

async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    showcase: &mut Showcase,
    fired_rx: &mut mpsc::UnboundedReceiver<TimerId>,
) -> anyhow::Result<()> {
    for out in showcase.start()? {
        app.apply(&out);
    }

    loop {
        let size = terminal.size()?;
        if let Some(event) = app.set_viewport(body_rows(size.height)) {
            dispatch(app, showcase, event);
        }

        app.particles.advance(showcase.elapsed());
        terminal.draw(|f| draw(f, app))?;
        dispatch(app, showcase, ShowcaseEvent::Frame);

        let timeout = Duration::from_millis(16);

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    for event in app.handle_key(key) {
                        dispatch(app, showcase, event);
                    }
                }
            }
        }

        while let Ok(id) = fired_rx.try_recv() {
            dispatch(app, showcase, ShowcaseEvent::Timer(id));
        }

        if app.should_quit {
            break;
        }
        // Timer tasks need the runtime between frames.
        tokio::task::yield_now().await;
    }

    tracing::info!(
        "Leaving after {:?} ({})",
        showcase.elapsed(),
        match showcase.phase() {
            Phase::Intro => "during intro",
            Phase::Page => "on page",
        }
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use folio_engine::perf::PerfSnapshot;
    use folio_engine::OutputEvent;
    use ratatui::backend::TestBackend;

    fn screen(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn app() -> App {
        let mut config = FolioConfig::default();
        config.particles.seed = Some(4);
        let mut app = App::new(&config);
        app.set_viewport(body_rows(40));
        app
    }

    fn step(label: &str) -> OutputEvent {
        OutputEvent::IntroStep {
            index: 0,
            label: label.into(),
        }
    }

    #[test]
    fn body_rows_leaves_room_for_chrome() {
        assert_eq!(body_rows(40), 35);
        assert_eq!(body_rows(3), 0);
    }

    #[test]
    fn centered_fits_inside() {
        let r = centered(Rect::new(0, 0, 10, 4), 40, 5);
        assert_eq!(r, Rect::new(0, 0, 10, 4));
        let r = centered(Rect::new(0, 0, 100, 40), 40, 6);
        assert_eq!(r, Rect::new(30, 17, 40, 6));
    }

    #[test]
    fn intro_shows_revealed_letters_only() {
        let mut app = app();
        app.apply(&step("Р"));
        app.apply(&step("О"));
        let text = screen(&app);
        assert!(text.contains(" Р "));
        assert!(text.contains(" О "));
        assert!(!text.contains("Frontend Developer"));

        app.apply(&OutputEvent::IntroSubtitle {
            text: "Frontend Developer".into(),
        });
        assert!(screen(&app).contains("Frontend Developer"));
    }

    #[test]
    fn page_renders_after_intro() {
        let mut app = app();
        app.apply(&OutputEvent::IntroComplete);
        let text = screen(&app);
        assert!(text.contains("РОТМАН"));
        assert!(text.contains("Projects"));
        assert!(text.contains("c:contact"));
    }

    #[test]
    fn easter_egg_overlay() {
        let mut app = app();
        app.apply(&OutputEvent::IntroComplete);
        app.apply(&OutputEvent::Unlocked);
        assert!(screen(&app).contains("You found the secret"));
        app.apply(&OutputEvent::Relocked);
        assert!(!screen(&app).contains("You found the secret"));
    }

    #[test]
    fn perf_overlay_shows_sample() {
        let mut app = app();
        app.apply(&OutputEvent::IntroComplete);
        app.apply(&OutputEvent::PerfPanel { visible: true });
        assert!(screen(&app).contains("sampling..."));
        app.apply(&OutputEvent::PerfSample(PerfSnapshot {
            fps: 60,
            frame_time_ms: Some(16.7),
            uptime_ms: 4_200,
            interactive_after_ms: Some(2_500),
            resident_mb: None,
        }));
        let text = screen(&app);
        assert!(text.contains("Performance"));
        assert!(text.contains("16.7 ms"));
        assert!(text.contains("2500 ms"));
    }
}
