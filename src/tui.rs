use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton, MouseEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Terminal;

use crate::config::GameConfig;
use crate::engine::World;
use crate::view::{self, ChunkWindow, Viewport, COVERED};

const CELL_W: u16 = 2; // one char + one space

pub fn run_tui(config: GameConfig) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(EnableMouseCapture)?;
    let _guard = TermGuard;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut world = World::new(config);
    let mut viewport = Viewport::new(0, 0, 1, 1).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    let mut window: Option<ChunkWindow> = None;
    let mut cursor = (0i64, 0i64);
    let mut centred = false;
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(250);
    let autodemo = std::env::var("INFINITE_MINESWEEPER_TUI_AUTODEMO").ok().is_some();
    let mut demo_step = 0usize;

    let res = loop {
        // Fit the viewport to the terminal before drawing so visibility is
        // current for every mine count the frame asks for.
        let inner = inner_area(layout(terminal.size()?)[1]);
        if viewport.resize(usize::from(inner.width / CELL_W), usize::from(inner.height)).is_ok() {
            if !centred {
                viewport.centre_on(cursor.0, cursor.1);
                centred = true;
            }
            viewport.scroll_to_include(cursor.0, cursor.1);
        }
        let current = viewport.chunk_window();
        if window != Some(current) {
            world.set_visibility(current);
            window = Some(current);
        }

        terminal.draw(|f| ui(f, &mut world, &viewport, cursor))?;

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break Ok(()),
                    KeyCode::Char('h') | KeyCode::Left => cursor.0 = cursor.0.wrapping_sub(1),
                    KeyCode::Char('l') | KeyCode::Right => cursor.0 = cursor.0.wrapping_add(1),
                    KeyCode::Char('k') | KeyCode::Up => cursor.1 = cursor.1.wrapping_sub(1),
                    KeyCode::Char('j') | KeyCode::Down => cursor.1 = cursor.1.wrapping_add(1),
                    KeyCode::Char('f') => { let _ = view::flag_at(&mut world, cursor.0, cursor.1); }
                    KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('r') => {
                        let _ = view::reveal_at(&mut world, cursor.0, cursor.1);
                    }
                    KeyCode::Char('n') => {
                        world = World::new(world.config());
                        window = None;
                    }
                    _ => {}
                },
                Event::Mouse(m) => {
                    if let MouseEventKind::Down(btn) = m.kind {
                        if let Some((wx, wy)) = pos_to_field(m.column, m.row, inner, &viewport) {
                            cursor = (wx, wy);
                            match btn {
                                MouseButton::Left => { let _ = view::reveal_at(&mut world, wx, wy); }
                                MouseButton::Right => { let _ = view::flag_at(&mut world, wx, wy); }
                                MouseButton::Middle => {}
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
            if autodemo {
                match demo_step {
                    0 => { let _ = view::reveal_at(&mut world, 0, 0); cursor = (3, 3); }
                    1 => { let _ = view::reveal_at(&mut world, cursor.0, cursor.1); }
                    2 => { let _ = view::flag_at(&mut world, -2, -2); }
                    3 => {}
                    _ => break Ok(()),
                }
                demo_step += 1;
            }
        }
    };

    terminal.show_cursor()?;
    res
}

fn layout(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(3)])
        .split(area)
}

fn ui(f: &mut ratatui::Frame, world: &mut World, viewport: &Viewport, cursor: (i64, i64)) {
    let root = layout(f.size());

    let status = if world.is_dead() {
        "Boom! You hit a mine. q to quit, n for a new field"
    } else {
        "Mouse: left=reveal, right=flag • Arrows/HJKL move • Enter/Space reveal • f flag • n new • q quit"
    };
    let header = Paragraph::new(status)
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Infinite Minesweeper"));
    f.render_widget(header, root[0]);

    draw_field(f, world, viewport, root[1], cursor);

    let footer = Paragraph::new(format!(
        "Seed: {}  Chunks: {}  Cursor: {},{}",
        world.seed(),
        world.chunk_count(),
        cursor.0,
        cursor.1
    ))
    .style(Style::default().fg(Color::DarkGray))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, root[2]);
}

fn draw_field(f: &mut ratatui::Frame, world: &mut World, viewport: &Viewport, area: Rect, cursor: (i64, i64)) {
    let mut lines: Vec<Line> = Vec::with_capacity(viewport.height());
    for row in 0..viewport.height() as i64 {
        let wy = viewport.y().wrapping_add(row);
        let mut spans: Vec<Span> = Vec::with_capacity(viewport.width());
        for col in 0..viewport.width() as i64 {
            let wx = viewport.x().wrapping_add(col);
            let mut ch = view::glyph(world, wx, wy, false);

            let mut style = match ch {
                '*' | '@' | 'X' => Style::default().fg(Color::Red),
                'F' => Style::default().fg(Color::Yellow),
                COVERED => Style::default().fg(Color::DarkGray),
                c => number_style(c.to_digit(10).unwrap_or(0)),
            };

            if cursor == (wx, wy) {
                style = style.add_modifier(Modifier::REVERSED);
                if ch == ' ' { ch = COVERED; }
            }

            spans.push(Span::styled(format!("{} ", ch), style));
        }
        lines.push(Line::from(spans));
    }

    let block = Block::default().borders(Borders::ALL).title(format!("Field @ {},{}", viewport.x(), viewport.y()));
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn number_style(n: u32) -> Style {
    match n {
        0 => Style::default().fg(Color::Gray),
        1 => Style::default().fg(Color::Blue),
        2 => Style::default().fg(Color::Green),
        3 => Style::default().fg(Color::Red),
        4 => Style::default().fg(Color::Magenta),
        5 => Style::default().fg(Color::Yellow),
        6 => Style::default().fg(Color::Cyan),
        _ => Style::default().fg(Color::White),
    }
}

fn inner_area(area: Rect) -> Rect {
    // Match Block::inner() for Borders::ALL: shrink by 1 on each side
    Rect { x: area.x.saturating_add(1), y: area.y.saturating_add(1), width: area.width.saturating_sub(2), height: area.height.saturating_sub(2) }
}

fn pos_to_field(mx: u16, my: u16, inner: Rect, viewport: &Viewport) -> Option<(i64, i64)> {
    if mx < inner.x || my < inner.y { return None; }
    let col = i64::from((mx - inner.x) / CELL_W);
    let row = i64::from(my - inner.y);
    let (wx, wy) = (viewport.x().wrapping_add(col), viewport.y().wrapping_add(row));
    if viewport.contains(wx, wy) { Some((wx, wy)) } else { None }
}

struct TermGuard;
impl Drop for TermGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = std::io::stdout();
        let _ = stdout.execute(DisableMouseCapture);
        let _ = stdout.execute(LeaveAlternateScreen);
    }
}
