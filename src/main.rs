mod app;
mod event;
mod logging;
mod ui;

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Wrap};
use tracing::{info, warn};

use grammr::config::Config;
use grammr::content::{ExerciseKind, Lesson, LessonLibrary};

use app::{App, AppScreen};
use event::{AppEvent, EventHandler};
use ui::components::lesson_view::LessonView;
use ui::components::practice_area::PracticeArea;
use ui::components::progress_bar::ProgressBar;
use ui::components::progress_dots::ProgressDots;
use ui::layout::{AppLayout, PracticeLayout, centered_rect, pack_hint_lines};
use ui::theme::Theme;

#[derive(Parser)]
#[command(name = "grammr", version, about = "Terminal grammar lessons with hands-on practice")]
struct Cli {
    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, help = "Fixed shuffle seed for reproducible practice")]
    seed: Option<u64>,

    #[arg(short, long, help = "Open the lesson with this id")]
    lesson: Option<String>,

    #[arg(long, help = "Directory with extra lesson files")]
    lessons_dir: Option<PathBuf>,

    #[arg(long, help = "Only check answers on Enter")]
    no_auto_check: bool,

    #[arg(long, help = "Read example sentences aloud")]
    narrate: bool,

    #[arg(long, help = "List available lessons and exit")]
    list: bool,

    #[arg(long, value_name = "FILE", help = "Validate a lesson file and exit")]
    check: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.check {
        let lesson = Lesson::from_file(path)
            .with_context(|| format!("{} is not a valid lesson", path.display()))?;
        println!(
            "{}: ok ({} {} item(s))",
            lesson.id,
            lesson.practice.len(),
            lesson.practice.kind().as_str()
        );
        return Ok(());
    }

    let mut config = Config::load()?;
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if let Some(dir) = &cli.lessons_dir {
        config.lessons_dir = dir.to_string_lossy().to_string();
    }
    if cli.no_auto_check {
        config.auto_check = false;
    }
    if cli.narrate {
        config.narrate_examples = true;
    }
    let themes = Theme::available_themes();
    let names: Vec<&str> = themes.iter().map(String::as_str).collect();
    config.normalize_theme(&names);

    match logging::init(&config.log_level) {
        Ok(path) => info!(log = %path.display(), "grammr starting"),
        Err(err) => eprintln!("warning: logging disabled: {err:#}"),
    }

    let lessons_dir = PathBuf::from(&config.lessons_dir);
    let library = LessonLibrary::load(Some(&lessons_dir)).context("loading lessons")?;

    if cli.list {
        for lesson in library.lessons() {
            println!(
                "{:<20} {:<32} {} ({} items)",
                lesson.id,
                lesson.title,
                lesson.practice.kind().title(),
                lesson.practice.len()
            );
        }
        return Ok(());
    }
    if library.is_empty() {
        bail!("no lessons found");
    }

    let start = match &cli.lesson {
        Some(id) => match library.position(id) {
            Some(index) => Some(index),
            None => bail!("unknown lesson `{id}` (try --list)"),
        },
        None => None,
    };

    let theme = Theme::load(&config.theme).unwrap_or_default();
    let tick_rate = config.tick_rate();
    let mut app = App::new(config, library, theme);
    if let Some(index) = start {
        app.open_lesson(index);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(tick_rate);

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        warn!(%err, "exited with error");
        eprintln!("Error: {err:?}");
    }
    info!("grammr exiting");

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        let size = terminal.size()?;
        app.screen_area = Rect::new(0, 0, size.width, size.height);
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
            AppEvent::Tick => app.tick(),
            AppEvent::Resize(_, _) => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    if app.close_popup() {
        return;
    }

    match app.screen {
        AppScreen::Menu => handle_menu_key(app, key),
        AppScreen::Lesson => handle_lesson_key(app, key),
        AppScreen::Practice => handle_practice_key(app, key),
        AppScreen::Finished => handle_finished_key(app, key),
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char(ch @ '1'..='9') => {
            if let Some(digit) = ch.to_digit(10) {
                app.open_lesson(digit as usize - 1);
            }
        }
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Enter => app.open_lesson(app.menu.selected),
        _ => {}
    }
}

fn handle_lesson_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.go_to_menu(),
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Up | KeyCode::Char('k') => {
            app.prev_example()
        }
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Down | KeyCode::Char('j') => {
            app.next_example()
        }
        KeyCode::Char('r') => app.narrate_example(),
        KeyCode::Char('?') => app.open_explanation(),
        KeyCode::Enter | KeyCode::Char('p') => app.start_practice(),
        _ => {}
    }
}

fn handle_practice_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            let index = app.lesson_index;
            app.open_lesson(index);
        }
        KeyCode::Char('?') => app.open_explanation(),
        KeyCode::Char(ch) if ch.is_ascii_digit() => {
            if let Some(digit) = ch.to_digit(10) {
                app.press_digit(digit);
            }
        }
        KeyCode::Char(ch) if ch.is_ascii_alphabetic() => app.press_letter(ch),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Enter => app.confirm(),
        KeyCode::Left => app.retreat(),
        KeyCode::Right => app.dispatch(grammr::session::PracticeEvent::AdvanceIfReady),
        KeyCode::PageUp => app.jump_relative(false),
        KeyCode::PageDown => app.jump_relative(true),
        KeyCode::Home => app.jump_to(0),
        _ => {}
    }
}

fn handle_finished_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Enter | KeyCode::Esc => {
            app.lesson_index = 0;
            app.go_to_menu();
        }
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => app.mouse_down(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => app.mouse_up(mouse.column, mouse.row),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Menu => render_menu(frame, app),
        AppScreen::Lesson => render_lesson(frame, app),
        AppScreen::Practice => render_practice(frame, app),
        AppScreen::Finished => render_finished(frame, app),
    }

    if let Some(text) = &app.popup {
        render_popup(frame, app, text);
    }
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: Rect, info: &str) {
    let colors = &app.theme.colors;
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " grammr ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {info}"),
            Style::default().fg(colors.muted()).bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

fn render_footer(frame: &mut ratatui::Frame, app: &App, area: Rect, hints: &[&str]) {
    let lines: Vec<Line> = pack_hint_lines(hints, area.width as usize)
        .into_iter()
        .map(|line| Line::from(Span::styled(line, Style::default().fg(app.theme.colors.muted()))))
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_menu(frame: &mut ratatui::Frame, app: &App) {
    let layout = AppLayout::new(frame.area());
    let info = format!("{} lessons", app.library.len());
    render_header(frame, app, layout.header, &info);

    let menu_area = centered_rect(60, 80, layout.main);
    frame.render_widget(&app.menu, menu_area);

    render_footer(
        frame,
        app,
        layout.footer,
        &["[1-9] Open lesson", "[j/k] Move", "[Enter] Open", "[q] Quit"],
    );
}

fn render_lesson(frame: &mut ratatui::Frame, app: &App) {
    let Some(lesson) = app.lesson() else {
        return;
    };
    let layout = AppLayout::new(frame.area());
    let info = format!(
        "Lesson {}/{}  {}",
        app.lesson_index + 1,
        app.library.len(),
        lesson.practice.kind().title()
    );
    render_header(frame, app, layout.header, &info);

    frame.render_widget(LessonView::new(lesson, app.example_index, app.theme), layout.main);

    if let Some(sidebar) = layout.sidebar {
        render_glossary(frame, app, lesson, sidebar);
    }

    render_footer(
        frame,
        app,
        layout.footer,
        &[
            "[Enter] Practice",
            "[←/→] Example",
            "[r] Read aloud",
            "[?] Glossary",
            "[Esc] Menu",
        ],
    );
}

fn render_glossary(frame: &mut ratatui::Frame, app: &App, lesson: &Lesson, area: Rect) {
    let colors = &app.theme.colors;
    let block = Block::bordered()
        .title(" Glossary ")
        .border_style(Style::default().fg(colors.border()));
    let mut lines: Vec<Line> = Vec::new();
    for (term, text) in &lesson.glossary {
        lines.push(Line::from(Span::styled(
            term.as_str(),
            Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(text.as_str(), Style::default().fg(colors.fg()))));
        lines.push(Line::from(""));
    }
    frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: true }), area);
}

fn practice_hints(kind: ExerciseKind) -> &'static [&'static str] {
    match kind {
        ExerciseKind::Sequence => &[
            "[a-z] Add word",
            "[Backspace] Remove",
            "[Enter] Check",
            "[←/→] Items",
            "[?] Explain",
            "[Esc] Lesson",
        ],
        ExerciseKind::Blank => &["[a-z] Choose", "[Enter] Next", "[←/→] Items", "[?] Explain", "[Esc] Lesson"],
        ExerciseKind::Select => &["[a-z] Pick word", "[Enter] Next", "[←/→] Items", "[?] Explain", "[Esc] Lesson"],
        ExerciseKind::Classify => &[
            "[a-z] Pick up",
            "[1-9] Drop / return",
            "[Enter] Check",
            "[←/→] Items",
            "[?] Explain",
            "[Esc] Lesson",
        ],
    }
}

fn render_practice(frame: &mut ratatui::Frame, app: &App) {
    let Some(view) = &app.view else {
        return;
    };
    let colors = &app.theme.colors;
    let layout = PracticeLayout::new(frame.area());

    let title = app.lesson().map(|l| l.title.as_str()).unwrap_or_default();
    let info = if view.completed {
        format!("{title}  done")
    } else {
        format!("{title}  item {}/{}", view.index + 1, view.total)
    };
    render_header(frame, app, layout.app.header, &info);

    frame.render_widget(
        ProgressDots::new(view.index, view.total, view.completed, app.theme),
        layout.dots,
    );
    frame.render_widget(PracticeArea::new(view, app.held, app.theme), layout.body);

    if let Some(progress) = layout.progress {
        frame.render_widget(ProgressBar::new("Progress", view.percent, app.theme), progress);
    }

    if let Some(sidebar) = layout.app.sidebar {
        let block = Block::bordered()
            .title(" Hint ")
            .border_style(Style::default().fg(colors.border()));
        let hint = view
            .item
            .as_ref()
            .and_then(|item| item.hint.clone())
            .unwrap_or_else(|| "Press ? for an explanation.".to_string());
        frame.render_widget(
            Paragraph::new(Span::styled(hint, Style::default().fg(colors.muted())))
                .block(block)
                .wrap(Wrap { trim: true }),
            sidebar,
        );
    }

    let hints: &[&str] = if view.completed {
        &["[Enter] Next lesson", "[←] Review", "[Esc] Lesson"]
    } else {
        practice_hints(view.kind)
    };
    render_footer(frame, app, layout.app.footer, hints);
}

fn render_finished(frame: &mut ratatui::Frame, app: &App) {
    let colors = &app.theme.colors;
    let area = centered_rect(50, 40, frame.area());
    let block = Block::bordered()
        .title(" Well done ")
        .border_style(Style::default().fg(colors.celebrate()));
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "You finished every lesson.",
            Style::default().fg(colors.celebrate()).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "[Enter] Back to menu   [q] Quit",
            Style::default().fg(colors.muted()),
        )),
    ];
    frame.render_widget(
        Paragraph::new(lines).block(block).alignment(Alignment::Center),
        area,
    );
}

fn render_popup(frame: &mut ratatui::Frame, app: &App, text: &str) {
    let colors = &app.theme.colors;
    let area = centered_rect(60, 50, frame.area());
    let block = Block::bordered()
        .title(" Explanation ")
        .border_style(Style::default().fg(colors.border_focused()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    frame.render_widget(Clear, area);
    frame.render_widget(block, area);
    frame.render_widget(
        Paragraph::new(text).style(Style::default().fg(colors.fg())).wrap(Wrap { trim: false }),
        rows[0],
    );
    frame.render_widget(
        Paragraph::new(Span::styled("any key to close", Style::default().fg(colors.muted())))
            .alignment(Alignment::Right),
        rows[1],
    );
}
