use anyhow::{Context, Result, bail};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, MouseEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use richview_config::{Config, ViewportConfig};
use richview_engine::{
    ChildrenRenderer, Decoration, Document, Node, NodeEntry, NodeId, Path, Range, RenderPass,
    RenderRequest, RenderRow, RowProps, ViewportState, generate_huge_document, parse_plain_text,
    search_decorations,
};
use std::{
    cmp::Ordering,
    collections::BTreeMap,
    env, fs,
    io::{Stdout, stdout},
    path::PathBuf,
    process,
};

/// Rows of the generated document when no file is given.
const HUGE_HEADINGS: usize = 100;
const HUGE_PARAGRAPHS: usize = 7;

/// Status bar plus the content block's top and bottom borders.
const CHROME_LINES: u16 = 3;

type Lines = Vec<Line<'static>>;

#[derive(Debug, Default, PartialEq)]
struct Args {
    file: Option<PathBuf>,
    search: Option<String>,
    /// Render one pass at the configured viewport and print it instead of
    /// starting the TUI
    print: bool,
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut parsed = Args::default();
    let mut rest = args.iter().skip(1);
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--search" => {
                let term = rest.next().context("--search needs a term")?;
                parsed.search = Some(term.clone());
            }
            "--print" => parsed.print = true,
            flag if flag.starts_with("--") => bail!("unknown option {flag}"),
            _ if parsed.file.is_none() => parsed.file = Some(PathBuf::from(arg)),
            _ => bail!("unexpected argument {arg}"),
        }
    }
    Ok(parsed)
}

/// Turns a row into styled terminal lines: one line per row, text leaves in
/// order, decorations and the selection applied per character.
struct TerminalRows<'a> {
    document: &'a Document,
}

impl RenderRow for TerminalRows<'_> {
    type Output = Lines;

    fn render_row(&mut self, props: RowProps<'_>) -> Lines {
        let gutter = if props.is_selected {
            Span::styled("▌ ", Style::default().fg(Color::Cyan))
        } else {
            Span::raw("  ")
        };
        let base = match props.node {
            Node::Element(element) if element.kind == "heading" => {
                Style::default().fg(Color::LightBlue)
            }
            _ => Style::default(),
        };

        let mut leaves = Vec::new();
        collect_leaves(self.document, props.id, props.path.clone(), &mut leaves);

        let mut spans = vec![gutter];
        for (path, text) in leaves {
            spans.extend(styled_leaf(
                &path,
                text,
                base,
                props.decorations,
                props.selection,
            ));
        }
        vec![Line::from(spans)]
    }
}

fn collect_leaves<'d>(
    document: &'d Document,
    id: NodeId,
    path: Path,
    out: &mut Vec<(Path, &'d str)>,
) {
    match document.node(id) {
        Some(Node::Text(text)) => out.push((path, text.text.as_str())),
        Some(Node::Element(element)) => {
            for (index, &child) in element.children().iter().enumerate() {
                collect_leaves(document, child, path.child(index), out);
            }
        }
        None => {}
    }
}

/// Char span of `range` inside the leaf at `leaf`, if any.
fn leaf_span(range: &Range, leaf: &Path, len: usize) -> Option<(usize, usize)> {
    let start = range.start();
    let end = range.end();
    let from = match start.path.cmp(leaf) {
        Ordering::Less => 0,
        Ordering::Equal => start.offset.min(len),
        Ordering::Greater => return None,
    };
    let to = match end.path.cmp(leaf) {
        Ordering::Greater => len,
        Ordering::Equal => end.offset.min(len),
        Ordering::Less => return None,
    };
    (from < to).then_some((from, to))
}

fn mark_style(marks: &BTreeMap<String, String>) -> Style {
    let mut style = Style::default();
    if marks.get("highlight").map(String::as_str) == Some("search") {
        style = style.bg(Color::Yellow).fg(Color::Black);
    }
    if marks.get("style").map(String::as_str) == Some("heading") {
        style = style.add_modifier(Modifier::BOLD);
    }
    style
}

fn styled_leaf(
    path: &Path,
    text: &str,
    base: Style,
    decorations: &[Decoration],
    selection: Option<&Range>,
) -> Vec<Span<'static>> {
    let chars: Vec<char> = text.chars().collect();
    let mut styles = vec![base; chars.len()];

    for decoration in decorations {
        if let Some((from, to)) = leaf_span(&decoration.range, path, chars.len()) {
            let patch = mark_style(&decoration.marks);
            for style in &mut styles[from..to] {
                *style = style.patch(patch);
            }
        }
    }
    if let Some((from, to)) = selection.and_then(|range| leaf_span(range, path, chars.len())) {
        for style in &mut styles[from..to] {
            *style = style.add_modifier(Modifier::UNDERLINED);
        }
    }

    let mut spans = Vec::new();
    let mut run = String::new();
    let mut run_style = base;
    for (ch, style) in chars.into_iter().zip(styles) {
        if style != run_style && !run.is_empty() {
            spans.push(Span::styled(std::mem::take(&mut run), run_style));
        }
        run_style = style;
        run.push(ch);
    }
    if !run.is_empty() {
        spans.push(Span::styled(run, run_style));
    }
    spans
}

struct App {
    title: String,
    document: Document,
    matches: Vec<Decoration>,
    renderer: ChildrenRenderer,
    viewport: ViewportConfig,
    cursor: usize,
    /// Scroll position in terminal lines
    scroll: usize,
    page_lines: usize,
}

impl App {
    fn new(
        title: String,
        document: Document,
        search: Option<&str>,
        viewport: ViewportConfig,
    ) -> Self {
        let matches = search
            .map(|term| search_decorations(&document, term))
            .unwrap_or_default();
        log::info!(
            "{title}: {} rows, {} search matches",
            document.children_of(document.root()).len(),
            matches.len()
        );

        Self {
            title,
            document,
            matches,
            renderer: ChildrenRenderer::new(),
            viewport,
            cursor: 0,
            scroll: 0,
            page_lines: 0,
        }
    }

    fn row_count(&self) -> usize {
        self.document.children_of(self.document.root()).len()
    }

    fn row_lines(&self) -> usize {
        usize::from(self.viewport.terminal_row_lines)
    }

    fn max_scroll(&self) -> usize {
        (self.row_count() * self.row_lines()).saturating_sub(self.page_lines)
    }

    /// The cursor row's full span.
    fn selection(&self) -> Option<Range> {
        self.document.range_for_path(&Path::root().child(self.cursor))
    }

    fn move_cursor(&mut self, delta: isize) {
        let last = self.row_count().saturating_sub(1);
        self.cursor = self.cursor.saturating_add_signed(delta).min(last);
        self.keep_cursor_visible();
    }

    fn keep_cursor_visible(&mut self) {
        let top = self.cursor * self.row_lines();
        let bottom = top + self.row_lines();
        if top < self.scroll {
            self.scroll = top;
        } else if bottom > self.scroll + self.page_lines {
            self.scroll = bottom.saturating_sub(self.page_lines);
        }
    }

    fn scroll_by(&mut self, delta: isize) {
        self.scroll = self.scroll.saturating_add_signed(delta).min(self.max_scroll());
        // Drag the cursor along so it stays on screen
        let first = self.scroll.div_ceil(self.row_lines());
        let last = (self.scroll + self.page_lines) / self.row_lines();
        self.cursor = self
            .cursor
            .clamp(first, last.saturating_sub(1).max(first))
            .min(self.row_count().saturating_sub(1));
    }

    fn page_down(&mut self) {
        self.scroll_by(self.page_lines as isize);
    }

    fn page_up(&mut self) {
        self.scroll_by(-(self.page_lines as isize));
    }

    fn top(&mut self) {
        self.cursor = 0;
        self.scroll = 0;
    }

    fn bottom(&mut self) {
        self.cursor = self.row_count().saturating_sub(1);
        self.scroll = self.max_scroll();
    }

    /// One render pass over the top-level blocks for a content area
    /// `height` lines tall.
    fn render_window(&mut self, height: u16) -> Result<RenderPass<Lines>> {
        self.page_lines = usize::from(height);
        let viewport = ViewportState::new(
            self.scroll as f64,
            f64::from(height),
            f64::from(self.viewport.terminal_row_lines),
        )
        .with_overscan(self.viewport.overscan);
        self.render(viewport)
    }

    fn render(&mut self, viewport: ViewportState) -> Result<RenderPass<Lines>> {
        let selection = self.selection();
        let document = &self.document;
        let request = RenderRequest::for_parent(document, document.root(), viewport)
            .with_decorations(&self.matches)
            .with_selection(selection.as_ref());

        // Plugin hook: headings get a bold mark over their whole text
        let headings = |entry: NodeEntry<'_>| match entry.node {
            Node::Element(element) if element.kind == "heading" => document
                .range_for_path(entry.path)
                .map(|range| vec![Decoration::new(range).with_mark("style", "heading")])
                .unwrap_or_default(),
            _ => Vec::new(),
        };

        let pass = self.renderer.render(
            document,
            &request,
            &headings,
            &mut TerminalRows { document },
        )?;
        Ok(pass)
    }
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let usage = format!(
        "Usage: {} [document.txt] [--search TERM] [--print]",
        args.first().map(String::as_str).unwrap_or("richview-cli")
    );

    let args = match parse_args(&args) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("{usage}");
            process::exit(1);
        }
    };

    let config = match Config::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            eprintln!(
                "Fix or remove the config file at {}",
                Config::config_path().display()
            );
            process::exit(1);
        }
    };

    init_logging(!args.print)?;
    log::info!("richview starting up");

    let (title, document) = match args.file.clone().or(config.document_path.clone()) {
        Some(path) => {
            let source = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read document {}", path.display()))?;
            (path.display().to_string(), parse_plain_text(&source))
        }
        None => (
            "huge document".to_string(),
            generate_huge_document(HUGE_HEADINGS, HUGE_PARAGRAPHS),
        ),
    };

    let mut app = App::new(title, document, args.search.as_deref(), config.viewport);

    if args.print {
        return print_window(&mut app);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

/// Logs go to stderr for `--print`, and to a file while the TUI owns the
/// screen.
fn init_logging(to_file: bool) -> Result<()> {
    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(log::LevelFilter::Info);
    if to_file {
        let log_path = env::temp_dir().join("richview.log");
        let file = fs::File::create(&log_path)
            .with_context(|| format!("Failed to create log file {}", log_path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn print_window(app: &mut App) -> Result<()> {
    let viewport = ViewportState::new(
        0.0,
        app.viewport.viewport_height,
        app.viewport.row_height,
    )
    .with_overscan(app.viewport.overscan);
    let pass = app.render(viewport)?;

    for row in &pass.rows {
        for line in &row.output {
            println!("{:>6} {:>6} {line}", row.index, row.key.to_string());
        }
    }
    for skipped in &pass.skipped {
        println!("{:>6} skipped: {}", skipped.index, skipped.error);
    }
    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        let size = terminal.size()?;
        let pass = app.render_window(size.height.saturating_sub(CHROME_LINES))?;
        terminal.draw(|f| ui(f, app, &pass))?;

        match event::read()? {
            Event::Key(key) => match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') => app.move_cursor(1),
                KeyCode::Up | KeyCode::Char('k') => app.move_cursor(-1),
                KeyCode::PageDown => app.page_down(),
                KeyCode::PageUp => app.page_up(),
                KeyCode::Home | KeyCode::Char('g') => app.top(),
                KeyCode::End | KeyCode::Char('G') => app.bottom(),
                _ => {}
            },
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollDown => app.scroll_by(1),
                MouseEventKind::ScrollUp => app.scroll_by(-1),
                _ => {}
            },
            _ => {}
        }
    }
}

fn ui(f: &mut Frame, app: &App, pass: &RenderPass<Lines>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(f.area());

    let block = Block::default()
        .borders(Borders::ALL)
        .title(app.title.as_str());
    let inner = block.inner(chunks[0]);
    f.render_widget(block, chunks[0]);

    let row_lines = app.viewport.terminal_row_lines;
    for row in &pass.rows {
        // The first row may start above the viewport
        let top = (row.offset - app.scroll as f64) as i64;
        let hidden = u16::try_from(-top).unwrap_or(0);
        let Ok(y) = u16::try_from(top.max(0)) else {
            continue;
        };
        if y >= inner.height {
            continue;
        }
        let height = row_lines
            .saturating_sub(hidden)
            .min(inner.height - y);
        if height == 0 {
            continue;
        }

        let area = Rect {
            x: inner.x,
            y: inner.y + y,
            width: inner.width,
            height,
        };
        let content = Paragraph::new(row.output.clone())
            .wrap(Wrap { trim: false })
            .scroll((hidden, 0));
        f.render_widget(content, area);
    }

    let window = match (pass.window.first(), pass.window.last()) {
        (Some(first), Some(last)) => format!("rows {first}..={last}"),
        _ => "no rows".to_string(),
    };
    let status = Line::from(vec![
        Span::styled(
            format!(
                " {window} of {} | rendered {} | skipped {} | matches {} ",
                app.row_count(),
                pass.rows.len(),
                pass.skipped.len(),
                app.matches.len()
            ),
            Style::default().bg(Color::Blue).fg(Color::White),
        ),
        Span::raw(" q: Quit | ↑/k ↓/j: Move | PgUp/PgDn: Page | g/G: Top/Bottom"),
    ]);
    f.render_widget(Paragraph::new(vec![status]), chunks[1]);
}
