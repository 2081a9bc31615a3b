use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind}, execute, terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen}};
use ratatui::{backend::CrosstermBackend, Terminal, widgets::{Block, Borders, List, ListItem, Paragraph, ListState}, layout::{Layout, Constraint, Direction}, style::{Style, Modifier, Color}};

use tagged_todos::config::Config;
use tagged_todos::domain::{repository::{TagRepository, TodoRepository}, tag::{CreateTag, Tag}, todo::{CreateTodo, Todo, UpdateTodo}};
use tagged_todos::infrastructure::{seed, store::Store, tag_repo::SqliteTagRepository, todo_repo::SqliteTodoRepository};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    let store = Store::connect(&config.database_url).await.with_context(|| format!("opening {}", config.database_url))?;
    store.init().await?;
    seed::populate_if_empty(&store).await?;
    let todos = SqliteTodoRepository::new(store.clone());
    let tags = SqliteTagRepository::new(store.clone());

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, todos, tags, &config.database_url).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    store.close().await;
    res
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode { View, CreateTodo, EditTodo, CreateTag }

#[derive(Clone, Copy, PartialEq, Eq)]
enum Filter { All, Pending, Done }

impl Filter {
    fn label(self) -> &'static str { match self { Filter::All => "All", Filter::Pending => "Pending", Filter::Done => "Done" } }
}

struct App<T: TodoRepository, G: TagRepository> {
    todos: T,
    tags: G,
    items: Vec<Todo>,
    all_tags: Vec<Tag>,
    selected: usize,
    tag_cursor: usize,
    last_tick: Instant,
    mode: Mode,
    list_state: ListState,
    filter: Filter,
    filtered_indices: Vec<usize>,
    draft: String,
    status: String,
}

impl<T: TodoRepository, G: TagRepository> App<T, G> {
    async fn load(&mut self) -> Result<()> {
        self.items = self.todos.list_all().await?;
        self.all_tags = self.tags.list_all().await?;
        if self.tag_cursor >= self.all_tags.len() { self.tag_cursor = self.all_tags.len().saturating_sub(1); }
        self.recompute_filtered();
        Ok(())
    }

    fn recompute_filtered(&mut self) {
        self.filtered_indices.clear();
        for (i, t) in self.items.iter().enumerate() {
            let include = match self.filter {
                Filter::All => true,
                Filter::Pending => !t.completed,
                Filter::Done => t.completed,
            };
            if include { self.filtered_indices.push(i); }
        }
        // Clamp selection within filtered bounds
        let len = self.filtered_indices.len();
        if len == 0 { self.selected = 0; self.list_state.select(None); }
        else { if self.selected >= len { self.selected = len - 1; } self.list_state.select(Some(self.selected)); }
    }

    fn selected_todo(&self) -> Option<&Todo> {
        self.filtered_indices.get(self.selected).and_then(|&idx| self.items.get(idx))
    }

    fn selected_tag(&self) -> Option<&Tag> { self.all_tags.get(self.tag_cursor) }

    /// Errors from the store are shown in the footer instead of ending the session.
    fn report<V>(&mut self, result: tagged_todos::domain::error::RepoResult<V>, ok: &str) {
        self.status = match result { Ok(_) => ok.to_string(), Err(e) => format!("error: {e}") };
    }
}

async fn run_app<T: TodoRepository, G: TagRepository>(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, todos: T, tags: G, database_url: &str) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut app = App { todos, tags, items: vec![], all_tags: vec![], selected: 0, tag_cursor: 0, last_tick: Instant::now(), mode: Mode::View, list_state: ListState::default(), filter: Filter::All, filtered_indices: Vec::new(), draft: String::new(), status: String::new() };
    app.load().await?;

    loop {
        terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Min(1),
                    Constraint::Length(3),
                ])
                .split(f.size());

            let header = Paragraph::new("Enter: toggle, n: new, e: rename, d: delete, f: filter, t: new tag, </>: pick tag, a: attach, r: detach, x: clear tags, q: quit")
                .block(Block::default().borders(Borders::ALL).title("tagged-todos"));
            f.render_widget(header, chunks[0]);

            let middle = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(chunks[1]);

            let list_items: Vec<ListItem> = app.filtered_indices.iter().filter_map(|&idx| app.items.get(idx)).map(|t| {
                let mark = if t.completed { "[x]" } else { "[ ]" };
                let labels: Vec<&str> = t.tags.iter().map(|g| g.title.as_str()).collect();
                if labels.is_empty() { ListItem::new(format!("{} {}", mark, t.title)) }
                else { ListItem::new(format!("{} {}  #{}", mark, t.title, labels.join(" #"))) }
            }).collect();
            if app.filtered_indices.is_empty() { app.list_state.select(None); } else { app.list_state.select(Some(app.selected)); }
            let list = List::new(list_items)
                .block(Block::default().borders(Borders::ALL).title(format!("todos [{}]", app.filter.label())))
                .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD | Modifier::REVERSED))
                .highlight_symbol(">> ");
            f.render_stateful_widget(list, middle[0], &mut app.list_state);

            let tag_lines: Vec<String> = app.all_tags.iter().enumerate().map(|(i, g)| {
                let cursor = if i == app.tag_cursor { ">" } else { " " };
                format!("{} {} ({} todos)", cursor, g.title, g.todos.len())
            }).collect();
            let detail = match app.selected_todo() {
                Some(t) => format!("Title: {}\nOrder: {}\nDone: {}\n\nTags:\n{}", t.title, t.order, t.completed, tag_lines.join("\n")),
                None => format!("Tags:\n{}", tag_lines.join("\n")),
            };
            let details = Paragraph::new(detail)
                .block(Block::default().borders(Borders::ALL).title("details"));
            f.render_widget(details, middle[1]);

            let footer_text = match app.mode {
                Mode::View => format!("DATABASE_URL={}  |  Filter=[{}]  |  {}", database_url, app.filter.label(), app.status),
                Mode::CreateTodo => format!("New todo: {}_  |  (Enter to save, Esc to cancel)", app.draft),
                Mode::EditTodo => format!("Rename: {}_  |  (Enter to save, Esc to cancel)", app.draft),
                Mode::CreateTag => format!("New tag: {}_  |  (Enter to save, Esc to cancel)", app.draft),
            };
            let footer = Paragraph::new(footer_text)
                .block(Block::default().borders(Borders::ALL).title(match app.mode { Mode::View => "info", Mode::CreateTodo => "create", Mode::EditTodo => "edit", Mode::CreateTag => "tag" }));
            f.render_widget(footer, chunks[2]);
        })?;

        let timeout = tick_rate.saturating_sub(app.last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                // Only act on key presses; ignore repeats and releases to prevent duplicate input
                if key.kind != KeyEventKind::Press { continue; }
                match app.mode {
                    Mode::View => match key.code {
                        KeyCode::Char('q') => break,
                        KeyCode::Up => { if app.selected > 0 { app.selected -= 1; } }
                        KeyCode::Down => { let len = app.filtered_indices.len(); if app.selected + 1 < len { app.selected += 1; } }
                        KeyCode::Left | KeyCode::Char('<') => { app.tag_cursor = app.tag_cursor.saturating_sub(1); }
                        KeyCode::Right | KeyCode::Char('>') => { if app.tag_cursor + 1 < app.all_tags.len() { app.tag_cursor += 1; } }
                        KeyCode::Enter => {
                            if let Some(todo) = app.selected_todo() {
                                let (id, completed) = (todo.id, todo.completed);
                                let res = app.todos.update(id, UpdateTodo { completed: Some(!completed), ..Default::default() }).await;
                                app.report(res, "toggled");
                                app.load().await?;
                            }
                        }
                        KeyCode::Char('n') => { app.mode = Mode::CreateTodo; app.draft.clear(); }
                        KeyCode::Char('t') => { app.mode = Mode::CreateTag; app.draft.clear(); }
                        KeyCode::Char('e') => {
                            if let Some(title) = app.selected_todo().map(|t| t.title.clone()) {
                                app.mode = Mode::EditTodo;
                                app.draft = title;
                            }
                        }
                        KeyCode::Char('d') => {
                            if let Some(id) = app.selected_todo().map(|t| t.id) {
                                let res = app.todos.delete(id).await;
                                app.report(res, "deleted");
                                if app.selected > 0 { app.selected -= 1; }
                                app.load().await?;
                            }
                        }
                        KeyCode::Char('a') | KeyCode::Char('r') => {
                            let target = app.selected_todo().map(|t| t.id).zip(app.selected_tag().map(|g| g.id));
                            if let Some((todo, tag)) = target {
                                if key.code == KeyCode::Char('a') {
                                    let res = app.todos.add_tag(todo, tag).await;
                                    app.report(res, "tag attached");
                                } else {
                                    let res = app.todos.remove_tag(todo, tag).await;
                                    app.report(res, "tag detached");
                                }
                                app.load().await?;
                            }
                        }
                        KeyCode::Char('x') => {
                            if let Some(id) = app.selected_todo().map(|t| t.id) {
                                let res = app.todos.remove_all_tags(id).await;
                                app.report(res, "tags cleared");
                                app.load().await?;
                            }
                        }
                        KeyCode::Char('f') => {
                            app.filter = match app.filter { Filter::All => Filter::Pending, Filter::Pending => Filter::Done, Filter::Done => Filter::All };
                            app.recompute_filtered();
                        }
                        _ => {}
                    },
                    Mode::CreateTodo | Mode::EditTodo | Mode::CreateTag => match key.code {
                        KeyCode::Esc => { app.mode = Mode::View; app.draft.clear(); }
                        KeyCode::Enter => {
                            let title = app.draft.trim().to_string();
                            if !title.is_empty() {
                                match app.mode {
                                    Mode::CreateTodo => {
                                        let order = app.items.iter().map(|t| t.order).max().unwrap_or(0) + 1;
                                        let res = app.todos.create(CreateTodo::new(title).with_order(order)).await;
                                        app.report(res, "created");
                                    }
                                    Mode::EditTodo => {
                                        if let Some(id) = app.selected_todo().map(|t| t.id) {
                                            let res = app.todos.update(id, UpdateTodo { title: Some(title), ..Default::default() }).await;
                                            app.report(res, "renamed");
                                        }
                                    }
                                    Mode::CreateTag => {
                                        let res = app.tags.create(CreateTag::new(title)).await;
                                        app.report(res, "tag created");
                                    }
                                    Mode::View => {}
                                }
                            }
                            app.mode = Mode::View;
                            app.draft.clear();
                            app.load().await?;
                        }
                        KeyCode::Backspace => { app.draft.pop(); }
                        KeyCode::Char(c) => app.draft.push(c),
                        KeyCode::Left | KeyCode::Right | KeyCode::Up | KeyCode::Down => { /* ignore nav in input */ }
                        _ => {}
                    },
                }
            }
        }
        if app.last_tick.elapsed() >= tick_rate {
            app.last_tick = Instant::now();
        }
    }
    Ok(())
}
