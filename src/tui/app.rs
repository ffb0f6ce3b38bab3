//! Action-menu application state and event loop.
//!
//! The TUI drives the same core as the CLI: it builds the declarative menu
//! tree for the selected task and dispatches chosen intents through the
//! mutation-feedback controller. Mutations are spawned onto the runtime so
//! the interface stays responsive while they settle; their toasts arrive
//! back through a channel drained once per tick. Overlapping mutations are
//! not serialized, matching the fire-and-forget interaction model.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};

use crate::api::HeightClient;
use crate::config::Theme;
use crate::dates::{format_due_relative, parse_due_input};
use crate::directory::Directory;
use crate::feedback::{
    perform_mutation, Toast, ToastId, ToastSink, ToastStyle, ToastUpdate,
};
use crate::fields::MutationIntent;
use crate::task::Task;
use crate::tui::colors::{TOAST_FAILURE, TOAST_PENDING, TOAST_SUCCESS};
use crate::tui::enums::AppState;
use crate::tui::input::InputField;
use crate::tui::menu::{build_action_menu, MenuAction, MenuEntry, MenuEntryKind};
use crate::tui::utils::centered_rect;

/// Events delivered from background tasks to the UI loop.
enum AppEvent {
    Toast(ToastCommand),
    Directory(Directory),
    DirectoryError(String),
}

enum ToastCommand {
    Push(ToastId, Toast),
    Update(ToastId, ToastUpdate),
}

/// Channel-backed toast sink handed to spawned mutations.
#[derive(Clone)]
struct EventToasts {
    tx: mpsc::Sender<AppEvent>,
    next_id: Arc<AtomicU64>,
}

impl ToastSink for EventToasts {
    fn push(&self, toast: Toast) -> ToastId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let _ = self.tx.send(AppEvent::Toast(ToastCommand::Push(id, toast)));
        id
    }

    fn update(&self, id: ToastId, update: ToastUpdate) {
        let _ = self.tx.send(AppEvent::Toast(ToastCommand::Update(id, update)));
    }
}

/// Action-menu application state.
pub struct ActionMenuApp {
    client: Arc<HeightClient>,
    theme: Theme,
    directory: Directory,
    state: AppState,
    picker_state: ListState,
    selected_task: Option<Task>,
    menu: Vec<MenuEntry>,
    menu_state: ListState,
    submenu_title: String,
    submenu: Vec<MenuEntry>,
    submenu_state: ListState,
    date_input: InputField,
    pending_delete: Option<MutationIntent>,
    toasts: BTreeMap<ToastId, Toast>,
    status_message: String,
    should_exit: bool,
    events: mpsc::Receiver<AppEvent>,
    sink: EventToasts,
}

impl ActionMenuApp {
    /// Create the application over a fetched directory snapshot. When
    /// `initial_task` resolves, the picker is skipped and the action menu
    /// opens directly.
    pub fn new(
        client: HeightClient,
        directory: Directory,
        theme: Theme,
        initial_task: Option<&str>,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        let sink = EventToasts {
            tx,
            next_id: Arc::new(AtomicU64::new(0)),
        };

        let mut app = ActionMenuApp {
            client: Arc::new(client),
            theme,
            directory,
            state: AppState::TaskPicker,
            picker_state: ListState::default(),
            selected_task: None,
            menu: Vec::new(),
            menu_state: ListState::default(),
            submenu_title: String::new(),
            submenu: Vec::new(),
            submenu_state: ListState::default(),
            date_input: InputField::new(),
            pending_delete: None,
            toasts: BTreeMap::new(),
            status_message: String::new(),
            should_exit: false,
            events: rx,
            sink,
        };
        app.picker_state.select(Some(0));

        if let Some(identifier) = initial_task {
            match app.directory.resolve_task(identifier).map(|t| t.clone()) {
                Ok(task) => app.open_action_menu(task),
                Err(err) => app.status_message = err,
            }
        }
        app
    }

    /// Main event loop.
    pub fn run<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> std::io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;
            self.handle_input()?;
            self.drain_events();
            if self.should_exit {
                break;
            }
        }
        Ok(())
    }

    fn open_action_menu(&mut self, task: Task) {
        self.menu = build_action_menu(&task, &self.directory, self.theme);
        self.selected_task = Some(task);
        self.menu_state.select(Some(0));
        self.state = AppState::ActionMenu;
    }

    /// Apply events delivered by spawned tasks since the last tick.
    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                AppEvent::Toast(ToastCommand::Push(id, toast)) => {
                    self.toasts.insert(id, toast);
                }
                AppEvent::Toast(ToastCommand::Update(id, update)) => {
                    if let Some(toast) = self.toasts.get_mut(&id) {
                        toast.apply(update);
                    }
                }
                AppEvent::Directory(directory) => {
                    self.directory = directory;
                    self.refresh_selected_task();
                }
                AppEvent::DirectoryError(message) => {
                    self.status_message = format!("Refresh failed: {message}");
                }
            }
        }
    }

    /// Re-resolve the selected task against a fresh snapshot. A task that
    /// disappeared (deleted, or filtered out) drops back to the picker.
    fn refresh_selected_task(&mut self) {
        let selected_id = self.selected_task.as_ref().map(|t| t.id.clone());
        if let Some(selected_id) = selected_id {
            match self.directory.task(&selected_id).cloned() {
                Some(task) if !task.deleted => {
                    self.menu = build_action_menu(&task, &self.directory, self.theme);
                    self.selected_task = Some(task);
                    let len = self.menu.len();
                    if self.menu_state.selected().unwrap_or(0) >= len {
                        self.menu_state.select(Some(len.saturating_sub(1)));
                    }
                }
                _ => {
                    self.selected_task = None;
                    self.state = AppState::TaskPicker;
                    self.picker_state.select(Some(0));
                }
            }
        }
        if let Some(selected) = self.picker_state.selected() {
            if selected >= self.directory.tasks.len() {
                self.picker_state
                    .select(Some(self.directory.tasks.len().saturating_sub(1)));
            }
        }
    }

    /// Spawn a fresh directory fetch; the result comes back as an event.
    fn request_refresh(&self) {
        let client = Arc::clone(&self.client);
        let tx = self.sink.tx.clone();
        tokio::spawn(async move {
            match Directory::fetch(&client).await {
                Ok(directory) => {
                    let _ = tx.send(AppEvent::Directory(directory));
                }
                Err(err) => {
                    let _ = tx.send(AppEvent::DirectoryError(err.to_string()));
                }
            }
        });
    }

    /// Dispatch one intent through the mutation-feedback controller,
    /// fire-and-forget. The revalidation callback kicks off a snapshot
    /// refresh after a successful mutation.
    fn dispatch_mutation(&mut self, intent: MutationIntent) {
        let labels = intent.labels();
        let payload = match intent.into_payload(&self.directory.custom_field_ids()) {
            Ok(payload) => payload,
            Err(err) => {
                self.status_message = err.to_string();
                return;
            }
        };

        let client = Arc::clone(&self.client);
        let sink = self.sink.clone();
        let revalidate_client = Arc::clone(&self.client);
        let revalidate_tx = self.sink.tx.clone();
        tokio::spawn(async move {
            let revalidate = move || {
                tokio::spawn(async move {
                    match Directory::fetch(&revalidate_client).await {
                        Ok(directory) => {
                            let _ = revalidate_tx.send(AppEvent::Directory(directory));
                        }
                        Err(err) => {
                            let _ = revalidate_tx.send(AppEvent::DirectoryError(err.to_string()));
                        }
                    }
                });
            };
            perform_mutation(&sink, &labels, client.apply(&payload), Some(revalidate)).await;
        });
    }

    fn run_action(&mut self, action: MenuAction) {
        match action {
            MenuAction::Mutate(intent) => {
                self.dispatch_mutation(intent);
                self.state = AppState::ActionMenu;
            }
            MenuAction::ConfirmDelete(intent) => {
                self.pending_delete = Some(intent);
                self.state = AppState::ConfirmDelete;
            }
            MenuAction::PromptDueDate => {
                self.date_input = InputField::new();
                self.state = AppState::DatePrompt;
            }
            MenuAction::Copy(content) => {
                self.status_message = format!("Copied: {content}");
                self.state = AppState::ActionMenu;
            }
        }
    }

    fn activate(&mut self, entry: MenuEntry) {
        match entry.kind {
            MenuEntryKind::Submenu(entries) => {
                self.submenu_title = entry.label;
                self.submenu = entries;
                self.submenu_state.select(Some(0));
                self.state = AppState::Submenu;
            }
            MenuEntryKind::Action(action) => self.run_action(action),
        }
    }

    /// Handle keyboard input based on current state.
    fn handle_input(&mut self) -> std::io::Result<()> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                self.status_message.clear();

                match self.state {
                    AppState::TaskPicker => self.handle_picker_input(key.code),
                    AppState::ActionMenu => self.handle_menu_input(key.code),
                    AppState::Submenu => self.handle_submenu_input(key.code),
                    AppState::DatePrompt => self.handle_date_input(key.code),
                    AppState::ConfirmDelete => self.handle_confirm_input(key.code),
                }
            }
        }
        Ok(())
    }

    fn handle_picker_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Up => move_selection(&mut self.picker_state, -1, self.directory.tasks.len()),
            KeyCode::Down => move_selection(&mut self.picker_state, 1, self.directory.tasks.len()),
            KeyCode::Enter => {
                if let Some(task) = self
                    .picker_state
                    .selected()
                    .and_then(|i| self.directory.tasks.get(i))
                {
                    let task = task.clone();
                    self.open_action_menu(task);
                }
            }
            KeyCode::Char('r') => self.request_refresh(),
            KeyCode::Esc | KeyCode::Char('q') => self.should_exit = true,
            _ => {}
        }
    }

    fn handle_menu_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Up => move_selection(&mut self.menu_state, -1, self.menu.len()),
            KeyCode::Down => move_selection(&mut self.menu_state, 1, self.menu.len()),
            KeyCode::Enter => {
                let entry = self
                    .menu_state
                    .selected()
                    .and_then(|i| self.menu.get(i))
                    .cloned();
                if let Some(entry) = entry {
                    self.activate(entry);
                }
            }
            KeyCode::Char('r') => self.request_refresh(),
            KeyCode::Esc => {
                self.selected_task = None;
                self.state = AppState::TaskPicker;
            }
            KeyCode::Char('q') => self.should_exit = true,
            _ => {}
        }
    }

    fn handle_submenu_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Up => move_selection(&mut self.submenu_state, -1, self.submenu.len()),
            KeyCode::Down => move_selection(&mut self.submenu_state, 1, self.submenu.len()),
            KeyCode::Enter => {
                let entry = self
                    .submenu_state
                    .selected()
                    .and_then(|i| self.submenu.get(i))
                    .cloned();
                if let Some(entry) = entry {
                    self.activate(entry);
                }
            }
            KeyCode::Esc => self.state = AppState::ActionMenu,
            _ => {}
        }
    }

    fn handle_date_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => self.state = AppState::ActionMenu,
            KeyCode::Enter => {
                let Some(task_id) = self.selected_task.as_ref().map(|t| t.id.clone()) else {
                    self.state = AppState::ActionMenu;
                    return;
                };
                let raw = self.date_input.take();
                let today = chrono::Local::now().date_naive();
                if raw.trim().is_empty() {
                    // An empty date clears the due date, like a cleared picker.
                    self.run_action(MenuAction::Mutate(MutationIntent::ClearDueDate { task_id }));
                } else if let Some(date) = parse_due_input(&raw, today) {
                    self.run_action(MenuAction::Mutate(MutationIntent::SetDueDate {
                        task_id,
                        date,
                    }));
                } else {
                    self.status_message = format!("Could not parse '{}' as a date", raw.trim());
                    self.state = AppState::ActionMenu;
                }
            }
            KeyCode::Backspace => self.date_input.handle_backspace(),
            KeyCode::Left => self.date_input.move_cursor_left(),
            KeyCode::Right => self.date_input.move_cursor_right(),
            KeyCode::Char(c) => self.date_input.handle_char(c),
            _ => {}
        }
    }

    fn handle_confirm_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                if let Some(intent) = self.pending_delete.take() {
                    self.dispatch_mutation(intent);
                }
                self.state = AppState::ActionMenu;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.pending_delete = None;
                self.state = AppState::ActionMenu;
            }
            _ => {}
        }
    }

    /// Main render function that dispatches to state-specific renderers.
    fn render(&mut self, f: &mut Frame) {
        let toast_height = if self.toasts.is_empty() {
            0
        } else {
            self.toasts.len().min(3) as u16 + 2
        };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(toast_height),
                Constraint::Length(1),
            ])
            .split(f.area());

        match self.state {
            AppState::TaskPicker => self.render_picker(f, chunks[0]),
            AppState::ActionMenu => self.render_action_menu(f, chunks[0]),
            AppState::Submenu => {
                self.render_action_menu(f, chunks[0]);
                self.render_submenu(f, chunks[0]);
            }
            AppState::DatePrompt => {
                self.render_action_menu(f, chunks[0]);
                self.render_date_prompt(f, chunks[0]);
            }
            AppState::ConfirmDelete => {
                self.render_action_menu(f, chunks[0]);
                self.render_confirm(f, chunks[0]);
            }
        }

        if toast_height > 0 {
            self.render_toasts(f, chunks[1]);
        }
        self.render_status_bar(f, chunks[2]);
    }

    fn render_picker(&mut self, f: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .directory
            .tasks
            .iter()
            .map(|task| {
                ListItem::new(Line::from(format!(
                    "  {:<8} {}",
                    task.short_ref(),
                    task.name
                )))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Select Task"))
            .highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol("► ");

        f.render_stateful_widget(list, area, &mut self.picker_state);
    }

    fn render_action_menu(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0)])
            .split(area);

        let Some(task) = &self.selected_task else {
            return;
        };

        let status = self
            .directory
            .statuses()
            .and_then(|t| t.labels.iter().find(|l| l.id == task.status))
            .map(|l| l.value.clone())
            .unwrap_or_else(|| "-".into());
        let assignee = task
            .assignees_ids
            .first()
            .and_then(|id| self.directory.user(id))
            .map(|u| u.display_name())
            .unwrap_or_else(|| "Unassigned".into());
        let due = task
            .fields
            .iter()
            .find_map(|field| {
                let due_id = self.directory.due_date().map(|t| t.id.clone())?;
                (field.field_template_id == due_id).then_some(field.date)
            })
            .flatten();
        let today = chrono::Local::now().date_naive();

        let header = Paragraph::new(vec![
            Line::from(Span::styled(
                task.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(format!(
                "{}  ·  {}  ·  {}  ·  due {}",
                task.short_ref(),
                status,
                assignee,
                format_due_relative(due, today)
            )),
        ])
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);
        f.render_widget(header, chunks[0]);

        let items: Vec<ListItem> = self
            .menu
            .iter()
            .map(|entry| {
                let suffix = match entry.kind {
                    MenuEntryKind::Submenu(_) => " ▸",
                    MenuEntryKind::Action(_) => "",
                };
                ListItem::new(Line::from(Span::styled(
                    format!("  {}{}", entry.label, suffix),
                    Style::default().fg(entry.tint),
                )))
            })
            .collect();

        let menu = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Actions"))
            .highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol("► ");
        f.render_stateful_widget(menu, chunks[1], &mut self.menu_state);
    }

    fn render_submenu(&mut self, f: &mut Frame, area: Rect) {
        let area = centered_rect(60, 60, area);
        f.render_widget(Clear, area);

        let items: Vec<ListItem> = self
            .submenu
            .iter()
            .map(|entry| {
                ListItem::new(Line::from(Span::styled(
                    format!("  {}", entry.label),
                    Style::default().fg(entry.tint),
                )))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(self.submenu_title.clone()),
            )
            .highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol("► ");
        f.render_stateful_widget(list, area, &mut self.submenu_state);
    }

    fn render_date_prompt(&mut self, f: &mut Frame, area: Rect) {
        let area = centered_rect(60, 30, area);
        f.render_widget(Clear, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let instructions =
            Paragraph::new("Due date: \"today\", \"friday\", \"in 3d\", YYYY-MM-DD; empty clears")
                .block(Block::default().borders(Borders::ALL).title("Set Due Date"))
                .alignment(Alignment::Left);
        f.render_widget(instructions, chunks[0]);

        let input = Paragraph::new(self.date_input.value.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        );
        f.render_widget(input, chunks[1]);

        f.set_cursor_position((
            chunks[1].x + self.date_input.cursor_column() as u16 + 1,
            chunks[1].y + 1,
        ));
    }

    fn render_confirm(&mut self, f: &mut Frame, area: Rect) {
        let area = centered_rect(60, 40, area);
        f.render_widget(Clear, area);

        let task_name = self
            .selected_task
            .as_ref()
            .map(|t| t.name.clone())
            .unwrap_or_default();

        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Delete Task",
                Style::default().add_modifier(Modifier::BOLD).fg(Color::Red),
            )),
            Line::from(""),
            Line::from(format!("Are you sure you want to delete \"{}\"?", task_name)),
            Line::from(""),
            Line::from("The task is marked deleted and stays in its lists."),
            Line::from(""),
            Line::from("Press Y to confirm, N or Esc to cancel"),
        ];

        let confirmation = Paragraph::new(text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Confirm")
                    .border_style(Style::default().fg(Color::Red)),
            )
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(confirmation, area);
    }

    fn render_toasts(&mut self, f: &mut Frame, area: Rect) {
        let lines: Vec<Line> = self
            .toasts
            .values()
            .rev()
            .take(3)
            .map(|toast| {
                let (symbol, color) = match toast.style {
                    ToastStyle::Pending => ("◌", TOAST_PENDING),
                    ToastStyle::Success => ("✓", TOAST_SUCCESS),
                    ToastStyle::Failure => ("✗", TOAST_FAILURE),
                };
                let mut text = format!("{symbol} {}", toast.title);
                if let Some(message) = &toast.message {
                    text.push_str(&format!(": {message}"));
                }
                Line::from(Span::styled(text, Style::default().fg(color)))
            })
            .collect();

        let toasts = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Activity"));
        f.render_widget(toasts, area);
    }

    fn render_status_bar(&mut self, f: &mut Frame, area: Rect) {
        let status_text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            match self.state {
                AppState::TaskPicker => {
                    "Use ↑↓ to navigate, Enter to select, r to refresh, q/Esc to quit".to_string()
                }
                AppState::ActionMenu => {
                    "Use ↑↓ to navigate, Enter to select, r to refresh, Esc to go back".to_string()
                }
                AppState::Submenu => "Use ↑↓ to navigate, Enter to select, Esc to go back".to_string(),
                AppState::DatePrompt => "Type a date, Enter to apply, Esc to cancel".to_string(),
                AppState::ConfirmDelete => "Press Y to confirm, N or Esc to cancel".to_string(),
            }
        };

        let status = Paragraph::new(status_text)
            .style(Style::default().bg(Color::Blue).fg(Color::White))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }
}

/// Move a list selection by `delta`, clamped to `[0, len)`.
fn move_selection(state: &mut ListState, delta: i64, len: usize) {
    if len == 0 {
        return;
    }
    let current = state.selected().unwrap_or(0) as i64;
    let next = (current + delta).clamp(0, len as i64 - 1);
    state.select(Some(next as usize));
}
