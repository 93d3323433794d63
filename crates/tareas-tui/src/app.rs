use std::collections::HashMap;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use tareas_shared::api::CreateTaskRequest;
use tareas_shared::{Comment, Task, TaskPriority, TaskStatus};

use crate::api::ApiClient;
use crate::voice::Transcriber;

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Tick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    Comment,
    NewTask,
    VoicePath,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// Transient one-line notification shown until the next key press.
#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

/// Per-card comment thread state. The thread is fetched on first
/// expansion; later toggles reuse what was loaded.
#[derive(Debug, Default)]
pub struct CommentThread {
    pub expanded: bool,
    pub loaded: bool,
    pub comments: Vec<Comment>,
    pub count: usize,
    pub submitting: bool,
}

pub struct App {
    pub api: ApiClient,
    pub transcriber: Option<Transcriber>,

    pub tasks: Vec<Task>,
    pub selected: usize,
    pub threads: HashMap<String, CommentThread>,

    // Loading state
    pub loading: bool,
    pub loading_message: String,
    pub notice: Option<Notice>,

    // Input
    pub input_mode: InputMode,
    pub search: String,
    pub status_filter: Option<TaskStatus>,
    pub priority_filter: Option<TaskPriority>,
    pub comment_input: String,
    pub new_task_title: String,
    pub voice_path: String,
}

impl App {
    pub fn new(api: ApiClient, transcriber: Option<Transcriber>) -> Self {
        Self {
            api,
            transcriber,
            tasks: Vec::new(),
            selected: 0,
            threads: HashMap::new(),
            loading: false,
            loading_message: String::new(),
            notice: None,
            input_mode: InputMode::Normal,
            search: String::new(),
            status_filter: None,
            priority_filter: None,
            comment_input: String::new(),
            new_task_title: String::new(),
            voice_path: String::new(),
        }
    }

    pub fn set_loading(&mut self, loading: bool, message: &str) {
        self.loading = loading;
        self.loading_message = message.to_string();
    }

    pub fn notify(&mut self, kind: NoticeKind, message: impl Into<String>) {
        self.notice = Some(Notice {
            kind,
            message: message.into(),
        });
    }

    /// Indices of tasks passing the active filters and search query.
    pub fn visible(&self) -> Vec<usize> {
        self.tasks
            .iter()
            .enumerate()
            .filter(|(_, task)| {
                self.status_filter.map_or(true, |s| task.status == s)
                    && self.priority_filter.map_or(true, |p| task.priority == p)
                    && (self.search.is_empty()
                        || task
                            .title
                            .to_lowercase()
                            .contains(&self.search.to_lowercase()))
            })
            .map(|(i, _)| i)
            .collect()
    }

    pub fn selected_task(&self) -> Option<&Task> {
        let visible = self.visible();
        visible.get(self.selected).map(|&i| &self.tasks[i])
    }

    fn selected_task_id(&self) -> Option<String> {
        self.selected_task().map(|t| t.id.clone())
    }

    pub fn thread(&self, task_id: &str) -> Option<&CommentThread> {
        self.threads.get(task_id)
    }

    fn thread_mut(&mut self, task_id: &str) -> &mut CommentThread {
        self.threads.entry(task_id.to_string()).or_default()
    }

    // ============ State-mutation callbacks ============
    //
    // Network results land here; the async calls above them only decide
    // which callback fires. Keeping the mutations separate keeps them
    // testable without a server.

    pub fn on_tasks_loaded(&mut self, tasks: Vec<Task>) {
        // Last response wins wholesale; there is no merge with local state.
        for task in &tasks {
            let count = task.comments.len();
            self.threads.entry(task.id.clone()).or_default().count = count;
        }
        self.tasks = tasks;

        let visible = self.visible();
        if self.selected >= visible.len() {
            self.selected = visible.len().saturating_sub(1);
        }
    }

    pub fn on_task_patched(&mut self, task: Task) {
        // Patch in place by id; an unknown id is dropped silently.
        if let Some(idx) = self.tasks.iter().position(|t| t.id == task.id) {
            self.thread_mut(&task.id).count = task.comments.len();
            self.tasks[idx] = task;
        }
    }

    pub fn on_task_created(&mut self, task: Task) {
        self.threads.entry(task.id.clone()).or_default();
        // List is newest-first
        self.tasks.insert(0, task);
        self.notify(NoticeKind::Info, "Tarea creada");
    }

    pub fn on_comments_loaded(&mut self, task_id: &str, comments: Vec<Comment>) {
        let thread = self.thread_mut(task_id);
        thread.count = comments.len();
        thread.comments = comments;
        thread.loaded = true;
    }

    pub fn on_comment_created(&mut self, task_id: &str, comment: Comment) {
        let thread = self.thread_mut(task_id);
        thread.comments.insert(0, comment);
        thread.count += 1;
        thread.submitting = false;
        self.comment_input.clear();
        self.notify(NoticeKind::Info, "Comentario añadido");
    }

    pub fn on_comment_failed(&mut self, task_id: &str, message: String) {
        // Local list stays untouched on failure
        self.thread_mut(task_id).submitting = false;
        self.notify(NoticeKind::Error, message);
    }

    // ============ Async operations ============

    pub async fn load_tasks(&mut self) {
        self.set_loading(true, "Cargando tareas...");

        match self.api.list_tasks().await {
            Ok(tasks) => self.on_tasks_loaded(tasks),
            // List is left as it was on failure
            Err(e) => self.notify(NoticeKind::Error, format!("No se pudieron cargar: {}", e)),
        }

        self.set_loading(false, "");
    }

    async fn toggle_comments(&mut self) {
        let Some(task_id) = self.selected_task_id() else {
            return;
        };

        let thread = self.thread_mut(&task_id);
        if thread.expanded {
            thread.expanded = false;
            return;
        }
        thread.expanded = true;

        // Only the first expansion hits the network
        if thread.loaded {
            return;
        }

        self.set_loading(true, "Cargando comentarios...");
        match self.api.list_comments(&task_id).await {
            Ok(comments) => self.on_comments_loaded(&task_id, comments),
            Err(e) => self.notify(
                NoticeKind::Error,
                format!("No se pudieron cargar los comentarios: {}", e),
            ),
        }
        self.set_loading(false, "");
    }

    async fn submit_comment(&mut self) {
        let Some(task_id) = self.selected_task_id() else {
            return;
        };
        let content = self.comment_input.trim().to_string();
        if content.is_empty() {
            return;
        }

        self.thread_mut(&task_id).submitting = true;
        match self.api.create_comment(&task_id, &content, false).await {
            Ok(comment) => self.on_comment_created(&task_id, comment),
            Err(e) => self.on_comment_failed(&task_id, format!("No se pudo publicar: {}", e)),
        }
    }

    async fn submit_voice_comment(&mut self) {
        let Some(task_id) = self.selected_task_id() else {
            return;
        };
        let path = self.voice_path.trim().to_string();
        if path.is_empty() {
            return;
        }
        let Some(transcriber) = self.transcriber.clone() else {
            self.notify(NoticeKind::Error, "TRANSCRIBE_WEBHOOK_URL no configurado");
            return;
        };

        self.set_loading(true, "Transcribiendo...");
        // Transcription failure aborts before any comment exists
        let text = match transcriber.transcribe(path.as_ref(), "tareas-tui").await {
            Ok(text) => text,
            Err(e) => {
                self.set_loading(false, "");
                self.notify(NoticeKind::Error, format!("Transcripción fallida: {}", e));
                return;
            }
        };
        self.set_loading(false, "");

        self.thread_mut(&task_id).submitting = true;
        match self.api.create_comment(&task_id, &text, true).await {
            Ok(comment) => {
                self.voice_path.clear();
                self.on_comment_created(&task_id, comment);
            }
            Err(e) => {
                self.on_comment_failed(&task_id, format!("No se pudo guardar la voz: {}", e))
            }
        }
    }

    async fn change_status(&mut self, status: TaskStatus) {
        let Some(task_id) = self.selected_task_id() else {
            return;
        };

        self.set_loading(true, "Actualizando estado...");
        match self.api.set_status(&task_id, status).await {
            Ok(task) => self.on_task_patched(task),
            Err(e) => self.notify(
                NoticeKind::Error,
                format!("No se pudo actualizar el estado: {}", e),
            ),
        }
        self.set_loading(false, "");
    }

    async fn submit_new_task(&mut self) {
        let title = self.new_task_title.trim().to_string();
        if title.is_empty() {
            return;
        }

        let req = CreateTaskRequest {
            title,
            status: Some(TaskStatus::Pendiente),
            priority: Some(TaskPriority::Media),
            ..Default::default()
        };

        self.set_loading(true, "Creando tarea...");
        match self.api.create_task(&req).await {
            Ok(task) => {
                self.new_task_title.clear();
                self.on_task_created(task);
            }
            Err(e) => self.notify(NoticeKind::Error, format!("No se pudo crear: {}", e)),
        }
        self.set_loading(false, "");
    }

    // ============ Filters ============

    pub fn cycle_status_filter(&mut self) {
        self.status_filter = match self.status_filter {
            None => Some(TaskStatus::Pendiente),
            Some(TaskStatus::Pendiente) => Some(TaskStatus::EnProgreso),
            Some(TaskStatus::EnProgreso) => Some(TaskStatus::Completada),
            Some(TaskStatus::Completada) => Some(TaskStatus::Rechazada),
            Some(TaskStatus::Rechazada) => None,
        };
        self.selected = 0;
    }

    pub fn cycle_priority_filter(&mut self) {
        self.priority_filter = match self.priority_filter {
            None => Some(TaskPriority::Alta),
            Some(TaskPriority::Alta) => Some(TaskPriority::Media),
            Some(TaskPriority::Media) => Some(TaskPriority::Baja),
            Some(TaskPriority::Baja) => None,
        };
        self.selected = 0;
    }

    // ============ Key handling ============

    /// Handle key events, returns true if app should quit
    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        // Any key clears the transient notice
        if self.notice.is_some() {
            self.notice = None;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(true);
        }

        if self.loading {
            return Ok(false);
        }

        match self.input_mode {
            InputMode::Normal => self.handle_normal_key(key).await,
            _ => self.handle_input_key(key).await,
        }
    }

    async fn handle_normal_key(&mut self, key: KeyEvent) -> Result<bool> {
        match key.code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Char('r') => self.load_tasks().await,
            KeyCode::Char('j') | KeyCode::Down => self.move_down(),
            KeyCode::Char('k') | KeyCode::Up => self.move_up(),
            KeyCode::Char('/') => self.input_mode = InputMode::Search,
            KeyCode::Char('s') => self.cycle_status_filter(),
            KeyCode::Char('f') => self.cycle_priority_filter(),
            KeyCode::Char('c') => self.toggle_comments().await,
            KeyCode::Char('i') => {
                if self.selected_task().is_some() {
                    self.input_mode = InputMode::Comment;
                }
            }
            KeyCode::Char('v') => {
                if self.selected_task().is_some() {
                    self.input_mode = InputMode::VoicePath;
                }
            }
            KeyCode::Char('n') => self.input_mode = InputMode::NewTask,
            // Fixed transition set; nothing stops completada -> pendiente
            // coming back from elsewhere, there is simply no key for it.
            KeyCode::Char('p') => self.change_status(TaskStatus::EnProgreso).await,
            KeyCode::Char('d') => self.change_status(TaskStatus::Completada).await,
            _ => {}
        }

        Ok(false)
    }

    async fn handle_input_key(&mut self, key: KeyEvent) -> Result<bool> {
        let mode = self.input_mode;

        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                match mode {
                    InputMode::Comment => self.comment_input.clear(),
                    InputMode::NewTask => self.new_task_title.clear(),
                    InputMode::VoicePath => self.voice_path.clear(),
                    _ => {}
                }
            }
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                match mode {
                    InputMode::Search => {
                        self.selected = 0;
                    }
                    InputMode::Comment => self.submit_comment().await,
                    InputMode::NewTask => self.submit_new_task().await,
                    InputMode::VoicePath => self.submit_voice_comment().await,
                    InputMode::Normal => {}
                }
            }
            KeyCode::Char(c) => match mode {
                InputMode::Search => self.search.push(c),
                InputMode::Comment => self.comment_input.push(c),
                InputMode::NewTask => self.new_task_title.push(c),
                InputMode::VoicePath => self.voice_path.push(c),
                InputMode::Normal => {}
            },
            KeyCode::Backspace => {
                match mode {
                    InputMode::Search => self.search.pop(),
                    InputMode::Comment => self.comment_input.pop(),
                    InputMode::NewTask => self.new_task_title.pop(),
                    InputMode::VoicePath => self.voice_path.pop(),
                    InputMode::Normal => None,
                };
            }
            _ => {}
        }

        Ok(false)
    }

    pub fn move_up(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    pub fn move_down(&mut self) {
        if self.selected < self.visible().len().saturating_sub(1) {
            self.selected += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn task(id: &str, title: &str, status: TaskStatus, priority: TaskPriority) -> Task {
        Task {
            id: id.to_string(),
            title: title.to_string(),
            status,
            priority,
            deadline: None,
            assigned_to: vec![],
            created_by: "Marta".to_string(),
            comments: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn comment(id: &str, task_id: &str, content: &str) -> Comment {
        Comment {
            id: id.to_string(),
            content: content.to_string(),
            author_id: None,
            author_name: "Ana".to_string(),
            created_at: Utc::now(),
            task_id: task_id.to_string(),
            edited: false,
            edited_at: None,
            voice: false,
        }
    }

    fn app() -> App {
        App::new(ApiClient::new("http://localhost:0"), None)
    }

    #[test]
    fn filters_and_search_compose() {
        let mut app = app();
        app.on_tasks_loaded(vec![
            task("t1", "Llamar al cliente", TaskStatus::Pendiente, TaskPriority::Alta),
            task("t2", "Enviar informe", TaskStatus::Completada, TaskPriority::Alta),
            task("t3", "Llamar al banco", TaskStatus::Pendiente, TaskPriority::Baja),
        ]);

        app.status_filter = Some(TaskStatus::Pendiente);
        assert_eq!(app.visible(), vec![0, 2]);

        app.priority_filter = Some(TaskPriority::Alta);
        assert_eq!(app.visible(), vec![0]);

        app.priority_filter = None;
        app.search = "llamar".to_string();
        assert_eq!(app.visible(), vec![0, 2]);
    }

    #[test]
    fn loading_tasks_overwrites_and_clamps_selection() {
        let mut app = app();
        app.on_tasks_loaded(vec![
            task("t1", "A", TaskStatus::Pendiente, TaskPriority::Media),
            task("t2", "B", TaskStatus::Pendiente, TaskPriority::Media),
        ]);
        app.selected = 1;

        // A later response replaces local state wholesale
        app.on_tasks_loaded(vec![task(
            "t3",
            "C",
            TaskStatus::Pendiente,
            TaskPriority::Media,
        )]);
        assert_eq!(app.tasks.len(), 1);
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn successful_comment_prepends_and_increments_count() {
        let mut app = app();
        app.on_tasks_loaded(vec![task("t1", "A", TaskStatus::Pendiente, TaskPriority::Media)]);
        app.on_comments_loaded("t1", vec![comment("c1", "t1", "viejo")]);
        app.comment_input = "nuevo".to_string();
        app.thread_mut("t1").submitting = true;

        app.on_comment_created("t1", comment("c2", "t1", "nuevo"));

        let thread = app.thread("t1").unwrap();
        assert_eq!(thread.comments.len(), 2);
        assert_eq!(thread.comments[0].id, "c2");
        assert_eq!(thread.count, 2);
        assert!(!thread.submitting);
        assert!(app.comment_input.is_empty());
        assert!(matches!(
            app.notice.as_ref().map(|n| n.kind),
            Some(NoticeKind::Info)
        ));
    }

    #[test]
    fn failed_comment_leaves_thread_untouched() {
        let mut app = app();
        app.on_tasks_loaded(vec![task("t1", "A", TaskStatus::Pendiente, TaskPriority::Media)]);
        app.on_comments_loaded("t1", vec![comment("c1", "t1", "viejo")]);
        app.thread_mut("t1").submitting = true;

        app.on_comment_failed("t1", "No se pudo publicar".to_string());

        let thread = app.thread("t1").unwrap();
        assert_eq!(thread.comments.len(), 1);
        assert_eq!(thread.count, 1);
        assert!(!thread.submitting);
        assert!(matches!(
            app.notice.as_ref().map(|n| n.kind),
            Some(NoticeKind::Error)
        ));
    }

    #[test]
    fn patch_replaces_by_id_without_reordering() {
        let mut app = app();
        app.on_tasks_loaded(vec![
            task("t1", "A", TaskStatus::Pendiente, TaskPriority::Media),
            task("t2", "B", TaskStatus::Pendiente, TaskPriority::Media),
        ]);

        app.on_task_patched(task("t2", "B", TaskStatus::Completada, TaskPriority::Media));
        assert_eq!(app.tasks[1].status, TaskStatus::Completada);
        assert_eq!(app.tasks[0].status, TaskStatus::Pendiente);

        // Unknown ids are dropped, not inserted
        app.on_task_patched(task("t9", "X", TaskStatus::Rechazada, TaskPriority::Alta));
        assert_eq!(app.tasks.len(), 2);
    }

    #[test]
    fn comment_counts_come_from_hydrated_tasks() {
        let mut app = app();
        let mut t = task("t1", "A", TaskStatus::Pendiente, TaskPriority::Media);
        t.comments = vec![comment("c1", "t1", "hola"), comment("c2", "t1", "adiós")];

        app.on_tasks_loaded(vec![t]);
        assert_eq!(app.thread("t1").unwrap().count, 2);
    }

    #[test]
    fn first_load_marks_thread_loaded() {
        let mut app = app();
        app.on_comments_loaded("t1", vec![]);
        let thread = app.thread("t1").unwrap();
        assert!(thread.loaded);
        assert_eq!(thread.count, 0);
    }
}
