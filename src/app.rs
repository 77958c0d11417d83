use std::path::PathBuf;
use std::time::Instant;

use minddocs_core::api::{ExtractResult, LoginResponse, RegisterResponse, UploadResponse};
use minddocs_core::chat::{self, HistoryRequest, Submission};
use minddocs_core::forms::{
    ExtractForm, LoginForm, RegisterForm, SummarizeForm, Translation, TranslateForm, UploadForm,
};
use minddocs_core::{
    guard, ApiClient, ChatController, ChatEvent, Config, DocumentDirectory, DocumentRef, GuardDecision,
    Listing, NavLink, Result as ApiResult, Route, Session, SplashTimer, SummaryResult, Theme,
    TranslationResult,
};
use ratatui::widgets::ListState;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::input::TextInput;
use crate::tui::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Outcome of a background request, delivered back through the event loop.
#[derive(Debug)]
pub enum ApiEvent {
    Documents(ApiResult<Vec<DocumentRef>>),
    Chat(ChatEvent),
    LoggedIn(ApiResult<LoginResponse>),
    Registered(ApiResult<RegisterResponse>),
    Uploaded(ApiResult<UploadResponse>),
    Summarized(ApiResult<SummaryResult>),
    Translated(ApiResult<TranslationResult>),
    Extracted(ApiResult<ExtractResult>),
}

/// Document list shared by every page with a picker.
#[derive(Debug, Default)]
pub struct DocumentPicker {
    pub documents: Vec<DocumentRef>,
    pub state: ListState,
    pub loading: bool,
    pub error: Option<String>,
}

impl DocumentPicker {
    pub fn next(&mut self) {
        let len = self.documents.len();
        if len > 0 {
            let i = self.state.selected().map(|i| (i + 1).min(len - 1)).unwrap_or(0);
            self.state.select(Some(i));
        }
    }

    pub fn prev(&mut self) {
        if !self.documents.is_empty() {
            let i = self.state.selected().unwrap_or(0);
            self.state.select(Some(i.saturating_sub(1)));
        }
    }

    pub fn highlighted(&self) -> Option<&DocumentRef> {
        self.state.selected().and_then(|i| self.documents.get(i))
    }

    pub fn highlighted_name(&self) -> Option<String> {
        self.highlighted().map(|d| d.name.clone())
    }
}

#[derive(Debug, Default)]
pub struct LoginPage {
    pub username: TextInput,
    pub password: TextInput,
    pub focus: usize,
    pub loading: bool,
    pub error: Option<String>,
}

impl LoginPage {
    pub const FIELDS: usize = 2;

    pub fn new() -> Self {
        Self {
            password: TextInput::masked(),
            ..Self::default()
        }
    }

    pub fn focused_input(&mut self) -> &mut TextInput {
        match self.focus {
            0 => &mut self.username,
            _ => &mut self.password,
        }
    }

    pub fn form(&self) -> LoginForm {
        LoginForm {
            username: self.username.value().to_string(),
            password: self.password.value().to_string(),
        }
    }
}

#[derive(Debug)]
pub struct RegisterPage {
    pub username: TextInput,
    pub email: TextInput,
    pub password: TextInput,
    pub domain: String,
    pub focus: usize,
    pub loading: bool,
    pub error: Option<String>,
}

impl RegisterPage {
    /// username, email, password, domain
    pub const FIELDS: usize = 4;
    pub const DOMAIN_FIELD: usize = 3;

    pub fn new() -> Self {
        Self {
            username: TextInput::new(),
            email: TextInput::new(),
            password: TextInput::masked(),
            domain: RegisterForm::default().domain,
            focus: 0,
            loading: false,
            error: None,
        }
    }

    pub fn focused_input(&mut self) -> Option<&mut TextInput> {
        match self.focus {
            0 => Some(&mut self.username),
            1 => Some(&mut self.email),
            2 => Some(&mut self.password),
            _ => None,
        }
    }

    pub fn form(&self) -> RegisterForm {
        RegisterForm {
            username: self.username.value().to_string(),
            email: self.email.value().to_string(),
            password: self.password.value().to_string(),
            domain: self.domain.clone(),
        }
    }

    pub fn next_domain(&mut self) {
        let mut form = self.form();
        form.next_domain();
        self.domain = form.domain;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadEdit {
    Path,
    Name(usize),
}

#[derive(Debug, Default)]
pub struct UploadPage {
    pub form: UploadForm,
    pub files_state: ListState,
    pub input: TextInput,
    pub editing: Option<UploadEdit>,
    pub loading: bool,
    pub message: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
pub struct DocumentsPage {
    pub picker: DocumentPicker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatFocus {
    Documents,
    Input,
}

pub struct ChatPage {
    pub picker: DocumentPicker,
    pub controller: ChatController,
    pub input: TextInput,
    pub focus: ChatFocus,
    pub scroll: u16,
    pub submission_task: Option<JoinHandle<()>>,
    pub history_task: Option<JoinHandle<()>>,
}

impl ChatPage {
    fn new() -> Self {
        Self {
            picker: DocumentPicker::default(),
            controller: ChatController::new(),
            input: TextInput::new(),
            focus: ChatFocus::Documents,
            scroll: 0,
            submission_task: None,
            history_task: None,
        }
    }

    fn abort_tasks(&mut self) {
        if let Some(task) = self.submission_task.take() {
            task.abort();
        }
        if let Some(task) = self.history_task.take() {
            task.abort();
        }
    }
}

#[derive(Debug, Default)]
pub struct SummaryPage {
    pub picker: DocumentPicker,
    pub form: SummarizeForm,
    pub result: Option<SummaryResult>,
    pub loading: bool,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub scroll: u16,
}

#[derive(Debug, Default)]
pub struct TranslatePage {
    pub picker: DocumentPicker,
    pub form: TranslateForm,
    pub result: Option<Translation>,
    pub loading: bool,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub scroll: u16,
}

#[derive(Debug, Default)]
pub struct ExtractPage {
    pub picker: DocumentPicker,
    pub form: ExtractForm,
    pub result: Option<ExtractResult>,
    pub loading: bool,
    pub error: Option<String>,
    pub scroll: u16,
}

/// State of the page currently mounted. Leaving a route drops its state.
pub enum Page {
    Home,
    Login(LoginPage),
    Register(RegisterPage),
    Upload(UploadPage),
    Documents(DocumentsPage),
    Chat(Box<ChatPage>),
    Summary(SummaryPage),
    Translate(TranslatePage),
    Extract(ExtractPage),
}

impl Page {
    fn for_route(route: Route) -> Self {
        match route {
            Route::Home => Page::Home,
            Route::Login => Page::Login(LoginPage::new()),
            Route::Register => Page::Register(RegisterPage::new()),
            Route::Upload => Page::Upload(UploadPage::default()),
            Route::Documents => Page::Documents(DocumentsPage::default()),
            Route::Chat => Page::Chat(Box::new(ChatPage::new())),
            Route::Summary => Page::Summary(SummaryPage::default()),
            Route::Translate => Page::Translate(TranslatePage::default()),
            Route::Extract => Page::Extract(ExtractPage::default()),
        }
    }

    pub fn picker_mut(&mut self) -> Option<&mut DocumentPicker> {
        match self {
            Page::Documents(p) => Some(&mut p.picker),
            Page::Chat(p) => Some(&mut p.picker),
            Page::Summary(p) => Some(&mut p.picker),
            Page::Translate(p) => Some(&mut p.picker),
            Page::Extract(p) => Some(&mut p.picker),
            _ => None,
        }
    }
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub route: Route,
    pub page: Page,
    pub input_mode: InputMode,

    // Navigation menu popup
    pub show_menu: bool,
    pub menu_state: ListState,

    pub splash: SplashTimer,

    // Animation state
    pub animation_frame: u8,

    pub session: Session,
    pub client: ApiClient,
    pub export_dir: PathBuf,

    /// Bumped on every navigation; results from earlier visits are dropped.
    pub visit: u64,
    events: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(session: Session, client: ApiClient, config: &Config, events: UnboundedSender<AppEvent>) -> Self {
        Self {
            should_quit: false,
            route: Route::Home,
            page: Page::Home,
            input_mode: InputMode::Normal,
            show_menu: false,
            menu_state: ListState::default(),
            splash: SplashTimer::new(config.splash_duration()),
            animation_frame: 0,
            session,
            client,
            export_dir: config.export_dir(),
            visit: 0,
            events,
        }
    }

    pub fn theme(&self) -> Theme {
        self.session.theme()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn nav_links(&self) -> Vec<NavLink> {
        minddocs_core::routes::nav_links(self.is_authenticated())
    }

    /// Mount `route`, or whatever the guard redirects it to.
    pub fn navigate(&mut self, route: Route) {
        let target = match guard(route, &self.session) {
            GuardDecision::Allow => route,
            GuardDecision::Redirect(to) => {
                info!(from = route.path(), to = to.path(), "route requires login");
                to
            }
        };

        if let Page::Chat(chat) = &mut self.page {
            chat.abort_tasks();
        }

        self.visit += 1;
        self.route = target;
        self.page = Page::for_route(target);
        self.input_mode = InputMode::Normal;
        self.show_menu = false;
        self.splash.restart(Instant::now());
        info!(route = target.path(), "navigated");

        match target {
            Route::Documents => self.load_documents(Listing::Library),
            Route::Chat | Route::Summary | Route::Translate | Route::Extract => {
                self.load_documents(Listing::Actions)
            }
            _ => {}
        }
    }

    /// Open an action page with `doc_name` already chosen.
    pub fn open_with_document(&mut self, route: Route, doc_name: &str) {
        self.navigate(route);
        if self.route != route {
            return;
        }
        let request = match &mut self.page {
            Page::Chat(chat) => chat.controller.select(vec![doc_name.to_string()]),
            Page::Summary(p) => {
                p.form.document = Some(doc_name.to_string());
                None
            }
            Page::Translate(p) => {
                p.form.document = Some(doc_name.to_string());
                None
            }
            Page::Extract(p) => {
                p.form.document = Some(doc_name.to_string());
                None
            }
            _ => None,
        };
        if request.is_some() {
            self.after_selection_change(request);
        }
    }

    pub fn activate(&mut self, link: NavLink) {
        match link {
            NavLink::Go(route) => self.navigate(route),
            NavLink::Logout => self.logout(),
        }
    }

    pub fn logout(&mut self) {
        if let Err(e) = self.session.logout() {
            warn!(error = %e, "could not clear stored token");
        }
        self.navigate(Route::Home);
    }

    pub fn toggle_theme(&mut self) {
        match self.session.toggle_theme() {
            Ok(theme) => debug!(theme = theme.as_str(), "theme toggled"),
            Err(e) => warn!(error = %e, "could not persist theme"),
        }
    }

    pub fn is_splash_showing(&self) -> bool {
        self.splash.is_showing(Instant::now())
    }

    /// Whether the mounted page is waiting on the backend.
    pub fn is_busy(&self) -> bool {
        match &self.page {
            Page::Home => false,
            Page::Login(p) => p.loading,
            Page::Register(p) => p.loading,
            Page::Upload(p) => p.loading,
            Page::Documents(p) => p.picker.loading,
            Page::Chat(p) => p.picker.loading || p.controller.is_busy() || p.controller.is_loading_history(),
            Page::Summary(p) => p.picker.loading || p.loading,
            Page::Translate(p) => p.picker.loading || p.loading,
            Page::Extract(p) => p.picker.loading || p.loading,
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.is_busy() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn menu_nav_down(&mut self) {
        let len = self.nav_links().len();
        if len > 0 {
            let i = self.menu_state.selected().unwrap_or(0);
            self.menu_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn menu_nav_up(&mut self) {
        let i = self.menu_state.selected().unwrap_or(0);
        self.menu_state.select(Some(i.saturating_sub(1)));
    }

    /// Run `request` on a background task and post its result back tagged
    /// with the current visit.
    pub fn spawn_request<F, Fut>(&self, request: F) -> JoinHandle<()>
    where
        F: FnOnce(ApiClient) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = ApiEvent> + Send + 'static,
    {
        let client = self.client.clone();
        let events = self.events.clone();
        let visit = self.visit;
        tokio::spawn(async move {
            let event = request(client).await;
            let _ = events.send(AppEvent::Api { visit, event });
        })
    }

    fn load_documents(&mut self, listing: Listing) {
        if let Some(picker) = self.page.picker_mut() {
            picker.loading = true;
        }
        let directory = DocumentDirectory::new(self.client.clone(), listing);
        self.spawn_request(move |_| async move { ApiEvent::Documents(directory.list().await) });
    }

    fn chat_sink(&self) -> impl Fn(ChatEvent) + Send + Sync + 'static {
        let events = self.events.clone();
        let visit = self.visit;
        move |event| {
            let _ = events.send(AppEvent::Api {
                visit,
                event: ApiEvent::Chat(event),
            });
        }
    }

    /// Start a chat submission. Any earlier one is aborted first.
    pub fn start_submission(&mut self, submission: Submission) {
        let sink = self.chat_sink();
        let client = self.client.clone();
        if let Page::Chat(chat) = &mut self.page {
            if let Some(task) = chat.submission_task.take() {
                task.abort();
            }
            chat.submission_task = Some(chat::spawn_submission(client, submission, sink));
        }
    }

    /// Follow a selection or mode change: abandon whatever was in flight
    /// and fetch history when the controller asks for it.
    pub fn after_selection_change(&mut self, request: Option<HistoryRequest>) {
        let sink = self.chat_sink();
        let client = self.client.clone();
        if let Page::Chat(chat) = &mut self.page {
            chat.abort_tasks();
            chat.scroll = 0;
            if let Some(request) = request {
                chat.history_task = Some(chat::spawn_history(client, request, sink));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minddocs_core::MemoryStore;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    fn app() -> (App, mpsc::UnboundedReceiver<AppEvent>) {
        let session = Session::new(Arc::new(MemoryStore::new()));
        // nothing listens here; document loads fail fast
        let client = ApiClient::new("http://127.0.0.1:9", session.tokens().clone());
        let (tx, rx) = mpsc::unbounded_channel();
        (App::new(session, client, &Config::default(), tx), rx)
    }

    #[tokio::test]
    async fn test_guest_is_redirected_to_login() {
        let (mut app, _rx) = app();
        app.navigate(Route::Chat);
        assert_eq!(app.route, Route::Login);
        assert!(matches!(app.page, Page::Login(_)));
        assert!(app.is_splash_showing());
    }

    #[tokio::test]
    async fn test_logout_returns_home() {
        let (mut app, _rx) = app();
        app.session.login("tok").unwrap();
        app.navigate(Route::Summary);
        assert_eq!(app.route, Route::Summary);

        let visit = app.visit;
        app.logout();
        assert_eq!(app.route, Route::Home);
        assert!(!app.is_authenticated());
        assert!(app.visit > visit);
    }

    #[tokio::test]
    async fn test_document_pages_start_loading() {
        let (mut app, mut rx) = app();
        app.session.login("tok").unwrap();
        app.navigate(Route::Extract);
        assert!(app.is_busy());

        match rx.recv().await {
            Some(AppEvent::Api { visit, event: ApiEvent::Documents(result) }) => {
                assert_eq!(visit, app.visit);
                assert!(result.is_err());
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_picker_moves_within_bounds() {
        let mut picker = DocumentPicker::default();
        picker.next();
        assert_eq!(picker.state.selected(), None);

        picker.documents = vec![
            DocumentRef {
                id: 1,
                name: "A".to_string(),
                domain: None,
                created_at: None,
                blob_url: None,
                filename: None,
            },
            DocumentRef {
                id: 2,
                name: "B".to_string(),
                domain: None,
                created_at: None,
                blob_url: None,
                filename: None,
            },
        ];
        picker.next();
        assert_eq!(picker.highlighted_name().as_deref(), Some("A"));
        picker.next();
        picker.next();
        assert_eq!(picker.highlighted_name().as_deref(), Some("B"));
        picker.prev();
        picker.prev();
        assert_eq!(picker.highlighted_name().as_deref(), Some("A"));
    }

    #[test]
    fn test_register_domain_cycles() {
        let mut page = RegisterPage::new();
        assert_eq!(page.domain, "retail");
        page.next_domain();
        assert_eq!(page.domain, "medical");
    }
}
