use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use minddocs_core::chat::Applied;
use minddocs_core::forms::{self, login_error_message, register_error_message, upload_outcome, Translation};
use minddocs_core::{DocumentRef, Report, Result as ApiResult, Route};
use tracing::{debug, info, warn};

use crate::app::{ApiEvent, App, ChatFocus, InputMode, LoginPage, Page, RegisterPage, UploadEdit};
use crate::tui::AppEvent;

const EXPORT_FAILED: &str = "Could not save the PDF report.";
const TOKEN_NOT_SAVED: &str = "Logged in, but the session could not be saved.";
const SCROLL_STEP: u16 = 5;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key)?,
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick_animation();
        }
        AppEvent::Api { visit, event } => handle_api_event(app, visit, event),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) -> Result<()> {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return Ok(());
    }

    // the splash covers the page until it expires
    if app.is_splash_showing() {
        return Ok(());
    }

    if app.show_menu {
        handle_menu(app, key);
        return Ok(());
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }

    Ok(())
}

fn handle_menu(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('m') => app.show_menu = false,
        KeyCode::Char('j') | KeyCode::Down => app.menu_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.menu_nav_up(),
        KeyCode::Enter => {
            let links = app.nav_links();
            if let Some(link) = app.menu_state.selected().and_then(|i| links.get(i)) {
                app.activate(*link);
            }
            app.show_menu = false;
        }
        _ => {}
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('m') => {
            app.show_menu = true;
            app.menu_state.select(Some(0));
            return;
        }
        KeyCode::Char('t') => {
            app.toggle_theme();
            return;
        }
        KeyCode::Char(c @ '1'..='9') => {
            let links = app.nav_links();
            let index = c as usize - '1' as usize;
            if let Some(link) = links.get(index) {
                app.activate(*link);
            }
            return;
        }
        _ => {}
    }

    match app.route {
        Route::Home => handle_home_normal(app, key),
        Route::Login => handle_login_normal(app, key),
        Route::Register => handle_register_normal(app, key),
        Route::Upload => handle_upload_normal(app, key),
        Route::Documents => handle_documents_normal(app, key),
        Route::Chat => handle_chat_normal(app, key),
        Route::Summary => handle_summary_normal(app, key),
        Route::Translate => handle_translate_normal(app, key),
        Route::Extract => handle_extract_normal(app, key),
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match app.route {
        Route::Login => handle_login_editing(app, key),
        Route::Register => handle_register_editing(app, key),
        Route::Upload => handle_upload_editing(app, key),
        Route::Chat => handle_chat_editing(app, key),
        _ => app.input_mode = InputMode::Normal,
    }
}

fn handle_home_normal(app: &mut App, key: KeyEvent) {
    if app.is_authenticated() {
        if key.code == KeyCode::Enter {
            app.navigate(Route::Upload);
        }
    } else {
        match key.code {
            KeyCode::Char('l') | KeyCode::Enter => app.navigate(Route::Login),
            KeyCode::Char('r') => app.navigate(Route::Register),
            _ => {}
        }
    }
}

// --- Login / Register ---

fn handle_login_normal(app: &mut App, key: KeyEvent) {
    let Page::Login(page) = &mut app.page else { return };
    match key.code {
        KeyCode::Char('j') | KeyCode::Down | KeyCode::Tab => page.focus = (page.focus + 1) % LoginPage::FIELDS,
        KeyCode::Char('k') | KeyCode::Up => page.focus = page.focus.saturating_sub(1),
        KeyCode::Enter | KeyCode::Char('i') => app.input_mode = InputMode::Editing,
        KeyCode::Char('s') => submit_login(app),
        KeyCode::Char('r') => app.navigate(Route::Register),
        _ => {}
    }
}

fn handle_login_editing(app: &mut App, key: KeyEvent) {
    let Page::Login(page) = &mut app.page else { return };
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Tab => page.focus = (page.focus + 1) % LoginPage::FIELDS,
        KeyCode::Enter => submit_login(app),
        _ => {
            page.focused_input().handle_key(key);
        }
    }
}

fn submit_login(app: &mut App) {
    let Page::Login(page) = &mut app.page else { return };
    if page.loading {
        return;
    }
    page.error = None;
    let (username, password) = match page.form().validate() {
        Ok((u, p)) => (u.to_string(), p.to_string()),
        Err(e) => {
            page.error = Some(login_error_message(&e));
            return;
        }
    };
    page.loading = true;
    app.input_mode = InputMode::Normal;
    info!(username = %username, "logging in");
    app.spawn_request(move |client| async move { ApiEvent::LoggedIn(client.login(&username, &password).await) });
}

fn handle_register_normal(app: &mut App, key: KeyEvent) {
    let Page::Register(page) = &mut app.page else { return };
    match key.code {
        KeyCode::Char('j') | KeyCode::Down | KeyCode::Tab => page.focus = (page.focus + 1) % RegisterPage::FIELDS,
        KeyCode::Char('k') | KeyCode::Up => page.focus = page.focus.saturating_sub(1),
        KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Right if page.focus == RegisterPage::DOMAIN_FIELD => {
            page.next_domain()
        }
        KeyCode::Enter | KeyCode::Char('i') => app.input_mode = InputMode::Editing,
        KeyCode::Char('s') => submit_register(app),
        KeyCode::Char('l') => app.navigate(Route::Login),
        _ => {}
    }
}

fn handle_register_editing(app: &mut App, key: KeyEvent) {
    let Page::Register(page) = &mut app.page else { return };
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Tab => {
            page.focus = (page.focus + 1) % RegisterPage::FIELDS;
            if page.focus == RegisterPage::DOMAIN_FIELD {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Enter => submit_register(app),
        _ => {
            if let Some(input) = page.focused_input() {
                input.handle_key(key);
            }
        }
    }
}

fn submit_register(app: &mut App) {
    let Page::Register(page) = &mut app.page else { return };
    if page.loading {
        return;
    }
    page.error = None;
    let request = match page.form().validate() {
        Ok(request) => request,
        Err(e) => {
            page.error = Some(register_error_message(&e));
            return;
        }
    };
    page.loading = true;
    app.input_mode = InputMode::Normal;
    info!(username = %request.username, domain = %request.domain, "registering");
    app.spawn_request(move |client| async move { ApiEvent::Registered(client.register(&request).await) });
}

// --- Upload ---

fn handle_upload_normal(app: &mut App, key: KeyEvent) {
    let Page::Upload(page) = &mut app.page else { return };
    let count = page.form.files().len();
    match key.code {
        KeyCode::Char('a') | KeyCode::Char('i') => {
            page.input.clear();
            page.editing = Some(UploadEdit::Path);
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Char('j') | KeyCode::Down if count > 0 => {
            let i = page.files_state.selected().map(|i| (i + 1).min(count - 1)).unwrap_or(0);
            page.files_state.select(Some(i));
        }
        KeyCode::Char('k') | KeyCode::Up => {
            let i = page.files_state.selected().unwrap_or(0);
            page.files_state.select(Some(i.saturating_sub(1)));
        }
        KeyCode::Char('r') => {
            if let Some(i) = page.files_state.selected().filter(|i| *i < count) {
                let current = page.form.names()[i].clone();
                page.input.set(&current);
                page.editing = Some(UploadEdit::Name(i));
                app.input_mode = InputMode::Editing;
            }
        }
        KeyCode::Char('d') => {
            if let Some(i) = page.files_state.selected() {
                page.form.remove_file(i);
                let remaining = page.form.files().len();
                page.files_state.select(if remaining == 0 { None } else { Some(i.min(remaining - 1)) });
            }
        }
        KeyCode::Char('s') | KeyCode::Enter => submit_upload(app),
        _ => {}
    }
}

fn handle_upload_editing(app: &mut App, key: KeyEvent) {
    let Page::Upload(page) = &mut app.page else { return };
    match key.code {
        KeyCode::Esc => {
            page.editing = None;
            page.input.clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            let value = page.input.take();
            match page.editing.take() {
                Some(UploadEdit::Path) => {
                    let path = value.trim();
                    if !path.is_empty() {
                        page.form.add_file(path);
                        page.files_state.select(Some(page.form.files().len() - 1));
                        page.error = None;
                    }
                }
                Some(UploadEdit::Name(i)) => page.form.set_name(i, &value),
                None => {}
            }
            app.input_mode = InputMode::Normal;
        }
        _ => {
            page.input.handle_key(key);
        }
    }
}

fn submit_upload(app: &mut App) {
    let Page::Upload(page) = &mut app.page else { return };
    if page.loading {
        return;
    }
    page.message = None;
    page.error = None;
    let files = match page.form.validate() {
        Ok(files) => files,
        Err(e) => {
            page.error = Some(e.banner(forms::UPLOAD_FAILED));
            return;
        }
    };
    page.loading = true;
    info!(count = files.len(), "uploading documents");
    app.spawn_request(move |client| async move { ApiEvent::Uploaded(client.upload_documents(&files).await) });
}

// --- Documents ---

fn handle_documents_normal(app: &mut App, key: KeyEvent) {
    let Page::Documents(page) = &mut app.page else { return };
    let target = match key.code {
        KeyCode::Char('j') | KeyCode::Down => return page.picker.next(),
        KeyCode::Char('k') | KeyCode::Up => return page.picker.prev(),
        KeyCode::Char('c') => Route::Chat,
        KeyCode::Char('s') => Route::Summary,
        KeyCode::Char('l') => Route::Translate,
        KeyCode::Char('x') => Route::Extract,
        _ => return,
    };
    if let Some(name) = page.picker.highlighted_name() {
        info!(doc = %name, route = target.path(), "document action");
        app.open_with_document(target, &name);
    }
}

// --- Chat ---

fn handle_chat_normal(app: &mut App, key: KeyEvent) {
    let Page::Chat(chat) = &mut app.page else { return };
    match key.code {
        KeyCode::Tab => {
            chat.focus = match chat.focus {
                ChatFocus::Documents => ChatFocus::Input,
                ChatFocus::Input => ChatFocus::Documents,
            };
        }
        KeyCode::Char('i') => {
            chat.focus = ChatFocus::Input;
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Enter if chat.focus == ChatFocus::Input => app.input_mode = InputMode::Editing,
        KeyCode::Char('j') | KeyCode::Down if chat.focus == ChatFocus::Documents => chat.picker.next(),
        KeyCode::Char('k') | KeyCode::Up if chat.focus == ChatFocus::Documents => chat.picker.prev(),
        KeyCode::Char(' ') | KeyCode::Enter if chat.focus == ChatFocus::Documents => {
            if let Some(name) = chat.picker.highlighted_name() {
                let request = chat.controller.toggle_document(&name);
                app.after_selection_change(request);
            }
        }
        KeyCode::Char('v') => {
            let request = chat.controller.toggle_mode();
            info!(mode = ?chat.controller.mode(), "chat mode switched");
            app.after_selection_change(request);
        }
        // chat scroll counts lines up from the newest message
        KeyCode::PageUp | KeyCode::Char('K') => chat.scroll = chat.scroll.saturating_add(SCROLL_STEP),
        KeyCode::PageDown | KeyCode::Char('J') => chat.scroll = chat.scroll.saturating_sub(SCROLL_STEP),
        KeyCode::Esc => chat.controller.clear_error(),
        _ => {}
    }
}

fn handle_chat_editing(app: &mut App, key: KeyEvent) {
    let Page::Chat(chat) = &mut app.page else { return };
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Enter => {
            let question = chat.input.value().to_string();
            match chat.controller.submit(&question) {
                Ok(submission) => {
                    chat.input.clear();
                    chat.scroll = 0;
                    app.input_mode = InputMode::Normal;
                    app.start_submission(submission);
                }
                Err(e) => debug!(error = %e, "chat submission refused"),
            }
        }
        _ => {
            chat.input.handle_key(key);
        }
    }
}

// --- Summarize / Translate / Extract ---

fn handle_summary_normal(app: &mut App, key: KeyEvent) {
    let Page::Summary(page) = &mut app.page else { return };
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            page.picker.next();
            page.form.document = page.picker.highlighted_name();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            page.picker.prev();
            page.form.document = page.picker.highlighted_name();
        }
        KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Right => page.form.increase_ratio(),
        KeyCode::Char('-') | KeyCode::Left => page.form.decrease_ratio(),
        KeyCode::PageDown | KeyCode::Char('J') => page.scroll = page.scroll.saturating_add(SCROLL_STEP),
        KeyCode::PageUp | KeyCode::Char('K') => page.scroll = page.scroll.saturating_sub(SCROLL_STEP),
        KeyCode::Char('e') => export_report(app),
        KeyCode::Char('s') | KeyCode::Enter => {
            if page.loading {
                return;
            }
            page.error = None;
            page.notice = None;
            let (doc, ratio) = match page.form.validate() {
                Ok(request) => request,
                Err(e) => {
                    page.error = Some(e.banner(forms::SUMMARY_FAILED));
                    return;
                }
            };
            page.loading = true;
            page.result = None;
            page.scroll = 0;
            info!(doc = %doc, ratio, "summarizing");
            app.spawn_request(move |client| async move { ApiEvent::Summarized(client.summarize(&doc, ratio).await) });
        }
        _ => {}
    }
}

fn handle_translate_normal(app: &mut App, key: KeyEvent) {
    let Page::Translate(page) = &mut app.page else { return };
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            page.picker.next();
            page.form.document = page.picker.highlighted_name();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            page.picker.prev();
            page.form.document = page.picker.highlighted_name();
        }
        KeyCode::Char('l') | KeyCode::Right => page.form.next_language(),
        KeyCode::PageDown | KeyCode::Char('J') => page.scroll = page.scroll.saturating_add(SCROLL_STEP),
        KeyCode::PageUp | KeyCode::Char('K') => page.scroll = page.scroll.saturating_sub(SCROLL_STEP),
        KeyCode::Char('e') => export_report(app),
        KeyCode::Char('s') | KeyCode::Enter => {
            if page.loading {
                return;
            }
            page.error = None;
            page.notice = None;
            let (doc, language) = match page.form.validate() {
                Ok(request) => request,
                Err(e) => {
                    page.error = Some(e.banner(forms::TRANSLATION_FAILED));
                    return;
                }
            };
            page.loading = true;
            page.result = None;
            page.scroll = 0;
            info!(doc = %doc, language = %language, "translating");
            app.spawn_request(move |client| async move {
                ApiEvent::Translated(client.translate(&doc, &language).await)
            });
        }
        _ => {}
    }
}

fn handle_extract_normal(app: &mut App, key: KeyEvent) {
    let Page::Extract(page) = &mut app.page else { return };
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            page.picker.next();
            page.form.document = page.picker.highlighted_name();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            page.picker.prev();
            page.form.document = page.picker.highlighted_name();
        }
        KeyCode::PageDown | KeyCode::Char('J') => page.scroll = page.scroll.saturating_add(SCROLL_STEP),
        KeyCode::PageUp | KeyCode::Char('K') => page.scroll = page.scroll.saturating_sub(SCROLL_STEP),
        KeyCode::Char('s') | KeyCode::Enter => {
            if page.loading {
                return;
            }
            page.error = None;
            let doc = match page.form.validate() {
                Ok(doc) => doc,
                Err(e) => {
                    page.error = Some(e.banner(forms::EXTRACTION_FAILED));
                    return;
                }
            };
            page.loading = true;
            page.result = None;
            page.scroll = 0;
            info!(doc = %doc, "extracting");
            app.spawn_request(move |client| async move { ApiEvent::Extracted(client.extract(&doc).await) });
        }
        _ => {}
    }
}

fn export_report(app: &mut App) {
    let dir = app.export_dir.clone();
    let (report, notice, error) = match &mut app.page {
        Page::Summary(page) => match &page.result {
            Some(result) => (Report::from_summary(result), &mut page.notice, &mut page.error),
            None => return,
        },
        Page::Translate(page) => match &page.result {
            Some(result) => (Report::from_translation(result), &mut page.notice, &mut page.error),
            None => return,
        },
        _ => return,
    };

    match report.write_to(&dir) {
        Ok(path) => *notice = Some(format!("Saved {}", path.display())),
        Err(e) => {
            warn!(error = %e, "report export failed");
            *error = Some(e.banner(EXPORT_FAILED));
        }
    }
}

// --- Background results ---

fn handle_api_event(app: &mut App, visit: u64, event: ApiEvent) {
    if visit != app.visit {
        debug!(visit, current = app.visit, "dropping result from an earlier page visit");
        return;
    }

    match event {
        ApiEvent::Documents(result) => on_documents(app, result),
        ApiEvent::Chat(event) => {
            if let Page::Chat(chat) = &mut app.page {
                if let Applied::Finished(outcome) = chat.controller.apply(event) {
                    debug!(?outcome, "chat submission finished");
                    chat.submission_task = None;
                }
                if !chat.controller.is_loading_history() {
                    chat.history_task = None;
                }
            }
        }
        ApiEvent::LoggedIn(result) => match result {
            Ok(login) => {
                if let Err(e) = app.session.login(&login.access_token) {
                    warn!(error = %e, "could not store session token");
                    if let Page::Login(page) = &mut app.page {
                        page.loading = false;
                        page.error = Some(TOKEN_NOT_SAVED.to_string());
                    }
                    return;
                }
                info!(username = ?login.username, "logged in");
                app.navigate(Route::Home);
            }
            Err(e) => {
                warn!(error = %e, "login failed");
                if let Page::Login(page) = &mut app.page {
                    page.loading = false;
                    page.error = Some(login_error_message(&e));
                }
            }
        },
        ApiEvent::Registered(result) => match result {
            Ok(_) => {
                info!("registered");
                app.navigate(Route::Home);
            }
            Err(e) => {
                warn!(error = %e, "registration failed");
                if let Page::Register(page) = &mut app.page {
                    page.loading = false;
                    page.error = Some(register_error_message(&e));
                }
            }
        },
        ApiEvent::Uploaded(result) => {
            if let Page::Upload(page) = &mut app.page {
                page.loading = false;
                match upload_outcome(&result) {
                    Ok(message) => {
                        info!(message = %message, "upload finished");
                        page.message = Some(message);
                        page.form.reset();
                        page.files_state.select(None);
                    }
                    Err(message) => page.error = Some(message),
                }
            }
        }
        ApiEvent::Summarized(result) => {
            if let Page::Summary(page) = &mut app.page {
                page.loading = false;
                match result {
                    Ok(summary) => page.result = Some(summary),
                    Err(e) => page.error = Some(e.banner(forms::SUMMARY_FAILED)),
                }
            }
        }
        ApiEvent::Translated(result) => {
            if let Page::Translate(page) = &mut app.page {
                page.loading = false;
                match result {
                    Ok(translation) => page.result = Some(Translation::from(translation)),
                    Err(e) => page.error = Some(e.banner(forms::TRANSLATION_FAILED)),
                }
            }
        }
        ApiEvent::Extracted(result) => {
            if let Page::Extract(page) = &mut app.page {
                page.loading = false;
                match result {
                    Ok(extracted) => page.result = Some(extracted),
                    Err(e) => page.error = Some(e.banner(forms::EXTRACTION_FAILED)),
                }
            }
        }
    }
}

fn on_documents(app: &mut App, result: ApiResult<Vec<DocumentRef>>) {
    let failure = match &app.page {
        Page::Documents(_) => None,
        Page::Chat(_) => Some(forms::CHAT_DOCUMENTS_FAILED),
        Page::Summary(_) => Some(forms::SUMMARY_DOCUMENTS_FAILED),
        Page::Translate(_) => Some(forms::TRANSLATION_DOCUMENTS_FAILED),
        Page::Extract(_) => Some(forms::EXTRACT_DOCUMENTS_FAILED),
        _ => return,
    };

    let documents = match result {
        Ok(documents) => documents,
        Err(e) if failure.is_none() => {
            warn!(error = %e, "document list failed, back to login");
            app.navigate(Route::Login);
            return;
        }
        Err(e) => {
            warn!(error = %e, "document list failed");
            if let Some(picker) = app.page.picker_mut() {
                picker.loading = false;
                picker.error = failure.map(str::to_string);
            }
            return;
        }
    };

    // a document chosen before the list arrived stays highlighted
    let chosen = match &app.page {
        Page::Chat(chat) => chat.controller.selection().first().cloned(),
        Page::Summary(p) => p.form.document.clone(),
        Page::Translate(p) => p.form.document.clone(),
        Page::Extract(p) => p.form.document.clone(),
        _ => None,
    };

    if let Some(picker) = app.page.picker_mut() {
        picker.loading = false;
        picker.error = None;
        picker.documents = documents;
        let index = chosen.and_then(|name| picker.documents.iter().position(|d| d.name == name));
        picker.state.select(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minddocs_core::api::SummaryResult;
    use minddocs_core::{ApiClient, ApiError, Config, MemoryStore, Session};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    fn app() -> App {
        let session = Session::new(Arc::new(MemoryStore::new()));
        let client = ApiClient::new("http://127.0.0.1:9", session.tokens().clone());
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = App::new(session, client, &Config::default(), tx);
        app.splash.dismiss();
        app
    }

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn doc(name: &str) -> DocumentRef {
        DocumentRef {
            id: 1,
            name: name.to_string(),
            domain: Some("finance".to_string()),
            created_at: None,
            blob_url: None,
            filename: None,
        }
    }

    #[tokio::test]
    async fn test_stale_results_are_dropped() {
        let mut app = app();
        app.session.login("tok").unwrap();
        app.navigate(Route::Summary);
        let old_visit = app.visit;
        app.navigate(Route::Summary);
        app.splash.dismiss();

        handle_event(
            &mut app,
            AppEvent::Api {
                visit: old_visit,
                event: ApiEvent::Documents(Ok(vec![doc("Q1 Report")])),
            },
        )
        .await
        .unwrap();

        let Page::Summary(page) = &app.page else { panic!("not on summary") };
        assert!(page.picker.documents.is_empty());
    }

    #[tokio::test]
    async fn test_summary_requires_selection_before_request() {
        let mut app = app();
        app.session.login("tok").unwrap();
        app.navigate(Route::Summary);
        app.splash.dismiss();

        handle_event(&mut app, key(KeyCode::Char('s'))).await.unwrap();
        let Page::Summary(page) = &app.page else { panic!("not on summary") };
        assert_eq!(page.error.as_deref(), Some(forms::SELECT_DOCUMENT));
        assert!(!page.loading);
    }

    #[tokio::test]
    async fn test_summary_error_shows_server_detail() {
        let mut app = app();
        app.session.login("tok").unwrap();
        app.navigate(Route::Summary);
        let visit = app.visit;
        if let Page::Summary(page) = &mut app.page {
            page.loading = true;
        }

        handle_api_event(
            &mut app,
            visit,
            ApiEvent::Summarized(Err(ApiError::Server {
                status: 404,
                detail: Some("Document not found.".to_string()),
            })),
        );
        let Page::Summary(page) = &app.page else { panic!("not on summary") };
        assert_eq!(page.error.as_deref(), Some("Document not found."));
        assert!(!page.loading);
    }

    #[tokio::test]
    async fn test_summary_export_writes_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app();
        app.export_dir = dir.path().to_path_buf();
        app.session.login("tok").unwrap();
        app.navigate(Route::Summary);
        if let Page::Summary(page) = &mut app.page {
            page.result = Some(SummaryResult {
                summary: "Revenue grew.".to_string(),
                doc_name: "Q1 Report".to_string(),
                domain: None,
                original_word_count: 10,
                summary_word_count: 3,
                compression_ratio: 0.3,
            });
        }

        export_report(&mut app);
        assert!(dir.path().join("Q1 Report_Summary.pdf").exists());
        let Page::Summary(page) = &app.page else { panic!("not on summary") };
        assert!(page.notice.is_some());
    }

    #[tokio::test]
    async fn test_documents_failure_redirects_to_login() {
        let mut app = app();
        app.session.login("tok").unwrap();
        app.navigate(Route::Documents);
        let visit = app.visit;

        handle_api_event(
            &mut app,
            visit,
            ApiEvent::Documents(Err(ApiError::Server { status: 401, detail: None })),
        );
        assert_eq!(app.route, Route::Login);
    }

    #[tokio::test]
    async fn test_chat_documents_failure_sets_banner() {
        let mut app = app();
        app.session.login("tok").unwrap();
        app.navigate(Route::Chat);
        let visit = app.visit;

        handle_api_event(
            &mut app,
            visit,
            ApiEvent::Documents(Err(ApiError::Server { status: 500, detail: None })),
        );
        let Page::Chat(chat) = &app.page else { panic!("not on chat") };
        assert_eq!(chat.picker.error.as_deref(), Some(forms::CHAT_DOCUMENTS_FAILED));
        assert!(!chat.picker.loading);
    }

    #[tokio::test]
    async fn test_login_success_stores_token_and_goes_home() {
        let mut app = app();
        app.navigate(Route::Login);
        let visit = app.visit;

        handle_api_event(
            &mut app,
            visit,
            ApiEvent::LoggedIn(Ok(minddocs_core::api::LoginResponse {
                access_token: "abc".to_string(),
                token_type: Some("bearer".to_string()),
                username: Some("alice".to_string()),
            })),
        );
        assert_eq!(app.route, Route::Home);
        assert_eq!(app.session.tokens().get().as_deref(), Some("abc"));
    }

    fn documents_page_with(app: &mut App, names: &[&str]) {
        app.session.login("tok").unwrap();
        app.navigate(Route::Documents);
        app.splash.dismiss();
        let visit = app.visit;
        let documents = names.iter().map(|n| doc(n)).collect();
        handle_api_event(app, visit, ApiEvent::Documents(Ok(documents)));
    }

    #[tokio::test]
    async fn test_document_row_opens_summary_preselected() {
        let mut app = app();
        documents_page_with(&mut app, &["Q1 Report", "Q2 Report"]);

        handle_event(&mut app, key(KeyCode::Char('j'))).await.unwrap();
        handle_event(&mut app, key(KeyCode::Char('j'))).await.unwrap();
        handle_event(&mut app, key(KeyCode::Char('s'))).await.unwrap();
        assert_eq!(app.route, Route::Summary);

        let visit = app.visit;
        handle_api_event(
            &mut app,
            visit,
            ApiEvent::Documents(Ok(vec![doc("Q1 Report"), doc("Q2 Report")])),
        );
        let Page::Summary(page) = &app.page else { panic!("not on summary") };
        assert_eq!(page.form.document.as_deref(), Some("Q2 Report"));
        assert_eq!(page.picker.highlighted_name().as_deref(), Some("Q2 Report"));
    }

    #[tokio::test]
    async fn test_document_row_opens_chat_with_selection() {
        let mut app = app();
        documents_page_with(&mut app, &["Q1 Report"]);

        handle_event(&mut app, key(KeyCode::Char('j'))).await.unwrap();
        handle_event(&mut app, key(KeyCode::Char('c'))).await.unwrap();
        assert_eq!(app.route, Route::Chat);
        let Page::Chat(chat) = &app.page else { panic!("not on chat") };
        assert_eq!(chat.controller.selection(), &["Q1 Report".to_string()]);
        assert!(chat.controller.is_loading_history());
    }

    #[tokio::test]
    async fn test_document_action_needs_a_highlighted_row() {
        let mut app = app();
        documents_page_with(&mut app, &["Q1 Report"]);

        handle_event(&mut app, key(KeyCode::Char('x'))).await.unwrap();
        assert_eq!(app.route, Route::Documents);
    }

    #[tokio::test]
    async fn test_digit_keys_follow_nav_links() {
        let mut app = app();
        handle_event(&mut app, key(KeyCode::Char('2'))).await.unwrap();
        assert_eq!(app.route, Route::Login);
    }
}
