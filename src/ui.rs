use minddocs_core::chat::ChatMode;
use minddocs_core::forms::{self, summary_details};
use minddocs_core::{NavLink, Route, Sender, Theme};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::app::{
    App, ChatFocus, ChatPage, DocumentPicker, ExtractPage, InputMode, LoginPage, Page, RegisterPage, SummaryPage,
    TranslatePage, UploadEdit, UploadPage,
};
use crate::input::TextInput;

/// Colours that change with the theme.
#[derive(Debug, Clone, Copy)]
struct Palette {
    background: Color,
    text: Color,
    muted: Color,
    accent: Color,
    highlight: Color,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                background: Color::Reset,
                text: Color::White,
                muted: Color::DarkGray,
                accent: Color::Cyan,
                highlight: Color::Blue,
            },
            Theme::Light => Self {
                background: Color::White,
                text: Color::Black,
                muted: Color::Gray,
                accent: Color::Blue,
                highlight: Color::LightBlue,
            },
        }
    }

    fn border(&self, focused: bool) -> Style {
        Style::default().fg(if focused { self.accent } else { self.muted })
    }

    fn list_highlight(&self) -> Style {
        Style::default()
            .bg(self.highlight)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let palette = Palette::for_theme(app.theme());

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    frame.render_widget(
        Block::default().style(Style::default().bg(palette.background).fg(palette.text)),
        body_area,
    );

    render_header(app, frame, header_area);

    let busy_frame = app.animation_frame;
    let editing = app.input_mode == InputMode::Editing;
    match &mut app.page {
        Page::Home => render_home(app.session.is_authenticated(), &palette, frame, body_area),
        Page::Login(page) => render_login(page, editing, &palette, frame, body_area),
        Page::Register(page) => render_register(page, editing, &palette, frame, body_area),
        Page::Upload(page) => render_upload(page, editing, &palette, frame, body_area),
        Page::Documents(page) => render_documents(&mut page.picker, &palette, frame, body_area),
        Page::Chat(chat) => render_chat(chat, editing, busy_frame, &palette, frame, body_area),
        Page::Summary(page) => render_summary(page, busy_frame, &palette, frame, body_area),
        Page::Translate(page) => render_translate(page, busy_frame, &palette, frame, body_area),
        Page::Extract(page) => render_extract(page, busy_frame, &palette, frame, body_area),
    }

    render_footer(app, frame, footer_area);

    // Render popups (in order of priority)
    if app.is_splash_showing() {
        render_splash(app.animation_frame, &palette, frame, body_area);
    } else if app.show_menu {
        render_menu(app, &palette, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let account = if app.is_authenticated() { " signed in " } else { " guest " };

    let title = Line::from(vec![
        Span::styled(" MindDocs AI ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(format!("{} ", app.route.title()), Style::default().fg(Color::White)),
        Span::styled(app.route.path(), Style::default().fg(Color::Gray)),
        Span::styled(account, Style::default().fg(Color::Green)),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " EDIT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hint = |key: &'static str, label: &'static str| {
        [
            Span::styled(format!(" {key} "), key_style),
            Span::styled(format!(" {label} "), label_style),
        ]
    };

    let mut hints: Vec<Span> = Vec::new();
    if app.input_mode == InputMode::Editing {
        let submit = match app.route {
            Route::Chat => "send",
            Route::Upload => "add",
            _ => "submit",
        };
        hints.extend(hint("Enter", submit));
        if matches!(app.route, Route::Login | Route::Register) {
            hints.extend(hint("Tab", "next field"));
        }
        hints.extend(hint("Esc", "stop typing"));
    } else {
        match &app.page {
            Page::Home if app.is_authenticated() => hints.extend(hint("Enter", "upload")),
            Page::Home => {
                hints.extend(hint("l", "login"));
                hints.extend(hint("r", "register"));
            }
            Page::Login(_) | Page::Register(_) => {
                hints.extend(hint("j/k", "field"));
                hints.extend(hint("Enter", "edit"));
                hints.extend(hint("s", "submit"));
            }
            Page::Upload(_) => {
                hints.extend(hint("a", "add file"));
                hints.extend(hint("r", "rename"));
                hints.extend(hint("d", "remove"));
                hints.extend(hint("s", "upload"));
            }
            Page::Documents(_) => {
                hints.extend(hint("j/k", "nav"));
                hints.extend(hint("c", "chat"));
                hints.extend(hint("s", "summarize"));
                hints.extend(hint("l", "translate"));
                hints.extend(hint("x", "extract"));
            }
            Page::Chat(chat) => {
                hints.extend(hint("Tab", "focus"));
                if chat.focus == ChatFocus::Documents {
                    hints.extend(hint("j/k", "nav"));
                    hints.extend(hint("Space", "select"));
                }
                hints.extend(hint("i", "ask"));
                hints.extend(hint("v", "mode"));
            }
            Page::Summary(_) => {
                hints.extend(hint("j/k", "doc"));
                hints.extend(hint("+/-", "ratio"));
                hints.extend(hint("s", "summarize"));
                hints.extend(hint("e", "pdf"));
            }
            Page::Translate(_) => {
                hints.extend(hint("j/k", "doc"));
                hints.extend(hint("l", "language"));
                hints.extend(hint("s", "translate"));
                hints.extend(hint("e", "pdf"));
            }
            Page::Extract(_) => {
                hints.extend(hint("j/k", "doc"));
                hints.extend(hint("s", "extract"));
            }
        }
        hints.extend(hint("m", "menu"));
        hints.extend(hint("t", "theme"));
        hints.extend(hint("q", "quit"));
    }

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::styled(" ", label_style)];
    if app.is_busy() {
        spans.push(Span::styled(
            format!(" working{} ", ".".repeat(app.animation_frame as usize + 1)),
            Style::default().bg(Color::Magenta).fg(Color::White),
        ));
    }
    spans.extend(hints);

    let footer = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_home(authenticated: bool, palette: &Palette, frame: &mut Frame, area: Rect) {
    let accent = Style::default().fg(palette.accent).add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::default(),
        Line::from(Span::styled("MindDocs AI", accent)),
        Line::from(Span::styled(
            "Ask questions, summarize, translate and extract data from your PDFs.",
            Style::default().fg(palette.text),
        )),
        Line::default(),
    ];
    for (title, text) in [
        ("Upload", "Store PDF documents under a name of your choice."),
        ("Chat", "Talk to one document, or several at once."),
        ("Summarize", "Condense a document to the ratio you pick."),
        ("Translate", "Read a document in another language."),
        ("Extract", "Pull structured fields out of a document."),
    ] {
        lines.push(Line::from(vec![
            Span::styled(format!("  {title:<10}"), accent),
            Span::styled(text, Style::default().fg(palette.text)),
        ]));
    }
    lines.push(Line::default());
    let prompt = if authenticated {
        "Press Enter to upload documents, or m for the menu."
    } else {
        "Press l to log in or r to create an account."
    };
    lines.push(Line::from(Span::styled(prompt, Style::default().fg(palette.muted))));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border(false))
        .title(" Home ");
    frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: true }), area);
}

/// Bordered single-line input; places the cursor when `active`.
fn render_input(
    input: &TextInput,
    title: &str,
    focused: bool,
    active: bool,
    palette: &Palette,
    frame: &mut Frame,
    area: Rect,
) {
    let border = if active {
        Style::default().fg(Color::Yellow)
    } else {
        palette.border(focused)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(format!(" {title} "));

    let inner_width = area.width.saturating_sub(2) as usize;
    let (visible, cursor_x) = input.visible(inner_width);
    frame.render_widget(
        Paragraph::new(visible).style(Style::default().fg(palette.accent)).block(block),
        area,
    );

    if active {
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_banner(error: Option<&str>, notice: Option<&str>, frame: &mut Frame, area: Rect) {
    let line = match (error, notice) {
        (Some(error), _) => Line::from(Span::styled(error.to_string(), Style::default().fg(Color::Red).bold())),
        (None, Some(notice)) => Line::from(Span::styled(notice.to_string(), Style::default().fg(Color::Green))),
        (None, None) => Line::default(),
    };
    frame.render_widget(Paragraph::new(line).wrap(Wrap { trim: true }), area);
}

/// Form column of fixed width centered in `area`.
fn form_area(area: Rect, height: u16) -> Rect {
    let width = 60.min(area.width.saturating_sub(4));
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 3;
    Rect::new(x, y, width, height)
}

fn render_login(page: &LoginPage, editing: bool, palette: &Palette, frame: &mut Frame, area: Rect) {
    let form = form_area(area, 11);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border(true))
        .title(" Login ");
    let inner = block.inner(form);
    frame.render_widget(Clear, form);
    frame.render_widget(block, form);

    let [username_area, password_area, status_area, banner_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(1),
    ])
    .areas(inner);

    render_input(&page.username, "Username", page.focus == 0, editing && page.focus == 0, palette, frame, username_area);
    render_input(&page.password, "Password", page.focus == 1, editing && page.focus == 1, palette, frame, password_area);

    let status = if page.loading { "Logging in..." } else { "" };
    frame.render_widget(Paragraph::new(status).style(Style::default().fg(palette.muted)), status_area);
    render_banner(page.error.as_deref(), None, frame, banner_area);
}

fn render_register(page: &RegisterPage, editing: bool, palette: &Palette, frame: &mut Frame, area: Rect) {
    let form = form_area(area, 17);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border(true))
        .title(" Create account ");
    let inner = block.inner(form);
    frame.render_widget(Clear, form);
    frame.render_widget(block, form);

    let [username_area, email_area, password_area, domain_area, banner_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(1),
    ])
    .areas(inner);

    let active = |field: usize| editing && page.focus == field;
    render_input(&page.username, "Username", page.focus == 0, active(0), palette, frame, username_area);
    render_input(&page.email, "Email", page.focus == 1, active(1), palette, frame, email_area);
    render_input(&page.password, "Password", page.focus == 2, active(2), palette, frame, password_area);

    let domain_focused = page.focus == RegisterPage::DOMAIN_FIELD;
    let domains: Vec<Span> = forms::DOMAINS
        .iter()
        .map(|d| {
            if *d == page.domain {
                Span::styled(format!(" [{d}] "), Style::default().fg(palette.accent).bold())
            } else {
                Span::styled(format!("  {d}  "), Style::default().fg(palette.muted))
            }
        })
        .collect();
    let domain = Paragraph::new(Line::from(domains)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(palette.border(domain_focused))
            .title(" Domain (Enter to change) "),
    );
    frame.render_widget(domain, domain_area);

    let error = page.error.as_deref();
    let notice = page.loading.then_some("Creating account...");
    render_banner(error, notice, frame, banner_area);
}

fn render_upload(page: &mut UploadPage, editing: bool, palette: &Palette, frame: &mut Frame, area: Rect) {
    let [input_area, list_area, banner_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(2),
    ])
    .areas(area);

    let title = match page.editing {
        Some(UploadEdit::Name(_)) => "Display name",
        _ => "PDF path (a to add)",
    };
    render_input(&page.input, title, editing, editing, palette, frame, input_area);

    let items: Vec<ListItem> = page
        .form
        .files()
        .iter()
        .zip(page.form.names())
        .map(|(path, name)| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{name:<30} "), Style::default().fg(palette.text).bold()),
                Span::styled(path.display().to_string(), Style::default().fg(palette.muted)),
            ]))
        })
        .collect();

    let title = if page.loading {
        " Uploading... ".to_string()
    } else {
        format!(" Files to upload ({}) ", page.form.files().len())
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).border_style(palette.border(!editing)).title(title))
        .highlight_style(palette.list_highlight())
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, list_area, &mut page.files_state);

    render_banner(page.error.as_deref(), page.message.as_deref(), frame, banner_area);
}

fn render_documents(picker: &mut DocumentPicker, palette: &Palette, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border(true))
        .title(" My documents ");

    if picker.loading || picker.documents.is_empty() {
        let text = if picker.loading { "Loading documents..." } else { "No documents uploaded yet." };
        frame.render_widget(
            Paragraph::new(text).style(Style::default().fg(palette.muted)).block(block),
            area,
        );
        return;
    }

    let header = Row::new(["Name", "Domain", "Uploaded", "File", "PDF"])
        .style(Style::default().fg(palette.accent).add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = picker
        .documents
        .iter()
        .map(|doc| {
            Row::new([
                doc.name.clone(),
                doc.domain.clone().unwrap_or_else(|| "-".to_string()),
                doc.uploaded_on().to_string(),
                doc.filename.clone().unwrap_or_default(),
                doc.blob_url.clone().unwrap_or_else(|| "Not Available".to_string()),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(25),
            Constraint::Percentage(12),
            Constraint::Percentage(18),
            Constraint::Percentage(15),
            Constraint::Percentage(30),
        ],
    )
    .header(header)
    .block(block)
    .highlight_style(palette.list_highlight())
    .highlight_symbol("> ");

    let mut state = ratatui::widgets::TableState::default().with_selected(picker.state.selected());
    frame.render_stateful_widget(table, area, &mut state);
}

/// Document list used by the chat and action pages.
fn render_picker(
    picker: &mut DocumentPicker,
    title: &str,
    focused: bool,
    is_marked: impl Fn(&str) -> bool,
    palette: &Palette,
    frame: &mut Frame,
    area: Rect,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border(focused))
        .title(format!(" {title} "));

    if picker.loading {
        frame.render_widget(
            Paragraph::new("Loading documents...").style(Style::default().fg(palette.muted)).block(block),
            area,
        );
        return;
    }
    if let Some(error) = &picker.error {
        frame.render_widget(
            Paragraph::new(error.as_str())
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true })
                .block(block),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = picker
        .documents
        .iter()
        .map(|doc| {
            let marked = is_marked(&doc.name);
            let prefix = if marked { "[x] " } else { "[ ] " };
            let style = if marked {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(palette.text)
            };
            ListItem::new(format!("{prefix}{}", doc.label())).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(palette.list_highlight())
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, area, &mut picker.state);
}

fn thinking_line(busy_frame: u8, palette: &Palette) -> Line<'static> {
    // Animated ellipsis: cycles through ".", "..", "..."
    let dots = ".".repeat(busy_frame as usize + 1);
    Line::from(Span::styled(
        format!("Thinking{dots}"),
        Style::default().fg(palette.muted).add_modifier(Modifier::ITALIC),
    ))
}

/// Rows `lines` will take once wrapped to `width`.
fn wrapped_height(lines: &[Line], width: u16) -> u16 {
    let width = width.max(1) as usize;
    lines
        .iter()
        .map(|line| line.width().max(1).div_ceil(width))
        .sum::<usize>()
        .min(u16::MAX as usize) as u16
}

fn render_chat(
    chat: &mut ChatPage,
    editing: bool,
    busy_frame: u8,
    palette: &Palette,
    frame: &mut Frame,
    area: Rect,
) {
    let [docs_area, chat_area] = Layout::horizontal([
        Constraint::Percentage(30),
        Constraint::Percentage(70),
    ])
    .areas(area);

    let [transcript_area, error_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(3),
    ])
    .areas(chat_area);

    let docs_focused = chat.focus == ChatFocus::Documents;
    let controller = &chat.controller;
    render_picker(
        &mut chat.picker,
        "Documents (Space to select)",
        docs_focused,
        |name| controller.is_selected(name),
        palette,
        frame,
        docs_area,
    );

    let mode = match chat.controller.mode() {
        ChatMode::History => "history",
        ChatMode::Streaming => "streaming",
    };
    let selection = match chat.controller.selection().len() {
        0 => "no document".to_string(),
        1 => chat.controller.selection()[0].clone(),
        n => format!("{n} documents"),
    };
    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border(false))
        .title(format!(" Chat: {selection} [{mode}, v to switch] "));

    let you = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let ai = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);

    let entries = chat.controller.transcript().entries();
    let busy = chat.controller.is_busy();
    let mut lines: Vec<Line> = Vec::new();
    if chat.controller.is_loading_history() {
        lines.push(Line::from(Span::styled("Loading history...", Style::default().fg(palette.muted))));
    }
    for entry in entries {
        match entry.sender {
            Sender::User => {
                lines.push(Line::from(Span::styled("You:", you)));
                lines.push(Line::from(entry.text.clone()));
            }
            Sender::Ai => {
                lines.push(Line::from(Span::styled("AI:", ai)));
                if entry.text.is_empty() && busy {
                    lines.push(thinking_line(busy_frame, palette));
                } else {
                    lines.extend(entry.text.lines().map(|l| Line::from(l.to_string())));
                }
            }
        }
        lines.push(Line::default());
    }
    if busy && entries.last().is_some_and(|e| e.sender == Sender::User) {
        lines.push(Line::from(Span::styled("AI:", ai)));
        lines.push(thinking_line(busy_frame, palette));
    }

    let text = if lines.is_empty() {
        Text::from(Span::styled(
            "Select a document and ask a question...",
            Style::default().fg(palette.muted),
        ))
    } else {
        Text::from(lines)
    };

    // scroll counts back from the newest line
    let inner_height = transcript_area.height.saturating_sub(2);
    let total = wrapped_height(&text.lines, transcript_area.width.saturating_sub(2));
    let bottom = total.saturating_sub(inner_height);
    chat.scroll = chat.scroll.min(bottom);
    let offset = bottom - chat.scroll;

    frame.render_widget(
        Paragraph::new(text)
            .block(chat_block)
            .wrap(Wrap { trim: true })
            .scroll((offset, 0)),
        transcript_area,
    );

    render_banner(chat.controller.error(), None, frame, error_area);

    let input_focused = chat.focus == ChatFocus::Input;
    render_input(
        &chat.input,
        "Ask (i to type, Enter to send)",
        input_focused,
        editing && input_focused,
        palette,
        frame,
        input_area,
    );
}

/// Picker on the left, controls and result on the right.
fn action_layout(area: Rect, controls: u16) -> (Rect, Rect, Rect, Rect) {
    let [picker_area, right] = Layout::horizontal([
        Constraint::Percentage(30),
        Constraint::Percentage(70),
    ])
    .areas(area);
    let [controls_area, banner_area, result_area] = Layout::vertical([
        Constraint::Length(controls),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(right);
    (picker_area, controls_area, banner_area, result_area)
}

fn result_block<'a>(title: &'a str, palette: &Palette) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border(false))
        .title(title)
}

fn busy_text(label: &str, busy_frame: u8, palette: &Palette) -> Text<'static> {
    Text::from(Span::styled(
        format!("{label}{}", ".".repeat(busy_frame as usize + 1)),
        Style::default().fg(palette.muted).add_modifier(Modifier::ITALIC),
    ))
}

fn render_summary(page: &mut SummaryPage, busy_frame: u8, palette: &Palette, frame: &mut Frame, area: Rect) {
    let (picker_area, controls_area, banner_area, result_area) = action_layout(area, 3);
    let chosen = page.form.document.clone();
    render_picker(
        &mut page.picker,
        "Document",
        true,
        |name| chosen.as_deref() == Some(name),
        palette,
        frame,
        picker_area,
    );

    let ratio = page.form.ratio();
    let filled = (ratio * 20.0).round() as usize;
    let controls = Paragraph::new(Line::from(vec![
        Span::styled("Summary ratio ", Style::default().fg(palette.text)),
        Span::styled(format!("{:.2} ", ratio), Style::default().fg(palette.accent).bold()),
        Span::styled("█".repeat(filled), Style::default().fg(palette.accent)),
        Span::styled("░".repeat(20 - filled.min(20)), Style::default().fg(palette.muted)),
    ]))
    .block(Block::default().borders(Borders::ALL).border_style(palette.border(false)).title(" Options "));
    frame.render_widget(controls, controls_area);

    render_banner(page.error.as_deref(), page.notice.as_deref(), frame, banner_area);

    let text = if page.loading {
        busy_text("Summarizing", busy_frame, palette)
    } else if let Some(result) = &page.result {
        let mut lines: Vec<Line> = result.summary.lines().map(|l| Line::from(l.to_string())).collect();
        lines.push(Line::default());
        for (label, value) in summary_details(result) {
            lines.push(Line::from(vec![
                Span::styled(format!("{label}: "), Style::default().fg(palette.accent).bold()),
                Span::raw(value),
            ]));
        }
        Text::from(lines)
    } else {
        Text::from(Span::styled("Pick a document and press s.", Style::default().fg(palette.muted)))
    };
    frame.render_widget(
        Paragraph::new(text)
            .block(result_block(" Summary ", palette))
            .wrap(Wrap { trim: true })
            .scroll((page.scroll, 0)),
        result_area,
    );
}

fn render_translate(page: &mut TranslatePage, busy_frame: u8, palette: &Palette, frame: &mut Frame, area: Rect) {
    let (picker_area, controls_area, banner_area, result_area) = action_layout(area, 3);
    let chosen = page.form.document.clone();
    render_picker(
        &mut page.picker,
        "Document",
        true,
        |name| chosen.as_deref() == Some(name),
        palette,
        frame,
        picker_area,
    );

    let languages: Vec<Span> = forms::LANGUAGES
        .iter()
        .map(|lang| {
            if page.form.language.as_deref() == Some(*lang) {
                Span::styled(format!("[{lang}] "), Style::default().fg(palette.accent).bold())
            } else {
                Span::styled(format!("{lang} "), Style::default().fg(palette.muted))
            }
        })
        .collect();
    let controls = Paragraph::new(Line::from(languages)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(palette.border(false))
            .title(" Target language (l to change) "),
    );
    frame.render_widget(controls, controls_area);

    render_banner(page.error.as_deref(), page.notice.as_deref(), frame, banner_area);

    let title = match &page.result {
        Some(translation) => format!(" {} in {} ", translation.doc_name, translation.language),
        None => " Translation ".to_string(),
    };
    let text = if page.loading {
        busy_text("Translating", busy_frame, palette)
    } else if let Some(translation) = &page.result {
        Text::from(translation.text.clone())
    } else {
        Text::from(Span::styled(
            "Pick a document and a language, then press s.",
            Style::default().fg(palette.muted),
        ))
    };
    frame.render_widget(
        Paragraph::new(text)
            .block(result_block(&title, palette))
            .wrap(Wrap { trim: true })
            .scroll((page.scroll, 0)),
        result_area,
    );
}

fn render_extract(page: &mut ExtractPage, busy_frame: u8, palette: &Palette, frame: &mut Frame, area: Rect) {
    let (picker_area, _, banner_area, result_area) = action_layout(area, 0);
    let chosen = page.form.document.clone();
    render_picker(
        &mut page.picker,
        "Document",
        true,
        |name| chosen.as_deref() == Some(name),
        palette,
        frame,
        picker_area,
    );

    render_banner(page.error.as_deref(), None, frame, banner_area);

    let text = if page.loading {
        busy_text("Extracting", busy_frame, palette)
    } else if let Some(result) = &page.result {
        Text::from(result.pretty_fields())
    } else {
        Text::from(Span::styled("Pick a document and press s.", Style::default().fg(palette.muted)))
    };
    frame.render_widget(
        Paragraph::new(text)
            .block(result_block(" Extracted fields ", palette))
            .scroll((page.scroll, 0)),
        result_area,
    );
}

fn render_menu(app: &mut App, palette: &Palette, frame: &mut Frame, area: Rect) {
    let links = app.nav_links();

    // Calculate popup size and position (centered)
    let popup_width = 30.min(area.width.saturating_sub(4));
    let popup_height = (links.len() as u16 + 2).min(area.height.saturating_sub(4));

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent))
        .title(" Go to ");

    let items: Vec<ListItem> = links
        .iter()
        .enumerate()
        .map(|(i, link)| {
            let current = matches!(link, NavLink::Go(route) if *route == app.route);
            let style = if current {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(format!(" {} {} ", i + 1, link.label())).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(palette.list_highlight())
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, popup_area, &mut app.menu_state);
}

fn render_splash(animation_frame: u8, palette: &Palette, frame: &mut Frame, area: Rect) {
    frame.render_widget(Clear, area);
    let height = 3.min(area.height);
    let splash_area = Rect::new(area.x, area.y + area.height.saturating_sub(height) / 2, area.width, height);

    let dots = ".".repeat(animation_frame as usize % 3 + 1);
    let text = Text::from(vec![
        Line::from(Span::styled("MindDocs AI", Style::default().fg(palette.accent).bold())),
        Line::default(),
        Line::from(Span::styled(format!("Loading{dots}"), Style::default().fg(palette.muted))),
    ]);
    frame.render_widget(Paragraph::new(text).centered(), splash_area);
}
