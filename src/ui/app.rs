use std::mem;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use tracing::info;

use crate::controller::Controller;
use crate::error::RenameError;
use crate::export::{DownloadFolder, ExportJob, Exporter};
use crate::preview::PreviewRegistry;
use crate::source::{candidates_from_paths, parse_dropped_paths};

use super::forms::TextForm;
use super::helpers::{centered_rect, surface_error, truncate_middle};
use super::screens::FileList;

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Share of the width given to the controls panel.
const CONTROLS_PERCENT: u16 = 35;
const PAGE: isize = 5;

/// Fine-grained modes for the session screen.
enum Mode {
    Normal,
    /// Edits apply live; `previous` is restored on Esc.
    EditingBaseName {
        form: TextForm,
        previous: String,
    },
    AddingFiles(TextForm),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Advisory,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Advisory => Style::default().fg(Color::Yellow),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    controller: Controller<PreviewRegistry>,
    exporter: Exporter<DownloadFolder>,
    list: FileList,
    mode: Mode,
    status: Option<StatusMessage>,
    export: Option<ExportJob>,
}

impl App {
    pub fn new(
        controller: Controller<PreviewRegistry>,
        exporter: Exporter<DownloadFolder>,
    ) -> Self {
        Self {
            controller,
            exporter,
            list: FileList::default(),
            mode: Mode::Normal,
            status: None,
            export: None,
        }
    }

    pub fn controller(&self) -> &Controller<PreviewRegistry> {
        &self.controller
    }

    pub fn is_exporting(&self) -> bool {
        self.export.is_some()
    }

    /// Returns `true` when the app should exit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::EditingBaseName { form, previous } => {
                self.handle_edit_base_name(code, form, previous)
            }
            Mode::AddingFiles(form) => self.handle_add_files(code, form),
        };

        Ok(exit)
    }

    /// Pasted text is typed into an open form; otherwise it is treated as a
    /// drop of one or more paths.
    pub fn handle_paste(&mut self, text: &str) -> Result<()> {
        if let Mode::Normal = self.mode {
            let paths = parse_dropped_paths(text);
            if !paths.is_empty() {
                if let Err(err) = self.intake_paths(&paths) {
                    self.set_status(surface_error(&err), StatusKind::Error);
                }
            }
            return Ok(());
        }

        match &mut self.mode {
            Mode::AddingFiles(form) => form.push_str(text),
            Mode::EditingBaseName { form, .. } => {
                form.push_str(text);
                let value = form.value.clone();
                self.controller.set_base_name(value);
            }
            Mode::Normal => {}
        }
        Ok(())
    }

    /// Ctrl+C path: quit unless an archive is still being written.
    pub(crate) fn request_quit(&mut self) -> bool {
        if self.is_exporting() {
            self.set_status("Wait for the archive to finish.", StatusKind::Error);
            false
        } else {
            true
        }
    }

    /// Collect a finished export, if any.
    pub fn tick(&mut self) {
        let Some(job) = &self.export else {
            return;
        };
        let Some(result) = job.poll() else {
            return;
        };
        self.export = None;

        match result {
            Ok(outcome) => {
                let name = outcome
                    .saved_to
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let folder = outcome
                    .saved_to
                    .parent()
                    .map(|dir| dir.display().to_string())
                    .unwrap_or_default();
                self.set_status(
                    format!("Saved {name} ({} files) to {folder}.", outcome.entries),
                    StatusKind::Info,
                );
            }
            Err(err) => self.report(err),
        }
    }

    /// Seed the base name, e.g. from `--base`.
    pub fn set_base_name(&mut self, name: impl Into<String>) {
        self.controller.set_base_name(name);
    }

    /// Accept `paths` as the complete new file list. Unreadable paths are
    /// skipped; when none of them can be read the current list is kept.
    pub fn intake_paths(&mut self, paths: &[PathBuf]) -> Result<()> {
        let candidates = candidates_from_paths(paths);
        if candidates.files.is_empty() {
            if let Some(first) = candidates.skipped.first() {
                return Err(anyhow!("cannot read {}", first.display()));
            }
        }

        self.controller.intake(candidates.files);
        self.list.ensure_in_bounds(self.controller.len());
        self.clear_status();
        if !candidates.skipped.is_empty() {
            // Set directly so an intake advisory in the error slot stays visible.
            self.status = Some(StatusMessage {
                text: format!(
                    "Loaded {} photos; skipped {} unreadable path(s).",
                    self.controller.len(),
                    candidates.skipped.len()
                ),
                kind: StatusKind::Advisory,
            });
        } else if self.controller.last_error().is_none() {
            self.set_status(
                format!("Loaded {} photos.", self.controller.len()),
                StatusKind::Info,
            );
        }
        Ok(())
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        let len = self.controller.len();
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                *exit = self.request_quit();
            }
            KeyCode::Up => self.list.move_selection(-1, len),
            KeyCode::Down => self.list.move_selection(1, len),
            KeyCode::PageUp => self.list.move_selection(-PAGE, len),
            KeyCode::PageDown => self.list.move_selection(PAGE, len),
            KeyCode::Home => self.list.select_first(),
            KeyCode::End => self.list.select_last(len),
            KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Char('+') => {
                return Ok(Mode::AddingFiles(TextForm::default()));
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                if self.controller.is_empty() {
                    self.set_status("Add photos before choosing a base name.", StatusKind::Error);
                } else {
                    let previous = self.controller.base_name().to_string();
                    return Ok(Mode::EditingBaseName {
                        form: TextForm::with_value(previous.clone()),
                        previous,
                    });
                }
            }
            KeyCode::Char('-') | KeyCode::Delete => self.remove_selected(),
            KeyCode::Enter | KeyCode::Char('o') | KeyCode::Char('O') => self.open_selected(),
            KeyCode::Char('d') | KeyCode::Char('D') => self.start_export(),
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_edit_base_name(
        &mut self,
        code: KeyCode,
        mut form: TextForm,
        previous: String,
    ) -> Mode {
        match code {
            KeyCode::Esc => {
                self.controller.set_base_name(previous);
                self.set_status("Base name unchanged.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Enter => {
                if self.controller.base_name().trim().is_empty() {
                    self.set_status("Base name cleared; original names kept.", StatusKind::Info);
                } else {
                    self.set_status(
                        format!("Files will be named {}.", self.controller.name_pattern_hint()),
                        StatusKind::Info,
                    );
                }
                return Mode::Normal;
            }
            KeyCode::Backspace => {
                form.backspace();
                self.controller.set_base_name(form.value.clone());
            }
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    self.controller.set_base_name(form.value.clone());
                }
            }
            _ => {}
        }
        Mode::EditingBaseName { form, previous }
    }

    fn handle_add_files(&mut self, code: KeyCode, mut form: TextForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Add files cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => {
                let paths = parse_dropped_paths(&form.value);
                if paths.is_empty() {
                    form.error = Some("Enter a file or folder path.".to_string());
                    return Mode::AddingFiles(form);
                }
                match self.intake_paths(&paths) {
                    Ok(()) => return Mode::Normal,
                    Err(err) => {
                        let message = surface_error(&err);
                        form.error = Some(message.clone());
                        self.set_status(message, StatusKind::Error);
                    }
                }
            }
            KeyCode::Char(ch) => {
                form.push_char(ch);
            }
            _ => {}
        }
        Mode::AddingFiles(form)
    }

    fn remove_selected(&mut self) {
        let Some(projection) = self.controller.projections().get(self.list.selected) else {
            self.set_status("No photo selected to remove.", StatusKind::Error);
            return;
        };
        let id = projection.id.clone();
        let name = projection.original_name.clone();

        self.controller.remove(&id);
        self.list.ensure_in_bounds(self.controller.len());
        self.set_status(format!("Removed {name}."), StatusKind::Info);
    }

    fn open_selected(&mut self) {
        let Some(projection) = self.controller.projections().get(self.list.selected) else {
            return;
        };
        let name = projection.original_name.clone();
        match self.controller.previews().open(projection.preview) {
            Ok(()) => self.set_status(format!("Opened {name}."), StatusKind::Info),
            Err(err) => self.set_status(
                format!("Failed to open preview: {}", surface_error(&err)),
                StatusKind::Error,
            ),
        }
    }

    fn start_export(&mut self) {
        if self.is_exporting() {
            return;
        }
        self.controller.clear_error();
        self.clear_status();

        match self
            .exporter
            .export(self.controller.projections(), self.controller.base_name())
        {
            Ok(job) => {
                info!(archive = job.archive_name(), "export requested");
                self.set_status(format!("Creating {}...", job.archive_name()), StatusKind::Info);
                self.export = Some(job);
            }
            Err(err) => self.report(err),
        }
    }

    fn report(&mut self, err: RenameError) {
        self.clear_status();
        self.controller.report(err);
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.controller.clear_error();
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(CONTROLS_PERCENT),
                Constraint::Percentage(100 - CONTROLS_PERCENT),
            ])
            .split(content_area);

        self.draw_controls(frame, columns[0]);
        self.draw_preview_list(frame, columns[1]);

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::EditingBaseName { form, .. } => self.draw_form(
                frame,
                area,
                "Base Name",
                "Name",
                "e.g. Vic",
                form,
                &format!("Files will be named: {}", self.controller.name_pattern_hint()),
            ),
            Mode::AddingFiles(form) => self.draw_form(
                frame,
                area,
                "Add Photos",
                "Path",
                "file or folder, replaces the current list",
                form,
                "Quote paths that contain spaces",
            ),
            Mode::Normal => {}
        }
    }

    fn draw_controls(&self, frame: &mut Frame, area: Rect) {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let label_style = Style::default().add_modifier(Modifier::BOLD);
        let dim = Style::default().fg(Color::DarkGray);

        let count = self.controller.len();
        let base = self.controller.base_name();
        let ready = count > 0 && !base.trim().is_empty();

        let base_span = if base.is_empty() {
            Span::styled("<not set>", dim)
        } else {
            Span::styled(base.to_string(), Style::default().fg(Color::Yellow))
        };

        let mut download_spans = vec![Span::raw("   ")];
        if self.is_exporting() {
            download_spans.push(Span::styled(
                "Creating archive...",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ));
        } else if ready {
            download_spans.push(Span::styled("[d]", key_style));
            download_spans.push(Span::raw(format!(" Download .zip ({count})")));
        } else {
            download_spans.push(Span::styled(format!("[d] Download .zip ({count})"), dim));
        }

        let lines = vec![
            Line::from(Span::styled("1. Photos", label_style)),
            Line::from(vec![
                Span::raw(format!("   {count}/{} selected  ", self.controller.max_files())),
                Span::styled("[a]", key_style),
                Span::raw(" add"),
            ]),
            Line::from(""),
            Line::from(Span::styled("2. Base name", label_style)),
            Line::from(vec![Span::raw("   "), base_span]),
            Line::from(Span::styled(
                format!("   Files will be named: {}", self.controller.name_pattern_hint()),
                dim,
            )),
            Line::from(""),
            Line::from(Span::styled("3. Download", label_style)),
            Line::from(download_spans),
            Line::from(Span::styled(
                format!("   Saves to {}", self.exporter.target().dir().display()),
                dim,
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Controls"))
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }

    fn draw_preview_list(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Preview");
        let projections = self.controller.projections();

        if projections.is_empty() {
            let message = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "No photos selected for renaming.",
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from("Press 'a' to add files, or drop them onto this terminal."),
            ])
            .alignment(Alignment::Center)
            .block(block);
            frame.render_widget(message, area);
            return;
        }

        let inner_width = block.inner(area).width as usize;
        let name_width = inner_width.saturating_sub(8) / 2;
        let items: Vec<ListItem> = projections
            .iter()
            .enumerate()
            .map(|(idx, projection)| {
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{:>2}. ", idx + 1), Style::default().fg(Color::DarkGray)),
                    Span::styled(
                        truncate_middle(&projection.original_name, name_width),
                        Style::default().fg(Color::Gray),
                    ),
                    Span::raw(" -> "),
                    Span::styled(
                        truncate_middle(&projection.new_name, name_width),
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    ),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(Color::DarkGray))
            .highlight_symbol("> ");
        let mut state = ListState::default().with_selected(Some(self.list.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(err) = self.controller.last_error() {
            let kind = if err.is_advisory() {
                StatusKind::Advisory
            } else {
                StatusKind::Error
            };
            Line::from(vec![Span::styled(err.to_string(), kind.style())])
        } else if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        match &self.mode {
            Mode::EditingBaseName { .. } => Line::from(vec![
                Span::styled("[Enter]", key_style),
                Span::raw(" Done   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Revert"),
            ]),
            Mode::AddingFiles(_) => Line::from(vec![
                Span::styled("[Enter]", key_style),
                Span::raw(" Load   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Cancel"),
            ]),
            Mode::Normal => Line::from(vec![
                Span::styled("[a]", key_style),
                Span::raw(" Add   "),
                Span::styled("[n]", key_style),
                Span::raw(" Base Name   "),
                Span::styled("[-]", key_style),
                Span::raw(" Remove   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Preview   "),
                Span::styled("[d]", key_style),
                Span::raw(" Download   "),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_form(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        label: &str,
        placeholder: &str,
        form: &TextForm,
        hint: &str,
    ) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![form.build_line(label, placeholder), Line::from("")];
        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                hint.to_string(),
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let offset = format!("{label}: ").chars().count() + form.value_len();
        let offset = u16::try_from(offset)
            .unwrap_or(u16::MAX)
            .min(inner.width.saturating_sub(1));
        frame.set_cursor_position((inner.x.saturating_add(offset), inner.y));
    }
}
