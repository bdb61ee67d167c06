use std::time::{Duration, Instant};

use client_core::{ListView, Notice, NoticeLevel, TodoList};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use tokio::runtime::Handle;
use tracing::info;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::{UiError, UiErrorCategory, UiErrorContext, UiEvent},
    orchestration::dispatch_backend_command,
};
use crate::ui::notices::NoticeBoard;

const PAGE_TITLE: &str = "To-Do List";
const PAGE_MAX_WIDTH: f32 = 600.0;

#[derive(Debug, Clone)]
pub struct StartupConfig {
    /// Shown in the footer: the server URL, or a note that data is local.
    pub source_label: String,
}

/// What the user did this frame; applied after the panels are drawn.
enum PageAction {
    OpenPrompt,
    SubmitPrompt,
    CancelPrompt,
    Command(BackendCommand),
}

pub struct TodoApp {
    list: TodoList,
    runtime: Handle,
    ui_tx: Sender<UiEvent>,
    ui_rx: Receiver<UiEvent>,
    config: StartupConfig,

    // `Some` while the "New Todo" prompt is open.
    prompt: Option<String>,
    prompt_needs_focus: bool,
    notices: NoticeBoard,
    last_error: Option<UiError>,
}

impl TodoApp {
    pub fn new(
        ctx: &egui::Context,
        list: TodoList,
        runtime: Handle,
        ui_tx: Sender<UiEvent>,
        ui_rx: Receiver<UiEvent>,
        config: StartupConfig,
    ) -> Self {
        let repaint_ctx = ctx.clone();
        let error_tx = ui_tx.clone();
        let error_ctx = ctx.clone();
        let mut list = list
            .with_change_hook(move || repaint_ctx.request_repaint())
            .with_error_hook(move |err| {
                let _ = error_tx.try_send(UiEvent::LiveQueryError(UiError::from_message(
                    UiErrorContext::LiveQuery,
                    err.to_string(),
                )));
                error_ctx.request_repaint();
            });
        list.mount();

        Self {
            list,
            runtime,
            ui_tx,
            ui_rx,
            config,
            prompt: None,
            prompt_needs_focus: false,
            notices: NoticeBoard::default(),
            last_error: None,
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::CommandFinished { kind, outcome } => match outcome {
                    Ok(()) => {
                        tracing::debug!(command = kind.as_str(), "command acknowledged");
                        let context = UiErrorContext::from(kind);
                        if self
                            .last_error
                            .as_ref()
                            .is_some_and(|err| err.context() == context)
                        {
                            self.last_error = None;
                        }
                    }
                    Err(failure) => {
                        let err = UiError::from_message(kind.into(), failure.to_string());
                        self.notices
                            .push(Notice::error(err.summary()), Instant::now());
                        self.last_error = Some(err);
                    }
                },
                UiEvent::LiveQueryError(err) => {
                    self.last_error = Some(err);
                }
            }
        }
    }

    fn apply(&mut self, action: PageAction) {
        match action {
            PageAction::OpenPrompt => {
                self.prompt = Some(String::new());
                self.prompt_needs_focus = true;
            }
            PageAction::CancelPrompt => {
                self.prompt = None;
                self.run_command(BackendCommand::Create { content: None });
            }
            PageAction::SubmitPrompt => {
                let content = self.prompt.take();
                self.run_command(BackendCommand::Create { content });
            }
            PageAction::Command(cmd) => self.run_command(cmd),
        }
    }

    fn run_command(&mut self, cmd: BackendCommand) {
        if let Some(notice) = dispatch_backend_command(&self.list, &self.runtime, &self.ui_tx, cmd)
        {
            self.notices.push(notice, Instant::now());
        }
    }

    fn show_page(&mut self, ctx: &egui::Context, actions: &mut Vec<PageAction>) {
        let view = self.list.view();
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.set_max_width(PAGE_MAX_WIDTH);
                ui.add_space(24.0);
                ui.heading(egui::RichText::new(PAGE_TITLE).size(32.0).strong());
                ui.add_space(12.0);

                ui.with_layout(egui::Layout::top_down(egui::Align::Min), |ui| {
                    if ui.button("+ New Todo").clicked() {
                        actions.push(PageAction::OpenPrompt);
                    }
                    ui.add_space(20.0);

                    egui::Frame::group(ui.style()).show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        match &view {
                            ListView::Empty { message } => {
                                ui.add_space(12.0);
                                ui.vertical_centered(|ui| ui.weak(*message));
                                ui.add_space(12.0);
                            }
                            ListView::Rows(rows) => {
                                egui::ScrollArea::vertical().show(ui, |ui| {
                                    for (index, row) in rows.iter().enumerate() {
                                        if index > 0 {
                                            ui.separator();
                                        }
                                        ui.horizontal(|ui| {
                                            ui.label(row.content.as_str());
                                            ui.with_layout(
                                                egui::Layout::right_to_left(egui::Align::Center),
                                                |ui| {
                                                    let delete = egui::Button::new(
                                                        egui::RichText::new("Delete")
                                                            .color(egui::Color32::WHITE),
                                                    )
                                                    .fill(egui::Color32::from_rgb(0xff, 0x4d, 0x4f))
                                                    .small();
                                                    if ui.add(delete).clicked() {
                                                        actions.push(PageAction::Command(
                                                            BackendCommand::Delete { id: row.id },
                                                        ));
                                                    }
                                                },
                                            );
                                        });
                                    }
                                });
                            }
                        }
                    });
                });
            });
        });
    }

    fn show_prompt(&mut self, ctx: &egui::Context, actions: &mut Vec<PageAction>) {
        let Some(draft) = self.prompt.as_mut() else {
            return;
        };
        let needs_focus = std::mem::take(&mut self.prompt_needs_focus);
        egui::Window::new("New Todo")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label("Enter new Todo content:");
                let response = ui.text_edit_singleline(draft);
                if needs_focus {
                    response.request_focus();
                }
                let submitted =
                    response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                let cancelled = ui.input(|i| i.key_pressed(egui::Key::Escape));
                ui.horizontal(|ui| {
                    if ui.button("OK").clicked() || submitted {
                        actions.push(PageAction::SubmitPrompt);
                    } else if ui.button("Cancel").clicked() || cancelled {
                        actions.push(PageAction::CancelPrompt);
                    }
                });
            });
    }

    fn show_footer(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            for notice in self.notices.visible(now) {
                let color = match notice.level {
                    NoticeLevel::Success => egui::Color32::from_rgb(0x52, 0xc4, 0x1a),
                    NoticeLevel::Info => egui::Color32::from_rgb(0x16, 0x77, 0xff),
                    NoticeLevel::Error => egui::Color32::from_rgb(0xff, 0x4d, 0x4f),
                };
                ui.colored_label(color, notice.text.as_str());
            }
            if let Some(err) = &self.last_error {
                let color = match err.category() {
                    UiErrorCategory::Transport => egui::Color32::from_rgb(0xfa, 0xad, 0x14),
                    _ => egui::Color32::from_rgb(0xff, 0x4d, 0x4f),
                };
                ui.colored_label(color, egui::RichText::new(err.summary()).small())
                    .on_hover_text(err.message());
            }
            ui.separator();
            ui.horizontal(|ui| {
                ui.small(format!(
                    "{} items · live updates from {}",
                    self.list.store().len(),
                    self.config.source_label
                ));
            });
        });
    }
}

impl eframe::App for TodoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        let mut actions = Vec::new();
        self.show_footer(ctx);
        self.show_page(ctx, &mut actions);
        self.show_prompt(ctx, &mut actions);
        for action in actions {
            self.apply(action);
        }

        // Notices expire on a timer, so keep frames coming while any are shown.
        if !self.notices.is_empty() {
            ctx.request_repaint_after(Duration::from_millis(250));
        }
    }
}

impl Drop for TodoApp {
    fn drop(&mut self) {
        if self.list.unmount() {
            info!("todo page closed; live query released");
        }
    }
}
