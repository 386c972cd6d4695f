//! Main application state and UI coordination

use std::future::Future;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use eframe::egui;
use tokio::runtime::Handle;

use crate::assistant::{
    AssistantClient, ChatSession, FunctionClient, ReplyFinished, UnconfiguredAssistant,
};
use crate::core::config::{AppConfig, StoreConfig};
use crate::core::document::DocumentId;
use crate::core::editor::{
    CreateFinished, EditorController, EditorState, Followup, ListFinished, LoadFinished,
    SaveFinished,
};
use crate::core::surface::MarkupSurface;
use crate::store;
use crate::ui::{
    assistant::AssistantPanel, editor::EditorPanel, notes::NotesPanel,
    notifications::Toasts, toolbar::Toolbar,
};

/// Tab shown in the left panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SideTab {
    #[default]
    Notes,
    Source,
}

/// Outcome of a background request, delivered to the UI thread
#[derive(Debug)]
pub enum TaskResult {
    Created(CreateFinished),
    Loaded(LoadFinished),
    Saved(SaveFinished),
    Listed(ListFinished),
    Reply(ReplyFinished),
}

/// Main application state
pub struct WriterApp {
    /// Document editor
    pub editor: EditorController,
    /// Application configuration
    pub config: AppConfig,
    /// AI assistant conversation
    pub chat: ChatSession,
    /// Scratch notes beside the document
    pub notes: String,
    /// Active left panel tab
    pub side_tab: SideTab,
    /// Whether the notes panel is visible
    pub notes_visible: bool,
    /// Whether the assistant panel is visible
    pub assistant_visible: bool,
    /// On-screen notifications
    pub toasts: Toasts,
    assistant: Arc<dyn AssistantClient>,
    runtime: Handle,
    ctx: egui::Context,
    results_tx: Sender<TaskResult>,
    results_rx: Receiver<TaskResult>,
}

impl WriterApp {
    /// Create a new application instance
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig, runtime: Handle) -> Self {
        Self::configure_style(&cc.egui_ctx, &config);

        let editor = EditorController::new(
            store::connect(&config.store),
            config.owner_id.as_str(),
            MarkupSurface::new(),
            &config.editor,
        );
        let assistant: Arc<dyn AssistantClient> = match FunctionClient::from_config(&config.assistant) {
            Some(client) => Arc::new(client),
            None => {
                tracing::info!("No assistant function configured");
                Arc::new(UnconfiguredAssistant)
            }
        };
        let (results_tx, results_rx) = mpsc::channel();

        let mut app = Self {
            editor,
            chat: ChatSession::new(),
            notes: String::new(),
            side_tab: SideTab::default(),
            notes_visible: true,
            assistant_visible: true,
            toasts: Toasts::new(config.ui.notification_secs),
            config,
            assistant,
            runtime,
            ctx: cc.egui_ctx.clone(),
            results_tx,
            results_rx,
        };
        app.refresh_documents();
        app
    }

    fn configure_style(ctx: &egui::Context, config: &AppConfig) {
        if config.ui.theme == "light" {
            ctx.set_visuals(egui::Visuals::light());
        } else {
            ctx.set_visuals(egui::Visuals::dark());
        }
    }

    /// Run a request on the runtime and deliver its result to the next frame
    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = TaskResult> + Send + 'static,
    {
        let tx = self.results_tx.clone();
        let ctx = self.ctx.clone();
        self.runtime.spawn(async move {
            let result = task.await;
            // The receiver only goes away on shutdown
            let _ = tx.send(result);
            ctx.request_repaint();
        });
    }

    /// Start a new document
    pub fn new_document(&mut self) {
        let pending = self.editor.begin_create();
        self.spawn(async move { TaskResult::Created(pending.run().await) });
    }

    /// Open a document from the store
    pub fn open_document(&mut self, id: DocumentId) {
        let pending = self.editor.begin_load(id);
        self.spawn(async move { TaskResult::Loaded(pending.run().await) });
    }

    /// Save the open document
    pub fn save(&mut self) {
        if let Ok(pending) = self.editor.begin_save() {
            self.spawn(async move { TaskResult::Saved(pending.run().await) });
        }
    }

    /// Reload the document list
    pub fn refresh_documents(&mut self) {
        let pending = self.editor.begin_list();
        self.spawn(async move { TaskResult::Listed(pending.run().await) });
    }

    /// Seed the assistant input with the current selection
    pub fn ask_ai(&mut self) {
        let context = self.editor.compute_ai_context();
        let notification = self.chat.ask_about(&context);
        self.assistant_visible = true;
        self.toasts.push(notification);
    }

    /// Send the assistant input
    pub fn send_chat(&mut self) {
        let document_text = self.editor.plain_text();
        if let Some(pending) = self.chat.begin_send(&document_text, Arc::clone(&self.assistant)) {
            self.spawn(async move { TaskResult::Reply(pending.run().await) });
        }
    }

    /// Switch to a local folder of documents
    pub fn open_folder(&mut self, path: PathBuf) {
        self.config.store = StoreConfig::Local {
            dir: Some(path.clone()),
        };
        self.editor.switch_store(store::connect(&self.config.store));
        self.config.add_recent_folder(path);
        if let Err(e) = self.config.save() {
            tracing::warn!("Failed to save config: {:#}", e);
        }
        self.refresh_documents();
    }

    /// Apply results that arrived since the last frame
    fn process_results(&mut self) {
        while let Ok(result) = self.results_rx.try_recv() {
            match result {
                TaskResult::Created(done) => {
                    self.editor.finish_create(done);
                    // A failed create must not trigger another create via the list
                    if self.editor.state() != EditorState::Empty {
                        self.refresh_documents();
                    }
                }
                TaskResult::Loaded(done) => self.editor.finish_load(done),
                TaskResult::Saved(done) => {
                    self.editor.finish_save(done);
                    self.refresh_documents();
                }
                TaskResult::Listed(done) => match self.editor.finish_list(done) {
                    Some(Followup::Load(id)) => self.open_document(id),
                    Some(Followup::Create) => self.new_document(),
                    None => {}
                },
                TaskResult::Reply(done) => {
                    if let Some(notification) = self.chat.finish_send(done) {
                        self.toasts.push(notification);
                    }
                }
            }
        }

        for notification in self.editor.take_notifications() {
            self.toasts.push(notification);
        }
    }

    /// Keyboard shortcuts, consumed before the text editor sees them
    ///
    /// Undo/redo are left alone while another text field has focus so that
    /// field keeps its own undo.
    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        use egui::{Key, Modifiers};

        let history_keys = owns_history_keys(ctx.memory(|m| m.focused()), EditorPanel::id());
        let (save, redo, undo, new) = ctx.input_mut(|i| {
            let save = i.consume_key(Modifiers::COMMAND, Key::S);
            let (redo, undo) = if history_keys {
                // Shift+Z has to be checked before plain Z
                let redo = i.consume_key(Modifiers::COMMAND | Modifiers::SHIFT, Key::Z)
                    || i.consume_key(Modifiers::COMMAND, Key::Y);
                (redo, i.consume_key(Modifiers::COMMAND, Key::Z))
            } else {
                (false, false)
            };
            let new = i.consume_key(Modifiers::COMMAND, Key::N);
            (save, redo, undo, new)
        });

        if save {
            self.save();
        }
        if redo {
            self.editor.redo();
        }
        if undo {
            self.editor.undo();
        }
        if new {
            self.new_document();
        }
    }

    /// Render the top menu bar
    fn render_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("New Document").clicked() {
                        self.new_document();
                        ui.close();
                    }
                    if ui.button("Open Folder...").clicked() {
                        if let Some(path) = rfd::FileDialog::new().pick_folder() {
                            self.open_folder(path);
                        }
                        ui.close();
                    }
                    if !self.config.recent_folders.is_empty() {
                        ui.menu_button("Recent Folders", |ui| {
                            let mut picked = None;
                            for folder in &self.config.recent_folders {
                                if ui.button(folder.display().to_string()).clicked() {
                                    picked = Some(folder.clone());
                                }
                            }
                            if let Some(folder) = picked {
                                self.open_folder(folder);
                                ui.close();
                            }
                        });
                    }
                    if ui.button("Save").clicked() {
                        self.save();
                        ui.close();
                    }
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Edit", |ui| {
                    if ui
                        .add_enabled(self.editor.history().can_undo(), egui::Button::new("Undo"))
                        .clicked()
                    {
                        self.editor.undo();
                        ui.close();
                    }
                    if ui
                        .add_enabled(self.editor.history().can_redo(), egui::Button::new("Redo"))
                        .clicked()
                    {
                        self.editor.redo();
                        ui.close();
                    }
                });

                ui.menu_button("View", |ui| {
                    if ui.button("Toggle Notes").clicked() {
                        self.notes_visible = !self.notes_visible;
                        ui.close();
                    }
                    if ui.button("Toggle Assistant").clicked() {
                        self.assistant_visible = !self.assistant_visible;
                        ui.close();
                    }
                });

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.weak(self.editor.store_description());
                    let history = self.editor.history();
                    ui.weak(format!("History {}/{}", history.cursor() + 1, history.len()))
                        .on_hover_text(format!("Keeps up to {} snapshots", history.limit()));
                });
            });
        });
    }
}

impl eframe::App for WriterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_results();
        self.handle_shortcuts(ctx);

        self.render_menu_bar(ctx);

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            Toolbar::show(ui, self);
        });

        if self.notes_visible {
            egui::SidePanel::left("notes_panel")
                .resizable(true)
                .default_width(self.config.ui.notes_width)
                .min_width(150.0)
                .show(ctx, |ui| {
                    NotesPanel::show(ui, self);
                });
        }

        if self.assistant_visible {
            egui::SidePanel::right("assistant_panel")
                .resizable(true)
                .default_width(self.config.ui.assistant_width)
                .min_width(200.0)
                .show(ctx, |ui| {
                    AssistantPanel::show(ui, self);
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            EditorPanel::show(ui, self);
        });

        self.toasts.show(ctx);

        if matches!(self.editor.state(), EditorState::Loading | EditorState::Saving)
            || self.chat.is_pending()
        {
            ctx.request_repaint_after(std::time::Duration::from_millis(250));
        }
    }
}

/// Whether document undo/redo shortcuts apply with `focused` holding focus
fn owns_history_keys(focused: Option<egui::Id>, editor: egui::Id) -> bool {
    focused.map_or(true, |id| id == editor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_keys_follow_focus() {
        let editor = egui::Id::new("document_editor");
        assert!(owns_history_keys(None, editor));
        assert!(owns_history_keys(Some(editor), editor));
        assert!(!owns_history_keys(Some(egui::Id::new("title")), editor));
        assert!(!owns_history_keys(Some(egui::Id::new("assistant_input")), editor));
    }

    #[test]
    fn test_editor_id_is_stable() {
        assert_eq!(EditorPanel::id(), EditorPanel::id());
        assert!(owns_history_keys(Some(EditorPanel::id()), EditorPanel::id()));
    }
}
