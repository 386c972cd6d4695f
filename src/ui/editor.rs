//! Document editor panel

use eframe::egui;

use crate::app::WriterApp;
use crate::core::editor::EditorState;

/// Markup editor for the open document
pub struct EditorPanel;

impl EditorPanel {
    /// Widget id of the document text field
    pub fn id() -> egui::Id {
        egui::Id::new("document_editor")
    }

    /// Show the editor panel
    pub fn show(ui: &mut egui::Ui, app: &mut WriterApp) {
        match app.editor.state() {
            EditorState::Empty => Self::show_welcome(ui, app),
            EditorState::Loading if app.editor.document().is_none() => {
                ui.centered_and_justified(|ui| {
                    ui.spinner();
                });
            }
            _ => Self::show_editor(ui, app),
        }
    }

    fn show_editor(ui: &mut egui::Ui, app: &mut WriterApp) {
        let font_size = app.config.editor.font_size;

        egui::ScrollArea::vertical()
            .id_salt("editor_scroll")
            .show(ui, |ui| {
                let output = egui::TextEdit::multiline(app.editor.surface_mut().markup_mut())
                    .id(Self::id())
                    .code_editor()
                    .font(egui::FontId::monospace(font_size))
                    .desired_width(f32::INFINITY)
                    .desired_rows(30)
                    .hint_text("Start writing...")
                    .show(ui);

                if output.response.changed() {
                    let content = app.editor.surface().markup().to_string();
                    app.editor.apply_edit(content);
                }

                if let Some(range) = output.cursor_range {
                    let (a, b) = (range.primary.index, range.secondary.index);
                    app.editor
                        .surface_mut()
                        .set_selection_chars(a.min(b), a.max(b));
                }
            });
    }

    /// Show welcome screen when no document is open
    fn show_welcome(ui: &mut egui::Ui, app: &mut WriterApp) {
        ui.vertical_centered(|ui| {
            ui.add_space(100.0);

            ui.heading("Welcome to AIRA Writer");
            ui.add_space(20.0);

            ui.label("Create a new document or pick one from the list to get started.");
            ui.add_space(10.0);

            if ui.button("New Document").clicked() {
                app.new_document();
            }
            ui.add_space(20.0);

            ui.label("Keyboard shortcuts:");
            ui.label("  Ctrl+N - New document");
            ui.label("  Ctrl+S - Save");
            ui.label("  Ctrl+Z - Undo");
            ui.label("  Ctrl+Y / Ctrl+Shift+Z - Redo");
        });
    }
}
