//! Formatting toolbar above the editor

use eframe::egui;

use crate::app::WriterApp;
use crate::core::command::{BlockKind, ToolbarCommand};
use crate::core::editor::EditorState;

/// Document controls and formatting buttons
pub struct Toolbar;

impl Toolbar {
    /// Show the toolbar
    pub fn show(ui: &mut egui::Ui, app: &mut WriterApp) {
        let has_document = app.editor.document().is_some();

        ui.horizontal_wrapped(|ui| {
            if ui
                .button("New")
                .on_hover_text("Create a new document (Ctrl+N)")
                .clicked()
            {
                app.new_document();
            }

            Self::show_picker(ui, app);
            Self::show_title(ui, app);

            ui.separator();

            if ui
                .add_enabled(app.editor.history().can_undo(), egui::Button::new("Undo"))
                .on_hover_text("Undo (Ctrl+Z)")
                .clicked()
            {
                app.editor.undo();
            }
            if ui
                .add_enabled(app.editor.history().can_redo(), egui::Button::new("Redo"))
                .on_hover_text("Redo (Ctrl+Y)")
                .clicked()
            {
                app.editor.redo();
            }

            ui.separator();

            if ui
                .add_enabled(has_document, egui::Button::new("Ask AI"))
                .on_hover_text("Ask the assistant about the selected text")
                .clicked()
            {
                app.ask_ai();
            }
            if ui
                .add_enabled(has_document, egui::Button::new("Cite"))
                .on_hover_text("Insert a citation placeholder at the caret")
                .clicked()
            {
                app.editor.insert_citation_placeholder();
            }

            ui.separator();

            ui.add_enabled_ui(has_document, |ui| {
                ui.menu_button("Format", |ui| {
                    for kind in BlockKind::ALL {
                        if ui.button(kind.label()).clicked() {
                            app.editor
                                .run_toolbar_command(ToolbarCommand::BlockFormat(kind));
                            ui.close();
                        }
                    }
                });

                for command in ToolbarCommand::BUTTONS {
                    let mut text = egui::RichText::new(command.label());
                    text = match command {
                        ToolbarCommand::Bold => text.strong(),
                        ToolbarCommand::Italic => text.italics(),
                        ToolbarCommand::Underline => text.underline(),
                        _ => text,
                    };
                    if ui
                        .button(text)
                        .on_hover_text(command.description())
                        .clicked()
                    {
                        app.editor.run_toolbar_command(command);
                    }
                }
            });

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                match app.editor.state() {
                    EditorState::Saving => {
                        ui.add_enabled(false, egui::Button::new("Saving..."));
                        ui.spinner();
                    }
                    _ => {
                        if ui
                            .add_enabled(has_document, egui::Button::new("Save"))
                            .on_hover_text("Save (Ctrl+S)")
                            .clicked()
                        {
                            app.save();
                        }
                    }
                }
                ui.label(format!("{} words", app.editor.word_count()));
            });
        });
    }

    /// Document picker
    fn show_picker(ui: &mut egui::Ui, app: &mut WriterApp) {
        let current = app.editor.document().and_then(|doc| doc.id.clone());
        let selected_text = match app.editor.state() {
            EditorState::Loading => "Loading...".to_string(),
            _ => app
                .editor
                .document()
                .map(|doc| doc.display_title().to_string())
                .unwrap_or_else(|| "Select a document".to_string()),
        };

        let mut picked = None;
        egui::ComboBox::from_id_salt("document_picker")
            .selected_text(selected_text)
            .width(180.0)
            .show_ui(ui, |ui| {
                if app.editor.documents().is_empty() {
                    ui.weak("No documents yet");
                }
                for summary in app.editor.documents() {
                    let title = if summary.title.trim().is_empty() {
                        "Untitled Document"
                    } else {
                        summary.title.as_str()
                    };
                    let is_current = current.as_ref() == Some(&summary.id);
                    let mut response = ui.selectable_label(is_current, title);
                    if let Some(updated) = summary.updated_at {
                        response = response.on_hover_text(format!(
                            "Updated {}",
                            updated.format("%Y-%m-%d %H:%M")
                        ));
                    }
                    if response.clicked() && !is_current {
                        picked = Some(summary.id.clone());
                    }
                }
            });

        if let Some(id) = picked {
            app.open_document(id);
        }
    }

    /// Editable title of the open document
    fn show_title(ui: &mut egui::Ui, app: &mut WriterApp) {
        let Some(document) = app.editor.document() else {
            return;
        };
        let mut title = document.title.clone();
        let response = ui.add(
            egui::TextEdit::singleline(&mut title)
                .hint_text("Untitled Document")
                .desired_width(200.0),
        );
        if response.changed() {
            app.editor.set_title(title);
        }
    }
}
