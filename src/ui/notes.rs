//! Left panel with scratch notes and the document source

use eframe::egui;

use crate::app::{SideTab, WriterApp};

/// Notes and read-only source view
pub struct NotesPanel;

impl NotesPanel {
    /// Show the notes panel
    pub fn show(ui: &mut egui::Ui, app: &mut WriterApp) {
        ui.horizontal(|ui| {
            ui.selectable_value(&mut app.side_tab, SideTab::Notes, "Notes");
            ui.selectable_value(&mut app.side_tab, SideTab::Source, "Source");
        });
        ui.separator();

        egui::ScrollArea::vertical()
            .id_salt("notes_scroll")
            .show(ui, |ui| match app.side_tab {
                SideTab::Notes => {
                    ui.add(
                        egui::TextEdit::multiline(&mut app.notes)
                            .hint_text("Jot down ideas, sources, and outlines...")
                            .desired_width(f32::INFINITY)
                            .desired_rows(20),
                    );
                }
                SideTab::Source => {
                    let mut source = app.editor.plain_text();
                    ui.add(
                        egui::TextEdit::multiline(&mut source)
                            .interactive(false)
                            .desired_width(f32::INFINITY),
                    );
                }
            });
    }
}
