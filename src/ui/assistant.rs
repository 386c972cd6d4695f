//! AI assistant chat panel

use eframe::egui;

use crate::app::WriterApp;
use crate::assistant::ChatRole;

/// Chat with the writing assistant
pub struct AssistantPanel;

impl AssistantPanel {
    /// Show the assistant panel
    pub fn show(ui: &mut egui::Ui, app: &mut WriterApp) {
        ui.horizontal(|ui| {
            ui.heading("AI Assistant");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .add_enabled(!app.chat.messages().is_empty(), egui::Button::new("Clear"))
                    .clicked()
                {
                    app.chat.clear();
                }
            });
        });
        ui.separator();

        egui::TopBottomPanel::bottom("assistant_input")
            .frame(egui::Frame::NONE)
            .show_inside(ui, |ui| {
                Self::show_input(ui, app);
            });

        egui::ScrollArea::vertical()
            .id_salt("assistant_scroll")
            .stick_to_bottom(true)
            .show(ui, |ui| {
                Self::show_messages(ui, app);
            });
    }

    fn show_messages(ui: &mut egui::Ui, app: &mut WriterApp) {
        if app.chat.messages().is_empty() {
            ui.weak("Select text and press Ask AI, or type a question below.");
        }

        let mut insert = None;
        for (index, message) in app.chat.messages().iter().enumerate() {
            let (who, color) = match message.role {
                ChatRole::User => ("You", ui.visuals().weak_text_color()),
                ChatRole::Assistant => ("Assistant", ui.visuals().hyperlink_color),
            };
            egui::Frame::group(ui.style()).show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.colored_label(color, who);
                ui.label(&message.content);
                if message.role == ChatRole::Assistant
                    && ui
                        .small_button("Insert")
                        .on_hover_text("Insert this reply at the caret")
                        .clicked()
                {
                    insert = Some(index);
                }
            });
        }

        if app.chat.is_pending() {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.weak("Thinking...");
            });
        }

        if let Some(index) = insert {
            let text = app.chat.messages()[index].content.clone();
            app.editor.insert_text(&text);
        }
    }

    fn show_input(ui: &mut egui::Ui, app: &mut WriterApp) {
        ui.add_space(4.0);
        let response = ui.add(
            egui::TextEdit::multiline(&mut app.chat.input)
                .hint_text("Ask about your document...")
                .desired_width(f32::INFINITY)
                .desired_rows(3),
        );
        let submitted = response.has_focus()
            && ui.input(|i| i.key_pressed(egui::Key::Enter) && i.modifiers.command);

        ui.horizontal(|ui| {
            let can_send = !app.chat.is_pending() && !app.chat.input.trim().is_empty();
            if ui.add_enabled(can_send, egui::Button::new("Send")).clicked() || submitted {
                app.send_chat();
            }
        });
        ui.add_space(4.0);
    }
}
