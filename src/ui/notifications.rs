//! Transient toast notifications

use eframe::egui;

use crate::core::notification::{Notification, NotificationLevel};

struct Toast {
    notification: Notification,
    /// Set the first time the toast is drawn
    expires_at: Option<f64>,
}

/// Stack of notifications in the bottom-right corner
pub struct Toasts {
    toasts: Vec<Toast>,
    lifetime: f64,
}

impl Toasts {
    pub fn new(lifetime_secs: f32) -> Self {
        Self {
            toasts: Vec::new(),
            lifetime: f64::from(lifetime_secs.max(1.0)),
        }
    }

    pub fn push(&mut self, notification: Notification) {
        self.toasts.push(Toast {
            notification,
            expires_at: None,
        });
    }

    /// Draw live toasts and drop expired ones
    pub fn show(&mut self, ctx: &egui::Context) {
        let now = ctx.input(|i| i.time);
        self.toasts
            .retain(|toast| toast.expires_at.map_or(true, |at| at > now));
        if self.toasts.is_empty() {
            return;
        }

        let lifetime = self.lifetime;
        let mut dismissed = None;
        egui::Area::new(egui::Id::new("toasts"))
            .anchor(egui::Align2::RIGHT_BOTTOM, [-12.0, -12.0])
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                for (index, toast) in self.toasts.iter_mut().enumerate() {
                    // Errors stay up twice as long
                    let shown_for = if toast.notification.is_error() {
                        lifetime * 2.0
                    } else {
                        lifetime
                    };
                    let expires_at = *toast.expires_at.get_or_insert(now + shown_for);
                    let accent = match toast.notification.level {
                        NotificationLevel::Info => ui.visuals().hyperlink_color,
                        NotificationLevel::Success => egui::Color32::from_rgb(152, 195, 121),
                        NotificationLevel::Error => ui.visuals().error_fg_color,
                    };

                    let response = egui::Frame::popup(ui.style())
                        .stroke(egui::Stroke::new(1.0, accent))
                        .show(ui, |ui| {
                            ui.set_max_width(320.0);
                            ui.colored_label(
                                accent,
                                egui::RichText::new(&toast.notification.title).strong(),
                            );
                            ui.label(&toast.notification.message);
                        })
                        .response
                        .interact(egui::Sense::click());
                    if response.clicked() {
                        dismissed = Some(index);
                    }
                    ui.add_space(6.0);

                    ctx.request_repaint_after(std::time::Duration::from_secs_f64(
                        (expires_at - now).max(0.0),
                    ));
                }
            });

        if let Some(index) = dismissed {
            self.toasts.remove(index);
        }
    }
}
