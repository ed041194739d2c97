//! Modal dialog used for notices, confirmations and the About box.
//!
//! ```ignore
//! let action = Modal::new("Confirm")
//!     .message("Are you sure you want to clear all logs?")
//!     .confirm_button(ModalButton::destructive("Clear"))
//!     .show(ctx);
//! ```

use eframe::egui::{self, Color32, Key, Order, Pos2, RichText, Rounding, Sense, Stroke};

use crate::session::{Notice, NoticeKind};
use crate::ui::gui::theme::{colors, rounding, shadow, spacing};

const DIALOG_WIDTH: f32 = 380.0;
const DIALOG_PADDING: f32 = spacing::XL;
const BUTTON_HEIGHT: f32 = 32.0;
const BUTTON_WIDTH: f32 = 96.0;
const BUTTON_GAP: f32 = spacing::MD;
const BACKDROP_ALPHA: u8 = 110;
const TITLE_SIZE: f32 = 18.0;
const BODY_SIZE: f32 = 14.0;

/// Label and colors of a dialog button.
#[derive(Debug, Clone)]
pub struct ModalButton {
    pub label: String,
    pub fill_color: Color32,
    pub text_color: Color32,
    pub stroke: Option<Stroke>,
}

impl ModalButton {
    /// Primary button in the accent color.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            fill_color: colors::ACCENT,
            text_color: Color32::WHITE,
            stroke: None,
        }
    }

    /// Neutral bordered button, used for Cancel.
    pub fn secondary(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            fill_color: colors::SURFACE,
            text_color: colors::TEXT_PRIMARY,
            stroke: Some(Stroke::new(1.0, colors::BORDER)),
        }
    }

    pub fn destructive(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            fill_color: colors::STATUS_ERROR,
            text_color: Color32::WHITE,
            stroke: None,
        }
    }
}

/// What the user did with the dialog this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalAction {
    Confirmed,
    /// Cancel button, backdrop click or Escape.
    Cancelled,
    /// Still open.
    None,
}

impl ModalAction {
    pub fn is_open(&self) -> bool {
        matches!(self, ModalAction::None)
    }

    /// Whether the dialog was closed by any means.
    pub fn is_closed(&self) -> bool {
        !self.is_open()
    }
}

#[derive(Debug, Clone)]
pub struct Modal {
    id: String,
    title: String,
    message: String,
    title_color: Color32,
    cancel_button: Option<ModalButton>,
    confirm_button: ModalButton,
    width: f32,
}

impl Modal {
    /// A dialog with Cancel and Confirm buttons.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: "modal".to_string(),
            title: title.into(),
            message: String::new(),
            title_color: colors::TEXT_PRIMARY,
            cancel_button: Some(ModalButton::secondary("Cancel")),
            confirm_button: ModalButton::new("Confirm"),
            width: DIALOG_WIDTH,
        }
    }

    /// A single-button dialog presenting `notice`.
    pub fn for_notice(notice: &Notice) -> Self {
        let modal = Self::new(notice.title.clone())
            .id("notice")
            .message(notice.message.clone())
            .no_cancel_button();
        match notice.kind {
            NoticeKind::Info => modal.confirm_button(ModalButton::new("OK")),
            NoticeKind::Error => {
                let mut modal = modal.confirm_button(ModalButton::destructive("OK"));
                modal.title_color = colors::STATUS_ERROR;
                modal
            }
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn no_cancel_button(mut self) -> Self {
        self.cancel_button = None;
        self
    }

    pub fn confirm_button(mut self, button: ModalButton) -> Self {
        self.confirm_button = button;
        self
    }

    /// Render the dialog and report what the user did.
    pub fn show(&self, ctx: &egui::Context) -> ModalAction {
        let mut action = ModalAction::None;

        self.render_backdrop(ctx, &mut action);
        self.render_dialog(ctx, &mut action);

        if ctx.input(|i| i.key_pressed(Key::Escape)) {
            action = ModalAction::Cancelled;
        } else if self.cancel_button.is_none() && ctx.input(|i| i.key_pressed(Key::Enter)) {
            action = ModalAction::Confirmed;
        }

        action
    }

    fn render_backdrop(&self, ctx: &egui::Context, action: &mut ModalAction) {
        let screen_rect = ctx.screen_rect();

        egui::Area::new(egui::Id::new(format!("{}_backdrop", self.id)))
            .order(Order::Foreground)
            .fixed_pos(Pos2::ZERO)
            .show(ctx, |ui| {
                ui.painter().rect_filled(
                    screen_rect,
                    Rounding::ZERO,
                    Color32::from_rgba_unmultiplied(0, 0, 0, BACKDROP_ALPHA),
                );

                let (_, response) = ui.allocate_exact_size(screen_rect.size(), Sense::click());
                if response.clicked() {
                    *action = ModalAction::Cancelled;
                }
            });
    }

    fn render_dialog(&self, ctx: &egui::Context, action: &mut ModalAction) {
        let screen_rect = ctx.screen_rect();
        // Height is not known before layout; 180 is a typical one-paragraph dialog
        let dialog_pos = Pos2::new(
            (screen_rect.width() - self.width) / 2.0,
            (screen_rect.height() - 180.0) / 2.0,
        );

        egui::Area::new(egui::Id::new(format!("{}_dialog", self.id)))
            .order(Order::Foreground)
            .fixed_pos(dialog_pos)
            .show(ctx, |ui| {
                egui::Frame::none()
                    .fill(colors::SURFACE)
                    .rounding(Rounding::same(rounding::CARD))
                    .shadow(shadow::elevated())
                    .stroke(Stroke::new(1.0, colors::BORDER))
                    .inner_margin(egui::Margin::same(DIALOG_PADDING))
                    .show(ui, |ui| {
                        let inner_width = self.width - 2.0 * DIALOG_PADDING;
                        ui.set_min_width(inner_width);
                        ui.set_max_width(inner_width);

                        ui.label(
                            RichText::new(&self.title)
                                .size(TITLE_SIZE)
                                .strong()
                                .color(self.title_color),
                        );
                        ui.add_space(spacing::MD);

                        if !self.message.is_empty() {
                            ui.label(
                                RichText::new(&self.message)
                                    .size(BODY_SIZE)
                                    .color(colors::TEXT_SECONDARY),
                            );
                        }
                        ui.add_space(spacing::XL);

                        ui.horizontal(|ui| {
                            let button_count = if self.cancel_button.is_some() { 2 } else { 1 };
                            let buttons_width = button_count as f32 * BUTTON_WIDTH
                                + (button_count - 1) as f32 * BUTTON_GAP;
                            ui.add_space((ui.available_width() - buttons_width).max(0.0));

                            if let Some(cancel) = &self.cancel_button {
                                if render_button(ui, cancel).clicked() {
                                    *action = ModalAction::Cancelled;
                                }
                                ui.add_space(BUTTON_GAP);
                            }
                            if render_button(ui, &self.confirm_button).clicked() {
                                *action = ModalAction::Confirmed;
                            }
                        });
                    });
            });
    }
}

fn render_button(ui: &mut egui::Ui, button: &ModalButton) -> egui::Response {
    let mut btn = egui::Button::new(
        RichText::new(&button.label)
            .size(BODY_SIZE)
            .color(button.text_color),
    )
    .fill(button.fill_color)
    .rounding(Rounding::same(rounding::BUTTON));

    if let Some(stroke) = button.stroke {
        btn = btn.stroke(stroke);
    }

    ui.add_sized([BUTTON_WIDTH, BUTTON_HEIGHT], btn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PanelError;

    #[test]
    fn test_default_modal_has_two_buttons() {
        let modal = Modal::new("Confirm");
        assert!(modal.cancel_button.is_some());
        assert_eq!(modal.confirm_button.label, "Confirm");
    }

    #[test]
    fn test_error_notice_uses_error_styling() {
        let notice = Notice::error(&PanelError::Runtime("boom".into()));
        let modal = Modal::for_notice(&notice);

        assert!(modal.cancel_button.is_none());
        assert_eq!(modal.title, notice.title);
        assert_eq!(modal.title_color, colors::STATUS_ERROR);
        assert_eq!(modal.confirm_button.fill_color, colors::STATUS_ERROR);
    }

    #[test]
    fn test_info_notice_uses_accent_button() {
        let modal = Modal::for_notice(&Notice::info("Success", "Path saved successfully!"));
        assert_eq!(modal.message, "Path saved successfully!");
        assert_eq!(modal.title_color, colors::TEXT_PRIMARY);
        assert_eq!(modal.confirm_button.fill_color, colors::ACCENT);
    }

    #[test]
    fn test_modal_action_states() {
        assert!(ModalAction::None.is_open());
        assert!(ModalAction::Confirmed.is_closed());
        assert!(ModalAction::Cancelled.is_closed());
    }
}
