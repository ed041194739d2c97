//! Theme and color system for the panel window.
//!
//! A light slate palette with a red accent, plus the spacing and rounding
//! scales every view uses.

use eframe::egui::{self, Color32, Rounding, Stroke, Style, Visuals};

/// Spacing scale for consistent layout.
pub mod spacing {
    /// Extra small spacing (4px) - between tightly related widgets.
    pub const XS: f32 = 4.0;

    /// Small spacing (8px) - between widgets in a row.
    pub const SM: f32 = 8.0;

    /// Medium spacing (12px) - between groups within a section.
    pub const MD: f32 = 12.0;

    /// Standard spacing (16px) - panel padding.
    pub const LG: f32 = 16.0;

    /// Large spacing (24px) - dialog padding and section gaps.
    pub const XL: f32 = 24.0;
}

/// Corner rounding values.
pub mod rounding {
    /// Rounding for group frames and dialogs (6px).
    pub const CARD: f32 = 6.0;

    /// Rounding for buttons and inputs (4px).
    pub const BUTTON: f32 = 4.0;
}

/// Shadow depths for elevated surfaces.
pub mod shadow {
    use super::Color32;
    use eframe::egui::Shadow;

    const SHADOW_BASE: Color32 = Color32::from_rgba_premultiplied(15, 23, 42, 255);

    /// Medium shadow for menus and popups.
    pub fn medium() -> Shadow {
        Shadow {
            offset: [0.0, 2.0].into(),
            blur: 8.0,
            spread: 0.0,
            color: Color32::from_rgba_premultiplied(
                SHADOW_BASE.r(),
                SHADOW_BASE.g(),
                SHADOW_BASE.b(),
                20,
            ),
        }
    }

    /// Elevated shadow for modal dialogs.
    pub fn elevated() -> Shadow {
        Shadow {
            offset: [0.0, 4.0].into(),
            blur: 16.0,
            spread: 0.0,
            color: Color32::from_rgba_premultiplied(
                SHADOW_BASE.r(),
                SHADOW_BASE.g(),
                SHADOW_BASE.b(),
                32,
            ),
        }
    }
}

/// Semantic color palette.
pub mod colors {
    use super::Color32;

    // ==========================================================================
    // Surfaces
    // ==========================================================================

    /// Window background - cool off-white.
    pub const BACKGROUND: Color32 = Color32::from_rgb(248, 250, 252);

    /// Group frames, inputs and dialogs.
    pub const SURFACE: Color32 = Color32::from_rgb(255, 255, 255);

    pub const SURFACE_HOVER: Color32 = Color32::from_rgb(241, 245, 249);

    pub const SURFACE_SELECTED: Color32 = Color32::from_rgb(226, 232, 240);

    /// Log view background.
    pub const CODE_BACKGROUND: Color32 = Color32::from_rgb(241, 245, 249);

    // ==========================================================================
    // Text
    // ==========================================================================

    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(15, 23, 42);

    pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(71, 85, 105);

    pub const TEXT_MUTED: Color32 = Color32::from_rgb(148, 163, 184);

    // ==========================================================================
    // Borders
    // ==========================================================================

    pub const BORDER: Color32 = Color32::from_rgb(226, 232, 240);

    pub const BORDER_FOCUSED: Color32 = Color32::from_rgb(203, 213, 225);

    pub const SEPARATOR: Color32 = Color32::from_rgb(226, 232, 240);

    // ==========================================================================
    // Accent
    // ==========================================================================

    /// Primary accent - Laravel red.
    pub const ACCENT: Color32 = Color32::from_rgb(239, 68, 68);

    pub const ACCENT_SUBTLE: Color32 = Color32::from_rgb(254, 226, 226);

    // ==========================================================================
    // Status
    // ==========================================================================

    pub const STATUS_RUNNING: Color32 = Color32::from_rgb(37, 99, 235);

    pub const STATUS_SUCCESS: Color32 = Color32::from_rgb(22, 163, 74);

    pub const STATUS_ERROR: Color32 = Color32::from_rgb(220, 38, 38);

    pub const STATUS_IDLE: Color32 = Color32::from_rgb(148, 163, 184);
}

/// Color for the run-state indicator.
pub fn run_state_color(state: crate::process::RunState) -> Color32 {
    use crate::process::RunState;
    match state {
        RunState::Running => colors::STATUS_RUNNING,
        RunState::Finished => colors::STATUS_SUCCESS,
        RunState::Failed => colors::STATUS_ERROR,
        RunState::Idle | RunState::Terminated => colors::STATUS_IDLE,
    }
}

/// Configure egui Visuals for the light theme.
pub fn configure_visuals() -> Visuals {
    let mut visuals = Visuals::light();

    visuals.window_fill = colors::SURFACE;
    visuals.panel_fill = colors::BACKGROUND;
    visuals.faint_bg_color = colors::SURFACE_HOVER;
    visuals.extreme_bg_color = colors::SURFACE;
    visuals.code_bg_color = colors::CODE_BACKGROUND;

    visuals.selection.bg_fill = colors::ACCENT_SUBTLE;
    visuals.selection.stroke = Stroke::new(1.0, colors::ACCENT);
    visuals.hyperlink_color = colors::ACCENT;

    visuals.window_shadow = shadow::elevated();
    visuals.popup_shadow = shadow::medium();
    visuals.window_stroke = Stroke::new(1.0, colors::BORDER);
    visuals.window_rounding = Rounding::same(rounding::CARD);
    visuals.menu_rounding = Rounding::same(rounding::BUTTON);

    visuals.text_cursor.stroke = Stroke::new(2.0, colors::ACCENT);

    configure_widget_visuals(&mut visuals);
    visuals
}

fn configure_widget_visuals(visuals: &mut Visuals) {
    let widgets = &mut visuals.widgets;

    widgets.noninteractive.bg_fill = colors::SURFACE;
    widgets.noninteractive.weak_bg_fill = colors::SURFACE_HOVER;
    widgets.noninteractive.bg_stroke = Stroke::new(1.0, colors::BORDER);
    widgets.noninteractive.fg_stroke = Stroke::new(1.0, colors::TEXT_PRIMARY);

    widgets.inactive.bg_fill = colors::SURFACE;
    widgets.inactive.weak_bg_fill = colors::SURFACE;
    widgets.inactive.bg_stroke = Stroke::new(1.0, colors::BORDER);
    widgets.inactive.fg_stroke = Stroke::new(1.0, colors::TEXT_PRIMARY);

    widgets.hovered.bg_fill = colors::SURFACE_HOVER;
    widgets.hovered.weak_bg_fill = colors::SURFACE_HOVER;
    widgets.hovered.bg_stroke = Stroke::new(1.0, colors::BORDER_FOCUSED);
    widgets.hovered.fg_stroke = Stroke::new(1.5, colors::TEXT_PRIMARY);

    widgets.active.bg_fill = colors::SURFACE_SELECTED;
    widgets.active.weak_bg_fill = colors::SURFACE_SELECTED;
    widgets.active.bg_stroke = Stroke::new(1.0, colors::ACCENT);
    widgets.active.fg_stroke = Stroke::new(2.0, colors::TEXT_PRIMARY);

    widgets.open.bg_fill = colors::SURFACE;
    widgets.open.weak_bg_fill = colors::SURFACE_HOVER;
    widgets.open.bg_stroke = Stroke::new(1.0, colors::ACCENT);
    widgets.open.fg_stroke = Stroke::new(1.0, colors::TEXT_PRIMARY);

    for state in [
        &mut widgets.noninteractive,
        &mut widgets.inactive,
        &mut widgets.hovered,
        &mut widgets.active,
        &mut widgets.open,
    ] {
        state.rounding = Rounding::same(rounding::BUTTON);
    }
}

/// Configure the egui Style with the spacing scale.
pub fn configure_style() -> Style {
    let default_style = Style::default();
    let mut style_spacing = default_style.spacing.clone();

    style_spacing.item_spacing = egui::vec2(spacing::SM, spacing::SM);
    style_spacing.window_margin = egui::Margin::same(spacing::LG);
    style_spacing.button_padding = egui::vec2(spacing::MD, 6.0);
    style_spacing.menu_margin = egui::Margin::same(spacing::SM);
    style_spacing.indent = spacing::LG;

    Style {
        visuals: configure_visuals(),
        spacing: style_spacing,
        animation_time: 0.1,
        ..Default::default()
    }
}

/// Apply the theme. Call once from the eframe creation context.
pub fn init(ctx: &egui::Context) {
    ctx.set_style(configure_style());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::RunState;

    #[test]
    fn test_spacing_scale_is_increasing() {
        let scale = [spacing::XS, spacing::SM, spacing::MD, spacing::LG, spacing::XL];
        assert!(scale.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_visuals_are_light() {
        let visuals = configure_visuals();
        assert!(!visuals.dark_mode);
        assert_eq!(visuals.panel_fill, colors::BACKGROUND);
    }

    #[test]
    fn test_run_state_colors_distinguish_outcomes() {
        assert_eq!(run_state_color(RunState::Running), colors::STATUS_RUNNING);
        assert_eq!(run_state_color(RunState::Failed), colors::STATUS_ERROR);
        assert_ne!(
            run_state_color(RunState::Finished),
            run_state_color(RunState::Failed)
        );
    }
}
