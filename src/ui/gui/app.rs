//! Main window for the panel.
//!
//! [`PanelApp`] renders a [`Session`] and forwards button presses to it.
//! Everything that can fail is reported through the session's notice
//! queue and shown one modal at a time.

use std::path::PathBuf;
use std::time::Duration;

use eframe::egui::{self, Button, Color32, RichText, Rounding, TextEdit};
use egui_extras::{Column, TableBuilder};

use crate::catalog::COMMANDS;
use crate::error::{PanelError, Result};
use crate::session::{Notice, SaveOutcome, Session};
use crate::ui::gui::modal::{Modal, ModalAction, ModalButton};
use crate::ui::gui::theme::{self, colors, rounding, spacing};

// ============================================================================
// Constants
// ============================================================================

const WINDOW_TITLE: &str = "Laravel Command Runner";

const DEFAULT_WIDTH: f32 = 800.0;
const DEFAULT_HEIGHT: f32 = 900.0;
const MIN_WIDTH: f32 = 600.0;
const MIN_HEIGHT: f32 = 700.0;

/// Repaint cadence while a command is streaming output.
pub const RUNNING_REPAINT_INTERVAL: Duration = Duration::from_millis(100);

const PATH_FIELD_WIDTH: f32 = 420.0;
const SAVED_LIST_HEIGHT: f32 = 120.0;
const LOG_VIEW_MIN_HEIGHT: f32 = 260.0;
const TABLE_ROW_HEIGHT: f32 = 22.0;

const ROUTE_COLUMNS: [&str; 4] = ["Method", "URI", "Name", "Action"];

const DEFAULT_EXPORT_NAME: &str = "routes.txt";

// ============================================================================
// Tabs
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Commands,
    Routes,
}

impl Tab {
    pub fn label(self) -> &'static str {
        match self {
            Tab::Commands => "Commands",
            Tab::Routes => "Routes",
        }
    }

    pub fn all() -> &'static [Tab] {
        &[Tab::Commands, Tab::Routes]
    }
}

/// Which modal, if any, is on screen. At most one is shown per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dialog {
    ConfirmClear,
    About,
    Notice,
}

// ============================================================================
// Application
// ============================================================================

pub struct PanelApp {
    session: Session,
    current_tab: Tab,
    command: String,
    params: String,
    route_query: String,
    selected_saved: Option<usize>,
    confirm_clear: bool,
    show_about: bool,
}

impl PanelApp {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            current_tab: Tab::default(),
            command: String::new(),
            params: String::new(),
            route_query: String::new(),
            selected_saved: None,
            confirm_clear: false,
            show_about: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn current_tab(&self) -> Tab {
        self.current_tab
    }

    pub fn set_tab(&mut self, tab: Tab) {
        self.current_tab = tab;
    }

    // ========================================================================
    // Actions
    // ========================================================================

    fn run_selected_command(&mut self) {
        let result = self.session.run_command(&self.command, &self.params);
        self.session.report(result);
    }

    fn stop_command(&mut self) {
        let result = self.session.stop_command();
        self.session.report(result);
    }

    fn save_project_path(&mut self) {
        let result = self.session.save_project_path();
        match self.session.report(result) {
            Some(SaveOutcome::Saved) => self
                .session
                .notify(Notice::info("Success", "Path saved successfully!")),
            Some(SaveOutcome::AlreadySaved) => self
                .session
                .notify(Notice::info("Info", "This path already exists in the list.")),
            None => {}
        }
    }

    fn select_saved(&mut self, index: usize) {
        if let Some(path) = self.session.saved_paths().get(index).cloned() {
            self.session.set_project_path(path);
            self.selected_saved = Some(index);
        }
    }

    fn delete_selected_path(&mut self) {
        let Some(path) = self
            .selected_saved
            .and_then(|index| self.session.saved_paths().get(index).cloned())
        else {
            self.session
                .notify(Notice::info("Warning", "Please select a path to delete."));
            return;
        };
        let result = self.session.remove_saved_path(&path);
        if self.session.report(result).is_some() {
            self.selected_saved = None;
            self.session
                .notify(Notice::info("Success", "Path deleted successfully!"));
        }
    }

    fn clear_logs(&mut self) {
        let result = self.session.clear_log();
        if self.session.report(result).is_some() {
            self.session
                .notify(Notice::info("Success", "Logs cleared successfully."));
        }
    }

    fn refresh_routes(&mut self) {
        let result = self.session.refresh_routes();
        self.session.report(result);
    }

    /// Text to place on the clipboard, if a server address is known.
    fn copy_server_url(&mut self) -> Option<String> {
        let url = self.session.server_address()?.to_string();
        self.session
            .notify(Notice::info("Copied", "URL copied to clipboard!"));
        Some(url)
    }

    fn browse_project(&mut self) {
        let mut dialog = rfd::FileDialog::new();
        let current = PathBuf::from(self.session.project_path().trim());
        if current.is_dir() {
            dialog = dialog.set_directory(&current);
        }
        if let Some(folder) = dialog.pick_folder() {
            self.session.set_project_path(folder.display().to_string());
            self.selected_saved = None;
        }
    }

    fn export_routes(&mut self) {
        if self.session.routes().is_empty() {
            self.session.notify_error(&PanelError::Runtime(
                "No routes data available. Please refresh routes first.".to_string(),
            ));
            return;
        }
        let Some(target) = rfd::FileDialog::new()
            .add_filter("Text files", &["txt"])
            .add_filter("All files", &["*"])
            .set_file_name(DEFAULT_EXPORT_NAME)
            .save_file()
        else {
            return;
        };
        let result = self.session.export_routes(&target);
        if self.session.report(result).is_some() {
            self.session.notify(Notice::info(
                "Success",
                format!("Routes exported to {}", target.display()),
            ));
        }
    }

    fn active_dialog(&self) -> Option<Dialog> {
        if self.confirm_clear {
            Some(Dialog::ConfirmClear)
        } else if self.show_about {
            Some(Dialog::About)
        } else if self.session.current_notice().is_some() {
            Some(Dialog::Notice)
        } else {
            None
        }
    }
}

impl eframe::App for PanelApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.session.drain_events();
        if self.session.is_running() {
            ctx.request_repaint_after(RUNNING_REPAINT_INTERVAL);
        }

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            self.render_menu_bar(ui);
        });

        egui::TopBottomPanel::top("tab_bar")
            .frame(
                egui::Frame::none()
                    .fill(colors::BACKGROUND)
                    .inner_margin(egui::Margin::symmetric(spacing::LG, spacing::SM)),
            )
            .show(ctx, |ui| {
                self.render_tab_bar(ui);
            });

        egui::CentralPanel::default()
            .frame(
                egui::Frame::none()
                    .fill(colors::BACKGROUND)
                    .inner_margin(egui::Margin::same(spacing::LG)),
            )
            .show(ctx, |ui| match self.current_tab {
                Tab::Commands => self.render_commands_tab(ui),
                Tab::Routes => self.render_routes_tab(ui),
            });

        self.render_dialogs(ctx);
    }
}

impl PanelApp {
    // ========================================================================
    // Menu and Tabs
    // ========================================================================

    fn render_menu_bar(&mut self, ui: &mut egui::Ui) {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Clear Logs").clicked() {
                    self.confirm_clear = true;
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("Exit").clicked() {
                    ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });
            ui.menu_button("View", |ui| {
                if ui.button("Refresh Routes").clicked() {
                    self.current_tab = Tab::Routes;
                    self.refresh_routes();
                    ui.close_menu();
                }
                if ui.button("Export Routes…").clicked() {
                    ui.close_menu();
                    self.export_routes();
                }
            });
            ui.menu_button("Help", |ui| {
                if ui.button("About").clicked() {
                    self.show_about = true;
                    ui.close_menu();
                }
            });
        });
    }

    fn render_tab_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            for tab in Tab::all() {
                let selected = self.current_tab == *tab;
                let text = RichText::new(tab.label()).color(if selected {
                    colors::TEXT_PRIMARY
                } else {
                    colors::TEXT_SECONDARY
                });
                if ui.selectable_label(selected, text).clicked() {
                    self.current_tab = *tab;
                }
            }
        });
    }

    /// A titled group frame.
    fn section(ui: &mut egui::Ui, title: &str, add_contents: impl FnOnce(&mut egui::Ui)) {
        egui::Frame::none()
            .fill(colors::SURFACE)
            .rounding(Rounding::same(rounding::CARD))
            .stroke(egui::Stroke::new(1.0, colors::BORDER))
            .inner_margin(egui::Margin::same(spacing::MD))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(RichText::new(title).strong().color(colors::TEXT_PRIMARY));
                ui.add_space(spacing::XS);
                add_contents(ui);
            });
        ui.add_space(spacing::SM);
    }

    // ========================================================================
    // Commands Tab
    // ========================================================================

    fn render_commands_tab(&mut self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical()
            .id_salt("commands_tab")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                self.render_project_section(ui);
                self.render_command_section(ui);
                self.render_server_section(ui);
                self.render_saved_paths_section(ui);
                self.render_log_section(ui);
            });
    }

    fn render_project_section(&mut self, ui: &mut egui::Ui) {
        Self::section(ui, "Select Laravel Project Path:", |ui| {
            ui.horizontal(|ui| {
                ui.add(
                    TextEdit::singleline(self.session.project_path_mut())
                        .hint_text("/path/to/laravel-project")
                        .desired_width(PATH_FIELD_WIDTH),
                );
                if ui.button("Browse").clicked() {
                    self.browse_project();
                }
            });
            if ui.button("Save Project Path").clicked() {
                self.save_project_path();
            }
        });
    }

    fn render_command_section(&mut self, ui: &mut egui::Ui) {
        Self::section(ui, "Choose Laravel or Composer Command:", |ui| {
            ui.horizontal(|ui| {
                ui.add(
                    TextEdit::singleline(&mut self.command)
                        .hint_text("migrate")
                        .desired_width(PATH_FIELD_WIDTH / 2.0),
                );
                egui::ComboBox::from_id_salt("command_catalog")
                    .selected_text("Commands")
                    .height(320.0)
                    .show_ui(ui, |ui| {
                        for command in COMMANDS {
                            if ui
                                .selectable_label(self.command == *command, *command)
                                .clicked()
                            {
                                self.command = command.to_string();
                            }
                        }
                    });
            });

            ui.label(RichText::new("Additional Parameters:").color(colors::TEXT_SECONDARY));
            ui.add(
                TextEdit::singleline(&mut self.params)
                    .hint_text("--force")
                    .desired_width(PATH_FIELD_WIDTH),
            );
            ui.add_space(spacing::XS);

            let running = self.session.is_running();
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(!running, Button::new("Run Command"))
                    .clicked()
                {
                    self.run_selected_command();
                }
                let stop = Button::new(RichText::new("Stop Command").color(Color32::WHITE))
                    .fill(colors::STATUS_ERROR);
                if ui.add_enabled(running, stop).clicked() {
                    self.stop_command();
                }

                let state = self.session.run_state();
                ui.add_space(spacing::SM);
                ui.label(RichText::new("●").color(theme::run_state_color(state)));
                ui.label(RichText::new(state.label()).color(colors::TEXT_SECONDARY));
            });
        });
    }

    fn render_server_section(&mut self, ui: &mut egui::Ui) {
        Self::section(ui, "Server URL", |ui| {
            ui.horizontal(|ui| {
                let address = self.session.server_address();
                let text = match address {
                    Some(url) => RichText::new(url).monospace().color(colors::ACCENT),
                    None => RichText::new("Not running").color(colors::TEXT_MUTED),
                };
                ui.label(text);

                let has_address = address.is_some();
                if ui
                    .add_enabled(has_address, Button::new("Copy URL"))
                    .clicked()
                {
                    if let Some(url) = self.copy_server_url() {
                        ui.ctx().copy_text(url);
                    }
                }
            });
        });
    }

    fn render_saved_paths_section(&mut self, ui: &mut egui::Ui) {
        Self::section(ui, "Saved Project Paths:", |ui| {
            let mut clicked = None;
            egui::ScrollArea::vertical()
                .id_salt("saved_paths")
                .max_height(SAVED_LIST_HEIGHT)
                .auto_shrink([false, true])
                .show(ui, |ui| {
                    if self.session.saved_paths().is_empty() {
                        ui.label(RichText::new("No saved paths").color(colors::TEXT_MUTED));
                    }
                    for (index, path) in self.session.saved_paths().iter().enumerate() {
                        let selected = self.selected_saved == Some(index);
                        if ui.selectable_label(selected, path.as_str()).clicked() {
                            clicked = Some(index);
                        }
                    }
                });
            if let Some(index) = clicked {
                self.select_saved(index);
            }
            if ui.button("Delete Selected Path").clicked() {
                self.delete_selected_path();
            }
        });
    }

    fn render_log_section(&mut self, ui: &mut egui::Ui) {
        Self::section(ui, "Command Logs:", |ui| {
            egui::Frame::none()
                .fill(colors::CODE_BACKGROUND)
                .rounding(Rounding::same(rounding::BUTTON))
                .inner_margin(egui::Margin::same(spacing::SM))
                .show(ui, |ui| {
                    egui::ScrollArea::vertical()
                        .id_salt("command_log")
                        .min_scrolled_height(LOG_VIEW_MIN_HEIGHT)
                        .max_height(LOG_VIEW_MIN_HEIGHT)
                        .stick_to_bottom(true)
                        .auto_shrink([false, false])
                        .show(ui, |ui| {
                            let mut text = self.session.log_text();
                            ui.add(
                                TextEdit::multiline(&mut text)
                                    .font(egui::TextStyle::Monospace)
                                    .desired_width(f32::INFINITY)
                                    .frame(false),
                            );
                        });
                });
            if ui.button("Clear Logs").clicked() {
                self.confirm_clear = true;
            }
        });
    }

    // ========================================================================
    // Routes Tab
    // ========================================================================

    fn render_routes_tab(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Search:");
            ui.add(
                TextEdit::singleline(&mut self.route_query)
                    .hint_text("method, URI, name or action")
                    .desired_width(PATH_FIELD_WIDTH / 1.5),
            );
            if ui.button("Refresh Routes").clicked() {
                self.refresh_routes();
            }
            if ui.button("Export Routes").clicked() {
                self.export_routes();
            }
        });
        ui.add_space(spacing::SM);

        let routes = self.session.filtered_routes(&self.route_query);
        ui.label(
            RichText::new(format!(
                "{} of {} routes",
                routes.len(),
                self.session.routes().len()
            ))
            .color(colors::TEXT_MUTED),
        );

        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::initial(100.0).at_least(60.0))
            .column(Column::initial(220.0).at_least(80.0))
            .column(Column::initial(160.0).at_least(60.0))
            .column(Column::remainder().at_least(80.0))
            .header(TABLE_ROW_HEIGHT, |mut header| {
                for title in ROUTE_COLUMNS {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|body| {
                body.rows(TABLE_ROW_HEIGHT, routes.len(), |mut row| {
                    let route = routes[row.index()];
                    for value in [&route.method, &route.uri, &route.name, &route.action] {
                        row.col(|ui| {
                            ui.label(value.as_str());
                        });
                    }
                });
            });
    }

    // ========================================================================
    // Dialogs
    // ========================================================================

    fn render_dialogs(&mut self, ctx: &egui::Context) {
        match self.active_dialog() {
            Some(Dialog::ConfirmClear) => {
                let action = Modal::new("Confirm")
                    .id("confirm_clear")
                    .message("Are you sure you want to clear all logs?")
                    .confirm_button(ModalButton::destructive("Clear"))
                    .show(ctx);
                if action.is_closed() {
                    self.confirm_clear = false;
                }
                if action == ModalAction::Confirmed {
                    self.clear_logs();
                }
            }
            Some(Dialog::About) => {
                let action = Modal::new("About")
                    .id("about")
                    .message(format!(
                        "{} {}\nRun artisan and composer commands for Laravel projects.",
                        WINDOW_TITLE,
                        env!("CARGO_PKG_VERSION")
                    ))
                    .no_cancel_button()
                    .confirm_button(ModalButton::new("OK"))
                    .show(ctx);
                if action.is_closed() {
                    self.show_about = false;
                }
            }
            Some(Dialog::Notice) => {
                let Some(notice) = self.session.current_notice() else {
                    return;
                };
                if Modal::for_notice(notice).show(ctx).is_closed() {
                    self.session.dismiss_notice();
                }
            }
            None => {}
        }
    }
}

// ============================================================================
// Entry Point
// ============================================================================

fn build_viewport() -> egui::ViewportBuilder {
    egui::ViewportBuilder::default()
        .with_title(WINDOW_TITLE)
        .with_inner_size([DEFAULT_WIDTH, DEFAULT_HEIGHT])
        .with_min_inner_size([MIN_WIDTH, MIN_HEIGHT])
}

/// Open the window on `session` and block until it is closed.
pub fn run_gui(session: Session) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: build_viewport(),
        centered: true,
        ..Default::default()
    };

    eframe::run_native(
        WINDOW_TITLE,
        options,
        Box::new(|cc| {
            theme::init(&cc.egui_ctx);
            Ok(Box::new(PanelApp::new(session)))
        }),
    )
    .map_err(|e| PanelError::Gui(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::session::NoticeKind;
    use tempfile::TempDir;

    fn app_in(data: &TempDir) -> PanelApp {
        let session = Session::open(Config::with_data_dir(data.path())).unwrap();
        PanelApp::new(session)
    }

    #[test]
    fn test_app_starts_on_commands_tab() {
        let data = TempDir::new().unwrap();
        let app = app_in(&data);
        assert_eq!(app.current_tab(), Tab::Commands);
        assert_eq!(app.active_dialog(), None);
    }

    #[test]
    fn test_tab_labels() {
        let labels: Vec<&str> = Tab::all().iter().map(|t| t.label()).collect();
        assert_eq!(labels, vec!["Commands", "Routes"]);
    }

    #[test]
    fn test_save_then_duplicate_notices() {
        let data = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        let mut app = app_in(&data);
        app.session
            .set_project_path(project.path().display().to_string());

        app.save_project_path();
        app.save_project_path();

        assert_eq!(app.session.dismiss_notice().unwrap().title, "Success");
        let second = app.session.dismiss_notice().unwrap();
        assert!(second.message.contains("already exists"));
        assert_eq!(app.session.saved_paths().len(), 1);
    }

    #[test]
    fn test_select_and_delete_saved_path() {
        let data = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        let path = project.path().display().to_string();
        let mut app = app_in(&data);
        app.session.set_project_path(path.clone());
        app.save_project_path();
        app.session.dismiss_notice();

        app.session.set_project_path("");
        app.select_saved(0);
        assert_eq!(app.session.project_path(), path);

        app.delete_selected_path();
        assert!(app.session.saved_paths().is_empty());
        assert_eq!(app.selected_saved, None);
    }

    #[test]
    fn test_delete_without_selection_warns() {
        let data = TempDir::new().unwrap();
        let mut app = app_in(&data);

        app.delete_selected_path();

        assert_eq!(app.session.current_notice().unwrap().title, "Warning");
        assert_eq!(app.active_dialog(), Some(Dialog::Notice));
    }

    #[test]
    fn test_run_with_invalid_path_reports_error() {
        let data = TempDir::new().unwrap();
        let mut app = app_in(&data);
        app.command = "migrate".into();
        app.session.set_project_path("/not/a/real/project");

        app.run_selected_command();

        let notice = app.session.current_notice().unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.title, "Invalid project path");
        assert!(!app.session.is_running());
    }

    #[test]
    fn test_copy_url_requires_address() {
        let data = TempDir::new().unwrap();
        let mut app = app_in(&data);
        assert_eq!(app.copy_server_url(), None);
        assert!(app.session.current_notice().is_none());
    }

    #[test]
    fn test_confirm_clear_takes_precedence() {
        let data = TempDir::new().unwrap();
        let mut app = app_in(&data);
        app.session.notify(Notice::info("Info", "queued"));
        app.confirm_clear = true;
        assert_eq!(app.active_dialog(), Some(Dialog::ConfirmClear));

        app.confirm_clear = false;
        app.clear_logs();
        assert_eq!(app.session.log_text().lines().count(), 1);
        assert_eq!(app.active_dialog(), Some(Dialog::Notice));
    }
}
