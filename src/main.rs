use nnfi::cli::Args;
use nnfi::config;
use nnfi::core::event_bus::{BoxedEvent, EventBus};
use nnfi::dialogs::prefs::prefs_events::{
    QuitEvent, ResetSettingsEvent, ToggleHelpEvent, ToggleLayerPanelEvent, ToggleSettingsEvent,
};
use nnfi::dialogs::prefs::{AppSettings, HotkeyHandler, render_settings_window};
use nnfi::entities::inspector_events::*;
use nnfi::entities::{Inspector, Interpretation, LayerKind, Point};
use nnfi::main_events::{self, AppState};
use nnfi::widgets;
use nnfi::widgets::file_dialogs::{create_field_dialog, create_image_dialog};
use nnfi::widgets::status::StatusBar;
use nnfi::widgets::viewport::viewport_events::*;
use nnfi::widgets::viewport::{ViewportState, ViewportTextures};

use clap::Parser;
use eframe::egui;
use log::{debug, info, warn};
use std::path::PathBuf;

/// Main application state
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default)]
struct InspectorApp {
    settings: AppSettings,
    viewport_state: ViewportState,
    #[serde(skip)]
    inspector: Inspector,
    #[serde(skip)]
    textures: ViewportTextures,
    #[serde(skip)]
    status_bar: StatusBar,
    #[serde(skip)]
    event_bus: EventBus,
    #[serde(skip)]
    hotkey_handler: HotkeyHandler,
    #[serde(skip)]
    show_help: bool,
    #[serde(skip)]
    show_settings: bool,
    #[serde(skip)]
    hovered_pixel: Option<Point>,
    #[serde(skip)]
    applied_font_size: f32,
    /// Startup files, loaded on the first frame
    #[serde(skip)]
    pending_image: Option<PathBuf>,
    #[serde(skip)]
    pending_field: Option<PathBuf>,
}

impl Default for InspectorApp {
    fn default() -> Self {
        Self {
            settings: AppSettings::default(),
            viewport_state: ViewportState::new(),
            inspector: Inspector::new(),
            textures: ViewportTextures::new(),
            status_bar: StatusBar::new(),
            event_bus: EventBus::new(),
            hotkey_handler: HotkeyHandler::new(),
            show_help: false,
            show_settings: false,
            hovered_pixel: None,
            applied_font_size: 0.0,
            pending_image: None,
            pending_field: None,
        }
    }
}

impl InspectorApp {
    /// Push persisted settings into the inspector.
    fn apply_settings(&mut self) {
        self.inspector.set_patch_radius(self.settings.patch_radius);
        self.inspector.set_interpretation(self.settings.interpretation);
        self.inspector.select_layer(self.settings.selected_layer);
        self.show_help = self.settings.show_help;
    }

    /// Emit events for settings edited in the Preferences window.
    fn sync_settings(&mut self) {
        if self.settings.patch_radius != self.inspector.patch_radius() {
            self.event_bus
                .emit(SetPatchRadiusEvent(self.settings.patch_radius));
        }
        if self.settings.interpretation != self.inspector.interpretation() {
            self.event_bus
                .emit(SetInterpretationEvent(self.settings.interpretation));
        }
        if self.settings.selected_layer != self.inspector.selected_layer() {
            self.event_bus
                .emit(SelectLayerEvent(self.settings.selected_layer));
        }
    }

    fn apply_style(&mut self, ctx: &egui::Context) {
        ctx.set_visuals(if self.settings.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        });
        if (self.applied_font_size - self.settings.font_size).abs() > f32::EPSILON {
            let size = self.settings.font_size;
            ctx.style_mut(|style| {
                for font in style.text_styles.values_mut() {
                    font.size = size;
                }
            });
            self.applied_font_size = size;
        }
    }

    fn reset_settings(&mut self) {
        info!("Resetting settings to defaults");
        self.settings = AppSettings::default();
        self.viewport_state = ViewportState::new();
        self.sync_settings();
    }

    fn show_image_dialog(&mut self) {
        let dialog = create_image_dialog("Open Image", self.settings.last_image_dir.as_deref());
        if let Some(path) = dialog.pick_file() {
            self.event_bus.emit(OpenImageEvent(Some(path)));
        }
    }

    fn show_field_dialog(&mut self) {
        let dialog = create_field_dialog("Open NN Field", self.settings.last_field_dir.as_deref());
        if let Some(path) = dialog.pick_file() {
            self.event_bus.emit(OpenFieldEvent(Some(path)));
        }
    }

    /// Drain the event bus. Handlers may emit more events, so loop until empty.
    fn handle_events(&mut self, ctx: &egui::Context) {
        loop {
            let events = self.event_bus.poll();
            if events.is_empty() {
                break;
            }
            for event in events {
                self.handle_event(ctx, event);
            }
        }
    }

    fn handle_event(&mut self, ctx: &egui::Context, event: BoxedEvent) {
        let mut state = AppState {
            inspector: &mut self.inspector,
            viewport_state: &mut self.viewport_state,
            settings: &mut self.settings,
            status: &mut self.status_bar,
            show_help: &mut self.show_help,
            show_settings: &mut self.show_settings,
        };
        let Some(result) = main_events::handle_app_event(&event, &mut state) else {
            debug!("Unhandled event: {}", (*event).type_name());
            return;
        };
        if result.show_image_dialog {
            self.show_image_dialog();
        }
        if result.show_field_dialog {
            self.show_field_dialog();
        }
        if let Some(text) = result.copy_text {
            ctx.copy_text(text);
        }
        if result.reset_settings {
            self.reset_settings();
        }
        if result.quit {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }

    fn handle_keyboard_input(&mut self, ctx: &egui::Context) {
        // Text fields own the keyboard while focused
        if ctx.wants_keyboard_input() {
            return;
        }
        let mut queued: Vec<BoxedEvent> = Vec::new();
        ctx.input(|i| {
            queued.extend(self.hotkey_handler.handle_input(i));
            for event in &i.events {
                match event {
                    egui::Event::Copy => queued.push(Box::new(CopyPickEvent)),
                    egui::Event::Paste(text) => queued.push(Box::new(DropTextEvent(text.clone()))),
                    _ => {}
                }
            }
        });
        for event in queued {
            self.event_bus.emit_boxed(event);
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .collect()
        });
        if !dropped.is_empty() {
            info!("Files dropped: {:?}", dropped);
            self.event_bus.emit(FilesDroppedEvent(dropped));
        }
    }

    fn render_menu_bar(&mut self, ctx: &egui::Context) {
        let bus = &self.event_bus;
        let inspector = &self.inspector;
        let viewport = &self.viewport_state;
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Image...    Ctrl+O").clicked() {
                        bus.emit(OpenImageEvent(None));
                    }
                    if ui.button("Open NN Field... Ctrl+Shift+O").clicked() {
                        bus.emit(OpenFieldEvent(None));
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        bus.emit(QuitEvent);
                    }
                });

                ui.menu_button("Edit", |ui| {
                    let current = inspector.interpretation();
                    for interp in [Interpretation::Absolute, Interpretation::Offset] {
                        let label = format!("Interpret as {}", interp.label());
                        if ui.radio(current == interp, label).clicked() {
                            bus.emit(SetInterpretationEvent(interp));
                        }
                    }
                    ui.separator();
                    let has_pick = inspector.last_result().is_some();
                    if ui
                        .add_enabled(has_pick, egui::Button::new("Copy Pick   Ctrl+C"))
                        .clicked()
                    {
                        bus.emit(CopyPickEvent);
                    }
                    if ui.button("Paste Pick  Ctrl+V").clicked() {
                        ui.ctx().send_viewport_cmd(egui::ViewportCommand::RequestPaste);
                    }
                });

                ui.menu_button("View", |ui| {
                    if ui.radio(viewport.flip_x, "Flip Horizontally   H").clicked() {
                        bus.emit(FlipHorizontalEvent);
                    }
                    if ui.radio(viewport.flip_y, "Flip Vertically     V").clicked() {
                        bus.emit(FlipVerticalEvent);
                    }
                    ui.separator();
                    if ui.button("Fit   F").clicked() {
                        bus.emit(FitViewportEvent);
                    }
                    if ui.button("100%  A").clicked() {
                        bus.emit(Viewport100Event);
                    }
                    ui.separator();
                    let selected = inspector.selected_layer();
                    for kind in LayerKind::ALL {
                        let loaded = inspector.layers().layer(kind).is_some();
                        if ui
                            .add_enabled(loaded, egui::RadioButton::new(selected == kind, kind.label()))
                            .clicked()
                        {
                            bus.emit(SelectLayerEvent(kind));
                        }
                    }
                    ui.separator();
                    if ui.button("Layer Panel   F2").clicked() {
                        bus.emit(ToggleLayerPanelEvent);
                    }
                    if ui.button("Preferences   F12").clicked() {
                        bus.emit(ToggleSettingsEvent);
                    }
                    if ui.button("Reset Settings").clicked() {
                        bus.emit(ResetSettingsEvent);
                    }
                });

                ui.menu_button("Help", |ui| {
                    if ui.button("Help   F1").clicked() {
                        bus.emit(ToggleHelpEvent);
                    }
                });
            });
        });
    }
}

impl eframe::App for InspectorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.apply_style(ctx);

        // Startup files go through the bus like everything else
        if let Some(path) = self.pending_image.take() {
            self.event_bus.emit(OpenImageEvent(Some(path)));
        }
        if let Some(path) = self.pending_field.take() {
            self.event_bus.emit(OpenFieldEvent(Some(path)));
        }

        self.handle_keyboard_input(ctx);
        self.handle_dropped_files(ctx);
        self.handle_events(ctx);

        self.render_menu_bar(ctx);

        // Pixel under the cursor as of the previous frame
        let hover = self.hovered_pixel.map(|p| self.inspector.hover_info(p));
        self.status_bar
            .render(ctx, &self.inspector, &self.viewport_state, hover.as_ref());

        if self.settings.show_layer_panel {
            let actions = egui::SidePanel::right("layers_panel")
                .resizable(false)
                .show(ctx, |ui| widgets::layers_panel::render(ui, &self.inspector))
                .inner;
            actions.forward(&self.event_bus);
        }

        let (actions, hovered_pixel) = egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                widgets::viewport::render(
                    ui,
                    &mut self.inspector,
                    &mut self.viewport_state,
                    &mut self.textures,
                    self.settings.overlay_opacity,
                    self.show_help,
                )
            })
            .inner;
        self.hovered_pixel = hovered_pixel;
        actions.forward(&self.event_bus);

        if self.show_settings {
            render_settings_window(ctx, &mut self.show_settings, &mut self.settings);
        }
        self.sync_settings();

        // Events emitted while drawing are handled next frame
        if self.event_bus.queue_len() > 0 {
            ctx.request_repaint();
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        self.settings.show_help = self.show_help;
        if let Ok(json) = serde_json::to_string(self) {
            storage.set_string(eframe::APP_KEY, json);
            debug!(
                "App state saved: radius={}, interpretation={}, layer={}",
                self.settings.patch_radius,
                self.settings.interpretation.label(),
                self.settings.selected_layer.label()
            );
        }
    }
}

fn init_logging(args: &Args, path_config: &config::PathConfig) {
    let log_level = args.log_level();

    if let Some(log_path_opt) = &args.log_file {
        let log_path = log_path_opt
            .clone()
            .unwrap_or_else(|| config::data_file(config::LOG_FILE, path_config));

        match std::fs::File::create(&log_path) {
            Ok(file) => {
                env_logger::Builder::new()
                    .filter_level(log_level)
                    .filter_module("egui", log::LevelFilter::Info)
                    .filter_module("eframe", log::LevelFilter::Info)
                    .format_timestamp_millis()
                    .target(env_logger::Target::Pipe(Box::new(file)))
                    .init();
                info!(
                    "Logging to file: {} (level: {:?})",
                    log_path.display(),
                    log_level
                );
                return;
            }
            Err(e) => {
                eprintln!(
                    "Warning: cannot create log file {}: {}, logging to console",
                    log_path.display(),
                    e
                );
            }
        }
    }

    // Console logging (respects RUST_LOG if set)
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_level.to_string().to_lowercase()),
    )
    .filter_module("egui", log::LevelFilter::Info)
    .filter_module("eframe", log::LevelFilter::Info)
    .format_timestamp_millis()
    .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let path_config = config::PathConfig::from_env_and_cli(args.config_dir.clone());
    if let Err(e) = config::ensure_dirs(&path_config) {
        eprintln!("Warning: Failed to create application directories: {:#}", e);
    }

    init_logging(&args, &path_config);

    info!("NN field inspector starting...");
    debug!("Command-line args: {:?}", args);
    info!(
        "Config path: {}",
        config::config_file(config::SETTINGS_FILE, &path_config).display()
    );

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!(
                "NN Field Inspector v{} • F1 for help",
                env!("CARGO_PKG_VERSION")
            ))
            .with_inner_size([1024.0, 768.0])
            .with_resizable(true)
            .with_drag_and_drop(true),
        persist_window: true,
        persistence_path: Some(config::config_file(config::SETTINGS_FILE, &path_config)),
        ..Default::default()
    };

    eframe::run_native(
        "NN Field Inspector",
        native_options,
        Box::new(move |cc| {
            let mut app: InspectorApp = cc
                .storage
                .and_then(|storage| storage.get_string(eframe::APP_KEY))
                .and_then(|json| serde_json::from_str(&json).ok())
                .unwrap_or_else(|| {
                    info!("No persisted state found, starting with defaults");
                    InspectorApp::default()
                });

            // CLI arguments have priority over persisted settings
            if let Some(radius) = args.radius {
                app.settings.patch_radius = radius;
            }
            if let Some(interpretation) = args.interpretation {
                app.settings.interpretation = interpretation;
            }
            app.apply_settings();

            if args.field.is_some() && args.image.is_none() {
                warn!("NN field given without an image; picks need both");
            }
            app.pending_image = args.image.clone();
            app.pending_field = args.field.clone();

            Ok(Box::new(app))
        }),
    )?;

    info!("Application exiting");
    Ok(())
}
