//! Application event handling - extracted from main.rs for clarity.
//!
//! Widgets, menus and hotkeys only emit events. Everything that mutates the
//! inspector or the view happens here. Work that needs the window (file
//! dialogs, clipboard, closing) comes back as an [`EventResult`].

use log::{debug, error, info, warn};
use std::path::PathBuf;

use crate::core::event_bus::{BoxedEvent, downcast_event};
use crate::dialogs::prefs::AppSettings;
use crate::dialogs::prefs::prefs_events::*;
use crate::entities::color_image::is_image_path;
use crate::entities::inspector_events::*;
use crate::entities::nn_field::is_field_path;
use crate::entities::{Inspector, PickRejection, PickResult};
use crate::widgets::status::StatusBar;
use crate::widgets::viewport::ViewportState;
use crate::widgets::viewport::viewport_events::*;

/// Result of handling an app event - may contain deferred actions
#[derive(Default, Debug)]
pub struct EventResult {
    pub show_image_dialog: bool,
    pub show_field_dialog: bool,
    pub copy_text: Option<String>,
    pub quit: bool,
    pub reset_settings: bool,
}

/// Mutable app state the handler works on.
pub struct AppState<'a> {
    pub inspector: &'a mut Inspector,
    pub viewport_state: &'a mut ViewportState,
    pub settings: &'a mut AppSettings,
    pub status: &'a mut StatusBar,
    pub show_help: &'a mut bool,
    pub show_settings: &'a mut bool,
}

fn report_pick(status: &mut StatusBar, outcome: &Result<PickResult, PickRejection>) {
    match outcome {
        Ok(r) => status.set_message(format!("Best match center: {}", r.match_center)),
        Err(e) => status.set_message(e.to_string()),
    }
}

fn open_image(state: &mut AppState, path: PathBuf) {
    match state.inspector.load_image(&path) {
        Ok(()) => {
            info!("Loaded image {}", path.display());
            state.settings.last_image_dir = path.parent().map(PathBuf::from);
            state.status.set_message(format!("Loaded {}", path.display()));
        }
        Err(e) => {
            error!("{:#}", e);
            state.status.set_message(format!("{:#}", e));
        }
    }
}

fn open_field(state: &mut AppState, path: PathBuf) {
    match state.inspector.load_field(&path) {
        Ok(()) => {
            info!("Loaded NN field {}", path.display());
            state.settings.last_field_dir = path.parent().map(PathBuf::from);
            state.status.set_message(format!("Loaded {}", path.display()));
        }
        Err(e) => {
            error!("{:#}", e);
            state.status.set_message(format!("{:#}", e));
        }
    }
}

/// Handle a single app event (called from main event loop).
/// Returns Some(result) if event was handled, None otherwise.
pub fn handle_app_event(event: &BoxedEvent, state: &mut AppState) -> Option<EventResult> {
    let mut result = EventResult::default();

    // === Files ===
    if let Some(e) = downcast_event::<OpenImageEvent>(event) {
        match &e.0 {
            Some(path) => open_image(state, path.clone()),
            None => result.show_image_dialog = true,
        }
        return Some(result);
    }
    if let Some(e) = downcast_event::<OpenFieldEvent>(event) {
        match &e.0 {
            Some(path) => open_field(state, path.clone()),
            None => result.show_field_dialog = true,
        }
        return Some(result);
    }
    if let Some(e) = downcast_event::<FilesDroppedEvent>(event) {
        for path in &e.0 {
            if is_field_path(path) {
                open_field(state, path.clone());
            } else if is_image_path(path) {
                open_image(state, path.clone());
            } else {
                warn!("Ignoring dropped file with unknown type: {}", path.display());
                state
                    .status
                    .set_message(format!("Unsupported file: {}", path.display()));
            }
        }
        return Some(result);
    }

    // === Picking ===
    if let Some(e) = downcast_event::<PickEvent>(event) {
        let outcome = state.inspector.pick(e.0);
        report_pick(state.status, &outcome);
        return Some(result);
    }
    if let Some(e) = downcast_event::<NudgePickEvent>(event) {
        match state.inspector.nudge(e.0) {
            Some(outcome) => report_pick(state.status, &outcome),
            None => state
                .status
                .set_message("You cannot use the arrow keys until a click has been made."),
        }
        return Some(result);
    }
    if let Some(e) = downcast_event::<ScreenNudgeEvent>(event) {
        let direction = e
            .0
            .flipped(state.viewport_state.flip_x, state.viewport_state.flip_y);
        debug!("Arrow {:?} -> image {:?}", e.0, direction);
        match state.inspector.nudge(direction) {
            Some(outcome) => report_pick(state.status, &outcome),
            None => state
                .status
                .set_message("You cannot use the arrow keys until a click has been made."),
        }
        return Some(result);
    }
    if let Some(e) = downcast_event::<DropTextEvent>(event) {
        match state.inspector.drop_text(&e.0) {
            Ok(outcome) => report_pick(state.status, &outcome),
            Err(err) => {
                warn!("Dropped text is not a pixel: {:#}", err);
                state.status.set_message(format!("{:#}", err));
            }
        }
        return Some(result);
    }
    if downcast_event::<CopyPickEvent>(event).is_some() {
        match state.inspector.drag_payload() {
            Some(text) => {
                debug!("Copy pick: {}", text);
                state.status.set_message(format!("Copied \"{}\"", text));
                result.copy_text = Some(text);
            }
            None => state.status.set_message("Nothing to copy: no successful pick yet"),
        }
        return Some(result);
    }

    // === Pick parameters ===
    if let Some(e) = downcast_event::<SetInterpretationEvent>(event) {
        state.inspector.set_interpretation(e.0);
        state.settings.interpretation = e.0;
        return Some(result);
    }
    if let Some(e) = downcast_event::<SetPatchRadiusEvent>(event) {
        state.inspector.set_patch_radius(e.0);
        state.settings.patch_radius = state.inspector.patch_radius();
        return Some(result);
    }
    if let Some(e) = downcast_event::<SelectLayerEvent>(event) {
        state.inspector.select_layer(e.0);
        state.settings.selected_layer = e.0;
        return Some(result);
    }

    // === Viewport ===
    if downcast_event::<FitViewportEvent>(event).is_some() {
        state.viewport_state.set_mode_fit();
        return Some(result);
    }
    if downcast_event::<Viewport100Event>(event).is_some() {
        state.viewport_state.set_mode_100();
        return Some(result);
    }
    if downcast_event::<ResetViewportEvent>(event).is_some() {
        state.viewport_state.reset();
        return Some(result);
    }
    if downcast_event::<FlipHorizontalEvent>(event).is_some() {
        state.viewport_state.toggle_flip_x();
        return Some(result);
    }
    if downcast_event::<FlipVerticalEvent>(event).is_some() {
        state.viewport_state.toggle_flip_y();
        return Some(result);
    }
    if downcast_event::<ToggleOverlayEvent>(event).is_some() {
        let layers = state.inspector.layers_mut();
        layers.overlay_visible = !layers.overlay_visible;
        return Some(result);
    }

    // === Windows ===
    if downcast_event::<ToggleHelpEvent>(event).is_some() {
        *state.show_help = !*state.show_help;
        return Some(result);
    }
    if downcast_event::<ToggleSettingsEvent>(event).is_some() {
        *state.show_settings = !*state.show_settings;
        return Some(result);
    }
    if downcast_event::<ToggleLayerPanelEvent>(event).is_some() {
        state.settings.show_layer_panel = !state.settings.show_layer_panel;
        return Some(result);
    }
    if downcast_event::<ResetSettingsEvent>(event).is_some() {
        result.reset_settings = true;
        return Some(result);
    }
    if downcast_event::<QuitEvent>(event).is_some() {
        result.quit = true;
        return Some(result);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{ColorImage, Direction, Interpretation, NnField, Point};

    struct Harness {
        inspector: Inspector,
        viewport_state: ViewportState,
        settings: AppSettings,
        status: StatusBar,
        show_help: bool,
        show_settings: bool,
    }

    impl Harness {
        fn new() -> Self {
            let mut inspector = Inspector::new();
            inspector.set_image(ColorImage::from_rgb(30, 30, vec![50; 30 * 30 * 3]).unwrap());
            let data = (0..30 * 30).flat_map(|_| [15.0f32, 15.0]).collect();
            inspector.set_field(NnField::new(30, 30, 2, data).unwrap());
            Self {
                inspector,
                viewport_state: ViewportState::new(),
                settings: AppSettings::default(),
                status: StatusBar::new(),
                show_help: false,
                show_settings: false,
            }
        }

        fn send<E: crate::core::event_bus::Event>(&mut self, event: E) -> Option<EventResult> {
            let boxed: BoxedEvent = Box::new(event);
            let mut state = AppState {
                inspector: &mut self.inspector,
                viewport_state: &mut self.viewport_state,
                settings: &mut self.settings,
                status: &mut self.status,
                show_help: &mut self.show_help,
                show_settings: &mut self.show_settings,
            };
            handle_app_event(&boxed, &mut state)
        }
    }

    #[test]
    fn pick_updates_status() {
        let mut h = Harness::new();
        h.send(PickEvent(Point::new(10, 10))).unwrap();
        assert_eq!(h.status.current_message, "Best match center: [15, 15]");
        h.send(PickEvent(Point::new(1, 1))).unwrap();
        assert!(h.status.current_message.starts_with("Picked patch that is not entirely inside image!"));
    }

    #[test]
    fn arrows_follow_flips() {
        let mut h = Harness::new();
        h.send(ScreenNudgeEvent(Direction::Up)).unwrap();
        assert_eq!(
            h.status.current_message,
            "You cannot use the arrow keys until a click has been made."
        );
        h.send(PickEvent(Point::new(10, 10))).unwrap();
        h.send(FlipVerticalEvent).unwrap();
        h.send(ScreenNudgeEvent(Direction::Up)).unwrap();
        assert_eq!(h.inspector.last_pick(), Some(Point::new(10, 11)));
    }

    #[test]
    fn copy_returns_payload() {
        let mut h = Harness::new();
        assert!(h.send(CopyPickEvent).unwrap().copy_text.is_none());
        h.send(SetInterpretationEvent(Interpretation::Offset)).unwrap();
        h.send(PickEvent(Point::new(10, 12))).unwrap();
        let r = h.send(CopyPickEvent).unwrap();
        assert_eq!(r.copy_text.as_deref(), Some("10 12 25 27"));
        assert_eq!(h.settings.interpretation, Interpretation::Offset);
    }

    #[test]
    fn open_without_path_asks_for_dialog() {
        let mut h = Harness::new();
        assert!(h.send(OpenImageEvent(None)).unwrap().show_image_dialog);
        assert!(h.send(OpenFieldEvent(None)).unwrap().show_field_dialog);
    }

    #[test]
    fn bad_dropped_file_reports_error() {
        let mut h = Harness::new();
        h.send(FilesDroppedEvent(vec![PathBuf::from("/nonexistent/x.mha")]))
            .unwrap();
        assert!(!h.status.current_message.is_empty());
        assert!(h.inspector.field().is_some());
        h.send(FilesDroppedEvent(vec![PathBuf::from("notes.txt")])).unwrap();
        assert_eq!(h.status.current_message, "Unsupported file: notes.txt");
    }

    #[test]
    fn toggles_and_quit() {
        let mut h = Harness::new();
        h.send(ToggleHelpEvent).unwrap();
        assert!(h.show_help);
        h.send(ToggleLayerPanelEvent).unwrap();
        assert!(!h.settings.show_layer_panel);
        assert!(h.send(QuitEvent).unwrap().quit);
        assert!(h.send(42u32).is_none());
    }
}
