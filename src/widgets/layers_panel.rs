//! Layer chooser side panel.
//!
//! Radio buttons for the base layer, the overlay toggle and the pick
//! parameters. Changes go out as events; nothing is mutated here.

use eframe::egui;

use crate::entities::inspector::MAX_PATCH_RADIUS;
use crate::entities::inspector_events::{SelectLayerEvent, SetInterpretationEvent, SetPatchRadiusEvent};
use crate::entities::{Inspector, Interpretation, LayerKind};
use crate::widgets::actions::ActionQueue;
use crate::widgets::viewport::viewport_events::ToggleOverlayEvent;

pub fn render(ui: &mut egui::Ui, inspector: &Inspector) -> ActionQueue {
    let mut actions = ActionQueue::new();

    ui.heading("Layers");
    ui.add_space(4.0);
    let selected = inspector.selected_layer();
    for kind in LayerKind::ALL {
        let loaded = inspector.layers().layer(kind).is_some();
        let resp = ui.add_enabled(loaded, egui::RadioButton::new(selected == kind, kind.label()));
        if resp.clicked() && selected != kind {
            actions.send(SelectLayerEvent(kind));
        }
    }

    ui.add_space(4.0);
    let mut overlay = inspector.layers().overlay_visible;
    let has_pick = inspector.last_result().is_some();
    if ui
        .add_enabled(has_pick, egui::Checkbox::new(&mut overlay, "Pick overlay"))
        .changed()
    {
        actions.send(ToggleOverlayEvent);
    }

    ui.separator();
    ui.heading("Pick");
    ui.add_space(4.0);

    let mut interpretation = inspector.interpretation();
    ui.label("Field values are:");
    ui.radio_value(&mut interpretation, Interpretation::Absolute, "Absolute");
    ui.radio_value(&mut interpretation, Interpretation::Offset, "Offset");
    if interpretation != inspector.interpretation() {
        actions.send(SetInterpretationEvent(interpretation));
    }

    let mut radius = inspector.patch_radius();
    ui.horizontal(|ui| {
        ui.label("Patch radius:");
        ui.add(
            egui::DragValue::new(&mut radius)
                .range(1..=MAX_PATCH_RADIUS)
                .suffix(" px"),
        );
    });
    if radius != inspector.patch_radius() {
        actions.send(SetPatchRadiusEvent(radius));
    }

    if let Some(r) = inspector.last_result() {
        ui.separator();
        ui.monospace(format!("Pick:  {}", r.pick));
        ui.monospace(format!("Match: {}", r.match_center));
        if r.matched_clipped {
            ui.weak("Matched patch is clipped");
        }
    }

    actions
}
