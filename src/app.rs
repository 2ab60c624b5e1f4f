//! The egui application: map widget, layer control, popups and sidebar.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use egui::{Align2, Pos2, Rect};
use galileo_egui::{EguiMap, EguiMapState};
use galileo_types::cartesian::{CartesianPoint2d, Point2};
use parking_lot::RwLock;

use crate::layers::{LayerSlots, Overlay};
use crate::markers::{wgs84_to_map, DeleteRequest, MarkerId, Markers};
use crate::sidebar::SidebarState;

/// The top-level application.
pub struct MapApp {
    map: EguiMapState,
    slots: LayerSlots,
    markers: Arc<RwLock<Markers>>,
    sidebar: SidebarState,
    delete_tx: Sender<DeleteRequest>,
    delete_rx: Receiver<DeleteRequest>,
}

impl MapApp {
    /// Creates the application around an initialized map state.
    pub fn new(map: EguiMapState, slots: LayerSlots, markers: Arc<RwLock<Markers>>) -> Self {
        let (delete_tx, delete_rx) = mpsc::channel();
        Self {
            map,
            slots,
            markers,
            sidebar: SidebarState::default(),
            delete_tx,
            delete_rx,
        }
    }

    fn drain_delete_requests(&mut self) {
        for DeleteRequest(id) in self.delete_rx.try_iter() {
            if self.markers.write().remove(id) {
                log::info!("Removed marker {id:?}");
                self.map.request_redraw();
            }
        }
    }

    fn show_layer_control(&mut self, ctx: &egui::Context) {
        egui::Window::new("layer-control")
            .title_bar(false)
            .resizable(false)
            .anchor(Align2::RIGHT_TOP, [-10.0, 10.0])
            .show(ctx, |ui| {
                let active = self.slots.active_base(self.map.map());
                if ui
                    .button(format!("Base: {}", active.label()))
                    .on_hover_text("Toggle base map")
                    .clicked()
                {
                    let switched = self.slots.toggle_base(self.map.map_mut());
                    log::info!("Switched base layer to {}", switched.label());
                    self.map.request_redraw();
                }

                ui.separator();

                for overlay in [Overlay::Heat, Overlay::Markers] {
                    let mut visible = self.slots.is_overlay_visible(self.map.map(), overlay);
                    if ui.checkbox(&mut visible, overlay.label()).changed() {
                        self.slots
                            .set_overlay_visible(self.map.map_mut(), overlay, visible);
                        self.map.request_redraw();
                    }
                }
            });
    }

    fn show_popups(&mut self, ctx: &egui::Context, map_rect: Rect) {
        let view = self.map.map().view();
        let Some(center_geo) = view.position() else {
            return;
        };
        let Some(projection) = wgs84_to_map() else {
            return;
        };
        let Some(center) = projection.project(&center_geo) else {
            return;
        };
        let resolution = view.resolution();

        let mut closed: Vec<MarkerId> = Vec::new();

        {
            let markers = self.markers.read();
            for marker in markers.markers().iter().filter(|m| m.popup_open()) {
                let anchor = screen_position(map_rect, &center, resolution, marker.position());
                if !map_rect.contains(anchor) {
                    continue;
                }

                egui::Area::new(egui::Id::new(("marker-popup", marker.id())))
                    .pivot(Align2::CENTER_BOTTOM)
                    .fixed_pos(anchor - egui::vec2(0.0, 14.0))
                    .show(ctx, |ui| {
                        egui::Frame::popup(ui.style()).show(ui, |ui| {
                            ui.strong("Point of Interest");
                            ui.label(marker.label());
                            ui.horizontal(|ui| {
                                if ui.button("Delete").clicked() {
                                    let _ = self.delete_tx.send(DeleteRequest(marker.id()));
                                }
                                if ui.button("Close").clicked() {
                                    closed.push(marker.id());
                                }
                            });
                        });
                    });
            }
        }

        if !closed.is_empty() {
            let mut markers = self.markers.write();
            for id in closed {
                markers.set_popup_open(id, false);
            }
        }
    }
}

impl eframe::App for MapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_delete_requests();
        self.sidebar.show(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            let map_rect = ui.max_rect();
            EguiMap::new(&mut self.map).show_ui(ui);
            self.show_layer_control(ctx);
            self.show_popups(ctx, map_rect);
        });
    }
}

/// Screen position of a map point, given the rectangle the map is drawn into
/// and the map's current center and resolution.
///
/// The view center lands on the center of the rectangle; x offsets grow to
/// the right and y offsets are inverted because map coordinates grow north
/// while screen coordinates grow down. Rotation is not accounted for.
fn screen_position(map_rect: Rect, center: &Point2, resolution: f64, target: &Point2) -> Pos2 {
    let dx = (target.x() - center.x()) / resolution;
    let dy = (center.y() - target.y()) / resolution;
    map_rect.center() + egui::vec2(dx as f32, dy as f32)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn rect() -> Rect {
        Rect::from_min_size(Pos2::new(100.0, 50.0), egui::vec2(800.0, 600.0))
    }

    #[test]
    fn view_center_maps_to_rect_center() {
        let center = Point2::new(1000.0, 2000.0);
        let pos = screen_position(rect(), &center, 10.0, &center);
        assert_abs_diff_eq!(pos.x, 500.0);
        assert_abs_diff_eq!(pos.y, 350.0);
    }

    #[test]
    fn offsets_scale_with_resolution_and_invert_y() {
        let center = Point2::new(0.0, 0.0);
        // 100 map units east and 200 north at 10 units per pixel.
        let target = Point2::new(100.0, 200.0);
        let pos = screen_position(rect(), &center, 10.0, &target);
        assert_abs_diff_eq!(pos.x, 510.0);
        assert_abs_diff_eq!(pos.y, 330.0);
    }
}
