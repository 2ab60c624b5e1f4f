//! Tanamap is a small interactive map viewer for Madagascar.
//!
//! The map canvas itself is rendered by [`galileo`] and embedded into an egui
//! application through [`galileo_egui`]. This crate only wires the view
//! together: two switchable base tile layers, a static coastal density
//! heatmap, click-to-place markers with popups, and a collapsible sidebar
//! with a (decorative) filter menu.

use std::sync::Arc;

use galileo::control::UserEventHandler;
use parking_lot::RwLock;

pub mod app;
pub mod config;
pub mod heatmap;
pub mod layers;
pub mod markers;
pub mod sidebar;

use app::MapApp;
use heatmap::HeatmapOptions;
use markers::Markers;

/// Builds the map and runs the application until the window is closed.
pub fn run() {
    let markers = Arc::new(RwLock::new(Markers::new()));
    let marker_layer = markers.read().layer();
    let handler = markers::click_handler(markers.clone());

    let (map, slots) = layers::build_map(marker_layer, HeatmapOptions::default());

    galileo_egui::InitBuilder::new(map)
        .with_handlers([Box::new(handler) as Box<dyn UserEventHandler>])
        .with_app_builder(move |egui_map_state| {
            Box::new(MapApp::new(egui_map_state, slots, markers))
        })
        .init()
        .expect("failed to initialize");
}
