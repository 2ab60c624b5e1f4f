//! Map construction and layer visibility control.
//!
//! The map carries four layers at fixed slots: two base raster tile layers
//! (OpenStreetMap and OpenTopoMap, mutually exclusive) and two overlays (the
//! heatmap and the markers, independently toggleable). Visibility lives in
//! the map's own layer collection; [`LayerSlots`] only knows the indices.

use std::sync::Arc;

use galileo::layer::raster_tile_layer::RasterTileLayerBuilder;
use galileo::tile_schema::TileIndex;
use galileo::{Map, MapBuilder};
use parking_lot::RwLock;

use crate::config;
use crate::heatmap::{self, HeatmapOptions};
use crate::markers::MarkerLayer;

/// The two base raster layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseLayer {
    /// OpenStreetMap street tiles.
    Streets,
    /// OpenTopoMap topographic tiles.
    Topo,
}

impl BaseLayer {
    /// Human-readable name shown in the layer control.
    pub fn label(&self) -> &'static str {
        match self {
            BaseLayer::Streets => "OpenStreetMap",
            BaseLayer::Topo => "OpenTopoMap",
        }
    }
}

/// The two overlay layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    /// Coastal density heatmap.
    Heat,
    /// User-placed markers.
    Markers,
}

impl Overlay {
    /// Human-readable name shown in the layer control.
    pub fn label(&self) -> &'static str {
        match self {
            Overlay::Heat => "Heatmap",
            Overlay::Markers => "Markers",
        }
    }
}

/// Indices of the application layers in the map's layer collection.
#[derive(Debug, Clone, Copy)]
pub struct LayerSlots {
    streets: usize,
    topo: usize,
    heat: usize,
    markers: usize,
}

impl Default for LayerSlots {
    fn default() -> Self {
        // Matches the order layers are added in `build_map`.
        Self {
            streets: 0,
            topo: 1,
            heat: 2,
            markers: 3,
        }
    }
}

impl LayerSlots {
    /// Hides the layers that start out invisible. Call once after the map
    /// is built.
    pub fn init_visibility(&self, map: &mut Map) {
        map.layers_mut().hide(self.topo);
    }

    /// The currently visible base layer.
    pub fn active_base(&self, map: &Map) -> BaseLayer {
        if map.layers().is_visible(self.streets) {
            BaseLayer::Streets
        } else {
            BaseLayer::Topo
        }
    }

    /// Swaps the visible base layer for the other one and returns the layer
    /// that is now showing. Exactly one base layer is visible afterwards.
    pub fn toggle_base(&self, map: &mut Map) -> BaseLayer {
        let layers = map.layers_mut();
        if layers.is_visible(self.streets) {
            layers.hide(self.streets);
            layers.show(self.topo);
            BaseLayer::Topo
        } else {
            layers.hide(self.topo);
            layers.show(self.streets);
            BaseLayer::Streets
        }
    }

    /// Whether the given overlay is visible.
    pub fn is_overlay_visible(&self, map: &Map, overlay: Overlay) -> bool {
        map.layers().is_visible(self.overlay_index(overlay))
    }

    /// Shows or hides the given overlay without touching any other layer.
    pub fn set_overlay_visible(&self, map: &mut Map, overlay: Overlay, visible: bool) {
        let index = self.overlay_index(overlay);
        if visible {
            map.layers_mut().show(index);
        } else {
            map.layers_mut().hide(index);
        }
    }

    fn overlay_index(&self, overlay: Overlay) -> usize {
        match overlay {
            Overlay::Heat => self.heat,
            Overlay::Markers => self.markers,
        }
    }
}

/// Builds the map with all four layers attached and the initial viewport
/// centered on Madagascar.
pub fn build_map(
    marker_layer: Arc<RwLock<MarkerLayer>>,
    heat_options: HeatmapOptions,
) -> (Map, LayerSlots) {
    let streets = RasterTileLayerBuilder::new_osm()
        .with_file_cache_checked(config::TILE_CACHE_PATH)
        .build()
        .expect("failed to create OpenStreetMap layer");

    let topo = RasterTileLayerBuilder::new_rest(|&index: &TileIndex| {
        format!(
            "{base}/{z}/{x}/{y}.png",
            base = config::OPENTOPO_URL,
            z = index.z,
            x = index.x,
            y = index.y
        )
    })
    .with_attribution(
        config::OPENTOPO_ATTRIBUTION.to_string(),
        config::OPENTOPO_ATTRIBUTION_URL.to_string(),
    )
    .with_file_cache_checked(config::TILE_CACHE_PATH)
    .build()
    .expect("failed to create OpenTopoMap layer");

    let mut map = MapBuilder::default()
        .with_latlon(config::MAP_CENTER_LAT, config::MAP_CENTER_LON)
        .with_z_level(config::INITIAL_Z_LEVEL)
        .with_layer(streets)
        .with_layer(topo)
        .with_layer(heatmap::heat_layer(heat_options))
        .with_layer(marker_layer)
        .build();

    let slots = LayerSlots::default();
    slots.init_visibility(&mut map);

    (map, slots)
}

#[cfg(test)]
mod tests {
    use galileo::layer::FeatureLayer;
    use galileo::symbol::CirclePointSymbol;
    use galileo::Color;
    use galileo_types::cartesian::Point2;
    use galileo_types::geo::Crs;
    use galileo_types::geometry_type::CartesianSpace2d;

    use super::*;

    type StubLayer = FeatureLayer<Point2, Point2, CirclePointSymbol, CartesianSpace2d>;

    fn stub_layer() -> StubLayer {
        FeatureLayer::new(vec![], CirclePointSymbol::new(Color::BLUE, 5.0), Crs::EPSG3857)
    }

    /// A map with four stand-in layers in the slot order of `build_map`.
    fn test_map() -> (Map, LayerSlots) {
        let mut map = MapBuilder::default()
            .with_latlon(config::MAP_CENTER_LAT, config::MAP_CENTER_LON)
            .with_z_level(config::INITIAL_Z_LEVEL)
            .with_layer(stub_layer())
            .with_layer(stub_layer())
            .with_layer(stub_layer())
            .with_layer(stub_layer())
            .build();

        let slots = LayerSlots::default();
        slots.init_visibility(&mut map);
        (map, slots)
    }

    fn visible_base_count(map: &Map, slots: &LayerSlots) -> usize {
        [slots.streets, slots.topo]
            .iter()
            .filter(|&&index| map.layers().is_visible(index))
            .count()
    }

    #[test]
    fn streets_base_is_visible_initially() {
        let (map, slots) = test_map();
        assert_eq!(slots.active_base(&map), BaseLayer::Streets);
        assert_eq!(visible_base_count(&map, &slots), 1);
    }

    #[test]
    fn base_toggle_swaps_and_round_trips() {
        let (mut map, slots) = test_map();

        assert_eq!(slots.toggle_base(&mut map), BaseLayer::Topo);
        assert_eq!(slots.active_base(&map), BaseLayer::Topo);
        assert_eq!(visible_base_count(&map, &slots), 1);

        assert_eq!(slots.toggle_base(&mut map), BaseLayer::Streets);
        assert_eq!(slots.active_base(&map), BaseLayer::Streets);
        assert_eq!(visible_base_count(&map, &slots), 1);
    }

    #[test]
    fn odd_toggle_count_shows_the_alternate_base() {
        let (mut map, slots) = test_map();
        for _ in 0..5 {
            slots.toggle_base(&mut map);
        }
        assert_eq!(slots.active_base(&map), BaseLayer::Topo);
        assert_eq!(visible_base_count(&map, &slots), 1);
    }

    #[test]
    fn overlays_start_visible_and_toggle_independently() {
        let (mut map, slots) = test_map();

        assert!(slots.is_overlay_visible(&map, Overlay::Heat));
        assert!(slots.is_overlay_visible(&map, Overlay::Markers));

        slots.set_overlay_visible(&mut map, Overlay::Heat, false);
        assert!(!slots.is_overlay_visible(&map, Overlay::Heat));
        assert!(slots.is_overlay_visible(&map, Overlay::Markers));

        slots.set_overlay_visible(&mut map, Overlay::Heat, true);
        assert!(slots.is_overlay_visible(&map, Overlay::Heat));
    }

    #[test]
    fn overlay_toggles_do_not_affect_base_layers() {
        let (mut map, slots) = test_map();

        slots.set_overlay_visible(&mut map, Overlay::Heat, false);
        slots.set_overlay_visible(&mut map, Overlay::Markers, false);

        assert_eq!(slots.active_base(&map), BaseLayer::Streets);
        assert_eq!(visible_base_count(&map, &slots), 1);
    }
}
