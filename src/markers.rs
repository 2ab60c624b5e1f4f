//! User-placed point markers.
//!
//! Markers live in a single Galileo feature layer for rendering, while this
//! module keeps the bookkeeping needed for popups: the geographic position,
//! the popup label and whether the popup is currently open. A click on the
//! map creates a marker with its popup open; the popup's Delete button sends
//! a [`DeleteRequest`] that the application drains once per frame.

use std::sync::Arc;

use galileo::control::{EventPropagation, MouseButton, UserEvent, UserEventHandler};
use galileo::layer::feature_layer::symbol::Symbol;
use galileo::layer::feature_layer::{Feature, FeatureId, FeatureLayer};
use galileo::render::point_paint::PointPaint;
use galileo::render::render_bundle::RenderBundle;
use galileo::{Color, Map};
use galileo_types::cartesian::{Point2, Point3};
use galileo_types::geo::impls::GeoPoint2d;
use galileo_types::geo::{Crs, GeoPoint, Projection};
use galileo_types::geometry::Geom;
use galileo_types::geometry_type::CartesianSpace2d;
use parking_lot::RwLock;

/// Identity of a placed marker, unique for the lifetime of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerId(u64);

/// Request to remove a marker, sent by the popup's Delete button.
///
/// The channel decouples popup rendering from the marker layer mutation:
/// the popup only knows the marker's identity, not the layer it lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteRequest(pub MarkerId);

/// The feature stored in the marker layer. Rendering only needs the
/// projected position; everything else lives in [`PlacedMarker`].
pub struct MarkerFeature {
    position: Point2,
}

impl Feature for MarkerFeature {
    type Geom = Point2;

    fn geometry(&self) -> &Self::Geom {
        &self.position
    }
}

/// Draws a marker as a filled circle with a white outline ring.
pub struct MarkerSymbol {
    fill: Color,
    outline: Color,
    diameter: f32,
}

impl Default for MarkerSymbol {
    fn default() -> Self {
        Self {
            fill: Color::rgba(214, 41, 62, 255),
            outline: Color::WHITE,
            diameter: 12.0,
        }
    }
}

impl Symbol<MarkerFeature> for MarkerSymbol {
    fn render(
        &self,
        _feature: &MarkerFeature,
        geometry: &Geom<Point3>,
        min_resolution: f64,
        bundle: &mut RenderBundle,
    ) {
        if let Geom::Point(point) = geometry {
            bundle.add_point(
                point,
                &PointPaint::circle(self.outline, self.diameter + 4.0),
                min_resolution,
            );
            bundle.add_point(
                point,
                &PointPaint::circle(self.fill, self.diameter),
                min_resolution,
            );
        }
    }
}

/// Feature layer type holding the markers.
pub type MarkerLayer = FeatureLayer<Point2, MarkerFeature, MarkerSymbol, CartesianSpace2d>;

/// A marker the user has placed, with the state its popup needs.
#[derive(Debug, Clone)]
pub struct PlacedMarker {
    id: MarkerId,
    feature_id: FeatureId,
    position: Point2,
    lat: f64,
    lon: f64,
    label: String,
    popup_open: bool,
}

impl PlacedMarker {
    /// Identity of the marker.
    pub fn id(&self) -> MarkerId {
        self.id
    }

    /// Position in map (EPSG:3857) coordinates.
    pub fn position(&self) -> &Point2 {
        &self.position
    }

    /// Latitude of the marker in degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude of the marker in degrees.
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Text shown in the marker popup.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether the popup is currently open.
    pub fn popup_open(&self) -> bool {
        self.popup_open
    }
}

/// Owns the marker feature layer and the popup bookkeeping.
///
/// Every tracked marker has exactly one feature in the layer; the two are
/// added and removed together so they cannot drift apart.
pub struct Markers {
    layer: Arc<RwLock<MarkerLayer>>,
    placed: Vec<PlacedMarker>,
    next_id: u64,
}

impl Markers {
    /// Creates an empty marker set with its (empty) feature layer.
    pub fn new() -> Self {
        let layer = FeatureLayer::new(vec![], MarkerSymbol::default(), Crs::EPSG3857);
        Self {
            layer: Arc::new(RwLock::new(layer)),
            placed: Vec::new(),
            next_id: 0,
        }
    }

    /// The feature layer to add to the map.
    pub fn layer(&self) -> Arc<RwLock<MarkerLayer>> {
        self.layer.clone()
    }

    /// Places a new marker at the given map (EPSG:3857) position and opens
    /// its popup, closing any other open popup.
    ///
    /// Returns `None` if the position cannot be unprojected to geographic
    /// coordinates, in which case nothing is changed.
    pub fn place(&mut self, position: Point2) -> Option<MarkerId> {
        let projection = wgs84_to_map()?;
        let geo = projection.unproject(&position)?;
        let label = popup_label(geo.lat(), geo.lon());

        let feature_id = {
            let mut layer = self.layer.write();
            let feature_id = layer.features_mut().add(MarkerFeature { position });
            layer.update_feature(feature_id);
            feature_id
        };

        for marker in &mut self.placed {
            marker.popup_open = false;
        }

        let id = MarkerId(self.next_id);
        self.next_id += 1;
        self.placed.push(PlacedMarker {
            id,
            feature_id,
            position,
            lat: geo.lat(),
            lon: geo.lon(),
            label,
            popup_open: true,
        });

        Some(id)
    }

    /// Removes the marker with the given identity.
    ///
    /// Removing an unknown identity is a no-op; at most one marker is ever
    /// removed. Returns whether a marker was removed.
    pub fn remove(&mut self, id: MarkerId) -> bool {
        let Some(index) = self.placed.iter().position(|marker| marker.id == id) else {
            return false;
        };

        let removed = self.placed.remove(index);
        let mut layer = self.layer.write();
        layer.features_mut().remove(removed.feature_id);
        layer.update_feature(removed.feature_id);

        true
    }

    /// Opens or closes the popup of the given marker. Unknown ids are ignored.
    pub fn set_popup_open(&mut self, id: MarkerId, open: bool) {
        if let Some(marker) = self.placed.iter_mut().find(|marker| marker.id == id) {
            marker.popup_open = open;
        }
    }

    /// All placed markers, in placement order.
    pub fn markers(&self) -> &[PlacedMarker] {
        &self.placed
    }

    /// Number of placed markers.
    pub fn len(&self) -> usize {
        self.placed.len()
    }

    /// Whether no markers are placed.
    pub fn is_empty(&self) -> bool {
        self.placed.is_empty()
    }
}

impl Default for Markers {
    fn default() -> Self {
        Self::new()
    }
}

/// Map click handler that places a marker at the clicked position.
pub fn click_handler(markers: Arc<RwLock<Markers>>) -> impl UserEventHandler {
    move |ev: &UserEvent, map: &mut Map| {
        if let UserEvent::Click(MouseButton::Left, event) = ev {
            let Some(position) = map.view().screen_to_map(event.screen_pointer_position) else {
                return EventPropagation::Stop;
            };

            match markers.write().place(position) {
                Some(id) => {
                    log::info!("Placed marker {id:?} at {position:?}");
                    map.redraw();
                }
                None => log::warn!("Click at {position:?} cannot be unprojected, ignoring"),
            }

            return EventPropagation::Stop;
        }

        EventPropagation::Propagate
    }
}

/// Popup text for a marker at the given geographic position.
pub fn popup_label(lat: f64, lon: f64) -> String {
    format!("Coordinates: {lat:.4}, {lon:.4}")
}

/// Projection between geographic WGS84 coordinates and the map's EPSG:3857
/// coordinates.
pub(crate) fn wgs84_to_map() -> Option<Box<dyn Projection<InPoint = GeoPoint2d, OutPoint = Point2>>>
{
    Crs::EPSG3857.get_projection()
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use galileo_types::latlon;

    use super::*;

    fn project(lat: f64, lon: f64) -> Point2 {
        wgs84_to_map()
            .expect("no projection")
            .project(&latlon!(lat, lon))
            .expect("point cannot be projected")
    }

    #[test]
    fn placing_a_marker_opens_its_popup_with_coordinate_label() {
        let mut markers = Markers::new();
        let id = markers.place(project(-20.0, 46.0)).expect("marker not placed");

        assert_eq!(markers.len(), 1);
        let marker = &markers.markers()[0];
        assert_eq!(marker.id(), id);
        assert!(marker.popup_open());
        assert_eq!(marker.label(), "Coordinates: -20.0000, 46.0000");
        assert_abs_diff_eq!(marker.lat(), -20.0, epsilon = 1e-9);
        assert_abs_diff_eq!(marker.lon(), 46.0, epsilon = 1e-9);
    }

    #[test]
    fn placing_a_second_marker_closes_the_first_popup() {
        let mut markers = Markers::new();
        let first = markers.place(project(-20.0, 46.0)).expect("marker not placed");
        let second = markers.place(project(-18.0, 47.0)).expect("marker not placed");

        assert_ne!(first, second);
        assert_eq!(markers.len(), 2);
        assert!(!markers.markers()[0].popup_open());
        assert!(markers.markers()[1].popup_open());
    }

    #[test]
    fn removing_a_marker_removes_exactly_that_marker() {
        let mut markers = Markers::new();
        let first = markers.place(project(-20.0, 46.0)).expect("marker not placed");
        let second = markers.place(project(-18.0, 47.0)).expect("marker not placed");

        assert!(markers.remove(first));
        assert_eq!(markers.len(), 1);
        assert_eq!(markers.markers()[0].id(), second);
    }

    #[test]
    fn removing_an_unknown_id_is_a_silent_no_op() {
        let mut markers = Markers::new();
        let id = markers.place(project(-20.0, 46.0)).expect("marker not placed");
        assert!(markers.remove(id));

        assert!(!markers.remove(id));
        assert!(markers.is_empty());
    }

    #[test]
    fn popup_can_be_closed_and_reopened() {
        let mut markers = Markers::new();
        let id = markers.place(project(-20.0, 46.0)).expect("marker not placed");

        markers.set_popup_open(id, false);
        assert!(!markers.markers()[0].popup_open());

        markers.set_popup_open(id, true);
        assert!(markers.markers()[0].popup_open());
    }

    #[test]
    fn popup_label_rounds_to_four_decimal_places() {
        assert_eq!(
            popup_label(-18.87919999, 47.50791111),
            "Coordinates: -18.8792, 47.5079"
        );
    }
}
