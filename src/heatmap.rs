//! Static coastal density heatmap.
//!
//! The sample set is compiled in and never changes at runtime. Each sample is
//! drawn by [`HeatSymbol`] as a stack of concentric circles, from a wide
//! faint halo down to an opaque core, with colors picked from a five-stop
//! gradient keyed by normalized intensity. This approximates the
//! radius/blur/gradient rendering of raster heatmap layers without leaving
//! the vector symbol pipeline.

use galileo::layer::feature_layer::symbol::Symbol;
use galileo::layer::feature_layer::{Feature, FeatureLayer};
use galileo::render::point_paint::PointPaint;
use galileo::render::render_bundle::RenderBundle;
use galileo::Color;
use galileo_types::cartesian::{Point2, Point3};
use galileo_types::geo::Crs;
use galileo_types::geometry::Geom;
use galileo_types::geometry_type::CartesianSpace2d;
use galileo_types::latlon;

use crate::markers::wgs84_to_map;

/// Fixed coastal density samples as `(lat, lon, intensity)` triples, one per
/// coastal town, following the coastline clockwise from the northern tip.
pub const HEAT_SAMPLES: [(f64, f64, f64); 10] = [
    (-12.2787, 49.2917, 0.8), // Antsiranana
    (-14.2662, 50.1666, 0.5), // Sambava
    (-18.1492, 49.4023, 1.0), // Toamasina
    (-21.2300, 48.3439, 0.3), // Mananjary
    (-22.1451, 48.0115, 0.4), // Manakara
    (-25.0319, 46.9987, 0.7), // Taolagnaro
    (-23.3500, 43.6667, 0.8), // Toliara
    (-20.2833, 44.2833, 0.6), // Morondava
    (-15.7167, 46.3167, 0.7), // Mahajanga
    (-13.3123, 48.2604, 0.9), // Nosy Be
];

/// A single heat sample, projected into map coordinates.
pub struct HeatSample {
    position: Point2,
    intensity: f64,
}

impl HeatSample {
    /// Intensity of the sample in `[0, 1]`.
    pub fn intensity(&self) -> f64 {
        self.intensity
    }
}

impl Feature for HeatSample {
    type Geom = Point2;

    fn geometry(&self) -> &Self::Geom {
        &self.position
    }
}

/// A color stop of a heat gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    /// Normalized intensity this stop is keyed at.
    pub at: f64,
    /// RGB color at this stop.
    pub color: [u8; 3],
}

/// Five-stop color gradient keyed by normalized intensity.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    stops: [GradientStop; 5],
}

impl Default for Gradient {
    /// Blue through cyan, lime and yellow to red, with the conventional
    /// heatmap stop positions.
    fn default() -> Self {
        Self {
            stops: [
                GradientStop { at: 0.4, color: [0, 0, 255] },
                GradientStop { at: 0.6, color: [0, 255, 255] },
                GradientStop { at: 0.7, color: [0, 255, 0] },
                GradientStop { at: 0.8, color: [255, 255, 0] },
                GradientStop { at: 1.0, color: [255, 0, 0] },
            ],
        }
    }
}

impl Gradient {
    /// Color for a normalized intensity.
    ///
    /// Values between stops are linearly interpolated; values outside the
    /// first and last stop are clamped to their colors.
    pub fn color_at(&self, t: f64) -> [u8; 3] {
        let first = self.stops[0];
        if t <= first.at {
            return first.color;
        }

        for pair in self.stops.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            if t <= to.at {
                let k = (t - from.at) / (to.at - from.at);
                return lerp_color(from.color, to.color, k);
            }
        }

        self.stops[self.stops.len() - 1].color
    }
}

fn lerp_color(from: [u8; 3], to: [u8; 3], k: f64) -> [u8; 3] {
    let mut out = [0u8; 3];
    for (i, value) in out.iter_mut().enumerate() {
        *value = (from[i] as f64 + (to[i] as f64 - from[i] as f64) * k).round() as u8;
    }
    out
}

/// One circle of a rendered heat sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ring {
    /// Circle diameter in screen pixels.
    pub diameter: f32,
    /// RGB color of the circle.
    pub color: [u8; 3],
    /// Alpha of the circle.
    pub alpha: u8,
}

/// Rendering parameters of the heat layer.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapOptions {
    /// Radius of a sample's core circle in screen pixels.
    pub radius: f32,
    /// Extra radius the halo extends beyond the core.
    pub blur: f32,
    /// Intensity that maps to the top of the gradient. Sample intensities
    /// are normalized against this value before the gradient lookup.
    pub max_intensity: f64,
    /// Color gradient keyed by normalized intensity.
    pub gradient: Gradient,
}

impl Default for HeatmapOptions {
    fn default() -> Self {
        Self {
            radius: 25.0,
            blur: 15.0,
            max_intensity: 1.0,
            gradient: Gradient::default(),
        }
    }
}

impl HeatmapOptions {
    /// Circles to draw for a sample of the given intensity, ordered from the
    /// outermost halo to the core so later circles paint on top.
    pub fn rings(&self, intensity: f64) -> [Ring; 3] {
        let t = (intensity / self.max_intensity).clamp(0.0, 1.0);
        let color = self.gradient.color_at(t);
        let alpha = (40.0 + t * 180.0).round() as u8;

        [
            Ring {
                diameter: 2.0 * (self.radius + self.blur),
                color,
                alpha: alpha / 4,
            },
            Ring {
                diameter: 2.0 * (self.radius + self.blur / 2.0),
                color,
                alpha: alpha / 2,
            },
            Ring {
                diameter: 2.0 * self.radius,
                color,
                alpha,
            },
        ]
    }
}

/// Renders a heat sample as the circles produced by [`HeatmapOptions::rings`].
pub struct HeatSymbol {
    options: HeatmapOptions,
}

impl HeatSymbol {
    /// Creates a symbol with the given rendering parameters.
    pub fn new(options: HeatmapOptions) -> Self {
        Self { options }
    }
}

impl Symbol<HeatSample> for HeatSymbol {
    fn render(
        &self,
        feature: &HeatSample,
        geometry: &Geom<Point3>,
        min_resolution: f64,
        bundle: &mut RenderBundle,
    ) {
        if let Geom::Point(point) = geometry {
            for ring in self.options.rings(feature.intensity()) {
                let [r, g, b] = ring.color;
                bundle.add_point(
                    point,
                    &PointPaint::circle(Color::rgba(r, g, b, ring.alpha), ring.diameter),
                    min_resolution,
                );
            }
        }
    }
}

/// The sample set projected into map coordinates.
pub fn projected_samples() -> Vec<HeatSample> {
    let projection = wgs84_to_map().expect("no projection between WGS84 and EPSG:3857");
    HEAT_SAMPLES
        .iter()
        .map(|&(lat, lon, intensity)| HeatSample {
            position: projection
                .project(&latlon!(lat, lon))
                .expect("sample cannot be projected"),
            intensity,
        })
        .collect()
}

/// Builds the heat feature layer from the compiled-in sample set.
pub fn heat_layer(
    options: HeatmapOptions,
) -> FeatureLayer<Point2, HeatSample, HeatSymbol, CartesianSpace2d> {
    FeatureLayer::new(projected_samples(), HeatSymbol::new(options), Crs::EPSG3857)
}
