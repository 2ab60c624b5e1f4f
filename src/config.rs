//! Fixed application parameters: the initial viewport and tile sources.

/// Latitude of the initial view center (Antananarivo).
pub const MAP_CENTER_LAT: f64 = -18.8792;

/// Longitude of the initial view center.
pub const MAP_CENTER_LON: f64 = 47.5079;

/// Initial zoom level of the map.
pub const INITIAL_Z_LEVEL: u32 = 7;

/// Directory used by the tile layers to cache downloaded tiles.
pub const TILE_CACHE_PATH: &str = ".tile_cache";

/// URL template arguments are filled in per tile index in
/// [`crate::layers::build_map`].
pub const OPENTOPO_URL: &str = "https://tile.opentopomap.org";

/// Attribution text required by the OpenTopoMap terms of use.
pub const OPENTOPO_ATTRIBUTION: &str = "© OpenTopoMap contributors";

/// Link target for the OpenTopoMap attribution.
pub const OPENTOPO_ATTRIBUTION_URL: &str = "https://opentopomap.org/copyright";
