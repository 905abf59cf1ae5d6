//! Core-Domänentypen: Vertices, Polylinien, WayMap, Geometrie, Projektion, Spatial-Index.

pub mod edit;
pub mod geometry;
pub mod polyline;
pub mod projection;
pub mod repository;
pub mod spatial;
pub mod vertex;
pub mod way_map;
pub mod world;

pub use edit::{CommandSink, EditBatch, EditOperation};
pub use geometry::AngleAnchor;
pub use polyline::{same_edge, EdgeRef, Polyline};
pub use projection::{MapView, Projection};
pub use repository::WayRepository;
pub use spatial::{SpatialIndex, SpatialMatch};
pub use vertex::Vertex;
pub use way_map::WayMap;
pub use world::{WorldBounds, WorldCheck};
