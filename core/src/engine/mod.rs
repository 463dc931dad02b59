//! Abstraction over the remote geometry engine.
//!
//! The engine owns the design being edited and the target it is compared
//! against. This crate only ever sees it through [`GeometryEngine`]: the HTTP
//! client in the server binary talks to a real one, [`MemoryEngine`] stands in
//! for it in tests.

pub mod memory;
pub use memory::{EngineCall, MemoryEngine};

use crate::action::{ExtrudeAction, FaceId};
use crate::error::EngineResult;
use crate::geometry::{BoundingBox, Point3};
use crate::operation::Operation;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// Face-adjacency graph of a design, in the engine's node-link layout.
///
/// Opaque apart from the node ids; everything else is passed through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub directed: bool,
    #[serde(default)]
    pub multigraph: bool,
    #[serde(default)]
    pub graph: serde_json::Map<String, Value>,
    #[serde(default)]
    pub nodes: Vec<Value>,
    #[serde(default)]
    pub links: Vec<Value>,
}

impl Graph {
    /// Graph of an empty design, used before the first extrude.
    pub fn empty() -> Self {
        Self {
            directed: false,
            multigraph: false,
            graph: serde_json::Map::new(),
            nodes: Vec::new(),
            links: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node ids that parse as face identifiers.
    pub fn face_ids(&self) -> Vec<FaceId> {
        self.nodes
            .iter()
            .filter_map(|node| node.get("id")?.as_str()?.parse().ok())
            .collect()
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::empty()
    }
}

/// Result of an extrude the engine accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extruded {
    pub graph: Graph,
    /// Intersection over union of the current design against the target.
    pub iou: f64,
}

/// What the engine reports after loading a target design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetInfo {
    pub graph: Graph,
    pub bounding_box: BoundingBox,
}

/// Layout of a graph snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GraphFormat {
    PerFace,
    PerExtrude,
}

impl GraphFormat {
    pub fn name(&self) -> &'static str {
        match self {
            Self::PerFace => "PerFace",
            Self::PerExtrude => "PerExtrude",
        }
    }
}

/// Calls the environment makes against a geometry engine.
///
/// Implementations report failures faithfully. Deciding which failures are
/// fatal is left to [`SearchEnvironment`](crate::env::SearchEnvironment).
pub trait GeometryEngine {
    /// Load a target design and clear the working design.
    fn set_target(&mut self, file: &Path) -> EngineResult<TargetInfo>;

    /// Throw away all modelling since the target was set.
    fn revert_to_target(&mut self) -> EngineResult<Graph>;

    /// Extrude between two faces of the target.
    fn extrude(&mut self, start_face: &FaceId, end_face: &FaceId, operation: Operation) -> EngineResult<Extruded>;

    /// Apply several extrudes in one round trip, optionally reverting first.
    fn extrudes(&mut self, actions: &[ExtrudeAction], revert: bool) -> EngineResult<Extruded>;

    fn screenshot(&mut self, file: &Path) -> EngineResult<()>;

    // === Sketch construction ===

    /// Start a sketch on a named construction plane; returns the sketch name.
    fn add_sketch(&mut self, plane: &str) -> EngineResult<String>;

    fn add_point(&mut self, sketch_name: &str, point: &Point3) -> EngineResult<()>;

    /// Close the open point chain into profiles; returns the profile ids.
    fn close_profile(&mut self, sketch_name: &str) -> EngineResult<Vec<String>>;

    fn add_extrude(
        &mut self,
        sketch_name: &str,
        profile_id: &str,
        distance: f64,
        operation: Operation,
    ) -> EngineResult<()>;

    /// Snapshot of the working design.
    fn graph(&mut self, format: GraphFormat) -> EngineResult<Graph>;
}

impl<E: GeometryEngine + ?Sized> GeometryEngine for Box<E> {
    fn set_target(&mut self, file: &Path) -> EngineResult<TargetInfo> {
        (**self).set_target(file)
    }

    fn revert_to_target(&mut self) -> EngineResult<Graph> {
        (**self).revert_to_target()
    }

    fn extrude(&mut self, start_face: &FaceId, end_face: &FaceId, operation: Operation) -> EngineResult<Extruded> {
        (**self).extrude(start_face, end_face, operation)
    }

    fn extrudes(&mut self, actions: &[ExtrudeAction], revert: bool) -> EngineResult<Extruded> {
        (**self).extrudes(actions, revert)
    }

    fn screenshot(&mut self, file: &Path) -> EngineResult<()> {
        (**self).screenshot(file)
    }

    fn add_sketch(&mut self, plane: &str) -> EngineResult<String> {
        (**self).add_sketch(plane)
    }

    fn add_point(&mut self, sketch_name: &str, point: &Point3) -> EngineResult<()> {
        (**self).add_point(sketch_name, point)
    }

    fn close_profile(&mut self, sketch_name: &str) -> EngineResult<Vec<String>> {
        (**self).close_profile(sketch_name)
    }

    fn add_extrude(
        &mut self,
        sketch_name: &str,
        profile_id: &str,
        distance: f64,
        operation: Operation,
    ) -> EngineResult<()> {
        (**self).add_extrude(sketch_name, profile_id, distance, operation)
    }

    fn graph(&mut self, format: GraphFormat) -> EngineResult<Graph> {
        (**self).graph(format)
    }
}
