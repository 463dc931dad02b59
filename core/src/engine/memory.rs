use super::{Extruded, GeometryEngine, Graph, GraphFormat, TargetInfo};
use crate::action::{ExtrudeAction, FaceId};
use crate::error::{EngineError, EngineResult};
use crate::geometry::{BoundingBox, Point3};
use crate::operation::Operation;
use serde_json::json;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A deterministic face-id generator producing a sequence of UUIDs
/// from a seed namespace and a counter.
#[derive(Debug, Clone)]
pub struct FaceIdGenerator {
    namespace: Uuid,
    counter: u64,
}

impl FaceIdGenerator {
    pub fn new(seed: &str) -> Self {
        Self {
            namespace: Uuid::new_v5(&Uuid::NAMESPACE_OID, seed.as_bytes()),
            counter: 0,
        }
    }

    pub fn next_id(&mut self) -> FaceId {
        let count = self.counter;
        self.counter += 1;
        FaceId::Uuid(Uuid::new_v5(&self.namespace, &count.to_be_bytes()))
    }
}

/// One call received by a [`MemoryEngine`], in order.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    SetTarget(PathBuf),
    RevertToTarget,
    Extrude(ExtrudeAction),
    Extrudes { actions: Vec<ExtrudeAction>, revert: bool },
    Screenshot(PathBuf),
    AddSketch(String),
    AddPoint { sketch_name: String, point: Point3 },
    CloseProfile(String),
    AddExtrude { sketch_name: String, profile_id: String, distance: f64, operation: Operation },
    Graph(GraphFormat),
}

#[derive(Debug, Clone)]
struct Sketch {
    name: String,
    points: Vec<Point3>,
    profiles: Vec<String>,
}

/// In-process stand-in for the remote engine.
///
/// The target is a fixed set of faces. Extrudes between two known faces
/// succeed and grow (or shrink) the set of covered faces; the reported iou is
/// the covered fraction of the target. Every call is logged so tests can
/// assert on exactly what reached the engine.
#[derive(Debug, Clone)]
pub struct MemoryEngine {
    ids: FaceIdGenerator,
    target_faces: Vec<FaceId>,
    bounding_box: BoundingBox,
    covered: BTreeSet<FaceId>,
    sketches: Vec<Sketch>,
    bodies: Vec<Vec<FaceId>>,
    calls: Vec<EngineCall>,
    fail_revert: bool,
    fail_extrudes: bool,
}

impl MemoryEngine {
    /// Target with `face_count` UUID faces derived from `seed`.
    pub fn new(seed: &str, face_count: usize, bounding_box: BoundingBox) -> Self {
        let mut ids = FaceIdGenerator::new(seed);
        let target_faces = (0..face_count).map(|_| ids.next_id()).collect();
        Self::with_faces(ids, target_faces, bounding_box)
    }

    /// Target whose faces are the integers `0..face_count`.
    pub fn with_integer_faces(face_count: u64, bounding_box: BoundingBox) -> Self {
        let target_faces = (0..face_count).map(FaceId::Index).collect();
        Self::with_faces(FaceIdGenerator::new("integer-target"), target_faces, bounding_box)
    }

    fn with_faces(ids: FaceIdGenerator, target_faces: Vec<FaceId>, bounding_box: BoundingBox) -> Self {
        Self {
            ids,
            target_faces,
            bounding_box,
            covered: BTreeSet::new(),
            sketches: Vec::new(),
            bodies: Vec::new(),
            calls: Vec::new(),
            fail_revert: false,
            fail_extrudes: false,
        }
    }

    /// Make every revert fail with a 500.
    pub fn fail_revert(mut self, fail: bool) -> Self {
        self.fail_revert = fail;
        self
    }

    /// Make every extrude fail with a 500.
    pub fn fail_extrudes(mut self, fail: bool) -> Self {
        self.fail_extrudes = fail;
        self
    }

    pub fn target_faces(&self) -> &[FaceId] {
        &self.target_faces
    }

    pub fn calls(&self) -> &[EngineCall] {
        &self.calls
    }

    /// Number of calls that asked the engine to extrude between target faces.
    pub fn extrude_calls(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, EngineCall::Extrude(_) | EngineCall::Extrudes { .. }))
            .count()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    fn target_graph(&self) -> Graph {
        Self::face_graph(&self.target_faces)
    }

    fn design_graph(&self) -> Graph {
        let mut faces: Vec<FaceId> = self.covered.iter().copied().collect();
        faces.extend(self.bodies.iter().flatten().copied());
        Self::face_graph(&faces)
    }

    /// Faces become nodes; consecutive faces are linked.
    fn face_graph(faces: &[FaceId]) -> Graph {
        let mut graph = Graph::empty();
        graph.nodes = faces
            .iter()
            .map(|f| json!({"id": f.to_string(), "surface_type": "PlaneSurfaceType"}))
            .collect();
        graph.links = faces
            .windows(2)
            .map(|w| json!({"source": w[0].to_string(), "target": w[1].to_string()}))
            .collect();
        graph
    }

    fn iou(&self) -> f64 {
        if self.target_faces.is_empty() {
            return 0.0;
        }
        self.covered.len() as f64 / self.target_faces.len() as f64
    }

    fn check_faces(&self, action: &ExtrudeAction) -> EngineResult<()> {
        for face in [&action.start_face, &action.end_face] {
            if !self.target_faces.contains(face) {
                return Err(EngineError::UnknownFace(face.to_string()));
            }
        }
        Ok(())
    }

    /// Callers check the faces first, so a failed call leaves no trace.
    fn apply(&mut self, action: &ExtrudeAction) {
        let pair: BTreeSet<FaceId> = [action.start_face, action.end_face].into_iter().collect();
        match action.operation {
            Operation::Join | Operation::NewBody => self.covered.extend(pair),
            Operation::Cut => self.covered.retain(|f| !pair.contains(f)),
            Operation::Intersect => self.covered.retain(|f| pair.contains(f)),
        }
    }

    fn extruded(&self) -> Extruded {
        Extruded {
            graph: self.design_graph(),
            iou: self.iou(),
        }
    }

    fn reset_design(&mut self) {
        self.covered.clear();
        self.sketches.clear();
        self.bodies.clear();
    }

    fn sketch_mut(&mut self, command: &str, sketch_name: &str) -> EngineResult<&mut Sketch> {
        self.sketches
            .iter_mut()
            .find(|s| s.name == sketch_name)
            .ok_or_else(|| EngineError::status(command, 400))
    }
}

impl GeometryEngine for MemoryEngine {
    fn set_target(&mut self, file: &Path) -> EngineResult<TargetInfo> {
        self.calls.push(EngineCall::SetTarget(file.to_path_buf()));
        self.reset_design();
        Ok(TargetInfo {
            graph: self.target_graph(),
            bounding_box: self.bounding_box,
        })
    }

    fn revert_to_target(&mut self) -> EngineResult<Graph> {
        self.calls.push(EngineCall::RevertToTarget);
        if self.fail_revert {
            return Err(EngineError::status("revert_to_target", 500));
        }
        self.reset_design();
        Ok(self.design_graph())
    }

    fn extrude(&mut self, start_face: &FaceId, end_face: &FaceId, operation: Operation) -> EngineResult<Extruded> {
        let action = ExtrudeAction::new(*start_face, *end_face, operation);
        self.calls.push(EngineCall::Extrude(action));
        if self.fail_extrudes {
            return Err(EngineError::status("add_extrude_by_target_face", 500));
        }
        self.check_faces(&action)?;
        self.apply(&action);
        Ok(self.extruded())
    }

    fn extrudes(&mut self, actions: &[ExtrudeAction], revert: bool) -> EngineResult<Extruded> {
        self.calls.push(EngineCall::Extrudes {
            actions: actions.to_vec(),
            revert,
        });
        if self.fail_extrudes {
            return Err(EngineError::status("add_extrudes_by_target_face", 500));
        }
        for action in actions {
            self.check_faces(action)?;
        }
        if revert {
            self.reset_design();
        }
        for action in actions {
            self.apply(action);
        }
        Ok(self.extruded())
    }

    fn screenshot(&mut self, file: &Path) -> EngineResult<()> {
        self.calls.push(EngineCall::Screenshot(file.to_path_buf()));
        Ok(())
    }

    fn add_sketch(&mut self, plane: &str) -> EngineResult<String> {
        self.calls.push(EngineCall::AddSketch(plane.to_string()));
        let name = format!("Sketch{}", self.sketches.len() + 1);
        self.sketches.push(Sketch {
            name: name.clone(),
            points: Vec::new(),
            profiles: Vec::new(),
        });
        Ok(name)
    }

    fn add_point(&mut self, sketch_name: &str, point: &Point3) -> EngineResult<()> {
        self.calls.push(EngineCall::AddPoint {
            sketch_name: sketch_name.to_string(),
            point: *point,
        });
        self.sketch_mut("add_point", sketch_name)?.points.push(*point);
        Ok(())
    }

    fn close_profile(&mut self, sketch_name: &str) -> EngineResult<Vec<String>> {
        self.calls.push(EngineCall::CloseProfile(sketch_name.to_string()));
        let sketch = self.sketch_mut("close_profile", sketch_name)?;
        if sketch.points.len() < 3 {
            return Err(EngineError::status("close_profile", 400));
        }
        let profile_id = format!("{}_profile{}", sketch.name, sketch.profiles.len());
        sketch.profiles.push(profile_id);
        Ok(sketch.profiles.clone())
    }

    fn add_extrude(
        &mut self,
        sketch_name: &str,
        profile_id: &str,
        distance: f64,
        operation: Operation,
    ) -> EngineResult<()> {
        self.calls.push(EngineCall::AddExtrude {
            sketch_name: sketch_name.to_string(),
            profile_id: profile_id.to_string(),
            distance,
            operation,
        });
        let sketch = self.sketch_mut("add_extrude", sketch_name)?;
        if !sketch.profiles.iter().any(|p| p == profile_id) {
            return Err(EngineError::status("add_extrude", 400));
        }
        // A closed quad swept along its normal: two caps and four sides.
        let body = (0..6).map(|_| self.ids.next_id()).collect();
        self.bodies.push(body);
        Ok(())
    }

    fn graph(&mut self, format: GraphFormat) -> EngineResult<Graph> {
        self.calls.push(EngineCall::Graph(format));
        Ok(self.design_graph())
    }
}
