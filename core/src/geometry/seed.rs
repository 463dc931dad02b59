use super::BoundingBox;
use crate::engine::{GeometryEngine, Graph, GraphFormat};
use crate::error::{EngineError, EngineResult};
use crate::operation::Operation;
use tracing::debug;

/// Extrude one new body filling the whole bounding box and return its
/// per-face graph.
///
/// The start face is sketched as a closed quad, then swept by `-distance`
/// along the sketch normal so it reaches the end face.
pub fn bounding_extrude<E: GeometryEngine + ?Sized>(engine: &mut E, bbox: &BoundingBox) -> EngineResult<Graph> {
    let faces = bbox.faces();
    let distance = bbox.distance();

    let sketch_name = engine.add_sketch("XY")?;
    for point in &faces.start_face {
        engine.add_point(&sketch_name, point)?;
    }

    let profile_id = engine
        .close_profile(&sketch_name)?
        .into_iter()
        .next()
        .ok_or_else(|| EngineError::missing("close_profile", "profiles"))?;

    debug!("Bounding extrude of {} on {} ({})", -distance, sketch_name, profile_id);
    engine.add_extrude(&sketch_name, &profile_id, -distance, Operation::NewBody)?;

    engine.graph(GraphFormat::PerFace)
}
