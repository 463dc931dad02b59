//! HTTP client for the Fusion gym server.
//!
//! Every call is a blocking `POST {"command": .., "data": {..}}` to one
//! endpoint; answers look like `{"status": 200, "message": .., "data": {..}}`.

use extrude_core::action::{ExtrudeAction, FaceId};
use extrude_core::engine::{Extruded, GeometryEngine, Graph, GraphFormat, TargetInfo};
use extrude_core::error::{EngineError, EngineResult};
use extrude_core::geometry::Point3;
use extrude_core::Operation;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

pub struct HttpEngine {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpEngine {
    /// Must be called outside of an async context; the blocking client runs
    /// its own runtime.
    pub fn new(url: &str, timeout: Duration) -> EngineResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EngineError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    fn send(&self, command: &str, data: Value) -> EngineResult<Value> {
        debug!("-> {} {}", command, data);
        let response = self
            .client
            .post(&self.url)
            .json(&json!({ "command": command, "data": data }))
            .send()
            .map_err(|e| EngineError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(EngineError::status(command, status));
        }
        let body: Value = response
            .json()
            .map_err(|e| EngineError::Decode(e.to_string()))?;
        response_data(command, body)
    }
}

/// Pull `data` out of a response body, honouring an in-band status code.
fn response_data(command: &str, mut body: Value) -> EngineResult<Value> {
    if let Some(status) = body.get("status").and_then(Value::as_u64) {
        if status != 200 {
            return Err(EngineError::status(command, status as u16));
        }
    }
    body.get_mut("data")
        .map(Value::take)
        .ok_or_else(|| EngineError::missing(command, "data"))
}

fn field<T: DeserializeOwned>(command: &str, data: &Value, name: &str) -> EngineResult<T> {
    let value = data
        .get(name)
        .ok_or_else(|| EngineError::missing(command, name))?;
    serde_json::from_value(value.clone()).map_err(|e| EngineError::Decode(format!("[{}] {}: {}", command, name, e)))
}

fn extruded(command: &str, data: &Value) -> EngineResult<Extruded> {
    Ok(Extruded {
        graph: field(command, data, "graph")?,
        iou: field(command, data, "iou")?,
    })
}

impl GeometryEngine for HttpEngine {
    fn set_target(&mut self, file: &Path) -> EngineResult<TargetInfo> {
        let data = self.send("set_target", json!({ "file": file.to_string_lossy() }))?;
        Ok(TargetInfo {
            graph: field("set_target", &data, "graph")?,
            bounding_box: field("set_target", &data, "bounding_box")?,
        })
    }

    fn revert_to_target(&mut self) -> EngineResult<Graph> {
        let data = self.send("revert_to_target", json!({}))?;
        field("revert_to_target", &data, "graph")
    }

    fn extrude(&mut self, start_face: &FaceId, end_face: &FaceId, operation: Operation) -> EngineResult<Extruded> {
        let command = "add_extrude_by_target_face";
        let data = self.send(
            command,
            json!({
                "start_face": start_face.to_string(),
                "end_face": end_face.to_string(),
                "operation": operation.name(),
            }),
        )?;
        extruded(command, &data)
    }

    fn extrudes(&mut self, actions: &[ExtrudeAction], revert: bool) -> EngineResult<Extruded> {
        let command = "add_extrudes_by_target_face";
        let data = self.send(command, json!({ "actions": actions, "revert": revert }))?;
        extruded(command, &data)
    }

    fn screenshot(&mut self, file: &Path) -> EngineResult<()> {
        self.send("screenshot", json!({ "file": file.to_string_lossy() }))?;
        Ok(())
    }

    fn add_sketch(&mut self, plane: &str) -> EngineResult<String> {
        let data = self.send("add_sketch", json!({ "sketch_plane": plane }))?;
        field("add_sketch", &data, "sketch_name")
    }

    fn add_point(&mut self, sketch_name: &str, point: &Point3) -> EngineResult<()> {
        self.send(
            "add_point",
            json!({
                "sketch_name": sketch_name,
                "pt": { "x": point.x, "y": point.y, "z": point.z },
            }),
        )?;
        Ok(())
    }

    fn close_profile(&mut self, sketch_name: &str) -> EngineResult<Vec<String>> {
        let data = self.send("close_profile", json!({ "sketch_name": sketch_name }))?;
        let profiles: serde_json::Map<String, Value> = field("close_profile", &data, "profiles")?;
        Ok(profiles.keys().cloned().collect())
    }

    fn add_extrude(
        &mut self,
        sketch_name: &str,
        profile_id: &str,
        distance: f64,
        operation: Operation,
    ) -> EngineResult<()> {
        self.send(
            "add_extrude",
            json!({
                "sketch_name": sketch_name,
                "profile_id": profile_id,
                "distance": distance,
                "operation": operation.name(),
            }),
        )?;
        Ok(())
    }

    fn graph(&mut self, format: GraphFormat) -> EngineResult<Graph> {
        let data = self.send("graph", json!({ "file": "", "dir": "", "format": format.name() }))?;
        field("graph", &data, "graph")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_data_ok() {
        let body = json!({"status": 200, "message": "Success", "data": {"iou": 0.5, "graph": {"nodes": [], "links": []}}});
        let data = response_data("add_extrude_by_target_face", body).unwrap();
        let out = extruded("add_extrude_by_target_face", &data).unwrap();
        assert_eq!(out.iou, 0.5);
        assert!(out.graph.is_empty());
    }

    #[test]
    fn test_in_band_failure_status() {
        let body = json!({"status": 500, "message": "Invalid face", "data": {}});
        assert_eq!(
            response_data("add_extrude_by_target_face", body),
            Err(EngineError::status("add_extrude_by_target_face", 500))
        );
    }

    #[test]
    fn test_missing_fields() {
        assert_eq!(
            response_data("revert_to_target", json!({"status": 200})),
            Err(EngineError::missing("revert_to_target", "data"))
        );

        let data = json!({"graph": {"nodes": []}});
        assert_eq!(
            extruded("add_extrude_by_target_face", &data),
            Err(EngineError::missing("add_extrude_by_target_face", "iou"))
        );
    }

    #[test]
    fn test_target_payload() {
        let data = json!({
            "graph": {"directed": false, "multigraph": false, "graph": {}, "nodes": [{"id": "3"}], "links": []},
            "bounding_box": {
                "min_point": {"x": 0.0, "y": 0.0, "z": 0.0},
                "max_point": {"x": 4.0, "y": 2.0, "z": 1.0}
            }
        });
        let graph: Graph = field("set_target", &data, "graph").unwrap();
        assert_eq!(graph.face_ids(), vec![FaceId::Index(3)]);
        let bbox: extrude_core::geometry::BoundingBox = field("set_target", &data, "bounding_box").unwrap();
        assert_eq!(bbox.distance(), 4.0);
    }
}
