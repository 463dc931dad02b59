use super::Point3;
use crate::error::GeometryError;
use serde::{Deserialize, Serialize};

/// Axis-aligned box around the target, as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    #[serde(with = "xyz")]
    pub min_point: Point3,
    #[serde(with = "xyz")]
    pub max_point: Point3,
}

/// The two opposing quads of a bounding box, perpendicular to X.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryFaces {
    pub start_face: [Point3; 4],
    pub end_face: [Point3; 4],
}

impl BoundingBox {
    pub fn new(min_point: Point3, max_point: Point3) -> Self {
        Self { min_point, max_point }
    }

    /// Like [`new`](Self::new) but rejects boxes with `min > max` on any axis.
    pub fn try_new(min_point: Point3, max_point: Point3) -> Result<Self, GeometryError> {
        let bbox = Self::new(min_point, max_point);
        bbox.validate()?;
        Ok(bbox)
    }

    pub fn validate(&self) -> Result<(), GeometryError> {
        for (i, axis) in ['x', 'y', 'z'].into_iter().enumerate() {
            if self.min_point[i] > self.max_point[i] {
                return Err(GeometryError::InvalidBoundingBox { axis });
            }
        }
        Ok(())
    }

    /// Extrude distance that sweeps the start face onto the end face.
    pub fn distance(&self) -> f64 {
        self.max_point.x - self.min_point.x
    }

    pub fn faces(&self) -> BoundaryFaces {
        boundary_points(&self.min_point, &self.max_point)
    }
}

/// The eight corners of the box as two quads.
///
/// `start_face` holds the corners at `min.x`, visited
/// (min,min,min) -> (min,min,max) -> (min,max,max) -> (min,max,min);
/// `end_face` repeats the walk at `max.x`.
pub fn boundary_points(min: &Point3, max: &Point3) -> BoundaryFaces {
    let quad = |x: f64| {
        [
            Point3::new(x, min.y, min.z),
            Point3::new(x, min.y, max.z),
            Point3::new(x, max.y, max.z),
            Point3::new(x, max.y, min.z),
        ]
    };

    BoundaryFaces {
        start_face: quad(min.x),
        end_face: quad(max.x),
    }
}

/// Points travel as `{"x": .., "y": .., "z": ..}` objects on the engine wire.
pub(crate) mod xyz {
    use super::Point3;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    pub struct Xyz {
        pub x: f64,
        pub y: f64,
        pub z: f64,
    }

    impl From<&Point3> for Xyz {
        fn from(p: &Point3) -> Self {
            Self { x: p.x, y: p.y, z: p.z }
        }
    }

    pub fn serialize<S: Serializer>(point: &Point3, serializer: S) -> Result<S::Ok, S::Error> {
        Xyz::from(point).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Point3, D::Error> {
        let p = Xyz::deserialize(deserializer)?;
        Ok(Point3::new(p.x, p.y, p.z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::approx::ApproxEq;

    fn pts(raw: [[f64; 3]; 4]) -> [Point3; 4] {
        raw.map(|[x, y, z]| Point3::new(x, y, z))
    }

    #[test]
    fn test_boundary_points_unit_box() {
        let faces = boundary_points(&Point3::new(0.0, 0.0, 0.0), &Point3::new(1.0, 2.0, 3.0));

        assert_eq!(
            faces.start_face,
            pts([[0.0, 0.0, 0.0], [0.0, 0.0, 3.0], [0.0, 2.0, 3.0], [0.0, 2.0, 0.0]])
        );
        assert_eq!(
            faces.end_face,
            pts([[1.0, 0.0, 0.0], [1.0, 0.0, 3.0], [1.0, 2.0, 3.0], [1.0, 2.0, 0.0]])
        );
    }

    #[test]
    fn test_faces_mirror_across_x() {
        let bbox = BoundingBox::new(Point3::new(-4.0, -1.5, 2.0), Point3::new(6.0, 0.5, 7.0));
        let faces = bbox.faces();
        for (s, e) in faces.start_face.iter().zip(faces.end_face.iter()) {
            assert!(s.x.approx_eq(&-4.0));
            assert!(e.x.approx_eq(&6.0));
            assert!(s.y.approx_eq(&e.y));
            assert!(s.z.approx_eq(&e.z));
        }
        assert!(bbox.distance().approx_eq(&10.0));
    }

    #[test]
    fn test_invalid_box_rejected() {
        let err = BoundingBox::try_new(Point3::new(0.0, 3.0, 0.0), Point3::new(1.0, 2.0, 1.0)).unwrap_err();
        assert_eq!(err, GeometryError::InvalidBoundingBox { axis: 'y' });

        // Degenerate (flat) boxes are fine.
        assert!(BoundingBox::try_new(Point3::origin(), Point3::new(0.0, 1.0, 1.0)).is_ok());
    }

    #[test]
    fn test_engine_json_shape() {
        let json = r#"{
            "type": "BoundingBox3D",
            "min_point": {"type": "Point3D", "x": -1.0, "y": 0.0, "z": 0.5},
            "max_point": {"type": "Point3D", "x": 2.0, "y": 4.0, "z": 1.5}
        }"#;
        let bbox: BoundingBox = serde_json::from_str(json).unwrap();
        assert!(bbox.min_point.approx_eq(&Point3::new(-1.0, 0.0, 0.5)));
        assert!(bbox.distance().approx_eq(&3.0));

        let out = serde_json::to_value(bbox).unwrap();
        assert_eq!(out["max_point"]["y"], 4.0);
    }
}
