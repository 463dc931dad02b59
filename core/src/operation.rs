use crate::error::CodecError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// How an extrude is combined with the bodies already in the design.
///
/// The discriminant is the wire code used in the last slot of an encoded action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Operation {
    Join = 1,
    Cut = 2,
    Intersect = 3,
    NewBody = 4,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Join,
        Operation::Cut,
        Operation::Intersect,
        Operation::NewBody,
    ];

    /// Canonical name, as the geometry engine spells it.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Join => "JoinFeatureOperation",
            Self::Cut => "CutFeatureOperation",
            Self::Intersect => "IntersectFeatureOperation",
            Self::NewBody => "NewBodyFeatureOperation",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, CodecError> {
        Self::ALL
            .into_iter()
            .find(|op| op.name() == name)
            .ok_or_else(|| CodecError::InvalidOperationName(name.to_string()))
    }

    pub fn code(&self) -> u64 {
        *self as u64
    }
}

impl TryFrom<u64> for Operation {
    type Error = CodecError;

    fn try_from(code: u64) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Join),
            2 => Ok(Self::Cut),
            3 => Ok(Self::Intersect),
            4 => Ok(Self::NewBody),
            other => Err(CodecError::InvalidOperationCode(other)),
        }
    }
}

impl FromStr for Operation {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Operation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Operation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Self::from_name(&name).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_round_trip() {
        for name in [
            "JoinFeatureOperation",
            "CutFeatureOperation",
            "IntersectFeatureOperation",
            "NewBodyFeatureOperation",
        ] {
            let op: Operation = name.parse().unwrap();
            assert_eq!(op.to_string(), name);
        }
    }

    #[test]
    fn test_unknown_names_rejected() {
        for name in ["", "Join", "joinfeatureoperation", "NewBody ", "SweepFeatureOperation"] {
            assert_eq!(
                Operation::from_name(name),
                Err(CodecError::InvalidOperationName(name.to_string()))
            );
        }
    }

    #[test]
    fn test_code_range() {
        assert_eq!(Operation::try_from(1), Ok(Operation::Join));
        assert_eq!(Operation::try_from(4), Ok(Operation::NewBody));
        assert_eq!(Operation::try_from(0), Err(CodecError::InvalidOperationCode(0)));
        assert_eq!(Operation::try_from(5), Err(CodecError::InvalidOperationCode(5)));
        for op in Operation::ALL {
            assert_eq!(Operation::try_from(op.code()), Ok(op));
        }
    }

    #[test]
    fn test_serde_uses_engine_name() {
        let json = serde_json::to_string(&Operation::Cut).unwrap();
        assert_eq!(json, "\"CutFeatureOperation\"");
        let op: Operation = serde_json::from_str("\"IntersectFeatureOperation\"").unwrap();
        assert_eq!(op, Operation::Intersect);
        assert!(serde_json::from_str::<Operation>("\"Cut\"").is_err());
    }
}
