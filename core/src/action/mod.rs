//! Extrude actions and their fixed-width wire form.
//!
//! A learner sees an action as five `u64` slots:
//! `[start_hi, start_lo, end_hi, end_lo, operation]`. Face identifiers are
//! either UUIDs, split into big-endian 64-bit halves, or plain integers, stored
//! in the low slots with both high slots zero.

use crate::error::CodecError;
use crate::operation::Operation;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[cfg(test)]
mod tests_codec;

/// Number of slots in an encoded action.
pub const ACTION_WIDTH: usize = 5;

/// Identifier of a face in the target design.
///
/// The engine hands these out as strings. Most are UUIDs, some are small
/// integers; both must survive the trip through [`EncodedAction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FaceId {
    Uuid(Uuid),
    Index(u64),
}

impl FaceId {
    pub fn is_uuid(&self) -> bool {
        matches!(self, Self::Uuid(_))
    }

    /// Split into (high, low) 64-bit halves. Integer ids have a zero high half.
    fn halves(&self) -> (u64, u64) {
        match self {
            Self::Uuid(id) => {
                let value = id.as_u128();
                ((value >> 64) as u64, value as u64)
            }
            Self::Index(value) => (0, *value),
        }
    }

    fn from_halves(hi: u64, lo: u64) -> Self {
        Self::Uuid(Uuid::from_u128(((hi as u128) << 64) | lo as u128))
    }
}

impl FromStr for FaceId {
    type Err = CodecError;

    /// UUID grammar first (hyphenated, simple, braced or URN), then a decimal `u64`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(id) = Uuid::parse_str(s) {
            return Ok(Self::Uuid(id));
        }
        s.parse::<u64>()
            .map(Self::Index)
            .map_err(|_| CodecError::MalformedIdentifier(s.to_string()))
    }
}

impl fmt::Display for FaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uuid(id) => write!(f, "{}", id),
            Self::Index(value) => write!(f, "{}", value),
        }
    }
}

impl From<Uuid> for FaceId {
    fn from(id: Uuid) -> Self {
        Self::Uuid(id)
    }
}

impl From<u64> for FaceId {
    fn from(value: u64) -> Self {
        Self::Index(value)
    }
}

impl Serialize for FaceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FaceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Extrude the region between two target faces and combine it via `operation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExtrudeAction {
    pub start_face: FaceId,
    pub end_face: FaceId,
    pub operation: Operation,
}

impl ExtrudeAction {
    pub fn new(start_face: impl Into<FaceId>, end_face: impl Into<FaceId>, operation: Operation) -> Self {
        Self {
            start_face: start_face.into(),
            end_face: end_face.into(),
            operation,
        }
    }

    /// Build an action from the engine's string identifiers.
    pub fn parse(start_face: &str, end_face: &str, operation: Operation) -> Result<Self, CodecError> {
        Ok(Self {
            start_face: start_face.parse()?,
            end_face: end_face.parse()?,
            operation,
        })
    }

    /// Encode into the 5-slot wire form.
    ///
    /// Both faces must be of the same kind. A UUID pair whose upper halves are
    /// both zero is refused: its wire form is indistinguishable from an
    /// integer pair, so it could not be decoded back.
    pub fn encode(&self) -> Result<EncodedAction, CodecError> {
        if self.start_face.is_uuid() != self.end_face.is_uuid() {
            return Err(CodecError::MixedIdentifierKinds {
                start: self.start_face.to_string(),
                end: self.end_face.to_string(),
            });
        }

        let (s_hi, s_lo) = self.start_face.halves();
        let (e_hi, e_lo) = self.end_face.halves();
        if self.start_face.is_uuid() && s_hi == 0 && e_hi == 0 {
            return Err(CodecError::AmbiguousIdentifier);
        }

        Ok(EncodedAction([s_hi, s_lo, e_hi, e_lo, self.operation.code()]))
    }
}

impl fmt::Display for ExtrudeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}", self.operation, self.start_face, self.end_face)
    }
}

/// Fixed-width action as exchanged with a learner:
/// `[start_hi, start_lo, end_hi, end_lo, operation]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedAction(pub [u64; ACTION_WIDTH]);

impl EncodedAction {
    pub fn new(slots: [u64; ACTION_WIDTH]) -> Self {
        Self(slots)
    }

    /// Accept a raw slice coming from a learner.
    pub fn from_slice(slots: &[u64]) -> Result<Self, CodecError> {
        let slots: [u64; ACTION_WIDTH] = slots
            .try_into()
            .map_err(|_| CodecError::WrongActionWidth(slots.len()))?;
        Ok(Self(slots))
    }

    pub fn as_array(&self) -> &[u64; ACTION_WIDTH] {
        &self.0
    }

    /// Both high slots zero means the low slots hold raw integers.
    pub fn is_integer_variant(&self) -> bool {
        self.0[0] == 0 && self.0[2] == 0
    }

    pub fn decode(&self) -> Result<ExtrudeAction, CodecError> {
        let [s_hi, s_lo, e_hi, e_lo, op] = self.0;
        let operation = Operation::try_from(op)?;

        let (start_face, end_face) = if self.is_integer_variant() {
            (FaceId::Index(s_lo), FaceId::Index(e_lo))
        } else {
            (FaceId::from_halves(s_hi, s_lo), FaceId::from_halves(e_hi, e_lo))
        };

        Ok(ExtrudeAction {
            start_face,
            end_face,
            operation,
        })
    }
}

impl From<[u64; ACTION_WIDTH]> for EncodedAction {
    fn from(slots: [u64; ACTION_WIDTH]) -> Self {
        Self(slots)
    }
}
