use crate::action::ACTION_WIDTH;
use crate::engine::Extruded;
use crate::error::{CodecError, EngineError};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt::Display;

/// What the learner sees after a reset or a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub step: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    First,
    Mid,
    Last,
}

/// Why a step did or did not change the design.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum StepOutcome {
    /// The engine performed the extrude.
    Applied(Extruded),
    /// The action decoded but the engine reported no effect.
    Rejected(#[serde(serialize_with = "as_display")] EngineError),
    /// The action did not decode; the engine was not contacted.
    Skipped(#[serde(serialize_with = "as_display")] CodecError),
}

impl StepOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

fn as_display<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// One transition of the environment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeStep {
    pub step_type: StepType,
    pub observation: Observation,
    pub reward: f64,
    pub discount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<StepOutcome>,
}

impl TimeStep {
    pub fn first(observation: Observation) -> Self {
        Self {
            step_type: StepType::First,
            observation,
            reward: 0.0,
            discount: 1.0,
            outcome: None,
        }
    }

    pub fn transition(observation: Observation, reward: f64, outcome: StepOutcome) -> Self {
        Self {
            step_type: StepType::Mid,
            observation,
            reward,
            discount: 1.0,
            outcome: Some(outcome),
        }
    }

    pub fn termination(observation: Observation, reward: f64, outcome: StepOutcome) -> Self {
        Self {
            step_type: StepType::Last,
            observation,
            reward,
            discount: 0.0,
            outcome: Some(outcome),
        }
    }

    pub fn is_last(&self) -> bool {
        self.step_type == StepType::Last
    }
}

/// Shape and bounds of an array the learner exchanges with the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArraySpec {
    pub name: String,
    pub shape: Vec<usize>,
    pub dtype: String,
    pub minimum: Vec<u64>,
    pub maximum: Vec<u64>,
}

impl ArraySpec {
    /// `[start_hi, start_lo, end_hi, end_lo, operation]`, operation in 1-4.
    pub fn action() -> Self {
        let mut minimum = vec![0; ACTION_WIDTH];
        let mut maximum = vec![u64::MAX; ACTION_WIDTH];
        minimum[ACTION_WIDTH - 1] = 1;
        maximum[ACTION_WIDTH - 1] = 4;
        Self {
            name: "action".into(),
            shape: vec![ACTION_WIDTH],
            dtype: "uint64".into(),
            minimum,
            maximum,
        }
    }

    pub fn observation() -> Self {
        Self {
            name: "observation".into(),
            shape: vec![1],
            dtype: "int32".into(),
            minimum: vec![0],
            maximum: vec![i32::MAX as u64],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skipped_outcome_json() {
        let step = TimeStep::transition(
            Observation { step: 2 },
            0.0,
            StepOutcome::Skipped(CodecError::InvalidOperationCode(0)),
        );
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["step_type"], "mid");
        assert_eq!(json["observation"]["step"], 2);
        assert_eq!(json["outcome"]["kind"], "skipped");
        assert_eq!(json["outcome"]["detail"], "Invalid operation code: 0 (expected 1-4)");
    }

    #[test]
    fn test_first_step_has_no_outcome() {
        let json = serde_json::to_value(TimeStep::first(Observation { step: 0 })).unwrap();
        assert!(json.get("outcome").is_none());
    }

    #[test]
    fn test_action_spec_bounds() {
        let spec = ArraySpec::action();
        assert_eq!(spec.shape, vec![5]);
        assert_eq!(spec.minimum[4], 1);
        assert_eq!(spec.maximum[4], 4);
    }
}
