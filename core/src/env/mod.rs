//! Episode loop over a geometry engine.
//!
//! [`SearchEnvironment`] owns the engine handle and the [`EpisodeState`]. Each
//! `step` decodes a 5-slot action, forwards it to the engine and advances the
//! step counter; the episode ends after `max_steps` steps whatever the engine
//! did. Reward is always zero here, shaping is left to the learner.

pub mod types;
pub use types::*;

use crate::action::{EncodedAction, ExtrudeAction, FaceId};
use crate::config::EnvConfig;
use crate::engine::{Extruded, GeometryEngine, Graph, TargetInfo};
use crate::episode::EpisodeState;
use crate::error::EnvError;
use crate::geometry::bounding_extrude;
use crate::operation::Operation;
use std::path::Path;
use tracing::{debug, error, info, warn};

pub struct SearchEnvironment<E: GeometryEngine> {
    engine: E,
    max_steps: u64,
    state: EpisodeState,
    target: Option<TargetInfo>,
}

impl<E: GeometryEngine> SearchEnvironment<E> {
    /// The environment starts without an episode: call [`reset`](Self::reset)
    /// before the first [`step`](Self::step).
    ///
    /// `max_steps == 0` is treated like 1: the first step ends the episode.
    pub fn new(engine: E, max_steps: u64) -> Self {
        Self {
            engine,
            max_steps,
            state: EpisodeState::idle(),
            target: None,
        }
    }

    pub fn from_config(engine: E, config: &EnvConfig) -> Self {
        Self::new(engine, config.max_steps)
    }

    pub fn max_steps(&self) -> u64 {
        self.max_steps
    }

    pub fn state(&self) -> EpisodeState {
        self.state
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn into_engine(self) -> E {
        self.engine
    }

    pub fn action_spec(&self) -> ArraySpec {
        ArraySpec::action()
    }

    pub fn observation_spec(&self) -> ArraySpec {
        ArraySpec::observation()
    }

    /// Graph of an empty design, to kick off a search before any extrude.
    pub fn empty_graph(&self) -> Graph {
        Graph::empty()
    }

    pub fn target(&self) -> Option<&TargetInfo> {
        self.target.as_ref()
    }

    /// Load the target design the episodes are scored against.
    pub fn set_target(&mut self, file: &Path) -> Result<&TargetInfo, EnvError> {
        let target = self.engine.set_target(file)?;
        info!(
            "Target {} loaded with {} faces",
            file.display(),
            target.graph.nodes.len()
        );
        self.state = EpisodeState::idle();
        Ok(&*self.target.insert(target))
    }

    /// Fill the target's bounding box with one new body.
    pub fn seed_bounding_body(&mut self) -> Result<Graph, EnvError> {
        let bbox = self.target.as_ref().ok_or(EnvError::NoTarget)?.bounding_box;
        Ok(bounding_extrude(&mut self.engine, &bbox)?)
    }

    /// Revert the engine to the target baseline and start a new episode.
    ///
    /// A failed revert ends any episode in progress: the engine's design is
    /// no longer known, so `step` is refused until a reset succeeds.
    pub fn reset(&mut self) -> Result<TimeStep, EnvError> {
        if let Err(e) = self.engine.revert_to_target() {
            error!("Reset failed, engine did not revert: {}", e);
            self.state = EpisodeState::idle();
            return Err(EnvError::RemoteRevert(e));
        }
        self.state = EpisodeState::initial();
        info!("Episode reset (max_steps={})", self.max_steps);
        Ok(TimeStep::first(Observation { step: 0 }))
    }

    /// Apply one encoded action.
    ///
    /// Actions that do not decode, and extrudes the engine refuses, still
    /// spend the step. The only error is stepping a finished episode.
    pub fn step(&mut self, action: &EncodedAction) -> Result<TimeStep, EnvError> {
        if self.state.finished {
            return Err(EnvError::EpisodeAlreadyFinished {
                step: self.state.step,
            });
        }
        let next = self.state.advance(self.max_steps);

        let outcome = match action.decode() {
            Ok(decoded) => {
                debug!("step {}: {}", next.step, decoded);
                match self
                    .engine
                    .extrude(&decoded.start_face, &decoded.end_face, decoded.operation)
                {
                    Ok(extruded) => StepOutcome::Applied(extruded),
                    Err(e) => {
                        warn!("step {}: extrude had no effect: {}", next.step, e);
                        StepOutcome::Rejected(e)
                    }
                }
            }
            Err(e) => {
                debug!("step {}: skipping undecodable action {:?}: {}", next.step, action.as_array(), e);
                StepOutcome::Skipped(e)
            }
        };

        self.state = next;
        let observation = Observation { step: next.step };
        if next.finished {
            Ok(TimeStep::termination(observation, 0.0, outcome))
        } else {
            Ok(TimeStep::transition(observation, 0.0, outcome))
        }
    }

    /// Like [`step`](Self::step) for a raw slot slice; a slice of the wrong
    /// width is a caller error and does not spend a step.
    pub fn step_raw(&mut self, slots: &[u64]) -> Result<TimeStep, EnvError> {
        let action = EncodedAction::from_slice(slots)?;
        self.step(&action)
    }

    /// Extrude between two target faces outside the step loop.
    /// Engine failures mean "no effect" and come back as `None`.
    pub fn extrude(&mut self, start_face: &FaceId, end_face: &FaceId, operation: Operation) -> Option<Extruded> {
        match self.engine.extrude(start_face, end_face, operation) {
            Ok(extruded) => Some(extruded),
            Err(e) => {
                warn!("extrude had no effect: {}", e);
                None
            }
        }
    }

    /// Apply several decoded actions in one round trip. An empty batch never
    /// reaches the engine.
    pub fn extrudes(&mut self, actions: &[ExtrudeAction], revert: bool) -> Option<Extruded> {
        if actions.is_empty() {
            return None;
        }
        match self.engine.extrudes(actions, revert) {
            Ok(extruded) => Some(extruded),
            Err(e) => {
                warn!("extrudes ({} actions) had no effect: {}", actions.len(), e);
                None
            }
        }
    }

    /// Ask the engine to save a screenshot; `false` if it did not.
    pub fn screenshot(&mut self, file: &Path) -> bool {
        match self.engine.screenshot(file) {
            Ok(()) => true,
            Err(e) => {
                warn!("screenshot {} failed: {}", file.display(), e);
                false
            }
        }
    }
}
