pub mod action;
pub mod config;
pub mod engine;
pub mod env;
pub mod episode;
pub mod error;
pub mod geometry;
pub mod operation;

pub use action::{EncodedAction, ExtrudeAction, FaceId};
pub use config::EnvConfig;
pub use engine::{GeometryEngine, Graph, MemoryEngine};
pub use env::{Observation, SearchEnvironment, StepOutcome, TimeStep};
pub use error::{CodecError, EngineError, EnvError};
pub use operation::Operation;
