//! Text command protocol spoken with a learner over the websocket.
//!
//! Requests are `COMMAND` or `COMMAND:payload`; every request gets exactly one
//! reply of the same shape, `ERROR:{"code", "message"}` on failure.

use extrude_core::env::ArraySpec;
use extrude_core::{ExtrudeAction, GeometryEngine, SearchEnvironment};
use serde::Deserialize;
use serde_json::json;
use std::path::Path;
use tracing::{info, warn};

/// Format an error reply for the learner.
pub fn format_error(code: &str, message: &str) -> String {
    format!("ERROR:{}", json!({ "code": code, "message": message }))
}

pub struct Session<E: GeometryEngine> {
    env: SearchEnvironment<E>,
}

impl<E: GeometryEngine> Session<E> {
    pub fn new(env: SearchEnvironment<E>) -> Self {
        Self { env }
    }

    #[cfg(test)]
    pub fn env(&self) -> &SearchEnvironment<E> {
        &self.env
    }

    pub fn handle(&mut self, text: &str) -> String {
        let (command, payload) = match text.split_once(':') {
            Some((command, payload)) => (command, payload),
            None => (text, ""),
        };

        match command {
            "SPECS" => {
                #[derive(serde::Serialize)]
                struct Specs {
                    action: ArraySpec,
                    observation: ArraySpec,
                }
                let specs = Specs {
                    action: self.env.action_spec(),
                    observation: self.env.observation_spec(),
                };
                reply("SPECS", &specs)
            }

            "SET_TARGET" => {
                if payload.is_empty() {
                    return format_error("BAD_REQUEST", "SET_TARGET needs a file path");
                }
                match self.env.set_target(Path::new(payload)) {
                    Ok(target) => reply("TARGET", target),
                    Err(e) => {
                        warn!("Failed to set target {}: {}", payload, e);
                        format_error("SET_TARGET_FAILED", &e.to_string())
                    }
                }
            }

            "SEED_BOUNDS" => match self.env.seed_bounding_body() {
                Ok(graph) => reply("GRAPH", &graph),
                Err(e) => format_error("SEED_FAILED", &e.to_string()),
            },

            "EMPTY_GRAPH" => reply("GRAPH", &self.env.empty_graph()),

            "RESET" => match self.env.reset() {
                Ok(time_step) => reply("TIME_STEP", &time_step),
                Err(e) => format_error("RESET_FAILED", &e.to_string()),
            },

            "STEP" => {
                // Format: STEP:[start_hi,start_lo,end_hi,end_lo,op]
                let slots: Vec<u64> = match serde_json::from_str(payload) {
                    Ok(slots) => slots,
                    Err(e) => return format_error("BAD_REQUEST", &format!("STEP payload: {}", e)),
                };
                match self.env.step_raw(&slots) {
                    Ok(time_step) => reply("TIME_STEP", &time_step),
                    Err(e) => format_error("STEP_FAILED", &e.to_string()),
                }
            }

            "EXTRUDES" => {
                // Format: EXTRUDES:{"actions":[{start_face,end_face,operation}],"revert":false}
                #[derive(Deserialize)]
                struct ExtrudesCmd {
                    actions: Vec<ExtrudeAction>,
                    #[serde(default)]
                    revert: bool,
                }
                match serde_json::from_str::<ExtrudesCmd>(payload) {
                    Ok(cmd) => {
                        let result = self.env.extrudes(&cmd.actions, cmd.revert);
                        info!("Applied batch of {} extrudes", cmd.actions.len());
                        reply("EXTRUDES", &result)
                    }
                    Err(e) => format_error("BAD_REQUEST", &format!("EXTRUDES payload: {}", e)),
                }
            }

            "SCREENSHOT" => {
                let saved = self.env.screenshot(Path::new(payload));
                reply("SCREENSHOT", &saved)
            }

            _ => format_error("UNKNOWN_COMMAND", command),
        }
    }
}

fn reply<T: serde::Serialize + ?Sized>(tag: &str, value: &T) -> String {
    match serde_json::to_string(value) {
        Ok(json) => format!("{}:{}", tag, json),
        Err(e) => format_error("ENCODE_FAILED", &e.to_string()),
    }
}
