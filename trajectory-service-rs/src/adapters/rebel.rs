// trajectory-service-rs/src/adapters/rebel.rs
// Adapter for the REBEL step-log JSON format.
//
// One record is {task, done, data: [{step, obs, response}, ...]}; agent
// responses carry optional <belief>/<reasoning>/<action> tagged segments.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde_json::Value;

use super::{str_field, RawRecord, TrajectoryAdapter};
use crate::detect::FormatTag;
use crate::error::{LoadError, LoadResult};
use crate::model::{count_steps, Message, TaskType, Trajectory, TrajectoryStatus};

const ROOM_MARKER: &str = "You are in the middle of a room";
const ENV_TASK_MARKER: &str = "\nYour task is to:";

pub struct RebelJsonAdapter;

impl TrajectoryAdapter for RebelJsonAdapter {
    fn format(&self) -> FormatTag {
        FormatTag::RebelJson
    }

    fn load(&self, path: &Path) -> LoadResult<Vec<RawRecord>> {
        let text = fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
        let value: Value = serde_json::from_str(&text).map_err(|e| LoadError::json(path, e))?;

        let items = value.as_array().ok_or_else(|| LoadError::MalformedSource {
            path: path.to_path_buf(),
            reason: "top level is not an array".to_string(),
        })?;
        items
            .iter()
            .map(|item| {
                item.as_object().cloned().ok_or_else(|| LoadError::MalformedSource {
                    path: path.to_path_buf(),
                    reason: "record is not an object".to_string(),
                })
            })
            .collect()
    }

    fn parse(&self, raw: &RawRecord, idx: usize) -> LoadResult<Trajectory> {
        let task = str_field(raw, "task").to_string();
        // A record with no completion flag counts as not done.
        let done = raw
            .get("done")
            .and_then(Value::as_str)
            .unwrap_or("False")
            .to_string();
        let data: &[Value] = match raw.get("data") {
            None => &[],
            Some(value) => value
                .as_array()
                .map(Vec::as_slice)
                .ok_or_else(|| LoadError::malformed_record(idx, "data is not an array"))?,
        };

        let mut messages = Vec::new();
        for step_data in data {
            let step_data = step_data
                .as_object()
                .ok_or_else(|| LoadError::malformed_record(idx, "step is not an object"))?;
            let step_num = step_data.get("step").cloned().unwrap_or(Value::from(0));
            let obs = str_field(step_data, "obs");
            let response = str_field(step_data, "response");

            // Environment feedback becomes a human turn.
            if !obs.is_empty() {
                let metadata = HashMap::from([
                    ("step".to_string(), step_num.clone()),
                    ("type".to_string(), Value::String("observation".to_string())),
                ]);
                messages.push(Message::human(obs.to_string(), metadata));
            }

            if !response.is_empty() {
                let belief = extract_tagged(response, "belief");
                let thought = extract_tagged(response, "reasoning");
                let action = extract_tagged(response, "action");

                let metadata = HashMap::from([
                    ("step".to_string(), step_num),
                    (
                        "belief".to_string(),
                        belief.map(Value::String).unwrap_or(Value::Null),
                    ),
                    ("type".to_string(), Value::String("agent_response".to_string())),
                ]);
                messages.push(Message::agent(response.to_string(), thought, action, metadata));
            }
        }

        let status = match done.as_str() {
            "True" => TrajectoryStatus::Success,
            "False" => TrajectoryStatus::Failed,
            _ => TrajectoryStatus::Unknown,
        };

        let environment = extract_environment(data);
        let steps = count_steps(&messages);
        let metadata = HashMap::from([
            ("source".to_string(), Value::String("rebel".to_string())),
            ("done".to_string(), Value::String(done)),
        ]);

        Ok(Trajectory {
            id: format!("rebel_traj_{:05}", idx),
            task_type: TaskType::classify(&task),
            task,
            status,
            steps,
            environment,
            messages,
            metadata,
        })
    }
}

/// Extract the first `<tag>...</tag>` pair from a response. The close tag is
/// searched strictly after the open tag; a close tag appearing only before the
/// open tag means the pair is absent.
fn extract_tagged(text: &str, tag: &str) -> Option<String> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);

    let start = text.find(&open)? + open.len();
    let end = text[start..].find(&close)?;
    Some(text[start..start + end].trim().to_string())
}

/// Environment comes from the first observation, and only when it looks like a
/// room description with a task announcement appended.
fn extract_environment(data: &[Value]) -> String {
    let first_obs = data
        .first()
        .and_then(Value::as_object)
        .map(|step| str_field(step, "obs"))
        .unwrap_or("");

    if first_obs.is_empty() || !first_obs.contains(ROOM_MARKER) {
        return String::new();
    }
    match first_obs.find(ENV_TASK_MARKER) {
        Some(pos) if pos > 0 => first_obs[..pos].trim().to_string(),
        _ => String::new(),
    }
}
