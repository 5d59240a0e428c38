// trajectory-service-rs/src/adapters/huggingface.rs
// Adapter for the directory-based columnar dataset container.
//
// A record is a `conversations` sequence of speaker-tagged turns whose text
// blobs carry the task, environment, thought and action as literal markers.
// The container itself is opaque: records are reached through the shard
// manifest in state.json, and only JSON/JSONL shards can be deserialized.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use super::{str_field, RawRecord, TrajectoryAdapter};
use crate::detect::FormatTag;
use crate::error::{LoadError, LoadResult};
use crate::model::{count_steps, Message, TaskType, Trajectory, TrajectoryStatus};

const TASK_MARKER: &str = "Your task is to:";
const THOUGHT_MARKER: &str = "Thought:";
const ACTION_MARKER: &str = "Action:";

/// Substrings in the final turn that mark a successful episode.
const SUCCESS_MARKERS: [&str; 4] = ["succeed", "success", "task completed", "congratulations"];

pub struct HuggingFaceAdapter;

impl TrajectoryAdapter for HuggingFaceAdapter {
    fn format(&self) -> FormatTag {
        FormatTag::HuggingFace
    }

    fn load(&self, path: &Path) -> LoadResult<Vec<RawRecord>> {
        let state_path = path.join("state.json");
        let state_text = fs::read_to_string(&state_path).map_err(|e| LoadError::io(&state_path, e))?;
        let state: Value =
            serde_json::from_str(&state_text).map_err(|e| LoadError::json(&state_path, e))?;

        let data_files = state
            .get("_data_files")
            .and_then(Value::as_array)
            .ok_or_else(|| LoadError::MalformedSource {
                path: state_path.clone(),
                reason: "missing _data_files manifest".to_string(),
            })?;

        let mut records = Vec::new();
        for entry in data_files {
            let filename = entry
                .get("filename")
                .and_then(Value::as_str)
                .ok_or_else(|| LoadError::MalformedSource {
                    path: state_path.clone(),
                    reason: "manifest entry without filename".to_string(),
                })?;
            records.extend(read_shard(&path.join(filename))?);
        }
        Ok(records)
    }

    fn parse(&self, raw: &RawRecord, idx: usize) -> LoadResult<Trajectory> {
        let conversations: &[Value] = match raw.get("conversations") {
            None => &[],
            Some(value) => value.as_array().map(Vec::as_slice).ok_or_else(|| {
                LoadError::malformed_record(idx, "conversations is not an array")
            })?,
        };

        let mut messages = Vec::with_capacity(conversations.len());
        let mut task = String::new();
        let mut environment = String::new();
        let mut task_captured = false;

        for turn in conversations {
            let turn = turn
                .as_object()
                .ok_or_else(|| LoadError::malformed_record(idx, "turn is not an object"))?;
            let value = str_field(turn, "value");
            let is_human = str_field(turn, "from") == "human";

            // Task extraction: first marker occurrence wins, later turns never
            // overwrite what was captured.
            if !task_captured {
                if let Some(pos) = value.find(TASK_MARKER) {
                    let after = &value[pos + TASK_MARKER.len()..];
                    task = after
                        .split('\n')
                        .next()
                        .unwrap_or("")
                        .trim()
                        .to_string();
                    if pos > 0 {
                        environment = value[..pos].trim().to_string();
                    }
                    task_captured = true;
                }
            }

            if is_human {
                messages.push(Message::human(value.to_string(), HashMap::new()));
            } else {
                let (thought, action) = split_thought_action(value);
                messages.push(Message::agent(value.to_string(), thought, action, HashMap::new()));
            }
        }

        // Success heuristic: the final turn announces the outcome. This format
        // never yields `failed`, only success or unknown.
        let status = match messages.last() {
            Some(last) => {
                let text = last.content.to_lowercase();
                if SUCCESS_MARKERS.iter().any(|marker| text.contains(marker)) {
                    TrajectoryStatus::Success
                } else {
                    TrajectoryStatus::Unknown
                }
            }
            None => TrajectoryStatus::Unknown,
        };

        let steps = count_steps(&messages);
        let metadata = HashMap::from([
            ("source".to_string(), Value::String("huggingface".to_string())),
            (
                "item_id".to_string(),
                raw.get("item_id").cloned().unwrap_or(Value::String(String::new())),
            ),
        ]);

        Ok(Trajectory {
            id: format!("hf_traj_{:05}", idx),
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

/// Extract thought/action from an agent turn.
///
/// `Thought:` present: the text splits once on `Action:`; the pre-split part
/// with the `Thought:` label removed is the thought, the post-split part is
/// the action (empty string when no `Action:` follows). `Action:` alone: the
/// whole text with the labels removed is the action.
fn split_thought_action(value: &str) -> (Option<String>, Option<String>) {
    if value.contains(THOUGHT_MARKER) {
        let mut parts = value.splitn(2, ACTION_MARKER);
        let thought_part = parts.next().unwrap_or("");
        let thought = thought_part.replace(THOUGHT_MARKER, "").trim().to_string();
        let action = parts
            .next()
            .map(|text| text.trim().to_string())
            .unwrap_or_default();
        (Some(thought), Some(action))
    } else if value.contains(ACTION_MARKER) {
        let action = value.replace(ACTION_MARKER, "").trim().to_string();
        (None, Some(action))
    } else {
        (None, None)
    }
}

/// Deserialize one dataset shard. JSON arrays and JSON-lines are the supported
/// record encodings; anything else is a source-level error.
fn read_shard(path: &Path) -> LoadResult<Vec<RawRecord>> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match extension.as_str() {
        "json" => {
            let text = fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
            let value: Value = serde_json::from_str(&text).map_err(|e| LoadError::json(path, e))?;
            let items = value.as_array().ok_or_else(|| LoadError::MalformedSource {
                path: path.to_path_buf(),
                reason: "shard top level is not an array".to_string(),
            })?;
            items
                .iter()
                .map(|item| {
                    item.as_object().cloned().ok_or_else(|| LoadError::MalformedSource {
                        path: path.to_path_buf(),
                        reason: "shard entry is not an object".to_string(),
                    })
                })
                .collect()
        }
        "jsonl" => {
            let text = fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
            text.lines()
                .filter(|line| !line.trim().is_empty())
                .map(|line| {
                    let value: Map<String, Value> =
                        serde_json::from_str(line).map_err(|e| LoadError::json(path, e))?;
                    Ok(value)
                })
                .collect()
        }
        _ => Err(LoadError::UnsupportedShard(path.to_path_buf())),
    }
}
