// trajectory-service-rs/src/model.rs
// Normalized trajectory model shared by all format adapters
// One Trajectory is a parsed episode; one Message is a single turn in it

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Task verbs recognized for classification. Anything else is `other`.
const TASK_VOCABULARY: [&str; 7] = ["put", "clean", "heat", "cool", "find", "examine", "use"];

/// Speaker of a single turn: `human` is an environment/observation turn,
/// `agent` is a policy/response turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Human,
    Agent,
}

/// Outcome of a trajectory. The HuggingFace format only ever yields
/// `success`/`unknown`; the REBEL format yields all three. That asymmetry is
/// intentional and preserved per format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrajectoryStatus {
    Success,
    Failed,
    Unknown,
}

impl TrajectoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrajectoryStatus::Success => "success",
            TrajectoryStatus::Failed => "failed",
            TrajectoryStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TrajectoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrajectoryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(TrajectoryStatus::Success),
            "failed" => Ok(TrajectoryStatus::Failed),
            "unknown" => Ok(TrajectoryStatus::Unknown),
            other => Err(format!("invalid status: {}", other)),
        }
    }
}

/// Coarse single-word classification of a trajectory's goal, derived from the
/// first word of the task description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Put,
    Clean,
    Heat,
    Cool,
    Find,
    Examine,
    Use,
    Other,
    Unknown,
}

impl TaskType {
    /// Classify a task description: first word, lower-cased, matched against
    /// the fixed vocabulary. Empty task means `unknown`.
    pub fn classify(task: &str) -> Self {
        let first_word = match task.split_whitespace().next() {
            Some(word) => word.to_lowercase(),
            None => return TaskType::Unknown,
        };
        if TASK_VOCABULARY.contains(&first_word.as_str()) {
            first_word.parse().unwrap_or(TaskType::Other)
        } else {
            TaskType::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Put => "put",
            TaskType::Clean => "clean",
            TaskType::Heat => "heat",
            TaskType::Cool => "cool",
            TaskType::Find => "find",
            TaskType::Examine => "examine",
            TaskType::Use => "use",
            TaskType::Other => "other",
            TaskType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "put" => Ok(TaskType::Put),
            "clean" => Ok(TaskType::Clean),
            "heat" => Ok(TaskType::Heat),
            "cool" => Ok(TaskType::Cool),
            "find" => Ok(TaskType::Find),
            "examine" => Ok(TaskType::Examine),
            "use" => Ok(TaskType::Use),
            "other" => Ok(TaskType::Other),
            "unknown" => Ok(TaskType::Unknown),
            other => Err(format!("invalid task type: {}", other)),
        }
    }
}

/// One turn in a trajectory. `content` is always the verbatim raw text of the
/// turn; `thought`/`action` are only ever set on agent turns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub thought: Option<String>,
    pub action: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl Message {
    /// An environment/observation turn. Never carries thought or action.
    pub fn human(content: String, metadata: HashMap<String, Value>) -> Self {
        Self {
            role: Role::Human,
            content,
            thought: None,
            action: None,
            metadata,
        }
    }

    /// A policy/response turn with optionally extracted thought and action.
    pub fn agent(
        content: String,
        thought: Option<String>,
        action: Option<String>,
        metadata: HashMap<String, Value>,
    ) -> Self {
        Self {
            role: Role::Agent,
            content,
            thought,
            action,
            metadata,
        }
    }

    /// True for agent turns that carry a non-empty action.
    pub fn has_action(&self) -> bool {
        self.role == Role::Agent && self.action.as_deref().map_or(false, |a| !a.is_empty())
    }
}

/// One parsed episode, constructed once by an adapter and immutable after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    /// Format-prefixed, zero-padded sequential identifier (e.g. `hf_traj_00042`).
    pub id: String,
    /// Free-text task description; empty string when no task marker was found.
    pub task: String,
    pub task_type: TaskType,
    pub status: TrajectoryStatus,
    /// Count of agent messages with a non-empty action. Always recomputed from
    /// the messages, never copied from a raw step counter.
    pub steps: usize,
    /// Scene/state description preceding the task marker; empty if unavailable.
    pub environment: String,
    /// Turns in chronological order.
    pub messages: Vec<Message>,
    /// Carries at minimum `source` (format tag) plus format-specific extras.
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

/// Canonical step count: agent messages carrying a non-empty action.
pub fn count_steps(messages: &[Message]) -> usize {
    messages.iter().filter(|m| m.has_action()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_type_classification() {
        assert_eq!(TaskType::classify("put a mug in the microwave"), TaskType::Put);
        assert_eq!(TaskType::classify("Clean the pan"), TaskType::Clean);
        assert_eq!(TaskType::classify("heat some egg"), TaskType::Heat);
        assert_eq!(TaskType::classify("deliver the package"), TaskType::Other);
        assert_eq!(TaskType::classify(""), TaskType::Unknown);
        assert_eq!(TaskType::classify("   "), TaskType::Unknown);
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            TrajectoryStatus::Success,
            TrajectoryStatus::Failed,
            TrajectoryStatus::Unknown,
        ] {
            assert_eq!(status.as_str().parse::<TrajectoryStatus>().unwrap(), status);
        }
        assert!("done".parse::<TrajectoryStatus>().is_err());
    }

    #[test]
    fn test_human_messages_never_carry_thought_or_action() {
        let msg = Message::human("You see a table.".to_string(), HashMap::new());
        assert_eq!(msg.role, Role::Human);
        assert!(msg.thought.is_none());
        assert!(msg.action.is_none());
        assert!(!msg.has_action());
    }

    #[test]
    fn test_step_count_ignores_empty_actions() {
        let messages = vec![
            Message::human("obs".to_string(), HashMap::new()),
            Message::agent("a".to_string(), None, Some("go north".to_string()), HashMap::new()),
            Message::agent("b".to_string(), Some("hmm".to_string()), Some(String::new()), HashMap::new()),
            Message::agent("c".to_string(), None, None, HashMap::new()),
        ];
        assert_eq!(count_steps(&messages), 1);
    }

    #[test]
    fn test_trajectory_serde_round_trip() {
        let trajectory = Trajectory {
            id: "hf_traj_00007".to_string(),
            task: "put a mug in the microwave".to_string(),
            task_type: TaskType::Put,
            status: TrajectoryStatus::Success,
            steps: 1,
            environment: "You are in the middle of a room.".to_string(),
            messages: vec![Message::agent(
                "Action: go to microwave".to_string(),
                None,
                Some("go to microwave".to_string()),
                HashMap::new(),
            )],
            metadata: HashMap::from([(
                "source".to_string(),
                Value::String("huggingface".to_string()),
            )]),
        };

        let json = serde_json::to_string(&trajectory).unwrap();
        let back: Trajectory = serde_json::from_str(&json).unwrap();
        assert_eq!(back, trajectory);
        assert!(json.contains("\"status\":\"success\""));
        assert!(json.contains("\"task_type\":\"put\""));
    }
}
