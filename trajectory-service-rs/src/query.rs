// trajectory-service-rs/src/query.rs
// Read-only query engine over the loaded corpus: list, detail, statistics
// and per-source summaries. The store is built once at startup and never
// mutated, so concurrent readers need no locking.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::Value;

use crate::model::{TaskType, Trajectory, TrajectoryStatus};

/// Optional list filters, combined with AND.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrajectoryFilter {
    pub status: Option<TrajectoryStatus>,
    pub task_type: Option<TaskType>,
    pub min_steps: Option<usize>,
    pub max_steps: Option<usize>,
}

impl TrajectoryFilter {
    fn matches(&self, trajectory: &Trajectory) -> bool {
        if let Some(status) = self.status {
            if trajectory.status != status {
                return false;
            }
        }
        if let Some(task_type) = self.task_type {
            if trajectory.task_type != task_type {
                return false;
            }
        }
        if let Some(min) = self.min_steps {
            if trajectory.steps < min {
                return false;
            }
        }
        if let Some(max) = self.max_steps {
            if trajectory.steps > max {
                return false;
            }
        }
        true
    }
}

/// Corpus-wide statistics.
#[derive(Debug, Clone, Serialize)]
pub struct Statistics {
    pub total: usize,
    pub by_status: BTreeMap<String, usize>,
    pub by_task_type: BTreeMap<String, usize>,
    pub by_source: BTreeMap<String, usize>,
    pub avg_steps: f64,
}

/// Summary of one distinct data source in the corpus.
#[derive(Debug, Clone, Serialize)]
pub struct SourceSummary {
    pub format: String,
    pub count: usize,
    pub sample_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DataSourcesSummary {
    pub total_sources: usize,
    pub sources: Vec<SourceSummary>,
}

/// The owned, read-only aggregate of all loaded trajectories.
#[derive(Debug, Default)]
pub struct TrajectoryStore {
    trajectories: Vec<Trajectory>,
    by_id: HashMap<String, usize>,
}

impl TrajectoryStore {
    pub fn new(trajectories: Vec<Trajectory>) -> Self {
        let by_id = trajectories
            .iter()
            .enumerate()
            .map(|(idx, t)| (t.id.clone(), idx))
            .collect();
        Self { trajectories, by_id }
    }

    pub fn len(&self) -> usize {
        self.trajectories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trajectories.is_empty()
    }

    /// Filter in corpus order, then slice `[skip, skip + limit)`. A skip past
    /// the end of the filtered result yields an empty list, not an error.
    pub fn list(&self, filter: &TrajectoryFilter, skip: usize, limit: usize) -> Vec<&Trajectory> {
        self.trajectories
            .iter()
            .filter(|t| filter.matches(t))
            .skip(skip)
            .take(limit)
            .collect()
    }

    /// Exact lookup by id.
    pub fn get(&self, id: &str) -> Option<&Trajectory> {
        self.by_id.get(id).map(|&idx| &self.trajectories[idx])
    }

    pub fn statistics(&self) -> Statistics {
        let total = self.trajectories.len();
        let mut by_status = BTreeMap::new();
        let mut by_task_type = BTreeMap::new();
        let mut by_source = BTreeMap::new();
        let mut total_steps = 0usize;

        for trajectory in &self.trajectories {
            *by_status.entry(trajectory.status.to_string()).or_insert(0) += 1;
            *by_task_type.entry(trajectory.task_type.to_string()).or_insert(0) += 1;
            *by_source.entry(source_of(trajectory).to_string()).or_insert(0) += 1;
            total_steps += trajectory.steps;
        }

        let avg_steps = if total > 0 {
            round2(total_steps as f64 / total as f64)
        } else {
            0.0
        };

        Statistics {
            total,
            by_status,
            by_task_type,
            by_source,
            avg_steps,
        }
    }

    /// One entry per distinct `metadata.source` value, in first-seen corpus
    /// order, each with its count and a representative trajectory id.
    pub fn data_sources(&self) -> DataSourcesSummary {
        let mut order: Vec<String> = Vec::new();
        let mut summaries: HashMap<String, SourceSummary> = HashMap::new();

        for trajectory in &self.trajectories {
            let source = source_of(trajectory).to_string();
            match summaries.get_mut(&source) {
                Some(summary) => summary.count += 1,
                None => {
                    order.push(source.clone());
                    summaries.insert(
                        source.clone(),
                        SourceSummary {
                            format: source,
                            count: 1,
                            sample_id: trajectory.id.clone(),
                        },
                    );
                }
            }
        }

        let sources: Vec<SourceSummary> = order
            .into_iter()
            .filter_map(|source| summaries.remove(&source))
            .collect();
        DataSourcesSummary {
            total_sources: sources.len(),
            sources,
        }
    }
}

fn source_of(trajectory: &Trajectory) -> &str {
    trajectory
        .metadata
        .get("source")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Message;

    fn trajectory(
        id: &str,
        task_type: TaskType,
        status: TrajectoryStatus,
        steps: usize,
        source: &str,
    ) -> Trajectory {
        let messages = (0..steps)
            .map(|i| {
                Message::agent(
                    format!("Action: step {}", i),
                    None,
                    Some(format!("step {}", i)),
                    HashMap::new(),
                )
            })
            .collect();
        Trajectory {
            id: id.to_string(),
            task: format!("{} something", task_type),
            task_type,
            status,
            steps,
            environment: String::new(),
            messages,
            metadata: HashMap::from([(
                "source".to_string(),
                Value::String(source.to_string()),
            )]),
        }
    }

    fn sample_store() -> TrajectoryStore {
        TrajectoryStore::new(vec![
            trajectory("hf_traj_00000", TaskType::Put, TrajectoryStatus::Success, 3, "huggingface"),
            trajectory("hf_traj_00001", TaskType::Clean, TrajectoryStatus::Unknown, 5, "huggingface"),
            trajectory("rebel_traj_00000", TaskType::Put, TrajectoryStatus::Failed, 2, "rebel"),
            trajectory("rebel_traj_00001", TaskType::Find, TrajectoryStatus::Success, 8, "rebel"),
        ])
    }

    #[test]
    fn test_list_filters_combine_with_and() {
        let store = sample_store();

        let put_only = store.list(
            &TrajectoryFilter { task_type: Some(TaskType::Put), ..Default::default() },
            0,
            50,
        );
        assert_eq!(put_only.len(), 2);

        let put_success = store.list(
            &TrajectoryFilter {
                task_type: Some(TaskType::Put),
                status: Some(TrajectoryStatus::Success),
                ..Default::default()
            },
            0,
            50,
        );
        assert_eq!(put_success.len(), 1);
        assert_eq!(put_success[0].id, "hf_traj_00000");

        let bounded = store.list(
            &TrajectoryFilter { min_steps: Some(3), max_steps: Some(5), ..Default::default() },
            0,
            50,
        );
        let ids: Vec<&str> = bounded.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["hf_traj_00000", "hf_traj_00001"]);
    }

    #[test]
    fn test_pagination_is_mathematical_slicing() {
        let store = sample_store();
        let filter = TrajectoryFilter::default();

        let all: Vec<&str> = store.list(&filter, 0, 50).iter().map(|t| t.id.as_str()).collect();
        let page: Vec<&str> = store.list(&filter, 1, 2).iter().map(|t| t.id.as_str()).collect();
        assert_eq!(page, &all[1..3]);

        // Skip past the end is empty, not an error.
        assert!(store.list(&filter, 100, 50).is_empty());
    }

    #[test]
    fn test_detail_lookup() {
        let store = sample_store();
        assert_eq!(store.get("rebel_traj_00000").unwrap().steps, 2);
        assert!(store.get("rebel_traj_99999").is_none());
    }

    #[test]
    fn test_statistics() {
        let stats = sample_store().statistics();

        assert_eq!(stats.total, 4);
        assert_eq!(stats.by_status["success"], 2);
        assert_eq!(stats.by_status["failed"], 1);
        assert_eq!(stats.by_status["unknown"], 1);
        assert_eq!(stats.by_task_type["put"], 2);
        assert_eq!(stats.by_source["huggingface"], 2);
        assert_eq!(stats.by_source["rebel"], 2);
        // (3 + 5 + 2 + 8) / 4 = 4.5
        assert_eq!(stats.avg_steps, 4.5);
    }

    #[test]
    fn test_statistics_on_empty_corpus() {
        let stats = TrajectoryStore::new(Vec::new()).statistics();
        assert_eq!(stats.total, 0);
        assert!(stats.by_status.is_empty());
        assert!(stats.by_task_type.is_empty());
        assert!(stats.by_source.is_empty());
        assert_eq!(stats.avg_steps, 0.0);
    }

    #[test]
    fn test_avg_steps_rounding() {
        let store = TrajectoryStore::new(vec![
            trajectory("a", TaskType::Put, TrajectoryStatus::Success, 1, "rebel"),
            trajectory("b", TaskType::Put, TrajectoryStatus::Success, 1, "rebel"),
            trajectory("c", TaskType::Put, TrajectoryStatus::Success, 2, "rebel"),
        ]);
        // 4 / 3 = 1.333... -> 1.33
        assert_eq!(store.statistics().avg_steps, 1.33);
    }

    #[test]
    fn test_data_sources_first_seen_order() {
        let summary = sample_store().data_sources();

        assert_eq!(summary.total_sources, 2);
        assert_eq!(summary.sources[0].format, "huggingface");
        assert_eq!(summary.sources[0].count, 2);
        assert_eq!(summary.sources[0].sample_id, "hf_traj_00000");
        assert_eq!(summary.sources[1].format, "rebel");
        assert_eq!(summary.sources[1].sample_id, "rebel_traj_00000");
    }
}
