//! Sub-agent job bookkeeping for per-slide generation.
//!
//! The spawner prepares one prompt and one output file per slide so long
//! decks can be handed to a language model slide by slide. Nothing here runs
//! concurrently: [`SlideAgentCoordinator::execute`] walks the jobs in order.

use crate::error::Result;
use crate::ids::short_id;
use crate::model::{complete_json, LanguageModel};
use crate::outline::split_for_parallel_processing;
use crate::prompts::slide_generation_prompt;
use crate::types::{SlideBatch, SlideRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default number of slides per batch.
pub const DEFAULT_BATCH_SIZE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Complete,
    Failed,
}

/// Tracking entry for one registered job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentJob {
    pub slide_index: usize,
    pub status: JobStatus,
    pub output_file: PathBuf,
}

/// A job as handed out to the caller, prompt included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpawnedJob {
    pub job_id: String,
    pub slide_index: usize,
    pub prompt: String,
    pub output_file: PathBuf,
}

/// Result reported back for one slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentResult {
    pub slide_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_slide: Option<SlideRecord>,
}

/// Every job for one deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationPlan {
    pub total_slides: usize,
    pub batches: usize,
    pub jobs: Vec<SpawnedJob>,
    pub output_dir: PathBuf,
}

/// Builds prompts and registers per-slide jobs.
#[derive(Debug, Clone, Default)]
pub struct SlideAgentSpawner {
    jobs: BTreeMap<String, AgentJob>,
}

impl SlideAgentSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Output file for the slide at `index`: `slide_NNN.json`.
    pub fn output_file(output_dir: &Path, index: usize) -> PathBuf {
        output_dir.join(format!("slide_{:03}.json", index))
    }

    /// Register a pending job for one slide.
    pub fn spawn_slide_agent(
        &mut self,
        slide: &SlideRecord,
        slide_index: usize,
        total_slides: usize,
        output_dir: &Path,
    ) -> SpawnedJob {
        let job_id = short_id();
        let prompt = slide_generation_prompt(slide, slide_index, total_slides);
        let output_file = Self::output_file(output_dir, slide_index);

        self.jobs.insert(
            job_id.clone(),
            AgentJob {
                slide_index,
                status: JobStatus::Pending,
                output_file: output_file.clone(),
            },
        );

        SpawnedJob {
            job_id,
            slide_index,
            prompt,
            output_file,
        }
    }

    /// Register jobs for every slide of a batch.
    pub fn spawn_batch(
        &mut self,
        batch: &SlideBatch,
        total_slides: usize,
        output_dir: &Path,
    ) -> Vec<SpawnedJob> {
        batch
            .slides
            .iter()
            .enumerate()
            .map(|(offset, slide)| {
                self.spawn_slide_agent(slide, batch.start_index + offset, total_slides, output_dir)
            })
            .collect()
    }

    pub fn job(&self, job_id: &str) -> Option<&AgentJob> {
        self.jobs.get(job_id)
    }

    pub fn jobs(&self) -> &BTreeMap<String, AgentJob> {
        &self.jobs
    }

    /// Update a job's status. Returns false for unknown ids.
    pub fn set_status(&mut self, job_id: &str, status: JobStatus) -> bool {
        match self.jobs.get_mut(job_id) {
            Some(job) => {
                job.status = status;
                true
            }
            None => false,
        }
    }
}

/// Splits a deck into batches, spawns jobs and assembles their results.
#[derive(Debug, Clone, Default)]
pub struct SlideAgentCoordinator {
    spawner: SlideAgentSpawner,
}

impl SlideAgentCoordinator {
    pub fn new(spawner: SlideAgentSpawner) -> Self {
        Self { spawner }
    }

    pub fn spawner(&self) -> &SlideAgentSpawner {
        &self.spawner
    }

    /// Register one job per slide, `batch_size` slides per batch.
    pub fn coordinate_generation(
        &mut self,
        slides: &[SlideRecord],
        output_dir: impl Into<PathBuf>,
        batch_size: usize,
    ) -> GenerationPlan {
        let output_dir = output_dir.into();
        let batches = split_for_parallel_processing(slides, batch_size);
        let total_slides = slides.len();

        let jobs = batches
            .iter()
            .flat_map(|batch| self.spawner.spawn_batch(batch, total_slides, &output_dir))
            .collect();

        GenerationPlan {
            total_slides,
            batches: batches.len(),
            jobs,
            output_dir,
        }
    }

    /// Order results by slide index, keeping only those with a slide.
    pub fn collect_results(mut results: Vec<AgentResult>) -> Vec<SlideRecord> {
        results.sort_by_key(|result| result.slide_index);
        results
            .into_iter()
            .filter_map(|result| result.generated_slide)
            .collect()
    }

    /// Run every job of `plan` through `model`, one after another.
    ///
    /// Each parsed slide is written to its job's output file. Jobs whose
    /// reply cannot be parsed are marked failed and left out of the result.
    pub fn execute(
        &mut self,
        plan: &GenerationPlan,
        model: &dyn LanguageModel,
    ) -> Result<Vec<SlideRecord>> {
        std::fs::create_dir_all(&plan.output_dir)?;

        let mut results = Vec::with_capacity(plan.jobs.len());
        for job in &plan.jobs {
            let generated = match complete_json::<SlideRecord>(model, &job.prompt) {
                Ok(slide) => {
                    std::fs::write(&job.output_file, serde_json::to_vec_pretty(&slide)?)?;
                    self.spawner.set_status(&job.job_id, JobStatus::Complete);
                    Some(slide)
                }
                Err(e) => {
                    log::warn!("Slide agent {} failed: {}", job.job_id, e);
                    self.spawner.set_status(&job.job_id, JobStatus::Failed);
                    None
                }
            };

            results.push(AgentResult {
                slide_index: job.slide_index,
                generated_slide: generated,
            });
        }

        Ok(Self::collect_results(results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::SlideKind;

    fn deck() -> Vec<SlideRecord> {
        vec![
            SlideRecord::title("Deck", Some("Sub".to_string())),
            SlideRecord::section("Results"),
            SlideRecord::content("Numbers", vec!["Up 15%".to_string()]),
            SlideRecord::content("Next", vec!["Ship".to_string()]),
        ]
    }

    #[test]
    fn test_spawn_registers_pending_job() {
        let mut spawner = SlideAgentSpawner::new();
        let job = spawner.spawn_slide_agent(&deck()[2], 2, 4, Path::new("out"));

        assert_eq!(job.job_id.len(), 8);
        assert_eq!(job.output_file, PathBuf::from("out/slide_002.json"));
        assert!(job.prompt.contains("Generate slide 3 of 4"));

        let registered = spawner.job(&job.job_id).unwrap();
        assert_eq!(registered.status, JobStatus::Pending);
        assert_eq!(registered.slide_index, 2);
    }

    #[test]
    fn test_coordinate_generation() {
        let mut coordinator = SlideAgentCoordinator::default();
        let plan = coordinator.coordinate_generation(&deck(), "agents", DEFAULT_BATCH_SIZE);

        assert_eq!(plan.total_slides, 4);
        assert_eq!(plan.batches, 2);
        assert_eq!(plan.jobs.len(), 4);
        let indices: Vec<usize> = plan.jobs.iter().map(|j| j.slide_index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert_eq!(plan.jobs[3].output_file, PathBuf::from("agents/slide_003.json"));
        assert_eq!(coordinator.spawner().jobs().len(), 4);
    }

    #[test]
    fn test_collect_results_sorts_and_filters() {
        let results = vec![
            AgentResult {
                slide_index: 2,
                generated_slide: Some(SlideRecord::section("C")),
            },
            AgentResult {
                slide_index: 0,
                generated_slide: Some(SlideRecord::section("A")),
            },
            AgentResult {
                slide_index: 1,
                generated_slide: None,
            },
        ];

        let titles: Vec<String> = SlideAgentCoordinator::collect_results(results)
            .into_iter()
            .map(|s| s.title)
            .collect();
        assert_eq!(titles, vec!["A", "C"]);
    }

    #[test]
    fn test_execute_writes_outputs_and_marks_jobs() {
        let dir = tempfile::tempdir().unwrap();
        let mut coordinator = SlideAgentCoordinator::default();
        let plan = coordinator.coordinate_generation(&deck(), dir.path().join("jobs"), 2);

        // Sections fail, everything else comes back as a polished content slide
        let model = |prompt: &str| -> Result<String> {
            if prompt.contains("SLIDE TYPE: section") {
                return Err(Error::ModelError("timeout".to_string()));
            }
            Ok(r#"{"type": "content", "title": "Polished", "content": ["Done"]}"#.to_string())
        };

        let slides = coordinator.execute(&plan, &model).unwrap();
        assert_eq!(slides.len(), 3);
        assert!(slides.iter().all(|s| s.kind == SlideKind::Content));

        let written = std::fs::read_to_string(&plan.jobs[0].output_file).unwrap();
        let parsed: SlideRecord = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed.title, "Polished");
        assert!(!plan.jobs[1].output_file.exists());

        let spawner = coordinator.spawner();
        assert_eq!(spawner.job(&plan.jobs[0].job_id).unwrap().status, JobStatus::Complete);
        assert_eq!(spawner.job(&plan.jobs[1].job_id).unwrap().status, JobStatus::Failed);
    }

    #[test]
    fn test_set_status_unknown_job() {
        assert!(!SlideAgentSpawner::new().set_status("nope", JobStatus::Complete));
    }
}
