//! Project generation pipeline.
//!
//! Four strictly sequential stages: PRD text, feature extraction, task
//! breakdown, assembly. Transport and config errors halt the run; parse
//! failures in stages 2 and 3 degrade to deterministic placeholders so the
//! run can always finish. Cancellation is cooperative and is not an error:
//! the token is checked before each stage and after each call resolves,
//! and the in-flight call itself is raced against the token.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::watch;

use super::extract::{extract_json, JsonShape};
use super::prompts::{self, Locale};
use super::{Completer, CompletionError};
use crate::core::{Feature, ModelConfig, Priority, Project, Task, TaskStatus};

/// Cooperative cancellation token for a pipeline run.
///
/// Cloneable; any clone can cancel. Once cancelled it stays cancelled.
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self { tx: Arc::new(tx), rx }
    }

    /// Request cancellation. Wakes anything awaiting [`Self::cancelled`].
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation has been requested.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        // The sender lives in self, so wait_for can only fail after we are
        // dropped.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Status of one pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Pending,
    Generating,
    Completed,
    Error,
}

/// Progress record for one of the four stages. Transient: owned by a
/// single run and discarded when the run ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationStep {
    /// 1-based stage number.
    pub step: u8,
    pub title: String,
    pub status: StepStatus,
}

/// Output of a completed run, not yet persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedProject {
    pub prd: String,
    pub features: Vec<Feature>,
    pub tasks: Vec<Task>,
}

impl GeneratedProject {
    /// Assemble a persistable project with a fresh id.
    pub fn into_project(self, name: impl Into<String>) -> Project {
        Project::new(name, self.prd, self.features, self.tasks)
    }
}

/// Why a run stopped early.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Completion(#[from] CompletionError),
    /// User-initiated; not an error condition for display purposes.
    #[error("generation cancelled")]
    Cancelled,
}

impl PipelineError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

type StepObserver = Box<dyn Fn(&GenerationStep) + Send + Sync>;

/// Drives the four generation stages against a [`Completer`].
pub struct GenerationPipeline<C> {
    completer: C,
    config: ModelConfig,
    observer: Option<StepObserver>,
}

impl<C: Completer> GenerationPipeline<C> {
    pub fn new(completer: C, config: ModelConfig) -> Self {
        Self { completer, config, observer: None }
    }

    /// Receive every step transition (for progress display).
    pub fn with_observer(mut self, observer: impl Fn(&GenerationStep) + Send + Sync + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Run all four stages for an idea. On error or cancellation all
    /// partial results are discarded; nothing is persisted here either way.
    pub async fn run(
        &self,
        idea: &str,
        locale: Locale,
        cancel: &CancelToken,
    ) -> Result<GeneratedProject, PipelineError> {
        let titles = prompts::step_titles(locale);

        // Announce the whole plan before any work starts; each stage then
        // transitions pending -> generating -> completed/error.
        for (index, title) in titles.iter().enumerate() {
            self.emit(&GenerationStep {
                step: index as u8 + 1,
                title: (*title).to_string(),
                status: StepStatus::Pending,
            });
        }

        // Stage 1: PRD text.
        let mut step = self.begin(1, titles[0], cancel)?;
        let prd = self.checked(&mut step, self.call(&prompts::prd_prompt(locale, idea), cancel)).await?;
        self.finish(&mut step);

        // Stage 2: feature array, degrading to placeholders on bad output.
        let mut step = self.begin(2, titles[1], cancel)?;
        let raw = self.checked(&mut step, self.call(&prompts::features_prompt(locale, &prd), cancel)).await?;
        let features = parse_features(&raw).unwrap_or_else(|| {
            tracing::warn!("Could not parse features from model output, using placeholders");
            prompts::fallback_features(locale)
        });
        self.finish(&mut step);

        // Stage 3: task breakdown, same degradation.
        let mut step = self.begin(3, titles[2], cancel)?;
        let features_json = serde_json::to_string(&features).unwrap_or_else(|_| "[]".to_string());
        let raw = self.checked(&mut step, self.call(&prompts::tasks_prompt(locale, &features_json), cancel)).await?;
        let tasks = parse_tasks(&raw, &features).unwrap_or_else(|| {
            tracing::warn!("Could not parse tasks from model output, using placeholders");
            prompts::fallback_tasks(locale, &features)
        });
        self.finish(&mut step);

        // Stage 4: assembly only, no network.
        let mut step = self.begin(4, titles[3], cancel)?;
        let tasks = tasks
            .into_iter()
            .map(|task| {
                if task.tag.is_none() {
                    let tag = features.iter().find(|f| f.id == task.fid).map(|f| f.title.clone());
                    task.with_tag(tag)
                } else {
                    task
                }
            })
            .collect();
        self.finish(&mut step);

        Ok(GeneratedProject { prd, features, tasks })
    }

    /// Start a stage, honoring a cancellation requested between stages.
    fn begin(&self, number: u8, title: &str, cancel: &CancelToken) -> Result<GenerationStep, PipelineError> {
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        let step =
            GenerationStep { step: number, title: title.to_string(), status: StepStatus::Generating };
        self.emit(&step);
        Ok(step)
    }

    fn finish(&self, step: &mut GenerationStep) {
        step.status = StepStatus::Completed;
        self.emit(step);
    }

    /// Mark the step failed if the stage's work fails. Cancellation leaves
    /// the step as-is; it is not an error state.
    async fn checked<T>(
        &self,
        step: &mut GenerationStep,
        work: impl std::future::Future<Output = Result<T, PipelineError>>,
    ) -> Result<T, PipelineError> {
        match work.await {
            Ok(value) => Ok(value),
            Err(PipelineError::Cancelled) => Err(PipelineError::Cancelled),
            Err(e) => {
                step.status = StepStatus::Error;
                self.emit(step);
                Err(e)
            }
        }
    }

    /// One completion call, raced against the cancel token so cancellation
    /// aborts the transport call instead of waiting it out. The token is
    /// re-checked after the call resolves.
    async fn call(&self, prompt: &str, cancel: &CancelToken) -> Result<String, PipelineError> {
        let text = tokio::select! {
            () = cancel.cancelled() => return Err(PipelineError::Cancelled),
            result = self.completer.complete(prompt, &self.config) => result?,
        };
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        Ok(text)
    }

    fn emit(&self, step: &GenerationStep) {
        if let Some(observer) = &self.observer {
            observer(step);
        }
    }
}

/// Recover a non-empty feature array from stage 2 output.
fn parse_features(raw: &str) -> Option<Vec<Feature>> {
    let value = extract_json(raw, JsonShape::Array)?;
    let features: Vec<Feature> = serde_json::from_value(value).ok()?;
    (!features.is_empty()).then_some(features)
}

/// Recover a non-empty task list from stage 3 output.
///
/// Ids are assigned as `task-{fid}-{n}`. A task whose `fid` does not match
/// a generated feature is re-pointed at the first feature so every foreign
/// key resolves.
fn parse_tasks(raw: &str, features: &[Feature]) -> Option<Vec<Task>> {
    let value = extract_json(raw, JsonShape::Object)?;
    let items = value.get("tasks")?.as_array()?;
    let default_fid = features.first()?.id;

    let mut tasks = Vec::new();
    for (index, item) in items.iter().enumerate() {
        let Some(title) = item.get("title").and_then(Value::as_str) else {
            continue;
        };
        let fid = item
            .get("fid")
            .and_then(value_as_fid)
            .filter(|fid| features.iter().any(|f| f.id == *fid))
            .unwrap_or(default_fid);

        let mut task = Task::new(format!("task-{fid}-{}", index + 1), fid, title);
        task.description =
            item.get("description").and_then(Value::as_str).map(ToString::to_string);
        task.status = item
            .get("status")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<TaskStatus>().ok())
            .unwrap_or(TaskStatus::Todo);
        task.priority = item.get("priority").and_then(Value::as_str).and_then(Priority::parse);
        tasks.push(task);
    }
    (!tasks.is_empty()).then_some(tasks)
}

/// Models emit fids as numbers or strings interchangeably.
fn value_as_fid(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Completer that replays a scripted sequence of responses.
    struct ScriptedCompleter {
        responses: Mutex<VecDeque<Result<String, CompletionError>>>,
    }

    impl ScriptedCompleter {
        fn new(responses: Vec<Result<String, CompletionError>>) -> Self {
            Self { responses: Mutex::new(responses.into_iter().collect()) }
        }
    }

    #[async_trait::async_trait]
    impl Completer for ScriptedCompleter {
        async fn complete(
            &self,
            _prompt: &str,
            _config: &ModelConfig,
        ) -> Result<String, CompletionError> {
            self.responses.lock().pop_front().expect("unscripted completion call")
        }
    }

    /// Completer whose second call never resolves.
    struct StallingCompleter {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Completer for StallingCompleter {
        async fn complete(
            &self,
            _prompt: &str,
            _config: &ModelConfig,
        ) -> Result<String, CompletionError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok("a prd".to_string())
            } else {
                std::future::pending().await
            }
        }
    }

    fn pipeline<C: Completer>(completer: C) -> GenerationPipeline<C> {
        GenerationPipeline::new(completer, ModelConfig::default())
    }

    #[tokio::test]
    async fn test_happy_path_with_prose_wrapped_features() {
        let completer = ScriptedCompleter::new(vec![
            Ok("# PRD for habit tracker".to_string()),
            Ok(r#"Sure! [ {"id":1,"title":"Core","description":"x"} ] thanks"#.to_string()),
            Ok(r#"{"tasks": [{"fid": 1, "title": "Build the model", "status": "todo"}]}"#.to_string()),
        ]);
        let generated = pipeline(completer)
            .run("habit tracker", Locale::En, &CancelToken::new())
            .await
            .unwrap();

        assert_eq!(generated.prd, "# PRD for habit tracker");
        assert_eq!(generated.features, vec![Feature::new(1, "Core", "x")]);
        assert_eq!(generated.tasks.len(), 1);
        assert_eq!(generated.tasks[0].id, "task-1-1");
        assert_eq!(generated.tasks[0].fid, 1);
        // tag picked up from the parent feature at assembly
        assert_eq!(generated.tasks[0].tag.as_deref(), Some("Core"));
    }

    #[tokio::test]
    async fn test_unparsable_stage2_falls_back_without_error() {
        let completer = ScriptedCompleter::new(vec![
            Ok("prd".to_string()),
            Ok("I'm sorry, I can't produce JSON today.".to_string()),
            Ok("garbage here too".to_string()),
        ]);
        let generated =
            pipeline(completer).run("idea", Locale::En, &CancelToken::new()).await.unwrap();

        assert_eq!(generated.features, prompts::fallback_features(Locale::En));
        assert!(!generated.tasks.is_empty());
        for task in &generated.tasks {
            assert!(generated.features.iter().any(|f| f.id == task.fid));
        }
    }

    #[tokio::test]
    async fn test_unresolvable_fid_is_repointed() {
        let completer = ScriptedCompleter::new(vec![
            Ok("prd".to_string()),
            Ok(r#"[{"id":1,"title":"Only","description":""}]"#.to_string()),
            Ok(r#"{"tasks": [{"fid": 7, "title": "Stray task"}]}"#.to_string()),
        ]);
        let generated =
            pipeline(completer).run("idea", Locale::En, &CancelToken::new()).await.unwrap();
        assert_eq!(generated.tasks[0].fid, 1);
    }

    #[tokio::test]
    async fn test_completion_error_halts_run_and_marks_step() {
        let completer = ScriptedCompleter::new(vec![
            Ok("prd".to_string()),
            Err(CompletionError::Auth { provider: "openai".to_string() }),
        ]);
        let seen: Arc<Mutex<Vec<(u8, StepStatus)>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let pipeline = pipeline(completer)
            .with_observer(move |step| sink.lock().push((step.step, step.status)));

        let err = pipeline.run("idea", Locale::En, &CancelToken::new()).await.unwrap_err();
        assert!(matches!(err, PipelineError::Completion(CompletionError::Auth { .. })));

        let transitions = seen.lock().clone();
        assert_eq!(
            transitions,
            vec![
                (1, StepStatus::Pending),
                (2, StepStatus::Pending),
                (3, StepStatus::Pending),
                (4, StepStatus::Pending),
                (1, StepStatus::Generating),
                (1, StepStatus::Completed),
                (2, StepStatus::Generating),
                (2, StepStatus::Error),
            ]
        );
    }

    #[tokio::test]
    async fn test_all_stages_announced_pending_before_work() {
        let completer = ScriptedCompleter::new(vec![
            Ok("prd".to_string()),
            Ok("no json".to_string()),
            Ok("no json".to_string()),
        ]);
        let seen: Arc<Mutex<Vec<(u8, StepStatus)>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let pipeline = pipeline(completer)
            .with_observer(move |step| sink.lock().push((step.step, step.status)));

        pipeline.run("idea", Locale::En, &CancelToken::new()).await.unwrap();

        let transitions = seen.lock().clone();
        assert_eq!(
            &transitions[..4],
            &[
                (1, StepStatus::Pending),
                (2, StepStatus::Pending),
                (3, StepStatus::Pending),
                (4, StepStatus::Pending),
            ]
        );
        // pending is only ever the announcement, never re-entered
        assert!(transitions[4..].iter().all(|(_, status)| *status != StepStatus::Pending));
    }

    #[tokio::test]
    async fn test_cancel_between_stages() {
        let completer = ScriptedCompleter::new(vec![Ok("prd".to_string())]);
        let cancel = CancelToken::new();
        let trip = cancel.clone();
        // Cancel as soon as stage 1 reports completion.
        let pipeline = pipeline(completer).with_observer(move |step| {
            if step.step == 1 && step.status == StepStatus::Completed {
                trip.cancel();
            }
        });

        let err = pipeline.run("idea", Locale::En, &cancel).await.unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancel_aborts_in_flight_call() {
        let cancel = CancelToken::new();
        let pipeline = Arc::new(pipeline(StallingCompleter { calls: AtomicUsize::new(0) }));
        let runner = Arc::clone(&pipeline);
        let token = cancel.clone();
        let handle =
            tokio::spawn(async move { runner.run("idea", Locale::En, &token).await });

        // Let the run reach the stalled stage-2 call, then cancel.
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        cancel.cancel();

        let result = handle.await.unwrap();
        assert!(matches!(result, Err(PipelineError::Cancelled)));
    }

    #[tokio::test]
    async fn test_cancelled_before_start_makes_no_calls() {
        let completer = ScriptedCompleter::new(vec![]);
        let cancel = CancelToken::new();
        cancel.cancel();
        // An unscripted call would panic, so reaching Cancelled proves no
        // completion was attempted.
        let err = pipeline(completer).run("idea", Locale::En, &cancel).await.unwrap_err();
        assert!(err.is_cancelled());
    }

    #[test]
    fn test_parse_tasks_skips_items_without_title() {
        let features = vec![Feature::new(1, "Core", "")];
        let raw = r#"{"tasks": [{"fid": 1}, {"fid": 1, "title": "Real"}]}"#;
        let tasks = parse_tasks(raw, &features).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Real");
        // index is positional across the raw list
        assert_eq!(tasks[0].id, "task-1-2");
    }

    #[test]
    fn test_parse_tasks_accepts_string_fids() {
        let features = vec![Feature::new(2, "Core", "")];
        let raw = r#"{"tasks": [{"fid": "2", "title": "t", "priority": "Must have"}]}"#;
        let tasks = parse_tasks(raw, &features).unwrap();
        assert_eq!(tasks[0].fid, 2);
        assert_eq!(tasks[0].priority, Some(Priority::MustHave));
    }

    #[test]
    fn test_parse_tasks_empty_list_is_none() {
        let features = vec![Feature::new(1, "Core", "")];
        assert!(parse_tasks(r#"{"tasks": []}"#, &features).is_none());
        assert!(parse_tasks("not json", &features).is_none());
    }
}
