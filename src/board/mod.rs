//! Kanban board mutation engine.
//!
//! Every board change follows the same optimistic protocol: build a new
//! `Project` value from the current one, persist it, and only then hand it
//! back as the authoritative state. On a store failure the caller keeps
//! its pre-mutation value untouched, so the visible board always reflects
//! the last successfully persisted state.
//!
//! Status transitions are unconstrained; the board is a free lattice over
//! the status set, not a gated workflow.

use crate::core::{Feature, Priority, Project, Task, TaskStatus};
use crate::store::{ProjectStore, StoreError};

/// Sentinel feature id tasks are re-pointed to when their feature is
/// deleted. Rendered as "Unassigned".
pub const UNASSIGNED_FID: u32 = 0;

/// A single board change.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Move a task to another column.
    MoveStatus { task_id: String, status: TaskStatus },
    /// Set or clear a task's MoSCoW priority.
    SetPriority { task_id: String, priority: Option<Priority> },
    /// Advance the priority one step in the cycle order.
    CyclePriority { task_id: String },
    EditTask { task_id: String, title: String, description: Option<String> },
    SetTag { task_id: String, tag: Option<String> },
    SetEstimatedEndDate { task_id: String, estimated_end_date: Option<String> },
    SetDuration { task_id: String, duration: Option<u32> },
    /// Re-point a task at another feature.
    ReassignFeature { task_id: String, fid: u32 },
    AddTask(Task),
    DeleteTask { task_id: String },
    AddFeature { title: String, description: String },
    EditFeature { fid: u32, title: String, description: String },
    /// Remove a feature; its tasks move to the unassigned sentinel rather
    /// than being orphaned or destroyed.
    DeleteFeature { fid: u32 },
}

/// Why a mutation did not take effect. The caller's project value is
/// unchanged in every case.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("no task with id '{0}'")]
    UnknownTask(String),

    #[error("task id '{0}' already exists")]
    DuplicateTask(String),

    #[error("no feature with id {0}")]
    UnknownFeature(u32),

    #[error("failed to persist project: {0}")]
    Store(#[from] StoreError),
}

/// Apply a mutation to a copy of the project. Pure: the input is never
/// modified, which is what makes rollback on persist failure trivial.
pub fn apply_mutation(project: &Project, mutation: &Mutation) -> Result<Project, PersistError> {
    match mutation {
        Mutation::MoveStatus { task_id, status } => {
            map_task(project, task_id, |task| task.with_status(*status))
        }
        Mutation::SetPriority { task_id, priority } => {
            map_task(project, task_id, |task| task.with_priority(*priority))
        }
        Mutation::CyclePriority { task_id } => {
            map_task(project, task_id, |task| task.with_priority(Priority::cycle(task.priority)))
        }
        Mutation::EditTask { task_id, title, description } => map_task(project, task_id, |task| {
            task.with_title(title.clone()).with_description(description.clone())
        }),
        Mutation::SetTag { task_id, tag } => {
            map_task(project, task_id, |task| task.with_tag(tag.clone()))
        }
        Mutation::SetEstimatedEndDate { task_id, estimated_end_date } => {
            map_task(project, task_id, |task| {
                task.with_estimated_end_date(estimated_end_date.clone())
            })
        }
        Mutation::SetDuration { task_id, duration } => {
            map_task(project, task_id, |task| task.with_duration(*duration))
        }
        Mutation::ReassignFeature { task_id, fid } => {
            if project.find_feature(*fid).is_none() {
                return Err(PersistError::UnknownFeature(*fid));
            }
            let tag = project.find_feature(*fid).map(|f| f.title.clone());
            map_task(project, task_id, |task| task.with_fid(*fid).with_tag(tag.clone()))
        }
        Mutation::AddTask(task) => {
            if project.find_task(&task.id).is_some() {
                return Err(PersistError::DuplicateTask(task.id.clone()));
            }
            if task.fid != UNASSIGNED_FID && project.find_feature(task.fid).is_none() {
                return Err(PersistError::UnknownFeature(task.fid));
            }
            let mut next = project.clone();
            next.tasks.push(task.clone());
            Ok(next)
        }
        Mutation::DeleteTask { task_id } => {
            if project.find_task(task_id).is_none() {
                return Err(PersistError::UnknownTask(task_id.clone()));
            }
            let mut next = project.clone();
            next.tasks.retain(|t| t.id != *task_id);
            Ok(next)
        }
        Mutation::AddFeature { title, description } => {
            let id = project.features.iter().map(|f| f.id).max().unwrap_or(0) + 1;
            let mut next = project.clone();
            next.features.push(Feature::new(id, title.clone(), description.clone()));
            Ok(next)
        }
        Mutation::EditFeature { fid, title, description } => {
            let mut next = project.clone();
            let feature = next
                .features
                .iter_mut()
                .find(|f| f.id == *fid)
                .ok_or(PersistError::UnknownFeature(*fid))?;
            feature.title = title.clone();
            feature.description = description.clone();
            Ok(next)
        }
        Mutation::DeleteFeature { fid } => {
            if project.find_feature(*fid).is_none() {
                return Err(PersistError::UnknownFeature(*fid));
            }
            let mut next = project.clone();
            next.features.retain(|f| f.id != *fid);
            next.tasks = next
                .tasks
                .iter()
                .map(|task| {
                    if task.fid == *fid {
                        task.with_fid(UNASSIGNED_FID).with_tag(None)
                    } else {
                        task.clone()
                    }
                })
                .collect();
            Ok(next)
        }
    }
}

fn map_task(
    project: &Project,
    task_id: &str,
    f: impl Fn(&Task) -> Task,
) -> Result<Project, PersistError> {
    if project.find_task(task_id).is_none() {
        return Err(PersistError::UnknownTask(task_id.to_string()));
    }
    let mut next = project.clone();
    next.tasks = next
        .tasks
        .iter()
        .map(|task| if task.id == task_id { f(task) } else { task.clone() })
        .collect();
    Ok(next)
}

/// Applies mutations with optimistic persistence.
pub struct BoardEngine<S> {
    store: S,
}

impl<S: ProjectStore> BoardEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Apply one mutation and persist the result.
    ///
    /// Returns the new authoritative project on success. On failure the
    /// caller's `project` is still the last persisted state and must stay
    /// visible; nothing is partially applied.
    pub async fn apply(
        &self,
        project: &Project,
        mutation: &Mutation,
    ) -> Result<Project, PersistError> {
        let updated = apply_mutation(project, mutation)?;
        self.store.upsert(&updated).await?;
        tracing::debug!(project = %updated.id, "Board mutation persisted");
        Ok(updated)
    }
}
