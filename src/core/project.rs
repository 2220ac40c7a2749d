//! Project data model.
//!
//! Projects, features and tasks are immutable value records: every change
//! produces a new value via the `with_*` constructors, and the board engine
//! persists the new value before it becomes visible. The serialized shapes
//! (camelCase keys, `fid` foreign key, lowercase status strings) are the
//! stored on-disk format and must stay stable.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kanban column a task sits in.
///
/// Any status may move to any other status; the board is not a gated
/// workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Todo,
    Doing,
    Testing,
    Fixing,
    Done,
}

impl TaskStatus {
    /// All statuses in board column order.
    pub const ALL: [Self; 5] = [Self::Todo, Self::Doing, Self::Testing, Self::Fixing, Self::Done];

    /// The serialized (and CLI-facing) name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::Doing => "doing",
            Self::Testing => "testing",
            Self::Fixing => "fixing",
            Self::Done => "done",
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "todo" => Ok(Self::Todo),
            "doing" => Ok(Self::Doing),
            "testing" => Ok(Self::Testing),
            "fixing" => Ok(Self::Fixing),
            "done" => Ok(Self::Done),
            other => {
                Err(format!("unknown status '{other}' (expected todo, doing, testing, fixing or done)"))
            }
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// MoSCoW task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    #[serde(rename = "Must have")]
    MustHave,
    #[serde(rename = "Should have")]
    ShouldHave,
    #[serde(rename = "Could have")]
    CouldHave,
    #[serde(rename = "Won't have")]
    WontHave,
}

impl Priority {
    /// The serialized display string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MustHave => "Must have",
            Self::ShouldHave => "Should have",
            Self::CouldHave => "Could have",
            Self::WontHave => "Won't have",
        }
    }

    /// Parse a priority string, tolerating shorthand like "must".
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "must have" | "must" | "musthave" => Some(Self::MustHave),
            "should have" | "should" | "shouldhave" => Some(Self::ShouldHave),
            "could have" | "could" | "couldhave" => Some(Self::CouldHave),
            "won't have" | "wont have" | "wont" | "wonthave" => Some(Self::WontHave),
            _ => None,
        }
    }

    /// Next value in the click-to-cycle order, ending at "unset".
    pub fn cycle(current: Option<Self>) -> Option<Self> {
        match current {
            None => Some(Self::MustHave),
            Some(Self::MustHave) => Some(Self::ShouldHave),
            Some(Self::ShouldHave) => Some(Self::CouldHave),
            Some(Self::CouldHave) => Some(Self::WontHave),
            Some(Self::WontHave) => None,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single unit of work on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique within the owning project (e.g. `task-2-5`).
    pub id: String,
    /// Id of the feature this task belongs to.
    pub fid: u32,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// Usually the parent feature title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// ISO-8601 date or datetime string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_end_date: Option<String>,
    /// Estimated duration in hours.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

impl Task {
    /// Create a new todo task.
    pub fn new(id: impl Into<String>, fid: u32, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fid,
            title: title.into(),
            description: None,
            status: TaskStatus::Todo,
            priority: None,
            tag: None,
            estimated_end_date: None,
            duration: None,
        }
    }

    pub fn with_status(&self, status: TaskStatus) -> Self {
        Self { status, ..self.clone() }
    }

    pub fn with_priority(&self, priority: Option<Priority>) -> Self {
        Self { priority, ..self.clone() }
    }

    pub fn with_title(&self, title: impl Into<String>) -> Self {
        Self { title: title.into(), ..self.clone() }
    }

    pub fn with_description(&self, description: Option<String>) -> Self {
        Self { description, ..self.clone() }
    }

    pub fn with_tag(&self, tag: Option<String>) -> Self {
        Self { tag, ..self.clone() }
    }

    pub fn with_estimated_end_date(&self, estimated_end_date: Option<String>) -> Self {
        Self { estimated_end_date, ..self.clone() }
    }

    pub fn with_duration(&self, duration: Option<u32>) -> Self {
        Self { duration, ..self.clone() }
    }

    pub fn with_fid(&self, fid: u32) -> Self {
        Self { fid, ..self.clone() }
    }
}

/// A product feature extracted from the PRD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Unique within the owning project, assigned from 1 upward.
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl Feature {
    pub fn new(id: u32, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self { id, title: title.into(), description: description.into() }
    }
}

/// A generated project: PRD text plus its features and tasks.
///
/// Features and tasks are owned exclusively by their project; nothing is
/// shared across projects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    /// ISO-8601 start timestamp.
    pub start_at: String,
    /// The generated Product Requirements Document (markdown).
    pub prd: String,
    pub features: Vec<Feature>,
    pub tasks: Vec<Task>,
}

impl Project {
    /// Create a project with a fresh id, starting now.
    pub fn new(
        name: impl Into<String>,
        prd: impl Into<String>,
        features: Vec<Feature>,
        tasks: Vec<Task>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            start_at: Utc::now().to_rfc3339(),
            prd: prd.into(),
            features,
            tasks,
        }
    }

    /// Title of the feature a task points at, or a placeholder when the
    /// reference is broken. Reads must tolerate dangling `fid`s.
    pub fn feature_label(&self, fid: u32) -> &str {
        self.features
            .iter()
            .find(|f| f.id == fid)
            .map_or("Unassigned", |f| f.title.as_str())
    }

    pub fn find_task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn find_feature(&self, fid: u32) -> Option<&Feature> {
        self.features.iter().find(|f| f.id == fid)
    }

    /// Tasks in a given board column, in stored order.
    pub fn tasks_by_status(&self, status: TaskStatus) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.status == status).collect()
    }

    /// The bundled demo project, handy for trying the board commands
    /// without a model configured.
    pub fn demo() -> Self {
        let prd = "\
# Product Requirements Document: Minimalist Habit Tracker Web App

## Overview
A clean, intuitive web application that helps users build and maintain positive habits through simple daily tracking.

## Core Features
- **Habit Creation**: Users can create custom habits with names and optional descriptions
- **Daily Tracking**: Simple checkbox interface to mark habits as completed each day
- **Visual Progress**: Clean streak counters and progress indicators
- **Responsive Design**: Works seamlessly across desktop and mobile devices

## User Experience
The app prioritizes simplicity and speed, allowing users to quickly check off completed habits without friction. Visual feedback encourages consistency through streak tracking and subtle animations.";

        let features = vec![
            Feature::new(
                1,
                "Habit Management System",
                "Create, edit, and delete personal habits with custom names and descriptions",
            ),
            Feature::new(
                2,
                "Daily Check-in Interface",
                "Simple, fast checkbox interface for marking daily habit completion",
            ),
            Feature::new(
                3,
                "Progress Tracking",
                "Visual streak counters and completion statistics to motivate users",
            ),
            Feature::new(
                4,
                "Responsive Mobile Design",
                "Mobile-optimized interface for quick habit tracking on any device",
            ),
        ];

        let titles = [
            (1, "Create habit data models and interfaces"),
            (1, "Build habit creation form with validation"),
            (1, "Implement habit editing and deletion functionality"),
            (1, "Add persistence for habit data"),
            (2, "Design daily habit list component"),
            (2, "Create checkbox interaction with smooth animations"),
            (2, "Build date navigation for viewing different days"),
            (3, "Calculate and display current streaks"),
            (3, "Create progress visualization charts"),
            (3, "Add completion percentage statistics"),
            (4, "Implement responsive grid layout"),
            (4, "Optimize touch interactions for mobile"),
            (4, "Test and refine mobile user experience"),
        ];

        let mut seen_per_feature = std::collections::HashMap::new();
        let tasks = titles
            .iter()
            .map(|&(fid, title)| {
                let n = seen_per_feature.entry(fid).or_insert(0u32);
                *n += 1;
                Task::new(format!("task-{fid}-{n}"), fid, title)
            })
            .collect();

        Self {
            id: "demo-habit-tracker".to_string(),
            name: "Habit Tracker Web App".to_string(),
            start_at: Utc::now().to_rfc3339(),
            prd: prd.to_string(),
            features,
            tasks,
        }
    }
}
