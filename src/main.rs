//! Ideaboard - idea to kanban board, via your favorite LLM.
//!
//! Generates a PRD, feature list and task breakdown from a one-line idea,
//! then manages the result as a kanban board in the terminal.

use std::io;

use anyhow::{anyhow, bail, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ideaboard::{
    BoardEngine, CancelToken, CompletionClient, GenerationPipeline, JsonFileStore, Locale,
    ModelConfig, ModelType, Mutation, Priority, Project, ProjectStore, StepStatus, Task,
    TaskStatus,
};

/// Idea to kanban board, via your favorite LLM
#[derive(Parser)]
#[command(name = "ideaboard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new project from a one-line idea
    Generate {
        /// The idea, e.g. "habit tracker web app"
        idea: String,

        /// Project name (defaults to the idea)
        #[arg(long)]
        name: Option<String>,

        /// Prompt language: auto, en or zh
        #[arg(long, default_value = "auto")]
        locale: String,
    },

    /// List all projects
    List,

    /// Show a project's PRD, features and tasks
    Show {
        /// Project id or name (unique prefix works)
        project: String,
    },

    /// Show a project as kanban columns
    Board {
        /// Project id or name
        project: String,
    },

    /// Move a task to another column
    Move {
        /// Project id or name
        project: String,
        /// Task id, e.g. task-1-2
        task: String,
        /// Target column: todo, doing, testing, fixing or done
        status: TaskStatus,
    },

    /// Set, cycle or clear a task's MoSCoW priority
    Priority {
        /// Project id or name
        project: String,
        /// Task id
        task: String,
        /// Priority level (must, should, could, wont)
        level: Option<String>,
        /// Advance one step in the priority cycle
        #[arg(long, conflicts_with = "level")]
        cycle: bool,
        /// Unset the priority
        #[arg(long, conflicts_with_all = ["level", "cycle"])]
        clear: bool,
    },

    /// Add, edit or remove tasks
    Task {
        #[command(subcommand)]
        op: TaskOp,
    },

    /// Add, edit or remove features
    Feature {
        #[command(subcommand)]
        op: FeatureOp,
    },

    /// Create the bundled demo project
    Demo,

    /// Delete a project
    Rm {
        /// Project id or name
        project: String,
    },

    /// Show or change the model configuration
    Config {
        #[command(subcommand)]
        op: ConfigOp,
    },

    /// List the hosted model providers this build knows about
    Providers {
        /// Also list each provider's models
        #[arg(long)]
        models: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum TaskOp {
    /// Add a task to a feature
    Add {
        project: String,
        /// Feature id the task belongs to
        fid: u32,
        title: String,
        #[arg(long)]
        description: Option<String>,
    },

    /// Edit a task's title and/or description
    Edit {
        project: String,
        task: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },

    /// Remove a task
    Rm { project: String, task: String },

    /// Set or clear a task's tag
    Tag { project: String, task: String, tag: Option<String> },

    /// Set or clear a task's estimated end date (ISO-8601)
    Due { project: String, task: String, date: Option<String> },

    /// Set or clear a task's estimated duration in hours
    Duration { project: String, task: String, hours: Option<u32> },

    /// Re-point a task at another feature
    Assign { project: String, task: String, fid: u32 },
}

#[derive(Subcommand)]
enum FeatureOp {
    /// Add a feature
    Add {
        project: String,
        title: String,
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Edit a feature's title and/or description
    Edit {
        project: String,
        fid: u32,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },

    /// Remove a feature (its tasks become unassigned)
    Rm { project: String, fid: u32 },
}

#[derive(Subcommand)]
enum ConfigOp {
    /// Print the current configuration
    Show,

    /// Print the config file path
    Path,

    /// Change configuration values
    Set {
        /// Backend type: ollama or online
        #[arg(long)]
        model_type: Option<String>,
        /// Local inference server URL
        #[arg(long)]
        ollama_url: Option<String>,
        /// Local model name
        #[arg(long)]
        model_name: Option<String>,
        /// Hosted provider id (see `ideaboard providers`)
        #[arg(long)]
        provider: Option<String>,
        /// Hosted model id
        #[arg(long)]
        model: Option<String>,
        /// Custom endpoint (empty uses the provider default)
        #[arg(long)]
        endpoint: Option<String>,
        /// API key for the hosted provider
        #[arg(long)]
        api_key: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose { EnvFilter::new("debug") } else { EnvFilter::new("warn") };
    tracing_subscriber::registry().with(fmt::layer().with_target(false)).with(filter).init();

    match cli.command {
        Commands::Generate { idea, name, locale } => cmd_generate(&idea, name, &locale),
        Commands::List => cmd_list(),
        Commands::Show { project } => cmd_show(&project),
        Commands::Board { project } => cmd_board(&project),
        Commands::Move { project, task, status } => {
            cmd_mutate(&project, |_| Ok(Mutation::MoveStatus { task_id: task.clone(), status }))
        }
        Commands::Priority { project, task, level, cycle, clear } => {
            cmd_priority(&project, &task, level.as_deref(), cycle, clear)
        }
        Commands::Task { op } => cmd_task(op),
        Commands::Feature { op } => cmd_feature(op),
        Commands::Demo => cmd_demo(),
        Commands::Rm { project } => cmd_rm(&project),
        Commands::Config { op } => cmd_config(op),
        Commands::Providers { models } => cmd_providers(models),
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "ideaboard", &mut io::stdout());
            Ok(())
        }
    }
}

// ============================================================================
// Generation
// ============================================================================

fn cmd_generate(idea: &str, name: Option<String>, locale: &str) -> Result<()> {
    let config = ModelConfig::load();
    let locale = match locale {
        "auto" => Locale::detect(idea),
        other => other.parse::<Locale>().map_err(|e| anyhow!(e))?,
    };

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || handler_token.cancel())?;

    let pipeline =
        GenerationPipeline::new(CompletionClient::new(), config).with_observer(|step| match step
            .status
        {
            StepStatus::Generating => println!("[{}/4] {}...", step.step, step.title),
            StepStatus::Error => eprintln!("[{}/4] {} failed", step.step, step.title),
            StepStatus::Pending | StepStatus::Completed => {}
        });

    let rt = tokio::runtime::Runtime::new()?;
    match rt.block_on(pipeline.run(idea, locale, &cancel)) {
        Ok(generated) => {
            let project = generated.into_project(name.unwrap_or_else(|| default_name(idea)));
            let store = open_store()?;
            rt.block_on(store.upsert(&project))?;
            println!("\nCreated project '{}' ({})", project.name, project.id);
            println!("  {} features, {} tasks", project.features.len(), project.tasks.len());
            println!("  ideaboard board {}", project.id);
            Ok(())
        }
        Err(e) if e.is_cancelled() => {
            println!("\nGeneration cancelled; nothing was saved.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn default_name(idea: &str) -> String {
    let trimmed = idea.trim();
    if trimmed.chars().count() > 60 {
        trimmed.chars().take(60).collect()
    } else {
        trimmed.to_string()
    }
}

// ============================================================================
// Board commands
// ============================================================================

fn cmd_list() -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    let store = open_store()?;
    let projects = rt.block_on(store.list_all())?;
    if projects.is_empty() {
        println!("No projects yet. Try: ideaboard generate \"your idea\"");
        return Ok(());
    }
    for project in projects {
        let done = project.tasks_by_status(TaskStatus::Done).len();
        println!(
            "{}  {} ({} features, {}/{} tasks done)",
            project.id,
            project.name,
            project.features.len(),
            done,
            project.tasks.len()
        );
    }
    Ok(())
}

fn cmd_show(ident: &str) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    let store = open_store()?;
    let project = rt.block_on(find_project(&store, ident))?;

    println!("{} ({})", project.name, project.id);
    println!("started {}\n", project.start_at);
    if !project.prd.is_empty() {
        println!("{}\n", project.prd);
    }
    println!("Features:");
    for feature in &project.features {
        println!("  [{}] {} - {}", feature.id, feature.title, feature.description);
    }
    println!("\nTasks:");
    for task in &project.tasks {
        let priority = task.priority.map_or(String::new(), |p| format!(" ({p})"));
        println!(
            "  {} [{}] {}{} #{}",
            task.id,
            task.status,
            task.title,
            priority,
            project.feature_label(task.fid)
        );
    }
    Ok(())
}

fn cmd_board(ident: &str) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    let store = open_store()?;
    let project = rt.block_on(find_project(&store, ident))?;

    println!("{} ({})", project.name, project.id);
    for status in TaskStatus::ALL {
        let tasks = project.tasks_by_status(status);
        println!("\n{} ({})", status, tasks.len());
        for task in tasks {
            let priority = task.priority.map_or(String::new(), |p| format!(" ({p})"));
            println!("  {} {}{}", task.id, task.title, priority);
        }
    }
    Ok(())
}

/// Find a project, apply one mutation, report the change.
fn cmd_mutate(ident: &str, build: impl FnOnce(&Project) -> Result<Mutation>) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    let store = open_store()?;
    let updated = rt.block_on(async {
        let project = find_project(&store, ident).await?;
        let mutation = build(&project)?;
        let engine = BoardEngine::new(store);
        let updated = engine.apply(&project, &mutation).await?;
        Ok::<_, anyhow::Error>(updated)
    })?;
    println!("Saved '{}'", updated.name);
    Ok(())
}

fn cmd_priority(ident: &str, task: &str, level: Option<&str>, cycle: bool, clear: bool) -> Result<()> {
    let task_id = task.to_string();
    let mutation = if cycle {
        Mutation::CyclePriority { task_id }
    } else if clear {
        Mutation::SetPriority { task_id, priority: None }
    } else {
        let level = level.ok_or_else(|| anyhow!("give a priority level, --cycle or --clear"))?;
        let priority = Priority::parse(level)
            .ok_or_else(|| anyhow!("unknown priority '{level}' (must, should, could or wont)"))?;
        Mutation::SetPriority { task_id, priority: Some(priority) }
    };
    cmd_mutate(ident, |_| Ok(mutation))
}

fn cmd_task(op: TaskOp) -> Result<()> {
    match op {
        TaskOp::Add { project, fid, title, description } => cmd_mutate(&project, |p| {
            // Deleted tasks leave suffix gaps, so the next id comes from the
            // highest suffix already issued for this feature, not the count.
            let prefix = format!("task-{fid}-");
            let n = p
                .tasks
                .iter()
                .filter_map(|t| t.id.strip_prefix(&prefix)?.parse::<u32>().ok())
                .max()
                .unwrap_or(0)
                + 1;
            let mut task = Task::new(format!("task-{fid}-{n}"), fid, title);
            task.description = description;
            task.tag = p.find_feature(fid).map(|f| f.title.clone());
            Ok(Mutation::AddTask(task))
        }),
        TaskOp::Edit { project, task, title, description } => cmd_mutate(&project, |p| {
            let current =
                p.find_task(&task).ok_or_else(|| anyhow!("no task with id '{task}'"))?;
            Ok(Mutation::EditTask {
                task_id: task.clone(),
                title: title.unwrap_or_else(|| current.title.clone()),
                description: description.or_else(|| current.description.clone()),
            })
        }),
        TaskOp::Rm { project, task } => {
            cmd_mutate(&project, |_| Ok(Mutation::DeleteTask { task_id: task.clone() }))
        }
        TaskOp::Tag { project, task, tag } => {
            cmd_mutate(&project, |_| Ok(Mutation::SetTag { task_id: task.clone(), tag }))
        }
        TaskOp::Due { project, task, date } => cmd_mutate(&project, |_| {
            Ok(Mutation::SetEstimatedEndDate { task_id: task.clone(), estimated_end_date: date })
        }),
        TaskOp::Duration { project, task, hours } => cmd_mutate(&project, |_| {
            Ok(Mutation::SetDuration { task_id: task.clone(), duration: hours })
        }),
        TaskOp::Assign { project, task, fid } => {
            cmd_mutate(&project, |_| Ok(Mutation::ReassignFeature { task_id: task.clone(), fid }))
        }
    }
}

fn cmd_feature(op: FeatureOp) -> Result<()> {
    match op {
        FeatureOp::Add { project, title, description } => {
            cmd_mutate(&project, |_| Ok(Mutation::AddFeature { title, description }))
        }
        FeatureOp::Edit { project, fid, title, description } => cmd_mutate(&project, |p| {
            let current =
                p.find_feature(fid).ok_or_else(|| anyhow!("no feature with id {fid}"))?;
            Ok(Mutation::EditFeature {
                fid,
                title: title.unwrap_or_else(|| current.title.clone()),
                description: description.unwrap_or_else(|| current.description.clone()),
            })
        }),
        FeatureOp::Rm { project, fid } => {
            cmd_mutate(&project, |_| Ok(Mutation::DeleteFeature { fid }))
        }
    }
}

fn cmd_demo() -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    let store = open_store()?;
    let project = Project::demo();
    rt.block_on(store.upsert(&project))?;
    println!("Created project '{}' ({})", project.name, project.id);
    Ok(())
}

fn cmd_rm(ident: &str) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    let store = open_store()?;
    let project = rt.block_on(find_project(&store, ident))?;
    rt.block_on(store.remove(&project.id))?;
    println!("Deleted '{}'", project.name);
    Ok(())
}

// ============================================================================
// Config & providers
// ============================================================================

fn cmd_config(op: ConfigOp) -> Result<()> {
    match op {
        ConfigOp::Show => {
            let mut config = ModelConfig::load();
            if !config.api_key.is_empty() {
                config.api_key = "****".to_string();
            }
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        ConfigOp::Path => {
            let path = ModelConfig::config_path()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?;
            println!("{}", path.display());
            Ok(())
        }
        ConfigOp::Set { model_type, ollama_url, model_name, provider, model, endpoint, api_key } => {
            let mut config = ModelConfig::load();
            if let Some(model_type) = model_type {
                config.model_type = match model_type.as_str() {
                    "ollama" => ModelType::Ollama,
                    "online" => ModelType::Online,
                    other => bail!("unknown model type '{other}' (ollama or online)"),
                };
            }
            if let Some(url) = ollama_url {
                config.ollama_url = url;
            }
            if let Some(name) = model_name {
                config.model_name = name;
            }
            if let Some(provider) = provider {
                if ideaboard::providers::find_provider(&provider).is_none() {
                    bail!("unknown provider '{provider}' (see `ideaboard providers`)");
                }
                config.selected_provider = provider;
            }
            if let Some(model) = model {
                config.selected_model = model;
            }
            if let Some(endpoint) = endpoint {
                config.custom_endpoint = endpoint;
            }
            if let Some(key) = api_key {
                config.api_key = key;
            }
            config.save()?;
            println!("Saved configuration");
            Ok(())
        }
    }
}

fn cmd_providers(models: bool) -> Result<()> {
    for provider in ideaboard::providers::PROVIDERS {
        println!("{}  {} ({})", provider.id, provider.name, provider.default_endpoint);
        if models {
            for model in provider.models {
                println!("    {}  {}", model.id, model.name);
            }
        }
    }
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

fn open_store() -> Result<JsonFileStore> {
    Ok(JsonFileStore::open_default()?)
}

/// Resolve a project by id, exact name or unique id prefix.
async fn find_project(store: &JsonFileStore, ident: &str) -> Result<Project> {
    if let Some(project) = store.get_by_id(ident).await? {
        return Ok(project);
    }
    let mut matches: Vec<_> = store
        .list_all()
        .await?
        .into_iter()
        .filter(|p| p.name == ident || p.id.starts_with(ident))
        .collect();
    match matches.len() {
        1 => Ok(matches.remove(0)),
        0 => bail!("no project matching '{ident}' (try `ideaboard list`)"),
        _ => bail!("'{ident}' matches more than one project, use the full id"),
    }
}
