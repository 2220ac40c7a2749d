//! Prompt templates, locale detection and fallback synthesis.
//!
//! The idea text picks one of two locales, which selects the prompt
//! wording and the placeholder content used when a stage's model output is
//! unusable. Fallbacks are deterministic so a run can always finish.

use crate::core::{Feature, Task};

/// Prompt/placeholder language for a generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Zh,
}

impl Locale {
    /// Classify an idea: any CJK unified ideograph selects Chinese.
    pub fn detect(text: &str) -> Self {
        if text.chars().any(|c| matches!(c, '\u{4e00}'..='\u{9fff}')) {
            Self::Zh
        } else {
            Self::En
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Zh => "zh",
        }
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Self::En),
            "zh" => Ok(Self::Zh),
            other => Err(format!("unknown locale '{other}' (expected en or zh)")),
        }
    }
}

/// Stage titles shown while a run progresses.
pub fn step_titles(locale: Locale) -> [&'static str; 4] {
    match locale {
        Locale::En => {
            ["Generating PRD", "Extracting features", "Breaking down tasks", "Finalizing project"]
        }
        Locale::Zh => ["生成PRD", "提取功能", "拆解任务", "完成项目"],
    }
}

/// Stage 1: turn the idea into a short PRD.
pub fn prd_prompt(locale: Locale, idea: &str) -> String {
    match locale {
        Locale::En => format!(
            "Write a concise 150-word Product Requirements Document (PRD) in Markdown for this idea: \"{idea}\". \
             Include sections for Overview, Core Features, and User Experience. Be specific and actionable."
        ),
        Locale::Zh => format!(
            "为这个想法写一份简洁的150字产品需求文档(PRD)，使用Markdown格式：\"{idea}\"。\
             包含概述、核心功能和用户体验部分。内容要具体和可执行。请用中文回复。"
        ),
    }
}

/// Stage 2: extract an MVP feature array from the PRD.
pub fn features_prompt(locale: Locale, prd: &str) -> String {
    match locale {
        Locale::En => format!(
            "Extract 3-5 MVP features from the PRD below, output as JSON array.\n\
             Each feature structure: {{\"id\":number,\"title\":\"string\",\"description\":\"string\"}}\n\
             No other text.\n\
             PRD: {prd}"
        ),
        Locale::Zh => format!(
            "从以下 PRD 中提取 3–5 个 MVP 功能，输出 JSON 数组。\n\
             每个功能结构：{{\"id\":数字,\"title\":\"字符串\",\"description\":\"字符串\"}}\n\
             不要其它文本。\n\
             PRD：{prd}"
        ),
    }
}

/// Stage 3: break each feature into technical tasks.
pub fn tasks_prompt(locale: Locale, features_json: &str) -> String {
    match locale {
        Locale::En => format!(
            "For these features, create 3-4 technical TODO items for each feature as JSON. \
             Format: {{\"tasks\": [{{\"fid\": featureId, \"title\": \"task title\", \"status\": \"todo\"}}]}}. \
             Return ONLY the JSON object, no other text.\n\nFeatures:\n{features_json}"
        ),
        Locale::Zh => format!(
            "为这些功能，为每个功能创建3-4个技术TODO项作为JSON。\
             格式：{{\"tasks\": [{{\"fid\": 功能ID, \"title\": \"任务标题\", \"status\": \"todo\"}}]}}。\
             只返回JSON对象，不要其他文本。\n\n功能:\n{features_json}"
        ),
    }
}

/// Placeholder features used when stage 2 output cannot be parsed.
pub fn fallback_features(locale: Locale) -> Vec<Feature> {
    match locale {
        Locale::En => vec![
            Feature::new(1, "Core Feature 1", "Main functionality"),
            Feature::new(2, "User Interface", "Clean and intuitive UI"),
            Feature::new(3, "Data Management", "Store and manage data"),
        ],
        Locale::Zh => vec![
            Feature::new(1, "核心功能1", "主要功能"),
            Feature::new(2, "用户界面", "干净直观的用户界面"),
            Feature::new(3, "数据管理", "存储和管理数据"),
        ],
    }
}

/// Placeholder tasks used when stage 3 output cannot be parsed: three per
/// feature, always referencing a real feature id.
pub fn fallback_tasks(locale: Locale, features: &[Feature]) -> Vec<Task> {
    features
        .iter()
        .flat_map(|feature| {
            let titles = match locale {
                Locale::En => [
                    format!("Implement {} core logic", feature.title),
                    format!("Create {} UI components", feature.title),
                    format!("Add {} error handling", feature.title),
                ],
                Locale::Zh => [
                    format!("实现{}核心逻辑", feature.title),
                    format!("创建{}UI组件", feature.title),
                    format!("添加{}错误处理", feature.title),
                ],
            };
            titles
                .into_iter()
                .enumerate()
                .map(|(i, title)| Task::new(format!("task-{}-{}", feature.id, i + 1), feature.id, title))
                .collect::<Vec<_>>()
        })
        .collect()
}
