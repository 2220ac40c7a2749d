//! Hosted model provider catalog.
//!
//! A static table of the providers the settings UI offers, their model
//! lists and default endpoints. Pure lookup: no I/O, no failure modes
//! beyond "not found".

/// A hosted model provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Provider {
    pub id: &'static str,
    pub name: &'static str,
    pub default_endpoint: &'static str,
    pub models: &'static [Model],
}

/// A model offered by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Model {
    pub id: &'static str,
    pub name: &'static str,
}

/// Every provider the settings surface knows about.
pub const PROVIDERS: &[Provider] = &[
    Provider {
        id: "openai",
        name: "OpenAI",
        default_endpoint: "https://api.openai.com/v1/chat/completions",
        models: &[
            Model { id: "gpt-4.1", name: "GPT-4.1" },
            Model { id: "gpt-4.1-mini", name: "GPT-4.1 Mini" },
            Model { id: "gpt-4o", name: "GPT-4o" },
            Model { id: "gpt-4o-mini", name: "GPT-4o Mini" },
            Model { id: "o3", name: "o3" },
            Model { id: "o1", name: "o1" },
            Model { id: "o1-mini", name: "o1-mini" },
        ],
    },
    Provider {
        id: "anthropic",
        name: "Anthropic",
        default_endpoint: "https://api.anthropic.com/v1/messages",
        models: &[
            Model { id: "claude-opus-4-1", name: "Claude Opus 4.1" },
            Model { id: "claude-opus-4", name: "Claude Opus 4" },
            Model { id: "claude-sonnet-4", name: "Claude Sonnet 4" },
            Model { id: "claude-3-7-sonnet", name: "Claude 3.7 Sonnet" },
            Model { id: "claude-3-5-haiku", name: "Claude 3.5 Haiku" },
        ],
    },
    Provider {
        id: "gemini",
        name: "Gemini",
        default_endpoint: "https://generativelanguage.googleapis.com/v1beta/models",
        models: &[
            Model { id: "gemini-2.0-pro", name: "Gemini 2.0 Pro" },
            Model { id: "gemini-2.0-flash", name: "Gemini 2.0 Flash" },
            Model { id: "gemini-1.5-pro", name: "Gemini 1.5 Pro" },
            Model { id: "gemini-1.5-flash", name: "Gemini 1.5 Flash" },
        ],
    },
    Provider {
        id: "grok",
        name: "Grok",
        default_endpoint: "https://api.x.ai",
        models: &[
            Model { id: "grok-beta", name: "Grok Beta" },
            Model { id: "grok-2", name: "Grok-2" },
        ],
    },
    Provider {
        id: "zhipu",
        name: "Zhipu",
        default_endpoint: "https://open.bigmodel.cn/api/paas/v4/chat/completions",
        models: &[
            Model { id: "glm-4.5", name: "GLM-4.5" },
            Model { id: "glm-4.5-air", name: "GLM-4.5 Air" },
            Model { id: "glm-4-plus", name: "GLM-4 Plus" },
            Model { id: "glm-4-flash", name: "GLM-4 Flash" },
        ],
    },
    Provider {
        id: "deepseek",
        name: "DeepSeek",
        default_endpoint: "https://api.deepseek.com/v1/chat/completions",
        models: &[
            Model { id: "deepseek-reasoner", name: "DeepSeek-R1" },
            Model { id: "deepseek-chat", name: "DeepSeek-V3" },
        ],
    },
    Provider {
        id: "moonshot",
        name: "Moonshot",
        default_endpoint: "https://api.moonshot.cn/v1/chat/completions",
        models: &[
            Model { id: "kimi-k2-0905-preview", name: "Kimi K2 0905" },
            Model { id: "kimi-k2-0711-preview", name: "Kimi K2 0711" },
            Model { id: "moonshot-v1-128k", name: "Moonshot V1 128K" },
        ],
    },
    Provider {
        id: "alibaba",
        name: "Aliyun",
        default_endpoint: "https://dashscope.aliyuncs.com/api/v1/services/aigc/text-generation/generation",
        models: &[
            Model { id: "qwen-max", name: "Qwen Max" },
            Model { id: "qwen-max-longcontext", name: "Qwen Max LongContext" },
            Model { id: "qwen-plus", name: "Qwen Plus" },
            Model { id: "qwen-turbo", name: "Qwen Turbo" },
            Model { id: "qwen3-235b", name: "Qwen3 235B" },
        ],
    },
    Provider {
        id: "siliconflow",
        name: "SiliconFlow",
        default_endpoint: "https://api.siliconflow.cn/v1/chat/completions",
        models: &[
            Model { id: "Qwen/Qwen3-235B-A22B-Instruct", name: "Qwen3 235B" },
            Model { id: "moonshotai/Kimi-K2-Instruct", name: "Kimi K2 Instruct" },
            Model { id: "deepseek-ai/DeepSeek-R1", name: "DeepSeek-R1" },
            Model { id: "deepseek-ai/DeepSeek-V3", name: "DeepSeek-V3" },
            Model { id: "Qwen/Qwen2.5-72B-Instruct", name: "Qwen2.5 72B" },
        ],
    },
];

/// Look up a provider by id.
pub fn find_provider(id: &str) -> Option<&'static Provider> {
    PROVIDERS.iter().find(|p| p.id == id)
}

/// Look up a model within a provider.
pub fn find_model(provider_id: &str, model_id: &str) -> Option<&'static Model> {
    find_provider(provider_id)?.models.iter().find(|m| m.id == model_id)
}

/// A provider's default endpoint, or the empty string when unknown.
pub fn default_endpoint(provider_id: &str) -> &'static str {
    find_provider(provider_id).map_or("", |p| p.default_endpoint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_provider() {
        let provider = find_provider("anthropic").unwrap();
        assert_eq!(provider.name, "Anthropic");
        assert!(find_provider("nonexistent").is_none());
    }

    #[test]
    fn test_find_model() {
        let model = find_model("openai", "gpt-4o").unwrap();
        assert_eq!(model.name, "GPT-4o");
        assert!(find_model("openai", "claude-sonnet-4").is_none());
        assert!(find_model("nonexistent", "gpt-4o").is_none());
    }

    #[test]
    fn test_default_endpoint_empty_when_unknown() {
        assert_eq!(default_endpoint("deepseek"), "https://api.deepseek.com/v1/chat/completions");
        assert_eq!(default_endpoint("nonexistent"), "");
    }

    #[test]
    fn test_catalog_ids_are_unique() {
        let mut ids: Vec<_> = PROVIDERS.iter().map(|p| p.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), PROVIDERS.len());
    }

    #[test]
    fn test_every_provider_has_models_and_endpoint() {
        for provider in PROVIDERS {
            assert!(!provider.models.is_empty(), "{} has no models", provider.id);
            assert!(provider.default_endpoint.starts_with("https://"), "{}", provider.id);
        }
    }
}
