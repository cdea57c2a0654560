use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub embeddings: EmbeddingConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub synthesis: SynthesisConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "data/integrity.db".to_string(),
        }
    }
}

/// Which files a directory argument expands to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            include: vec!["**/*.txt".to_string(), "**/*.md".to_string()],
            exclude: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// `hashing` or `openai`.
    pub provider: String,
    pub model: String,
    pub dimension: usize,
    /// Overrides the provider's own character budget when set.
    #[serde(default)]
    pub max_chars: Option<usize>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "hashing".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimension: 100,
            max_chars: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Matches must score strictly above this.
    pub threshold: f32,
    pub max_matches: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            threshold: 0.75,
            max_matches: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// LLM provider name; falls back to the registry's preferred model.
    #[serde(default)]
    pub provider: Option<String>,
    pub max_prompt_chars: usize,
    pub timeout_secs: u64,
    pub prompt_sources: usize,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            provider: None,
            max_prompt_chars: 3000,
            timeout_secs: 30,
            prompt_sources: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub chat_model: String,
    pub max_retries: u32,
    pub request_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            api_key: None,
            chat_model: "gpt-4o-mini".to_string(),
            max_retries: 2,
            request_timeout_secs: 25,
        }
    }
}

pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut settings = config::Config::builder();
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    settings = settings.add_source(
        config::Environment::with_prefix("INTEGRITY")
            .prefix_separator("__")
            .separator("__"),
    );
    let mut cfg: AppConfig = settings.build()?.try_deserialize()?;
    if cfg.llm.api_key.is_none() {
        cfg.llm.api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());
    }
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn empty_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.toml");
        fs::write(&path, "").unwrap();
        let cfg = load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(cfg.ranking.threshold, 0.75);
        assert_eq!(cfg.ranking.max_matches, 5);
        assert_eq!(cfg.embeddings.provider, "hashing");
        assert_eq!(cfg.embeddings.dimension, 100);
        assert_eq!(cfg.synthesis.max_prompt_chars, 3000);
        assert_eq!(cfg.llm.max_retries, 2);
    }

    #[test]
    fn file_overrides_sections() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(
            &path,
            r#"
            [ranking]
            threshold = 0.5
            max_matches = 10

            [synthesis]
            max_prompt_chars = 1000
            timeout_secs = 5
            prompt_sources = 2
            "#,
        )
        .unwrap();
        let cfg = load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(cfg.ranking.threshold, 0.5);
        assert_eq!(cfg.ranking.max_matches, 10);
        assert_eq!(cfg.synthesis.timeout_secs, 5);
        assert!(cfg.synthesis.provider.is_none());
        assert_eq!(cfg.database.path, "data/integrity.db");
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.toml");
        fs::write(&path, "[ranking]\nthreshold = 0.5\n\n[llm]\nchat_model = \"gpt-4o\"\n").unwrap();
        let cfg = load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(cfg.ranking.threshold, 0.5);
        assert_eq!(cfg.ranking.max_matches, 5);
        assert_eq!(cfg.llm.chat_model, "gpt-4o");
        assert_eq!(cfg.llm.base_url, "https://api.openai.com");
        assert_eq!(cfg.llm.max_retries, 2);
    }

    // Both key sources live in one test so parallel tests never see a
    // half-set environment.
    #[test]
    fn api_key_from_environment() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.toml");
        fs::write(&path, "").unwrap();
        let path = path.to_str().unwrap();

        std::env::set_var("OPENAI_API_KEY", "sk-openai");
        let cfg = load(Some(path)).unwrap();
        assert_eq!(cfg.llm.api_key.as_deref(), Some("sk-openai"));
        assert_eq!(cfg.llm.base_url, "https://api.openai.com");

        std::env::set_var("INTEGRITY__LLM__API_KEY", "sk-test");
        let cfg = load(Some(path)).unwrap();
        assert_eq!(cfg.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(cfg.llm.chat_model, "gpt-4o-mini");

        std::env::remove_var("INTEGRITY__LLM__API_KEY");
        std::env::remove_var("OPENAI_API_KEY");
    }
}
