//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `ECOVIEW__*` 覆盖
//! （双下划线表示嵌套，如 `ECOVIEW__LLM__PROVIDER=openai`）。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub a2ui: A2uiSection,
}

/// [app] 段：应用名、对话回放轮数上限
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppSection {
    pub name: Option<String>,
    /// 回放给模型的对话轮数上限
    #[serde(default = "default_max_context_turns")]
    pub max_context_turns: usize,
}

fn default_max_context_turns() -> usize {
    20
}

/// [llm] 段：后端选择
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LlmSection {
    /// 后端：deepseek / openai；优先级由 API Key 与 provider 共同决定
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    pub base_url: Option<String>,
    #[serde(default)]
    pub deepseek: LlmDeepSeekSection,
    #[serde(default)]
    pub openai: LlmOpenAiSection,
}

fn default_provider() -> String {
    "deepseek".to_string()
}

fn default_model() -> String {
    "deepseek-chat".to_string()
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LlmDeepSeekSection {
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LlmOpenAiSection {
    pub model: Option<String>,
}

/// [a2ui] 段：渲染防护
#[derive(Debug, Clone, Deserialize)]
pub struct A2uiSection {
    /// 渲染递归深度上限，防止畸形嵌套耗尽栈
    #[serde(default = "default_max_render_depth")]
    pub max_render_depth: usize,
}

fn default_max_render_depth() -> usize {
    crate::a2ui::DEFAULT_MAX_RENDER_DEPTH
}

impl Default for A2uiSection {
    fn default() -> Self {
        Self {
            max_render_depth: default_max_render_depth(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSection::default(),
            llm: LlmSection::default(),
            a2ui: A2uiSection::default(),
        }
    }
}

/// 从 config 目录加载配置，环境变量 ECOVIEW__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path，则该文件必须存在且可解析（可覆盖前面的键）
/// 3. 最后叠加环境变量 ECOVIEW__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    // 显式传入的配置文件必须存在且可解析
    if let Some(ref path) = config_path {
        builder = builder.add_source(config::File::from(path.clone()).required(true));
    }

    builder = builder.add_source(
        config::Environment::with_prefix("ECOVIEW")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.app.max_context_turns, 20);
        assert_eq!(cfg.llm.provider, "deepseek");
        assert_eq!(cfg.a2ui.max_render_depth, 64);
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("console.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            "[app]\nmax_context_turns = 5\n[a2ui]\nmax_render_depth = 16\n"
        )
        .unwrap();

        let cfg = load_config(Some(path)).unwrap();
        assert_eq!(cfg.app.max_context_turns, 5);
        assert_eq!(cfg.a2ui.max_render_depth, 16);
        // 未覆盖的键保持默认
        assert_eq!(cfg.llm.provider, "deepseek");
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[llm\nprovider =").unwrap();
        assert!(load_config(Some(path)).is_err());
    }

    #[test]
    fn test_load_rejects_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(dir.path().join("absent.toml"))).is_err());
    }
}
