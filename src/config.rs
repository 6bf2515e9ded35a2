use anyhow::Result;
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "webfreq.toml";

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub chart: ChartConfig,
    #[serde(default)]
    pub wordcloud: WordCloudConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// text 或 json
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

#[derive(Debug, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

#[derive(Debug, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_limit")]
    pub default_limit: i64,
    #[serde(default = "default_max_limit")]
    pub max_limit: i64,
    #[serde(default = "default_style")]
    pub default_style: String,
}

#[derive(Debug, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "default_chart_title")]
    pub title: String,
    #[serde(default = "default_value_label")]
    pub value_label: String,
    #[serde(default = "default_word_label")]
    pub word_label: String,
    #[serde(default = "default_plotly_js_url")]
    pub plotly_js_url: String,
}

#[derive(Debug, Deserialize)]
pub struct WordCloudConfig {
    #[serde(default = "default_background")]
    pub background: String,
    #[serde(default = "default_cloud_width")]
    pub width: u32,
    #[serde(default = "default_cloud_height")]
    pub height: u32,
    #[serde(default = "default_max_words")]
    pub max_words: usize,
    #[serde(default = "default_max_font_size")]
    pub max_font_size: f32,
    #[serde(default = "default_min_font_size")]
    pub min_font_size: f32,
    #[serde(default = "default_font_family")]
    pub font_family: String,
}

impl AppConfig {
    /// 加载配置文件
    ///
    /// 未显式指定路径时读取当前目录下的 webfreq.toml，文件不存在则全部使用默认值；
    /// 显式指定的路径不存在视为错误
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => {
                let p = Path::new(DEFAULT_CONFIG_FILE).to_path_buf();
                if !p.exists() {
                    return Ok(Self::default());
                }
                p
            }
        };
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("读取 {} 失败：{}", path.display(), e))?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("解析 {} 失败：{}", path.display(), e))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)?;
        Ok(config)
    }
}

// 默认值函数
fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8501 }
fn default_log_level() -> String { "info".into() }
fn default_log_format() -> String { "text".into() }
fn default_timeout_secs() -> u64 { 30 }
fn default_user_agent() -> String { concat!("webfreq/", env!("CARGO_PKG_VERSION")).into() }
fn default_max_body_bytes() -> usize { 10 * 1024 * 1024 }
fn default_limit() -> i64 { 20 }
fn default_max_limit() -> i64 { 50 }
fn default_style() -> String { "pie".into() }
fn default_chart_title() -> String { "词频统计".into() }
fn default_value_label() -> String { "出现次数".into() }
fn default_word_label() -> String { "词语".into() }
fn default_plotly_js_url() -> String { "https://cdn.plot.ly/plotly-2.35.2.min.js".into() }
fn default_background() -> String { "#000000".into() }
fn default_cloud_width() -> u32 { 800 }
fn default_cloud_height() -> u32 { 400 }
fn default_max_words() -> usize { 200 }
fn default_max_font_size() -> f32 { 80.0 }
fn default_min_font_size() -> f32 { 6.0 }
fn default_font_family() -> String { "SimHei, 'Microsoft YaHei', 'Noto Sans CJK SC', sans-serif".into() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            default_style: default_style(),
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            title: default_chart_title(),
            value_label: default_value_label(),
            word_label: default_word_label(),
            plotly_js_url: default_plotly_js_url(),
        }
    }
}

impl Default for WordCloudConfig {
    fn default() -> Self {
        Self {
            background: default_background(),
            width: default_cloud_width(),
            height: default_cloud_height(),
            max_words: default_max_words(),
            max_font_size: default_max_font_size(),
            min_font_size: default_min_font_size(),
            font_family: default_font_family(),
        }
    }
}
