use anyhow::Result;
use minijinja::Environment;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::fetch::{Fetcher, HttpFetcher};
use crate::tokenize::Tokenizer;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub fetcher: Arc<dyn Fetcher>,
    pub tokenizer: Arc<Tokenizer>,
    /// 页面模板渲染环境
    pub env: Arc<Environment<'static>>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.fetch)?;
        Self::with_fetcher(config, Arc::new(fetcher))
    }

    pub fn with_fetcher(config: AppConfig, fetcher: Arc<dyn Fetcher>) -> Result<Self> {
        let env = crate::web::template::build_env(&config)?;
        Ok(Self {
            config: Arc::new(config),
            fetcher,
            tokenizer: Arc::new(Tokenizer::default()),
            env: Arc::new(env),
        })
    }
}
