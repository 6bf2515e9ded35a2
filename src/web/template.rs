use anyhow::{Context, Result};
use minijinja::{Environment, Value};

use crate::config::AppConfig;

const DASHBOARD_TEMPLATE: &str = include_str!("../../templates/dashboard.html");

/// 构建页面渲染环境，模板随二进制一起编译
pub fn build_env(config: &AppConfig) -> Result<Environment<'static>> {
    let mut env = Environment::new();

    env.add_global("plotly_js_url", config.chart.plotly_js_url.clone());
    env.add_filter("linecount", filter_linecount);

    env.add_template("dashboard.html", DASHBOARD_TEMPLATE)
        .context("注册模板 dashboard.html 失败")?;

    Ok(env)
}

pub fn render_page(env: &Environment, name: &str, ctx: Value) -> Result<String> {
    let tmpl = env
        .get_template(name)
        .with_context(|| format!("模板 {} 不存在", name))?;
    let html = tmpl
        .render(ctx)
        .with_context(|| format!("渲染模板 {} 失败", name))?;
    Ok(html)
}

/// 预览文本的行数
fn filter_linecount(value: String) -> usize {
    value.lines().filter(|l| !l.is_empty()).count()
}
