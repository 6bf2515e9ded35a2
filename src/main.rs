use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

mod config;
mod extract;
mod fetch;
mod pipeline;
mod render;
mod state;
mod tokenize;
mod web;

#[derive(Parser)]
#[command(name = "webfreq", about = "网页词频分析：词云与统计图", version)]
struct Cli {
    /// 配置文件路径（默认读取当前目录下的 webfreq.toml）
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// 启动分析仪表盘
    Serve {
        /// 监听地址
        #[arg(long)]
        host: Option<String>,

        /// 监听端口
        #[arg(long)]
        port: Option<u16>,
    },

    /// 分析单个网址并输出高频词
    Analyze {
        /// 要分析的网址
        url: String,

        /// 统计图样式：pie/bar/line/scatter/area/radar/box 或中文名称
        #[arg(short, long)]
        style: Option<String>,

        /// 高频词数量
        #[arg(short, long)]
        limit: Option<i64>,

        /// 统计图 JSON 输出路径
        #[arg(long)]
        chart_out: Option<PathBuf>,

        /// 词云 SVG 输出路径
        #[arg(long)]
        cloud_out: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // None 等同于 Serve { host: None, port: None }
    let command = cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
    });

    let app_config = config::AppConfig::load(cli.config.as_deref())?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&app_config.server.log_level));
    if app_config.server.log_format == "json" {
        tracing_subscriber::fmt().with_env_filter(env_filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    match command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| app_config.server.host.clone());
            let port = port.unwrap_or(app_config.server.port);

            tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?
                .block_on(async move { run_server(app_config, &host, port).await })?;
        }
        Commands::Analyze {
            url,
            style,
            limit,
            chart_out,
            cloud_out,
        } => {
            let request = web::AnalysisQuery {
                url: Some(url),
                style,
                limit,
            }
            .into_request(&app_config.analysis);

            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?
                .block_on(run_analyze(app_config, request, chart_out, cloud_out))?;
        }
    }

    Ok(())
}

async fn run_server(app_config: config::AppConfig, host: &str, port: u16) -> anyhow::Result<()> {
    let app_state = state::AppState::new(app_config)?;
    let app = web::router(app_state);

    let addr = format!("{host}:{port}");
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
            tracing::error!("端口 {port} 已被占用");
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };
    tracing::info!("词频分析服务启动：http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn run_analyze(
    app_config: config::AppConfig,
    request: pipeline::AnalysisRequest,
    chart_out: Option<PathBuf>,
    cloud_out: Option<PathBuf>,
) -> anyhow::Result<()> {
    let fetcher = fetch::HttpFetcher::new(&app_config.fetch)?;
    let tokenizer = Arc::new(tokenize::Tokenizer::default());
    let app_config = Arc::new(app_config);

    let Some(analysis) = pipeline::analyze(&request, &fetcher, tokenizer, app_config).await? else {
        anyhow::bail!("网址为空");
    };

    if analysis.words.is_empty() {
        tracing::warn!("{} 没有可统计的词语", analysis.address);
    }
    let width = analysis
        .words
        .iter()
        .map(|w| w.word.chars().count())
        .max()
        .unwrap_or(0)
        .max(4);
    for entry in &analysis.words {
        println!("{:<width$} {:>5} {}", entry.word, entry.count, "#".repeat(entry.count.min(60)));
    }

    if let Some(path) = chart_out {
        match &analysis.chart {
            Some(chart) => {
                let json = serde_json::to_string_pretty(chart)?;
                std::fs::write(&path, json)
                    .with_context(|| format!("写入统计图 {} 失败", path.display()))?;
                tracing::info!("统计图已写入 {}", path.display());
            }
            None => tracing::warn!("未生成统计图（样式 {}）", request.style),
        }
    }

    if let Some(path) = cloud_out {
        match &analysis.wordcloud {
            Some(cloud) => {
                std::fs::write(&path, cloud.to_svg())
                    .with_context(|| format!("写入词云 {} 失败", path.display()))?;
                tracing::info!("词云已写入 {}", path.display());
            }
            None => tracing::warn!("正文为空，未生成词云"),
        }
    }

    Ok(())
}
