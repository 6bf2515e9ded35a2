//! 统计图：把词频表映射为 Plotly 图表描述（data + layout），由前端绘制

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::config::ChartConfig;
use crate::tokenize::FrequencyList;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartStyle {
    Pie,
    Bar,
    Line,
    Scatter,
    Area,
    Radar,
    Box,
}

impl ChartStyle {
    pub const ALL: [ChartStyle; 7] = [
        ChartStyle::Pie,
        ChartStyle::Bar,
        ChartStyle::Line,
        ChartStyle::Scatter,
        ChartStyle::Area,
        ChartStyle::Radar,
        ChartStyle::Box,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ChartStyle::Pie => "pie",
            ChartStyle::Bar => "bar",
            ChartStyle::Line => "line",
            ChartStyle::Scatter => "scatter",
            ChartStyle::Area => "area",
            ChartStyle::Radar => "radar",
            ChartStyle::Box => "box",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ChartStyle::Pie => "饼图",
            ChartStyle::Bar => "柱状图",
            ChartStyle::Line => "折线图",
            ChartStyle::Scatter => "散点图",
            ChartStyle::Area => "面积图",
            ChartStyle::Radar => "雷达图",
            ChartStyle::Box => "箱线图",
        }
    }
}

impl fmt::Display for ChartStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownChartStyle(pub String);

impl fmt::Display for UnknownChartStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "未知的统计图样式：{}", self.0)
    }
}

impl FromStr for ChartStyle {
    type Err = UnknownChartStyle;

    /// 同时接受英文键名与中文名称
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ChartStyle::ALL
            .into_iter()
            .find(|style| style.key().eq_ignore_ascii_case(s) || style.label() == s)
            .ok_or_else(|| UnknownChartStyle(s.to_string()))
    }
}

/// 各图形的坐标轴角色
#[derive(Clone, Copy)]
enum Axes {
    /// 词语为分类轴，次数为数值轴
    Cartesian,
    /// 扇区占比
    Proportion,
    /// 角度为词语，半径为次数
    Polar,
    /// 只看次数分布，不区分词语
    Distribution,
}

struct KindSpec {
    trace_type: &'static str,
    mode: Option<&'static str>,
    fill: Option<&'static str>,
    axes: Axes,
}

fn kind_spec(style: ChartStyle) -> KindSpec {
    let spec = |trace_type, mode, fill, axes| KindSpec {
        trace_type,
        mode,
        fill,
        axes,
    };
    match style {
        ChartStyle::Pie => spec("pie", None, None, Axes::Proportion),
        ChartStyle::Bar => spec("bar", None, None, Axes::Cartesian),
        ChartStyle::Line => spec("scatter", Some("lines"), None, Axes::Cartesian),
        ChartStyle::Scatter => spec("scatter", Some("markers"), None, Axes::Cartesian),
        ChartStyle::Area => spec("scatter", Some("lines"), Some("tozeroy"), Axes::Cartesian),
        ChartStyle::Radar => spec("scatterpolar", Some("lines"), None, Axes::Polar),
        ChartStyle::Box => spec("box", None, None, Axes::Distribution),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    #[serde(skip)]
    pub style: ChartStyle,
    pub data: Vec<Trace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub trace_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<Vec<usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theta: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r: Option<Vec<usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    pub hovertemplate: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: Title,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: Title,
}

fn title(text: &str) -> Title {
    Title {
        text: text.to_string(),
    }
}

/// 按样式生成统计图，词频表为空时不生成
pub fn render_chart(list: &FrequencyList, style: ChartStyle, config: &ChartConfig) -> Option<Chart> {
    if list.is_empty() {
        return None;
    }

    let spec = kind_spec(style);
    let words: Vec<String> = list.words().into_iter().map(str::to_string).collect();
    let counts = list.counts();
    let value = &config.value_label;

    let mut trace = Trace {
        trace_type: spec.trace_type.to_string(),
        mode: spec.mode.map(str::to_string),
        fill: spec.fill.map(str::to_string),
        ..Trace::default()
    };
    let mut layout = Layout {
        title: title(&config.title),
        xaxis: None,
        yaxis: None,
    };

    match spec.axes {
        Axes::Cartesian => {
            trace.x = Some(words);
            trace.y = Some(counts);
            trace.hovertemplate = format!("%{{x}}<br>{value}=%{{y}}<extra></extra>");
            layout.xaxis = Some(Axis {
                title: title(&config.word_label),
            });
            layout.yaxis = Some(Axis { title: title(value) });
        }
        Axes::Proportion => {
            trace.labels = Some(words);
            trace.values = Some(counts);
            trace.hovertemplate =
                format!("%{{label}}<br>{value}=%{{value}}<extra></extra>");
        }
        Axes::Polar => {
            trace.theta = Some(words);
            trace.r = Some(counts);
            trace.hovertemplate = format!("%{{theta}}<br>{value}=%{{r}}<extra></extra>");
        }
        Axes::Distribution => {
            trace.y = Some(counts);
            trace.name = Some(value.clone());
            trace.hovertemplate = format!("{value}=%{{y}}<extra></extra>");
            layout.yaxis = Some(Axis { title: title(value) });
        }
    }

    Some(Chart {
        style,
        data: vec![trace],
        layout,
    })
}

/// 按名称分派；无法识别的名称不生成图表
pub fn render_chart_named(list: &FrequencyList, name: &str, config: &ChartConfig) -> Option<Chart> {
    let style = name.parse::<ChartStyle>().ok()?;
    render_chart(list, style, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FrequencyList {
        [("a", 3), ("b", 1)].into_iter().collect()
    }

    #[test]
    fn empty_list_renders_nothing() {
        let config = ChartConfig::default();
        for style in ChartStyle::ALL {
            assert!(render_chart(&FrequencyList::default(), style, &config).is_none());
        }
    }

    #[test]
    fn parses_keys_and_labels() {
        for style in ChartStyle::ALL {
            assert_eq!(style.key().parse::<ChartStyle>(), Ok(style));
            assert_eq!(style.label().parse::<ChartStyle>(), Ok(style));
        }
        assert_eq!("PIE".parse::<ChartStyle>(), Ok(ChartStyle::Pie));
        assert!("heatmap".parse::<ChartStyle>().is_err());
    }

    #[test]
    fn unknown_style_name_is_silent() {
        let config = ChartConfig::default();
        assert!(render_chart_named(&sample(), "heatmap", &config).is_none());
        assert!(render_chart_named(&sample(), "雷达图", &config).is_some());
    }

    #[test]
    fn pie_has_one_slice_per_word() {
        let chart = render_chart(&sample(), ChartStyle::Pie, &ChartConfig::default()).unwrap();
        let trace = &chart.data[0];
        assert_eq!(trace.trace_type, "pie");
        assert_eq!(trace.labels.as_deref(), Some(&["a".to_string(), "b".to_string()][..]));
        assert_eq!(trace.values.as_deref(), Some(&[3, 1][..]));
        assert_eq!(chart.layout.title.text, "词频统计");
    }

    #[test]
    fn box_is_keyed_only_on_counts() {
        let chart = render_chart(&sample(), ChartStyle::Box, &ChartConfig::default()).unwrap();
        let trace = &chart.data[0];
        assert_eq!(trace.trace_type, "box");
        assert_eq!(trace.y.as_deref(), Some(&[3, 1][..]));
        assert!(trace.x.is_none() && trace.labels.is_none() && trace.theta.is_none());

        let renamed: FrequencyList = [("x", 3), ("y", 1)].into_iter().collect();
        let other = render_chart(&renamed, ChartStyle::Box, &ChartConfig::default()).unwrap();
        assert_eq!(chart, other);
    }

    #[test]
    fn cartesian_styles_share_axes() {
        let config = ChartConfig::default();
        let expected = [
            (ChartStyle::Bar, "bar", None, None),
            (ChartStyle::Line, "scatter", Some("lines"), None),
            (ChartStyle::Scatter, "scatter", Some("markers"), None),
            (ChartStyle::Area, "scatter", Some("lines"), Some("tozeroy")),
        ];
        for (style, trace_type, mode, fill) in expected {
            let chart = render_chart(&sample(), style, &config).unwrap();
            let trace = &chart.data[0];
            assert_eq!(trace.trace_type, trace_type);
            assert_eq!(trace.mode.as_deref(), mode);
            assert_eq!(trace.fill.as_deref(), fill);
            assert_eq!(trace.x.as_ref().unwrap().len(), 2);
            assert_eq!(trace.y.as_deref(), Some(&[3, 1][..]));
            let yaxis = chart.layout.yaxis.as_ref().unwrap();
            assert_eq!(yaxis.title.text, "出现次数");
        }
    }

    #[test]
    fn radar_is_polar() {
        let chart = render_chart(&sample(), ChartStyle::Radar, &ChartConfig::default()).unwrap();
        let json = serde_json::to_value(&chart).unwrap();
        assert_eq!(json["data"][0]["type"], "scatterpolar");
        assert_eq!(json["data"][0]["theta"], serde_json::json!(["a", "b"]));
        assert_eq!(json["data"][0]["r"], serde_json::json!([3, 1]));
        assert!(json["data"][0].get("x").is_none());
    }
}
