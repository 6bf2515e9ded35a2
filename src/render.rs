pub mod chart;
pub mod wordcloud;

pub use chart::{Chart, ChartStyle, render_chart, render_chart_named};
pub use wordcloud::{WordCloud, render_wordcloud};
