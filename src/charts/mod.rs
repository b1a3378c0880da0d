//! Charts module - Chart rendering

mod plotter;
mod renderer;

pub use plotter::{ChartPlotter, TableData};
pub use renderer::{
    PlacedWord, StaticChartRenderer, WordCloudImage, TREND_HEIGHT, TREND_WIDTH, WORDCLOUD_HEIGHT, WORDCLOUD_WIDTH,
};
