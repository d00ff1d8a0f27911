pub mod article;
pub mod news;
pub mod source;

pub use article::ArticleContent;
pub use news::{AggregationResult, NewsItem, SourceResult, PLACEHOLDER_SUBTITLE, PLACEHOLDER_TITLE};
pub use source::{Source, SourceRegistry};
