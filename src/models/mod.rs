mod content;
mod source;

pub use content::{now_millis, ContentItem, CONTENT_PARTITION};
pub use source::{Source, SourceDescriptor, SourceType, SOURCE_PARTITION};
