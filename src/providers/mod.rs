pub mod html_meta;

pub use html_meta::HtmlMetaResolver;
