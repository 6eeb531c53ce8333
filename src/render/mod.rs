pub mod markdown;

pub use markdown::{markdown_options, markdown_to_html};
