// UI and formatting module

pub mod formatters;
pub mod json_stream;
pub mod monitor_tui;
pub mod table;

// Re-export commonly used items for cleaner imports
pub use formatters::{format_metric_value, format_process_value, format_size};
pub use json_stream::JsonLinesRenderer;
pub use table::print_ranked_table;
