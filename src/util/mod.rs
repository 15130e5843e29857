
/// Opening plain, gzipped, or stdin text inputs
pub mod input;
/// Helper functions for read/writing JSON via serde
pub mod json_io;
/// Helper functions for generating the progress bars
pub mod progress_bar;
