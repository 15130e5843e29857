/*!
# CLI module
Command line interface functionality that is specific to mapq_eval.
*/

/// The main CLI module that contains the top-level CLI parser and help text
pub mod core;
/// The compare CLI subcommand
pub mod compare;
/// The rates CLI subcommand
pub mod rates;
/// The store CLI subcommand
pub mod store;
