mod inspect;
mod run;

pub use inspect::Inspect;
pub use run::Run;

/// How results are printed.
#[derive(Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// One line per village or engine
    Summary,
    /// Full JSON output
    Json,
}
