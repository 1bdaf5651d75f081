//! Output formatting

mod formatter;

pub use formatter::Formatter;

/// How command output is rendered
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Strict JSON on stdout, no colors or progress bars
    pub json: bool,
    pub no_color: bool,
    /// Only errors are printed
    pub quiet: bool,
}
