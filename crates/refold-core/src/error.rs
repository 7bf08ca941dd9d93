/// Core error type for the refold pipeline.
///
/// Unsupported constructs are deliberately NOT errors — the translator
/// degrades by omission and reports them as [`Diagnostic`]s instead
/// (see `translate`). Only genuinely malformed input is fatal.
///
/// [`Diagnostic`]: crate::translate::Diagnostic
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A literal position held something other than a terminal JSON scalar
    /// (string, integer, float, bool, null). Indicates a malformed input AST;
    /// translation of the current block is abandoned.
    #[error("expected a terminal literal value, found {found}")]
    Value { found: String },
}
