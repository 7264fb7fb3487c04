//! Helper macros shared by the codec and the parser.

/// Returns early with `$error` when `$predicate` does not hold.
///
/// ```ignore
/// ensure!(header_len <= max_header_bytes, FramingError::header_too_large(header_len, max_header_bytes));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
