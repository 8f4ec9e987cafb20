/// Number of whitespace-separated tokens in `text`.
///
/// Used for `original_length`, `summary_length` and `text_length`.
///
/// # Examples
///
/// ```
/// use dts_core::word_count;
///
/// assert_eq!(word_count("A very  long\narticle"), 4);
/// assert_eq!(word_count("   "), 0);
/// ```
#[must_use]
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
