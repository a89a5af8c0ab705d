//! Input surface limits.

/// Longest submission accepted from the prompt, in characters
pub const MAX_INPUT_CHARS: usize = 1000;

/// Cap a submission at [`MAX_INPUT_CHARS`] characters.
pub fn clamp_input(raw: &str) -> String {
    raw.chars().take(MAX_INPUT_CHARS).collect()
}
