use unicode_segmentation::UnicodeSegmentation;

/// Snap a byte offset down to the nearest grapheme-cluster boundary,
/// clamping to the string length. Caret arithmetic goes through here so an
/// Enter split or a caret placement never slices a cluster.
pub fn snap_to_boundary(s: &str, byte_offset: usize) -> usize {
    if byte_offset >= s.len() {
        return s.len();
    }
    if s.is_char_boundary(byte_offset)
        && s.grapheme_indices(true).any(|(i, _)| i == byte_offset)
    {
        return byte_offset;
    }
    s.grapheme_indices(true)
        .map(|(i, _)| i)
        .take_while(|&i| i < byte_offset)
        .last()
        .unwrap_or(0)
}
