/// Copy a fixed-width field out of an already bounds-checked slice.
pub(crate) fn fixed<const N: usize>(bytes: &[u8]) -> Option<[u8; N]> {
    bytes.try_into().ok()
}

/// Printable ASCII (`0x20..=0x7e`) or a CR/LF line break.
pub(crate) fn is_printable_or_newline(byte: u8) -> bool {
    (0x20..=0x7e).contains(&byte) || byte == b'\n' || byte == b'\r'
}
