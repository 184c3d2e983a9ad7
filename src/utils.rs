/// Encode text for the standard Type 1 fonts using WinAnsiEncoding.
/// Characters the encoding cannot represent become `?`.
pub fn to_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch {
            ch if (ch as u32) < 0x20 => b' ',
            ch if (ch as u32) < 0x7F => ch as u8,
            // Latin-1 supplement maps one to one.
            ch if (0xA0..=0xFF).contains(&(ch as u32)) => ch as u8,
            '€' => 0x80,
            '‚' => 0x82,
            'ƒ' => 0x83,
            '„' => 0x84,
            '…' => 0x85,
            '†' => 0x86,
            '‡' => 0x87,
            'ˆ' => 0x88,
            '‰' => 0x89,
            'Š' => 0x8A,
            '‹' => 0x8B,
            'Œ' => 0x8C,
            'Ž' => 0x8E,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '˜' => 0x98,
            '™' => 0x99,
            'š' => 0x9A,
            '›' => 0x9B,
            'œ' => 0x9C,
            'ž' => 0x9E,
            'Ÿ' => 0x9F,
            _ => b'?',
        })
        .collect()
}

/// File name for the `Content-Disposition` header. Quotes, backslashes and
/// control characters would break the quoted header value, so they are dropped.
pub fn attachment_filename(child_name: &str) -> String {
    let cleaned: String = child_name
        .trim()
        .chars()
        .filter(|ch| !ch.is_control() && *ch != '"' && *ch != '\\')
        .collect();

    if cleaned.is_empty() {
        "storybook.pdf".to_string()
    } else {
        format!("{}-storybook.pdf", cleaned)
    }
}
