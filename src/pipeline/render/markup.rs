//! Line-level reading of the report's lightweight markup.
//!
//! Recognised: `#` headings, lines wholly wrapped in `**`, bullet markers
//! (`-`, `*`, `•`), numbered items (`1.`), and blank lines. Inline `**`
//! markers are stripped. Everything else is a paragraph line.

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading(String),
    Bullet(String),
    Numbered { marker: String, text: String },
    Paragraph(String),
    Blank,
}

pub fn parse_markup(body: &str) -> Vec<Block> {
    body.lines().map(parse_line).collect()
}

fn parse_line(raw: &str) -> Block {
    let line = raw.trim();
    if line.is_empty() {
        return Block::Blank;
    }

    if line.starts_with('#') {
        return Block::Heading(strip_bold(line.trim_start_matches('#').trim()));
    }

    if line.len() > 4 && line.starts_with("**") && line.ends_with("**") && !line[2..line.len() - 2].contains("**") {
        return Block::Heading(line[2..line.len() - 2].trim().to_string());
    }

    for marker in ["- ", "* ", "• "] {
        if let Some(rest) = line.strip_prefix(marker) {
            return Block::Bullet(strip_bold(rest.trim()));
        }
    }

    if let Some((marker, rest)) = split_numbered(line) {
        return Block::Numbered {
            marker: marker.to_string(),
            text: strip_bold(rest.trim()),
        };
    }

    Block::Paragraph(strip_bold(line))
}

/// `"12. text"` → `("12.", "text")`.
fn split_numbered(line: &str) -> Option<(&str, &str)> {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 || digits > 3 {
        return None;
    }
    let rest = &line[digits..];
    let rest = rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") "))?;
    Some((&line[..digits + 1], rest))
}

fn strip_bold(text: &str) -> String {
    text.replace("**", "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_each_block_kind() {
        let body = "# Title\n**1. User Profile**\n- Age: 40\n* Height\n• Weight\n2. Walk daily\n\nPlain **bold** text";
        assert_eq!(
            parse_markup(body),
            vec![
                Block::Heading("Title".into()),
                Block::Heading("1. User Profile".into()),
                Block::Bullet("Age: 40".into()),
                Block::Bullet("Height".into()),
                Block::Bullet("Weight".into()),
                Block::Numbered {
                    marker: "2.".into(),
                    text: "Walk daily".into()
                },
                Block::Blank,
                Block::Paragraph("Plain bold text".into()),
            ]
        );
    }

    #[test]
    fn inline_bold_inside_bullet_is_stripped() {
        assert_eq!(
            parse_markup("- **Age:** 40"),
            vec![Block::Bullet("Age: 40".into())]
        );
    }

    #[test]
    fn partially_bold_line_is_a_paragraph() {
        assert_eq!(
            parse_markup("**Note:** drink water **daily**"),
            vec![Block::Paragraph("Note: drink water daily".into())]
        );
    }

    #[test]
    fn decimal_number_is_not_a_list_item() {
        assert_eq!(
            parse_markup("27.8 is your BMI"),
            vec![Block::Paragraph("27.8 is your BMI".into())]
        );
    }
}
