//! Output surface helpers: download file naming and the HTML view of a letter.

pub const DEFAULT_DOWNLOAD_NAME: &str = "SOP_Generated.txt";

/// Characters of the (whitespace-replaced) program name kept in the file name.
const PROGRAM_NAME_CHARS: usize = 20;

/// `SOP_<program>.txt`, where whitespace in the program becomes `_` and the result is cut
/// to its first 20 characters before the prefix is added. Blank programs get the default.
pub fn download_filename(target_program: &str) -> String {
    if target_program.is_empty() {
        return DEFAULT_DOWNLOAD_NAME.to_string();
    }

    let stem: String = target_program
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .take(PROGRAM_NAME_CHARS)
        .collect();
    format!("SOP_{stem}.txt")
}

/// `Content-Disposition` value for the download response: an ASCII `filename` fallback
/// plus the exact name as RFC 5987 `filename*`.
pub fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();
    format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
        percent_encode(filename)
    )
}

fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Escapes the letter for HTML and turns line breaks into `<br>`.
pub fn render_letter_html(letter: &str) -> String {
    let mut out = String::with_capacity(letter.len() + letter.len() / 8);
    let mut chars = letter.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str("<br>");
            }
            '\n' => out.push_str("<br>"),
            other => out.push(other),
        }
    }
    out
}

/// Full page wrapping [`render_letter_html`].
pub fn letter_page(target_program: &str, letter: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>Statement of Purpose</title></head>\n<body>\n<h1>Statement of Purpose: {}</h1>\n<div class=\"letter\">{}</div>\n</body>\n</html>\n",
        render_letter_html(target_program),
        render_letter_html(letter)
    )
}
