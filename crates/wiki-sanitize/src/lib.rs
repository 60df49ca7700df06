//! Allowlist HTML sanitizer for wiki page bodies
//!
//! Two passes over a raw fragment:
//! 1. `<script>` elements are removed wholesale, content included.
//! 2. The remainder is tokenized and re-serialized against a safe-subset
//!    policy: allowlisted tags, filtered attributes, escaped text, and
//!    balanced open/close tags.
//!
//! The output is canonical (lowercase tags, double-quoted attributes,
//! entities left intact), so sanitizing already-sanitized content yields
//! the same string. Malformed input never fails: anything that does not
//! parse as markup degrades to escaped text.

/// Sanitize a raw HTML fragment into the safe subset stored for a page.
pub fn sanitize(raw: &str) -> String {
    let stripped = strip_scripts(raw);
    apply_policy(&stripped)
}

// --- Pass 1: script removal ---

/// Remove `<script>` elements and their content in one linear scan.
///
/// A `</script>` always terminates the open script region; an unterminated
/// region swallows the rest of the input. Stray `</script>` tags outside a
/// region are dropped. Self-closing `<script/>` removes only the tag.
fn strip_scripts(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let len = chars.len();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;

    while i < len {
        if chars[i] == '<' {
            if tag_starts_with(&chars, i + 1, "script") {
                i = match scan_tag_end(&chars, i) {
                    (None, _) => len,
                    (Some(end), true) => end,
                    (Some(end), false) => skip_script_region(&chars, end),
                };
                continue;
            }
            if chars.get(i + 1) == Some(&'/') && tag_starts_with(&chars, i + 2, "script") {
                i = scan_tag_end(&chars, i).0.unwrap_or(len);
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }

    out
}

/// True if `chars[i..]` spells `name` case-insensitively, terminated by
/// whitespace, `/`, `>`, or end of input.
fn tag_starts_with(chars: &[char], i: usize, name: &str) -> bool {
    let mut j = i;
    for expected in name.chars() {
        match chars.get(j) {
            Some(c) if c.eq_ignore_ascii_case(&expected) => j += 1,
            _ => return false,
        }
    }
    match chars.get(j) {
        None => true,
        Some(c) => c.is_ascii_whitespace() || *c == '/' || *c == '>',
    }
}

/// Scan from `<` at `start` to the closing `>`, honoring quoted attribute
/// values. Returns the index just past `>` and whether the tag self-closed.
fn scan_tag_end(chars: &[char], start: usize) -> (Option<usize>, bool) {
    let mut i = start + 1;
    let mut last_meaningful = ' ';
    while i < chars.len() {
        match chars[i] {
            quote @ ('"' | '\'') => {
                i += 1;
                while i < chars.len() && chars[i] != quote {
                    i += 1;
                }
                last_meaningful = quote;
            }
            '>' => return (Some(i + 1), last_meaningful == '/'),
            c => {
                if !c.is_ascii_whitespace() {
                    last_meaningful = c;
                }
            }
        }
        i += 1;
    }
    (None, false)
}

/// Skip past the `</script>` that closes a region starting at `from`.
fn skip_script_region(chars: &[char], from: usize) -> usize {
    let mut i = from;
    while i < chars.len() {
        if chars[i] == '<'
            && chars.get(i + 1) == Some(&'/')
            && tag_starts_with(chars, i + 2, "script")
        {
            return scan_tag_end(chars, i).0.unwrap_or(chars.len());
        }
        i += 1;
    }
    chars.len()
}

// --- Pass 2: policy ---

enum Token {
    Text(String),
    Open {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    Close {
        name: String,
    },
}

const LINK_ATTRS: &[&str] = &["href", "title"];
const IMG_ATTRS: &[&str] = &["src", "alt", "title"];
const NO_ATTRS: &[&str] = &[];

/// Attributes allowed on a tag, or `None` if the tag itself is disallowed.
fn allowed_attrs(tag: &str) -> Option<&'static [&'static str]> {
    match tag {
        "a" => Some(LINK_ATTRS),
        "img" => Some(IMG_ATTRS),
        "p" | "br" | "hr" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "ul" | "ol" | "li"
        | "dl" | "dt" | "dd" | "em" | "strong" | "i" | "b" | "u" | "s" | "code" | "pre"
        | "blockquote" | "table" | "thead" | "tbody" | "tr" | "th" | "td" | "span" | "div" => {
            Some(NO_ATTRS)
        }
        _ => None,
    }
}

fn is_void(tag: &str) -> bool {
    matches!(tag, "br" | "hr" | "img")
}

fn is_url_attr(key: &str) -> bool {
    matches!(key, "href" | "src")
}

fn apply_policy(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut open: Vec<String> = Vec::new();

    for token in tokenize(input) {
        match token {
            Token::Text(text) => out.push_str(&escape_text(&text)),
            Token::Open {
                name,
                attrs,
                self_closing,
            } => {
                let Some(allowed) = allowed_attrs(&name) else {
                    continue;
                };
                out.push('<');
                out.push_str(&name);
                for (key, value) in &attrs {
                    if !allowed.contains(&key.as_str()) {
                        continue;
                    }
                    if is_url_attr(key) && !is_safe_url(value) {
                        continue;
                    }
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
                if is_void(&name) {
                    out.push_str("/>");
                } else if self_closing {
                    out.push('>');
                    out.push_str("</");
                    out.push_str(&name);
                    out.push('>');
                } else {
                    out.push('>');
                    open.push(name);
                }
            }
            Token::Close { name } => {
                if allowed_attrs(&name).is_none() || is_void(&name) {
                    continue;
                }
                // Closing a tag also closes anything left open inside it;
                // a close with no matching open is dropped.
                if let Some(depth) = open.iter().rposition(|tag| *tag == name) {
                    for tag in open.drain(depth..).rev() {
                        out.push_str("</");
                        out.push_str(&tag);
                        out.push('>');
                    }
                }
            }
        }
    }

    for tag in open.drain(..).rev() {
        out.push_str("</");
        out.push_str(&tag);
        out.push('>');
    }

    out
}

fn tokenize(input: &str) -> Vec<Token> {
    let chars: Vec<char> = input.chars().collect();
    let len = chars.len();
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut i = 0;

    while i < len {
        if chars[i] == '<' {
            // Comments, doctypes, and processing instructions are dropped
            if matches!(chars.get(i + 1), Some('!') | Some('?')) {
                flush_text(&mut tokens, &mut text);
                i = skip_markup_decl(&chars, i);
                continue;
            }
            if chars.get(i + 1) == Some(&'/') {
                if let Some((name, end)) = parse_close_tag(&chars, i) {
                    flush_text(&mut tokens, &mut text);
                    tokens.push(Token::Close { name });
                    i = end;
                    continue;
                }
            }
            if let Some((token, end)) = parse_open_tag(&chars, i) {
                flush_text(&mut tokens, &mut text);
                tokens.push(token);
                i = end;
                continue;
            }
        }
        text.push(chars[i]);
        i += 1;
    }

    flush_text(&mut tokens, &mut text);
    tokens
}

fn flush_text(tokens: &mut Vec<Token>, text: &mut String) {
    if !text.is_empty() {
        tokens.push(Token::Text(std::mem::take(text)));
    }
}

/// Skip a `<!-- comment -->`, `<!doctype ...>`, or `<? ... >` block.
fn skip_markup_decl(chars: &[char], start: usize) -> usize {
    let len = chars.len();
    if chars.get(start + 2) == Some(&'-') && chars.get(start + 3) == Some(&'-') {
        let mut i = start + 4;
        while i < len {
            if chars[i] == '-' && chars.get(i + 1) == Some(&'-') && chars.get(i + 2) == Some(&'>')
            {
                return i + 3;
            }
            i += 1;
        }
        return len;
    }
    let mut i = start + 2;
    while i < len {
        if chars[i] == '>' {
            return i + 1;
        }
        i += 1;
    }
    len
}

/// Parse a lowercase tag name; `None` if the first char is not a letter.
fn parse_tag_name(chars: &[char], i: &mut usize) -> Option<String> {
    if !matches!(chars.get(*i), Some(c) if c.is_ascii_alphabetic()) {
        return None;
    }
    let mut name = String::new();
    while let Some(c) = chars.get(*i) {
        if !c.is_ascii_alphanumeric() {
            break;
        }
        name.push(c.to_ascii_lowercase());
        *i += 1;
    }
    Some(name)
}

fn parse_close_tag(chars: &[char], start: usize) -> Option<(String, usize)> {
    let mut i = start + 2;
    let name = parse_tag_name(chars, &mut i)?;
    while i < chars.len() {
        if chars[i] == '>' {
            return Some((name, i + 1));
        }
        i += 1;
    }
    None
}

/// Parse an open tag with its attributes. `None` on anything unterminated,
/// which the caller then treats as plain text.
fn parse_open_tag(chars: &[char], start: usize) -> Option<(Token, usize)> {
    let mut i = start + 1;
    let name = parse_tag_name(chars, &mut i)?;
    let mut attrs: Vec<(String, String)> = Vec::new();
    let mut self_closing = false;

    loop {
        while i < chars.len() && chars[i].is_ascii_whitespace() {
            i += 1;
        }
        match chars.get(i) {
            None => return None,
            Some('>') => {
                i += 1;
                break;
            }
            Some('/') => {
                if chars.get(i + 1) == Some(&'>') {
                    self_closing = true;
                    i += 2;
                    break;
                }
                i += 1;
            }
            Some(_) => {
                let (key, value) = parse_attribute(chars, &mut i);
                // First occurrence of a duplicated attribute wins
                if !key.is_empty() && !attrs.iter().any(|(k, _)| *k == key) {
                    attrs.push((key, value));
                }
            }
        }
    }

    Some((
        Token::Open {
            name,
            attrs,
            self_closing,
        },
        i,
    ))
}

fn parse_attribute(chars: &[char], i: &mut usize) -> (String, String) {
    let mut key = String::new();
    while let Some(c) = chars.get(*i) {
        if c.is_ascii_whitespace() || *c == '=' || *c == '>' || *c == '/' {
            break;
        }
        key.push(c.to_ascii_lowercase());
        *i += 1;
    }
    while *i < chars.len() && chars[*i].is_ascii_whitespace() {
        *i += 1;
    }
    if chars.get(*i) != Some(&'=') {
        return (key, String::new());
    }
    *i += 1;
    while *i < chars.len() && chars[*i].is_ascii_whitespace() {
        *i += 1;
    }
    let mut value = String::new();
    match chars.get(*i) {
        Some(&quote) if quote == '"' || quote == '\'' => {
            *i += 1;
            while let Some(&c) = chars.get(*i) {
                *i += 1;
                if c == quote {
                    break;
                }
                value.push(c);
            }
        }
        _ => {
            while let Some(&c) = chars.get(*i) {
                if c.is_ascii_whitespace() || c == '>' {
                    break;
                }
                value.push(c);
                *i += 1;
            }
        }
    }
    (key, value)
}

// --- Escaping ---

/// Escape text content, leaving existing character entities intact so the
/// transform stays stable across repeated runs.
fn escape_text(text: &str) -> String {
    escape(text, false)
}

fn escape_attr(value: &str) -> String {
    escape(value, true)
}

fn escape(input: &str, quotes: bool) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if quotes => out.push_str("&quot;"),
            '\'' if quotes => out.push_str("&#x27;"),
            '&' => {
                if let Some(end) = entity_end(&chars, i) {
                    out.extend(&chars[i..end]);
                    i = end;
                    continue;
                }
                out.push_str("&amp;");
            }
            c => out.push(c),
        }
        i += 1;
    }
    out
}

/// If `chars[start..]` begins a character entity, the index just past its
/// terminating `;`.
fn entity_end(chars: &[char], start: usize) -> Option<usize> {
    let mut i = start + 1;
    match chars.get(i) {
        Some('#') => {
            i += 1;
            if matches!(chars.get(i), Some('x') | Some('X')) {
                i += 1;
                let digits = count_while(chars, i, |c| c.is_ascii_hexdigit());
                if digits == 0 || digits > 6 {
                    return None;
                }
                i += digits;
            } else {
                let digits = count_while(chars, i, |c| c.is_ascii_digit());
                if digits == 0 || digits > 7 {
                    return None;
                }
                i += digits;
            }
        }
        Some(c) if c.is_ascii_alphabetic() => {
            let letters = count_while(chars, i, |c| c.is_ascii_alphanumeric());
            if letters > 32 {
                return None;
            }
            i += letters;
        }
        _ => return None,
    }
    if chars.get(i) == Some(&';') {
        Some(i + 1)
    } else {
        None
    }
}

fn count_while(chars: &[char], from: usize, pred: impl Fn(char) -> bool) -> usize {
    chars[from..].iter().take_while(|c| pred(**c)).count()
}

// --- URL policy ---

/// Accept relative URLs and the http, https, and mailto schemes.
///
/// The check runs over a decoded copy with whitespace and control
/// characters removed, so entity or control-character obfuscation cannot
/// hide a scheme like `javascript:`.
fn is_safe_url(value: &str) -> bool {
    let decoded: String = decode_entities(value)
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();
    let lower = decoded.to_ascii_lowercase();
    if lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("mailto:")
    {
        return true;
    }
    match lower.find(':') {
        None => true,
        // a colon after a path, query, or fragment delimiter is not a scheme
        Some(pos) => lower[..pos].contains(|c: char| matches!(c, '/' | '?' | '#')),
    }
}

fn decode_entities(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let mut out = String::with_capacity(value.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '&' {
            if let Some(end) = entity_end(&chars, i) {
                let body: String = chars[i + 1..end - 1].iter().collect();
                match decode_entity(&body) {
                    Some(decoded) => out.push(decoded),
                    None => out.extend(&chars[i..end]),
                }
                i = end;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

fn decode_entity(body: &str) -> Option<char> {
    if let Some(num) = body.strip_prefix('#') {
        let code = if num.starts_with('x') || num.starts_with('X') {
            u32::from_str_radix(&num[1..], 16).ok()?
        } else {
            num.parse::<u32>().ok()?
        };
        return char::from_u32(code);
    }
    match body {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "colon" => Some(':'),
        "sol" => Some('/'),
        "nbsp" => Some('\u{a0}'),
        "Tab" => Some('\t'),
        "NewLine" => Some('\n'),
        _ => None,
    }
}
