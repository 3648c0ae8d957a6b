//! `Content-Disposition` header parsing (RFC 6266)
//!
//! Only the suggested filename is extracted. Any syntax error yields `None`
//! so the caller falls back to a filename of its own.

/// Extract the suggested filename from a `Content-Disposition` header value.
///
/// `filename*` (RFC 5987, UTF-8 only) takes precedence over `filename`.
/// Directory components are stripped from the result.
pub fn suggested_filename(header: &str) -> Option<String> {
    let parts = split_params(header)?;
    let (disposition, params) = parts.split_first()?;
    if !is_token(disposition.trim()) {
        return None;
    }

    let mut filename = None;
    let mut filename_ext = None;

    for param in params {
        let param = param.trim();
        if param.is_empty() {
            continue;
        }

        let (name, value) = param.split_once('=')?;
        let name = name.trim();
        if !is_token(name) {
            return None;
        }

        let value = value.trim();
        if name.eq_ignore_ascii_case("filename*") {
            filename_ext = decode_ext_value(value);
        } else if name.eq_ignore_ascii_case("filename") {
            filename = Some(parse_value(value)?);
        } else {
            parse_value(value)?;
        }
    }

    filename_ext
        .or(filename)
        .and_then(|name| base_name(&name).map(str::to_string))
}

/// Split on `;` outside quoted strings. `None` on an unterminated quote.
fn split_params(header: &str) -> Option<Vec<String>> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escaped = false;

    for c in header.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => {
                current.push(c);
                escaped = true;
            }
            '"' => {
                current.push(c);
                in_quotes = !in_quotes;
            }
            ';' if !in_quotes => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }

    if in_quotes || escaped {
        return None;
    }
    parts.push(current);
    Some(parts)
}

/// Parse a parameter value: a token or a quoted string with backslash escapes.
fn parse_value(value: &str) -> Option<String> {
    let Some(inner) = value.strip_prefix('"') else {
        return is_token(value).then(|| value.to_string());
    };
    let inner = inner.strip_suffix('"')?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push(chars.next()?),
            '"' => return None,
            _ => out.push(c),
        }
    }
    Some(out)
}

/// Decode an RFC 5987 extended value: `charset'language'percent-encoded`.
fn decode_ext_value(value: &str) -> Option<String> {
    let mut fields = value.splitn(3, '\'');
    let charset = fields.next()?;
    let _language = fields.next()?;
    let encoded = fields.next()?;

    if !charset.eq_ignore_ascii_case("utf-8") {
        return None;
    }
    urlencoding::decode(encoded).ok().map(|s| s.into_owned())
}

fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.chars().all(|c| {
            c.is_ascii_graphic() && !matches!(c, '"' | '(' | ')' | ',' | '/' | ':' | ';' | '<' | '=' | '>' | '?' | '@' | '[' | '\\' | ']' | '{' | '}')
        })
}

/// Final path component, rejecting empty names and dot entries.
fn base_name(name: &str) -> Option<&str> {
    let base = name.rsplit(['/', '\\']).next()?.trim();
    match base {
        "" | "." | ".." => None,
        _ => Some(base),
    }
}
