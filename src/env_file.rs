//! `.env` loading. Values already present in the process environment win.
//!
//! Accepted syntax per line: `KEY=value`, optional `export ` prefix, `#`
//! comments, and single- or double-quoted values (double quotes take `\n`,
//! `\r`, `\t`, `\\` and `\"` escapes).

use std::fs;
use std::path::Path;

pub fn load(path: &Path) -> Result<usize, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("failed to read {}: {}", path.display(), e))?;

    let mut applied = 0;
    for (index, line) in text.lines().enumerate() {
        let parsed = parse_line(line).map_err(|e| format!("{}:{}: {}", path.display(), index + 1, e))?;
        let Some((key, value)) = parsed else {
            continue;
        };
        if std::env::var_os(&key).is_none() {
            // Mutating the process environment is unsafe once other threads run; this happens at startup.
            unsafe {
                std::env::set_var(&key, value);
            }
            applied += 1;
        }
    }
    Ok(applied)
}

pub fn parse_line(line: &str) -> Result<Option<(String, String)>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let line = line.strip_prefix("export ").map(str::trim_start).unwrap_or(line);

    let (key, raw) = line.split_once('=').ok_or_else(|| "missing '=' in assignment".to_string())?;
    let key = key.trim();
    if key.is_empty() {
        return Err("environment variable name cannot be empty".to_string());
    }
    if key.contains(char::is_whitespace) {
        return Err(format!("environment variable name contains whitespace: {}", key));
    }

    Ok(Some((key.to_string(), parse_value(raw.trim())?)))
}

fn parse_value(raw: &str) -> Result<String, String> {
    if let Some(rest) = raw.strip_prefix('"') {
        let (value, tail) = unquote_double(rest)?;
        ensure_only_comment(tail, "double")?;
        Ok(value)
    } else if let Some(rest) = raw.strip_prefix('\'') {
        let end = rest.find('\'').ok_or_else(|| "unterminated single-quoted value".to_string())?;
        ensure_only_comment(&rest[end + 1..], "single")?;
        Ok(rest[..end].to_string())
    } else {
        let value = raw.split('#').next().unwrap_or_default();
        Ok(value.trim_end().to_string())
    }
}

/// Returns the unescaped value and whatever follows the closing quote.
fn unquote_double(input: &str) -> Result<(String, &str), String> {
    let mut value = String::new();
    let mut chars = input.char_indices();
    while let Some((i, ch)) = chars.next() {
        match ch {
            '"' => return Ok((value, &input[i + 1..])),
            '\\' => {
                let (_, escaped) = chars
                    .next()
                    .ok_or_else(|| "unterminated escape sequence in double-quoted value".to_string())?;
                value.push(match escaped {
                    'n' => '\n',
                    'r' => '\r',
                    't' => '\t',
                    other => other,
                });
            }
            other => value.push(other),
        }
    }
    Err("unterminated double-quoted value".to_string())
}

fn ensure_only_comment(tail: &str, quote: &str) -> Result<(), String> {
    let tail = tail.trim();
    if tail.is_empty() || tail.starts_with('#') {
        Ok(())
    } else {
        Err(format!("unexpected characters after closing {} quote", quote))
    }
}
