use std::{backtrace::Backtrace, env};

pub const MAX_LABEL_LEN: usize = 63;
pub const MAX_SUBDOMAIN_LEN: usize = 253;

#[inline]
fn should_trace() -> bool {
    env::var("LOGSTACK_NAME_TRACE").as_deref() == Ok("1")
}

fn trace_if_needed(raw: &str, canonical: &str) {
    if !should_trace() {
        return;
    }
    if raw != canonical {
        eprintln!("LOGSTACK_NAME_TRACE: canonicalizing resource name raw={raw} canonical={canonical}");
        eprintln!("backtrace:\n{:?}", Backtrace::capture());
    }
}

#[inline]
fn normalize_char(ch: char) -> Option<char> {
    match ch {
        'A'..='Z' => Some(ch.to_ascii_lowercase()),
        'a'..='z' | '0'..='9' | '-' => Some(ch),
        '_' | '.' | ' ' | '/' => Some('-'),
        _ => None,
    }
}

/// Returns true when `name` is a valid RFC 1123 label (service, container and port names).
pub fn is_dns1123_label(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_LABEL_LEN {
        return false;
    }
    let bytes = name.as_bytes();
    let alnum = |b: &u8| b.is_ascii_lowercase() || b.is_ascii_digit();
    alnum(&bytes[0])
        && alnum(&bytes[bytes.len() - 1])
        && bytes.iter().all(|b| alnum(b) || *b == b'-')
}

/// Returns true when `name` is a valid RFC 1123 subdomain (hosts, FQDNs, object names).
pub fn is_dns1123_subdomain(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_SUBDOMAIN_LEN {
        return false;
    }
    name.split('.').all(is_dns1123_label)
}

/// Convert a raw name (e.g. `My_Stack`) into a valid RFC 1123 label.
pub fn canonical_resource_name(raw: &str) -> String {
    let mut result = String::with_capacity(raw.len());
    let mut prev_dash = false;

    for ch in raw.chars() {
        if let Some(normalized) = normalize_char(ch) {
            if normalized == '-' {
                if prev_dash {
                    continue;
                }
                prev_dash = true;
            } else {
                prev_dash = false;
            }
            result.push(normalized);
        }
    }

    let mut trimmed = result.trim_matches('-').to_string();
    if trimmed.len() > MAX_LABEL_LEN {
        trimmed.truncate(MAX_LABEL_LEN);
        trimmed = trimmed.trim_end_matches('-').to_string();
    }
    let canonical = if trimmed.is_empty() {
        "resource".to_string()
    } else {
        trimmed
    };
    trace_if_needed(raw, &canonical);
    canonical
}
