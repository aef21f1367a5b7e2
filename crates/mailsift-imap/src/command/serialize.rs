//! Wire encoding helpers for command arguments.

use super::types::{FetchAttribute, StoreAction};

/// Returns true if `b` cannot appear in an atom.
pub(super) const fn needs_quoting(b: u8) -> bool {
    matches!(
        b,
        b' ' | b'"' | b'\\' | b'(' | b')' | b'{' | b'%' | b'*' | b']'
    ) || b < 0x20
        || b >= 0x7f
}

/// Returns true if `s` can go out as an atom or quoted string. CR, LF and
/// NUL can only be sent as literals, which this client never writes.
#[must_use]
pub fn is_quotable(s: &str) -> bool {
    !s.bytes().any(|b| matches!(b, b'\r' | b'\n' | 0))
}

/// Returns true if `s` is one or more atoms separated by single spaces.
/// `*` is accepted so sequence sets such as `1:*` pass.
#[must_use]
pub(super) fn is_atom_list(s: &str) -> bool {
    s.split(' ').all(|word| {
        !word.is_empty() && word.bytes().all(|b| b == b'*' || !needs_quoting(b))
    })
}

/// Encodes `s` as an astring: bare when it is a valid atom, quoted otherwise.
#[must_use]
pub fn astring(s: &str) -> String {
    let mut buf = Vec::with_capacity(s.len() + 2);
    write_astring(&mut buf, s);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Appends `s` as an astring.
pub fn write_astring(buf: &mut Vec<u8>, s: &str) {
    if !s.is_empty() && !s.bytes().any(needs_quoting) {
        buf.extend_from_slice(s.as_bytes());
        return;
    }
    buf.push(b'"');
    for b in s.bytes() {
        if matches!(b, b'"' | b'\\') {
            buf.push(b'\\');
        }
        buf.push(b);
    }
    buf.push(b'"');
}

/// Appends a parenthesised FETCH attribute list.
pub fn write_fetch_attributes(buf: &mut Vec<u8>, attrs: &[FetchAttribute]) {
    buf.push(b'(');
    for (i, attr) in attrs.iter().enumerate() {
        if i > 0 {
            buf.push(b' ');
        }
        buf.extend_from_slice(attr.as_str().as_bytes());
    }
    buf.push(b')');
}

/// Appends `[+|-]FLAGS[.SILENT] (flag ...)`.
pub fn write_store_action(buf: &mut Vec<u8>, action: &StoreAction, silent: bool) {
    let (prefix, flags) = match action {
        StoreAction::Add(flags) => ("+FLAGS", flags),
        StoreAction::Remove(flags) => ("-FLAGS", flags),
        StoreAction::Replace(flags) => ("FLAGS", flags),
    };
    buf.extend_from_slice(prefix.as_bytes());
    if silent {
        buf.extend_from_slice(b".SILENT");
    }
    buf.extend_from_slice(b" (");
    for (i, flag) in flags.iter().enumerate() {
        if i > 0 {
            buf.push(b' ');
        }
        buf.extend_from_slice(flag.as_str().as_bytes());
    }
    buf.push(b')');
}
