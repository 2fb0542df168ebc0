//! JSON Pointer helpers (RFC 6901)
//!
//! Copyright (c) 2025 SSV Team
//! Licensed under the Apache-2.0 license

use std::borrow::Cow;

/// Escape one reference token: `~` becomes `~0`, `/` becomes `~1`
pub fn escape(token: &str) -> Cow<'_, str> {
    if token.contains(['~', '/']) {
        Cow::Owned(token.replace('~', "~0").replace('/', "~1"))
    } else {
        Cow::Borrowed(token)
    }
}

/// Append an escaped token to a pointer
pub fn child(parent: &str, token: &str) -> String {
    format!("{}/{}", parent, escape(token))
}

/// Append an array index to a pointer
pub fn index(parent: &str, i: usize) -> String {
    format!("{}/{}", parent, i)
}
