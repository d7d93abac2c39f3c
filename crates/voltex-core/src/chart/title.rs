//! In-place rewrite of a descriptor's `title=` line.

use std::fs;
use std::path::Path;

use crate::error::Result;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const TITLE_PREFIX: &[u8] = b"title=";

/// Rewrite the first `title=` line of a descriptor file.
///
/// Every other byte is kept as is. A file without a `title=` line is
/// written back unchanged; no line is inserted.
pub fn rewrite_title(path: &Path, new_title: &str) -> Result<()> {
    let content = fs::read(path)?;
    fs::write(path, replace_title_line(&content, new_title))?;
    Ok(())
}

/// Replace the first line starting with `title=` in raw descriptor content
pub fn replace_title_line(content: &[u8], new_title: &str) -> Vec<u8> {
    let (bom, body) = match content.strip_prefix(UTF8_BOM) {
        Some(rest) => (UTF8_BOM, rest),
        None => (&[][..], content),
    };

    let mut out = Vec::with_capacity(content.len() + new_title.len());
    out.extend_from_slice(bom);

    let mut replaced = false;
    for line in body.split_inclusive(|&b| b == b'\n') {
        if !replaced && line.starts_with(TITLE_PREFIX) {
            out.extend_from_slice(TITLE_PREFIX);
            out.extend_from_slice(new_title.as_bytes());
            out.extend_from_slice(line_ending(line));
            replaced = true;
        } else {
            out.extend_from_slice(line);
        }
    }
    out
}

fn line_ending(line: &[u8]) -> &'static [u8] {
    if line.ends_with(b"\r\n") {
        &b"\r\n"[..]
    } else if line.ends_with(b"\n") {
        &b"\n"[..]
    } else {
        &[]
    }
}
