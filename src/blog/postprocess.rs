// SPDX-License-Identifier: MIT

//! Removal of trailing "TL;DR" summary sections from generated text
//!
//! Models like to append a short summary even when told not to. [`strip`]
//! removes it in four cumulative passes:
//! 1. a heading containing the marker, through the next heading
//! 2. a line holding only the marker, plus the next non-blank line when that
//!    line is short or bulleted
//! 3. a line that starts with the marker, through the end of its block
//! 4. the marker anywhere else, through the end of its block
//!
//! The marker-only pass runs before the block passes, which would otherwise
//! swallow the marker before it could be seen. A block is a run of non-blank
//! lines. Markers match `TL;DR` and `TLDR` in any case, with or without a
//! trailing colon. Blank lines left behind by removed blocks collapse to one.

use once_cell::sync::Lazy;
use regex::Regex;

/// Lines after a bare marker shorter than this are treated as the summary
const FOLLOWER_MAX_CHARS: usize = 100;

const BULLETS: &[char] = &['-', '*', '+', '•'];

static LINE_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^[ \t]*(?:[*_>]+[ \t]*)?\bTL;?DR\b[^\n]*(?:\n[^\n]*\S[^\n]*)*").unwrap()
});

static HEADING_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^[ \t]*#{1,6}[ \t]*(?:[*_]+)?\bTL;?DR\b[^\n]*(?:\n(?:[^#\n][^\n]*)?)*")
        .unwrap()
});

static INLINE_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:[*_(\[]+[ \t]*)?\bTL;?DR\b[^\n]*(?:\n[^\n]*\S[^\n]*)*").unwrap()
});

static BARE_MARKER_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^[ \t]*(?:[*_>]+[ \t]*)?TL;?DR[ \t]*:?[ \t]*(?:[*_]+)?[ \t]*$").unwrap()
});

static BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)+").unwrap());

/// Strip summary sections. Total and idempotent.
pub fn strip(text: &str) -> String {
    let mut current = text.trim().to_string();
    loop {
        let next = strip_once(&current);
        // Every pass only removes text, so this terminates
        if next == current {
            return next;
        }
        current = next;
    }
}

fn strip_once(text: &str) -> String {
    let text = HEADING_MARKER.replace_all(text, "");
    let text = drop_bare_markers(&text);
    let text = LINE_MARKER.replace_all(&text, "");
    let text = INLINE_MARKER.replace_all(&text, "");
    BLANK_RUN.replace_all(&text, "\n\n").trim().to_string()
}

fn drop_bare_markers(text: &str) -> String {
    if !BARE_MARKER_LINE.is_match(text) {
        return text.to_string();
    }

    let lines: Vec<&str> = text.lines().collect();
    let mut kept = Vec::with_capacity(lines.len());
    let mut at = 0;
    while at < lines.len() {
        let line = lines[at];
        at += 1;
        if !BARE_MARKER_LINE.is_match(line) {
            kept.push(line);
            continue;
        }
        // The follower is the next non-blank line; blanks before it go with it
        let follower = lines[at..]
            .iter()
            .position(|l| !l.trim().is_empty())
            .map(|offset| at + offset);
        if let Some(follower) = follower.filter(|&i| is_summary_line(lines[i])) {
            at = follower + 1;
        }
    }
    kept.join("\n")
}

fn is_summary_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.chars().count() < FOLLOWER_MAX_CHARS || trimmed.starts_with(BULLETS)
}
