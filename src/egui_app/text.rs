#![cfg(feature = "egui")]

use std::ops::Range;

use egui::text::LayoutJob;
use eframe::egui::{self, Color32};

use crate::filter::fold_query;

/// Lowercase `text` one char at a time, recording for every folded byte the
/// byte offset of the source char it came from. Folding can change byte
/// lengths (`İ` becomes two chars), so matches found in the folded string
/// are mapped back through this table.
fn fold_with_offsets(text: &str) -> (String, Vec<usize>) {
    let mut folded = String::with_capacity(text.len());
    let mut origin = Vec::with_capacity(text.len());
    for (idx, ch) in text.char_indices() {
        for lower in ch.to_lowercase() {
            let before = folded.len();
            folded.push(lower);
            origin.resize(origin.len() + (folded.len() - before), idx);
        }
    }
    (folded, origin)
}

/// Byte ranges of `text` covering each case-insensitive occurrence of
/// `query`, widened to whole source chars and never overlapping.
pub fn match_ranges(text: &str, query: &str) -> Vec<Range<usize>> {
    let needle = fold_query(query);
    if needle.is_empty() {
        return Vec::new();
    }
    let (folded, origin) = fold_with_offsets(text);
    let mut ranges: Vec<Range<usize>> = Vec::new();
    for (pos, _) in folded.match_indices(&needle) {
        let start = origin[pos];
        let last = origin[pos + needle.len() - 1];
        let end = last + text[last..].chars().next().map_or(0, char::len_utf8);
        match ranges.last_mut() {
            Some(prev) if start < prev.end => prev.end = prev.end.max(end),
            _ => ranges.push(start..end),
        }
    }
    ranges
}

/// Card text with every occurrence of the search query on a yellow background.
pub fn highlight_query_job(text: &str, query: &str) -> LayoutJob {
    let mut job = LayoutJob::default();
    let mut cursor = 0;
    for range in match_ranges(text, query) {
        if range.start > cursor {
            job.append(&text[cursor..range.start], 0.0, egui::TextFormat::default());
        }
        let fmt = egui::TextFormat {
            background: Color32::YELLOW,
            ..Default::default()
        };
        job.append(&text[range.clone()], 0.0, fmt);
        cursor = range.end;
    }
    if cursor < text.len() {
        job.append(&text[cursor..], 0.0, egui::TextFormat::default());
    }
    job
}
