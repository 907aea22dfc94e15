use crate::cleanup::{cleanup_merge, cleanup_semantic};
use crate::error::{Error, Result};
use crate::textutil::{
	chars_to_lines, common_prefix, common_suffix, decode_text, encode_text, find_sub,
	lines_to_chars,
};
use tracing::debug;

/// Inputs above this length (both sides) go through the line-mode
/// pre-reduction before the character-level bisection.
const LINE_MODE_MIN_LEN: usize = 100;

/// The operation a diff record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffOp {
	Delete,
	Insert,
	Equal,
}

/// One (operation, text) record of an edit script.
///
/// Text is stored as code units so the engine can index and slice it without
/// re-walking UTF-8 boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diff {
	pub op: DiffOp,
	pub text: Vec<char>,
}

impl Diff {
	pub fn new(op: DiffOp, text: &str) -> Self {
		Self { op, text: text.chars().collect() }
	}

	pub fn from_chars(op: DiffOp, text: Vec<char>) -> Self {
		Self { op, text }
	}

	pub fn text_string(&self) -> String {
		self.text.iter().collect()
	}
}

/// Finds the differences between two texts.
///
/// With `check_lines` set, inputs beyond a size cutoff are first diffed at
/// line granularity and the result refined, trading optimality for speed.
pub fn diff(text1: &str, text2: &str, check_lines: bool) -> Vec<Diff> {
	let mut keep_going = || true;
	diff_with_cancel(text1, text2, check_lines, &mut keep_going)
}

/// Like [`diff`], polling `keep_going` at the top of each bisection sweep.
/// Once it answers `false`, the affected subproblem collapses to a coarse
/// delete-all/insert-all pair; the overall result stays well-formed.
pub fn diff_with_cancel(
	text1: &str,
	text2: &str,
	check_lines: bool,
	keep_going: &mut dyn FnMut() -> bool,
) -> Vec<Diff> {
	let chars1: Vec<char> = text1.chars().collect();
	let chars2: Vec<char> = text2.chars().collect();
	diff_chars(&chars1, &chars2, check_lines, keep_going)
}

pub(crate) fn diff_chars(
	text1: &[char],
	text2: &[char],
	check_lines: bool,
	keep_going: &mut dyn FnMut() -> bool,
) -> Vec<Diff> {
	if text1 == text2 {
		if text1.is_empty() {
			return Vec::new();
		}
		return vec![Diff::from_chars(DiffOp::Equal, text1.to_vec())];
	}

	// Trim the common affixes, diff the middle, then stitch them back on.
	let prefix_len = common_prefix(text1, text2);
	let prefix = &text1[..prefix_len];
	let trimmed1 = &text1[prefix_len..];
	let trimmed2 = &text2[prefix_len..];

	let suffix_len = common_suffix(trimmed1, trimmed2);
	let suffix = &trimmed1[trimmed1.len() - suffix_len..];
	let mid1 = &trimmed1[..trimmed1.len() - suffix_len];
	let mid2 = &trimmed2[..trimmed2.len() - suffix_len];

	let mut diffs = compute(mid1, mid2, check_lines, keep_going);

	if !prefix.is_empty() {
		diffs.insert(0, Diff::from_chars(DiffOp::Equal, prefix.to_vec()));
	}
	if !suffix.is_empty() {
		diffs.push(Diff::from_chars(DiffOp::Equal, suffix.to_vec()));
	}
	cleanup_merge(&mut diffs);
	diffs
}

/// Dispatches a trimmed middle (no common prefix or suffix) to the cheapest
/// strategy that fits.
fn compute(
	text1: &[char],
	text2: &[char],
	check_lines: bool,
	keep_going: &mut dyn FnMut() -> bool,
) -> Vec<Diff> {
	if text1.is_empty() {
		return vec![Diff::from_chars(DiffOp::Insert, text2.to_vec())];
	}
	if text2.is_empty() {
		return vec![Diff::from_chars(DiffOp::Delete, text1.to_vec())];
	}

	let text1_is_long = text1.len() > text2.len();
	let (long, short) = if text1_is_long { (text1, text2) } else { (text2, text1) };

	if let Some(pos) = find_sub(long, short, 0) {
		// Shorter text is inside the longer text.
		let op = if text1_is_long { DiffOp::Delete } else { DiffOp::Insert };
		return vec![
			Diff::from_chars(op, long[..pos].to_vec()),
			Diff::from_chars(DiffOp::Equal, short.to_vec()),
			Diff::from_chars(op, long[pos + short.len()..].to_vec()),
		];
	}

	if short.len() == 1 {
		// Single-unit short side; after the substring check above it cannot
		// be part of an equality.
		return vec![
			Diff::from_chars(DiffOp::Delete, text1.to_vec()),
			Diff::from_chars(DiffOp::Insert, text2.to_vec()),
		];
	}

	if let Some(hm) = half_match(text1, text2) {
		let mut diffs = diff_chars(&hm.text1_a, &hm.text2_a, check_lines, keep_going);
		diffs.push(Diff::from_chars(DiffOp::Equal, hm.mid_common));
		diffs.extend(diff_chars(&hm.text1_b, &hm.text2_b, check_lines, keep_going));
		return diffs;
	}

	if check_lines && text1.len() > LINE_MODE_MIN_LEN && text2.len() > LINE_MODE_MIN_LEN {
		return line_mode(text1, text2, keep_going);
	}

	bisect(text1, text2, keep_going)
}

struct HalfMatch {
	text1_a: Vec<char>,
	text1_b: Vec<char>,
	text2_a: Vec<char>,
	text2_b: Vec<char>,
	mid_common: Vec<char>,
}

/// Looks for a substring shared by both texts that is at least half the
/// length of the longer text. A hit splits the problem in two around it.
fn half_match(text1: &[char], text2: &[char]) -> Option<HalfMatch> {
	let text1_is_long = text1.len() > text2.len();
	let (long, short) = if text1_is_long { (text1, text2) } else { (text2, text1) };
	if long.len() < 4 || short.len() * 2 < long.len() {
		// Pointless.
		return None;
	}

	// Check first whether the second quarter, then whether the mid point of
	// the longer text seeds a big enough common run.
	let hm1 = half_match_at(long, short, long.len().div_ceil(4));
	let hm2 = half_match_at(long, short, long.len().div_ceil(2));
	let hm = match (hm1, hm2) {
		(None, None) => return None,
		(Some(hm), None) | (None, Some(hm)) => hm,
		(Some(hm1), Some(hm2)) => {
			if hm1.4.len() > hm2.4.len() {
				hm1
			} else {
				hm2
			}
		}
	};

	let (long_a, long_b, short_a, short_b, mid_common) = hm;
	if text1_is_long {
		Some(HalfMatch { text1_a: long_a, text1_b: long_b, text2_a: short_a, text2_b: short_b, mid_common })
	} else {
		Some(HalfMatch { text1_a: short_a, text1_b: short_b, text2_a: long_a, text2_b: long_b, mid_common })
	}
}

type HalfMatchParts = (Vec<char>, Vec<char>, Vec<char>, Vec<char>, Vec<char>);

/// Tries every occurrence of the quarter-length seed anchored at `i` in the
/// longer text, extending each hit in both directions.
fn half_match_at(long: &[char], short: &[char], i: usize) -> Option<HalfMatchParts> {
	let seed = &long[i..i + long.len() / 4];
	let mut search_from = 0;
	let mut best: Option<HalfMatchParts> = None;
	let mut best_common_len = 0;

	while let Some(j) = find_sub(short, seed, search_from) {
		search_from = j + 1;
		let prefix_len = common_prefix(&long[i..], &short[j..]);
		let suffix_len = common_suffix(&long[..i], &short[..j]);
		if best_common_len < suffix_len + prefix_len {
			best_common_len = suffix_len + prefix_len;
			best = Some((
				long[..i - suffix_len].to_vec(),
				long[i + prefix_len..].to_vec(),
				short[..j - suffix_len].to_vec(),
				short[j + prefix_len..].to_vec(),
				short[j - suffix_len..j + prefix_len].to_vec(),
			));
		}
	}
	match best {
		Some(parts) if parts.4.len() * 2 >= long.len() => Some(parts),
		_ => None,
	}
}

/// Pre-reduces the inputs to one code unit per line, diffs the compressed
/// forms, then re-diffs the edit runs character by character.
fn line_mode(text1: &[char], text2: &[char], keep_going: &mut dyn FnMut() -> bool) -> Vec<Diff> {
	let string1: String = text1.iter().collect();
	let string2: String = text2.iter().collect();
	let (chars1, chars2, line_array) = lines_to_chars(&string1, &string2);

	let mut diffs = diff_chars(&chars1, &chars2, false, keep_going);
	chars_to_lines(&mut diffs, &line_array);
	cleanup_semantic(&mut diffs);

	// Re-diff each adjacent delete/insert run with full granularity.
	diffs.push(Diff::from_chars(DiffOp::Equal, Vec::new()));
	let mut pointer = 0;
	let mut count_delete = 0;
	let mut count_insert = 0;
	let mut text_delete: Vec<char> = Vec::new();
	let mut text_insert: Vec<char> = Vec::new();
	while pointer < diffs.len() {
		match diffs[pointer].op {
			DiffOp::Insert => {
				count_insert += 1;
				text_insert.extend_from_slice(&diffs[pointer].text);
			}
			DiffOp::Delete => {
				count_delete += 1;
				text_delete.extend_from_slice(&diffs[pointer].text);
			}
			DiffOp::Equal => {
				if count_delete >= 1 && count_insert >= 1 {
					let start = pointer - count_delete - count_insert;
					diffs.drain(start..pointer);
					pointer = start;
					let sub_diffs = diff_chars(&text_delete, &text_insert, false, keep_going);
					let sub_len = sub_diffs.len();
					diffs.splice(pointer..pointer, sub_diffs);
					pointer += sub_len;
				}
				count_insert = 0;
				count_delete = 0;
				text_delete.clear();
				text_insert.clear();
			}
		}
		pointer += 1;
	}
	diffs.pop();
	diffs
}

/// Myers O(ND) bisection: walks a forward and a reverse D-path front until
/// they overlap, then splits the problem at the meeting point.
pub(crate) fn bisect(
	text1: &[char],
	text2: &[char],
	keep_going: &mut dyn FnMut() -> bool,
) -> Vec<Diff> {
	let len1 = text1.len() as isize;
	let len2 = text2.len() as isize;
	let max_d = (text1.len() + text2.len()).div_ceil(2) as isize;
	let v_offset = max_d;
	// Two extra slots keep the offset+1 seeding of the original dynamic
	// arrays in bounds.
	let v_length = (2 * max_d + 2) as usize;
	let mut v1 = vec![-1isize; v_length];
	let mut v2 = vec![-1isize; v_length];
	v1[(v_offset + 1) as usize] = 0;
	v2[(v_offset + 1) as usize] = 0;

	let delta = len1 - len2;
	// If the total number of characters is odd, then the front path will
	// collide with the reverse path.
	let front = delta % 2 != 0;
	// Offsets for start and end of k loop. Prevents mapping of space beyond
	// the grid.
	let mut k1start = 0isize;
	let mut k1end = 0isize;
	let mut k2start = 0isize;
	let mut k2end = 0isize;

	for d in 0..max_d {
		if !keep_going() {
			debug!("bisection cancelled, emitting coarse fallback");
			break;
		}

		// Walk the front path one step.
		let mut k1 = -d + k1start;
		while k1 <= d - k1end {
			let k1_offset = (v_offset + k1) as usize;
			let mut x1 = if k1 == -d || (k1 != d && v1[k1_offset - 1] < v1[k1_offset + 1]) {
				v1[k1_offset + 1]
			} else {
				v1[k1_offset - 1] + 1
			};
			let mut y1 = x1 - k1;
			while x1 < len1 && y1 < len2 && text1[x1 as usize] == text2[y1 as usize] {
				x1 += 1;
				y1 += 1;
			}
			v1[k1_offset] = x1;
			if x1 > len1 {
				// Ran off the right of the graph.
				k1end += 2;
			} else if y1 > len2 {
				// Ran off the bottom of the graph.
				k1start += 2;
			} else if front {
				let k2_offset = v_offset + delta - k1;
				if k2_offset >= 0 && (k2_offset as usize) < v_length && v2[k2_offset as usize] != -1 {
					// Mirror x2 onto top-left coordinate system.
					let x2 = len1 - v2[k2_offset as usize];
					if x1 >= x2 {
						return bisect_split(text1, text2, x1 as usize, y1 as usize, keep_going);
					}
				}
			}
			k1 += 2;
		}

		// Walk the reverse path one step.
		let mut k2 = -d + k2start;
		while k2 <= d - k2end {
			let k2_offset = (v_offset + k2) as usize;
			let mut x2 = if k2 == -d || (k2 != d && v2[k2_offset - 1] < v2[k2_offset + 1]) {
				v2[k2_offset + 1]
			} else {
				v2[k2_offset - 1] + 1
			};
			let mut y2 = x2 - k2;
			while x2 < len1
				&& y2 < len2
				&& text1[(len1 - x2 - 1) as usize] == text2[(len2 - y2 - 1) as usize]
			{
				x2 += 1;
				y2 += 1;
			}
			v2[k2_offset] = x2;
			if x2 > len1 {
				k2end += 2;
			} else if y2 > len2 {
				k2start += 2;
			} else if !front {
				let k1_offset = v_offset + delta - k2;
				if k1_offset >= 0 && (k1_offset as usize) < v_length && v1[k1_offset as usize] != -1 {
					let x1 = v1[k1_offset as usize];
					let y1 = v_offset + x1 - k1_offset;
					// Mirror x2 onto top-left coordinate system.
					let x2 = len1 - x2;
					if x1 >= x2 {
						return bisect_split(text1, text2, x1 as usize, y1 as usize, keep_going);
					}
				}
			}
			k2 += 2;
		}
	}
	// Number of diffs equals number of characters; no commonality at all, or
	// the scan was cancelled.
	vec![
		Diff::from_chars(DiffOp::Delete, text1.to_vec()),
		Diff::from_chars(DiffOp::Insert, text2.to_vec()),
	]
}

fn bisect_split(
	text1: &[char],
	text2: &[char],
	x: usize,
	y: usize,
	keep_going: &mut dyn FnMut() -> bool,
) -> Vec<Diff> {
	let (text1_a, text1_b) = text1.split_at(x);
	let (text2_a, text2_b) = text2.split_at(y);
	let mut diffs = diff_chars(text1_a, text2_a, false, keep_going);
	diffs.extend(diff_chars(text1_b, text2_b, false, keep_going));
	diffs
}

// region:    --- Derived Outputs

/// Source text: concatenation of everything the edit script keeps or deletes.
pub fn diff_text1(diffs: &[Diff]) -> String {
	text1_chars(diffs).into_iter().collect()
}

/// Destination text: concatenation of everything kept or inserted.
pub fn diff_text2(diffs: &[Diff]) -> String {
	text2_chars(diffs).into_iter().collect()
}

pub(crate) fn text1_chars(diffs: &[Diff]) -> Vec<char> {
	let mut text = Vec::new();
	for diff in diffs {
		if diff.op != DiffOp::Insert {
			text.extend_from_slice(&diff.text);
		}
	}
	text
}

pub(crate) fn text2_chars(diffs: &[Diff]) -> Vec<char> {
	let mut text = Vec::new();
	for diff in diffs {
		if diff.op != DiffOp::Delete {
			text.extend_from_slice(&diff.text);
		}
	}
	text
}

/// Maps `loc`, an index into the source text, to its index in the
/// destination text. Positions inside an edit are attributed to its start.
pub fn diff_x_index(diffs: &[Diff], loc: usize) -> usize {
	let mut chars1 = 0;
	let mut chars2 = 0;
	let mut last_chars1 = 0;
	let mut last_chars2 = 0;
	let mut hit: Option<&Diff> = None;
	for diff in diffs {
		if diff.op != DiffOp::Insert {
			chars1 += diff.text.len();
		}
		if diff.op != DiffOp::Delete {
			chars2 += diff.text.len();
		}
		if chars1 > loc {
			// Overshot the location.
			hit = Some(diff);
			break;
		}
		last_chars1 = chars1;
		last_chars2 = chars2;
	}
	match hit {
		// The location was deleted.
		Some(diff) if diff.op == DiffOp::Delete => last_chars2,
		_ => last_chars2 + (loc - last_chars1),
	}
}

/// Levenshtein distance of an edit script: insertions and deletions between
/// two equalities can substitute for each other, so only the larger counts.
pub fn diff_levenshtein(diffs: &[Diff]) -> usize {
	let mut levenshtein = 0;
	let mut insertions = 0;
	let mut deletions = 0;
	for diff in diffs {
		match diff.op {
			DiffOp::Insert => insertions += diff.text.len(),
			DiffOp::Delete => deletions += diff.text.len(),
			DiffOp::Equal => {
				levenshtein += insertions.max(deletions);
				insertions = 0;
				deletions = 0;
			}
		}
	}
	levenshtein + insertions.max(deletions)
}

/// Renders a diff as an HTML fragment with `<ins>`/`<del>`/`<span>` runs.
pub fn diff_pretty_html(diffs: &[Diff]) -> String {
	let mut html = String::new();
	for diff in diffs {
		let text = diff
			.text_string()
			.replace('&', "&amp;")
			.replace('<', "&lt;")
			.replace('>', "&gt;")
			.replace('\n', "&para;<br>");
		match diff.op {
			DiffOp::Insert => {
				html.push_str("<ins style=\"background:#e6ffe6;\">");
				html.push_str(&text);
				html.push_str("</ins>");
			}
			DiffOp::Delete => {
				html.push_str("<del style=\"background:#ffe6e6;\">");
				html.push_str(&text);
				html.push_str("</del>");
			}
			DiffOp::Equal => {
				html.push_str("<span>");
				html.push_str(&text);
				html.push_str("</span>");
			}
		}
	}
	html
}

// endregion: --- Derived Outputs

// region:    --- Delta Format

/// Compresses a diff into a tab-separated delta: `=N` copies N units from
/// the source, `-N` skips N, `+text` inserts percent-encoded text.
pub fn diff_to_delta(diffs: &[Diff]) -> String {
	let mut tokens = Vec::with_capacity(diffs.len());
	for diff in diffs {
		match diff.op {
			DiffOp::Insert => tokens.push(format!("+{}", encode_text(&diff.text_string()))),
			DiffOp::Delete => tokens.push(format!("-{}", diff.text.len())),
			DiffOp::Equal => tokens.push(format!("={}", diff.text.len())),
		}
	}
	tokens.join("\t")
}

/// Rebuilds the full diff from a source text and a delta produced by
/// [`diff_to_delta`]. The tokens must consume the source exactly.
pub fn diff_from_delta(text1: &str, delta: &str) -> Result<Vec<Diff>> {
	let chars: Vec<char> = text1.chars().collect();
	let mut diffs = Vec::new();
	let mut pointer = 0;
	for token in delta.split('\t') {
		if token.is_empty() {
			// Blank tokens are ok (from a trailing \t).
			continue;
		}
		let Some(op) = token.chars().next() else { continue };
		let param = &token[op.len_utf8()..];
		match op {
			'+' => {
				let text = decode_text(param)
					.ok_or_else(|| Error::invalid_delta(format!("illegal escape in '{token}'")))?;
				diffs.push(Diff::new(DiffOp::Insert, &text));
			}
			'-' | '=' => {
				let count: usize = param
					.parse()
					.map_err(|_| Error::invalid_delta(format!("invalid number in '{token}'")))?;
				let end = pointer + count;
				if end > chars.len() {
					return Err(Error::invalid_delta(format!(
						"delta consumes {end} units of a {}-unit source",
						chars.len()
					)));
				}
				let text = chars[pointer..end].to_vec();
				pointer = end;
				let diff_op = if op == '-' { DiffOp::Delete } else { DiffOp::Equal };
				diffs.push(Diff::from_chars(diff_op, text));
			}
			_ => {
				return Err(Error::invalid_delta(format!("unknown operation in '{token}'")));
			}
		}
	}
	if pointer != chars.len() {
		return Err(Error::invalid_delta(format!(
			"delta consumed {pointer} of {} source units",
			chars.len()
		)));
	}
	Ok(diffs)
}

// endregion: --- Delta Format
