use crate::diff::Diff;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use std::collections::HashMap;
use tracing::debug;

/// Cap on distinct lines taken from the first text before the remainder is
/// treated as one line (the second text gets the rest of the code window).
const MAX_LINES_FIRST: usize = 40_000;

/// Combined cap on distinct lines across both texts. Line codes are assigned
/// sequentially from U+0001, so the window must stay below the surrogate
/// block at U+D800 for every code to be a valid scalar value.
const MAX_LINES_TOTAL: usize = 55_000;

/// Characters left verbatim by the percent encoder, mirroring the class the
/// JS `encodeURI` function leaves unescaped, plus the literal space.
const PATCH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
	.remove(b' ')
	.remove(b'!')
	.remove(b'#')
	.remove(b'$')
	.remove(b'&')
	.remove(b'\'')
	.remove(b'(')
	.remove(b')')
	.remove(b'*')
	.remove(b'+')
	.remove(b',')
	.remove(b'-')
	.remove(b'.')
	.remove(b'/')
	.remove(b':')
	.remove(b';')
	.remove(b'=')
	.remove(b'?')
	.remove(b'@')
	.remove(b'_')
	.remove(b'~');

/// Number of code units the two slices share at their start.
///
/// Binary-searched: slice equality is a bulk compare, so probing ranges beats
/// walking unit by unit on long common prefixes.
pub fn common_prefix(text1: &[char], text2: &[char]) -> usize {
	if text1.is_empty() || text2.is_empty() || text1[0] != text2[0] {
		return 0;
	}
	let mut min = 0;
	let mut max = text1.len().min(text2.len());
	let mut mid = max;
	let mut start = 0;
	while min < mid {
		if text1[start..mid] == text2[start..mid] {
			min = mid;
			start = min;
		} else {
			max = mid;
		}
		mid = (max - min) / 2 + min;
	}
	mid
}

/// Number of code units the two slices share at their end.
pub fn common_suffix(text1: &[char], text2: &[char]) -> usize {
	if text1.is_empty() || text2.is_empty() || text1[text1.len() - 1] != text2[text2.len() - 1] {
		return 0;
	}
	let mut min = 0;
	let mut max = text1.len().min(text2.len());
	let mut mid = max;
	let mut end = 0;
	while min < mid {
		if text1[text1.len() - mid..text1.len() - end] == text2[text2.len() - mid..text2.len() - end] {
			min = mid;
			end = min;
		} else {
			max = mid;
		}
		mid = (max - min) / 2 + min;
	}
	mid
}

/// Length of the longest suffix of `text1` that is a prefix of `text2`.
pub fn common_overlap(text1: &[char], text2: &[char]) -> usize {
	if text1.is_empty() || text2.is_empty() {
		return 0;
	}
	// Truncate the longer side, only the tail of text1 / head of text2 matters.
	let min_len = text1.len().min(text2.len());
	let text1 = &text1[text1.len() - min_len..];
	let text2 = &text2[..min_len];
	if text1 == text2 {
		return min_len;
	}

	// Start with a one-unit suffix, double up through indexOf hits.
	let mut best = 0;
	let mut length = 1;
	loop {
		if length > min_len {
			return best;
		}
		let pattern = &text1[min_len - length..];
		let Some(found) = find_sub(text2, pattern, 0) else {
			return best;
		};
		length += found;
		if found == 0 || text1[min_len - length..] == text2[..length] {
			best = length;
			length += 1;
		}
	}
}

/// Position of `needle` in `haystack` at or after `from`.
pub(crate) fn find_sub(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
	let from = from.min(haystack.len());
	if needle.is_empty() {
		return Some(from);
	}
	haystack[from..]
		.windows(needle.len())
		.position(|window| window == needle)
		.map(|pos| pos + from)
}

/// Position of the last occurrence of `needle` starting at or before `from`.
pub(crate) fn rfind_sub(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
	if needle.is_empty() {
		return Some(from.min(haystack.len()));
	}
	if needle.len() > haystack.len() {
		return None;
	}
	let mut start = from.min(haystack.len() - needle.len());
	loop {
		if haystack[start..start + needle.len()] == *needle {
			return Some(start);
		}
		if start == 0 {
			return None;
		}
		start -= 1;
	}
}

/// Compresses both texts down to one code unit per unique line.
///
/// Returns the two encoded strings plus the line lookup table; index 0 is the
/// empty-string sentinel so assigned codes start at U+0001. Line codes are
/// shared between the two texts.
pub fn lines_to_chars(text1: &str, text2: &str) -> (Vec<char>, Vec<char>, Vec<String>) {
	let mut line_array: Vec<String> = vec![String::new()];
	let mut line_hash: HashMap<String, usize> = HashMap::new();

	let chars1 = lines_munge(text1, &mut line_array, &mut line_hash, MAX_LINES_FIRST);
	let chars2 = lines_munge(text2, &mut line_array, &mut line_hash, MAX_LINES_TOTAL);
	(chars1, chars2, line_array)
}

/// Inverse of [`lines_to_chars`], rehydrating each diff text in place.
pub fn chars_to_lines(diffs: &mut [Diff], line_array: &[String]) {
	for diff in diffs.iter_mut() {
		let mut text = String::new();
		for &code in &diff.text {
			text.push_str(&line_array[code as usize]);
		}
		diff.text = text.chars().collect();
	}
}

fn lines_munge(
	text: &str,
	line_array: &mut Vec<String>,
	line_hash: &mut HashMap<String, usize>,
	max_lines: usize,
) -> Vec<char> {
	let mut encoded = Vec::new();
	let mut rest = text;
	while !rest.is_empty() {
		let split = if line_array.len() == max_lines {
			// Alphabet saturated, swallow the remainder as one line.
			debug!(max_lines, "line alphabet saturated");
			rest.len()
		} else {
			rest.find('\n').map(|pos| pos + 1).unwrap_or(rest.len())
		};
		let (line, tail) = rest.split_at(split);
		rest = tail;
		let code = match line_hash.get(line) {
			Some(&code) => code,
			None => {
				line_array.push(line.to_string());
				line_hash.insert(line.to_string(), line_array.len() - 1);
				line_array.len() - 1
			}
		};
		// Codes are capped below the surrogate block, so this is total.
		if let Some(unit) = char::from_u32(code as u32) {
			encoded.push(unit);
		}
	}
	encoded
}

// region:    --- Percent Encoding

/// Percent-encodes `text` for a patch body or delta token, spaces literal.
pub(crate) fn encode_text(text: &str) -> String {
	utf8_percent_encode(text, PATCH_ENCODE_SET).to_string()
}

/// Decodes a percent-encoded body line. `None` on a malformed escape or a
/// byte sequence that does not decode to UTF-8.
pub(crate) fn decode_text(text: &str) -> Option<String> {
	let bytes = text.as_bytes();
	let mut i = 0;
	while i < bytes.len() {
		if bytes[i] == b'%' {
			if i + 2 >= bytes.len()
				|| !bytes[i + 1].is_ascii_hexdigit()
				|| !bytes[i + 2].is_ascii_hexdigit()
			{
				return None;
			}
			i += 3;
		} else {
			i += 1;
		}
	}
	percent_decode_str(text)
		.decode_utf8()
		.ok()
		.map(|decoded| decoded.into_owned())
}

// endregion: --- Percent Encoding

// region:    --- Tests


// endregion: --- Tests
