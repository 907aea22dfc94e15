use crate::textutil::{find_sub, rfind_sub};
use std::collections::HashMap;
use tracing::debug;

/// Word width of the bit-parallel scan. Bounds the matcher's pattern length
/// and the patch splitter's chunk size.
pub const BITS_PER_WORD: usize = 32;

/// Bit-parallel state word. One bit wider than the pattern ceiling so a
/// 32-unit pattern's shifted masks never overflow.
type Mask = u64;

/// Tunables for fuzzy location.
#[derive(Debug, Clone)]
pub struct MatchSettings {
	/// At what point is no match declared (0.0 = perfection, 1.0 = very loose).
	pub threshold: f64,
	/// How far to search for a match (0 = exact location only). A match this
	/// many code units away from the expected location costs one full
	/// threshold point.
	pub distance: usize,
}

impl Default for MatchSettings {
	fn default() -> Self {
		Self { threshold: 0.5, distance: 1000 }
	}
}

/// Locates the occurrence of `pattern` closest to `loc` in `text`.
///
/// Exact matches at `loc` are free; anything else is scored by error count
/// and distance from `loc`, and `None` is returned when nothing beats the
/// threshold.
pub fn find_match(text: &str, pattern: &str, loc: usize, settings: &MatchSettings) -> Option<usize> {
	let text: Vec<char> = text.chars().collect();
	let pattern: Vec<char> = pattern.chars().collect();
	find_match_chars(&text, &pattern, loc, settings)
}

pub(crate) fn find_match_chars(
	text: &[char],
	pattern: &[char],
	loc: usize,
	settings: &MatchSettings,
) -> Option<usize> {
	let loc = loc.min(text.len());
	if text == pattern {
		// Shortcut, also covers two empty inputs.
		return Some(0);
	}
	if text.is_empty() {
		return None;
	}
	if pattern.is_empty() {
		return Some(loc);
	}
	if loc + pattern.len() <= text.len() && &text[loc..loc + pattern.len()] == pattern {
		// Perfect match at the expected location.
		return Some(loc);
	}
	bitap(text, pattern, loc, settings)
}

/// Bitap (Shift-Or) scan with an expanding error budget.
fn bitap(text: &[char], pattern: &[char], loc: usize, settings: &MatchSettings) -> Option<usize> {
	if pattern.len() > BITS_PER_WORD {
		debug!(pattern_len = pattern.len(), "pattern too long for bitap");
		return None;
	}

	let alphabet = bitap_alphabet(pattern);

	// Score of a candidate at position `x` with `e` errors; lower is better.
	let score = |errors: usize, x: usize| -> f64 {
		let accuracy = errors as f64 / pattern.len() as f64;
		let proximity = (loc as isize - x as isize).unsigned_abs();
		if settings.distance == 0 {
			return if proximity == 0 { accuracy } else { 1.0 };
		}
		accuracy + proximity as f64 / settings.distance as f64
	};

	let mut score_threshold = settings.threshold;
	// An exact match anywhere lowers the bar for everything that follows.
	if let Some(exact) = find_sub(text, pattern, loc) {
		score_threshold = score(0, exact).min(score_threshold);
		if let Some(exact_back) = rfind_sub(text, pattern, loc + pattern.len()) {
			score_threshold = score(0, exact_back).min(score_threshold);
		}
	}

	let match_mask: Mask = 1 << (pattern.len() - 1);
	let mut best_loc: Option<usize> = None;
	let mut bin_max = pattern.len() + text.len();
	let mut last_rd: Vec<Mask> = Vec::new();

	for d in 0..pattern.len() {
		// Binary search for the widest window still within the threshold at
		// this error level.
		let mut bin_min = 0;
		let mut bin_mid = bin_max;
		while bin_min < bin_mid {
			if score(d, loc + bin_mid) <= score_threshold {
				bin_min = bin_mid;
			} else {
				bin_max = bin_mid;
			}
			bin_mid = (bin_max - bin_min) / 2 + bin_min;
		}
		bin_max = bin_mid;

		let mut start = (loc as isize - bin_mid as isize + 1).max(1) as usize;
		let finish = (loc + bin_mid).min(text.len()) + pattern.len();

		let mut rd: Vec<Mask> = vec![0; finish + 2];
		rd[finish + 1] = (1 << d) - 1;
		let mut j = finish;
		while j >= start {
			let char_match: Mask = if j - 1 >= text.len() {
				// Out of range.
				0
			} else {
				alphabet.get(&text[j - 1]).copied().unwrap_or(0)
			};
			if d == 0 {
				// First pass: exact matches only.
				rd[j] = ((rd[j + 1] << 1) | 1) & char_match;
			} else {
				// Subsequent passes fold in substitutions, insertions and
				// deletions from the previous error level.
				let prev_next = last_rd.get(j + 1).copied().unwrap_or(0);
				let prev_here = last_rd.get(j).copied().unwrap_or(0);
				rd[j] = (((rd[j + 1] << 1) | 1) & char_match)
					| (((prev_next | prev_here) << 1) | 1)
					| prev_next;
			}
			if rd[j] & match_mask != 0 {
				let candidate = score(d, j - 1);
				// This match will almost certainly be better than any existing
				// match, but check anyway.
				if candidate <= score_threshold {
					score_threshold = candidate;
					best_loc = Some(j - 1);
					if j - 1 > loc {
						// When passing loc, don't exceed our current distance
						// from it.
						start = (2 * loc as isize - (j - 1) as isize).max(1) as usize;
					} else {
						// Already passed loc; downhill from here.
						break;
					}
				}
			}
			j -= 1;
		}
		// No hope of a better match at higher error levels.
		if score(d + 1, loc) > score_threshold {
			break;
		}
		last_rd = rd;
	}
	best_loc
}

/// Bitmask per pattern character; bit `i` (from the high end) marks the
/// positions where that character occurs.
fn bitap_alphabet(pattern: &[char]) -> HashMap<char, Mask> {
	let mut alphabet: HashMap<char, Mask> = HashMap::new();
	for (i, &c) in pattern.iter().enumerate() {
		*alphabet.entry(c).or_insert(0) |= 1 << (pattern.len() - i - 1);
	}
	alphabet
}

// region:    --- Tests


// endregion: --- Tests
