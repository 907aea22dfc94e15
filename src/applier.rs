use crate::cleanup::cleanup_semantic_lossless;
use crate::diff::{Diff, DiffOp, diff_chars, diff_levenshtein, diff_x_index, text1_chars, text2_chars};
use crate::matcher::{BITS_PER_WORD, MatchSettings, find_match_chars};
use crate::patch::{DEFAULT_MARGIN, Patch, deep_copy_patches};
use tracing::debug;

/// Tunables for patch application.
#[derive(Debug, Clone)]
pub struct ApplySettings {
	/// Threshold of the fuzzy matcher locating each patch.
	pub match_threshold: f64,
	/// Distance of the fuzzy matcher locating each patch.
	pub match_distance: usize,
	/// When a big deletion is found imperfectly, how closely must the
	/// content match before it is applied (0.0 = perfection, 1.0 = loose).
	pub delete_threshold: f64,
	/// Context units around each patch, also the null-padding width.
	pub margin: usize,
}

impl Default for ApplySettings {
	fn default() -> Self {
		Self {
			match_threshold: 0.5,
			match_distance: 1000,
			delete_threshold: 0.5,
			margin: DEFAULT_MARGIN,
		}
	}
}

/// Applies `patches` to `text`, realigning each patch against the actual
/// content. Returns the new text and one success flag per input patch.
///
/// The input list is never mutated; everything happens on a deep copy.
pub fn apply_patches(patches: &[Patch], text: &str, settings: &ApplySettings) -> (String, Vec<bool>) {
	if patches.is_empty() {
		return (text.to_string(), Vec::new());
	}

	let mut patches = deep_copy_patches(patches);
	let mut text: Vec<char> = text.chars().collect();

	// Pad the text on both sides so edge patches have an anchor.
	let null_padding = add_padding(&mut patches, settings.margin);
	text.splice(0..0, null_padding.iter().copied());
	text.extend_from_slice(&null_padding);
	split_max(&mut patches, settings.margin);

	let match_settings = MatchSettings {
		threshold: settings.match_threshold,
		distance: settings.match_distance,
	};

	// Delta between the expected and the actual location of the previous
	// patch. If there are patches expected at positions 10 and 20, but the
	// first was found at 12, the second is expected at 22.
	let mut delta: isize = 0;
	let mut results = vec![false; patches.len()];
	for (x, patch) in patches.iter().enumerate() {
		let expected_loc = (patch.start2 as isize + delta).max(0) as usize;
		let text1 = text1_chars(&patch.diffs);
		let mut start_loc;
		let mut end_loc = None;
		if text1.len() > BITS_PER_WORD {
			// A monster delete split by `split_max`: anchor the head and the
			// tail separately within the matcher's pattern ceiling.
			start_loc = find_match_chars(&text, &text1[..BITS_PER_WORD], expected_loc, &match_settings);
			if let Some(head) = start_loc {
				end_loc = find_match_chars(
					&text,
					&text1[text1.len() - BITS_PER_WORD..],
					expected_loc + text1.len() - BITS_PER_WORD,
					&match_settings,
				);
				match end_loc {
					Some(tail) if head < tail => {}
					// Can't find a valid trailing context, drop this patch.
					_ => start_loc = None,
				}
			}
		} else {
			start_loc = find_match_chars(&text, &text1, expected_loc, &match_settings);
		}

		let Some(start) = start_loc else {
			// No match found: ignore the patch, but subtract the delta it
			// would have introduced so later patches still line up.
			debug!(patch = x, expected_loc, "patch context not found");
			delta -= patch.length2 as isize - patch.length1 as isize;
			continue;
		};

		// Found a match. :)
		results[x] = true;
		delta = start as isize - expected_loc as isize;
		let end = match end_loc {
			None => (start + text1.len()).min(text.len()),
			Some(tail) => (tail + BITS_PER_WORD).min(text.len()),
		};
		let text2: Vec<char> = text[start..end].to_vec();

		if text1 == text2 {
			// Perfect match, just shove the replacement text in.
			let replacement = text2_chars(&patch.diffs);
			text.splice(start..(start + text1.len()).min(text.len()), replacement);
			continue;
		}

		// Imperfect match. Run a diff to get a framework of equivalent
		// indices between the expected and the actual content.
		let mut keep_going = || true;
		let mut window_diffs = diff_chars(&text1, &text2, false, &mut keep_going);
		if text1.len() > BITS_PER_WORD
			&& diff_levenshtein(&window_diffs) as f64 / text1.len() as f64
				> settings.delete_threshold
		{
			// The end points match, but the content is unacceptably bad.
			debug!(patch = x, "imperfect match beyond the delete threshold");
			results[x] = false;
			continue;
		}

		cleanup_semantic_lossless(&mut window_diffs);
		let mut index1 = 0;
		for patch_diff in &patch.diffs {
			if patch_diff.op != DiffOp::Equal {
				let index2 = diff_x_index(&window_diffs, index1);
				match patch_diff.op {
					DiffOp::Insert => {
						let at = (start + index2).min(text.len());
						text.splice(at..at, patch_diff.text.iter().copied());
					}
					DiffOp::Delete => {
						let from = (start + index2).min(text.len());
						let to = (start + diff_x_index(&window_diffs, index1 + patch_diff.text.len()))
							.min(text.len());
						text.drain(from..to.max(from));
					}
					DiffOp::Equal => {}
				}
			}
			if patch_diff.op != DiffOp::Delete {
				index1 += patch_diff.text.len();
			}
		}
	}

	// Strip the padding off.
	text.drain(..null_padding.len());
	text.truncate(text.len() - null_padding.len());
	(text.into_iter().collect(), results)
}

/// Adds `margin` code units of U+0001..U+margin null padding to both sides
/// of every patch, intended to bracket a text padded the same way. Returns
/// the padding string.
pub fn add_padding(patches: &mut Vec<Patch>, margin: usize) -> Vec<char> {
	let null_padding: Vec<char> = (1..=margin as u32).filter_map(char::from_u32).collect();

	// Bump all the patches forward.
	for patch in patches.iter_mut() {
		patch.start1 += margin;
		patch.start2 += margin;
	}

	// Add some padding on start of first diff.
	if let Some(patch) = patches.first_mut() {
		let leading_equal = patch.diffs.first().is_some_and(|diff| diff.op == DiffOp::Equal);
		if !leading_equal {
			// First entry is not an equality, add one.
			patch.diffs.insert(0, Diff::from_chars(DiffOp::Equal, null_padding.clone()));
			patch.start1 -= margin; // Should be 0.
			patch.start2 -= margin; // Should be 0.
			patch.length1 += margin;
			patch.length2 += margin;
		} else if margin > patch.diffs[0].text.len() {
			// Grow the first equality backwards into the padding.
			let extra = margin - patch.diffs[0].text.len();
			let mut grown = null_padding[patch.diffs[0].text.len()..].to_vec();
			grown.extend_from_slice(&patch.diffs[0].text);
			patch.diffs[0].text = grown;
			patch.start1 -= extra;
			patch.start2 -= extra;
			patch.length1 += extra;
			patch.length2 += extra;
		}
	}

	// Add some padding on end of last diff.
	if let Some(patch) = patches.last_mut() {
		let trailing_equal = patch.diffs.last().is_some_and(|diff| diff.op == DiffOp::Equal);
		if !trailing_equal {
			// Last entry is not an equality, add one.
			patch.diffs.push(Diff::from_chars(DiffOp::Equal, null_padding.clone()));
			patch.length1 += margin;
			patch.length2 += margin;
		} else {
			let trailing_len = patch.diffs[patch.diffs.len() - 1].text.len();
			if margin > trailing_len {
				// Grow the last equality forwards into the padding.
				let extra = margin - trailing_len;
				if let Some(last) = patch.diffs.last_mut() {
					last.text.extend_from_slice(&null_padding[..extra]);
				}
				patch.length1 += extra;
				patch.length2 += extra;
			}
		}
	}

	null_padding
}

/// Splits every patch whose pre-image is longer than the matcher's pattern
/// ceiling into a run of smaller patches, threading `margin` units of
/// context between them.
pub fn split_max(patches: &mut Vec<Patch>, margin: usize) {
	let patch_size = BITS_PER_WORD;
	let mut x = 0;
	while x < patches.len() {
		if patches[x].length1 <= patch_size {
			x += 1;
			continue;
		}
		// Remove the big old patch; emit replacements in its place.
		let mut bigpatch = patches.remove(x);
		let mut precontext: Vec<char> = Vec::new();
		while !bigpatch.diffs.is_empty() {
			// Create one of several smaller patches.
			let mut patch = Patch {
				start1: bigpatch.start1.saturating_sub(precontext.len()),
				start2: bigpatch.start2.saturating_sub(precontext.len()),
				..Patch::default()
			};
			let mut empty = true;
			if !precontext.is_empty() {
				patch.length1 = precontext.len();
				patch.length2 = precontext.len();
				patch.diffs.push(Diff::from_chars(DiffOp::Equal, precontext.clone()));
			}

			while !bigpatch.diffs.is_empty() && patch.length1 < patch_size - margin {
				let op = bigpatch.diffs[0].op;
				match op {
					DiffOp::Insert => {
						// Insertions are harmless.
						let entry = bigpatch.diffs.remove(0);
						patch.length2 += entry.text.len();
						bigpatch.start2 += entry.text.len();
						patch.diffs.push(entry);
						empty = false;
					}
					DiffOp::Delete
						if patch.diffs.len() == 1
							&& patch.diffs[0].op == DiffOp::Equal
							&& bigpatch.diffs[0].text.len() > 2 * patch_size =>
					{
						// This is a large deletion. Let it pass in one chunk.
						let entry = bigpatch.diffs.remove(0);
						patch.length1 += entry.text.len();
						bigpatch.start1 += entry.text.len();
						empty = false;
						patch.diffs.push(entry);
					}
					_ => {
						// Deletion or equality; chop it up if too long.
						let take = bigpatch.diffs[0]
							.text
							.len()
							.min(patch_size - patch.length1 - margin);
						let chunk: Vec<char> = bigpatch.diffs[0].text[..take].to_vec();
						patch.length1 += take;
						bigpatch.start1 += take;
						if op == DiffOp::Equal {
							patch.length2 += take;
							bigpatch.start2 += take;
						} else {
							empty = false;
						}
						patch.diffs.push(Diff::from_chars(op, chunk));
						if take == bigpatch.diffs[0].text.len() {
							bigpatch.diffs.remove(0);
						} else {
							bigpatch.diffs[0].text.drain(..take);
						}
					}
				}
			}

			// Compute the head context for the next patch.
			let tail = text2_chars(&patch.diffs);
			precontext = tail[tail.len().saturating_sub(margin)..].to_vec();
			// Append the end context for this patch.
			let remaining = text1_chars(&bigpatch.diffs);
			let postcontext: Vec<char> = remaining[..remaining.len().min(margin)].to_vec();
			if !postcontext.is_empty() {
				patch.length1 += postcontext.len();
				patch.length2 += postcontext.len();
				let trailing_equal =
					patch.diffs.last().is_some_and(|last| last.op == DiffOp::Equal);
				if trailing_equal {
					if let Some(last) = patch.diffs.last_mut() {
						last.text.extend_from_slice(&postcontext);
					}
				} else {
					patch.diffs.push(Diff::from_chars(DiffOp::Equal, postcontext));
				}
			}

			if !empty {
				patches.insert(x, patch);
				x += 1;
			}
		}
	}
}
