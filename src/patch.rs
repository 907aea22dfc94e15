use crate::cleanup::{cleanup_efficiency, cleanup_semantic};
use crate::diff::{Diff, DiffOp, diff, text1_chars};
use crate::error::{Error, Result};
use crate::matcher::BITS_PER_WORD;
use crate::textutil::{decode_text, encode_text, find_sub, rfind_sub};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Desired number of context code units surrounding a patch's edits.
pub const DEFAULT_MARGIN: usize = 4;

/// Cost of an empty edit operation in terms of edited characters, as fed to
/// the efficiency cleanup by [`make_patches_from_texts`].
pub const DEFAULT_EDIT_COST: usize = 4;

static RE_PATCH_HEADER: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@$").unwrap());

/// A diff fragment with positional metadata and surrounding context
/// equalities. `start1`/`length1` address the pre-image, `start2`/`length2`
/// the post-image; starts are 0-based and account for the shifts of
/// preceding patches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
	pub diffs: Vec<Diff>,
	pub start1: usize,
	pub start2: usize,
	pub length1: usize,
	pub length2: usize,
}

impl fmt::Display for Patch {
	/// GNU-diff-style textual form. Header coordinates are 1-based, with two
	/// exceptions: an empty range prints its 0-based start with `,0`, and a
	/// one-unit range omits the length entirely.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let coords1 = match self.length1 {
			0 => format!("{},0", self.start1),
			1 => format!("{}", self.start1 + 1),
			length => format!("{},{}", self.start1 + 1, length),
		};
		let coords2 = match self.length2 {
			0 => format!("{},0", self.start2),
			1 => format!("{}", self.start2 + 1),
			length => format!("{},{}", self.start2 + 1, length),
		};
		writeln!(f, "@@ -{coords1} +{coords2} @@")?;
		for diff in &self.diffs {
			let sign = match diff.op {
				DiffOp::Insert => '+',
				DiffOp::Delete => '-',
				DiffOp::Equal => ' ',
			};
			writeln!(f, "{sign}{}", encode_text(&diff.text_string()))?;
		}
		Ok(())
	}
}

// region:    --- Make

/// Computes a patch list turning `text1` into `text2`.
pub fn make_patches_from_texts(text1: &str, text2: &str) -> Vec<Patch> {
	let mut diffs = diff(text1, text2, true);
	if diffs.len() > 2 {
		cleanup_semantic(&mut diffs);
		cleanup_efficiency(&mut diffs, DEFAULT_EDIT_COST);
	}
	let chars1: Vec<char> = text1.chars().collect();
	make_patches_internal(&chars1, &diffs)
}

/// Builds patches from a ready-made diff; the source text is reconstructed
/// from the diff itself.
pub fn make_patches_from_diffs(diffs: &[Diff]) -> Vec<Patch> {
	let chars1 = text1_chars(diffs);
	make_patches_internal(&chars1, diffs)
}

/// Builds patches from a source text and a ready-made diff. This is the
/// preferred form: nothing has to be recomputed.
pub fn make_patches_from_text_and_diffs(text1: &str, diffs: &[Diff]) -> Vec<Patch> {
	let chars1: Vec<char> = text1.chars().collect();
	make_patches_internal(&chars1, diffs)
}

/// Compatibility dispatcher over the historical calling conventions:
/// `(text1, text2)`, `(diffs)`, `(text1, diffs)` and `(text1, text2, diffs)`
/// (the `text2` of the last form is ignored). Anything else is an
/// [`Error::InvalidArguments`].
pub fn make_patches(
	text1: Option<&str>,
	text2: Option<&str>,
	diffs: Option<&[Diff]>,
) -> Result<Vec<Patch>> {
	match (text1, text2, diffs) {
		(Some(text1), Some(text2), None) => Ok(make_patches_from_texts(text1, text2)),
		(None, None, Some(diffs)) => Ok(make_patches_from_diffs(diffs)),
		(Some(text1), _, Some(diffs)) => Ok(make_patches_from_text_and_diffs(text1, diffs)),
		_ => Err(Error::invalid_arguments(
			"expected (text1, text2), (diffs), (text1, diffs) or (text1, text2, diffs)",
		)),
	}
}

fn make_patches_internal(text1: &[char], diffs: &[Diff]) -> Vec<Patch> {
	if diffs.is_empty() {
		// No diffs, no patches.
		return Vec::new();
	}

	let mut patches = Vec::new();
	let mut patch = Patch::default();
	let mut char_count1 = 0; // Number of units into the text1 string.
	let mut char_count2 = 0; // Number of units into the text2 string.
	// `prepatch` is the text1 coordinate space patches are expressed in; it
	// advances to the partially patched text each time a patch closes.
	let mut prepatch_text: Vec<char> = text1.to_vec();
	let mut postpatch_text: Vec<char> = text1.to_vec();

	for (x, diff) in diffs.iter().enumerate() {
		if patch.diffs.is_empty() && diff.op != DiffOp::Equal {
			// A new patch starts here.
			patch.start1 = char_count1;
			patch.start2 = char_count2;
		}

		match diff.op {
			DiffOp::Insert => {
				patch.diffs.push(diff.clone());
				patch.length2 += diff.text.len();
				postpatch_text.splice(char_count2..char_count2, diff.text.iter().copied());
			}
			DiffOp::Delete => {
				patch.length1 += diff.text.len();
				patch.diffs.push(diff.clone());
				postpatch_text.drain(char_count2..char_count2 + diff.text.len());
			}
			DiffOp::Equal => {
				if diff.text.len() <= 2 * DEFAULT_MARGIN
					&& !patch.diffs.is_empty()
					&& x != diffs.len() - 1
				{
					// Small equality inside a patch.
					patch.diffs.push(diff.clone());
					patch.length1 += diff.text.len();
					patch.length2 += diff.text.len();
				} else if diff.text.len() >= 2 * DEFAULT_MARGIN && !patch.diffs.is_empty() {
					// Time for a new patch.
					add_patch_context(&mut patch, &prepatch_text, DEFAULT_MARGIN);
					patches.push(std::mem::take(&mut patch));
					// Unlike Unified Diffs, patch coordinates are expressed
					// relative to the partially patched text, so flip over to
					// it and rebase.
					prepatch_text = postpatch_text.clone();
					char_count1 = char_count2;
				}
			}
		}

		if diff.op != DiffOp::Insert {
			char_count1 += diff.text.len();
		}
		if diff.op != DiffOp::Delete {
			char_count2 += diff.text.len();
		}
	}

	// Pick up the leftover patch if not empty.
	if !patch.diffs.is_empty() {
		add_patch_context(&mut patch, &prepatch_text, DEFAULT_MARGIN);
		patches.push(patch);
	}

	patches
}

/// Grows the context of `patch` until it uniquely identifies its location in
/// `text` (or the pattern hits the matcher's length ceiling), then adds
/// `margin` more on both sides.
pub fn add_patch_context(patch: &mut Patch, text: &[char], margin: usize) {
	if text.is_empty() {
		return;
	}
	let anchor = patch.start2.min(text.len());
	let mut pattern = text[anchor..(patch.start2 + patch.length1).min(text.len())].to_vec();
	let mut padding = 0;

	// Grow the pattern until it is unique, with room left for the margins.
	while find_sub(text, &pattern, 0) != rfind_sub(text, &pattern, text.len())
		&& pattern.len() < BITS_PER_WORD.saturating_sub(2 * margin)
	{
		padding += margin;
		let start = patch.start2.saturating_sub(padding);
		let end = (patch.start2 + patch.length1 + padding).min(text.len());
		pattern = text[start..end].to_vec();
	}
	// Add one chunk for good luck.
	padding += margin;

	let prefix_start = patch.start2.saturating_sub(padding);
	let prefix = &text[prefix_start..anchor];
	if !prefix.is_empty() {
		patch.diffs.insert(0, Diff::from_chars(DiffOp::Equal, prefix.to_vec()));
	}
	let suffix_start = (patch.start2 + patch.length1).min(text.len());
	let suffix_end = (patch.start2 + patch.length1 + padding).min(text.len());
	let suffix = &text[suffix_start..suffix_end];
	if !suffix.is_empty() {
		patch.diffs.push(Diff::from_chars(DiffOp::Equal, suffix.to_vec()));
	}

	patch.start1 = patch.start1.saturating_sub(prefix.len());
	patch.start2 = patch.start2.saturating_sub(prefix.len());
	patch.length1 += prefix.len() + suffix.len();
	patch.length2 += prefix.len() + suffix.len();
}

/// Independent copies of all contained diffs and strings.
pub fn deep_copy_patches(patches: &[Patch]) -> Vec<Patch> {
	patches.to_vec()
}

// endregion: --- Make

// region:    --- Text Form

/// Serialises a patch list to a single block of text.
pub fn patches_to_text(patches: &[Patch]) -> String {
	patches.iter().map(|patch| patch.to_string()).collect()
}

/// Parses a block of text produced by [`patches_to_text`].
pub fn patches_from_text(text: &str) -> Result<Vec<Patch>> {
	let mut patches = Vec::new();
	if text.is_empty() {
		return Ok(patches);
	}
	let lines: Vec<&str> = text.split('\n').collect();
	let mut pointer = 0;
	while pointer < lines.len() {
		let header = lines[pointer];
		let caps = RE_PATCH_HEADER
			.captures(header)
			.ok_or_else(|| Error::invalid_patch(header))?;

		let mut patch = Patch::default();
		(patch.start1, patch.length1) =
			parse_coords(caps.get(1).map_or("", |m| m.as_str()), caps.get(2).map(|m| m.as_str()))
				.ok_or_else(|| Error::invalid_patch(header))?;
		(patch.start2, patch.length2) =
			parse_coords(caps.get(3).map_or("", |m| m.as_str()), caps.get(4).map(|m| m.as_str()))
				.ok_or_else(|| Error::invalid_patch(header))?;
		pointer += 1;

		while pointer < lines.len() {
			let line = lines[pointer];
			let Some(sign) = line.chars().next() else {
				// Blank line? Whatever.
				pointer += 1;
				continue;
			};
			if sign == '@' {
				// Start of next patch.
				break;
			}
			let body = decode_text(&line[sign.len_utf8()..])
				.ok_or_else(|| Error::illegal_escape(line))?;
			match sign {
				'-' => patch.diffs.push(Diff::new(DiffOp::Delete, &body)),
				'+' => patch.diffs.push(Diff::new(DiffOp::Insert, &body)),
				' ' => patch.diffs.push(Diff::new(DiffOp::Equal, &body)),
				_ => return Err(Error::invalid_patch(line)),
			}
			pointer += 1;
		}

		patches.push(patch);
	}
	Ok(patches)
}

/// Undoes the 1-based header convention: a missing length means a one-unit
/// range, a literal `0` length keeps the start as-is.
fn parse_coords(start: &str, length: Option<&str>) -> Option<(usize, usize)> {
	let start: usize = start.parse().ok()?;
	match length {
		None => Some((start.checked_sub(1)?, 1)),
		Some("0") => Some((start, 0)),
		Some(length) => {
			let length: usize = length.parse().ok()?;
			Some((start.checked_sub(1)?, length))
		}
	}
}

// endregion: --- Text Form
