use crate::diff::{Diff, DiffOp};
use crate::textutil::{common_overlap, common_prefix, common_suffix};

/// Canonicalises a diff: merges runs of identical operations, factors common
/// affixes of paired edits into the surrounding equalities, drops empties,
/// and slides lone edits into adjacent equalities where they fit.
///
/// Cleanup passes re-enter via index stacks rather than held references; the
/// vector splices below would invalidate anything pointing into it.
pub fn cleanup_merge(diffs: &mut Vec<Diff>) {
	// Dummy equality at the end flushes the final run.
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
				pointer += 1;
			}
			DiffOp::Delete => {
				count_delete += 1;
				text_delete.extend_from_slice(&diffs[pointer].text);
				pointer += 1;
			}
			DiffOp::Equal => {
				// Upon reaching an equality, check for prior redundancies.
				if count_delete + count_insert > 1 {
					if count_delete != 0 && count_insert != 0 {
						// Factor out any common prefix.
						let common = common_prefix(&text_insert, &text_delete);
						if common != 0 {
							let run_start = pointer - count_delete - count_insert;
							if run_start > 0 && diffs[run_start - 1].op == DiffOp::Equal {
								diffs[run_start - 1].text.extend_from_slice(&text_insert[..common]);
							} else {
								diffs.insert(
									0,
									Diff::from_chars(DiffOp::Equal, text_insert[..common].to_vec()),
								);
								pointer += 1;
							}
							text_insert.drain(..common);
							text_delete.drain(..common);
						}
						// Factor out any common suffix.
						let common = common_suffix(&text_insert, &text_delete);
						if common != 0 {
							let mut merged = text_insert[text_insert.len() - common..].to_vec();
							merged.extend_from_slice(&diffs[pointer].text);
							diffs[pointer].text = merged;
							text_insert.truncate(text_insert.len() - common);
							text_delete.truncate(text_delete.len() - common);
						}
					}
					// Delete the offending records and add the merged ones.
					let run_start = pointer - count_delete - count_insert;
					diffs.drain(run_start..pointer);
					pointer = run_start;
					if !text_delete.is_empty() {
						diffs.insert(pointer, Diff::from_chars(DiffOp::Delete, text_delete.clone()));
						pointer += 1;
					}
					if !text_insert.is_empty() {
						diffs.insert(pointer, Diff::from_chars(DiffOp::Insert, text_insert.clone()));
						pointer += 1;
					}
					pointer += 1;
				} else if pointer != 0 && diffs[pointer - 1].op == DiffOp::Equal {
					// Merge this equality with the previous one.
					let text = diffs.remove(pointer).text;
					diffs[pointer - 1].text.extend(text);
				} else {
					pointer += 1;
				}
				count_insert = 0;
				count_delete = 0;
				text_delete.clear();
				text_insert.clear();
			}
		}
	}
	if diffs.last().is_some_and(|diff| diff.text.is_empty()) {
		diffs.pop();
	}

	// Second pass: look for single edits surrounded on both sides by
	// equalities which can be shifted sideways to eliminate an equality.
	// e.g: A<ins>BA</ins>C -> <ins>AB</ins>AC
	let mut changes = false;
	let mut pointer = 1;
	while diffs.len() >= 3 && pointer < diffs.len() - 1 {
		if diffs[pointer - 1].op == DiffOp::Equal && diffs[pointer + 1].op == DiffOp::Equal {
			let prev = diffs[pointer - 1].text.clone();
			let next = diffs[pointer + 1].text.clone();
			if diffs[pointer].text.ends_with(&prev) {
				// Shift the edit over the previous equality.
				let edit_len = diffs[pointer].text.len();
				let mut shifted = prev.clone();
				shifted.extend_from_slice(&diffs[pointer].text[..edit_len - prev.len()]);
				diffs[pointer].text = shifted;
				let mut merged = prev;
				merged.extend_from_slice(&next);
				diffs[pointer + 1].text = merged;
				diffs.remove(pointer - 1);
				changes = true;
			} else if diffs[pointer].text.starts_with(&next) {
				// Shift the edit over the next equality.
				diffs[pointer - 1].text.extend_from_slice(&next);
				let mut shifted = diffs[pointer].text[next.len()..].to_vec();
				shifted.extend_from_slice(&next);
				diffs[pointer].text = shifted;
				diffs.remove(pointer + 1);
				changes = true;
			}
		}
		pointer += 1;
	}
	// If shifts were made, the diff needs reordering and another shift sweep.
	if changes {
		cleanup_merge(diffs);
	}
}

/// Reduces the number of edits by eliminating semantically trivial
/// equalities, then extracting overlaps between adjacent edits.
pub fn cleanup_semantic(diffs: &mut Vec<Diff>) {
	let mut changes = false;
	// Stack of indices where equalities are found.
	let mut equalities: Vec<usize> = Vec::new();
	let mut last_equality: Option<Vec<char>> = None;
	let mut pointer: isize = 0;
	// Number of units changed prior to / after the last equality.
	let mut length_insertions1 = 0;
	let mut length_deletions1 = 0;
	let mut length_insertions2 = 0;
	let mut length_deletions2 = 0;

	while pointer < diffs.len() as isize {
		let idx = pointer as usize;
		if diffs[idx].op == DiffOp::Equal {
			equalities.push(idx);
			length_insertions1 = length_insertions2;
			length_deletions1 = length_deletions2;
			length_insertions2 = 0;
			length_deletions2 = 0;
			last_equality = Some(diffs[idx].text.clone());
		} else {
			if diffs[idx].op == DiffOp::Insert {
				length_insertions2 += diffs[idx].text.len();
			} else {
				length_deletions2 += diffs[idx].text.len();
			}
			// Eliminate an equality smaller or equal to the edits on both
			// sides of it.
			if let Some(last) = last_equality.clone()
				&& !last.is_empty()
				&& last.len() <= length_insertions1.max(length_deletions1)
				&& last.len() <= length_insertions2.max(length_deletions2)
				&& let Some(&eq_idx) = equalities.last()
			{
				// Duplicate record as a deletion, retag the equality as an
				// insertion.
				diffs.insert(eq_idx, Diff::from_chars(DiffOp::Delete, last));
				diffs[eq_idx + 1].op = DiffOp::Insert;
				// Throw away the equality just deleted, and the previous one
				// (it needs to be re-evaluated).
				equalities.pop();
				equalities.pop();
				pointer = match equalities.last() {
					Some(&prior) => prior as isize,
					None => -1,
				};
				length_insertions1 = 0;
				length_deletions1 = 0;
				length_insertions2 = 0;
				length_deletions2 = 0;
				last_equality = None;
				changes = true;
			}
		}
		pointer += 1;
	}

	if changes {
		cleanup_merge(diffs);
	}
	cleanup_semantic_lossless(diffs);

	// Find any overlaps between deletions and insertions.
	// e.g: <del>abcxxx</del><ins>xxxdef</ins> -> <del>abc</del>xxx<ins>def</ins>
	// e.g: <del>xxxabc</del><ins>defxxx</ins> -> <ins>def</ins>xxx<del>abc</del>
	// Only extract an overlap as big as the edit ahead or behind it.
	let mut pointer = 1;
	while pointer < diffs.len() {
		if diffs[pointer - 1].op == DiffOp::Delete && diffs[pointer].op == DiffOp::Insert {
			let deletion = diffs[pointer - 1].text.clone();
			let insertion = diffs[pointer].text.clone();
			let overlap1 = common_overlap(&deletion, &insertion);
			let overlap2 = common_overlap(&insertion, &deletion);
			if overlap1 >= overlap2 {
				if overlap1 * 2 >= deletion.len() || overlap1 * 2 >= insertion.len() {
					// Insert an equality and trim the surrounding edits.
					diffs.insert(
						pointer,
						Diff::from_chars(DiffOp::Equal, insertion[..overlap1].to_vec()),
					);
					diffs[pointer - 1].text = deletion[..deletion.len() - overlap1].to_vec();
					diffs[pointer + 1].text = insertion[overlap1..].to_vec();
					pointer += 1;
				}
			} else if overlap2 * 2 >= deletion.len() || overlap2 * 2 >= insertion.len() {
				// Reverse overlap: insert an equality and swap and trim the
				// surrounding edits.
				diffs.insert(
					pointer,
					Diff::from_chars(DiffOp::Equal, deletion[..overlap2].to_vec()),
				);
				diffs[pointer - 1] = Diff::from_chars(
					DiffOp::Insert,
					insertion[..insertion.len() - overlap2].to_vec(),
				);
				diffs[pointer + 1] =
					Diff::from_chars(DiffOp::Delete, deletion[overlap2..].to_vec());
				pointer += 1;
			}
			pointer += 1;
		}
		pointer += 1;
	}
}

/// Slides each edit that sits between two equalities to line up with the
/// highest-scoring lexical boundary on both sides.
pub fn cleanup_semantic_lossless(diffs: &mut Vec<Diff>) {
	let mut pointer = 1;
	while !diffs.is_empty() && pointer + 1 < diffs.len() {
		if diffs[pointer - 1].op == DiffOp::Equal && diffs[pointer + 1].op == DiffOp::Equal {
			// An edit surrounded by equalities.
			let mut equality1 = diffs[pointer - 1].text.clone();
			let mut edit = diffs[pointer].text.clone();
			let mut equality2 = diffs[pointer + 1].text.clone();

			// First, shift the edit as far left as possible.
			let common_offset = common_suffix(&equality1, &edit);
			if common_offset > 0 {
				let common = edit[edit.len() - common_offset..].to_vec();
				equality1.truncate(equality1.len() - common_offset);
				let mut shifted = common.clone();
				shifted.extend_from_slice(&edit[..edit.len() - common_offset]);
				edit = shifted;
				let mut grown = common;
				grown.extend_from_slice(&equality2);
				equality2 = grown;
			}

			// Second, step unit by unit right, looking for the best score.
			let mut best_equality1 = equality1.clone();
			let mut best_edit = edit.clone();
			let mut best_equality2 = equality2.clone();
			let mut best_score =
				boundary_score(&equality1, &edit) + boundary_score(&edit, &equality2);
			while !edit.is_empty() && !equality2.is_empty() && edit[0] == equality2[0] {
				equality1.push(edit[0]);
				edit.remove(0);
				edit.push(equality2[0]);
				equality2.remove(0);
				let score = boundary_score(&equality1, &edit) + boundary_score(&edit, &equality2);
				// The >= encourages trailing rather than leading whitespace
				// on edits.
				if score >= best_score {
					best_score = score;
					best_equality1 = equality1.clone();
					best_edit = edit.clone();
					best_equality2 = equality2.clone();
				}
			}

			if diffs[pointer - 1].text != best_equality1 {
				// An improvement was found.
				if !best_equality1.is_empty() {
					diffs[pointer - 1].text = best_equality1;
				} else {
					diffs.remove(pointer - 1);
					pointer -= 1;
				}
				diffs[pointer].text = best_edit;
				if !best_equality2.is_empty() {
					diffs[pointer + 1].text = best_equality2;
				} else {
					diffs.remove(pointer + 1);
					pointer -= 1;
				}
			}
		}
		pointer += 1;
	}
}

/// Reduces the operational cost of a diff by merging short equalities whose
/// surrounding edits would otherwise each pay the fixed edit overhead.
pub fn cleanup_efficiency(diffs: &mut Vec<Diff>, edit_cost: usize) {
	let mut changes = false;
	let mut equalities: Vec<usize> = Vec::new();
	let mut last_equality: Option<Vec<char>> = None;
	let mut pointer: isize = 0;
	// Is there an insertion / deletion before the last equality.
	let mut pre_ins = false;
	let mut pre_del = false;
	// Is there an insertion / deletion after the last equality.
	let mut post_ins = false;
	let mut post_del = false;

	while pointer < diffs.len() as isize {
		let idx = pointer as usize;
		if diffs[idx].op == DiffOp::Equal {
			if diffs[idx].text.len() < edit_cost && (post_ins || post_del) {
				// Candidate found.
				equalities.push(idx);
				pre_ins = post_ins;
				pre_del = post_del;
				last_equality = Some(diffs[idx].text.clone());
			} else {
				// Not a candidate, and can never become one.
				equalities.clear();
				last_equality = None;
			}
			post_ins = false;
			post_del = false;
		} else {
			if diffs[idx].op == DiffOp::Delete {
				post_del = true;
			} else {
				post_ins = true;
			}
			// Five types to be split:
			// <ins>A</ins><del>B</del>XY<ins>C</ins><del>D</del>
			// <ins>A</ins>X<ins>C</ins><del>D</del>
			// <ins>A</ins><del>B</del>X<ins>C</ins>
			// <ins>A</del>X<ins>C</ins><del>D</del>
			// <ins>A</ins><del>B</del>X<del>C</del>
			let edit_count =
				pre_ins as usize + pre_del as usize + post_ins as usize + post_del as usize;
			if let Some(last) = last_equality.clone()
				&& !last.is_empty()
				&& ((pre_ins && pre_del && post_ins && post_del)
					|| (last.len() * 2 < edit_cost && edit_count == 3))
				&& let Some(&eq_idx) = equalities.last()
			{
				// Duplicate record as a deletion, retag the equality.
				diffs.insert(eq_idx, Diff::from_chars(DiffOp::Delete, last));
				diffs[eq_idx + 1].op = DiffOp::Insert;
				equalities.pop();
				last_equality = None;
				if pre_ins && pre_del {
					// No changes made which could affect previous entry,
					// keep going.
					post_ins = true;
					post_del = true;
					equalities.clear();
				} else {
					// Throw away the previous equality.
					equalities.pop();
					pointer = match equalities.last() {
						Some(&prior) => prior as isize,
						None => -1,
					};
					post_ins = false;
					post_del = false;
				}
				changes = true;
			}
		}
		pointer += 1;
	}

	if changes {
		cleanup_merge(diffs);
	}
}

/// Scores the lexical quality of the boundary between `one` and `two`.
/// 6 is best (edge of the text), 0 worst (splits a word).
fn boundary_score(one: &[char], two: &[char]) -> u32 {
	if one.is_empty() || two.is_empty() {
		// Edges are the best.
		return 6;
	}
	// ASCII alphanumerics, and `char::is_whitespace` for the space class; a
	// cosmetic choice either way, flagged in DESIGN.md.
	let char1 = one[one.len() - 1];
	let char2 = two[0];
	let non_alphanumeric1 = !char1.is_ascii_alphanumeric();
	let non_alphanumeric2 = !char2.is_ascii_alphanumeric();
	let whitespace1 = non_alphanumeric1 && char1.is_whitespace();
	let whitespace2 = non_alphanumeric2 && char2.is_whitespace();
	let line_break1 = whitespace1 && (char1 == '\n' || char1 == '\r');
	let line_break2 = whitespace2 && (char2 == '\n' || char2 == '\r');
	let blank_line1 = line_break1 && (one.ends_with(&['\n', '\n']) || one.ends_with(&['\n', '\r', '\n']));
	let blank_line2 = line_break2
		&& (two.starts_with(&['\n', '\n'])
			|| two.starts_with(&['\n', '\r', '\n'])
			|| two.starts_with(&['\r', '\n', '\n'])
			|| two.starts_with(&['\r', '\n', '\r', '\n']));

	if blank_line1 || blank_line2 {
		5
	} else if line_break1 || line_break2 {
		4
	} else if non_alphanumeric1 && !whitespace1 && whitespace2 {
		// End of sentences.
		3
	} else if whitespace1 || whitespace2 {
		2
	} else if non_alphanumeric1 || non_alphanumeric2 {
		1
	} else {
		0
	}
}

// region:    --- Tests

#[cfg(test)]
mod tests {
	use super::*;

	fn d(op: DiffOp, text: &str) -> Diff {
		Diff::new(op, text)
	}

	use DiffOp::{Delete, Equal, Insert};

	#[test]
	fn test_cleanup_merge_basics() {
		let mut diffs: Vec<Diff> = vec![];
		cleanup_merge(&mut diffs);
		assert!(diffs.is_empty());

		// No change case.
		let mut diffs = vec![d(Equal, "a"), d(Delete, "b"), d(Insert, "c")];
		cleanup_merge(&mut diffs);
		assert_eq!(diffs, vec![d(Equal, "a"), d(Delete, "b"), d(Insert, "c")]);

		// Merge equalities.
		let mut diffs = vec![d(Equal, "a"), d(Equal, "b"), d(Equal, "c")];
		cleanup_merge(&mut diffs);
		assert_eq!(diffs, vec![d(Equal, "abc")]);

		// Merge deletions.
		let mut diffs = vec![d(Delete, "a"), d(Delete, "b"), d(Delete, "c")];
		cleanup_merge(&mut diffs);
		assert_eq!(diffs, vec![d(Delete, "abc")]);

		// Merge interweave.
		let mut diffs = vec![
			d(Delete, "a"),
			d(Insert, "b"),
			d(Delete, "c"),
			d(Insert, "d"),
			d(Equal, "e"),
			d(Equal, "f"),
		];
		cleanup_merge(&mut diffs);
		assert_eq!(diffs, vec![d(Delete, "ac"), d(Insert, "bd"), d(Equal, "ef")]);
	}

	#[test]
	fn test_cleanup_merge_affix_factoring() {
		// Prefix and suffix detection.
		let mut diffs = vec![d(Delete, "a"), d(Insert, "abc"), d(Delete, "dc")];
		cleanup_merge(&mut diffs);
		assert_eq!(
			diffs,
			vec![d(Equal, "a"), d(Delete, "d"), d(Insert, "b"), d(Equal, "c")],
		);

		// Prefix and suffix detection with equalities.
		let mut diffs = vec![
			d(Equal, "x"),
			d(Delete, "a"),
			d(Insert, "abc"),
			d(Delete, "dc"),
			d(Equal, "y"),
		];
		cleanup_merge(&mut diffs);
		assert_eq!(
			diffs,
			vec![d(Equal, "xa"), d(Delete, "d"), d(Insert, "b"), d(Equal, "cy")],
		);
	}

	#[test]
	fn test_cleanup_merge_edit_slides() {
		// Slide edit left.
		let mut diffs = vec![d(Equal, "a"), d(Insert, "ba"), d(Equal, "c")];
		cleanup_merge(&mut diffs);
		assert_eq!(diffs, vec![d(Insert, "ab"), d(Equal, "ac")]);

		// Slide edit right.
		let mut diffs = vec![d(Equal, "c"), d(Insert, "ab"), d(Equal, "a")];
		cleanup_merge(&mut diffs);
		assert_eq!(diffs, vec![d(Equal, "ca"), d(Insert, "ba")]);

		// Slide edit left recursive.
		let mut diffs = vec![
			d(Equal, "a"),
			d(Delete, "b"),
			d(Equal, "c"),
			d(Delete, "ac"),
			d(Equal, "x"),
		];
		cleanup_merge(&mut diffs);
		assert_eq!(diffs, vec![d(Delete, "abc"), d(Equal, "acx")]);

		// Slide edit right recursive.
		let mut diffs = vec![
			d(Equal, "x"),
			d(Delete, "ca"),
			d(Equal, "c"),
			d(Delete, "b"),
			d(Equal, "a"),
		];
		cleanup_merge(&mut diffs);
		assert_eq!(diffs, vec![d(Equal, "xca"), d(Delete, "cba")]);
	}

	#[test]
	fn test_cleanup_merge_is_idempotent() {
		let mut diffs = vec![d(Delete, "b"), d(Insert, "ab"), d(Equal, "c")];
		cleanup_merge(&mut diffs);
		let once = diffs.clone();
		cleanup_merge(&mut diffs);
		assert_eq!(diffs, once);
	}

	#[test]
	fn test_cleanup_semantic_no_elimination() {
		let mut diffs = vec![d(Delete, "ab"), d(Insert, "cd"), d(Equal, "12"), d(Delete, "e")];
		cleanup_semantic(&mut diffs);
		assert_eq!(
			diffs,
			vec![d(Delete, "ab"), d(Insert, "cd"), d(Equal, "12"), d(Delete, "e")],
		);

		let mut diffs = vec![
			d(Delete, "abc"),
			d(Insert, "ABC"),
			d(Equal, "1234"),
			d(Delete, "wxyz"),
		];
		cleanup_semantic(&mut diffs);
		assert_eq!(
			diffs,
			vec![d(Delete, "abc"), d(Insert, "ABC"), d(Equal, "1234"), d(Delete, "wxyz")],
		);
	}

	#[test]
	fn test_cleanup_semantic_eliminations() {
		// Simple elimination.
		let mut diffs = vec![d(Delete, "a"), d(Equal, "b"), d(Delete, "c")];
		cleanup_semantic(&mut diffs);
		assert_eq!(diffs, vec![d(Delete, "abc"), d(Insert, "b")]);

		// Backpass elimination.
		let mut diffs = vec![
			d(Delete, "ab"),
			d(Equal, "cd"),
			d(Delete, "e"),
			d(Equal, "f"),
			d(Insert, "g"),
		];
		cleanup_semantic(&mut diffs);
		assert_eq!(diffs, vec![d(Delete, "abcdef"), d(Insert, "cdfg")]);

		// Multiple eliminations.
		let mut diffs = vec![
			d(Insert, "1"),
			d(Equal, "A"),
			d(Delete, "B"),
			d(Insert, "2"),
			d(Equal, "_"),
			d(Insert, "1"),
			d(Equal, "A"),
			d(Delete, "B"),
			d(Insert, "2"),
		];
		cleanup_semantic(&mut diffs);
		assert_eq!(diffs, vec![d(Delete, "AB_AB"), d(Insert, "1A2_1A2")]);
	}

	#[test]
	fn test_cleanup_semantic_overlaps() {
		// No overlap elimination.
		let mut diffs = vec![d(Delete, "abcxx"), d(Insert, "xxdef")];
		cleanup_semantic(&mut diffs);
		assert_eq!(diffs, vec![d(Delete, "abcxx"), d(Insert, "xxdef")]);

		// Overlap elimination.
		let mut diffs = vec![d(Delete, "abcxxx"), d(Insert, "xxxdef")];
		cleanup_semantic(&mut diffs);
		assert_eq!(diffs, vec![d(Delete, "abc"), d(Equal, "xxx"), d(Insert, "def")]);

		// Reverse overlap elimination.
		let mut diffs = vec![d(Delete, "xxxabc"), d(Insert, "defxxx")];
		cleanup_semantic(&mut diffs);
		assert_eq!(diffs, vec![d(Insert, "def"), d(Equal, "xxx"), d(Delete, "abc")]);

		// Two overlap eliminations.
		let mut diffs = vec![
			d(Delete, "abcd1212"),
			d(Insert, "1212efghi"),
			d(Equal, "----"),
			d(Delete, "A3"),
			d(Insert, "3BC"),
		];
		cleanup_semantic(&mut diffs);
		assert_eq!(
			diffs,
			vec![
				d(Delete, "abcd"),
				d(Equal, "1212"),
				d(Insert, "efghi"),
				d(Equal, "----"),
				d(Delete, "A"),
				d(Equal, "3"),
				d(Insert, "BC"),
			],
		);
	}

	#[test]
	fn test_cleanup_semantic_lossless_blank_lines() {
		let mut diffs = vec![
			d(Equal, "AAA\r\n\r\nBBB"),
			d(Insert, "\r\nDDD\r\n\r\nBBB"),
			d(Equal, "\r\nEEE"),
		];
		cleanup_semantic_lossless(&mut diffs);
		assert_eq!(
			diffs,
			vec![
				d(Equal, "AAA\r\n\r\n"),
				d(Insert, "BBB\r\nDDD\r\n\r\n"),
				d(Equal, "BBB\r\nEEE"),
			],
		);
	}

	#[test]
	fn test_cleanup_semantic_lossless_line_boundaries() {
		let mut diffs = vec![
			d(Equal, "AAA\r\nBBB"),
			d(Insert, " DDD\r\nBBB"),
			d(Equal, " EEE"),
		];
		cleanup_semantic_lossless(&mut diffs);
		assert_eq!(
			diffs,
			vec![d(Equal, "AAA\r\n"), d(Insert, "BBB DDD\r\n"), d(Equal, "BBB EEE")],
		);
	}

	#[test]
	fn test_cleanup_semantic_lossless_word_boundaries() {
		let mut diffs = vec![d(Equal, "The c"), d(Insert, "ow and the c"), d(Equal, "at.")];
		cleanup_semantic_lossless(&mut diffs);
		assert_eq!(
			diffs,
			vec![d(Equal, "The "), d(Insert, "cow and the "), d(Equal, "cat.")],
		);

		let mut diffs = vec![d(Equal, "The-c"), d(Insert, "ow-and-the-c"), d(Equal, "at.")];
		cleanup_semantic_lossless(&mut diffs);
		assert_eq!(
			diffs,
			vec![d(Equal, "The-"), d(Insert, "cow-and-the-"), d(Equal, "cat.")],
		);
	}

	#[test]
	fn test_cleanup_semantic_lossless_hitting_ends() {
		let mut diffs = vec![d(Equal, "a"), d(Delete, "a"), d(Equal, "ax")];
		cleanup_semantic_lossless(&mut diffs);
		assert_eq!(diffs, vec![d(Delete, "a"), d(Equal, "aax")]);

		let mut diffs = vec![d(Equal, "xa"), d(Delete, "a"), d(Equal, "a")];
		cleanup_semantic_lossless(&mut diffs);
		assert_eq!(diffs, vec![d(Equal, "xaa"), d(Delete, "a")]);
	}

	#[test]
	fn test_cleanup_semantic_lossless_sentence_boundaries() {
		let mut diffs = vec![
			d(Equal, "The xxx. The "),
			d(Insert, "zzz. The "),
			d(Equal, "yyy."),
		];
		cleanup_semantic_lossless(&mut diffs);
		assert_eq!(
			diffs,
			vec![d(Equal, "The xxx."), d(Insert, " The zzz."), d(Equal, " The yyy.")],
		);
	}

	#[test]
	fn test_cleanup_efficiency() {
		// Null case.
		let mut diffs: Vec<Diff> = vec![];
		cleanup_efficiency(&mut diffs, 4);
		assert!(diffs.is_empty());

		// No elimination.
		let mut diffs = vec![
			d(Delete, "ab"),
			d(Insert, "12"),
			d(Equal, "wxyz"),
			d(Delete, "cd"),
			d(Insert, "34"),
		];
		cleanup_efficiency(&mut diffs, 4);
		assert_eq!(
			diffs,
			vec![
				d(Delete, "ab"),
				d(Insert, "12"),
				d(Equal, "wxyz"),
				d(Delete, "cd"),
				d(Insert, "34"),
			],
		);

		// Four-edit elimination.
		let mut diffs = vec![
			d(Delete, "ab"),
			d(Insert, "12"),
			d(Equal, "xyz"),
			d(Delete, "cd"),
			d(Insert, "34"),
		];
		cleanup_efficiency(&mut diffs, 4);
		assert_eq!(diffs, vec![d(Delete, "abxyzcd"), d(Insert, "12xyz34")]);

		// Three-edit elimination.
		let mut diffs = vec![d(Insert, "12"), d(Equal, "x"), d(Delete, "cd"), d(Insert, "34")];
		cleanup_efficiency(&mut diffs, 4);
		assert_eq!(diffs, vec![d(Delete, "xcd"), d(Insert, "12x34")]);

		// Backpass elimination.
		let mut diffs = vec![
			d(Delete, "ab"),
			d(Insert, "12"),
			d(Equal, "xy"),
			d(Insert, "34"),
			d(Equal, "z"),
			d(Delete, "cd"),
			d(Insert, "56"),
		];
		cleanup_efficiency(&mut diffs, 4);
		assert_eq!(diffs, vec![d(Delete, "abxyzcd"), d(Insert, "12xy34z56")]);

		// High cost elimination.
		let mut diffs = vec![
			d(Delete, "ab"),
			d(Insert, "12"),
			d(Equal, "wxyz"),
			d(Delete, "cd"),
			d(Insert, "34"),
		];
		cleanup_efficiency(&mut diffs, 5);
		assert_eq!(diffs, vec![d(Delete, "abwxyzcd"), d(Insert, "12wxyz34")]);
	}
}

// endregion: --- Tests
