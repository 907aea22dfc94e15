//! Integration tests for the diff engine and its derived outputs.

use assertables::assert_contains;
use fuzzpatch::{
	Diff, DiffOp, cleanup_semantic, diff, diff_from_delta, diff_levenshtein, diff_pretty_html,
	diff_text1, diff_text2, diff_to_delta, diff_with_cancel, diff_x_index,
};

type Result<T> = core::result::Result<T, Box<dyn std::error::Error>>; // For tests.

fn d(op: DiffOp, text: &str) -> Diff {
	Diff::new(op, text)
}

use DiffOp::{Delete, Equal, Insert};

#[test]
fn test_diff_trivial_cases() {
	// -- Exec & Check
	assert!(diff("", "", true).is_empty());
	assert_eq!(diff("abc", "abc", true), vec![d(Equal, "abc")]);
	assert_eq!(diff("", "abc", true), vec![d(Insert, "abc")]);
	assert_eq!(diff("abc", "", true), vec![d(Delete, "abc")]);
	assert_eq!(diff("abc", "ab", true), vec![d(Equal, "ab"), d(Delete, "c")]);
}

#[test]
fn test_diff_simple_edits() {
	// -- Exec & Check
	assert_eq!(
		diff("abc", "ab123c", true),
		vec![d(Equal, "ab"), d(Insert, "123"), d(Equal, "c")],
	);
	assert_eq!(
		diff("a123bc", "abc", true),
		vec![d(Equal, "a"), d(Delete, "123"), d(Equal, "bc")],
	);
	assert_eq!(
		diff("abc", "a123b456c", true),
		vec![
			d(Equal, "a"),
			d(Insert, "123"),
			d(Equal, "b"),
			d(Insert, "456"),
			d(Equal, "c"),
		],
	);
	assert_eq!(
		diff("a123b456c", "abc", true),
		vec![
			d(Equal, "a"),
			d(Delete, "123"),
			d(Equal, "b"),
			d(Delete, "456"),
			d(Equal, "c"),
		],
	);
}

#[test]
fn test_diff_real_diffs() {
	// -- Exec & Check
	assert_eq!(diff("a", "b", false), vec![d(Delete, "a"), d(Insert, "b")]);

	assert_eq!(
		diff("Apples are a fruit.", "Bananas are also fruit.", false),
		vec![
			d(Delete, "Apple"),
			d(Insert, "Banana"),
			d(Equal, "s are a"),
			d(Insert, "lso"),
			d(Equal, " fruit."),
		],
	);

	assert_eq!(
		diff("1ayb2", "abxab", false),
		vec![
			d(Delete, "1"),
			d(Equal, "a"),
			d(Delete, "y"),
			d(Equal, "b"),
			d(Delete, "2"),
			d(Insert, "xab"),
		],
	);

	assert_eq!(
		diff("abcy", "xaxcxabc", false),
		vec![d(Insert, "xaxcx"), d(Equal, "abc"), d(Delete, "y")],
	);
}

#[test]
fn test_diff_half_match_split() {
	// -- Setup & Fixtures
	let text1 = "abc12345678901234567890def";
	let text2 = "xyz12345678901234567890uvw";

	// -- Exec
	let diffs = diff(text1, text2, true);

	// -- Check
	assert_eq!(
		diffs,
		vec![
			d(Delete, "abc"),
			d(Insert, "xyz"),
			d(Equal, "12345678901234567890"),
			d(Delete, "def"),
			d(Insert, "uvw"),
		],
	);
}

#[test]
fn test_diff_sentence_cluster() {
	// -- Exec
	let mut diffs = diff(
		"The quick brown fox jumps over the lazy dog.",
		"The quick brown fox jumped over a lazy dog.",
		true,
	);
	cleanup_semantic(&mut diffs);

	// -- Check
	assert_eq!(
		diffs,
		vec![
			d(Equal, "The quick brown fox jump"),
			d(Delete, "s"),
			d(Insert, "ed"),
			d(Equal, " over "),
			d(Delete, "the"),
			d(Insert, "a"),
			d(Equal, " lazy dog."),
		],
	);
}

#[test]
fn test_diff_reconstruction_invariant() {
	// -- Setup & Fixtures
	let cases = [
		("jumps over the lazy dog", "jumped over a lazy dog"),
		("", "non-empty"),
		("same text", "same text"),
		("mixed \u{0680} unicode \t input", "mixed unicode\u{0} output"),
		("abc12345678901234567890def", "xyz12345678901234567890uvw"),
	];

	// -- Exec & Check
	for (text1, text2) in cases {
		for check_lines in [false, true] {
			let diffs = diff(text1, text2, check_lines);
			assert_eq!(diff_text1(&diffs), text1, "side A of {text1:?} vs {text2:?}");
			assert_eq!(diff_text2(&diffs), text2, "side B of {text1:?} vs {text2:?}");
		}
	}
}

#[test]
fn test_diff_line_mode() {
	// -- Setup & Fixtures
	let text1 = "1234567890\n".repeat(13);
	let text2 = "abcdefghij\n".repeat(13);

	// -- Exec
	let line_diffs = diff(&text1, &text2, true);
	let char_diffs = diff(&text1, &text2, false);

	// -- Check
	assert_eq!(line_diffs, char_diffs);
	assert_eq!(diff_text1(&line_diffs), text1);
	assert_eq!(diff_text2(&line_diffs), text2);
}

#[test]
fn test_diff_line_mode_mixed_edits() {
	// -- Setup & Fixtures
	let mut text1 = String::new();
	let mut text2 = String::new();
	for i in 0..20 {
		text1.push_str(&format!("line number {i} left\n"));
		if i % 4 == 0 {
			text2.push_str(&format!("line number {i} right\n"));
		} else {
			text2.push_str(&format!("line number {i} left\n"));
		}
	}

	// -- Exec
	let diffs = diff(&text1, &text2, true);

	// -- Check
	assert_eq!(diff_text1(&diffs), text1);
	assert_eq!(diff_text2(&diffs), text2);
}

#[test]
fn test_diff_cancel_falls_back_to_coarse_edit() {
	// -- Setup & Fixtures
	let mut keep_going = || false;

	// -- Exec
	let diffs = diff_with_cancel("1ayb2", "abxab", false, &mut keep_going);

	// -- Check
	assert_eq!(diffs, vec![d(Delete, "1ayb2"), d(Insert, "abxab")]);
	assert_eq!(diff_text1(&diffs), "1ayb2");
	assert_eq!(diff_text2(&diffs), "abxab");
}

#[test]
fn test_diff_x_index() {
	// -- Exec & Check
	// Translation on equality.
	let diffs = vec![d(Delete, "a"), d(Insert, "1234"), d(Equal, "xyz")];
	assert_eq!(diff_x_index(&diffs, 2), 5);

	// Translation on deletion.
	let diffs = vec![d(Equal, "a"), d(Delete, "1234"), d(Equal, "xyz")];
	assert_eq!(diff_x_index(&diffs, 3), 1);
}

#[test]
fn test_diff_levenshtein() {
	// -- Exec & Check
	let diffs = vec![d(Delete, "abc"), d(Insert, "1234"), d(Equal, "xyz")];
	assert_eq!(diff_levenshtein(&diffs), 4, "trailing equality");

	let diffs = vec![d(Equal, "xyz"), d(Delete, "abc"), d(Insert, "1234")];
	assert_eq!(diff_levenshtein(&diffs), 4, "leading equality");

	let diffs = vec![d(Delete, "abc"), d(Equal, "xyz"), d(Insert, "1234")];
	assert_eq!(diff_levenshtein(&diffs), 7, "middle equality");
}

#[test]
fn test_diff_pretty_html() {
	// -- Setup & Fixtures
	let diffs = vec![d(Equal, "a\n"), d(Delete, "<B>b</B>"), d(Insert, "c&d")];

	// -- Exec
	let html = diff_pretty_html(&diffs);

	// -- Check
	assert_contains!(html, "<span>a&para;<br></span>");
	assert_contains!(html, "<del style=\"background:#ffe6e6;\">&lt;B&gt;b&lt;/B&gt;</del>");
	assert_contains!(html, "<ins style=\"background:#e6ffe6;\">c&amp;d</ins>");
}

#[test]
fn test_diff_delta_roundtrip() -> Result<()> {
	// -- Setup & Fixtures
	let text1 = "jumps over the lazy";
	let diffs = vec![
		d(Equal, "jump"),
		d(Delete, "s"),
		d(Insert, "ed"),
		d(Equal, " over "),
		d(Delete, "the"),
		d(Insert, "a"),
		d(Equal, " lazy"),
	];

	// -- Exec
	let delta = diff_to_delta(&diffs);

	// -- Check
	assert_eq!(delta, "=4\t-1\t+ed\t=6\t-3\t+a\t=5");
	assert_eq!(diff_from_delta(text1, &delta)?, diffs);

	Ok(())
}

#[test]
fn test_diff_delta_unicode_and_specials() -> Result<()> {
	// -- Setup & Fixtures
	let diffs = vec![
		d(Equal, "\u{0680} \x00 \t %"),
		d(Delete, "\u{0681} \x01 \n ^"),
		d(Insert, "\u{0682} \x02 \\ |"),
	];
	let text1 = diff_text1(&diffs);

	// -- Exec
	let delta = diff_to_delta(&diffs);

	// -- Check
	assert_eq!(diff_from_delta(&text1, &delta)?, diffs);

	Ok(())
}

#[test]
fn test_diff_delta_rejects_malformed_input() {
	// -- Setup & Fixtures
	let diffs = vec![d(Equal, "jump"), d(Delete, "s"), d(Insert, "ed")];
	let text1 = diff_text1(&diffs);
	let delta = diff_to_delta(&diffs);

	// -- Exec & Check
	// Delta longer than the source.
	assert!(diff_from_delta(&text1[1..], &delta).is_err());
	// Delta shorter than the source.
	let mut padded = text1.clone();
	padded.push('x');
	assert!(diff_from_delta(&padded, &delta).is_err());
	// Unknown operation.
	assert!(diff_from_delta("", "x5").is_err());
	// Non-numeric count.
	assert!(diff_from_delta("abc", "=x").is_err());
	// Broken escape in an insertion.
	assert!(diff_from_delta("", "+%z1").is_err());
}
