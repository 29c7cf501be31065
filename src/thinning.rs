//! Token accounting and tree thinning over flat section lists.
//!
//! Both passes work on the flat, level-tagged section list before it is
//! nested. The descendants of section `i` are the contiguous run of
//! following sections with a strictly greater level.

use crate::markdown::FlatSection;
use std::collections::BTreeSet;
use std::ops::Range;

/// Estimate the token count of `text` as one token per four characters, rounded up.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// Index range of the descendants of `sections[index]`.
pub fn child_range(sections: &[FlatSection], index: usize) -> Range<usize> {
    let level = sections[index].level;
    let end = sections[index + 1..]
        .iter()
        .position(|s| s.level <= level)
        .map(|offset| index + 1 + offset)
        .unwrap_or(sections.len());
    index + 1..end
}

/// Record on each section the estimated tokens of its own text plus all descendants.
pub fn annotate_token_counts(sections: &mut [FlatSection]) {
    for i in (0..sections.len()).rev() {
        let mut total_text = sections[i].text.clone();
        for child in &sections[child_range(sections, i)] {
            if !child.text.is_empty() {
                total_text.push('\n');
                total_text.push_str(&child.text);
            }
        }
        sections[i].token_count = Some(estimate_tokens(&total_text));
    }
}

/// Collapse every subtree whose total token count is below `threshold` into its root.
///
/// Sections must already carry token counts from [`annotate_token_counts`];
/// missing counts are treated as zero. Absorbed text is appended to the
/// absorbing section in document order, so no content is lost.
pub fn thin_sections(mut sections: Vec<FlatSection>, threshold: usize) -> Vec<FlatSection> {
    let mut absorbed: BTreeSet<usize> = BTreeSet::new();

    for i in (0..sections.len()).rev() {
        if absorbed.contains(&i) {
            continue;
        }

        let total = sections[i].token_count.unwrap_or(0);
        if total >= threshold {
            continue;
        }

        let mut child_texts = Vec::new();
        for child in child_range(&sections, i) {
            if absorbed.insert(child) && !sections[child].text.trim().is_empty() {
                child_texts.push(std::mem::take(&mut sections[child].text));
            }
        }

        if child_texts.is_empty() {
            continue;
        }

        tracing::debug!(
            title = %sections[i].title,
            absorbed = child_texts.len(),
            total_tokens = total,
            "thinning subtree into parent"
        );

        let section = &mut sections[i];
        for child_text in child_texts {
            if !section.text.is_empty() && !section.text.ends_with('\n') {
                section.text.push_str("\n\n");
            }
            section.text.push_str(&child_text);
        }
        section.token_count = Some(estimate_tokens(&section.text));
    }

    sections
        .into_iter()
        .enumerate()
        .filter(|(i, _)| !absorbed.contains(i))
        .map(|(_, s)| s)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::extract_sections;

    fn section(title: &str, level: usize, text: &str) -> FlatSection {
        FlatSection {
            title: title.to_string(),
            level,
            line_num: 0,
            text: text.to_string(),
            token_count: None,
        }
    }

    fn accounted(mut sections: Vec<FlatSection>) -> Vec<FlatSection> {
        annotate_token_counts(&mut sections);
        sections
    }

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
        assert_eq!(estimate_tokens("ééé"), 1);
    }

    #[test]
    fn test_child_range_stops_at_same_or_higher_level() {
        let sections = vec![
            section("A", 1, "a"),
            section("B", 2, "b"),
            section("C", 3, "c"),
            section("D", 2, "d"),
            section("E", 1, "e"),
        ];
        assert_eq!(child_range(&sections, 0), 1..4);
        assert_eq!(child_range(&sections, 1), 2..3);
        assert_eq!(child_range(&sections, 3), 4..4);
        assert_eq!(child_range(&sections, 4), 5..5);
    }

    #[test]
    fn test_annotate_includes_descendants() {
        let sections = accounted(vec![
            section("A", 1, "aaaa"),
            section("B", 2, "bbbb"),
            section("C", 1, "cccc"),
        ]);
        // "aaaa\nbbbb" is 9 chars
        assert_eq!(sections[0].token_count, Some(3));
        assert_eq!(sections[1].token_count, Some(1));
        assert_eq!(sections[2].token_count, Some(1));
    }

    #[test]
    fn test_small_siblings_collapse_into_root() {
        let sections = accounted(extract_sections("# A\ntext1\n## B\ntext2\n## C\ntext3"));
        let thinned = thin_sections(sections, 100);

        assert_eq!(thinned.len(), 1);
        assert_eq!(thinned[0].title, "A");
        assert_eq!(thinned[0].text, "# A\ntext1\n\n## B\ntext2\n\n## C\ntext3");
        assert_eq!(thinned[0].token_count, Some(estimate_tokens(&thinned[0].text)));
    }

    #[test]
    fn test_large_subtrees_survive() {
        let big = "x".repeat(400);
        let sections = accounted(vec![
            section("A", 1, "a"),
            section("B", 2, &big),
            section("C", 2, "c"),
        ]);
        let thinned = thin_sections(sections, 50);
        let titles: Vec<_> = thinned.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_deeper_absorption_then_parent_skips_absorbed() {
        let big = "y".repeat(400);
        let sections = accounted(vec![
            section("Root", 1, &big),
            section("Mid", 2, "mid"),
            section("Leaf", 3, "leaf"),
            section("Other", 2, "other"),
        ]);
        let thinned = thin_sections(sections, 50);
        let titles: Vec<_> = thinned.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Root", "Mid", "Other"]);
        assert_eq!(thinned[1].text, "mid\n\nleaf");
    }

    #[test]
    fn test_thinning_never_drops_text() {
        let content = "# A\na\n## B\nb\n### C\nc\n## D\nd\n# E\ne\n#### F\nf";
        let original = extract_sections(content);
        let before = original
            .iter()
            .map(|s| s.text.clone())
            .collect::<Vec<_>>()
            .join("\n");

        let thinned = thin_sections(accounted(original), 5);
        assert_eq!(thinned.len(), 4);

        let after = thinned
            .iter()
            .map(|s| s.text.replace("\n\n", "\n"))
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(after, before);
    }

    #[test]
    fn test_whitespace_children_are_absorbed_without_text() {
        let sections = accounted(vec![section("A", 1, "a"), section("B", 2, "   ")]);
        let thinned = thin_sections(sections, 10);
        assert_eq!(thinned.len(), 1);
        assert_eq!(thinned[0].text, "a");
    }

    #[test]
    fn test_level_jump_inside_absorbed_region() {
        // H1 -> H4 -> H2: the H2 is not a descendant of the H4, but both
        // belong to the H1.
        let sections = accounted(vec![
            section("A", 1, "a"),
            section("B", 4, "b"),
            section("C", 2, "c"),
        ]);
        let thinned = thin_sections(sections, 10);
        assert_eq!(thinned.len(), 1);
        assert_eq!(thinned[0].text, "a\n\nb\n\nc");
    }

    #[test]
    fn test_no_surviving_parent_below_threshold_with_children() {
        let big = "z".repeat(200);
        let content = format!("# A\n{big}\n## B\nb\n## C\n{big}\n### D\nd\n# E\ne");
        let threshold = 30;
        let thinned = thin_sections(accounted(extract_sections(&content)), threshold);

        for i in 0..thinned.len() {
            let children = child_range(&thinned, i);
            if !children.is_empty() {
                let mut total = thinned[i].text.clone();
                for child in &thinned[children] {
                    total.push('\n');
                    total.push_str(&child.text);
                }
                assert!(estimate_tokens(&total) >= threshold);
            }
        }
    }

    #[test]
    fn test_empty_list() {
        assert!(thin_sections(Vec::new(), 10).is_empty());
    }
}
