use std::cmp;

/// Levenshtein edit distance over chars.
pub(crate) fn distance(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() || b.is_empty() {
        return cmp::max(a.len(), b.len());
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];
    for (i, ac) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, bc) in b.iter().enumerate() {
            let sub_cost = if ac == bc { 0 } else { 1 };
            curr[j + 1] = cmp::min(
                cmp::min(prev[j + 1] + 1, curr[j] + 1),
                prev[j] + sub_cost,
            );
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Scores how well `needle` matches a label, in `0.0..=1.0`.
/// Each needle token is matched against its best label token so word order
/// in the label does not matter ("3dx jcb" still finds "JCB 3DX Super").
pub(crate) fn score(needle: &str, hay: &str) -> f64 {
    let hay_tokens: Vec<_> = hay.split_whitespace().collect();
    let mut tokens = 0usize;
    let mut total: f64 = 0.0;
    for token in needle.split_whitespace() {
        tokens += 1;
        total += hay_tokens
            .iter()
            .map(|hay_token| token_score(token, hay_token))
            .fold(0.0, f64::max);
    }

    if tokens == 0 { 0.0 } else { total / tokens as f64 }
}

fn token_score(needle: &str, hay: &str) -> f64 {
    if hay.starts_with(needle) {
        return 1.0;
    }
    let dist = distance(needle, hay);
    let len = cmp::max(needle.chars().count(), hay.chars().count());
    1.0 - dist as f64 / len as f64
}

#[test]
fn fuzzy_empty_vs_nonempty() {
    assert_eq!(distance("", "abc"), 3);
    assert_eq!(distance("abc", ""), 3);
}

#[test]
fn fuzzy_substitution() {
    assert_eq!(distance("cat", "cut"), 1);
}

#[test]
fn fuzzy_insertion_and_deletion() {
    assert_eq!(distance("cat", "cart"), 1);
    assert_eq!(distance("cart", "cat"), 1);
}

#[test]
fn fuzzy_unicode_distinct() {
    assert_eq!(distance("café", "cafe"), 1);
}

#[test]
fn fuzzy_longer_sequence() {
    assert_eq!(distance("intention", "execution"), 5);
}

#[test]
fn score_ignores_token_order() {
    assert_eq!(score("3dx jcb", "jcb 3dx super - available"), 1.0);
}

#[test]
fn score_prefix_is_full_match() {
    assert_eq!(score("excav", "excavation project"), 1.0);
}

#[test]
fn score_empty_needle() {
    assert_eq!(score("", "anything"), 0.0);
}
