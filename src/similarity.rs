//! Text normalization and Ratcliff/Obershelp similarity scoring.
//!
//! Transcripts of Japanese speech differ from the source script in ways that don't matter
//! for "did the model say the right thing": punctuation, spacing, and katakana vs. hiragana
//! spellings. We normalize those away, then score with the gestalt pattern matching ratio.
//!
//! The matcher reproduces the reference longest-block search exactly, including its
//! tie-breaking (earliest block in `a`, then earliest in `b`) and its popularity heuristic
//! for long inputs, so scores match previously recorded reports.

use std::collections::HashMap;

/// Characters removed before comparison, in addition to all Unicode whitespace.
pub const STRIPPED_PUNCTUATION: &[char] = &['、', '。', '！', '？', '!', '?', ',', '.'];

const KATAKANA_FIRST: u32 = 0x30A1; // ァ
const KATAKANA_LAST: u32 = 0x30F6; // ヶ
const KATAKANA_TO_HIRAGANA: u32 = 0x60;

/// Minimum length of `b` at which popular characters stop seeding matches.
const AUTOJUNK_MIN_LEN: usize = 200;

/// Canonicalize text for comparison.
pub fn normalize_text(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace() && !STRIPPED_PUNCTUATION.contains(c))
        .map(katakana_to_hiragana)
        .flat_map(char::to_lowercase)
        .collect()
}

fn katakana_to_hiragana(c: char) -> char {
    let code = c as u32;
    if (KATAKANA_FIRST..=KATAKANA_LAST).contains(&code) {
        char::from_u32(code - KATAKANA_TO_HIRAGANA).unwrap_or(c)
    } else {
        c
    }
}

/// Similarity of two texts in `[0, 1]` after normalization.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = normalize_text(a).chars().collect();
    let b: Vec<char> = normalize_text(b).chars().collect();
    SequenceMatcher::new(&a, &b).ratio()
}

/// A maximal run of equal elements: `a[a_start..a_start + len] == b[b_start..b_start + len]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchingBlock {
    pub a_start: usize,
    pub b_start: usize,
    pub len: usize,
}

/// Gestalt pattern matcher over two sequences.
pub struct SequenceMatcher<'a, T> {
    a: &'a [T],
    b: &'a [T],
    // Positions in `b` of every element allowed to seed a match.
    b2j: HashMap<&'a T, Vec<usize>>,
}

impl<'a, T> SequenceMatcher<'a, T>
where
    T: Eq + std::hash::Hash,
{
    pub fn new(a: &'a [T], b: &'a [T]) -> Self {
        let mut b2j: HashMap<&T, Vec<usize>> = HashMap::new();
        for (j, elt) in b.iter().enumerate() {
            b2j.entry(elt).or_default().push(j);
        }

        // Elements making up more than 1% of a long `b` are too common to seed a match.
        let n = b.len();
        if n >= AUTOJUNK_MIN_LEN {
            let ntest = n / 100 + 1;
            b2j.retain(|_, positions| positions.len() <= ntest);
        }

        Self { a, b, b2j }
    }

    /// Longest matching block within `a[alo..ahi]` and `b[blo..bhi]`.
    pub fn find_longest_match(
        &self,
        alo: usize,
        ahi: usize,
        blo: usize,
        bhi: usize,
    ) -> MatchingBlock {
        let (a, b) = (self.a, self.b);
        let mut best_i = alo;
        let mut best_j = blo;
        let mut best_len = 0;

        // j2len[j] = length of the longest match ending at a[i - 1] and b[j].
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for (i, elt) in a.iter().enumerate().take(ahi).skip(alo) {
            let mut new_j2len = HashMap::new();
            if let Some(positions) = self.b2j.get(elt) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .map_or(1, |len| len + 1);
                    new_j2len.insert(j, k);
                    if k > best_len {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_len = k;
                    }
                }
            }
            j2len = new_j2len;
        }

        // Popular elements can't seed a match but may still extend one.
        while best_i > alo && best_j > blo && a[best_i - 1] == b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_len += 1;
        }
        while best_i + best_len < ahi
            && best_j + best_len < bhi
            && a[best_i + best_len] == b[best_j + best_len]
        {
            best_len += 1;
        }

        MatchingBlock {
            a_start: best_i,
            b_start: best_j,
            len: best_len,
        }
    }

    /// All matching blocks, sorted by position, found by recursing on the unmatched remainders.
    pub fn matching_blocks(&self) -> Vec<MatchingBlock> {
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];
        let mut blocks = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let block = self.find_longest_match(alo, ahi, blo, bhi);
            if block.len == 0 {
                continue;
            }
            let (i, j, k) = (block.a_start, block.b_start, block.len);
            blocks.push(block);
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                queue.push((i + k, ahi, j + k, bhi));
            }
        }

        blocks.sort_by_key(|block| (block.a_start, block.b_start));
        blocks
    }

    /// `2 * M / T`, where `M` is the matched length and `T` the combined length.
    ///
    /// Two empty sequences are identical (1.0).
    pub fn ratio(&self) -> f64 {
        let total = self.a.len() + self.b.len();
        if total == 0 {
            return 1.0;
        }
        let matched: usize = self.matching_blocks().iter().map(|block| block.len).sum();
        2.0 * matched as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn raw_ratio(a: &str, b: &str) -> f64 {
        let (a, b) = (chars(a), chars(b));
        SequenceMatcher::new(&a, &b).ratio()
    }

    #[test]
    fn identical_text_scores_one() {
        assert_eq!(similarity("こんにちは", "こんにちは"), 1.0);
        assert_eq!(similarity("Treat yo self", "Treat yo self"), 1.0);
    }

    #[test]
    fn empty_inputs_follow_convention() {
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("", "abc"), 0.0);
        assert_eq!(similarity("abc", ""), 0.0);
        // Punctuation-only strings normalize to empty.
        assert_eq!(similarity("。、", "！？"), 1.0);
    }

    #[test]
    fn katakana_folds_to_hiragana() {
        assert_eq!(similarity("ア", "あ"), 1.0);
        assert_eq!(similarity("ズンダモン", "ずんだもん"), 1.0);
        assert_eq!(normalize_text("ヴァーチャル"), "ゔぁーちゃる");
    }

    #[test]
    fn punctuation_and_spacing_are_ignored() {
        let text = "やっほー！あおいだよ";
        assert_eq!(similarity(text, &format!("{text}。")), 1.0);
        assert_eq!(similarity("Hello, World.", "hello world"), 1.0);
        assert_eq!(similarity("今日は　いい天気", "今日はいい天気"), 1.0);
    }

    #[test]
    fn similarity_is_symmetric_on_representative_inputs() {
        let pairs = [
            ("今日は最高のテンプレートを紹介するね", "今日は最高のテンプレート紹介するね"),
            ("むらさきよ。どんなテンプレートなの？", "紫よどんなテンプレなの"),
            ("abcd", "bcde"),
        ];
        for (a, b) in pairs {
            assert_eq!(similarity(a, b), similarity(b, a), "{a} vs {b}");
        }
    }

    #[test]
    fn golden_ratios_match_reference_matcher() {
        assert_eq!(raw_ratio("abcd", "bcde"), 0.75);
        // Blocks "a" + "b": 2 * 2 / 6.
        assert_eq!(raw_ratio("abc", "acb"), 2.0 * 2.0 / 6.0);
        // The matcher is order sensitive: "ab" then nothing right of it.
        assert_eq!(raw_ratio("ab", "ba"), 0.5);
        assert_eq!(raw_ratio("private Thread", "private volatile Thread"), 28.0 / 37.0);
    }

    #[test]
    fn longest_match_prefers_earliest_block() {
        let (a, b) = (chars("xabyab"), chars("ab"));
        let m = SequenceMatcher::new(&a, &b);
        assert_eq!(
            m.find_longest_match(0, a.len(), 0, b.len()),
            MatchingBlock {
                a_start: 1,
                b_start: 0,
                len: 2
            }
        );
    }

    #[test]
    fn matching_blocks_are_sorted_and_disjoint() {
        let (a, b) = (chars("qabxcd"), chars("abycdf"));
        let blocks = SequenceMatcher::new(&a, &b).matching_blocks();
        assert_eq!(
            blocks,
            vec![
                MatchingBlock {
                    a_start: 1,
                    b_start: 0,
                    len: 2
                },
                MatchingBlock {
                    a_start: 4,
                    b_start: 3,
                    len: 2
                },
            ]
        );
    }

    #[test]
    fn popular_characters_do_not_seed_matches_in_long_inputs() {
        let a = chars("a");

        // 'a' is 199 of 200 characters in `b`, so it cannot seed a match.
        let b: Vec<char> = std::iter::once('x')
            .chain(std::iter::repeat_n('a', 199))
            .collect();
        assert_eq!(SequenceMatcher::new(&a, &b).ratio(), 0.0);

        // Below the length threshold the same shape matches normally.
        let b: Vec<char> = std::iter::once('x')
            .chain(std::iter::repeat_n('a', 198))
            .collect();
        assert_eq!(SequenceMatcher::new(&a, &b).ratio(), 2.0 / 200.0);
    }
}
