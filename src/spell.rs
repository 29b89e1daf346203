//! Spelling model over a reference corpus.
//!
//! A frequency-table scorer in the style of Norvig's classic corrector:
//! candidate replacements are drawn from the edit-1 and edit-2
//! neighborhoods of a word and ranked by corpus probability.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

static WORD_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("valid regex"));

/// Word-frequency model built from a reference corpus. Immutable after
/// construction.
#[derive(Debug, Clone, Default)]
pub struct SpellModel {
    words: HashMap<String, u64>,
    total: u64,
}

impl SpellModel {
    /// Build the frequency table from raw corpus text. Tokens are runs of
    /// word characters, lowercased.
    pub fn from_text(corpus: &str) -> Self {
        let mut words: HashMap<String, u64> = HashMap::new();
        let mut total = 0u64;
        for token in WORD_RUNS.find_iter(corpus) {
            *words.entry(token.as_str().to_lowercase()).or_insert(0) += 1;
            total += 1;
        }
        SpellModel { words, total }
    }

    /// Number of distinct words in the table.
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Total number of corpus tokens.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Occurrences of `word` in the corpus, 0 if unknown.
    pub fn frequency(&self, word: &str) -> u64 {
        self.words.get(word).copied().unwrap_or(0)
    }

    /// Corpus probability of `word`, 0.0 if unknown or the corpus is
    /// empty.
    pub fn probability(&self, word: &str) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.frequency(word) as f64 / self.total as f64
    }

    /// All strings one elementary edit away from `word`: an insertion at
    /// any position (the end included), a deletion, an adjacent
    /// transposition, or a substitution, over the lowercase alphabet.
    pub fn edit_one(word: &str) -> HashSet<String> {
        let chars: Vec<char> = word.chars().collect();
        let mut edits = HashSet::new();

        for i in 0..=chars.len() {
            let (left, right) = chars.split_at(i);

            if !right.is_empty() {
                let mut deletion: String = left.iter().collect();
                deletion.extend(&right[1..]);
                edits.insert(deletion);
            }

            if right.len() > 1 {
                let mut transposition: String = left.iter().collect();
                transposition.push(right[1]);
                transposition.push(right[0]);
                transposition.extend(&right[2..]);
                edits.insert(transposition);
            }

            for letter in 'a'..='z' {
                let mut insertion: String = left.iter().collect();
                insertion.push(letter);
                insertion.extend(right);
                edits.insert(insertion);

                if !right.is_empty() {
                    let mut substitution: String = left.iter().collect();
                    substitution.push(letter);
                    substitution.extend(&right[1..]);
                    edits.insert(substitution);
                }
            }
        }

        edits
    }

    /// All strings two elementary edits away from `word`.
    pub fn edit_two(word: &str) -> HashSet<String> {
        Self::edit_one(word)
            .iter()
            .flat_map(|edit| Self::edit_one(edit))
            .collect()
    }

    /// Filter `words` down to those present in the frequency table.
    pub fn known<I>(&self, words: I) -> Vec<String>
    where
        I: IntoIterator<Item = String>,
    {
        words
            .into_iter()
            .filter(|word| self.words.contains_key(word))
            .collect()
    }

    /// Candidate replacements for `word`: the first non-empty of the word
    /// itself, its known edit-1 neighbors, its known edit-2 neighbors, or
    /// the word as a singleton fallback.
    pub fn candidates(&self, word: &str) -> Vec<String> {
        let exact = self.known([word.to_string()]);
        if !exact.is_empty() {
            return exact;
        }
        let one = self.known(Self::edit_one(word));
        if !one.is_empty() {
            return one;
        }
        let two = self.known(Self::edit_two(word));
        if !two.is_empty() {
            return two;
        }
        vec![word.to_string()]
    }

    /// The single most probable candidate for `word`.
    pub fn correction(&self, word: &str) -> String {
        self.most_likely_replacements(word, 1)
            .into_iter()
            .next()
            .unwrap_or_else(|| word.to_string())
    }

    /// The `n` most probable candidates for `word`, highest probability
    /// first, ties broken lexicographically.
    pub fn most_likely_replacements(&self, word: &str, n: usize) -> Vec<String> {
        let mut candidates = self.candidates(word);
        candidates.sort_by(|a, b| {
            self.probability(b)
                .partial_cmp(&self.probability(a))
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.cmp(b))
        });
        candidates.truncate(n);
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenization_is_lowercased() {
        let model = SpellModel::from_text("The THE the quick");
        assert_eq!(model.frequency("the"), 3);
        assert_eq!(model.frequency("quick"), 1);
        assert_eq!(model.total(), 4);
        assert_eq!(model.word_count(), 2);
    }

    #[test]
    fn test_probability() {
        let model = SpellModel::from_text("spam spam spam eggs");
        assert_eq!(model.probability("spam"), 0.75);
        assert_eq!(model.probability("eggs"), 0.25);
        assert_eq!(model.probability("ham"), 0.0);
    }

    #[test]
    fn test_probability_on_empty_corpus() {
        let model = SpellModel::from_text("");
        assert_eq!(model.probability("anything"), 0.0);
    }

    #[test]
    fn test_edit_one_covers_all_edit_kinds() {
        let edits = SpellModel::edit_one("tea");
        assert!(edits.contains("ta")); // deletion
        assert!(edits.contains("tae")); // transposition
        assert!(edits.contains("sea")); // substitution
        assert!(edits.contains("team")); // insertion at the end
        assert!(edits.contains("stea")); // insertion at the front
    }

    #[test]
    fn test_edit_one_reaches_appended_letter() {
        assert!(SpellModel::edit_one("democrac").contains("democracy"));
    }

    #[test]
    fn test_known_filters_to_vocabulary() {
        let model = SpellModel::from_text("apple banana");
        let known = model.known(vec!["apple".to_string(), "cherry".to_string()]);
        assert_eq!(known, vec!["apple".to_string()]);
    }

    #[test]
    fn test_candidates_prefers_exact_word() {
        let model = SpellModel::from_text("apple apply");
        assert_eq!(model.candidates("apple"), vec!["apple".to_string()]);
    }

    #[test]
    fn test_candidates_fall_back_to_edit_one() {
        let model = SpellModel::from_text("democracy");
        assert_eq!(model.candidates("democrac"), vec!["democracy".to_string()]);
    }

    #[test]
    fn test_candidates_fall_back_to_edit_two() {
        let model = SpellModel::from_text("democracy");
        assert_eq!(model.candidates("democra"), vec!["democracy".to_string()]);
    }

    #[test]
    fn test_candidates_fall_back_to_singleton() {
        let model = SpellModel::from_text("unrelated words only");
        assert_eq!(model.candidates("qqqqqq"), vec!["qqqqqq".to_string()]);
    }

    #[test]
    fn test_replacements_are_ranked_by_probability() {
        // "tha" is one edit from both; "the" is far more frequent.
        let model = SpellModel::from_text("the the the tea");
        let replacements = model.most_likely_replacements("tha", 2);
        assert_eq!(replacements, vec!["the".to_string(), "tea".to_string()]);
    }

    #[test]
    fn test_replacements_truncate_to_n() {
        let model = SpellModel::from_text("the tea ten");
        assert_eq!(model.most_likely_replacements("tha", 1).len(), 1);
    }

    #[test]
    fn test_correction_picks_most_probable() {
        let model = SpellModel::from_text("the the the tea");
        assert_eq!(model.correction("tha"), "the");
    }
}
