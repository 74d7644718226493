//! # Text Normalizer
//!
//! Lower-cases raw text, expands English contractions against a fixed
//! lookup table, canonicalizes or strips punctuation, and splits the
//! result into whitespace tokens. Every input produces output; there are
//! no error conditions on this path.

use std::collections::{HashMap, HashSet};

/// Quote-like characters folded to a plain apostrophe before contraction
/// lookup, so `don’t` and `don't` hit the same table entry.
const QUOTE_SPECIALS: &[char] = &['’', '‘', '´', '`'];

/// Word-level contraction expansions. Keys are matched after lower-casing.
const CONTRACTIONS: &[(&str, &str)] = &[
    ("ain't", "is not"),
    ("aren't", "are not"),
    ("can't", "cannot"),
    ("'cause", "because"),
    ("could've", "could have"),
    ("couldn't", "could not"),
    ("didn't", "did not"),
    ("doesn't", "does not"),
    ("don't", "do not"),
    ("hadn't", "had not"),
    ("hasn't", "has not"),
    ("haven't", "have not"),
    ("he'd", "he would"),
    ("he'll", "he will"),
    ("he's", "he is"),
    ("here's", "here is"),
    ("how'd", "how did"),
    ("how'd'y", "how do you"),
    ("how'll", "how will"),
    ("how's", "how is"),
    ("i'd", "i would"),
    ("i'd've", "i would have"),
    ("i'll", "i will"),
    ("i'll've", "i will have"),
    ("i'm", "i am"),
    ("i've", "i have"),
    ("isn't", "is not"),
    ("it'd", "it would"),
    ("it'd've", "it would have"),
    ("it'll", "it will"),
    ("it'll've", "it will have"),
    ("it's", "it is"),
    ("let's", "let us"),
    ("ma'am", "madam"),
    ("mayn't", "may not"),
    ("might've", "might have"),
    ("mightn't", "might not"),
    ("mightn't've", "might not have"),
    ("must've", "must have"),
    ("mustn't", "must not"),
    ("mustn't've", "must not have"),
    ("needn't", "need not"),
    ("needn't've", "need not have"),
    ("o'clock", "of the clock"),
    ("oughtn't", "ought not"),
    ("oughtn't've", "ought not have"),
    ("shan't", "shall not"),
    ("sha'n't", "shall not"),
    ("shan't've", "shall not have"),
    ("she'd", "she would"),
    ("she'd've", "she would have"),
    ("she'll", "she will"),
    ("she'll've", "she will have"),
    ("she's", "she is"),
    ("should've", "should have"),
    ("shouldn't", "should not"),
    ("shouldn't've", "should not have"),
    ("so've", "so have"),
    ("so's", "so as"),
    ("that'd", "that would"),
    ("that'd've", "that would have"),
    ("that's", "that is"),
    ("there'd", "there would"),
    ("there'd've", "there would have"),
    ("there's", "there is"),
    ("they'd", "they would"),
    ("they'd've", "they would have"),
    ("they'll", "they will"),
    ("they'll've", "they will have"),
    ("they're", "they are"),
    ("they've", "they have"),
    ("this's", "this is"),
    ("to've", "to have"),
    ("wasn't", "was not"),
    ("we'd", "we would"),
    ("we'd've", "we would have"),
    ("we'll", "we will"),
    ("we'll've", "we will have"),
    ("we're", "we are"),
    ("we've", "we have"),
    ("weren't", "were not"),
    ("what'll", "what will"),
    ("what'll've", "what will have"),
    ("what're", "what are"),
    ("what's", "what is"),
    ("what've", "what have"),
    ("when's", "when is"),
    ("when've", "when have"),
    ("where'd", "where did"),
    ("where's", "where is"),
    ("where've", "where have"),
    ("who'll", "who will"),
    ("who'll've", "who will have"),
    ("who's", "who is"),
    ("who've", "who have"),
    ("why's", "why is"),
    ("why've", "why have"),
    ("will've", "will have"),
    ("won't", "will not"),
    ("won't've", "will not have"),
    ("would've", "would have"),
    ("wouldn't", "would not"),
    ("wouldn't've", "would not have"),
    ("y'all", "you all"),
    ("y'all'd", "you all would"),
    ("y'all'd've", "you all would have"),
    ("y'all're", "you all are"),
    ("y'all've", "you all have"),
    ("you'd", "you would"),
    ("you'd've", "you would have"),
    ("you'll", "you will"),
    ("you'll've", "you will have"),
    ("you're", "you are"),
    ("you've", "you have"),
];

/// Canonical replacements for special characters, applied before the strip
/// pass. Replacement output that lands in the strip set is removed by the
/// second pass.
const PUNCT_MAP: &[(char, &str)] = &[
    ('‘', "'"),
    ('₹', "e"),
    ('´', "'"),
    ('°', ""),
    ('€', "e"),
    ('™', "tm"),
    ('√', " sqrt "),
    ('×', "x"),
    ('²', "2"),
    ('—', "-"),
    ('–', "-"),
    ('’', "'"),
    ('_', "-"),
    ('`', "'"),
    ('“', "\""),
    ('”', "\""),
    ('£', "e"),
    ('∞', "infinity"),
    ('θ', "theta"),
    ('÷', "/"),
    ('α', "alpha"),
    ('•', "."),
    ('à', "a"),
    ('−', "-"),
    ('β', "beta"),
    ('∅', ""),
    ('³', "3"),
    ('π', "pi"),
];

/// Characters removed outright after the mapping pass.
const PUNCT_STRIP: &[char] = &[
    '/', '-', '\'', '?', '!', '.', ',', '#', '$', '%', '(', ')', '*', '+', ':', ';', '<', '=',
    '>', '@', '[', '\\', ']', '^', '_', '`', '{', '|', '}', '~', '"', '“', '”', '’', '∞', 'θ',
    '÷', 'α', '•', 'à', '−', 'β', '∅', '³', 'π', '‘', '₹', '´', '°', '£', '€', '×', '™', '√',
    '²', '—', '–', '&',
];

/// Text normalizer for classification input.
///
/// Stateless apart from its lookup tables; build one and share it across
/// every split so train and eval see identical preprocessing.
#[derive(Debug, Clone)]
pub struct Normalizer {
    contractions: HashMap<&'static str, &'static str>,
    punct_map: HashMap<char, &'static str>,
    punct_strip: HashSet<char>,
}

impl Normalizer {
    /// Create a normalizer with the default contraction and punctuation tables.
    pub fn new() -> Self {
        Self {
            contractions: CONTRACTIONS.iter().copied().collect(),
            punct_map: PUNCT_MAP.iter().copied().collect(),
            punct_strip: PUNCT_STRIP.iter().copied().collect(),
        }
    }

    /// Normalize raw text to lower-cased, contraction-expanded,
    /// punctuation-stripped form.
    ///
    /// # Examples
    /// ```
    /// use kiji_core::pipeline::Normalizer;
    ///
    /// let norm = Normalizer::new();
    /// assert_eq!(norm.normalize("I can't"), "i cannot");
    /// ```
    pub fn normalize(&self, raw: &str) -> String {
        let lowered = raw.to_lowercase();

        // Fold curly quotes so contraction lookup sees plain apostrophes.
        let mut text = String::with_capacity(lowered.len());
        for c in lowered.chars() {
            if QUOTE_SPECIALS.contains(&c) {
                text.push('\'');
            } else {
                text.push(c);
            }
        }

        // Word-level contraction expansion.
        let expanded: Vec<&str> = text
            .split(' ')
            .map(|word| self.contractions.get(word).copied().unwrap_or(word))
            .collect();
        let expanded = expanded.join(" ");

        // Pass 1: canonical replacements.
        let mut mapped = String::with_capacity(expanded.len());
        for c in expanded.chars() {
            match self.punct_map.get(&c) {
                Some(replacement) => mapped.push_str(replacement),
                None => mapped.push(c),
            }
        }

        // Pass 2: strip remaining punctuation.
        let stripped: String = mapped
            .chars()
            .filter(|c| !self.punct_strip.contains(c))
            .collect();

        stripped.trim().to_string()
    }

    /// Normalize and split into whitespace tokens.
    ///
    /// Empty or whitespace-only input yields an empty token list.
    pub fn tokenize(&self, raw: &str) -> Vec<String> {
        self.normalize(raw)
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}
