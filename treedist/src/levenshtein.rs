//! Levenshtein distance over bytes, characters, or words.
//!
//! Used by the edit-distance cost functions to price label changes.

use core::fmt;
use core::str::FromStr;

use facet::Facet;
use rapidhash::RapidHashMap as HashMap;

use crate::error::TreeDistError;

/// How a label is split into tokens before comparing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Facet)]
#[repr(u8)]
pub enum Tokenization {
    /// UTF-8 bytes.
    Byte,
    /// Unicode scalar values.
    Character,
    /// Whitespace-separated words.
    Word,
}

impl Tokenization {
    /// The configuration name of this tokenization.
    pub fn name(self) -> &'static str {
        match self {
            Tokenization::Byte => "byte",
            Tokenization::Character => "character",
            Tokenization::Word => "word",
        }
    }

    /// Number of tokens in `s`.
    pub fn token_count(self, s: &str) -> usize {
        match self {
            Tokenization::Byte => s.len(),
            Tokenization::Character => s.chars().count(),
            Tokenization::Word => s.split_whitespace().count(),
        }
    }
}

impl FromStr for Tokenization {
    type Err = TreeDistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix("builtin:").unwrap_or(s) {
            "byte" => Ok(Tokenization::Byte),
            "character" | "char" => Ok(Tokenization::Character),
            "word" => Ok(Tokenization::Word),
            _ => Err(TreeDistError::UnknownTokenization { name: s.to_owned() }),
        }
    }
}

impl fmt::Display for Tokenization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Edit distance between two optional strings.
///
/// A missing string behaves like an empty one: the distance to it is the
/// token count of the other side.
pub fn edit_distance(a: Option<&str>, b: Option<&str>, tokenization: Tokenization) -> usize {
    let (a, b) = match (a, b) {
        (None, None) => return 0,
        (None, Some(s)) | (Some(s), None) => return tokenization.token_count(s),
        (Some(a), Some(b)) => (a, b),
    };

    match tokenization {
        Tokenization::Byte => levenshtein(a.as_bytes(), b.as_bytes()),
        Tokenization::Character => {
            let a: Vec<char> = a.chars().collect();
            let b: Vec<char> = b.chars().collect();
            levenshtein(&a, &b)
        }
        Tokenization::Word => {
            // Intern words so the inner loop compares integers.
            let mut ids: HashMap<&str, u32> = HashMap::default();
            let a = intern_words(a, &mut ids);
            let b = intern_words(b, &mut ids);
            levenshtein(&a, &b)
        }
    }
}

fn intern_words<'s>(s: &'s str, ids: &mut HashMap<&'s str, u32>) -> Vec<u32> {
    s.split_whitespace()
        .map(|word| {
            let next = ids.len() as u32;
            *ids.entry(word).or_insert(next)
        })
        .collect()
}

/// Unit-cost edit distance between two token sequences.
///
/// Keeps two rows of the dynamic-programming table, so memory is linear in
/// the length of `y`.
pub fn levenshtein<T: PartialEq>(x: &[T], y: &[T]) -> usize {
    if x.is_empty() {
        return y.len();
    }
    if y.is_empty() {
        return x.len();
    }

    let mut prev: Vec<usize> = (0..=y.len()).collect();
    let mut curr: Vec<usize> = vec![0; y.len() + 1];

    for (i, xi) in x.iter().enumerate() {
        curr[0] = i + 1;
        for (j, yj) in y.iter().enumerate() {
            let update = prev[j] + usize::from(xi != yj);
            let delete = prev[j + 1] + 1;
            let insert = curr[j] + 1;
            curr[j + 1] = delete.min(update).min(insert);
        }
        core::mem::swap(&mut prev, &mut curr);
    }

    prev[y.len()]
}
