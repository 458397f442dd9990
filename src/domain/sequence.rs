// ============================================================
// Layer 3 — Character and Number Sequences
// ============================================================
// CharacterSequence — the characters of one text record
// NumberSequence    — rows of numeric features, `width` values
//                     per row, stored flat in row-major order
//
// Encoding a CharacterSequence gives a NumberSequence of
// width 1 whose values are vocabulary indices. Indices are
// held as f32 so index columns and dense feature columns can
// be stacked side by side by the WindowedBatcher.
//
// Reference: Rust Book §5 (Structs), §8 (Vectors)

use std::fmt;

use crate::domain::encoding::{OneHotEncoding, Symbol};
use crate::domain::error::CharnetError;

// ─── CharacterSequence ────────────────────────────────────────────────────────
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterSequence {
    chars: Vec<char>,
}

impl CharacterSequence {
    pub fn from_string(s: &str) -> Self {
        Self { chars: s.chars().collect() }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Map every character to its vocabulary index.
    /// Fails on the first character the vocabulary does not know.
    pub fn encode(&self, encoding: &OneHotEncoding) -> Result<NumberSequence, CharnetError> {
        let indices = self
            .chars
            .iter()
            .enumerate()
            .map(|(position, &character)| {
                encoding
                    .index_of(character)
                    .ok_or(CharnetError::UnknownCharacter { character, position })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(NumberSequence::from_indices(indices))
    }
}

impl fmt::Display for CharacterSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.chars.iter().try_for_each(|c| write!(f, "{c}"))
    }
}

impl FromIterator<char> for CharacterSequence {
    fn from_iter<I: IntoIterator<Item = char>>(iter: I) -> Self {
        Self { chars: iter.into_iter().collect() }
    }
}

// ─── NumberSequence ───────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq)]
pub struct NumberSequence {
    width:  usize,
    values: Vec<f32>,
}

impl NumberSequence {
    /// A width-1 sequence of vocabulary indices
    pub fn from_indices<I: IntoIterator<Item = usize>>(indices: I) -> Self {
        Self {
            width:  1,
            values: indices.into_iter().map(|i| i as f32).collect(),
        }
    }

    /// A sequence of dense rows, `width` values each
    pub fn from_rows(width: usize, values: Vec<f32>) -> Result<Self, CharnetError> {
        if width == 0 || values.len() % width != 0 {
            return Err(CharnetError::Misaligned(format!(
                "{} values cannot be split into rows of width {}",
                values.len(),
                width
            )));
        }
        Ok(Self { width, values })
    }

    /// Join sequences of equal width end to end
    pub fn concat(parts: &[NumberSequence]) -> Result<Self, CharnetError> {
        let width = parts.first().map_or(1, |p| p.width);
        if let Some(bad) = parts.iter().find(|p| p.width != width) {
            return Err(CharnetError::Misaligned(format!(
                "cannot concatenate width {} with width {}",
                width, bad.width
            )));
        }
        let values = parts.iter().flat_map(|p| p.values.iter().copied()).collect();
        Ok(Self { width, values })
    }

    pub fn len(&self) -> usize {
        self.values.len() / self.width
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn row(&self, i: usize) -> &[f32] {
        &self.values[i * self.width..(i + 1) * self.width]
    }

    /// The values of a width-1 sequence as vocabulary indices
    pub fn indices(&self) -> Result<Vec<usize>, CharnetError> {
        if self.width != 1 {
            return Err(CharnetError::Misaligned(format!(
                "only width-1 sequences hold indices, this one has width {}",
                self.width
            )));
        }
        self.values
            .iter()
            .map(|&v| {
                if v < 0.0 || v.fract() != 0.0 {
                    Err(CharnetError::IndexOutOfRange { index: v as i64, vocab_size: 0 })
                } else {
                    Ok(v as usize)
                }
            })
            .collect()
    }

    /// Turn indices back into characters. Start and stop tokens
    /// carry no character and are dropped.
    pub fn decode(&self, encoding: &OneHotEncoding) -> Result<CharacterSequence, CharnetError> {
        let mut chars = Vec::with_capacity(self.len());
        for index in self.indices()? {
            if let Symbol::Char(c) = encoding.symbol(index)? {
                chars.push(c);
            }
        }
        Ok(CharacterSequence { chars })
    }
}
