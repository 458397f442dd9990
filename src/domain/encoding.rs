// ============================================================
// Layer 3 — Character Encodings
// ============================================================
// A OneHotEncoding is the character vocabulary of the model:
//
//   index 0      <STR>   (only when include_start_token)
//   index 1      <EOS>   (only when include_stop_token)
//   index k..    one slot per character, in first-seen order
//
// The vocabulary is persisted as JSON. Only the character
// list and the two flags are written; the reverse lookup
// table is rebuilt when the file is read back.
//
// IdentityEncoding is the trivial encoding for numeric
// feature columns that are already dense.
//
// Reference: Rust Book §8 (Hash Maps)
//            serde documentation (container attributes)

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::error::CharnetError;
use crate::domain::traits::Encoding;

pub const START_TOKEN: &str = "<STR>";
pub const STOP_TOKEN: &str = "<EOS>";

/// One decoded vocabulary entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Start,
    Stop,
    Char(char),
}

// ─── OneHotEncoding ───────────────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "EncodingFile", into = "EncodingFile")]
pub struct OneHotEncoding {
    include_start_token: bool,
    include_stop_token:  bool,
    characters:          Vec<char>,
    lookup:              HashMap<char, usize>,
}

/// On-disk shape of a OneHotEncoding
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EncodingFile {
    include_start_token: bool,
    include_stop_token:  bool,
    characters:          Vec<char>,
}

impl From<EncodingFile> for OneHotEncoding {
    fn from(f: EncodingFile) -> Self {
        let mut enc = OneHotEncoding::new(f.include_start_token, f.include_stop_token);
        for c in f.characters {
            enc.add(c);
        }
        enc
    }
}

impl From<OneHotEncoding> for EncodingFile {
    fn from(e: OneHotEncoding) -> Self {
        EncodingFile {
            include_start_token: e.include_start_token,
            include_stop_token:  e.include_stop_token,
            characters:          e.characters,
        }
    }
}

impl OneHotEncoding {
    /// An empty vocabulary holding only the requested special tokens
    pub fn new(include_start_token: bool, include_stop_token: bool) -> Self {
        Self {
            include_start_token,
            include_stop_token,
            characters: Vec::new(),
            lookup:     HashMap::new(),
        }
    }

    /// Build a vocabulary from every character seen in `records`.
    pub fn build<'a, I>(records: I, include_start_token: bool, include_stop_token: bool) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut enc = Self::new(include_start_token, include_stop_token);
        for record in records {
            for c in record.chars() {
                enc.add(c);
            }
        }
        enc
    }

    /// Add a character, returning its index (existing or new).
    pub fn add(&mut self, c: char) -> usize {
        if let Some(&idx) = self.lookup.get(&c) {
            return idx;
        }
        let idx = self.special_count() + self.characters.len();
        self.characters.push(c);
        self.lookup.insert(c, idx);
        idx
    }

    fn special_count(&self) -> usize {
        self.include_start_token as usize + self.include_stop_token as usize
    }

    pub fn len(&self) -> usize {
        self.special_count() + self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn start_token(&self) -> Option<usize> {
        self.include_start_token.then_some(0)
    }

    pub fn stop_token(&self) -> Option<usize> {
        self.include_stop_token
            .then_some(self.include_start_token as usize)
    }

    pub fn index_of(&self, c: char) -> Option<usize> {
        self.lookup.get(&c).copied()
    }

    /// Map a vocabulary index back to what it stands for
    pub fn symbol(&self, index: usize) -> Result<Symbol, CharnetError> {
        if Some(index) == self.start_token() {
            return Ok(Symbol::Start);
        }
        if Some(index) == self.stop_token() {
            return Ok(Symbol::Stop);
        }
        index
            .checked_sub(self.special_count())
            .and_then(|i| self.characters.get(i))
            .map(|&c| Symbol::Char(c))
            .ok_or(CharnetError::IndexOutOfRange {
                index:      index as i64,
                vocab_size: self.len(),
            })
    }

    /// Dense one-hot vector for a single index
    pub fn one_hot(&self, index: usize) -> Result<Vec<f32>, CharnetError> {
        let vocab_size = self.len();
        if index >= vocab_size {
            return Err(CharnetError::IndexOutOfRange { index: index as i64, vocab_size });
        }
        let mut v = vec![0.0; vocab_size];
        v[index] = 1.0;
        Ok(v)
    }
}

impl Encoding for OneHotEncoding {
    fn vocab_size(&self) -> usize {
        self.len()
    }

    fn input_width(&self) -> usize {
        1
    }

    fn convert_representation(&self, row: &[f32]) -> Result<Vec<f32>, CharnetError> {
        let value = match row {
            [v] => *v,
            _ => {
                return Err(CharnetError::Misaligned(format!(
                    "one-hot encoding expects rows of width 1, got {}",
                    row.len()
                )))
            }
        };
        if value < 0.0 || value.fract() != 0.0 {
            return Err(CharnetError::IndexOutOfRange {
                index:      value as i64,
                vocab_size: self.len(),
            });
        }
        self.one_hot(value as usize)
    }
}

// ─── IdentityEncoding ─────────────────────────────────────────────────────────
/// Dense feature columns that need no expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityEncoding {
    pub width: usize,
}

impl IdentityEncoding {
    pub fn new(width: usize) -> Self {
        Self { width }
    }
}

impl Encoding for IdentityEncoding {
    fn vocab_size(&self) -> usize {
        self.width
    }

    fn input_width(&self) -> usize {
        self.width
    }

    fn convert_representation(&self, row: &[f32]) -> Result<Vec<f32>, CharnetError> {
        if row.len() != self.width {
            return Err(CharnetError::Misaligned(format!(
                "identity encoding expects rows of width {}, got {}",
                self.width,
                row.len()
            )));
        }
        Ok(row.to_vec())
    }
}
