// ============================================================
// Layer 4 — Windowed Batcher
// ============================================================
// Turns one long numeric sequence (or several parallel ones)
// into an endless, deterministic stream of training batches.
//
// Construction, with W = sequence_length + 1:
//
//   sources  s1 (N×d1), s2 (N×d2), ...
//       │  stack column-wise
//       ▼
//   rows     N × D              D = d1 + d2 + ...
//       │  drop the tail so N' is a multiple of batch_size·W
//       ▼
//   chunks   (N'/W) × W × D
//
// next_batch() takes batch_size consecutive chunks, expands
// every row through the encodings (index → one-hot), and
// splits the W steps into
//
//   X = steps 0 .. W-1           (all features)
//   y = steps 1 .. W, columns 0 .. vocab_sizes[0]
//
// both laid out time-major: [step][batch][feature]. After the
// last batch the cursor wraps to batch 0. There is no shuffle.
//
// Expanded batches can be cached per batch index. This is
// off by default: one cached batch holds
// sequence_length·batch_size·vocab_size floats twice over,
// and a long corpus has many batches.
//
// Reference: Rust Book §8 (Vectors), §13 (Iterators)

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::error::CharnetError;
use crate::domain::sequence::NumberSequence;
use crate::domain::traits::Encoding;

// ─── BatcherConfig ────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatcherConfig {
    pub batch_size:      usize,
    pub sequence_length: usize,
    pub cache_batches:   bool,
}

impl Default for BatcherConfig {
    fn default() -> Self {
        Self {
            batch_size:      100,
            sequence_length: 200,
            cache_batches:   false,
        }
    }
}

// ─── WindowBatch ──────────────────────────────────────────────────────────────
/// One (X, y) pair on the host, time-major.
///
/// inputs:  [steps, batch_size, input_dim]
/// targets: [steps, batch_size, target_dim]
#[derive(Debug, Clone, PartialEq)]
pub struct WindowBatch {
    pub inputs:     Vec<f32>,
    pub targets:    Vec<f32>,
    pub steps:      usize,
    pub batch_size: usize,
    pub input_dim:  usize,
    pub target_dim: usize,
}

impl WindowBatch {
    pub fn input_at(&self, step: usize, item: usize) -> &[f32] {
        let start = (step * self.batch_size + item) * self.input_dim;
        &self.inputs[start..start + self.input_dim]
    }

    pub fn target_at(&self, step: usize, item: usize) -> &[f32] {
        let start = (step * self.batch_size + item) * self.target_dim;
        &self.targets[start..start + self.target_dim]
    }
}

// ─── WindowedBatcher ──────────────────────────────────────────────────────────
pub struct WindowedBatcher {
    encodings:     Vec<Box<dyn Encoding>>,
    source_widths: Vec<usize>,
    vocab_sizes:   Vec<usize>,
    /// Row-major [num_chunks][window][width]
    chunks:        Vec<f32>,
    width:         usize,
    window:        usize,
    num_chunks:    usize,
    num_batches:   usize,
    batch_size:    usize,
    batch_index:   usize,
    cache_batches: bool,
    cache:         HashMap<usize, WindowBatch>,
}

impl WindowedBatcher {
    /// Build a batcher over parallel sequences, one encoding per sequence.
    /// The first encoding's vocabulary is the prediction target.
    pub fn new(
        sequences: &[NumberSequence],
        encodings: Vec<Box<dyn Encoding>>,
        config:    &BatcherConfig,
    ) -> Result<Self, CharnetError> {
        if config.batch_size == 0 || config.sequence_length == 0 {
            return Err(CharnetError::InvalidShape(format!(
                "batch_size ({}) and sequence_length ({}) must be positive",
                config.batch_size, config.sequence_length
            )));
        }
        if sequences.is_empty() || sequences.len() != encodings.len() {
            return Err(CharnetError::Misaligned(format!(
                "{} sequences for {} encodings",
                sequences.len(),
                encodings.len()
            )));
        }
        for (i, (seq, enc)) in sequences.iter().zip(&encodings).enumerate() {
            if seq.width() != enc.input_width() {
                return Err(CharnetError::Misaligned(format!(
                    "sequence {} has width {} but its encoding reads width {}",
                    i,
                    seq.width(),
                    enc.input_width()
                )));
            }
        }

        let length = sequences[0].len();
        if let Some(other) = sequences.iter().find(|s| s.len() != length) {
            return Err(CharnetError::Misaligned(format!(
                "sequence lengths differ ({} vs {})",
                length,
                other.len()
            )));
        }

        let window   = config.sequence_length + 1;
        let required = config.batch_size * window;
        if length <= required {
            return Err(CharnetError::InsufficientData { required, available: length });
        }

        let usable = length - length % required;
        let source_widths: Vec<usize> = sequences.iter().map(|s| s.width()).collect();
        let width: usize = source_widths.iter().sum();

        // Column-wise stack of the first `usable` rows
        let mut chunks = Vec::with_capacity(usable * width);
        for row in 0..usable {
            for seq in sequences {
                chunks.extend_from_slice(seq.row(row));
            }
        }

        let num_chunks  = usable / window;
        let num_batches = num_chunks / config.batch_size;
        let vocab_sizes = encodings.iter().map(|e| e.vocab_size()).collect();

        tracing::debug!(
            "Windowed batcher: {} rows kept of {}, {} chunks of {} steps, {} batches",
            usable,
            length,
            num_chunks,
            window,
            num_batches
        );

        Ok(Self {
            encodings,
            source_widths,
            vocab_sizes,
            chunks,
            width,
            window,
            num_chunks,
            num_batches,
            batch_size: config.batch_size,
            batch_index: 0,
            cache_batches: config.cache_batches,
            cache: HashMap::new(),
        })
    }

    /// The next batch in cyclic order.
    pub fn next_batch(&mut self) -> Result<WindowBatch, CharnetError> {
        if self.batch_index >= self.num_batches {
            self.batch_index = 0;
        }
        let index = self.batch_index;

        if let Some(batch) = self.cache.get(&index) {
            self.batch_index += 1;
            return Ok(batch.clone());
        }

        let batch = self.build_batch(index)?;
        if self.cache_batches {
            self.cache.insert(index, batch.clone());
        }
        self.batch_index += 1;
        Ok(batch)
    }

    /// Rewind to the first batch. Cached batches are kept.
    pub fn reset(&mut self) {
        self.batch_index = 0;
    }

    fn build_batch(&self, index: usize) -> Result<WindowBatch, CharnetError> {
        let first_chunk = index * self.batch_size;
        let input_dim   = self.vocab_size();
        let target_dim  = self.target_dim();
        let steps       = self.window - 1;

        // expanded[item][step] = dense row of input_dim values
        let mut expanded: Vec<Vec<Vec<f32>>> = Vec::with_capacity(self.batch_size);
        for item in 0..self.batch_size {
            let chunk = first_chunk + item;
            let rows  = (0..self.window)
                .map(|step| self.expand_row(self.raw_row(chunk, step)))
                .collect::<Result<Vec<_>, _>>()?;
            expanded.push(rows);
        }

        let mut inputs  = Vec::with_capacity(steps * self.batch_size * input_dim);
        let mut targets = Vec::with_capacity(steps * self.batch_size * target_dim);
        for step in 0..steps {
            for rows in &expanded {
                inputs.extend_from_slice(&rows[step]);
                targets.extend_from_slice(&rows[step + 1][..target_dim]);
            }
        }

        Ok(WindowBatch {
            inputs,
            targets,
            steps,
            batch_size: self.batch_size,
            input_dim,
            target_dim,
        })
    }

    fn raw_row(&self, chunk: usize, step: usize) -> &[f32] {
        let start = (chunk * self.window + step) * self.width;
        &self.chunks[start..start + self.width]
    }

    /// Split a stacked row at the source boundaries and expand each part.
    fn expand_row(&self, row: &[f32]) -> Result<Vec<f32>, CharnetError> {
        let mut out    = Vec::with_capacity(self.vocab_size());
        let mut offset = 0;
        for (enc, &w) in self.encodings.iter().zip(&self.source_widths) {
            out.extend(enc.convert_representation(&row[offset..offset + w])?);
            offset += w;
        }
        Ok(out)
    }

    pub fn num_batches(&self) -> usize {
        self.num_batches
    }

    pub fn num_chunks(&self) -> usize {
        self.num_chunks
    }

    pub fn batch_index(&self) -> usize {
        self.batch_index
    }

    /// Time steps per batch (sequence_length)
    pub fn steps(&self) -> usize {
        self.window - 1
    }

    /// Combined width of the expanded input rows
    pub fn vocab_size(&self) -> usize {
        self.vocab_sizes.iter().sum()
    }

    pub fn input_dim(&self) -> usize {
        self.vocab_size()
    }

    /// Width of the prediction target (the first vocabulary)
    pub fn target_dim(&self) -> usize {
        self.vocab_sizes[0]
    }

    pub fn cached_batches(&self) -> usize {
        self.cache.len()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::encoding::{IdentityEncoding, OneHotEncoding};

    fn index_sequence(len: usize, vocab: usize) -> NumberSequence {
        NumberSequence::from_indices((0..len).map(|i| (i.wrapping_mul(2_654_435_761) >> 5) % vocab))
    }

    fn vocab(size: usize) -> OneHotEncoding {
        let mut enc = OneHotEncoding::new(false, false);
        for i in 0..size {
            enc.add(char::from(b'a' + i as u8));
        }
        enc
    }

    fn config(batch_size: usize, sequence_length: usize) -> BatcherConfig {
        BatcherConfig { batch_size, sequence_length, cache_batches: false }
    }

    fn argmax(v: &[f32]) -> usize {
        v.iter()
            .enumerate()
            .fold((0, f32::MIN), |best, (i, &x)| if x > best.1 { (i, x) } else { best })
            .0
    }

    #[test]
    fn test_construction_requires_more_than_one_batch_of_rows() {
        // batch 2 × window 4 = 8 rows needed
        let cfg = config(2, 3);
        let short = WindowedBatcher::new(&[index_sequence(8, 5)], vec![Box::new(vocab(5))], &cfg);
        assert_eq!(
            short.err(),
            Some(CharnetError::InsufficientData { required: 8, available: 8 })
        );

        let ok = WindowedBatcher::new(&[index_sequence(9, 5)], vec![Box::new(vocab(5))], &cfg);
        assert!(ok.is_ok());
    }

    #[test]
    fn test_tail_is_truncated_to_whole_batches() {
        // 37 rows, batch 2 × window 4 = 8 → 32 rows kept, 8 chunks, 4 batches
        let b = WindowedBatcher::new(&[index_sequence(37, 5)], vec![Box::new(vocab(5))], &config(2, 3))
            .unwrap();
        assert_eq!(b.num_chunks(), 8);
        assert_eq!(b.num_batches(), 4);
        assert_eq!(b.steps(), 3);
    }

    #[test]
    fn test_batch_shapes_are_time_major() {
        let mut b = WindowedBatcher::new(&[index_sequence(50, 6)], vec![Box::new(vocab(6))], &config(3, 4))
            .unwrap();
        let batch = b.next_batch().unwrap();
        assert_eq!(batch.steps, 4);
        assert_eq!(batch.batch_size, 3);
        assert_eq!(batch.inputs.len(), 4 * 3 * 6);
        assert_eq!(batch.targets.len(), 4 * 3 * 6);
    }

    #[test]
    fn test_inputs_follow_the_corpus_order() {
        let seq = index_sequence(50, 6);
        let mut b = WindowedBatcher::new(&[seq.clone()], vec![Box::new(vocab(6))], &config(2, 4))
            .unwrap();
        let batch = b.next_batch().unwrap();
        let raw   = seq.indices().unwrap();

        // item 1 starts at chunk 1 → corpus offset 5 (window = 5)
        for step in 0..4 {
            assert_eq!(argmax(batch.input_at(step, 0)), raw[step]);
            assert_eq!(argmax(batch.input_at(step, 1)), raw[5 + step]);
        }
    }

    #[test]
    fn test_targets_are_inputs_shifted_by_one_step() {
        let mut b = WindowedBatcher::new(&[index_sequence(200, 9)], vec![Box::new(vocab(9))], &config(4, 6))
            .unwrap();
        for _ in 0..b.num_batches() {
            let batch = b.next_batch().unwrap();
            for step in 0..batch.steps - 1 {
                for item in 0..batch.batch_size {
                    let next_input = &batch.input_at(step + 1, item)[..batch.target_dim];
                    assert_eq!(batch.target_at(step, item), next_input);
                }
            }
        }
    }

    #[test]
    fn test_every_expanded_row_is_one_hot() {
        let mut b = WindowedBatcher::new(&[index_sequence(60, 4)], vec![Box::new(vocab(4))], &config(2, 5))
            .unwrap();
        let batch = b.next_batch().unwrap();
        for row in batch.inputs.chunks(batch.input_dim) {
            assert_eq!(row.iter().filter(|&&x| x == 1.0).count(), 1);
            assert_eq!(row.iter().sum::<f32>(), 1.0);
        }
    }

    #[test]
    fn test_wraps_around_after_the_last_batch() {
        let mut b = WindowedBatcher::new(&[index_sequence(100, 5)], vec![Box::new(vocab(5))], &config(2, 4))
            .unwrap();
        let n     = b.num_batches();
        let first = b.next_batch().unwrap();
        let mut last = first.clone();
        for _ in 0..n {
            last = b.next_batch().unwrap();
        }
        // call n+1 returns batch 0 again
        assert_eq!(last, first);
        assert_eq!(b.batch_index(), 1);
    }

    #[test]
    fn test_consecutive_batches_differ() {
        let mut b = WindowedBatcher::new(&[index_sequence(100, 5)], vec![Box::new(vocab(5))], &config(2, 4))
            .unwrap();
        assert!(b.num_batches() > 1);
        let first  = b.next_batch().unwrap();
        let second = b.next_batch().unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_cache_is_off_by_default() {
        let mut b = WindowedBatcher::new(&[index_sequence(100, 5)], vec![Box::new(vocab(5))], &config(2, 4))
            .unwrap();
        b.next_batch().unwrap();
        assert_eq!(b.cached_batches(), 0);
    }

    #[test]
    fn test_cached_batches_match_recomputed_ones() {
        let cfg = BatcherConfig { batch_size: 2, sequence_length: 4, cache_batches: true };
        let mut cached = WindowedBatcher::new(&[index_sequence(100, 5)], vec![Box::new(vocab(5))], &cfg)
            .unwrap();
        let mut plain = WindowedBatcher::new(&[index_sequence(100, 5)], vec![Box::new(vocab(5))], &config(2, 4))
            .unwrap();

        let n = cached.num_batches();
        for _ in 0..2 * n {
            assert_eq!(cached.next_batch().unwrap(), plain.next_batch().unwrap());
        }
        assert_eq!(cached.cached_batches(), n);
    }

    #[test]
    fn test_reset_rewinds_the_cursor() {
        let mut b = WindowedBatcher::new(&[index_sequence(100, 5)], vec![Box::new(vocab(5))], &config(2, 4))
            .unwrap();
        let first = b.next_batch().unwrap();
        b.next_batch().unwrap();
        b.reset();
        assert_eq!(b.next_batch().unwrap(), first);
    }

    #[test]
    fn test_parallel_sources_are_stacked_and_target_uses_primary_vocab() {
        let chars    = index_sequence(40, 3);
        let features = NumberSequence::from_rows(2, (0..80).map(|i| i as f32).collect()).unwrap();
        let encodings: Vec<Box<dyn Encoding>> =
            vec![Box::new(vocab(3)), Box::new(IdentityEncoding::new(2))];

        let mut b = WindowedBatcher::new(&[chars.clone(), features], encodings, &config(2, 3)).unwrap();
        assert_eq!(b.input_dim(), 5);
        assert_eq!(b.target_dim(), 3);

        let batch = b.next_batch().unwrap();
        // step 0 of item 0 is corpus row 0: one-hot of chars[0] then features [0, 1]
        let row = batch.input_at(0, 0);
        assert_eq!(argmax(&row[..3]), chars.indices().unwrap()[0]);
        assert_eq!(&row[3..], &[0.0, 1.0]);
        assert_eq!(batch.target_at(0, 0).len(), 3);
    }

    #[test]
    fn test_misaligned_inputs_are_rejected() {
        let cfg = config(2, 3);
        let no_encoding = WindowedBatcher::new(&[index_sequence(40, 3)], vec![], &cfg);
        assert!(matches!(no_encoding.err(), Some(CharnetError::Misaligned(_))));

        let ragged = WindowedBatcher::new(
            &[index_sequence(40, 3), index_sequence(39, 3)],
            vec![Box::new(vocab(3)), Box::new(vocab(3))],
            &cfg,
        );
        assert!(matches!(ragged.err(), Some(CharnetError::Misaligned(_))));

        let wrong_width = WindowedBatcher::new(
            &[NumberSequence::from_rows(2, vec![0.0; 80]).unwrap()],
            vec![Box::new(vocab(3))],
            &cfg,
        );
        assert!(matches!(wrong_width.err(), Some(CharnetError::Misaligned(_))));
    }

    #[test]
    fn test_zero_sized_shapes_are_rejected() {
        let b = WindowedBatcher::new(&[index_sequence(40, 3)], vec![Box::new(vocab(3))], &config(0, 3));
        assert!(matches!(b.err(), Some(CharnetError::InvalidShape(_))));
    }

    #[test]
    fn test_out_of_vocabulary_values_surface_on_expansion() {
        let seq = NumberSequence::from_indices([0, 1, 2, 7, 1, 0, 2, 1, 0, 1]);
        let mut b = WindowedBatcher::new(&[seq], vec![Box::new(vocab(3))], &config(1, 4)).unwrap();
        assert!(matches!(
            b.next_batch(),
            Err(CharnetError::IndexOutOfRange { index: 7, vocab_size: 3 })
        ));
    }
}
