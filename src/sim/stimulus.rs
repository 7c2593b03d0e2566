//! Sources of input patterns for the [`Simulator`](super::Simulator).
//!
//! A source yields [`Batch`]es of up to [`PATTERN_WIDTH`] patterns, one word per input.
//! Running out of patterns is signaled by `Ok(None)`, it is not an error.

use std::{collections::VecDeque, io::BufRead};

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::{ParserError, Result};

use super::PATTERN_WIDTH;

/// All-ones on the `len` lowest lanes.
pub(crate) fn lane_mask(len: usize) -> u32 {
    if len >= PATTERN_WIDTH {
        u32::MAX
    } else {
        (1u32 << len) - 1
    }
}

/// Up to 32 input patterns packed in parallel.
///
/// `words[i]` holds the values of input `i`, bit `k` being its value in pattern `k`.
/// Only the `len` lowest lanes are meaningful, the others are zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    words: Vec<u32>,
    len: usize,
}

impl Batch {
    /// Packs the given words, the lanes above `len` being cleared.
    pub fn new(mut words: Vec<u32>, len: usize) -> Self {
        let len = len.min(PATTERN_WIDTH);
        let mask = lane_mask(len);
        words.iter_mut().for_each(|w| *w &= mask);
        Batch { words, len }
    }

    /// Packs up to 32 patterns given as one boolean per input.
    pub fn from_patterns(num_inputs: usize, patterns: &[Vec<bool>]) -> Self {
        let mut words = vec![0u32; num_inputs];
        for (lane, pattern) in patterns.iter().take(PATTERN_WIDTH).enumerate() {
            for (word, &bit) in words.iter_mut().zip(pattern) {
                if bit {
                    *word |= 1 << lane;
                }
            }
        }
        Batch::new(words, patterns.len())
    }

    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Number of valid patterns.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// A source of input patterns.
pub trait Stimulus {
    /// Next batch for a circuit with `num_inputs` inputs, `None` once the source is exhausted.
    fn next_batch(&mut self, num_inputs: usize) -> Result<Option<Batch>>;
}

/// A fixed number of uniformly random patterns.
pub struct RandomStimulus<R: Rng> {
    rng: R,
    remaining: usize,
}

impl<R: Rng> RandomStimulus<R> {
    pub fn new(rng: R, patterns: usize) -> Self {
        RandomStimulus {
            rng,
            remaining: patterns,
        }
    }
}

impl RandomStimulus<Xoshiro256PlusPlus> {
    /// Reproducible random patterns.
    pub fn from_seed(seed: u64, patterns: usize) -> Self {
        RandomStimulus::new(Xoshiro256PlusPlus::seed_from_u64(seed), patterns)
    }
}

impl<R: Rng> Stimulus for RandomStimulus<R> {
    fn next_batch(&mut self, num_inputs: usize) -> Result<Option<Batch>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        let len = self.remaining.min(PATTERN_WIDTH);
        self.remaining -= len;
        let words = (0..num_inputs).map(|_| self.rng.next_u32()).collect();
        Ok(Some(Batch::new(words, len)))
    }
}

/// Every assignment of the inputs, in increasing order (input `i` is bit `i` of the pattern index).
#[derive(Debug, Clone)]
pub struct ExhaustiveStimulus {
    next: u64,
    total: u64,
}

impl ExhaustiveStimulus {
    /// `num_inputs` must be small enough for `2^num_inputs` to fit a `u64`.
    pub fn new(num_inputs: usize) -> Self {
        ExhaustiveStimulus {
            next: 0,
            total: 1u64 << num_inputs.min(63),
        }
    }

    /// Number of patterns of the whole session.
    pub fn total(&self) -> u64 {
        self.total
    }
}

impl Stimulus for ExhaustiveStimulus {
    fn next_batch(&mut self, num_inputs: usize) -> Result<Option<Batch>> {
        if self.next >= self.total {
            return Ok(None);
        }
        let len = (self.total - self.next).min(PATTERN_WIDTH as u64) as usize;
        let mut words = vec![0u32; num_inputs];
        for lane in 0..len {
            let pattern = self.next + lane as u64;
            for (i, word) in words.iter_mut().enumerate() {
                if i < 64 && (pattern >> i) & 1 == 1 {
                    *word |= 1 << lane;
                }
            }
        }
        self.next += len as u64;
        Ok(Some(Batch::new(words, len)))
    }
}

/// Patterns read from a text source: whitespace separated tokens made of `0` and `1`,
/// one token per pattern and one character per input.
pub struct PatternStimulus<R: BufRead> {
    reader: R,
    tokens: VecDeque<String>,
    /// Line number, for error messages.
    line: usize,
}

impl<R: BufRead> PatternStimulus<R> {
    pub fn new(reader: R) -> Self {
        PatternStimulus {
            reader,
            tokens: VecDeque::new(),
            line: 0,
        }
    }

    /// Next token, reading more lines if needed.
    fn next_token(&mut self) -> Result<Option<String>> {
        while self.tokens.is_empty() {
            let mut buf = String::new();
            if self.reader.read_line(&mut buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;
            self.tokens
                .extend(buf.split_whitespace().map(str::to_string));
        }
        Ok(self.tokens.pop_front())
    }
}

impl<R: BufRead> Stimulus for PatternStimulus<R> {
    fn next_batch(&mut self, num_inputs: usize) -> Result<Option<Batch>> {
        let mut words = vec![0u32; num_inputs];
        let mut len = 0;
        while len < PATTERN_WIDTH {
            let Some(token) = self.next_token()? else {
                break;
            };
            if token.len() != num_inputs {
                return Err(ParserError::InvalidPattern(format!(
                    "line {}: pattern {} has length {}, expected {}",
                    self.line,
                    token,
                    token.len(),
                    num_inputs
                ))
                .into());
            }
            for (word, c) in words.iter_mut().zip(token.chars()) {
                match c {
                    '0' => (),
                    '1' => *word |= 1 << len,
                    _ => {
                        return Err(ParserError::InvalidPattern(format!(
                            "line {}: pattern {} contains a non-0/1 character {}",
                            self.line, token, c
                        ))
                        .into());
                    }
                }
            }
            len += 1;
        }

        if len == 0 {
            Ok(None)
        } else {
            Ok(Some(Batch::new(words, len)))
        }
    }
}
