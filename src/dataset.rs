//! Paired-speaker dataset utilities.
//!
//! Records are grouped by speaker and paired at random within each group;
//! a pairing is an explicit snapshot derived from `(grouping, seed)`, so
//! the same seed always reproduces the same pairs. Batches collate pairs
//! into right-zero-padded arrays for downstream training.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashMap;
use std::ops::Range;

/// Source of records for pairing: enumerable identifiers, a speaker and
/// transcript per identifier, and raw audio access.
///
/// Implementations own the storage layout (a directory of WAV files, an
/// in-memory table, a dump); see [`crate::io::load_wav`] for the provided
/// audio building block.
pub trait DataReader {
    /// All record identifiers, in a stable order.
    fn record_ids(&self) -> Vec<String>;

    /// Speaker id and transcript for a record, if it exists.
    fn lookup(&self, id: &str) -> Option<(u32, String)>;

    /// Raw audio samples and sample rate for a record.
    fn audio(&self, id: &str) -> crate::Result<(Vec<f32>, u32)>;
}

/// Records grouped by speaker, in first-seen speaker order.
#[derive(Debug, Clone, Default)]
pub struct SpeakerGroups {
    groups: Vec<(u32, Vec<String>)>,
}

impl SpeakerGroups {
    /// Group every record of `reader` by its speaker id.
    ///
    /// Records whose lookup fails are skipped.
    pub fn from_reader<R: DataReader>(reader: &R) -> Self {
        let mut groups: Vec<(u32, Vec<String>)> = Vec::new();
        let mut index: HashMap<u32, usize> = HashMap::new();
        for id in reader.record_ids() {
            let Some((speaker, _)) = reader.lookup(&id) else {
                continue;
            };
            let slot = *index.entry(speaker).or_insert_with(|| {
                groups.push((speaker, Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push(id);
        }
        Self { groups }
    }

    /// Number of speakers.
    pub fn num_speakers(&self) -> usize {
        self.groups.len()
    }

    /// Total number of records across all speakers.
    pub fn num_records(&self) -> usize {
        self.groups.iter().map(|(_, r)| r.len()).sum()
    }

    /// Iterate `(speaker, records)` groups in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[String])> {
        self.groups.iter().map(|(s, r)| (*s, r.as_slice()))
    }

    /// Split off the first `count` speakers.
    ///
    /// Returns `(head, residual)`, each an independent grouping; `count`
    /// beyond the number of speakers leaves the residual empty.
    pub fn split(&self, count: usize) -> (SpeakerGroups, SpeakerGroups) {
        let cut = count.min(self.groups.len());
        let head = SpeakerGroups {
            groups: self.groups[..cut].to_vec(),
        };
        let tail = SpeakerGroups {
            groups: self.groups[cut..].to_vec(),
        };
        (head, tail)
    }
}

/// One same-speaker pair of record identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    pub speaker: u32,
    pub first: String,
    pub second: String,
}

/// An immutable pairing snapshot over a speaker grouping.
///
/// # Example
/// ```
/// use yingram::dataset::{Pairing, SpeakerGroups};
///
/// let groups = SpeakerGroups::default();
/// let pairing = Pairing::random(&groups, Some(7));
/// assert!(pairing.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Pairing {
    pairs: Vec<Pair>,
}

impl Pairing {
    /// Pair the records of each speaker at random.
    ///
    /// Each speaker's records are shuffled and consumed two at a time. A
    /// group of odd size repeats its first shuffled record so that every
    /// record appears in at least one pair; none are dropped. The same
    /// `seed` always yields the same pairing; `None` seeds from entropy.
    pub fn random(groups: &SpeakerGroups, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let mut pairs = Vec::new();
        for (speaker, records) in groups.iter() {
            if records.is_empty() {
                continue;
            }
            let mut order: Vec<usize> = (0..records.len()).collect();
            order.shuffle(&mut rng);
            if order.len() % 2 == 1 {
                order.push(order[0]);
            }
            for duo in order.chunks(2) {
                pairs.push(Pair {
                    speaker,
                    first: records[duo[0]].clone(),
                    second: records[duo[1]].clone(),
                });
            }
        }
        Self { pairs }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Pair> {
        self.pairs.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pair> {
        self.pairs.iter()
    }
}

/// A collated batch of speech pairs.
///
/// `lengths[(b, 0)]` and `lengths[(b, 1)]` are the unpadded sample counts
/// of row `b` in `speech1` and `speech2`; the speech arrays are right
/// zero-padded to the longest row of their side.
#[derive(Debug, Clone)]
pub struct Batch {
    pub speakers: Vec<u32>,
    pub lengths: Array2<usize>,
    pub speech1: Array2<f32>,
    pub speech2: Array2<f32>,
}

/// Collate `(speaker, speech1, speech2)` tuples into a [`Batch`].
pub fn collate(bunch: &[(u32, Vec<f32>, Vec<f32>)]) -> Batch {
    let batch = bunch.len();
    let mut lengths = Array2::<usize>::zeros((batch, 2));
    for (b, (_, s1, s2)) in bunch.iter().enumerate() {
        lengths[(b, 0)] = s1.len();
        lengths[(b, 1)] = s2.len();
    }
    let max1 = bunch.iter().map(|(_, s, _)| s.len()).max().unwrap_or(0);
    let max2 = bunch.iter().map(|(_, _, s)| s.len()).max().unwrap_or(0);

    let mut speech1 = Array2::<f32>::zeros((batch, max1));
    let mut speech2 = Array2::<f32>::zeros((batch, max2));
    for (b, (_, s1, s2)) in bunch.iter().enumerate() {
        for (i, &x) in s1.iter().enumerate() {
            speech1[(b, i)] = x;
        }
        for (i, &x) in s2.iter().enumerate() {
            speech2[(b, i)] = x;
        }
    }

    Batch {
        speakers: bunch.iter().map(|(s, _, _)| *s).collect(),
        lengths,
        speech1,
        speech2,
    }
}

/// A reader joined with its speaker grouping and a current pairing
/// snapshot.
pub struct PairedDataset<R> {
    reader: R,
    groups: SpeakerGroups,
    pairing: Pairing,
}

impl<R: DataReader> PairedDataset<R> {
    /// Group the reader's records and draw an initial pairing from entropy.
    pub fn new(reader: R) -> Self {
        Self::with_seed(reader, None)
    }

    /// Group the reader's records and draw a deterministic initial pairing.
    pub fn with_seed(reader: R, seed: Option<u64>) -> Self {
        let groups = SpeakerGroups::from_reader(&reader);
        let pairing = Pairing::random(&groups, seed);
        Self {
            reader,
            groups,
            pairing,
        }
    }

    /// Replace the current pairing with a fresh snapshot.
    pub fn reseed(&mut self, seed: Option<u64>) {
        self.pairing = Pairing::random(&self.groups, seed);
    }

    /// Number of pairs in the current pairing.
    pub fn len(&self) -> usize {
        self.pairing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairing.is_empty()
    }

    pub fn groups(&self) -> &SpeakerGroups {
        &self.groups
    }

    pub fn pairing(&self) -> &Pairing {
        &self.pairing
    }

    /// Read the audio of the pair at `index`.
    pub fn get(&self, index: usize) -> crate::Result<(u32, Vec<f32>, Vec<f32>)> {
        let pair = self
            .pairing
            .get(index)
            .ok_or_else(|| crate::Error::InvalidParameter {
                name: "index",
                value: index.to_string(),
                reason: format!("pairing holds {} pairs", self.pairing.len()),
            })?;
        let (speech1, _) = self.reader.audio(&pair.first)?;
        let (speech2, _) = self.reader.audio(&pair.second)?;
        Ok((pair.speaker, speech1, speech2))
    }

    /// Read and collate a contiguous range of pairs.
    pub fn batch(&self, range: Range<usize>) -> crate::Result<Batch> {
        let mut bunch = Vec::with_capacity(range.len());
        for index in range {
            bunch.push(self.get(index)?);
        }
        Ok(collate(&bunch))
    }
}

impl<R: DataReader + Clone> PairedDataset<R> {
    /// Split off the first `count` speakers into this dataset, returning
    /// the residual speakers as a new dataset. Both halves are re-paired
    /// from entropy; call [`reseed`](Self::reseed) for determinism.
    pub fn split(&mut self, count: usize) -> PairedDataset<R> {
        let (head, tail) = self.groups.split(count);
        self.groups = head;
        self.pairing = Pairing::random(&self.groups, None);
        let pairing = Pairing::random(&tail, None);
        PairedDataset {
            reader: self.reader.clone(),
            groups: tail,
            pairing,
        }
    }
}
