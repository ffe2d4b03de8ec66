use std::collections::HashMap;
use std::path::PathBuf;

use yingram::dataset::{DataReader, PairedDataset, Pairing, SpeakerGroups};
use yingram::{io, YingramConfig};

/// A directory of WAV files with an in-memory transcript table, the shape a
/// real corpus reader takes.
#[derive(Clone)]
struct WavDirReader {
    dir: PathBuf,
    table: HashMap<String, (u32, String)>,
    order: Vec<String>,
}

impl WavDirReader {
    fn synth(dir: PathBuf, layout: &[(u32, usize)]) -> Self {
        let mut table = HashMap::new();
        let mut order = Vec::new();
        for &(speaker, count) in layout {
            for k in 0..count {
                let id = format!("{:03}_{:02}", speaker, k);
                // Distinct length and pitch per record.
                let freq = 110.0 + 10.0 * k as f32;
                let signal = io::tone(freq, 16000, 0.05 + 0.01 * k as f32);
                io::save_wav(dir.join(format!("{}.wav", id)), &signal, 16000).unwrap();
                table.insert(id.clone(), (speaker, format!("utterance {}", k)));
                order.push(id);
            }
        }
        Self { dir, table, order }
    }
}

impl DataReader for WavDirReader {
    fn record_ids(&self) -> Vec<String> {
        self.order.clone()
    }

    fn lookup(&self, id: &str) -> Option<(u32, String)> {
        self.table.get(id).cloned()
    }

    fn audio(&self, id: &str) -> yingram::Result<(Vec<f32>, u32)> {
        io::load_wav(self.dir.join(format!("{}.wav", id)))
    }
}

#[test]
fn odd_speaker_group_is_fully_covered() {
    let dir = tempfile::tempdir().unwrap();
    let reader = WavDirReader::synth(dir.path().to_path_buf(), &[(1, 3), (2, 4)]);
    let groups = SpeakerGroups::from_reader(&reader);
    let pairing = Pairing::random(&groups, Some(11));

    // 3 records -> 2 pairs (one duplicate), 4 records -> 2 pairs.
    assert_eq!(pairing.len(), 4);

    let mut seen: HashMap<&str, usize> = HashMap::new();
    for pair in pairing.iter() {
        *seen.entry(pair.first.as_str()).or_default() += 1;
        *seen.entry(pair.second.as_str()).or_default() += 1;
    }
    for id in reader.record_ids() {
        assert!(
            seen.get(id.as_str()).copied().unwrap_or(0) >= 1,
            "record {} was dropped from the pairing",
            id
        );
    }
}

#[test]
fn reseeding_reproduces_the_same_pairs() {
    let dir = tempfile::tempdir().unwrap();
    let reader = WavDirReader::synth(dir.path().to_path_buf(), &[(1, 5), (2, 2), (3, 7)]);
    let mut ds = PairedDataset::new(reader);

    ds.reseed(Some(99));
    let first: Vec<_> = ds.pairing().iter().cloned().collect();
    ds.reseed(Some(99));
    let second: Vec<_> = ds.pairing().iter().cloned().collect();
    assert_eq!(first, second);
}

#[test]
fn split_gives_disjoint_speaker_views() {
    let dir = tempfile::tempdir().unwrap();
    let reader = WavDirReader::synth(
        dir.path().to_path_buf(),
        &[(1, 2), (2, 2), (3, 2), (4, 2), (5, 2)],
    );
    let mut train = PairedDataset::with_seed(reader, Some(0));
    let valid = train.split(3);

    assert_eq!(train.groups().num_speakers(), 3);
    assert_eq!(valid.groups().num_speakers(), 2);

    let train_speakers: Vec<u32> = train.groups().iter().map(|(s, _)| s).collect();
    let valid_speakers: Vec<u32> = valid.groups().iter().map(|(s, _)| s).collect();
    for s in &train_speakers {
        assert!(!valid_speakers.contains(s));
    }
}

#[test]
fn collated_batch_feeds_the_extractor() {
    let dir = tempfile::tempdir().unwrap();
    let reader = WavDirReader::synth(dir.path().to_path_buf(), &[(1, 4), (2, 4)]);
    let mut ds = PairedDataset::new(reader);
    ds.reseed(Some(7));

    let batch = ds.batch(0..4).unwrap();
    assert_eq!(batch.speakers.len(), 4);
    assert_eq!(batch.lengths.shape(), &[4, 2]);

    // Lengths are the unpadded sample counts; padding is zero.
    for b in 0..4 {
        let len = batch.lengths[(b, 0)];
        assert!(len <= batch.speech1.ncols());
        for i in len..batch.speech1.ncols() {
            assert_eq!(batch.speech1[(b, i)], 0.0);
        }
    }

    // The padded batch runs through the extractor as-is.
    let ying = YingramConfig::new(16000).with_strides(160).build().unwrap();
    let gram = ying.compute(batch.speech1.view()).unwrap();
    assert_eq!(
        gram.shape(),
        &[4, batch.speech1.ncols() / 160 + 1, ying.n_bins()]
    );
}
