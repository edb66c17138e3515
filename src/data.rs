//! MNIST-style CSV dataset and batch iteration.
//!
//! The source is text with one header row followed by rows of
//! `label,pixel_0,...,pixel_N` integers. Pixels are scaled by `1/256` and
//! labels are one-hot encoded over [`NUM_CLASSES`] classes.

use crate::error::{NnError, Result};
use crate::tensor::{Matrix, Tensor};
use ndarray::{Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Number of label classes.
pub const NUM_CLASSES: usize = 10;

/// Pixel scaling divisor.
const PIXEL_SCALE: f32 = 256.0;

/// One mini-batch: `input` is `[batch, features]`, `target` is `[batch, 10]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub input: Tensor,
    pub target: Tensor,
}

/// In-memory dataset with fixed-size batching.
///
/// Loading is all-or-nothing: a malformed row aborts with
/// [`NnError::MalformedRow`] and nothing is returned.
///
/// # Example
///
/// ```
/// use nn_autodiff::data::MnistDataset;
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let csv = "label,p0,p1\n3,0,128\n7,255,64\n1,16,16\n";
/// let mut rng = StdRng::seed_from_u64(0);
/// let mut dataset = MnistDataset::from_reader(csv.as_bytes(), 2, false, &mut rng).unwrap();
///
/// assert_eq!(dataset.num_samples(), 3);
/// assert_eq!(dataset.len(), 1);
///
/// let batch = dataset.batches().next().unwrap();
/// assert_eq!(batch.input.shape(), &[2, 2]);
/// assert_eq!(batch.input[[0, 1]], 0.5);
/// assert_eq!(batch.target[[0, 3]], 1.0);
/// ```
#[derive(Debug)]
pub struct MnistDataset {
    images: Matrix,
    labels: Matrix,
    batch_size: usize,
    shuffle: bool,
    rng: StdRng,
}

impl MnistDataset {
    /// Load a dataset from a CSV file.
    pub fn from_csv<P: AsRef<Path>, R: Rng + ?Sized>(
        path: P,
        batch_size: usize,
        shuffle: bool,
        rng: &mut R,
    ) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), batch_size, shuffle, rng)
    }

    /// Load a dataset from any buffered text source.
    ///
    /// The shuffle generator is forked from `rng`, so two datasets built from
    /// identically seeded handles iterate in the same order.
    pub fn from_reader<B: BufRead, R: Rng + ?Sized>(
        reader: B,
        batch_size: usize,
        shuffle: bool,
        rng: &mut R,
    ) -> Result<Self> {
        if batch_size == 0 {
            return Err(NnError::InvalidConfig(
                "batch_size must be greater than 0".to_string(),
            ));
        }

        let mut columns: Option<usize> = None;
        let mut pixels: Vec<f32> = Vec::new();
        let mut labels: Vec<usize> = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line_number = index + 1;
            let line = line.map_err(|err| match err.kind() {
                io::ErrorKind::InvalidData => NnError::MalformedRow {
                    line: line_number,
                    reason: "not valid UTF-8".to_string(),
                },
                _ => NnError::Io(err),
            })?;
            let row = line.trim();

            let expected = match columns {
                None => {
                    columns = Some(row.split(',').count());
                    continue;
                }
                Some(expected) => expected,
            };
            if row.is_empty() {
                continue;
            }

            let (label, values) = parse_row(row, expected, line_number)?;
            labels.push(label);
            pixels.extend(values.into_iter().map(|v| v as f32 / PIXEL_SCALE));
        }

        let num_features = columns.map_or(0, |c| c.saturating_sub(1));
        let num_samples = labels.len();

        let images = Array2::from_shape_fn((num_samples, num_features), |(i, j)| {
            pixels[i * num_features + j]
        });
        let mut one_hot = Matrix::zeros((num_samples, NUM_CLASSES));
        for (row, &label) in labels.iter().enumerate() {
            one_hot[[row, label]] = 1.0;
        }

        Ok(Self {
            images,
            labels: one_hot,
            batch_size,
            shuffle,
            rng: StdRng::seed_from_u64(rng.gen()),
        })
    }

    /// Number of full batches. The trailing partial batch is dropped.
    pub fn len(&self) -> usize {
        self.num_samples() / self.batch_size
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn num_samples(&self) -> usize {
        self.images.nrows()
    }

    pub fn num_features(&self) -> usize {
        self.images.ncols()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    /// Iterate over [`MnistDataset::len`] batches.
    ///
    /// With shuffling enabled every call draws a fresh permutation.
    pub fn batches(&mut self) -> Batches<'_> {
        let mut order: Vec<usize> = (0..self.num_samples()).collect();
        if self.shuffle {
            order.shuffle(&mut self.rng);
        }
        Batches {
            dataset: self,
            order,
            next: 0,
        }
    }
}

/// Split one data row into its label and raw pixel values.
fn parse_row(row: &str, expected: usize, line: usize) -> Result<(usize, Vec<i64>)> {
    let fields: Vec<&str> = row.split(',').collect();
    if fields.len() != expected {
        return Err(NnError::MalformedRow {
            line,
            reason: format!("expected {} columns, found {}", expected, fields.len()),
        });
    }

    let mut values = Vec::with_capacity(fields.len());
    for (column, field) in fields.iter().enumerate() {
        let value = field.trim().parse::<i64>().map_err(|_| NnError::MalformedRow {
            line,
            reason: format!("column {} is not an integer: {:?}", column, field),
        })?;
        values.push(value);
    }

    let label = values.remove(0);
    match usize::try_from(label) {
        Ok(label) if label < NUM_CLASSES => Ok((label, values)),
        _ => Err(NnError::MalformedRow {
            line,
            reason: format!("label {} outside 0..{}", label, NUM_CLASSES),
        }),
    }
}

/// Iterator returned by [`MnistDataset::batches`].
pub struct Batches<'a> {
    dataset: &'a MnistDataset,
    order: Vec<usize>,
    next: usize,
}

impl Iterator for Batches<'_> {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        if self.next >= self.dataset.len() {
            return None;
        }
        let size = self.dataset.batch_size;
        let indexes = &self.order[self.next * size..(self.next + 1) * size];
        self.next += 1;

        Some(Batch {
            input: self.dataset.images.select(Axis(0), indexes).into_dyn(),
            target: self.dataset.labels.select(Axis(0), indexes).into_dyn(),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.dataset.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Batches<'_> {}
