//! Seeded, class-separable toy data.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::data::in_memory::Dataset;
use crate::math::matrix::Matrix;

/// `samples_per_class` points per class, each class a Gaussian blob of
/// standard deviation `spread` around its own random centre in `[-1, 1]^dim`.
/// Samples are interleaved by class.
pub fn gaussian_blobs(
    num_classes: usize,
    samples_per_class: usize,
    dim: usize,
    spread: f64,
    seed: u64,
) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let centres: Vec<Vec<f64>> = (0..num_classes)
        .map(|_| (0..dim).map(|_| rng.gen_range(-1.0..1.0)).collect())
        .collect();

    let mut ds = Dataset::default();
    for _ in 0..samples_per_class {
        for (class, centre) in centres.iter().enumerate() {
            ds.inputs.push(
                centre.iter()
                    .map(|c| c + spread * Matrix::sample_standard_normal(&mut rng))
                    .collect(),
            );
            ds.labels.push(class);
        }
    }
    ds
}
