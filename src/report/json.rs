use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::report::CurveReporter;

/// On-disk layout written by `JsonCurveReporter`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveSeries {
    pub train_loss: Vec<f64>,
    pub test_loss: Vec<f64>,
    pub train_accuracy: Vec<f64>,
    pub test_accuracy: Vec<f64>,
}

/// Writes the series as pretty-printed JSON.
pub struct JsonCurveReporter {
    path: PathBuf,
}

impl JsonCurveReporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonCurveReporter { path: path.into() }
    }

    pub fn load(path: &std::path::Path) -> Result<CurveSeries> {
        let reader = std::io::BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

impl CurveReporter for JsonCurveReporter {
    fn render(
        &mut self,
        train_loss: &[f64],
        test_loss: &[f64],
        train_accuracy: &[f64],
        test_accuracy: &[f64],
    ) -> Result<()> {
        let series = CurveSeries {
            train_loss: train_loss.to_vec(),
            test_loss: test_loss.to_vec(),
            train_accuracy: train_accuracy.to_vec(),
            test_accuracy: test_accuracy.to_vec(),
        };
        let writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(writer, &series)?;
        log::info!("Wrote learning curves to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_and_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curves.json");
        let mut reporter = JsonCurveReporter::new(&path);
        reporter.render(&[1.0, 0.5], &[1.1, 0.7], &[40.0, 70.0], &[38.0, 65.0]).unwrap();

        let back = JsonCurveReporter::load(&path).unwrap();
        assert_eq!(back.train_loss, vec![1.0, 0.5]);
        assert_eq!(back.test_accuracy, vec![38.0, 65.0]);
    }

    #[test]
    fn test_reloads_series_bit_for_bit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curves.json");
        let accuracy: Vec<f64> = (1..=27).map(|c| 100.0 * c as f64 / 27.0).collect();
        let loss: Vec<f64> = (1..=27).map(|i| 1.0 / (i as f64 * 3.0) + 0.1).collect();
        JsonCurveReporter::new(&path).render(&loss, &loss, &accuracy, &accuracy).unwrap();

        let back = JsonCurveReporter::load(&path).unwrap();
        let bits = |v: &[f64]| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&back.test_accuracy), bits(&accuracy));
        assert_eq!(bits(&back.train_loss), bits(&loss));
    }
}
