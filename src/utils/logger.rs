//! Per-epoch training log.
//!
//! Writes one CSV row per epoch and echoes a progress line to stdout.
//!
//! ## CSV Format
//!
//! - `epoch`: 1-based epoch number
//! - `train_loss`: mean batch loss over the epoch
//! - `test_accuracy`: fraction of correct predictions, empty when no test set
//! - `seconds`: time since the logger was created

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

const HEADER: &str = "epoch,train_loss,test_accuracy,seconds";

/// Training logger writing to any sink, a buffered file by default.
///
/// # Example
///
/// ```
/// use nn_autodiff::utils::TrainingLogger;
///
/// let mut logger = TrainingLogger::from_writer(Vec::new()).unwrap();
/// logger.log_epoch(1, 0.25, Some(0.9)).unwrap();
/// let csv = String::from_utf8(logger.into_inner().unwrap()).unwrap();
/// assert!(csv.starts_with("epoch,train_loss,test_accuracy,seconds\n1,0.250000,0.9000,"));
/// ```
pub struct TrainingLogger<W: Write = BufWriter<File>> {
    writer: W,
    start_time: Instant,
    last_log_time: Instant,
}

impl TrainingLogger<BufWriter<File>> {
    /// Create the log file (and its parent directory) and write the header.
    pub fn new<P: AsRef<Path>>(log_path: P) -> io::Result<Self> {
        let log_path = log_path.as_ref();
        if let Some(parent) = log_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Self::from_writer(BufWriter::new(File::create(log_path)?))
    }
}

impl<W: Write> TrainingLogger<W> {
    pub fn from_writer(mut writer: W) -> io::Result<Self> {
        writeln!(writer, "{}", HEADER)?;
        let now = Instant::now();
        Ok(Self {
            writer,
            start_time: now,
            last_log_time: now,
        })
    }

    /// Record one finished epoch.
    ///
    /// The row is flushed immediately so a crashed run keeps its history.
    pub fn log_epoch(
        &mut self,
        epoch: usize,
        train_loss: f32,
        test_accuracy: Option<f32>,
    ) -> io::Result<()> {
        let elapsed = self.start_time.elapsed().as_secs_f32();
        let accuracy = test_accuracy
            .map(|a| format!("{:.4}", a))
            .unwrap_or_default();

        writeln!(
            self.writer,
            "{},{:.6},{},{:.3}",
            epoch, train_loss, accuracy, elapsed
        )?;
        self.writer.flush()?;

        let epoch_time = self.last_log_time.elapsed().as_secs_f32();
        match test_accuracy {
            Some(a) => println!(
                "Epoch {:3} | Loss: {:.6} | Test Accuracy: {:.2}% | Time: {:.2}s",
                epoch,
                train_loss,
                a * 100.0,
                epoch_time
            ),
            None => println!(
                "Epoch {:3} | Loss: {:.6} | Time: {:.2}s",
                epoch, train_loss, epoch_time
            ),
        }

        self.last_log_time = Instant::now();
        Ok(())
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(mut self) -> io::Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_accuracy_leaves_column_empty() {
        let mut logger = TrainingLogger::from_writer(Vec::new()).unwrap();
        logger.log_epoch(3, 1.5, None).unwrap();
        let csv = String::from_utf8(logger.into_inner().unwrap()).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.starts_with("3,1.500000,,"), "{}", row);
    }

    #[test]
    fn test_file_logger_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("loss.csv");

        let mut logger = TrainingLogger::new(&path).unwrap();
        logger.log_epoch(1, 0.5, Some(0.5)).unwrap();
        logger.log_epoch(2, 0.25, Some(0.75)).unwrap();
        drop(logger);

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], HEADER);
        assert!(lines[2].starts_with("2,0.250000,0.7500,"));
    }
}
