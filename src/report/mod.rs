pub mod json;
pub mod png;

pub use json::JsonCurveReporter;
pub use png::PngCurveReporter;

use crate::error::Result;
use crate::train::history::History;

/// Consumes the finished learning curves.
pub trait CurveReporter {
    fn render(
        &mut self,
        train_loss: &[f64],
        test_loss: &[f64],
        train_accuracy: &[f64],
        test_accuracy: &[f64],
    ) -> Result<()>;
}

/// Feeds the four series of `history` to `reporter`.
pub fn render_history<R: CurveReporter + ?Sized>(reporter: &mut R, history: &History) -> Result<()> {
    reporter.render(
        history.train_loss(),
        history.test_loss(),
        history.train_accuracy(),
        history.test_accuracy(),
    )
}
