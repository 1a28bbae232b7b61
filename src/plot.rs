//! Loss-curve rendering

use crate::{Error, Result};
use plotters::prelude::*;
use std::path::Path;

/// Render the per-epoch loss history as an SVG line chart
///
/// The x axis is the epoch index, the y axis the recorded loss. Fails with
/// [`Error::EmptyBatch`] when the history holds no epochs.
pub fn plot_loss_curve(losses: &[f32], path: impl AsRef<Path>, title: &str) -> Result<()> {
    if losses.is_empty() {
        return Err(Error::EmptyBatch);
    }

    let max_loss = losses.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let min_loss = losses.iter().cloned().fold(f32::INFINITY, f32::min);
    if !max_loss.is_finite() || !min_loss.is_finite() {
        return Err(Error::Plot("loss history holds non-finite values".to_string()));
    }
    let pad = ((max_loss - min_loss) * 0.05).max(1e-6);

    let root = SVGBackend::new(path.as_ref(), (800, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| Error::Plot(e.to_string()))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0usize..losses.len(), (min_loss - pad)..(max_loss + pad))
        .map_err(|e| Error::Plot(e.to_string()))?;

    chart
        .configure_mesh()
        .x_desc("epoch")
        .y_desc("loss")
        .draw()
        .map_err(|e| Error::Plot(e.to_string()))?;

    chart
        .draw_series(LineSeries::new(
            losses.iter().enumerate().map(|(i, &loss)| (i, loss)),
            &BLUE,
        ))
        .map_err(|e| Error::Plot(e.to_string()))?;

    root.present().map_err(|e| Error::Plot(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plot_writes_svg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loss.svg");

        let losses: Vec<f32> = (0..50).map(|i| 1.0 / (i as f32 + 1.0)).collect();
        plot_loss_curve(&losses, &path, "training loss").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<svg"));
    }

    #[test]
    fn test_plot_empty_history() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loss.svg");

        let result = plot_loss_curve(&[], &path, "training loss");
        assert!(matches!(result, Err(Error::EmptyBatch)));
    }

    #[test]
    fn test_plot_single_epoch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loss.svg");

        plot_loss_curve(&[0.5], &path, "training loss").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_plot_rejects_non_finite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loss.svg");

        let result = plot_loss_curve(&[0.5, f32::NAN], &path, "training loss");
        assert!(matches!(result, Err(Error::Plot(_))));
    }
}
