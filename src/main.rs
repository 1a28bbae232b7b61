//! Descenso CLI
//!
//! Runs the two reference trainers from the command line.
//!
//! ```bash
//! # Linear regression on the synthesized reference dataset
//! descenso linear
//!
//! # Linear regression on a CSV, with a loss plot
//! descenso linear --csv points.csv --x height --y weight --plot loss.svg
//!
//! # Softmax regression on a labeled CSV with feature scaling
//! descenso softmax --csv iris.csv --label species --scale
//! ```

use clap::Parser;
use descenso::cli::{Cli, Command, LinearArgs, SoftmaxArgs};
use descenso::data::{one_hot, CsvTable, LabelEncoder, StandardScaler};
use descenso::model::{FitConfig, LinearRegression, SoftmaxRegression};
use descenso::plot::plot_loss_curve;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Linear(args) => run_linear(args),
        Command::Softmax(args) => run_softmax(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Reference dataset: 1000 samples of y = 0.96x + 0.24 with x uniform in [0, 1)
fn synthesize_line(seed: u64) -> (Vec<f32>, Vec<f32>) {
    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(100));
    let x: Vec<f32> = (0..1000).map(|_| rng.random_range(0.0..1.0)).collect();
    let y: Vec<f32> = x.iter().map(|&v| 0.96 * v + 0.24).collect();
    (x, y)
}

/// Three jittered 2-D clusters with string labels
fn synthesize_clusters(seed: u64) -> (Vec<f32>, usize, Vec<String>) {
    let centers = [(0.0, 0.0, "blue"), (4.0, 4.0, "green"), (0.0, 5.0, "red")];
    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(100));

    let mut features = Vec::new();
    let mut labels = Vec::new();
    for _ in 0..50 {
        for (cx, cy, name) in centers {
            features.push(cx + rng.random_range(-1.0..1.0));
            features.push(cy + rng.random_range(-1.0..1.0));
            labels.push(name.to_string());
        }
    }
    (features, 2, labels)
}

fn run_linear(args: LinearArgs) -> descenso::Result<()> {
    let (x, y) = match &args.csv {
        Some(path) => {
            let table = CsvTable::read(path)?;
            (
                table.numeric_column(&args.x)?,
                table.numeric_column(&args.y)?,
            )
        }
        None => synthesize_line(args.seed),
    };

    println!("Training linear regression on {} samples", x.len());

    let config = FitConfig::new()
        .with_epochs(args.epochs)
        .with_lr(args.lr)
        .with_log_interval(args.log_interval);

    let mut model = LinearRegression::new(args.seed);
    let result = model.fit(&x, &y, &config)?;

    println!(
        "Finished {} epochs in {:.1}s: loss {:.4}",
        result.final_epoch, result.elapsed_secs, result.final_loss
    );
    println!(
        "slope: {:.3}, intercept: {:.3}",
        model.slope(),
        model.intercept()
    );

    if let Some(path) = &args.plot {
        plot_loss_curve(model.loss_history(), path, "Linear regression loss")?;
        println!("Loss curve written to {}", path.display());
    }
    if let Some(path) = &args.save {
        model.to_state().save_json(path)?;
        println!("Parameters saved to {}", path.display());
    }

    Ok(())
}

fn run_softmax(args: SoftmaxArgs) -> descenso::Result<()> {
    let (features, n_features, labels) = match &args.csv {
        Some(path) => {
            let table = CsvTable::read(path)?;
            let (features, n_features, _) = table.numeric_features_except(&args.label)?;
            (features, n_features, table.string_column(&args.label)?)
        }
        None => synthesize_clusters(args.seed),
    };

    let features = if args.scale {
        StandardScaler::fit_transform(&features, n_features)?
    } else {
        features
    };

    let mut encoder = LabelEncoder::new();
    let indices = encoder.fit_transform(&labels)?;
    let targets = one_hot(&indices, encoder.n_classes())?;

    println!(
        "Training softmax regression on {} samples ({} features, {} classes)",
        labels.len(),
        n_features,
        encoder.n_classes()
    );

    let config = FitConfig::new()
        .with_epochs(args.epochs)
        .with_lr(args.lr)
        .with_log_interval(args.log_interval);

    let mut model = SoftmaxRegression::new(n_features, encoder.n_classes(), args.seed);
    let result = model.fit(&features, &targets, &config)?;

    println!(
        "Finished {} epochs in {:.1}s: loss {:.4}",
        result.final_epoch, result.elapsed_secs, result.final_loss
    );
    let accuracy = model.accuracy(&features, &indices)?;
    println!("Training accuracy: {:.2}", accuracy);

    if let Some(path) = &args.plot {
        plot_loss_curve(model.loss_history(), path, "Softmax regression loss")?;
        println!("Loss curve written to {}", path.display());
    }
    if let Some(path) = &args.save {
        model.to_state().save_json(path)?;
        println!("Parameters saved to {}", path.display());
    }

    Ok(())
}
