use anyhow::{ensure, Context, Result};
use posture_features::{
    annotation::{PostureClass, CLASS_COLUMN, FILE_PATH_COLUMN},
    ConfusionMatrix, PipelineConfig, Table,
};
use std::{
    fs,
    path::{Path, PathBuf},
};
use structopt::StructOpt;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;

#[derive(structopt::StructOpt)]
enum Command {
    /// Turn an annotation table into a feature table
    Preprocess {
        /// Annotation table in delimited text format.
        #[structopt(short, long)]
        input: PathBuf,

        /// Where to write the feature table.
        #[structopt(short, long)]
        output: PathBuf,

        #[structopt(flatten)]
        pipeline: PipelineConfig,
    },
    /// Compare classifier predictions with the labels of an annotation table
    Evaluate {
        /// Labelled annotation table in delimited text format.
        #[structopt(short, long)]
        input: PathBuf,

        /// Predicted label codes, one per line: 0 = not_correct, 1 = correct.
        #[structopt(short, long)]
        predictions: PathBuf,
    },
}

#[derive(structopt::StructOpt)]
struct Opt {
    #[structopt(short, long, default_value = "info", env = "RUST_LOG")]
    log_level: tracing_subscriber::filter::EnvFilter,

    #[structopt(subcommand)]
    command: Command,
}

fn preprocess(input: &Path, output: &Path, config: &PipelineConfig) -> Result<()> {
    let pipeline = config.build().context("failed building pipeline")?;
    let annotations = Table::read_path(input).context("failed reading annotations")?;
    info!(
        message = "read annotations",
        rows = annotations.len(),
        frame = %config.frame,
        reference_point = %config.reference_point
    );

    let features = pipeline
        .run(&annotations)
        .context("failed running preprocessing pipeline")?;
    features
        .write_path(output)
        .context("failed writing feature table")?;

    info!(
        message = "wrote features",
        rows = features.len(),
        columns = features.columns().len()
    );
    Ok(())
}

fn read_predictions(path: &Path) -> Result<Vec<PostureClass>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed reading predictions from {}", path.display()))?;
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(i, line)| -> Result<PostureClass> {
            let code = line
                .parse::<i64>()
                .with_context(|| format!("invalid label code {:?} on line {}", line, i + 1))?;
            Ok(PostureClass::from_code(code)?)
        })
        .collect()
}

fn evaluate(input: &Path, predictions: &Path) -> Result<()> {
    let annotations = Table::read_path(input).context("failed reading annotations")?;
    let labels = annotations
        .text_column(CLASS_COLUMN)?
        .into_iter()
        .map(str::parse)
        .collect::<Result<Vec<PostureClass>, _>>()
        .context("annotation table holds unlabelled rows")?;
    let predictions = read_predictions(predictions)?;
    ensure!(
        labels.len() == predictions.len(),
        "got {} predictions for {} annotations",
        predictions.len(),
        labels.len()
    );

    let matrix = ConfusionMatrix::new(&labels, &predictions)?;
    println!("Confusion matrix (rows: label, columns: prediction)\n{}", matrix);
    if let Some(accuracy) = matrix.accuracy() {
        println!("Accuracy = {:.2}", accuracy);
    }

    let file_paths = annotations.text_column(FILE_PATH_COLUMN)?;
    for &index in matrix.misclassified() {
        println!(
            "{}: was {}, should be {}",
            file_paths[index], predictions[index], labels[index]
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    let opt = Opt::from_args();

    tracing::subscriber::set_global_default(
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(opt.log_level),
    )?;

    match opt.command {
        Command::Preprocess {
            input,
            output,
            pipeline,
        } => preprocess(&input, &output, &pipeline),
        Command::Evaluate { input, predictions } => evaluate(&input, &predictions),
    }
}
