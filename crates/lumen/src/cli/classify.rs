//! The `lumen classify` command - the sample client for the pipeline.

use clap::Args;
use lumen_core::{Config, ImageInput, Lumen};

/// Arguments for the `classify` command.
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Image to classify: a file path, an http(s) URL, or base64 text
    /// (optionally with a data: header)
    pub input: String,

    /// Comma-separated labels to classify against
    #[arg(long, value_delimiter = ',', required = true)]
    pub labels: Vec<String>,

    /// Model identifier (defaults to the configured model)
    #[arg(long)]
    pub model: Option<String>,

    /// Pretty-print the JSON result
    #[arg(long)]
    pub pretty: bool,
}

/// Execute the classify command.
pub async fn execute(args: ClassifyArgs, config: Config) -> anyhow::Result<()> {
    let lumen = Lumen::new(config)?;
    let input = ImageInput::from_text(&args.input);
    tracing::debug!("Input classified as {} variant", input.kind());

    let result = match &args.model {
        Some(model_id) => {
            lumen
                .classify_with_model(input, &args.labels, model_id)
                .await?
        }
        None => lumen.classify(input, &args.labels).await?,
    };

    let json = if args.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{}", json);

    Ok(())
}
