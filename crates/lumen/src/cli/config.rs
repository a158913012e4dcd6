//! The `lumen config` command for configuration and model-directory
//! management.

use std::path::Path;

use clap::{Args, Subcommand};
use lumen_core::{ClipOnnxProvider, Config};

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display current configuration and model file status
    Show,

    /// Show config file and model directory paths
    Path,

    /// Initialize a config file with defaults and create the model directory
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Execute the config command.
pub async fn execute(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let config = Config::load()?;
            println!("{}", config.to_toml()?);
            print!("{}", model_report(&config.model_dir(), &config.embedding.model));
        }

        ConfigCommand::Path => {
            let config = Config::load()?;
            println!("config:    {}", Config::default_path().display());
            println!("model dir: {}", config.model_dir().display());
        }

        ConfigCommand::Init { force } => {
            let path = Config::default_path();

            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at: {}\nUse --force to overwrite.",
                    path.display()
                );
            }

            // Ensure parent directory exists
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            // Write default config
            let config = Config::default();
            let toml = config.to_toml()?;
            std::fs::write(&path, toml)?;

            // Weights are fetched separately; create the slot they go in.
            let model_slot = config.model_dir().join(&config.embedding.model);
            std::fs::create_dir_all(&model_slot)?;

            tracing::info!("Config file created at: {}", path.display());
            println!("Configuration initialized at: {}", path.display());
            println!(
                "Place the {} export in {}:",
                config.embedding.model,
                model_slot.display()
            );
            for file in ClipOnnxProvider::MODEL_FILES {
                println!("  {file}");
            }
        }
    }

    Ok(())
}

/// Per-file status of the configured model's directory, one line per
/// expected file.
fn model_report(model_dir: &Path, model: &str) -> String {
    let slot = model_dir.join(model);
    let missing = ClipOnnxProvider::missing_files(&slot);

    let mut out = format!("# model directory: {}\n", slot.display());
    for file in ClipOnnxProvider::MODEL_FILES {
        let status = if missing.contains(&file) { "missing" } else { "present" };
        out.push_str(&format!("#   {file}: {status}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_report_flags_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let slot = dir.path().join("clip-vit-base-patch32");
        std::fs::create_dir_all(&slot).unwrap();
        std::fs::write(slot.join("visual.onnx"), b"x").unwrap();

        let report = model_report(dir.path(), "clip-vit-base-patch32");
        assert!(report.contains("visual.onnx: present"));
        assert!(report.contains("text_model.onnx: missing"));
        assert!(report.contains("tokenizer.json: missing"));
    }

    #[test]
    fn test_model_report_all_present() {
        let dir = tempfile::tempdir().unwrap();
        let slot = dir.path().join("m");
        std::fs::create_dir_all(&slot).unwrap();
        for file in ClipOnnxProvider::MODEL_FILES {
            std::fs::write(slot.join(file), b"x").unwrap();
        }

        let report = model_report(dir.path(), "m");
        assert!(!report.contains("missing"));
    }
}
