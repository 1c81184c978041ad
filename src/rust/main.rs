use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use spamguard::{ArtifactManager, ClassifierConfig, SpamClassifier, Verdict};

#[derive(Parser)]
#[command(author, version, about = "Classify email text as spam or not spam", long_about = None)]
struct Args {
    /// Email text to classify; read from --file or stdin when omitted
    text: Option<String>,

    /// Read the email text from a file
    #[arg(short, long, conflicts_with = "text")]
    file: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Root directory holding artifact sets
    #[arg(long)]
    artifacts: Option<PathBuf>,

    /// Name of the artifact set to load
    #[arg(long)]
    name: Option<String>,

    /// Download the artifact set from this base URL if it is missing or fails verification
    #[arg(long)]
    fetch: Option<String>,

    /// Replacement stopword list, one word per line
    #[arg(long)]
    stopwords: Option<PathBuf>,

    /// Print the normalized text and decision score
    #[arg(short, long)]
    explain: bool,
}

impl Args {
    fn config(&self) -> Result<ClassifierConfig> {
        let mut config = match &self.config {
            Some(path) => ClassifierConfig::from_file(path)?,
            None => ClassifierConfig::default(),
        };
        if let Some(dir) = &self.artifacts {
            config.artifacts_dir = Some(dir.clone());
        }
        if let Some(name) = &self.name {
            config.artifact_name = name.clone();
        }
        if let Some(url) = &self.fetch {
            config.source_url = Some(url.clone());
        }
        if let Some(path) = &self.stopwords {
            config.stopwords_file = Some(path.clone());
        }
        Ok(config)
    }

    fn input(&self) -> Result<String> {
        if let Some(text) = &self.text {
            return Ok(text.clone());
        }
        if let Some(path) = &self.file {
            return fs::read_to_string(path)
                .with_context(|| format!("Failed to read input file {}", path.display()));
        }
        let mut stdin = io::stdin();
        if stdin.is_terminal() {
            eprintln!("Paste your email content below, then press Ctrl-D:");
        }
        let mut text = String::new();
        stdin.read_to_string(&mut text).context("Failed to read stdin")?;
        Ok(text)
    }
}

async fn ensure_artifacts(config: &ClassifierConfig) -> Result<()> {
    if config.source_url.is_none() || config.vectorizer_file.is_some() || config.model_file.is_some() {
        return Ok(());
    }
    let manager = ArtifactManager::new(config.artifacts_root())
        .context("Failed to create artifact directory")?;
    manager
        .ensure_downloaded(&config.artifact_info())
        .await
        .context("Failed to download artifacts")?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    spamguard::init_logger();
    let args = Args::parse();
    let config = args.config()?;

    ensure_artifacts(&config).await?;

    let start_time = Instant::now();
    info!("Loading classifier...");
    let classifier = SpamClassifier::builder()
        .with_config(&config)
        .context("Failed to load classifier artifacts")?
        .build()
        .context("Failed to build classifier")?;
    info!("Classifier ready (took {:.2?})", start_time.elapsed());

    let text = args.input()?;
    let analysis = classifier.analyze(&text);

    match analysis.verdict {
        Verdict::NoInput => println!("⚠️ Please enter some email text to analyze."),
        Verdict::Spam => println!("🚫 SPAM EMAIL DETECTED!"),
        Verdict::NotSpam => println!("✅ This email is safe (Not Spam)."),
    }

    if args.explain {
        if let Some(normalized) = &analysis.normalized {
            println!("  Normalized text: {:?}", normalized);
            println!("  Known terms: {}", analysis.matched_features);
        }
        if let Some(score) = analysis.score {
            println!("  Decision score: {:.4}", score);
        }
    }

    Ok(())
}
