//! Command-line surface: quality analysis and one-shot auto-cleaning.

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use scour::cleaner::{auto_clean, CleaningSession};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scour", version, about = "Tabular data cleaning tool")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a dataset and print its quality report
    Analyze {
        /// Path to the dataset (CSV, Parquet, JSON)
        file: PathBuf,
    },
    /// Run the auto-clean pipeline and save the result
    Clean {
        /// Path to the dataset (CSV, Parquet, JSON)
        file: PathBuf,

        /// Where to write the cleaned dataset
        #[arg(short, long)]
        out: PathBuf,

        /// Also lowercase text, strip special characters and remove outliers
        #[arg(long)]
        aggressive: bool,
    },
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Analyze { file } => analyze(&file),
        Commands::Clean {
            file,
            out,
            aggressive,
        } => clean(&file, &out, aggressive),
    }
}

fn analyze(file: &std::path::Path) -> Result<()> {
    let df = scour::io::load_df(file)?;
    let session = CleaningSession::new(df);
    let report = session.quality()?;
    let summary = session.summary()?;

    println!("{} rows x {} columns", summary.rows, summary.columns);
    println!(
        "Quality score: {:.1} ({}) - {:.1}% missing, {:.1}% duplicates",
        report.score,
        report.band(),
        report.missing_pct,
        report.duplicate_pct
    );
    if !report.issues.is_empty() {
        println!("\nIssues:");
        for issue in &report.issues {
            println!("  - {issue}");
        }
    }
    println!("\nRecommendations:");
    for rec in &report.recommendations {
        println!("  - {rec}");
    }
    Ok(())
}

fn clean(file: &std::path::Path, out: &std::path::Path, aggressive: bool) -> Result<()> {
    let df = scour::io::load_df(file)?;
    let mut session = CleaningSession::new(df);
    let report =
        auto_clean(&mut session, aggressive).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    println!(
        "{} rows x {} columns -> {} rows x {} columns",
        report.rows_before, report.columns_before, report.rows_after, report.columns_after
    );
    if report.issues_fixed.is_empty() {
        println!("No issues found");
    } else {
        println!("\nFixed:");
        for issue in &report.issues_fixed {
            println!("  - {issue}");
        }
    }
    println!("\nOperations:");
    for op in session.operations().iter().skip(1) {
        println!("  - {}", op.description);
    }

    let mut cleaned = session.data().clone();
    scour::io::save_df(&mut cleaned, out)
        .with_context(|| format!("Failed to save cleaned dataset to {}", out.display()))?;
    println!("\nSaved to {}", out.display());
    Ok(())
}
