use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "powerlist workspace automation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the criterion benchmarks and write a markdown report
    Bench {
        /// Run quickly (lower sample size/time)
        #[arg(long, default_value_t = false)]
        quick: bool,

        /// Generate report only (skip running benchmarks)
        #[arg(long, default_value_t = false)]
        report_only: bool,
    },
}

const BENCHES: &[&str] = &["power_list_benchmark", "scatter_alloc_benchmark"];

/// Subset of criterion's `estimates.json`.
#[derive(Deserialize)]
struct Estimates {
    mean: Estimate,
}

#[derive(Deserialize)]
struct Estimate {
    point_estimate: f64,
}

/// Mean time in nanoseconds, keyed by group, then benchmark.
type Results = BTreeMap<String, BTreeMap<String, f64>>;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Bench { quick, report_only } => {
            if !report_only {
                run_benchmarks(quick)?;
            }
            generate_report()?;
        }
    }

    Ok(())
}

fn run_benchmarks(quick: bool) -> Result<()> {
    for bench in BENCHES {
        println!("\n>>> Running {bench}");
        let start = Instant::now();

        let mut cmd = Command::new("cargo");
        cmd.env("CARGO_INCREMENTAL", "0");
        cmd.args(["bench", "--bench", bench]);

        // Args for the test runner (Criterion) go after --
        cmd.arg("--");
        if quick {
            cmd.args(["--measurement-time", "0.1", "--sample-size", "10", "--noplot"]);
        }

        let status = cmd.status().with_context(|| format!("failed to run bench {bench}"))?;
        if !status.success() {
            anyhow::bail!("benchmark {bench} failed");
        }
        println!("Finished {bench} in {:.2?}", start.elapsed());
    }

    Ok(())
}

fn generate_report() -> Result<()> {
    println!("\n>>> Generating Report...");

    let criterion_dir = Path::new("target/criterion");
    if !criterion_dir.exists() {
        eprintln!("No criterion output found at {}", criterion_dir.display());
        return Ok(());
    }

    let mut results = Results::new();
    collect_results(criterion_dir, &mut results)?;

    let report_path = Path::new("benchmark_results/report.md");
    if let Some(parent) = report_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(report_path)
        .with_context(|| format!("failed to create {}", report_path.display()))?;

    writeln!(file, "# Benchmark Report")?;
    for (group, benches) in &results {
        let fastest = benches.values().copied().fold(f64::INFINITY, f64::min);

        writeln!(file, "\n## {group}\n")?;
        writeln!(file, "| Benchmark | Mean | Ops/s | vs fastest |")?;
        writeln!(file, "|---|---|---|---|")?;
        for (bench, &time_ns) in benches {
            writeln!(
                file,
                "| {} | {} | {} | **{:.2}x** |",
                bench,
                format_time(time_ns),
                format_ops(1e9 / time_ns),
                time_ns / fastest
            )?;
        }
    }

    println!("Report written to {}", report_path.display());
    Ok(())
}

/// Collects `<group>/<bench>/new/estimates.json` files below `dir`.
fn collect_results(dir: &Path, results: &mut Results) -> Result<()> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Ok(());
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_results(&path, results)?;
            continue;
        }
        if path.file_name().and_then(|name| name.to_str()) != Some("estimates.json") {
            continue;
        }

        let mut ancestors = path.ancestors().skip(1).filter_map(|p| p.file_name()?.to_str());
        let (Some("new"), Some(bench), Some(group)) = (ancestors.next(), ancestors.next(), ancestors.next()) else {
            continue;
        };
        if bench == "report" || group == "report" {
            continue;
        }

        let content = fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;
        let estimates: Estimates =
            serde_json::from_str(&content).with_context(|| format!("malformed {}", path.display()))?;
        if estimates.mean.point_estimate > 0.0 {
            results
                .entry(group.to_string())
                .or_default()
                .insert(bench.to_string(), estimates.mean.point_estimate);
        }
    }

    Ok(())
}

fn format_time(ns: f64) -> String {
    if ns >= 1e9 {
        format!("{:.2} s", ns / 1e9)
    } else if ns >= 1e6 {
        format!("{:.2} ms", ns / 1e6)
    } else if ns >= 1e3 {
        format!("{:.2} µs", ns / 1e3)
    } else {
        format!("{ns:.0} ns")
    }
}

fn format_ops(ops: f64) -> String {
    if ops > 1_000_000.0 {
        format!("{:.2}M", ops / 1_000_000.0)
    } else if ops > 1_000.0 {
        format!("{:.2}K", ops / 1_000.0)
    } else {
        format!("{ops:.0}")
    }
}
