// src/main.rs
mod logger;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use huffpack::container::{self, Report};
use huffpack::utils::{self, format_bytes};
use huffpack::{CodeTable, HuffmanTree};

#[derive(Parser)]
#[command(name = "huffpack", version)]
#[command(about = "Huffman compression for media and other binary files.", long_about = None)]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file into a .hfp envelope
    Compress {
        input: PathBuf,
        /// Defaults to <INPUT>.hfp
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        force: bool,
    },
    /// Restore the original file from a .hfp envelope
    Decompress {
        input: PathBuf,
        /// Defaults to <INPUT> without its .hfp extension
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        force: bool,
    },
    /// Show statistics of a .hfp envelope
    Info {
        input: PathBuf,
        /// Number of most frequent symbols to list
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Decode a .hfp envelope and verify its digest
    Check { input: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(logger::level_for(cli.verbose, cli.quiet));

    let args: Vec<String> = std::env::args().collect();
    let span = tracing::info_span!("command_execution", command = ?args);
    let _enter = span.enter();

    match cli.command {
        Commands::Compress { input, output, force } => {
            let output = output.unwrap_or_else(|| utils::compressed_path(&input));
            let report = container::compress_file(&input, &output, force)
                .with_context(|| format!("failed to compress {}", input.display()))?;
            print_report("Compressed", &input, &output, &report);
        }
        Commands::Decompress { input, output, force } => {
            let output = output.unwrap_or_else(|| utils::decompressed_path(&input));
            let report = container::decompress_file(&input, &output, force)
                .with_context(|| format!("failed to decompress {}", input.display()))?;
            print_report("Decompressed", &input, &output, &report);
        }
        Commands::Info { input, top } => show_info(&input, top)?,
        Commands::Check { input } => {
            let (envelope, _) = container::read_envelope(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let data = envelope
                .open()
                .with_context(|| format!("integrity check failed for {}", input.display()))?;
            println!(
                "OK: {} ({} restored, sha256 {})",
                input.display(),
                format_bytes(data.len() as u64),
                utils::hex(envelope.digest())
            );
        }
    }
    Ok(())
}

fn print_report(action: &str, input: &Path, output: &Path, report: &Report) {
    println!("{action}: {} -> {}", input.display(), output.display());
    println!(
        "  original {}, stored {} ({:.1}%)",
        format_bytes(report.original_len),
        format_bytes(report.stored_len),
        report.ratio() * 100.0
    );
}

fn show_info(input: &Path, top: usize) -> Result<()> {
    let (envelope, stored_len) = container::read_envelope(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let artifact = envelope.artifact();
    let original_len = artifact.original_len()?;
    let report = Report {
        original_len,
        stored_len,
    };

    println!("File:            {}", input.display());
    println!("Original size:   {}", format_bytes(original_len));
    println!("Stored size:     {}", format_bytes(stored_len));
    println!("Ratio:           {:.1}%", report.ratio() * 100.0);
    println!("Distinct bytes:  {}", artifact.distinct_symbols());
    println!("Encoded bits:    {}", artifact.bit_len());
    println!("SHA-256:         {}", utils::hex(envelope.digest()));

    if artifact.table().is_empty() {
        return Ok(());
    }

    let tree = HuffmanTree::build(artifact.table())?;
    let codes = CodeTable::build(&tree)?;
    println!("Tree depth:      {}", tree.depth());

    let mut by_count: Vec<(u8, u64)> = artifact.table().iter().collect();
    by_count.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    println!("Top symbols:");
    for (symbol, count) in by_count.into_iter().take(top) {
        let code = codes.code_string(symbol).unwrap_or_default();
        println!("  0x{symbol:02x}  {count:>12}  {code}");
    }
    Ok(())
}
