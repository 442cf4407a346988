use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use contam_rust::contam::{ContamClass, ContamIndex, ContamLoader};
use contam_rust::report;
use contam_rust::screen::{self, ScreenOpt};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(
    name = "contam-rust",
    author,
    version,
    about = "Detect adapter, primer and vector contamination in short reads",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load contaminants and list them
    Inspect {
        /// Contaminants multi-FASTA
        contaminants: String,
    },
    /// Screen SE or PE reads for contamination
    Screen {
        /// Contaminants multi-FASTA
        #[arg(short = 'c', long = "contaminants")]
        contaminants: String,
        /// Reads FASTQ (PE1 when paired)
        reads1: String,
        /// PE2 reads FASTQ
        reads2: Option<String>,
        /// Substitutions allowed per 25bp of overlap
        #[arg(long = "sub-rate", default_value_t = 1, value_parser = clap::value_parser!(u32).range(0..=3))]
        sub_rate: u32,
        /// Minimum flank overlap reported
        #[arg(long = "min-overlap", default_value_t = 1)]
        min_overlap: usize,
        #[arg(short = 't', long = "threads", default_value_t = 1)]
        threads: usize,
        #[arg(long = "batch-size", default_value_t = 10_000)]
        batch_size: usize,
        /// Per-read TSV output (stdout if omitted)
        #[arg(short, long)]
        out: Option<String>,
        /// Per-contaminant CSV report
        #[arg(long)]
        report: Option<String>,
        /// JSON run summary
        #[arg(long)]
        json: Option<String>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Inspect { contaminants } => run_inspect(&contaminants),
        Commands::Screen {
            contaminants,
            reads1,
            reads2,
            sub_rate,
            min_overlap,
            threads,
            batch_size,
            out,
            report,
            json,
        } => {
            let opt = ScreenOpt { allow_sub_rate: sub_rate, min_overlap, threads, batch_size };
            run_screen(
                &contaminants,
                &reads1,
                reads2.as_deref(),
                out.as_deref(),
                report.as_deref(),
                json.as_deref(),
                opt,
            )
        }
    }
}

fn load_index(path: &str) -> Result<ContamIndex> {
    let mut loader = ContamLoader::new();
    loader
        .load_contaminants_file(path)
        .with_context(|| format!("cannot load contaminants from '{}'", path))?;
    Ok(loader.finalize()?)
}

fn run_inspect(path: &str) -> Result<()> {
    let idx = load_index(path)?;
    let n = idx.num_of_contaminants(ContamClass::All) as u32;

    println!("id\tclass\ttype\tlength\tname");
    for id in 1..=n {
        let class = match idx.contaminant_class(id) {
            Some(ContamClass::Vector) => "vector",
            _ => "flank",
        };
        println!(
            "{}\t{}\t{}\t{}\t{}",
            id,
            class,
            idx.contaminant_type(id).map_or("*", |t| t.label()),
            idx.contaminant_len(id).unwrap_or(0),
            idx.contaminant_name(id).unwrap_or("*")
        );
    }
    for (label, class) in [("flank", ContamClass::Flank), ("vector", ContamClass::Vector)] {
        let count = idx.num_of_contaminants(class);
        if count > 0 {
            println!(
                "# {}: {} contaminants, {}..{}bp",
                label,
                count,
                idx.min_contaminant_len(class),
                idx.max_contaminant_len(class)
            );
        }
    }
    Ok(())
}

fn run_screen(
    contaminants: &str,
    reads1: &str,
    reads2: Option<&str>,
    out: Option<&str>,
    report_path: Option<&str>,
    json_path: Option<&str>,
    opt: ScreenOpt,
) -> Result<()> {
    let idx = load_index(contaminants)?;
    let ends = screen::screen_fastq(&idx, reads1, reads2, out, &opt)?;

    if let Some(p) = report_path {
        let fh = std::fs::File::create(p).with_context(|| format!("cannot create report '{}'", p))?;
        report::write_contam_csv(&idx, std::io::BufWriter::new(fh))?;
        info!("contaminant report written to '{}'", p);
    }
    if let Some(p) = json_path {
        let summary = report::ScreenSummary::collect(&idx, opt.allow_sub_rate, opt.min_overlap, ends);
        let fh = std::fs::File::create(p).with_context(|| format!("cannot create summary '{}'", p))?;
        report::write_json_summary(&summary, std::io::BufWriter::new(fh))?;
        info!("summary written to '{}'", p);
    }
    Ok(())
}
