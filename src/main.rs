mod report;

use std::error::Error;
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use pilex::{
    analyze, AnalysisConfig, AnalysisInput, HeadCondition, LoadCase, PileProperties, SoilProfile,
    TipCondition,
};
use report::render_summary;
use tracing::Level;

#[derive(Parser)]
#[command(name = "pilex")]
#[command(version, about = "Finite-difference analysis of laterally loaded piles")]
struct Cli {
    /// Input document (JSON) with `pile`, `soil`, `load` and `config` records.
    /// The built-in cantilever example is analysed when omitted.
    input: Option<PathBuf>,

    /// Override the number of mesh nodes.
    #[arg(short, long)]
    nodes: Option<usize>,

    /// Print the result record as JSON instead of a text report.
    #[arg(long)]
    json: bool,

    /// Log progress to stderr (-v for iterations, -vv for everything).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// Ten-metre pile without soil, free at the head and fixed at the tip.
fn demonstration_input() -> AnalysisInput {
    AnalysisInput {
        pile: PileProperties::new(10.0, 0.6, 5.0e4),
        soil: SoilProfile::empty(),
        load: LoadCase::new(100.0, 0.0, 0.0),
        config: AnalysisConfig::default().with_supports(HeadCondition::Free, TipCondition::Fixed),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let mut input = match &cli.input {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => demonstration_input(),
    };
    if let Some(nodes) = cli.nodes {
        input.config = input.config.with_nodes(nodes);
    }

    let record = analyze(&input.pile, &input.soil, &input.load, &input.config)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        println!("{}", render_summary(&input, &record));
    }

    Ok(())
}
