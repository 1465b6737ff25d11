//! CLI tool for turning text outlines into branded PowerPoint decks.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use deck_core::outline::{self, EXAMPLE_OUTLINE};
use deck_core::{ids, BrandConfig, DeckRenderer, PlanOptions, SlidePlanner};
use deck_pptx::{DeckReader, PptxRenderer};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Generate branded decks from outlines.
#[derive(Parser, Debug)]
#[command(name = "deckgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render an outline to a .pptx deck
    Generate(GenerateArgs),
    /// Show the slides an outline would produce
    Plan(PlanArgs),
    /// Print the text of an existing .pptx deck
    Inspect(InspectArgs),
    /// Print an example outline
    Example,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Outline file (reads stdin when omitted or "-")
    input: Option<PathBuf>,

    /// Brand config JSON (default: built-in brand, assets under ./brand-assets)
    #[arg(short, long)]
    brand: Option<PathBuf>,

    /// Output directory
    #[arg(short = 'd', long, default_value = "generated")]
    output_dir: PathBuf,

    /// Output file (default: <output-dir>/deck_<id>.pptx)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Gradient for title slides
    #[arg(long)]
    title_gradient: Option<String>,

    /// Gradient for section slides
    #[arg(long)]
    section_gradient: Option<String>,

    /// Only parse the outline, without layout planning
    #[arg(long)]
    no_planner: bool,
}

#[derive(Args, Debug)]
struct PlanArgs {
    /// Outline file (reads stdin when omitted or "-")
    input: Option<PathBuf>,

    /// Print slide records as JSON instead of a normalized outline
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Deck to read
    input: PathBuf,

    /// Print slides as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    match cli.command {
        Command::Generate(args) => generate(&args),
        Command::Plan(args) => plan(&args),
        Command::Inspect(args) => inspect(&args),
        Command::Example => {
            print!("{}", EXAMPLE_OUTLINE);
            Ok(())
        }
    }
}

fn generate(args: &GenerateArgs) -> Result<()> {
    let text = read_outline(args.input.as_deref())?;
    let brand = load_brand(args.brand.as_deref())?;

    let options = PlanOptions {
        use_planner: !args.no_planner,
        title_gradient: args.title_gradient.clone(),
        section_gradient: args.section_gradient.clone(),
    };
    let slides = SlidePlanner::new()
        .prepare(&text, &options)
        .context("Failed to plan slides")?;
    log::info!("Planned {} slides", slides.len());

    let output_path = match &args.output {
        Some(path) => path.clone(),
        None => {
            std::fs::create_dir_all(&args.output_dir).with_context(|| {
                format!("Failed to create output directory: {}", args.output_dir.display())
            })?;
            deck_path(&args.output_dir)
        }
    };

    PptxRenderer::new(brand)
        .render_to_path(&slides, &output_path)
        .with_context(|| format!("Failed to render {}", output_path.display()))?;

    println!("{}", output_path.display());
    Ok(())
}

fn plan(args: &PlanArgs) -> Result<()> {
    let text = read_outline(args.input.as_deref())?;
    let slides = SlidePlanner::new().plan(&text);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&slides)?);
    } else {
        print!("{}", outline::to_outline(&slides));
    }
    Ok(())
}

fn inspect(args: &InspectArgs) -> Result<()> {
    let slides = DeckReader::read_path(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&slides)?);
        return Ok(());
    }

    for slide in &slides {
        println!("--- Slide {} ---", slide.number);
        for line in &slide.lines {
            println!("{}", line);
        }
    }
    Ok(())
}

/// Read the outline from `input`, or stdin when it is absent or `-`.
fn read_outline(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read outline from stdin")?;
            Ok(text)
        }
    }
}

fn load_brand(path: Option<&Path>) -> Result<BrandConfig> {
    match path {
        Some(path) => BrandConfig::load(path)
            .with_context(|| format!("Failed to load brand config {}", path.display())),
        None => Ok(BrandConfig::default()),
    }
}

/// Fresh `deck_<id>.pptx` path inside `dir`.
fn deck_path(dir: &Path) -> PathBuf {
    dir.join(format!("deck_{}.pptx", ids::short_id()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deck_path() {
        let path = deck_path(Path::new("generated"));
        let name = path.file_name().unwrap().to_str().unwrap();

        assert!(path.starts_with("generated"));
        assert!(name.starts_with("deck_"));
        assert!(name.ends_with(".pptx"));
        assert_eq!(name.len(), "deck_.pptx".len() + ids::SHORT_ID_LEN);
    }

    #[test]
    fn test_read_outline_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outline.md");
        std::fs::write(&path, "# Title\n- Point").unwrap();

        assert_eq!(read_outline(Some(&path)).unwrap(), "# Title\n- Point");
        assert!(read_outline(Some(&dir.path().join("missing.md"))).is_err());
    }

    #[test]
    fn test_cli_parses_generate() {
        let cli = Cli::try_parse_from([
            "deckgen",
            "generate",
            "outline.md",
            "--title-gradient",
            "jadehorizon",
            "--no-planner",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Command::Generate(args) => {
                assert_eq!(args.input, Some(PathBuf::from("outline.md")));
                assert_eq!(args.title_gradient.as_deref(), Some("jadehorizon"));
                assert!(args.no_planner);
                assert_eq!(args.output_dir, PathBuf::from("generated"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
