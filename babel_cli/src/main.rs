//! Library of Babel CLI
//!
//! Read pages, locate text and run self-checks against a library.

use anyhow::{Context, Result};
use babel_cli::{CheckId, CheckResult, CheckRunner};
use babel_core::{
    BigUint, Coordinates, HexId, Library, LibraryConfig, PageRef, PageView, Vindication,
    VindicationScanner,
};
use clap::{Parser, Subcommand};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Library of Babel reader
#[derive(Parser, Debug)]
#[command(name = "babel")]
#[command(about = "Read and search the Library of Babel", long_about = None)]
struct Args {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON output for scripting
    #[arg(long, global = true)]
    json: bool,

    /// Library configuration file (JSON); defaults to the reference library
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// A page location as typed by a reader. Every field but the hex is 1-based.
#[derive(clap::Args, Debug)]
struct Location {
    /// Hex id, read as hexadecimal and otherwise as base 36
    #[arg(long, default_value = "0")]
    hex: String,

    #[arg(long, default_value_t = 1)]
    wall: u32,

    #[arg(long, default_value_t = 1)]
    shelf: u32,

    #[arg(long, default_value_t = 1)]
    volume: u32,

    #[arg(long, default_value_t = 1)]
    page: u32,
}

impl Location {
    fn page_ref(&self) -> Result<PageRef> {
        Ok(PageRef::new(
            HexId::parse(&self.hex)?,
            one_based("wall", self.wall)?,
            one_based("shelf", self.shelf)?,
            one_based("volume", self.volume)?,
            one_based("page", self.page)?,
        ))
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read a page
    Page {
        #[command(flatten)]
        location: Location,

        /// Word list (one per line) to look for on the page
        #[arg(long)]
        words: Option<PathBuf>,
    },

    /// Find the line that reads the given text
    Search {
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Coordinates of a line address (decimal)
    Locate { address: String },

    /// Address of a line (decimal)
    Address {
        #[command(flatten)]
        location: Location,

        #[arg(long, default_value_t = 1)]
        line: u32,
    },

    /// Content number of an address (decimal)
    Encrypt { address: String },

    /// Address of a content number (decimal)
    Decrypt { content: String },

    /// Open a random page
    Random {
        /// Seed for a reproducible draw
        #[arg(long)]
        seed: Option<u64>,

        /// Restrict the draw to purified rooms
        #[arg(long)]
        purified: bool,
    },

    /// Run self-checks against the configured library
    Verify {
        /// Seed for the sampled checks
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Random samples per check
        #[arg(long, default_value = "100")]
        samples: usize,

        /// Check to run (cipher_roundtrip, collisions, shuffle, coordinates, search, golden, all)
        #[arg(short = 'C', long, default_value = "all")]
        check: String,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let library = load_library(args.config.as_deref())?;
    let json = args.json;

    match args.command {
        Command::Page { location, words } => {
            let view = library.read_page(&location.page_ref()?)?;
            let vindications = match words {
                Some(path) => Some(load_scanner(&path)?.scan(&view.lines)),
                None => None,
            };
            print_page(&view, vindications.as_deref(), json)?;
        }
        Command::Search { text } => {
            let text = text.join(" ");
            let found = library.search(&text);
            debug!("Normalized query: {:?}", library.normalize(&text));
            print_location(&found, json)?;
        }
        Command::Locate { address } => {
            let address = parse_number(&address)?;
            print_location(&locate(&library, address), json)?;
        }
        Command::Address { location, line } => {
            let coords = location.page_ref()?.line(one_based("line", line)?);
            let address = library.coords_to_address(&coords)?;
            print_number("address", &address, json)?;
        }
        Command::Encrypt { address } => {
            let content = library.encrypt(&parse_number(&address)?);
            print_number("content", &content, json)?;
        }
        Command::Decrypt { content } => {
            let address = library.decrypt(&parse_number(&content)?);
            print_number("address", &address, json)?;
        }
        Command::Random { seed, purified } => {
            let mut rng = match seed {
                Some(seed) => ChaCha8Rng::seed_from_u64(seed),
                None => ChaCha8Rng::from_entropy(),
            };
            let hex = if purified {
                library.random_purified_hex(&mut rng)
            } else {
                library.random_hex(&mut rng)
            };
            let layout = *library.layout();
            let page = PageRef::new(
                hex,
                rng.gen_range(0..layout.walls),
                rng.gen_range(0..layout.shelves),
                rng.gen_range(0..layout.volumes),
                rng.gen_range(0..layout.pages),
            );
            print_page(&library.read_page(&page)?, None, json)?;
        }
        Command::Verify { seed, samples, check } => {
            let checks = if check == "all" {
                CheckId::all()
            } else {
                vec![check.parse::<CheckId>().map_err(anyhow::Error::msg)?]
            };
            verify(&library, &checks, seed, samples, json)?;
        }
    }

    Ok(())
}

fn load_library(path: Option<&Path>) -> Result<Library> {
    let config = match path {
        Some(path) => LibraryConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => LibraryConfig::reference(),
    };
    Library::new(&config).context("Invalid library configuration")
}

fn load_scanner(path: &Path) -> Result<VindicationScanner> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read word list {}", path.display()))?;
    let scanner = VindicationScanner::new(text.lines());
    debug!("Loaded {} words from {}", scanner.len(), path.display());
    Ok(scanner)
}

/// Coordinates of `address`, reduced into the address space first.
fn locate(library: &Library, mut address: BigUint) -> Coordinates {
    if &address >= library.modulus() {
        info!("Address exceeds the address space; reducing it");
        address %= library.modulus();
    }
    library.address_to_coords(&address)
}

fn one_based(field: &str, value: u32) -> Result<u32> {
    value
        .checked_sub(1)
        .with_context(|| format!("{} numbers start at 1", field))
}

fn parse_number(input: &str) -> Result<BigUint> {
    input
        .trim()
        .parse::<BigUint>()
        .with_context(|| format!("Not a non-negative decimal integer: {:?}", input))
}

// =============================================================================
// OUTPUT
// =============================================================================

fn location_json(page: &PageRef, line: Option<u32>) -> serde_json::Value {
    let mut value = serde_json::json!({
        "hex": page.hex,
        "hex_hexadecimal": format!("{:X}", page.hex.as_biguint()),
        "hex_base36": page.hex.to_base36(),
        "wall": page.wall + 1,
        "shelf": page.shelf + 1,
        "volume": page.volume + 1,
        "page": page.page + 1,
    });
    if let Some(line) = line {
        value["line"] = serde_json::json!(line + 1);
    }
    value
}

fn location_text(page: &PageRef) -> String {
    format!(
        "hex {:X} ({})  wall {}  shelf {}  volume {}  page {}",
        page.hex.as_biguint(),
        page.hex.abbreviated(8),
        page.wall + 1,
        page.shelf + 1,
        page.volume + 1,
        page.page + 1
    )
}

fn print_location(coords: &Coordinates, json: bool) -> Result<()> {
    if json {
        let value = location_json(&coords.page_ref(), Some(coords.line));
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{}  line {}", location_text(&coords.page_ref()), coords.line + 1);
    }
    Ok(())
}

fn print_number(label: &str, value: &BigUint, json: bool) -> Result<()> {
    if json {
        let mut map = serde_json::Map::new();
        map.insert(label.to_string(), value.to_string().into());
        println!("{}", serde_json::to_string_pretty(&map)?);
    } else {
        println!("{}", value);
    }
    Ok(())
}

fn print_page(view: &PageView, vindications: Option<&[Vindication]>, json: bool) -> Result<()> {
    if json {
        let value = serde_json::json!({
            "location": location_json(&view.page, None),
            "room": view.room,
            "catalog": view.catalog,
            "clue": view.clue,
            "purifier_quote": view.purifier_quote,
            "lines": view.lines,
            "vindications": vindications,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", location_text(&view.page));
    println!("room: {}", view.room.name());
    if view.catalog {
        println!("this is the catalog of catalogs");
    }
    if let Some(quote) = view.purifier_quote {
        println!("a plaque reads: \"{}\"", quote);
    }
    if let Some(clue) = &view.clue {
        println!("clue {}: {}", clue.index + 1, clue.text);
    }
    println!();
    for (i, line) in view.lines.iter().enumerate() {
        println!("{:>3} | {}", i + 1, line);
    }

    if let Some(found) = vindications {
        println!();
        if found.is_empty() {
            println!("no vindications");
        }
        for v in found {
            println!(
                "vindication: {:?} on line {}, columns {}-{}",
                v.word,
                v.line + 1,
                v.start + 1,
                v.end
            );
        }
    }
    Ok(())
}

fn verify(library: &Library, checks: &[CheckId], seed: u64, samples: usize, json: bool) -> Result<()> {
    if !json {
        info!("Babel self-check v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    let runner = CheckRunner::new(seed).with_samples(samples);
    let results: Vec<CheckResult> = checks.iter().map(|&check| runner.run(library, check)).collect();
    let failed_count = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    if json {
        let summary = serde_json::json!({
            "total": total,
            "passed": total - failed_count,
            "failed": failed_count,
            "results": results,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        for result in &results {
            if result.passed {
                info!(
                    "✓ {} ({:.1}ms) PASSED: {}",
                    result.check,
                    result.elapsed_ms,
                    result.check.description()
                );
            } else {
                error!(
                    "✗ {} (seed={}) FAILED: {}",
                    result.check,
                    result.seed,
                    result.failure_reason.as_deref().unwrap_or("unknown")
                );
            }
        }

        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        if failed_count == 0 {
            info!("All {} checks passed", total);
        } else {
            error!("{}/{} checks failed", failed_count, total);
        }
    }

    // Exit with proper code for CI
    if failed_count > 0 {
        std::process::exit(1);
    }
    Ok(())
}
