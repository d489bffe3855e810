use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use pii_mask::service::check_health;
use pii_mask::{default_output_path, MaskOptions, MaskingEngine, MaskingStyle, ProcessResult};

#[derive(Parser)]
#[command(
    name = "pii-mask",
    about = "Obscure sensitive image regions with black bars, blur or pixelation",
    version,
    after_help = "Simple usage: pii-mask <image>  (writes {name}_masked.{ext})\n\n\
                  NOTE: Regions are placed by a stand-in synthesizer, not a real\n\
                  face/text detector. Use --seed for reproducible output."
)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Input image file or directory
    #[arg(required_unless_present = "health")]
    input: Option<String>,

    /// Output file or directory (default: {name}_masked.{ext})
    #[arg(short, long)]
    output: Option<String>,

    /// Masking style
    #[arg(short, long, value_enum, default_value_t = MaskingStyle::BlackBar)]
    style: MaskingStyle,

    /// Gaussian blur radius in pixels
    #[arg(short = 'r', long, default_value = "15")]
    blur_radius: u32,

    /// Seed for region placement
    #[arg(long, env = "PII_MASK_SEED")]
    seed: Option<u64>,

    /// Print results as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Print a health probe and exit
    #[arg(long)]
    health: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long)]
    quiet: bool,
}

fn init_tracing(opts: &MaskOptions) {
    let default_level = if opts.verbose {
        "debug"
    } else if opts.quiet {
        "error"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();

    if cli.health {
        match serde_json::to_string(&check_health()) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
        return;
    }

    let opts = MaskOptions {
        style: cli.style,
        blur_radius: cli.blur_radius,
        seed: cli.seed,
        verbose: cli.verbose,
        quiet: cli.quiet,
    };
    init_tracing(&opts);

    let engine = match MaskingEngine::with_options(&opts) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let Some(input) = cli.input.as_deref() else {
        eprintln!("Error: Input path is required");
        process::exit(1);
    };
    let input_path = Path::new(input);
    if !input_path.exists() {
        eprintln!("Error: Input path does not exist: {input}");
        process::exit(1);
    }

    if !opts.quiet && !cli.json {
        eprintln!("Masking style: {}", opts.style);
        eprintln!();
    }

    let results = if input_path.is_dir() {
        let output_dir = if let Some(o) = &cli.output {
            PathBuf::from(o)
        } else {
            eprintln!("Error: Output directory is required for batch processing");
            eprintln!("Usage: pii-mask <input_dir> -o <output_dir>");
            process::exit(1);
        };
        engine.process_directory(input_path, &output_dir, &opts)
    } else {
        let output_path = match &cli.output {
            Some(o) => PathBuf::from(o),
            None => default_output_path(input_path),
        };
        vec![engine.process_file(input_path, &output_path, &opts)]
    };

    if cli.json {
        match serde_json::to_string_pretty(&results) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
    }

    let mut success_count = 0u32;
    let mut fail_count = 0u32;

    for r in &results {
        if !cli.json {
            print_result(r, &opts);
        }
        if r.success {
            success_count += 1;
        } else {
            fail_count += 1;
        }
    }

    if results.len() > 1 && !opts.quiet && !cli.json {
        eprintln!();
        eprint!("[Summary] Processed: {success_count}");
        if fail_count > 0 {
            eprint!(", Failed: {fail_count}");
        }
        eprintln!(" (Total: {})", results.len());
    }

    if fail_count > 0 {
        process::exit(1);
    }
}

fn print_result(result: &ProcessResult, opts: &MaskOptions) {
    if opts.quiet && result.success {
        return;
    }

    let filename = result.path.file_name().map_or_else(
        || result.path.display().to_string(),
        |f| f.to_string_lossy().to_string(),
    );

    if result.success {
        let pii = &result.detected_pii;
        eprintln!(
            "[OK] {filename} (faces: {}, text: {}, ids: {}, addresses: {})",
            pii.faces, pii.text_regions, pii.id_numbers, pii.addresses
        );
    } else {
        eprintln!("[FAIL] {filename}: {}", result.message);
    }

    if opts.verbose && !result.message.is_empty() {
        eprintln!("  -> {}", result.message);
    }
}
