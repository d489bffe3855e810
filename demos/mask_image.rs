//! Mask a single image.
//!
//! Usage:
//! ```sh
//! cargo run --example mask_image -- input.jpg output.png [blackbar|blur|pixelate]
//! ```

use std::env;
use std::process;

use pii_mask::{MaskOptions, MaskingEngine, MaskingStyle};

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <input> <output> [style]", args[0]);
        process::exit(1);
    }

    let input = &args[1];
    let output = &args[2];
    let style = args
        .get(3)
        .map_or(MaskingStyle::default(), |s| MaskingStyle::from_name_or_default(s));

    let opts = MaskOptions {
        style,
        ..MaskOptions::default()
    };
    let engine = MaskingEngine::new();
    let result = engine.process_file(input.as_ref(), output.as_ref(), &opts);

    if result.success {
        println!("Done: {}", result.message);
    } else {
        eprintln!("Error: {}", result.message);
        process::exit(1);
    }
}
