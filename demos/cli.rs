//! Command-line interface for print_lift
//!
//! Basic CLI tool for testing print extraction functionality

use print_lift::{extract_print, Detection, ExtractionOutput, ExtractionPipeline, PipelineConfig};
use std::{env, fs, path::Path, process};

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut image_path_arg = None;
    let mut detection_path_arg = None;
    let mut config_path_arg = None;
    let mut output_path_arg = None;

    // Parse arguments
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--detection" | "-d" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: --detection requires a path");
                    process::exit(1);
                }
                detection_path_arg = Some(args[i + 1].clone());
                i += 1;
            }
            "--config" | "-c" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: --config requires a path");
                    process::exit(1);
                }
                config_path_arg = Some(args[i + 1].clone());
                i += 1;
            }
            "--output" | "-o" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: --output requires a path");
                    process::exit(1);
                }
                output_path_arg = Some(args[i + 1].clone());
                i += 1;
            }
            "--help" | "-h" => {
                print_help(&args[0]);
                process::exit(0);
            }
            arg if !arg.starts_with('-') => {
                if image_path_arg.is_none() {
                    image_path_arg = Some(arg.to_string());
                } else {
                    eprintln!("Error: Multiple image paths provided");
                    process::exit(1);
                }
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                eprintln!("Use --help for usage information");
                process::exit(1);
            }
        }
        i += 1;
    }

    let (image_path_str, detection_path_str) = match (image_path_arg, detection_path_arg) {
        (Some(image), Some(detection)) => (image, detection),
        _ => {
            print_help(&args[0]);
            process::exit(1);
        }
    };

    let image_path = Path::new(&image_path_str);
    if !image_path.exists() {
        eprintln!("Error: File '{}' does not exist", image_path.display());
        process::exit(1);
    }

    let image_bytes = match fs::read(image_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading '{}': {}", image_path.display(), e);
            process::exit(1);
        }
    };

    let detection = match load_detection(Path::new(&detection_path_str)) {
        Ok(detection) => detection,
        Err(e) => {
            eprintln!("Error loading detection JSON: {}", e);
            process::exit(1);
        }
    };

    let result = match config_path_arg {
        Some(config_path) => {
            let config = match PipelineConfig::from_json_file(Path::new(&config_path)) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Error loading config '{}': {}", config_path, e);
                    process::exit(1);
                }
            };
            match ExtractionPipeline::with_config(config) {
                Ok(pipeline) => pipeline.extract(&image_bytes, &detection, None),
                Err(e) => {
                    eprintln!("Invalid configuration: {}", e);
                    process::exit(1);
                }
            }
        }
        None => extract_print(&image_bytes, &detection),
    };

    match result {
        Ok(output) => {
            if let Some(output_path) = output_path_arg {
                if let Err(e) = fs::write(&output_path, &output.image_bytes) {
                    eprintln!("Error writing '{}': {}", output_path, e);
                    process::exit(1);
                }
                eprintln!("Saved extracted print to {}", output_path);
            }
            print_result(&output);
        }
        Err(error) => {
            eprintln!("Extraction failed: {}", error);
            if error.is_recoverable() {
                eprintln!("Suggestion: {}", error.user_message());
            }
            process::exit(1);
        }
    }
}

fn load_detection(path: &Path) -> Result<Detection, Box<dyn std::error::Error>> {
    let json = fs::read_to_string(path)?;
    let detection: Detection = serde_json::from_str(&json)?;
    Ok(detection)
}

fn print_help(program_name: &str) {
    eprintln!(
        "Usage: {} --detection <detection.json> [OPTIONS] <image_path>",
        program_name
    );
    eprintln!();
    eprintln!("Extract the garment print region described by a detection JSON file.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --detection, -d PATH   Detection result JSON (required)");
    eprintln!("  --config, -c PATH      Pipeline configuration JSON");
    eprintln!("  --output, -o PATH      Write the extracted PNG to this path");
    eprintln!("  --help, -h             Show this help message");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} -d detection.json photo.jpg", program_name);
    eprintln!(
        "  {} -d detection.json -o print.png -c pipeline.json photo.jpg",
        program_name
    );
}

fn print_result(output: &ExtractionOutput) {
    // Print JSON to stdout for programmatic use
    let summary = serde_json::json!({
        "width": output.width,
        "height": output.height,
        "colorPalette": output.color_palette,
        "pngBytes": output.image_bytes.len(),
    });
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing result: {}", e);
            println!(
                "{{ \"width\": {}, \"height\": {} }}",
                output.width, output.height
            );
        }
    }

    // Print summary to stderr for human reading
    eprintln!();
    eprintln!("Print Extraction Summary:");
    eprintln!("  Dimensions: {}x{}", output.width, output.height);
    eprintln!("  Palette: {}", output.color_palette.join(", "));
    eprintln!("  PNG size: {} bytes", output.image_bytes.len());
}
