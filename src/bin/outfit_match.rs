//! Command-line interface for outfit_colors
//!
//! Extracts garment colors, checks outfit matches and renders color strips
//! from image files. Results are printed to stdout as JSON; logs and
//! summaries go to stderr.

use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs, process};

use outfit_colors::config::IsolationMethod;
use outfit_colors::{
    AnalysisError, ColorsResponse, Garment, Outfit, Pipeline, PipelineConfig, RunControl,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Options {
    config: Option<PathBuf>,
    colors: Option<usize>,
    clusters: Option<usize>,
    denoise: Option<usize>,
    isolate: Option<String>,
    timeout_ms: Option<u64>,
    positional: Vec<String>,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("outfit-match");

    let Some(command) = args.get(1) else {
        print_help(program);
        process::exit(1);
    };
    if command == "--help" || command == "-h" {
        print_help(program);
        process::exit(0);
    }

    let options = match parse_options(&args[2..]) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {message}");
            eprintln!("Use --help for usage information");
            process::exit(1);
        }
    };

    let result = match command.as_str() {
        "colors" => run_colors(&options),
        "match" => run_match(&options),
        "isolate" => run_isolate(&options),
        "strip" => run_strip(&options),
        "write-config" => run_write_config(&options),
        other => {
            eprintln!("Unknown command: {other}");
            print_help(program);
            process::exit(1);
        }
    };

    if let Err(error) = result {
        eprintln!("Analysis failed: {error}");
        eprintln!("Suggestion: {}", error.user_message());
        process::exit(1);
    }
}

fn parse_options(args: &[String]) -> Result<Options, String> {
    let mut options = Options::default();
    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        match arg {
            "--config" | "--colors" | "--clusters" | "--denoise" | "--isolate" | "--timeout-ms" => {
                let value = args
                    .get(i + 1)
                    .ok_or_else(|| format!("{arg} requires a value"))?;
                match arg {
                    "--config" => options.config = Some(PathBuf::from(value)),
                    "--colors" => options.colors = Some(parse_number(arg, value)?),
                    "--clusters" => options.clusters = Some(parse_number(arg, value)?),
                    "--denoise" => options.denoise = Some(parse_number(arg, value)?),
                    "--isolate" => options.isolate = Some(value.clone()),
                    _ => options.timeout_ms = Some(parse_number(arg, value)?),
                }
                i += 1;
            }
            _ if arg.starts_with("--") => return Err(format!("Unknown option: {arg}")),
            _ => options.positional.push(arg.to_string()),
        }
        i += 1;
    }
    Ok(options)
}

fn parse_number<T: std::str::FromStr>(option: &str, value: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("{option} expects a number, got '{value}'"))
}

fn load_config(options: &Options) -> Result<PipelineConfig, AnalysisError> {
    let mut config = match &options.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(clusters) = options.clusters {
        config.extraction.cluster_count = clusters;
    }
    if let Some(denoise) = options.denoise {
        config.extraction.denoise = denoise;
    }
    if let Some(method) = &options.isolate {
        config.isolation.method = match method.as_str() {
            "passthrough" => IsolationMethod::Passthrough,
            "border" => IsolationMethod::border_color(),
            program => IsolationMethod::Command {
                program: PathBuf::from(program),
                args: Vec::new(),
            },
        };
    }
    config.validate()?;
    Ok(config)
}

fn positional<'a>(options: &'a Options, index: usize, what: &str) -> Result<&'a str, AnalysisError> {
    options
        .positional
        .get(index)
        .map(String::as_str)
        .ok_or_else(|| AnalysisError::InvalidRequest {
            reason: format!("missing {what}"),
        })
}

fn load_garment(path: &Path, options: &Options) -> Result<Garment, AnalysisError> {
    let bytes = fs::read(path).map_err(|e| {
        AnalysisError::image_load(format!("Failed to read {}", path.display()), e)
    })?;
    let mut garment = Garment::from_bytes(&bytes)?;
    if let Some(count) = options.colors {
        garment.set_color_count(count)?;
    }
    Ok(garment)
}

fn run_colors(options: &Options) -> Result<(), AnalysisError> {
    let pipeline = Pipeline::new(load_config(options)?)?;
    let path = Path::new(positional(options, 0, "image path")?);
    let mut garment = load_garment(path, options)?;

    let response = ColorsResponse {
        colors: pipeline.garment_colors(&mut garment)?,
    };
    print_json(&response);

    eprintln!();
    eprintln!("Dominant colors of {}:", path.display());
    for entry in &response.colors {
        let descriptor = pipeline.describe(entry.color());
        eprintln!(
            "  {} {:>5.1}%  {:<20} {}",
            entry.hex,
            entry.pct * 100.0,
            entry.name,
            descriptor
        );
    }
    Ok(())
}

fn run_match(options: &Options) -> Result<(), AnalysisError> {
    let pipeline = Pipeline::new(load_config(options)?)?;
    if options.positional.is_empty() {
        return Err(AnalysisError::InvalidRequest {
            reason: "no garment images given".to_string(),
        });
    }

    let mut outfit = options
        .positional
        .iter()
        .map(|path| load_garment(Path::new(path), options))
        .collect::<Result<Outfit, _>>()?;

    let mut control = RunControl::new();
    if let Some(ms) = options.timeout_ms {
        control = control.with_deadline(Duration::from_millis(ms));
    }

    let report = pipeline.analyze_outfit(&mut outfit, &control)?;
    print_json(&report);

    eprintln!();
    let names = report.match_names();
    if names.is_empty() {
        eprintln!("No outfit style matches.");
    } else {
        eprintln!("This outfit is: {}", names.join(", "));
    }
    Ok(())
}

fn run_isolate(options: &Options) -> Result<(), AnalysisError> {
    let pipeline = Pipeline::new(load_config(options)?)?;
    let input = Path::new(positional(options, 0, "input image")?);
    let output = Path::new(positional(options, 1, "output path")?);

    let bytes = fs::read(input).map_err(|e| {
        AnalysisError::image_load(format!("Failed to read {}", input.display()), e)
    })?;
    let png = pipeline.isolate_background(&bytes)?;
    fs::write(output, png).map_err(|e| {
        AnalysisError::isolation(format!("Failed to write {}", output.display()), e)
    })?;
    eprintln!("Isolated image saved to {}", output.display());
    Ok(())
}

fn run_strip(options: &Options) -> Result<(), AnalysisError> {
    let pipeline = Pipeline::new(load_config(options)?)?;
    let input = Path::new(positional(options, 0, "input image")?);
    let output = Path::new(positional(options, 1, "output path")?);

    let mut garment = load_garment(input, options)?;
    let colors = garment.colors(pipeline.isolator(), pipeline.extractor())?;
    let png = pipeline.color_strip_png(colors)?;
    fs::write(output, png).map_err(|e| {
        AnalysisError::image_load(format!("Failed to write {}", output.display()), e)
    })?;
    eprintln!("Color strip saved to {}", output.display());
    Ok(())
}

fn run_write_config(options: &Options) -> Result<(), AnalysisError> {
    let output = Path::new(positional(options, 0, "output path")?);
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            AnalysisError::config(format!("Failed to create {}", parent.display()), e)
        })?;
    }

    let config = load_config(options)?;
    config.to_json_file(output)?;

    eprintln!("Configuration saved to {}", output.display());
    eprintln!();
    eprintln!("Config summary:");
    eprintln!(
        "  Extraction: {} clusters, {} dropped as noise, seed {}, {} runs",
        config.extraction.cluster_count,
        config.extraction.denoise,
        config.extraction.seed,
        config.extraction.runs
    );
    eprintln!("  Isolation:  {:?}", config.isolation.method);
    eprintln!("  Naming:     {:?}", config.naming.space);
    eprintln!("  Matching:   {:?}", config.matching.basis);
    Ok(())
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Error serializing result: {e}"),
    }
}

fn print_help(program: &str) {
    eprintln!("Usage: {program} <COMMAND> [OPTIONS] [ARGS]");
    eprintln!();
    eprintln!("Extract garment colors and check whether an outfit matches.");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  colors <image>              Dominant colors of one garment");
    eprintln!("  match <image> <image>...    Outfit styles satisfied by the garments");
    eprintln!("  isolate <input> <output>    Remove the background, write PNG");
    eprintln!("  strip <input> <output>      Render the color strip as PNG");
    eprintln!("  write-config <output>       Write the effective configuration as JSON");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <FILE>        Load configuration from JSON");
    eprintln!("  --colors <N>           Report N colors per garment (clusters N+2, 2 dropped)");
    eprintln!("  --clusters <K>         k-means cluster count");
    eprintln!("  --denoise <D>          Lowest-share clusters dropped as noise");
    eprintln!("  --isolate <METHOD>     passthrough, border, or a background-removal program");
    eprintln!("  --timeout-ms <MS>      Abort a match run that has not finished in time");
    eprintln!("  --help, -h             Show this help message");
    eprintln!();
    eprintln!("Logging is controlled with RUST_LOG (default: info).");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {program} colors shirt.png");
    eprintln!("  {program} match --isolate border shirt.jpg trousers.jpg shoes.jpg");
    eprintln!("  {program} write-config config.json --clusters 6 --denoise 2");
}
