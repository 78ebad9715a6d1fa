use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use rayon::prelude::*;
use tracing::info;

use lib::{load_image, logger, write_model_luts, LutFormat, SourceImage};
use sensor_analysis::{
    estimate, estimate_from_raw_jpeg, EstimateConfig, RawJpegConfig, SamplingStrategy,
    WeightFunction,
};

fn main() -> Result<()> {
    logger::init();

    let output_arg = Arg::with_name("output")
        .short("o")
        .long("output")
        .value_name("PREFIX")
        .help("Prefix of the written LUT files")
        .default_value("camera")
        .takes_value(true);

    let format_arg = Arg::with_name("format")
        .short("f")
        .long("format")
        .value_name("FORMAT")
        .help("LUT file format: cube or spi1d")
        .default_value("cube")
        .takes_value(true);

    let matches = App::new("CRF Estimate")
        .version("0.4")
        .author("Nathan Vegdahl")
        .about("Estimates camera response functions and writes them out as 1D LUTs")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("stack")
                .about("Estimates from a set of differently exposed images of the same scene")
                .arg(
                    Arg::with_name("weight")
                        .short("w")
                        .long("weight")
                        .value_name("WEIGHT")
                        .help("Weighting function: uniform, hat, gaussian, gaussian-clamped, triangular, triangular-padded")
                        .default_value("triangular")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("samples")
                        .short("n")
                        .long("samples")
                        .value_name("N")
                        .help("Number of samples per channel")
                        .default_value("256")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("lambda")
                        .short("l")
                        .long("lambda")
                        .value_name("L")
                        .help("Smoothness strength")
                        .default_value("20")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("spatial")
                        .long("spatial")
                        .help("Pick samples by Poisson-disk point sampling instead of by percentile"),
                )
                .arg(
                    Arg::with_name("seed")
                        .long("seed")
                        .value_name("S")
                        .help("Seed for spatial sampling")
                        .default_value("0")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("exposures")
                        .short("e")
                        .long("exposures")
                        .value_name("t1,t2,..")
                        .help("Exposure times in input order, overriding EXIF data")
                        .use_delimiter(true)
                        .takes_value(true),
                )
                .arg(output_arg.clone())
                .arg(format_arg.clone())
                .arg(
                    Arg::with_name("INPUT")
                        .help("input image files")
                        .required(true)
                        .multiple(true)
                        .index(1),
                ),
        )
        .subcommand(
            SubCommand::with_name("raw-jpeg")
                .about("Estimates from an aligned pair of a linear RAW render and a JPEG")
                .arg(
                    Arg::with_name("window")
                        .long("window")
                        .value_name("N")
                        .help("Smoothing window, 0 to disable")
                        .default_value("11")
                        .takes_value(true),
                )
                .arg(output_arg)
                .arg(format_arg)
                .arg(
                    Arg::with_name("RAW")
                        .help("linear RAW render")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::with_name("JPEG")
                        .help("in-camera JPEG")
                        .required(true)
                        .index(2),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        ("stack", Some(m)) => run_stack(m),
        ("raw-jpeg", Some(m)) => run_raw_jpeg(m),
        _ => unreachable!(),
    }
}

fn run_stack(matches: &ArgMatches) -> Result<()> {
    let weight_name = matches.value_of("weight").unwrap_or("triangular");
    let config = EstimateConfig::builder()
        .weight(
            WeightFunction::from_name(weight_name)
                .ok_or_else(|| anyhow!("unknown weighting function \"{}\"", weight_name))?,
        )
        .samples(parse_value(matches, "samples")?)
        .lambda(parse_value(matches, "lambda")?)
        .sampling(if matches.is_present("spatial") {
            SamplingStrategy::Spatial
        } else {
            SamplingStrategy::Percentile
        })
        .seed(parse_value(matches, "seed")?)
        .build();

    let filenames: Vec<&str> = matches.values_of("INPUT").map(|v| v.collect()).unwrap_or_default();

    info!("Loading {} image files.", filenames.len());
    let mut images: Vec<SourceImage> = filenames
        .par_iter()
        .map(|filename| load_image(Path::new(filename)).with_context(|| format!("loading {}", filename)))
        .collect::<Result<_>>()?;

    if let Some(times) = matches.values_of("exposures") {
        let times: Vec<f32> = times
            .map(|t| t.parse().with_context(|| format!("bad exposure time \"{}\"", t)))
            .collect::<Result<_>>()?;
        if times.len() != images.len() {
            bail!(
                "got {} exposure times for {} images",
                times.len(),
                images.len()
            );
        }
        for (img, t) in images.iter_mut().zip(times) {
            img.image.exposure = t;
        }
    } else if let Some(img) = images.iter().find(|img| img.info.exposure.is_none()) {
        bail!(
            "{} has no exposure data, pass --exposures",
            img.info.full_filepath
        );
    }

    let stack: Vec<_> = images.into_iter().map(|img| img.image).collect();

    info!("Calculating camera response.");
    let model = estimate(&stack, &config)?;

    let (dir, prefix) = split_prefix(matches)?;
    write_model_luts(&model, dir, prefix, lut_format(matches)?)
}

fn run_raw_jpeg(matches: &ArgMatches) -> Result<()> {
    let config = RawJpegConfig {
        filter_window: parse_value(matches, "window")?,
        ..RawJpegConfig::default()
    };

    let load = |name: &str| -> Result<SourceImage> {
        let filename = matches.value_of(name).unwrap_or_default();
        load_image(Path::new(filename)).with_context(|| format!("loading {}", filename))
    };
    let raw = load("RAW")?;
    let jpeg = load("JPEG")?;

    info!("Calculating camera response.");
    let model = estimate_from_raw_jpeg(&raw.image, &jpeg.image, &config)?;

    let (dir, prefix) = split_prefix(matches)?;
    write_model_luts(&model, dir, prefix, lut_format(matches)?)
}

fn parse_value<T>(matches: &ArgMatches, name: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let text = matches
        .value_of(name)
        .ok_or_else(|| anyhow!("missing --{}", name))?;
    text.parse()
        .with_context(|| format!("bad value \"{}\" for --{}", text, name))
}

fn lut_format(matches: &ArgMatches) -> Result<LutFormat> {
    let name = matches.value_of("format").unwrap_or("cube");
    LutFormat::from_name(name).ok_or_else(|| anyhow!("unknown LUT format \"{}\"", name))
}

/// Splits `--output` into the directory to write into and the file name
/// prefix.
fn split_prefix<'a>(matches: &'a ArgMatches) -> Result<(&'a Path, &'a str)> {
    let output = Path::new(matches.value_of("output").unwrap_or("camera"));
    let prefix = output
        .file_name()
        .and_then(|p| p.to_str())
        .ok_or_else(|| anyhow!("bad output prefix \"{}\"", output.display()))?;
    let dir = output.parent().unwrap_or_else(|| Path::new(""));
    Ok((dir, prefix))
}
