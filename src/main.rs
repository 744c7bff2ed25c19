use order_matcher::config::{load_config, RunConfig};
use order_matcher::diagnostics::RunReport;
use order_matcher::image::io::{read_json_file, save_grayscale_f32, write_json_file};
use order_matcher::{
    EditDistanceResolver, LocalizationSet, LocalizationTable, OrientationEstimator,
    SearchController, SearchOutcome,
};
use std::env;
use std::path::Path;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = load_config(Path::new(&config_path))?;
    let settings = config.validate().map_err(|e| e.to_string())?;

    let table: LocalizationTable = read_json_file(&config.input)?;
    let set = table
        .into_localizations(&EditDistanceResolver::default())
        .map_err(|e| e.to_string())?;

    let outcome = SearchController::new(settings)
        .run(&set)
        .map_err(|e| e.to_string())?;

    if let Some(dir) = &config.output.debug_dir {
        save_debug_images(&config, &set, &outcome, dir)?;
    }

    let report = RunReport::new(&set, &outcome, config.orders, config.output.schema);
    if let Some(path) = &config.output.json_out {
        write_json_file(path, &report)?;
        println!("Saved {} chains to {}", report.chain_count, path.display());
    }

    let w = &outcome.window;
    println!(
        "flip={} mirror={} chains={} angle=[{:.4}, {:.4}] distance=[{:.1}, {:.1}] total_ms={:.1}",
        outcome.permutation.flip,
        outcome.permutation.mirror,
        outcome.chains.len(),
        w.angle.low,
        w.angle.high,
        w.distance.low,
        w.distance.high,
        outcome.timings.total_ms
    );
    for warning in &outcome.warnings {
        println!("warning: {warning:?}");
    }
    Ok(())
}

/// Density raster and both spectra of the selected permutation.
fn save_debug_images(
    config: &RunConfig,
    set: &LocalizationSet,
    outcome: &SearchOutcome,
    dir: &Path,
) -> Result<(), String> {
    let estimator = OrientationEstimator::new(config.estimator.clone());
    let (_, trace) = estimator.estimate_with_trace(&set.positions(), outcome.permutation);
    let images = [
        ("density.png", trace.density.as_ref(), false),
        ("magnitude.png", trace.magnitude.as_ref(), true),
        ("spacing.png", trace.spacing.as_ref(), true),
    ];
    for (name, image, log_scale) in images {
        if let Some(image) = image {
            save_grayscale_f32(image, &dir.join(name), log_scale)?;
        }
    }
    write_json_file(&dir.join("spacing_peaks.json"), &trace.peaks)?;
    println!("Saved estimator debug output to {}", dir.display());
    Ok(())
}

fn usage() -> String {
    "Usage: order_matcher <config.json>".to_string()
}
