//! Run an ADC sweep and print the result table
//!
//! Usage: `cargo run --example adc_sweep [config.toml]`
//!
//! Without a configuration file, the default grid (8/10/12 bits, four noise
//! levels, two amplitudes) is used. Set `ADC_SWEEP_VERBOSE=1` for debug
//! logging.

use adcmetrics::sweep::{run_sweep, SweepConfig};

fn format_cell(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{value:>10.3}"),
        None => format!("{:>10}", "-"),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let level = if std::env::var_os("ADC_SWEEP_VERBOSE").is_some() {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let config = match std::env::args().nth(1) {
        Some(path) => SweepConfig::from_toml_str(&std::fs::read_to_string(path)?)?,
        None => SweepConfig::default(),
    };
    let records = run_sweep(&config)?;

    println!(
        "{:>5} {:>10} {:>6} {:>10} {:>10} {:>10} {:>10}",
        "bits", "noise_std", "amp", "snr_db", "thd_db", "sinad_db", "enob"
    );
    for record in records.iter() {
        let row = record.row();
        println!(
            "{:>5} {:>10} {:>6} {} {} {} {}",
            row.bits,
            row.noise_std,
            row.amp,
            format_cell(row.snr_db),
            format_cell(row.thd_db),
            format_cell(row.sinad_db),
            format_cell(row.enob),
        );
    }
    Ok(())
}
