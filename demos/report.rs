#[path = "shared/report_util.rs"]
mod report_util;

use std::env;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let path = env::args().nth(1).unwrap_or_else(|| "report.pdf".to_string());
    let report = report_util::build_sample_report(&path)?;
    report.generate()?;
    println!("Generated {}", path);
    Ok(())
}
