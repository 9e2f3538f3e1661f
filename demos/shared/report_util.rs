use std::error::Error;
use std::io::Cursor;

use flowable_report::{ListValue, ReportBuilder};
use image::{DynamicImage, ImageBuffer, ImageOutputFormat, Rgb};

/// Requested size of the headline chart, in inches.
const CHART_SIZE_IN: (f64, f64) = (5.0, 3.0);

/// Deliberately oversized request; the report clamps it to the printable bounds.
const POSTER_SIZE_IN: (f64, f64) = (11.0, 14.0);

pub fn build_sample_report(path: &str) -> Result<ReportBuilder, Box<dyn Error>> {
    let mut report = ReportBuilder::new(path, "Engineering Highlights", "Spring Edition");

    report
        .print_line("Prepared for the Architecture Guild to summarise quarterly progress.")
        .print_markup(
            "<b>Status:</b> <font color=\"#245CA0\">on track</font> &amp; <i>under budget</i>",
        )?
        .print_spacer()
        .print_line("Regional throughput")
        .print_list(regional_rows())
        .print_spacer()
        .print_image_bytes(generate_chart_image()?, CHART_SIZE_IN.0, CHART_SIZE_IN.1)
        .print_line("Figure 1: rolling eight-week throughput.")
        .print_image_bytes(generate_poster_image()?, POSTER_SIZE_IN.0, POSTER_SIZE_IN.1)
        .print_line("Figure 2: roadmap swimlanes, scaled to fit the page.");

    for (index, note) in RELEASE_NOTES.iter().enumerate() {
        report.print_line(format!("{}. {}", index + 1, note));
    }

    Ok(report)
}

const RELEASE_NOTES: &[&str] = &[
    "Deployment pipeline moved to incremental artifact caching.",
    "Search indexing latency dropped below two seconds at p95.",
    "Alert routing now pages the owning team directly.",
    "Billing exports gained a nightly reconciliation job.",
];

fn regional_rows() -> ListValue {
    [
        ["North: 12 releases", "stable"],
        ["South: 9 releases", "stable"],
        ["East: 14 releases", "improving"],
        ["West: 7 releases", "at risk"],
    ]
    .into()
}

/// Cool gradient standing in for a metrics chart.
fn generate_chart_image() -> Result<Vec<u8>, image::ImageError> {
    generate_gradient_image(360, 216, [60, 92, 180], [200, 220, 255])
}

/// Warm gradient large enough to exercise the size clamp.
fn generate_poster_image() -> Result<Vec<u8>, image::ImageError> {
    generate_gradient_image(792, 1008, [122, 70, 132], [244, 206, 118])
}

fn generate_gradient_image(
    width: u32,
    height: u32,
    start: [u8; 3],
    end: [u8; 3],
) -> Result<Vec<u8>, image::ImageError> {
    let width_f = width.saturating_sub(1).max(1) as f32;
    let height_f = height.saturating_sub(1).max(1) as f32;
    let buffer = ImageBuffer::from_fn(width, height, |x, y| {
        let mix = (0.65 * x as f32 / width_f + 0.35 * y as f32 / height_f).clamp(0.0, 1.0);
        let mut channels = [0u8; 3];
        for (index, channel) in channels.iter_mut().enumerate() {
            let start = start[index] as f32;
            let end = end[index] as f32;
            *channel = (start + (end - start) * mix).round().clamp(0.0, 255.0) as u8;
        }
        Rgb(channels)
    });

    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(buffer).write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)?;
    Ok(bytes)
}
