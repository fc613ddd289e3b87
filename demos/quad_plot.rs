//! Plot out the four outputs of the quad and phase topologies
//!
//! Look in /images/ for the resulting plot.
//!
//! Requires plotters lib: https://docs.rs/plotters/latest/plotters/.

use plotters::prelude::*;
use quad_lfo::{
    lfo::Lfo,
    processor::Processor,
    settings::FeatureMode,
    ui::Controls,
    NUM_CHANNELS,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let sample_rate = 1_000;

    // plot 2 seconds
    let num_points = 2 * sample_rate;

    std::fs::create_dir_all("images")?;
    let root = BitMapBackend::new("images/quad_example_plot_0.png", (960, 720)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled("Quad LFO Topologies", ("sans-serif", 40))?;

    let sub_areas = root.split_evenly((2, 1));

    let details = [(FeatureMode::Quad, "Quad"), (FeatureMode::Phase, "Phase")];
    let colors = [RED, BLUE, GREEN, BLACK];

    for (idx, area) in (0..).zip(sub_areas.iter()) {
        let (feature_mode, title) = details[idx];

        let mut controls = Controls {
            feature_mode,
            ..Default::default()
        };
        for (ch, c) in controls.channels.iter_mut().enumerate() {
            // the master near 1 Hz, the others spread across their pots
            c.coarse = 32_768;
            c.phase = u16::MAX - (ch as u16) * 12_000;
        }

        let mut processor = Processor::new(Lfo::bank(sample_rate));
        let samples: Vec<[i16; NUM_CHANNELS]> = (0..num_points)
            .map(|_| {
                processor
                    .process(&controls, &[0; NUM_CHANNELS], &[0; NUM_CHANNELS])
                    .map(|outputs| outputs.map(|o| o.sine))
                    .unwrap_or_default()
            })
            .collect();

        let mut chart = ChartBuilder::on(area)
            .caption(title, ("sans-serif", 15).into_font())
            .x_label_area_size(40)
            .y_label_area_size(40)
            .build_cartesian_2d(0f32..2f32, -1.25f32..1.25f32)?;

        chart
            .configure_mesh()
            .x_desc("Time")
            .y_desc("Amplitude")
            .draw()?;

        for (ch, color) in colors.iter().enumerate() {
            chart.draw_series(LineSeries::new(
                samples.iter().enumerate().map(|(x, s)| {
                    (
                        x as f32 / sample_rate as f32,
                        s[ch] as f32 / i16::MAX as f32,
                    )
                }),
                *color,
            ))?;
        }
    }

    root.present()?;

    Ok(())
}
