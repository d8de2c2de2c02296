use sim_lib::cache::CachePolicy;
use sim_lib::run_wrapper;
use sim_lib::simulator::SimPolicy;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let param_tokens: Vec<String> = std::env::args().collect();
    let trace_path = param_tokens
        .get(1)
        .ok_or("You should specify exactly one trace file")?;

    let records = run_wrapper::read_trace(trace_path)?;

    // Plot one line series per associativity
    // For a fixed block size, vary the index bits
    // Performance metric: miss rate
    let associativities = vec![1u32, 2, 4];
    let index_bits_range = vec![1u32, 2, 3, 4, 5];

    // Propagate the data
    let mut data: Vec<Vec<(u32, f64)>> = vec![vec![]; associativities.len()];
    for (i, assoc) in associativities.iter().enumerate() {
        for index_bits in index_bits_range.iter() {
            let cache_policy = CachePolicy::make(*index_bits, 1, *assoc)?;
            let stats = run_wrapper::run_records(
                &records,
                cache_policy,
                SimPolicy::default(),
            );
            data[i].push((*index_bits, stats.miss_rate()));
        }
    }

    // Plot the data
    use plotters::prelude::*;

    let trace_base_name = String::from(trace_path.split('/').last().unwrap());
    let plot_title =
        format!("Miss rate by cache geometry: {}", trace_base_name);
    let output_path = format!("eval/plot_eval_{}.svg", trace_base_name);

    let root =
        SVGBackend::new(output_path.as_str(), (800, 600)).into_drawing_area();
    root.fill(&WHITE).unwrap();

    let mut ctx = ChartBuilder::on(&root)
        .caption(plot_title.as_str(), ("sans-serif", 40).into_font())
        .margin(5)
        .x_label_area_size(40)
        .y_label_area_size(40)
        .build_cartesian_2d(1..5, 0.0..1.05)
        .unwrap();
    ctx.configure_mesh()
        .x_desc("Index bits")
        .y_desc("Miss rate")
        .draw()
        .unwrap();

    for (i, assoc) in associativities.iter().enumerate() {
        let series = data[i].iter().map(|(x, y)| (*x as i32, *y));
        let label = format!("{}-way", assoc);
        let color = Palette99::pick(i).to_rgba();
        ctx.draw_series(LineSeries::new(series, color))
            .unwrap()
            .label(label)
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color)
            });
    }

    ctx.configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .unwrap();

    Ok(())
}
