use std::process;

use sim_lib::cache::CachePolicy;
use sim_lib::prediction::StaticPrediction;
use sim_lib::run_wrapper;
use sim_lib::simulator::SimPolicy;

fn main() {
    if let Err(e) = run_eval() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run_eval() -> Result<(), Box<dyn std::error::Error>> {
    let param_tokens: Vec<String> = std::env::args().collect();
    let trace_path = param_tokens
        .get(1)
        .ok_or("You should specify exactly one trace file")?;
    let trace_base_name = String::from(trace_path.split('/').last().unwrap());
    let output_path = format!("eval/sweep_eval_{}.csv", trace_base_name);

    let mut writer = csv::Writer::from_path(output_path)?;
    writer.write_record([
        "Index bits",
        "Block size",
        "Associativity",
        "Prediction",
        "Miss rate",
        "CPI",
        "Accuracy",
    ])?;

    // Decode the trace once; every configuration replays the same
    // records
    let records = run_wrapper::read_trace(trace_path)?;

    // Geometries chosen to stay inside the size budget while
    // spanning direct-mapped through 2-way and small through large
    // line counts
    let geometries =
        [(2, 1, 1), (4, 1, 1), (4, 1, 2), (4, 4, 2), (5, 2, 2), (7, 1, 1)];

    for (index_bits, block_size, associativity) in geometries {
        for (label, prediction) in
            [("NT", StaticPrediction::NotTaken), ("T", StaticPrediction::Taken)]
        {
            let cache_policy =
                CachePolicy::make(index_bits, block_size, associativity)?;
            let policy = SimPolicy { prediction, ..Default::default() };
            let stats =
                run_wrapper::run_records(&records, cache_policy, policy);

            writer.write_record([
                index_bits.to_string(),
                block_size.to_string(),
                associativity.to_string(),
                label.to_string(),
                format!("{:.3}", stats.miss_rate()),
                format!("{:.3}", stats.cpi()),
                format!("{:.3}", stats.prediction_accuracy()),
            ])?;
        }
    }

    writer.flush()?;
    Ok(())
}
