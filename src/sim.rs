use std::env;
use std::error::Error;
use std::io::{self, Write};

use sim_lib::cache::CachePolicy;
use sim_lib::prediction::StaticPrediction;
use sim_lib::run_wrapper;
use sim_lib::simulator::SimPolicy;
use text_io::read;

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = env::args().skip(1);

    let mut trace_file: Option<String> = None;
    let mut index_bits: u32 = 4;
    let mut block_size: u32 = 1;
    let mut associativity: u32 = 2;
    let mut policy = SimPolicy::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-v" => policy.verbose = true,
            "-d" => policy.dump_pipeline = true,
            "-c" => {
                index_bits = parse_next(&mut args, "index bits after -c")?;
                block_size = parse_next(&mut args, "block size after -c")?;
                associativity =
                    parse_next(&mut args, "associativity after -c")?;
            }
            "-p" => {
                let prediction_arg = args
                    .next()
                    .ok_or("You should specify a prediction after -p")?;
                policy.prediction = match prediction_arg.as_str() {
                    "T" => StaticPrediction::Taken,
                    "NT" => StaticPrediction::NotTaken,
                    _ => {
                        return Err(
                            "Invalid prediction specified after -p".into()
                        )
                    }
                };
            }
            _ => {
                if trace_file.is_some() {
                    return Err(format!("Unknown parameter: {}", arg).into());
                }
                trace_file = Some(arg);
            }
        }
    }

    // With no trace argument, fall back to prompting for the whole
    // configuration
    let trace_file = match trace_file {
        Some(path) => path,
        None => {
            print!("Please enter the tracefile: ");
            io::stdout().flush()?;
            let path: String = read!();

            print!("Enter cache index bits, blocksize (words) and associativity: ");
            io::stdout().flush()?;
            index_bits = read!();
            block_size = read!();
            associativity = read!();

            print!("Enter branch prediction: 0 (NOT taken), 1 (TAKEN): ");
            io::stdout().flush()?;
            let taken: u32 = read!();
            policy.prediction = if taken == 0 {
                StaticPrediction::NotTaken
            } else {
                StaticPrediction::Taken
            };

            path
        }
    };

    let cache_policy =
        CachePolicy::make(index_bits, block_size, associativity)?;

    println!("Cache Configuration");
    println!(
        "  Index: {} bits or {} lines",
        cache_policy.index_bits,
        cache_policy.line_count()
    );
    println!("  BlockSize: {}", cache_policy.block_size);
    println!("  Associativity: {}", cache_policy.associativity);
    println!("  BlockOffsetBits: {}", cache_policy.block_offset_bits);
    println!("  CacheSize: {} units", cache_policy.size_units());
    println!();

    let stats = run_wrapper::run(&trace_file, cache_policy, policy)?;
    stats.print();

    Ok(())
}

fn parse_next<T: std::str::FromStr>(
    args: &mut impl Iterator<Item = String>,
    what: &str,
) -> Result<T, Box<dyn Error>> {
    let token = args
        .next()
        .ok_or_else(|| format!("You should specify {}", what))?;
    token
        .parse()
        .map_err(|_| format!("Invalid value '{}' for {}", token, what).into())
}
