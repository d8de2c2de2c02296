//! A simulator wrapper
//!
//! Glues the trace-decoding collaborator to the simulation context:
//! reads a trace file, probes the instruction cache per record,
//! synthesizes fetch-miss stalls, dispatches, and finalizes.

use crate::cache::CachePolicy;
use crate::error::SimulatorResult;
use crate::pipeline::CACHE_MISS_DELAY;
use crate::simulator::{SimPolicy, Simulator};
use crate::stats::Stats;
use crate::trace::{self, TraceOp, TraceRecord};

/// Run simulation on the given trace file
pub fn run(
    trace_path: &str,
    cache_policy: CachePolicy,
    policy: SimPolicy,
) -> SimulatorResult<Stats> {
    let records = read_trace(trace_path)?;
    Ok(run_records(&records, cache_policy, policy))
}

/// Fetch decoded instruction records from the trace file
pub fn read_trace(trace_path: &str) -> SimulatorResult<Vec<TraceRecord>> {
    let content = std::fs::read_to_string(trace_path)?;
    let mut records = Vec::new();

    for (line_number, line) in content.lines().enumerate() {
        // Skip empty lines
        if line.trim().is_empty() {
            continue;
        }
        records.push(trace::parse_line(line, line_number + 1)?);
    }

    Ok(records)
}

/// Drive one simulation run over already-decoded records
pub fn run_records(
    records: &[TraceRecord],
    cache_policy: CachePolicy,
    policy: SimPolicy,
) -> Stats {
    let mut sim = Simulator::make(cache_policy, policy);

    for record in records {
        let hit = sim.fetch_probe(record.address);
        if policy.verbose {
            if hit {
                eprintln!("[VERBOSE] inst hit:  {:#010x}", record.address);
            } else {
                eprintln!("[VERBOSE] inst miss: {:#010x}", record.address);
            }
        }
        if !hit {
            // The penalty is paid in whole advances rather than a
            // flat cycle charge, so branch recovery happening while
            // the pipeline keeps moving overlaps it instead of being
            // counted twice. One advance belongs to the dispatch
            // below.
            sim.stall(CACHE_MISS_DELAY - 1);
        }

        match &record.op {
            TraceOp::RType { mnemonic, dest_reg, reg1, reg2_or_constant } => {
                sim.dispatch_rtype(
                    record.address,
                    mnemonic,
                    *dest_reg,
                    *reg1,
                    *reg2_or_constant,
                );
            }
            TraceOp::Load { dest_reg, data_address } => {
                sim.dispatch_load(record.address, *dest_reg, *data_address);
            }
            TraceOp::Store { src_reg, data_address } => {
                sim.dispatch_store(record.address, *src_reg, *data_address);
            }
            TraceOp::Branch => sim.dispatch_branch(record.address, -1, -1),
            TraceOp::Jump { mnemonic } => {
                sim.dispatch_jump(record.address, mnemonic);
            }
            TraceOp::Syscall => sim.dispatch_syscall(record.address),
            TraceOp::Nop => sim.dispatch_nop(record.address),
        }

        if policy.dump_pipeline {
            sim.pipeline.dump();
        }
    }

    sim.finalize()
}
