//! Simulation context tying the cache model to the pipeline model

use crate::cache::{Cache, CachePolicy};
use crate::instruction::InstructionKind;
use crate::pipeline::Pipeline;
use crate::prediction::StaticPrediction;
use crate::stats::Stats;

/// Run-wide policy knobs
#[derive(Clone, Copy, Debug, Default)]
pub struct SimPolicy {
    /// Static branch prediction choice, fixed for the run
    pub prediction: StaticPrediction,
    /// Print per-access hit/miss lines to stderr
    pub verbose: bool,
    /// Print the stage contents after every dispatched instruction
    pub dump_pipeline: bool,
}

/// One independent simulation run: an owned cache and an owned
/// pipeline, driven by the trace-reading collaborator
pub struct Simulator {
    pub cache: Cache,
    pub pipeline: Pipeline,
    pub policy: SimPolicy,
}

impl Simulator {
    pub fn make(cache_policy: CachePolicy, policy: SimPolicy) -> Self {
        Self {
            cache: Cache::make(cache_policy),
            pipeline: Pipeline::make(policy.prediction, policy.verbose),
            policy,
        }
    }

    /// Instruction-fetch probe. The caller decides how many stall
    /// advances to synthesize on a miss before dispatching.
    pub fn fetch_probe(&mut self, address: u32) -> bool {
        self.cache.probe(address)
    }

    /// Synthesize stall cycles by advancing with nothing new fetched
    pub fn stall(&mut self, cycles: u64) {
        for _ in 0..cycles {
            self.pipeline.advance(&mut self.cache);
        }
    }

    pub fn dispatch_rtype(
        &mut self,
        address: u32,
        mnemonic: &str,
        dest_reg: i32,
        reg1: i32,
        reg2_or_constant: i32,
    ) {
        self.pipeline.dispatch(
            &mut self.cache,
            address,
            InstructionKind::RType {
                mnemonic: mnemonic.to_string(),
                reg1,
                reg2_or_constant,
                dest_reg,
            },
        );
    }

    pub fn dispatch_load(&mut self, address: u32, dest_reg: i32, data_address: u32) {
        self.pipeline.dispatch(
            &mut self.cache,
            address,
            InstructionKind::Load { data_address, dest_reg, base_reg: -1 },
        );
    }

    pub fn dispatch_store(&mut self, address: u32, src_reg: i32, data_address: u32) {
        self.pipeline.dispatch(
            &mut self.cache,
            address,
            InstructionKind::Store { data_address, src_reg, base_reg: -1 },
        );
    }

    pub fn dispatch_branch(&mut self, address: u32, reg1: i32, reg2: i32) {
        self.pipeline.dispatch(
            &mut self.cache,
            address,
            InstructionKind::Branch { reg1, reg2 },
        );
    }

    pub fn dispatch_jump(&mut self, address: u32, mnemonic: &str) {
        self.pipeline.dispatch(
            &mut self.cache,
            address,
            InstructionKind::Jump { mnemonic: mnemonic.to_string() },
        );
    }

    pub fn dispatch_syscall(&mut self, address: u32) {
        self.pipeline.dispatch(
            &mut self.cache,
            address,
            InstructionKind::Syscall,
        );
    }

    pub fn dispatch_nop(&mut self, address: u32) {
        self.pipeline.dispatch(&mut self.cache, address, InstructionKind::Nop);
    }

    /// Flush in-flight instructions and snapshot the counters
    pub fn finalize(&mut self) -> Stats {
        self.pipeline.drain(&mut self.cache);
        Stats::collect(&self.cache.history, &self.pipeline.history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::CACHE_MISS_DELAY;

    fn make_simulator() -> Simulator {
        Simulator::make(
            CachePolicy::make(4, 1, 2).unwrap(),
            SimPolicy::default(),
        )
    }

    #[test]
    fn test_fetch_probe_drives_instruction_cache() {
        let mut sim = make_simulator();
        assert!(!sim.fetch_probe(0x400000));
        assert!(sim.fetch_probe(0x400000));
        let stats = sim.finalize();
        assert_eq!(stats.cache_accesses, 2);
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.cache_misses, 1);
    }

    #[test]
    fn test_fetch_miss_stalls_burn_cycles() {
        let mut sim = make_simulator();
        let hit = sim.fetch_probe(0x400000);
        assert!(!hit);
        sim.stall(CACHE_MISS_DELAY - 1);
        sim.dispatch_rtype(0x400000, "add", 1, 2, 3);
        let stats = sim.finalize();
        // Nine stall advances before the usual six for one
        // instruction
        assert_eq!(stats.cycles, CACHE_MISS_DELAY - 1 + 6);
        assert_eq!(stats.instructions, 1);
    }

    #[test]
    fn test_counters_reconcile_across_both_models() {
        let mut sim = make_simulator();
        for i in 0..4u32 {
            let address = 0x400000 + i * 4;
            if !sim.fetch_probe(address) {
                sim.stall(CACHE_MISS_DELAY - 1);
            }
            sim.dispatch_load(address, 2, 0x10010000 + i * 64);
        }
        let stats = sim.finalize();
        assert_eq!(
            stats.cache_hits + stats.cache_misses,
            stats.cache_accesses
        );
        // 4 instruction fetches + 4 data probes
        assert_eq!(stats.cache_accesses, 8);
        assert_eq!(stats.instructions, 4);
    }
}
