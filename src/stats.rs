//! Summary statistics reported after a run

use crate::cache::CacheHistory;
use crate::pipeline::PipelineHistory;

/// Aggregate performance counters snapshotted by finalize
#[derive(Clone, Copy, Debug, Default)]
pub struct Stats {
    pub cache_accesses: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,

    pub cycles: u64,
    pub instructions: u64,

    pub branches: u64,
    pub correct_predictions: u64,
}

impl Stats {
    pub fn collect(
        cache: &CacheHistory,
        pipeline: &PipelineHistory,
    ) -> Self {
        Self {
            cache_accesses: cache.num_access,
            cache_hits: cache.num_hit,
            cache_misses: cache.num_miss,
            cycles: pipeline.cycle_count,
            instructions: pipeline.inst_count,
            branches: pipeline.branch_count,
            correct_predictions: pipeline.correct_predictions,
        }
    }

    pub fn miss_rate(&self) -> f64 {
        if self.cache_accesses == 0 {
            return 0.0;
        }
        self.cache_misses as f64 / self.cache_accesses as f64
    }

    pub fn cpi(&self) -> f64 {
        if self.instructions == 0 {
            return 0.0;
        }
        self.cycles as f64 / self.instructions as f64
    }

    pub fn prediction_accuracy(&self) -> f64 {
        if self.branches == 0 {
            return 0.0;
        }
        self.correct_predictions as f64 / self.branches as f64
    }

    /// Print the summary block to stdout
    pub fn print(&self) {
        println!("Cache Performance");
        println!("  Accesses:            {}", self.cache_accesses);
        println!("  Hits:                {}", self.cache_hits);
        println!("  Misses:              {}", self.cache_misses);
        println!("  Miss Rate:           {:.4}", self.miss_rate());
        println!();
        println!("Pipeline Performance");
        println!("  Total Cycles:        {}", self.cycles);
        println!("  Total Instructions:  {}", self.instructions);
        println!("  CPI:                 {:.4}", self.cpi());
        println!("  Branches:            {}", self.branches);
        println!("  Correct Predictions: {}", self.correct_predictions);
        if self.branches > 0 {
            println!(
                "  Prediction Accuracy: {:.2}%",
                self.prediction_accuracy() * 100.0
            );
        }
    }
}
