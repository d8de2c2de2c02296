//! 5-stage in-order pipeline timing model

use crate::cache::Cache;
use crate::instruction::{is_immediate_form, InstructionKind};
use crate::prediction::StaticPrediction;

/// Cycles charged for a cache miss
pub const CACHE_MISS_DELAY: u64 = 10;

/// Number of pipeline stages
pub const STAGE_COUNT: usize = 5;

// Stage positions in the slot array
const FETCH: usize = 0;
const DECODE: usize = 1;
const ALU: usize = 2;
const MEM: usize = 3;
const WRITEBACK: usize = 4;

/// Sequential fetch stride; a successor whose address delta differs
/// means the branch before it was taken
const FETCH_STRIDE: u32 = 4;

/// One pipeline stage slot: a decoded instruction plus its address.
/// An address of 0 marks the slot empty; real instructions must
/// never carry address 0.
#[derive(Clone, Debug, Default)]
pub struct PipelineSlot {
    pub kind: InstructionKind,
    pub address: u32,
}

impl PipelineSlot {
    pub fn is_empty(&self) -> bool {
        self.address == 0
    }
}

/// Counters accumulated over a run
#[derive(Clone, Copy, Debug, Default)]
pub struct PipelineHistory {
    pub cycle_count: u64,
    pub inst_count: u64,
    pub branch_count: u64,
    pub correct_predictions: u64,
}

/// Fixed 5-stage shift register (Fetch, Decode, Alu, Mem, Writeback)
/// advanced one step per call
pub struct Pipeline {
    slots: [PipelineSlot; STAGE_COUNT],
    prediction: StaticPrediction,
    verbose: bool,
    pub history: PipelineHistory,
}

impl Pipeline {
    pub fn make(prediction: StaticPrediction, verbose: bool) -> Self {
        Self {
            slots: Default::default(),
            prediction,
            verbose,
            history: PipelineHistory::default(),
        }
    }

    /// Advance the pipeline by one step, consulting the data cache
    /// for loads and stores reaching the Mem stage
    pub fn advance(&mut self, cache: &mut Cache) {
        // Whatever reached Writeback retires
        if !self.slots[WRITEBACK].is_empty() {
            self.history.inst_count += 1;
        }

        self.resolve_branch();
        self.check_mem_stage(cache);

        // One cycle of normal processing, charged unconditionally
        self.history.cycle_count += 1;

        // Shift back-to-front so no stage is overwritten before it
        // has been copied; Fetch is left empty for the next dispatch
        self.slots[WRITEBACK] = std::mem::take(&mut self.slots[MEM]);
        self.slots[MEM] = std::mem::take(&mut self.slots[ALU]);
        self.slots[ALU] = std::mem::take(&mut self.slots[DECODE]);
        self.slots[DECODE] = std::mem::take(&mut self.slots[FETCH]);
    }

    /// Judge a branch sitting in Decode against the address of the
    /// instruction fetched behind it
    fn resolve_branch(&mut self) {
        if !matches!(self.slots[DECODE].kind, InstructionKind::Branch { .. })
        {
            return;
        }
        self.history.branch_count += 1;

        let fetch_address = self.slots[FETCH].address;
        if fetch_address == 0 {
            // End of trace: no successor to judge the prediction by
            return;
        }

        let taken = fetch_address
            .wrapping_sub(self.slots[DECODE].address)
            != FETCH_STRIDE;

        if taken == self.prediction.predicts_taken() {
            self.history.correct_predictions += 1;
            return;
        }

        // Mispredicted: one recovery cycle. The three back stages
        // move now and Decode becomes the bubble; the regular shift
        // in advance() then refills Decode from Fetch. Stages must
        // not shift twice in the same call.
        self.history.cycle_count += 1;
        self.slots[WRITEBACK] = std::mem::take(&mut self.slots[MEM]);
        self.slots[MEM] = std::mem::take(&mut self.slots[ALU]);
        self.slots[ALU] = std::mem::take(&mut self.slots[DECODE]);
        if !self.slots[WRITEBACK].is_empty() {
            self.history.inst_count += 1;
        }
    }

    /// Data-cache timing for the Mem stage, plus the load-use stall
    fn check_mem_stage(&mut self, cache: &mut Cache) {
        match self.slots[MEM].kind {
            InstructionKind::Load { data_address, dest_reg, .. } => {
                let data_hit = cache.probe(data_address);
                if self.verbose {
                    if data_hit {
                        eprintln!(
                            "[VERBOSE] data hit:  {:#010x}",
                            data_address
                        );
                    } else {
                        eprintln!(
                            "[VERBOSE] data miss: {:#010x}",
                            data_address
                        );
                    }
                }
                if !data_hit {
                    // One cycle of the penalty rides on the
                    // unconditional charge in advance()
                    self.history.cycle_count += CACHE_MISS_DELAY - 1;
                }

                // Load-use hazard: an R-Type in Alu reading the
                // load's destination. The second operand is a
                // constant for immediate-form mnemonics and cannot
                // conflict.
                let hazard = match &self.slots[ALU].kind {
                    InstructionKind::RType {
                        mnemonic,
                        reg1,
                        reg2_or_constant,
                        ..
                    } => {
                        *reg1 == dest_reg
                            || (*reg2_or_constant == dest_reg
                                && !is_immediate_form(mnemonic))
                    }
                    _ => false,
                };

                let mut inserted_bubble = false;
                if hazard {
                    // The consumer waits one cycle while the load
                    // moves ahead, leaving a bubble in Mem
                    self.history.cycle_count += 1;
                    self.slots[WRITEBACK] =
                        std::mem::take(&mut self.slots[MEM]);
                    inserted_bubble = true;
                    if !self.slots[WRITEBACK].is_empty() {
                        self.history.inst_count += 1;
                    }
                }

                // The stall cycle and the miss penalty overlap;
                // the shared cycle is charged once
                if !data_hit && inserted_bubble {
                    self.history.cycle_count -= 1;
                }
            }
            InstructionKind::Store { data_address, .. } => {
                let data_hit = cache.probe(data_address);
                if self.verbose {
                    if data_hit {
                        eprintln!(
                            "[VERBOSE] data hit:  {:#010x}",
                            data_address
                        );
                    } else {
                        eprintln!(
                            "[VERBOSE] data miss: {:#010x}",
                            data_address
                        );
                    }
                }
                // Stores have no destination register, so no hazard
                // check is needed
                if !data_hit {
                    self.history.cycle_count += CACHE_MISS_DELAY - 1;
                }
            }
            _ => {}
        }
    }

    /// Advance until every stage is empty, flushing in-flight
    /// instructions at end of trace
    pub fn drain(&mut self, cache: &mut Cache) {
        while self.slots.iter().any(|slot| !slot.is_empty()) {
            self.advance(cache);
        }
    }

    /// Issue one instruction: advance once (pushing the current
    /// Fetch occupant forward), then occupy the freed Fetch slot.
    /// This ordering realizes one-instruction-per-cycle fetch issue.
    pub fn dispatch(
        &mut self,
        cache: &mut Cache,
        address: u32,
        kind: InstructionKind,
    ) {
        self.advance(cache);
        self.slots[FETCH] = PipelineSlot { kind, address };
    }

    /// Print the current stage contents on one line
    pub fn dump(&self) {
        eprintln!(
            "(cyc: {}) FETCH: {}:{:#x} | DECODE: {}:{:#x} | ALU: {}:{:#x} \
             | MEM: {}:{:#x} | WB: {}:{:#x}",
            self.history.cycle_count,
            self.slots[FETCH].kind.label(),
            self.slots[FETCH].address,
            self.slots[DECODE].kind.label(),
            self.slots[DECODE].address,
            self.slots[ALU].kind.label(),
            self.slots[ALU].address,
            self.slots[MEM].kind.label(),
            self.slots[MEM].address,
            self.slots[WRITEBACK].kind.label(),
            self.slots[WRITEBACK].address,
        );
    }
}
