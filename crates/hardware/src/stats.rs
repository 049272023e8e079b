//! Simulation statistics collection and reporting.
//!
//! Tracks performance metrics for a run:
//! 1. **Cycle and IPC:** Total cycles, committed instructions, derived CPI.
//! 2. **Instruction mix:** Commit counts by category.
//! 3. **Speculation:** Branch resolutions, mispredicts, pipeline flushes.
//! 4. **Back-pressure:** Rename and dispatch stall cycles.

use std::time::Instant;

/// Counters for one simulation run.
#[derive(Clone)]
pub struct SimStats {
    start_time: Instant,
    /// Total simulated clock cycles.
    pub cycles: u64,
    /// Instructions retired by the ROB.
    pub instructions_committed: u64,

    /// ALU instructions retired.
    pub inst_alu: u64,
    /// Loads retired.
    pub inst_load: u64,
    /// Stores retired.
    pub inst_store: u64,
    /// Branches and jumps retired.
    pub inst_branch: u64,

    /// Branch-unit resolutions.
    pub branch_resolutions: u64,
    /// Mispredicted resolutions.
    pub branch_mispredicts: u64,
    /// Flush/recovery pulses taken.
    pub pipeline_flushes: u64,

    /// Cycles a decoded instruction waited on rename resources.
    pub stalls_rename: u64,
    /// Cycles a renamed instruction waited in the dispatch buffer.
    pub stalls_dispatch: u64,
    /// Loads satisfied by store-to-load forwarding.
    pub store_forwards: u64,
}

impl Default for SimStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            instructions_committed: 0,
            inst_alu: 0,
            inst_load: 0,
            inst_store: 0,
            inst_branch: 0,
            branch_resolutions: 0,
            branch_mispredicts: 0,
            pipeline_flushes: 0,
            stalls_rename: 0,
            stalls_dispatch: 0,
            store_forwards: 0,
        }
    }
}

impl SimStats {
    /// Prints all statistics sections to stdout.
    pub fn print(&self) {
        let seconds = self.start_time.elapsed().as_secs_f64();
        let cyc = self.cycles.max(1);
        let instr = self.instructions_committed.max(1);

        let ipc = self.instructions_committed as f64 / cyc as f64;
        let cpi = cyc as f64 / instr as f64;
        let khz = (self.cycles as f64 / seconds.max(1e-9)) / 1000.0;

        println!("\n==========================================================");
        println!("OUT-OF-ORDER CORE SIMULATION STATISTICS");
        println!("==========================================================");
        println!("host_seconds             {:.4} s", seconds);
        println!("sim_cycles               {}", self.cycles);
        println!("sim_freq                 {:.2} kHz", khz);
        println!("sim_insts                {}", self.instructions_committed);
        println!("sim_ipc                  {:.4}", ipc);
        println!("sim_cpi                  {:.4}", cpi);
        println!("----------------------------------------------------------");
        println!("INSTRUCTION MIX");
        let pct = |n: u64| (n as f64 / instr as f64) * 100.0;
        println!("  op.alu                 {} ({:.2}%)", self.inst_alu, pct(self.inst_alu));
        println!("  op.load                {} ({:.2}%)", self.inst_load, pct(self.inst_load));
        println!("  op.store               {} ({:.2}%)", self.inst_store, pct(self.inst_store));
        println!("  op.branch              {} ({:.2}%)", self.inst_branch, pct(self.inst_branch));
        println!("----------------------------------------------------------");
        println!("SPECULATION");
        let bp_total = self.branch_resolutions.max(1);
        let bp_acc = 100.0 * (1.0 - self.branch_mispredicts as f64 / bp_total as f64);
        println!("  bru.resolutions        {}", self.branch_resolutions);
        println!("  bru.mispredicts        {}", self.branch_mispredicts);
        println!("  bru.accuracy           {:.2}%", bp_acc);
        println!("  pipeline.flushes       {}", self.pipeline_flushes);
        println!("----------------------------------------------------------");
        println!("BACK-PRESSURE");
        let cpct = |n: u64| (n as f64 / cyc as f64) * 100.0;
        println!(
            "  stalls.rename          {} ({:.2}%)",
            self.stalls_rename,
            cpct(self.stalls_rename)
        );
        println!(
            "  stalls.dispatch        {} ({:.2}%)",
            self.stalls_dispatch,
            cpct(self.stalls_dispatch)
        );
        println!("  lsu.store_forwards     {}", self.store_forwards);
        println!("==========================================================");
    }
}
