//! Structural invariants checked on every tick of real programs.
//!
//! Each scenario runs with a checker that inspects the machine between
//! ticks: free-list/map-table disjointness, zero-register pinning, unique
//! physical bindings, and commit order equal to rename order (modulo
//! recovery squashes).

mod common;

use std::collections::VecDeque;

use common::TestContext;
use common::asm::*;
use o3sim_core::common::RobTag;
use o3sim_core::common::constants::N_ARCH_REGS;
use o3sim_core::core::Core;

/// Invariants that must hold between any two ticks.
fn check_structural(core: &Core) {
    // Zero-register invariance.
    assert_eq!(core.map_table.lookup(0), 0);
    assert_eq!(core.prf.read(0), 0);
    assert!(core.prf.is_valid(0));

    let rat = core.map_table.mappings();

    // Freelist-RAT disjointness: no mapped physical is simultaneously free.
    for (arch, &preg) in rat.iter().enumerate() {
        assert!(
            !core.free_list.is_free(preg),
            "x{arch} maps to free physical p{preg}"
        );
    }

    // No shared bindings: every mapped physical backs exactly one
    // architectural register.
    let mut seen = [false; 128];
    for &preg in rat.iter() {
        assert!(!seen[preg] || preg == 0, "p{preg} mapped twice");
        seen[preg] = true;
    }

    // A live entry's superseded physical is never in the free list: it is
    // exactly what commit will release.
    let live = core.rob.live_tags();
    for slot in 0..16 {
        let tag = RobTag(slot as u8);
        if live.contains(tag) {
            let entry = core.rob.entry(tag);
            if entry.rd_used {
                assert!(
                    !core.free_list.is_free(entry.old_prd),
                    "live {tag} holds freed old p{}",
                    entry.old_prd
                );
            }
        }
    }
}

/// Tracks rename/commit order across ticks.
///
/// On a recovery pulse, every rename strictly younger than the recovering
/// branch is erased from the expected sequence; commits must then match
/// the remaining sequence exactly.
struct CommitOrderChecker {
    in_flight: VecDeque<RobTag>,
}

impl CommitOrderChecker {
    fn new() -> Self {
        Self {
            in_flight: VecDeque::new(),
        }
    }

    fn observe(
        &mut self,
        recover: Option<RobTag>,
        renamed: Option<RobTag>,
        committed: Option<RobTag>,
    ) {
        if let Some(branch) = recover {
            // Tags in flight are unique, so the branch position is
            // unambiguous; if the branch already retired, every remaining
            // rename is younger than it.
            match self.in_flight.iter().position(|&t| t == branch) {
                Some(pos) => self.in_flight.truncate(pos + 1),
                None => self.in_flight.clear(),
            }
        }

        if let Some(tag) = committed {
            let front = self
                .in_flight
                .pop_front()
                .expect("commit without a matching rename");
            assert_eq!(front, tag, "commit order diverged from rename order");
        }

        if let Some(tag) = renamed {
            self.in_flight.push_back(tag);
        }
    }
}

/// Runs a program with every check applied each tick.
fn run_checked(words: &[u32], cycles: u64) -> TestContext {
    let mut ctx = TestContext::with_program(words);
    let mut order = CommitOrderChecker::new();
    for _ in 0..cycles {
        // The pulse registered right now is what the coming tick consumes.
        let rec = ctx.sim.core.recovery.output();
        let events = ctx.sim.tick();
        check_structural(&ctx.sim.core);
        order.observe(
            rec.recover.then_some(rec.recover_tag),
            events.renamed,
            events.committed.map(|c| c.tag),
        );
    }
    // Quiescent valid-bit consistency: with no writer in flight past the
    // program (the tail is a NOP stream), every architectural register's
    // physical must be valid.
    for arch in 0..N_ARCH_REGS {
        let preg = ctx.sim.core.map_table.lookup(arch);
        assert!(
            ctx.sim.core.prf.is_valid(preg),
            "x{arch} left with pending p{preg}"
        );
    }
    ctx
}

#[test]
fn test_invariants_straight_line() {
    let ctx = run_checked(
        &[addi(10, 0, 3), addi(11, 0, 4), add(10, 10, 11)],
        400,
    );
    assert_eq!(ctx.reg(10), 7);
}

#[test]
fn test_invariants_under_recovery() {
    let ctx = run_checked(
        &[
            addi(10, 0, 0),
            addi(11, 0, 5),
            addi(10, 10, 1),
            addi(11, 11, -1),
            bne(11, 0, -8),
        ],
        2000,
    );
    assert_eq!(ctx.reg(10), 5);
    assert!(ctx.sim.core.stats.pipeline_flushes >= 4);
}

#[test]
fn test_invariants_under_memory_traffic() {
    let ctx = run_checked(
        &[
            addi(5, 0, 42),
            sw(5, 0, 0),
            lw(10, 0, 0),
            addi(6, 0, -1),
            sh(6, 0, 6),
            lw(11, 0, 4),
        ],
        1500,
    );
    assert_eq!(ctx.reg(10), 42);
    assert_eq!(ctx.reg(11), 0xFFFF_0000);
}

#[test]
fn test_invariants_under_jumps() {
    let ctx = run_checked(
        &[jal(1, 8), addi(10, 0, 99), addi(10, 0, 77), jal(0, 8), addi(10, 0, 99)],
        1000,
    );
    assert_eq!(ctx.reg(10), 77);
}

#[test]
fn test_invariants_rename_pressure() {
    // Reuses the same architectural destination repeatedly; physical
    // registers must rotate through the free list without double grants.
    let mut program = Vec::new();
    for i in 0..20 {
        program.push(addi(10, 0, i));
    }
    let ctx = run_checked(&program, 1500);
    assert_eq!(ctx.reg(10), 19);
}
