//! The out-of-order core: module instances and tick orchestration.
//!
//! [`Core::tick`] owns every module and realises the two-phase clocking
//! discipline: the registered outputs of the previous tick are sampled
//! first, then the stages run back-to-front (commit/ROB, stations, units,
//! memories, redirect capture, rename, decode, fetch) so that the only
//! same-tick reads are the combinational paths the design defines —
//! dispatch release into the RS/ROB, station issue into a unit with
//! writeback-bypassed operand reads, the LSU request into the data memory,
//! rename reading the current map table and this tick's grants, and
//! commit's release into the free list. No module ever observes another
//! module's same-tick next state through any other path.

/// Pipeline structural modules.
pub mod pipeline;
/// Functional units.
pub mod units;

use crate::common::{RobTag, TagSet};
use crate::config::Config;
use crate::core::pipeline::dispatch::Dispatch;
use crate::core::pipeline::fetch::Fetch;
use crate::core::pipeline::free_list::{FreeList, FreeListInputs};
use crate::core::pipeline::map_table::{MapTable, MapTableInputs};
use crate::core::pipeline::packets::{DecodePacket, FuType, RenamePacket, RsEntry, WbPacket};
use crate::core::pipeline::prf::{Prf, PrfInputs};
use crate::core::pipeline::recovery::RecoveryController;
use crate::core::pipeline::rename;
use crate::core::pipeline::rob::{Committed, Rob, RobInputs};
use crate::core::pipeline::station::{IssuePolicy, ReservationStation, StationInputs};
use crate::core::pipeline::store_buffer::StoreBuffer;
use crate::core::pipeline::tag_alloc::{TagAllocInputs, TagAllocator};
use crate::core::units::alu::AluUnit;
use crate::core::units::bru::BranchUnit;
use crate::core::units::lsu::{LoadStoreUnit, LsuInputs};
use crate::isa::decode::decode;
use crate::mem::dmem::DataMemory;
use crate::mem::imem::InstructionMemory;
use crate::stats::SimStats;

/// What happened during one tick, for callers that track program order.
#[derive(Clone, Copy, Debug, Default)]
pub struct TickEvents {
    /// The entry the ROB retired this tick.
    pub committed: Option<Committed>,
    /// The tag rename bound this tick.
    pub renamed: Option<RobTag>,
}

/// The core: every module plus the architectural trace flag and counters.
pub struct Core {
    /// Per-stage trace output to stderr.
    pub trace: bool,
    /// Simulated cycle count.
    pub cycle: u64,
    /// Run statistics.
    pub stats: SimStats,

    /// Fetch state machine.
    pub fetch: Fetch,
    /// Instruction memory.
    pub imem: InstructionMemory,
    /// Decode-to-rename pipeline register.
    pub decode_reg: DecodePacket,

    /// Register alias table.
    pub map_table: MapTable,
    /// Physical register free list.
    pub free_list: FreeList,
    /// ROB tag allocator.
    pub tag_alloc: TagAllocator,
    /// Physical register file.
    pub prf: Prf,

    /// Dispatch skid buffer.
    pub dispatch: Dispatch,
    /// ALU reservation station.
    pub rs_alu: ReservationStation,
    /// Branch reservation station.
    pub rs_bru: ReservationStation,
    /// Load/store reservation station (issues oldest-first).
    pub rs_lsu: ReservationStation,
    /// Reorder buffer.
    pub rob: Rob,
    /// Store buffer.
    pub store_buffer: StoreBuffer,

    /// Integer ALU.
    pub alu: AluUnit,
    /// Branch unit.
    pub bru: BranchUnit,
    /// Load/store unit.
    pub lsu: LoadStoreUnit,
    /// Data memory.
    pub dmem: DataMemory,
    /// Recovery controller.
    pub recovery: RecoveryController,
}

impl Core {
    /// Builds a core at reset from the configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            trace: config.general.trace,
            cycle: 0,
            stats: SimStats::default(),
            fetch: Fetch::new(config.general.start_pc),
            imem: InstructionMemory::new(config.memory.imem_words),
            decode_reg: DecodePacket::default(),
            map_table: MapTable::new(),
            free_list: FreeList::new(),
            tag_alloc: TagAllocator::new(),
            prf: Prf::new(),
            dispatch: Dispatch::new(),
            rs_alu: ReservationStation::new(IssuePolicy::AnyReady),
            rs_bru: ReservationStation::new(IssuePolicy::AnyReady),
            rs_lsu: ReservationStation::new(IssuePolicy::OldestFirst),
            rob: Rob::new(),
            store_buffer: StoreBuffer::new(),
            alu: AluUnit::new(),
            bru: BranchUnit::new(),
            lsu: LoadStoreUnit::new(),
            dmem: DataMemory::new(config.memory.dmem_words),
            recovery: RecoveryController::new(),
        }
    }

    /// Loads program bytes into the instruction memory.
    pub fn load_program(&mut self, bytes: &[u8]) {
        self.imem.load_bytes(bytes);
    }

    /// Architectural view of a register: the physical register the map
    /// table currently points at.
    pub fn arch_reg(&self, arch: usize) -> u32 {
        self.prf.read(self.map_table.lookup(arch))
    }

    /// Advances the whole machine by one clock cycle.
    pub fn tick(&mut self) -> TickEvents {
        self.cycle += 1;
        self.stats.cycles += 1;

        // ---- Sample last tick's registered outputs ----------------------
        let rec = self.recovery.output();
        let writebacks = [
            self.alu.writeback(),
            self.bru.writeback(),
            self.lsu.writeback(),
        ];
        let redirect = self.bru.redirect();
        let station_space = [
            self.rs_alu.has_space(),
            self.rs_bru.has_space(),
            self.rs_lsu.has_space(),
        ];
        let rob_space = self.rob.has_space();
        let lsu_ready = self.lsu.ready(&self.store_buffer);
        let (imem_rvalid, imem_rdata) = self.imem.output();
        let dmem_response = self.dmem.read_output();
        let prf_valid_pre = self.prf.valid_bits();

        if rec.flush {
            self.stats.pipeline_flushes += 1;
            if self.trace {
                eprintln!(
                    "RV  flush pc={:#x} tag={}",
                    rec.flush_pc, rec.recover_tag
                );
            }
        }
        if self.trace {
            for wb in writebacks.iter().filter(|w| w.valid) {
                eprintln!("WB  {} p{} <= {:#x}", wb.rob_tag, wb.prd, wb.data);
            }
        }

        // ---- ROB: dispatch release, recovery, absorption, commit --------
        let live_before = self.rob.live_tags();
        let released = self.dispatch.release(station_space, rob_space, rec.flush);
        let dispatch_blocked = released.is_none() && self.dispatch.pending().is_some();
        let committed = self.rob.tick(RobInputs {
            flush: rec.flush,
            recover: rec.recover,
            recover_tag: rec.recover_tag,
            alloc: released.as_ref(),
            writebacks: &writebacks,
        });
        let live = self.rob.live_tags();

        // Tags this tick's recovery erased (a committed tag leaves the live
        // set too, but was not erased).
        let mut erased = TagSet(live_before.0 & !live.0);

        let mut free_req = None;
        if let Some(c) = &committed {
            erased.remove(c.tag);
            self.stats.instructions_committed += 1;
            if c.is_store {
                self.stats.inst_store += 1;
                self.store_buffer.mark_committed(c.tag);
            } else if c.is_load {
                self.stats.inst_load += 1;
            } else if c.is_ctrl {
                self.stats.inst_branch += 1;
            } else {
                self.stats.inst_alu += 1;
            }
            if c.rd_used {
                free_req = Some(c.old_prd);
            }
            if self.trace {
                eprintln!("CM  pc={:#x} {} COMMIT", c.pc, c.tag);
            }
        }

        // ---- Store buffer: recovery sweep, then drain one store ---------
        if rec.recover {
            self.store_buffer.squash(live);
        }
        let drained = self.store_buffer.drain_one();
        if self.trace {
            if let Some(d) = &drained {
                eprintln!("CM  store drain addr={:#x} data={:#x}", d.addr, d.data);
            }
        }

        // ---- Reservation stations ---------------------------------------
        // The released packet's ready bits are refreshed against the PRF
        // valid map (results that landed while it sat in the skid buffer);
        // the station's insert snoop covers this tick's broadcasts.
        let insert = released.as_ref().map(|pkt| {
            let mut entry = RsEntry::from_packet(pkt);
            if entry.rs1_used && self.prf.is_valid(entry.prs1) {
                entry.prs1_ready = true;
            }
            if entry.rs2_used && self.prf.is_valid(entry.prs2) {
                entry.prs2_ready = true;
            }
            entry
        });
        let route = |want: FuType| insert.filter(|e| e.fu_type == want);

        let issue_alu = self.rs_alu.tick(StationInputs {
            flush: rec.flush,
            live,
            insert: route(FuType::Alu),
            writebacks: &writebacks,
            consumer_ready: !rec.flush,
        });
        let issue_bru = self.rs_bru.tick(StationInputs {
            flush: rec.flush,
            live,
            insert: route(FuType::Bru),
            writebacks: &writebacks,
            consumer_ready: !rec.flush,
        });
        let issue_lsu = self.rs_lsu.tick(StationInputs {
            flush: rec.flush,
            live,
            insert: route(FuType::Lsu),
            writebacks: &writebacks,
            consumer_ready: lsu_ready && !rec.flush,
        });

        if self.trace {
            for (unit, issue) in [("alu", &issue_alu), ("bru", &issue_bru), ("lsu", &issue_lsu)] {
                if let Some(e) = issue {
                    eprintln!("IS  pc={:#x} {} -> {}", e.pc, e.rob_tag, unit);
                }
            }
        }

        // ---- Functional units -------------------------------------------
        // Operand reads bypass this tick's broadcasts so an entry woken by
        // a snoop reads the data that woke it.
        let read_operand = |prf: &Prf, preg: usize| -> u32 {
            for wb in &writebacks {
                if wb.valid && wb.rd_used && wb.prd == preg {
                    return wb.data;
                }
            }
            prf.read(preg)
        };
        let with_operands = |prf: &Prf, entry: RsEntry| {
            let src1 = read_operand(prf, entry.prs1);
            let src2 = read_operand(prf, entry.prs2);
            (entry, src1, src2)
        };

        self.alu
            .tick(rec.flush, issue_alu.map(|e| with_operands(&self.prf, e)));
        self.bru
            .tick(rec.flush, issue_bru.map(|e| with_operands(&self.prf, e)));
        let lsu_out = self.lsu.tick(LsuInputs {
            flush: rec.flush,
            live,
            issue: issue_lsu.map(|e| with_operands(&self.prf, e)),
            dmem_response,
            store_buffer: &mut self.store_buffer,
        });
        if lsu_out.forwarded {
            self.stats.store_forwards += 1;
        }

        // ---- Data memory ------------------------------------------------
        self.dmem.tick(
            lsu_out.mem_read,
            drained.map(|d| (d.addr, d.data, d.size)),
        );

        // ---- Redirect capture -------------------------------------------
        // A redirect racing this tick's flush dies with its tag if the
        // recovery erased it; a redirect from an older branch (still live,
        // or already retired) starts its own recovery.
        if writebacks[1].valid {
            self.stats.branch_resolutions += 1;
        }
        let honour = redirect.mispredict && !(rec.flush && erased.contains(redirect.tag));
        if honour {
            self.stats.branch_mispredicts += 1;
            if self.trace {
                eprintln!(
                    "EX  mispredict {} target={:#x}",
                    redirect.tag, redirect.target
                );
            }
        }
        self.recovery.tick(honour, redirect.target, redirect.tag);

        // ---- Rename -----------------------------------------------------
        let dpkt = self.decode_reg;
        let fire = !rec.flush
            && rename::can_fire(
                &dpkt,
                self.dispatch.ready(),
                self.tag_alloc.alloc_ok(),
                self.free_list.has_free(),
            );
        if !rec.flush && dpkt.valid && !fire {
            self.stats.stalls_rename += 1;
        }
        if !rec.flush && dispatch_blocked {
            self.stats.stalls_dispatch += 1;
        }

        let need_alloc = rename::needs_allocation(&dpkt);
        let checkpoint_take = fire && rename::takes_checkpoint(&dpkt);

        let granted_tag = self.tag_alloc.tick(TagAllocInputs {
            flush: rec.flush,
            recover: rec.recover,
            recover_tag: rec.recover_tag,
            alloc_req: fire,
            live,
            insert_fired: released.as_ref().map(|p| p.rob_tag),
            checkpoint_take,
        });
        let checkpoint_tag = granted_tag.unwrap_or_default();

        let granted_preg = self.free_list.tick(FreeListInputs {
            flush: rec.flush,
            recover: rec.recover,
            recover_tag: rec.recover_tag,
            alloc_req: fire && need_alloc,
            free_req,
            checkpoint_take,
            checkpoint_tag,
        });

        let mut renamed_tag = None;
        let mut prf_invalidate = None;
        if fire {
            let tag = granted_tag.expect("tag gate and grant disagree");
            let prd = if need_alloc {
                granted_preg.expect("free-list gate and grant disagree")
            } else {
                0
            };
            let pkt: RenamePacket =
                rename::build_packet(&dpkt, &self.map_table, prf_valid_pre, prd, tag);
            self.map_table.tick(MapTableInputs {
                flush: false,
                recover: false,
                recover_tag: RobTag(0),
                write: if need_alloc { Some((dpkt.rd, prd)) } else { None },
                checkpoint_take,
                checkpoint_tag: tag,
            });
            if need_alloc {
                prf_invalidate = Some(prd);
            }
            if self.trace {
                eprintln!(
                    "RN  pc={:#x} {} prd=p{} old=p{}",
                    pkt.pc, tag, pkt.prd, pkt.old_prd
                );
            }
            self.dispatch.accept(pkt);
            self.decode_reg = DecodePacket::default();
            renamed_tag = Some(tag);
        } else {
            self.map_table.tick(MapTableInputs {
                flush: rec.flush,
                recover: rec.recover,
                recover_tag: rec.recover_tag,
                write: None,
                checkpoint_take: false,
                checkpoint_tag: RobTag(0),
            });
        }

        // ---- Physical register file -------------------------------------
        self.prf.tick(PrfInputs {
            flush: rec.flush,
            recover: rec.recover,
            recover_tag: rec.recover_tag,
            writebacks: &writebacks,
            alloc_invalidate: prf_invalidate,
            checkpoint_take,
            checkpoint_tag,
        });

        // ---- Decode -----------------------------------------------------
        let mut fetch_consumed = false;
        if rec.flush {
            self.decode_reg = DecodePacket::default();
        } else if !self.decode_reg.valid && self.fetch.valid() {
            self.decode_reg = decode(true, self.fetch.pc(), self.fetch.instr());
            fetch_consumed = true;
            if self.trace {
                eprintln!(
                    "FE  pc={:#x} inst={:#010x}",
                    self.fetch.pc(),
                    self.fetch.instr()
                );
            }
        }

        // ---- Instruction memory and fetch -------------------------------
        let imem_en = self.fetch.imem_en();
        let imem_addr = self.fetch.pc();
        self.imem.tick(imem_en, imem_addr);
        self.fetch
            .tick(rec.flush, rec.flush_pc, fetch_consumed, imem_rvalid, imem_rdata);

        TickEvents {
            committed,
            renamed: renamed_tag,
        }
    }

    /// Occupied ROB slots, for external invariant checks.
    pub fn live_tags(&self) -> TagSet {
        self.rob.live_tags()
    }

    /// The three writeback channels as registered right now.
    pub fn writeback_view(&self) -> [WbPacket; 3] {
        [
            self.alu.writeback(),
            self.bru.writeback(),
            self.lsu.writeback(),
        ]
    }
}
