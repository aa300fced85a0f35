//! Section demux: TS packets to reassembled [`Section`]s and
//! [`BinaryTable`]s, generalizing the teacher's PID-scoped
//! `mpeg2ts_reader::psi` pipeline into a PID-filtered, continuity-counter-
//! aware reassembler (spec §4.6, §6).

use crate::section::{BinaryTable, Section, TableAssembler};
use std::collections::HashMap;

pub const TS_PACKET_SIZE: usize = 188;
const SYNC_BYTE: u8 = 0x47;

/// Per-PID reassembly state: a partially-received long section plus the
/// continuity counter tracking needed to detect packet loss (§4.6).
struct PidState {
    assembler: TableAssembler,
    /// Bytes of the section currently being reassembled across packets,
    /// accumulated since the last PUSI-starting packet.
    pending: Vec<u8>,
    /// How many more bytes `pending` needs before a section can be parsed
    /// out of it; `None` until the 3-byte common header has been read.
    expected_total_len: Option<usize>,
    last_continuity_counter: Option<u8>,
}

impl PidState {
    fn new() -> PidState {
        PidState {
            assembler: TableAssembler::new(),
            pending: Vec::new(),
            expected_total_len: None,
            last_continuity_counter: None,
        }
    }

    fn reset(&mut self) {
        self.pending.clear();
        self.expected_total_len = None;
    }
}

/// Demultiplexes TS packets on a set of PIDs of interest into [`Section`]s
/// and [`BinaryTable`]s, dispatching to optional handlers exactly as §4.6
/// and §6 describe.
pub struct SectionDemux {
    pids: HashMap<u16, PidState>,
    section_handler: Option<Box<dyn FnMut(&Section)>>,
    table_handler: Option<Box<dyn FnMut(&BinaryTable)>>,
}

impl Default for SectionDemux {
    fn default() -> Self {
        SectionDemux::new()
    }
}

impl SectionDemux {
    pub fn new() -> SectionDemux {
        SectionDemux {
            pids: HashMap::new(),
            section_handler: None,
            table_handler: None,
        }
    }

    /// Starts tracking sections carried on `pid`; packets on PIDs not
    /// registered here are ignored (the PID filter of §4.6).
    pub fn track_pid(&mut self, pid: u16) {
        self.pids.entry(pid).or_insert_with(PidState::new);
    }

    pub fn untrack_pid(&mut self, pid: u16) {
        self.pids.remove(&pid);
    }

    pub fn set_section_handler<F: FnMut(&Section) + 'static>(&mut self, handler: F) {
        self.section_handler = Some(Box::new(handler));
    }

    pub fn set_table_handler<F: FnMut(&BinaryTable) + 'static>(&mut self, handler: F) {
        self.table_handler = Some(Box::new(handler));
    }

    /// Feeds one 188-byte TS packet. Packets on untracked PIDs, and packets
    /// that fail the sync-byte check, are silently ignored (§5: "no
    /// operation blocks", §7: "malformed input is local").
    pub fn feed_packet(&mut self, packet: &[u8]) {
        if packet.len() != TS_PACKET_SIZE || packet[0] != SYNC_BYTE {
            return;
        }
        let pid = (u16::from(packet[1] & 0x1F) << 8) | u16::from(packet[2]);
        if !self.pids.contains_key(&pid) {
            return;
        }

        let pusi = packet[1] & 0x40 != 0;
        let adaptation_field_control = (packet[3] >> 4) & 0x03;
        let continuity_counter = packet[3] & 0x0F;
        let has_payload = adaptation_field_control == 0x01 || adaptation_field_control == 0x03;
        if !has_payload {
            return;
        }

        let mut offset = 4;
        if adaptation_field_control == 0x03 {
            if offset >= packet.len() {
                return;
            }
            let adaptation_length = packet[offset] as usize;
            offset += 1 + adaptation_length;
            if offset > packet.len() {
                return;
            }
        }
        let mut payload = &packet[offset..];

        let state = self.pids.get_mut(&pid).expect("tracked above");

        if let Some(last) = state.last_continuity_counter {
            let expected = (last + 1) & 0x0F;
            if continuity_counter != expected && continuity_counter != last {
                log::warn!("PID {pid}: continuity counter discontinuity, dropping in-progress section");
                state.reset();
            }
        }
        state.last_continuity_counter = Some(continuity_counter);

        if pusi {
            if payload.is_empty() {
                return;
            }
            let pointer_field = payload[0] as usize;
            if 1 + pointer_field > payload.len() {
                return;
            }
            let remainder_of_previous = &payload[1..1 + pointer_field];
            if !state.pending.is_empty() {
                state.pending.extend_from_slice(remainder_of_previous);
            }
            Self::try_complete_section(state, pid, &mut self.section_handler, &mut self.table_handler);

            state.pending.clear();
            state.expected_total_len = None;
            payload = &payload[1 + pointer_field..];
        }

        state.pending.extend_from_slice(payload);
        Self::try_complete_section(state, pid, &mut self.section_handler, &mut self.table_handler);
    }

    /// Attempts to carve one complete section out of `state.pending`,
    /// dispatching it (and any table it completes) to the handlers. Leaves
    /// any bytes belonging to a following section untouched for the next
    /// PUSI-starting packet to pick up — in practice every DSM-CC and SDT
    /// section here is carried by exactly one `pending` buffer per PUSI
    /// run, so a single section is extracted per call.
    fn try_complete_section(
        state: &mut PidState,
        pid: u16,
        section_handler: &mut Option<Box<dyn FnMut(&Section)>>,
        table_handler: &mut Option<Box<dyn FnMut(&BinaryTable)>>,
    ) {
        if state.expected_total_len.is_none() {
            if state.pending.len() < 3 {
                return;
            }
            let section_length =
                (u16::from(state.pending[1] & 0x0F) << 8) | u16::from(state.pending[2]);
            state.expected_total_len = Some(3 + section_length as usize);
        }
        let Some(total_len) = state.expected_total_len else {
            return;
        };
        if state.pending.len() < total_len {
            return;
        }

        let Some(section) = Section::parse(&state.pending[..total_len], pid) else {
            state.reset();
            return;
        };

        if let Some(handler) = section_handler.as_mut() {
            handler(&section);
        }

        if let Some(table) = state.assembler.feed(section) {
            if let Some(handler) = table_handler.as_mut() {
                handler(&table);
            }
        }

        state.reset();
    }
}
