//! The DSM-CC carousel controller FSM (spec §3, §4.5, §8), grounded on
//! `tsDSMCCCarouselController.{h,cpp}`.

use crate::dsmcc::{DiiModule, DownloadDataMessage, UserToNetworkMessage};
use crate::section::{BinaryTable, Section};
use std::collections::BTreeMap;
use std::fmt;

/// The carousel's global state (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarouselState {
    Unmounted,
    Mounting,
    Discovering,
    Loading,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleStatus {
    Unknown,
    Pending,
    Complete,
}

/// Default ceiling on `module_size * module_count` a single DII may declare
/// before the controller refuses to allocate it (§5, §7).
pub const DEFAULT_MODULE_BUDGET: u64 = 64 * 1024 * 1024;

/// Per-module carousel state (§3: "module context").
#[derive(Debug, Clone)]
pub struct ModuleContext {
    pub module_id: u16,
    pub module_version: u8,
    pub module_size: u32,
    pub block_size: u16,
    pub expected_blocks: usize,
    pub received_blocks: Vec<bool>,
    pub is_compressed: bool,
    pub original_size: u32,
    pub payload: Vec<u8>,
    pub status: ModuleStatus,
}

impl ModuleContext {
    fn new(module: &DiiModule, block_size: u16) -> ModuleContext {
        let block_size = block_size.max(1);
        let expected_blocks =
            ((module.module_size as usize) + block_size as usize - 1) / block_size as usize;
        let compressed_module_descriptor = module.descriptors.compressed_module_descriptor();
        ModuleContext {
            module_id: module.module_id,
            module_version: module.module_version,
            module_size: module.module_size,
            block_size,
            expected_blocks: expected_blocks.max(1),
            received_blocks: vec![false; expected_blocks.max(1)],
            is_compressed: compressed_module_descriptor.is_some(),
            original_size: compressed_module_descriptor
                .map(|d| d.original_size)
                .unwrap_or(module.module_size),
            payload: Vec::new(),
            status: ModuleStatus::Pending,
        }
    }

    fn reset_for_new_version(&mut self, module: &DiiModule, block_size: u16) {
        *self = ModuleContext::new(module, block_size);
    }

    pub fn count_received(&self) -> usize {
        self.received_blocks.iter().filter(|&&b| b).count()
    }

    pub fn is_complete(&self) -> bool {
        self.status == ModuleStatus::Complete
    }

    /// Marks every block in range as received (§4.5: "a full module to one
    /// section in practice"). Returns `true` if this call completed the
    /// module.
    fn mark_all_blocks_received(&mut self) -> bool {
        for b in self.received_blocks.iter_mut() {
            *b = true;
        }
        if self.status != ModuleStatus::Complete && self.is_complete_by_blocks() {
            self.status = ModuleStatus::Complete;
            true
        } else {
            false
        }
    }

    fn is_complete_by_blocks(&self) -> bool {
        self.received_blocks.iter().all(|&b| b)
    }
}

impl fmt::Display for ModuleContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "module 0x{:04X} version {}: {}/{} blocks, status {:?}",
            self.module_id,
            self.module_version,
            self.count_received(),
            self.expected_blocks,
            self.status
        )
    }
}

/// Tracks one carousel PID's DSM-CC traffic and discovered modules (§4.5).
pub struct CarouselController {
    state: CarouselState,
    transaction_id: Option<u32>,
    block_size: u16,
    modules: BTreeMap<u16, ModuleContext>,
    module_budget: u64,
    on_module_complete: Option<Box<dyn FnMut(&ModuleContext)>>,
}

impl Default for CarouselController {
    fn default() -> Self {
        CarouselController::new()
    }
}

impl CarouselController {
    pub fn new() -> CarouselController {
        CarouselController {
            state: CarouselState::Unmounted,
            transaction_id: None,
            block_size: 0,
            modules: BTreeMap::new(),
            module_budget: DEFAULT_MODULE_BUDGET,
            on_module_complete: None,
        }
    }

    /// Builds a controller rejecting any DII whose total declared size
    /// (`module_size * module_count`) exceeds `max_total_bytes` (§5).
    pub fn with_module_budget(max_total_bytes: u64) -> CarouselController {
        CarouselController {
            module_budget: max_total_bytes,
            ..CarouselController::new()
        }
    }

    pub fn on_module_complete<F: FnMut(&ModuleContext) + 'static>(&mut self, callback: F) {
        self.on_module_complete = Some(Box::new(callback));
    }

    pub fn state(&self) -> CarouselState {
        self.state
    }

    pub fn module(&self, module_id: u16) -> Option<&ModuleContext> {
        self.modules.get(&module_id)
    }

    pub fn list_modules(&self) -> String {
        let mut out = String::new();
        for module in self.modules.values() {
            out.push_str(&module.to_string());
            out.push('\n');
        }
        out
    }

    fn clear(&mut self) {
        self.modules.clear();
        self.block_size = 0;
        self.state = CarouselState::Unmounted;
    }

    /// §4.5: re-derives the global state from module statuses, the same way
    /// `DSMCCCarouselController::checkGlobalState` does, rather than
    /// transitioning ad hoc per event.
    fn check_global_state(&mut self) {
        if self.transaction_id.is_none() {
            self.state = CarouselState::Unmounted;
            return;
        }
        if self.modules.is_empty() {
            self.state = CarouselState::Mounting;
            return;
        }
        let any_block_seen = self.modules.values().any(|m| m.count_received() > 0);
        if !any_block_seen {
            self.state = CarouselState::Discovering;
            return;
        }
        let all_complete = self.modules.values().all(ModuleContext::is_complete);
        self.state = if all_complete {
            CarouselState::Ready
        } else {
            CarouselState::Loading
        };
    }

    /// Dispatches a completed table to the relevant per-table handler
    /// (§4.6's table handler interface, wired to this controller).
    pub fn handle_table(&mut self, table: &BinaryTable) {
        match table.table_id {
            crate::dsmcc::user_to_network::TID_DSMCC_UNM => {
                self.handle_user_to_network_table(table)
            }
            crate::dsmcc::ddb::TID_DSMCC_DDM => self.handle_ddb_table(table),
            _ => {}
        }
    }

    /// Individual-section hook (§4.5: "the controller also subscribes to
    /// individual DDM sections to track the arrival of each block number").
    /// DSI/DII are always single-section; only DDB benefits from per-section
    /// tracking ahead of table completion.
    pub fn handle_section(&mut self, section: &Section) {
        if section.table_id() != crate::dsmcc::ddb::TID_DSMCC_DDM {
            return;
        }
        let mut buf = crate::buffer::PsiBufferRead::new(&section.payload);
        let ddm = DownloadDataMessage::deserialize(&mut buf);
        if buf.error() {
            log::warn!("discarding malformed DSM-CC download data block");
            return;
        }
        self.process_ddb(&ddm);
    }

    fn handle_user_to_network_table(&mut self, table: &BinaryTable) {
        for section in table.sections() {
            let mut buf = crate::buffer::PsiBufferRead::new(&section.payload);
            let message = UserToNetworkMessage::deserialize(&mut buf);
            if buf.error() {
                log::warn!("discarding malformed DSM-CC user-to-network message");
                continue;
            }
            match message {
                UserToNetworkMessage::Dsi { header, ior, .. } => {
                    self.process_dsi(header.transaction_or_download_id, ior);
                }
                UserToNetworkMessage::Dii {
                    download_id,
                    block_size,
                    modules,
                    ..
                } => {
                    self.process_dii(download_id, block_size, &modules);
                }
            }
        }
    }

    fn handle_ddb_table(&mut self, table: &BinaryTable) {
        for section in table.sections() {
            let mut buf = crate::buffer::PsiBufferRead::new(&section.payload);
            let ddm = DownloadDataMessage::deserialize(&mut buf);
            if buf.error() {
                log::warn!("discarding malformed DSM-CC download data block");
                continue;
            }
            self.process_ddb(&ddm);
        }
    }

    /// §4.5 DSI handling.
    pub fn process_dsi(&mut self, transaction_id: u32, _ior: crate::dsmcc::Ior) {
        match self.transaction_id {
            None => {
                log::debug!("DSI observed, transaction id 0x{transaction_id:08X}, mounting");
                self.transaction_id = Some(transaction_id);
            }
            Some(current) if current != transaction_id => {
                log::debug!(
                    "DSI transaction id changed 0x{current:08X} -> 0x{transaction_id:08X}, resetting carousel"
                );
                self.clear();
                self.transaction_id = Some(transaction_id);
            }
            Some(_) => {}
        }
        self.check_global_state();
    }

    /// §4.5 DII handling.
    pub fn process_dii(&mut self, _download_id: u32, block_size: u16, modules: &[DiiModule]) {
        if self.transaction_id.is_none() {
            return;
        }

        let total_declared: u64 = modules
            .iter()
            .map(|m| m.module_size as u64)
            .sum::<u64>()
            .saturating_mul(modules.len().max(1) as u64);
        if total_declared > self.module_budget {
            log::warn!(
                "rejecting DII: total declared size {total_declared} exceeds budget {}",
                self.module_budget
            );
            return;
        }

        self.block_size = block_size;
        for module in modules {
            match self.modules.get_mut(&module.module_id) {
                None => {
                    log::debug!(
                        "discovered module 0x{:04X} version {} size {}",
                        module.module_id,
                        module.module_version,
                        module.module_size
                    );
                    self.modules
                        .insert(module.module_id, ModuleContext::new(module, block_size));
                }
                Some(existing) if existing.module_version != module.module_version => {
                    log::debug!(
                        "module 0x{:04X} version changed {} -> {}, resetting",
                        module.module_id,
                        existing.module_version,
                        module.module_version
                    );
                    existing.reset_for_new_version(module, block_size);
                }
                Some(_) => {}
            }
        }
        self.check_global_state();
    }

    /// §4.5 DDB handling.
    pub fn process_ddb(&mut self, ddm: &DownloadDataMessage) {
        let Some(context) = self.modules.get_mut(&ddm.module_id) else {
            log::debug!("dropping DDB for unknown module 0x{:04X}", ddm.module_id);
            return;
        };
        if context.module_version != ddm.module_version {
            log::debug!(
                "dropping DDB for module 0x{:04X}: version mismatch ({} != {})",
                ddm.module_id,
                ddm.module_version,
                context.module_version
            );
            return;
        }
        if context.status == ModuleStatus::Complete {
            return;
        }

        context.payload = ddm.block_data.clone();
        let completed = context.mark_all_blocks_received();

        if completed {
            log::debug!(
                "module 0x{:04X} version {} complete ({} bytes)",
                context.module_id,
                context.module_version,
                context.payload.len()
            );
            if let Some(callback) = self.on_module_complete.as_mut() {
                callback(context);
            }
        }
        self.check_global_state();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::descriptor::DescriptorList;
    use crate::dsmcc::compatibility::COMPRESSED_MODULE_DESCRIPTOR_TAG;
    use crate::dsmcc::Ior;

    fn dii_module(id: u16, version: u8, size: u32, descriptors: DescriptorList) -> DiiModule {
        DiiModule {
            module_id: id,
            module_size: size,
            module_version: version,
            module_timeout: 0,
            block_timeout: 0,
            min_block_time: 0,
            taps: Vec::new(),
            descriptors,
        }
    }

    fn ddm(module_id: u16, version: u8, payload: Vec<u8>) -> DownloadDataMessage {
        DownloadDataMessage {
            header: crate::dsmcc::DsmccMessageHeader {
                message_id: crate::dsmcc::message::DSMCC_MESSAGE_ID_DDB,
                transaction_or_download_id: 0xCAFE_0001,
                ..Default::default()
            },
            module_id,
            module_version: version,
            block_number: 0,
            block_data: payload,
        }
    }

    /// S1: Minimal carousel.
    #[test]
    fn s1_minimal_carousel_reaches_ready() {
        let mut controller = CarouselController::new();
        assert_eq!(controller.state(), CarouselState::Unmounted);

        controller.process_dsi(0xCAFE_0001, Ior::default());
        assert_eq!(controller.state(), CarouselState::Mounting);

        controller.process_dii(1, 4096, &[dii_module(0x0001, 3, 1024, DescriptorList::new())]);
        assert_eq!(controller.state(), CarouselState::Discovering);

        let mut completed = None;
        controller.on_module_complete(|m| completed = Some((m.module_id, m.payload.clone())));
        controller.process_ddb(&ddm(0x0001, 3, vec![0xAA; 1024]));

        assert_eq!(controller.state(), CarouselState::Ready);
        let (module_id, payload) = completed.expect("callback fired");
        assert_eq!(module_id, 0x0001);
        assert_eq!(payload, vec![0xAA; 1024]);
        assert!(!controller.module(0x0001).unwrap().is_compressed);
    }

    /// S2: Version change.
    #[test]
    fn s2_version_change_resets_module() {
        let mut controller = CarouselController::new();
        controller.process_dsi(0xCAFE_0001, Ior::default());
        controller.process_dii(1, 4096, &[dii_module(0x0001, 3, 1024, DescriptorList::new())]);
        controller.process_ddb(&ddm(0x0001, 3, vec![0xAA; 1024]));
        assert_eq!(controller.state(), CarouselState::Ready);

        controller.process_dii(1, 4096, &[dii_module(0x0001, 4, 2048, DescriptorList::new())]);
        let module = controller.module(0x0001).unwrap();
        assert_eq!(module.module_version, 4);
        assert_eq!(module.module_size, 2048);
        assert_eq!(module.count_received(), 0);
        assert_eq!(controller.state(), CarouselState::Discovering);
    }

    /// S3: DDB before DII.
    #[test]
    fn s3_ddb_before_dii_is_ignored() {
        let mut controller = CarouselController::new();
        controller.process_ddb(&ddm(0x0002, 0, vec![0xAA; 10]));
        assert_eq!(controller.state(), CarouselState::Unmounted);
        assert!(controller.module(0x0002).is_none());
    }

    /// S4: Transaction reset.
    #[test]
    fn s4_transaction_id_change_clears_modules() {
        let mut controller = CarouselController::new();
        controller.process_dsi(0xCAFE_0001, Ior::default());
        controller.process_dii(1, 4096, &[dii_module(0x0001, 3, 1024, DescriptorList::new())]);

        let mut fire_count = 0;
        controller.on_module_complete(|_| fire_count += 1);
        controller.process_ddb(&ddm(0x0001, 3, vec![0xAA; 1024]));
        assert_eq!(fire_count, 1);

        controller.process_dsi(0xCAFE_0002, Ior::default());
        assert_eq!(controller.state(), CarouselState::Mounting);
        assert!(controller.module(0x0001).is_none());
        assert_eq!(fire_count, 1);
    }

    /// S5: Compressed module.
    #[test]
    fn s5_compressed_module_reports_original_size() {
        let mut descriptors = DescriptorList::new();
        descriptors.push(
            COMPRESSED_MODULE_DESCRIPTOR_TAG,
            vec![0x01, 0x00, 0x00, 0x03, 0xE8], // original_size = 1000
        );

        let mut controller = CarouselController::new();
        controller.process_dsi(0xCAFE_0001, Ior::default());
        controller.process_dii(1, 300, &[dii_module(0x0003, 1, 300, descriptors)]);

        let mut reported = None;
        controller.on_module_complete(|m| reported = Some((m.is_compressed, m.original_size, m.payload.len())));
        controller.process_ddb(&ddm(0x0003, 1, vec![0xBB; 300]));

        let (is_compressed, original_size, payload_len) = reported.expect("callback fired");
        assert!(is_compressed);
        assert_eq!(original_size, 1000);
        assert_eq!(payload_len, 300);
    }

    /// S6: CRC failure — modeled at the controller level as "the table
    /// demux never hands a CRC-invalid section to handle_table", so no DII
    /// processing happens and state stays Mounting.
    #[test]
    fn s6_no_dii_processed_leaves_state_mounting() {
        let mut controller = CarouselController::new();
        controller.process_dsi(0xCAFE_0001, Ior::default());
        assert_eq!(controller.state(), CarouselState::Mounting);
        assert!(controller.modules.is_empty());
    }

    #[test]
    fn module_budget_rejects_oversized_dii() {
        let mut controller = CarouselController::with_module_budget(1024);
        controller.process_dsi(0xCAFE_0001, Ior::default());
        controller.process_dii(1, 4096, &[dii_module(0x0001, 1, 4096, DescriptorList::new())]);
        assert!(controller.module(0x0001).is_none());
    }
}
