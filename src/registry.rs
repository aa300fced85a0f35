//! The process-wide, table-scoped descriptor registry (spec §4.3, §9).
//!
//! A process-wide singleton is acceptable because it is write-once at
//! program start and read-only thereafter (§9); it is populated from a
//! deterministic `register_builtin_descriptors()` routine rather than
//! relying on initializer-ordering tricks, called once via `OnceLock`.

use crate::buffer::{PsiBufferRead, PsiBufferWrite};
use crate::dsmcc::TID_DSMCC_UNM;
use std::collections::HashMap;
use std::sync::OnceLock;
use xmltree::Element;

/// Where a descriptor tag is meaningful (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Regular,
    Private { specifier: Option<u32> },
    TableSpecific { table_id: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DescriptorKey {
    pub tag: u8,
    pub extension_tag: Option<u8>,
    pub scope: Scope,
}

impl DescriptorKey {
    pub fn regular(tag: u8) -> DescriptorKey {
        DescriptorKey {
            tag,
            extension_tag: None,
            scope: Scope::Regular,
        }
    }

    pub fn table_specific(tag: u8, table_id: u8) -> DescriptorKey {
        DescriptorKey {
            tag,
            extension_tag: None,
            scope: Scope::TableSpecific { table_id },
        }
    }
}

/// Implemented by every interpreted (non-opaque) descriptor kind.
pub trait DsmccDescriptor: std::fmt::Debug {
    fn tag(&self) -> u8;
    fn clear(&mut self);
    fn serialize_payload(&self, buf: &mut PsiBufferWrite);
    fn deserialize_payload(&mut self, buf: &mut PsiBufferRead<'_>) -> bool;
    fn build_xml(&self, parent: &mut Element);
    fn analyze_xml(&mut self, element: &Element) -> bool;
}

type Factory = fn() -> Box<dyn DsmccDescriptor>;

/// A process-wide map from (tag, optional extension, scope) to a factory.
/// Lookup falls back to `None` (the caller preserves the descriptor as an
/// opaque byte block, per §4.3) when nothing matches.
#[derive(Default)]
pub struct Registry {
    factories: HashMap<DescriptorKey, Factory>,
}

impl Registry {
    fn new() -> Registry {
        let mut registry = Registry::default();
        registry.register_builtin_descriptors();
        registry
    }

    pub fn global() -> &'static Registry {
        static REGISTRY: OnceLock<Registry> = OnceLock::new();
        REGISTRY.get_or_init(Registry::new)
    }

    pub fn register(&mut self, key: DescriptorKey, factory: Factory) {
        self.factories.insert(key, factory);
    }

    pub fn lookup(&self, key: &DescriptorKey) -> Option<Box<dyn DsmccDescriptor>> {
        self.factories.get(key).map(|f| f())
    }

    fn register_builtin_descriptors(&mut self) {
        self.register(
            DescriptorKey::table_specific(DSMCC_NAME_DESCRIPTOR_TAG, TID_DSMCC_UNM),
            || Box::new(DsmccNameDescriptor::default()),
        );
        self.register(
            DescriptorKey::table_specific(DSMCC_CRC32_DESCRIPTOR_TAG, TID_DSMCC_UNM),
            || Box::new(DsmccCrc32Descriptor::default()),
        );
    }
}

/// Not present verbatim in the retrieved `original_source/` subset (the
/// `DID_DSMCC_NAME`/`DID_DSMCC_CRC32` constants live in a header outside
/// the index); these tag values follow ISO/IEC 13818-6's DSM-CC U-N
/// descriptor tag assignments. Recorded as an assumption in DESIGN.md.
pub const DSMCC_NAME_DESCRIPTOR_TAG: u8 = 0x01;
pub const DSMCC_CRC32_DESCRIPTOR_TAG: u8 = 0x0B;

/// `dsmcc_name_descriptor`: carries a module or group name as a DVB string
/// (grounded on `tsDSMCCNameDescriptor.cpp`; simplified to raw bytes here
/// since the DVB-string text-decoding machinery lives with `Text`/
/// `TextEncoding` in `lib.rs`, not in this registry).
#[derive(Debug, Clone, Default)]
pub struct DsmccNameDescriptor {
    pub name: Vec<u8>,
}

impl DsmccDescriptor for DsmccNameDescriptor {
    fn tag(&self) -> u8 {
        DSMCC_NAME_DESCRIPTOR_TAG
    }

    fn clear(&mut self) {
        self.name.clear();
    }

    fn serialize_payload(&self, buf: &mut PsiBufferWrite) {
        buf.put_bytes(&self.name);
    }

    fn deserialize_payload(&mut self, buf: &mut PsiBufferRead<'_>) -> bool {
        self.name = buf.get_bytes_remaining();
        !buf.error()
    }

    fn build_xml(&self, parent: &mut Element) {
        crate::xml::add_hexa_text_child(parent, "name", &self.name);
    }

    fn analyze_xml(&mut self, element: &Element) -> bool {
        match crate::xml::get_hexa_text_child(element, "name") {
            Some(name) => {
                self.name = name;
                true
            }
            None => false,
        }
    }
}

/// `dsmcc_CRC32_descriptor`: a CRC32 over the module data, allowing a
/// receiver to validate a completed module independent of section CRCs
/// (grounded on `tsDSMCCCRC32Descriptor.cpp`).
#[derive(Debug, Clone, Copy, Default)]
pub struct DsmccCrc32Descriptor {
    pub crc32: u32,
}

impl DsmccDescriptor for DsmccCrc32Descriptor {
    fn tag(&self) -> u8 {
        DSMCC_CRC32_DESCRIPTOR_TAG
    }

    fn clear(&mut self) {
        self.crc32 = 0;
    }

    fn serialize_payload(&self, buf: &mut PsiBufferWrite) {
        buf.put_u32(self.crc32);
    }

    fn deserialize_payload(&mut self, buf: &mut PsiBufferRead<'_>) -> bool {
        self.crc32 = buf.get_u32();
        !buf.error()
    }

    fn build_xml(&self, parent: &mut Element) {
        crate::xml::set_int_attribute(parent, "CRC_32", self.crc32, true);
    }

    fn analyze_xml(&mut self, element: &Element) -> bool {
        match crate::xml::get_int_attribute(element, "CRC_32") {
            Some(crc32) => {
                self.crc32 = crc32;
                true
            }
            None => false,
        }
    }
}
