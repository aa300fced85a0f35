//! The owned descriptor list used by DSM-CC module entries (spec §4.3).
//!
//! Distinct from the teacher's borrowed, iterate-only
//! `mpeg2ts_reader::descriptor::DescriptorIter`: DII modules need a list
//! that can be both parsed from and re-serialized to bytes (for the
//! binary/XML round-trip of §4.4/§8), so this keeps its own owned copy of
//! each descriptor's payload.

use crate::buffer::{PsiBufferRead, PsiBufferWrite};
use crate::dsmcc::compatibility::{CompressedModuleDescriptor, COMPRESSED_MODULE_DESCRIPTOR_TAG};
use crate::xml::{add_hexa_text_child, get_hexa_text_child, get_int_attribute, set_int_attribute};
use xmltree::{Element, XMLNode};

/// A single (tag, payload) descriptor, opaque unless interpreted by a
/// caller that knows the tag (§4.3: unknown descriptors are preserved
/// opaquely with their tag).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDescriptor {
    pub tag: u8,
    pub payload: Vec<u8>,
}

/// An ordered sequence of descriptors belonging to one parent entity
/// (§3: "order is preserved on serialization").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptorList {
    descriptors: Vec<RawDescriptor>,
}

impl DescriptorList {
    pub fn new() -> Self {
        DescriptorList::default()
    }

    pub fn push(&mut self, tag: u8, payload: Vec<u8>) {
        self.descriptors.push(RawDescriptor { tag, payload });
    }

    pub fn iter(&self) -> impl Iterator<Item = &RawDescriptor> {
        self.descriptors.iter()
    }

    pub fn first_with_tag(&self, tag: u8) -> Option<&RawDescriptor> {
        self.descriptors.iter().find(|d| d.tag == tag)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Scans for a compressed-module descriptor (tag `0x09`), per §4.5's
    /// DII processing rule.
    pub fn compressed_module_descriptor(&self) -> Option<CompressedModuleDescriptor> {
        self.first_with_tag(COMPRESSED_MODULE_DESCRIPTOR_TAG)
            .and_then(|d| CompressedModuleDescriptor::parse(&d.payload))
    }

    /// Serializes the whole list as a concatenation of (tag, length,
    /// payload) triples, with no outer length prefix — the caller wraps
    /// this in whatever length field its container uses (§4.3, §4.4's
    /// one-byte `user_info_length` quirk for DII modules).
    pub fn serialize(&self, buf: &mut PsiBufferWrite) {
        for d in &self.descriptors {
            buf.put_u8(d.tag);
            buf.put_u8(d.payload.len() as u8);
            buf.put_bytes(&d.payload);
        }
    }

    /// Reads descriptors until `total_len` bytes have been consumed from
    /// the current position, dispatching each one through the table-scoped
    /// registry (§4.3, §2): "when decoding a descriptor, the registry is
    /// queried with the current context; the first matching entry wins; if
    /// none matches, the descriptor is preserved as an opaque byte block."
    /// `table_id` is the enclosing table's id, forming the lookup scope.
    /// The raw `(tag, payload)` is always kept (it is the wire form every
    /// descriptor round-trips through); a registry hit additionally decodes
    /// and logs the typed structure as a decode-time sanity check.
    pub fn deserialize(buf: &mut PsiBufferRead<'_>, total_len: usize, table_id: u8) -> DescriptorList {
        let mut list = DescriptorList::new();
        let start_remaining = buf.remaining_read_bytes();
        let target = start_remaining.saturating_sub(total_len);
        while buf.remaining_read_bytes() > target && buf.can_read_bytes(2) {
            let tag = buf.get_u8();
            let len = buf.get_u8() as usize;
            if !buf.can_read_bytes(len) {
                buf.set_user_error();
                break;
            }
            let payload = buf.get_bytes(len);
            Self::dispatch_to_registry(tag, &payload, table_id);
            list.push(tag, payload);
        }
        list
    }

    /// Looks up `tag` in `table_id`'s scope and, on a hit, decodes `payload`
    /// through the typed descriptor rather than leaving it opaque. A miss,
    /// or a typed decode that itself reports an error, is not fatal to the
    /// surrounding table decode — the raw bytes are kept by the caller
    /// either way, per §4.3's "unknown descriptors are preserved opaquely."
    /// Returns `true` if a registered factory matched and decoded `payload`
    /// cleanly (used by tests to confirm the dispatch actually occurred).
    fn dispatch_to_registry(tag: u8, payload: &[u8], table_id: u8) -> bool {
        let key = crate::registry::DescriptorKey::table_specific(tag, table_id);
        let Some(mut typed) = crate::registry::Registry::global().lookup(&key) else {
            return false;
        };
        let mut sub = PsiBufferRead::new(payload);
        if typed.deserialize_payload(&mut sub) && !sub.error() {
            log::debug!("decoded table {table_id:#04x} descriptor tag {tag:#04x}: {typed:?}");
            true
        } else {
            log::warn!(
                "table {table_id:#04x} descriptor tag {tag:#04x} matched the registry but failed to decode, keeping opaque"
            );
            false
        }
    }

    pub fn build_xml(&self, parent: &mut Element) {
        for d in &self.descriptors {
            let mut el = Element::new("descriptor");
            set_int_attribute(&mut el, "tag", d.tag, true);
            add_hexa_text_child(&mut el, "payload", &d.payload);
            parent.children.push(XMLNode::Element(el));
        }
    }

    pub fn analyze_xml(parent: &Element) -> DescriptorList {
        let mut list = DescriptorList::new();
        for el in parent.children.iter().filter_map(|n| n.as_element()) {
            if el.name != "descriptor" {
                continue;
            }
            let Some(tag) = get_int_attribute(el, "tag") else {
                continue;
            };
            let payload = get_hexa_text_child(el, "payload").unwrap_or_default();
            list.push(tag, payload);
        }
        list
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dsmcc::TID_DSMCC_UNM;

    #[test]
    fn round_trip() {
        let mut list = DescriptorList::new();
        list.push(0x09, vec![0x01, 0x00, 0x00, 0x03, 0xE8]);
        list.push(0x0B, vec![0xDE, 0xAD, 0xBE, 0xEF]);

        let mut w = PsiBufferWrite::new();
        list.serialize(&mut w);
        let bytes = w.into_bytes();

        let mut r = PsiBufferRead::new(&bytes);
        let decoded = DescriptorList::deserialize(&mut r, bytes.len(), TID_DSMCC_UNM);
        assert_eq!(decoded, list);
        assert_eq!(
            decoded.compressed_module_descriptor().unwrap().original_size,
            1000
        );
    }

    #[test]
    fn xml_round_trip() {
        let mut list = DescriptorList::new();
        list.push(0x01, vec![1, 2, 3]);
        let mut root = Element::new("root");
        list.build_xml(&mut root);
        assert_eq!(DescriptorList::analyze_xml(&root), list);
    }

    /// §4.3/§2 dispatch: a tag registered in the enclosing table's scope is
    /// instantiated and decoded through its typed descriptor.
    #[test]
    fn dispatch_hits_registered_crc32_descriptor_in_scope() {
        assert!(DescriptorList::dispatch_to_registry(
            0x0B,
            &[0xDE, 0xAD, 0xBE, 0xEF],
            TID_DSMCC_UNM,
        ));
    }

    /// A tag with no registered factory in this scope falls back to opaque
    /// (the dispatch reports no match; `deserialize` still keeps the raw
    /// bytes in the returned list regardless).
    #[test]
    fn dispatch_misses_unregistered_tag_in_scope() {
        assert!(!DescriptorList::dispatch_to_registry(
            0xF0,
            &[0x01, 0x02, 0x03],
            TID_DSMCC_UNM,
        ));
    }

    /// The same tag outside the registered table scope also misses, since
    /// registry keys are table-specific.
    #[test]
    fn dispatch_misses_registered_tag_outside_scope() {
        assert!(!DescriptorList::dispatch_to_registry(
            0x0B,
            &[0xDE, 0xAD, 0xBE, 0xEF],
            0x42, // SDT, not a DSM-CC table id
        ));
    }

    #[test]
    fn deserialize_keeps_opaque_bytes_even_on_registry_hit() {
        // The decode-path dispatch is a side-effect (logging/validation);
        // the raw (tag, payload) representation returned by `deserialize`
        // is unaffected by whether the registry matched.
        let mut list = DescriptorList::new();
        list.push(0x0B, vec![0xDE, 0xAD, 0xBE, 0xEF]);
        let mut w = PsiBufferWrite::new();
        list.serialize(&mut w);
        let bytes = w.into_bytes();

        let mut r = PsiBufferRead::new(&bytes);
        let decoded = DescriptorList::deserialize(&mut r, bytes.len(), TID_DSMCC_UNM);
        assert_eq!(decoded.first_with_tag(0x0B).unwrap().payload, vec![0xDE, 0xAD, 0xBE, 0xEF]);
    }
}
