//! The `compatibilityDescriptor()` structure carried by every DSI/DII
//! (ISO/IEC 13818-6 §7.2). No literal source file for this one was
//! retrieved in the pack; the layout below follows the ISO/IEC 13818-6 §7.2
//! syntax the spec text names, preserving unknown sub-descriptor bytes
//! opaquely like the rest of the framework.

use crate::buffer::{PsiBufferRead, PsiBufferWrite};
use crate::xml::{add_hexa_text_child, get_hexa_text_child, get_int_attribute, set_int_attribute};
use xmltree::{Element, XMLNode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubDescriptor {
    pub sub_descriptor_type: u8,
    pub additional_info: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatibilityDescriptorEntry {
    pub descriptor_type: u8,
    pub specifier_type: u8,
    /// 24-bit specifier data (organization id / private data specifier).
    pub specifier_data: u32,
    pub model: u16,
    pub version: u16,
    pub sub_descriptors: Vec<SubDescriptor>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompatibilityDescriptor {
    pub descriptors: Vec<CompatibilityDescriptorEntry>,
}

impl CompatibilityDescriptor {
    pub fn clear(&mut self) {
        self.descriptors.clear();
    }

    pub fn serialize(&self, buf: &mut PsiBufferWrite) {
        buf.put_u16(self.descriptors.len() as u16);
        for entry in &self.descriptors {
            buf.put_u8(entry.descriptor_type);
            buf.push_write_with_leading_length(8);
            buf.put_u8(entry.specifier_type);
            buf.put_u8(((entry.specifier_data >> 16) & 0xFF) as u8);
            buf.put_u8(((entry.specifier_data >> 8) & 0xFF) as u8);
            buf.put_u8((entry.specifier_data & 0xFF) as u8);
            buf.put_u16(entry.model);
            buf.put_u16(entry.version);
            buf.put_u8(entry.sub_descriptors.len() as u8);
            for sub in &entry.sub_descriptors {
                buf.put_u8(sub.sub_descriptor_type);
                buf.put_u8(sub.additional_info.len() as u8);
                buf.put_bytes(&sub.additional_info);
            }
            buf.pop_state();
        }
    }

    pub fn deserialize(buf: &mut PsiBufferRead<'_>) -> CompatibilityDescriptor {
        let count = buf.get_u16();
        let mut descriptors = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let descriptor_type = buf.get_u8();
            buf.push_read_size_from_length(8);
            let specifier_type = buf.get_u8();
            let b0 = buf.get_u8() as u32;
            let b1 = buf.get_u8() as u32;
            let b2 = buf.get_u8() as u32;
            let specifier_data = (b0 << 16) | (b1 << 8) | b2;
            let model = buf.get_u16();
            let version = buf.get_u16();
            let sub_count = buf.get_u8();
            let mut sub_descriptors = Vec::with_capacity(sub_count as usize);
            for _ in 0..sub_count {
                let sub_descriptor_type = buf.get_u8();
                let len = buf.get_u8() as usize;
                let additional_info = buf.get_bytes(len);
                sub_descriptors.push(SubDescriptor {
                    sub_descriptor_type,
                    additional_info,
                });
            }
            buf.pop_state();
            descriptors.push(CompatibilityDescriptorEntry {
                descriptor_type,
                specifier_type,
                specifier_data,
                model,
                version,
                sub_descriptors,
            });
        }
        CompatibilityDescriptor { descriptors }
    }

    pub fn build_xml(&self, parent: &mut Element) {
        let mut compat = Element::new("compatibilityDescriptor");
        for entry in &self.descriptors {
            let mut d = Element::new("descriptor");
            set_int_attribute(&mut d, "descriptorType", entry.descriptor_type, true);
            set_int_attribute(&mut d, "specifierType", entry.specifier_type, true);
            set_int_attribute(&mut d, "specifierData", entry.specifier_data, true);
            set_int_attribute(&mut d, "model", entry.model, true);
            set_int_attribute(&mut d, "version", entry.version, true);
            for sub in &entry.sub_descriptors {
                let mut s = Element::new("subDescriptor");
                set_int_attribute(&mut s, "subDescriptorType", sub.sub_descriptor_type, true);
                add_hexa_text_child(&mut s, "additionalInfo", &sub.additional_info);
                d.children.push(XMLNode::Element(s));
            }
            compat.children.push(XMLNode::Element(d));
        }
        parent.children.push(XMLNode::Element(compat));
    }

    pub fn analyze_xml(parent: &Element) -> Option<CompatibilityDescriptor> {
        let Some(compat) = parent.get_child("compatibilityDescriptor") else {
            return Some(CompatibilityDescriptor::default());
        };
        let mut descriptors = Vec::new();
        for d in compat.children.iter().filter_map(|n| n.as_element()) {
            if d.name != "descriptor" {
                continue;
            }
            let descriptor_type = get_int_attribute(d, "descriptorType")?;
            let specifier_type = get_int_attribute(d, "specifierType")?;
            let specifier_data = get_int_attribute(d, "specifierData")?;
            let model = get_int_attribute(d, "model")?;
            let version = get_int_attribute(d, "version")?;
            let mut sub_descriptors = Vec::new();
            for s in d.children.iter().filter_map(|n| n.as_element()) {
                if s.name != "subDescriptor" {
                    continue;
                }
                sub_descriptors.push(SubDescriptor {
                    sub_descriptor_type: get_int_attribute(s, "subDescriptorType")?,
                    additional_info: get_hexa_text_child(s, "additionalInfo").unwrap_or_default(),
                });
            }
            descriptors.push(CompatibilityDescriptorEntry {
                descriptor_type,
                specifier_type,
                specifier_data,
                model,
                version,
                sub_descriptors,
            });
        }
        Some(CompatibilityDescriptor { descriptors })
    }
}

/// Looks up the DSM-CC compressed-module descriptor (tag `0x09`) that a
/// DII's per-module descriptor list may carry, per §4.5's processing rule
/// ("the controller scans the per-module descriptor list for a compressed
/// module descriptor"). Layout: `compression_method: u8`,
/// `original_size: u32`.
pub const COMPRESSED_MODULE_DESCRIPTOR_TAG: u8 = 0x09;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressedModuleDescriptor {
    pub compression_method: u8,
    pub original_size: u32,
}

impl CompressedModuleDescriptor {
    pub fn parse(payload: &[u8]) -> Option<CompressedModuleDescriptor> {
        if payload.len() < 5 {
            return None;
        }
        Some(CompressedModuleDescriptor {
            compression_method: payload[0],
            original_size: u32::from_be_bytes([payload[1], payload[2], payload[3], payload[4]]),
        })
    }

    pub fn serialize_payload(&self) -> Vec<u8> {
        let mut out = vec![self.compression_method];
        out.extend_from_slice(&self.original_size.to_be_bytes());
        out
    }
}
