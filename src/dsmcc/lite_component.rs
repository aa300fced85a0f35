//! `LiteComponent` (BIOP::ObjectLocation / DSM::ConnBinder) (spec §3, §4.4).

use crate::buffer::{PsiBufferRead, PsiBufferWrite};
use crate::dsmcc::tap::Tap;
use crate::xml::{add_hexa_text_child, get_hexa_text_child, get_int_attribute, set_int_attribute};
use xmltree::{Element, XMLNode};

pub const DSMCC_TAG_LITE_OPTIONS: u32 = 0x4953_4F05;
pub const DSMCC_TAG_BIOP_PROFILE: u32 = 0x4953_4F06;
pub const DSMCC_TAG_CONN_BINDER: u32 = 0x4953_4F40;
pub const DSMCC_TAG_OBJECT_LOCATION: u32 = 0x4953_4F50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiteComponentBody {
    ObjectLocation {
        carousel_id: u32,
        module_id: u16,
        version_major: u8,
        version_minor: u8,
        object_key_data: Vec<u8>,
    },
    /// Only one tap is used in practice (the source's own comment notes
    /// "for now only one tap assumed"); kept as a `Vec` for generality.
    ConnBinder { taps: Vec<Tap> },
    Unknown { component_data: Vec<u8> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteComponent {
    pub component_id_tag: u32,
    pub body: LiteComponentBody,
}

impl LiteComponent {
    pub fn object_location(
        carousel_id: u32,
        module_id: u16,
        version_major: u8,
        version_minor: u8,
        object_key_data: Vec<u8>,
    ) -> LiteComponent {
        LiteComponent {
            component_id_tag: DSMCC_TAG_OBJECT_LOCATION,
            body: LiteComponentBody::ObjectLocation {
                carousel_id,
                module_id,
                version_major,
                version_minor,
                object_key_data,
            },
        }
    }

    pub fn conn_binder(taps: Vec<Tap>) -> LiteComponent {
        LiteComponent {
            component_id_tag: DSMCC_TAG_CONN_BINDER,
            body: LiteComponentBody::ConnBinder { taps },
        }
    }

    pub fn serialize(&self, buf: &mut PsiBufferWrite) {
        buf.put_u32(self.component_id_tag);
        buf.push_write_with_leading_length(8);
        match &self.body {
            LiteComponentBody::ObjectLocation {
                carousel_id,
                module_id,
                version_major,
                version_minor,
                object_key_data,
            } => {
                buf.put_u32(*carousel_id);
                buf.put_u16(*module_id);
                buf.put_u8(*version_major);
                buf.put_u8(*version_minor);
                buf.put_u8(object_key_data.len() as u8);
                buf.put_bytes(object_key_data);
            }
            LiteComponentBody::ConnBinder { taps } => {
                buf.put_u8(taps.len() as u8);
                for tap in taps {
                    tap.serialize(buf);
                }
            }
            LiteComponentBody::Unknown { component_data } => {
                buf.put_bytes(component_data);
            }
        }
        buf.pop_state();
    }

    pub fn deserialize(buf: &mut PsiBufferRead<'_>) -> LiteComponent {
        let component_id_tag = buf.get_u32();
        buf.push_read_size_from_length(8);
        let body = match component_id_tag {
            DSMCC_TAG_OBJECT_LOCATION => {
                let carousel_id = buf.get_u32();
                let module_id = buf.get_u16();
                let version_major = buf.get_u8();
                let version_minor = buf.get_u8();
                let key_len = buf.get_u8() as usize;
                let object_key_data = buf.get_bytes(key_len);
                LiteComponentBody::ObjectLocation {
                    carousel_id,
                    module_id,
                    version_major,
                    version_minor,
                    object_key_data,
                }
            }
            DSMCC_TAG_CONN_BINDER => {
                let taps_count = buf.get_u8();
                let mut taps = Vec::with_capacity(taps_count as usize);
                for _ in 0..taps_count {
                    taps.push(Tap::deserialize(buf));
                }
                LiteComponentBody::ConnBinder { taps }
            }
            _ => LiteComponentBody::Unknown {
                component_data: buf.get_bytes_remaining(),
            },
        };
        buf.pop_state();
        LiteComponent { component_id_tag, body }
    }

    pub fn build_xml(&self, parent: &mut Element) {
        let mut lite_component = Element::new("lite_component");
        set_int_attribute(&mut lite_component, "component_id_tag", self.component_id_tag, true);
        match &self.body {
            LiteComponentBody::ObjectLocation {
                carousel_id,
                module_id,
                version_major,
                version_minor,
                object_key_data,
            } => {
                let mut loc = Element::new("BIOP_object_location");
                set_int_attribute(&mut loc, "carousel_id", *carousel_id, true);
                set_int_attribute(&mut loc, "module_id", *module_id, true);
                set_int_attribute(&mut loc, "version_major", *version_major, true);
                set_int_attribute(&mut loc, "version_minor", *version_minor, true);
                add_hexa_text_child(&mut loc, "object_key_data", object_key_data);
                lite_component.children.push(XMLNode::Element(loc));
            }
            LiteComponentBody::ConnBinder { taps } => {
                let mut binder = Element::new("DSM_conn_binder");
                for tap in taps {
                    tap.build_xml(&mut binder);
                }
                lite_component.children.push(XMLNode::Element(binder));
            }
            LiteComponentBody::Unknown { component_data } => {
                let mut unknown = Element::new("Unknown_component");
                add_hexa_text_child(&mut unknown, "component_data", component_data);
                lite_component.children.push(XMLNode::Element(unknown));
            }
        }
        parent.children.push(XMLNode::Element(lite_component));
    }

    pub fn analyze_xml(element: &Element) -> Option<LiteComponent> {
        let component_id_tag: u32 = get_int_attribute(element, "component_id_tag")?;
        let body = match component_id_tag {
            DSMCC_TAG_OBJECT_LOCATION => {
                let loc = element.get_child("BIOP_object_location")?;
                LiteComponentBody::ObjectLocation {
                    carousel_id: get_int_attribute(loc, "carousel_id")?,
                    module_id: get_int_attribute(loc, "module_id")?,
                    version_major: get_int_attribute(loc, "version_major")?,
                    version_minor: get_int_attribute(loc, "version_minor")?,
                    object_key_data: get_hexa_text_child(loc, "object_key_data").unwrap_or_default(),
                }
            }
            DSMCC_TAG_CONN_BINDER => {
                let binder = element.get_child("DSM_conn_binder")?;
                let taps = binder
                    .children
                    .iter()
                    .filter_map(|n| n.as_element())
                    .filter(|e| e.name == "tap")
                    .filter_map(Tap::analyze_xml)
                    .collect();
                LiteComponentBody::ConnBinder { taps }
            }
            _ => {
                let unknown = element.get_child("Unknown_component")?;
                LiteComponentBody::Unknown {
                    component_data: get_hexa_text_child(unknown, "component_data").unwrap_or_default(),
                }
            }
        };
        Some(LiteComponent { component_id_tag, body })
    }
}
