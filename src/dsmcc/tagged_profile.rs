//! `TaggedProfile` (BIOP Profile Body / Lite Options Profile Body) (spec §4.4).

use crate::buffer::{PsiBufferRead, PsiBufferWrite};
use crate::dsmcc::lite_component::{LiteComponent, DSMCC_TAG_BIOP_PROFILE, DSMCC_TAG_LITE_OPTIONS};
use crate::xml::{add_hexa_text_child, get_hexa_text_child, get_int_attribute, set_int_attribute};
use xmltree::{Element, XMLNode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaggedProfileBody {
    Biop { lite_components: Vec<LiteComponent> },
    LiteOptions { profile_data: Vec<u8> },
    Unknown { profile_data: Vec<u8> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedProfile {
    pub profile_id_tag: u32,
    pub profile_data_byte_order: u8,
    pub body: TaggedProfileBody,
}

impl TaggedProfile {
    pub fn biop(lite_components: Vec<LiteComponent>) -> TaggedProfile {
        TaggedProfile {
            profile_id_tag: DSMCC_TAG_BIOP_PROFILE,
            profile_data_byte_order: 0x00,
            body: TaggedProfileBody::Biop { lite_components },
        }
    }

    pub fn serialize(&self, buf: &mut PsiBufferWrite) {
        buf.put_u32(self.profile_id_tag);
        buf.push_write_with_leading_length(32);
        buf.put_u8(self.profile_data_byte_order);
        match &self.body {
            TaggedProfileBody::Biop { lite_components } => {
                buf.put_u8(lite_components.len() as u8);
                for lc in lite_components {
                    lc.serialize(buf);
                }
            }
            TaggedProfileBody::LiteOptions { profile_data } | TaggedProfileBody::Unknown { profile_data } => {
                buf.put_bytes(profile_data);
            }
        }
        buf.pop_state();
    }

    pub fn deserialize(buf: &mut PsiBufferRead<'_>) -> TaggedProfile {
        let profile_id_tag = buf.get_u32();
        buf.push_read_size_from_length(32);
        let profile_data_byte_order = buf.get_u8();
        let body = if profile_id_tag == DSMCC_TAG_BIOP_PROFILE {
            let count = buf.get_u8();
            let mut lite_components = Vec::with_capacity(count as usize);
            for _ in 0..count {
                lite_components.push(LiteComponent::deserialize(buf));
            }
            TaggedProfileBody::Biop { lite_components }
        } else if profile_id_tag == DSMCC_TAG_LITE_OPTIONS {
            TaggedProfileBody::LiteOptions {
                profile_data: buf.get_bytes_remaining(),
            }
        } else {
            TaggedProfileBody::Unknown {
                profile_data: buf.get_bytes_remaining(),
            }
        };
        buf.pop_state();
        TaggedProfile {
            profile_id_tag,
            profile_data_byte_order,
            body,
        }
    }

    pub fn build_xml(&self, parent: &mut Element) {
        let mut tagged_profile = Element::new("tagged_profile");
        set_int_attribute(&mut tagged_profile, "profile_id_tag", self.profile_id_tag, true);
        set_int_attribute(
            &mut tagged_profile,
            "profile_data_byte_order",
            self.profile_data_byte_order,
            true,
        );
        match &self.body {
            TaggedProfileBody::Biop { lite_components } => {
                let mut body = Element::new("BIOP_profile_body");
                for lc in lite_components {
                    lc.build_xml(&mut body);
                }
                tagged_profile.children.push(XMLNode::Element(body));
            }
            TaggedProfileBody::LiteOptions { profile_data } => {
                let mut body = Element::new("Lite_options_profile_body");
                add_hexa_text_child(&mut body, "profile_data", profile_data);
                tagged_profile.children.push(XMLNode::Element(body));
            }
            TaggedProfileBody::Unknown { profile_data } => {
                let mut body = Element::new("Unknown_profile");
                add_hexa_text_child(&mut body, "profile_data", profile_data);
                tagged_profile.children.push(XMLNode::Element(body));
            }
        }
        parent.children.push(XMLNode::Element(tagged_profile));
    }

    pub fn analyze_xml(element: &Element) -> Option<TaggedProfile> {
        let profile_id_tag: u32 = get_int_attribute(element, "profile_id_tag")?;
        let profile_data_byte_order: u8 = get_int_attribute(element, "profile_data_byte_order")?;
        let body = if profile_id_tag == DSMCC_TAG_BIOP_PROFILE {
            let body_el = element.get_child("BIOP_profile_body")?;
            let lite_components = body_el
                .children
                .iter()
                .filter_map(|n| n.as_element())
                .filter(|e| e.name == "lite_component")
                .filter_map(LiteComponent::analyze_xml)
                .collect();
            TaggedProfileBody::Biop { lite_components }
        } else if profile_id_tag == DSMCC_TAG_LITE_OPTIONS {
            let body_el = element.get_child("Lite_options_profile_body")?;
            TaggedProfileBody::LiteOptions {
                profile_data: get_hexa_text_child(body_el, "profile_data").unwrap_or_default(),
            }
        } else {
            let body_el = element.get_child("Unknown_profile")?;
            TaggedProfileBody::Unknown {
                profile_data: get_hexa_text_child(body_el, "profile_data").unwrap_or_default(),
            }
        };
        Some(TaggedProfile {
            profile_id_tag,
            profile_data_byte_order,
            body,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dsmcc::lite_component::LiteComponent;

    #[test]
    fn biop_profile_round_trip() {
        let profile = TaggedProfile::biop(vec![LiteComponent::object_location(1, 2, 1, 0, vec![9, 9])]);
        let mut w = PsiBufferWrite::new();
        profile.serialize(&mut w);
        let bytes = w.into_bytes();

        let mut r = PsiBufferRead::new(&bytes);
        let decoded = TaggedProfile::deserialize(&mut r);
        assert_eq!(decoded, profile);

        let mut root = Element::new("root");
        profile.build_xml(&mut root);
        let child = root.get_child("tagged_profile").unwrap();
        assert_eq!(TaggedProfile::analyze_xml(child), Some(profile));
    }

    #[test]
    fn unknown_profile_preserves_bytes() {
        let profile = TaggedProfile {
            profile_id_tag: 0xDEAD_BEEF,
            profile_data_byte_order: 0,
            body: TaggedProfileBody::Unknown {
                profile_data: vec![1, 2, 3, 4, 5],
            },
        };
        let mut w = PsiBufferWrite::new();
        profile.serialize(&mut w);
        let bytes = w.into_bytes();
        let mut r = PsiBufferRead::new(&bytes);
        assert_eq!(TaggedProfile::deserialize(&mut r), profile);
    }
}
