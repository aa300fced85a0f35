//! Interoperable Object Reference (IOR) (spec §3, §4.4).

use crate::buffer::{PsiBufferRead, PsiBufferWrite};
use crate::dsmcc::tagged_profile::TaggedProfile;
use crate::xml::{add_hexa_text_child, get_hexa_text_child};
use xmltree::{Element, XMLNode};

/// CDR alignment padding needed after a variable-length byte string of the
/// given length, rounding forward to the next 4-byte boundary (§4.4).
fn cdr_padding(len: usize) -> usize {
    let rem = len % 4;
    if rem == 0 {
        0
    } else {
        4 - rem
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Ior {
    pub type_id: Vec<u8>,
    pub tagged_profiles: Vec<TaggedProfile>,
}

impl Ior {
    pub fn serialize(&self, buf: &mut PsiBufferWrite) {
        buf.put_u32(self.type_id.len() as u32);
        buf.put_bytes(&self.type_id);
        for _ in 0..cdr_padding(self.type_id.len()) {
            buf.put_u8(0);
        }

        buf.put_u32(self.tagged_profiles.len() as u32);
        for profile in &self.tagged_profiles {
            profile.serialize(buf);
        }
    }

    pub fn deserialize(buf: &mut PsiBufferRead<'_>) -> Ior {
        let type_id_length = buf.get_u32() as usize;
        let type_id = buf.get_bytes(type_id_length);
        buf.skip_bytes(cdr_padding(type_id_length));

        let tagged_profiles_count = buf.get_u32();
        let mut tagged_profiles = Vec::with_capacity(tagged_profiles_count as usize);
        for _ in 0..tagged_profiles_count {
            tagged_profiles.push(TaggedProfile::deserialize(buf));
        }

        Ior {
            type_id,
            tagged_profiles,
        }
    }

    pub fn build_xml(&self, parent: &mut Element) {
        let mut ior = Element::new("IOR");
        add_hexa_text_child(&mut ior, "type_id", &self.type_id);
        for profile in &self.tagged_profiles {
            profile.build_xml(&mut ior);
        }
        parent.children.push(XMLNode::Element(ior));
    }

    pub fn analyze_xml(element: &Element) -> Option<Ior> {
        let type_id = get_hexa_text_child(element, "type_id")?;
        let tagged_profiles = element
            .children
            .iter()
            .filter_map(|n| n.as_element())
            .filter(|e| e.name == "tagged_profile")
            .filter_map(TaggedProfile::analyze_xml)
            .collect();
        Some(Ior {
            type_id,
            tagged_profiles,
        })
    }
}
