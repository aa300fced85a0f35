//! The `Tap` structure (ETSI TR 101 202 §4.7.2.5 / §4.7.3.2).

use crate::buffer::{PsiBufferRead, PsiBufferWrite};
use crate::xml::{get_int_attribute, set_int_attribute};
use xmltree::Element;

/// Associates a connection binder with an elementary stream and (for the
/// first tap in a `ConnBinder`) a selector used for session integrity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tap {
    pub id: u16,
    pub use_: u16,
    pub association_tag: u16,
    pub selector_type: u16,
    pub transaction_id: u32,
    pub timeout: u32,
}

impl Default for Tap {
    fn default() -> Self {
        Tap {
            id: 0x0000,
            use_: 0x0016,
            association_tag: 0x0000,
            selector_type: 0x0001,
            transaction_id: 0,
            timeout: 0,
        }
    }
}

impl Tap {
    pub fn serialize(&self, buf: &mut PsiBufferWrite) {
        buf.put_u16(self.id);
        buf.put_u16(self.use_);
        buf.put_u16(self.association_tag);
        buf.put_u16(self.selector_type);
        buf.put_u32(self.transaction_id);
        buf.put_u32(self.timeout);
    }

    pub fn deserialize(buf: &mut PsiBufferRead<'_>) -> Tap {
        Tap {
            id: buf.get_u16(),
            use_: buf.get_u16(),
            association_tag: buf.get_u16(),
            selector_type: buf.get_u16(),
            transaction_id: buf.get_u32(),
            timeout: buf.get_u32(),
        }
    }

    pub fn build_xml(&self, parent: &mut Element) {
        let mut tap = Element::new("tap");
        set_int_attribute(&mut tap, "id", self.id, true);
        set_int_attribute(&mut tap, "use", self.use_, true);
        set_int_attribute(&mut tap, "association_tag", self.association_tag, true);
        set_int_attribute(&mut tap, "selector_type", self.selector_type, true);
        set_int_attribute(&mut tap, "transaction_id", self.transaction_id, true);
        set_int_attribute(&mut tap, "timeout", self.timeout, true);
        parent.children.push(xmltree::XMLNode::Element(tap));
    }

    pub fn analyze_xml(element: &Element) -> Option<Tap> {
        Some(Tap {
            id: get_int_attribute(element, "id")?,
            use_: get_int_attribute(element, "use")?,
            association_tag: get_int_attribute(element, "association_tag")?,
            selector_type: get_int_attribute(element, "selector_type").unwrap_or(0x0001),
            transaction_id: get_int_attribute(element, "transaction_id").unwrap_or(0),
            timeout: get_int_attribute(element, "timeout").unwrap_or(0),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trip() {
        let tap = Tap {
            id: 1,
            use_: 0x16,
            association_tag: 0x55AA,
            selector_type: 1,
            transaction_id: 0xCAFE_0001,
            timeout: 90000,
        };
        let mut w = PsiBufferWrite::new();
        tap.serialize(&mut w);
        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), 16);

        let mut r = PsiBufferRead::new(&bytes);
        let decoded = Tap::deserialize(&mut r);
        assert_eq!(decoded, tap);
    }
}
