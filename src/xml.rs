//! XML helpers shared by every `build_xml`/`analyze_xml` pair (spec §4.7).
//!
//! Mirrors the handful of `xml::Element` conveniences TSDuck leans on
//! (`setIntAttribute`, `getIntAttribute`, `addHexaTextChild`,
//! `getHexaTextChild`) on top of the `xmltree` DOM.

use xmltree::{Element, XMLNode};

/// Parses a decimal or `0x`-prefixed hexadecimal integer attribute.
pub fn parse_xml_int<T>(s: &str) -> Option<T>
where
    T: FromStrRadix,
{
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        T::from_str_radix(hex, 16).ok()
    } else {
        T::from_str_radix(s, 10).ok()
    }
}

/// Minimal abstraction over the handful of integer widths the DSM-CC
/// structures use, so `parse_xml_int` can stay generic.
pub trait FromStrRadix: Sized {
    fn from_str_radix(s: &str, radix: u32) -> Result<Self, std::num::ParseIntError>;
}

macro_rules! impl_from_str_radix {
    ($($t:ty),*) => {
        $(impl FromStrRadix for $t {
            fn from_str_radix(s: &str, radix: u32) -> Result<Self, std::num::ParseIntError> {
                <$t>::from_str_radix(s, radix)
            }
        })*
    };
}
impl_from_str_radix!(u8, u16, u32, u64);

/// Sets an integer attribute, decimal or `0x`-prefixed hex per `hex`,
/// mirroring `xml::Element::setIntAttribute(..., hexa)`.
pub trait IntAttribute: std::fmt::Display + std::fmt::UpperHex {}
impl<T: std::fmt::Display + std::fmt::UpperHex> IntAttribute for T {}

pub fn set_int_attribute<T: IntAttribute>(element: &mut Element, name: &str, value: T, hex: bool) {
    let text = if hex {
        format!("0x{value:X}")
    } else {
        format!("{value}")
    };
    element.attributes.insert(name.to_string(), text);
}

pub fn get_int_attribute<T: FromStrRadix>(element: &Element, name: &str) -> Option<T> {
    element.attributes.get(name).and_then(|s| parse_xml_int(s))
}

/// Appends a `<name>hex-bytes</name>` child carrying an opaque byte block,
/// mirroring `xml::Element::addHexaTextChild`.
pub fn add_hexa_text_child(parent: &mut Element, name: &str, bytes: &[u8]) {
    let mut child = Element::new(name);
    child.children.push(XMLNode::Text(hex_encode(bytes)));
    parent.children.push(XMLNode::Element(child));
}

/// Reads back a hex-binary child added by `add_hexa_text_child`.
pub fn get_hexa_text_child(parent: &Element, name: &str) -> Option<Vec<u8>> {
    let child = parent.get_child(name)?;
    let text = child.get_text()?;
    hex_decode(text.trim())
}

pub fn hex_encode(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        s.push_str(&format!("{b:02X}"));
    }
    s
}

pub fn hex_decode(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    let mut out = Vec::with_capacity(s.len() / 2);
    let bytes = s.as_bytes();
    for chunk in bytes.chunks(2) {
        let byte_str = std::str::from_utf8(chunk).ok()?;
        out.push(u8::from_str_radix(byte_str, 16).ok()?);
    }
    Some(out)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let bytes = [0x00, 0xAB, 0xFF, 0x10];
        let s = hex_encode(&bytes);
        assert_eq!(hex_decode(&s).unwrap(), bytes);
    }

    #[test]
    fn parses_decimal_and_hex() {
        assert_eq!(parse_xml_int::<u32>("42"), Some(42));
        assert_eq!(parse_xml_int::<u32>("0x2A"), Some(42));
        assert_eq!(parse_xml_int::<u32>("0X2a"), Some(42));
    }

    #[test]
    fn hexa_text_child_round_trip() {
        let mut el = Element::new("root");
        add_hexa_text_child(&mut el, "payload", &[1, 2, 3, 0xFF]);
        assert_eq!(get_hexa_text_child(&el, "payload"), Some(vec![1, 2, 3, 0xFF]));
    }
}
