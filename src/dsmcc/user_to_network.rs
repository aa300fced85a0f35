//! DSM-CC User-to-Network message (table id `0x3B`): DSI and DII (spec §3,
//! §4.4), grounded on `tsDSMCCUserToNetworkMessage.{h,cpp}`.

use crate::buffer::{PsiBufferRead, PsiBufferWrite};
use crate::descriptor::DescriptorList;
use crate::dsmcc::compatibility::CompatibilityDescriptor;
use crate::dsmcc::ior::Ior;
use crate::dsmcc::message::{
    put_reserved_and_adaptation, skip_adaptation_and_message_length, DsmccMessageHeader,
    DSMCC_MESSAGE_ID_DII, DSMCC_MESSAGE_ID_DSI, DSMCC_SERVER_ID_SIZE,
};
use crate::dsmcc::tap::Tap;
use crate::xml::{add_hexa_text_child, get_hexa_text_child, get_int_attribute, set_int_attribute};
use xmltree::{Element, XMLNode};

pub const TID_DSMCC_UNM: u8 = 0x3B;

/// One module announced by a DII (spec §4.4).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiiModule {
    pub module_id: u16,
    pub module_size: u32,
    pub module_version: u8,
    pub module_timeout: u32,
    pub block_timeout: u32,
    pub min_block_time: u32,
    pub taps: Vec<Tap>,
    pub descriptors: DescriptorList,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserToNetworkMessage {
    Dsi {
        header: DsmccMessageHeader,
        server_id: Vec<u8>,
        compatibility_descriptor: CompatibilityDescriptor,
        ior: Ior,
    },
    Dii {
        header: DsmccMessageHeader,
        download_id: u32,
        block_size: u16,
        compatibility_descriptor: CompatibilityDescriptor,
        modules: Vec<DiiModule>,
    },
}

impl UserToNetworkMessage {
    pub fn header(&self) -> &DsmccMessageHeader {
        match self {
            UserToNetworkMessage::Dsi { header, .. } => header,
            UserToNetworkMessage::Dii { header, .. } => header,
        }
    }

    pub fn deserialize(buf: &mut PsiBufferRead<'_>) -> UserToNetworkMessage {
        let header = DsmccMessageHeader::deserialize(buf);
        skip_adaptation_and_message_length(buf);

        if header.message_id == DSMCC_MESSAGE_ID_DSI {
            let server_id = buf.get_bytes(DSMCC_SERVER_ID_SIZE);
            let compatibility_descriptor = CompatibilityDescriptor::deserialize(buf);

            buf.push_read_size_from_length(16); // private_data
            let ior = Ior::deserialize(buf);
            buf.skip_bytes(4); // download_taps_count + service_context_list_count + user_info_length
            buf.pop_state();

            UserToNetworkMessage::Dsi {
                header,
                server_id,
                compatibility_descriptor,
                ior,
            }
        } else if header.message_id == DSMCC_MESSAGE_ID_DII {
            let download_id = buf.get_u32();
            let block_size = buf.get_u16();
            buf.skip_bytes(10); // windowSize + ackPeriod + tCDownloadWindow + tCDownloadScenario
            let compatibility_descriptor = CompatibilityDescriptor::deserialize(buf);

            let number_of_modules = buf.get_u16();
            let mut modules = Vec::with_capacity(number_of_modules as usize);
            for _ in 0..number_of_modules {
                let module_id = buf.get_u16();
                let module_size = buf.get_u32();
                let module_version = buf.get_u8();

                buf.push_read_size_from_length(8); // module_info_length
                let module_timeout = buf.get_u32();
                let block_timeout = buf.get_u32();
                let min_block_time = buf.get_u32();
                let taps_count = buf.get_u8();
                let mut taps = Vec::with_capacity(taps_count as usize);
                for _ in 0..taps_count {
                    taps.push(Tap::deserialize(buf));
                }
                let user_info_length = buf.get_u8();
                let descriptors =
                    DescriptorList::deserialize(buf, user_info_length as usize, TID_DSMCC_UNM);
                buf.pop_state(); // module_info_length

                modules.push(DiiModule {
                    module_id,
                    module_size,
                    module_version,
                    module_timeout,
                    block_timeout,
                    min_block_time,
                    taps,
                    descriptors,
                });
            }

            let private_data_length = buf.get_u16();
            buf.skip_bytes(private_data_length as usize);

            UserToNetworkMessage::Dii {
                header,
                download_id,
                block_size,
                compatibility_descriptor,
                modules,
            }
        } else {
            buf.set_user_error();
            UserToNetworkMessage::Dii {
                header,
                download_id: 0,
                block_size: 0,
                compatibility_descriptor: CompatibilityDescriptor::default(),
                modules: Vec::new(),
            }
        }
    }

    pub fn serialize(&self, buf: &mut PsiBufferWrite) {
        self.header().serialize(buf);
        put_reserved_and_adaptation(buf);
        buf.push_write_with_leading_length(16); // message_length

        match self {
            UserToNetworkMessage::Dsi {
                server_id,
                compatibility_descriptor,
                ior,
                ..
            } => {
                buf.put_bytes(server_id);
                compatibility_descriptor.serialize(buf);

                buf.push_write_with_leading_length(16); // private_data
                ior.serialize(buf);
                buf.put_u8(0x00); // download_taps_count
                buf.put_u8(0x00); // service_context_list_count
                buf.put_u16(0x0000); // user_info_length
                buf.pop_state();
            }
            UserToNetworkMessage::Dii {
                download_id,
                block_size,
                compatibility_descriptor,
                modules,
                ..
            } => {
                buf.put_u32(*download_id);
                buf.put_u16(*block_size);
                // ETSI TR 101 202 5.7.5.1: reserved, always zero.
                buf.put_u8(0x00);
                buf.put_u8(0x00);
                buf.put_u32(0x0000_0000);
                buf.put_u32(0x0000_0000);
                compatibility_descriptor.serialize(buf);

                buf.put_u16(modules.len() as u16);
                for module in modules {
                    buf.put_u16(module.module_id);
                    buf.put_u32(module.module_size);
                    buf.put_u8(module.module_version);

                    buf.push_write_with_leading_length(8); // module_info_length
                    buf.put_u32(module.module_timeout);
                    buf.put_u32(module.block_timeout);
                    buf.put_u32(module.min_block_time);
                    buf.put_u8(module.taps.len() as u8);
                    for tap in &module.taps {
                        tap.serialize(buf);
                    }

                    buf.push_write_with_leading_length(8); // user_info_length, 1 byte not 2
                    module.descriptors.serialize(buf);
                    buf.pop_state(); // user_info_length
                    buf.pop_state(); // module_info_length
                }
                buf.put_u16(0x0000); // private_data_length
            }
        }
        buf.pop_state(); // message_length
    }

    pub fn build_xml(&self, parent: &mut Element) {
        set_int_attribute(parent, "protocol_discriminator", self.header().protocol_discriminator, true);
        set_int_attribute(parent, "dsmcc_type", self.header().dsmcc_type, true);
        set_int_attribute(parent, "message_id", self.header().message_id, true);
        set_int_attribute(
            parent,
            "transaction_id",
            self.header().transaction_or_download_id,
            true,
        );

        match self {
            UserToNetworkMessage::Dsi {
                server_id,
                compatibility_descriptor,
                ior,
                ..
            } => {
                let mut dsi = Element::new("DSI");
                add_hexa_text_child(&mut dsi, "server_id", server_id);
                compatibility_descriptor.build_xml(&mut dsi);
                ior.build_xml(&mut dsi);
                parent.children.push(XMLNode::Element(dsi));
            }
            UserToNetworkMessage::Dii {
                download_id,
                block_size,
                compatibility_descriptor,
                modules,
                ..
            } => {
                let mut dii = Element::new("DII");
                set_int_attribute(&mut dii, "download_id", *download_id, true);
                set_int_attribute(&mut dii, "block_size", *block_size, true);
                compatibility_descriptor.build_xml(&mut dii);

                for module in modules {
                    let mut mod_el = Element::new("module");
                    set_int_attribute(&mut mod_el, "module_id", module.module_id, true);
                    set_int_attribute(&mut mod_el, "module_size", module.module_size, true);
                    set_int_attribute(&mut mod_el, "module_version", module.module_version, true);
                    set_int_attribute(&mut mod_el, "module_timeout", module.module_timeout, true);
                    set_int_attribute(&mut mod_el, "block_timeout", module.block_timeout, true);
                    set_int_attribute(&mut mod_el, "min_block_time", module.min_block_time, true);
                    for tap in &module.taps {
                        tap.build_xml(&mut mod_el);
                    }
                    module.descriptors.build_xml(&mut mod_el);
                    dii.children.push(XMLNode::Element(mod_el));
                }
                parent.children.push(XMLNode::Element(dii));
            }
        }
    }

    pub fn analyze_xml(element: &Element) -> Option<UserToNetworkMessage> {
        let header = DsmccMessageHeader {
            protocol_discriminator: get_int_attribute(element, "protocol_discriminator").unwrap_or(0x11),
            dsmcc_type: get_int_attribute(element, "dsmcc_type").unwrap_or(0x03),
            message_id: get_int_attribute(element, "message_id")?,
            transaction_or_download_id: get_int_attribute(element, "transaction_id")?,
        };

        if header.message_id == DSMCC_MESSAGE_ID_DSI {
            let dsi = element.get_child("DSI")?;
            let server_id = get_hexa_text_child(dsi, "server_id")?;
            let compatibility_descriptor =
                CompatibilityDescriptor::analyze_xml(dsi).unwrap_or_default();
            let ior_element = dsi.get_child("IOR")?;
            let ior = Ior::analyze_xml(ior_element)?;
            Some(UserToNetworkMessage::Dsi {
                header,
                server_id,
                compatibility_descriptor,
                ior,
            })
        } else if header.message_id == DSMCC_MESSAGE_ID_DII {
            let dii = element.get_child("DII")?;
            let download_id = get_int_attribute(dii, "download_id")?;
            let block_size = get_int_attribute(dii, "block_size")?;
            let compatibility_descriptor =
                CompatibilityDescriptor::analyze_xml(dii).unwrap_or_default();

            let mut modules = Vec::new();
            for mod_el in dii.children.iter().filter_map(|n| n.as_element()) {
                if mod_el.name != "module" {
                    continue;
                }
                let taps = mod_el
                    .children
                    .iter()
                    .filter_map(|n| n.as_element())
                    .filter(|e| e.name == "tap")
                    .filter_map(Tap::analyze_xml)
                    .collect();
                modules.push(DiiModule {
                    module_id: get_int_attribute(mod_el, "module_id")?,
                    module_size: get_int_attribute(mod_el, "module_size")?,
                    module_version: get_int_attribute(mod_el, "module_version")?,
                    module_timeout: get_int_attribute(mod_el, "module_timeout")?,
                    block_timeout: get_int_attribute(mod_el, "block_timeout")?,
                    min_block_time: get_int_attribute(mod_el, "min_block_time")?,
                    taps,
                    descriptors: DescriptorList::analyze_xml(mod_el),
                });
            }

            Some(UserToNetworkMessage::Dii {
                header,
                download_id,
                block_size,
                compatibility_descriptor,
                modules,
            })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample_header(message_id: u16) -> DsmccMessageHeader {
        DsmccMessageHeader {
            message_id,
            transaction_or_download_id: 0xCAFE_0001,
            ..Default::default()
        }
    }

    #[test]
    fn dsi_round_trip() {
        let msg = UserToNetworkMessage::Dsi {
            header: sample_header(DSMCC_MESSAGE_ID_DSI),
            server_id: vec![0xFF; DSMCC_SERVER_ID_SIZE],
            compatibility_descriptor: CompatibilityDescriptor::default(),
            ior: Ior::default(),
        };
        let mut w = PsiBufferWrite::new();
        msg.serialize(&mut w);
        let bytes = w.into_bytes();

        let mut r = PsiBufferRead::new(&bytes);
        let decoded = UserToNetworkMessage::deserialize(&mut r);
        assert_eq!(decoded, msg);
        assert!(!r.error());

        let mut root = Element::new("root");
        msg.build_xml(&mut root);
        assert_eq!(UserToNetworkMessage::analyze_xml(&root), Some(msg));
    }

    #[test]
    fn dii_round_trip_with_module() {
        let mut descriptors = DescriptorList::new();
        descriptors.push(0x09, vec![0x01, 0x00, 0x00, 0x03, 0xE8]);
        let msg = UserToNetworkMessage::Dii {
            header: sample_header(DSMCC_MESSAGE_ID_DII),
            download_id: 0xCAFE_0001,
            block_size: 4066,
            compatibility_descriptor: CompatibilityDescriptor::default(),
            modules: vec![DiiModule {
                module_id: 0x0001,
                module_size: 1024,
                module_version: 3,
                module_timeout: 10_000,
                block_timeout: 2_000,
                min_block_time: 0,
                taps: vec![Tap::default()],
                descriptors,
            }],
        };
        let mut w = PsiBufferWrite::new();
        msg.serialize(&mut w);
        let bytes = w.into_bytes();

        let mut r = PsiBufferRead::new(&bytes);
        let decoded = UserToNetworkMessage::deserialize(&mut r);
        assert_eq!(decoded, msg);
        assert!(!r.error());

        let mut root = Element::new("root");
        msg.build_xml(&mut root);
        assert_eq!(UserToNetworkMessage::analyze_xml(&root), Some(msg));
    }
}
