//! Download Data Block message (table id `0x3C`) (spec §3, §4.4), grounded
//! on `tsDSMCCDownloadDataMessage.{h,cpp}`.

use crate::buffer::{PsiBufferRead, PsiBufferWrite};
use crate::dsmcc::message::{
    put_reserved_and_adaptation, skip_adaptation_and_message_length, DsmccMessageHeader,
    DSMCC_MESSAGE_ID_DDB,
};
use crate::xml::{add_hexa_text_child, get_hexa_text_child, get_int_attribute, set_int_attribute};
use xmltree::Element;

pub const TID_DSMCC_DDM: u8 = 0x3C;

/// A single Download Data Block: one block of one module's payload
/// (spec §3). `block_number` doubles as the section number of its
/// carrying section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadDataMessage {
    pub header: DsmccMessageHeader,
    pub module_id: u16,
    pub module_version: u8,
    pub block_number: u16,
    pub block_data: Vec<u8>,
}

impl DownloadDataMessage {
    /// `table_id_extension` for a DDB section is the module id, not the
    /// low bits of the download id (§3, §4.4).
    pub fn table_id_extension(&self) -> u16 {
        self.module_id
    }

    pub fn deserialize(buf: &mut PsiBufferRead<'_>) -> DownloadDataMessage {
        let header = DsmccMessageHeader::deserialize(buf);
        skip_adaptation_and_message_length(buf);

        let module_id = buf.get_u16();
        let module_version = buf.get_u8();
        buf.skip_bytes(1); // reserved
        let block_number = buf.get_u16();
        let block_data = buf.get_bytes_remaining();

        DownloadDataMessage {
            header,
            module_id,
            module_version,
            block_number,
            block_data,
        }
    }

    pub fn serialize(&self, buf: &mut PsiBufferWrite) {
        self.header.serialize(buf);
        put_reserved_and_adaptation(buf);
        buf.push_write_with_leading_length(16); // message_length
        buf.put_u16(self.module_id);
        buf.put_u8(self.module_version);
        buf.put_u8(0xFF); // reserved
        buf.put_u16(self.block_number);
        buf.put_bytes(&self.block_data);
        buf.pop_state();
    }

    pub fn build_xml(&self, parent: &mut Element) {
        set_int_attribute(parent, "message_id", self.header.message_id, true);
        set_int_attribute(
            parent,
            "download_id",
            self.header.transaction_or_download_id,
            true,
        );
        set_int_attribute(parent, "module_id", self.module_id, true);
        set_int_attribute(parent, "module_version", self.module_version, true);
        set_int_attribute(parent, "block_number", self.block_number, true);
        add_hexa_text_child(parent, "block_data", &self.block_data);
    }

    pub fn analyze_xml(element: &Element) -> Option<DownloadDataMessage> {
        let header = DsmccMessageHeader {
            message_id: get_int_attribute(element, "message_id").unwrap_or(DSMCC_MESSAGE_ID_DDB),
            transaction_or_download_id: get_int_attribute(element, "download_id")?,
            ..Default::default()
        };
        Some(DownloadDataMessage {
            header,
            module_id: get_int_attribute(element, "module_id")?,
            module_version: get_int_attribute(element, "module_version")?,
            block_number: get_int_attribute(element, "block_number")?,
            block_data: get_hexa_text_child(element, "block_data").unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trip() {
        let ddb = DownloadDataMessage {
            header: DsmccMessageHeader {
                message_id: DSMCC_MESSAGE_ID_DDB,
                transaction_or_download_id: 0xCAFE_0001,
                ..Default::default()
            },
            module_id: 0x0001,
            module_version: 3,
            block_number: 0,
            block_data: vec![0xAA; 1024],
        };
        let mut w = PsiBufferWrite::new();
        ddb.serialize(&mut w);
        let bytes = w.into_bytes();

        let mut r = PsiBufferRead::new(&bytes);
        let decoded = DownloadDataMessage::deserialize(&mut r);
        assert_eq!(decoded, ddb);
        assert!(!r.error());
        assert_eq!(decoded.table_id_extension(), 0x0001);
    }
}
