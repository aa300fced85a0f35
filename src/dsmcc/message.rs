//! The 12-byte message header shared by every DSM-CC table (spec §3, §4.4).

use crate::buffer::{PsiBufferRead, PsiBufferWrite};

pub const DSMCC_PROTOCOL_DISCRIMINATOR: u8 = 0x11;
pub const DSMCC_TYPE_DOWNLOAD_MESSAGE: u8 = 0x03;

pub const DSMCC_MESSAGE_ID_DSI: u16 = 0x1006;
pub const DSMCC_MESSAGE_ID_DII: u16 = 0x1002;
pub const DSMCC_MESSAGE_ID_DDB: u16 = 0x1003;

pub const DSMCC_MESSAGE_HEADER_SIZE: usize = 12;

/// DSM-CC sections use the private-section maximum despite reporting
/// `private_indicator = 0` (§9, ETSI TS 102 809 Table B.2).
pub const MAX_DSMCC_SECTION_PAYLOAD: usize = 4084;

pub const DSMCC_SERVER_ID_SIZE: usize = 20;

/// The 12-byte header common to DSI, DII and DDB (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DsmccMessageHeader {
    pub protocol_discriminator: u8,
    pub dsmcc_type: u8,
    pub message_id: u16,
    /// A transaction id for DSI/DII, a download id for DDB (§3).
    pub transaction_or_download_id: u32,
}

impl Default for DsmccMessageHeader {
    fn default() -> Self {
        DsmccMessageHeader {
            protocol_discriminator: DSMCC_PROTOCOL_DISCRIMINATOR,
            dsmcc_type: DSMCC_TYPE_DOWNLOAD_MESSAGE,
            message_id: 0,
            transaction_or_download_id: 0,
        }
    }
}

impl DsmccMessageHeader {
    pub fn is_valid(&self) -> bool {
        self.protocol_discriminator == DSMCC_PROTOCOL_DISCRIMINATOR
            && self.dsmcc_type == DSMCC_TYPE_DOWNLOAD_MESSAGE
    }

    pub fn deserialize(buf: &mut PsiBufferRead<'_>) -> DsmccMessageHeader {
        let header = DsmccMessageHeader {
            protocol_discriminator: buf.get_u8(),
            dsmcc_type: buf.get_u8(),
            message_id: buf.get_u16(),
            transaction_or_download_id: buf.get_u32(),
        };
        if !header.is_valid() {
            buf.set_user_error();
        }
        header
    }

    pub fn serialize(&self, buf: &mut PsiBufferWrite) {
        buf.put_u8(self.protocol_discriminator);
        buf.put_u8(self.dsmcc_type);
        buf.put_u16(self.message_id);
        buf.put_u32(self.transaction_or_download_id);
    }

    /// The low 16 bits of the transaction/download id, used as
    /// `table_id_extension` for DSI/DII (module id carries it for DDB
    /// instead — see `DownloadDataMessage::table_id_extension`).
    pub fn table_id_extension(&self) -> u16 {
        (self.transaction_or_download_id & 0xFFFF) as u16
    }
}

/// Skips the one-byte reserved field, the adaptation-header length and
/// (if non-zero) its bytes, and the two-byte `message_length` field that
/// follow the 12-byte header in every DSM-CC message (§4.4). Adaptation
/// headers are never used for object carousels; a non-zero length is a
/// user error.
pub fn skip_adaptation_and_message_length(buf: &mut PsiBufferRead<'_>) {
    buf.skip_bytes(1); // reserved
    let adaptation_length = buf.get_u8();
    buf.skip_bytes(2); // message_length
    if adaptation_length > 0 {
        buf.set_user_error();
        buf.skip_bytes(adaptation_length as usize);
    }
}

pub fn put_reserved_and_adaptation(buf: &mut PsiBufferWrite) {
    buf.put_u8(0xFF); // reserved
    buf.put_u8(0x00); // adaptation_length
}
