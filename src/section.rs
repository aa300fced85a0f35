//! Section framing and multi-section table assembly (spec §3, §4.2).

use crate::dsmcc::ddb::TID_DSMCC_DDM;
use crate::dsmcc::user_to_network::TID_DSMCC_UNM;
use crc::{Crc, CRC_32_MPEG_2};

/// MPEG-2 CRC32, used to validate every long section's trailing checksum.
pub const CRC32_MPEG2: Crc<u32> = Crc::<u32>::new(&CRC_32_MPEG_2);

/// Maximum total section length for short sections and MPEG-private
/// sections (§6, §9).
pub const MAX_PRIVATE_SHORT_SECTION_SIZE: usize = 1024;

/// Maximum total section length used by DSM-CC sections, despite being
/// marked non-private in the MPEG sense (§9, ETSI TS 102 809 Table B.2).
pub const MAX_DSMCC_SECTION_SIZE: usize = 4096;

/// `MAX_DSMCC_SECTION_SIZE` minus the 12-byte common+syntax header overhead.
pub const MAX_DSMCC_SECTION_PAYLOAD: usize = 4084;

/// The 3-byte common section header shared by every PSI/SI section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionCommonHeader {
    pub table_id: u8,
    pub section_syntax_indicator: bool,
    pub private_indicator: bool,
    /// Length of everything following this field, i.e. payload + CRC for
    /// long sections.
    pub section_length: u16,
}

impl SectionCommonHeader {
    pub const SIZE: usize = 3;

    pub fn parse(data: &[u8]) -> Option<SectionCommonHeader> {
        if data.len() < Self::SIZE {
            return None;
        }
        let table_id = data[0];
        let section_syntax_indicator = data[1] & 0x80 != 0;
        let private_indicator = data[1] & 0x40 != 0;
        let section_length = (u16::from(data[1] & 0x0F) << 8) | u16::from(data[2]);
        Some(SectionCommonHeader {
            table_id,
            section_syntax_indicator,
            private_indicator,
            section_length,
        })
    }

    /// Invariant from §3: the syntax-indicator bit equals the complement of
    /// the private-indicator bit.
    pub fn is_consistent(&self) -> bool {
        self.section_syntax_indicator != self.private_indicator
    }
}

/// The 5-byte table-syntax header present in every long section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSyntaxHeader {
    pub table_id_extension: u16,
    pub version: u8,
    pub current_next_indicator: bool,
    pub section_number: u8,
    pub last_section_number: u8,
}

impl TableSyntaxHeader {
    pub const SIZE: usize = 5;

    pub fn parse(data: &[u8]) -> Option<TableSyntaxHeader> {
        if data.len() < Self::SIZE {
            return None;
        }
        let table_id_extension = (u16::from(data[0]) << 8) | u16::from(data[1]);
        let version = (data[2] >> 1) & 0x1F;
        let current_next_indicator = data[2] & 0x01 != 0;
        let section_number = data[3];
        let last_section_number = data[4];
        Some(TableSyntaxHeader {
            table_id_extension,
            version,
            current_next_indicator,
            section_number,
            last_section_number,
        })
    }
}

/// A single immutable framed section, carrying its CRC validity for long
/// sections (§3).
#[derive(Debug, Clone)]
pub struct Section {
    pub common: SectionCommonHeader,
    pub syntax: Option<TableSyntaxHeader>,
    /// Payload bytes between the header(s) and the trailing CRC (if any).
    pub payload: Vec<u8>,
    pub source_pid: u16,
    /// `true` if this is a long section and its CRC32 validated.
    pub crc_valid: bool,
}

impl Section {
    /// Parses one section from a byte slice starting at the table id byte.
    /// Returns `None` if the slice is too short to contain a header; a
    /// malformed CRC is reported via `crc_valid = false` rather than
    /// failing the whole parse, per §4.2's "malformed section is
    /// discarded" policy living one layer up, in table assembly.
    pub fn parse(data: &[u8], source_pid: u16) -> Option<Section> {
        let common = SectionCommonHeader::parse(data)?;
        // §3/§7: DSM-CC sections always carry syntax=1, private=0; reject
        // anything else rather than trust a section with corrupted header
        // bits. Not enforced for DVB SI table ids in general: e.g. SDT sets
        // the bit after the syntax indicator to reserved-1, which this
        // invariant would wrongly reject.
        if matches!(common.table_id, TID_DSMCC_UNM | TID_DSMCC_DDM) && !common.is_consistent() {
            return None;
        }
        let total_len = SectionCommonHeader::SIZE + common.section_length as usize;
        if data.len() < total_len {
            return None;
        }
        let body = &data[SectionCommonHeader::SIZE..total_len];

        if !common.section_syntax_indicator {
            // Short section: no table-id-extension, no CRC.
            return Some(Section {
                common,
                syntax: None,
                payload: body.to_vec(),
                source_pid,
                crc_valid: true,
            });
        }

        if body.len() < TableSyntaxHeader::SIZE + 4 {
            return None;
        }
        let syntax = TableSyntaxHeader::parse(body)?;
        if syntax.section_number > syntax.last_section_number {
            return None;
        }
        let payload_start = TableSyntaxHeader::SIZE;
        let payload_end = body.len() - 4;
        let payload = body[payload_start..payload_end].to_vec();

        let crc_bytes = &body[payload_end..];
        let stored_crc = u32::from_be_bytes([crc_bytes[0], crc_bytes[1], crc_bytes[2], crc_bytes[3]]);
        let crc_input = &data[..SectionCommonHeader::SIZE + payload_end];
        let computed_crc = CRC32_MPEG2.checksum(crc_input);

        Some(Section {
            common,
            syntax: Some(syntax),
            payload,
            source_pid,
            crc_valid: computed_crc == stored_crc,
        })
    }

    pub fn table_id(&self) -> u8 {
        self.common.table_id
    }

    pub fn table_id_extension(&self) -> u16 {
        self.syntax.map(|s| s.table_id_extension).unwrap_or(0)
    }

    pub fn section_number(&self) -> u8 {
        self.syntax.map(|s| s.section_number).unwrap_or(0)
    }

    pub fn last_section_number(&self) -> u8 {
        self.syntax.map(|s| s.last_section_number).unwrap_or(0)
    }

    pub fn version(&self) -> u8 {
        self.syntax.map(|s| s.version).unwrap_or(0)
    }

    pub fn is_long(&self) -> bool {
        self.syntax.is_some()
    }
}

/// Why a candidate section was rejected by [`BinaryTable::push_section`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableError {
    InvalidCrc,
    VersionMismatch,
    SectionNumberOutOfRange,
    DuplicateSectionNumber,
}

impl std::fmt::Display for TableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            TableError::InvalidCrc => "invalid section CRC32",
            TableError::VersionMismatch => "section version does not match table in progress",
            TableError::SectionNumberOutOfRange => "section number exceeds last_section_number",
            TableError::DuplicateSectionNumber => "duplicate section number",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for TableError {}

/// An ordered collection of sections sharing table id + table-id-extension
/// and forming one logical table (§3, §4.2).
#[derive(Debug, Clone)]
pub struct BinaryTable {
    pub table_id: u8,
    pub table_id_extension: u16,
    pub version: u8,
    pub current_next_indicator: bool,
    last_section_number: u8,
    sections: Vec<Option<Section>>,
}

impl BinaryTable {
    /// Starts a new in-progress table from its first accepted section.
    pub fn new(section: Section) -> BinaryTable {
        let last = section.last_section_number();
        let mut sections = vec![None; last as usize + 1];
        let idx = section.section_number() as usize;
        let table_id = section.table_id();
        let table_id_extension = section.table_id_extension();
        let version = section.version();
        let current_next_indicator = section.syntax.map(|s| s.current_next_indicator).unwrap_or(true);
        sections[idx] = Some(section);
        BinaryTable {
            table_id,
            table_id_extension,
            version,
            current_next_indicator,
            last_section_number: last,
            sections,
        }
    }

    /// Short sections (TDT, ST) are complete on the first section (§4.2).
    pub fn is_short(&self) -> bool {
        self.sections.len() == 1 && self.sections[0].as_ref().map(|s| !s.is_long()).unwrap_or(false)
    }

    /// Attempts to add a section to this in-progress table. A version
    /// change is handled one layer up (by [`TableAssembler`]), which starts
    /// a fresh `BinaryTable` instead of calling this with a mismatched
    /// version.
    pub fn push_section(&mut self, section: Section) -> Result<(), TableError> {
        if section.is_long() && !section.crc_valid {
            return Err(TableError::InvalidCrc);
        }
        if section.version() != self.version {
            return Err(TableError::VersionMismatch);
        }
        let idx = section.section_number() as usize;
        if idx >= self.sections.len() {
            return Err(TableError::SectionNumberOutOfRange);
        }
        if self.sections[idx].is_some() {
            // Re-delivery of the same section in a repeating carousel is
            // not an error; only a genuinely different section number slot
            // already occupied with different content would be surprising,
            // and we don't track content equality here — just accept it.
            self.sections[idx] = Some(section);
            return Ok(());
        }
        self.sections[idx] = Some(section);
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.sections.iter().all(|s| s.is_some())
    }

    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter_map(|s| s.as_ref())
    }

    pub fn last_section_number(&self) -> u8 {
        self.last_section_number
    }
}

/// Incrementally assembles [`BinaryTable`]s from a stream of [`Section`]s,
/// keyed by (table id, table-id-extension), resetting in-progress assembly
/// on a version change and discarding out-of-range/duplicate/invalid
/// sections (§4.2).
#[derive(Default)]
pub struct TableAssembler {
    in_progress: std::collections::BTreeMap<(u8, u16), BinaryTable>,
}

impl TableAssembler {
    pub fn new() -> Self {
        TableAssembler {
            in_progress: std::collections::BTreeMap::new(),
        }
    }

    /// Feeds one section in. Returns `Some(table)` the moment the table it
    /// belongs to becomes complete (short sections complete immediately).
    pub fn feed(&mut self, section: Section) -> Option<BinaryTable> {
        if section.is_long() && !section.crc_valid {
            return None;
        }
        if !section.is_long() {
            return Some(BinaryTable::new(section));
        }

        let key = (section.table_id(), section.table_id_extension());
        let version = section.version();

        let needs_reset = match self.in_progress.get(&key) {
            Some(t) => t.version != version,
            None => false,
        };
        if needs_reset {
            self.in_progress.remove(&key);
        }

        let entry = self.in_progress.entry(key);
        let table = match entry {
            std::collections::btree_map::Entry::Occupied(mut o) => {
                if o.get_mut().push_section(section).is_err() {
                    return None;
                }
                if o.get().is_complete() {
                    Some(o.remove())
                } else {
                    None
                }
            }
            std::collections::btree_map::Entry::Vacant(v) => {
                let is_complete = section.section_number() == section.last_section_number();
                let table = BinaryTable::new(section);
                if is_complete {
                    Some(table)
                } else {
                    v.insert(table);
                    None
                }
            }
        };
        table
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn long_section(
        table_id: u8,
        table_id_extension: u16,
        version: u8,
        section_number: u8,
        last_section_number: u8,
        payload: &[u8],
    ) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&table_id_extension.to_be_bytes());
        body.push((version << 1) | 0x01 | 0xC0);
        body.push(section_number);
        body.push(last_section_number);
        body.extend_from_slice(payload);

        let mut section = vec![table_id];
        let section_length = body.len() + 4;
        section.push(0x80 | ((section_length >> 8) as u8 & 0x0F));
        section.push((section_length & 0xFF) as u8);
        section.extend_from_slice(&body);

        let crc = CRC32_MPEG2.checksum(&section);
        section.extend_from_slice(&crc.to_be_bytes());
        section
    }

    /// Sets both the syntax-indicator and private-indicator bits high on an
    /// otherwise-valid long section, violating §3's "one is the complement
    /// of the other" invariant.
    fn make_syntax_private_inconsistent(mut section: Vec<u8>) -> Vec<u8> {
        let section_length = ((section[1] as u16 & 0x0F) << 8) | section[2] as u16;
        section[1] = 0xC0 | ((section_length >> 8) as u8 & 0x0F);
        let crc = CRC32_MPEG2.checksum(&section[..section.len() - 4]);
        let last = section.len() - 4;
        section[last..].copy_from_slice(&crc.to_be_bytes());
        section
    }

    #[test]
    fn dsmcc_section_with_inconsistent_syntax_bits_is_rejected() {
        let ddm = long_section(TID_DSMCC_DDM, 0x0001, 1, 0, 0, b"payload");
        let corrupted = make_syntax_private_inconsistent(ddm);
        assert!(Section::parse(&corrupted, 100).is_none());

        let unm = long_section(TID_DSMCC_UNM, 0xCAFE, 1, 0, 0, b"payload");
        let corrupted = make_syntax_private_inconsistent(unm);
        assert!(Section::parse(&corrupted, 100).is_none());
    }

    #[test]
    fn non_dsmcc_section_with_reserved_bit_high_still_parses() {
        // DVB SI tables (e.g. SDT, table id 0x42) legitimately set the bit
        // after the syntax indicator, so the same bit pattern must not be
        // rejected outside the DSM-CC table ids.
        let sdt = long_section(0x42, 0x0001, 1, 0, 0, b"payload");
        let reserved_bit_set = make_syntax_private_inconsistent(sdt);
        assert!(Section::parse(&reserved_bit_set, 100).is_some());
    }

    #[test]
    fn reassembles_regardless_of_delivery_order() {
        let s0 = long_section(0x3B, 0xCAFE, 1, 0, 1, b"AAAA");
        let s1 = long_section(0x3B, 0xCAFE, 1, 1, 1, b"BBBB");

        for (first, second) in [(s0.clone(), s1.clone()), (s1.clone(), s0.clone())] {
            let mut assembler = TableAssembler::new();
            assert!(assembler.feed(Section::parse(&first, 100).unwrap()).is_none());
            let table = assembler.feed(Section::parse(&second, 100).unwrap()).unwrap();
            assert!(table.is_complete());
            let payloads: Vec<_> = table.sections().map(|s| s.payload.clone()).collect();
            assert_eq!(payloads.len(), 2);
        }
    }

    #[test]
    fn corrupted_crc_blocks_completion_until_replayed() {
        let s0 = long_section(0x3B, 0xCAFE, 1, 0, 1, b"AAAA");
        let mut s1 = long_section(0x3B, 0xCAFE, 1, 1, 1, b"BBBB");
        let last = s1.len() - 1;
        s1[last] ^= 0xFF; // flip a CRC bit

        let mut assembler = TableAssembler::new();
        assert!(assembler.feed(Section::parse(&s0, 100).unwrap()).is_none());
        let corrupt = Section::parse(&s1, 100).unwrap();
        assert!(!corrupt.crc_valid);
        assert!(assembler.feed(corrupt).is_none());

        let good_s1 = long_section(0x3B, 0xCAFE, 1, 1, 1, b"BBBB");
        let table = assembler.feed(Section::parse(&good_s1, 100).unwrap()).unwrap();
        assert!(table.is_complete());
    }

    #[test]
    fn version_change_resets_in_progress_assembly() {
        let s0_v1 = long_section(0x3B, 0xCAFE, 1, 0, 1, b"AAAA");
        let s0_v2 = long_section(0x3B, 0xCAFE, 2, 0, 1, b"CCCC");
        let s1_v2 = long_section(0x3B, 0xCAFE, 2, 1, 1, b"DDDD");

        let mut assembler = TableAssembler::new();
        assert!(assembler.feed(Section::parse(&s0_v1, 100).unwrap()).is_none());
        assert!(assembler.feed(Section::parse(&s0_v2, 100).unwrap()).is_none());
        let table = assembler.feed(Section::parse(&s1_v2, 100).unwrap()).unwrap();
        assert_eq!(table.version, 2);
    }
}
