use crc32fast::Hasher as Crc32Hasher;
use std::io::{Read, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryHeader {
    pub magic: [u8; 8],
    pub version: u16,
    pub flags: u16,
    pub reserved: u32,
    pub header_crc32: u32,
}

impl BinaryHeader {
    pub const LEN_WITHOUT_CRC: usize = 8 + 2 + 2 + 4;
    pub const TOTAL_LEN: usize = Self::LEN_WITHOUT_CRC + 4;

    pub fn new(magic: [u8; 8], version: u16, flags: u16) -> Self {
        let mut header = Self {
            magic,
            version,
            flags,
            reserved: 0,
            header_crc32: 0,
        };
        header.header_crc32 = header.compute_crc32();
        header
    }

    fn compute_crc32(&self) -> u32 {
        let mut hasher = Crc32Hasher::new();
        hasher.update(&self.magic);
        hasher.update(&self.version.to_le_bytes());
        hasher.update(&self.flags.to_le_bytes());
        hasher.update(&self.reserved.to_le_bytes());
        hasher.finalize()
    }

    pub fn write_to<W: Write>(&self, mut w: W) -> std::io::Result<()> {
        w.write_all(&self.magic)?;
        w.write_all(&self.version.to_le_bytes())?;
        w.write_all(&self.flags.to_le_bytes())?;
        w.write_all(&self.reserved.to_le_bytes())?;
        w.write_all(&self.header_crc32.to_le_bytes())?;
        Ok(())
    }

    pub fn read_from<R: Read>(mut r: R) -> std::io::Result<Self> {
        let mut magic = [0u8; 8];
        r.read_exact(&mut magic)?;

        let mut v = [0u8; 2];
        r.read_exact(&mut v)?;
        let version = u16::from_le_bytes(v);

        let mut f = [0u8; 2];
        r.read_exact(&mut f)?;
        let flags = u16::from_le_bytes(f);

        let mut res = [0u8; 4];
        r.read_exact(&mut res)?;
        let reserved = u32::from_le_bytes(res);

        let mut c = [0u8; 4];
        r.read_exact(&mut c)?;
        let header_crc32 = u32::from_le_bytes(c);

        let hdr = Self {
            magic,
            version,
            flags,
            reserved,
            header_crc32,
        };
        let expected = hdr.compute_crc32();
        if expected != header_crc32 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "header CRC mismatch",
            ));
        }
        Ok(hdr)
    }
}

pub enum FileKind {
    DeletionMap,
}

impl FileKind {
    pub const fn magic(&self) -> [u8; 8] {
        match self {
            FileKind::DeletionMap => *b"SMDELMAP",
        }
    }
}

/// Prefixes `payload` with a header for `kind`.
pub fn encode_with_header(kind: FileKind, payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(BinaryHeader::TOTAL_LEN + payload.len());
    let header = BinaryHeader::new(kind.magic(), 1, 0);
    // Writing into a Vec cannot fail.
    let _ = header.write_to(&mut buf);
    buf.extend_from_slice(payload);
    buf
}

/// Validates the header of `bytes` against `kind` and returns the payload slice.
pub fn strip_header(kind: FileKind, bytes: &[u8]) -> std::io::Result<&[u8]> {
    if bytes.len() < BinaryHeader::TOTAL_LEN {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "file too small for header",
        ));
    }
    let header = BinaryHeader::read_from(&bytes[..BinaryHeader::TOTAL_LEN])?;
    if header.magic != kind.magic() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "invalid magic",
        ));
    }
    Ok(&bytes[BinaryHeader::TOTAL_LEN..])
}
