use std::io;

use crate::stream::ByteStream;

/// Every record starts with these two bytes, followed by a 2-byte type code.
pub const PK_SIGNATURE: &[u8] = b"PK";

/// File names longer than this mean the header is corrupt.
pub const MAX_NAME_LENGTH: u16 = 10_000;

/// Comments at or above this length are skipped, not reported.
pub const MAX_COMMENT_LENGTH: u16 = 4096;

/// A stored `mimetype` member smaller than this is read as the MIME string.
pub const MAX_MIMETYPE_SIZE: u32 = 256;

/// Member carrying the MIME type of ODF and EPUB containers.
pub const MIMETYPE_MEMBER: &str = "mimetype";

/// Record types, keyed by the little-endian code after `PK`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    LocalFileHeader,
    DataDescriptor,
    ArchiveExtraData,
    CentralDirectoryHeader,
    DigitalSignature,
    Zip64EndOfCentralDirectory,
    Zip64EndOfCentralDirectoryLocator,
    EndOfCentralDirectory,
    Unknown(u16),
}

impl RecordType {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0x0403 => RecordType::LocalFileHeader,
            0x0807 => RecordType::DataDescriptor,
            0x0806 => RecordType::ArchiveExtraData,
            0x0201 => RecordType::CentralDirectoryHeader,
            0x0505 => RecordType::DigitalSignature,
            0x0606 => RecordType::Zip64EndOfCentralDirectory,
            0x0706 => RecordType::Zip64EndOfCentralDirectoryLocator,
            0x0605 => RecordType::EndOfCentralDirectory,
            _ => RecordType::Unknown(value),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            RecordType::LocalFileHeader => 0x0403,
            RecordType::DataDescriptor => 0x0807,
            RecordType::ArchiveExtraData => 0x0806,
            RecordType::CentralDirectoryHeader => 0x0201,
            RecordType::DigitalSignature => 0x0505,
            RecordType::Zip64EndOfCentralDirectory => 0x0606,
            RecordType::Zip64EndOfCentralDirectoryLocator => 0x0706,
            RecordType::EndOfCentralDirectory => 0x0605,
            RecordType::Unknown(v) => *v,
        }
    }

    /// Report label: the type code as four hex digits.
    pub fn label(&self) -> String {
        format!("0x{:04x}", self.as_u16())
    }

    pub fn name(&self) -> &'static str {
        match self {
            RecordType::LocalFileHeader => "Local file header",
            RecordType::DataDescriptor => "Data descriptor",
            RecordType::ArchiveExtraData => "Archive extra data",
            RecordType::CentralDirectoryHeader => "Central directory file header",
            RecordType::DigitalSignature => "Digital signature",
            RecordType::Zip64EndOfCentralDirectory => "Zip64 end of central directory record",
            RecordType::Zip64EndOfCentralDirectoryLocator => {
                "Zip64 end of central directory locator"
            }
            RecordType::EndOfCentralDirectory => "End of central directory record",
            RecordType::Unknown(_) => "Unknown",
        }
    }
}

/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Shrunk,
    Imploded,
    Deflate,
    Deflate64,
    Bzip2,
    Lzma,
    Zstd,
    Xz,
    Unknown(u16),
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            1 => CompressionMethod::Shrunk,
            6 => CompressionMethod::Imploded,
            8 => CompressionMethod::Deflate,
            9 => CompressionMethod::Deflate64,
            12 => CompressionMethod::Bzip2,
            14 => CompressionMethod::Lzma,
            93 => CompressionMethod::Zstd,
            95 => CompressionMethod::Xz,
            _ => CompressionMethod::Unknown(value),
        }
    }

    pub fn name(&self) -> String {
        match self {
            CompressionMethod::Stored => "Stored".into(),
            CompressionMethod::Shrunk => "Shrunk".into(),
            CompressionMethod::Imploded => "Imploded".into(),
            CompressionMethod::Deflate => "Deflate".into(),
            CompressionMethod::Deflate64 => "Deflate64".into(),
            CompressionMethod::Bzip2 => "BZIP2".into(),
            CompressionMethod::Lzma => "LZMA".into(),
            CompressionMethod::Zstd => "Zstandard".into(),
            CompressionMethod::Xz => "XZ".into(),
            CompressionMethod::Unknown(v) => format!("Unknown ({})", v),
        }
    }
}

/// General purpose bit flag: sizes and CRC follow the data in a descriptor
pub const FLAG_DATA_DESCRIPTOR: u16 = 0x0008;

/// General purpose bit flag: name and comment are UTF-8
pub const FLAG_UTF8: u16 = 0x0800;

/// Fields shared by local and central file headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileInfo {
    pub flags: u16,
    pub compression_method: CompressionMethod,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub file_name_length: u16,
    pub extra_field_length: u16,
}

impl FileInfo {
    fn read(stream: &mut ByteStream<'_>) -> io::Result<Self> {
        Ok(Self {
            flags: stream.read_u16_le()?,
            compression_method: CompressionMethod::from_u16(stream.read_u16_le()?),
            last_mod_time: stream.read_u16_le()?,
            last_mod_date: stream.read_u16_le()?,
            crc32: stream.read_u32_le()?,
            compressed_size: stream.read_u32_le()?,
            uncompressed_size: stream.read_u32_le()?,
            file_name_length: stream.read_u16_le()?,
            extra_field_length: stream.read_u16_le()?,
        })
    }

    pub fn has_data_descriptor(&self) -> bool {
        self.flags & FLAG_DATA_DESCRIPTOR != 0
    }

    pub fn is_utf8(&self) -> bool {
        self.flags & FLAG_UTF8 != 0
    }

    /// Parse modification date to (year, month, day)
    pub fn mod_date(&self) -> (u16, u8, u8) {
        let day = (self.last_mod_date & 0x1F) as u8;
        let month = ((self.last_mod_date >> 5) & 0x0F) as u8;
        let year = ((self.last_mod_date >> 9) & 0x7F) + 1980;
        (year, month, day)
    }

    /// Parse modification time to (hour, minute, second)
    pub fn mod_time(&self) -> (u8, u8, u8) {
        let second = ((self.last_mod_time & 0x1F) * 2) as u8;
        let minute = ((self.last_mod_time >> 5) & 0x3F) as u8;
        let hour = ((self.last_mod_time >> 11) & 0x1F) as u8;
        (hour, minute, second)
    }

    pub fn modified(&self) -> String {
        let (year, month, day) = self.mod_date();
        let (hour, minute, second) = self.mod_time();
        format!(
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            year, month, day, hour, minute, second
        )
    }

    /// Read the file name that follows the fixed part of the header.
    pub fn read_name(&self, stream: &mut ByteStream<'_>) -> io::Result<String> {
        let length = self.file_name_length as u64;
        if self.is_utf8() {
            stream.read_utf8(length)
        } else {
            stream.read_latin1(length)
        }
    }
}

/// Local File Header (LFH) - 26 bytes after the record type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalFileHeader {
    pub version_needed: u16,
    pub info: FileInfo,
}

impl LocalFileHeader {
    pub fn read(stream: &mut ByteStream<'_>) -> io::Result<Self> {
        Ok(Self {
            version_needed: stream.read_u16_le()?,
            info: FileInfo::read(stream)?,
        })
    }
}

/// Central Directory File Header (CDFH) - 42 bytes after the record type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CentralDirectoryHeader {
    pub version_made_by: u16,
    pub version_needed: u16,
    pub info: FileInfo,
    pub file_comment_length: u16,
    pub disk_number_start: u16,
    pub internal_attrs: u16,
    pub external_attrs: u32,
    pub lfh_offset: u32,
}

impl CentralDirectoryHeader {
    pub fn read(stream: &mut ByteStream<'_>) -> io::Result<Self> {
        Ok(Self {
            version_made_by: stream.read_u16_le()?,
            version_needed: stream.read_u16_le()?,
            info: FileInfo::read(stream)?,
            file_comment_length: stream.read_u16_le()?,
            disk_number_start: stream.read_u16_le()?,
            internal_attrs: stream.read_u16_le()?,
            external_attrs: stream.read_u32_le()?,
            lfh_offset: stream.read_u32_le()?,
        })
    }
}

/// Data descriptor - 12 bytes after the record type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataDescriptor {
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
}

impl DataDescriptor {
    pub fn read(stream: &mut ByteStream<'_>) -> io::Result<Self> {
        Ok(Self {
            crc32: stream.read_u32_le()?,
            compressed_size: stream.read_u32_le()?,
            uncompressed_size: stream.read_u32_le()?,
        })
    }
}

/// End of Central Directory (EOCD) - 18 bytes after the record type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndOfCentralDirectory {
    pub disk_number: u16,
    pub disk_with_cd: u16,
    pub disk_entries: u16,
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
    pub comment_len: u16,
}

impl EndOfCentralDirectory {
    pub fn read(stream: &mut ByteStream<'_>) -> io::Result<Self> {
        Ok(Self {
            disk_number: stream.read_u16_le()?,
            disk_with_cd: stream.read_u16_le()?,
            disk_entries: stream.read_u16_le()?,
            total_entries: stream.read_u16_le()?,
            cd_size: stream.read_u32_le()?,
            cd_offset: stream.read_u32_le()?,
            comment_len: stream.read_u16_le()?,
        })
    }

    pub fn is_zip64(&self) -> bool {
        self.disk_entries == 0xFFFF
            || self.total_entries == 0xFFFF
            || self.cd_size == 0xFFFFFFFF
            || self.cd_offset == 0xFFFFFFFF
    }
}

/// ZIP64 End of Central Directory Locator - 16 bytes after the record type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zip64EOCDLocator {
    pub disk_with_eocd64: u32,
    pub eocd64_offset: u64,
    pub total_disks: u32,
}

impl Zip64EOCDLocator {
    pub fn read(stream: &mut ByteStream<'_>) -> io::Result<Self> {
        Ok(Self {
            disk_with_eocd64: stream.read_u32_le()?,
            eocd64_offset: stream.read_u64_le()?,
            total_disks: stream.read_u32_le()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_codes_round_trip() {
        for code in [0x0403, 0x0807, 0x0806, 0x0201, 0x0505, 0x0606, 0x0706, 0x0605] {
            let record = RecordType::from_u16(code);
            assert_ne!(record.name(), "Unknown");
            assert_eq!(record.as_u16(), code);
        }
        assert_eq!(RecordType::from_u16(0x9999), RecordType::Unknown(0x9999));
    }

    #[test]
    fn labels_use_four_hex_digits() {
        assert_eq!(RecordType::LocalFileHeader.label(), "0x0403");
        assert_eq!(RecordType::Unknown(0x9999).label(), "0x9999");
        assert_eq!(RecordType::Unknown(0x12).label(), "0x0012");
    }

    #[test]
    fn dos_timestamp() {
        let data = [
            0x00, 0x00, // flags
            0x08, 0x00, // deflate
            0x6B, 0x7A, // 15:19:22
            0x4B, 0x58, // 2024-02-11
            0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        ];
        let info = FileInfo::read(&mut ByteStream::new(&data)).unwrap();
        assert_eq!(info.compression_method, CompressionMethod::Deflate);
        assert_eq!(info.modified(), "2024-02-11 15:19:22");
    }

    #[test]
    fn names_follow_utf8_flag() {
        let name = "caf\u{e9}".as_bytes();
        let mut info = FileInfo {
            flags: FLAG_UTF8,
            compression_method: CompressionMethod::Stored,
            last_mod_time: 0,
            last_mod_date: 0,
            crc32: 0,
            compressed_size: 0,
            uncompressed_size: 0,
            file_name_length: name.len() as u16,
            extra_field_length: 0,
        };
        assert_eq!(info.read_name(&mut ByteStream::new(name)).unwrap(), "caf\u{e9}");

        info.flags = 0;
        assert_eq!(
            info.read_name(&mut ByteStream::new(name)).unwrap(),
            "caf\u{c3}\u{a9}"
        );
    }
}
