// Binary model layout: header parsing and little-endian field access.

use crate::ModelError;

/// Size of the model file header in bytes.
pub const HEADER_SIZE: usize = 14;

/// Parsed model file header.
///
/// The header occupies the first 14 bytes of a model file:
/// - bytes 0..2: feature vector dimensionality (u16)
/// - bytes 2..6: number of acoustic states (u32)
/// - bytes 6..10: number of Gaussian pdfs (u32)
/// - bytes 10..14: pdf slots per state (u32)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelHeader {
    pub vector_size: u16,
    pub state_count: u32,
    pub pdf_count: u32,
    pub pdfs_per_state: u32,
}

impl ModelHeader {
    /// Append the header to `buf`.
    pub fn write(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.vector_size.to_le_bytes());
        buf.extend_from_slice(&self.state_count.to_le_bytes());
        buf.extend_from_slice(&self.pdf_count.to_le_bytes());
        buf.extend_from_slice(&self.pdfs_per_state.to_le_bytes());
    }
}

/// Parses the 14-byte model header.
///
/// The file carries no magic number and no byte-order mark; models are
/// always stored little-endian.
pub fn parse_header(data: &[u8]) -> Result<ModelHeader, ModelError> {
    let mut reader = Reader::new(data);
    Ok(ModelHeader {
        vector_size: reader.read_u16()?,
        state_count: reader.read_u32()?,
        pdf_count: reader.read_u32()?,
        pdfs_per_state: reader.read_u32()?,
    })
}

/// Bounds-checked little-endian cursor over the raw file bytes.
///
/// The layout is packed, so fields are decoded from byte slices rather than
/// cast in place.
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current byte offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Borrow the next `len` bytes and advance past them.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8], ModelError> {
        let end = self.pos.checked_add(len).ok_or(ModelError::TooShort {
            expected: usize::MAX,
            actual: self.data.len(),
        })?;
        if end > self.data.len() {
            return Err(ModelError::TooShort {
                expected: end,
                actual: self.data.len(),
            });
        }
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    /// Borrow `count` records of `width` bytes each, checking the total
    /// length before anything is allocated.
    pub fn take_records(&mut self, count: usize, width: usize) -> Result<&'a [u8], ModelError> {
        let len = count.checked_mul(width).ok_or(ModelError::TooShort {
            expected: usize::MAX,
            actual: self.data.len(),
        })?;
        self.take(len)
    }

    pub fn skip(&mut self, len: usize) -> Result<(), ModelError> {
        self.take(len).map(|_| ())
    }

    pub fn read_u16(&mut self) -> Result<u16, ModelError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32, ModelError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read_f32(&mut self) -> Result<f32, ModelError> {
        let b = self.take(4)?;
        Ok(f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read `count` consecutive f32 values.
    pub fn read_f32s(&mut self, count: usize) -> Result<Vec<f32>, ModelError> {
        let bytes = self.take_records(count, 4)?;
        Ok(bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_header(vector_size: u16, states: u32, pdfs: u32, per_state: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        ModelHeader {
            vector_size,
            state_count: states,
            pdf_count: pdfs,
            pdfs_per_state: per_state,
        }
        .write(&mut buf);
        buf
    }

    #[test]
    fn parse_packed_header() {
        let data = make_header(39, 120, 960, 8);
        assert_eq!(data.len(), HEADER_SIZE);
        let header = parse_header(&data).unwrap();
        assert_eq!(header.vector_size, 39);
        assert_eq!(header.state_count, 120);
        assert_eq!(header.pdf_count, 960);
        assert_eq!(header.pdfs_per_state, 8);
    }

    #[test]
    fn vector_size_is_two_bytes() {
        // u16 vector size immediately followed by the state count, no padding
        let data = [0x0D, 0x00, 0x05, 0x00, 0x00, 0x00, 0, 0, 0, 0, 0, 0, 0, 0];
        let header = parse_header(&data).unwrap();
        assert_eq!(header.vector_size, 13);
        assert_eq!(header.state_count, 5);
    }

    #[test]
    fn reject_too_short() {
        let data = [0u8; 8];
        let err = parse_header(&data).unwrap_err();
        assert!(matches!(
            err,
            ModelError::TooShort {
                expected: 10,
                actual: 8
            }
        ));
    }

    #[test]
    fn header_with_trailing_data() {
        let mut data = make_header(13, 1, 1, 1);
        data.extend_from_slice(&[0u8; 100]);
        let header = parse_header(&data).unwrap();
        assert_eq!(header.vector_size, 13);
    }

    #[test]
    fn reader_tracks_position() {
        let data = [1, 0, 2, 0, 0, 0, 0, 0, 0x80, 0x3F];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.read_u16().unwrap(), 1);
        assert_eq!(reader.read_u32().unwrap(), 2);
        assert_eq!(reader.position(), 6);
        assert_eq!(reader.read_f32().unwrap(), 1.0);
        assert!(reader.read_u16().is_err());
    }

    #[test]
    fn huge_record_count_fails_before_allocating() {
        let data = [0u8; 16];
        let mut reader = Reader::new(&data);
        let err = reader.take_records(usize::MAX / 2, 4).unwrap_err();
        assert!(matches!(err, ModelError::TooShort { .. }));
    }
}
