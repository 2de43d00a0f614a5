//! Raw record type

use std::ops::Deref;

/// One undecoded sample taken from a ring buffer
///
/// The reader copies the sample out of the shared memory region before
/// returning, so the kernel can reuse the slot as soon as `read` completes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Record(Vec<u8>);

impl Record {
    /// Length of the sample in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl Deref for Record {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Record {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Record {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_copies_sample() {
        let sample = [1u8, 2, 3];
        let record = Record::from(&sample[..]);
        assert_eq!(record.len(), 3);
        assert_eq!(&*record, &sample);
        assert_eq!(record.into_bytes(), vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_record() {
        assert!(Record::default().is_empty());
    }
}
