//! Stack descriptors

/// Where one stack's pixel payload lives in the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackDescriptor {
    /// Absolute position of the first payload byte
    pub position: u64,
    /// Payload length in bytes as declared on disk
    pub length: u64,
    /// Payload is one zlib stream
    pub compressed: bool,
}

impl StackDescriptor {
    pub fn new(position: u64, length: u64, compressed: bool) -> Self {
        StackDescriptor {
            position,
            length,
            compressed,
        }
    }

    /// Position just past the payload
    pub fn end(&self) -> u64 {
        self.position + self.length
    }
}
