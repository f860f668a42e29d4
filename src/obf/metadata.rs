//! Parsed OBF dataset description

use crate::format::parser::FormatMetadata;
use crate::metadata::Metadata;
use crate::obf::stack::StackDescriptor;

/// Everything the OBF parser learns about a file
///
/// `core.images[i]` describes the stack at `stacks[i]`.
#[derive(Debug, Clone, Default)]
pub struct ObfMetadata {
    pub core: Metadata,
    pub file_version: i32,
    pub stacks: Vec<StackDescriptor>,
}

impl ObfMetadata {
    /// Descriptor of the stack backing an image
    pub fn stack(&self, image_index: usize) -> Option<&StackDescriptor> {
        self.stacks.get(image_index)
    }
}

impl FormatMetadata for ObfMetadata {
    fn metadata(&self) -> &Metadata {
        &self.core
    }

    fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.core
    }
}
