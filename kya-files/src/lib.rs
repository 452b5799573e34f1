use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParserError {
    #[error("Expected a chunk with hash {expected:#010x}, but found {magic:#010x}")]
    InvalidMagicValue { expected: u32, magic: u32 },

    #[error("The asset is violating the expected format, because: {reason}")]
    FormatError { reason: &'static str },

    #[error("Reading at {address:#x} exceeds the memory image of {size} bytes")]
    OutOfBounds { address: u32, size: usize },

    #[error("Encountered a null reference to the {what}")]
    NullReference { what: &'static str },

    /// The VIF list of a strip did not contain the GIF tag copy command at the expected packet,
    /// neither after skipping `segment` end markers nor at the start of the list.
    #[error("No GIF tag copy command found for segment {segment}")]
    MissingGifTag { segment: usize },

    #[error("The chunk variant {magic:#010x} is not supported")]
    UnsupportedVariant { magic: u32 },

    /// Represents all other cases of `std::io::Error`.
    #[error(transparent)]
    IOError(#[from] std::io::Error),
}

pub mod common;
pub mod g3d;
pub mod gif;
pub mod strip;
