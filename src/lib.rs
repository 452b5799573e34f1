use kya_files::ParserError;
use kya_files::common::types::Ptr;
use thiserror::Error;

pub mod io;
pub mod rendering;
pub mod settings;
pub mod util;

#[derive(Error, Debug)]
pub enum MeshLibraryError {
    #[error("Failed to parse the G3D resource: {0}")]
    Parse(#[from] ParserError),

    /// The GIF tags of the strip report no vertices at all.
    #[error("Strip {handle} has no vertices")]
    EmptyStrip { handle: Ptr },

    #[error("Strip {handle} lacks its {what} array")]
    MissingAttribute { handle: Ptr, what: &'static str },

    #[error("Strip {handle} has neither been decoded with its asset nor as a display list strip")]
    StripNotFound { handle: Ptr },
}
