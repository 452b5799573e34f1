/// This module will handle converting the types from kya-files into a intermediate representation,
/// that can then be handed to a renderer or looked up by the display list.
/// The raw records stay owned by the asset loader, importers only ever read from the memory image.
pub mod g3d_importer;
pub mod strip_importer;
