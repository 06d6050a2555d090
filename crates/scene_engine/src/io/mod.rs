//! Stream I/O
//!
//! The ordered, typed read/write channel used by entity serialization, plus
//! file-backed handles for prefab and scene files.

pub mod stream;
pub mod file;

pub use stream::{BinaryReader, BinaryWriter, StreamError, StreamReader, StreamWriter};
pub use file::{FileReader, FileStream, FileWriter};
