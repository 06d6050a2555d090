//! Ordered, typed binary stream codec
//!
//! Values are read back in exactly the order they were written. There is no
//! framing, random access or schema version: reader and writer must agree on
//! the field sequence.

use std::io::{Read, Write};

use thiserror::Error;

use crate::foundation::math::{quat_from_components, Quat, Vec3, Vec4};

/// Upper bound on a single encoded string, guards against corrupt length prefixes
pub const MAX_STRING_LEN: u32 = 16 * 1024 * 1024;

/// Stream codec errors
#[derive(Error, Debug)]
pub enum StreamError {
    /// Underlying reader/writer failed (includes unexpected end of stream)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A string payload was not valid UTF-8
    #[error("Invalid UTF-8 in string: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// A bool byte was neither 0 nor 1
    #[error("Invalid bool byte: {0}")]
    InvalidBool(u8),

    /// A string length prefix exceeded [`MAX_STRING_LEN`]
    #[error("String length {0} exceeds the maximum string length")]
    StringTooLong(u32),

    /// A count field was negative or does not fit the wire type
    #[error("Invalid element count: {0}")]
    InvalidCount(i64),

    /// An enum discriminant named no known variant
    #[error("Invalid {kind} value: {value}")]
    InvalidDiscriminant {
        /// Name of the enum being decoded
        kind: &'static str,
        /// Raw value read from the stream
        value: u32,
    },
}

/// Write half of the stream codec contract
pub trait StreamWriter {
    /// Write a boolean
    fn write_bool(&mut self, value: bool) -> Result<(), StreamError>;

    /// Write a signed 32-bit integer
    fn write_i32(&mut self, value: i32) -> Result<(), StreamError>;

    /// Write an unsigned 32-bit integer
    fn write_u32(&mut self, value: u32) -> Result<(), StreamError>;

    /// Write a 32-bit float
    fn write_f32(&mut self, value: f32) -> Result<(), StreamError>;

    /// Write a length-prefixed UTF-8 string
    fn write_str(&mut self, value: &str) -> Result<(), StreamError>;

    /// Write a collection size as an `i32` count
    fn write_count(&mut self, count: usize) -> Result<(), StreamError> {
        let count = i32::try_from(count)
            .map_err(|_| StreamError::InvalidCount(i64::try_from(count).unwrap_or(i64::MAX)))?;
        self.write_i32(count)
    }

    /// Write a 3D vector as `x, y, z`
    fn write_vec3(&mut self, value: &Vec3) -> Result<(), StreamError> {
        self.write_f32(value.x)?;
        self.write_f32(value.y)?;
        self.write_f32(value.z)
    }

    /// Write a 4D vector as `x, y, z, w`
    fn write_vec4(&mut self, value: &Vec4) -> Result<(), StreamError> {
        self.write_f32(value.x)?;
        self.write_f32(value.y)?;
        self.write_f32(value.z)?;
        self.write_f32(value.w)
    }

    /// Write a rotation as `x, y, z, w`
    fn write_quat(&mut self, value: &Quat) -> Result<(), StreamError> {
        self.write_f32(value.i)?;
        self.write_f32(value.j)?;
        self.write_f32(value.k)?;
        self.write_f32(value.w)
    }
}

/// Read half of the stream codec contract
pub trait StreamReader {
    /// Read a boolean
    fn read_bool(&mut self) -> Result<bool, StreamError>;

    /// Read a signed 32-bit integer
    fn read_i32(&mut self) -> Result<i32, StreamError>;

    /// Read an unsigned 32-bit integer
    fn read_u32(&mut self) -> Result<u32, StreamError>;

    /// Read a 32-bit float
    fn read_f32(&mut self) -> Result<f32, StreamError>;

    /// Read a length-prefixed UTF-8 string
    fn read_string(&mut self) -> Result<String, StreamError>;

    /// Read an `i32` count, rejecting negative values
    fn read_count(&mut self) -> Result<usize, StreamError> {
        let count = self.read_i32()?;
        usize::try_from(count).map_err(|_| StreamError::InvalidCount(i64::from(count)))
    }

    /// Read a 3D vector
    fn read_vec3(&mut self) -> Result<Vec3, StreamError> {
        Ok(Vec3::new(self.read_f32()?, self.read_f32()?, self.read_f32()?))
    }

    /// Read a 4D vector
    fn read_vec4(&mut self) -> Result<Vec4, StreamError> {
        Ok(Vec4::new(self.read_f32()?, self.read_f32()?, self.read_f32()?, self.read_f32()?))
    }

    /// Read a rotation, renormalizing if the stored value drifted
    fn read_quat(&mut self) -> Result<Quat, StreamError> {
        let x = self.read_f32()?;
        let y = self.read_f32()?;
        let z = self.read_f32()?;
        let w = self.read_f32()?;
        Ok(quat_from_components(x, y, z, w))
    }
}

/// Little-endian binary writer over any [`Write`] sink
#[derive(Debug)]
pub struct BinaryWriter<W: Write> {
    inner: W,
}

impl<W: Write> BinaryWriter<W> {
    /// Wrap a sink
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Flush buffered bytes, reporting the final I/O error if any
    pub fn finish(mut self) -> Result<W, StreamError> {
        self.inner.flush()?;
        Ok(self.inner)
    }

    /// Unwrap without flushing
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> StreamWriter for BinaryWriter<W> {
    fn write_bool(&mut self, value: bool) -> Result<(), StreamError> {
        self.inner.write_all(&[u8::from(value)])?;
        Ok(())
    }

    fn write_i32(&mut self, value: i32) -> Result<(), StreamError> {
        self.inner.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    fn write_u32(&mut self, value: u32) -> Result<(), StreamError> {
        self.inner.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    fn write_f32(&mut self, value: f32) -> Result<(), StreamError> {
        self.inner.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    fn write_str(&mut self, value: &str) -> Result<(), StreamError> {
        let len = u32::try_from(value.len())
            .ok()
            .filter(|len| *len <= MAX_STRING_LEN)
            .ok_or(StreamError::StringTooLong(u32::MAX))?;
        self.write_u32(len)?;
        self.inner.write_all(value.as_bytes())?;
        Ok(())
    }
}

/// Little-endian binary reader over any [`Read`] source
#[derive(Debug)]
pub struct BinaryReader<R: Read> {
    inner: R,
}

impl<R: Read> BinaryReader<R> {
    /// Wrap a source
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Unwrap the source
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], StreamError> {
        let mut bytes = [0u8; N];
        self.inner.read_exact(&mut bytes)?;
        Ok(bytes)
    }
}

impl<R: Read> StreamReader for BinaryReader<R> {
    fn read_bool(&mut self) -> Result<bool, StreamError> {
        match self.read_array::<1>()?[0] {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(StreamError::InvalidBool(other)),
        }
    }

    fn read_i32(&mut self) -> Result<i32, StreamError> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    fn read_u32(&mut self) -> Result<u32, StreamError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    fn read_f32(&mut self) -> Result<f32, StreamError> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    fn read_string(&mut self) -> Result<String, StreamError> {
        let len = self.read_u32()?;
        if len > MAX_STRING_LEN {
            return Err(StreamError::StringTooLong(len));
        }
        let mut bytes = vec![0u8; len as usize];
        self.inner.read_exact(&mut bytes)?;
        Ok(String::from_utf8(bytes)?)
    }
}
