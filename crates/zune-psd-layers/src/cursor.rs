/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A forward reading cursor over an in-memory PSD file.
//!
//! This is a thin layer over zune-core's [`ZReader`] that adds what the
//! layer section needs: positions relative to an origin, signed seeks,
//! zero terminated strings and errors that carry the offset they failed at.
//!
//! PSD is big endian throughout, so only big endian reads are exposed.
//! A failed read consumes nothing and reports [`TruncatedInput`].
//!
//! [`TruncatedInput`]: LayerDecodeErrors::TruncatedInput
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use zune_core::bytestream::{ZCursor, ZReader};

use crate::errors::LayerDecodeErrors;

/// A positioned reader over a byte slice.
///
/// Positions are reported relative to an origin fixed at construction,
/// which lets a caller hand out a cursor over a whole file but count
/// offsets from the start of a sub block.
pub struct ByteCursor<'a> {
    stream: ZReader<ZCursor<&'a [u8]>>,
    length: usize,
    origin: usize
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor whose origin is the first byte of `data`
    pub fn new(data: &'a [u8]) -> ByteCursor<'a> {
        Self::with_origin(data, 0)
    }

    /// Create a cursor starting at `origin`, positions are relative to it.
    ///
    /// An origin past the end of `data` gives a cursor with no remaining bytes.
    pub fn with_origin(data: &'a [u8], origin: usize) -> ByteCursor<'a> {
        let origin = origin.min(data.len());
        let mut stream = ZReader::new(ZCursor::new(data));
        // in bounds, seeking a cursor there cannot fail
        let _ = stream.set_position(origin);

        ByteCursor {
            stream,
            length: data.len(),
            origin
        }
    }

    /// Absolute position inside the whole buffer
    fn absolute(&mut self) -> usize {
        self.stream
            .position()
            .ok()
            .and_then(|position| usize::try_from(position).ok())
            .map_or(self.length, |position| position.min(self.length))
    }

    /// Current position relative to the origin
    pub fn position(&mut self) -> usize {
        self.absolute() - self.origin
    }

    /// Number of bytes that can still be read
    pub fn remaining(&mut self) -> usize {
        self.length - self.absolute()
    }

    const fn truncated(&self, start: usize, requested: usize) -> LayerDecodeErrors {
        LayerDecodeErrors::TruncatedInput {
            offset: start - self.origin,
            requested,
            remaining: self.length - start
        }
    }

    /// Check that `size` bytes can be read and return where the read starts
    fn reserve(&mut self, size: usize) -> Result<usize, LayerDecodeErrors> {
        let start = self.absolute();

        if size > self.length - start {
            return Err(self.truncated(start, size));
        }
        Ok(start)
    }

    /// Put the reader back at `start` after a failed read
    fn restore(&mut self, start: usize, requested: usize) -> LayerDecodeErrors {
        let _ = self.stream.set_position(start);
        self.truncated(start, requested)
    }

    /// Read a single byte
    pub fn read_u8(&mut self) -> Result<u8, LayerDecodeErrors> {
        let start = self.reserve(1)?;

        match self.stream.read_u8_err() {
            Ok(byte) => Ok(byte),
            Err(_) => Err(self.restore(start, 1))
        }
    }

    /// Look at the next byte without consuming it
    pub fn peek_u8(&mut self) -> Result<u8, LayerDecodeErrors> {
        let start = self.reserve(1)?;

        let peeked = self
            .stream
            .peek_at(0, 1)
            .ok()
            .and_then(|bytes| bytes.first().copied());

        peeked.ok_or_else(|| self.restore(start, 1))
    }

    /// Read exactly `N` bytes into an array
    pub fn read_fixed_bytes<const N: usize>(&mut self) -> Result<[u8; N], LayerDecodeErrors> {
        let start = self.reserve(N)?;

        match self.stream.read_fixed_bytes_or_error::<N>() {
            Ok(bytes) => Ok(bytes),
            Err(_) => Err(self.restore(start, N))
        }
    }

    /// Read `size` bytes into an owned buffer
    pub fn read_bytes(&mut self, size: usize) -> Result<Vec<u8>, LayerDecodeErrors> {
        // checked before allocating, sizes come straight from the file
        let start = self.reserve(size)?;
        let mut space = vec![0; size];

        match self.stream.read_exact_bytes(&mut space) {
            Ok(()) => Ok(space),
            Err(_) => Err(self.restore(start, size))
        }
    }

    /// Read exactly `size` bytes as text.
    ///
    /// Every byte becomes one character, there is no encoding validation.
    pub fn read_fixed_string(&mut self, size: usize) -> Result<String, LayerDecodeErrors> {
        Ok(self
            .read_bytes(size)?
            .into_iter()
            .map(char::from)
            .collect())
    }

    /// Read bytes up to and including the next zero byte, returning
    /// the bytes before it as text.
    ///
    /// Despite the name this is not length prefixed, the string ends at
    /// the first zero byte.
    pub fn read_pascal_string(&mut self) -> Result<String, LayerDecodeErrors> {
        let start = self.absolute();
        let mut text = String::new();

        loop {
            match self.stream.read_u8_err() {
                Ok(0) => return Ok(text),
                Ok(byte) => text.push(char::from(byte)),
                Err(_) => {
                    let requested = self.length - start + 1;
                    return Err(self.restore(start, requested));
                }
            }
        }
    }

    /// Move `delta` bytes forward (or backwards when negative).
    ///
    /// Fails if the new position would be before the origin or past
    /// the end of the data.
    pub fn skip(&mut self, delta: i64) -> Result<(), LayerDecodeErrors> {
        let start = self.absolute();
        let current = (start - self.origin) as i64;

        let target = current
            .checked_add(delta)
            .filter(|target| *target >= 0)
            .ok_or(LayerDecodeErrors::InvalidSeek {
                offset: start - self.origin,
                delta
            })?;

        let absolute = usize::try_from(target)
            .ok()
            .and_then(|target| self.origin.checked_add(target))
            .filter(|absolute| *absolute <= self.length)
            .ok_or_else(|| self.truncated(start, delta.unsigned_abs() as usize))?;

        self.stream
            .set_position(absolute)
            .map_err(|_| self.truncated(start, delta.unsigned_abs() as usize))
    }

    /// Move to `offset` (relative to the origin)
    pub fn skip_to(&mut self, offset: usize) -> Result<(), LayerDecodeErrors> {
        let current = self.position();
        self.skip(offset as i64 - current as i64)
    }
}

macro_rules! read_be_type {
    ($name:tt, $int_type:tt) => {
        impl<'a> ByteCursor<'a> {
            #[doc = concat!("Read a big endian ", stringify!($int_type))]
            #[inline]
            pub fn $name(&mut self) -> Result<$int_type, LayerDecodeErrors> {
                const SIZE_OF_VAL: usize = core::mem::size_of::<$int_type>();

                Ok($int_type::from_be_bytes(
                    self.read_fixed_bytes::<SIZE_OF_VAL>()?
                ))
            }
        }
    };
}

// zune-core only has unsigned getters, signed fields go through the same bytes
read_be_type!(read_u16, u16);
read_be_type!(read_i16, i16);
read_be_type!(read_u32, u32);
read_be_type!(read_i32, i32);
