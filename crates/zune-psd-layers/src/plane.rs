/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Channel plane decoding
//!
//! Every channel payload starts with a two byte compression marker.
//! Raw planes follow it directly, RLE planes carry a table of
//! compressed scanline lengths (one `u16` per row) and then the
//! PackBits coded rows themselves.
use alloc::vec;
use alloc::vec::Vec;
use core::cmp::Ordering;

use crate::constants::CompressionMethod;
use crate::errors::LayerDecodeErrors;
use crate::layer::{Channel, ChannelKind};

/// A single decompressed channel, one byte per pixel, row major
pub struct DecodedPlane {
    width:  usize,
    height: usize,
    data:   Vec<u8>
}

impl DecodedPlane {
    /// Wrap an already decoded plane, `None` if `data` is not `width * height` bytes
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Option<DecodedPlane> {
        if width.checked_mul(height)? != data.len() {
            return None;
        }
        Some(DecodedPlane {
            width,
            height,
            data
        })
    }

    pub const fn width(&self) -> usize {
        self.width
    }

    pub const fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Why a plane could not be decoded, without knowing which channel it was
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum PlaneFault {
    Compression(u16),
    Scanline { row: usize, decoded: usize },
    Truncated { expected: usize, found: usize },
    Dimensions
}

impl PlaneFault {
    fn into_error(
        self, layer: usize, channel: ChannelKind, width: usize, height: usize
    ) -> LayerDecodeErrors {
        match self {
            PlaneFault::Compression(mode) => LayerDecodeErrors::UnknownCompressionMode {
                layer,
                channel,
                mode
            },
            PlaneFault::Scanline { row, decoded } => LayerDecodeErrors::CorruptScanline {
                layer,
                channel,
                row,
                decoded,
                expected: width
            },
            PlaneFault::Truncated { expected, found } => LayerDecodeErrors::TruncatedPlane {
                layer,
                channel,
                expected,
                found
            },
            PlaneFault::Dimensions => LayerDecodeErrors::OverflowingDimensions(width, height)
        }
    }
}

/// Decode the payload of `channel` into a `width` x `height` plane.
///
/// `layer` is only used to report errors.
pub fn decode_plane(
    channel: &Channel, layer: usize, width: usize, height: usize
) -> Result<DecodedPlane, LayerDecodeErrors> {
    let pixels = width
        .checked_mul(height)
        .ok_or(LayerDecodeErrors::OverflowingDimensions(width, height))?;
    let mut data = vec![0; pixels];

    decode_channel_into(channel, layer, width, height, &mut data, 1)?;

    Ok(DecodedPlane {
        width,
        height,
        data
    })
}

/// Decode the payload of `channel` so that plane byte `i` lands
/// at `out[i * stride]`.
pub(crate) fn decode_channel_into(
    channel: &Channel, layer: usize, width: usize, height: usize, out: &mut [u8],
    stride: usize
) -> Result<(), LayerDecodeErrors> {
    decode_payload_into(channel.payload(), width, height, out, stride)
        .map_err(|fault| fault.into_error(layer, channel.kind(), width, height))
}

/// Decode a channel payload (compression marker included) into `out`,
/// writing one byte every `stride` bytes.
///
/// `out` must hold `(width * height - 1) * stride + 1` bytes, anything
/// past what fits is not written.
pub(crate) fn decode_payload_into(
    payload: &[u8], width: usize, height: usize, out: &mut [u8], stride: usize
) -> Result<(), PlaneFault> {
    debug_assert!(stride > 0);

    let Some([hi, lo]) = payload.get(..2).map(|marker| [marker[0], marker[1]]) else {
        return Err(PlaneFault::Truncated {
            expected: 2,
            found:    payload.len()
        });
    };
    let mode = u16::from_be_bytes([hi, lo]);
    let compression = CompressionMethod::from_int(mode).ok_or(PlaneFault::Compression(mode))?;

    let pixels = width.checked_mul(height).ok_or(PlaneFault::Dimensions)?;
    let src = &payload[2..];

    match compression {
        CompressionMethod::NoCompression => {
            let plane = src.get(..pixels).ok_or(PlaneFault::Truncated {
                expected: pixels.saturating_add(2),
                found:    payload.len()
            })?;

            for (dst, value) in out.iter_mut().step_by(stride).zip(plane) {
                *dst = *value;
            }
            Ok(())
        }
        CompressionMethod::RLE => decode_rle(src, width, height, out, stride)
    }
}

/// Decode `height` PackBits scanlines of `width` pixels each into `out`,
/// one byte every `stride` bytes.
///
/// `src` starts with the scanline length table.
fn decode_rle(
    src: &[u8], width: usize, height: usize, out: &mut [u8], stride: usize
) -> Result<(), PlaneFault> {
    if width == 0 || height == 0 {
        return Ok(());
    }
    let table_size = height.checked_mul(2).ok_or(PlaneFault::Dimensions)?;

    if src.len() < table_size {
        return Err(PlaneFault::Truncated {
            expected: table_size.saturating_add(2),
            found:    src.len() + 2
        });
    }
    let (table, mut rows) = src.split_at(table_size);

    for (row, (length, dst)) in table
        .chunks_exact(2)
        .zip(out.chunks_mut(width.saturating_mul(stride)))
        .enumerate()
    {
        let length = usize::from(u16::from_be_bytes([length[0], length[1]]));

        if length > rows.len() {
            return Err(PlaneFault::Truncated {
                expected: src.len() - rows.len() + length + 2,
                found:    src.len() + 2
            });
        }
        let (line, rest) = rows.split_at(length);
        rows = rest;

        decode_rle_scanline(line, dst, width, stride)
            .map_err(|decoded| PlaneFault::Scanline { row, decoded })?;
    }
    Ok(())
}

/// Decode one PackBits scanline of `width` pixels into `dst`.
///
/// On failure returns how many pixels the scanline would have produced.
fn decode_rle_scanline(
    line: &[u8], dst: &mut [u8], width: usize, stride: usize
) -> Result<(), usize> {
    // Loop until you get the number of unpacked bytes you are expecting:
    //     Read the next source byte into n.
    //     If n is between 0 and 127 inclusive, copy the next n+1 bytes
    //     literally. Else if n is between -127 and -1 inclusive, copy the next
    //     byte -n+1 times. Else if n is 128, noop.
    // Endloop
    let mut column = 0;
    let mut position = 0;

    while column < width && position < line.len() {
        let control = line[position];
        position += 1;

        match control.cmp(&128) {
            Ordering::Less => {
                let run = usize::from(control) + 1;

                let literal = line.get(position..position + run).ok_or(column)?;
                if column + run > width {
                    return Err(column + run);
                }
                let target = dst.iter_mut().skip(column * stride).step_by(stride);

                for (pixel, value) in target.zip(literal) {
                    *pixel = *value;
                }
                position += run;
                column += run;
            }
            Ordering::Equal => (),
            Ordering::Greater => {
                // Interpret control as a negative 8-bit int.
                let run = 257 - usize::from(control);

                let value = *line.get(position).ok_or(column)?;
                if column + run > width {
                    return Err(column + run);
                }
                let target = dst.iter_mut().skip(column * stride).step_by(stride);

                for pixel in target.take(run) {
                    *pixel = value;
                }
                position += 1;
                column += run;
            }
        }
    }
    if column != width {
        return Err(column);
    }
    Ok(())
}
