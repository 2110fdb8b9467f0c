/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use core::fmt::{Debug, Display, Formatter};

use crate::constants::{ColorModes, BLEND_SIGNATURE_BE, PSD_IDENTIFIER_BE};
use crate::layer::ChannelKind;

/// Errors that can occur while decoding the layers of a PSD file
///
/// Structural errors carry the byte offset (relative to the start
/// of the file) at which they were detected, layer errors carry the
/// index of the offending layer in on-disk order.
pub enum LayerDecodeErrors {
    /// A read needed more bytes than the stream had left
    TruncatedInput {
        offset:    usize,
        requested: usize,
        remaining: usize
    },
    /// A seek would have moved before the start of the stream
    InvalidSeek { offset: usize, delta: i64 },
    /// The file does not start with `8BPS`
    InvalidSignature(u32),
    UnsupportedVersion(u16),
    UnsupportedBitDepth(u16),
    /// Indexed, duotone or unknown color modes
    UnsupportedColorMode(u16),
    /// Maximum supported dimension followed by the dimension found
    LargeDimensions(usize, usize),
    /// Width and height whose pixel buffer size does not fit in `usize`
    OverflowingDimensions(usize, usize),
    /// A layer declared more channels than a layer can hold
    CorruptLayerTable {
        layer:    usize,
        offset:   usize,
        channels: u16
    },
    UnknownChannelId {
        layer:  usize,
        offset: usize,
        code:   i16
    },
    /// The signature before the blend mode key was not `8BIM`
    InvalidBlendSignature {
        layer:  usize,
        offset: usize,
        found:  u32
    },
    UnknownCompressionMode {
        layer:   usize,
        channel: ChannelKind,
        mode:    u16
    },
    /// A run length encoded scanline did not decode to exactly one row
    CorruptScanline {
        layer:    usize,
        channel:  ChannelKind,
        row:      usize,
        decoded:  usize,
        expected: usize
    },
    /// A channel payload is shorter than its plane needs
    TruncatedPlane {
        layer:    usize,
        channel:  ChannelKind,
        expected: usize,
        found:    usize
    },
    /// A channel offset policy mapped a channel outside the 4 byte pixel
    InvalidChannelOffset { channel: ChannelKind, offset: usize },
    /// A plane's `(width, height)` differs from the image it is written into
    MismatchedPlane {
        channel:  ChannelKind,
        expected: (usize, usize),
        found:    (usize, usize)
    }
}

impl LayerDecodeErrors {
    /// Index of the layer this error was raised for, if any
    pub const fn layer(&self) -> Option<usize> {
        match self {
            Self::CorruptLayerTable { layer, .. }
            | Self::UnknownChannelId { layer, .. }
            | Self::InvalidBlendSignature { layer, .. }
            | Self::UnknownCompressionMode { layer, .. }
            | Self::CorruptScanline { layer, .. }
            | Self::TruncatedPlane { layer, .. } => Some(*layer),
            _ => None
        }
    }
}

impl Debug for LayerDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            LayerDecodeErrors::TruncatedInput {
                offset,
                requested,
                remaining
            } => {
                writeln!(
                    f,
                    "Truncated input at offset {offset}, needed {requested} bytes but only {remaining} remain"
                )
            }
            LayerDecodeErrors::InvalidSeek { offset, delta } => {
                writeln!(
                    f,
                    "Cannot seek {delta} bytes from offset {offset}, that is before the start of the stream"
                )
            }
            LayerDecodeErrors::InvalidSignature(bytes) => {
                writeln!(
                    f,
                    "Expected {:?} but found {:?}, not a PSD image",
                    PSD_IDENTIFIER_BE.to_be_bytes(),
                    bytes.to_be_bytes()
                )
            }
            LayerDecodeErrors::UnsupportedVersion(version) => {
                writeln!(
                    f,
                    "Unsupported file version {version}, known versions are 1"
                )
            }
            LayerDecodeErrors::UnsupportedBitDepth(depth) => {
                writeln!(
                    f,
                    "Unsupported bit depth {depth}, only 8 bit layers are supported"
                )
            }
            LayerDecodeErrors::UnsupportedColorMode(mode) => match ColorModes::from_int(*mode) {
                Some(color) => writeln!(
                    f,
                    "Unsupported color mode {color:?}, indexed and duotone images are not supported"
                ),
                None => writeln!(f, "Unknown color mode {mode}")
            },
            LayerDecodeErrors::LargeDimensions(supported, found) => {
                writeln!(
                    f,
                    "Too large dimensions, supported {supported} but found {found}"
                )
            }
            LayerDecodeErrors::OverflowingDimensions(width, height) => {
                writeln!(
                    f,
                    "Dimensions {width}x{height} are too large to allocate a buffer for"
                )
            }
            LayerDecodeErrors::CorruptLayerTable {
                layer,
                offset,
                channels
            } => {
                writeln!(
                    f,
                    "Layer {layer} at offset {offset} declares {channels} channels, at most 5 are allowed"
                )
            }
            LayerDecodeErrors::UnknownChannelId {
                layer,
                offset,
                code
            } => {
                writeln!(
                    f,
                    "Layer {layer} has unknown channel id {code} at offset {offset}"
                )
            }
            LayerDecodeErrors::InvalidBlendSignature {
                layer,
                offset,
                found
            } => {
                writeln!(
                    f,
                    "Layer {layer}: expected blend signature {:?} at offset {offset} but found {:?}",
                    BLEND_SIGNATURE_BE.to_be_bytes(),
                    found.to_be_bytes()
                )
            }
            LayerDecodeErrors::UnknownCompressionMode {
                layer,
                channel,
                mode
            } => {
                writeln!(
                    f,
                    "Layer {layer}, channel {channel:?}: unknown compression mode {mode}"
                )
            }
            LayerDecodeErrors::CorruptScanline {
                layer,
                channel,
                row,
                decoded,
                expected
            } => {
                writeln!(
                    f,
                    "Layer {layer}, channel {channel:?}: scanline {row} decoded to {decoded} pixels, expected {expected}"
                )
            }
            LayerDecodeErrors::TruncatedPlane {
                layer,
                channel,
                expected,
                found
            } => {
                writeln!(
                    f,
                    "Layer {layer}, channel {channel:?}: plane needs {expected} bytes but payload has {found}"
                )
            }
            LayerDecodeErrors::InvalidChannelOffset { channel, offset } => {
                writeln!(
                    f,
                    "Channel {channel:?} mapped to byte {offset}, offsets must be below 4"
                )
            }
            LayerDecodeErrors::MismatchedPlane {
                channel,
                expected,
                found
            } => {
                writeln!(
                    f,
                    "Channel {channel:?} plane is {found:?} but the image is {expected:?}"
                )
            }
        }
    }
}

impl Display for LayerDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{:?}", self)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LayerDecodeErrors {}
