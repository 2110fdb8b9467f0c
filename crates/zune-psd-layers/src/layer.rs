/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Layer records
//!
//! A layer record describes one layer's bounds, which channels it carries
//! and how large each channel's pixel payload is, followed by blend
//! information, an optional mask, blending ranges and the name.
//! Everything after the extra data length is bounded by that length,
//! so decoding always ends by seeking to the record's own end.
use alloc::string::String;
use alloc::vec::Vec;

use log::{trace, warn};

use crate::constants::{BLEND_SIGNATURE_BE, LAYER_MASK_FIXED_SIZE, MAX_LAYER_CHANNELS};
use crate::cursor::ByteCursor;
use crate::errors::LayerDecodeErrors;
use crate::interleave::{interleave_layer, ChannelOffsets, InterleavedImage};

/// Identity of a channel inside a layer
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ChannelKind {
    Red,
    Green,
    Blue,
    /// Transparency mask
    Alpha,
    /// User supplied layer mask
    Mask
}

impl ChannelKind {
    /// Map the signed on-disk channel id to a channel.
    pub const fn from_code(code: i16) -> Option<ChannelKind> {
        match code {
            0 => Some(Self::Red),
            1 => Some(Self::Green),
            2 => Some(Self::Blue),
            -1 => Some(Self::Alpha),
            -2 => Some(Self::Mask),
            _ => None
        }
    }

    pub const fn code(self) -> i16 {
        match self {
            Self::Red => 0,
            Self::Green => 1,
            Self::Blue => 2,
            Self::Alpha => -1,
            Self::Mask => -2
        }
    }
}

/// A single channel of a layer and its stored (possibly compressed) bytes
#[derive(Debug, Clone)]
pub struct Channel {
    kind: ChannelKind,
    size: usize,
    data: Vec<u8>
}

impl Channel {
    pub(crate) const fn new(kind: ChannelKind, size: usize) -> Channel {
        Channel {
            kind,
            size,
            data: Vec::new()
        }
    }

    pub const fn kind(&self) -> ChannelKind {
        self.kind
    }

    /// Payload size declared in the layer record, compression marker included
    pub const fn declared_size(&self) -> usize {
        self.size
    }

    /// The payload exactly as stored in the file.
    ///
    /// Empty until the channel data section has been read.
    pub fn payload(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn set_payload(&mut self, data: Vec<u8>) {
        debug_assert_eq!(data.len(), self.size);
        self.data = data;
    }
}

/// Layer mask parameters, the mask pixels live in the [`ChannelKind::Mask`] channel
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct LayerMask {
    pub top:           i32,
    pub left:          i32,
    pub bottom:        i32,
    pub right:         i32,
    pub default_color: u8,
    pub flags:         u8
}

/// One layer as described by its record, plus its channel payloads
#[derive(Debug, Clone)]
pub struct Layer {
    index:      usize,
    top:        i32,
    left:       i32,
    bottom:     i32,
    right:      i32,
    channels:   Vec<Channel>,
    blend_mode: [u8; 4],
    opacity:    u8,
    clipping:   u8,
    flags:      u8,
    name:       String,
    mask:       Option<LayerMask>
}

impl Layer {
    /// Position of this layer in the file, starting from zero
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Layer bounds as `(top, left, bottom, right)`.
    ///
    /// Top and left are inclusive, bottom and right exclusive.
    pub const fn rect(&self) -> (i32, i32, i32, i32) {
        (self.top, self.left, self.bottom, self.right)
    }

    pub fn width(&self) -> usize {
        extent(self.left, self.right)
    }

    pub fn height(&self) -> usize {
        extent(self.top, self.bottom)
    }

    /// Whether the layer covers no pixels, such layers have no image
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Channels in on-disk order
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub(crate) fn channels_mut(&mut self) -> &mut [Channel] {
        &mut self.channels
    }

    /// Four character blend mode key, e.g `norm` or `mul `
    pub const fn blend_mode(&self) -> &[u8; 4] {
        &self.blend_mode
    }

    pub const fn opacity(&self) -> u8 {
        self.opacity
    }

    pub const fn clipping(&self) -> u8 {
        self.clipping
    }

    pub const fn flags(&self) -> u8 {
        self.flags
    }

    /// Bit 1 of the flags marks a hidden layer
    pub const fn is_visible(&self) -> bool {
        self.flags & 0b10 == 0
    }

    /// The name exactly as stored, up to the first zero byte
    ///
    /// Names are Pascal strings on disk, so this starts with the length byte.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name decoded from its length prefix
    ///
    /// A name that fills its padded block has no terminator, so the stored
    /// name can run on into whatever follows it. Only the first `length`
    /// characters are kept. Falls back to the stored name when the prefix
    /// claims more characters than were read.
    pub fn display_name(&self) -> &str {
        let mut chars = self.name.chars();

        let Some(length) = chars.next() else {
            return &self.name;
        };
        let rest = chars.as_str();
        let length = length as usize;

        match rest.char_indices().nth(length) {
            Some((end, _)) => &rest[..end],
            None if rest.chars().count() == length => rest,
            None => &self.name
        }
    }

    pub const fn mask(&self) -> Option<&LayerMask> {
        self.mask.as_ref()
    }

    /// Decode every channel of this layer and interleave them into
    /// four bytes per pixel using `policy` to place each channel.
    ///
    /// Returns `Ok(None)` for layers without any pixels.
    pub fn render<P: ChannelOffsets + ?Sized>(
        &self, policy: &P
    ) -> Result<Option<InterleavedImage>, LayerDecodeErrors> {
        if self.is_empty() {
            return Ok(None);
        }
        interleave_layer(self, policy).map(Some)
    }
}

fn extent(start: i32, end: i32) -> usize {
    usize::try_from(i64::from(end) - i64::from(start)).unwrap_or(0)
}

/// Decode one layer record, leaving `stream` at the end of the record.
pub(crate) fn decode_layer_record(
    stream: &mut ByteCursor, index: usize
) -> Result<Layer, LayerDecodeErrors> {
    let record_start = stream.position();

    let top = stream.read_i32()?;
    let left = stream.read_i32()?;
    let bottom = stream.read_i32()?;
    let right = stream.read_i32()?;

    let table_offset = stream.position();
    let channel_count = stream.read_u16()?;

    if channel_count > MAX_LAYER_CHANNELS {
        return Err(LayerDecodeErrors::CorruptLayerTable {
            layer:    index,
            offset:   table_offset,
            channels: channel_count
        });
    }

    let mut channels = Vec::with_capacity(usize::from(channel_count));

    for _ in 0..channel_count {
        let offset = stream.position();
        let code = stream.read_i16()?;
        let size = stream.read_u32()? as usize;

        let kind = ChannelKind::from_code(code).ok_or(LayerDecodeErrors::UnknownChannelId {
            layer: index,
            offset,
            code
        })?;
        channels.push(Channel::new(kind, size));
    }

    let signature_offset = stream.position();
    let signature = stream.read_u32()?;

    if signature != BLEND_SIGNATURE_BE {
        return Err(LayerDecodeErrors::InvalidBlendSignature {
            layer:  index,
            offset: signature_offset,
            found:  signature
        });
    }
    let blend_mode = stream.read_fixed_bytes::<4>()?;
    let opacity = stream.read_u8()?;
    let clipping = stream.read_u8()?;
    let flags = stream.read_u8()?;
    // filler
    stream.read_u8()?;

    let extra_length = stream.read_u32()? as usize;
    let layer_end = stream.position().saturating_add(extra_length);

    let mask = decode_layer_mask(stream)?;

    let blending_ranges = stream.read_u32()?;
    stream.skip(i64::from(blending_ranges))?;

    let name = stream.read_pascal_string()?;

    if (stream.position() - record_start) % 2 == 1 && stream.position() < layer_end {
        stream.skip(1)?;
    }

    if stream.position() > layer_end {
        warn!(
            "Layer {index}: record fields end at {} past the record end {layer_end}, seeking back",
            stream.position()
        );
    }
    // additional layer information (effects, unicode names...) is not interpreted
    stream.skip_to(layer_end)?;

    let layer = Layer {
        index,
        top,
        left,
        bottom,
        right,
        channels,
        blend_mode,
        opacity,
        clipping,
        flags,
        name,
        mask
    };

    trace!(
        "Layer {index}: {}x{} at ({left},{top}), {} channels, name {:?}",
        layer.width(),
        layer.height(),
        layer.channels.len(),
        layer.name
    );

    Ok(layer)
}

fn decode_layer_mask(stream: &mut ByteCursor) -> Result<Option<LayerMask>, LayerDecodeErrors> {
    let mask_length = stream.read_u32()? as usize;

    if mask_length == 0 {
        return Ok(None);
    }
    let mask_start = stream.position();

    if mask_length < LAYER_MASK_FIXED_SIZE {
        warn!("Layer mask section of {mask_length} bytes is too small, ignoring it");
        stream.skip(mask_length as i64)?;
        return Ok(None);
    }

    let mask = LayerMask {
        top:           stream.read_i32()?,
        left:          stream.read_i32()?,
        bottom:        stream.read_i32()?,
        right:         stream.read_i32()?,
        default_color: stream.read_u8()?,
        flags:         stream.read_u8()?
    };
    // the section may carry a second (vector) mask rectangle
    stream.skip_to(mask_start + mask_length)?;

    Ok(Some(mask))
}
