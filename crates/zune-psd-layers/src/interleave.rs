/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Combining channel planes into four byte pixels
//!
//! Where each channel lands inside a pixel is decided by a
//! [`ChannelOffsets`] policy. [`ChannelOrder`] covers the RGBA and BGRA
//! layouts, any `Fn(ChannelKind) -> Option<usize>` closure can be used
//! for anything else, e.g. to keep the layer mask instead of alpha.
use alloc::vec;
use alloc::vec::Vec;

use crate::errors::LayerDecodeErrors;
use crate::layer::{Channel, ChannelKind, Layer};
use crate::plane::{decode_channel_into, decode_plane, DecodedPlane};

/// Number of bytes in one interleaved pixel
pub const BYTES_PER_PIXEL: usize = 4;

/// Maps a channel to its byte inside an interleaved pixel.
///
/// Returning `None` drops the channel.
pub trait ChannelOffsets {
    fn offset(&self, channel: ChannelKind) -> Option<usize>;
}

impl<F> ChannelOffsets for F
where
    F: Fn(ChannelKind) -> Option<usize>
{
    fn offset(&self, channel: ChannelKind) -> Option<usize> {
        (self)(channel)
    }
}

/// Built in channel layouts.
///
/// Both keep alpha in the last byte and drop the layer mask.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[allow(clippy::upper_case_acronyms)]
pub enum ChannelOrder {
    RGBA,
    BGRA
}

impl ChannelOffsets for ChannelOrder {
    fn offset(&self, channel: ChannelKind) -> Option<usize> {
        match (self, channel) {
            (ChannelOrder::RGBA, ChannelKind::Red) => Some(0),
            (ChannelOrder::RGBA, ChannelKind::Blue) => Some(2),
            (ChannelOrder::BGRA, ChannelKind::Red) => Some(2),
            (ChannelOrder::BGRA, ChannelKind::Blue) => Some(0),
            (_, ChannelKind::Green) => Some(1),
            (_, ChannelKind::Alpha) => Some(3),
            (_, ChannelKind::Mask) => None
        }
    }
}

/// A four bytes per pixel image, row major
pub struct InterleavedImage {
    width:  usize,
    height: usize,
    pixels: Vec<u8>
}

impl InterleavedImage {
    /// Create an image with every byte set to zero
    ///
    /// Fails with [`OverflowingDimensions`](LayerDecodeErrors::OverflowingDimensions)
    /// if the buffer size does not fit in `usize`.
    pub fn new(width: usize, height: usize) -> Result<InterleavedImage, LayerDecodeErrors> {
        let size = width
            .checked_mul(height)
            .and_then(|pixels| pixels.checked_mul(BYTES_PER_PIXEL))
            .ok_or(LayerDecodeErrors::OverflowingDimensions(width, height))?;

        Ok(InterleavedImage {
            width,
            height,
            pixels: vec![0; size]
        })
    }

    pub const fn width(&self) -> usize {
        self.width
    }

    pub const fn height(&self) -> usize {
        self.height
    }

    pub const fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// The byte `policy` picks for `channel`, if any
    fn slot<P: ChannelOffsets + ?Sized>(
        channel: ChannelKind, policy: &P
    ) -> Result<Option<usize>, LayerDecodeErrors> {
        match policy.offset(channel) {
            Some(offset) if offset >= BYTES_PER_PIXEL => {
                Err(LayerDecodeErrors::InvalidChannelOffset { channel, offset })
            }
            slot => Ok(slot)
        }
    }

    /// Scatter `plane` into the byte `policy` picks for `channel`.
    ///
    /// Channels without a slot are skipped. The plane must have the
    /// same dimensions as the image.
    pub fn write_plane<P: ChannelOffsets + ?Sized>(
        &mut self, channel: ChannelKind, plane: &DecodedPlane, policy: &P
    ) -> Result<(), LayerDecodeErrors> {
        if (plane.width(), plane.height()) != self.dimensions() {
            return Err(LayerDecodeErrors::MismatchedPlane {
                channel,
                expected: self.dimensions(),
                found: (plane.width(), plane.height())
            });
        }
        let Some(offset) = Self::slot(channel, policy)? else {
            return Ok(());
        };

        for (pixel, value) in self
            .pixels
            .chunks_exact_mut(BYTES_PER_PIXEL)
            .zip(plane.data())
        {
            pixel[offset] = *value;
        }
        Ok(())
    }

    /// Decode `channel` straight into its slot, without an intermediate plane.
    ///
    /// A channel the policy drops is still decoded, so a corrupt channel
    /// fails its layer whatever the policy.
    fn decode_channel<P: ChannelOffsets + ?Sized>(
        &mut self, channel: &Channel, layer: usize, policy: &P
    ) -> Result<(), LayerDecodeErrors> {
        let (width, height) = self.dimensions();

        match Self::slot(channel.kind(), policy)? {
            Some(offset) => {
                let out = self.pixels.get_mut(offset..).unwrap_or_default();
                decode_channel_into(channel, layer, width, height, out, BYTES_PER_PIXEL)
            }
            None => decode_plane(channel, layer, width, height).map(|_| ())
        }
    }
}

/// Interleave already decoded planes into a new image
pub fn interleave_planes<P: ChannelOffsets + ?Sized>(
    width: usize, height: usize, planes: &[(ChannelKind, DecodedPlane)], policy: &P
) -> Result<InterleavedImage, LayerDecodeErrors> {
    let mut image = InterleavedImage::new(width, height)?;

    for (channel, plane) in planes {
        image.write_plane(*channel, plane, policy)?;
    }
    Ok(image)
}

/// Decode each channel of `layer` and write it into a new image.
///
/// Any channel failing to decode fails the whole layer.
pub(crate) fn interleave_layer<P: ChannelOffsets + ?Sized>(
    layer: &Layer, policy: &P
) -> Result<InterleavedImage, LayerDecodeErrors> {
    let mut image = InterleavedImage::new(layer.width(), layer.height())?;

    for channel in layer.channels() {
        image.decode_channel(channel, layer.index(), policy)?;
    }
    Ok(image)
}
