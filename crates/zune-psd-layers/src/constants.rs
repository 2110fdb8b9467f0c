/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

#![allow(clippy::upper_case_acronyms)]

/// `8BPS`, the first four bytes of every PSD file
pub const PSD_IDENTIFIER_BE: u32 = 0x3842_5053;

/// `8BIM`, the signature preceding the blend mode key of a layer record
pub const BLEND_SIGNATURE_BE: u32 = 0x3842_494D;

/// Maximum number of channels a single layer record may declare
pub const MAX_LAYER_CHANNELS: u16 = 5;

/// Size of the mask rectangle, default color, flags and padding
/// that every non-empty layer mask section starts with.
pub const LAYER_MASK_FIXED_SIZE: usize = 20;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ColorModes {
    Bitmap = 0,
    Grayscale = 1,
    IndexedColor = 2,
    RGB = 3,
    CYMK = 4,
    MultiChannel = 7,
    DuoTone = 8,
    LabColor = 9
}

impl ColorModes {
    pub fn from_int(int: u16) -> Option<ColorModes> {
        use crate::constants::ColorModes::{
            Bitmap, DuoTone, Grayscale, IndexedColor, LabColor, MultiChannel, CYMK, RGB
        };

        match int {
            0 => Some(Bitmap),
            1 => Some(Grayscale),
            2 => Some(IndexedColor),
            3 => Some(RGB),
            4 => Some(CYMK),
            7 => Some(MultiChannel),
            8 => Some(DuoTone),
            9 => Some(LabColor),
            _ => None
        }
    }

    /// Whether this decoder understands the color mode data block
    /// that follows the header for this mode.
    ///
    /// Indexed and duotone images carry a palette/duotone specification
    /// there, everything else carries an empty block.
    pub const fn is_supported(self) -> bool {
        !matches!(self, ColorModes::IndexedColor | ColorModes::DuoTone)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CompressionMethod {
    NoCompression = 0,
    RLE = 1
}

impl CompressionMethod {
    pub fn from_int(int: u16) -> Option<CompressionMethod> {
        match int {
            0 => Some(Self::NoCompression),
            1 => Some(Self::RLE),
            _ => None
        }
    }
}
