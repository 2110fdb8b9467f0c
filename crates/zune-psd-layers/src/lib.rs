/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A PSD layer extractor
//!
//! This crate reads the layers of a Photoshop PSD file and hands each one
//! back as its own four byte per pixel image, without compositing them.
//!
//! ## What is supported
//! - 8 bit images in any color mode other than indexed and duotone
//! - Raw and PackBits (RLE) compressed channels
//! - Red, green, blue, transparency and layer mask channels
//!
//! Adjustment layers, effects, vector masks, 16 and 32 bit files and the
//! merged image at the end of the file are ignored.
//!
//! # Example
//! - Extracting layers as RGBA
//! ```no_run
//! use zune_psd_layers::errors::LayerDecodeErrors;
//! use zune_psd_layers::{ChannelOrder, PSDLayerDecoder};
//!
//! fn main() -> Result<(), LayerDecodeErrors> {
//!     let mut decoder = PSDLayerDecoder::new(&[]);
//!
//!     for layer in decoder.decode(&ChannelOrder::RGBA)? {
//!         let (width, height) = layer.image().dimensions();
//!         println!("{}: {width}x{height}", layer.layer().name());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! - Keeping the layer mask instead of transparency
//! ```no_run
//! use zune_psd_layers::{ChannelKind, ChannelOffsets, ChannelOrder, PSDLayerDecoder};
//!
//! let policy = |channel: ChannelKind| match channel {
//!     ChannelKind::Mask => Some(3),
//!     ChannelKind::Alpha => None,
//!     other => ChannelOrder::RGBA.offset(other)
//! };
//! let mut decoder = PSDLayerDecoder::new(&[]);
//! let layers = decoder.decode(&policy);
//! ```
#![forbid(unsafe_code)]
#![cfg_attr(not(feature = "std"), no_std)]
extern crate alloc;
pub extern crate zune_core;

pub use cursor::ByteCursor;
pub use decoder::{ContainerHeader, LayerImage, LayerResult, PSDLayerDecoder};
pub use interleave::{interleave_planes, ChannelOffsets, ChannelOrder, InterleavedImage};
pub use layer::{Channel, ChannelKind, Layer, LayerMask};
pub use plane::{decode_plane, DecodedPlane};

pub mod constants;
mod cursor;
pub mod decoder;
pub mod errors;
mod interleave;
mod layer;
mod plane;
