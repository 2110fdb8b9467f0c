/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::fmt::{Debug, Display, Formatter};

use zune_psd_layers::errors::LayerDecodeErrors;

/// Everything that can stop layer extraction
pub enum LayerToolErrors {
    Decode(LayerDecodeErrors),
    Io(std::io::Error),
    Encode(png::EncodingError),
    /// A layer too large for the output format
    TooLarge(usize, usize)
}

impl Debug for LayerToolErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerToolErrors::Decode(err) => writeln!(f, "Decoding error: {err:?}"),
            LayerToolErrors::Io(err) => writeln!(f, "I/O error: {err}"),
            LayerToolErrors::Encode(err) => writeln!(f, "PNG encoding error: {err}"),
            LayerToolErrors::TooLarge(width, height) => {
                writeln!(f, "Layer of {width}x{height} is too large to encode")
            }
        }
    }
}

impl Display for LayerToolErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{:?}", self)
    }
}

impl std::error::Error for LayerToolErrors {}

impl From<LayerDecodeErrors> for LayerToolErrors {
    fn from(value: LayerDecodeErrors) -> Self {
        LayerToolErrors::Decode(value)
    }
}

impl From<std::io::Error> for LayerToolErrors {
    fn from(value: std::io::Error) -> Self {
        LayerToolErrors::Io(value)
    }
}

impl From<png::EncodingError> for LayerToolErrors {
    fn from(value: png::EncodingError) -> Self {
        LayerToolErrors::Encode(value)
    }
}
