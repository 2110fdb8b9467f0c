/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A PSD layer decoder.
//!
//! The file is walked strictly in order, header, color mode data,
//! image resources, layer records and finally the channel payloads
//! of every layer. The merged (flattened) image that follows is not read.
//!
//! Decoding into pixels is a second step, each layer's channels are
//! decompressed and interleaved into four byte pixels in a layout
//! chosen by a [`ChannelOffsets`] policy.
use alloc::vec::Vec;

use log::{debug, trace};
use zune_core::options::DecoderOptions;

use crate::constants::{ColorModes, PSD_IDENTIFIER_BE};
use crate::cursor::ByteCursor;
use crate::errors::LayerDecodeErrors;
use crate::interleave::{interleave_layer, ChannelOffsets, InterleavedImage};
use crate::layer::{decode_layer_record, Layer};

/// Fields of the fixed 26 byte PSD header
#[derive(Debug, Copy, Clone)]
pub struct ContainerHeader {
    version:       u16,
    channel_count: u16,
    height:        usize,
    width:         usize,
    depth:         u16,
    color_mode:    ColorModes
}

impl ContainerHeader {
    pub const fn version(&self) -> u16 {
        self.version
    }

    /// Channels of the merged image, not of individual layers
    pub const fn channel_count(&self) -> u16 {
        self.channel_count
    }

    pub const fn width(&self) -> usize {
        self.width
    }

    pub const fn height(&self) -> usize {
        self.height
    }

    pub const fn depth(&self) -> u16 {
        self.depth
    }

    pub const fn color_mode(&self) -> ColorModes {
        self.color_mode
    }
}

/// A decoded layer together with its metadata
pub struct LayerImage<'a> {
    layer: &'a Layer,
    image: InterleavedImage
}

impl<'a> LayerImage<'a> {
    pub const fn layer(&self) -> &'a Layer {
        self.layer
    }

    pub const fn image(&self) -> &InterleavedImage {
        &self.image
    }

    pub fn into_image(self) -> InterleavedImage {
        self.image
    }
}

/// Outcome of decoding one layer when failures are reported per layer
pub type LayerResult<'a> = (&'a Layer, Result<InterleavedImage, LayerDecodeErrors>);

/// A Photoshop PSD layer decoder.
///
/// Extracts every layer of an 8 bit PSD file as a separate image,
/// without compositing them.
pub struct PSDLayerDecoder<'a> {
    stream:         ByteCursor<'a>,
    options:        DecoderOptions,
    header:         Option<ContainerHeader>,
    layers:         Vec<Layer>,
    decoded_layers: bool,
    merged_alpha:   bool
}

impl<'a> PSDLayerDecoder<'a> {
    /// Create a new decoder reading a PSD file held in `data`
    pub fn new(data: &'a [u8]) -> PSDLayerDecoder<'a> {
        Self::new_with_options(data, DecoderOptions::default())
    }

    /// Create a new decoder with options that influence decoding.
    ///
    /// Only the maximum width and height are respected, they bound both
    /// the canvas and every layer.
    pub fn new_with_options(data: &'a [u8], options: DecoderOptions) -> PSDLayerDecoder<'a> {
        PSDLayerDecoder {
            stream: ByteCursor::new(data),
            options,
            header: None,
            layers: Vec::new(),
            decoded_layers: false,
            merged_alpha: false
        }
    }

    fn check_dimensions(&self, width: usize, height: usize) -> Result<(), LayerDecodeErrors> {
        if width > self.options.max_width() {
            return Err(LayerDecodeErrors::LargeDimensions(
                self.options.max_width(),
                width
            ));
        }
        if height > self.options.max_height() {
            return Err(LayerDecodeErrors::LargeDimensions(
                self.options.max_height(),
                height
            ));
        }
        Ok(())
    }

    /// Decode the file header, color mode data and image resources
    ///
    /// This confirms the file is a PSD this decoder can read and leaves
    /// the stream at the layer and mask information section.
    ///
    /// A failed call leaves the decoder as it was, so calling it again
    /// reports the same error.
    pub fn decode_headers(&mut self) -> Result<(), LayerDecodeErrors> {
        if self.header.is_some() {
            return Ok(());
        }
        match self.read_header() {
            Ok(header) => {
                self.header = Some(header);
                Ok(())
            }
            Err(err) => {
                self.stream.skip_to(0)?;
                Err(err)
            }
        }
    }

    fn read_header(&mut self) -> Result<ContainerHeader, LayerDecodeErrors> {
        let magic = self.stream.read_u32()?;

        if magic != PSD_IDENTIFIER_BE {
            return Err(LayerDecodeErrors::InvalidSignature(magic));
        }

        let version = self.stream.read_u16()?;

        if version != 1 {
            return Err(LayerDecodeErrors::UnsupportedVersion(version));
        }
        // reserved
        self.stream.skip(6)?;

        let channel_count = self.stream.read_u16()?;
        let height = self.stream.read_u32()? as usize;
        let width = self.stream.read_u32()? as usize;

        self.check_dimensions(width, height)?;

        let depth = self.stream.read_u16()?;

        if depth != 8 {
            return Err(LayerDecodeErrors::UnsupportedBitDepth(depth));
        }

        let mode = self.stream.read_u16()?;
        let color_mode = ColorModes::from_int(mode)
            .filter(|color| color.is_supported())
            .ok_or(LayerDecodeErrors::UnsupportedColorMode(mode))?;

        // color mode data, empty for every mode we support
        let color_data = self.stream.read_u32()?;
        self.stream.skip(i64::from(color_data))?;

        // image resources, nothing in there affects layers
        let resources = self.stream.read_u32()?;
        debug!("Skipping {resources} bytes of image resources");
        self.stream.skip(i64::from(resources))?;

        trace!("Image width: {width}");
        trace!("Image height: {height}");
        trace!("Channels: {channel_count}");
        trace!("Color mode: {color_mode:?}");

        Ok(ContainerHeader {
            version,
            channel_count,
            height,
            width,
            depth,
            color_mode
        })
    }

    /// Decode every layer record and read the channel payloads.
    ///
    /// No pixels are decoded, use [`render_layers`](Self::render_layers)
    /// or [`Layer::render`] for that.
    ///
    /// On failure no layers are kept and the stream goes back to the start
    /// of the layer section, a second call parses it again from there.
    pub fn decode_layers(&mut self) -> Result<&[Layer], LayerDecodeErrors> {
        if self.decoded_layers {
            return Ok(&self.layers);
        }
        self.decode_headers()?;

        let section_start = self.stream.position();

        if let Err(err) = self.read_layer_section() {
            self.layers.clear();
            self.merged_alpha = false;
            self.stream.skip_to(section_start)?;

            return Err(err);
        }
        self.decoded_layers = true;

        Ok(&self.layers)
    }

    fn read_layer_section(&mut self) -> Result<(), LayerDecodeErrors> {
        let section_length = self.stream.read_u32()?;

        if section_length == 0 {
            debug!("No layer and mask information");
            return Ok(());
        }
        let info_length = self.stream.read_u32()?;

        debug!("Layer and mask section: {section_length} bytes, layer info: {info_length} bytes");

        if info_length == 0 {
            return Ok(());
        }
        let count = self.stream.read_i16()?;
        // negative means the first alpha channel holds the merged result's transparency
        self.merged_alpha = count < 0;
        let count = usize::from(count.unsigned_abs());

        trace!("Layer count: {count}");

        self.layers.reserve(count);

        for index in 0..count {
            let layer = decode_layer_record(&mut self.stream, index)?;
            self.check_dimensions(layer.width(), layer.height())?;
            self.layers.push(layer);
        }

        for layer in &mut self.layers {
            for channel in layer.channels_mut() {
                let payload = self.stream.read_bytes(channel.declared_size())?;
                channel.set_payload(payload);
            }
        }
        Ok(())
    }

    /// Decode the file and every non-empty layer's pixels.
    ///
    /// The first layer that fails to decode fails the whole call.
    pub fn decode<P: ChannelOffsets + Sync + ?Sized>(
        &mut self, policy: &P
    ) -> Result<Vec<LayerImage<'_>>, LayerDecodeErrors> {
        self.decode_layers()?;
        self.render_layers(policy)
    }

    /// Decode the file, reporting pixel decoding errors per layer.
    ///
    /// Structural errors still fail the call, since nothing after them
    /// can be trusted.
    pub fn decode_lenient<P: ChannelOffsets + Sync + ?Sized>(
        &mut self, policy: &P
    ) -> Result<Vec<LayerResult<'_>>, LayerDecodeErrors> {
        self.decode_layers()?;
        Ok(render_all(&self.layers, policy))
    }

    /// Render every non-empty layer decoded by [`decode_layers`](Self::decode_layers),
    /// in file order.
    pub fn render_layers<P: ChannelOffsets + Sync + ?Sized>(
        &self, policy: &P
    ) -> Result<Vec<LayerImage<'_>>, LayerDecodeErrors> {
        render_all(&self.layers, policy)
            .into_iter()
            .map(|(layer, image)| image.map(|image| LayerImage { layer, image }))
            .collect()
    }

    /// Layers decoded so far, in file order
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Header information or None if the headers haven't been decoded
    pub const fn header(&self) -> Option<&ContainerHeader> {
        self.header.as_ref()
    }

    /// Canvas width and height or None if the headers haven't been decoded
    pub fn dimensions(&self) -> Option<(usize, usize)> {
        self.header.map(|header| (header.width, header.height))
    }

    /// Whether the layer count was stored negated.
    ///
    /// Photoshop uses this to say the first alpha channel contains the
    /// transparency of the merged image, it does not change layer decoding.
    pub const fn first_alpha_is_merged_transparency(&self) -> bool {
        self.merged_alpha
    }
}

fn render_all<'l, P: ChannelOffsets + Sync + ?Sized>(
    layers: &'l [Layer], policy: &P
) -> Vec<LayerResult<'l>> {
    let renderable: Vec<&Layer> = layers.iter().filter(|layer| !layer.is_empty()).collect();

    #[cfg(feature = "threads")]
    {
        let threads = std::thread::available_parallelism().map_or(1, |x| x.get());

        if threads > 1 && renderable.len() > 1 {
            return render_threaded(&renderable, policy, threads);
        }
    }

    renderable
        .into_iter()
        .map(|layer| (layer, interleave_layer(layer, policy)))
        .collect()
}

/// Split layers into one contiguous batch per thread, results keep file order
#[cfg(feature = "threads")]
fn render_threaded<'l, P: ChannelOffsets + Sync + ?Sized>(
    layers: &[&'l Layer], policy: &P, threads: usize
) -> Vec<LayerResult<'l>> {
    let batch = layers.len().div_ceil(threads);

    std::thread::scope(|scope| {
        let workers: Vec<_> = layers
            .chunks(batch)
            .map(|chunk| {
                scope.spawn(move || {
                    chunk
                        .iter()
                        .map(|&layer| (layer, interleave_layer(layer, policy)))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut results = Vec::with_capacity(layers.len());

        for worker in workers {
            match worker.join() {
                Ok(rendered) => results.extend(rendered),
                Err(panic) => std::panic::resume_unwind(panic)
            }
        }
        results
    })
}
