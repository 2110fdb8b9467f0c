/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::fs::create_dir_all;

use log::{error, info, trace};
use zune_psd_layers::{ChannelOrder, InterleavedImage, Layer, PSDLayerDecoder};

use crate::cmd_args::PixelOrder;
use crate::cmd_parsers::global_options::CmdOptions;
use crate::errors::LayerToolErrors;
use crate::file_io::{layer_path, write_layer};

pub(crate) fn extract_layers_from_cmd(cmd_opts: &CmdOptions) -> Result<(), LayerToolErrors> {
    info!("Reading {:?}", cmd_opts.input);

    let data = std::fs::read(&cmd_opts.input)?;
    let options = cmd_opts.decoder_options();

    let order = match cmd_opts.order {
        PixelOrder::Rgba => ChannelOrder::RGBA,
        PixelOrder::Bgra => ChannelOrder::BGRA
    };

    create_dir_all(&cmd_opts.out_dir)?;

    let mut decoder = PSDLayerDecoder::new_with_options(&data, options);
    let mut written = 0;

    if options.strict_mode() {
        for layer in decoder.decode(&order)? {
            written += 1;
            save_layer(cmd_opts, written, layer.layer(), layer.image())?;
        }
    } else {
        for (layer, result) in decoder.decode_lenient(&order)? {
            match result {
                Ok(image) => {
                    written += 1;
                    save_layer(cmd_opts, written, layer, &image)?;
                }
                Err(err) => error!("Skipping layer {} ({:?}): {:?}", layer.index(), layer.display_name(), err)
            }
        }
    }
    info!("Wrote {written} layers to {:?}", cmd_opts.out_dir);

    Ok(())
}

fn save_layer(
    cmd_opts: &CmdOptions, counter: usize, layer: &Layer, image: &InterleavedImage
) -> Result<(), LayerToolErrors> {
    let (top, left, bottom, right) = layer.rect();

    info!(
        "Layer {}: {:?} {}x{}",
        layer.index(),
        layer.display_name(),
        image.width(),
        image.height()
    );
    trace!("Rect: top {top}, left {left}, bottom {bottom}, right {right}");
    trace!(
        "Blend mode: {}, opacity: {}, visible: {}",
        String::from_utf8_lossy(layer.blend_mode()),
        layer.opacity(),
        layer.is_visible()
    );

    let path = layer_path(&cmd_opts.out_dir, counter, cmd_opts.format, cmd_opts.order);
    write_layer(&path, image, cmd_opts.format)
}
