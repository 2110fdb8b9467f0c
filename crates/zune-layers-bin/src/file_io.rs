/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::debug;
use zune_psd_layers::InterleavedImage;

use crate::cmd_args::{OutputFormat, PixelOrder};
use crate::errors::LayerToolErrors;

/// Name of the `counter`th written layer, e.g `007.png`
pub fn layer_path(out_dir: &Path, counter: usize, format: OutputFormat, order: PixelOrder) -> PathBuf {
    let extension = match format {
        OutputFormat::Png => "png",
        OutputFormat::Ppm => "ppm",
        OutputFormat::Raw => order.extension()
    };
    out_dir.join(format!("{counter:03}.{extension}"))
}

/// Write `image` to `path`, pixels must already be in the order the format expects
pub fn write_layer(path: &Path, image: &InterleavedImage, format: OutputFormat) -> Result<(), LayerToolErrors> {
    debug!("Writing {:?}", path);

    let mut writer = BufWriter::new(File::create(path)?);

    match format {
        OutputFormat::Raw => writer.write_all(image.pixels())?,
        OutputFormat::Png => {
            let too_large = || LayerToolErrors::TooLarge(image.width(), image.height());

            let width = u32::try_from(image.width()).map_err(|_| too_large())?;
            let height = u32::try_from(image.height()).map_err(|_| too_large())?;

            let mut encoder = png::Encoder::new(&mut writer, width, height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);

            let mut png_writer = encoder.write_header()?;
            png_writer.write_image_data(image.pixels())?;
            png_writer.finish()?;
        }
        OutputFormat::Ppm => {
            let header = format!("P6\n{}\n{}\n255\n", image.width(), image.height());
            writer.write_all(header.as_bytes())?;

            for pixel in image.pixels().chunks_exact(4) {
                writer.write_all(&pixel[..3])?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}
