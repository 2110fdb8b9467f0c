/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use zune_core::options::DecoderOptions;
use zune_psd_layers::errors::LayerDecodeErrors;
use zune_psd_layers::{ChannelKind, ChannelOffsets, ChannelOrder, PSDLayerDecoder};

use crate::{LayerSpec, PsdBuilder};

fn two_by_one() -> Vec<u8> {
    PsdBuilder::new(2, 1)
        .resource(0x03ED, &[0, 72, 0, 0, 0, 1, 0, 1])
        .layer(
            LayerSpec::new(0, 0, 1, 2)
                .name("Background")
                .raw(0, &[10, 20])
                .raw(1, &[30, 40])
                .raw(2, &[50, 60])
        )
        .merged_image()
        .build()
}

/// A 16x4 plane with runs, literals and a full row of one value
fn patterned_plane(seed: u8) -> Vec<u8> {
    (0..64_u8)
        .map(|i| match i / 16 {
            0 => seed,
            1 => seed.wrapping_add(i),
            2 => seed.wrapping_add(i / 3),
            _ => seed ^ (i & 1)
        })
        .collect()
}

#[test]
fn rgb_layer_as_rgba_and_bgra() {
    let data = two_by_one();

    let mut decoder = PSDLayerDecoder::new(&data);
    let layers = decoder.decode(&ChannelOrder::RGBA).unwrap();

    assert_eq!(layers.len(), 1);
    assert_eq!(layers[0].image().dimensions(), (2, 1));
    assert_eq!(layers[0].image().pixels(), [10, 30, 50, 0, 20, 40, 60, 0]);
    assert_eq!(layers[0].layer().display_name(), "Background");

    let mut decoder = PSDLayerDecoder::new(&data);
    let layers = decoder.decode(&ChannelOrder::BGRA).unwrap();

    assert_eq!(layers[0].image().pixels(), [50, 30, 10, 0, 60, 40, 20, 0]);
}

#[test]
fn rle_and_raw_channels_agree() {
    let planes: Vec<Vec<u8>> = [3, 90, 200, 255].iter().map(|&s| patterned_plane(s)).collect();

    let raw = PsdBuilder::new(16, 4)
        .layer(
            LayerSpec::new(0, 0, 4, 16)
                .raw(0, &planes[0])
                .raw(1, &planes[1])
                .raw(2, &planes[2])
                .raw(-1, &planes[3])
        )
        .build();
    let rle = PsdBuilder::new(16, 4)
        .layer(
            LayerSpec::new(0, 0, 4, 16)
                .rle(0, &planes[0])
                .rle(1, &planes[1])
                .rle(2, &planes[2])
                .rle(-1, &planes[3])
        )
        .build();

    let mut raw_decoder = PSDLayerDecoder::new(&raw);
    let mut rle_decoder = PSDLayerDecoder::new(&rle);

    let raw_layers = raw_decoder.decode(&ChannelOrder::RGBA).unwrap();
    let rle_layers = rle_decoder.decode(&ChannelOrder::RGBA).unwrap();

    assert_eq!(raw_layers[0].image().pixels(), rle_layers[0].image().pixels());

    for (i, pixel) in rle_layers[0].image().pixels().chunks_exact(4).enumerate() {
        assert_eq!(pixel, [planes[0][i], planes[1][i], planes[2][i], planes[3][i]]);
    }
}

#[test]
fn layers_keep_file_order() {
    let mut builder = PsdBuilder::new(2, 2);

    for i in 0..24_u8 {
        builder = builder.layer(
            LayerSpec::new(0, 0, 2, 2)
                .name(&format!("Layer {i:02}"))
                .rle(0, &[i; 4])
                .raw(-1, &[255 - i; 4])
        );
    }
    let data = builder.build();
    let mut decoder = PSDLayerDecoder::new(&data);
    let layers = decoder.decode(&ChannelOrder::RGBA).unwrap();

    assert_eq!(layers.len(), 24);

    for (i, layer) in layers.iter().enumerate() {
        assert_eq!(layer.layer().index(), i);
        assert_eq!(layer.layer().display_name(), format!("Layer {i:02}"));
        assert_eq!(layer.image().pixels()[..4], [i as u8, 0, 0, 255 - i as u8]);
    }
}

#[test]
fn empty_layers_are_listed_without_images() {
    let data = PsdBuilder::new(4, 4)
        .layer(LayerSpec::new(0, 0, 1, 1).raw(0, &[1]))
        .layer(LayerSpec::new(0, 0, 0, 0).name("</Layer group>"))
        .layer(LayerSpec::new(1, 1, 2, 2).raw(0, &[2]))
        .build();

    let mut decoder = PSDLayerDecoder::new(&data);
    assert_eq!(decoder.decode_layers().unwrap().len(), 3);
    assert!(decoder.layers()[1].is_empty());
    assert!(decoder.layers()[1]
        .render(&ChannelOrder::RGBA)
        .unwrap()
        .is_none());

    let indices: Vec<usize> = decoder
        .render_layers(&ChannelOrder::RGBA)
        .unwrap()
        .iter()
        .map(|layer| layer.layer().index())
        .collect();
    assert_eq!(indices, [0, 2]);
}

#[test]
fn trailing_layer_blocks_do_not_shift_later_records() {
    let data = PsdBuilder::new(8, 8)
        .layer(
            LayerSpec::new(-2, -3, 2, 3)
                .name("Offset")
                .mask([0, 0, 4, 4])
                .additional(b"luni", &[0, 0, 0, 6, 0, b'O', 0, b'f', 0, b'f', 0, b's', 0, b'e', 0, b't'])
                .additional(b"lyid", &[0, 0, 0, 9])
                .raw(0, &[1; 24])
                .raw(-2, &[200; 24])
        )
        .layer(
            LayerSpec::new(5, 6, 7, 8)
                .name("Second")
                .opacity(64)
                .hidden()
                .raw(1, &[9; 4])
        )
        .build();

    let mut decoder = PSDLayerDecoder::new(&data);
    let layers = decoder.decode_layers().unwrap();

    assert_eq!(layers[0].rect(), (-2, -3, 2, 3));
    assert_eq!((layers[0].width(), layers[0].height()), (6, 4));
    let mask = layers[0].mask().unwrap();
    assert_eq!((mask.bottom, mask.right, mask.default_color), (4, 4, 255));

    assert_eq!(layers[1].rect(), (5, 6, 7, 8));
    assert_eq!(layers[1].display_name(), "Second");
    assert_eq!(layers[1].opacity(), 64);
    assert!(!layers[1].is_visible());
    assert_eq!(layers[1].blend_mode(), b"norm");

    let images = decoder.render_layers(&ChannelOrder::RGBA).unwrap();
    // the mask is dropped by the built in orders
    assert_eq!(images[0].image().pixels()[..4], [1, 0, 0, 0]);
    assert_eq!(images[1].image().pixels()[..4], [0, 9, 0, 0]);
}

#[test]
fn default_layer_names_are_cut_at_their_length() {
    let data = PsdBuilder::new(2, 2)
        .layer(
            LayerSpec::new(0, 0, 1, 1)
                .name("Layer 1")
                .additional(b"lyid", &[0, 0, 0, 9])
                .raw(0, &[7])
        )
        .layer(LayerSpec::new(0, 0, 1, 1).name("Layer 2").raw(1, &[8]))
        .build();

    let mut decoder = PSDLayerDecoder::new(&data);
    let layers = decoder.decode_layers().unwrap();

    assert_eq!(layers[0].display_name(), "Layer 1");
    assert_eq!(layers[1].display_name(), "Layer 2");
    assert_eq!(layers[1].channels()[0].kind(), ChannelKind::Green);
}

#[test]
fn custom_policy_can_keep_the_mask() {
    let data = PsdBuilder::new(1, 1)
        .layer(
            LayerSpec::new(0, 0, 1, 1)
                .raw(0, &[1])
                .raw(1, &[2])
                .raw(2, &[3])
                .raw(-1, &[4])
                .raw(-2, &[5])
        )
        .build();

    let mask_as_alpha = |channel: ChannelKind| match channel {
        ChannelKind::Alpha => None,
        ChannelKind::Mask => Some(3),
        other => ChannelOrder::RGBA.offset(other)
    };
    let mut decoder = PSDLayerDecoder::new(&data);
    let layers = decoder.decode(&mask_as_alpha).unwrap();

    assert_eq!(layers[0].image().pixels(), [1, 2, 3, 5]);
}

#[test]
fn negative_layer_count() {
    let data = PsdBuilder::new(1, 1)
        .merged_alpha()
        .layer(LayerSpec::new(0, 0, 1, 1).raw(-1, &[7]))
        .layer(LayerSpec::new(0, 0, 1, 1).raw(-1, &[8]))
        .build();

    let mut decoder = PSDLayerDecoder::new(&data);
    assert_eq!(decoder.decode_layers().unwrap().len(), 2);
    assert!(decoder.first_alpha_is_merged_transparency());
}

#[test]
fn no_layers() {
    let data = PsdBuilder::new(3, 3).merged_image().build();

    let mut decoder = PSDLayerDecoder::new(&data);
    assert!(decoder.decode(&ChannelOrder::RGBA).unwrap().is_empty());
    assert_eq!(decoder.dimensions(), Some((3, 3)));
}

#[test]
fn bad_layers_are_reported_or_skipped() {
    let data = PsdBuilder::new(2, 1)
        .layer(LayerSpec::new(0, 0, 1, 2).raw(0, &[1, 2]))
        .layer(LayerSpec::new(0, 0, 1, 2).payload(0, vec![0, 2, 1, 2]))
        .layer(LayerSpec::new(0, 0, 1, 2).payload(1, vec![0, 1, 0, 2, 0xFF, 5, 0xFF, 6]))
        .build();

    let mut decoder = PSDLayerDecoder::new(&data);
    let err = decoder.decode(&ChannelOrder::RGBA).err().unwrap();

    assert!(matches!(
        err,
        LayerDecodeErrors::UnknownCompressionMode {
            layer:   1,
            channel: ChannelKind::Red,
            mode:    2
        }
    ));
    assert_eq!(err.layer(), Some(1));

    let mut decoder = PSDLayerDecoder::new(&data);
    let results = decoder.decode_lenient(&ChannelOrder::RGBA).unwrap();

    assert_eq!(results.len(), 3);
    assert!(results[0].1.is_ok());
    assert!(results[1].1.is_err());
    // the scanline table declares two bytes for a single row of two pixels
    let image = results[2].1.as_ref().ok().unwrap();
    assert_eq!(image.pixels(), [0, 5, 0, 0, 0, 5, 0, 0]);
}

#[test]
fn truncated_files_fail_cleanly() {
    let data = PsdBuilder::new(4, 2)
        .layer(LayerSpec::new(0, 0, 2, 4).name("a").rle(0, &[1, 1, 1, 1, 2, 3, 4, 5]))
        .layer(LayerSpec::new(0, 0, 1, 1).name("b").raw(-1, &[9]))
        .build();
    // drop the empty global mask info, layer payloads end right before it
    let payload_end = data.len() - 4;

    for cut in 0..payload_end {
        let mut decoder = PSDLayerDecoder::new(&data[..cut]);
        assert!(
            decoder.decode(&ChannelOrder::RGBA).is_err(),
            "decoding {cut} bytes succeeded"
        );
    }
    let mut decoder = PSDLayerDecoder::new(&data[..payload_end]);
    assert_eq!(decoder.decode(&ChannelOrder::RGBA).unwrap().len(), 2);
}

#[test]
fn unsupported_color_modes() {
    for mode in [2, 8, 42] {
        let data = PsdBuilder::new(1, 1).color_mode(mode).build();
        let err = PSDLayerDecoder::new(&data).decode_headers().unwrap_err();

        assert!(matches!(err, LayerDecodeErrors::UnsupportedColorMode(m) if m == mode));
    }
}

#[test]
fn grayscale_gray_goes_to_the_first_byte() {
    let data = PsdBuilder::new(2, 1)
        .color_mode(1)
        .layer(LayerSpec::new(0, 0, 1, 2).raw(0, &[11, 22]).raw(-1, &[255, 0]))
        .build();

    let mut decoder = PSDLayerDecoder::new(&data);
    let layers = decoder.decode(&ChannelOrder::RGBA).unwrap();

    assert_eq!(layers[0].image().pixels(), [11, 0, 0, 255, 22, 0, 0, 0]);
}

#[test]
fn dimension_limits_cover_canvas_and_layers() {
    let data = PsdBuilder::new(100, 10).build();
    let options = DecoderOptions::default().set_max_width(64);

    let err = PSDLayerDecoder::new_with_options(&data, options)
        .decode_headers()
        .unwrap_err();
    assert!(matches!(err, LayerDecodeErrors::LargeDimensions(64, 100)));

    let data = PsdBuilder::new(10, 10)
        .layer(LayerSpec::new(0, 0, 100, 1))
        .build();
    let options = DecoderOptions::default().set_max_height(64);

    let err = PSDLayerDecoder::new_with_options(&data, options)
        .decode_layers()
        .err()
        .unwrap();
    assert!(matches!(err, LayerDecodeErrors::LargeDimensions(64, 100)));
}
