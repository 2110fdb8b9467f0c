/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use zune_tests::{LayerSpec, PsdBuilder};

/// A `width` x `height` plane mixing long runs with noise, like painted layers
pub fn painted_plane(width: usize, height: usize, seed: u32) -> Vec<u8> {
    let mut state = seed.wrapping_mul(0x9E37_79B9) | 1;

    (0..width * height)
        .map(|i| {
            if (i / width) % 4 == 0 || (i % width) < width / 2 {
                (seed as usize + i / 64) as u8
            } else {
                // xorshift
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                state as u8
            }
        })
        .collect()
}

/// A PSD file with `layers` RGBA layers covering the whole canvas
pub fn layered_psd(width: usize, height: usize, layers: usize, rle: bool) -> Vec<u8> {
    let mut builder = PsdBuilder::new(width as u32, height as u32);

    for layer in 0..layers {
        let mut spec = LayerSpec::new(0, 0, height as i32, width as i32).name(&format!("Layer {layer:02}"));

        for (code, seed) in [(0, 1), (1, 2), (2, 3), (-1, 4)] {
            let plane = painted_plane(width, height, (layer as u32) * 4 + seed);
            spec = if rle {
                spec.rle(code, &plane)
            } else {
                spec.raw(code, &plane)
            };
        }
        builder = builder.layer(spec);
    }
    builder.build()
}
