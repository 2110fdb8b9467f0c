/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use clap::builder::PossibleValue;
use clap::{value_parser, Arg, ArgAction, Command, ValueEnum};

/// How extracted layers are written to disk
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputFormat {
    Png,
    /// Binary PPM (P6), alpha is dropped
    Ppm,
    Raw
}

impl ValueEnum for OutputFormat {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Png, Self::Ppm, Self::Raw]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        Some(match self {
            Self::Png => PossibleValue::new("png"),
            Self::Ppm => PossibleValue::new("ppm"),
            Self::Raw => PossibleValue::new("raw")
        })
    }
}

/// Byte order of raw pixels
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PixelOrder {
    Rgba,
    Bgra
}

impl PixelOrder {
    pub const fn extension(self) -> &'static str {
        match self {
            PixelOrder::Rgba => "rgba",
            PixelOrder::Bgra => "bgra"
        }
    }
}

impl ValueEnum for PixelOrder {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Rgba, Self::Bgra]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        Some(match self {
            Self::Rgba => PossibleValue::new("rgba"),
            Self::Bgra => PossibleValue::new("bgra")
        })
    }
}

#[rustfmt::skip]
pub fn create_cmd_args() -> Command {
    Command::new("zune-layers")
        .about("Extract every layer of a PSD file into its own image")
        .arg(Arg::new("in")
            .short('i')
            .long("input")
            .help("Input PSD file to read layers from")
            .value_parser(value_parser!(std::path::PathBuf))
            .required(true))
        .arg(Arg::new("out")
            .short('o')
            .long("out")
            .help("Directory to write layers to")
            .long_help("Directory to write layers to, created if missing.\nLayers are named by a counter starting at 1, e.g 001.png")
            .value_parser(value_parser!(std::path::PathBuf))
            .default_value("."))
        .arg(Arg::new("format")
            .long("format")
            .help("Format of the extracted layers")
            .value_parser(value_parser!(OutputFormat))
            .default_value("png"))
        .arg(Arg::new("order")
            .long("order")
            .help("Byte order of raw pixels")
            .long_help("Byte order of raw pixels, ignored for png and ppm which are always RGB(A)")
            .value_parser(value_parser!(PixelOrder))
            .default_value("rgba"))
        .arg(Arg::new("debug")
            .long("debug")
            .action(ArgAction::SetTrue)
            .help_heading("LOGGING")
            .help("Display debug information and higher"))
        .arg(Arg::new("trace")
            .long("trace")
            .action(ArgAction::SetTrue)
            .help_heading("LOGGING")
            .help("Display very verbose information"))
        .arg(Arg::new("warn")
            .long("warn")
            .action(ArgAction::SetTrue)
            .help_heading("LOGGING")
            .help("Display warnings and errors"))
        .arg(Arg::new("info")
            .long("info")
            .action(ArgAction::SetTrue)
            .help_heading("LOGGING")
            .help("Display information about the decoding options"))
        .arg(Arg::new("max-width")
            .long("max-width")
            .help_heading("ADVANCED")
            .help("Maximum width of the canvas and of any layer")
            .value_parser(value_parser!(usize))
            .default_value("16384"))
        .arg(Arg::new("max-height")
            .long("max-height")
            .help_heading("ADVANCED")
            .help("Maximum height of the canvas and of any layer")
            .value_parser(value_parser!(usize))
            .default_value("16384"))
        .arg(Arg::new("lenient")
            .long("lenient")
            .action(ArgAction::SetTrue)
            .help_heading("ADVANCED")
            .help("Skip layers whose pixels cannot be decoded instead of stopping"))
}
