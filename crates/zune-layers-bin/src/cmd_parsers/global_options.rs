/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::path::PathBuf;

use clap::ArgMatches;
use log::{info, warn, Level};
use zune_core::options::DecoderOptions;

use crate::cmd_args::{OutputFormat, PixelOrder};

#[derive(Debug, Clone)]
pub struct CmdOptions {
    pub input:       PathBuf,
    pub out_dir:     PathBuf,
    pub format:      OutputFormat,
    pub order:       PixelOrder,
    pub max_width:   usize,
    pub max_height:  usize,
    pub strict_mode: bool
}

impl CmdOptions {
    pub fn new() -> CmdOptions {
        CmdOptions {
            input:       PathBuf::new(),
            out_dir:     PathBuf::from("."),
            format:      OutputFormat::Png,
            order:       PixelOrder::Rgba,
            max_width:   1 << 14,
            max_height:  1 << 14,
            strict_mode: true
        }
    }

    pub fn decoder_options(&self) -> DecoderOptions {
        DecoderOptions::default()
            .set_max_width(self.max_width)
            .set_max_height(self.max_height)
            .set_strict_mode(self.strict_mode)
    }
}

pub fn parse_options(options: &ArgMatches) -> CmdOptions {
    let mut cmd_options = CmdOptions::new();

    if let Some(input) = options.get_one::<PathBuf>("in") {
        cmd_options.input.clone_from(input);
    }
    if let Some(out) = options.get_one::<PathBuf>("out") {
        cmd_options.out_dir.clone_from(out);
    }
    if let Some(format) = options.get_one::<OutputFormat>("format") {
        cmd_options.format = *format;
    }
    if let Some(order) = options.get_one::<PixelOrder>("order") {
        cmd_options.order = *order;
    }
    if cmd_options.format != OutputFormat::Raw && cmd_options.order != PixelOrder::Rgba {
        warn!(
            "{:?} layers are always written in RGB order, ignoring --order",
            cmd_options.format
        );
        cmd_options.order = PixelOrder::Rgba;
    }
    if let Some(width) = options.get_one::<usize>("max-width") {
        cmd_options.max_width = *width;
    }
    if let Some(height) = options.get_one::<usize>("max-height") {
        cmd_options.max_height = *height;
    }
    if options.get_flag("lenient") {
        info!("Skipping layers that fail to decode");
        cmd_options.strict_mode = false;
    }
    cmd_options
}

/// Set up logging options
pub fn setup_logger(options: &ArgMatches) {
    let log_level = if options.get_flag("debug") {
        Level::Debug
    } else if options.get_flag("trace") {
        Level::Trace
    } else if options.get_flag("warn") {
        Level::Warn
    } else if options.get_flag("info") {
        Level::Info
    } else {
        Level::Warn
    };

    if let Err(err) = simple_logger::init_with_level(log_level) {
        eprintln!("Could not initialize logger: {err}");
        return;
    }

    info!("Initialized logger");
    info!("Log level :{}", log_level);
}
