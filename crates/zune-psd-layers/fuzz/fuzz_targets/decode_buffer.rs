#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    use zune_psd_layers::{ChannelOrder, PSDLayerDecoder};

    let mut decoder = PSDLayerDecoder::new(data);
    let _ = decoder.decode_lenient(&ChannelOrder::RGBA);
});
