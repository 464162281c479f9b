#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = try_decode(data);
});

fn try_decode(data: &[u8]) -> Result<(), gif_frames::DecodingError> {
    let mut options = gif_frames::DecodeOptions::new();
    options.set_memory_limit(gif_frames::MemoryLimit::Bytes(8_000_000.try_into().unwrap()));
    let mut reader = options.read_info(data)?;
    let screen = usize::from(reader.width()) * usize::from(reader.height());

    while let Some(frame) = reader.read_next_frame()? {
        assert_eq!(frame.pixel_data.as_ref().map_or(0, Vec::len), screen);
    }

    Ok(())
}
