//! Tiny audio payloads for speech-to-text probes.

use bytes::{BufMut, Bytes, BytesMut};

const SAMPLE_RATE: u32 = 16_000;
const CHANNELS: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;

/// A mono 16 kHz 16-bit PCM WAV file of `duration_ms` milliseconds of silence.
pub fn silent_wav(duration_ms: u32) -> Bytes {
    let block_align = CHANNELS * (BITS_PER_SAMPLE / 8);
    let byte_rate = SAMPLE_RATE * u32::from(block_align);
    let samples = SAMPLE_RATE / 1000 * duration_ms;
    let data_len = samples * u32::from(block_align);

    let mut buf = BytesMut::with_capacity(44 + data_len as usize);
    buf.put_slice(b"RIFF");
    buf.put_u32_le(36 + data_len);
    buf.put_slice(b"WAVE");

    buf.put_slice(b"fmt ");
    buf.put_u32_le(16);
    buf.put_u16_le(1); // PCM
    buf.put_u16_le(CHANNELS);
    buf.put_u32_le(SAMPLE_RATE);
    buf.put_u32_le(byte_rate);
    buf.put_u16_le(block_align);
    buf.put_u16_le(BITS_PER_SAMPLE);

    buf.put_slice(b"data");
    buf.put_u32_le(data_len);
    buf.put_bytes(0, data_len as usize);

    buf.freeze()
}
