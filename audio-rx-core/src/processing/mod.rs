pub mod loudness;
pub mod ring_buffer;
pub mod wav_format;
