pub mod paths;
pub mod pcm_writer;
pub mod wav_file;
