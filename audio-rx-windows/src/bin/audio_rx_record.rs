//! Record from the default microphone and print capture events as JSON lines.
//!
//! ```text
//! audio-rx-record [OPTIONS_JSON]     record until max duration or Enter
//! audio-rx-record --list-devices     print capture endpoints
//! ```
//!
//! `OPTIONS_JSON` takes the same keys as a host's `init` call, e.g.
//! `{"sampleRate": 16000, "maxDuration": 5, "reportVolume": true}`.

use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();
    let args: Vec<String> = std::env::args().skip(1).collect();

    match app::run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(target_os = "windows")]
mod app {
    use std::io::BufRead;
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::thread;

    use parking_lot::Mutex;

    use audio_rx_core::{CaptureError, CaptureEvent, CaptureOptions, ChannelEventSink, Recorder};
    use audio_rx_windows::{capture_devices, WasapiMicProvider};

    pub fn run(args: &[String]) -> Result<(), CaptureError> {
        if args.first().map(String::as_str) == Some("--list-devices") {
            for device in capture_devices()? {
                println!(
                    "{}{}  {}  ({:?})",
                    if device.is_default { "* " } else { "  " },
                    device.name,
                    device.id,
                    device.transport_type
                );
            }
            return Ok(());
        }

        let options = match args.first() {
            Some(json) => CaptureOptions::from_json(json)?,
            None => CaptureOptions::default(),
        };

        let (tx, rx) = mpsc::channel();
        let mut recorder = Recorder::with_default_storage(WasapiMicProvider::default_device());
        log::info!("storing recordings in {}", recorder.storage_dir().display());
        recorder.subscribe(Arc::new(ChannelEventSink::new(tx)));
        recorder.init(&options)?;
        recorder.start()?;

        let recorder = Arc::new(Mutex::new(recorder));
        let stopper = Arc::clone(&recorder);
        thread::Builder::new()
            .name("stdin-stop".into())
            .spawn(move || {
                let mut line = String::new();
                if std::io::stdin().lock().read_line(&mut line).is_ok() {
                    stopper.lock().stop();
                }
            })
            .map_err(|e| CaptureError::Unknown(format!("failed to spawn stdin reader: {}", e)))?;

        for event in rx {
            let terminal = event.is_terminal();
            let line = serde_json::json!({ "event": event.name(), "data": event.to_json() });
            println!("{}", line);
            if terminal {
                break;
            }
        }

        recorder.lock().wait();
        Ok(())
    }
}

#[cfg(not(target_os = "windows"))]
mod app {
    use audio_rx_core::CaptureError;

    pub fn run(_args: &[String]) -> Result<(), CaptureError> {
        Err(CaptureError::DeviceUnavailable(
            "audio-rx-record needs the WASAPI backend, which is only available on Windows".into(),
        ))
    }
}
