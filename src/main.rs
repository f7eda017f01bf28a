fn main() {
    if let Err(e) = transcription_worker::run() {
        eprintln!("transcription-worker: {:#}", e);
        std::process::exit(1);
    }
}
