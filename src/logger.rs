use log::{Level, Log, Metadata, Record};

/// Routes `log` records to the JS console on wasm32 and to stdio natively.
/// Only this crate's records are emitted; dependency chatter is dropped.
struct WorkerLogger;

const CRATE_TARGET: &str = env!("CARGO_CRATE_NAME");

fn is_worker_target(target: &str) -> bool {
    target == CRATE_TARGET
        || target
            .strip_prefix(CRATE_TARGET)
            .is_some_and(|rest| rest.starts_with("::"))
}

// `entropy_keys_worker::handlers::handle_sign_message` -> `handlers::handle_sign_message`
fn short_target(target: &str) -> &str {
    target
        .strip_prefix(CRATE_TARGET)
        .and_then(|rest| rest.strip_prefix("::"))
        .unwrap_or(target)
}

fn format_record(record: &Record) -> String {
    format!(
        "[entropy-keys] [{}] [{}] {}",
        record.level(),
        short_target(record.target()),
        record.args()
    )
}

static LOGGER: WorkerLogger = WorkerLogger;

/// Install the worker logger. Safe to call more than once; only the first
/// call installs, later calls just adjust the level.
pub fn init(level: Level) {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level.to_level_filter());
}

impl Log for WorkerLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level() && is_worker_target(metadata.target())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let message = format_record(record);
        match record.level() {
            Level::Error => console::error(&message),
            Level::Warn => console::warn(&message),
            _ => console::log(&message),
        }
    }

    fn flush(&self) {}
}

#[cfg(target_arch = "wasm32")]
mod console {
    use wasm_bindgen::prelude::*;

    #[wasm_bindgen]
    extern "C" {
        #[wasm_bindgen(js_namespace = console)]
        pub fn log(s: &str);

        #[wasm_bindgen(js_namespace = console, js_name = warn)]
        pub fn warn(s: &str);

        #[wasm_bindgen(js_namespace = console, js_name = error)]
        pub fn error(s: &str);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod console {
    pub fn log(s: &str) {
        println!("{s}");
    }

    pub fn warn(s: &str) {
        eprintln!("{s}");
    }

    pub fn error(s: &str) {
        eprintln!("{s}");
    }
}
