use std::{env, process, thread};
use chrysalis::{Config, Engine};
use tracing_subscriber::EnvFilter;

const STACK_SIZE: usize = 256 * 1024 * 1024;
const MAX_DEPTH: usize = 10_000;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let files = env::args().skip(1).collect::<Vec<_>>();

    // Room for `MAX_DEPTH` levels of evaluation even in debug builds.
    let handle = thread::Builder::new()
        .stack_size(STACK_SIZE)
        .spawn(move || run(files))
        .unwrap_or_else(|err| panic!("Could not spawn interpreter thread: {:?}", err));

    if !handle.join().unwrap_or(false) {
        process::exit(1);
    }
}

fn run(files: Vec<String>) -> bool {
    let config = Config {
        max_depth: MAX_DEPTH,
        echo: files.is_empty(),
        ..Config::default()
    };
    let mut engine = Engine::new(config);
    if files.is_empty() {
        engine.repl_stdin();
        return true;
    }

    let mut ok = true;
    for file in &files {
        if let Err(err) = engine.load(file) {
            eprintln!("{}", err);
            ok = false;
        }
    }
    ok
}
