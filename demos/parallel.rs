//! Decodes several GIF files in parallel, one decoder per file

use gif_frames::{DecodeOptions, DecodingError, Frame, Repeat};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use std::env;
use std::fs::File;
use std::path::PathBuf;

struct Summary {
    path: PathBuf,
    frames: usize,
    duration_ms: u64,
    repeat: Repeat,
}

fn summarize(path: PathBuf) -> Result<Summary, DecodingError> {
    let decoder = DecodeOptions::new().read_info(File::open(&path)?)?;
    let mut frames = 0;
    let mut duration_ms = 0;
    let mut repeat = Repeat::Infinite;
    for frame in decoder {
        let frame: Frame = frame?;
        frames += 1;
        duration_ms += u64::from(frame.delay_ms);
        repeat = frame.repeat();
    }
    Ok(Summary {
        path,
        frames,
        duration_ms,
        repeat,
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let paths: Vec<PathBuf> = env::args_os().skip(1).map(PathBuf::from).collect();
    if paths.is_empty() {
        return Err("Specify one or more GIF paths as arguments".into());
    }

    let start = std::time::Instant::now();

    // every file gets its own decoder and working buffers, nothing is shared
    let results: Vec<_> = paths
        .into_par_iter()
        .map(|path| (path.clone(), summarize(path)))
        .collect();

    for (path, result) in results {
        match result {
            Ok(summary) => println!(
                "{}: {} frames, {}ms per loop, {:?}",
                summary.path.display(),
                summary.frames,
                summary.duration_ms,
                summary.repeat
            ),
            Err(err) => eprintln!("{}: {err}", path.display()),
        }
    }

    let seconds = start.elapsed().as_millis() as f64 / 1000.;
    eprintln!(
        "Finished in {seconds:0.2}s{}",
        if cfg!(debug_assertions) {
            ". Run with --release for more speed."
        } else {
            ""
        }
    );
    Ok(())
}
