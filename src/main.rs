use std::io::Write;

use clap::Parser;
use miette::{Context, IntoDiagnostic, Result};
use owo_colors::OwoColorize;
use tracing::debug;

use clipcut::{
    cli::Args,
    clip::ClipRequest,
    logging::init_logging,
    outside::{ClipTransformer, Ffmpeg, SourceFetcher, Ytdl},
    progress::ProgressEvent,
    session::Session,
    types::{OutputMode, Timestamp},
};

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    init_logging(level)?;

    std::fs::create_dir_all(&args.out)
        .into_diagnostic()
        .wrap_err("Could not create out directory")?;

    let (fetcher, transformer) = load_external_components()?;
    let mut session = Session::new(fetcher, transformer, args.out.clone());

    match args.url.clone() {
        Some(url) => run_once(&mut session, &args, &url),
        None => run_interactive(&mut session, &args),
    }
}

/// Load the external components
fn load_external_components() -> Result<(Box<dyn SourceFetcher>, Box<dyn ClipTransformer>)> {
    // Construct the handles concurrently as executing an external program
    // is not instantaneous
    let ytdl_thread = std::thread::spawn(Ytdl::new);
    let ffmpeg_thread = std::thread::spawn(Ffmpeg::new);

    let ytdl = ytdl_thread.join().expect("Could not join thread")?;
    let ffmpeg = ffmpeg_thread.join().expect("Could not join thread")?;

    Ok((Box::new(ytdl), Box::new(ffmpeg)))
}

/// Cut a single clip from the CLI arguments and exit.
fn run_once(session: &mut Session, args: &Args, url: &str) -> Result<()> {
    match session.preview(url) {
        Ok(metadata) => println!("{metadata}"),
        Err(err) => debug!("No preview available: {}", err.user_message()),
    }

    let request = ClipRequest {
        url: url.to_owned(),
        start: args.start,
        end: args.end,
        mode: args.mode,
        name: args.name.clone(),
    };

    if !cut_and_save(session, &request) {
        std::process::exit(1);
    }
    Ok(())
}

/// Prompt loop: each iteration either cuts a new clip or serves one of the
/// session commands (`history`, `save <n>`, `quit`).
fn run_interactive(session: &mut Session, args: &Args) -> Result<()> {
    println!("{}", "clipcut".bold());
    println!("Paste a video URL to cut a clip.");
    println!("Commands: history, save <n>, quit\n");

    loop {
        let Some(line) = prompt("url> ")? else {
            break;
        };

        match line.as_str() {
            "" => continue,
            "q" | "quit" | "exit" => break,
            "history" => print_history(session),
            line if line.starts_with("save") => {
                save_from_history(session, line.strip_prefix("save").unwrap_or(""));
            }
            url => {
                if !clip_flow(session, args, url)? {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Gather the rest of a clip request interactively and run it.
/// Returns `false` when the user closed the input stream.
fn clip_flow(session: &mut Session, args: &Args, url: &str) -> Result<bool> {
    match session.preview(url) {
        Ok(metadata) => println!("{metadata}"),
        Err(err) => {
            println!("{}", "No preview available".yellow());
            debug!("Preview failed: {}", err.user_message());
        }
    }

    let Some(start) = prompt_timestamp("start", args.start)? else {
        return Ok(false);
    };
    let Some(end) = prompt_timestamp("end", args.end)? else {
        return Ok(false);
    };
    let Some(mode) = prompt_mode(args.mode)? else {
        return Ok(false);
    };
    let Some(name) = prompt("output name (empty for default)> ")? else {
        return Ok(false);
    };

    println!("Selected range: {start} to {end}");

    let request = ClipRequest {
        url: url.to_owned(),
        start,
        end,
        mode,
        name,
    };
    cut_and_save(session, &request);
    Ok(true)
}

/// Run the request and save the artifact. All lifecycle errors are
/// displayed here and never tear the session down.
fn cut_and_save(session: &mut Session, request: &ClipRequest) -> bool {
    let res = session.clip(request, &mut render_progress);
    // The progress line is carriage-returned in place, move past it
    println!();

    let artifact = match res {
        Ok(artifact) => artifact,
        Err(err) => {
            eprintln!("{}", err.user_message().red());
            if let Some(diagnostic) = err.diagnostic() {
                debug!("{diagnostic}");
            }
            return false;
        }
    };

    match session.deliver(&artifact) {
        Ok(path) => {
            println!("{} {}", "Saved".green(), path.display());
            true
        }
        Err(err) => {
            eprintln!("{}", err.user_message().red());
            false
        }
    }
}

fn render_progress(event: ProgressEvent) {
    match event {
        ProgressEvent::Transferring {
            downloaded_bytes, ..
        } => {
            match event.fraction() {
                Some(fraction) => print!("\rdownloading {:5.1}%", fraction * 100.0),
                None => print!("\rdownloading {} bytes", downloaded_bytes),
            }
            let _ = std::io::stdout().flush();
        }
        ProgressEvent::PostProcessing => {
            print!("\rmerging streams...  ");
            let _ = std::io::stdout().flush();
        }
    }
}

fn print_history(session: &Session) {
    if session.history().is_empty() {
        println!("No clips in this session yet");
        return;
    }
    for (i, entry) in session.history().entries().enumerate() {
        println!("{:>2}. {}", i + 1, entry.label);
    }
}

fn save_from_history(session: &Session, index_text: &str) {
    let Ok(index) = index_text.trim().parse::<usize>() else {
        eprintln!("{}", "Usage: save <n> (1 = most recent)".yellow());
        return;
    };
    if index == 0 {
        eprintln!("{}", "History entries start at 1".yellow());
        return;
    }

    match session.deliver_from_history(index - 1) {
        Ok(path) => println!("{} {}", "Saved".green(), path.display()),
        Err(err) => eprintln!("{}", err.user_message().red()),
    }
}

/// Read one trimmed line from stdin. `None` means the stream was closed.
fn prompt(label: &str) -> Result<Option<String>> {
    print!("{label}");
    std::io::stdout().flush().into_diagnostic()?;

    let mut line = String::new();
    let read = std::io::stdin()
        .read_line(&mut line)
        .into_diagnostic()
        .wrap_err("Could not read from stdin")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_owned()))
}

fn prompt_timestamp(label: &str, default: Timestamp) -> Result<Option<Timestamp>> {
    loop {
        let Some(line) = prompt(&format!("{label} [HH:MM:SS, default {default}]> "))? else {
            return Ok(None);
        };
        if line.is_empty() {
            return Ok(Some(default));
        }
        match line.parse() {
            Ok(tstamp) => return Ok(Some(tstamp)),
            Err(err) => eprintln!("{}", err.user_message().yellow()),
        }
    }
}

fn prompt_mode(default: OutputMode) -> Result<Option<OutputMode>> {
    let default_text = match default {
        OutputMode::VideoMp4 => "video",
        OutputMode::AudioMp3 => "audio",
    };
    loop {
        let Some(line) = prompt(&format!("output [video/audio, default {default_text}]> "))?
        else {
            return Ok(None);
        };
        match line.as_str() {
            "" => return Ok(Some(default)),
            "video" | "mp4" => return Ok(Some(OutputMode::VideoMp4)),
            "audio" | "mp3" => return Ok(Some(OutputMode::AudioMp3)),
            other => eprintln!("{}", format!("Unknown output '{other}'").yellow()),
        }
    }
}
