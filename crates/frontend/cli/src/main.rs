use anyhow::{bail, Context, Result};
use clap::Parser;
use pump_core::logging::{LogCategory, LogConfig, LogLevel, LogSink};
use pump_core::{Adapter, AdapterError};
use script::{Script, ScriptedHost, Snapshot};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

mod script;

/// Drive the pixelpump adapter without a libretro frontend
#[derive(Parser)]
struct Args {
    /// Number of frames to tick
    #[arg(long, default_value_t = 60)]
    frames: u32,

    /// JSON input script (see `Script`)
    #[arg(long)]
    script: Option<PathBuf>,

    /// Core option override, e.g. `--set pixelpump_pixel_format=XRGB8888`
    #[arg(long = "set", value_parser = parse_option)]
    options: Vec<(String, String)>,

    /// Refuse every pixel format the adapter declares
    #[arg(long, default_value_t = false)]
    reject_format: bool,

    /// Write the last presented frame as PNG
    #[arg(long)]
    output: Option<PathBuf>,

    /// Write a JSON run report
    #[arg(long)]
    report: Option<PathBuf>,

    /// Keep ticking after the adapter asks to shut down
    #[arg(long, default_value_t = false)]
    ignore_exit: bool,
}

fn parse_option(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    if key.trim().is_empty() {
        return Err(format!("empty option key in '{}'", s));
    }
    Ok((key.trim().to_string(), value.trim().to_string()))
}

/// Forwards adapter logs into the `log` facade
struct FacadeSink;

impl LogSink for FacadeSink {
    fn write(&self, category: LogCategory, level: LogLevel, message: &str) {
        let level = match level {
            LogLevel::Off => return,
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        };
        log::log!(target: "pixelpump", level, "[{:?}] {}", category, message);
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    LogConfig::global().set_sink(Box::new(FacadeSink));

    let script = match args.script.as_ref() {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading script {}", path.display()))?;
            Script::from_json(&text).with_context(|| format!("parsing script {}", path.display()))?
        }
        None => Script::default(),
    };
    let options: BTreeMap<String, String> = args.options.iter().cloned().collect();

    let mut host = ScriptedHost::new(options, args.reject_format);
    let mut adapter = Adapter::new();
    adapter.initialize();
    if let Err(e) = adapter.load_session(&mut host) {
        adapter.deinitialize();
        bail!("load failed: {}", e);
    }

    let mut ticked = 0;
    let mut events = 0;
    for frame in 0..args.frames {
        for step in script.steps_at(frame) {
            if let Some(usec) = host.apply(step) {
                adapter.set_frame_time(usec);
            }
        }
        let report = adapter.tick(&mut host);
        host.end_frame();
        ticked += 1;
        events += report.events;
        if report.exit_requested && !args.ignore_exit {
            log::info!("Shutdown requested at frame {}", frame);
            break;
        }
    }

    let av_info = adapter.av_info().ok_or(AdapterError::NoSession)?;
    let state = adapter.debug_state();
    adapter.unload_session();
    adapter.deinitialize();

    if let Some(path) = args.output.as_ref() {
        let snapshot = host
            .last_frame
            .as_ref()
            .context("no frame was presented")?;
        write_png(snapshot, path)?;
        println!("Wrote {}x{} frame to {}", snapshot.width, snapshot.height, path.display());
    }

    let report = serde_json::json!({
        "frames_ticked": ticked,
        "events": events,
        "av_info": av_info,
        "host": host.stats,
        "last_frame_format": host.last_frame.as_ref().map(|s| s.format),
        "adapter": state,
    });
    match args.report.as_ref() {
        Some(path) => {
            fs::write(path, serde_json::to_string_pretty(&report)?)
                .with_context(|| format!("writing report {}", path.display()))?;
        }
        None => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}

fn write_png(snapshot: &Snapshot, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), snapshot.width, snapshot.height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&snapshot.rgba)?;
    Ok(())
}
