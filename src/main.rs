// main.rs      gifanim command
//
// Copyright (c) 2019  Douglas Lau
//
#![forbid(unsafe_code)]

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use gifanim::block::{Block, DisposalMethod, GraphicControl, ImageDesc};
use gifanim::{probe, Animation, Decoder};
use pix::rgb::SRgba8;
use std::error::Error;
use std::ffi::OsStr;
use std::fs::File;
use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Crate version
const VERSION: &str = std::env!("CARGO_PKG_VERSION");

/// One image with its graphic control
struct FrameInfo {
    graphic_control: Option<GraphicControl>,
    image_desc: ImageDesc,
    local_colors: Option<usize>,
}

/// Main entry point
fn main() -> Result<(), Box<dyn Error>> {
    env_logger::builder().format_timestamp(None).init();
    let mut out = StandardStream::stdout(ColorChoice::Always);
    match create_app().get_matches().subcommand() {
        ("show", Some(matches)) => show(&mut out, matches)?,
        ("size", Some(matches)) => size(&mut out, matches)?,
        ("frames", Some(matches)) => frames(&mut out, matches)?,
        _ => unreachable!(),
    }
    out.reset()?;
    Ok(())
}

/// Create clap App
fn create_app() -> App<'static, 'static> {
    App::new("gifanim")
        .version(VERSION)
        .setting(AppSettings::GlobalVersion)
        .about("GIF animation utility")
        .setting(AppSettings::ArgRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("show")
                .about("Show GIF block table")
                .arg(
                    Arg::with_name("files")
                        .required(true)
                        .min_values(1)
                        .help("input file(s)"),
                ),
        )
        .subcommand(
            SubCommand::with_name("size")
                .about("Show logical screen size")
                .arg(
                    Arg::with_name("files")
                        .required(true)
                        .min_values(1)
                        .help("input file(s)"),
                ),
        )
        .subcommand(
            SubCommand::with_name("frames")
                .about("Decode composited frames and show timing")
                .arg(Arg::with_name("file").required(true).help("input file")),
        )
}

/// Color specs for output
struct Colors {
    dflt: ColorSpec,
    bold: ColorSpec,
    red: ColorSpec,
    yellow: ColorSpec,
    cyan: ColorSpec,
    magenta: ColorSpec,
}

impl Colors {
    fn new() -> Self {
        let mut dflt = ColorSpec::new();
        dflt.set_fg(Some(Color::White));
        let mut bold = ColorSpec::new();
        bold.set_fg(Some(Color::White))
            .set_intense(true)
            .set_bold(true);
        let mut red = ColorSpec::new();
        red.set_fg(Some(Color::Red)).set_intense(true);
        let mut yellow = ColorSpec::new();
        yellow.set_fg(Some(Color::Yellow)).set_intense(true);
        let mut cyan = ColorSpec::new();
        cyan.set_fg(Some(Color::Cyan)).set_intense(true);
        let mut magenta = ColorSpec::new();
        magenta.set_fg(Some(Color::Magenta));
        Colors {
            dflt,
            bold,
            red,
            yellow,
            cyan,
            magenta,
        }
    }
}

/// Handle show subcommand
fn show(
    out: &mut StandardStream,
    matches: &ArgMatches,
) -> Result<(), Box<dyn Error>> {
    if let Some(values) = matches.values_of_os("files") {
        for path in values {
            show_file(out, path)?;
        }
    }
    Ok(())
}

/// Show one GIF file
fn show_file(
    out: &mut StandardStream,
    path: &OsStr,
) -> Result<(), Box<dyn Error>> {
    let clr = Colors::new();
    let mut blocks = Decoder::new(File::open(&path)?).into_blocks();
    let preamble = blocks.preamble()?.clone();
    let mut frames = vec![];
    let mut comments = vec![];
    let mut loop_count = None;
    let mut graphic_control = None;
    for block in blocks {
        match block? {
            Block::GraphicControl(gc) => graphic_control = Some(gc),
            Block::Comment(c) => {
                for l in c.to_string_lossy().split('\n') {
                    let l = l.trim();
                    if !l.is_empty() {
                        comments.push(l.to_string());
                    }
                }
            }
            Block::Application(ap) => {
                if let Some(c) = ap.loop_count() {
                    loop_count = Some(c);
                }
            }
            Block::Image(img) => frames.push(FrameInfo {
                graphic_control: graphic_control.take(),
                image_desc: img.desc().clone(),
                local_colors: img.local_color_table().map(|t| t.len()),
            }),
            _ => (),
        }
    }
    let frame_digits = digits(frames.len()).max(3);
    let width = preamble.screen_width();
    let height = preamble.screen_height();
    let size_digits = 4.max(1 + digits(width) + digits(height));
    let gif = String::from_utf8_lossy(&preamble.header.version()).to_string();
    out.set_color(&clr.magenta)?;
    writeln!(out, "{:?}", path)?;
    out.set_color(&clr.bold)?;
    write!(out, "GIF{}, {}x{}, frames: {}", gif, width, height, frames.len())?;
    if let Some(c) = loop_count {
        write!(out, ", repeat: ")?;
        if c == 0 {
            write!(out, "∞")?;
        } else {
            write!(out, "{}", c)?;
        }
    }
    writeln!(out)?;
    out.set_color(&clr.cyan)?;
    for c in comments {
        writeln!(out, "  # {}", c)?;
    }
    out.set_color(&clr.yellow)?;
    write!(out, " {:>w$}", "Fr#", w = frame_digits)?;
    write!(out, "  Delay Disp")?;
    write!(out, " {:>w$}", "Size", w = size_digits)?;
    write!(out, " {:>w$}", "X,Y", w = size_digits)?;
    writeln!(out, " Clrs Trn")?;
    let global_clr = preamble.global_color_table.len();
    for (n, f) in frames.iter().enumerate() {
        show_frame(
            f,
            out,
            &clr,
            (width, height),
            global_clr,
            n,
            (frame_digits, size_digits),
        )?;
    }
    Ok(())
}

/// Show one frame of a GIF file
fn show_frame(
    frame: &FrameInfo,
    out: &mut StandardStream,
    clr: &Colors,
    screen: (u16, u16),
    global_clr: usize,
    number: usize,
    (frame_digits, size_digits): (usize, usize),
) -> Result<(), Box<dyn Error>> {
    let desc = &frame.image_desc;
    out.set_color(&clr.dflt)?;
    write!(out, "{}", if desc.interlaced() { 'i' } else { ' ' })?;
    out.set_color(&clr.bold)?;
    write!(out, "{:>w$}", number, w = frame_digits)?;
    let d = frame
        .graphic_control
        .map(|gc| gc.delay_time_cs())
        .unwrap_or_default();
    if d == 0 {
        out.set_color(&clr.dflt)?;
    }
    write!(out, " {:6.2}", f32::from(d) / 100f32)?;
    let d = match frame.graphic_control.map(|gc| gc.disposal_method()) {
        Some(DisposalMethod::Unspecified) => "none",
        Some(DisposalMethod::DoNotDispose) => "keep",
        Some(DisposalMethod::RestoreBackground) => "bg",
        Some(DisposalMethod::RestorePrevious) => "prev",
        None => "-",
    };
    out.set_color(match d {
        "none" | "-" => &clr.dflt,
        _ => &clr.bold,
    })?;
    write!(out, " {:>4}", d)?;
    if screen == (desc.width(), desc.height()) {
        out.set_color(&clr.dflt)?;
    } else {
        out.set_color(&clr.bold)?;
    }
    write!(
        out,
        " {:>w$}",
        &format!("{}x{}", desc.width(), desc.height()),
        w = size_digits
    )?;
    if desc.left() == 0 && desc.top() == 0 {
        out.set_color(&clr.dflt)?;
    } else {
        out.set_color(&clr.bold)?;
    }
    write!(
        out,
        " {:>w$}",
        &format!("{},{}", desc.left(), desc.top()),
        w = size_digits
    )?;
    match frame.local_colors {
        Some(c) => {
            out.set_color(&clr.bold)?;
            write!(out, "  {:3}", c)?;
        }
        None => {
            out.set_color(&clr.dflt)?;
            write!(out, " {:3}g", global_clr)?;
        }
    }
    match frame.graphic_control.and_then(|gc| gc.transparent_color()) {
        Some(tc) => {
            out.set_color(&clr.bold)?;
            writeln!(out, " {:>3}", tc)?;
        }
        None => {
            out.set_color(&clr.dflt)?;
            writeln!(out, " {:>3}", "-")?;
        }
    }
    Ok(())
}

/// Handle size subcommand
fn size(
    out: &mut StandardStream,
    matches: &ArgMatches,
) -> Result<(), Box<dyn Error>> {
    let clr = Colors::new();
    if let Some(values) = matches.values_of_os("files") {
        for path in values {
            out.set_color(&clr.magenta)?;
            write!(out, "{:?}", path)?;
            match probe(File::open(&path)?) {
                Some((width, height)) => {
                    out.set_color(&clr.bold)?;
                    writeln!(out, " {}x{}", width, height)?;
                }
                None => {
                    out.set_color(&clr.red)?;
                    writeln!(out, " not a GIF")?;
                }
            }
        }
    }
    Ok(())
}

/// Handle frames subcommand
fn frames(
    out: &mut StandardStream,
    matches: &ArgMatches,
) -> Result<(), Box<dyn Error>> {
    let clr = Colors::new();
    let path = match matches.value_of_os("file") {
        Some(path) => path,
        None => return Ok(()),
    };
    let anim = Animation::decode(File::open(path)?)?;
    out.set_color(&clr.magenta)?;
    writeln!(out, "{:?}", path)?;
    out.set_color(&clr.bold)?;
    writeln!(
        out,
        "{}x{}, frames: {}, total: {} ms",
        anim.width(),
        anim.height(),
        anim.len(),
        anim.total_time_ms()
    )?;
    let frame_digits = digits(anim.len()).max(3);
    out.set_color(&clr.yellow)?;
    writeln!(out, " {:>w$}  Delay Opaque", "Fr#", w = frame_digits)?;
    for (n, (raster, delay_ms)) in anim.frames().enumerate() {
        let clear = SRgba8::new(0, 0, 0, 0);
        let opaque = raster.pixels().iter().filter(|p| **p != clear).count();
        out.set_color(&clr.bold)?;
        write!(out, " {:>w$}", n, w = frame_digits)?;
        out.set_color(&clr.dflt)?;
        writeln!(out, " {:6} {:6}", delay_ms, opaque)?;
    }
    Ok(())
}

/// Calculate digits in a number
fn digits<T: Into<usize>>(v: T) -> usize {
    let v = v.into();
    match v {
        0..=9 => 1,
        10..=99 => 2,
        100..=999 => 3,
        1000..=9999 => 4,
        _ => 5,
    }
}
