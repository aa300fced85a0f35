//! Demo extractor plugin (spec §6): reads TS packets from stdin, follows
//! one DSM-CC object carousel PID, and writes each completed module to
//! `<output-directory>/module_XXXX.bin`.

use clap::Parser;
use dsmcc_carousel::carousel::CarouselController;
use dsmcc_carousel::demux::{SectionDemux, TS_PACKET_SIZE};
use std::cell::RefCell;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::rc::Rc;

#[derive(Parser, Debug)]
#[command(name = "dsmcc_extract", about = "Extract DSM-CC carousel modules from a TS stream")]
struct Args {
    /// PID carrying the DSM-CC object carousel.
    #[arg(long, value_parser = parse_pid)]
    pid: u16,

    /// Directory completed modules are written into.
    #[arg(long)]
    output_directory: PathBuf,
}

fn parse_pid(s: &str) -> Result<u16, String> {
    let s = s.trim();
    let value = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u16::from_str_radix(hex, 16)
    } else {
        s.parse()
    };
    value.map_err(|e| e.to_string())
}

fn main() {
    pretty_env_logger::init();
    let args = Args::parse();

    if let Err(e) = std::fs::create_dir_all(&args.output_directory) {
        eprintln!("cannot create output directory {:?}: {e}", args.output_directory);
        std::process::exit(1);
    }

    let controller = Rc::new(RefCell::new(CarouselController::new()));
    {
        let output_directory = args.output_directory.clone();
        controller.borrow_mut().on_module_complete(move |module| {
            let path = output_directory.join(format!("module_{:04X}.bin", module.module_id));
            match std::fs::File::create(&path).and_then(|mut f| f.write_all(&module.payload)) {
                Ok(()) => log::info!("wrote {:?} ({} bytes)", path, module.payload.len()),
                Err(e) => log::warn!("failed to write {:?}: {e}", path),
            }
        });
    }

    let mut demux = SectionDemux::new();
    demux.track_pid(args.pid);
    {
        let controller = controller.clone();
        demux.set_table_handler(move |table| controller.borrow_mut().handle_table(table));
    }
    {
        let controller = controller.clone();
        demux.set_section_handler(move |section| controller.borrow_mut().handle_section(section));
    }

    let mut stdin = std::io::stdin().lock();
    let mut packet = [0u8; TS_PACKET_SIZE];
    loop {
        match stdin.read_exact(&mut packet) {
            Ok(()) => demux.feed_packet(&packet),
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(e) => {
                eprintln!("read error: {e}");
                std::process::exit(1);
            }
        }
    }

    log::info!("final module status:\n{}", controller.borrow().list_modules());
}
