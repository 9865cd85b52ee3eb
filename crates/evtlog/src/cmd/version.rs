use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("evtlog {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: evtlog");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("EVTLOG_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("packet_version: {}", evtlog_frame::VERSION);
    println!("packet_size: {}", evtlog_frame::PACKET_SIZE);
    println!("frame_size_max: {}", evtlog_frame::FRAME_SIZE_MAX);
    println!("features: cli=true");

    Ok(SUCCESS)
}
