use clap::{arg, crate_version, Command};
use losslesslab::{huffman, lzss, rans};

const RCH: &str = "unreachable was reached";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let long_help = "Examples:
---------
Compress:      `losslesslab compress -m huffman -i my_file -o my_file.huf`
Expand:        `losslesslab expand -m huffman -i my_file.huf -o my_file`";

    let methods = ["huffman", "lzss", "rans"];

    let mut main_cmd = Command::new("losslesslab")
        .about("Compress and expand with classical lossless codecs")
        .after_long_help(long_help)
        .version(crate_version!());
    main_cmd = main_cmd.subcommand(
        Command::new("compress")
            .arg(arg!(-m --method <METHOD> "compression algorithm").value_parser(methods).required(true))
            .arg(arg!(-i --input <PATH> "input path").required(true))
            .arg(arg!(-o --output <PATH> "output path").required(true))
            .about("compress a file"),
    );
    main_cmd = main_cmd.subcommand(
        Command::new("expand")
            .arg(arg!(-m --method <METHOD> "compression algorithm").value_parser(methods).required(true))
            .arg(arg!(-i --input <PATH> "input path").required(true))
            .arg(arg!(-o --output <PATH> "output path").required(true))
            .about("expand a file"),
    );

    let matches = main_cmd.get_matches();

    if let Some(cmd) = matches.subcommand_matches("compress") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let path_out = cmd.get_one::<String>("output").expect(RCH);
        let method = cmd.get_one::<String>("method").expect(RCH);
        let dat = std::fs::read(path_in)?;
        let compressed: Vec<u8> = match method.as_str() {
            "huffman" => huffman::compress(&dat)?,
            "lzss" => lzss::compress(&dat)?,
            "rans" => rans::compress(&dat)?,
            _ => {
                eprintln!("{} not supported", method);
                return Err(Box::new(std::fmt::Error));
            }
        };
        std::fs::write(path_out, compressed)?;
    }

    if let Some(cmd) = matches.subcommand_matches("expand") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let path_out = cmd.get_one::<String>("output").expect(RCH);
        let method = cmd.get_one::<String>("method").expect(RCH);
        let dat = std::fs::read(path_in)?;
        let expanded: Vec<u8> = match method.as_str() {
            "huffman" => huffman::decompress(&dat)?,
            "lzss" => lzss::decompress(&dat)?,
            "rans" => rans::decompress(&dat)?,
            _ => {
                eprintln!("{} not supported", method);
                return Err(Box::new(std::fmt::Error));
            }
        };
        std::fs::write(path_out, expanded)?;
    }

    Ok(())
}
