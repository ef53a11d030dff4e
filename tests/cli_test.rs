use assert_cmd::prelude::*;
use std::process::Command;
use tempfile;

type StdResult = Result<(), Box<dyn std::error::Error>>;

const SAMPLE: &[u8] = b"To be, or not to be, that is the question:\n\
Whether 'tis nobler in the mind to suffer\n\
The slings and arrows of outrageous fortune,\n\
Or to take arms against a sea of troubles.\n";

fn roundtrip(method: &str, data: &[u8]) -> StdResult {
    let temp_dir = tempfile::tempdir()?;
    let in_path = temp_dir.path().join("input.bin");
    let compressed_path = temp_dir.path().join("compressed.bin");
    let expanded_path = temp_dir.path().join("expanded.bin");
    std::fs::write(&in_path, data)?;

    Command::cargo_bin("losslesslab")?
        .arg("compress")
        .arg("-m").arg(method)
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&compressed_path)
        .assert()
        .success();

    Command::cargo_bin("losslesslab")?
        .arg("expand")
        .arg("-m").arg(method)
        .arg("-i").arg(&compressed_path)
        .arg("-o").arg(&expanded_path)
        .assert()
        .success();

    let expanded = std::fs::read(&expanded_path)?;
    assert_eq!(expanded, data);
    Ok(())
}

#[test]
fn huffman_roundtrip() -> StdResult {
    roundtrip("huffman", SAMPLE)
}

#[test]
fn lzss_roundtrip() -> StdResult {
    roundtrip("lzss", SAMPLE)
}

#[test]
fn rans_roundtrip() -> StdResult {
    roundtrip("rans", SAMPLE)
}

#[test]
fn huffman_roundtrip_empty_file() -> StdResult {
    roundtrip("huffman", &[])
}

#[test]
fn lzss_roundtrip_repetitive_data() -> StdResult {
    let data = "abcabcabcabc".repeat(2000);
    roundtrip("lzss", data.as_bytes())
}

#[test]
fn unsupported_method_fails() -> StdResult {
    let temp_dir = tempfile::tempdir()?;
    let in_path = temp_dir.path().join("input.bin");
    let out_path = temp_dir.path().join("out.bin");
    std::fs::write(&in_path, SAMPLE)?;

    Command::cargo_bin("losslesslab")?
        .arg("compress")
        .arg("-m").arg("bogus")
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&out_path)
        .assert()
        .failure();
    Ok(())
}
