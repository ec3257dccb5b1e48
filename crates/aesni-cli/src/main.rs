//! Command-line interface for AES-128-CBC.

#![forbid(unsafe_code)]

use std::fs;
use std::path::{Path, PathBuf};

use aesni_core::{decrypt, encrypt, hex_decode, AesKey, Backend, BLOCK_SIZE};
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// AES-128-CBC CLI.
#[derive(Parser)]
#[command(name = "aesni", version, author, about = "AES-128-CBC with hardware acceleration")]
struct Cli {
    /// Log debug output to stderr (overrides RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a pre-padded file.
    Enc(CipherArgs),
    /// Decrypt a file; padding is not removed.
    Dec(CipherArgs),
    /// Print the expanded round keys, one per line.
    Schedule {
        /// AES-128 key as 32 hex characters.
        #[arg(long, value_name = "HEX")]
        key_hex: String,
        /// Print the equivalent-inverse decryption keys instead.
        #[arg(long, default_value_t = false)]
        decryption: bool,
    },
    /// Round-trip random data with a random key and IV.
    Demo {
        /// Optional RNG seed for reproducibility.
        #[arg(long)]
        seed: Option<u64>,
        /// Number of 16-byte blocks to encrypt.
        #[arg(long, default_value_t = 2)]
        blocks: usize,
    },
    /// List backends and whether this CPU supports them.
    Backends,
}

#[derive(Args)]
struct CipherArgs {
    /// AES-128 key as 32 hex characters.
    #[arg(long, value_name = "HEX")]
    key_hex: String,
    /// Initialization vector as 32 hex characters.
    #[arg(long, value_name = "HEX")]
    iv_hex: String,
    /// Input file (length must be a multiple of 16 bytes).
    #[arg(long, value_name = "FILE")]
    input: PathBuf,
    /// Output file.
    #[arg(long, value_name = "FILE")]
    output: PathBuf,
    /// Backend to use: auto, portable, aes-ni or arm-crypto.
    #[arg(long, default_value = "auto")]
    backend: String,
}

#[derive(Clone, Copy)]
enum Direction {
    Encrypt,
    Decrypt,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Commands::Enc(args) => cmd_cipher(&args, Direction::Encrypt),
        Commands::Dec(args) => cmd_cipher(&args, Direction::Decrypt),
        Commands::Schedule {
            key_hex,
            decryption,
        } => cmd_schedule(&key_hex, decryption),
        Commands::Demo { seed, blocks } => cmd_demo(seed, blocks),
        Commands::Backends => cmd_backends(),
    }
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

fn cmd_cipher(args: &CipherArgs, direction: Direction) -> Result<()> {
    let backend = parse_backend(&args.backend)?;
    let key = load_key(&args.key_hex, backend)?;
    let iv = parse_hex_block(&args.iv_hex, "iv")?;
    let input = read_file(&args.input)?;
    log::info!(
        "{} {} bytes with the {} backend",
        match direction {
            Direction::Encrypt => "encrypting",
            Direction::Decrypt => "decrypting",
        },
        input.len(),
        key.backend()
    );

    let mut output = vec![0u8; input.len()];
    match direction {
        Direction::Encrypt => encrypt(&input, &mut output, &key, &iv).context("encrypt")?,
        Direction::Decrypt => decrypt(&mut output, &input, &key, &iv).context("decrypt")?,
    }
    fs::write(&args.output, output)
        .with_context(|| format!("write {}", args.output.display()))?;
    Ok(())
}

fn cmd_schedule(key_hex: &str, decryption: bool) -> Result<()> {
    let key = load_key(key_hex, None)?;
    let schedule = key.schedule();
    let round_keys = if decryption {
        schedule.decryption_keys()
    } else {
        schedule.encryption_keys()
    };
    for (round, round_key) in round_keys.iter().enumerate() {
        println!("{round:2}: {}", hex::encode(round_key));
    }
    Ok(())
}

fn cmd_demo(seed: Option<u64>, blocks: usize) -> Result<()> {
    if blocks == 0 {
        bail!("demo needs at least one block");
    }
    let mut rng = seeded_rng(seed);
    let mut key_bytes = [0u8; 16];
    let mut iv = [0u8; BLOCK_SIZE];
    let mut plaintext = vec![0u8; blocks * BLOCK_SIZE];
    rng.fill_bytes(&mut key_bytes);
    rng.fill_bytes(&mut iv);
    rng.fill_bytes(&mut plaintext);

    let key = AesKey::create(&key_bytes).context("create key")?;
    let mut ciphertext = vec![0u8; plaintext.len()];
    encrypt(&plaintext, &mut ciphertext, &key, &iv).context("encrypt")?;
    let mut decrypted = vec![0u8; ciphertext.len()];
    decrypt(&mut decrypted, &ciphertext, &key, &iv).context("decrypt")?;

    println!("backend: {}", key.backend());
    println!("demo key: {}", hex::encode(key_bytes));
    println!("iv: {}", hex::encode(iv));
    println!("plaintext: {}", hex::encode(&plaintext));
    println!("ciphertext: {}", hex::encode(&ciphertext));
    println!("decrypted: {}", hex::encode(&decrypted));
    if decrypted != plaintext {
        bail!("demo roundtrip failed");
    }
    Ok(())
}

fn cmd_backends() -> Result<()> {
    let selected = Backend::detect();
    for backend in Backend::ALL {
        let status = if backend.is_available() {
            "available"
        } else {
            "unavailable"
        };
        let marker = if backend == selected { " (selected)" } else { "" };
        println!("{backend:<12} {status}{marker}");
    }
    Ok(())
}

/// `auto` (or an empty string) defers to runtime detection.
fn parse_backend(name: &str) -> Result<Option<Backend>> {
    match name.trim() {
        "" | "auto" => Ok(None),
        other => other
            .parse::<Backend>()
            .map(Some)
            .with_context(|| format!("unknown backend `{other}`")),
    }
}

fn load_key(key_hex: &str, backend: Option<Backend>) -> Result<AesKey> {
    let raw = parse_hex_block(key_hex, "key")?;
    let key = match backend {
        Some(backend) => AesKey::create_with_backend(&raw, backend),
        None => AesKey::create(&raw),
    };
    key.context("create key")
}

fn parse_hex_block(hex_str: &str, what: &str) -> Result<[u8; BLOCK_SIZE]> {
    let bytes = hex_decode(hex_str.trim()).with_context(|| format!("decode {what} hex"))?;
    if bytes.len() != BLOCK_SIZE {
        bail!("{what} must be 16 bytes (32 hex characters)");
    }
    let mut block = [0u8; BLOCK_SIZE];
    block.copy_from_slice(&bytes);
    Ok(block)
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    let data = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    if data.len() % BLOCK_SIZE != 0 {
        bail!(
            "{} is {} bytes; input length must be a multiple of {BLOCK_SIZE} bytes",
            path.display(),
            data.len()
        );
    }
    Ok(data)
}

fn seeded_rng(seed: Option<u64>) -> ChaCha20Rng {
    match seed {
        Some(value) => ChaCha20Rng::seed_from_u64(value),
        None => {
            let mut seed_bytes = [0u8; 32];
            rand::rngs::OsRng.fill_bytes(&mut seed_bytes);
            ChaCha20Rng::from_seed(seed_bytes)
        }
    }
}
