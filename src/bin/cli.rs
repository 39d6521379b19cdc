//! widebridge CLI
//!
//! Inspect how values encode for the store.

use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};
use widebridge::{build_range, BoundaryMode, Result, SerializerRegistry, Value, ValueType};

/// widebridge CLI
#[derive(Parser, Debug)]
#[command(name = "widebridge-cli")]
#[command(about = "Inspect wide-column value encodings")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encode a value and print it as hex
    Encode {
        /// Value type (utf8, int64, uuid, ...)
        value_type: String,

        /// The value, in its text form
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Decode hex bytes and print the value
    Decode {
        /// Value type (utf8, int64, uuid, ...)
        value_type: String,

        /// Encoded bytes as hex
        hex: String,
    },

    /// Print the encoded slice bounds between two scalar column names
    Range {
        /// Column name type
        value_type: String,

        #[arg(allow_hyphen_values = true)]
        start: String,

        #[arg(allow_hyphen_values = true)]
        end: String,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,widebridge=info"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();
    let registry = SerializerRegistry::new();

    if let Err(e) = run(&registry, args.command) {
        tracing::error!("{}", e);
        process::exit(1);
    }
}

fn run(registry: &SerializerRegistry, command: Commands) -> Result<()> {
    match command {
        Commands::Encode { value_type, value } => {
            let ty = ValueType::parse(&value_type);
            let value = parse_value(&ty, &value)?;
            let bytes = registry.codec_for(&ty)?.encode(&value)?;
            println!("{}", to_hex(&bytes));
        }
        Commands::Decode { value_type, hex } => {
            let ty = ValueType::parse(&value_type);
            let bytes = from_hex(&hex)?;
            let value = registry.codec_for(&ty)?.decode(&bytes)?;
            println!("{}", value);
        }
        Commands::Range {
            value_type,
            start,
            end,
        } => {
            let ty = ValueType::parse(&value_type);
            let codec = registry.codec_for(&ty)?;
            let start = parse_value(&ty, &start)?;
            let end = parse_value(&ty, &end)?;
            let spec = build_range(
                Some(&start),
                Some(&end),
                Some(BoundaryMode::GreaterThanEqualLessThanEqual),
                codec.as_ref(),
                registry,
            )?;
            let range = spec.byte_range();
            println!("start {}", range.start.as_deref().map_or_else(|| "open".to_string(), to_hex));
            println!("end   {}", range.end.as_deref().map_or_else(|| "open".to_string(), to_hex));
        }
    }
    Ok(())
}

/// Parse the text form of a primitive value
fn parse_value(ty: &ValueType, raw: &str) -> Result<Value> {
    let invalid = |reason: String| widebridge::BridgeError::Config(format!("invalid {} '{}': {}", ty, raw, reason));

    let value = match ty {
        ValueType::Uuid => Value::Uuid(raw.parse().map_err(|e: uuid::Error| invalid(e.to_string()))?),
        ValueType::Utf8 => Value::from(raw),
        ValueType::Int64 => Value::Int64(raw.parse().map_err(|e: std::num::ParseIntError| invalid(e.to_string()))?),
        ValueType::Int32 => Value::Int32(raw.parse().map_err(|e: std::num::ParseIntError| invalid(e.to_string()))?),
        ValueType::Int16 => Value::Int16(raw.parse().map_err(|e: std::num::ParseIntError| invalid(e.to_string()))?),
        ValueType::Int8 => Value::Int8(raw.parse().map_err(|e: std::num::ParseIntError| invalid(e.to_string()))?),
        ValueType::Float32 => Value::Float32(raw.parse().map_err(|e: std::num::ParseFloatError| invalid(e.to_string()))?),
        ValueType::Float64 => Value::Float64(raw.parse().map_err(|e: std::num::ParseFloatError| invalid(e.to_string()))?),
        ValueType::BigInteger => Value::BigInteger(
            raw.parse()
                .map_err(|e: num_bigint::ParseBigIntError| invalid(e.to_string()))?,
        ),
        ValueType::Boolean => Value::Boolean(raw.parse().map_err(|e: std::str::ParseBoolError| invalid(e.to_string()))?),
        ValueType::Bytes => Value::Bytes(from_hex(raw)?),
        ValueType::ByteBuffer => Value::Buffer(from_hex(raw)?.into()),
        ValueType::Timestamp => {
            let millis: i64 = raw.parse().map_err(|e: std::num::ParseIntError| invalid(e.to_string()))?;
            Value::timestamp_millis(millis).ok_or_else(|| invalid("out of range".to_string()))?
        }
        ValueType::Named(_) => return Err(invalid("only primitive types can be parsed".to_string())),
    };
    Ok(value)
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn from_hex(raw: &str) -> Result<Vec<u8>> {
    let raw = raw.trim().trim_start_matches("0x");
    if raw.len() % 2 != 0 {
        return Err(widebridge::BridgeError::Config(format!("odd-length hex '{}'", raw)));
    }
    raw.as_bytes()
        .chunks(2)
        .map(|pair| match (hex_digit(pair[0]), hex_digit(pair[1])) {
            (Some(hi), Some(lo)) => Ok(hi << 4 | lo),
            _ => Err(widebridge::BridgeError::Config(format!("bad hex '{}'", raw))),
        })
        .collect()
}

fn hex_digit(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}
