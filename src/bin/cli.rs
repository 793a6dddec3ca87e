//! zset-cli
//!
//! Command-line interface for running one sorted-set command against a store.

use std::collections::HashMap;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};
use zset_client::{Bound, Config, Member, ScoreDecoding, TcpTransport, ZSetClient};

/// zset-cli
#[derive(Parser, Debug)]
#[command(name = "zset-cli")]
#[command(about = "CLI for sorted-set commands")]
#[command(version)]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:8888")]
    server: String,

    /// Connect/read/write timeout in milliseconds
    #[arg(short, long, default_value = "3000")]
    timeout_ms: u64,

    /// Decode malformed score tokens as 0 instead of failing
    #[arg(long)]
    lenient: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Set the score of a key
    Set {
        name: String,
        key: String,
        #[arg(allow_hyphen_values = true)]
        score: i64,
    },

    /// Get the score of a key
    Get { name: String, key: String },

    /// Delete a key
    Del { name: String, key: String },

    /// Check whether a key exists
    Exists { name: String, key: String },

    /// Add to the score of a key
    Incr {
        name: String,
        key: String,
        #[arg(allow_hyphen_values = true)]
        by: i64,
    },

    /// Number of members in a set
    Size { name: String },

    /// Remove every member of a set
    Clear { name: String },

    /// List set names in (start, end]
    List {
        #[arg(long, default_value = "")]
        start: String,
        #[arg(long, default_value = "")]
        end: String,
        #[arg(short, long, default_value = "100")]
        limit: u64,
    },

    /// Count members with score in [start, end]
    Count {
        name: String,
        #[command(flatten)]
        bounds: BoundArgs,
    },

    /// Sum of scores in [start, end]
    Sum {
        name: String,
        #[command(flatten)]
        bounds: BoundArgs,
    },

    /// Average of scores in [start, end]
    Avg {
        name: String,
        #[command(flatten)]
        bounds: BoundArgs,
    },

    /// Scan members from an anchor
    Scan {
        name: String,
        #[arg(long, default_value = "")]
        key_start: String,
        #[command(flatten)]
        bounds: BoundArgs,
        #[arg(short, long, default_value = "100")]
        limit: u64,
        /// Walk from the highest score down
        #[arg(short, long)]
        reverse: bool,
    },

    /// Scan keys from an anchor
    Keys {
        name: String,
        #[arg(long, default_value = "")]
        key_start: String,
        #[command(flatten)]
        bounds: BoundArgs,
        #[arg(short, long, default_value = "100")]
        limit: u64,
    },

    /// Rank of a key (slow on large sets)
    Rank {
        name: String,
        key: String,
        #[arg(short, long)]
        reverse: bool,
    },

    /// Members by position (slow for large offsets)
    Range {
        name: String,
        #[arg(short, long, default_value = "0")]
        offset: u64,
        #[arg(short, long, default_value = "100")]
        limit: u64,
        #[arg(short, long)]
        reverse: bool,
    },

    /// Remove members with rank in [start, end]
    RemRank {
        name: String,
        #[command(flatten)]
        bounds: BoundArgs,
    },

    /// Remove members with score in [start, end]
    RemScore {
        name: String,
        #[command(flatten)]
        bounds: BoundArgs,
    },

    /// Remove and return members from one end
    Pop {
        name: String,
        #[arg(short, long, default_value = "1")]
        limit: u64,
        /// Pop the highest members instead of the lowest
        #[arg(short, long)]
        back: bool,
    },

    /// Set many key=score entries
    MultiSet {
        name: String,
        #[arg(value_parser = parse_entry, allow_hyphen_values = true)]
        entries: Vec<(String, i64)>,
    },

    /// Get many keys
    MultiGet { name: String, keys: Vec<String> },

    /// Delete many keys
    MultiDel { name: String, keys: Vec<String> },
}

/// Optional inclusive bounds; a missing flag means unbounded
#[derive(clap::Args, Debug)]
struct BoundArgs {
    #[arg(long, allow_hyphen_values = true)]
    start: Option<i64>,
    #[arg(long, allow_hyphen_values = true)]
    end: Option<i64>,
}

impl BoundArgs {
    fn pair(&self) -> (Bound, Bound) {
        (Bound::from(self.start), Bound::from(self.end))
    }
}

fn parse_entry(raw: &str) -> Result<(String, i64), String> {
    let (key, score) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected key=score, got {:?}", raw))?;
    let score = score
        .parse()
        .map_err(|_| format!("invalid score in {:?}", raw))?;
    Ok((key.to_string(), score))
}

/// Result of one command, printable as text or JSON
#[derive(Serialize)]
#[serde(untagged)]
enum Output {
    Done,
    Int(i64),
    Float(f64),
    Flag(bool),
    Keys(Vec<String>),
    Members(Vec<Member>),
    Map(HashMap<String, i64>),
}

impl Output {
    fn print_text(&self) {
        match self {
            Output::Done => println!("ok"),
            Output::Int(n) => println!("{}", n),
            Output::Float(f) => println!("{}", f),
            Output::Flag(b) => println!("{}", b),
            Output::Keys(keys) => keys.iter().for_each(|k| println!("{}", k)),
            Output::Members(members) => members
                .iter()
                .for_each(|m| println!("{}\t{}", m.key, m.score)),
            Output::Map(map) => {
                let mut entries: Vec<_> = map.iter().collect();
                entries.sort_by(|a, b| (a.1, a.0).cmp(&(b.1, b.0)));
                entries.iter().for_each(|(k, s)| println!("{}\t{}", k, s));
            }
        }
    }
}

fn run(client: &ZSetClient<TcpTransport>, command: Commands) -> zset_client::Result<Output> {
    let output = match command {
        Commands::Set { name, key, score } => {
            client.zset(&name, &key, score)?;
            Output::Done
        }
        Commands::Get { name, key } => Output::Int(client.zget(&name, &key)?),
        Commands::Del { name, key } => {
            client.zdel(&name, &key)?;
            Output::Done
        }
        Commands::Exists { name, key } => Output::Flag(client.zexists(&name, &key)?),
        Commands::Incr { name, key, by } => Output::Int(client.zincr(&name, &key, by)?),
        Commands::Size { name } => Output::Int(client.zsize(&name)?),
        Commands::Clear { name } => {
            client.zclear(&name)?;
            Output::Done
        }
        Commands::List { start, end, limit } => Output::Keys(client.zlist(&start, &end, limit)?),
        Commands::Count { name, bounds } => {
            let (start, end) = bounds.pair();
            Output::Int(client.zcount(&name, start, end)?)
        }
        Commands::Sum { name, bounds } => {
            let (start, end) = bounds.pair();
            Output::Int(client.zsum(&name, start, end)?)
        }
        Commands::Avg { name, bounds } => {
            let (start, end) = bounds.pair();
            Output::Float(client.zavg(&name, start, end)?)
        }
        Commands::Scan {
            name,
            key_start,
            bounds,
            limit,
            reverse,
        } => {
            let (start, end) = bounds.pair();
            let members = if reverse {
                client.zrscan(&name, &key_start, start, end, limit)?
            } else {
                client.zscan(&name, &key_start, start, end, limit)?
            };
            Output::Members(members)
        }
        Commands::Keys {
            name,
            key_start,
            bounds,
            limit,
        } => {
            let (start, end) = bounds.pair();
            Output::Keys(client.zkeys(&name, &key_start, start, end, limit)?)
        }
        Commands::Rank { name, key, reverse } => {
            let rank = if reverse {
                client.zrrank(&name, &key)?
            } else {
                client.zrank(&name, &key)?
            };
            Output::Int(rank)
        }
        Commands::Range {
            name,
            offset,
            limit,
            reverse,
        } => {
            let members = if reverse {
                client.zrrange_slice(&name, offset, limit)?
            } else {
                client.zrange_slice(&name, offset, limit)?
            };
            Output::Members(members)
        }
        Commands::RemRank { name, bounds } => {
            let (start, end) = bounds.pair();
            client.zremrangebyrank(&name, start, end)?;
            Output::Done
        }
        Commands::RemScore { name, bounds } => {
            let (start, end) = bounds.pair();
            client.zremrangebyscore(&name, start, end)?;
            Output::Done
        }
        Commands::Pop { name, limit, back } => {
            let members = if back {
                client.zpop_back(&name, limit)?
            } else {
                client.zpop_front(&name, limit)?
            };
            Output::Members(members)
        }
        Commands::MultiSet { name, entries } => {
            client.multi_zset(&name, entries)?;
            Output::Done
        }
        Commands::MultiGet { name, keys } => Output::Map(client.multi_zget(&name, &keys)?),
        Commands::MultiDel { name, keys } => {
            client.multi_zdel(&name, &keys)?;
            Output::Done
        }
    };
    Ok(output)
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let decoding = if args.lenient {
        ScoreDecoding::Lenient
    } else {
        ScoreDecoding::Strict
    };
    let config = Config::builder()
        .server_addr(&args.server)
        .connect_timeout_ms(args.timeout_ms)
        .read_timeout_ms(args.timeout_ms)
        .write_timeout_ms(args.timeout_ms)
        .score_decoding(decoding)
        .try_build();
    let config = match config {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(2);
        }
    };

    let transport = match TcpTransport::connect(&config) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: cannot connect to {}: {}", args.server, e);
            return ExitCode::from(2);
        }
    };
    let client = ZSetClient::with_config(transport, config);

    match run(&client, args.command) {
        Ok(output) if args.json => match serde_json::to_string(&output) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {}", e);
                ExitCode::from(2)
            }
        },
        Ok(output) => {
            output.print_text();
            ExitCode::SUCCESS
        }
        Err(e) if e.is_not_found() => {
            eprintln!("not found");
            ExitCode::from(1)
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(2)
        }
    }
}
