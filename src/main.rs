//! bgpstuff - command-line client for the bgpstuff.net BGP lookup API.
//!
//! This is the command-line interface for the bgpstuff library.

use anyhow::{Context, Result};
use bgpstuff::{parse_public_asn, parse_public_ip, Client, ClientConfig};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use serde_json::json;

/// Command-line arguments for the bgpstuff tool.
#[derive(Parser, Debug)]
#[clap(author, version, about = "Query BGP routing data from bgpstuff.net", long_about = None)]
struct Args {
    /// Base URL of the bgpstuff instance (default: $BGPSTUFF_URL or https://bgpstuff.net)
    #[clap(long, global = true)]
    url: Option<String>,

    /// Output results in JSON format
    #[clap(long, global = true)]
    json: bool,

    /// Enable verbose output (use -vv for request tracing)
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the route covering an IP address
    Route {
        /// Public IPv4 or IPv6 address
        ip: String,
    },
    /// Show the origin AS of the route covering an IP address
    Origin {
        /// Public IPv4 or IPv6 address
        ip: String,
    },
    /// Show the AS path towards an IP address
    Aspath {
        /// Public IPv4 or IPv6 address
        ip: String,
    },
    /// Show the RPKI state of the route covering an IP address
    Roa {
        /// Public IPv4 or IPv6 address
        ip: String,
    },
    /// Show the registered name of an AS
    Asname {
        /// AS number, with or without the AS prefix
        asn: String,
    },
    /// List the prefixes originated by an AS
    Sourced {
        /// AS number, with or without the AS prefix
        asn: String,
    },
    /// List the VRPs authorising an AS
    Vrps {
        /// AS number, with or without the AS prefix
        asn: String,
    },
    /// Show the number of IPv4 and IPv6 prefixes in the table
    Totals,
    /// Show ROA-invalid prefixes, for every AS or a single one
    Invalids {
        /// Only show prefixes originated by this AS
        asn: Option<String>,
    },
}

fn init_logging(verbose: u8) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));

    // Explicit -v flags take precedence over RUST_LOG
    match verbose {
        0 => {}
        1 => {
            builder.filter_module("bgpstuff", LevelFilter::Info);
        }
        _ => {
            builder.filter_module("bgpstuff", LevelFilter::Debug);
        }
    }
    builder.filter_module("reqwest", LevelFilter::Warn);
    builder.filter_module("hyper", LevelFilter::Warn);

    let _ = builder.try_init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    // Create single-threaded tokio runtime for lower overhead
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to create Tokio runtime");

    if let Err(e) = runtime.block_on(async_main(args)) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn async_main(args: Args) -> Result<()> {
    let mut builder = ClientConfig::builder();
    if let Some(url) = &args.url {
        builder = builder.base_url(url.as_str());
    }
    let config = builder
        .build()
        .map_err(anyhow::Error::msg)
        .context("invalid client configuration")?;
    let client = Client::with_config(config)?;

    match &args.command {
        Command::Route { ip } => {
            let ip = parse_public_ip(ip)?;
            let route = client.get_route(ip).await?;
            if args.json {
                print_json(&json!({ "ip": ip, "exists": client.exists(), "route": route }))?;
            } else if let Some(route) = route {
                println!("The route for {} is {}", ip, route);
            } else {
                println!("route does not exist for {}", ip);
            }
        }
        Command::Origin { ip } => {
            let ip = parse_public_ip(ip)?;
            let origin = client.get_origin(ip).await?;
            if args.json {
                print_json(&json!({ "ip": ip, "exists": client.exists(), "origin": origin }))?;
            } else if let Some(origin) = origin {
                println!("The origin for {} is AS{}", ip, origin);
            } else {
                println!("route does not exist for {} so unable to check the origin", ip);
            }
        }
        Command::Aspath { ip } => {
            let ip = parse_public_ip(ip)?;
            let path = client.get_as_path(ip).await?;
            if args.json {
                print_json(&json!({ "ip": ip, "exists": client.exists(), "as_path": path }))?;
            } else if let Some(path) = path {
                println!("The aspath for {} is {}", ip, path);
            } else {
                println!("route does not exist for {} so unable to check the aspath", ip);
            }
        }
        Command::Roa { ip } => {
            let ip = parse_public_ip(ip)?;
            let roa = client.get_roa(ip).await?;
            if args.json {
                let roa = roa.as_ref().map(ToString::to_string);
                print_json(&json!({ "ip": ip, "exists": client.exists(), "roa": roa }))?;
            } else if let Some(roa) = roa {
                println!("The roa for {} is {}", ip, roa);
            } else {
                println!("route does not exist for {} so unable to check the roa", ip);
            }
        }
        Command::Asname { asn } => {
            let asn = parse_public_asn(asn)?;
            let name = client.get_as_name(asn).await?;
            if args.json {
                print_json(&json!({ "asn": asn, "exists": client.exists(), "as_name": name }))?;
            } else if let Some(name) = name {
                println!("The asname for AS{} is {}", asn, name);
            } else {
                println!("AS{} does not exist, hence no name", asn);
            }
        }
        Command::Sourced { asn } => {
            let asn = parse_public_asn(asn)?;
            let prefixes = client.get_sourced_prefixes(asn).await?;
            if args.json {
                print_json(&json!({ "asn": asn, "exists": client.exists(), "prefixes": prefixes }))?;
            } else if let Some(prefixes) = prefixes {
                println!("AS{} is sourcing {} prefixes", asn, prefixes.len());
                for prefix in prefixes {
                    println!("  {}", prefix);
                }
            } else {
                println!("AS{} does not exist, hence not sourcing any prefixes", asn);
            }
        }
        Command::Vrps { asn } => {
            let asn = parse_public_asn(asn)?;
            let vrps = client.get_vrps(asn).await?;
            if args.json {
                print_json(&json!({ "asn": asn, "exists": client.exists(), "vrps": vrps }))?;
            } else if let Some(vrps) = vrps {
                println!("AS{} has {} VRPs", asn, vrps.len());
                for vrp in vrps {
                    println!("  {} max /{}", vrp.prefix, vrp.max_length);
                }
            } else {
                println!("AS{} does not exist, hence no VRPs", asn);
            }
        }
        Command::Totals => {
            let totals = client.get_totals().await?;
            if args.json {
                print_json(&json!({ "ipv4": totals.ipv4, "ipv6": totals.ipv6 }))?;
            } else {
                println!("{} IPv4 Routes", totals.ipv4);
                println!("{} IPv6 Routes", totals.ipv6);
            }
        }
        Command::Invalids { asn } => {
            let asn = asn.as_deref().map(parse_public_asn).transpose()?;
            let count = client.get_invalids().await?;

            match asn {
                Some(asn) => {
                    let prefixes = client.invalids(asn)?.unwrap_or_default();
                    if args.json {
                        print_json(&json!({ "asn": asn, "prefixes": prefixes }))?;
                    } else {
                        println!(
                            "AS{} is originating {} ROA invalid prefixes",
                            asn,
                            prefixes.len()
                        );
                        for prefix in prefixes {
                            println!("  {}", prefix);
                        }
                    }
                }
                None => {
                    let table = client.all_invalids().unwrap_or_default();
                    if args.json {
                        let entries: serde_json::Map<String, serde_json::Value> = table
                            .iter()
                            .map(|(asn, prefixes)| (asn.to_string(), json!(prefixes)))
                            .collect();
                        print_json(&serde_json::Value::Object(entries))?;
                    } else {
                        println!("{} ASNs are originating ROA invalid prefixes", count);
                        let mut asns: Vec<_> = table.iter().collect();
                        asns.sort_by_key(|(asn, _)| **asn);
                        for (asn, prefixes) in asns {
                            println!(
                                "AS{} is originating {} ROA invalid prefixes",
                                asn,
                                prefixes.len()
                            );
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
