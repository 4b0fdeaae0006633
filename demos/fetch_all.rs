//! Fetch all YANG modules from a set of devices.
//!
//! Usage: fetch_all <host[,host...]> <user> <output_dir>

use std::sync::Arc;

use yangfetch::{AuthMethod, DirStore, SshConfig, fetch_all};

#[tokio::main]
async fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        eprintln!("Usage: {} <host[,host...]> <user> <output_dir>", args[0]);
        std::process::exit(1);
    }

    let password = std::env::var("YANGFETCH_PASSWORD").ok();

    let configs = args[1]
        .split(',')
        .map(|host| {
            let mut config = SshConfig::new(host, args[2].as_str());
            if let Some(ref password) = password {
                config.auth = AuthMethod::Password(password.clone());
            }
            config
        })
        .collect();

    let store = Arc::new(DirStore::new(&args[3]));

    let mut failed = false;
    for outcome in fetch_all(configs, store).await {
        match outcome.result {
            Ok(report) => println!("\n{report}"),
            Err(e) => {
                eprintln!("{}: {e}", outcome.host);
                failed = true;
            }
        }
    }

    if failed {
        std::process::exit(1);
    }
}
