//! CLI driver for the clinic records API.
//!
//! # Responsibility
//! - Resolve configuration, open the record store and execute one operation
//!   document read from the first argument or stdin.
//! - Print the JSON response envelope to stdout.
//!
//! Exit codes: `0` success, `1` operation error, `2` configuration or store
//! bootstrap failure.

use clinic_api::{ClinicApi, ClinicConfig, OperationRequest};
use clinic_core::init_logging;
use log::{error, info};
use std::io::Read;
use std::process::ExitCode;

const USAGE: &str = "usage: clinic_cli [--config | --version | OPERATION_JSON]
  OPERATION_JSON  {\"operation\": \"patients\", \"variables\": {}}
                  read from stdin when omitted";

fn main() -> ExitCode {
    let arg = std::env::args().nth(1);
    if matches!(arg.as_deref(), Some("-h" | "--help")) {
        println!("{USAGE}");
        return ExitCode::SUCCESS;
    }
    if arg.as_deref() == Some("--version") {
        println!("clinic_core version={}", clinic_core::core_version());
        return ExitCode::SUCCESS;
    }

    let config = match ClinicConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(2);
        }
    };

    if arg.as_deref() == Some("--config") {
        println!("store={}", config.store);
        println!("port={}", config.port);
        println!("log_level={}", config.log_level);
        println!("log_dir={}", config.log_dir.as_deref().unwrap_or("-"));
        return ExitCode::SUCCESS;
    }

    if let Some(log_dir) = config.log_dir.as_deref() {
        if let Err(err) = init_logging(&config.log_level, log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    let document = match arg {
        Some(document) => document,
        None => {
            let mut buffer = String::new();
            if let Err(err) = std::io::stdin().read_to_string(&mut buffer) {
                eprintln!("cannot read operation document from stdin: {err}");
                return ExitCode::from(2);
            }
            buffer
        }
    };

    let conn = match config.open_store() {
        Ok(conn) => conn,
        Err(err) => {
            error!("event=cli_run module=cli status=error error_code=store_open_failed");
            eprintln!("cannot open record store `{}`: {err}", config.store);
            return ExitCode::from(2);
        }
    };
    let api = match ClinicApi::try_new(&conn) {
        Ok(api) => api,
        Err(err) => {
            eprintln!("record store not ready: {err}");
            return ExitCode::from(2);
        }
    };

    let response = match serde_json::from_str::<OperationRequest>(&document) {
        Ok(request) => api.execute(&request),
        Err(_) => {
            // Let the API produce the standard validation envelope.
            println!("{}", api.execute_json(&document));
            return ExitCode::from(1);
        }
    };

    match serde_json::to_string_pretty(&response) {
        Ok(text) => println!("{text}"),
        Err(err) => {
            eprintln!("cannot encode response: {err}");
            return ExitCode::from(2);
        }
    }
    info!(
        "event=cli_run module=cli status={} port={}",
        if response.is_ok() { "ok" } else { "error" },
        config.port
    );

    if response.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
