#!/usr/bin/env cargo
use fleet_api::openapi::FleetApiDoc;

fn main() {
    match serde_json::to_string_pretty(&FleetApiDoc::openapi()) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Failed to serialize OpenAPI spec to JSON: {e}");
            std::process::exit(1);
        }
    }
}
