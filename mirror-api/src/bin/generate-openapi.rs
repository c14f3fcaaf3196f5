//! OpenAPI Specification Generator Binary
//!
//! Prints the Mirror API OpenAPI document as JSON to stdout.
//!
//! Usage:
//!   cargo run -p mirror-api --bin generate-openapi --features openapi > openapi.json

use mirror_api::ApiDoc;

fn main() {
    match ApiDoc::to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to serialize OpenAPI spec: {}", e);
            std::process::exit(1);
        }
    }
}
