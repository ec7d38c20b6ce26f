//! # Sitrep CLI
//!
//! Usage:
//!   sitrep request.json
//!   sitrep request.json -o reports/
//!   echo '{ ... }' | sitrep
//!   sitrep --example > request.json

use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

use sitrep::DefaultImageResolver;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--example") {
        print!("{}", example_request_json());
        return;
    }

    // Read input
    let input = if args.len() > 1 && !args[1].starts_with('-') {
        fs::read_to_string(&args[1]).expect("Failed to read input file")
    } else {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .expect("Failed to read stdin");
        buf
    };

    // Parse output directory
    let out_dir = args
        .windows(2)
        .find(|w| w[0] == "-o")
        .map(|w| w[1].clone())
        .unwrap_or_else(|| ".".to_string());

    match sitrep::render_json(&input, &DefaultImageResolver) {
        Ok(document) => {
            let path = Path::new(&out_dir).join(&document.file_name);
            fs::write(&path, &document.bytes).expect("Failed to write PDF");
            eprintln!(
                "✓ Written {} bytes to {}",
                document.bytes.len(),
                path.display()
            );
        }
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    }
}

fn example_request_json() -> &'static str {
    r##"{
  "reportType": "daily",
  "startDate": "2024-03-04",
  "endDate": "2024-03-06",
  "report": {
    "project": {
      "name": "Dockside Crane Refit",
      "description": "Structural refit of quay crane QC-07, east terminal.",
      "status": "active"
    },
    "teams": [
      { "name": "Rigging" },
      { "name": "Electrical" }
    ],
    "members": [
      { "id": "u-1", "name": "Priya Shah", "email": "priya@example.com" },
      { "id": "u-2", "email": "lee@example.com" },
      "u-3"
    ],
    "updatesByDate": {
      "2024-03-06": {
        "u-1": {
          "morning": {
            "status": "on site",
            "updateDescription": "Boom section bolted, torque checks pending.",
            "timestamp": "2024-03-06T07:52:00Z",
            "documents": [
              {
                "fileName": "boom-east.jpg",
                "filePath": "./photos/boom-east.jpg",
                "latitude": 55.676098,
                "longitude": 12.568337
              }
            ]
          },
          "evening": {
            "status": "wrapped up",
            "timestamp": "2024-03-06T17:31:00Z",
            "documents": []
          }
        }
      }
    }
  }
}"##
}
