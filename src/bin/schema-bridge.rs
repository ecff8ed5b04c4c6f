//! # Schema Bridge
//!
//! A command-line utility that converts JSON Schema files into the normalized
//! form advertised by tool descriptors, and optionally checks an instance
//! against the converted schema.
//!
//! Conversion is best effort: unsupported keywords are dropped and anything
//! unrecognized becomes a schema that accepts any value.
//!
//! ## Usage
//!
//! ### Convert a Single Schema File
//!
//! ```bash
//! cargo run --bin schema-bridge schemas/book.json
//! ```
//!
//! ### Convert All Schemas in a Directory
//!
//! ```bash
//! cargo run --bin schema-bridge ./schemas/
//! ```
//!
//! ### Check an Instance
//!
//! ```bash
//! cargo run --bin schema-bridge schemas/book.json book-instance.json
//! ```
//!
//! ## Output Example
//!
//! ```text
//! Converting schema file: schemas/book.json
//! ✓ Converted
//!
//! Schema Summary:
//!   Type: object
//!   Properties: 3
//!   Required: title, author
//!
//! {
//!   "properties": { ... },
//!   "required": ["title", "author"],
//!   "type": "object"
//! }
//! ```
//!
//! ## Exit Codes
//!
//! - `0`: Every file converted (and the instance, if given, is valid)
//! - `1`: A file could not be read or parsed, or the instance is invalid

use layers_mcp_server::schema::{SchemaDescription, SchemaNode, to_description, to_schema_node};
use serde_json::Value;
use std::env;
use std::fs;
use std::path::Path;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <schema-file-or-directory> [instance-file]", args[0]);
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  {} schemas/book.json", args[0]);
        eprintln!("  {} ./schemas/", args[0]);
        eprintln!("  {} schemas/book.json book.json", args[0]);
        process::exit(1);
    }

    let path = Path::new(&args[1]);

    if path.is_file() {
        let node = convert_single_file(path);
        if let Some(instance) = args.get(2) {
            check_instance(&node, Path::new(instance));
        }
    } else if path.is_dir() {
        if args.len() == 3 {
            eprintln!("Error: an instance can only be checked against a single schema file");
            process::exit(1);
        }
        convert_directory(path);
    } else {
        eprintln!(
            "Error: '{}' is not a valid file or directory",
            path.display()
        );
        process::exit(1);
    }
}

fn convert_single_file(file_path: &Path) -> SchemaNode {
    println!("Converting schema file: {}", file_path.display());

    match load_schema(file_path) {
        Ok(node) => {
            let description = to_description(&node);
            println!("✓ Converted");
            print_summary(&description);
            print_description(&description);
            node
        }
        Err(e) => {
            eprintln!("❌ Conversion failed: {}", e);
            process::exit(1);
        }
    }
}

fn convert_directory(dir_path: &Path) {
    println!("Converting schemas in directory: {}", dir_path.display());

    let entries = match fs::read_dir(dir_path) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("Error reading directory: {}", e);
            process::exit(1);
        }
    };

    let mut converted = 0;
    let mut failed = 0;

    for path in entries.flatten().map(|entry| entry.path()) {
        if path.extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!("\nConverting: {}", file_name);

        match load_schema(&path) {
            Ok(node) => {
                let description = to_description(&node);
                println!("  ✓ {}", type_label(&description));
                converted += 1;
            }
            Err(e) => {
                eprintln!("  ❌ {}", e);
                failed += 1;
            }
        }
    }

    println!("\nConversion Summary:");
    println!("  Converted: {}", converted);
    println!("  Failed: {}", failed);

    if failed > 0 {
        process::exit(1);
    }
}

fn check_instance(node: &SchemaNode, instance_path: &Path) {
    println!("\nChecking instance: {}", instance_path.display());

    let instance = match read_json(instance_path) {
        Ok(instance) => instance,
        Err(e) => {
            eprintln!("❌ Could not read instance: {}", e);
            process::exit(1);
        }
    };

    match node.validate(&instance) {
        Ok(()) => println!("✓ Instance is valid"),
        Err(errors) => {
            eprintln!("❌ Instance is invalid:");
            for (key, messages) in errors.keys_to_errors() {
                let key = if key.is_empty() { "<root>" } else { key.as_str() };
                for message in messages {
                    eprintln!("  {}: {}", key, message);
                }
            }
            process::exit(1);
        }
    }
}

fn read_json(path: &Path) -> Result<Value, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn load_schema(path: &Path) -> Result<SchemaNode, Box<dyn std::error::Error>> {
    let schema = read_json(path)?;
    if !schema.is_object() && !schema.is_boolean() {
        return Err("Schema must be a JSON object".into());
    }
    Ok(to_schema_node(&schema))
}

fn type_label(description: &SchemaDescription) -> String {
    if let Some(json_type) = &description.json_type {
        return serde_json::to_value(json_type)
            .ok()
            .and_then(|value| value.as_str().map(str::to_string))
            .unwrap_or_else(|| "unknown".to_string());
    }
    if description.any_of.is_some() {
        "union".to_string()
    } else if description.all_of.is_some() {
        "intersection".to_string()
    } else if description.const_value.is_some() {
        "literal".to_string()
    } else {
        "any".to_string()
    }
}

fn print_summary(description: &SchemaDescription) {
    println!();
    println!("Schema Summary:");
    println!("  Type: {}", type_label(description));

    if let Some(properties) = &description.properties {
        println!("  Properties: {}", properties.len());
    }
    if let Some(required) = description.required.as_ref().filter(|r| !r.is_empty()) {
        println!("  Required: {}", required.join(", "));
    }
    if let Some(text) = &description.description {
        println!("  Description: {}", text);
    }
}

fn print_description(description: &SchemaDescription) {
    println!();
    match serde_json::to_string_pretty(&description.to_value()) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Could not render schema: {}", e),
    }
}
