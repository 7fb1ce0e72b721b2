//! One-shot eGFR calculation from the command line
//! Usage: cargo run --bin egfr -- crea=88.4:umol urea=30 cysc=1.8 height=140 gender=male [--capped]
//!
//! Values take an optional `:unit` suffix; without it the canonical unit is used.

use kidcal::config::CalculatorConfig;
use kidcal::egfr::{DisplayMode, GenderSelection};
use kidcal::error::{parse_field, resolve_unit};
use kidcal::models::FormSession;
use kidcal::KidcalError;

const USAGE: &str =
    "Usage: egfr crea=<value>[:unit] urea=<value>[:unit] cysc=<value> height=<value>[:unit] gender=<female|male> [--capped]";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() || args.iter().any(|a| a == "--help" || a == "-h") {
        println!("{}", USAGE);
        return Ok(());
    }

    let mut config = CalculatorConfig::from_env();
    if args.iter().any(|a| a == "--capped") {
        config.display_mode = DisplayMode::Capped;
    }
    let mut form = FormSession::new(config);

    for arg in args.iter().filter(|a| !a.starts_with("--")) {
        let (key, value) = arg
            .split_once('=')
            .ok_or_else(|| format!("Expected key=value, got '{}'\n{}", arg, USAGE))?;

        if key.eq_ignore_ascii_case("gender") {
            let gender = GenderSelection::from_str(value)
                .ok_or_else(|| KidcalError::UnknownGender(value.to_string()))?;
            form.set_gender(gender);
            continue;
        }

        let field = parse_field(key)?;
        let (text, unit) = match value.split_once(':') {
            Some((text, unit)) => (text, Some(unit)),
            None => (value, None),
        };
        form.select_unit(field, resolve_unit(field, unit)?)?;
        if !form.edit_field(field, text).is_accepted() {
            return Err(format!("'{}' is not a number for {}", text, field).into());
        }
    }

    for input in form.inputs() {
        let field = input.field.field();
        println!(
            "{:<11} {:>10} {:<7} = {:.2} {}",
            field.label,
            input.raw_text,
            input.unit_label(),
            input.canonical_value(),
            field.unit(field.canonical_index()).label
        );
    }
    println!("Gender      {}", form.gender().as_str());
    println!();

    let result = form.result();
    println!("CKiD Schwartz:    {} ml/min/1.73 m²", result.ckid);
    println!("Bedside Schwartz: {} ml/min/1.73 m²", result.bedside);

    Ok(())
}
